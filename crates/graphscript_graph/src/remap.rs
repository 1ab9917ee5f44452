// SPDX-License-Identifier: MIT OR Apache-2.0
//! Identity remapping after module duplication or merge.

use graphscript_value::TypeId;
use std::collections::HashMap;
use uuid::Uuid;

/// Pure old-to-new identity mapping
///
/// Applied when the owning module is cloned or merged so that duplicated
/// graphs reference the duplicated types, not the originals. Identities
/// absent from the mapping pass through unchanged; a miss is not an error.
#[derive(Debug, Default, Clone)]
pub struct GuidRemapper {
    mapping: HashMap<Uuid, Uuid>,
}

impl GuidRemapper {
    /// Create an empty remapper
    pub fn new() -> Self {
        Self {
            mapping: HashMap::new(),
        }
    }

    /// Record an old-to-new identity pair
    pub fn insert(&mut self, old: Uuid, new: Uuid) {
        self.mapping.insert(old, new);
    }

    /// Look up an identity, returning it unchanged when unmapped
    pub fn remap(&self, id: Uuid) -> Uuid {
        self.mapping.get(&id).copied().unwrap_or(id)
    }

    /// Look up a type identity, returning it unchanged when unmapped
    pub fn remap_type(&self, id: TypeId) -> TypeId {
        TypeId(self.remap(id.0))
    }

    /// Number of recorded pairs
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    /// Check whether no pairs are recorded
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}
