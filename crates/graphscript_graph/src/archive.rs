// SPDX-License-Identifier: MIT OR Apache-2.0
//! Persisted node records.
//!
//! The archive is a format-agnostic field map; the surrounding graph record
//! round-trips through RON. Nodes persist only the configuration needed to
//! rebuild their layout, never the layout itself.

use crate::node::{NodeId, NodeTypeGuid};
use crate::view::ScriptView;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Ordered field map a node reads and writes its configuration through
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeArchive {
    fields: IndexMap<String, serde_json::Value>,
}

impl NodeArchive {
    /// Create an empty archive
    pub fn new() -> Self {
        Self {
            fields: IndexMap::new(),
        }
    }

    /// Write a field
    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.fields.insert(key.to_string(), value);
            }
            Err(error) => {
                tracing::error!("Failed to serialize archive field '{key}': {error}");
            }
        }
    }

    /// Read a field
    ///
    /// A missing or malformed field reads as `None`; malformed data is
    /// logged and otherwise treated as absent, matching the load-time
    /// fallback policy.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.fields.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!("Malformed archive field '{key}': {error}");
                None
            }
        }
    }

    /// Check whether a field is present
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Check whether the archive holds no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Context for save/load steps
///
/// Exposes the script view so loads can resolve persisted type identities.
pub struct SerializationContext<'a> {
    view: &'a ScriptView<'a>,
}

impl<'a> SerializationContext<'a> {
    /// Create a serialization context over a script view
    pub fn new(view: &'a ScriptView<'a>) -> Self {
        Self { view }
    }

    /// The script view types resolve against
    pub fn view(&self) -> &'a ScriptView<'a> {
        self.view
    }
}

/// Persisted record of one node instance
///
/// Holds the variant GUID, the instance identity and position, and the
/// variant's configuration fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedNode {
    /// Instance identity
    pub id: NodeId,
    /// Variant GUID, resolved through the node factory on load
    pub variant: NodeTypeGuid,
    /// Position in the graph UI
    pub position: [f32; 2],
    /// Variant configuration fields
    pub data: NodeArchive,
}
