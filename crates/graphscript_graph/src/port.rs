// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions for node inputs/outputs.

use graphscript_value::TypeId;
use serde::{Deserialize, Serialize};

/// Index of a port within its node's input or output list
///
/// Ports are created in a fixed order during layout construction and
/// addressed thereafter by stable index, not by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortIndex(pub u32);

impl PortIndex {
    /// The index as a usize, for slice addressing
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for PortIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// What a port carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortKind {
    /// Control-flow arrival/departure, no data
    Flow,
    /// A typed value
    Data,
}

/// Behavioral flags of a port
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortFlags {
    /// Accepts multiple incoming links
    pub multi_link: bool,
    /// Carries an array of the declared element type
    pub array: bool,
    /// Default value is persisted with the node
    pub persistent: bool,
    /// Default value is editable in the editor
    pub editable: bool,
    /// Editor draws a spacer below this port
    pub spacer_below: bool,
}

impl PortFlags {
    /// No flags set
    pub fn none() -> Self {
        Self::default()
    }

    /// Allow multiple incoming links
    pub fn multi_link(mut self) -> Self {
        self.multi_link = true;
        self
    }

    /// Mark as array-typed
    pub fn array(mut self) -> Self {
        self.array = true;
        self
    }

    /// Persist the default value with the node
    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    /// Allow editing the default value
    pub fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    /// Draw a spacer below this port
    pub fn spacer_below(mut self) -> Self {
        self.spacer_below = true;
        self
    }
}

/// A port on a node
///
/// Flow ports carry no data identity; data ports always do. The
/// constructors uphold this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    /// Port name
    pub name: String,
    /// Flow or data
    pub kind: PortKind,
    /// Type identity (data ports only)
    pub data_type: Option<TypeId>,
    /// Behavioral flags
    pub flags: PortFlags,
}

impl Port {
    /// Create a flow port
    pub fn flow(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PortKind::Flow,
            data_type: None,
            flags: PortFlags::default(),
        }
    }

    /// Create a data port of the given type
    pub fn data(name: impl Into<String>, data_type: TypeId) -> Self {
        Self {
            name: name.into(),
            kind: PortKind::Data,
            data_type: Some(data_type),
            flags: PortFlags::default(),
        }
    }

    /// Set the flags
    pub fn with_flags(mut self, flags: PortFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Check whether this is a flow port
    pub fn is_flow(&self) -> bool {
        self.kind == PortKind::Flow
    }

    /// Check whether this is a data port
    pub fn is_data(&self) -> bool {
        self.kind == PortKind::Data
    }
}
