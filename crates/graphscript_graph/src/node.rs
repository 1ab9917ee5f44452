// SPDX-License-Identifier: MIT OR Apache-2.0
//! The node variant contract and the node instance wrapper.

use crate::archive::{NodeArchive, SavedNode, SerializationContext};
use crate::compiler::{CompileContext, CompileError, NodeCompiler};
use crate::edit::{EditContext, EditError};
use crate::layout::NodeLayout;
use crate::remap::GuidRemapper;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use uuid::Uuid;

/// Unique identifier for a node instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable identity of a node *variant* (not an instance)
///
/// Used for creation-menu registration, palette lookup, and persisted-format
/// round-tripping. Built from a fixed 128-bit value so it survives builds
/// and saved data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeTypeGuid(pub Uuid);

impl NodeTypeGuid {
    /// Create a variant GUID from a fixed 128-bit value
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }
}

impl std::fmt::Display for NodeTypeGuid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Contract every node variant implements
///
/// A variant holds configuration state, derives its port layout from it, and
/// supplies a compiled callback. Variants are polymorphic behind this one
/// flat interface.
pub trait NodeVariant: Debug + Send + Sync {
    /// Stable identity of the variant
    fn type_guid(&self) -> NodeTypeGuid;

    /// Build the port layout from the current configuration
    ///
    /// Must be deterministic and pure with respect to the configuration:
    /// same configuration, identical ordered port list.
    fn create_layout(&self, layout: &mut NodeLayout);

    /// Register the variant's execution callback with the compiler
    ///
    /// Fails with a build diagnostic (never a panic) when required
    /// configuration is absent.
    fn compile(
        &self,
        ctx: &CompileContext<'_>,
        compiler: &mut NodeCompiler,
    ) -> Result<(), CompileError>;

    /// Persist the configuration needed to rebuild the layout
    ///
    /// The layout itself is never saved; it is always rederived.
    fn save(&self, archive: &mut NodeArchive, ctx: &SerializationContext<'_>);

    /// Restore configuration from a persisted record
    ///
    /// Runs before any other node's load step that might reference this
    /// node's declared type, since types can be forward-referenced.
    /// Unresolvable identities degrade to the unconfigured state with a
    /// warning, never an error.
    fn load_dependencies(&mut self, archive: &NodeArchive, ctx: &SerializationContext<'_>);

    /// Interactive configuration surface
    ///
    /// Selectable types are restricted to the sets declared through the
    /// context's scoped guard.
    fn edit(&mut self, archive: &mut NodeArchive, ctx: &EditContext<'_>) -> Result<(), EditError>;

    /// Rewrite stored identities through an old-to-new mapping
    ///
    /// Layout rebuild is a separate, explicit step the owning graph runs
    /// after remapping all nodes.
    fn remap_dependencies(&mut self, remapper: &GuidRemapper);
}

/// A node instance in a graph: identity, position, variant state, and the
/// derived port layout
#[derive(Debug)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Position in the graph UI
    pub position: [f32; 2],
    variant: Box<dyn NodeVariant>,
    layout: NodeLayout,
}

impl Node {
    /// Create a node from a variant, deriving its layout
    pub fn new(id: NodeId, variant: Box<dyn NodeVariant>) -> Self {
        let mut layout = NodeLayout::new();
        variant.create_layout(&mut layout);
        Self {
            id,
            position: [0.0, 0.0],
            variant,
            layout,
        }
    }

    /// Set the position
    pub fn with_position(mut self, position: [f32; 2]) -> Self {
        self.position = position;
        self
    }

    /// The variant behind this instance
    pub fn variant(&self) -> &dyn NodeVariant {
        self.variant.as_ref()
    }

    /// The derived port layout
    pub fn layout(&self) -> &NodeLayout {
        &self.layout
    }

    /// Rederive the layout from the current configuration
    ///
    /// Any previously compiled state for this node is stale afterwards; the
    /// owning graph must recompile before the next run.
    pub fn rebuild_layout(&mut self) {
        self.layout = NodeLayout::new();
        self.variant.create_layout(&mut self.layout);
    }

    /// Persist this node as a saved record
    pub fn save(&self, ctx: &SerializationContext<'_>) -> SavedNode {
        let mut data = NodeArchive::new();
        self.variant.save(&mut data, ctx);
        SavedNode {
            id: self.id,
            variant: self.variant.type_guid(),
            position: self.position,
            data,
        }
    }

    /// Restore the variant's configuration from a saved record
    pub fn load_dependencies(&mut self, archive: &NodeArchive, ctx: &SerializationContext<'_>) {
        self.variant.load_dependencies(archive, ctx);
    }

    /// Edit the variant's configuration, then rederive the layout
    pub fn edit(
        &mut self,
        archive: &mut NodeArchive,
        ctx: &EditContext<'_>,
    ) -> Result<(), EditError> {
        self.variant.edit(archive, ctx)?;
        self.rebuild_layout();
        Ok(())
    }

    /// Rewrite the variant's stored identities
    pub fn remap_dependencies(&mut self, remapper: &GuidRemapper) {
        self.variant.remap_dependencies(remapper);
    }
}
