// SPDX-License-Identifier: MIT OR Apache-2.0
//! Registry of node variants and the creation-menu model.
//!
//! The factory is an explicit registry object constructed at startup and
//! passed by reference to anything that enumerates or instantiates
//! variants; it is populated once and read-only thereafter. There is no
//! process-global mutable state.

use crate::node::{Node, NodeId, NodeTypeGuid};
use crate::view::ScriptView;
use indexmap::IndexMap;

/// Command closure instantiating a node at a position
pub type NodeCommand = Box<dyn Fn([f32; 2]) -> Node + Send + Sync>;

/// One entry in the node-creation menu
pub struct NodeOption {
    /// Menu label, e.g. `"Core::Int::Array::Remove By Value"`
    pub label: String,
    /// One-line description
    pub description: String,
    /// Optional icon name
    pub icon: Option<String>,
    command: NodeCommand,
}

impl NodeOption {
    /// Create a menu option
    pub fn new(
        label: impl Into<String>,
        description: impl Into<String>,
        command: NodeCommand,
    ) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
            icon: None,
            command,
        }
    }

    /// Set the icon name
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Run the command, instantiating a configured node at a position
    pub fn instantiate(&self, position: [f32; 2]) -> Node {
        (self.command)(position)
    }
}

impl std::fmt::Debug for NodeOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeOption")
            .field("label", &self.label)
            .field("description", &self.description)
            .field("icon", &self.icon)
            .finish_non_exhaustive()
    }
}

/// The node-creation menu model
///
/// Creators contribute one base option per variant plus one option per
/// qualifying concrete data type discoverable in the current script view.
#[derive(Debug, Default)]
pub struct CreationMenu {
    options: Vec<NodeOption>,
}

impl CreationMenu {
    /// Create an empty menu
    pub fn new() -> Self {
        Self {
            options: Vec::new(),
        }
    }

    /// Add an option
    pub fn add_option(&mut self, option: NodeOption) {
        self.options.push(option);
    }

    /// Options in contribution order
    pub fn options(&self) -> &[NodeOption] {
        &self.options
    }

    /// Find an option by label
    pub fn option(&self, label: &str) -> Option<&NodeOption> {
        self.options.iter().find(|o| o.label == label)
    }

    /// Number of options
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Check whether the menu is empty
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Per-variant creator registered with the factory
///
/// Supplies default construction for persisted-format deserialization and
/// contributes the variant's creation-menu options.
pub trait NodeCreator: Send + Sync {
    /// GUID of the variant this creator builds
    fn type_guid(&self) -> NodeTypeGuid;

    /// Build a default instance, as persisted-format deserialization needs
    fn create(&self, id: NodeId) -> Node;

    /// Contribute creation-menu options for the current script view
    fn populate_creation_menu(&self, menu: &mut CreationMenu, view: &ScriptView<'_>);
}

/// Registry of node creators keyed by variant GUID
pub struct NodeFactory {
    creators: IndexMap<NodeTypeGuid, Box<dyn NodeCreator>>,
}

impl NodeFactory {
    /// Create a new empty factory
    pub fn new() -> Self {
        Self {
            creators: IndexMap::new(),
        }
    }

    /// Register a creator
    ///
    /// Registering a variant GUID twice replaces the previous creator.
    pub fn register_creator(&mut self, creator: Box<dyn NodeCreator>) {
        let guid = creator.type_guid();
        if self.creators.insert(guid, creator).is_some() {
            tracing::warn!("Node variant {guid} registered twice; replacing previous creator");
        }
    }

    /// Get a creator by variant GUID
    pub fn creator(&self, guid: NodeTypeGuid) -> Option<&dyn NodeCreator> {
        self.creators.get(&guid).map(Box::as_ref)
    }

    /// Check whether a variant is registered
    pub fn contains(&self, guid: NodeTypeGuid) -> bool {
        self.creators.contains_key(&guid)
    }

    /// Build a default instance of a variant
    ///
    /// Returns `None` for unknown GUIDs.
    pub fn create_node(&self, guid: NodeTypeGuid, id: NodeId) -> Option<Node> {
        self.creators.get(&guid).map(|creator| creator.create(id))
    }

    /// Populate a creation menu from every registered creator
    pub fn populate_creation_menu(&self, view: &ScriptView<'_>) -> CreationMenu {
        let mut menu = CreationMenu::new();
        for creator in self.creators.values() {
            creator.populate_creation_menu(&mut menu, view);
        }
        menu
    }

    /// Number of registered creators
    pub fn len(&self) -> usize {
        self.creators.len()
    }

    /// Check whether no creators are registered
    pub fn is_empty(&self) -> bool {
        self.creators.is_empty()
    }
}

impl Default for NodeFactory {
    fn default() -> Self {
        Self::new()
    }
}
