// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph container: nodes, variables, flow links, and data bindings.

use crate::archive::{SavedNode, SerializationContext};
use crate::factory::NodeFactory;
use crate::node::{Node, NodeId};
use crate::port::PortIndex;
use crate::remap::GuidRemapper;
use graphscript_value::ElementRef;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a graph variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariableId(pub Uuid);

impl VariableId {
    /// Create a new random variable ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for VariableId {
    fn default() -> Self {
        Self::new()
    }
}

/// Declaration of a graph variable: the storage slot live data binds to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDecl {
    /// Display name
    pub name: String,
    /// Element type of the stored value
    pub ty: ElementRef,
    /// Whether the variable holds an array of the element type
    pub array: bool,
}

/// A control-flow edge from a flow output to a flow input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowLink {
    /// Source node
    pub from_node: NodeId,
    /// Source flow output
    pub from_port: PortIndex,
    /// Target node
    pub to_node: NodeId,
    /// Target flow input
    pub to_port: PortIndex,
}

/// A binding from a node's data input to a graph variable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataBinding {
    /// Bound node
    pub node: NodeId,
    /// Bound data input
    pub input: PortIndex,
    /// Variable supplying the data
    pub variable: VariableId,
}

/// Error when editing graph structure
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Node not found
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Port not found on the node
    #[error("port {port} not found on node {node:?}")]
    PortNotFound {
        /// Node looked up
        node: NodeId,
        /// Offending port index
        port: PortIndex,
    },

    /// Port is of the wrong kind for the operation
    #[error("port {port} on node {node:?} is not a {expected} port")]
    PortKindMismatch {
        /// Node looked up
        node: NodeId,
        /// Offending port index
        port: PortIndex,
        /// Expected kind, `"flow"` or `"data"`
        expected: &'static str,
    },

    /// Flow port already linked
    #[error("flow port {port} on node {node:?} is already linked")]
    PortAlreadyLinked {
        /// Node looked up
        node: NodeId,
        /// Offending port index
        port: PortIndex,
    },

    /// Variable not found
    #[error("variable not found: {0:?}")]
    UnknownVariable(VariableId),
}

/// A script graph: node instances plus the structure connecting them
///
/// Graph execution structure only; rendering and interaction live with the
/// editor, which consumes the layouts this container derives.
#[derive(Debug, Default)]
pub struct ScriptGraph {
    /// Graph name
    pub name: String,
    nodes: IndexMap<NodeId, Node>,
    variables: IndexMap<VariableId, VariableDecl>,
    flow_links: Vec<FlowLink>,
    bindings: Vec<DataBinding>,
}

impl ScriptGraph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            variables: IndexMap::new(),
            flow_links: Vec::new(),
            bindings: Vec::new(),
        }
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node along with its links and bindings
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.flow_links
            .retain(|l| l.from_node != node_id && l.to_node != node_id);
        self.bindings.retain(|b| b.node != node_id);
        self.nodes.swap_remove(&node_id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Get all nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Declare a variable
    pub fn add_variable(&mut self, decl: VariableDecl) -> VariableId {
        let id = VariableId::new();
        self.variables.insert(id, decl);
        id
    }

    /// Get a variable declaration
    pub fn variable(&self, id: VariableId) -> Option<&VariableDecl> {
        self.variables.get(&id)
    }

    /// Get all variables in declaration order
    pub fn variables(&self) -> impl Iterator<Item = (VariableId, &VariableDecl)> {
        self.variables.iter().map(|(id, decl)| (*id, decl))
    }

    /// Link a flow output to a flow input
    ///
    /// The source output may carry at most one outgoing link; the target
    /// input accepts multiple incoming links only when flagged multi-link.
    pub fn connect_flow(
        &mut self,
        from_node: NodeId,
        from_port: PortIndex,
        to_node: NodeId,
        to_port: PortIndex,
    ) -> Result<(), GraphError> {
        let source = self
            .nodes
            .get(&from_node)
            .ok_or(GraphError::NodeNotFound(from_node))?;
        let target = self
            .nodes
            .get(&to_node)
            .ok_or(GraphError::NodeNotFound(to_node))?;

        let out_port = source
            .layout()
            .output(from_port)
            .ok_or(GraphError::PortNotFound {
                node: from_node,
                port: from_port,
            })?;
        let in_port = target
            .layout()
            .input(to_port)
            .ok_or(GraphError::PortNotFound {
                node: to_node,
                port: to_port,
            })?;

        if !out_port.is_flow() {
            return Err(GraphError::PortKindMismatch {
                node: from_node,
                port: from_port,
                expected: "flow",
            });
        }
        if !in_port.is_flow() {
            return Err(GraphError::PortKindMismatch {
                node: to_node,
                port: to_port,
                expected: "flow",
            });
        }

        // One continuation per flow output.
        if self
            .flow_links
            .iter()
            .any(|l| l.from_node == from_node && l.from_port == from_port)
        {
            return Err(GraphError::PortAlreadyLinked {
                node: from_node,
                port: from_port,
            });
        }
        if !in_port.flags.multi_link
            && self
                .flow_links
                .iter()
                .any(|l| l.to_node == to_node && l.to_port == to_port)
        {
            return Err(GraphError::PortAlreadyLinked {
                node: to_node,
                port: to_port,
            });
        }

        self.flow_links.push(FlowLink {
            from_node,
            from_port,
            to_node,
            to_port,
        });
        Ok(())
    }

    /// Bind a node's data input to a variable
    ///
    /// Rebinding an input replaces its previous binding. Type compatibility
    /// is checked at graph build time, not here.
    pub fn bind_input(
        &mut self,
        node: NodeId,
        input: PortIndex,
        variable: VariableId,
    ) -> Result<(), GraphError> {
        let target = self.nodes.get(&node).ok_or(GraphError::NodeNotFound(node))?;
        let port = target
            .layout()
            .input(input)
            .ok_or(GraphError::PortNotFound { node, port: input })?;
        if !port.is_data() {
            return Err(GraphError::PortKindMismatch {
                node,
                port: input,
                expected: "data",
            });
        }
        if !self.variables.contains_key(&variable) {
            return Err(GraphError::UnknownVariable(variable));
        }

        self.bindings.retain(|b| !(b.node == node && b.input == input));
        self.bindings.push(DataBinding {
            node,
            input,
            variable,
        });
        Ok(())
    }

    /// All flow links
    pub fn flow_links(&self) -> &[FlowLink] {
        &self.flow_links
    }

    /// All data bindings
    pub fn bindings(&self) -> &[DataBinding] {
        &self.bindings
    }

    /// The binding feeding a node's data input, if any
    pub fn binding_for(&self, node: NodeId, input: PortIndex) -> Option<&DataBinding> {
        self.bindings
            .iter()
            .find(|b| b.node == node && b.input == input)
    }

    /// Rederive every node's layout
    ///
    /// Run after loading or after remapping all nodes.
    pub fn rebuild_layouts(&mut self) {
        for node in self.nodes.values_mut() {
            node.rebuild_layout();
        }
    }

    /// Rewrite stored identities across all nodes and variables
    ///
    /// Layout rebuild is a separate, explicit step; call
    /// [`rebuild_layouts`](Self::rebuild_layouts) once every element of the
    /// owning module has been remapped.
    pub fn remap_dependencies(&mut self, remapper: &GuidRemapper) {
        for node in self.nodes.values_mut() {
            node.remap_dependencies(remapper);
        }
        for decl in self.variables.values_mut() {
            if !decl.ty.is_empty() {
                decl.ty.type_id = remapper.remap_type(decl.ty.type_id);
            }
        }
    }

    /// Persist the graph
    pub fn save(&self, ctx: &SerializationContext<'_>) -> SavedGraph {
        SavedGraph {
            name: self.name.clone(),
            nodes: self.nodes.values().map(|n| n.save(ctx)).collect(),
            variables: self.variables.clone(),
            flow_links: self.flow_links.clone(),
            bindings: self.bindings.clone(),
        }
    }

    /// Restore a graph from its persisted form
    ///
    /// Pass 1 constructs every node and runs its dependency load before any
    /// other load step, since types can be forward-referenced; pass 2
    /// derives layouts and revalidates links and bindings. Records that no
    /// longer resolve (unknown variants, dangling endpoints) are dropped
    /// with a warning, never an error.
    pub fn load(
        saved: &SavedGraph,
        factory: &NodeFactory,
        ctx: &SerializationContext<'_>,
    ) -> ScriptGraph {
        let mut graph = ScriptGraph::new(saved.name.clone());
        graph.variables = saved.variables.clone();

        for record in &saved.nodes {
            let Some(mut node) = factory.create_node(record.variant, record.id) else {
                tracing::warn!(
                    "Unknown node variant {}; dropping node {:?}",
                    record.variant,
                    record.id
                );
                continue;
            };
            node.position = record.position;
            node.load_dependencies(&record.data, ctx);
            graph.add_node(node);
        }

        graph.rebuild_layouts();

        for link in &saved.flow_links {
            if let Err(error) =
                graph.connect_flow(link.from_node, link.from_port, link.to_node, link.to_port)
            {
                tracing::warn!("Dropping persisted flow link: {error}");
            }
        }
        for binding in &saved.bindings {
            if let Err(error) = graph.bind_input(binding.node, binding.input, binding.variable) {
                tracing::warn!("Dropping persisted data binding: {error}");
            }
        }

        graph
    }
}

/// Persisted form of a [`ScriptGraph`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedGraph {
    /// Graph name
    pub name: String,
    /// Node records in insertion order
    pub nodes: Vec<SavedNode>,
    /// Variable declarations
    pub variables: IndexMap<VariableId, VariableDecl>,
    /// Flow links
    pub flow_links: Vec<FlowLink>,
    /// Data bindings
    pub bindings: Vec<DataBinding>,
}

impl SavedGraph {
    /// Serialize to RON text
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Deserialize from RON text
    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }
}
