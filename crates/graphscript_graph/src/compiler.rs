// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph compilation: binding node callbacks and type-checking port data.
//!
//! Compilation happens once per graph build. Every failure is collected as
//! a diagnostic keyed to the offending node; failing nodes are excluded
//! from the compiled table and the build reports all of them together.

use crate::graph::{DataBinding, ScriptGraph, VariableId};
use crate::layout::NodeLayout;
use crate::node::NodeId;
use crate::port::{Port, PortIndex};
use crate::runtime::{ExecuteFn, GraphInstance, PortData};
use crate::view::ScriptView;
use graphscript_value::{TypeId, ValueArray};
use std::collections::HashMap;

/// Error produced while compiling one node
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The node requires an element type and none is configured
    #[error("no element type configured")]
    MissingElementType,

    /// A referenced type does not resolve in the script view
    #[error("type {0} does not resolve in the current script view")]
    UnresolvedType(TypeId),

    /// The variant's compile step did not bind a callback
    #[error("no execution callback was bound")]
    CallbackNotBound,

    /// A data input is neither bound nor defaulted
    #[error("data input {port} ('{name}') is unbound and has no default")]
    UnboundInput {
        /// Offending input index
        port: PortIndex,
        /// Port name, for the diagnostic only
        name: String,
    },

    /// A binding references a variable that no longer exists
    #[error("bound variable {0:?} does not exist")]
    UnknownVariable(VariableId),

    /// Array-ness of a binding disagrees with the port
    #[error("binding for input {port} disagrees with the port on array-ness")]
    BindingKindMismatch {
        /// Offending input index
        port: PortIndex,
    },

    /// Bound data type disagrees with the port's declared type
    #[error("binding for input {port} has type {found}, expected {expected}")]
    BindingTypeMismatch {
        /// Offending input index
        port: PortIndex,
        /// The port's declared type
        expected: TypeId,
        /// The bound variable's type
        found: TypeId,
    },
}

/// A compile failure keyed to the node that caused it
#[derive(Debug, thiserror::Error)]
#[error("node {node:?}: {error}")]
pub struct CompileDiagnostic {
    /// The offending node
    pub node: NodeId,
    /// What went wrong
    pub error: CompileError,
}

/// Context a variant's compile step reads
///
/// Exposes the finalized layout so variants can fix the port indices their
/// callback will use, and the view for resolving configuration.
pub struct CompileContext<'a> {
    /// View the node's configuration resolves against
    pub view: &'a ScriptView<'a>,
    /// The node's finalized layout
    pub layout: &'a NodeLayout,
}

impl<'a> CompileContext<'a> {
    /// Create a compile context
    pub fn new(view: &'a ScriptView<'a>, layout: &'a NodeLayout) -> Self {
        Self { view, layout }
    }
}

/// Per-node binder handed to [`NodeVariant::compile`](crate::node::NodeVariant::compile)
#[derive(Default)]
pub struct NodeCompiler {
    callback: Option<ExecuteFn>,
}

impl NodeCompiler {
    /// Create an empty binder
    pub fn new() -> Self {
        Self { callback: None }
    }

    /// Record the callback the runtime must invoke for this node
    pub fn bind_callback(&mut self, callback: ExecuteFn) {
        self.callback = Some(callback);
    }

    /// The bound callback, if any
    pub fn callback(&self) -> Option<ExecuteFn> {
        self.callback
    }
}

/// One node's compiled form: its callback and resolved input slots
#[derive(Debug, Clone)]
pub(crate) struct CompiledNode {
    pub(crate) id: NodeId,
    pub(crate) callback: ExecuteFn,
    /// Storage slot per input port; flow inputs have none
    pub(crate) input_slots: Vec<Option<usize>>,
}

/// The immutable result of one graph build
///
/// Shared across every running instance; live data never is. Lifetime is
/// tied to the build; edits to the source graph make it stale.
#[derive(Debug, Clone)]
pub struct CompiledGraph {
    nodes: Vec<CompiledNode>,
    index: HashMap<NodeId, usize>,
    flow_edges: HashMap<(usize, PortIndex), (usize, PortIndex)>,
    variable_slots: HashMap<VariableId, usize>,
    template: Vec<PortData>,
}

impl CompiledGraph {
    /// Spawn an independent instance with its own port-value storage
    pub fn instantiate(&self) -> GraphInstance {
        GraphInstance::new(self.template.clone())
    }

    /// Number of compiled nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check whether a node made it into the compiled table
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Storage slot of a graph variable
    pub fn variable_slot(&self, id: VariableId) -> Option<usize> {
        self.variable_slots.get(&id).copied()
    }

    /// Storage slot backing a node's data input
    ///
    /// Hosts use this to seed or inspect live port data on an instance.
    pub fn input_slot(&self, node: NodeId, port: PortIndex) -> Option<usize> {
        let index = self.index_of(node)?;
        self.nodes[index]
            .input_slots
            .get(port.index())
            .copied()
            .flatten()
    }

    pub(crate) fn index_of(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub(crate) fn node(&self, index: usize) -> &CompiledNode {
        &self.nodes[index]
    }

    pub(crate) fn flow_edge(&self, from: usize, output: PortIndex) -> Option<(usize, PortIndex)> {
        self.flow_edges.get(&(from, output)).copied()
    }
}

/// Compile a graph against a script view
///
/// Visits every node before reporting, so one build surfaces every
/// diagnostic. Nodes that fail are excluded from the compiled table; a
/// build with any diagnostic is an error.
pub fn compile(
    graph: &ScriptGraph,
    view: &ScriptView<'_>,
) -> Result<CompiledGraph, Vec<CompileDiagnostic>> {
    let mut diagnostics = Vec::new();
    let mut template = Vec::new();
    let mut variable_slots = HashMap::new();

    for (id, decl) in graph.variables() {
        let slot = template.len();
        // An unresolvable variable type becomes an empty slot; bindings to
        // it are diagnosed per node below.
        let data = match view.resolve(&decl.ty) {
            Some(desc) if decl.array => PortData::Array(ValueArray::new(desc.id())),
            Some(desc) => PortData::Value(desc.default_value()),
            None => PortData::Empty,
        };
        template.push(data);
        variable_slots.insert(id, slot);
    }

    let mut nodes: Vec<CompiledNode> = Vec::new();
    let mut index = HashMap::new();

    for node in graph.nodes() {
        let before = diagnostics.len();
        let layout = node.layout();
        let ctx = CompileContext::new(view, layout);
        let mut binder = NodeCompiler::new();

        if let Err(error) = node.variant().compile(&ctx, &mut binder) {
            diagnostics.push(CompileDiagnostic {
                node: node.id,
                error,
            });
            continue;
        }
        let Some(callback) = binder.callback() else {
            diagnostics.push(CompileDiagnostic {
                node: node.id,
                error: CompileError::CallbackNotBound,
            });
            continue;
        };

        let mut input_slots = Vec::with_capacity(layout.inputs().len());
        for (i, port) in layout.inputs().iter().enumerate() {
            let port_index = PortIndex(i as u32);
            if port.is_flow() {
                input_slots.push(None);
                continue;
            }
            if let Some(binding) = graph.binding_for(node.id, port_index) {
                match check_binding(graph, view, port, port_index, binding, &variable_slots) {
                    Ok(slot) => input_slots.push(Some(slot)),
                    Err(error) => {
                        diagnostics.push(CompileDiagnostic {
                            node: node.id,
                            error,
                        });
                        input_slots.push(None);
                    }
                }
            } else if let Some(default) = layout.input_default(port_index) {
                let slot = template.len();
                template.push(PortData::Value(default.clone()));
                input_slots.push(Some(slot));
            } else {
                diagnostics.push(CompileDiagnostic {
                    node: node.id,
                    error: CompileError::UnboundInput {
                        port: port_index,
                        name: port.name.clone(),
                    },
                });
                input_slots.push(None);
            }
        }

        if diagnostics.len() > before {
            continue;
        }
        index.insert(node.id, nodes.len());
        nodes.push(CompiledNode {
            id: node.id,
            callback,
            input_slots,
        });
    }

    let mut flow_edges = HashMap::new();
    for link in graph.flow_links() {
        let (Some(&from), Some(&to)) = (index.get(&link.from_node), index.get(&link.to_node))
        else {
            // Endpoint was excluded; its diagnostic already covers this.
            continue;
        };
        flow_edges.insert((from, link.from_port), (to, link.to_port));
    }

    if !diagnostics.is_empty() {
        return Err(diagnostics);
    }
    Ok(CompiledGraph {
        nodes,
        index,
        flow_edges,
        variable_slots,
        template,
    })
}

fn check_binding(
    graph: &ScriptGraph,
    view: &ScriptView<'_>,
    port: &Port,
    port_index: PortIndex,
    binding: &DataBinding,
    variable_slots: &HashMap<VariableId, usize>,
) -> Result<usize, CompileError> {
    let decl = graph
        .variable(binding.variable)
        .ok_or(CompileError::UnknownVariable(binding.variable))?;
    if view.resolve(&decl.ty).is_none() {
        return Err(CompileError::UnresolvedType(decl.ty.type_id));
    }
    if port.flags.array != decl.array {
        return Err(CompileError::BindingKindMismatch { port: port_index });
    }
    let expected = port.data_type.unwrap_or(TypeId::NIL);
    if expected != decl.ty.type_id {
        return Err(CompileError::BindingTypeMismatch {
            port: port_index,
            expected,
            found: decl.ty.type_id,
        });
    }
    variable_slots
        .get(&binding.variable)
        .copied()
        .ok_or(CompileError::UnknownVariable(binding.variable))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::VariableDecl;
    use crate::node::Node;
    use crate::nodes::ArrayRemoveByValueNode;
    use graphscript_value::{ElementRef, TypeDesc, TypeKind, TypeRegistry};

    const INT: TypeId = TypeId::from_u128(0x301);
    const FLOAT: TypeId = TypeId::from_u128(0x302);

    fn registries() -> (TypeRegistry, TypeRegistry) {
        let mut env = TypeRegistry::new();
        env.register(TypeDesc::new(INT, "Int", TypeKind::Data, 0i64));
        env.register(TypeDesc::new(FLOAT, "Float", TypeKind::Data, 0.0f64));
        (env, TypeRegistry::new())
    }

    #[test]
    fn test_unconfigured_node_is_a_build_diagnostic() {
        let (env, script) = registries();
        let view = ScriptView::new(&env, &script);

        let mut graph = ScriptGraph::new("test");
        let node = graph.add_node(Node::new(
            NodeId::new(),
            Box::new(ArrayRemoveByValueNode::new()),
        ));

        let diagnostics = compile(&graph, &view).unwrap_err();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].node, node);
        assert!(matches!(
            diagnostics[0].error,
            CompileError::MissingElementType
        ));
    }

    #[test]
    fn test_unbound_array_input_is_a_build_diagnostic() {
        let (env, script) = registries();
        let view = ScriptView::new(&env, &script);

        let mut graph = ScriptGraph::new("test");
        graph.add_node(Node::new(
            NodeId::new(),
            Box::new(ArrayRemoveByValueNode::with_reference(
                ElementRef::env(INT),
                &view,
            )),
        ));

        let diagnostics = compile(&graph, &view).unwrap_err();
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(
            diagnostics[0].error,
            CompileError::UnboundInput { .. }
        ));
    }

    #[test]
    fn test_binding_type_mismatch_is_a_build_diagnostic() {
        let (env, script) = registries();
        let view = ScriptView::new(&env, &script);

        let mut graph = ScriptGraph::new("test");
        let node = graph.add_node(Node::new(
            NodeId::new(),
            Box::new(ArrayRemoveByValueNode::with_reference(
                ElementRef::env(INT),
                &view,
            )),
        ));
        // Array of the wrong element type; no coercion happens at build time.
        let floats = graph.add_variable(VariableDecl {
            name: "Floats".to_string(),
            ty: ElementRef::env(FLOAT),
            array: true,
        });
        graph
            .bind_input(node, ArrayRemoveByValueNode::IN_ARRAY, floats)
            .unwrap();

        let diagnostics = compile(&graph, &view).unwrap_err();
        assert!(diagnostics.iter().any(|d| match &d.error {
            CompileError::BindingTypeMismatch {
                expected, found, ..
            } => *expected == INT && *found == FLOAT,
            _ => false,
        }));
    }

    #[test]
    fn test_scalar_binding_to_array_port_is_a_kind_mismatch() {
        let (env, script) = registries();
        let view = ScriptView::new(&env, &script);

        let mut graph = ScriptGraph::new("test");
        let node = graph.add_node(Node::new(
            NodeId::new(),
            Box::new(ArrayRemoveByValueNode::with_reference(
                ElementRef::env(INT),
                &view,
            )),
        ));
        let scalar = graph.add_variable(VariableDecl {
            name: "Number".to_string(),
            ty: ElementRef::env(INT),
            array: false,
        });
        graph
            .bind_input(node, ArrayRemoveByValueNode::IN_ARRAY, scalar)
            .unwrap();

        let diagnostics = compile(&graph, &view).unwrap_err();
        assert!(diagnostics
            .iter()
            .any(|d| matches!(d.error, CompileError::BindingKindMismatch { .. })));
    }

    #[test]
    fn test_successful_build_resolves_slots() {
        let (env, script) = registries();
        let view = ScriptView::new(&env, &script);

        let mut graph = ScriptGraph::new("test");
        let node = graph.add_node(Node::new(
            NodeId::new(),
            Box::new(ArrayRemoveByValueNode::with_reference(
                ElementRef::env(INT),
                &view,
            )),
        ));
        let numbers = graph.add_variable(VariableDecl {
            name: "Numbers".to_string(),
            ty: ElementRef::env(INT),
            array: true,
        });
        graph
            .bind_input(node, ArrayRemoveByValueNode::IN_ARRAY, numbers)
            .unwrap();

        let compiled = compile(&graph, &view).unwrap();
        assert_eq!(compiled.node_count(), 1);
        assert!(compiled.contains_node(node));

        // The array input shares the variable's slot; the value input got a
        // constant slot seeded from its default.
        let array_slot = compiled
            .input_slot(node, ArrayRemoveByValueNode::IN_ARRAY)
            .unwrap();
        assert_eq!(compiled.variable_slot(numbers), Some(array_slot));
        assert!(compiled
            .input_slot(node, ArrayRemoveByValueNode::IN_VALUE)
            .is_some());
        assert!(compiled
            .input_slot(node, ArrayRemoveByValueNode::IN)
            .is_none());
    }
}
