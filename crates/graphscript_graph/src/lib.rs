// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node abstraction and execution contract for GraphScript.
//!
//! This crate defines the minimal contract every node of a visual
//! node-graph scripting engine satisfies so it can be compiled and executed
//! inside a real-time host:
//! - Declarative port layouts derived from node configuration
//! - A flat node variant contract (layout, compile, persist, edit, remap)
//! - Compile-once binding of each node to an execution callback
//! - A synchronous runtime executor over type-erased port data
//! - Identity remapping for module duplication and merge
//!
//! ## Architecture
//!
//! Editors and hosts construct or load a [`ScriptGraph`] of [`Node`]s,
//! [`compile`](compiler::compile) it once into a [`CompiledGraph`], then
//! spawn independent [`GraphInstance`]s and drive them with a [`Runner`].

pub mod archive;
pub mod compiler;
pub mod edit;
pub mod factory;
pub mod graph;
pub mod layout;
pub mod node;
pub mod nodes;
pub mod port;
pub mod remap;
pub mod runtime;
pub mod variable;
pub mod view;

pub use archive::{NodeArchive, SavedNode, SerializationContext};
pub use compiler::{compile, CompileContext, CompileDiagnostic, CompileError, CompiledGraph};
pub use edit::{EditContext, EditError, TypeSelectionScope};
pub use factory::{CreationMenu, NodeCreator, NodeFactory, NodeOption};
pub use graph::{DataBinding, FlowLink, GraphError, SavedGraph, ScriptGraph, VariableDecl, VariableId};
pub use layout::{NodeColor, NodeLayout};
pub use node::{Node, NodeId, NodeTypeGuid, NodeVariant};
pub use nodes::{register_builtin_nodes, ArrayRemoveByValueNode};
pub use port::{Port, PortFlags, PortIndex, PortKind};
pub use remap::GuidRemapper;
pub use runtime::{
    Activation, GraphInstance, PortData, RunReport, Runner, RuntimeContext, RuntimeError,
    RuntimeResult, RuntimeStatus,
};
pub use variable::VariableData;
pub use view::ScriptView;
