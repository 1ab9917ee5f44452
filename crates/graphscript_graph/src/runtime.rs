// SPDX-License-Identifier: MIT OR Apache-2.0
//! Runtime execution of compiled graphs.
//!
//! Single-threaded cooperative model: one node's callback fully completes
//! before the executor proceeds to the next, and callbacks never block or
//! suspend. The compiled table is shared immutably; every instance owns its
//! own port-value storage.

use crate::compiler::CompiledGraph;
use crate::node::NodeId;
use crate::port::PortIndex;
use graphscript_value::{Value, ValueArray};

/// Live data held by one storage slot
#[derive(Debug, Default, Clone, PartialEq)]
pub enum PortData {
    /// Nothing bound
    #[default]
    Empty,
    /// A single value
    Value(Value),
    /// A homogeneous array
    Array(ValueArray),
}

/// Parameters describing how a node was activated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Activation {
    /// The flow input that fired
    pub port: PortIndex,
}

impl Activation {
    /// Activation through a flow input
    pub fn new(port: PortIndex) -> Self {
        Self { port }
    }
}

/// What the executor should do after a callback returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeStatus {
    /// Resume traversal from the result's output port
    Continue,
    /// Stop traversal
    End,
}

/// Result of one node callback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuntimeResult {
    /// Executor directive
    pub status: RuntimeStatus,
    /// Flow output traversal resumes from when continuing
    pub output: PortIndex,
}

impl RuntimeResult {
    /// Continue traversal from a flow output
    pub fn continue_from(output: PortIndex) -> Self {
        Self {
            status: RuntimeStatus::Continue,
            output,
        }
    }

    /// Stop traversal
    pub fn end() -> Self {
        Self {
            status: RuntimeStatus::End,
            output: PortIndex(0),
        }
    }
}

/// Callback bound at compile time and invoked at run time
///
/// A plain function pointer: the compiled table stays immutable and
/// trivially shareable across graph instances.
pub type ExecuteFn = fn(&mut RuntimeContext<'_>, &Activation) -> RuntimeResult;

/// Per-invocation view of the running node's port data
///
/// Exposes indexed lookup only; a callback cannot reach sibling nodes and
/// must not retain references beyond its invocation. Unbound or mismatched
/// access is a contract violation the compiler was responsible for
/// preventing, so the accessors abort rather than recover.
pub struct RuntimeContext<'a> {
    storage: &'a mut [PortData],
    input_slots: &'a [Option<usize>],
}

impl<'a> RuntimeContext<'a> {
    pub(crate) fn new(storage: &'a mut [PortData], input_slots: &'a [Option<usize>]) -> Self {
        Self {
            storage,
            input_slots,
        }
    }

    fn slot(&self, port: PortIndex) -> usize {
        match self.input_slots.get(port.index()) {
            Some(Some(slot)) => *slot,
            _ => panic!(
                "data input {port} is not bound to a storage slot; \
                 the graph compiler must reject such bindings"
            ),
        }
    }

    /// The value bound to a data input
    ///
    /// Panics when the slot does not hold a single value; this indicates a
    /// compiler or editor bug, not a runtime condition.
    pub fn input_value(&self, port: PortIndex) -> &Value {
        let slot = self.slot(port);
        match &self.storage[slot] {
            PortData::Value(value) => value,
            other => panic!("data input {port} holds {other:?}, expected a value"),
        }
    }

    /// The array bound to a data input, for in-place mutation
    ///
    /// Mutation is visible to every holder of the same slot. Panics when
    /// the slot does not hold an array.
    pub fn input_array_mut(&mut self, port: PortIndex) -> &mut ValueArray {
        let slot = self.slot(port);
        match &mut self.storage[slot] {
            PortData::Array(array) => array,
            other => panic!("data input {port} holds {other:?}, expected an array"),
        }
    }
}

/// Error type for graph runs
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The entry node is not part of the compiled graph
    #[error("entry node {0:?} is not part of the compiled graph")]
    UnknownNode(NodeId),

    /// Traversal exceeded the runner's step ceiling
    #[error("traversal exceeded the step limit of {0}")]
    StepLimitExceeded(usize),
}

/// Summary of one graph run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunReport {
    /// Callbacks invoked
    pub steps: usize,
    /// The node traversal stopped at
    pub last_node: NodeId,
    /// Whether the run stopped at an abort check
    pub aborted: bool,
}

/// Per-running-entity live data
///
/// Spawned from a compiled graph's storage template. Instances are fully
/// independent; nothing live is shared between them.
#[derive(Debug, Clone)]
pub struct GraphInstance {
    storage: Vec<PortData>,
}

impl GraphInstance {
    pub(crate) fn new(storage: Vec<PortData>) -> Self {
        Self { storage }
    }

    /// Borrow a storage slot
    pub fn slot(&self, index: usize) -> Option<&PortData> {
        self.storage.get(index)
    }

    /// Mutably borrow a storage slot
    pub fn slot_mut(&mut self, index: usize) -> Option<&mut PortData> {
        self.storage.get_mut(index)
    }

    /// Borrow a slot's array, if it holds one
    pub fn array(&self, index: usize) -> Option<&ValueArray> {
        match self.storage.get(index)? {
            PortData::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Mutably borrow a slot's array, if it holds one
    ///
    /// Hosts use this to seed variable data before a run.
    pub fn array_mut(&mut self, index: usize) -> Option<&mut ValueArray> {
        match self.storage.get_mut(index)? {
            PortData::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Borrow a slot's value, if it holds one
    pub fn value(&self, index: usize) -> Option<&Value> {
        match self.storage.get(index)? {
            PortData::Value(value) => Some(value),
            _ => None,
        }
    }
}

/// Default ceiling on callbacks per run
pub const DEFAULT_STEP_LIMIT: usize = 100_000;

/// Synchronous executor over one compiled graph
pub struct Runner<'a> {
    compiled: &'a CompiledGraph,
    step_limit: usize,
}

impl<'a> Runner<'a> {
    /// Create a runner with the default step limit
    pub fn new(compiled: &'a CompiledGraph) -> Self {
        Self {
            compiled,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }

    /// Override the step ceiling
    pub fn with_step_limit(mut self, step_limit: usize) -> Self {
        self.step_limit = step_limit;
        self
    }

    /// Run from an entry node until traversal stops
    pub fn run(
        &self,
        instance: &mut GraphInstance,
        entry: NodeId,
    ) -> Result<RunReport, RuntimeError> {
        self.run_with_abort(instance, entry, || false)
    }

    /// Run from an entry node, checking for abort between nodes
    ///
    /// The predicate is consulted at node-to-node transitions only; a
    /// callback in flight always completes.
    pub fn run_with_abort(
        &self,
        instance: &mut GraphInstance,
        entry: NodeId,
        mut should_abort: impl FnMut() -> bool,
    ) -> Result<RunReport, RuntimeError> {
        let mut current = self
            .compiled
            .index_of(entry)
            .ok_or(RuntimeError::UnknownNode(entry))?;
        let mut activation = Activation::new(PortIndex(0));
        let mut steps = 0usize;

        loop {
            if should_abort() {
                return Ok(RunReport {
                    steps,
                    last_node: self.compiled.node(current).id,
                    aborted: true,
                });
            }
            if steps >= self.step_limit {
                return Err(RuntimeError::StepLimitExceeded(self.step_limit));
            }

            let node = self.compiled.node(current);
            let result = {
                let mut ctx = RuntimeContext::new(&mut instance.storage, &node.input_slots);
                (node.callback)(&mut ctx, &activation)
            };
            steps += 1;

            match result.status {
                RuntimeStatus::End => {
                    return Ok(RunReport {
                        steps,
                        last_node: node.id,
                        aborted: false,
                    });
                }
                RuntimeStatus::Continue => {
                    match self.compiled.flow_edge(current, result.output) {
                        Some((next, to_port)) => {
                            current = next;
                            activation = Activation::new(to_port);
                        }
                        // No continuation from this output; the run is done.
                        None => {
                            return Ok(RunReport {
                                steps,
                                last_node: node.id,
                                aborted: false,
                            });
                        }
                    }
                }
            }
        }
    }
}
