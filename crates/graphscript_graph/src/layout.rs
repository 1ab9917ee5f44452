// SPDX-License-Identifier: MIT OR Apache-2.0
//! Declarative port layout for a node.
//!
//! A layout is always rederived from the node's configuration, never
//! persisted. Same configuration yields the identical ordered port list.

use crate::port::{Port, PortFlags, PortIndex};
use graphscript_value::{TypeId, Value};
use serde::{Deserialize, Serialize};

/// Palette tag the editor uses to tint a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeColor {
    /// Red
    Red,
    /// Green
    Green,
    /// Blue
    Blue,
    /// Yellow
    Yellow,
    /// Orange
    Orange,
    /// Purple
    Purple,
}

/// Ordered description of a node's ports
///
/// Built once by [`NodeVariant::create_layout`](crate::node::NodeVariant)
/// whenever the node's configuration becomes known. Input defaults are kept
/// alongside the input list; flow ports never have one.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    name: String,
    color: Option<NodeColor>,
    inputs: Vec<Port>,
    outputs: Vec<Port>,
    input_defaults: Vec<Option<Value>>,
}

impl NodeLayout {
    /// Create an empty layout
    pub fn new() -> Self {
        Self {
            name: String::new(),
            color: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            input_defaults: Vec::new(),
        }
    }

    /// Set the display name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Set the palette color
    pub fn set_color(&mut self, color: NodeColor) {
        self.color = Some(color);
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Palette color, if set
    pub fn color(&self) -> Option<NodeColor> {
        self.color
    }

    /// Add an input port, returning its index
    pub fn add_input(&mut self, port: Port) -> PortIndex {
        self.inputs.push(port);
        self.input_defaults.push(None);
        PortIndex(self.inputs.len() as u32 - 1)
    }

    /// Add an output port, returning its index
    pub fn add_output(&mut self, port: Port) -> PortIndex {
        self.outputs.push(port);
        PortIndex(self.outputs.len() as u32 - 1)
    }

    /// Add a flow input
    pub fn add_flow_input(&mut self, name: impl Into<String>, flags: PortFlags) -> PortIndex {
        self.add_input(Port::flow(name).with_flags(flags))
    }

    /// Add a flow output
    pub fn add_flow_output(&mut self, name: impl Into<String>, flags: PortFlags) -> PortIndex {
        self.add_output(Port::flow(name).with_flags(flags))
    }

    /// Add a data input
    pub fn add_data_input(
        &mut self,
        name: impl Into<String>,
        data_type: TypeId,
        flags: PortFlags,
    ) -> PortIndex {
        self.add_input(Port::data(name, data_type).with_flags(flags))
    }

    /// Add a data input pre-populated with a default value
    ///
    /// The port's type identity is taken from the default value.
    pub fn add_data_input_with_default(
        &mut self,
        name: impl Into<String>,
        flags: PortFlags,
        default: Value,
    ) -> PortIndex {
        let index = self.add_input(Port::data(name, default.type_id()).with_flags(flags));
        self.input_defaults[index.index()] = Some(default);
        index
    }

    /// Add a data output
    pub fn add_data_output(
        &mut self,
        name: impl Into<String>,
        data_type: TypeId,
        flags: PortFlags,
    ) -> PortIndex {
        self.add_output(Port::data(name, data_type).with_flags(flags))
    }

    /// Input ports in creation order
    pub fn inputs(&self) -> &[Port] {
        &self.inputs
    }

    /// Output ports in creation order
    pub fn outputs(&self) -> &[Port] {
        &self.outputs
    }

    /// Get an input port by index
    pub fn input(&self, index: PortIndex) -> Option<&Port> {
        self.inputs.get(index.index())
    }

    /// Get an output port by index
    pub fn output(&self, index: PortIndex) -> Option<&Port> {
        self.outputs.get(index.index())
    }

    /// Default value attached to an input, if any
    pub fn input_default(&self, index: PortIndex) -> Option<&Value> {
        self.input_defaults.get(index.index())?.as_ref()
    }
}

impl Default for NodeLayout {
    fn default() -> Self {
        Self::new()
    }
}
