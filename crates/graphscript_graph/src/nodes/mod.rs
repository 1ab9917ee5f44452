// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in node variants.

mod array_remove_by_value;

pub use array_remove_by_value::ArrayRemoveByValueNode;

use crate::factory::NodeFactory;

/// Register every built-in node variant with a factory
///
/// Called once at startup; the factory is read-only afterwards.
pub fn register_builtin_nodes(factory: &mut NodeFactory) {
    ArrayRemoveByValueNode::register(factory);
}
