// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scoped type selection for interactive node editing.
//!
//! While a node is being edited, the types it may reference are restricted
//! to sets declared through a guard object. Dropping the guard retracts the
//! declarations unconditionally.

use crate::view::ScriptView;
use graphscript_value::{TypeDesc, TypeId};
use std::cell::RefCell;
use std::collections::HashSet;

/// Error type for interactive editing
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// The requested type is not in any declared selection set
    #[error("type {0} is not selectable in the current editing scope")]
    TypeNotSelectable(TypeId),

    /// The requested type does not resolve in the script view
    #[error("unknown type {0}")]
    UnknownType(TypeId),
}

/// Context handed to [`NodeVariant::edit`](crate::node::NodeVariant::edit)
///
/// Wraps the script view plus a stack of declared selectable-type frames.
/// Frames are pushed by [`TypeSelectionScope`] guards and popped when the
/// guards drop.
pub struct EditContext<'a> {
    view: &'a ScriptView<'a>,
    frames: RefCell<Vec<HashSet<TypeId>>>,
}

impl<'a> EditContext<'a> {
    /// Create an editing context over a script view
    pub fn new(view: &'a ScriptView<'a>) -> Self {
        Self {
            view,
            frames: RefCell::new(Vec::new()),
        }
    }

    /// The script view being edited against
    pub fn view(&self) -> &'a ScriptView<'a> {
        self.view
    }

    /// Open a new declaration frame
    pub fn begin_scope(&self) -> TypeSelectionScope<'_, 'a> {
        self.frames.borrow_mut().push(HashSet::new());
        TypeSelectionScope {
            ctx: self,
            depth: self.frames.borrow().len(),
        }
    }

    /// Check whether a type is selectable in any live frame
    pub fn is_selectable(&self, id: TypeId) -> bool {
        self.frames.borrow().iter().any(|frame| frame.contains(&id))
    }

    fn declare(&self, depth: usize, ids: impl Iterator<Item = TypeId>) {
        let mut frames = self.frames.borrow_mut();
        if let Some(frame) = frames.get_mut(depth - 1) {
            frame.extend(ids);
        }
    }
}

/// Guard declaring selectable type sets for the duration of an edit
///
/// Construction opens a frame; `Drop` retracts it and everything declared
/// into it, with no manual disable step.
pub struct TypeSelectionScope<'c, 'v> {
    ctx: &'c EditContext<'v>,
    depth: usize,
}

impl TypeSelectionScope<'_, '_> {
    /// Declare the environment's data types selectable
    pub fn declare_env_data_types(&self) {
        let ids: Vec<TypeId> = self.ctx.view.env_data_types().map(TypeDesc::id).collect();
        self.ctx.declare(self.depth, ids.into_iter());
    }

    /// Declare the module's script enums selectable
    pub fn declare_script_enums(&self) {
        let ids: Vec<TypeId> = self.ctx.view.script_enums().map(TypeDesc::id).collect();
        self.ctx.declare(self.depth, ids.into_iter());
    }

    /// Declare the module's script structures selectable
    pub fn declare_script_structs(&self) {
        let ids: Vec<TypeId> = self.ctx.view.script_structs().map(TypeDesc::id).collect();
        self.ctx.declare(self.depth, ids.into_iter());
    }
}

impl Drop for TypeSelectionScope<'_, '_> {
    fn drop(&mut self) {
        self.ctx.frames.borrow_mut().truncate(self.depth - 1);
    }
}
