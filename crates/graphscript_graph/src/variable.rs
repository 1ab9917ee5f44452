// SPDX-License-Identifier: MIT OR Apache-2.0
//! Configured default value shared by data-typed node variants.

use crate::archive::NodeArchive;
use crate::remap::GuidRemapper;
use crate::view::ScriptView;
use graphscript_value::{ElementRef, Value};

const ELEMENT_TYPE_FIELD: &str = "element_type";

/// A node's configured element type and default value
///
/// The element reference is what gets persisted; the default value and the
/// cached type name are rederived from the registries whenever the reference
/// is (re)assigned, so layout construction stays pure over this state.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableData {
    reference: ElementRef,
    type_name: Option<String>,
    value: Option<Value>,
}

impl VariableData {
    /// Create unconfigured data
    pub fn empty() -> Self {
        Self {
            reference: ElementRef::EMPTY,
            type_name: None,
            value: None,
        }
    }

    /// Create from already resolved parts
    ///
    /// Used by creation-menu commands, which resolve the type while the
    /// script view is at hand.
    pub fn from_parts(reference: ElementRef, type_name: String, value: Value) -> Self {
        Self {
            reference,
            type_name: Some(type_name),
            value: Some(value),
        }
    }

    /// The configured element reference
    pub fn reference(&self) -> ElementRef {
        self.reference
    }

    /// Check whether no element type is configured
    pub fn is_empty(&self) -> bool {
        self.reference.is_empty()
    }

    /// Display name of the configured type
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// The configured default value
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Assign a new element reference, rederiving the default value
    ///
    /// An unresolvable reference degrades to the unconfigured state with a
    /// warning; an empty reference clears the configuration.
    pub fn set_reference(&mut self, reference: ElementRef, view: &ScriptView<'_>) {
        if reference.is_empty() {
            *self = Self::empty();
            return;
        }
        match view.resolve(&reference) {
            Some(desc) => {
                self.reference = reference;
                self.type_name = Some(desc.name().to_string());
                self.value = Some(desc.default_value());
            }
            None => {
                tracing::warn!(
                    "Element type {} does not resolve; falling back to unconfigured",
                    reference.type_id
                );
                *self = Self::empty();
            }
        }
    }

    /// Write the element reference to an archive
    pub fn save_type_id(&self, archive: &mut NodeArchive) {
        archive.set(ELEMENT_TYPE_FIELD, &self.reference);
    }

    /// Read the element reference from an archive
    ///
    /// Missing or malformed fields leave the data unconfigured.
    pub fn load_type_id(&mut self, archive: &NodeArchive, view: &ScriptView<'_>) {
        let reference = archive
            .get::<ElementRef>(ELEMENT_TYPE_FIELD)
            .unwrap_or_default();
        self.set_reference(reference, view);
    }

    /// Read an edited element reference from an archive, if one is present
    pub fn edited_reference(archive: &NodeArchive) -> Option<ElementRef> {
        archive.get::<ElementRef>(ELEMENT_TYPE_FIELD)
    }

    /// Rewrite the stored identity through the remapper
    ///
    /// The default value keeps its payload and is retagged to the new
    /// identity; the duplicated type is structurally the same.
    pub fn remap_dependencies(&mut self, remapper: &GuidRemapper) {
        if self.reference.is_empty() {
            return;
        }
        let remapped = remapper.remap_type(self.reference.type_id);
        if remapped != self.reference.type_id {
            self.reference.type_id = remapped;
            self.value = self.value.take().map(|v| v.retagged(remapped));
        }
    }
}

impl Default for VariableData {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphscript_value::{TypeDesc, TypeId, TypeKind, TypeRegistry};

    const INT: TypeId = TypeId::from_u128(0x101);

    fn registries() -> (TypeRegistry, TypeRegistry) {
        let mut env = TypeRegistry::new();
        env.register(TypeDesc::new(INT, "Int", TypeKind::Data, 0i64));
        (env, TypeRegistry::new())
    }

    #[test]
    fn test_set_reference_materializes_default() {
        let (env, script) = registries();
        let view = ScriptView::new(&env, &script);

        let mut data = VariableData::empty();
        data.set_reference(ElementRef::env(INT), &view);

        assert!(!data.is_empty());
        assert_eq!(data.type_name(), Some("Int"));
        assert_eq!(data.value().unwrap().downcast_ref::<i64>(), Some(&0));
    }

    #[test]
    fn test_unresolvable_reference_falls_back_to_empty() {
        let (env, script) = registries();
        let view = ScriptView::new(&env, &script);

        let mut data = VariableData::empty();
        data.set_reference(ElementRef::env(TypeId::from_u128(0xDEAD)), &view);
        assert!(data.is_empty());
        assert!(data.value().is_none());
    }

    #[test]
    fn test_type_id_round_trip() {
        let (env, script) = registries();
        let view = ScriptView::new(&env, &script);

        let mut original = VariableData::empty();
        original.set_reference(ElementRef::env(INT), &view);

        let mut archive = NodeArchive::new();
        original.save_type_id(&mut archive);

        let mut restored = VariableData::empty();
        restored.load_type_id(&archive, &view);
        assert_eq!(restored, original);
    }

    #[test]
    fn test_remap_retags_value() {
        let (env, script) = registries();
        let view = ScriptView::new(&env, &script);

        let mut data = VariableData::empty();
        data.set_reference(ElementRef::env(INT), &view);

        let new_id = TypeId::from_u128(0x102);
        let mut remapper = GuidRemapper::new();
        remapper.insert(INT.0, new_id.0);

        data.remap_dependencies(&remapper);
        assert_eq!(data.reference().type_id, new_id);
        assert_eq!(data.value().unwrap().type_id(), new_id);

        // A mapping without the current identity leaves it unchanged.
        data.remap_dependencies(&GuidRemapper::new());
        assert_eq!(data.reference().type_id, new_id);
    }
}
