// SPDX-License-Identifier: MIT OR Apache-2.0
//! Array node removing every element equal to a value.

use crate::archive::{NodeArchive, SerializationContext};
use crate::compiler::{CompileContext, CompileError, NodeCompiler};
use crate::edit::{EditContext, EditError};
use crate::factory::{CreationMenu, NodeCreator, NodeFactory, NodeOption};
use crate::layout::{NodeColor, NodeLayout};
use crate::node::{Node, NodeId, NodeTypeGuid, NodeVariant};
use crate::port::{PortFlags, PortIndex};
use crate::remap::GuidRemapper;
use crate::runtime::{Activation, RuntimeContext, RuntimeResult};
use crate::variable::VariableData;
use crate::view::ScriptView;
use graphscript_value::ElementRef;

const LABEL: &str = "Array::Remove By Value";
const DESCRIPTION: &str = "Remove all elements of a specific value from an array";

/// Removes every array element equal by value to the configured input
///
/// Unconfigured instances expose flow ports only; configuring an element
/// type adds the array input and an editable value input pre-populated with
/// the type's default.
#[derive(Debug, Default)]
pub struct ArrayRemoveByValueNode {
    default_value: VariableData,
}

impl ArrayRemoveByValueNode {
    /// Stable identity of this variant
    pub const TYPE_GUID: NodeTypeGuid =
        NodeTypeGuid::from_u128(0xaa5e_9cf1_aba7_438a_904e_8617_4f5b_a85c);

    /// Flow input activating the node
    pub const IN: PortIndex = PortIndex(0);
    /// Array being filtered
    pub const IN_ARRAY: PortIndex = PortIndex(1);
    /// Value to remove
    pub const IN_VALUE: PortIndex = PortIndex(2);
    /// Flow output traversal resumes from
    pub const OUT: PortIndex = PortIndex(0);

    /// Create an unconfigured instance
    pub fn new() -> Self {
        Self {
            default_value: VariableData::empty(),
        }
    }

    /// Create an instance configured with an element type
    pub fn with_reference(reference: ElementRef, view: &ScriptView<'_>) -> Self {
        let mut default_value = VariableData::empty();
        default_value.set_reference(reference, view);
        Self { default_value }
    }

    /// Create an instance from already resolved configuration
    pub fn with_value(default_value: VariableData) -> Self {
        Self { default_value }
    }

    /// Register this variant's creator with the factory
    pub fn register(factory: &mut NodeFactory) {
        factory.register_creator(Box::new(Creator));
    }

    fn execute(ctx: &mut RuntimeContext<'_>, _activation: &Activation) -> RuntimeResult {
        let value = ctx.input_value(Self::IN_VALUE).clone();
        let array = ctx.input_array_mut(Self::IN_ARRAY);
        array.remove_by_value(&value);

        RuntimeResult::continue_from(Self::OUT)
    }
}

impl NodeVariant for ArrayRemoveByValueNode {
    fn type_guid(&self) -> NodeTypeGuid {
        Self::TYPE_GUID
    }

    fn create_layout(&self, layout: &mut NodeLayout) {
        layout.set_name(LABEL);
        layout.set_color(NodeColor::Purple);

        layout.add_flow_input("In", PortFlags::none().multi_link());
        layout.add_flow_output("Default", PortFlags::none().spacer_below());

        if let Some(value) = self.default_value.value() {
            let element_type = value.type_id();
            layout.add_data_input("Array", element_type, PortFlags::none().array());
            layout.add_data_input_with_default(
                self.default_value.type_name().unwrap_or("Value"),
                PortFlags::none().persistent().editable(),
                value.clone(),
            );
        }
    }

    fn compile(
        &self,
        ctx: &CompileContext<'_>,
        compiler: &mut NodeCompiler,
    ) -> Result<(), CompileError> {
        if self.default_value.is_empty() {
            return Err(CompileError::MissingElementType);
        }
        let reference = self.default_value.reference();
        if ctx.view.resolve(&reference).is_none() {
            return Err(CompileError::UnresolvedType(reference.type_id));
        }

        compiler.bind_callback(Self::execute);
        Ok(())
    }

    fn save(&self, archive: &mut NodeArchive, _ctx: &SerializationContext<'_>) {
        self.default_value.save_type_id(archive);
    }

    fn load_dependencies(&mut self, archive: &NodeArchive, ctx: &SerializationContext<'_>) {
        self.default_value.load_type_id(archive, ctx.view());
    }

    fn edit(&mut self, archive: &mut NodeArchive, ctx: &EditContext<'_>) -> Result<(), EditError> {
        let scope = ctx.begin_scope();
        scope.declare_env_data_types();
        scope.declare_script_enums();
        scope.declare_script_structs();

        if let Some(reference) = VariableData::edited_reference(archive) {
            if reference != self.default_value.reference() {
                if !reference.is_empty() {
                    if ctx.view().resolve(&reference).is_none() {
                        return Err(EditError::UnknownType(reference.type_id));
                    }
                    if !ctx.is_selectable(reference.type_id) {
                        return Err(EditError::TypeNotSelectable(reference.type_id));
                    }
                }
                self.default_value.set_reference(reference, ctx.view());
            }
        }

        // Reflect the applied state back to the editor.
        self.default_value.save_type_id(archive);
        Ok(())
    }

    fn remap_dependencies(&mut self, remapper: &GuidRemapper) {
        self.default_value.remap_dependencies(remapper);
    }
}

struct Creator;

impl NodeCreator for Creator {
    fn type_guid(&self) -> NodeTypeGuid {
        ArrayRemoveByValueNode::TYPE_GUID
    }

    fn create(&self, id: NodeId) -> Node {
        Node::new(id, Box::new(ArrayRemoveByValueNode::new()))
    }

    fn populate_creation_menu(&self, menu: &mut CreationMenu, view: &ScriptView<'_>) {
        menu.add_option(NodeOption::new(
            LABEL,
            DESCRIPTION,
            Box::new(|position| {
                Node::new(NodeId::new(), Box::new(ArrayRemoveByValueNode::new()))
                    .with_position(position)
            }),
        ));

        for desc in view.env_data_types() {
            let label = format!("{}::{LABEL}", view.qualify_name(desc));
            // Resolve while the view is at hand; the command must own its
            // configuration.
            let reference = ElementRef::env(desc.id());
            let type_name = desc.name().to_string();
            let default = desc.default_value();
            menu.add_option(NodeOption::new(
                label,
                DESCRIPTION,
                Box::new(move |position| {
                    let data =
                        VariableData::from_parts(reference, type_name.clone(), default.clone());
                    Node::new(
                        NodeId::new(),
                        Box::new(ArrayRemoveByValueNode::with_value(data)),
                    )
                    .with_position(position)
                }),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::PortKind;
    use graphscript_value::{TypeDesc, TypeId, TypeKind, TypeRegistry};

    const INT: TypeId = TypeId::from_u128(0x201);

    fn registries() -> (TypeRegistry, TypeRegistry) {
        let mut env = TypeRegistry::new();
        env.register(TypeDesc::new(INT, "Int", TypeKind::Data, 0i64).with_namespace("Core"));
        (env, TypeRegistry::new())
    }

    #[test]
    fn test_unconfigured_layout_is_flow_only() {
        let node = Node::new(NodeId::new(), Box::new(ArrayRemoveByValueNode::new()));
        let layout = node.layout();

        assert_eq!(layout.name(), LABEL);
        assert_eq!(layout.inputs().len(), 1);
        assert_eq!(layout.outputs().len(), 1);
        assert_eq!(layout.inputs()[0].name, "In");
        assert!(layout.inputs()[0].flags.multi_link);
        assert_eq!(layout.outputs()[0].name, "Default");
        assert!(layout.outputs()[0].flags.spacer_below);
    }

    #[test]
    fn test_configured_layout_adds_data_ports() {
        let (env, script) = registries();
        let view = ScriptView::new(&env, &script);
        let node = Node::new(
            NodeId::new(),
            Box::new(ArrayRemoveByValueNode::with_reference(
                ElementRef::env(INT),
                &view,
            )),
        );
        let layout = node.layout();

        assert_eq!(layout.inputs().len(), 3);
        let array = &layout.inputs()[ArrayRemoveByValueNode::IN_ARRAY.index()];
        assert_eq!(array.name, "Array");
        assert_eq!(array.kind, PortKind::Data);
        assert!(array.flags.array);
        assert_eq!(array.data_type, Some(INT));

        let value = &layout.inputs()[ArrayRemoveByValueNode::IN_VALUE.index()];
        assert_eq!(value.name, "Int");
        assert!(value.flags.persistent);
        assert!(value.flags.editable);
        assert_eq!(
            layout
                .input_default(ArrayRemoveByValueNode::IN_VALUE)
                .unwrap()
                .downcast_ref::<i64>(),
            Some(&0)
        );
    }

    #[test]
    fn test_layout_is_deterministic() {
        let (env, script) = registries();
        let view = ScriptView::new(&env, &script);

        let a = Node::new(
            NodeId::new(),
            Box::new(ArrayRemoveByValueNode::with_reference(
                ElementRef::env(INT),
                &view,
            )),
        );
        let b = Node::new(
            NodeId::new(),
            Box::new(ArrayRemoveByValueNode::with_reference(
                ElementRef::env(INT),
                &view,
            )),
        );
        assert_eq!(a.layout(), b.layout());
    }

    #[test]
    fn test_compile_fails_without_configuration() {
        let (env, script) = registries();
        let view = ScriptView::new(&env, &script);
        let node = ArrayRemoveByValueNode::new();

        let mut layout = NodeLayout::new();
        node.create_layout(&mut layout);
        let ctx = CompileContext::new(&view, &layout);
        let mut binder = NodeCompiler::new();

        let error = node.compile(&ctx, &mut binder).unwrap_err();
        assert!(matches!(error, CompileError::MissingElementType));
        assert!(binder.callback().is_none());
    }

    #[test]
    fn test_compile_binds_callback_when_configured() {
        let (env, script) = registries();
        let view = ScriptView::new(&env, &script);
        let node = ArrayRemoveByValueNode::with_reference(ElementRef::env(INT), &view);

        let mut layout = NodeLayout::new();
        node.create_layout(&mut layout);
        let ctx = CompileContext::new(&view, &layout);
        let mut binder = NodeCompiler::new();

        node.compile(&ctx, &mut binder).unwrap();
        assert!(binder.callback().is_some());
    }

    #[test]
    fn test_save_load_round_trips_layout() {
        let (env, script) = registries();
        let view = ScriptView::new(&env, &script);
        let ctx = SerializationContext::new(&view);

        for variant in [
            ArrayRemoveByValueNode::new(),
            ArrayRemoveByValueNode::with_reference(ElementRef::env(INT), &view),
        ] {
            let original = Node::new(NodeId::new(), Box::new(variant));
            let saved = original.save(&ctx);

            let mut restored = Node::new(saved.id, Box::new(ArrayRemoveByValueNode::new()));
            restored.load_dependencies(&saved.data, &ctx);
            restored.rebuild_layout();

            assert_eq!(restored.layout(), original.layout());
        }
    }

    #[test]
    fn test_load_of_unknown_type_falls_back_to_unconfigured() {
        let (env, script) = registries();
        let view = ScriptView::new(&env, &script);
        let ctx = SerializationContext::new(&view);

        let mut archive = NodeArchive::new();
        archive.set("element_type", &ElementRef::env(TypeId::from_u128(0xBAD)));

        let mut node = Node::new(NodeId::new(), Box::new(ArrayRemoveByValueNode::new()));
        node.load_dependencies(&archive, &ctx);
        node.rebuild_layout();

        assert_eq!(node.layout().inputs().len(), 1);
    }

    #[test]
    fn test_edit_applies_selectable_type() {
        let (env, script) = registries();
        let view = ScriptView::new(&env, &script);
        let ctx = EditContext::new(&view);

        let mut node = Node::new(NodeId::new(), Box::new(ArrayRemoveByValueNode::new()));
        let mut archive = NodeArchive::new();
        archive.set("element_type", &ElementRef::env(INT));

        node.edit(&mut archive, &ctx).unwrap();
        assert_eq!(node.layout().inputs().len(), 3);
        // The guard retracted its declarations when editing ended.
        assert!(!ctx.is_selectable(INT));
    }

    #[test]
    fn test_edit_rejects_unknown_type() {
        let (env, script) = registries();
        let view = ScriptView::new(&env, &script);
        let ctx = EditContext::new(&view);

        let mut node = Node::new(NodeId::new(), Box::new(ArrayRemoveByValueNode::new()));
        let mut archive = NodeArchive::new();
        archive.set("element_type", &ElementRef::env(TypeId::from_u128(0xBAD)));

        let error = node.edit(&mut archive, &ctx).unwrap_err();
        assert!(matches!(error, EditError::UnknownType(_)));
    }

    #[test]
    fn test_remap_then_layout_stays_valid() {
        let (mut env, script) = registries();
        let new_id = TypeId::from_u128(0x202);
        env.register(TypeDesc::new(new_id, "Int", TypeKind::Data, 0i64).with_namespace("Copy"));
        let view = ScriptView::new(&env, &script);

        let mut node = Node::new(
            NodeId::new(),
            Box::new(ArrayRemoveByValueNode::with_reference(
                ElementRef::env(INT),
                &view,
            )),
        );

        let mut remapper = GuidRemapper::new();
        remapper.insert(INT.0, new_id.0);
        node.remap_dependencies(&remapper);
        node.rebuild_layout();

        let array = &node.layout().inputs()[ArrayRemoveByValueNode::IN_ARRAY.index()];
        assert_eq!(array.data_type, Some(new_id));
    }

    #[test]
    fn test_creation_menu_has_base_and_per_type_options() {
        let (env, script) = registries();
        let view = ScriptView::new(&env, &script);

        let mut factory = NodeFactory::new();
        ArrayRemoveByValueNode::register(&mut factory);
        let menu = factory.populate_creation_menu(&view);

        assert_eq!(menu.len(), 2);
        assert!(menu.option(LABEL).is_some());

        let typed = menu.option("Core::Int::Array::Remove By Value").unwrap();
        let node = typed.instantiate([10.0, 20.0]);
        assert_eq!(node.position, [10.0, 20.0]);
        assert_eq!(node.layout().inputs().len(), 3);
    }
}
