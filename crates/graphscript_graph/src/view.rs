// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scoped view over the types visible from one script module.

use graphscript_value::{ElementRef, TypeDesc, TypeDomain, TypeKind, TypeRegistry};

/// The visibility window of a script module: the environment's data types
/// plus the module's own enums and structures
///
/// Enumeration is lazy and restartable; callers stop early by breaking out
/// of the iterator.
pub struct ScriptView<'a> {
    env: &'a TypeRegistry,
    script: &'a TypeRegistry,
}

impl<'a> ScriptView<'a> {
    /// Create a view over an environment registry and a script-module
    /// registry
    pub fn new(env: &'a TypeRegistry, script: &'a TypeRegistry) -> Self {
        Self { env, script }
    }

    /// Concrete environment data types visible from this module
    pub fn env_data_types(&self) -> impl Iterator<Item = &'a TypeDesc> {
        self.env.types_of_kind(TypeKind::Data)
    }

    /// Script-defined enumerations visible from this module
    pub fn script_enums(&self) -> impl Iterator<Item = &'a TypeDesc> {
        self.script.types_of_kind(TypeKind::Enum)
    }

    /// Script-defined structures visible from this module
    pub fn script_structs(&self) -> impl Iterator<Item = &'a TypeDesc> {
        self.script.types_of_kind(TypeKind::Struct)
    }

    /// Resolve an element reference in its declared domain
    pub fn resolve(&self, reference: &ElementRef) -> Option<&'a TypeDesc> {
        match reference.domain {
            TypeDomain::None => None,
            TypeDomain::Env => self.env.get(reference.type_id),
            TypeDomain::Script => self.script.get(reference.type_id),
        }
    }

    /// Fully qualified display name for a type
    pub fn qualify_name(&self, desc: &TypeDesc) -> String {
        desc.qualified_name()
    }
}
