// SPDX-License-Identifier: MIT OR Apache-2.0
//! Registry of concrete data types.
//!
//! The registry is populated once at startup and read-only thereafter. One
//! registry instance holds the native environment types; a second instance
//! holds script-authored enums and structures for the owning module.

use crate::type_id::TypeId;
use crate::value::{Value, ValueData};
use indexmap::IndexMap;
use std::any::Any;
use std::fmt::Debug;

/// Kind of a registered type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Concrete environment data type
    Data,
    /// Script-defined enumeration
    Enum,
    /// Script-defined structure
    Struct,
}

/// Description of a registered type: identity, display name, and a default
/// value prototype
#[derive(Debug)]
pub struct TypeDesc {
    id: TypeId,
    name: String,
    namespace: Option<String>,
    kind: TypeKind,
    prototype: Box<dyn ValueData>,
}

impl TypeDesc {
    /// Describe a type, tying its identity to a concrete Rust default value
    pub fn new<T>(id: TypeId, name: impl Into<String>, kind: TypeKind, default: T) -> Self
    where
        T: Any + Debug + Clone + PartialEq + Send + Sync,
    {
        Self {
            id,
            name: name.into(),
            namespace: None,
            kind,
            prototype: Box::new(default),
        }
    }

    /// Set the namespace used for qualified names
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Identity of the type
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace, if any
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Kind of the type
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Name qualified with the namespace, e.g. `"Math::Vector3"`
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(namespace) => format!("{namespace}::{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Clone the prototype into a fresh value of this type
    pub fn default_value(&self) -> Value {
        Value::from_boxed(self.id, self.prototype.clone_box())
    }
}

/// Ordered collection of registered types
pub struct TypeRegistry {
    types: IndexMap<TypeId, TypeDesc>,
}

impl TypeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            types: IndexMap::new(),
        }
    }

    /// Register a type description
    ///
    /// Registering an identity twice replaces the previous entry.
    pub fn register(&mut self, desc: TypeDesc) {
        if let Some(previous) = self.types.insert(desc.id(), desc) {
            tracing::warn!(
                "Type {} ({}) registered twice; replacing previous entry",
                previous.id(),
                previous.name()
            );
        }
    }

    /// Get a type description by identity
    pub fn get(&self, id: TypeId) -> Option<&TypeDesc> {
        self.types.get(&id)
    }

    /// Check whether an identity is registered
    pub fn contains(&self, id: TypeId) -> bool {
        self.types.contains_key(&id)
    }

    /// Iterate over all registered types in registration order
    ///
    /// The iterator is finite and restartable; callers stop enumeration by
    /// breaking out of it.
    pub fn types(&self) -> impl Iterator<Item = &TypeDesc> {
        self.types.values()
    }

    /// Iterate over registered types of one kind
    pub fn types_of_kind(&self, kind: TypeKind) -> impl Iterator<Item = &TypeDesc> {
        self.types.values().filter(move |t| t.kind() == kind)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INT: TypeId = TypeId::from_u128(0xB1);
    const NAME: TypeId = TypeId::from_u128(0xB2);

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register(TypeDesc::new(INT, "Int", TypeKind::Data, 0i64).with_namespace("Core"));
        registry.register(TypeDesc::new(NAME, "Name", TypeKind::Data, String::new()));
        registry
    }

    #[test]
    fn test_default_value_carries_identity() {
        let registry = registry();
        let value = registry.get(INT).unwrap().default_value();
        assert_eq!(value.type_id(), INT);
        assert_eq!(value.downcast_ref::<i64>(), Some(&0));
    }

    #[test]
    fn test_qualified_name() {
        let registry = registry();
        assert_eq!(registry.get(INT).unwrap().qualified_name(), "Core::Int");
        assert_eq!(registry.get(NAME).unwrap().qualified_name(), "Name");
    }

    #[test]
    fn test_enumeration_is_ordered_and_restartable() {
        let registry = registry();
        let first: Vec<TypeId> = registry.types().map(TypeDesc::id).collect();
        let second: Vec<TypeId> = registry.types().map(TypeDesc::id).collect();
        assert_eq!(first, vec![INT, NAME]);
        assert_eq!(first, second);

        // Early stop is just breaking out of the iterator.
        let found = registry.types().find(|t| t.name() == "Int");
        assert!(found.is_some());
    }

    #[test]
    fn test_duplicate_registration_replaces() {
        let mut registry = registry();
        registry.register(TypeDesc::new(INT, "Int32", TypeKind::Data, 0i64));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(INT).unwrap().name(), "Int32");
    }
}
