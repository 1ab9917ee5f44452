// SPDX-License-Identifier: MIT OR Apache-2.0
//! Type identity tokens and element references.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a registered data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeId(pub Uuid);

impl TypeId {
    /// The nil identity, used by empty element references
    pub const NIL: Self = Self(Uuid::nil());

    /// Create a new random type ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a type ID from a fixed 128-bit value
    ///
    /// Used for well-known identities that must stay stable across builds
    /// and persisted data.
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// Check whether this is the nil identity
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for TypeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Where a referenced type is defined
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeDomain {
    /// No type referenced
    #[default]
    None,
    /// Native environment type
    Env,
    /// Script-authored type (enum or structure)
    Script,
}

/// Reference to a data type, tagged with the domain it resolves in
///
/// An empty reference means "no type configured"; nodes with an empty
/// reference expose flow ports only and cannot be compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRef {
    /// Domain the type resolves in
    pub domain: TypeDomain,
    /// Identity of the referenced type
    pub type_id: TypeId,
}

impl ElementRef {
    /// The empty reference
    pub const EMPTY: Self = Self {
        domain: TypeDomain::None,
        type_id: TypeId::NIL,
    };

    /// Reference an environment type
    pub fn env(type_id: TypeId) -> Self {
        Self {
            domain: TypeDomain::Env,
            type_id,
        }
    }

    /// Reference a script-authored type
    pub fn script(type_id: TypeId) -> Self {
        Self {
            domain: TypeDomain::Script,
            type_id,
        }
    }

    /// Check whether no type is referenced
    pub fn is_empty(&self) -> bool {
        self.domain == TypeDomain::None
    }
}

impl Default for ElementRef {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_ids_are_stable() {
        let a = TypeId::from_u128(0x1234);
        let b = TypeId::from_u128(0x1234);
        assert_eq!(a, b);
        assert!(!a.is_nil());
        assert!(TypeId::NIL.is_nil());
    }

    #[test]
    fn test_empty_reference() {
        let empty = ElementRef::EMPTY;
        assert!(empty.is_empty());
        assert_eq!(ElementRef::default(), empty);

        let typed = ElementRef::env(TypeId::from_u128(7));
        assert!(!typed.is_empty());
        assert_eq!(typed.domain, TypeDomain::Env);
    }
}
