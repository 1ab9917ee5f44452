// SPDX-License-Identifier: MIT OR Apache-2.0
//! Type identity and type-erased value storage for GraphScript.
//!
//! This crate is the leaf of the engine: it knows nothing about nodes or
//! graphs. It provides:
//! - Stable type identities and element references
//! - A registry of concrete data types available to scripts
//! - Type-erased single values and homogeneous arrays

pub mod registry;
pub mod type_id;
pub mod value;

pub use registry::{TypeDesc, TypeKind, TypeRegistry};
pub use type_id::{ElementRef, TypeDomain, TypeId};
pub use value::{Value, ValueArray, ValueData, ValueError};
