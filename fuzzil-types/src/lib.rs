//! Base types for the FuzzIL intermediate representation: variable
//! identifiers, the sparse maps keyed by them, and the type lattice used by
//! the abstract interpreter.
//!
//! Everything in this crate is a plain immutable value. Types are cheap to
//! clone (extensions are shared behind an `Arc`) and compare by value, so
//! they can be freely stored in analysis state and shipped across threads.

#![warn(missing_docs)]

mod base;
mod lattice;
mod signature;
mod variable;
pub mod wasm;

pub use base::BaseType;
pub use lattice::{Type, TypeExtension};
pub use signature::{Parameter, Signature};
pub use variable::{Variable, VariableMap, MAX_NUMBER_OF_VARIABLES};
pub use wasm::{
    Limits, TypeArena, TypeDescription, TypeId, WasmAbstractHeapType, WasmPackedType,
    WasmReferenceKind, WasmStorageType, WasmStructField, WasmTypeExtension, WasmValueType,
};
