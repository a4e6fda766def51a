//! The FuzzIL intermediate representation: operations, instructions, code,
//! programs, their static-validity rules and their binary encoding.
//!
//! The pipeline is strict about trust boundaries: code constructed by an
//! embedder or decoded from bytes passes through [`Code::check`] exactly
//! once; everything downstream (analyzers, the abstract interpreter, the
//! serializer) assumes static validity and only asserts.

#![warn(missing_docs)]

mod code;
mod context;
pub mod encoding;
pub mod error;
mod instruction;
mod operations;
mod program;
mod validity;

#[cfg(any(test, feature = "test-helpers"))]
pub mod builder;

#[cfg(test)]
mod encoding_tests;

pub use code::{Code, MAX_CODE_LENGTH};
pub use context::Context;
pub use instruction::{Instruction, InstructionFlags};
pub use operations::{
    Attributes, BinaryOperator, Comparator, Opcode, Operation, Parameters, PropertyConfiguration,
    PropertyFlags, RegExpFlags, UnaryOperator, WasmConversionKind, WasmFloatBinaryOpKind,
    WasmFloatCompareOpKind, WasmFloatUnaryOpKind, WasmGlobalValue, WasmIntegerBinaryOpKind,
    WasmIntegerCompareOpKind, WasmIntegerUnaryOpKind, WasmSignature, WasmSimdBinaryOpKind,
    WasmSimdShape,
};
pub use program::{Program, ProgramComments};

/// The commonly used types, for glob import by embedders.
pub mod prelude {
    pub use crate::encoding::{decode_program, encode_program, OperationCache};
    pub use crate::error::{InstructionDecodingError, ProgramDecodingError, ValidityError};
    pub use crate::{
        Attributes, BinaryOperator, Code, Comparator, Context, Instruction, InstructionFlags,
        Opcode, Operation, Parameters, Program, UnaryOperator,
    };
    pub use fuzzil_types::{Signature, Type, Variable, VariableMap};
}
