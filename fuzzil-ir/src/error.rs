//! Error types of the IR crate.
//!
//! Programming errors (violated internal invariants) are not represented
//! here; they abort via assertions. These types cover the two recoverable
//! failure classes: statically invalid code handed in by an embedder, and
//! malformed binary data.

use fuzzil_types::Variable;
use thiserror::Error;

/// A violated static-validity rule, reported by [`Code::check`].
///
/// [`Code::check`]: crate::Code::check
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidityError {
    /// An input refers to a variable that has not been defined.
    #[error("instruction {index} uses undefined variable {variable}")]
    UndefinedInput {
        /// The offending instruction.
        index: usize,
        /// The undefined variable.
        variable: Variable,
    },
    /// An input refers to a variable whose defining scope has been closed.
    #[error("instruction {index} uses variable {variable} outside of its scope")]
    UseOutsideScope {
        /// The offending instruction.
        index: usize,
        /// The out-of-scope variable.
        variable: Variable,
    },
    /// An output does not continue the dense variable numbering.
    #[error("instruction {index} defines variable {found} but {expected} was expected next")]
    NumberingGap {
        /// The offending instruction.
        index: usize,
        /// The variable number that should have been defined next.
        expected: usize,
        /// The number actually defined.
        found: usize,
    },
    /// A block end with no open block.
    #[error("instruction {index} closes a block but none is open")]
    UnmatchedBlockEnd {
        /// The offending instruction.
        index: usize,
    },
    /// A block end that does not match the innermost open block.
    #[error("instruction {index}: {end} cannot close a block opened by {begin}")]
    MismatchedBlockEnd {
        /// The offending instruction.
        index: usize,
        /// The operation that opened the innermost block.
        begin: &'static str,
        /// The mismatching end operation.
        end: &'static str,
    },
    /// A block was still open at the end of the code.
    #[error("block opened at instruction {index} is never closed")]
    UnterminatedBlock {
        /// The instruction that opened the unterminated block.
        index: usize,
    },
    /// An instruction whose required context is not open at its position.
    #[error("instruction {index} ({operation}) requires a context that is not open")]
    WrongContext {
        /// The offending instruction.
        index: usize,
        /// The operation name.
        operation: &'static str,
    },
}

/// A failure while decoding a single instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstructionDecodingError {
    /// The input ended in the middle of a value.
    #[error("unexpected end of data")]
    UnexpectedEndOfData,
    /// A varint was overlong or overflowed its type.
    #[error("malformed varint")]
    MalformedVarint,
    /// The opcode wire value is not assigned.
    #[error("unknown opcode {0:#06x}")]
    UnknownOpcode(u16),
    /// An enum payload carried an unassigned raw value.
    #[error("unknown value {value:#04x} for {enum_name}")]
    UnknownEnumValue {
        /// The enum that was being decoded.
        enum_name: &'static str,
        /// The unassigned raw value.
        value: u8,
    },
    /// A string payload was not valid UTF-8.
    #[error("invalid string payload")]
    InvalidString,
    /// A numeric payload was outside its valid range.
    #[error("payload value out of range")]
    ValueOutOfRange,
    /// A variable number beyond the per-program cap.
    #[error("invalid variable number {0}")]
    InvalidVariable(u32),
    /// The attached variables do not match the operation's arity.
    #[error("operation arity does not match the {0} attached variables")]
    InconsistentArity(usize),
    /// A reference into the operation cache that is not populated.
    #[error("invalid operation cache reference {0}")]
    InvalidCacheReference(u32),
}

/// A failure while decoding a serialized program.
#[derive(Debug, Error)]
pub enum ProgramDecodingError {
    /// The program envelope itself was malformed.
    #[error("malformed program: {0}")]
    Envelope(InstructionDecodingError),
    /// An instruction failed to decode.
    #[error("failed to decode instruction {index}: {source}")]
    Instruction {
        /// The index of the failing instruction.
        index: usize,
        /// The underlying failure.
        #[source]
        source: InstructionDecodingError,
    },
    /// A comment referenced an instruction that does not exist.
    #[error("comment attached to nonexistent instruction {index}")]
    InvalidComment {
        /// The referenced instruction index.
        index: usize,
    },
    /// Data remained after the end of the program.
    #[error("trailing data after program")]
    TrailingData,
    /// The decoded code violates a static-validity rule.
    #[error("decoded program is invalid: {0}")]
    InvalidCode(#[from] ValidityError),
}
