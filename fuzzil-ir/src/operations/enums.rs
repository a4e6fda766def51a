//! Closed operator enums.
//!
//! The raw discriminants of every enum in this module are part of the wire
//! format. New variants must be appended with fresh values; existing values
//! must never change.

use bitflags::bitflags;

/// A JavaScript unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum UnaryOperator {
    /// `++v`
    PreInc = 0x00,
    /// `--v`
    PreDec = 0x01,
    /// `v++`
    PostInc = 0x02,
    /// `v--`
    PostDec = 0x03,
    /// `!v`
    LogicalNot = 0x04,
    /// `~v`
    BitwiseNot = 0x05,
    /// `+v`
    Plus = 0x06,
    /// `-v`
    Minus = 0x07,
}

impl UnaryOperator {
    /// The source-level token of this operator.
    pub const fn token(self) -> &'static str {
        match self {
            Self::PreInc | Self::PostInc => "++",
            Self::PreDec | Self::PostDec => "--",
            Self::LogicalNot => "!",
            Self::BitwiseNot => "~",
            Self::Plus => "+",
            Self::Minus => "-",
        }
    }

    /// Whether the operator is written after its operand.
    pub const fn is_postfix(self) -> bool {
        matches!(self, Self::PostInc | Self::PostDec)
    }

    /// Whether the operator reads and writes a numeric value.
    pub const fn is_arithmetic(self) -> bool {
        !matches!(self, Self::LogicalNot)
    }
}

impl TryFrom<u8> for UnaryOperator {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        Ok(match raw {
            0x00 => Self::PreInc,
            0x01 => Self::PreDec,
            0x02 => Self::PostInc,
            0x03 => Self::PostDec,
            0x04 => Self::LogicalNot,
            0x05 => Self::BitwiseNot,
            0x06 => Self::Plus,
            0x07 => Self::Minus,
            _ => return Err(raw),
        })
    }
}

/// A JavaScript binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum BinaryOperator {
    /// `+`
    Add = 0x00,
    /// `-`
    Sub = 0x01,
    /// `*`
    Mul = 0x02,
    /// `/`
    Div = 0x03,
    /// `%`
    Mod = 0x04,
    /// `&`
    BitAnd = 0x05,
    /// `|`
    BitOr = 0x06,
    /// `^`
    Xor = 0x07,
    /// `&&`
    LogicAnd = 0x08,
    /// `||`
    LogicOr = 0x09,
    /// `<<`
    LShift = 0x0a,
    /// `>>`
    RShift = 0x0b,
    /// `**`
    Exp = 0x0c,
    /// `>>>`
    UnRShift = 0x0d,
}

impl BinaryOperator {
    /// The source-level token of this operator.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::Xor => "^",
            Self::LogicAnd => "&&",
            Self::LogicOr => "||",
            Self::LShift => "<<",
            Self::RShift => ">>",
            Self::Exp => "**",
            Self::UnRShift => ">>>",
        }
    }

    /// Whether this operator short-circuits on boolean-ish operands.
    pub const fn is_logical(self) -> bool {
        matches!(self, Self::LogicAnd | Self::LogicOr)
    }

    /// Whether this operator operates on the bit representation.
    pub const fn is_bitwise(self) -> bool {
        matches!(
            self,
            Self::BitAnd | Self::BitOr | Self::Xor | Self::LShift | Self::RShift | Self::UnRShift
        )
    }
}

impl TryFrom<u8> for BinaryOperator {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        Ok(match raw {
            0x00 => Self::Add,
            0x01 => Self::Sub,
            0x02 => Self::Mul,
            0x03 => Self::Div,
            0x04 => Self::Mod,
            0x05 => Self::BitAnd,
            0x06 => Self::BitOr,
            0x07 => Self::Xor,
            0x08 => Self::LogicAnd,
            0x09 => Self::LogicOr,
            0x0a => Self::LShift,
            0x0b => Self::RShift,
            0x0c => Self::Exp,
            0x0d => Self::UnRShift,
            _ => return Err(raw),
        })
    }
}

/// A JavaScript comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Comparator {
    /// `==`
    Equal = 0x00,
    /// `===`
    StrictEqual = 0x01,
    /// `!=`
    NotEqual = 0x02,
    /// `!==`
    StrictNotEqual = 0x03,
    /// `<`
    LessThan = 0x04,
    /// `<=`
    LessThanOrEqual = 0x05,
    /// `>`
    GreaterThan = 0x06,
    /// `>=`
    GreaterThanOrEqual = 0x07,
}

impl Comparator {
    /// The source-level token of this comparator.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::StrictEqual => "===",
            Self::NotEqual => "!=",
            Self::StrictNotEqual => "!==",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
        }
    }
}

impl TryFrom<u8> for Comparator {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        Ok(match raw {
            0x00 => Self::Equal,
            0x01 => Self::StrictEqual,
            0x02 => Self::NotEqual,
            0x03 => Self::StrictNotEqual,
            0x04 => Self::LessThan,
            0x05 => Self::LessThanOrEqual,
            0x06 => Self::GreaterThan,
            0x07 => Self::GreaterThanOrEqual,
            _ => return Err(raw),
        })
    }
}

bitflags! {
    /// The flags of a regular expression literal.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RegExpFlags: u32 {
        /// `i`
        const CASE_INSENSITIVE = 1 << 0;
        /// `g`
        const GLOBAL = 1 << 1;
        /// `m`
        const MULTILINE = 1 << 2;
        /// `s`
        const DOTALL = 1 << 3;
        /// `u`
        const UNICODE = 1 << 4;
        /// `y`
        const STICKY = 1 << 5;
    }
}

bitflags! {
    /// The descriptor flags used when configuring a property.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PropertyFlags: u8 {
        /// The property value may be changed.
        const WRITABLE = 1 << 0;
        /// The property shows up during enumeration.
        const ENUMERABLE = 1 << 1;
        /// The property descriptor may be changed later.
        const CONFIGURABLE = 1 << 2;
    }
}

/// What a property is configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum PropertyConfiguration {
    /// A plain value.
    Value = 0x00,
    /// A getter function.
    Getter = 0x01,
    /// A setter function.
    Setter = 0x02,
    /// Both a getter and a setter function.
    GetterSetter = 0x03,
}

impl PropertyConfiguration {
    /// The number of value inputs this configuration consumes.
    pub const fn num_inputs(self) -> usize {
        match self {
            Self::Value | Self::Getter | Self::Setter => 1,
            Self::GetterSetter => 2,
        }
    }
}

impl TryFrom<u8> for PropertyConfiguration {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        Ok(match raw {
            0x00 => Self::Value,
            0x01 => Self::Getter,
            0x02 => Self::Setter,
            0x03 => Self::GetterSetter,
            _ => return Err(raw),
        })
    }
}

/// The parameter declaration of a function-like definition.
///
/// Only the shape is stored here; types are attached separately by the
/// abstract interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Parameters {
    /// The number of parameters, including a rest parameter.
    pub count: u16,
    /// Whether the last parameter is a rest parameter.
    pub has_rest: bool,
}

impl Parameters {
    /// The number of inner output variables the declaration produces.
    pub const fn num_parameter_variables(self) -> usize {
        self.count as usize
    }
}
