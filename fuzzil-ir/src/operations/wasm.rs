//! Wasm-side operator enums and operation payloads.
//!
//! As with the JavaScript operators, all raw discriminants are frozen wire
//! values.

use fuzzil_types::WasmValueType;

/// An integer binary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum WasmIntegerBinaryOpKind {
    Add = 0x00,
    Sub = 0x01,
    Mul = 0x02,
    DivS = 0x03,
    DivU = 0x04,
    RemS = 0x05,
    RemU = 0x06,
    And = 0x07,
    Or = 0x08,
    Xor = 0x09,
    Shl = 0x0a,
    ShrS = 0x0b,
    ShrU = 0x0c,
    Rotl = 0x0d,
    Rotr = 0x0e,
}

impl TryFrom<u8> for WasmIntegerBinaryOpKind {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        Ok(match raw {
            0x00 => Self::Add,
            0x01 => Self::Sub,
            0x02 => Self::Mul,
            0x03 => Self::DivS,
            0x04 => Self::DivU,
            0x05 => Self::RemS,
            0x06 => Self::RemU,
            0x07 => Self::And,
            0x08 => Self::Or,
            0x09 => Self::Xor,
            0x0a => Self::Shl,
            0x0b => Self::ShrS,
            0x0c => Self::ShrU,
            0x0d => Self::Rotl,
            0x0e => Self::Rotr,
            _ => return Err(raw),
        })
    }
}

/// An integer unary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum WasmIntegerUnaryOpKind {
    Clz = 0x00,
    Ctz = 0x01,
    Popcnt = 0x02,
    Eqz = 0x03,
}

impl TryFrom<u8> for WasmIntegerUnaryOpKind {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        Ok(match raw {
            0x00 => Self::Clz,
            0x01 => Self::Ctz,
            0x02 => Self::Popcnt,
            0x03 => Self::Eqz,
            _ => return Err(raw),
        })
    }
}

/// An integer comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum WasmIntegerCompareOpKind {
    Eq = 0x00,
    Ne = 0x01,
    LtS = 0x02,
    LtU = 0x03,
    GtS = 0x04,
    GtU = 0x05,
    LeS = 0x06,
    LeU = 0x07,
    GeS = 0x08,
    GeU = 0x09,
}

impl TryFrom<u8> for WasmIntegerCompareOpKind {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        Ok(match raw {
            0x00 => Self::Eq,
            0x01 => Self::Ne,
            0x02 => Self::LtS,
            0x03 => Self::LtU,
            0x04 => Self::GtS,
            0x05 => Self::GtU,
            0x06 => Self::LeS,
            0x07 => Self::LeU,
            0x08 => Self::GeS,
            0x09 => Self::GeU,
            _ => return Err(raw),
        })
    }
}

/// A float binary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum WasmFloatBinaryOpKind {
    Add = 0x00,
    Sub = 0x01,
    Mul = 0x02,
    Div = 0x03,
    Min = 0x04,
    Max = 0x05,
    Copysign = 0x06,
}

impl TryFrom<u8> for WasmFloatBinaryOpKind {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        Ok(match raw {
            0x00 => Self::Add,
            0x01 => Self::Sub,
            0x02 => Self::Mul,
            0x03 => Self::Div,
            0x04 => Self::Min,
            0x05 => Self::Max,
            0x06 => Self::Copysign,
            _ => return Err(raw),
        })
    }
}

/// A float unary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum WasmFloatUnaryOpKind {
    Abs = 0x00,
    Neg = 0x01,
    Ceil = 0x02,
    Floor = 0x03,
    Trunc = 0x04,
    Nearest = 0x05,
    Sqrt = 0x06,
}

impl TryFrom<u8> for WasmFloatUnaryOpKind {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        Ok(match raw {
            0x00 => Self::Abs,
            0x01 => Self::Neg,
            0x02 => Self::Ceil,
            0x03 => Self::Floor,
            0x04 => Self::Trunc,
            0x05 => Self::Nearest,
            0x06 => Self::Sqrt,
            _ => return Err(raw),
        })
    }
}

/// A float comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum WasmFloatCompareOpKind {
    Eq = 0x00,
    Ne = 0x01,
    Lt = 0x02,
    Gt = 0x03,
    Le = 0x04,
    Ge = 0x05,
}

impl TryFrom<u8> for WasmFloatCompareOpKind {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        Ok(match raw {
            0x00 => Self::Eq,
            0x01 => Self::Ne,
            0x02 => Self::Lt,
            0x03 => Self::Gt,
            0x04 => Self::Le,
            0x05 => Self::Ge,
            _ => return Err(raw),
        })
    }
}

/// A numeric conversion between wasm value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum WasmConversionKind {
    WrapI64ToI32 = 0x00,
    ExtendI32SToI64 = 0x01,
    ExtendI32UToI64 = 0x02,
    TruncF32SToI32 = 0x03,
    TruncF32UToI32 = 0x04,
    TruncF64SToI32 = 0x05,
    TruncF64UToI32 = 0x06,
    TruncF32SToI64 = 0x07,
    TruncF32UToI64 = 0x08,
    TruncF64SToI64 = 0x09,
    TruncF64UToI64 = 0x0a,
    ConvertI32SToF32 = 0x0b,
    ConvertI32UToF32 = 0x0c,
    ConvertI64SToF32 = 0x0d,
    ConvertI64UToF32 = 0x0e,
    ConvertI32SToF64 = 0x0f,
    ConvertI32UToF64 = 0x10,
    ConvertI64SToF64 = 0x11,
    ConvertI64UToF64 = 0x12,
    DemoteF64ToF32 = 0x13,
    PromoteF32ToF64 = 0x14,
    ReinterpretF32AsI32 = 0x15,
    ReinterpretF64AsI64 = 0x16,
    ReinterpretI32AsF32 = 0x17,
    ReinterpretI64AsF64 = 0x18,
}

impl WasmConversionKind {
    /// The value type consumed by this conversion.
    pub const fn input_type(self) -> WasmValueType {
        use WasmConversionKind::*;
        match self {
            WrapI64ToI32 | ConvertI64SToF32 | ConvertI64UToF32 | ConvertI64SToF64
            | ConvertI64UToF64 | ReinterpretI64AsF64 => WasmValueType::I64,
            ExtendI32SToI64 | ExtendI32UToI64 | ConvertI32SToF32 | ConvertI32UToF32
            | ConvertI32SToF64 | ConvertI32UToF64 | ReinterpretI32AsF32 => WasmValueType::I32,
            TruncF32SToI32 | TruncF32UToI32 | TruncF32SToI64 | TruncF32UToI64 | PromoteF32ToF64
            | ReinterpretF32AsI32 => WasmValueType::F32,
            TruncF64SToI32 | TruncF64UToI32 | TruncF64SToI64 | TruncF64UToI64 | DemoteF64ToF32
            | ReinterpretF64AsI64 => WasmValueType::F64,
        }
    }

    /// The value type produced by this conversion.
    pub const fn output_type(self) -> WasmValueType {
        use WasmConversionKind::*;
        match self {
            WrapI64ToI32 | TruncF32SToI32 | TruncF32UToI32 | TruncF64SToI32 | TruncF64UToI32
            | ReinterpretF32AsI32 => WasmValueType::I32,
            ExtendI32SToI64 | ExtendI32UToI64 | TruncF32SToI64 | TruncF32UToI64 | TruncF64SToI64
            | TruncF64UToI64 | ReinterpretF64AsI64 => WasmValueType::I64,
            ConvertI32SToF32 | ConvertI32UToF32 | ConvertI64SToF32 | ConvertI64UToF32
            | DemoteF64ToF32 | ReinterpretI32AsF32 => WasmValueType::F32,
            ConvertI32SToF64 | ConvertI32UToF64 | ConvertI64SToF64 | ConvertI64UToF64
            | PromoteF32ToF64 | ReinterpretI64AsF64 => WasmValueType::F64,
        }
    }
}

impl TryFrom<u8> for WasmConversionKind {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        use WasmConversionKind::*;
        Ok(match raw {
            0x00 => WrapI64ToI32,
            0x01 => ExtendI32SToI64,
            0x02 => ExtendI32UToI64,
            0x03 => TruncF32SToI32,
            0x04 => TruncF32UToI32,
            0x05 => TruncF64SToI32,
            0x06 => TruncF64UToI32,
            0x07 => TruncF32SToI64,
            0x08 => TruncF32UToI64,
            0x09 => TruncF64SToI64,
            0x0a => TruncF64UToI64,
            0x0b => ConvertI32SToF32,
            0x0c => ConvertI32UToF32,
            0x0d => ConvertI64SToF32,
            0x0e => ConvertI64UToF32,
            0x0f => ConvertI32SToF64,
            0x10 => ConvertI32UToF64,
            0x11 => ConvertI64SToF64,
            0x12 => ConvertI64UToF64,
            0x13 => DemoteF64ToF32,
            0x14 => PromoteF32ToF64,
            0x15 => ReinterpretF32AsI32,
            0x16 => ReinterpretF64AsI64,
            0x17 => ReinterpretI32AsF32,
            0x18 => ReinterpretI64AsF64,
            _ => return Err(raw),
        })
    }
}

/// The lane shape of a SIMD operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum WasmSimdShape {
    I8x16 = 0x00,
    I16x8 = 0x01,
    I32x4 = 0x02,
    I64x2 = 0x03,
    F32x4 = 0x04,
    F64x2 = 0x05,
}

impl WasmSimdShape {
    /// The number of lanes of this shape.
    pub const fn lane_count(self) -> u8 {
        match self {
            Self::I8x16 => 16,
            Self::I16x8 => 8,
            Self::I32x4 | Self::F32x4 => 4,
            Self::I64x2 | Self::F64x2 => 2,
        }
    }

    /// The value type of a single lane when moved to or from a scalar.
    pub const fn lane_type(self) -> WasmValueType {
        match self {
            Self::I8x16 | Self::I16x8 | Self::I32x4 => WasmValueType::I32,
            Self::I64x2 => WasmValueType::I64,
            Self::F32x4 => WasmValueType::F32,
            Self::F64x2 => WasmValueType::F64,
        }
    }
}

impl TryFrom<u8> for WasmSimdShape {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        Ok(match raw {
            0x00 => Self::I8x16,
            0x01 => Self::I16x8,
            0x02 => Self::I32x4,
            0x03 => Self::I64x2,
            0x04 => Self::F32x4,
            0x05 => Self::F64x2,
            _ => return Err(raw),
        })
    }
}

/// A shape-parameterised SIMD binary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum WasmSimdBinaryOpKind {
    Add = 0x00,
    Sub = 0x01,
    Mul = 0x02,
}

impl TryFrom<u8> for WasmSimdBinaryOpKind {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        Ok(match raw {
            0x00 => Self::Add,
            0x01 => Self::Sub,
            0x02 => Self::Mul,
            _ => return Err(raw),
        })
    }
}

/// A typed constant value for globals.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WasmGlobalValue {
    /// An i32 constant.
    I32(i32),
    /// An i64 constant.
    I64(i64),
    /// An f32 constant.
    F32(f32),
    /// An f64 constant.
    F64(f64),
    /// A null function reference.
    FuncRefNull,
    /// A null external reference.
    ExternRefNull,
}

impl WasmGlobalValue {
    /// The value type of this constant.
    pub const fn value_type(&self) -> WasmValueType {
        match self {
            Self::I32(_) => WasmValueType::I32,
            Self::I64(_) => WasmValueType::I64,
            Self::F32(_) => WasmValueType::F32,
            Self::F64(_) => WasmValueType::F64,
            Self::FuncRefNull => WasmValueType::FuncRef,
            Self::ExternRefNull => WasmValueType::ExternRef,
        }
    }
}

/// The parameter and result types of a wasm function or block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WasmSignature {
    /// Parameter value types.
    pub parameters: Vec<WasmValueType>,
    /// Result value types.
    pub results: Vec<WasmValueType>,
}
