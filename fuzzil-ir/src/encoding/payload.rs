//! The payload codec: how individual payload fields are written to and
//! read from the wire.
//!
//! Every field type appearing in the opcode table implements [`Payload`].
//! Integers use LEB128 varints (zigzag for signed values), floats their
//! little-endian bit patterns, strings a length prefix plus UTF-8 bytes,
//! vectors a count prefix plus elements, and enums their single frozen raw
//! byte.

use super::{Reader, Writer};
use crate::error::InstructionDecodingError;
use crate::operations::{
    Parameters, PropertyConfiguration, PropertyFlags, RegExpFlags, WasmGlobalValue, WasmSignature,
};
use fuzzil_types::wasm::{WasmReferenceKind, WasmStorageType, WasmStructField};
use fuzzil_types::{Limits, TypeId, WasmAbstractHeapType, WasmPackedType, WasmValueType};

/// A value that can be written to and read from the binary format.
pub(crate) trait Payload: Sized {
    /// Writes `self`.
    fn write(&self, writer: &mut Writer);
    /// Reads a value.
    fn read(reader: &mut Reader<'_>) -> Result<Self, InstructionDecodingError>;
}

impl Payload for bool {
    fn write(&self, writer: &mut Writer) {
        writer.write_u8(u8::from(*self));
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, InstructionDecodingError> {
        Ok(reader.read_u8()? != 0)
    }
}

impl Payload for u8 {
    fn write(&self, writer: &mut Writer) {
        writer.write_u8(*self);
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, InstructionDecodingError> {
        reader.read_u8()
    }
}

impl Payload for u16 {
    fn write(&self, writer: &mut Writer) {
        writer.write_varint_u32(u32::from(*self));
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, InstructionDecodingError> {
        u16::try_from(reader.read_varint_u32()?)
            .map_err(|_| InstructionDecodingError::ValueOutOfRange)
    }
}

impl Payload for u32 {
    fn write(&self, writer: &mut Writer) {
        writer.write_varint_u32(*self);
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, InstructionDecodingError> {
        reader.read_varint_u32()
    }
}

impl Payload for i32 {
    fn write(&self, writer: &mut Writer) {
        writer.write_varint_u32(zigzag_encode_32(*self));
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, InstructionDecodingError> {
        Ok(zigzag_decode_32(reader.read_varint_u32()?))
    }
}

impl Payload for i64 {
    fn write(&self, writer: &mut Writer) {
        writer.write_varint_u64(zigzag_encode_64(*self));
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, InstructionDecodingError> {
        Ok(zigzag_decode_64(reader.read_varint_u64()?))
    }
}

impl Payload for f32 {
    fn write(&self, writer: &mut Writer) {
        writer.write_bytes(&self.to_le_bytes());
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, InstructionDecodingError> {
        let bytes = reader.read_exact(4)?;
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

impl Payload for f64 {
    fn write(&self, writer: &mut Writer) {
        writer.write_bytes(&self.to_le_bytes());
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, InstructionDecodingError> {
        let bytes = reader.read_exact(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(f64::from_le_bytes(raw))
    }
}

impl Payload for String {
    fn write(&self, writer: &mut Writer) {
        writer.write_varint_u32(self.len() as u32);
        writer.write_bytes(self.as_bytes());
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, InstructionDecodingError> {
        let len = reader.read_varint_u32()? as usize;
        let bytes = reader.read_exact(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| InstructionDecodingError::InvalidString)
    }
}

impl<T: Payload> Payload for Vec<T> {
    fn write(&self, writer: &mut Writer) {
        writer.write_varint_u32(self.len() as u32);
        for element in self {
            element.write(writer);
        }
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, InstructionDecodingError> {
        let count = reader.read_varint_u32()? as usize;
        // Every element occupies at least one byte, so a count beyond the
        // remaining data is malformed and must not drive an allocation.
        if count > reader.remaining() {
            return Err(InstructionDecodingError::UnexpectedEndOfData);
        }
        let mut elements = Vec::with_capacity(count);
        for _ in 0..count {
            elements.push(T::read(reader)?);
        }
        Ok(elements)
    }
}

impl<T: Payload> Payload for Option<T> {
    fn write(&self, writer: &mut Writer) {
        match self {
            Some(value) => {
                writer.write_u8(1);
                value.write(writer);
            }
            None => writer.write_u8(0),
        }
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, InstructionDecodingError> {
        match reader.read_u8()? {
            0 => Ok(None),
            _ => Ok(Some(T::read(reader)?)),
        }
    }
}

impl Payload for [u8; 16] {
    fn write(&self, writer: &mut Writer) {
        writer.write_bytes(self);
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, InstructionDecodingError> {
        let bytes = reader.read_exact(16)?;
        let mut raw = [0u8; 16];
        raw.copy_from_slice(bytes);
        Ok(raw)
    }
}

impl Payload for RegExpFlags {
    fn write(&self, writer: &mut Writer) {
        writer.write_varint_u32(self.bits());
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, InstructionDecodingError> {
        Self::from_bits(reader.read_varint_u32()?)
            .ok_or(InstructionDecodingError::ValueOutOfRange)
    }
}

impl Payload for PropertyFlags {
    fn write(&self, writer: &mut Writer) {
        writer.write_u8(self.bits());
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, InstructionDecodingError> {
        Self::from_bits(reader.read_u8()?).ok_or(InstructionDecodingError::ValueOutOfRange)
    }
}

impl Payload for Parameters {
    fn write(&self, writer: &mut Writer) {
        self.count.write(writer);
        self.has_rest.write(writer);
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, InstructionDecodingError> {
        Ok(Self {
            count: u16::read(reader)?,
            has_rest: bool::read(reader)?,
        })
    }
}

impl Payload for Limits {
    fn write(&self, writer: &mut Writer) {
        self.min.write(writer);
        self.max.write(writer);
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, InstructionDecodingError> {
        Ok(Self {
            min: u32::read(reader)?,
            max: Option::<u32>::read(reader)?,
        })
    }
}

impl Payload for WasmSignature {
    fn write(&self, writer: &mut Writer) {
        self.parameters.write(writer);
        self.results.write(writer);
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, InstructionDecodingError> {
        Ok(Self {
            parameters: Vec::read(reader)?,
            results: Vec::read(reader)?,
        })
    }
}

impl Payload for WasmGlobalValue {
    fn write(&self, writer: &mut Writer) {
        match self {
            Self::I32(value) => {
                writer.write_u8(0x00);
                value.write(writer);
            }
            Self::I64(value) => {
                writer.write_u8(0x01);
                value.write(writer);
            }
            Self::F32(value) => {
                writer.write_u8(0x02);
                value.write(writer);
            }
            Self::F64(value) => {
                writer.write_u8(0x03);
                value.write(writer);
            }
            Self::FuncRefNull => writer.write_u8(0x04),
            Self::ExternRefNull => writer.write_u8(0x05),
        }
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, InstructionDecodingError> {
        Ok(match reader.read_u8()? {
            0x00 => Self::I32(i32::read(reader)?),
            0x01 => Self::I64(i64::read(reader)?),
            0x02 => Self::F32(f32::read(reader)?),
            0x03 => Self::F64(f64::read(reader)?),
            0x04 => Self::FuncRefNull,
            0x05 => Self::ExternRefNull,
            value => {
                return Err(InstructionDecodingError::UnknownEnumValue {
                    enum_name: "WasmGlobalValue",
                    value,
                })
            }
        })
    }
}

impl Payload for TypeId {
    fn write(&self, writer: &mut Writer) {
        writer.write_varint_u32(self.index() as u32);
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, InstructionDecodingError> {
        Ok(Self::from_index(reader.read_varint_u32()?))
    }
}

impl Payload for WasmReferenceKind {
    fn write(&self, writer: &mut Writer) {
        match self {
            Self::Abstract(heap_type) => {
                writer.write_u8(0x00);
                heap_type.write(writer);
            }
            Self::Index(id) => {
                writer.write_u8(0x01);
                id.write(writer);
            }
        }
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, InstructionDecodingError> {
        Ok(match reader.read_u8()? {
            0x00 => Self::Abstract(WasmAbstractHeapType::read(reader)?),
            0x01 => Self::Index(TypeId::read(reader)?),
            value => {
                return Err(InstructionDecodingError::UnknownEnumValue {
                    enum_name: "WasmReferenceKind",
                    value,
                })
            }
        })
    }
}

impl Payload for WasmStorageType {
    fn write(&self, writer: &mut Writer) {
        match self {
            Self::Value(value_type) => {
                writer.write_u8(0x00);
                value_type.write(writer);
            }
            Self::Packed(packed) => {
                writer.write_u8(0x01);
                packed.write(writer);
            }
            Self::Reference { kind, nullable } => {
                writer.write_u8(0x02);
                kind.write(writer);
                nullable.write(writer);
            }
        }
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, InstructionDecodingError> {
        Ok(match reader.read_u8()? {
            0x00 => Self::Value(WasmValueType::read(reader)?),
            0x01 => Self::Packed(WasmPackedType::read(reader)?),
            0x02 => Self::Reference {
                kind: WasmReferenceKind::read(reader)?,
                nullable: bool::read(reader)?,
            },
            value => {
                return Err(InstructionDecodingError::UnknownEnumValue {
                    enum_name: "WasmStorageType",
                    value,
                })
            }
        })
    }
}

impl Payload for WasmStructField {
    fn write(&self, writer: &mut Writer) {
        self.ty.write(writer);
        self.is_mutable.write(writer);
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, InstructionDecodingError> {
        Ok(Self {
            ty: WasmStorageType::read(reader)?,
            is_mutable: bool::read(reader)?,
        })
    }
}

/// Implements [`Payload`] for closed `#[repr(u8)]` enums via their frozen
/// raw values.
macro_rules! wire_enum {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Payload for $ty {
                fn write(&self, writer: &mut Writer) {
                    writer.write_u8(*self as u8);
                }

                fn read(reader: &mut Reader<'_>) -> Result<Self, InstructionDecodingError> {
                    let raw = reader.read_u8()?;
                    <$ty>::try_from(raw).map_err(|value| {
                        InstructionDecodingError::UnknownEnumValue {
                            enum_name: stringify!($ty),
                            value,
                        }
                    })
                }
            }
        )+
    };
}

wire_enum!(
    crate::operations::UnaryOperator,
    crate::operations::BinaryOperator,
    crate::operations::Comparator,
    PropertyConfiguration,
    WasmValueType,
    WasmPackedType,
    WasmAbstractHeapType,
    crate::operations::WasmIntegerBinaryOpKind,
    crate::operations::WasmIntegerUnaryOpKind,
    crate::operations::WasmIntegerCompareOpKind,
    crate::operations::WasmFloatBinaryOpKind,
    crate::operations::WasmFloatUnaryOpKind,
    crate::operations::WasmFloatCompareOpKind,
    crate::operations::WasmConversionKind,
    crate::operations::WasmSimdShape,
    crate::operations::WasmSimdBinaryOpKind,
);

const fn zigzag_encode_32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

const fn zigzag_decode_32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

const fn zigzag_encode_64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

const fn zigzag_decode_64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}
