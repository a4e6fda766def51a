//! The bit-exact binary encoding of programs.
//!
//! A serialized instruction stores its variables as a flat array of
//! varints followed by its operation: either a full encoding of the tagged
//! payload, or a back-reference into a small operation cache. Writer and
//! reader populate that cache in identical order (every inline-encoded
//! operation is appended on both sides), so a cache reference is a plain
//! 32-bit little-endian index. Arities of variadic operations are not
//! stored; they are recovered from the variable count at decode time.
//!
//! A standalone serialized program is stored in a `.fzil` file containing
//! the encoded [`Program`] and nothing else.

pub(crate) mod payload;

use crate::error::{InstructionDecodingError, ProgramDecodingError};
use crate::{Code, Instruction, InstructionFlags, Operation, Opcode, Program};
use fuzzil_types::{Variable, MAX_NUMBER_OF_VARIABLES};
use payload::Payload;
use std::collections::HashMap;
use std::sync::Arc;

const OPERATION_INLINE: u8 = 0x00;
const OPERATION_CACHED: u8 = 0x01;

/// The number of operations remembered by an [`OperationCache`].
const OPERATION_CACHE_SIZE: usize = 1024;

/// A byte sink for the wire format.
pub(crate) struct Writer {
    buffer: Vec<u8>,
}

impl Writer {
    pub(crate) fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    pub(crate) fn write_u8(&mut self, byte: u8) {
        self.buffer.push(byte);
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    pub(crate) fn write_u32_le(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub(crate) fn write_varint_u32(&mut self, value: u32) {
        self.write_varint_u64(u64::from(value));
    }

    pub(crate) fn write_varint_u64(&mut self, mut value: u64) {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.write_u8(byte);
                return;
            }
            self.write_u8(byte | 0x80);
        }
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

/// A byte source for the wire format.
pub(crate) struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len()
    }

    fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, InstructionDecodingError> {
        let (&byte, rest) = self
            .data
            .split_first()
            .ok_or(InstructionDecodingError::UnexpectedEndOfData)?;
        self.data = rest;
        Ok(byte)
    }

    pub(crate) fn read_exact(&mut self, len: usize) -> Result<&'a [u8], InstructionDecodingError> {
        if len > self.data.len() {
            return Err(InstructionDecodingError::UnexpectedEndOfData);
        }
        let (bytes, rest) = self.data.split_at(len);
        self.data = rest;
        Ok(bytes)
    }

    pub(crate) fn read_u32_le(&mut self) -> Result<u32, InstructionDecodingError> {
        let bytes = self.read_exact(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub(crate) fn read_varint_u32(&mut self) -> Result<u32, InstructionDecodingError> {
        let value = self.read_varint_u64()?;
        u32::try_from(value).map_err(|_| InstructionDecodingError::MalformedVarint)
    }

    pub(crate) fn read_varint_u64(&mut self) -> Result<u64, InstructionDecodingError> {
        let mut value: u64 = 0;
        for shift in 0..10 {
            let byte = self.read_u8()?;
            value |= u64::from(byte & 0x7f) << (7 * shift);
            if byte & 0x80 == 0 {
                if shift == 9 && byte > 0x01 {
                    return Err(InstructionDecodingError::MalformedVarint);
                }
                return Ok(value);
            }
        }
        Err(InstructionDecodingError::MalformedVarint)
    }
}

/// The operation cache shared between an encoder and a decoder.
///
/// Instructions frequently share their operation (splicing and mutation
/// copy instructions by reference), so repeated operations are encoded as
/// an index into this cache. Once full, the cache stops accepting entries;
/// both sides apply the same rule, keeping their indices aligned.
#[derive(Debug, Default)]
pub struct OperationCache {
    entries: Vec<Arc<Operation>>,
    // Writer-side lookup by operation identity.
    indices: HashMap<usize, u32>,
}

impl OperationCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup(&self, operation: &Arc<Operation>) -> Option<u32> {
        self.indices
            .get(&(Arc::as_ptr(operation) as usize))
            .copied()
    }

    fn get(&self, index: u32) -> Option<Arc<Operation>> {
        self.entries.get(index as usize).cloned()
    }

    fn add(&mut self, operation: Arc<Operation>) {
        if self.entries.len() >= OPERATION_CACHE_SIZE {
            return;
        }
        let index = self.entries.len() as u32;
        self.indices
            .insert(Arc::as_ptr(&operation) as usize, index);
        self.entries.push(operation);
    }
}

fn write_instruction(writer: &mut Writer, cache: &mut OperationCache, instruction: &Instruction) {
    let inouts = instruction.inouts();
    writer.write_varint_u32(inouts.len() as u32);
    for variable in inouts {
        writer.write_varint_u32(variable.number() as u32);
    }
    writer.write_u8(instruction.flags().bits());

    let operation = instruction.shared_operation();
    if let Some(index) = cache.lookup(operation) {
        tracing::trace!(index, operation = operation.name(), "operation cache hit");
        writer.write_u8(OPERATION_CACHED);
        writer.write_u32_le(index);
    } else {
        writer.write_u8(OPERATION_INLINE);
        writer.write_varint_u32(u32::from(operation.opcode().wire_value()));
        operation.opcode().write_payload(writer);
        cache.add(operation.clone());
    }
}

fn read_instruction(
    reader: &mut Reader<'_>,
    cache: &mut OperationCache,
) -> Result<Instruction, InstructionDecodingError> {
    let num_inouts = reader.read_varint_u32()? as usize;
    if num_inouts > reader.remaining() {
        return Err(InstructionDecodingError::UnexpectedEndOfData);
    }
    // Arities are stored as u16 on the operation.
    if num_inouts > u16::MAX as usize {
        return Err(InstructionDecodingError::InconsistentArity(num_inouts));
    }
    let mut inouts = Vec::with_capacity(num_inouts);
    for _ in 0..num_inouts {
        let number = reader.read_varint_u32()?;
        if number as usize >= MAX_NUMBER_OF_VARIABLES {
            return Err(InstructionDecodingError::InvalidVariable(number));
        }
        inouts.push(Variable::new(number as usize));
    }
    let flags = InstructionFlags::from_bits(reader.read_u8()?)
        .ok_or(InstructionDecodingError::ValueOutOfRange)?;

    let operation = match reader.read_u8()? {
        OPERATION_INLINE => {
            let wire_value = u16::try_from(reader.read_varint_u32()?)
                .map_err(|_| InstructionDecodingError::MalformedVarint)?;
            let opcode = Opcode::read_payload(wire_value, reader)?;
            let operation = Arc::new(Operation::from_wire(opcode, num_inouts)?);
            cache.add(operation.clone());
            operation
        }
        OPERATION_CACHED => {
            let index = reader.read_u32_le()?;
            let operation = cache
                .get(index)
                .ok_or(InstructionDecodingError::InvalidCacheReference(index))?;
            if operation.num_inouts() != num_inouts {
                return Err(InstructionDecodingError::InconsistentArity(num_inouts));
            }
            operation
        }
        value => {
            return Err(InstructionDecodingError::UnknownEnumValue {
                enum_name: "operation tag",
                value,
            })
        }
    };

    Ok(Instruction::with_flags(operation, inouts, flags))
}

fn write_program(writer: &mut Writer, program: &Program) {
    let mut cache = OperationCache::new();

    writer.write_bytes(program.id().as_bytes());
    writer.write_varint_u32(program.code().len() as u32);
    for instruction in program.code() {
        write_instruction(writer, &mut cache, instruction);
    }

    Payload::write(&program.comments().header().map(str::to_owned), writer);
    let instruction_comments = program.comments().at_instructions();
    writer.write_varint_u32(instruction_comments.len() as u32);
    for (&index, text) in instruction_comments {
        writer.write_varint_u32(u32::from(index));
        Payload::write(text, writer);
    }

    Payload::write(&program.contributors().to_vec(), writer);

    match program.parent() {
        Some(parent) => {
            writer.write_u8(1);
            // The parent is a self-contained message with its own cache.
            write_program(writer, parent);
        }
        None => writer.write_u8(0),
    }
}

fn read_program(reader: &mut Reader<'_>) -> Result<Program, ProgramDecodingError> {
    use ProgramDecodingError::Envelope;

    let mut cache = OperationCache::new();

    let uuid_bytes = reader.read_exact(16).map_err(Envelope)?;
    let mut uuid = [0u8; 16];
    uuid.copy_from_slice(uuid_bytes);
    let id = uuid::Uuid::from_bytes(uuid);

    let num_instructions = reader.read_varint_u32().map_err(Envelope)? as usize;
    if num_instructions > reader.remaining() {
        return Err(Envelope(InstructionDecodingError::UnexpectedEndOfData));
    }
    if num_instructions > crate::MAX_CODE_LENGTH {
        return Err(Envelope(InstructionDecodingError::ValueOutOfRange));
    }
    let mut code = Code::new();
    for index in 0..num_instructions {
        let instruction = read_instruction(reader, &mut cache)
            .map_err(|source| ProgramDecodingError::Instruction { index, source })?;
        code.append(instruction);
    }

    let header: Option<String> = Payload::read(reader).map_err(Envelope)?;
    let num_comments = reader.read_varint_u32().map_err(Envelope)? as usize;
    if num_comments > reader.remaining() {
        return Err(Envelope(InstructionDecodingError::UnexpectedEndOfData));
    }
    let mut comments = crate::ProgramComments::new();
    if let Some(header) = header {
        comments.set_header(header);
    }
    for _ in 0..num_comments {
        let index = reader.read_varint_u32().map_err(Envelope)?;
        let text: String = Payload::read(reader).map_err(Envelope)?;
        let index =
            u16::try_from(index).map_err(|_| ProgramDecodingError::InvalidComment {
                index: index as usize,
            })?;
        if usize::from(index) >= code.len() {
            return Err(ProgramDecodingError::InvalidComment {
                index: usize::from(index),
            });
        }
        comments.set_at_instruction(index, text);
    }

    let contributors: Vec<String> = Payload::read(reader).map_err(Envelope)?;

    let parent = match reader.read_u8().map_err(Envelope)? {
        0 => None,
        _ => Some(Arc::new(read_program(reader)?)),
    };

    code.check()?;

    Ok(Program::from_parts(id, code, comments, contributors, parent))
}

/// Encodes a program into its binary form.
pub fn encode_program(program: &Program) -> Vec<u8> {
    let mut writer = Writer::new();
    write_program(&mut writer, program);
    writer.into_bytes()
}

/// Decodes a program from its binary form, verifying its static validity.
pub fn decode_program(data: &[u8]) -> Result<Program, ProgramDecodingError> {
    let mut reader = Reader::new(data);
    let program = read_program(&mut reader)?;
    if !reader.is_empty() {
        return Err(ProgramDecodingError::TrailingData);
    }
    Ok(program)
}
