use crate::builder::CodeBuilder;
use crate::encoding::payload::Payload;
use crate::encoding::{decode_program, encode_program, Reader, Writer};
use crate::error::{InstructionDecodingError, ProgramDecodingError};
use crate::operations::{
    BinaryOperator, Comparator, Opcode, Operation, UnaryOperator, WasmConversionKind,
    WasmIntegerBinaryOpKind, WasmSignature, WasmSimdShape,
};
use crate::{Code, Instruction, Program};
use fuzzil_types::{Variable, WasmValueType};
use proptest::prelude::*;
use std::sync::Arc;
use strum::IntoEnumIterator;

/// A program exercising most operation categories.
fn representative_program() -> Program {
    let mut b = CodeBuilder::new();

    let i = b.load_int(42);
    let f = b.load_float(13.37);
    let s = b.load_string("foo");
    let bi = b.load_bigint(1337);
    let sum = b.binary(i, BinaryOperator::Add, f);
    let neg = b.unary(UnaryOperator::Minus, sum);
    let cmp = b.compare(neg, Comparator::LessThan, bi);

    b.begin_object_literal();
    b.object_literal_add_property("p", i);
    let obj = b.end_object_literal();
    let p = b.get_property(obj, "p");
    b.set_property(obj, "q", s);
    let _deleted = b.delete_property(obj, "p");

    b.begin_if(cmp);
    b.reassign(sum, p);
    b.begin_else();
    b.reassign(sum, i);
    b.end_if();

    let (function, params) = b.begin_plain_function(2, false);
    let local = b.binary(params[0], BinaryOperator::Mul, params[1]);
    b.return_value(Some(local));
    b.end_plain_function();
    let result = b.call_function(function, &[i, f]);

    b.begin_while_header();
    let cond = b.load_bool(true);
    b.begin_while_body(cond);
    b.loop_break();
    b.end_while();

    b.begin_try();
    b.throw(result);
    let caught = b.begin_catch();
    let _typeof = b.type_of(caught);
    b.begin_finally();
    b.end_try_catch_finally();

    b.begin_wasm_module();
    let wasm_params = b.begin_wasm_function(WasmSignature {
        parameters: vec![WasmValueType::I32, WasmValueType::I32],
        results: vec![WasmValueType::I32],
    });
    let c = b.wasm_const_i32(7);
    let op = Operation::new(Opcode::WasmIntegerBinaryOperation {
        value_type: WasmValueType::I32,
        op: WasmIntegerBinaryOpKind::Add,
    });
    let _sum32 = b.emit(op, &[wasm_params[0], c]);
    let _function = b.end_wasm_function();
    let _exports = b.end_wasm_module();

    let mut program = Program::new(b.finish());
    program.add_contributor("CodeBuilder");
    program.comments_mut().set_header("representative program");
    program.comments_mut().set_at_instruction(0, "the first literal");
    program
}

#[test]
fn representative_program_is_valid() {
    assert!(representative_program().code().is_statically_valid());
}

#[test]
fn program_roundtrip() {
    let program = representative_program();
    let encoded = encode_program(&program);
    let decoded = decode_program(&encoded).expect("decoding failed");

    assert_eq!(program, decoded);
    assert!(decoded.code().is_statically_valid());
    // The binary form is bit-exact across a round-trip.
    assert_eq!(encode_program(&decoded), encoded);
}

#[test]
fn roundtrip_with_parent() {
    let parent = representative_program();
    let mut b = CodeBuilder::new();
    b.load_int(1);
    let child = Program::with_parent(b.finish(), Arc::new(parent.clone()));

    let decoded = decode_program(&encode_program(&child)).expect("decoding failed");
    assert_eq!(decoded.parent(), Some(&parent));
}

#[test]
fn deep_copy_preserves_everything() {
    let program = representative_program();
    let copy = program.deep_copy();
    assert_eq!(program, copy);
    assert_eq!(program.id(), copy.id());
}

#[test]
fn shared_operations_use_the_cache() {
    // Two instructions sharing one operation must encode the second as a
    // cache reference and still round-trip.
    let op = Arc::new(Operation::new(Opcode::LoadInteger { value: 7 }));
    let mut code = Code::new();
    code.append(Instruction::with_shared_op(op.clone(), vec![Variable::new(0)]));
    code.append(Instruction::with_shared_op(op, vec![Variable::new(1)]));
    let program = Program::new(code);

    let encoded = encode_program(&program);
    let decoded = decode_program(&encoded).expect("decoding failed");
    assert_eq!(program, decoded);

    // Without sharing, the same code encodes strictly larger.
    let mut unshared = Code::new();
    unshared.append(Instruction::new(
        Operation::new(Opcode::LoadInteger { value: 7 }),
        vec![Variable::new(0)],
    ));
    unshared.append(Instruction::new(
        Operation::new(Opcode::LoadInteger { value: 7 }),
        vec![Variable::new(1)],
    ));
    let unshared_encoded = encode_program(&Program::new(unshared));
    assert!(encoded.len() < unshared_encoded.len());
}

#[test]
fn decoding_rejects_invalid_code() {
    // An input variable that is never defined.
    let mut code = Code::new();
    code.append(Instruction::new(
        Operation::new(Opcode::TypeOf {}),
        vec![Variable::new(5), Variable::new(0)],
    ));
    let encoded = encode_program(&Program::new(code));
    match decode_program(&encoded) {
        Err(ProgramDecodingError::InvalidCode(_)) => {}
        other => panic!("expected InvalidCode, got {other:?}"),
    }
}

#[test]
fn decoding_rejects_truncated_data() {
    let encoded = encode_program(&representative_program());
    for len in 0..encoded.len().min(64) {
        assert!(decode_program(&encoded[..len]).is_err());
    }
}

#[test]
fn decoding_rejects_trailing_data() {
    let mut encoded = encode_program(&representative_program());
    encoded.push(0);
    match decode_program(&encoded) {
        Err(ProgramDecodingError::TrailingData) => {}
        other => panic!("expected TrailingData, got {other:?}"),
    }
}

#[test]
fn unknown_opcode_is_rejected() {
    let mut reader = Reader::new(&[]);
    let error = Opcode::read_payload(0xffff, &mut reader).unwrap_err();
    assert_eq!(error, InstructionDecodingError::UnknownOpcode(0xffff));
}

// The raw values below are part of the wire format. These tests pin them;
// a failure here means the format changed incompatibly.

#[test]
fn operator_raw_values_are_frozen() {
    assert_eq!(BinaryOperator::Add as u8, 0x00);
    assert_eq!(BinaryOperator::Exp as u8, 0x0c);
    assert_eq!(BinaryOperator::UnRShift as u8, 0x0d);
    assert_eq!(UnaryOperator::PreInc as u8, 0x00);
    assert_eq!(UnaryOperator::Minus as u8, 0x07);
    assert_eq!(Comparator::Equal as u8, 0x00);
    assert_eq!(Comparator::GreaterThanOrEqual as u8, 0x07);
    assert_eq!(WasmIntegerBinaryOpKind::Rotr as u8, 0x0e);
    assert_eq!(WasmConversionKind::ReinterpretI64AsF64 as u8, 0x18);
    assert_eq!(WasmSimdShape::F64x2 as u8, 0x05);
}

#[test]
fn opcode_wire_values_are_frozen() {
    assert_eq!(Opcode::Nop {}.wire_value(), 0x0000);
    assert_eq!(Opcode::LoadInteger { value: 0 }.wire_value(), 0x0001);
    assert_eq!(Opcode::BeginIf { inverted: false }.wire_value(), 0x0088);
    assert_eq!(Opcode::EndClassDefinition {}.wire_value(), 0x00c5);
    assert_eq!(Opcode::BeginWasmModule {}.wire_value(), 0x0100);
    assert_eq!(
        Opcode::WasmDefineArrayType {
            element: fuzzil_types::WasmStorageType::Value(WasmValueType::I32),
            is_mutable: false,
        }
        .wire_value(),
        0x0131
    );
}

/// Every closed enum must round-trip through its raw value.
macro_rules! assert_enum_roundtrip {
    ($($ty:ty),+ $(,)?) => {
        $(
            for variant in <$ty>::iter() {
                assert_eq!(<$ty>::try_from(variant as u8), Ok(variant));
            }
        )+
    };
}

#[test]
fn enum_raw_value_roundtrip() {
    assert_enum_roundtrip!(
        UnaryOperator,
        BinaryOperator,
        Comparator,
        crate::operations::PropertyConfiguration,
        WasmIntegerBinaryOpKind,
        crate::operations::WasmIntegerUnaryOpKind,
        crate::operations::WasmIntegerCompareOpKind,
        crate::operations::WasmFloatBinaryOpKind,
        crate::operations::WasmFloatCompareOpKind,
        crate::operations::WasmFloatUnaryOpKind,
        WasmConversionKind,
        WasmSimdShape,
        crate::operations::WasmSimdBinaryOpKind,
    );
}

proptest! {
    #[test]
    fn varint_u64_roundtrip(value in any::<u64>()) {
        let mut writer = Writer::new();
        writer.write_varint_u64(value);
        let bytes = writer.into_bytes();
        let mut reader = Reader::new(&bytes);
        prop_assert_eq!(reader.read_varint_u64().unwrap(), value);
        prop_assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn signed_payload_roundtrip(value in any::<i64>()) {
        let mut writer = Writer::new();
        Payload::write(&value, &mut writer);
        let bytes = writer.into_bytes();
        let mut reader = Reader::new(&bytes);
        prop_assert_eq!(i64::read(&mut reader).unwrap(), value);
    }

    #[test]
    fn float_payload_roundtrip(value in any::<f64>()) {
        let mut writer = Writer::new();
        Payload::write(&value, &mut writer);
        let bytes = writer.into_bytes();
        let mut reader = Reader::new(&bytes);
        let read = f64::read(&mut reader).unwrap();
        prop_assert_eq!(read.to_bits(), value.to_bits());
    }

    #[test]
    fn string_payload_roundtrip(value in ".{0,64}") {
        let mut writer = Writer::new();
        Payload::write(&value, &mut writer);
        let bytes = writer.into_bytes();
        let mut reader = Reader::new(&bytes);
        prop_assert_eq!(String::read(&mut reader).unwrap(), value);
    }

    #[test]
    fn arbitrary_bytes_never_panic_the_decoder(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        // Malformed data must produce errors, not panics.
        let _ = decode_program(&data);
    }
}
