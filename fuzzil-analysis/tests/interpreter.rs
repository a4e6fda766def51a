//! End-to-end scenarios for the abstract interpreter.

use fuzzil_analysis::{AbstractInterpreter, VanillaEnvironment};
use fuzzil_ir::builder::CodeBuilder;
use fuzzil_ir::{BinaryOperator, Code};
use fuzzil_types::{Type, Variable};
use test_case::test_case;

/// Runs the interpreter over `code`, returning the per-instruction type
/// change events.
fn run(code: &Code) -> Vec<Vec<(Variable, Type)>> {
    assert!(code.is_statically_valid());
    let environment = VanillaEnvironment::new();
    let mut interpreter = AbstractInterpreter::new(&environment);
    let events = code
        .iter()
        .map(|instruction| interpreter.analyze(instruction))
        .collect();
    assert!(interpreter.at_base_state());
    events
}

#[test]
fn literals_and_mixed_addition() {
    let mut b = CodeBuilder::new();
    let v0 = b.load_int(1);
    let v1 = b.load_string("x");
    let v2 = b.binary(v0, BinaryOperator::Add, v1);
    let events = run(&b.finish());

    assert_eq!(events[0], vec![(v0, Type::integer())]);
    assert_eq!(events[1], vec![(v1, Type::string())]);
    // Adding an integer to a string yields some primitive.
    assert_eq!(events[2], vec![(v2, Type::primitive())]);
}

#[test_case(BinaryOperator::Add, Type::primitive() ; "addition can concatenate")]
#[test_case(BinaryOperator::Sub, Type::number() ; "subtraction is numeric")]
#[test_case(BinaryOperator::Exp, Type::number() ; "exponentiation is numeric")]
#[test_case(BinaryOperator::BitAnd, Type::integer() ; "bitwise ops produce integers")]
#[test_case(BinaryOperator::UnRShift, Type::integer() ; "shifts produce integers")]
#[test_case(BinaryOperator::LogicOr, Type::boolean() ; "logical ops produce booleans")]
fn binary_operator_fallbacks(op: BinaryOperator, expected: Type) {
    let mut b = CodeBuilder::new();
    let lhs = b.load_string("a");
    let rhs = b.load_string("b");
    let out = b.binary(lhs, op, rhs);
    let events = run(&b.finish());
    assert_eq!(events[2], vec![(out, expected)]);
}

#[test]
fn bigint_contagion() {
    let mut b = CodeBuilder::new();
    let v0 = b.load_bigint(1);
    let v1 = b.load_int(1);
    let v2 = b.binary(v0, BinaryOperator::Mul, v1);
    let events = run(&b.finish());

    let (variable, ty) = &events[2][0];
    assert_eq!(*variable, v2);
    assert!(ty.may_be(&Type::bigint()), "{ty} must contain bigint");
    assert_eq!(*ty, Type::number() | Type::bigint());
}

#[test]
fn definitely_bigint_operands_produce_bigint() {
    let mut b = CodeBuilder::new();
    let v0 = b.load_bigint(1);
    let v1 = b.load_bigint(2);
    let v2 = b.binary(v0, BinaryOperator::Add, v1);
    let events = run(&b.finish());

    assert_eq!(events[2], vec![(v2, Type::bigint())]);
}

#[test]
fn if_else_reassignments_merge_to_the_union() {
    let mut b = CodeBuilder::new();
    let v0 = b.load_int(0);
    b.begin_if(v0);
    let v1 = b.load_string("a");
    b.reassign(v0, v1);
    b.begin_else();
    let v2 = b.load_float(1.0);
    b.reassign(v0, v2);
    b.end_if();
    let code = b.finish();
    let events = run(&code);

    let after_end_if = events.last().unwrap();
    assert_eq!(
        after_end_if,
        &vec![(v0, Type::string() | Type::float())]
    );
}

#[test]
fn if_without_else_keeps_the_entry_type_as_an_alternative() {
    let mut b = CodeBuilder::new();
    let v0 = b.load_int(0);
    b.begin_if(v0);
    let v1 = b.load_string("a");
    b.reassign(v0, v1);
    b.end_if();
    let events = run(&b.finish());

    let after_end_if = events.last().unwrap();
    assert_eq!(
        after_end_if,
        &vec![(v0, Type::string() | Type::integer())]
    );
}

#[test]
fn deleted_properties_narrow_the_object_type() {
    let mut b = CodeBuilder::new();
    let p = b.load_int(0);
    let q = b.load_string("s");
    b.begin_object_literal();
    b.object_literal_add_property("p", p);
    b.object_literal_add_property("q", q);
    let object = b.end_object_literal();
    b.delete_property(object, "p");
    let code = b.finish();

    let environment = VanillaEnvironment::new();
    let mut interpreter = AbstractInterpreter::new(&environment);
    for instruction in &code {
        interpreter.analyze(instruction);
    }

    let ty = interpreter.type_of(object);
    assert!(ty.is_a(&Type::object()));
    assert!(ty.has_property("q"));
    assert!(!ty.has_property("p"));
}

#[test]
fn stored_properties_widen_the_object_type() {
    let mut b = CodeBuilder::new();
    let value = b.load_int(0);
    b.begin_object_literal();
    let object = b.end_object_literal();
    b.set_property(object, "fresh", value);
    let code = b.finish();

    let environment = VanillaEnvironment::new();
    let mut interpreter = AbstractInterpreter::new(&environment);
    for instruction in &code {
        interpreter.analyze(instruction);
    }
    assert!(interpreter.type_of(object).has_property("fresh"));
}

#[test]
fn class_definitions_type_this_as_the_instance() {
    let mut b = CodeBuilder::new();
    let class = b.begin_class(None);
    let (this, params) = b.begin_class_constructor(1);
    b.dup(params[0]);
    b.end_class_constructor();
    b.end_class();
    let code = b.finish();

    let environment = VanillaEnvironment::new();
    let mut interpreter = AbstractInterpreter::new(&environment);
    let mut this_type = Type::nothing();
    for (index, instruction) in code.iter().enumerate() {
        interpreter.analyze(instruction);
        if index == 1 {
            assert!(interpreter.currently_analyzing_class());
            this_type = interpreter.type_of(this);
        }
    }

    // Inside the constructor, `this` is a freshly constructed instance.
    assert!(this_type.is_a(&Type::object()));
    assert!(this_type.group().unwrap().starts_with("_fuzz_Class"));
    // The class variable itself is a constructor producing that instance.
    let class_type = interpreter.type_of(class);
    assert!(class_type.is_a(&Type::constructor(None)));
    // After the definition ends the class stack is empty again.
    assert!(!interpreter.currently_analyzing_class());
}

#[test]
fn methods_widen_the_instance_type_in_declaration_order() {
    let mut b = CodeBuilder::new();
    b.begin_class(None);
    let (first_this, _) = b.begin_class_instance_method("m", 0);
    b.end_class_instance_method();
    let (second_this, _) = b.begin_class_instance_method("n", 0);
    b.end_class_instance_method();
    b.end_class();
    let code = b.finish();

    let environment = VanillaEnvironment::new();
    let mut interpreter = AbstractInterpreter::new(&environment);
    let mut first = Type::nothing();
    let mut second = Type::nothing();
    for (index, instruction) in code.iter().enumerate() {
        interpreter.analyze(instruction);
        if index == 1 {
            first = interpreter.type_of(first_this);
        }
        if index == 3 {
            second = interpreter.type_of(second_this);
        }
    }

    assert!(first.has_method("m"));
    assert!(!first.has_method("n"));
    assert!(second.has_method("m"));
    assert!(second.has_method("n"));
}

#[test]
fn while_loop_header_variables_survive_but_body_locals_do_not() {
    let mut b = CodeBuilder::new();
    b.begin_while_header();
    let v0 = b.load_int(0);
    b.begin_while_body(v0);
    let v1 = b.load_string("s");
    b.end_while();
    let code = b.finish();

    let environment = VanillaEnvironment::new();
    let mut interpreter = AbstractInterpreter::new(&environment);
    for instruction in &code {
        interpreter.analyze(instruction);
    }

    assert!(interpreter.is_known(v0));
    assert_eq!(interpreter.type_of(v0), Type::integer());
    assert!(!interpreter.is_known(v1));
}

#[test]
fn loop_body_reassignments_union_with_the_entry_type() {
    let mut b = CodeBuilder::new();
    let v0 = b.load_int(0);
    b.begin_while_header();
    let cond = b.load_bool(true);
    b.begin_while_body(cond);
    let s = b.load_string("s");
    b.reassign(v0, s);
    b.end_while();
    let code = b.finish();

    let environment = VanillaEnvironment::new();
    let mut interpreter = AbstractInterpreter::new(&environment);
    for instruction in &code {
        interpreter.analyze(instruction);
    }

    // The body may run zero times, so the integer stays possible.
    assert_eq!(
        interpreter.type_of(v0),
        Type::string() | Type::integer()
    );
}

#[test]
fn function_bodies_merge_conservatively() {
    let mut b = CodeBuilder::new();
    let v0 = b.load_int(0);
    let (function, _) = b.begin_plain_function(0, false);
    let s = b.load_string("s");
    b.reassign(v0, s);
    b.end_plain_function();
    let code = b.finish();

    let environment = VanillaEnvironment::new();
    let mut interpreter = AbstractInterpreter::new(&environment);
    for instruction in &code {
        interpreter.analyze(instruction);
    }

    // The function may be called at any later point, or never.
    assert_eq!(
        interpreter.type_of(v0),
        Type::string() | Type::integer()
    );
    let function_type = interpreter.type_of(function);
    assert!(function_type.is_a(&Type::function(None)));
    assert!(function_type.is_a(&Type::constructor(None)));
    assert!(function_type.signature().is_some());
}

#[test]
fn ternary_results_union_both_arms() {
    let mut b = CodeBuilder::new();
    let cond = b.load_bool(true);
    let a = b.load_int(1);
    let s = b.load_string("x");
    let result = b.ternary(cond, a, s);
    let events = run(&b.finish());

    assert_eq!(
        events[3],
        vec![(result, Type::integer() | Type::string())]
    );
}

#[test]
fn for_in_keys_are_strings_and_catch_bindings_are_unknown() {
    let mut b = CodeBuilder::new();
    b.begin_object_literal();
    let object = b.end_object_literal();
    let key = b.begin_for_in(object);
    b.end_for_in();
    b.begin_try();
    b.throw(object);
    let caught = b.begin_catch();
    b.end_try_catch_finally();
    let code = b.finish();

    let environment = VanillaEnvironment::new();
    let mut interpreter = AbstractInterpreter::new(&environment);
    let mut key_type = Type::nothing();
    let mut caught_type = Type::nothing();
    for (index, instruction) in code.iter().enumerate() {
        interpreter.analyze(instruction);
        if index == 2 {
            key_type = interpreter.type_of(key);
        }
        if index == 6 {
            caught_type = interpreter.type_of(caught);
        }
    }

    assert_eq!(key_type, Type::string());
    assert_eq!(caught_type, Type::unknown());
}

#[test]
fn switch_cases_merge_like_alternatives() {
    use fuzzil_ir::{Opcode, Operation};

    let mut b = CodeBuilder::new();
    let v0 = b.load_int(0);
    let one = b.load_int(1);
    b.emit(Operation::new(Opcode::BeginSwitch {}), &[v0]);
    b.emit(Operation::new(Opcode::BeginSwitchCase {}), &[one]);
    let s = b.load_string("a");
    b.reassign(v0, s);
    b.emit(
        Operation::new(Opcode::EndSwitchCase {
            falls_through: false,
        }),
        &[],
    );
    b.emit(Operation::new(Opcode::BeginSwitchDefaultCase {}), &[]);
    let f = b.load_float(1.0);
    b.reassign(v0, f);
    b.emit(
        Operation::new(Opcode::EndSwitchCase {
            falls_through: false,
        }),
        &[],
    );
    b.emit(Operation::new(Opcode::EndSwitch {}), &[]);
    let code = b.finish();

    let environment = VanillaEnvironment::new();
    let mut interpreter = AbstractInterpreter::new(&environment);
    for instruction in &code {
        interpreter.analyze(instruction);
    }

    // The scrutinee may match no case: integer stays possible alongside
    // the case updates.
    let ty = interpreter.type_of(v0);
    assert!(ty.may_be(&Type::string()));
    assert!(ty.may_be(&Type::float()));
    assert!(ty.may_be(&Type::integer()));
}

#[test]
fn wasm_outputs_are_typed_from_their_declared_value_types() {
    use fuzzil_ir::{Opcode, Operation, WasmIntegerBinaryOpKind, WasmSignature};
    use fuzzil_types::WasmValueType;

    let mut b = CodeBuilder::new();
    b.begin_wasm_module();
    let params = b.begin_wasm_function(WasmSignature {
        parameters: vec![WasmValueType::I64],
        results: vec![],
    });
    let c = b.wasm_const_i32(1);
    let widened = b.emit(
        Operation::new(Opcode::WasmConversion {
            kind: fuzzil_ir::WasmConversionKind::ExtendI32SToI64,
        }),
        &[c],
    )[0];
    let sum = b.emit(
        Operation::new(Opcode::WasmIntegerBinaryOperation {
            value_type: WasmValueType::I64,
            op: WasmIntegerBinaryOpKind::Add,
        }),
        &[params[0], widened],
    )[0];
    let function = b.end_wasm_function();
    let exports = b.end_wasm_module();
    let code = b.finish();

    let environment = VanillaEnvironment::new();
    let mut interpreter = AbstractInterpreter::new(&environment);
    let mut inside = Vec::new();
    let mut function_type = Type::nothing();
    for (index, instruction) in code.iter().enumerate() {
        interpreter.analyze(instruction);
        if index == 4 {
            inside.push(interpreter.type_of(params[0]));
            inside.push(interpreter.type_of(c));
            inside.push(interpreter.type_of(widened));
            inside.push(interpreter.type_of(sum));
        }
        if index == 5 {
            // The function definition is module-scoped; its type is gone
            // once the module ends.
            function_type = interpreter.type_of(function);
        }
    }

    assert_eq!(inside[0], Type::wasm_i64());
    assert_eq!(inside[1], Type::wasm_i32());
    assert_eq!(inside[2], Type::wasm_i64());
    assert_eq!(inside[3], Type::wasm_i64());

    assert!(function_type.is_a(&Type::wasm_anything()));
    assert!(!interpreter.is_known(function));
    let exports_type = interpreter.type_of(exports);
    assert!(exports_type.group().unwrap().starts_with("_fuzz_WasmExports"));
}
