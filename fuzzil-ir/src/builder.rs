//! A small code-construction helper for tests and benchmarks.
//!
//! The real program generator lives in the embedding fuzzer; this builder
//! only allocates variables, assembles instructions and appends them, so
//! tests can write programs without hand-numbering variables.

use crate::operations::{
    BinaryOperator, Comparator, Opcode, Parameters, UnaryOperator, WasmSignature,
};
use crate::{Code, Instruction, Operation};
use fuzzil_types::Variable;

/// Builds [`Code`] incrementally, allocating variable numbers on demand.
#[derive(Debug, Default)]
pub struct CodeBuilder {
    code: Code,
    num_variables: usize,
}

impl CodeBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of variables allocated so far.
    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    /// Finishes building and returns the code.
    pub fn finish(self) -> Code {
        self.code
    }

    fn next_variable(&mut self) -> Variable {
        let variable = Variable::new(self.num_variables);
        self.num_variables += 1;
        variable
    }

    /// Appends an instruction for `op` with the given inputs, allocating
    /// its outputs. Returns all outputs, outer first, then inner.
    pub fn emit(&mut self, op: Operation, inputs: &[Variable]) -> Vec<Variable> {
        assert_eq!(inputs.len(), op.num_inputs(), "wrong input count for {op}");
        let num_new = op.num_outputs() + op.num_inner_outputs();
        let mut inouts = inputs.to_vec();
        let mut outputs = Vec::with_capacity(num_new);
        for _ in 0..num_new {
            let variable = self.next_variable();
            inouts.push(variable);
            outputs.push(variable);
        }
        self.code.append(Instruction::new(op, inouts));
        outputs
    }

    fn emit_one(&mut self, op: Operation, inputs: &[Variable]) -> Variable {
        self.emit(op, inputs)[0]
    }

    fn emit_none(&mut self, op: Operation, inputs: &[Variable]) {
        let outputs = self.emit(op, inputs);
        debug_assert!(outputs.is_empty());
    }

    // --- Literals. ---

    /// `v = <integer>`
    pub fn load_int(&mut self, value: i64) -> Variable {
        self.emit_one(Operation::new(Opcode::LoadInteger { value }), &[])
    }

    /// `v = <bigint>`
    pub fn load_bigint(&mut self, value: i64) -> Variable {
        self.emit_one(Operation::new(Opcode::LoadBigInt { value }), &[])
    }

    /// `v = <float>`
    pub fn load_float(&mut self, value: f64) -> Variable {
        self.emit_one(Operation::new(Opcode::LoadFloat { value }), &[])
    }

    /// `v = <string>`
    pub fn load_string(&mut self, value: &str) -> Variable {
        self.emit_one(
            Operation::new(Opcode::LoadString {
                value: value.to_owned(),
            }),
            &[],
        )
    }

    /// `v = <bool>`
    pub fn load_bool(&mut self, value: bool) -> Variable {
        self.emit_one(Operation::new(Opcode::LoadBoolean { value }), &[])
    }

    /// `v = undefined`
    pub fn load_undefined(&mut self) -> Variable {
        self.emit_one(Operation::new(Opcode::LoadUndefined {}), &[])
    }

    /// `v = null`
    pub fn load_null(&mut self) -> Variable {
        self.emit_one(Operation::new(Opcode::LoadNull {}), &[])
    }

    // --- Operators. ---

    /// `v = lhs <op> rhs`
    pub fn binary(&mut self, lhs: Variable, op: BinaryOperator, rhs: Variable) -> Variable {
        self.emit_one(Operation::new(Opcode::BinaryOperation { op }), &[lhs, rhs])
    }

    /// `v = <op> input`
    pub fn unary(&mut self, op: UnaryOperator, input: Variable) -> Variable {
        self.emit_one(Operation::new(Opcode::UnaryOperation { op }), &[input])
    }

    /// `v = lhs <cmp> rhs`
    pub fn compare(&mut self, lhs: Variable, op: Comparator, rhs: Variable) -> Variable {
        self.emit_one(Operation::new(Opcode::Compare { op }), &[lhs, rhs])
    }

    /// `v = cond ? then : else`
    pub fn ternary(&mut self, condition: Variable, then: Variable, other: Variable) -> Variable {
        self.emit_one(
            Operation::new(Opcode::TernaryOperation {}),
            &[condition, then, other],
        )
    }

    /// `v = typeof input`
    pub fn type_of(&mut self, input: Variable) -> Variable {
        self.emit_one(Operation::new(Opcode::TypeOf {}), &[input])
    }

    /// `v = input` as a fresh variable
    pub fn dup(&mut self, input: Variable) -> Variable {
        self.emit_one(Operation::new(Opcode::Dup {}), &[input])
    }

    /// `target = value`
    pub fn reassign(&mut self, target: Variable, value: Variable) {
        self.emit_none(Operation::new(Opcode::Reassign {}), &[target, value]);
    }

    // --- Objects. ---

    /// Opens an object literal.
    pub fn begin_object_literal(&mut self) {
        self.emit_none(Operation::new(Opcode::BeginObjectLiteral {}), &[]);
    }

    /// Adds `name: value` to the enclosing object literal.
    pub fn object_literal_add_property(&mut self, name: &str, value: Variable) {
        self.emit_none(
            Operation::new(Opcode::ObjectLiteralAddProperty {
                property_name: name.to_owned(),
            }),
            &[value],
        );
    }

    /// Closes an object literal, returning the object.
    pub fn end_object_literal(&mut self) -> Variable {
        self.emit_one(Operation::new(Opcode::EndObjectLiteral {}), &[])
    }

    /// `v = object.<name>`
    pub fn get_property(&mut self, object: Variable, name: &str) -> Variable {
        self.emit_one(
            Operation::new(Opcode::GetProperty {
                property_name: name.to_owned(),
                is_guarded: false,
            }),
            &[object],
        )
    }

    /// `object.<name> = value`
    pub fn set_property(&mut self, object: Variable, name: &str, value: Variable) {
        self.emit_none(
            Operation::new(Opcode::SetProperty {
                property_name: name.to_owned(),
            }),
            &[object, value],
        );
    }

    /// `v = delete object.<name>`
    pub fn delete_property(&mut self, object: Variable, name: &str) -> Variable {
        self.emit_one(
            Operation::new(Opcode::DeleteProperty {
                property_name: name.to_owned(),
                is_guarded: false,
            }),
            &[object],
        )
    }

    // --- Calls. ---

    /// `v = callee(...)`
    pub fn call_function(&mut self, callee: Variable, arguments: &[Variable]) -> Variable {
        let mut inputs = vec![callee];
        inputs.extend_from_slice(arguments);
        self.emit_one(
            Operation::with_variadic(
                Opcode::CallFunction { is_guarded: false },
                arguments.len(),
            ),
            &inputs,
        )
    }

    /// `v = new callee(...)`
    pub fn construct(&mut self, callee: Variable, arguments: &[Variable]) -> Variable {
        let mut inputs = vec![callee];
        inputs.extend_from_slice(arguments);
        self.emit_one(
            Operation::with_variadic(Opcode::Construct { is_guarded: false }, arguments.len()),
            &inputs,
        )
    }

    /// `v = object.<name>(...)`
    pub fn call_method(
        &mut self,
        object: Variable,
        name: &str,
        arguments: &[Variable],
    ) -> Variable {
        let mut inputs = vec![object];
        inputs.extend_from_slice(arguments);
        self.emit_one(
            Operation::with_variadic(
                Opcode::CallMethod {
                    method_name: name.to_owned(),
                    is_guarded: false,
                },
                arguments.len(),
            ),
            &inputs,
        )
    }

    // --- Control flow. ---

    /// `if (condition) {`
    pub fn begin_if(&mut self, condition: Variable) {
        self.emit_none(
            Operation::new(Opcode::BeginIf { inverted: false }),
            &[condition],
        );
    }

    /// `} else {`
    pub fn begin_else(&mut self) {
        self.emit_none(Operation::new(Opcode::BeginElse {}), &[]);
    }

    /// `}` closing an if statement
    pub fn end_if(&mut self) {
        self.emit_none(Operation::new(Opcode::EndIf {}), &[]);
    }

    /// Opens the header of a while loop.
    pub fn begin_while_header(&mut self) {
        self.emit_none(Operation::new(Opcode::BeginWhileLoopHeader {}), &[]);
    }

    /// Closes the header and opens the body of a while loop.
    pub fn begin_while_body(&mut self, condition: Variable) {
        self.emit_none(Operation::new(Opcode::BeginWhileLoopBody {}), &[condition]);
    }

    /// Closes a while loop.
    pub fn end_while(&mut self) {
        self.emit_none(Operation::new(Opcode::EndWhileLoop {}), &[]);
    }

    /// Opens a for-in loop, returning the key variable.
    pub fn begin_for_in(&mut self, object: Variable) -> Variable {
        self.emit(Operation::new(Opcode::BeginForInLoop {}), &[object])[0]
    }

    /// Closes a for-in loop.
    pub fn end_for_in(&mut self) {
        self.emit_none(Operation::new(Opcode::EndForInLoop {}), &[]);
    }

    /// Opens a for-of loop, returning the element variable.
    pub fn begin_for_of(&mut self, object: Variable) -> Variable {
        self.emit(Operation::new(Opcode::BeginForOfLoop {}), &[object])[0]
    }

    /// Closes a for-of loop.
    pub fn end_for_of(&mut self) {
        self.emit_none(Operation::new(Opcode::EndForOfLoop {}), &[]);
    }

    /// Opens a repeat loop, returning the counter if exposed.
    pub fn begin_repeat(&mut self, iterations: i64, expose_counter: bool) -> Option<Variable> {
        self.emit(
            Operation::new(Opcode::BeginRepeatLoop {
                iterations,
                exposes_loop_counter: expose_counter,
            }),
            &[],
        )
        .first()
        .copied()
    }

    /// Closes a repeat loop.
    pub fn end_repeat(&mut self) {
        self.emit_none(Operation::new(Opcode::EndRepeatLoop {}), &[]);
    }

    /// `break` out of the enclosing loop
    pub fn loop_break(&mut self) {
        self.emit_none(Operation::new(Opcode::LoopBreak {}), &[]);
    }

    // --- Functions. ---

    /// Opens a plain function definition, returning the function variable
    /// and its parameters.
    pub fn begin_plain_function(
        &mut self,
        count: u16,
        has_rest: bool,
    ) -> (Variable, Vec<Variable>) {
        let outputs = self.emit(
            Operation::new(Opcode::BeginPlainFunction {
                parameters: Parameters { count, has_rest },
            }),
            &[],
        );
        (outputs[0], outputs[1..].to_vec())
    }

    /// Closes a plain function definition.
    pub fn end_plain_function(&mut self) {
        self.emit_none(Operation::new(Opcode::EndPlainFunction {}), &[]);
    }

    /// `return value` or a bare `return`
    pub fn return_value(&mut self, value: Option<Variable>) {
        match value {
            Some(value) => self.emit_none(
                Operation::new(Opcode::Return { has_value: true }),
                &[value],
            ),
            None => self.emit_none(Operation::new(Opcode::Return { has_value: false }), &[]),
        }
    }

    // --- Classes. ---

    /// Opens a class definition, returning the class variable.
    pub fn begin_class(&mut self, superclass: Option<Variable>) -> Variable {
        match superclass {
            Some(superclass) => self.emit_one(
                Operation::new(Opcode::BeginClassDefinition {
                    has_superclass: true,
                }),
                &[superclass],
            ),
            None => self.emit_one(
                Operation::new(Opcode::BeginClassDefinition {
                    has_superclass: false,
                }),
                &[],
            ),
        }
    }

    /// Opens the class constructor, returning `this` and the parameters.
    pub fn begin_class_constructor(&mut self, count: u16) -> (Variable, Vec<Variable>) {
        let outputs = self.emit(
            Operation::new(Opcode::BeginClassConstructor {
                parameters: Parameters {
                    count,
                    has_rest: false,
                },
            }),
            &[],
        );
        (outputs[0], outputs[1..].to_vec())
    }

    /// Closes the class constructor.
    pub fn end_class_constructor(&mut self) {
        self.emit_none(Operation::new(Opcode::EndClassConstructor {}), &[]);
    }

    /// Opens an instance method, returning `this` and the parameters.
    pub fn begin_class_instance_method(
        &mut self,
        name: &str,
        count: u16,
    ) -> (Variable, Vec<Variable>) {
        let outputs = self.emit(
            Operation::new(Opcode::BeginClassInstanceMethod {
                method_name: name.to_owned(),
                parameters: Parameters {
                    count,
                    has_rest: false,
                },
            }),
            &[],
        );
        (outputs[0], outputs[1..].to_vec())
    }

    /// Closes an instance method.
    pub fn end_class_instance_method(&mut self) {
        self.emit_none(Operation::new(Opcode::EndClassInstanceMethod {}), &[]);
    }

    /// Closes a class definition.
    pub fn end_class(&mut self) {
        self.emit_none(Operation::new(Opcode::EndClassDefinition {}), &[]);
    }

    // --- Exceptions. ---

    /// `try {`
    pub fn begin_try(&mut self) {
        self.emit_none(Operation::new(Opcode::BeginTry {}), &[]);
    }

    /// `} catch (e) {`, returning the caught value
    pub fn begin_catch(&mut self) -> Variable {
        self.emit(Operation::new(Opcode::BeginCatch {}), &[])[0]
    }

    /// `} finally {`
    pub fn begin_finally(&mut self) {
        self.emit_none(Operation::new(Opcode::BeginFinally {}), &[]);
    }

    /// `}` closing a try statement
    pub fn end_try_catch_finally(&mut self) {
        self.emit_none(Operation::new(Opcode::EndTryCatchFinally {}), &[]);
    }

    /// `throw value`
    pub fn throw(&mut self, value: Variable) {
        self.emit_none(Operation::new(Opcode::ThrowException {}), &[value]);
    }

    // --- Wasm. ---

    /// Opens a wasm module definition.
    pub fn begin_wasm_module(&mut self) {
        self.emit_none(Operation::new(Opcode::BeginWasmModule {}), &[]);
    }

    /// Closes a wasm module, returning its exports object.
    pub fn end_wasm_module(&mut self) -> Variable {
        self.emit_one(Operation::new(Opcode::EndWasmModule {}), &[])
    }

    /// Opens a wasm function, returning its parameter variables.
    pub fn begin_wasm_function(&mut self, signature: WasmSignature) -> Vec<Variable> {
        self.emit(
            Operation::new(Opcode::BeginWasmFunction { signature }),
            &[],
        )
    }

    /// Closes a wasm function, returning the function definition.
    pub fn end_wasm_function(&mut self) -> Variable {
        self.emit_one(Operation::new(Opcode::EndWasmFunction {}), &[])
    }

    /// `v = i32.const <value>`
    pub fn wasm_const_i32(&mut self, value: i32) -> Variable {
        self.emit_one(Operation::new(Opcode::WasmConsti32 { value }), &[])
    }

    /// A nop, optionally with pseudo-outputs.
    pub fn nop(&mut self, num_outputs: usize) -> Vec<Variable> {
        self.emit(Operation::nop(num_outputs), &[])
    }
}
