//! The operation taxonomy.
//!
//! An [`Operation`] is an immutable descriptor: an [`Opcode`] (the kind
//! plus payload) together with its arities, attributes and context
//! requirements. The property table in this module is the ground truth
//! validated against every instruction.

mod enums;
mod opcode;
mod wasm;

pub use enums::{
    BinaryOperator, Comparator, Parameters, PropertyConfiguration, PropertyFlags, RegExpFlags,
    UnaryOperator,
};
pub use opcode::Opcode;
pub use wasm::{
    WasmConversionKind, WasmFloatBinaryOpKind, WasmFloatCompareOpKind, WasmFloatUnaryOpKind,
    WasmGlobalValue, WasmIntegerBinaryOpKind, WasmIntegerCompareOpKind, WasmIntegerUnaryOpKind,
    WasmSignature, WasmSimdBinaryOpKind, WasmSimdShape,
};

use crate::error::InstructionDecodingError;
use crate::Context;
use bitflags::bitflags;
use core::fmt;

bitflags! {
    /// Properties of an operation consulted by analyzers and mutators.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Attributes: u16 {
        /// The operation has no side effects and can be removed if its
        /// outputs are unused.
        const IS_PURE = 1 << 0;
        /// The operation's payload can be changed by mutators.
        const IS_MUTABLE = 1 << 1;
        /// The operation invokes a callable value.
        const IS_CALL = 1 << 2;
        /// The operation opens a block.
        const IS_BLOCK_START = 1 << 3;
        /// The operation closes a block.
        const IS_BLOCK_END = 1 << 4;
        /// The operation unconditionally transfers control.
        const IS_JUMP = 1 << 5;
        /// The operation accepts a variadic tail of inputs.
        const IS_VARIADIC = 1 << 6;
        /// At most one instance may exist per surrounding block.
        const IS_SINGULAR = 1 << 7;
        /// The opened context includes the surrounding context.
        const PROPAGATES_SURROUNDING_CONTEXT = 1 << 8;
        /// The opened context includes the context below the enclosing
        /// frame; used by switch-case bodies.
        const RESUMES_SURROUNDING_CONTEXT = 1 << 9;
        /// The operation exists for internal bookkeeping only and is not
        /// emitted by generators.
        const IS_INTERNAL = 1 << 10;
        /// The operation does nothing.
        const IS_NOP = 1 << 11;
        /// The operation's inputs must not be replaced by mutators.
        const IS_NOT_INPUT_MUTABLE = 1 << 12;
    }
}

/// An operation descriptor: opcode, arities, attributes and contexts.
///
/// Operations are immutable and shared by reference: several instructions
/// (e.g. copies made during mutation) may point to the same operation, and
/// the serializer exploits that sharing through its operation cache.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Operation {
    opcode: Opcode,
    num_inputs: u16,
    num_outputs: u16,
    num_inner_outputs: u16,
    first_variadic_input: Option<u16>,
    attributes: Attributes,
    required_context: Context,
    context_opened: Context,
}

/// The raw property row of an opcode, produced by [`properties`].
struct Proto {
    inputs: usize,
    outputs: usize,
    inner_outputs: usize,
    /// Index of the first variadic input, if the operation is variadic.
    first_variadic: Option<usize>,
    /// Whether the variadic tail is open, i.e. its length is not already
    /// determined by the payload.
    open_tail: bool,
    attributes: Attributes,
    required: Context,
    opened: Context,
}

fn op(inputs: usize, outputs: usize) -> Proto {
    Proto {
        inputs,
        outputs,
        inner_outputs: 0,
        first_variadic: None,
        open_tail: false,
        attributes: Attributes::empty(),
        required: Context::JAVASCRIPT,
        opened: Context::empty(),
    }
}

impl Proto {
    fn inner(mut self, n: usize) -> Self {
        self.inner_outputs = n;
        self
    }

    /// An open variadic tail following the fixed inputs.
    fn variadic(mut self) -> Self {
        self.first_variadic = Some(self.inputs);
        self.open_tail = true;
        self.attributes |= Attributes::IS_VARIADIC;
        self
    }

    /// A variadic portion whose length is fixed by the payload.
    fn variadic_from(mut self, index: usize) -> Self {
        self.first_variadic = Some(index);
        self.attributes |= Attributes::IS_VARIADIC;
        self
    }

    fn requires(mut self, context: Context) -> Self {
        self.required = context;
        self
    }

    fn opens(mut self, context: Context) -> Self {
        self.opened = context;
        self
    }

    fn attr(mut self, attributes: Attributes) -> Self {
        self.attributes |= attributes;
        self
    }

    fn pure(self) -> Self {
        self.attr(Attributes::IS_PURE)
    }

    fn mutable(self) -> Self {
        self.attr(Attributes::IS_MUTABLE)
    }

    fn call(self) -> Self {
        self.attr(Attributes::IS_CALL)
    }

    fn block_start(self) -> Self {
        self.attr(Attributes::IS_BLOCK_START)
    }

    fn block_end(self) -> Self {
        self.attr(Attributes::IS_BLOCK_END)
    }

    fn jump(self) -> Self {
        self.attr(Attributes::IS_JUMP)
    }

    fn singular(self) -> Self {
        self.attr(Attributes::IS_SINGULAR)
    }

    fn propagates(self) -> Self {
        self.attr(Attributes::PROPAGATES_SURROUNDING_CONTEXT)
    }

    fn resumes(self) -> Self {
        self.attr(Attributes::RESUMES_SURROUNDING_CONTEXT)
    }

    fn internal(self) -> Self {
        self.attr(Attributes::IS_INTERNAL | Attributes::IS_NOT_INPUT_MUTABLE)
    }
}

/// The property table. Arity, attributes and contexts per opcode, next to
/// the opcode enum so the two cannot drift.
#[allow(clippy::too_many_lines)]
fn properties(opcode: &Opcode) -> Proto {
    use Opcode::*;

    let js = Context::JAVASCRIPT;
    let method_body = Context::JAVASCRIPT | Context::SUBROUTINE | Context::METHOD;
    let class_method_body = method_body | Context::CLASS_METHOD;

    match opcode {
        // Value literals.
        Nop {} => op(0, 0).attr(Attributes::IS_NOP).requires(Context::empty()),
        LoadInteger { .. } | LoadBigInt { .. } | LoadFloat { .. } | LoadString { .. }
        | LoadBoolean { .. } => op(0, 1).pure().mutable(),
        LoadUndefined {} | LoadNull {} | LoadThis {} => op(0, 1).pure(),
        LoadArguments {} | LoadNewTarget {} => {
            op(0, 1).requires(js | Context::SUBROUTINE)
        }
        LoadRegExp { .. } => op(0, 1).pure().mutable(),
        DefineNamedVariable { .. } => op(1, 0).mutable(),
        LoadNamedVariable { .. } => op(0, 1).mutable(),
        StoreNamedVariable { .. } => op(1, 0).mutable(),

        // Object literals.
        BeginObjectLiteral {} => op(0, 0).block_start().opens(Context::OBJECT_LITERAL),
        ObjectLiteralAddProperty { .. } | ObjectLiteralAddElement { .. } => {
            op(1, 0).mutable().requires(Context::OBJECT_LITERAL)
        }
        ObjectLiteralAddComputedProperty {} => op(2, 0).requires(Context::OBJECT_LITERAL),
        ObjectLiteralCopyProperties {} | ObjectLiteralSetPrototype {} => {
            op(1, 0).requires(Context::OBJECT_LITERAL)
        }
        BeginObjectLiteralMethod { parameters, .. } => op(0, 0)
            .inner(1 + parameters.num_parameter_variables())
            .block_start()
            .mutable()
            .requires(Context::OBJECT_LITERAL)
            .opens(method_body),
        EndObjectLiteralMethod {} => op(0, 0).block_end().requires(method_body),
        BeginObjectLiteralGetter { .. } => op(0, 0)
            .inner(1)
            .block_start()
            .mutable()
            .requires(Context::OBJECT_LITERAL)
            .opens(method_body),
        EndObjectLiteralGetter {} => op(0, 0).block_end().requires(method_body),
        BeginObjectLiteralSetter { .. } => op(0, 0)
            .inner(2)
            .block_start()
            .mutable()
            .requires(Context::OBJECT_LITERAL)
            .opens(method_body),
        EndObjectLiteralSetter {} => op(0, 0).block_end().requires(method_body),
        EndObjectLiteral {} => op(0, 1).block_end().requires(Context::OBJECT_LITERAL),

        // Arrays and templates.
        CreateArray {} => op(0, 1).variadic().mutable(),
        CreateIntArray { .. } | CreateFloatArray { .. } => op(0, 1).mutable(),
        CreateArrayWithSpread { spreads } => {
            op(spreads.len(), 1).variadic_from(0).mutable()
        }
        CreateTemplateString { parts } => {
            op(parts.len().saturating_sub(1), 1).variadic_from(0).mutable()
        }

        // Property and element access.
        GetProperty { .. } | DeleteProperty { .. } => op(1, 1).mutable(),
        SetProperty { .. } | UpdateProperty { .. } => op(2, 0).mutable(),
        ConfigureProperty { configuration, .. } => {
            op(1 + configuration.num_inputs(), 0).mutable()
        }
        GetElement { .. } | DeleteElement { .. } => op(1, 1).mutable(),
        SetElement { .. } | UpdateElement { .. } => op(2, 0).mutable(),
        ConfigureElement { configuration, .. } => {
            op(1 + configuration.num_inputs(), 0).mutable()
        }
        GetComputedProperty { .. } | DeleteComputedProperty { .. } => op(2, 1).mutable(),
        SetComputedProperty {} | UpdateComputedProperty { .. } => op(3, 0),
        ConfigureComputedProperty { configuration, .. } => {
            op(2 + configuration.num_inputs(), 0)
        }
        GetPrivateProperty { .. } => op(1, 1).mutable().requires(js | Context::CLASS_METHOD),
        SetPrivateProperty { .. } | UpdatePrivateProperty { .. } => {
            op(2, 0).mutable().requires(js | Context::CLASS_METHOD)
        }
        GetSuperProperty { .. } => op(0, 1).mutable().requires(js | Context::METHOD),
        SetSuperProperty { .. } | UpdateSuperProperty { .. } => {
            op(1, 0).mutable().requires(js | Context::METHOD)
        }

        // Operators.
        TypeOf {} => op(1, 1).pure(),
        TestInstanceOf {} | TestIn {} => op(2, 1).pure(),
        UnaryOperation { .. } => op(1, 1).pure().mutable(),
        BinaryOperation { .. } => op(2, 1).pure().mutable(),
        TernaryOperation {} => op(3, 1).pure(),
        Update { .. } => op(2, 0).mutable(),
        Compare { .. } => op(2, 1).pure().mutable(),
        Dup {} => op(1, 1),
        Reassign {} => op(2, 0),

        // Calls.
        CallFunction { .. } => op(1, 1).variadic().call().mutable(),
        CallFunctionWithSpread { spreads, .. } => {
            op(1 + spreads.len(), 1).variadic_from(1).call().mutable()
        }
        Construct { .. } => op(1, 1).variadic().call().mutable(),
        ConstructWithSpread { spreads, .. } => {
            op(1 + spreads.len(), 1).variadic_from(1).call().mutable()
        }
        CallMethod { .. } => op(1, 1).variadic().call().mutable(),
        CallMethodWithSpread { spreads, .. } => {
            op(1 + spreads.len(), 1).variadic_from(1).call().mutable()
        }
        CallComputedMethod { .. } => op(2, 1).variadic().call().mutable(),
        CallComputedMethodWithSpread { spreads, .. } => {
            op(2 + spreads.len(), 1).variadic_from(2).call().mutable()
        }
        CallSuperConstructor {} => op(0, 0)
            .variadic()
            .call()
            .mutable()
            .requires(js | Context::CLASS_METHOD),
        CallSuperMethod { .. } => op(0, 1)
            .variadic()
            .call()
            .mutable()
            .requires(js | Context::METHOD),
        CallPrivateMethod { .. } => op(1, 1)
            .variadic()
            .call()
            .mutable()
            .requires(js | Context::CLASS_METHOD),
        Eval { has_output, .. } => op(0, usize::from(*has_output)).variadic().mutable(),

        // Destructuring.
        DestructArray { indices, .. } => op(1, indices.len()).mutable(),
        DestructArrayAndReassign { indices, .. } => op(1 + indices.len(), 0).mutable(),
        DestructObject {
            property_names,
            has_rest,
        } => op(1, property_names.len() + usize::from(*has_rest)).mutable(),
        DestructObjectAndReassign {
            property_names,
            has_rest,
        } => op(1 + property_names.len() + usize::from(*has_rest), 0).mutable(),

        // Function definitions.
        BeginPlainFunction { parameters } | BeginArrowFunction { parameters } => op(0, 1)
            .inner(parameters.num_parameter_variables())
            .block_start()
            .opens(js | Context::SUBROUTINE),
        BeginGeneratorFunction { parameters } | BeginAsyncGeneratorFunction { parameters } => {
            let mut opened = js | Context::SUBROUTINE | Context::GENERATOR_FUNCTION;
            if matches!(opcode, BeginAsyncGeneratorFunction { .. }) {
                opened |= Context::ASYNC_FUNCTION;
            }
            op(0, 1)
                .inner(parameters.num_parameter_variables())
                .block_start()
                .opens(opened)
        }
        BeginAsyncFunction { parameters } | BeginAsyncArrowFunction { parameters } => op(0, 1)
            .inner(parameters.num_parameter_variables())
            .block_start()
            .opens(js | Context::SUBROUTINE | Context::ASYNC_FUNCTION),
        EndPlainFunction {} | EndArrowFunction {} | EndGeneratorFunction {}
        | EndAsyncFunction {} | EndAsyncArrowFunction {} | EndAsyncGeneratorFunction {} => {
            op(0, 0).block_end().requires(js | Context::SUBROUTINE)
        }
        BeginConstructor { parameters } => op(0, 1)
            .inner(1 + parameters.num_parameter_variables())
            .block_start()
            .opens(js | Context::SUBROUTINE),
        EndConstructor {} => op(0, 0).block_end().requires(js | Context::SUBROUTINE),
        Return { has_value } => op(usize::from(*has_value), 0)
            .jump()
            .requires(js | Context::SUBROUTINE),
        Yield { has_argument } => op(usize::from(*has_argument), 1)
            .requires(js | Context::SUBROUTINE | Context::GENERATOR_FUNCTION),
        YieldEach {} => {
            op(1, 0).requires(js | Context::SUBROUTINE | Context::GENERATOR_FUNCTION)
        }
        Await {} => op(1, 1).requires(js | Context::ASYNC_FUNCTION),

        // Exception handling.
        BeginTry {} => op(0, 0).block_start().propagates(),
        BeginCatch {} => op(0, 0).inner(1).block_end().block_start().propagates(),
        BeginFinally {} => op(0, 0).block_end().block_start().propagates(),
        EndTryCatchFinally {} => op(0, 0).block_end(),
        ThrowException {} => op(1, 0).jump(),

        // Control flow.
        BeginIf { .. } => op(1, 0).block_start().propagates().mutable(),
        BeginElse {} => op(0, 0).block_end().block_start().propagates(),
        EndIf {} => op(0, 0).block_end(),
        BeginSwitch {} => op(1, 0).block_start().opens(Context::SWITCH_BLOCK),
        BeginSwitchCase {} => op(1, 0)
            .block_start()
            .resumes()
            .opens(Context::SWITCH_CASE)
            .requires(Context::SWITCH_BLOCK),
        BeginSwitchDefaultCase {} => op(0, 0)
            .block_start()
            .resumes()
            .singular()
            .opens(Context::SWITCH_CASE)
            .requires(Context::SWITCH_BLOCK),
        EndSwitchCase { .. } => op(0, 0).block_end().mutable().requires(Context::SWITCH_CASE),
        SwitchBreak {} => op(0, 0).jump().requires(Context::SWITCH_CASE),
        EndSwitch {} => op(0, 0).block_end().requires(Context::SWITCH_BLOCK),
        BeginWhileLoopHeader {} => op(0, 0).block_start().propagates(),
        BeginWhileLoopBody {} => op(1, 0)
            .block_end()
            .block_start()
            .propagates()
            .opens(Context::LOOP),
        EndWhileLoop {} => op(0, 0).block_end().requires(Context::LOOP),
        BeginDoWhileLoopBody {} => op(0, 0).block_start().propagates().opens(Context::LOOP),
        BeginDoWhileLoopHeader {} => op(0, 0).block_end().block_start().propagates(),
        EndDoWhileLoop {} => op(1, 0).block_end(),
        BeginForLoopInitializer {} => op(0, 0).block_start().propagates(),
        BeginForLoopCondition { num_loop_variables } => {
            let n = *num_loop_variables as usize;
            op(n, 0).inner(n).block_end().block_start().propagates()
        }
        BeginForLoopAfterthought { num_loop_variables } => op(1, 0)
            .inner(*num_loop_variables as usize)
            .block_end()
            .block_start()
            .propagates(),
        BeginForLoopBody { num_loop_variables } => op(0, 0)
            .inner(*num_loop_variables as usize)
            .block_end()
            .block_start()
            .propagates()
            .opens(Context::LOOP),
        EndForLoop {} => op(0, 0).block_end().requires(Context::LOOP),
        BeginForInLoop {} | BeginForOfLoop {} => op(1, 0)
            .inner(1)
            .block_start()
            .propagates()
            .opens(Context::LOOP),
        EndForInLoop {} | EndForOfLoop {} => op(0, 0).block_end().requires(Context::LOOP),
        BeginForOfLoopWithDestruct { indices, .. } => op(1, 0)
            .inner(indices.len())
            .block_start()
            .propagates()
            .mutable()
            .opens(Context::LOOP),
        BeginRepeatLoop {
            exposes_loop_counter,
            ..
        } => op(0, 0)
            .inner(usize::from(*exposes_loop_counter))
            .block_start()
            .propagates()
            .mutable()
            .opens(Context::LOOP),
        EndRepeatLoop {} => op(0, 0).block_end().requires(Context::LOOP),
        LoopBreak {} | LoopContinue {} => op(0, 0).jump().requires(Context::LOOP),

        // Class definitions.
        BeginClassDefinition { has_superclass } => op(usize::from(*has_superclass), 1)
            .block_start()
            .mutable()
            .opens(Context::CLASS_DEFINITION),
        BeginClassConstructor { parameters } => op(0, 0)
            .inner(1 + parameters.num_parameter_variables())
            .block_start()
            .singular()
            .requires(Context::CLASS_DEFINITION)
            .opens(class_method_body),
        EndClassConstructor {} => op(0, 0).block_end().requires(class_method_body),
        ClassAddInstanceProperty { has_value, .. }
        | ClassAddInstanceElement { has_value, .. }
        | ClassAddStaticProperty { has_value, .. }
        | ClassAddStaticElement { has_value, .. }
        | ClassAddPrivateInstanceProperty { has_value, .. }
        | ClassAddPrivateStaticProperty { has_value, .. } => op(usize::from(*has_value), 0)
            .mutable()
            .requires(Context::CLASS_DEFINITION),
        ClassAddInstanceComputedProperty { has_value }
        | ClassAddStaticComputedProperty { has_value } => {
            op(1 + usize::from(*has_value), 0).requires(Context::CLASS_DEFINITION)
        }
        BeginClassInstanceMethod { parameters, .. }
        | BeginClassStaticMethod { parameters, .. }
        | BeginClassPrivateInstanceMethod { parameters, .. }
        | BeginClassPrivateStaticMethod { parameters, .. } => op(0, 0)
            .inner(1 + parameters.num_parameter_variables())
            .block_start()
            .mutable()
            .requires(Context::CLASS_DEFINITION)
            .opens(class_method_body),
        EndClassInstanceMethod {} | EndClassStaticMethod {}
        | EndClassPrivateInstanceMethod {} | EndClassPrivateStaticMethod {} => {
            op(0, 0).block_end().requires(class_method_body)
        }
        BeginClassInstanceGetter { .. } | BeginClassStaticGetter { .. } => op(0, 0)
            .inner(1)
            .block_start()
            .mutable()
            .requires(Context::CLASS_DEFINITION)
            .opens(class_method_body),
        EndClassInstanceGetter {} | EndClassStaticGetter {} => {
            op(0, 0).block_end().requires(class_method_body)
        }
        BeginClassInstanceSetter { .. } | BeginClassStaticSetter { .. } => op(0, 0)
            .inner(2)
            .block_start()
            .mutable()
            .requires(Context::CLASS_DEFINITION)
            .opens(class_method_body),
        EndClassInstanceSetter {} | EndClassStaticSetter {} => {
            op(0, 0).block_end().requires(class_method_body)
        }
        BeginClassStaticInitializer {} => op(0, 0)
            .inner(1)
            .block_start()
            .requires(Context::CLASS_DEFINITION)
            .opens(class_method_body),
        EndClassStaticInitializer {} => op(0, 0).block_end().requires(class_method_body),
        EndClassDefinition {} => op(0, 0).block_end().requires(Context::CLASS_DEFINITION),

        // Miscellaneous statements.
        BeginWith {} => op(1, 0).block_start().propagates().opens(Context::WITH),
        EndWith {} => op(0, 0).block_end().requires(Context::WITH),
        BeginBlockStatement {} => op(0, 0).block_start().propagates(),
        EndBlockStatement {} => op(0, 0).block_end(),
        BeginCodeString {} => op(0, 1).block_start().opens(js),
        EndCodeString {} => op(0, 0).block_end(),
        Explore { .. } => op(1, 0).variadic().internal(),
        Probe { .. } => op(1, 0).internal(),

        // Wasm.
        BeginWasmModule {} => op(0, 0).block_start().opens(Context::WASM),
        EndWasmModule {} => op(0, 1).block_end().requires(Context::WASM),
        CreateWasmMemory { .. } | CreateWasmTable { .. } | CreateWasmGlobal { .. }
        | CreateWasmTag { .. } => op(0, 1).mutable(),
        WasmImportMemory {} | WasmImportTable {} | WasmImportGlobal {} => {
            op(1, 1).requires(Context::WASM)
        }
        WasmDefineMemory { .. } | WasmDefineTable { .. } | WasmDefineGlobal { .. }
        | WasmDefineTag { .. } => op(0, 1).mutable().requires(Context::WASM),
        BeginWasmFunction { signature } => op(0, 0)
            .inner(signature.parameters.len())
            .block_start()
            .requires(Context::WASM)
            .opens(Context::WASM_FUNCTION),
        EndWasmFunction {} => op(0, 1).block_end().requires(Context::WASM_FUNCTION),
        WasmReturn {} => op(0, 0).variadic().jump().requires(Context::WASM_FUNCTION),
        BeginWasmBlock { signature } | BeginWasmLoop { signature } => {
            let params = signature.parameters.len();
            op(params, 0)
                .inner(1 + params)
                .block_start()
                .propagates()
                .requires(Context::WASM_FUNCTION)
                .opens(Context::WASM_BLOCK)
        }
        EndWasmBlock { results } | EndWasmLoop { results } => op(results.len(), results.len())
            .block_end()
            .requires(Context::WASM_BLOCK),
        BeginWasmIf { signature } => {
            let params = signature.parameters.len();
            op(1 + params, 0)
                .inner(1 + params)
                .block_start()
                .propagates()
                .requires(Context::WASM_FUNCTION)
                .opens(Context::WASM_BLOCK)
        }
        BeginWasmElse { signature } => op(0, 0)
            .inner(1 + signature.parameters.len())
            .block_end()
            .block_start()
            .propagates()
            .requires(Context::WASM_BLOCK)
            .opens(Context::WASM_BLOCK),
        EndWasmIf { results } => op(results.len(), results.len())
            .block_end()
            .requires(Context::WASM_BLOCK),
        BeginWasmTry { signature } => {
            let params = signature.parameters.len();
            op(params, 0)
                .inner(1 + params)
                .block_start()
                .propagates()
                .requires(Context::WASM_FUNCTION)
                .opens(Context::WASM_BLOCK)
        }
        BeginWasmCatch { parameters } => op(1, 0)
            .inner(parameters.len())
            .block_end()
            .block_start()
            .propagates()
            .requires(Context::WASM_BLOCK)
            .opens(Context::WASM_BLOCK),
        BeginWasmCatchAll {} => op(0, 0)
            .block_end()
            .block_start()
            .propagates()
            .requires(Context::WASM_BLOCK)
            .opens(Context::WASM_BLOCK),
        EndWasmTry { results } => op(results.len(), results.len())
            .block_end()
            .requires(Context::WASM_BLOCK),
        WasmBranch { parameters } => op(1 + parameters.len(), 0)
            .jump()
            .requires(Context::WASM_FUNCTION),
        WasmBranchIf { parameters } => {
            op(2 + parameters.len(), 0).requires(Context::WASM_FUNCTION)
        }
        WasmConsti32 { .. } | WasmConsti64 { .. } | WasmConstf32 { .. }
        | WasmConstf64 { .. } | WasmSimdConst { .. } => {
            op(0, 1).pure().mutable().requires(Context::WASM_FUNCTION)
        }
        WasmIntegerBinaryOperation { .. } | WasmFloatBinaryOperation { .. } => {
            op(2, 1).pure().mutable().requires(Context::WASM_FUNCTION)
        }
        WasmIntegerUnaryOperation { .. } | WasmFloatUnaryOperation { .. } => {
            op(1, 1).pure().mutable().requires(Context::WASM_FUNCTION)
        }
        WasmIntegerCompareOperation { .. } | WasmFloatCompareOperation { .. } => {
            op(2, 1).pure().mutable().requires(Context::WASM_FUNCTION)
        }
        WasmConversion { .. } => op(1, 1).pure().requires(Context::WASM_FUNCTION),
        WasmSimdSplat { .. } | WasmSimdExtractLane { .. } => {
            op(1, 1).pure().mutable().requires(Context::WASM_FUNCTION)
        }
        WasmSimdBinaryOperation { .. } => {
            op(2, 1).pure().mutable().requires(Context::WASM_FUNCTION)
        }
        WasmMemoryLoad { .. } => op(2, 1).mutable().requires(Context::WASM_FUNCTION),
        WasmMemoryStore { .. } => op(3, 0).mutable().requires(Context::WASM_FUNCTION),
        BeginWasmTypeGroup {} => op(0, 0)
            .block_start()
            .requires(Context::WASM)
            .opens(Context::WASM_TYPE_GROUP),
        EndWasmTypeGroup {} => op(0, 0).block_end().requires(Context::WASM_TYPE_GROUP),
        WasmDefineStructType { .. } | WasmDefineArrayType { .. } => {
            op(0, 1).mutable().requires(Context::WASM_TYPE_GROUP)
        }
    }
}

impl Operation {
    /// Creates the operation for an opcode with no variadic tail.
    pub fn new(opcode: Opcode) -> Self {
        Self::build(opcode, 0)
    }

    /// Creates the operation for a variadic opcode with `num_variadic`
    /// additional inputs.
    ///
    /// # Panics
    ///
    /// Panics if the opcode has no open variadic tail.
    pub fn with_variadic(opcode: Opcode, num_variadic: usize) -> Self {
        assert!(
            properties(&opcode).open_tail,
            "{} does not take variadic inputs",
            opcode.name()
        );
        Self::build(opcode, num_variadic)
    }

    /// Creates a `Nop` with the given number of pseudo-outputs.
    pub fn nop(num_outputs: usize) -> Self {
        assert!(num_outputs <= u16::MAX as usize, "too many outputs");
        let mut operation = Self::build(Opcode::Nop {}, 0);
        operation.num_outputs = num_outputs as u16;
        operation
    }

    /// Rebuilds an operation from a decoded opcode and the total number of
    /// variables attached to its instruction. The variadic arity is
    /// recovered from that count; any mismatch with the declared arities is
    /// a decoding error.
    pub(crate) fn from_wire(
        opcode: Opcode,
        num_inouts: usize,
    ) -> Result<Self, InstructionDecodingError> {
        if matches!(opcode, Opcode::Nop {}) {
            return Ok(Self::nop(num_inouts));
        }
        let proto = properties(&opcode);
        let fixed = proto.inputs + proto.outputs + proto.inner_outputs;
        if proto.open_tail {
            match num_inouts.checked_sub(fixed) {
                Some(extra) => Ok(Self::build(opcode, extra)),
                None => Err(InstructionDecodingError::InconsistentArity(num_inouts)),
            }
        } else if num_inouts == fixed {
            Ok(Self::build(opcode, 0))
        } else {
            Err(InstructionDecodingError::InconsistentArity(num_inouts))
        }
    }

    fn build(opcode: Opcode, num_variadic: usize) -> Self {
        let proto = properties(&opcode);
        let num_inputs = proto.inputs + num_variadic;
        assert!(num_inputs <= u16::MAX as usize, "too many inputs");
        Self {
            num_inputs: num_inputs as u16,
            num_outputs: proto.outputs as u16,
            num_inner_outputs: proto.inner_outputs as u16,
            first_variadic_input: proto.first_variadic.map(|i| i as u16),
            attributes: proto.attributes,
            required_context: proto.required,
            context_opened: proto.opened,
            opcode,
        }
    }

    /// The opcode of this operation.
    pub fn opcode(&self) -> &Opcode {
        &self.opcode
    }

    /// The name of this operation.
    pub fn name(&self) -> &'static str {
        self.opcode.name()
    }

    /// The number of inputs.
    pub fn num_inputs(&self) -> usize {
        self.num_inputs as usize
    }

    /// The number of outputs visible in the surrounding scope.
    pub fn num_outputs(&self) -> usize {
        self.num_outputs as usize
    }

    /// The number of outputs visible only inside the block this operation
    /// opens.
    pub fn num_inner_outputs(&self) -> usize {
        self.num_inner_outputs as usize
    }

    /// The total number of variables attached to an instruction of this
    /// operation.
    pub fn num_inouts(&self) -> usize {
        self.num_inputs() + self.num_outputs() + self.num_inner_outputs()
    }

    /// The index of the first variadic input, if this operation is
    /// variadic.
    pub fn first_variadic_input(&self) -> Option<usize> {
        self.first_variadic_input.map(usize::from)
    }

    /// The attribute bitset.
    pub fn attributes(&self) -> Attributes {
        self.attributes
    }

    /// The context this operation requires.
    pub fn required_context(&self) -> Context {
        self.required_context
    }

    /// The context this operation opens, if it starts a block.
    pub fn context_opened(&self) -> Context {
        self.context_opened
    }

    /// Whether this operation opens a block.
    pub fn is_block_start(&self) -> bool {
        self.attributes.contains(Attributes::IS_BLOCK_START)
    }

    /// Whether this operation closes a block.
    pub fn is_block_end(&self) -> bool {
        self.attributes.contains(Attributes::IS_BLOCK_END)
    }

    /// Whether this operation unconditionally transfers control.
    pub fn is_jump(&self) -> bool {
        self.attributes.contains(Attributes::IS_JUMP)
    }

    /// Whether this operation has no side effects.
    pub fn is_pure(&self) -> bool {
        self.attributes.contains(Attributes::IS_PURE)
    }

    /// Whether this operation's runtime exceptions are swallowed by the
    /// lifter.
    pub fn is_guarded(&self) -> bool {
        use Opcode::*;
        match &self.opcode {
            GetProperty { is_guarded, .. }
            | DeleteProperty { is_guarded, .. }
            | GetElement { is_guarded, .. }
            | DeleteElement { is_guarded, .. }
            | GetComputedProperty { is_guarded }
            | DeleteComputedProperty { is_guarded }
            | CallFunction { is_guarded }
            | CallFunctionWithSpread { is_guarded, .. }
            | Construct { is_guarded }
            | ConstructWithSpread { is_guarded, .. }
            | CallMethod { is_guarded, .. }
            | CallMethodWithSpread { is_guarded, .. }
            | CallComputedMethod { is_guarded }
            | CallComputedMethodWithSpread { is_guarded, .. } => *is_guarded,
            _ => false,
        }
    }

    /// Whether the input at `index` is overwritten rather than read.
    pub fn reassigns(&self, index: usize) -> bool {
        use Opcode::*;
        match &self.opcode {
            Reassign {} | Update { .. } => index == 0,
            DestructArrayAndReassign { .. } | DestructObjectAndReassign { .. } => index >= 1,
            _ => false,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Opcode {
    /// Whether `end` may close the block opened by this opcode, per the
    /// fixed block-pairing table.
    pub fn is_matching_end(&self, end: &Opcode) -> bool {
        use Opcode::*;
        match self {
            BeginObjectLiteral {} => matches!(end, EndObjectLiteral {}),
            BeginObjectLiteralMethod { .. } => matches!(end, EndObjectLiteralMethod {}),
            BeginObjectLiteralGetter { .. } => matches!(end, EndObjectLiteralGetter {}),
            BeginObjectLiteralSetter { .. } => matches!(end, EndObjectLiteralSetter {}),
            BeginPlainFunction { .. } => matches!(end, EndPlainFunction {}),
            BeginArrowFunction { .. } => matches!(end, EndArrowFunction {}),
            BeginGeneratorFunction { .. } => matches!(end, EndGeneratorFunction {}),
            BeginAsyncFunction { .. } => matches!(end, EndAsyncFunction {}),
            BeginAsyncArrowFunction { .. } => matches!(end, EndAsyncArrowFunction {}),
            BeginAsyncGeneratorFunction { .. } => matches!(end, EndAsyncGeneratorFunction {}),
            BeginConstructor { .. } => matches!(end, EndConstructor {}),
            BeginTry {} => {
                matches!(end, BeginCatch {} | BeginFinally {} | EndTryCatchFinally {})
            }
            BeginCatch {} => matches!(end, BeginFinally {} | EndTryCatchFinally {}),
            BeginFinally {} => matches!(end, EndTryCatchFinally {}),
            BeginIf { .. } => matches!(end, BeginElse {} | EndIf {}),
            BeginElse {} => matches!(end, EndIf {}),
            BeginSwitch {} => matches!(end, EndSwitch {}),
            BeginSwitchCase {} | BeginSwitchDefaultCase {} => {
                matches!(end, EndSwitchCase { .. })
            }
            BeginWhileLoopHeader {} => matches!(end, BeginWhileLoopBody {}),
            BeginWhileLoopBody {} => matches!(end, EndWhileLoop {}),
            BeginDoWhileLoopBody {} => matches!(end, BeginDoWhileLoopHeader {}),
            BeginDoWhileLoopHeader {} => matches!(end, EndDoWhileLoop {}),
            BeginForLoopInitializer {} => matches!(end, BeginForLoopCondition { .. }),
            BeginForLoopCondition { .. } => matches!(end, BeginForLoopAfterthought { .. }),
            BeginForLoopAfterthought { .. } => matches!(end, BeginForLoopBody { .. }),
            BeginForLoopBody { .. } => matches!(end, EndForLoop {}),
            BeginForInLoop {} => matches!(end, EndForInLoop {}),
            BeginForOfLoop {} | BeginForOfLoopWithDestruct { .. } => {
                matches!(end, EndForOfLoop {})
            }
            BeginRepeatLoop { .. } => matches!(end, EndRepeatLoop {}),
            BeginClassDefinition { .. } => matches!(end, EndClassDefinition {}),
            BeginClassConstructor { .. } => matches!(end, EndClassConstructor {}),
            BeginClassInstanceMethod { .. } => matches!(end, EndClassInstanceMethod {}),
            BeginClassInstanceGetter { .. } => matches!(end, EndClassInstanceGetter {}),
            BeginClassInstanceSetter { .. } => matches!(end, EndClassInstanceSetter {}),
            BeginClassStaticInitializer {} => matches!(end, EndClassStaticInitializer {}),
            BeginClassStaticMethod { .. } => matches!(end, EndClassStaticMethod {}),
            BeginClassStaticGetter { .. } => matches!(end, EndClassStaticGetter {}),
            BeginClassStaticSetter { .. } => matches!(end, EndClassStaticSetter {}),
            BeginClassPrivateInstanceMethod { .. } => {
                matches!(end, EndClassPrivateInstanceMethod {})
            }
            BeginClassPrivateStaticMethod { .. } => {
                matches!(end, EndClassPrivateStaticMethod {})
            }
            BeginWith {} => matches!(end, EndWith {}),
            BeginBlockStatement {} => matches!(end, EndBlockStatement {}),
            BeginCodeString {} => matches!(end, EndCodeString {}),
            BeginWasmModule {} => matches!(end, EndWasmModule {}),
            BeginWasmFunction { .. } => matches!(end, EndWasmFunction {}),
            BeginWasmBlock { .. } => matches!(end, EndWasmBlock { .. }),
            BeginWasmLoop { .. } => matches!(end, EndWasmLoop { .. }),
            BeginWasmIf { .. } => matches!(end, BeginWasmElse { .. } | EndWasmIf { .. }),
            BeginWasmElse { .. } => matches!(end, EndWasmIf { .. }),
            BeginWasmTry { .. } | BeginWasmCatch { .. } => matches!(
                end,
                BeginWasmCatch { .. } | BeginWasmCatchAll {} | EndWasmTry { .. }
            ),
            BeginWasmCatchAll {} => matches!(end, EndWasmTry { .. }),
            BeginWasmTypeGroup {} => matches!(end, EndWasmTypeGroup {}),
            _ => false,
        }
    }

    /// Whether a block opened by this opcode is a valid wasm branch
    /// target. Catch and catch-all blocks are deliberately not branch
    /// targets; new wasm block kinds must answer here explicitly.
    pub fn is_wasm_branch_target(&self) -> bool {
        use Opcode::*;
        match self {
            BeginWasmBlock { .. } | BeginWasmLoop { .. } | BeginWasmIf { .. }
            | BeginWasmElse { .. } | BeginWasmTry { .. } => true,
            BeginWasmCatch { .. } | BeginWasmCatchAll {} => false,
            _ => false,
        }
    }
}
