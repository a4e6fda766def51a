//! # The `define_opcodes!` macro
//!
//! The operation taxonomy is a single closed table. Each row carries a
//! short docstring, the frozen wire value, the variant name and the payload
//! fields. From this table the macro derives the [`Opcode`] enum itself,
//! the `name` and `wire_value` accessors, and the payload codec used by the
//! binary format (fields are written and read in declaration order through
//! the [`Payload`] trait).
//!
//! Arity, attributes and context requirements are intentionally *not* part
//! of the table: they sometimes depend on payload values and live in the
//! property table in [`super`], next to this enum, so the two cannot drift
//! apart without the exhaustive matches breaking.

use crate::encoding::payload::Payload;
use crate::encoding::{Reader, Writer};
use crate::error::InstructionDecodingError;
use crate::operations::enums::{
    BinaryOperator, Comparator, Parameters, PropertyConfiguration, PropertyFlags, RegExpFlags,
    UnaryOperator,
};
use crate::operations::wasm::{
    WasmConversionKind, WasmFloatBinaryOpKind, WasmFloatCompareOpKind, WasmFloatUnaryOpKind,
    WasmGlobalValue, WasmIntegerBinaryOpKind, WasmIntegerCompareOpKind, WasmIntegerUnaryOpKind,
    WasmSignature, WasmSimdBinaryOpKind, WasmSimdShape,
};
use core::fmt;
use fuzzil_types::{Limits, WasmStorageType, WasmStructField, WasmValueType};

macro_rules! define_opcodes {
    ($($doc:literal $value:literal $name:ident { $($field:ident : $fty:ty),* $(,)? })+) => {
        /// Every concrete operation kind, together with its payload.
        ///
        /// The enum is closed: every consumer matches exhaustively, so a new
        /// operation cannot be added without extending serialization,
        /// validity checking and the abstract interpreter.
        #[derive(Debug, Clone, PartialEq)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum Opcode {
            $(
                #[doc = $doc]
                $name { $($field: $fty),* },
            )+
        }

        impl Opcode {
            /// The name of this operation kind.
            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$name { .. } => stringify!($name), )+
                }
            }

            /// The wire value identifying this operation kind in the binary
            /// format. Part of the stable encoding.
            pub fn wire_value(&self) -> u16 {
                match self {
                    $( Self::$name { .. } => $value, )+
                }
            }

            /// Writes the payload fields in declaration order.
            pub(crate) fn write_payload(&self, writer: &mut Writer) {
                match self {
                    $( Self::$name { $($field),* } => { $( Payload::write($field, writer); )* } )+
                }
            }

            /// Reads the payload of the operation identified by
            /// `wire_value`.
            pub(crate) fn read_payload(
                wire_value: u16,
                reader: &mut Reader<'_>,
            ) -> Result<Self, InstructionDecodingError> {
                match wire_value {
                    $( $value => Ok(Self::$name { $($field: Payload::read(reader)?),* }), )+
                    _ => Err(InstructionDecodingError::UnknownOpcode(wire_value)),
                }
            }
        }
    };
}

define_opcodes! {
    // --- Value literals. ---
    "Does nothing. May carry pseudo-outputs used as padding by minimization."
    0x0000 Nop {}
    "Loads an integer literal."
    0x0001 LoadInteger { value: i64 }
    "Loads a BigInt literal."
    0x0002 LoadBigInt { value: i64 }
    "Loads a floating point literal."
    0x0003 LoadFloat { value: f64 }
    "Loads a string literal."
    0x0004 LoadString { value: String }
    "Loads a boolean literal."
    0x0005 LoadBoolean { value: bool }
    "Loads the `undefined` value."
    0x0006 LoadUndefined {}
    "Loads the `null` value."
    0x0007 LoadNull {}
    "Loads the `this` binding."
    0x0008 LoadThis {}
    "Loads the `arguments` object of the enclosing subroutine."
    0x0009 LoadArguments {}
    "Loads `new.target` of the enclosing subroutine."
    0x000a LoadNewTarget {}
    "Loads a regular expression literal."
    0x000b LoadRegExp { pattern: String, flags: RegExpFlags }
    "Declares a named variable with an initial value."
    0x000c DefineNamedVariable { name: String }
    "Loads a named variable, possibly a global."
    0x000d LoadNamedVariable { name: String }
    "Stores to a named variable, possibly a global."
    0x000e StoreNamedVariable { name: String }

    // --- Object literals. ---
    "Opens an object literal."
    0x0010 BeginObjectLiteral {}
    "Adds a named property to the enclosing object literal."
    0x0011 ObjectLiteralAddProperty { property_name: String }
    "Adds an indexed element to the enclosing object literal."
    0x0012 ObjectLiteralAddElement { index: i64 }
    "Adds a computed property to the enclosing object literal."
    0x0013 ObjectLiteralAddComputedProperty {}
    "Spreads the properties of another object into the literal."
    0x0014 ObjectLiteralCopyProperties {}
    "Sets the `__proto__` of the enclosing object literal."
    0x0015 ObjectLiteralSetPrototype {}
    "Opens a method inside an object literal."
    0x0016 BeginObjectLiteralMethod { method_name: String, parameters: Parameters }
    "Closes an object literal method."
    0x0017 EndObjectLiteralMethod {}
    "Opens a getter inside an object literal."
    0x0018 BeginObjectLiteralGetter { property_name: String }
    "Closes an object literal getter."
    0x0019 EndObjectLiteralGetter {}
    "Opens a setter inside an object literal."
    0x001a BeginObjectLiteralSetter { property_name: String }
    "Closes an object literal setter."
    0x001b EndObjectLiteralSetter {}
    "Closes an object literal and outputs the constructed object."
    0x001c EndObjectLiteral {}

    // --- Arrays and templates. ---
    "Creates an array from its variadic inputs."
    0x0020 CreateArray {}
    "Creates an integer-typed array from inline values."
    0x0021 CreateIntArray { values: Vec<i64> }
    "Creates a float-typed array from inline values."
    0x0022 CreateFloatArray { values: Vec<f64> }
    "Creates an array; inputs flagged in `spreads` are spread."
    0x0023 CreateArrayWithSpread { spreads: Vec<bool> }
    "Creates a template string; inputs are interpolated between parts."
    0x0024 CreateTemplateString { parts: Vec<String> }

    // --- Property and element access. ---
    "Loads a named property."
    0x0028 GetProperty { property_name: String, is_guarded: bool }
    "Stores a named property."
    0x0029 SetProperty { property_name: String }
    "Updates a named property with a binary operator."
    0x002a UpdateProperty { property_name: String, op: BinaryOperator }
    "Deletes a named property and outputs the success value."
    0x002b DeleteProperty { property_name: String, is_guarded: bool }
    "Defines a named property with a descriptor."
    0x002c ConfigureProperty { property_name: String, flags: PropertyFlags, configuration: PropertyConfiguration }
    "Loads an indexed element."
    0x002d GetElement { index: i64, is_guarded: bool }
    "Stores an indexed element."
    0x002e SetElement { index: i64 }
    "Updates an indexed element with a binary operator."
    0x002f UpdateElement { index: i64, op: BinaryOperator }
    "Deletes an indexed element and outputs the success value."
    0x0030 DeleteElement { index: i64, is_guarded: bool }
    "Defines an indexed element with a descriptor."
    0x0031 ConfigureElement { index: i64, flags: PropertyFlags, configuration: PropertyConfiguration }
    "Loads a computed property."
    0x0032 GetComputedProperty { is_guarded: bool }
    "Stores a computed property."
    0x0033 SetComputedProperty {}
    "Updates a computed property with a binary operator."
    0x0034 UpdateComputedProperty { op: BinaryOperator }
    "Deletes a computed property and outputs the success value."
    0x0035 DeleteComputedProperty { is_guarded: bool }
    "Defines a computed property with a descriptor."
    0x0036 ConfigureComputedProperty { flags: PropertyFlags, configuration: PropertyConfiguration }
    "Loads a private field of `this`."
    0x0037 GetPrivateProperty { property_name: String }
    "Stores a private field of `this`."
    0x0038 SetPrivateProperty { property_name: String }
    "Updates a private field with a binary operator."
    0x0039 UpdatePrivateProperty { property_name: String, op: BinaryOperator }
    "Loads a property of `super`."
    0x003a GetSuperProperty { property_name: String }
    "Stores a property of `super`."
    0x003b SetSuperProperty { property_name: String }
    "Updates a property of `super` with a binary operator."
    0x003c UpdateSuperProperty { property_name: String, op: BinaryOperator }

    // --- Operators. ---
    "Applies `typeof` and outputs the result string."
    0x0040 TypeOf {}
    "Tests `instanceof`."
    0x0041 TestInstanceOf {}
    "Tests the `in` operator."
    0x0042 TestIn {}
    "Applies a unary operator."
    0x0043 UnaryOperation { op: UnaryOperator }
    "Applies a binary operator."
    0x0044 BinaryOperation { op: BinaryOperator }
    "Evaluates a ternary conditional."
    0x0045 TernaryOperation {}
    "Applies a binary operator in place, reassigning the first input."
    0x0046 Update { op: BinaryOperator }
    "Compares two values."
    0x0047 Compare { op: Comparator }
    "Duplicates a value into a fresh variable."
    0x0048 Dup {}
    "Reassigns the first input to the value of the second."
    0x0049 Reassign {}

    // --- Calls. ---
    "Calls a function with variadic arguments."
    0x0050 CallFunction { is_guarded: bool }
    "Calls a function; arguments flagged in `spreads` are spread."
    0x0051 CallFunctionWithSpread { spreads: Vec<bool>, is_guarded: bool }
    "Invokes a constructor with `new`."
    0x0052 Construct { is_guarded: bool }
    "Invokes a constructor; arguments flagged in `spreads` are spread."
    0x0053 ConstructWithSpread { spreads: Vec<bool>, is_guarded: bool }
    "Calls a named method of the first input."
    0x0054 CallMethod { method_name: String, is_guarded: bool }
    "Calls a named method with spread arguments."
    0x0055 CallMethodWithSpread { method_name: String, spreads: Vec<bool>, is_guarded: bool }
    "Calls a computed method of the first input."
    0x0056 CallComputedMethod { is_guarded: bool }
    "Calls a computed method with spread arguments."
    0x0057 CallComputedMethodWithSpread { spreads: Vec<bool>, is_guarded: bool }
    "Calls the superclass constructor."
    0x0058 CallSuperConstructor {}
    "Calls a method of `super`."
    0x0059 CallSuperMethod { method_name: String }
    "Calls a private method of `this`."
    0x005a CallPrivateMethod { method_name: String }
    "Evaluates an opaque code template with the inputs spliced in."
    0x005b Eval { code: String, has_output: bool }

    // --- Destructuring. ---
    "Destructures an array into fresh variables."
    0x0060 DestructArray { indices: Vec<i64>, last_is_rest: bool }
    "Destructures an array into existing variables."
    0x0061 DestructArrayAndReassign { indices: Vec<i64>, last_is_rest: bool }
    "Destructures an object into fresh variables."
    0x0062 DestructObject { property_names: Vec<String>, has_rest: bool }
    "Destructures an object into existing variables."
    0x0063 DestructObjectAndReassign { property_names: Vec<String>, has_rest: bool }

    // --- Function definitions. ---
    "Opens a plain function definition."
    0x0068 BeginPlainFunction { parameters: Parameters }
    "Closes a plain function definition."
    0x0069 EndPlainFunction {}
    "Opens an arrow function definition."
    0x006a BeginArrowFunction { parameters: Parameters }
    "Closes an arrow function definition."
    0x006b EndArrowFunction {}
    "Opens a generator function definition."
    0x006c BeginGeneratorFunction { parameters: Parameters }
    "Closes a generator function definition."
    0x006d EndGeneratorFunction {}
    "Opens an async function definition."
    0x006e BeginAsyncFunction { parameters: Parameters }
    "Closes an async function definition."
    0x006f EndAsyncFunction {}
    "Opens an async arrow function definition."
    0x0070 BeginAsyncArrowFunction { parameters: Parameters }
    "Closes an async arrow function definition."
    0x0071 EndAsyncArrowFunction {}
    "Opens an async generator function definition."
    0x0072 BeginAsyncGeneratorFunction { parameters: Parameters }
    "Closes an async generator function definition."
    0x0073 EndAsyncGeneratorFunction {}
    "Opens a constructor definition."
    0x0074 BeginConstructor { parameters: Parameters }
    "Closes a constructor definition."
    0x0075 EndConstructor {}
    "Returns from the enclosing subroutine."
    0x0076 Return { has_value: bool }
    "Yields a value from the enclosing generator."
    0x0077 Yield { has_argument: bool }
    "Yields every value of an iterable."
    0x0078 YieldEach {}
    "Awaits a value inside an async function."
    0x0079 Await {}

    // --- Exception handling. ---
    "Opens a try block."
    0x0080 BeginTry {}
    "Opens the catch block; the inner output is the caught value."
    0x0081 BeginCatch {}
    "Opens the finally block."
    0x0082 BeginFinally {}
    "Closes a try/catch/finally statement."
    0x0083 EndTryCatchFinally {}
    "Throws the input value."
    0x0084 ThrowException {}

    // --- Control flow. ---
    "Opens an if block; `inverted` negates the condition."
    0x0088 BeginIf { inverted: bool }
    "Closes the then block and opens the else block."
    0x0089 BeginElse {}
    "Closes an if statement."
    0x008a EndIf {}
    "Opens a switch statement on the input value."
    0x008b BeginSwitch {}
    "Opens a case block; the input is the tested value."
    0x008c BeginSwitchCase {}
    "Opens the default case block."
    0x008d BeginSwitchDefaultCase {}
    "Closes a case block."
    0x008e EndSwitchCase { falls_through: bool }
    "Breaks out of the enclosing switch."
    0x008f SwitchBreak {}
    "Closes a switch statement."
    0x0090 EndSwitch {}
    "Opens the header of a while loop, evaluated before each iteration."
    0x0091 BeginWhileLoopHeader {}
    "Closes the header and opens the body; the input is the condition."
    0x0092 BeginWhileLoopBody {}
    "Closes a while loop."
    0x0093 EndWhileLoop {}
    "Opens the body of a do-while loop."
    0x0094 BeginDoWhileLoopBody {}
    "Closes the body and opens the header of a do-while loop."
    0x0095 BeginDoWhileLoopHeader {}
    "Closes a do-while loop; the input is the condition."
    0x0096 EndDoWhileLoop {}
    "Opens the initializer of a for loop."
    0x0097 BeginForLoopInitializer {}
    "Closes the initializer and opens the condition; consumes the initial loop-variable values."
    0x0098 BeginForLoopCondition { num_loop_variables: u16 }
    "Closes the condition and opens the afterthought; consumes the condition value."
    0x0099 BeginForLoopAfterthought { num_loop_variables: u16 }
    "Closes the afterthought and opens the body."
    0x009a BeginForLoopBody { num_loop_variables: u16 }
    "Closes a for loop."
    0x009b EndForLoop {}
    "Opens a for-in loop; the inner output is the property name."
    0x009c BeginForInLoop {}
    "Closes a for-in loop."
    0x009d EndForInLoop {}
    "Opens a for-of loop; the inner output is the element."
    0x009e BeginForOfLoop {}
    "Closes a for-of loop."
    0x009f EndForOfLoop {}
    "Opens a for-of loop destructuring each element."
    0x00a0 BeginForOfLoopWithDestruct { indices: Vec<i64>, last_is_rest: bool }
    "Opens a loop running a fixed number of iterations."
    0x00a1 BeginRepeatLoop { iterations: i64, exposes_loop_counter: bool }
    "Closes a repeat loop."
    0x00a2 EndRepeatLoop {}
    "Breaks out of the enclosing loop."
    0x00a3 LoopBreak {}
    "Continues the enclosing loop."
    0x00a4 LoopContinue {}

    // --- Class definitions. ---
    "Opens a class definition; the optional input is the superclass."
    0x00a8 BeginClassDefinition { has_superclass: bool }
    "Opens the class constructor."
    0x00a9 BeginClassConstructor { parameters: Parameters }
    "Closes the class constructor."
    0x00aa EndClassConstructor {}
    "Declares an instance property."
    0x00ab ClassAddInstanceProperty { property_name: String, has_value: bool }
    "Declares an instance element."
    0x00ac ClassAddInstanceElement { index: i64, has_value: bool }
    "Declares a computed instance property."
    0x00ad ClassAddInstanceComputedProperty { has_value: bool }
    "Opens an instance method."
    0x00ae BeginClassInstanceMethod { method_name: String, parameters: Parameters }
    "Closes an instance method."
    0x00af EndClassInstanceMethod {}
    "Opens an instance getter."
    0x00b0 BeginClassInstanceGetter { property_name: String }
    "Closes an instance getter."
    0x00b1 EndClassInstanceGetter {}
    "Opens an instance setter."
    0x00b2 BeginClassInstanceSetter { property_name: String }
    "Closes an instance setter."
    0x00b3 EndClassInstanceSetter {}
    "Declares a static property."
    0x00b4 ClassAddStaticProperty { property_name: String, has_value: bool }
    "Declares a static element."
    0x00b5 ClassAddStaticElement { index: i64, has_value: bool }
    "Declares a computed static property."
    0x00b6 ClassAddStaticComputedProperty { has_value: bool }
    "Opens a static initializer block."
    0x00b7 BeginClassStaticInitializer {}
    "Closes a static initializer block."
    0x00b8 EndClassStaticInitializer {}
    "Opens a static method."
    0x00b9 BeginClassStaticMethod { method_name: String, parameters: Parameters }
    "Closes a static method."
    0x00ba EndClassStaticMethod {}
    "Opens a static getter."
    0x00bb BeginClassStaticGetter { property_name: String }
    "Closes a static getter."
    0x00bc EndClassStaticGetter {}
    "Opens a static setter."
    0x00bd BeginClassStaticSetter { property_name: String }
    "Closes a static setter."
    0x00be EndClassStaticSetter {}
    "Declares a private instance property."
    0x00bf ClassAddPrivateInstanceProperty { property_name: String, has_value: bool }
    "Opens a private instance method."
    0x00c0 BeginClassPrivateInstanceMethod { method_name: String, parameters: Parameters }
    "Closes a private instance method."
    0x00c1 EndClassPrivateInstanceMethod {}
    "Declares a private static property."
    0x00c2 ClassAddPrivateStaticProperty { property_name: String, has_value: bool }
    "Opens a private static method."
    0x00c3 BeginClassPrivateStaticMethod { method_name: String, parameters: Parameters }
    "Closes a private static method."
    0x00c4 EndClassPrivateStaticMethod {}
    "Closes a class definition."
    0x00c5 EndClassDefinition {}

    // --- Miscellaneous statements. ---
    "Opens a with statement over the input object."
    0x00c8 BeginWith {}
    "Closes a with statement."
    0x00c9 EndWith {}
    "Opens a plain block statement."
    0x00ca BeginBlockStatement {}
    "Closes a plain block statement."
    0x00cb EndBlockStatement {}
    "Opens nested code compiled into a string literal; outputs that string."
    0x00cc BeginCodeString {}
    "Closes a code string."
    0x00cd EndCodeString {}
    "Runtime-instrumentation sentinel exploring operations on the first input."
    0x00ce Explore { id: String, rng_seed: u32 }
    "Runtime-instrumentation probe inspecting the input value."
    0x00cf Probe { id: String }

    // --- Wasm. ---
    "Opens a wasm module definition."
    0x0100 BeginWasmModule {}
    "Closes a wasm module and outputs its exports object."
    0x0101 EndWasmModule {}
    "Creates a WebAssembly.Memory object."
    0x0102 CreateWasmMemory { limits: Limits, is_shared: bool, is_memory64: bool }
    "Creates a WebAssembly.Table object."
    0x0103 CreateWasmTable { element_type: WasmValueType, limits: Limits }
    "Creates a WebAssembly.Global object."
    0x0104 CreateWasmGlobal { value: WasmGlobalValue, is_mutable: bool }
    "Creates a WebAssembly.Tag object."
    0x0105 CreateWasmTag { parameters: Vec<WasmValueType> }
    "Imports a JavaScript-side memory into the enclosing module."
    0x0106 WasmImportMemory {}
    "Imports a JavaScript-side table into the enclosing module."
    0x0107 WasmImportTable {}
    "Imports a JavaScript-side global into the enclosing module."
    0x0108 WasmImportGlobal {}
    "Defines a memory inside the enclosing module."
    0x0109 WasmDefineMemory { limits: Limits, is_shared: bool, is_memory64: bool }
    "Defines a table inside the enclosing module."
    0x010a WasmDefineTable { element_type: WasmValueType, limits: Limits }
    "Defines a global inside the enclosing module."
    0x010b WasmDefineGlobal { value: WasmGlobalValue, is_mutable: bool }
    "Defines an exception tag inside the enclosing module."
    0x010c WasmDefineTag { parameters: Vec<WasmValueType> }
    "Opens a wasm function; inner outputs are the parameters."
    0x010d BeginWasmFunction { signature: WasmSignature }
    "Closes a wasm function and outputs the function definition."
    0x010e EndWasmFunction {}
    "Returns from the enclosing wasm function with variadic values."
    0x010f WasmReturn {}
    "Opens a wasm block; the first inner output is the label."
    0x0110 BeginWasmBlock { signature: WasmSignature }
    "Closes a wasm block, passing the results to the outer scope."
    0x0111 EndWasmBlock { results: Vec<WasmValueType> }
    "Opens a wasm loop; branching to its label restarts the loop."
    0x0112 BeginWasmLoop { signature: WasmSignature }
    "Closes a wasm loop."
    0x0113 EndWasmLoop { results: Vec<WasmValueType> }
    "Opens a wasm if; the last input is the condition."
    0x0114 BeginWasmIf { signature: WasmSignature }
    "Closes the then branch and opens the else branch."
    0x0115 BeginWasmElse { signature: WasmSignature }
    "Closes a wasm if."
    0x0116 EndWasmIf { results: Vec<WasmValueType> }
    "Opens a wasm try block."
    0x0117 BeginWasmTry { signature: WasmSignature }
    "Opens a catch block for the tag given as input."
    0x0118 BeginWasmCatch { parameters: Vec<WasmValueType> }
    "Opens a catch-all block."
    0x0119 BeginWasmCatchAll {}
    "Closes a wasm try."
    0x011a EndWasmTry { results: Vec<WasmValueType> }
    "Branches to the label given as the first input."
    0x011b WasmBranch { parameters: Vec<WasmValueType> }
    "Conditionally branches to the label given as the first input."
    0x011c WasmBranchIf { parameters: Vec<WasmValueType> }
    "Loads an i32 constant."
    0x011d WasmConsti32 { value: i32 }
    "Loads an i64 constant."
    0x011e WasmConsti64 { value: i64 }
    "Loads an f32 constant."
    0x011f WasmConstf32 { value: f32 }
    "Loads an f64 constant."
    0x0120 WasmConstf64 { value: f64 }
    "Applies an integer binary operation of the given width."
    0x0121 WasmIntegerBinaryOperation { value_type: WasmValueType, op: WasmIntegerBinaryOpKind }
    "Applies an integer unary operation of the given width."
    0x0122 WasmIntegerUnaryOperation { value_type: WasmValueType, op: WasmIntegerUnaryOpKind }
    "Applies an integer comparison of the given width."
    0x0123 WasmIntegerCompareOperation { value_type: WasmValueType, op: WasmIntegerCompareOpKind }
    "Applies a float binary operation of the given width."
    0x0124 WasmFloatBinaryOperation { value_type: WasmValueType, op: WasmFloatBinaryOpKind }
    "Applies a float unary operation of the given width."
    0x0125 WasmFloatUnaryOperation { value_type: WasmValueType, op: WasmFloatUnaryOpKind }
    "Applies a float comparison of the given width."
    0x0126 WasmFloatCompareOperation { value_type: WasmValueType, op: WasmFloatCompareOpKind }
    "Converts between numeric value types."
    0x0127 WasmConversion { kind: WasmConversionKind }
    "Loads a v128 constant."
    0x0128 WasmSimdConst { value: [u8; 16] }
    "Splats a scalar into all lanes of a vector."
    0x0129 WasmSimdSplat { shape: WasmSimdShape }
    "Extracts one lane of a vector."
    0x012a WasmSimdExtractLane { shape: WasmSimdShape, lane: u8 }
    "Applies a lane-wise binary operation."
    0x012b WasmSimdBinaryOperation { shape: WasmSimdShape, op: WasmSimdBinaryOpKind }
    "Loads a value from a memory; inputs are the memory and the address."
    0x012c WasmMemoryLoad { value_type: WasmValueType, offset: i64 }
    "Stores a value to a memory; inputs are the memory, address and value."
    0x012d WasmMemoryStore { value_type: WasmValueType, offset: i64 }
    "Opens a recursive type group."
    0x012e BeginWasmTypeGroup {}
    "Closes a recursive type group."
    0x012f EndWasmTypeGroup {}
    "Defines a struct type inside a type group."
    0x0130 WasmDefineStructType { fields: Vec<WasmStructField> }
    "Defines an array type inside a type group."
    0x0131 WasmDefineArrayType { element: WasmStorageType, is_mutable: bool }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
