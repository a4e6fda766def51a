//! The flow-sensitive abstract interpreter.
//!
//! A single forward pass over statically valid code that keeps the type of
//! every visible variable current, accounting for control-flow joins. For
//! every instruction it produces the list of `(variable, type)` changes
//! caused by that instruction, which generators consume to guide variable
//! selection.
//!
//! The interpreter is total: every input produces types (or `.unknown`,
//! the JavaScript-side top) and it never rejects a program. Violations of
//! internal invariants are bugs in the embedder and abort via assertions.

mod state;

use crate::environment::Environment;
use crate::Analyzer;
use fuzzil_ir::{
    BinaryOperator, Instruction, Opcode, Parameters, UnaryOperator, WasmIntegerUnaryOpKind,
    WasmSignature,
};
use fuzzil_types::{
    Parameter, Signature, Type, TypeArena, TypeDescription, Variable, WasmValueType,
};
use hashbrown::HashMap;
use state::StateStack;

/// The class definition currently being analyzed.
#[derive(Debug)]
struct ClassContext {
    /// The evolving type of class instances; methods see it as `this`.
    instance_type: Type,
    /// The type of the class value itself; static members attach here.
    class_type: Type,
    /// The instance type of the superclass, for `super` bindings.
    super_instance: Option<Type>,
}

/// Property names collected while an object literal is being built.
#[derive(Debug, Default)]
struct ObjectLiteral {
    properties: Vec<String>,
    methods: Vec<String>,
}

/// The flow-sensitive type inference engine. See the module documentation.
pub struct AbstractInterpreter<'e> {
    environment: &'e dyn Environment,
    state: StateStack,

    class_stack: Vec<ClassContext>,
    object_literals: Vec<ObjectLiteral>,
    /// Loop-variable types of open for loops, captured at the condition.
    for_loop_variables: Vec<Vec<Type>>,
    /// Signatures of open wasm functions, for typing the definition at the
    /// end.
    wasm_functions: Vec<WasmSignature>,
    /// Whether each open try has seen its finally block.
    open_tries: Vec<bool>,
    /// Whether each open if has seen its else block.
    open_ifs: Vec<bool>,

    /// Program-wide property types, consulted before the environment.
    property_types: HashMap<String, Type>,
    /// Program-wide method signatures, consulted before the environment.
    method_signatures: HashMap<String, Signature>,
    /// Signatures attached to specific definition instructions.
    attached_signatures: HashMap<usize, Signature>,

    /// Owns the indexed wasm type descriptions created by type groups.
    wasm_types: TypeArena,

    next_group_index: u64,
    next_index: usize,
    changes: Vec<(Variable, Type)>,
}

impl<'e> AbstractInterpreter<'e> {
    /// Creates an interpreter over the given environment.
    pub fn new(environment: &'e dyn Environment) -> Self {
        Self {
            environment,
            state: StateStack::new(),
            class_stack: Vec::new(),
            object_literals: Vec::new(),
            for_loop_variables: Vec::new(),
            wasm_functions: Vec::new(),
            open_tries: Vec::new(),
            open_ifs: Vec::new(),
            property_types: HashMap::new(),
            method_signatures: HashMap::new(),
            attached_signatures: HashMap::new(),
            wasm_types: TypeArena::new(),
            next_group_index: 1,
            next_index: 0,
            changes: Vec::new(),
        }
    }

    /// The inferred type of `variable` at the current program point, or
    /// `.unknown` for variables never seen.
    pub fn type_of(&self, variable: Variable) -> Type {
        self.state
            .current_type(variable)
            .cloned()
            .unwrap_or_else(Type::unknown)
    }

    /// Attaches a signature to the definition at instruction `index`,
    /// overriding the untyped default when that definition is analyzed.
    pub fn set_signature(&mut self, index: usize, signature: Signature) {
        self.attached_signatures.insert(index, signature);
    }

    /// Sets the program-wide type of property `name`.
    pub fn set_property_type(&mut self, name: impl Into<String>, ty: Type) {
        self.property_types.insert(name.into(), ty);
    }

    /// Sets the program-wide signature of method `name`.
    pub fn set_method_signature(&mut self, name: impl Into<String>, signature: Signature) {
        self.method_signatures.insert(name.into(), signature);
    }

    /// The arena owning the wasm type descriptions seen so far.
    pub fn wasm_types(&self) -> &TypeArena {
        &self.wasm_types
    }

    /// Whether all branch levels opened during analysis have been closed.
    pub fn at_base_state(&self) -> bool {
        self.state.depth() == 1
    }

    /// Whether a type is currently recorded for `variable`. Variables
    /// local to a closed block are forgotten when it ends.
    pub fn is_known(&self, variable: Variable) -> bool {
        self.state.knows(variable)
    }

    /// Whether the interpreter is currently inside a class definition.
    pub fn currently_analyzing_class(&self) -> bool {
        !self.class_stack.is_empty()
    }

    /// Processes the next instruction, returning the type changes it
    /// caused.
    pub fn analyze(&mut self, instruction: &Instruction) -> Vec<(Variable, Type)> {
        self.changes.clear();
        let index = self.next_index;
        self.next_index += 1;

        // Outer outputs that must be visible in the enclosing scope are
        // typed before any state-stack manipulation.
        self.outer_effects(index, instruction);
        self.process_block_structure(instruction);
        self.inner_effects(index, instruction);

        // Whatever the rules above did not type is unknown. This keeps the
        // interpreter total even for operations with no useful inference.
        for &output in instruction.all_outputs() {
            if !self.state.knows(output) {
                self.set_type(output, Type::unknown());
            }
        }

        std::mem::take(&mut self.changes)
    }

    fn set_type(&mut self, variable: Variable, ty: Type) {
        assert!(!ty.is_nothing(), "cannot type {variable} as nothing");
        if self.state.current_type(variable) != Some(&ty) {
            self.changes.push((variable, ty.clone()));
        }
        self.state.set(variable, ty);
    }

    fn unique_group(&mut self, prefix: &str) -> String {
        let index = self.next_group_index;
        self.next_group_index += 1;
        format!("{prefix}{index}")
    }

    fn signature_for(&self, index: usize, parameters: &Parameters) -> Signature {
        self.attached_signatures.get(&index).cloned().unwrap_or_else(|| {
            Signature::for_unknown_function(parameters.count as usize, parameters.has_rest)
        })
    }

    /// Types the parameter variables of a subroutine from its signature.
    /// `skip` inner outputs (e.g. the implicit `this`) precede them.
    fn type_parameters(&mut self, instruction: &Instruction, signature: &Signature, skip: usize) {
        let parameter_variables: Vec<Variable> =
            instruction.inner_outputs()[skip..].to_vec();
        for (position, variable) in parameter_variables.into_iter().enumerate() {
            let ty = match signature.parameters().get(position) {
                Some(Parameter::Plain(t)) => t.clone(),
                Some(Parameter::Opt(t)) => t.clone() | Type::undefined(),
                Some(Parameter::Rest(_)) => self.environment.array_type(),
                None => Type::unknown(),
            };
            self.set_type(variable, ty);
        }
    }

    // --- Outer effects. ---

    fn outer_effects(&mut self, index: usize, instruction: &Instruction) {
        use Opcode::*;
        match instruction.opcode() {
            BeginPlainFunction { parameters } => {
                let signature = self.signature_for(index, parameters);
                self.set_type(
                    instruction.output(),
                    Type::function_and_constructor(Some(signature)),
                );
            }
            BeginArrowFunction { parameters } | BeginAsyncArrowFunction { parameters } => {
                let signature = self.signature_for(index, parameters);
                self.set_type(instruction.output(), Type::function(Some(signature)));
            }
            BeginGeneratorFunction { parameters }
            | BeginAsyncGeneratorFunction { parameters } => {
                // Calling a generator always produces an iterable, no
                // matter what the body returns.
                let signature = self.signature_for(index, parameters);
                let signature =
                    Signature::new(signature.parameters().to_vec(), Type::iterable());
                self.set_type(instruction.output(), Type::function(Some(signature)));
            }
            BeginAsyncFunction { parameters } => {
                // The promise parameterization is not tracked.
                let signature = self.signature_for(index, parameters);
                let signature =
                    Signature::new(signature.parameters().to_vec(), Type::unknown());
                self.set_type(instruction.output(), Type::function(Some(signature)));
            }
            BeginConstructor { parameters } => {
                let signature = self.signature_for(index, parameters);
                self.set_type(instruction.output(), Type::constructor(Some(signature)));
            }
            BeginCodeString {} => {
                self.set_type(instruction.output(), self.environment.string_type());
            }
            BeginClassDefinition { has_superclass } => {
                self.begin_class_definition(index, instruction, *has_superclass);
            }
            _ => {}
        }
    }

    fn begin_class_definition(
        &mut self,
        index: usize,
        instruction: &Instruction,
        has_superclass: bool,
    ) {
        let class_group = self.unique_group("_fuzz_Class");
        let mut instance = Type::object_with(Some(class_group.as_str()), &[], &[]);

        let mut super_instance = None;
        if has_superclass {
            let super_constructor = self.type_of(instruction.input(0));
            if let Some(signature) = super_constructor.signature() {
                let inherited = signature.output().clone();
                let properties: Vec<String> =
                    inherited.properties().map(str::to_owned).collect();
                let methods: Vec<String> = inherited.methods().map(str::to_owned).collect();
                for property in &properties {
                    instance = instance.adding_property(property);
                }
                for method in &methods {
                    instance = instance.adding_method(method);
                }
                super_instance = Some(inherited);
            }
        }

        let signature = self
            .attached_signatures
            .get(&index)
            .cloned()
            .unwrap_or_else(|| {
                Signature::new(vec![Parameter::Rest(Type::js_anything())], instance.clone())
            });
        let constructor_group = self.unique_group("_fuzz_Constructor");
        let class_type = Type::constructor(Some(signature)).setting_group(&constructor_group);

        self.set_type(instruction.output(), class_type.clone());
        self.class_stack.push(ClassContext {
            instance_type: instance,
            class_type,
            super_instance,
        });
    }

    // --- Block structure. ---

    fn process_block_structure(&mut self, instruction: &Instruction) {
        use Opcode::*;
        match instruction.opcode() {
            // Conditionals.
            BeginIf { .. } => {
                self.open_ifs.push(false);
                self.state.push_child();
            }
            BeginElse {} => {
                *self.open_ifs.last_mut().expect("else without if") = true;
                self.fork_sibling();
            }
            EndIf {} => {
                let had_else = self.open_ifs.pop().expect("end without if");
                self.merge(!had_else);
            }
            BeginSwitch {} => self.state.push_child(),
            BeginSwitchCase {} | BeginSwitchDefaultCase {} => self.fork_sibling(),
            // The state opened at BeginSwitch doubles as the no-case-taken
            // path, so the merge needs no extra alternative.
            EndSwitch {} => self.merge(false),

            // Loops. Headers run unconditionally; bodies may be skipped.
            BeginWhileLoopBody {} => self.state.push_child(),
            EndWhileLoop {} => self.merge(true),
            BeginDoWhileLoopBody {} => self.state.push_child(),
            // A do-while body runs at least once.
            BeginDoWhileLoopHeader {} => self.merge(false),
            BeginForLoopCondition { .. } => self.state.push_child(),
            BeginForLoopAfterthought { .. } | BeginForLoopBody { .. } => self.fork_sibling(),
            EndForLoop {} => {
                self.merge(true);
                self.for_loop_variables.pop();
            }
            BeginForInLoop {} | BeginForOfLoop {} | BeginForOfLoopWithDestruct { .. }
            | BeginRepeatLoop { .. } => self.state.push_child(),
            EndForInLoop {} | EndForOfLoop {} | EndRepeatLoop {} => self.merge(true),

            // Exception handling. Try and catch cover all paths between
            // them; an untouched variable keeps its entry type through the
            // catch alternative anyway.
            BeginTry {} => {
                self.open_tries.push(false);
                self.state.push_child();
            }
            BeginCatch {} => self.fork_sibling(),
            BeginFinally {} => {
                *self.open_tries.last_mut().expect("finally without try") = true;
                self.merge(false);
            }
            EndTryCatchFinally {} => {
                if !self.open_tries.pop().expect("end without try") {
                    self.merge(false);
                }
            }

            // Subroutine bodies may execute never, later, or many times.
            BeginPlainFunction { .. }
            | BeginArrowFunction { .. }
            | BeginGeneratorFunction { .. }
            | BeginAsyncFunction { .. }
            | BeginAsyncArrowFunction { .. }
            | BeginAsyncGeneratorFunction { .. }
            | BeginConstructor { .. }
            | BeginObjectLiteralMethod { .. }
            | BeginObjectLiteralGetter { .. }
            | BeginObjectLiteralSetter { .. }
            | BeginCodeString {} => self.state.push_child(),
            EndPlainFunction {}
            | EndArrowFunction {}
            | EndGeneratorFunction {}
            | EndAsyncFunction {}
            | EndAsyncArrowFunction {}
            | EndAsyncGeneratorFunction {}
            | EndConstructor {}
            | EndObjectLiteralMethod {}
            | EndObjectLiteralGetter {}
            | EndObjectLiteralSetter {}
            | EndCodeString {} => self.merge(true),

            // Class bodies: the constructor and each member alternate like
            // switch cases.
            BeginClassDefinition { .. } => self.state.push_child(),
            BeginClassConstructor { .. }
            | BeginClassInstanceMethod { .. }
            | BeginClassInstanceGetter { .. }
            | BeginClassInstanceSetter { .. }
            | BeginClassStaticInitializer {}
            | BeginClassStaticMethod { .. }
            | BeginClassStaticGetter { .. }
            | BeginClassStaticSetter { .. }
            | BeginClassPrivateInstanceMethod { .. }
            | BeginClassPrivateStaticMethod { .. } => self.fork_sibling(),
            EndClassDefinition {} => self.merge(true),

            // Wasm blocks. Branches may skip any suffix of a block, so all
            // merges keep the entry types as an alternative.
            BeginWasmModule {} | BeginWasmFunction { .. } | BeginWasmBlock { .. }
            | BeginWasmLoop { .. } | BeginWasmIf { .. } | BeginWasmTry { .. } => {
                self.state.push_child()
            }
            BeginWasmElse { .. } | BeginWasmCatch { .. } | BeginWasmCatchAll {} => {
                self.fork_sibling()
            }
            EndWasmModule {} | EndWasmFunction {} | EndWasmBlock { .. } | EndWasmLoop { .. }
            | EndWasmIf { .. } | EndWasmTry { .. } => self.merge(true),

            _ => {}
        }
    }

    fn fork_sibling(&mut self) {
        for (variable, rolled_back) in self.state.push_sibling() {
            if let Some(ty) = rolled_back {
                self.changes.push((variable, ty));
            }
        }
    }

    fn merge(&mut self, assume_skipped_path: bool) {
        let merged = self.state.merge_and_pop(assume_skipped_path);
        self.changes.extend(merged);
    }

    // --- Inner effects. ---

    #[allow(clippy::too_many_lines)]
    fn inner_effects(&mut self, index: usize, instruction: &Instruction) {
        use Opcode::*;
        match instruction.opcode() {
            // Literals.
            LoadInteger { .. } => self.set_type(instruction.output(), self.environment.int_type()),
            LoadBigInt { .. } => {
                self.set_type(instruction.output(), self.environment.bigint_type())
            }
            LoadFloat { .. } => self.set_type(instruction.output(), self.environment.float_type()),
            LoadString { .. } => {
                self.set_type(instruction.output(), self.environment.string_type())
            }
            LoadBoolean { .. } => {
                self.set_type(instruction.output(), self.environment.boolean_type())
            }
            LoadUndefined {} => self.set_type(instruction.output(), Type::undefined()),
            LoadNull {} => self.set_type(instruction.output(), self.environment.null_type()),
            LoadRegExp { .. } => {
                self.set_type(instruction.output(), self.environment.regexp_type())
            }
            LoadThis {} => {
                let ty = self
                    .class_stack
                    .last()
                    .map_or_else(|| self.environment.object_type(), |c| c.instance_type.clone());
                self.set_type(instruction.output(), ty);
            }
            LoadArguments {} => {
                self.set_type(instruction.output(), self.environment.array_type())
            }
            LoadNamedVariable { name } => {
                let ty = self.environment.builtin_type(name);
                self.set_type(instruction.output(), ty);
            }

            // Object literals.
            BeginObjectLiteral {} => self.object_literals.push(ObjectLiteral::default()),
            ObjectLiteralAddProperty { property_name } => {
                let is_method = self
                    .environment
                    .custom_method_names()
                    .contains(property_name)
                    || self.type_of(instruction.input(0)).is_a(&Type::function(None));
                let literal = self
                    .object_literals
                    .last_mut()
                    .expect("property outside object literal");
                if is_method {
                    literal.methods.push(property_name.clone());
                } else {
                    literal.properties.push(property_name.clone());
                }
            }
            BeginObjectLiteralMethod {
                method_name,
                parameters,
            } => {
                self.object_literals
                    .last_mut()
                    .expect("method outside object literal")
                    .methods
                    .push(method_name.clone());
                let this = instruction.inner_output(0);
                self.set_type(this, self.environment.object_type());
                let signature = self.signature_for(index, parameters);
                self.type_parameters(instruction, &signature, 1);
            }
            BeginObjectLiteralGetter { property_name } => {
                self.object_literals
                    .last_mut()
                    .expect("getter outside object literal")
                    .properties
                    .push(property_name.clone());
                let this = instruction.inner_output(0);
                self.set_type(this, self.environment.object_type());
            }
            BeginObjectLiteralSetter { property_name } => {
                self.object_literals
                    .last_mut()
                    .expect("setter outside object literal")
                    .properties
                    .push(property_name.clone());
                let this = instruction.inner_output(0);
                self.set_type(this, self.environment.object_type());
                let value = instruction.inner_output(1);
                self.set_type(value, Type::unknown());
            }
            EndObjectLiteral {} => {
                let literal = self
                    .object_literals
                    .pop()
                    .expect("end outside object literal");
                let group = self.unique_group("_fuzz_Object");
                let properties: Vec<&str> =
                    literal.properties.iter().map(String::as_str).collect();
                let methods: Vec<&str> = literal.methods.iter().map(String::as_str).collect();
                let object = Type::object_with(Some(group.as_str()), &properties, &methods);
                let ty = self.environment.object_type().merging(&object);
                self.set_type(instruction.output(), ty);
            }

            // Arrays and templates.
            CreateArray {} | CreateArrayWithSpread { .. } | CreateIntArray { .. }
            | CreateFloatArray { .. } => {
                self.set_type(instruction.output(), self.environment.array_type())
            }
            CreateTemplateString { .. } => {
                self.set_type(instruction.output(), self.environment.string_type())
            }

            // Property access.
            GetProperty { property_name, .. } => {
                let ty = self.lookup_property_type(property_name, instruction.input(0));
                self.set_type(instruction.output(), ty);
            }
            SetProperty { property_name } | UpdateProperty { property_name, .. } => {
                self.widen_with_property(instruction.input(0), property_name);
            }
            ConfigureProperty { property_name, .. } => {
                self.widen_with_property(instruction.input(0), property_name);
            }
            DeleteProperty { property_name, .. } => {
                let receiver = instruction.input(0);
                let narrowed = self
                    .type_of(receiver)
                    .removing_property(property_name)
                    .removing_method(property_name);
                self.set_type(receiver, narrowed);
                self.set_type(instruction.output(), self.environment.boolean_type());
            }
            DeleteElement { .. } | DeleteComputedProperty { .. } => {
                self.set_type(instruction.output(), self.environment.boolean_type());
            }
            GetSuperProperty { property_name } => {
                let receiver = self
                    .class_stack
                    .last()
                    .and_then(|c| c.super_instance.clone())
                    .unwrap_or_else(Type::unknown);
                let ty = self
                    .property_types
                    .get(property_name)
                    .cloned()
                    .unwrap_or_else(|| self.environment.property_type(property_name, &receiver));
                self.set_type(instruction.output(), ty);
            }

            // Type probing and operators.
            TypeOf {} => self.set_type(instruction.output(), Type::string()),
            TestInstanceOf {} | TestIn {} => {
                self.set_type(instruction.output(), self.environment.boolean_type())
            }
            UnaryOperation { op } => {
                let input = self.type_of(instruction.input(0));
                let ty = self.unary_output_type(*op, &input);
                self.set_type(instruction.output(), ty);
            }
            BinaryOperation { op } => {
                let lhs = self.type_of(instruction.input(0));
                let rhs = self.type_of(instruction.input(1));
                let ty = self.binary_output_type(*op, &lhs, &rhs);
                self.set_type(instruction.output(), ty);
            }
            Update { op } => {
                let lhs = self.type_of(instruction.input(0));
                let rhs = self.type_of(instruction.input(1));
                let ty = self.binary_output_type(*op, &lhs, &rhs);
                self.set_type(instruction.input(0), ty);
            }
            TernaryOperation {} => {
                let ty = self
                    .type_of(instruction.input(1))
                    .union(&self.type_of(instruction.input(2)));
                self.set_type(instruction.output(), ty);
            }
            Compare { .. } => {
                self.set_type(instruction.output(), self.environment.boolean_type())
            }
            Dup {} => {
                let ty = self.type_of(instruction.input(0));
                self.set_type(instruction.output(), ty);
            }
            Reassign {} => {
                let ty = self.type_of(instruction.input(1));
                self.set_type(instruction.input(0), ty);
            }
            DestructArrayAndReassign { .. } | DestructObjectAndReassign { .. } => {
                let targets: Vec<Variable> = instruction.inputs()[1..].to_vec();
                for target in targets {
                    self.set_type(target, Type::unknown());
                }
            }

            // Calls.
            CallFunction { .. } | CallFunctionWithSpread { .. } | Construct { .. }
            | ConstructWithSpread { .. } => {
                let callee = self.type_of(instruction.input(0));
                let ty = callee
                    .signature()
                    .map_or_else(Type::unknown, |s| s.output().clone());
                self.set_type(instruction.output(), ty);
            }
            CallMethod { method_name, .. } | CallMethodWithSpread { method_name, .. } => {
                let receiver = self.type_of(instruction.input(0));
                let ty = self.lookup_method_signature(method_name, &receiver);
                self.set_type(instruction.output(), ty);
            }
            CallSuperMethod { method_name } => {
                let receiver = self
                    .class_stack
                    .last()
                    .and_then(|c| c.super_instance.clone())
                    .unwrap_or_else(Type::unknown);
                let ty = self.lookup_method_signature(method_name, &receiver);
                self.set_type(instruction.output(), ty);
            }

            // Functions and generators.
            BeginPlainFunction { parameters }
            | BeginArrowFunction { parameters }
            | BeginGeneratorFunction { parameters }
            | BeginAsyncFunction { parameters }
            | BeginAsyncArrowFunction { parameters }
            | BeginAsyncGeneratorFunction { parameters } => {
                let signature = self.signature_for(index, parameters);
                self.type_parameters(instruction, &signature, 0);
            }
            BeginConstructor { parameters } => {
                self.set_type(instruction.inner_output(0), self.environment.object_type());
                let signature = self.signature_for(index, parameters);
                self.type_parameters(instruction, &signature, 1);
            }

            // Loops.
            BeginForLoopCondition { .. } => {
                let types: Vec<Type> = instruction
                    .inputs()
                    .iter()
                    .map(|&input| self.type_of(input))
                    .collect();
                let inner: Vec<Variable> = instruction.inner_outputs().to_vec();
                for (variable, ty) in inner.iter().zip(types.iter()) {
                    self.set_type(*variable, ty.clone());
                }
                self.for_loop_variables.push(types);
            }
            BeginForLoopAfterthought { .. } | BeginForLoopBody { .. } => {
                let types = self
                    .for_loop_variables
                    .last()
                    .expect("for-loop phase outside a for loop")
                    .clone();
                let inner: Vec<Variable> = instruction.inner_outputs().to_vec();
                for (variable, ty) in inner.iter().zip(types.iter()) {
                    self.set_type(*variable, ty.clone());
                }
            }
            BeginForInLoop {} => {
                // Enumerated keys are always strings.
                self.set_type(instruction.inner_output(0), Type::string());
            }
            BeginRepeatLoop {
                exposes_loop_counter: true,
                ..
            } => {
                self.set_type(instruction.inner_output(0), Type::integer());
            }

            // Classes.
            BeginClassConstructor { parameters } => {
                let instance = self
                    .class_stack
                    .last()
                    .expect("constructor outside class")
                    .instance_type
                    .clone();
                self.set_type(instruction.inner_output(0), instance);
                let signature = self.signature_for(index, parameters);
                self.type_parameters(instruction, &signature, 1);
            }
            ClassAddInstanceProperty { property_name, .. } => {
                let class = self.class_stack.last_mut().expect("member outside class");
                class.instance_type = class.instance_type.adding_property(property_name);
            }
            ClassAddStaticProperty { property_name, .. } => {
                let class = self.class_stack.last_mut().expect("member outside class");
                class.class_type = class.class_type.adding_property(property_name);
            }
            BeginClassInstanceMethod {
                method_name,
                parameters,
            }
            | BeginClassPrivateInstanceMethod {
                method_name,
                parameters,
            } => {
                let instance = {
                    let class = self.class_stack.last_mut().expect("method outside class");
                    if !matches!(
                        instruction.opcode(),
                        BeginClassPrivateInstanceMethod { .. }
                    ) {
                        class.instance_type = class.instance_type.adding_method(method_name);
                    }
                    class.instance_type.clone()
                };
                self.set_type(instruction.inner_output(0), instance);
                let signature = self.signature_for(index, parameters);
                self.type_parameters(instruction, &signature, 1);
            }
            BeginClassInstanceGetter { property_name } => {
                let instance = {
                    let class = self.class_stack.last_mut().expect("getter outside class");
                    class.instance_type = class.instance_type.adding_property(property_name);
                    class.instance_type.clone()
                };
                self.set_type(instruction.inner_output(0), instance);
            }
            BeginClassInstanceSetter { property_name } => {
                let instance = {
                    let class = self.class_stack.last_mut().expect("setter outside class");
                    class.instance_type = class.instance_type.adding_property(property_name);
                    class.instance_type.clone()
                };
                self.set_type(instruction.inner_output(0), instance);
                self.set_type(instruction.inner_output(1), Type::unknown());
            }
            BeginClassStaticMethod {
                method_name,
                parameters,
            }
            | BeginClassPrivateStaticMethod {
                method_name,
                parameters,
            } => {
                let class_type = {
                    let class = self.class_stack.last_mut().expect("method outside class");
                    if !matches!(instruction.opcode(), BeginClassPrivateStaticMethod { .. }) {
                        class.class_type = class.class_type.adding_method(method_name);
                    }
                    class.class_type.clone()
                };
                self.set_type(instruction.inner_output(0), class_type);
                let signature = self.signature_for(index, parameters);
                self.type_parameters(instruction, &signature, 1);
            }
            BeginClassStaticGetter { property_name } => {
                let class_type = {
                    let class = self.class_stack.last_mut().expect("getter outside class");
                    class.class_type = class.class_type.adding_property(property_name);
                    class.class_type.clone()
                };
                self.set_type(instruction.inner_output(0), class_type);
            }
            BeginClassStaticSetter { property_name } => {
                let class_type = {
                    let class = self.class_stack.last_mut().expect("setter outside class");
                    class.class_type = class.class_type.adding_property(property_name);
                    class.class_type.clone()
                };
                self.set_type(instruction.inner_output(0), class_type);
                self.set_type(instruction.inner_output(1), Type::unknown());
            }
            BeginClassStaticInitializer {} => {
                let class_type = self
                    .class_stack
                    .last()
                    .expect("initializer outside class")
                    .class_type
                    .clone();
                self.set_type(instruction.inner_output(0), class_type);
            }
            EndClassDefinition {} => {
                self.class_stack.pop().expect("end outside class");
            }

            // Wasm.
            BeginWasmFunction { signature } => {
                self.wasm_functions.push(signature.clone());
                let parameters: Vec<(Variable, WasmValueType)> = instruction
                    .inner_outputs()
                    .iter()
                    .copied()
                    .zip(signature.parameters.iter().copied())
                    .collect();
                for (variable, value_type) in parameters {
                    self.set_type(variable, value_type.lattice_type());
                }
            }
            EndWasmFunction {} => {
                let signature = self
                    .wasm_functions
                    .pop()
                    .expect("end outside wasm function");
                self.set_type(
                    instruction.output(),
                    Type::wasm_function_def(signature.parameters, signature.results),
                );
            }
            EndWasmModule {} => {
                let group = self.unique_group("_fuzz_WasmExports");
                let ty = Type::object_with(Some(group.as_str()), &[], &[]);
                self.set_type(instruction.output(), ty);
            }
            CreateWasmMemory {
                limits,
                is_shared,
                is_memory64,
            }
            | WasmDefineMemory {
                limits,
                is_shared,
                is_memory64,
            } => {
                let ty = Type::wasm_memory(*limits, *is_shared, *is_memory64);
                self.set_type(instruction.output(), ty);
            }
            CreateWasmTable {
                element_type,
                limits,
            }
            | WasmDefineTable {
                element_type,
                limits,
            } => {
                let ty = Type::wasm_table(*element_type, *limits);
                self.set_type(instruction.output(), ty);
            }
            CreateWasmGlobal { value, is_mutable } | WasmDefineGlobal { value, is_mutable } => {
                let ty = Type::wasm_global(value.value_type(), *is_mutable);
                self.set_type(instruction.output(), ty);
            }
            CreateWasmTag { parameters } | WasmDefineTag { parameters } => {
                let ty = Type::wasm_tag(parameters.clone());
                self.set_type(instruction.output(), ty);
            }
            WasmImportMemory {} | WasmImportTable {} | WasmImportGlobal {} => {
                let ty = self.type_of(instruction.input(0));
                self.set_type(instruction.output(), ty);
            }
            BeginWasmBlock { signature } | BeginWasmLoop { signature }
            | BeginWasmIf { signature } | BeginWasmElse { signature }
            | BeginWasmTry { signature } => {
                let label = Type::wasm_label(signature.parameters.clone());
                self.set_type(instruction.inner_output(0), label);
                let parameters: Vec<(Variable, WasmValueType)> = instruction.inner_outputs()
                    [1..]
                    .iter()
                    .copied()
                    .zip(signature.parameters.iter().copied())
                    .collect();
                for (variable, value_type) in parameters {
                    self.set_type(variable, value_type.lattice_type());
                }
            }
            BeginWasmCatch { parameters } => {
                let bindings: Vec<(Variable, WasmValueType)> = instruction
                    .inner_outputs()
                    .iter()
                    .copied()
                    .zip(parameters.iter().copied())
                    .collect();
                for (variable, value_type) in bindings {
                    self.set_type(variable, value_type.lattice_type());
                }
            }
            EndWasmBlock { results } | EndWasmLoop { results } | EndWasmIf { results }
            | EndWasmTry { results } => {
                let outputs: Vec<(Variable, WasmValueType)> = instruction
                    .outputs()
                    .iter()
                    .copied()
                    .zip(results.iter().copied())
                    .collect();
                for (variable, value_type) in outputs {
                    self.set_type(variable, value_type.lattice_type());
                }
            }
            WasmConsti32 { .. } => self.set_type(instruction.output(), Type::wasm_i32()),
            WasmConsti64 { .. } => self.set_type(instruction.output(), Type::wasm_i64()),
            WasmConstf32 { .. } => self.set_type(instruction.output(), Type::wasm_f32()),
            WasmConstf64 { .. } => self.set_type(instruction.output(), Type::wasm_f64()),
            WasmSimdConst { .. } => self.set_type(instruction.output(), Type::wasm_simd128()),
            WasmIntegerBinaryOperation { value_type, .. } => {
                self.set_type(instruction.output(), value_type.lattice_type());
            }
            WasmIntegerUnaryOperation { value_type, op } => {
                // Eqz produces a truth value regardless of operand width.
                let ty = if matches!(op, WasmIntegerUnaryOpKind::Eqz) {
                    Type::wasm_i32()
                } else {
                    value_type.lattice_type()
                };
                self.set_type(instruction.output(), ty);
            }
            WasmFloatBinaryOperation { value_type, .. }
            | WasmFloatUnaryOperation { value_type, .. } => {
                self.set_type(instruction.output(), value_type.lattice_type());
            }
            WasmIntegerCompareOperation { .. } | WasmFloatCompareOperation { .. } => {
                self.set_type(instruction.output(), Type::wasm_i32());
            }
            WasmConversion { kind } => {
                self.set_type(instruction.output(), kind.output_type().lattice_type());
            }
            WasmSimdSplat { .. } | WasmSimdBinaryOperation { .. } => {
                self.set_type(instruction.output(), Type::wasm_simd128());
            }
            WasmSimdExtractLane { shape, .. } => {
                self.set_type(instruction.output(), shape.lane_type().lattice_type());
            }
            WasmMemoryLoad { value_type, .. } => {
                self.set_type(instruction.output(), value_type.lattice_type());
            }
            WasmDefineStructType { fields } => {
                let id = self.wasm_types.add(TypeDescription::Struct {
                    fields: fields.clone(),
                });
                self.set_type(instruction.output(), Type::wasm_type_def(Some(id)));
            }
            WasmDefineArrayType {
                element,
                is_mutable,
            } => {
                let id = self.wasm_types.add(TypeDescription::Array {
                    element: *element,
                    is_mutable: *is_mutable,
                });
                self.set_type(instruction.output(), Type::wasm_type_def(Some(id)));
            }

            // Everything else either has no outputs or produces values the
            // interpreter cannot reason about; the caller-side fallback
            // types those as unknown.
            _ => {}
        }
    }

    fn lookup_property_type(&self, name: &str, receiver: Variable) -> Type {
        if let Some(ty) = self.property_types.get(name) {
            return ty.clone();
        }
        let receiver_type = self.type_of(receiver);
        self.environment.property_type(name, &receiver_type)
    }

    fn lookup_method_signature(&self, name: &str, receiver: &Type) -> Type {
        if let Some(signature) = self.method_signatures.get(name) {
            return signature.output().clone();
        }
        self.environment
            .method_signature(name, receiver)
            .map_or_else(Type::unknown, |s| s.output().clone())
    }

    fn widen_with_property(&mut self, receiver: Variable, name: &str) {
        let ty = self.type_of(receiver);
        let widened = if self.environment.custom_method_names().contains(name) {
            ty.adding_method(name)
        } else {
            ty.adding_property(name)
        };
        self.set_type(receiver, widened);
    }

    fn bigint_contagion(&self, inputs: &[&Type], fallback: Type) -> Type {
        let bigint = Type::bigint();
        if inputs.iter().all(|ty| ty.is_a(&bigint)) {
            self.environment.bigint_type()
        } else if inputs.iter().any(|ty| ty.may_be(&bigint)) {
            fallback | self.environment.bigint_type()
        } else {
            fallback
        }
    }

    fn unary_output_type(&self, op: UnaryOperator, input: &Type) -> Type {
        use UnaryOperator::*;
        match op {
            LogicalNot => self.environment.boolean_type(),
            // Unary plus converts to a number and throws on BigInts.
            Plus => Type::number(),
            BitwiseNot => self.bigint_contagion(&[input], Type::integer()),
            Minus | PreInc | PreDec | PostInc | PostDec => {
                self.bigint_contagion(&[input], Type::number())
            }
        }
    }

    fn binary_output_type(&self, op: BinaryOperator, lhs: &Type, rhs: &Type) -> Type {
        use BinaryOperator::*;
        let fallback = match op {
            // Addition concatenates or adds.
            Add => Type::primitive(),
            Sub | Mul | Div | Mod | Exp => Type::number(),
            BitAnd | BitOr | Xor | LShift | RShift | UnRShift => Type::integer(),
            LogicAnd | LogicOr => self.environment.boolean_type(),
        };
        self.bigint_contagion(&[lhs, rhs], fallback)
    }
}

impl Analyzer for AbstractInterpreter<'_> {
    fn analyze(&mut self, instruction: &Instruction) {
        let _ = AbstractInterpreter::analyze(self, instruction);
    }
}
