//! Lexical context tracking.

use bitflags::bitflags;

bitflags! {
    /// The lexical frames open at a program point.
    ///
    /// Every instruction declares the context it requires and, for block
    /// starts, the context it opens. The stack of open contexts is
    /// maintained by the context analyzer and consulted by the static
    /// validity checker.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Context: u32 {
        /// Plain JavaScript code, the default outer context.
        const JAVASCRIPT = 1 << 0;
        /// Inside any subroutine, where `return` is valid.
        const SUBROUTINE = 1 << 1;
        /// Inside a generator function, where `yield` is valid.
        const GENERATOR_FUNCTION = 1 << 2;
        /// Inside an async function, where `await` is valid.
        const ASYNC_FUNCTION = 1 << 3;
        /// Inside a method of any kind, where `super` is accessible.
        const METHOD = 1 << 4;
        /// Inside a class method, where private names are accessible.
        const CLASS_METHOD = 1 << 5;
        /// Inside a loop body, where `break` and `continue` are valid.
        const LOOP = 1 << 6;
        /// Inside a `with` statement.
        const WITH = 1 << 7;
        /// Inside an object literal body.
        const OBJECT_LITERAL = 1 << 8;
        /// Inside a class definition body.
        const CLASS_DEFINITION = 1 << 9;
        /// Directly inside a switch block, where cases may be defined.
        const SWITCH_BLOCK = 1 << 10;
        /// Inside the body of a switch case.
        const SWITCH_CASE = 1 << 11;
        /// Inside a wasm module.
        const WASM = 1 << 12;
        /// Inside a wasm function body.
        const WASM_FUNCTION = 1 << 13;
        /// Inside a wasm block.
        const WASM_BLOCK = 1 << 14;
        /// Inside a wasm type group.
        const WASM_TYPE_GROUP = 1 << 15;
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::JAVASCRIPT
    }
}

impl Context {
    /// The context entered when a block-start operation executes, given
    /// the surrounding context and the context below it on the stack.
    ///
    /// The opened context normally replaces the surrounding one. Operations
    /// that propagate the surrounding context union it in; operations that
    /// resume it (switch-case bodies) union in the context below the switch
    /// frame instead. A newly opened loop frame suppresses inherited switch
    /// bits and vice versa so the nearest `break` target stays derivable.
    pub fn opened_by(op: &crate::Operation, surrounding: Context, second_from_top: Context) -> Context {
        let mut inherited = Context::empty();
        if op.attributes().contains(crate::Attributes::PROPAGATES_SURROUNDING_CONTEXT) {
            inherited = surrounding;
        } else if op
            .attributes()
            .contains(crate::Attributes::RESUMES_SURROUNDING_CONTEXT)
        {
            inherited = second_from_top;
        }
        let opened = op.context_opened();
        if opened.contains(Context::LOOP) {
            inherited.remove(Context::SWITCH_BLOCK | Context::SWITCH_CASE);
        }
        if opened.contains(Context::SWITCH_BLOCK) {
            inherited.remove(Context::LOOP);
        }
        opened | inherited
    }
}
