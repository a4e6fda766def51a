//! Lexical context tracking.

use super::Analyzer;
use fuzzil_ir::{Context, Instruction};

/// Maintains the stack of open lexical contexts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextAnalyzer {
    stack: Vec<Context>,
}

impl ContextAnalyzer {
    /// Creates an analyzer with the default JavaScript context open.
    pub fn new() -> Self {
        Self {
            stack: vec![Context::JAVASCRIPT],
        }
    }

    /// The context at the current program point.
    pub fn context(&self) -> Context {
        *self.stack.last().expect("context stack underflow")
    }
}

impl Default for ContextAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for ContextAnalyzer {
    fn analyze(&mut self, instruction: &Instruction) {
        if instruction.is_block_end() {
            self.stack.pop();
            assert!(!self.stack.is_empty(), "closed the outermost context");
        }
        if instruction.is_block_start() {
            let surrounding = self.context();
            let second = self
                .stack
                .len()
                .checked_sub(2)
                .map_or(Context::empty(), |i| self.stack[i]);
            self.stack
                .push(Context::opened_by(instruction.op(), surrounding, second));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzil_ir::builder::CodeBuilder;
    use fuzzil_ir::{Opcode, Operation};

    #[test]
    fn function_bodies_open_fresh_contexts() {
        let mut b = CodeBuilder::new();
        b.begin_plain_function(0, false);
        let code = b.finish();

        let mut analyzer = ContextAnalyzer::new();
        for instruction in &code {
            analyzer.analyze(instruction);
        }
        let context = analyzer.context();
        assert!(context.contains(Context::JAVASCRIPT | Context::SUBROUTINE));
        assert!(!context.contains(Context::LOOP));
    }

    #[test]
    fn loop_bodies_propagate_the_surrounding_context() {
        let mut b = CodeBuilder::new();
        b.begin_plain_function(0, false);
        b.begin_while_header();
        let cond = b.load_bool(true);
        b.begin_while_body(cond);
        let code = b.finish();

        let mut analyzer = ContextAnalyzer::new();
        for instruction in &code {
            analyzer.analyze(instruction);
        }
        let context = analyzer.context();
        assert!(context.contains(Context::LOOP));
        // `return` stays valid inside the loop.
        assert!(context.contains(Context::SUBROUTINE));
    }

    #[test]
    fn switch_cases_suppress_the_switch_frame_but_resume_the_loop() {
        let mut b = CodeBuilder::new();
        let value = b.load_int(0);
        b.begin_while_header();
        let cond = b.load_bool(true);
        b.begin_while_body(cond);
        b.emit(Operation::new(Opcode::BeginSwitch {}), &[value]);
        b.emit(Operation::new(Opcode::BeginSwitchCase {}), &[value]);
        let code = b.finish();

        let mut analyzer = ContextAnalyzer::new();
        let mut inside_switch = Context::empty();
        for (index, instruction) in code.iter().enumerate() {
            analyzer.analyze(instruction);
            if index == 3 {
                inside_switch = analyzer.context();
            }
        }

        // Directly inside the switch, only case definitions are possible.
        assert_eq!(inside_switch, Context::SWITCH_BLOCK);
        // Inside the case body, the loop is reachable again for `break`.
        let context = analyzer.context();
        assert!(context.contains(Context::SWITCH_CASE));
        assert!(context.contains(Context::LOOP));
        assert!(!context.contains(Context::SWITCH_BLOCK));
    }
}
