//! The static-validity checker.
//!
//! This is the sole gate between externally constructed code and the rest
//! of the pipeline: analyzers and the serializer assume its success and
//! only assert. The six rules checked here are: inputs are defined before
//! use, variables are numbered densely from zero, uses happen inside the
//! defining scope, block begins and ends pair up per the fixed table, each
//! instruction's required context is open at its position, and outputs
//! always define fresh variables.

use crate::error::ValidityError;
use crate::{Code, Context, Operation};
use fuzzil_types::Variable;
use std::collections::HashSet;

impl Code {
    /// Checks every static-validity rule, reporting the first violation.
    pub fn check(&self) -> Result<(), ValidityError> {
        let mut checker = Checker::new();
        for (index, instruction) in self.iter().enumerate() {
            checker.step(index, instruction)?;
        }
        checker.finish()
    }

    /// Whether this code satisfies all static-validity rules.
    pub fn is_statically_valid(&self) -> bool {
        self.check().is_ok()
    }
}

struct Checker<'a> {
    /// One entry per open scope: the variables it declares.
    scopes: Vec<Vec<Variable>>,
    visible: HashSet<Variable>,
    contexts: Vec<Context>,
    /// Open blocks: begin index and begin operation.
    blocks: Vec<(usize, &'a Operation)>,
    num_variables: usize,
}

impl<'a> Checker<'a> {
    fn new() -> Self {
        Self {
            scopes: vec![Vec::new()],
            visible: HashSet::new(),
            contexts: vec![Context::JAVASCRIPT],
            blocks: Vec::new(),
            num_variables: 0,
        }
    }

    fn step(
        &mut self,
        index: usize,
        instruction: &'a crate::Instruction,
    ) -> Result<(), ValidityError> {
        let op = instruction.op();

        // Rule 5: the required context must be open. Block ends are checked
        // against the context inside the block they close.
        let current = *self.contexts.last().expect("context stack underflow");
        if !current.contains(op.required_context()) {
            return Err(ValidityError::WrongContext {
                index,
                operation: op.name(),
            });
        }

        // Rules 1 and 3: inputs must be defined and still in scope.
        for &input in instruction.inputs() {
            if !self.visible.contains(&input) {
                return Err(if input.number() < self.num_variables {
                    ValidityError::UseOutsideScope {
                        index,
                        variable: input,
                    }
                } else {
                    ValidityError::UndefinedInput {
                        index,
                        variable: input,
                    }
                });
            }
        }

        // Rule 4: block ends must match the innermost open block.
        if op.is_block_end() {
            let Some((_, begin)) = self.blocks.pop() else {
                return Err(ValidityError::UnmatchedBlockEnd { index });
            };
            if !begin.opcode().is_matching_end(op.opcode()) {
                return Err(ValidityError::MismatchedBlockEnd {
                    index,
                    begin: begin.name(),
                    end: op.name(),
                });
            }
            let closed = self.scopes.pop().expect("scope stack underflow");
            for variable in closed {
                self.visible.remove(&variable);
            }
            self.contexts.pop();
        }

        // Rules 2 and 6: outer outputs are fresh and densely numbered, and
        // belong to the surrounding scope.
        for &output in instruction.outputs() {
            self.define(index, output)?;
        }

        if op.is_block_start() {
            let surrounding = *self.contexts.last().expect("context stack underflow");
            let second = self
                .contexts
                .len()
                .checked_sub(2)
                .map_or(Context::empty(), |i| self.contexts[i]);
            self.blocks.push((index, op));
            self.scopes.push(Vec::new());
            self.contexts
                .push(Context::opened_by(op, surrounding, second));
        }

        // Inner outputs belong to the newly opened scope.
        for &inner in instruction.inner_outputs() {
            self.define(index, inner)?;
        }

        Ok(())
    }

    fn define(&mut self, index: usize, variable: Variable) -> Result<(), ValidityError> {
        if variable.number() != self.num_variables {
            return Err(ValidityError::NumberingGap {
                index,
                expected: self.num_variables,
                found: variable.number(),
            });
        }
        self.num_variables += 1;
        self.visible.insert(variable);
        self.scopes
            .last_mut()
            .expect("scope stack underflow")
            .push(variable);
        Ok(())
    }

    fn finish(self) -> Result<(), ValidityError> {
        if let Some(&(index, _)) = self.blocks.first() {
            return Err(ValidityError::UnterminatedBlock { index });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::CodeBuilder;
    use crate::operations::Opcode;
    use crate::Instruction;

    fn v(n: usize) -> Variable {
        Variable::new(n)
    }

    #[test]
    fn valid_straight_line_code() {
        let mut b = CodeBuilder::new();
        let a = b.load_int(1);
        let s = b.load_string("x");
        b.binary(a, crate::BinaryOperator::Add, s);
        assert!(b.finish().is_statically_valid());
    }

    #[test]
    fn undefined_input_is_reported() {
        let mut code = Code::new();
        code.append(Instruction::new(
            Operation::new(Opcode::TypeOf {}),
            vec![v(3), v(0)],
        ));
        assert_eq!(
            code.check(),
            Err(ValidityError::UndefinedInput {
                index: 0,
                variable: v(3)
            })
        );
    }

    #[test]
    fn numbering_gaps_are_reported() {
        let mut code = Code::new();
        code.append(Instruction::new(
            Operation::new(Opcode::LoadInteger { value: 0 }),
            vec![v(1)],
        ));
        assert_eq!(
            code.check(),
            Err(ValidityError::NumberingGap {
                index: 0,
                expected: 0,
                found: 1
            })
        );
    }

    #[test]
    fn use_after_scope_close_is_reported() {
        // The loop-body variable is out of scope after the loop.
        let mut b = CodeBuilder::new();
        b.begin_while_header();
        let cond = b.load_bool(false);
        b.begin_while_body(cond);
        let local = b.load_int(1);
        b.end_while();
        b.type_of(local);
        assert_eq!(
            b.finish().check(),
            Err(ValidityError::UseOutsideScope {
                index: 5,
                variable: local
            })
        );
    }

    #[test]
    fn block_end_mismatch_is_reported() {
        let mut b = CodeBuilder::new();
        let cond = b.load_bool(true);
        b.begin_if(cond);
        b.end_try_catch_finally();
        assert!(matches!(
            b.finish().check(),
            Err(ValidityError::MismatchedBlockEnd { index: 2, .. })
        ));
    }

    #[test]
    fn unmatched_block_end_is_reported() {
        let mut b = CodeBuilder::new();
        b.end_if();
        assert_eq!(
            b.finish().check(),
            Err(ValidityError::UnmatchedBlockEnd { index: 0 })
        );
    }

    #[test]
    fn unterminated_block_is_reported() {
        let mut b = CodeBuilder::new();
        let cond = b.load_bool(true);
        b.begin_if(cond);
        assert_eq!(
            b.finish().check(),
            Err(ValidityError::UnterminatedBlock { index: 1 })
        );
    }

    #[test]
    fn required_context_is_enforced() {
        // A break outside of any loop.
        let mut b = CodeBuilder::new();
        b.loop_break();
        assert!(matches!(
            b.finish().check(),
            Err(ValidityError::WrongContext { index: 0, .. })
        ));
    }

    #[test]
    fn loop_context_is_not_visible_inside_nested_function() {
        // A function defined in a loop body opens a fresh context, so
        // breaking from inside it is invalid.
        let mut b = CodeBuilder::new();
        b.begin_while_header();
        let cond = b.load_bool(true);
        b.begin_while_body(cond);
        b.begin_plain_function(0, false);
        b.loop_break();
        b.end_plain_function();
        b.end_while();
        assert!(matches!(
            b.finish().check(),
            Err(ValidityError::WrongContext { index: 4, .. })
        ));
    }

    #[test]
    fn switch_case_resumes_the_outer_context() {
        // A loop around a switch: breaking out of the loop from inside a
        // case body is valid because the case resumes the surrounding
        // context, minus the switch frame.
        let mut b = CodeBuilder::new();
        let value = b.load_int(1);
        b.begin_while_header();
        let cond = b.load_bool(true);
        b.begin_while_body(cond);
        b.emit(Operation::new(Opcode::BeginSwitch {}), &[value]);
        b.emit(Operation::new(Opcode::BeginSwitchCase {}), &[value]);
        b.loop_break();
        b.emit(
            Operation::new(Opcode::EndSwitchCase {
                falls_through: false,
            }),
            &[],
        );
        b.emit(Operation::new(Opcode::EndSwitch {}), &[]);
        b.end_while();
        assert_eq!(b.finish().check(), Ok(()));
    }

    #[test]
    fn wasm_operations_require_wasm_contexts() {
        // A wasm constant outside of a wasm function.
        let mut code = Code::new();
        code.append(Instruction::new(
            Operation::new(Opcode::WasmConsti32 { value: 1 }),
            vec![v(0)],
        ));
        assert!(matches!(
            code.check(),
            Err(ValidityError::WrongContext { index: 0, .. })
        ));
    }
}
