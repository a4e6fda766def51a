//! Instructions: an operation applied to concrete variables.

use crate::{Attributes, Opcode, Operation};
use bitflags::bitflags;
use core::fmt;
use fuzzil_types::Variable;
use std::sync::Arc;

bitflags! {
    /// Per-instruction flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InstructionFlags: u8 {
        /// The instruction must not be removed by minimization.
        const NOT_REMOVABLE = 1 << 0;
    }
}

/// A single instruction: an [`Operation`] plus the variables it operates
/// on, laid out as `[inputs | outputs | inner outputs]`.
///
/// The instruction exclusively owns its variable vector; the operation is
/// shared by reference and may be pointed to by many instructions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instruction {
    op: Arc<Operation>,
    inouts: Box<[Variable]>,
    index: Option<u16>,
    flags: InstructionFlags,
}

impl Instruction {
    /// Creates an instruction for a fresh operation.
    ///
    /// # Panics
    ///
    /// Panics if the number of variables does not match the operation's
    /// arities.
    pub fn new(op: Operation, inouts: Vec<Variable>) -> Self {
        Self::with_flags(Arc::new(op), inouts, InstructionFlags::empty())
    }

    /// Creates an instruction sharing an existing operation.
    pub fn with_shared_op(op: Arc<Operation>, inouts: Vec<Variable>) -> Self {
        Self::with_flags(op, inouts, InstructionFlags::empty())
    }

    /// Creates an instruction with explicit flags.
    pub fn with_flags(op: Arc<Operation>, inouts: Vec<Variable>, flags: InstructionFlags) -> Self {
        assert_eq!(
            inouts.len(),
            op.num_inouts(),
            "{} takes {} variables, got {}",
            op.name(),
            op.num_inouts(),
            inouts.len()
        );
        Self {
            op,
            inouts: inouts.into_boxed_slice(),
            index: None,
            flags,
        }
    }

    /// The operation of this instruction.
    pub fn op(&self) -> &Operation {
        &self.op
    }

    /// The opcode of this instruction.
    pub fn opcode(&self) -> &Opcode {
        self.op.opcode()
    }

    /// The shared operation handle, used by the serializer's cache.
    pub(crate) fn shared_operation(&self) -> &Arc<Operation> {
        &self.op
    }

    /// The index of this instruction in its enclosing code, if it has been
    /// appended to one.
    pub fn index(&self) -> Option<usize> {
        self.index.map(usize::from)
    }

    pub(crate) fn set_index(&mut self, index: u16) {
        self.index = Some(index);
    }

    /// The per-instruction flags.
    pub fn flags(&self) -> InstructionFlags {
        self.flags
    }

    /// Sets the per-instruction flags.
    pub fn set_flags(&mut self, flags: InstructionFlags) {
        self.flags = flags;
    }

    /// The full `[inputs | outputs | inner outputs]` vector.
    pub fn inouts(&self) -> &[Variable] {
        &self.inouts
    }

    /// The number of input variables.
    pub fn num_inputs(&self) -> usize {
        self.op.num_inputs()
    }

    /// The input variables.
    pub fn inputs(&self) -> &[Variable] {
        &self.inouts[..self.num_inputs()]
    }

    /// The input at `index`.
    pub fn input(&self, index: usize) -> Variable {
        self.inputs()[index]
    }

    /// The variadic tail of the inputs, empty for non-variadic operations.
    pub fn variadic_inputs(&self) -> &[Variable] {
        match self.op.first_variadic_input() {
            Some(first) => &self.inouts[first..self.num_inputs()],
            None => &[],
        }
    }

    /// The number of outputs visible in the surrounding scope.
    pub fn num_outputs(&self) -> usize {
        self.op.num_outputs()
    }

    /// The outputs visible in the surrounding scope.
    pub fn outputs(&self) -> &[Variable] {
        let start = self.num_inputs();
        &self.inouts[start..start + self.num_outputs()]
    }

    /// The single output of this instruction.
    ///
    /// # Panics
    ///
    /// Panics unless the operation has exactly one output.
    pub fn output(&self) -> Variable {
        assert_eq!(self.num_outputs(), 1, "{} has no single output", self.op.name());
        self.outputs()[0]
    }

    /// The number of outputs visible only inside the opened block.
    pub fn num_inner_outputs(&self) -> usize {
        self.op.num_inner_outputs()
    }

    /// The outputs visible only inside the opened block.
    pub fn inner_outputs(&self) -> &[Variable] {
        &self.inouts[self.num_inputs() + self.num_outputs()..]
    }

    /// The inner output at `index`.
    pub fn inner_output(&self, index: usize) -> Variable {
        self.inner_outputs()[index]
    }

    /// All outputs, outer then inner.
    pub fn all_outputs(&self) -> &[Variable] {
        &self.inouts[self.num_inputs()..]
    }

    /// Whether this instruction defines any variables.
    pub fn has_outputs(&self) -> bool {
        self.num_outputs() + self.num_inner_outputs() > 0
    }

    /// Whether the input at `index` is overwritten rather than read.
    pub fn reassigns(&self, index: usize) -> bool {
        self.op.reassigns(index)
    }

    /// Whether this instruction uses `variable` as an input.
    pub fn uses(&self, variable: Variable) -> bool {
        self.inputs().contains(&variable)
    }

    /// Whether this instruction opens a block.
    pub fn is_block_start(&self) -> bool {
        self.op.is_block_start()
    }

    /// Whether this instruction closes a block.
    pub fn is_block_end(&self) -> bool {
        self.op.is_block_end()
    }

    /// Whether this instruction belongs to a block group, i.e. opens or
    /// closes a block.
    pub fn is_block(&self) -> bool {
        self.is_block_start() || self.is_block_end()
    }

    /// Whether this instruction unconditionally transfers control.
    pub fn is_jump(&self) -> bool {
        self.op.is_jump()
    }

    /// Whether this instruction is a call.
    pub fn is_call(&self) -> bool {
        self.op.attributes().contains(Attributes::IS_CALL)
    }

    /// Whether this instruction does nothing.
    pub fn is_nop(&self) -> bool {
        self.op.attributes().contains(Attributes::IS_NOP)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.outputs().is_empty() {
            let outputs: Vec<String> = self.outputs().iter().map(Variable::to_string).collect();
            write!(f, "{} <- ", outputs.join(", "))?;
        }
        write!(f, "{}", self.op.name())?;
        for input in self.inputs() {
            write!(f, " {input}")?;
        }
        if !self.inner_outputs().is_empty() {
            let inner: Vec<String> = self
                .inner_outputs()
                .iter()
                .map(Variable::to_string)
                .collect();
            write!(f, " -> {}", inner.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::{BinaryOperator, Opcode};

    fn v(n: usize) -> Variable {
        Variable::new(n)
    }

    #[test]
    fn inout_partitioning() {
        let op = Operation::new(Opcode::BinaryOperation {
            op: BinaryOperator::Add,
        });
        let instr = Instruction::new(op, vec![v(0), v(1), v(2)]);
        assert_eq!(instr.inputs(), &[v(0), v(1)]);
        assert_eq!(instr.outputs(), &[v(2)]);
        assert_eq!(instr.output(), v(2));
        assert!(instr.inner_outputs().is_empty());
        assert!(instr.uses(v(1)));
        assert!(!instr.uses(v(2)));
    }

    #[test]
    fn variadic_inputs() {
        let op = Operation::with_variadic(Opcode::CallFunction { is_guarded: false }, 2);
        let instr = Instruction::new(op, vec![v(0), v(1), v(2), v(3)]);
        assert_eq!(instr.inputs(), &[v(0), v(1), v(2)]);
        assert_eq!(instr.variadic_inputs(), &[v(1), v(2)]);
        assert_eq!(instr.output(), v(3));
        assert!(instr.is_call());
    }

    #[test]
    #[should_panic(expected = "takes 3 variables")]
    fn arity_is_checked() {
        let op = Operation::new(Opcode::BinaryOperation {
            op: BinaryOperator::Add,
        });
        let _ = Instruction::new(op, vec![v(0), v(1)]);
    }

    #[test]
    fn reassignment_queries() {
        let op = Operation::new(Opcode::Reassign {});
        let instr = Instruction::new(op, vec![v(0), v(1)]);
        assert!(instr.reassigns(0));
        assert!(!instr.reassigns(1));
    }
}
