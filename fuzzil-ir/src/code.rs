//! Code: an ordered, append-only sequence of instructions.

use crate::Instruction;
use core::fmt;
use core::ops::Index;
use fuzzil_types::{Variable, VariableMap};

/// The maximum number of instructions in a single piece of code.
pub const MAX_CODE_LENGTH: usize = 0x10000;

/// An ordered sequence of instructions.
///
/// Appending stamps each instruction with its index. Code handed to
/// analyzers or the serializer must be statically valid; use
/// [`Code::check`] to verify code received from an untrusted source once,
/// before any other processing.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Code {
    instructions: Vec<Instruction>,
}

impl Code {
    /// Creates empty code.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether there are no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Appends an instruction, stamping it with its index.
    ///
    /// # Panics
    ///
    /// Panics if the code is already [`MAX_CODE_LENGTH`] instructions long.
    pub fn append(&mut self, mut instruction: Instruction) {
        assert!(self.len() < MAX_CODE_LENGTH, "code too long");
        instruction.set_index(self.len() as u16);
        self.instructions.push(instruction);
    }

    /// The instruction at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// The last instruction, if any.
    pub fn last(&self) -> Option<&Instruction> {
        self.instructions.last()
    }

    /// Iterates over the instructions in program order.
    pub fn iter(&self) -> core::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    /// Mutable access to an instruction, e.g. to set its flags. The
    /// operation and variables of an appended instruction must not be
    /// changed through this.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Instruction> {
        self.instructions.get_mut(index)
    }

    /// The number of variables defined by this code.
    pub fn num_variables(&self) -> usize {
        self.instructions
            .iter()
            .map(|instruction| instruction.all_outputs().len())
            .sum()
    }

    /// The index of the block-begin matching the block-end at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a block end or the blocks are unbalanced;
    /// this helper is for statically valid code only.
    pub fn find_block_begin(&self, index: usize) -> usize {
        assert!(self[index].is_block_end(), "not a block end");
        let mut depth = 0usize;
        for candidate in (0..index).rev() {
            let instruction = &self[candidate];
            // An instruction can close one block and open the next; seen
            // from below, the open counts first.
            if instruction.is_block_start() {
                if depth == 0 {
                    return candidate;
                }
                depth -= 1;
            }
            if instruction.is_block_end() {
                depth += 1;
            }
        }
        panic!("unbalanced blocks");
    }

    /// The index of the block-end matching the block-begin at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a block start or the blocks are unbalanced.
    pub fn find_block_end(&self, index: usize) -> usize {
        assert!(self[index].is_block_start(), "not a block start");
        let mut depth = 0usize;
        for candidate in index + 1..self.len() {
            let instruction = &self[candidate];
            if instruction.is_block_end() {
                if depth == 0 {
                    return candidate;
                }
                depth -= 1;
            }
            if instruction.is_block_start() {
                depth += 1;
            }
        }
        panic!("unbalanced blocks");
    }

    /// The indices of every block-start and block-end instruction of the
    /// block group containing `index`, in order. For an if/else this is
    /// `[BeginIf, BeginElse, EndIf]`, and so on.
    pub fn block_group(&self, index: usize) -> Vec<usize> {
        assert!(self[index].is_block(), "not a block instruction");
        // Rewind to the group head first.
        let mut head = index;
        while self[head].is_block_end() {
            head = self.find_block_begin(head);
        }
        let mut indices = vec![head];
        let mut current = head;
        while self[current].is_block_start() {
            current = self.find_block_end(current);
            indices.push(current);
        }
        indices
    }

    /// Renumbers all variables so that numbering is dense again, e.g.
    /// after instructions were removed or replaced with `Nop`s.
    ///
    /// # Panics
    ///
    /// Panics if an input refers to a variable that is never defined.
    pub fn renumber_variables(&mut self) {
        let mut mapping: VariableMap<Variable> = VariableMap::new();
        let mut next = 0usize;
        for instruction in &self.instructions {
            for &output in instruction.all_outputs() {
                mapping.insert(output, Variable::new(next));
                next += 1;
            }
        }
        for instruction in &mut self.instructions {
            let op = instruction.shared_operation().clone();
            let flags = instruction.flags();
            let index = instruction.index();
            let inouts = instruction
                .inouts()
                .iter()
                .map(|variable| *mapping.get(*variable).expect("undefined variable"))
                .collect();
            *instruction = Instruction::with_flags(op, inouts, flags);
            if let Some(index) = index {
                instruction.set_index(index as u16);
            }
        }
    }
}

impl Index<usize> for Code {
    type Output = Instruction;

    fn index(&self, index: usize) -> &Instruction {
        &self.instructions[index]
    }
}

impl<'a> IntoIterator for &'a Code {
    type Item = &'a Instruction;
    type IntoIter = core::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}

impl FromIterator<Instruction> for Code {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        let mut code = Code::new();
        for instruction in iter {
            code.append(instruction);
        }
        code
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in self {
            writeln!(f, "{instruction}")?;
        }
        Ok(())
    }
}
