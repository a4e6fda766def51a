//! Variable definition and use tracking.

use super::Analyzer;
use fuzzil_ir::Instruction;
use fuzzil_types::{Variable, VariableMap};

/// Tracks, for every variable, the instruction defining it, the
/// instructions reassigning it and the instructions using it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DefUseAnalyzer {
    definitions: VariableMap<usize>,
    assignments: VariableMap<Vec<usize>>,
    uses: VariableMap<Vec<usize>>,
    next_index: usize,
}

impl DefUseAnalyzer {
    /// Creates an empty analyzer.
    pub fn new() -> Self {
        Self::default()
    }

    /// The index of the instruction defining `variable`.
    ///
    /// # Panics
    ///
    /// Panics if `variable` has not been defined; asking about unknown
    /// variables is a bug in the caller.
    pub fn definition(&self, variable: Variable) -> usize {
        *self
            .definitions
            .get(variable)
            .unwrap_or_else(|| panic!("{variable} is not defined"))
    }

    /// The indices of the instructions reassigning `variable`, in order.
    pub fn assignments(&self, variable: Variable) -> &[usize] {
        self.assignments
            .get(variable)
            .unwrap_or_else(|| panic!("{variable} is not defined"))
    }

    /// The indices of the instructions using `variable`, in order.
    pub fn uses(&self, variable: Variable) -> &[usize] {
        self.uses
            .get(variable)
            .unwrap_or_else(|| panic!("{variable} is not defined"))
    }

    /// The number of uses of `variable`.
    pub fn num_uses(&self, variable: Variable) -> usize {
        self.uses(variable).len()
    }

    /// Whether `variable` has been defined.
    pub fn is_defined(&self, variable: Variable) -> bool {
        self.definitions.contains(variable)
    }
}

impl Analyzer for DefUseAnalyzer {
    fn analyze(&mut self, instruction: &Instruction) {
        let index = self.next_index;
        self.next_index += 1;

        for &output in instruction.all_outputs() {
            self.definitions.insert(output, index);
            self.assignments.insert(output, Vec::new());
            self.uses.insert(output, Vec::new());
        }
        for (position, &input) in instruction.inputs().iter().enumerate() {
            self.uses
                .get_mut(input)
                .unwrap_or_else(|| panic!("{input} is not defined"))
                .push(index);
            if instruction.reassigns(position) {
                self.assignments
                    .get_mut(input)
                    .unwrap_or_else(|| panic!("{input} is not defined"))
                    .push(index);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzil_ir::builder::CodeBuilder;
    use fuzzil_ir::BinaryOperator;

    #[test]
    fn definitions_uses_and_assignments() {
        let mut b = CodeBuilder::new();
        let a = b.load_int(1); // 0
        let c = b.load_int(2); // 1
        let sum = b.binary(a, BinaryOperator::Add, c); // 2
        b.reassign(a, sum); // 3
        b.type_of(a); // 4
        let code = b.finish();

        let mut analyzer = DefUseAnalyzer::new();
        analyzer.analyze_all(&code);

        assert_eq!(analyzer.definition(a), 0);
        assert_eq!(analyzer.definition(c), 1);
        assert_eq!(analyzer.definition(sum), 2);
        assert_eq!(analyzer.uses(a), &[2, 3, 4]);
        assert_eq!(analyzer.uses(c), &[2]);
        assert_eq!(analyzer.uses(sum), &[3]);
        assert_eq!(analyzer.assignments(a), &[3]);
        assert_eq!(analyzer.num_uses(c), 1);
        assert!(analyzer.assignments(sum).is_empty());
    }

    #[test]
    fn rerunning_yields_identical_state() {
        let mut b = CodeBuilder::new();
        let a = b.load_int(1);
        let c = b.dup(a);
        b.reassign(c, a);
        let code = b.finish();

        let mut first = DefUseAnalyzer::new();
        first.analyze_all(&code);
        let mut second = DefUseAnalyzer::new();
        second.analyze_all(&code);
        assert_eq!(first, second);
    }

    #[test]
    #[should_panic(expected = "v7 is not defined")]
    fn unknown_variables_are_a_fatal_error() {
        let analyzer = DefUseAnalyzer::new();
        let _ = analyzer.definition(Variable::new(7));
    }
}
