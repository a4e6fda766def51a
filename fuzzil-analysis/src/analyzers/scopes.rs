//! Variable visibility tracking.

use super::Analyzer;
use fuzzil_ir::Instruction;
use fuzzil_types::Variable;

/// Tracks which variables are visible at the current program point.
///
/// Each open scope remembers how many variables it declared; closing a
/// block drops that many variables from the visible list. Outer outputs of
/// a block start are added to the surrounding scope before the new scope is
/// pushed, so e.g. a function variable is visible inside its own body.
///
/// For the wasm lifter this analyzer additionally tracks the current
/// branch depth over wasm blocks that are valid branch targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeAnalyzer {
    visible: Vec<Variable>,
    /// Number of variables declared per open scope.
    scopes: Vec<usize>,
    /// Whether each open block is a wasm branch target.
    wasm_branch_targets: Vec<bool>,
    wasm_branch_depth: u32,
}

impl ScopeAnalyzer {
    /// Creates an analyzer with only the outermost scope open.
    pub fn new() -> Self {
        Self {
            visible: Vec::new(),
            scopes: vec![0],
            wasm_branch_targets: Vec::new(),
            wasm_branch_depth: 0,
        }
    }

    /// The variables visible at the current program point, in declaration
    /// order.
    pub fn visible_variables(&self) -> &[Variable] {
        &self.visible
    }

    /// The number of wasm branch targets currently in scope.
    pub fn wasm_branch_depth(&self) -> u32 {
        self.wasm_branch_depth
    }

    fn declare(&mut self, variable: Variable) {
        self.visible.push(variable);
        *self.scopes.last_mut().expect("scope stack underflow") += 1;
    }
}

impl Default for ScopeAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for ScopeAnalyzer {
    fn analyze(&mut self, instruction: &Instruction) {
        if instruction.is_block_end() {
            let declared = self.scopes.pop().expect("block end without open scope");
            self.visible.truncate(self.visible.len() - declared);
            if self.wasm_branch_targets.pop() == Some(true) {
                self.wasm_branch_depth -= 1;
            }
        }

        for &output in instruction.outputs() {
            self.declare(output);
        }

        if instruction.is_block_start() {
            self.scopes.push(0);
            let is_target = instruction.opcode().is_wasm_branch_target();
            self.wasm_branch_targets.push(is_target);
            if is_target {
                self.wasm_branch_depth += 1;
            }
        }

        for &inner in instruction.inner_outputs() {
            self.declare(inner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzil_ir::builder::CodeBuilder;
    use fuzzil_ir::{Opcode, Operation, WasmSignature};

    #[test]
    fn block_locals_are_dropped_at_block_end() {
        let mut b = CodeBuilder::new();
        let outer = b.load_int(0);
        let cond = b.load_bool(true);
        b.begin_if(cond);
        let inner = b.load_int(1);
        b.end_if();
        let after = b.load_int(2);
        let code = b.finish();

        let mut analyzer = ScopeAnalyzer::new();
        for (index, instruction) in code.iter().enumerate() {
            analyzer.analyze(instruction);
            match index {
                3 => assert_eq!(analyzer.visible_variables(), &[outer, cond, inner]),
                4 => assert_eq!(analyzer.visible_variables(), &[outer, cond]),
                5 => assert_eq!(analyzer.visible_variables(), &[outer, cond, after]),
                _ => {}
            }
        }
    }

    #[test]
    fn function_variable_is_visible_inside_its_body() {
        let mut b = CodeBuilder::new();
        let (function, params) = b.begin_plain_function(1, false);
        let code_so_far = b.finish();

        let mut analyzer = ScopeAnalyzer::new();
        for instruction in &code_so_far {
            analyzer.analyze(instruction);
        }
        assert_eq!(analyzer.visible_variables(), &[function, params[0]]);
    }

    #[test]
    fn wasm_branch_depth_counts_branch_targets_only() {
        let mut b = CodeBuilder::new();
        b.begin_wasm_module();
        b.begin_wasm_function(WasmSignature::default());
        b.emit(
            Operation::new(Opcode::BeginWasmBlock {
                signature: WasmSignature::default(),
            }),
            &[],
        );
        b.emit(
            Operation::new(Opcode::BeginWasmTry {
                signature: WasmSignature::default(),
            }),
            &[],
        );
        let code = b.finish();

        let mut analyzer = ScopeAnalyzer::new();
        for (index, instruction) in code.iter().enumerate() {
            analyzer.analyze(instruction);
            match index {
                1 => assert_eq!(analyzer.wasm_branch_depth(), 0),
                2 => assert_eq!(analyzer.wasm_branch_depth(), 1),
                3 => assert_eq!(analyzer.wasm_branch_depth(), 2),
                _ => {}
            }
        }
    }
}
