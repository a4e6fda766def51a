//! The analyzer framework and the standard analyzers.
//!
//! An analyzer is any stateful value accepting instructions one at a time
//! in program order. Analyzers are fail-fast: they assume their input has
//! passed the static-validity checker and only assert internal invariants.

mod contexts;
mod dead_code;
mod def_use;
mod scopes;

pub use contexts::ContextAnalyzer;
pub use dead_code::DeadCodeAnalyzer;
pub use def_use::DefUseAnalyzer;
pub use scopes::ScopeAnalyzer;

use fuzzil_ir::{Code, Instruction};

/// An incremental, single-pass consumer of instructions.
pub trait Analyzer {
    /// Processes the next instruction in program order.
    fn analyze(&mut self, instruction: &Instruction);

    /// Drives this analyzer over a whole piece of code.
    ///
    /// The code must have passed [`Code::check`]; this is only asserted in
    /// debug builds since the checker is the single trusted gate.
    fn analyze_all(&mut self, code: &Code)
    where
        Self: Sized,
    {
        debug_assert!(code.is_statically_valid());
        for instruction in code {
            self.analyze(instruction);
        }
    }
}
