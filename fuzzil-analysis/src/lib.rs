//! Static analyses over FuzzIL code: the incremental analyzer framework,
//! the four standard analyzers (definitions and uses, scopes, contexts,
//! dead code) and the flow-sensitive abstract interpreter.
//!
//! All analyses are single-threaded, feed on instructions strictly in
//! program order, and assume their input has passed the static-validity
//! checker of `fuzzil-ir`.

pub mod analyzers;
pub mod environment;
pub mod interpreter;

pub use analyzers::{Analyzer, ContextAnalyzer, DeadCodeAnalyzer, DefUseAnalyzer, ScopeAnalyzer};
pub use environment::{Environment, VanillaEnvironment};
pub use interpreter::AbstractInterpreter;
