//! Cross-cutting properties of the standard analyzers.

use fuzzil_analysis::{
    Analyzer, ContextAnalyzer, DeadCodeAnalyzer, DefUseAnalyzer, ScopeAnalyzer,
};
use fuzzil_ir::builder::CodeBuilder;
use fuzzil_ir::{BinaryOperator, Code};
use fuzzil_types::Variable;

/// A program touching most block kinds, used by the property tests below.
fn structured_program() -> Code {
    let mut b = CodeBuilder::new();
    let a = b.load_int(1);
    let s = b.load_string("x");
    let sum = b.binary(a, BinaryOperator::Add, s);

    b.begin_if(sum);
    let inner = b.load_float(1.5);
    b.reassign(sum, inner);
    b.begin_else();
    b.reassign(sum, a);
    b.end_if();

    let (function, params) = b.begin_plain_function(2, true);
    let local = b.binary(params[0], BinaryOperator::Mul, params[1]);
    b.return_value(Some(local));
    b.end_plain_function();
    b.call_function(function, &[a, s]);

    b.begin_while_header();
    let cond = b.load_bool(true);
    b.begin_while_body(cond);
    b.loop_break();
    b.end_while();

    b.begin_try();
    b.throw(a);
    b.begin_catch();
    b.begin_finally();
    b.end_try_catch_finally();

    let code = b.finish();
    assert!(code.is_statically_valid());
    code
}

#[test]
fn analyzers_are_deterministic() {
    let code = structured_program();

    let mut def_use_a = DefUseAnalyzer::new();
    let mut def_use_b = DefUseAnalyzer::new();
    def_use_a.analyze_all(&code);
    def_use_b.analyze_all(&code);
    assert_eq!(def_use_a, def_use_b);

    let mut scopes_a = ScopeAnalyzer::new();
    let mut scopes_b = ScopeAnalyzer::new();
    scopes_a.analyze_all(&code);
    scopes_b.analyze_all(&code);
    assert_eq!(scopes_a, scopes_b);

    let mut contexts_a = ContextAnalyzer::new();
    let mut contexts_b = ContextAnalyzer::new();
    contexts_a.analyze_all(&code);
    contexts_b.analyze_all(&code);
    assert_eq!(contexts_a, contexts_b);

    let mut dead_a = DeadCodeAnalyzer::new();
    let mut dead_b = DeadCodeAnalyzer::new();
    dead_a.analyze_all(&code);
    dead_b.analyze_all(&code);
    assert_eq!(dead_a, dead_b);
}

#[test]
fn definitions_precede_all_uses() {
    let code = structured_program();
    let mut def_use = DefUseAnalyzer::new();
    def_use.analyze_all(&code);

    for number in 0..code.num_variables() {
        let variable = Variable::new(number);
        let definition = def_use.definition(variable);
        for &use_index in def_use.uses(variable) {
            assert!(
                definition <= use_index,
                "{variable} defined at {definition} but used at {use_index}"
            );
        }
    }
}

#[test]
fn every_input_is_visible_at_its_use() {
    let code = structured_program();
    let mut scopes = ScopeAnalyzer::new();

    for instruction in &code {
        // Inputs must be visible before the instruction updates the
        // scopes; a block end may close the defining scope itself.
        for &input in instruction.inputs() {
            assert!(
                scopes.visible_variables().contains(&input),
                "{input} is not visible at {instruction}"
            );
        }
        scopes.analyze(instruction);
    }
}

#[test]
fn block_starts_and_ends_balance() {
    let code = structured_program();
    let mut open: i64 = 0;
    let mut starts = 0usize;
    let mut ends = 0usize;
    for instruction in &code {
        if instruction.is_block_end() {
            ends += 1;
            open -= 1;
            assert!(open >= 0, "block end without open block");
        }
        if instruction.is_block_start() {
            starts += 1;
            open += 1;
        }
    }
    assert_eq!(starts, ends);
    assert_eq!(open, 0);
}

#[test]
fn required_contexts_are_always_open() {
    let code = structured_program();
    let mut contexts = ContextAnalyzer::new();

    for instruction in &code {
        // Block ends are checked against the context inside the block
        // they close, i.e. before the analyzer pops it.
        assert!(
            contexts.context().contains(instruction.op().required_context()),
            "context requirement of {instruction} is not satisfied"
        );
        contexts.analyze(instruction);
    }
}

#[test]
fn dead_code_ends_with_the_enclosing_block() {
    let code = structured_program();
    let mut dead = DeadCodeAnalyzer::new();
    let mut saw_dead_code = false;
    for instruction in &code {
        dead.analyze(instruction);
        saw_dead_code |= dead.currently_in_dead_code();
    }
    // The program contains jumps inside blocks, so dead stretches exist,
    // but the program always ends live.
    assert!(saw_dead_code);
    assert!(!dead.currently_in_dead_code());
}
