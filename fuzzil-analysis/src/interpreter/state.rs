//! The branch-state stack of the abstract interpreter.
//!
//! The stack holds one *level* per open conditionally-executed block. A
//! level is a list of sibling states, one per alternative (the arms of an
//! if/else, the cases of a switch, the members of a class); only the last
//! sibling of each level is active. A state records the variables updated
//! since its branch started.
//!
//! `current` is the materialized view of the whole stack: for every
//! variable, the type seen at the current program point. It is equivalent
//! to walking the active states from the top down and stopping at the
//! first entry, and is kept up to date incrementally.

use fuzzil_types::{Type, Variable, VariableMap};
use itertools::Itertools;

#[derive(Debug, Default, Clone)]
struct State {
    updates: VariableMap<Type>,
}

#[derive(Debug)]
pub(crate) struct StateStack {
    levels: Vec<Vec<State>>,
    current: VariableMap<Type>,
}

impl StateStack {
    pub(crate) fn new() -> Self {
        Self {
            levels: vec![vec![State::default()]],
            current: VariableMap::new(),
        }
    }

    /// The type of `variable` at the current program point.
    pub(crate) fn current_type(&self, variable: Variable) -> Option<&Type> {
        self.current.get(variable)
    }

    /// Whether `variable` is known at the current program point.
    pub(crate) fn knows(&self, variable: Variable) -> bool {
        self.current.contains(variable)
    }

    /// Records `ty` for `variable` in the active state.
    pub(crate) fn set(&mut self, variable: Variable, ty: Type) {
        self.active_mut().updates.insert(variable, ty.clone());
        self.current.insert(variable, ty);
    }

    /// Opens a level for a block whose body may or may not execute.
    pub(crate) fn push_child(&mut self) {
        self.levels.push(vec![State::default()]);
    }

    /// Finishes the active sibling and opens the next alternative of the
    /// top level. Returns the variables whose visible type changed by
    /// rolling the view back to the parent, with their rolled-back types
    /// (`None` when the variable was branch-local).
    pub(crate) fn push_sibling(&mut self) -> Vec<(Variable, Option<Type>)> {
        assert!(self.levels.len() > 1, "no branch level to fork");
        let finished: Vec<Variable> = self
            .levels
            .last()
            .and_then(|level| level.last())
            .expect("state stack underflow")
            .updates
            .keys()
            .collect();

        let mut rolled_back = Vec::new();
        for variable in finished {
            let below = self.lookup_below_top(variable).cloned();
            match &below {
                Some(ty) => {
                    if self.current.get(variable) != below.as_ref() {
                        self.current.insert(variable, ty.clone());
                        rolled_back.push((variable, Some(ty.clone())));
                    }
                }
                None => {
                    self.current.remove(variable);
                    rolled_back.push((variable, None));
                }
            }
        }

        self.levels
            .last_mut()
            .expect("state stack underflow")
            .push(State::default());
        rolled_back
    }

    /// Closes the top level, merging all its siblings into the parent
    /// state. Returns the variables whose visible type changed, with their
    /// merged types.
    ///
    /// For each variable updated in any sibling: siblings where it is out
    /// of scope contribute nothing; if the parent does not know it either,
    /// the variable dies with the level. Otherwise the sibling types are
    /// unioned, and if some alternative left the variable untouched, the
    /// parent's type joins the union since that path kept the entry type.
    ///
    /// `assume_skipped_path` treats the level as having one additional,
    /// empty alternative. Callers pass `true` for blocks whose recorded
    /// alternatives do not cover every execution path: an if without an
    /// else, a loop body that may run zero times, a function body that may
    /// never be called.
    pub(crate) fn merge_and_pop(&mut self, assume_skipped_path: bool) -> Vec<(Variable, Type)> {
        let siblings = self.levels.pop().expect("state stack underflow");
        assert!(!self.levels.is_empty(), "merged the base state");

        let variables: Vec<Variable> = siblings
            .iter()
            .flat_map(|state| state.updates.keys())
            .unique()
            .collect();

        let mut changes = Vec::new();
        for variable in variables {
            let parent = self.lookup(variable).cloned();
            let Some(parent_type) = parent else {
                // Declared only inside this level; it dies here.
                self.current.remove(variable);
                continue;
            };
            if parent_type.is_nothing() {
                self.current.remove(variable);
                continue;
            }

            let mut merged: Option<Type> = None;
            let mut updated_in_all = !assume_skipped_path;
            for sibling in &siblings {
                match sibling.updates.get(variable) {
                    Some(ty) if !ty.is_nothing() => {
                        merged = Some(match merged {
                            Some(accumulated) => accumulated.union(ty),
                            None => ty.clone(),
                        });
                    }
                    _ => updated_in_all = false,
                }
            }
            let mut merged = merged.unwrap_or_else(|| parent_type.clone());
            if !updated_in_all {
                merged = merged.union(&parent_type);
            }

            if self.current.get(variable) != Some(&merged) {
                changes.push((variable, merged.clone()));
            }
            self.set(variable, merged);
        }

        tracing::trace!(changed = changes.len(), "merged branch states");
        changes
    }

    /// The number of open levels, including the base level.
    pub(crate) fn depth(&self) -> usize {
        self.levels.len()
    }

    fn active_mut(&mut self) -> &mut State {
        self.levels
            .last_mut()
            .and_then(|level| level.last_mut())
            .expect("state stack underflow")
    }

    /// Walks the active states from the top down.
    fn lookup(&self, variable: Variable) -> Option<&Type> {
        self.levels
            .iter()
            .rev()
            .find_map(|level| level.last()?.updates.get(variable))
    }

    /// Walks the active states from the level below the top down.
    fn lookup_below_top(&self, variable: Variable) -> Option<&Type> {
        self.levels[..self.levels.len() - 1]
            .iter()
            .rev()
            .find_map(|level| level.last()?.updates.get(variable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(n: usize) -> Variable {
        Variable::new(n)
    }

    #[test]
    fn sibling_merge_unions_both_arms() {
        let mut stack = StateStack::new();
        stack.set(v(0), Type::integer());

        stack.push_child();
        stack.set(v(0), Type::string());
        assert_eq!(stack.current_type(v(0)), Some(&Type::string()));

        let rolled_back = stack.push_sibling();
        assert_eq!(rolled_back, vec![(v(0), Some(Type::integer()))]);
        stack.set(v(0), Type::float());

        let changes = stack.merge_and_pop(false);
        let expected = Type::string() | Type::float();
        assert_eq!(changes, vec![(v(0), expected.clone())]);
        assert_eq!(stack.current_type(v(0)), Some(&expected));
    }

    #[test]
    fn untouched_alternatives_keep_the_entry_type() {
        let mut stack = StateStack::new();
        stack.set(v(0), Type::integer());

        stack.push_child();
        stack.set(v(0), Type::string());
        stack.push_sibling();
        // The second arm leaves v0 alone.
        let changes = stack.merge_and_pop(false);

        let expected = Type::string() | Type::integer();
        assert_eq!(changes, vec![(v(0), expected.clone())]);
        assert_eq!(stack.current_type(v(0)), Some(&expected));
    }

    #[test]
    fn branch_locals_die_with_their_level() {
        let mut stack = StateStack::new();
        stack.push_child();
        stack.set(v(0), Type::integer());
        let changes = stack.merge_and_pop(true);
        assert!(changes.is_empty());
        assert!(!stack.knows(v(0)));
    }

    #[test]
    fn nested_levels_roll_back_through_all_ancestors() {
        let mut stack = StateStack::new();
        stack.set(v(0), Type::integer());
        stack.push_child();
        stack.set(v(0), Type::string());
        stack.push_child();
        stack.set(v(0), Type::boolean());

        // Forking the inner level rolls back to the middle level's type.
        let rolled_back = stack.push_sibling();
        assert_eq!(rolled_back, vec![(v(0), Some(Type::string()))]);

        stack.merge_and_pop(false);
        stack.merge_and_pop(true);
        // Outer merge unions with the base type.
        let outer = stack.current_type(v(0)).unwrap();
        assert!(outer.may_be(&Type::integer()));
        assert!(outer.may_be(&Type::string()));
    }
}
