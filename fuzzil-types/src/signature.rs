//! Function signatures: parameter lists and output types.

use crate::Type;
use core::fmt;

/// A single parameter of a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Parameter {
    /// A required parameter of the given type.
    Plain(Type),
    /// An optional parameter; callers may omit it.
    Opt(Type),
    /// A rest parameter collecting all remaining arguments. Only valid in
    /// the last position.
    Rest(Type),
}

impl Parameter {
    /// The declared type of this parameter.
    pub fn parameter_type(&self) -> &Type {
        match self {
            Self::Plain(t) | Self::Opt(t) | Self::Rest(t) => t,
        }
    }
}

/// The signature of a callable value: its parameters and output type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Signature {
    parameters: Vec<Parameter>,
    output: Type,
}

impl Signature {
    /// Creates a signature.
    ///
    /// # Panics
    ///
    /// Panics if a rest parameter is followed by further parameters or a
    /// required parameter follows an optional one.
    pub fn new(parameters: Vec<Parameter>, output: Type) -> Self {
        let mut seen_opt = false;
        for (position, parameter) in parameters.iter().enumerate() {
            match parameter {
                Parameter::Plain(_) => {
                    assert!(!seen_opt, "required parameter after an optional one");
                }
                Parameter::Opt(_) => seen_opt = true,
                Parameter::Rest(_) => {
                    assert_eq!(
                        position,
                        parameters.len() - 1,
                        "rest parameter must come last"
                    );
                }
            }
        }
        Self { parameters, output }
    }

    /// The signature of a function about which nothing is known:
    /// `num_parameters` parameters of any type (the last one a rest
    /// parameter if `has_rest`), producing an unknown value.
    pub fn for_unknown_function(num_parameters: usize, has_rest: bool) -> Self {
        let mut parameters = Vec::with_capacity(num_parameters);
        for position in 0..num_parameters {
            if has_rest && position == num_parameters - 1 {
                parameters.push(Parameter::Rest(Type::js_anything()));
            } else {
                parameters.push(Parameter::Plain(Type::js_anything()));
            }
        }
        Self::new(parameters, Type::unknown())
    }

    /// The declared parameters.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// The number of declared parameters, counting a rest parameter once.
    pub fn num_parameters(&self) -> usize {
        self.parameters.len()
    }

    /// The output type.
    pub fn output(&self) -> &Type {
        &self.output
    }

    /// Whether the last parameter is a rest parameter.
    pub fn has_rest_parameter(&self) -> bool {
        matches!(self.parameters.last(), Some(Parameter::Rest(_)))
    }

    /// The type provided at parameter position `position`, expanding the
    /// rest parameter, or `None` past the end of the list.
    fn type_at(&self, position: usize) -> Option<&Type> {
        if position < self.parameters.len() {
            return Some(self.parameters[position].parameter_type());
        }
        match self.parameters.last() {
            Some(Parameter::Rest(t)) => Some(t),
            _ => None,
        }
    }

    /// Whether this signature subsumes `other`: every caller satisfying
    /// this signature also satisfies `other`.
    ///
    /// Optional and rest parameters are expanded on both sides and the
    /// positions compared pairwise; the subsumed side must accept at least
    /// as many parameters as the subsuming one declares.
    pub fn subsumes(&self, other: &Self) -> bool {
        let positions = self.parameters.len().max(other.parameters.len());
        for position in 0..positions {
            let ours = self.type_at(position);
            let theirs = other.type_at(position);
            match (ours, theirs) {
                (Some(a), Some(b)) => {
                    if !a.subsumes(b) {
                        return false;
                    }
                }
                // The callee side ran out of parameters.
                (Some(_), None) => return false,
                // We declare fewer parameters than the callee requires.
                (None, Some(_)) => {
                    if position < other.required_parameter_count() {
                        return false;
                    }
                }
                (None, None) => break,
            }
        }
        self.output.subsumes(&other.output)
    }

    fn required_parameter_count(&self) -> usize {
        self.parameters
            .iter()
            .filter(|p| matches!(p, Parameter::Plain(_)))
            .count()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (position, parameter) in self.parameters.iter().enumerate() {
            if position > 0 {
                write!(f, ", ")?;
            }
            match parameter {
                Parameter::Plain(t) => write!(f, "{t}")?,
                Parameter::Opt(t) => write!(f, "{t}?")?,
                Parameter::Rest(t) => write!(f, "{t}...")?,
            }
        }
        write!(f, "] => {}", self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_function_signature() {
        let sig = Signature::for_unknown_function(3, true);
        assert_eq!(sig.num_parameters(), 3);
        assert!(sig.has_rest_parameter());
        assert_eq!(*sig.output(), Type::unknown());
    }

    #[test]
    #[should_panic(expected = "rest parameter must come last")]
    fn rest_must_be_last() {
        let _ = Signature::new(
            vec![
                Parameter::Rest(Type::integer()),
                Parameter::Plain(Type::integer()),
            ],
            Type::undefined(),
        );
    }

    #[test]
    #[should_panic(expected = "required parameter after an optional one")]
    fn plain_after_opt() {
        let _ = Signature::new(
            vec![
                Parameter::Opt(Type::integer()),
                Parameter::Plain(Type::integer()),
            ],
            Type::undefined(),
        );
    }

    #[test]
    fn subsumption_expands_rest() {
        let general = Signature::new(
            vec![Parameter::Rest(Type::js_anything())],
            Type::js_anything(),
        );
        let specific = Signature::new(
            vec![
                Parameter::Plain(Type::integer()),
                Parameter::Plain(Type::string()),
            ],
            Type::integer(),
        );
        assert!(general.subsumes(&specific));
        assert!(!specific.subsumes(&general));
    }

    #[test]
    fn subsumption_requires_enough_callee_parameters() {
        let two = Signature::new(
            vec![
                Parameter::Plain(Type::js_anything()),
                Parameter::Plain(Type::js_anything()),
            ],
            Type::js_anything(),
        );
        let one = Signature::new(vec![Parameter::Plain(Type::js_anything())], Type::js_anything());
        assert!(!two.subsumes(&one));
    }
}
