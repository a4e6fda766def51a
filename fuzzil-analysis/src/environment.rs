//! The environment capability.
//!
//! The abstract interpreter does not know anything about the target
//! language's builtins; that knowledge is injected through this trait. The
//! default method bodies answer "unknown", so a minimal environment only
//! has to provide the custom name sets.

use fuzzil_types::{Signature, Type};
use std::collections::HashSet;

/// Supplies builtin types, property types and method signatures to the
/// abstract interpreter.
pub trait Environment {
    /// The names treated as methods when they appear in object literals.
    fn custom_method_names(&self) -> &HashSet<String>;

    /// The names treated as properties when they appear in object
    /// literals.
    fn custom_property_names(&self) -> &HashSet<String>;

    /// The type of the builtin named `name`.
    fn builtin_type(&self, _name: &str) -> Type {
        Type::unknown()
    }

    /// The type of property `name` on a receiver of type `on`.
    fn property_type(&self, _name: &str, _on: &Type) -> Type {
        Type::unknown()
    }

    /// The signature of method `name` on a receiver of type `on`, if
    /// known.
    fn method_signature(&self, _name: &str, _on: &Type) -> Option<Signature> {
        None
    }

    /// The type of plain objects.
    fn object_type(&self) -> Type {
        Type::object()
    }

    /// The type of integer literals.
    fn int_type(&self) -> Type {
        Type::integer()
    }

    /// The type of BigInt literals.
    fn bigint_type(&self) -> Type {
        Type::bigint()
    }

    /// The type of float literals.
    fn float_type(&self) -> Type {
        Type::float()
    }

    /// The type of string literals.
    fn string_type(&self) -> Type {
        Type::string()
    }

    /// The type of boolean literals.
    fn boolean_type(&self) -> Type {
        Type::boolean()
    }

    /// The type of regular expression literals.
    fn regexp_type(&self) -> Type {
        Type::regexp() + Type::object()
    }

    /// The type of arrays.
    fn array_type(&self) -> Type {
        Type::object() + Type::iterable()
    }

    /// The type assigned to `null`.
    ///
    /// Environments distinguishing `null` from `undefined` in their
    /// lattice override this; the default keeps the two identified.
    fn null_type(&self) -> Type {
        Type::undefined()
    }
}

/// An environment that knows nothing beyond its configured name sets.
///
/// Useful as a test double and as a base for embedders that have not
/// modeled their target's builtins yet.
#[derive(Debug, Default, Clone)]
pub struct VanillaEnvironment {
    custom_methods: HashSet<String>,
    custom_properties: HashSet<String>,
}

impl VanillaEnvironment {
    /// Creates an environment with empty name sets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an environment with the given custom name sets.
    pub fn with_custom_names(
        methods: impl IntoIterator<Item = String>,
        properties: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            custom_methods: methods.into_iter().collect(),
            custom_properties: properties.into_iter().collect(),
        }
    }
}

impl Environment for VanillaEnvironment {
    fn custom_method_names(&self) -> &HashSet<String> {
        &self.custom_methods
    }

    fn custom_property_names(&self) -> &HashSet<String> {
        &self.custom_properties
    }
}
