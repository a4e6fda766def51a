//! The type lattice.
//!
//! A [`Type`] describes the set of runtime values a variable may hold. It
//! consists of two base bitsets, the kinds a value *definitely* has and the
//! kinds it *possibly* has, plus an optional extension carrying an object
//! group, property and method names, a call signature, a receiver type and
//! a wasm payload.
//!
//! Types combine with `|` (union), `&` (intersection) and `+` (merge) and
//! compare with [`Type::subsumes`]. `A.subsumes(B)` means every value of
//! `B` is also a value of `A`.

use crate::wasm::{WasmReferenceKind, WasmTypeExtension, WasmValueType};
use crate::{BaseType, Signature, TypeId};
use core::fmt;
use core::ops::{Add, BitAnd, BitOr};
use std::collections::HashSet;
use std::sync::Arc;

/// The extension record of a type.
///
/// Extensions are immutable once constructed and shared behind an `Arc`;
/// all refinement operations produce a new record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeExtension {
    pub(crate) group: Option<String>,
    pub(crate) properties: HashSet<String>,
    pub(crate) methods: HashSet<String>,
    pub(crate) signature: Option<Signature>,
    pub(crate) receiver: Option<Box<Type>>,
    pub(crate) wasm_ext: Option<WasmTypeExtension>,
}

impl TypeExtension {
    fn is_empty(&self) -> bool {
        self.group.is_none()
            && self.properties.is_empty()
            && self.methods.is_empty()
            && self.signature.is_none()
            && self.receiver.is_none()
            && self.wasm_ext.is_none()
    }
}

/// Object groups created per program are uniquified with one of these
/// prefixes followed by a decimal index. Two groups differing only in the
/// index are interchangeable, which keeps program-local object types
/// compatible across programs.
const UNIQUIFIED_GROUP_PREFIXES: [&str; 5] = [
    "_fuzz_Object",
    "_fuzz_WasmModule",
    "_fuzz_WasmExports",
    "_fuzz_Class",
    "_fuzz_Constructor",
];

fn groups_interchangeable(a: &str, b: &str) -> bool {
    for prefix in UNIQUIFIED_GROUP_PREFIXES {
        if let (Some(suffix_a), Some(suffix_b)) = (a.strip_prefix(prefix), b.strip_prefix(prefix)) {
            let is_index =
                |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
            if is_index(suffix_a) && is_index(suffix_b) {
                return true;
            }
        }
    }
    false
}

/// A point in the type lattice. See the module documentation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Type {
    definite: BaseType,
    possible: BaseType,
    ext: Option<Arc<TypeExtension>>,
}

impl Type {
    fn with_ext(definite: BaseType, possible: BaseType, ext: TypeExtension) -> Self {
        debug_assert!(possible.contains(definite));
        let ext = if ext.is_empty() {
            None
        } else {
            Some(Arc::new(ext))
        };
        Self {
            definite,
            possible,
            ext,
        }
    }

    /// A type with the given base bits as both its definite and possible
    /// sets and no extension.
    pub const fn from_base(base: BaseType) -> Self {
        Self {
            definite: base,
            possible: base,
            ext: None,
        }
    }

    // --- Constructors: the JavaScript side. ---

    /// The bottom of the lattice: no value has this type.
    pub const fn nothing() -> Self {
        Self::from_base(BaseType::empty())
    }

    /// The `undefined` value.
    pub const fn undefined() -> Self {
        Self::from_base(BaseType::UNDEFINED)
    }

    /// An integral number.
    pub const fn integer() -> Self {
        Self::from_base(BaseType::INTEGER)
    }

    /// A BigInt.
    pub const fn bigint() -> Self {
        Self::from_base(BaseType::BIGINT)
    }

    /// A fractional number.
    pub const fn float() -> Self {
        Self::from_base(BaseType::FLOAT)
    }

    /// A string.
    pub const fn string() -> Self {
        Self::from_base(BaseType::STRING)
    }

    /// A boolean.
    pub const fn boolean() -> Self {
        Self::from_base(BaseType::BOOLEAN)
    }

    /// A regular expression object.
    pub const fn regexp() -> Self {
        Self::from_base(BaseType::REGEXP)
    }

    /// An iterable value.
    pub const fn iterable() -> Self {
        Self::from_base(BaseType::ITERABLE)
    }

    /// Any integral or fractional number.
    pub fn number() -> Self {
        Self::integer() | Self::float()
    }

    /// Any non-object primitive produced by arithmetic and string
    /// operations.
    pub fn primitive() -> Self {
        Self::integer() | Self::float() | Self::string() | Self::boolean()
    }

    /// The top of the JavaScript side of the lattice.
    pub const fn js_anything() -> Self {
        Self {
            definite: BaseType::empty(),
            possible: BaseType::JS_ANY,
            ext: None,
        }
    }

    /// The top of the wasm side of the lattice.
    pub const fn wasm_anything() -> Self {
        Self {
            definite: BaseType::empty(),
            possible: BaseType::WASM_ANY,
            ext: None,
        }
    }

    /// The top of the whole lattice.
    pub const fn anything() -> Self {
        Self {
            definite: BaseType::empty(),
            possible: BaseType::JS_ANY.union(BaseType::WASM_ANY),
            ext: None,
        }
    }

    /// The type of a value about which nothing could be inferred.
    pub const fn unknown() -> Self {
        Self::js_anything()
    }

    /// A plain object with no known group, properties or methods.
    pub const fn object() -> Self {
        Self::from_base(BaseType::OBJECT)
    }

    /// An object with the given group, properties and methods.
    pub fn object_with(group: Option<&str>, properties: &[&str], methods: &[&str]) -> Self {
        Self::with_ext(
            BaseType::OBJECT,
            BaseType::OBJECT,
            TypeExtension {
                group: group.map(str::to_owned),
                properties: properties.iter().map(|s| (*s).to_owned()).collect(),
                methods: methods.iter().map(|s| (*s).to_owned()).collect(),
                ..TypeExtension::default()
            },
        )
    }

    /// A callable function, optionally with a known signature.
    pub fn function(signature: Option<Signature>) -> Self {
        Self::with_ext(
            BaseType::FUNCTION,
            BaseType::FUNCTION,
            TypeExtension {
                signature,
                ..TypeExtension::default()
            },
        )
    }

    /// A value constructible with `new`, optionally with a known signature.
    pub fn constructor(signature: Option<Signature>) -> Self {
        Self::with_ext(
            BaseType::CONSTRUCTOR,
            BaseType::CONSTRUCTOR,
            TypeExtension {
                signature,
                ..TypeExtension::default()
            },
        )
    }

    /// A value that is both callable and constructible, e.g. a plain
    /// function definition.
    pub fn function_and_constructor(signature: Option<Signature>) -> Self {
        Self::with_ext(
            BaseType::FUNCTION.union(BaseType::CONSTRUCTOR),
            BaseType::FUNCTION.union(BaseType::CONSTRUCTOR),
            TypeExtension {
                signature,
                ..TypeExtension::default()
            },
        )
    }

    /// A function requiring an explicit receiver, e.g. an unbound method.
    pub fn unbound_function(signature: Option<Signature>, receiver: Option<Type>) -> Self {
        Self::with_ext(
            BaseType::UNBOUND_FUNCTION,
            BaseType::UNBOUND_FUNCTION,
            TypeExtension {
                signature,
                receiver: receiver.map(Box::new),
                ..TypeExtension::default()
            },
        )
    }

    // --- Constructors: the wasm side. ---

    /// A wasm i32 value.
    pub const fn wasm_i32() -> Self {
        Self::from_base(BaseType::WASM_I32)
    }

    /// A wasm i64 value.
    pub const fn wasm_i64() -> Self {
        Self::from_base(BaseType::WASM_I64)
    }

    /// A wasm f32 value.
    pub const fn wasm_f32() -> Self {
        Self::from_base(BaseType::WASM_F32)
    }

    /// A wasm f64 value.
    pub const fn wasm_f64() -> Self {
        Self::from_base(BaseType::WASM_F64)
    }

    /// A wasm 128-bit SIMD value.
    pub const fn wasm_simd128() -> Self {
        Self::from_base(BaseType::WASM_SIMD128)
    }

    /// A wasm reference value.
    pub fn wasm_reference(kind: WasmReferenceKind, nullable: bool) -> Self {
        Self::with_ext(
            BaseType::WASM_REF,
            BaseType::WASM_REF,
            TypeExtension {
                wasm_ext: Some(WasmTypeExtension::Reference { kind, nullable }),
                ..TypeExtension::default()
            },
        )
    }

    /// A wasm block label carrying the given branch parameter types.
    pub fn wasm_label(parameters: Vec<WasmValueType>) -> Self {
        Self::with_ext(
            BaseType::WASM_LABEL,
            BaseType::WASM_LABEL,
            TypeExtension {
                wasm_ext: Some(WasmTypeExtension::Label { parameters }),
                ..TypeExtension::default()
            },
        )
    }

    /// The label of a wasm catch block.
    pub const fn wasm_exception_label() -> Self {
        Self::from_base(BaseType::WASM_EXCEPTION_LABEL)
    }

    /// A type definition, optionally resolved to an arena slot.
    pub fn wasm_type_def(id: Option<TypeId>) -> Self {
        match id {
            Some(id) => Self::with_ext(
                BaseType::WASM_TYPE_DEF,
                BaseType::WASM_TYPE_DEF,
                TypeExtension {
                    wasm_ext: Some(WasmTypeExtension::TypeDef { id }),
                    ..TypeExtension::default()
                },
            ),
            None => Self::from_base(BaseType::WASM_TYPE_DEF),
        }
    }

    /// A function defined inside a wasm module.
    pub fn wasm_function_def(parameters: Vec<WasmValueType>, results: Vec<WasmValueType>) -> Self {
        Self::with_ext(
            BaseType::WASM_FUNCTION_DEF,
            BaseType::WASM_FUNCTION_DEF,
            TypeExtension {
                wasm_ext: Some(WasmTypeExtension::FunctionDef {
                    parameters,
                    results,
                }),
                ..TypeExtension::default()
            },
        )
    }

    /// A wasm data segment.
    pub const fn wasm_data_segment() -> Self {
        Self::from_base(BaseType::WASM_DATA_SEGMENT)
    }

    /// A wasm element segment.
    pub const fn wasm_element_segment() -> Self {
        Self::from_base(BaseType::WASM_ELEMENT_SEGMENT)
    }

    /// A global handle, on either side of the JS/wasm boundary.
    pub fn wasm_global(value_type: WasmValueType, is_mutable: bool) -> Self {
        Self::object_with_wasm_ext(WasmTypeExtension::Global {
            value_type,
            is_mutable,
        })
    }

    /// A memory handle.
    pub fn wasm_memory(limits: crate::Limits, is_shared: bool, is_memory64: bool) -> Self {
        Self::object_with_wasm_ext(WasmTypeExtension::Memory {
            limits,
            is_shared,
            is_memory64,
        })
    }

    /// A table handle.
    pub fn wasm_table(element_type: WasmValueType, limits: crate::Limits) -> Self {
        Self::object_with_wasm_ext(WasmTypeExtension::Table {
            element_type,
            limits,
        })
    }

    /// An exception tag handle.
    pub fn wasm_tag(parameters: Vec<WasmValueType>) -> Self {
        Self::object_with_wasm_ext(WasmTypeExtension::Tag { parameters })
    }

    fn object_with_wasm_ext(wasm_ext: WasmTypeExtension) -> Self {
        Self::with_ext(
            BaseType::OBJECT,
            BaseType::OBJECT,
            TypeExtension {
                wasm_ext: Some(wasm_ext),
                ..TypeExtension::default()
            },
        )
    }

    // --- Accessors. ---

    /// The kinds a value of this type definitely has.
    pub const fn definite_base(&self) -> BaseType {
        self.definite
    }

    /// The kinds a value of this type possibly has.
    pub const fn possible_base(&self) -> BaseType {
        self.possible
    }

    /// The object group, if known.
    pub fn group(&self) -> Option<&str> {
        self.ext.as_ref()?.group.as_deref()
    }

    /// The known property names.
    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.ext
            .iter()
            .flat_map(|ext| ext.properties.iter().map(String::as_str))
    }

    /// Whether `name` is a known property of this type.
    pub fn has_property(&self, name: &str) -> bool {
        self.ext
            .as_ref()
            .is_some_and(|ext| ext.properties.contains(name))
    }

    /// The number of known properties.
    pub fn num_properties(&self) -> usize {
        self.ext.as_ref().map_or(0, |ext| ext.properties.len())
    }

    /// The known method names.
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.ext
            .iter()
            .flat_map(|ext| ext.methods.iter().map(String::as_str))
    }

    /// Whether `name` is a known method of this type.
    pub fn has_method(&self, name: &str) -> bool {
        self.ext
            .as_ref()
            .is_some_and(|ext| ext.methods.contains(name))
    }

    /// The call signature, if known.
    pub fn signature(&self) -> Option<&Signature> {
        self.ext.as_ref()?.signature.as_ref()
    }

    /// The receiver type of an unbound function, if known.
    pub fn receiver(&self) -> Option<&Type> {
        self.ext.as_ref()?.receiver.as_deref()
    }

    /// The wasm extension, if any.
    pub fn wasm_extension(&self) -> Option<&WasmTypeExtension> {
        self.ext.as_ref()?.wasm_ext.as_ref()
    }

    // --- Predicates. ---

    /// Whether this is the bottom of the lattice.
    pub fn is_nothing(&self) -> bool {
        self.possible.is_empty() && self.ext.is_none()
    }

    /// Whether this type describes more than one alternative, i.e. its
    /// possible set is strictly larger than its definite set.
    pub const fn is_union(&self) -> bool {
        self.possible.bits() != self.definite.bits()
    }

    /// Whether a value of this type definitely has all the given kinds.
    pub const fn has_base(&self, base: BaseType) -> bool {
        self.definite.contains(base)
    }

    /// Whether every value of this type is also of type `other`.
    pub fn is_a(&self, other: &Type) -> bool {
        other.subsumes(self)
    }

    /// Whether some value of this type could be of type `other`.
    pub fn may_be(&self, other: &Type) -> bool {
        !self.intersection(other).is_nothing()
    }

    // --- Lattice arithmetic. ---

    /// Whether every value of `other` is also a value of this type.
    pub fn subsumes(&self, other: &Type) -> bool {
        // Nothing describes the empty set of values, which every type
        // contains.
        if other.is_nothing() {
            return true;
        }
        if !other.definite.contains(self.definite) {
            return false;
        }
        // Either the other side stays within our possible kinds, or it
        // definitely has every kind we allow (a merged type such as a
        // string object is still a string).
        if !self.possible.contains(other.possible) && !other.definite.contains(self.possible) {
            return false;
        }

        let Some(ours) = self.ext.as_deref() else {
            return true;
        };
        let empty = TypeExtension::default();
        let theirs = other.ext.as_deref().unwrap_or(&empty);

        if let Some(group) = &ours.group {
            match &theirs.group {
                Some(other_group) => {
                    if group != other_group && !groups_interchangeable(group, other_group) {
                        return false;
                    }
                }
                None => return false,
            }
        }
        if !ours.properties.is_subset(&theirs.properties) {
            return false;
        }
        if !ours.methods.is_subset(&theirs.methods) {
            return false;
        }
        if let Some(signature) = &ours.signature {
            match &theirs.signature {
                Some(other_signature) => {
                    if signature != other_signature && !signature.subsumes(other_signature) {
                        return false;
                    }
                }
                None => return false,
            }
        }
        if let Some(receiver) = &ours.receiver {
            match &theirs.receiver {
                Some(other_receiver) => {
                    if !receiver.subsumes(other_receiver) {
                        return false;
                    }
                }
                None => return false,
            }
        }
        if let Some(wasm_ext) = &ours.wasm_ext {
            match &theirs.wasm_ext {
                Some(other_wasm) => {
                    if !wasm_ext.subsumes(other_wasm) {
                        return false;
                    }
                }
                None => return false,
            }
        }
        true
    }

    /// The union of two types: a value of either type has the union type.
    pub fn union(&self, other: &Type) -> Type {
        let definite = self.definite & other.definite;
        let possible = self.possible | other.possible;
        let ext = match (self.ext.as_deref(), other.ext.as_deref()) {
            (Some(a), Some(b)) => {
                let group = match (&a.group, &b.group) {
                    (Some(ga), Some(gb)) if ga == gb => Some(ga.clone()),
                    _ => None,
                };
                let signature = match (&a.signature, &b.signature) {
                    (Some(sa), Some(sb)) if sa == sb => Some(sa.clone()),
                    _ => None,
                };
                let receiver = match (&a.receiver, &b.receiver) {
                    (Some(ra), Some(rb)) if ra == rb => Some(ra.clone()),
                    _ => None,
                };
                let wasm_ext = match (&a.wasm_ext, &b.wasm_ext) {
                    (Some(wa), Some(wb)) => wa.union(wb),
                    _ => None,
                };
                Some(TypeExtension {
                    group,
                    properties: a.properties.intersection(&b.properties).cloned().collect(),
                    methods: a.methods.intersection(&b.methods).cloned().collect(),
                    signature,
                    receiver,
                    wasm_ext,
                })
            }
            _ => None,
        };
        match ext {
            Some(ext) => Type::with_ext(definite, possible, ext),
            None => Type {
                definite,
                possible,
                ext: None,
            },
        }
    }

    /// The intersection of two types: the values that have both types.
    /// Returns [`Type::nothing`] if the two are inconsistent.
    pub fn intersection(&self, other: &Type) -> Type {
        let definite = self.definite | other.definite;
        let possible = self.possible & other.possible;
        if !possible.contains(definite) {
            return Type::nothing();
        }

        let ext = match (self.ext.as_deref(), other.ext.as_deref()) {
            (None, None) => None,
            (Some(ext), None) | (None, Some(ext)) => Some(ext.clone()),
            (Some(a), Some(b)) => {
                let group = match (&a.group, &b.group) {
                    (Some(ga), Some(gb)) => {
                        if ga == gb || groups_interchangeable(ga, gb) {
                            Some(ga.clone())
                        } else {
                            return Type::nothing();
                        }
                    }
                    (Some(g), None) | (None, Some(g)) => Some(g.clone()),
                    (None, None) => None,
                };
                let signature = match (&a.signature, &b.signature) {
                    (Some(sa), Some(sb)) => {
                        if sa == sb || sa.subsumes(sb) {
                            Some(sb.clone())
                        } else if sb.subsumes(sa) {
                            Some(sa.clone())
                        } else {
                            return Type::nothing();
                        }
                    }
                    (Some(s), None) | (None, Some(s)) => Some(s.clone()),
                    (None, None) => None,
                };
                let receiver = match (&a.receiver, &b.receiver) {
                    (Some(ra), Some(rb)) => {
                        if ra.subsumes(rb) {
                            Some(rb.clone())
                        } else if rb.subsumes(ra) {
                            Some(ra.clone())
                        } else {
                            return Type::nothing();
                        }
                    }
                    (Some(r), None) | (None, Some(r)) => Some(r.clone()),
                    (None, None) => None,
                };
                let wasm_ext = match (&a.wasm_ext, &b.wasm_ext) {
                    (Some(wa), Some(wb)) => match wa.intersection(wb) {
                        Some(w) => Some(w),
                        None => return Type::nothing(),
                    },
                    (Some(w), None) | (None, Some(w)) => Some(w.clone()),
                    (None, None) => None,
                };
                Some(TypeExtension {
                    group,
                    properties: a.properties.union(&b.properties).cloned().collect(),
                    methods: a.methods.union(&b.methods).cloned().collect(),
                    signature,
                    receiver,
                    wasm_ext,
                })
            }
        };
        match ext {
            Some(ext) => Type::with_ext(definite, possible, ext),
            None => Type {
                definite,
                possible,
                ext: None,
            },
        }
    }

    /// The merge of two types: a value that is both at once, e.g. a string
    /// object which is both a string and an object.
    ///
    /// # Panics
    ///
    /// Merging is a constructive operation and only defined on
    /// non-union, non-nothing types with compatible extensions. Anything
    /// else is a programming error.
    pub fn merging(&self, other: &Type) -> Type {
        assert!(
            !self.is_union() && !other.is_union(),
            "cannot merge union types"
        );
        assert!(
            !self.is_nothing() && !other.is_nothing(),
            "cannot merge with nothing"
        );

        let definite = self.definite | other.definite;
        let possible = self.possible | other.possible;
        let ext = match (self.ext.as_deref(), other.ext.as_deref()) {
            (None, None) => None,
            (Some(ext), None) | (None, Some(ext)) => Some(ext.clone()),
            (Some(a), Some(b)) => {
                let group = match (&a.group, &b.group) {
                    (Some(ga), Some(gb)) => {
                        assert!(ga == gb, "cannot merge types with different groups");
                        Some(ga.clone())
                    }
                    (Some(g), None) | (None, Some(g)) => Some(g.clone()),
                    (None, None) => None,
                };
                let signature = match (&a.signature, &b.signature) {
                    (Some(sa), Some(sb)) => {
                        assert!(sa == sb, "cannot merge types with different signatures");
                        Some(sa.clone())
                    }
                    (Some(s), None) | (None, Some(s)) => Some(s.clone()),
                    (None, None) => None,
                };
                let receiver = match (&a.receiver, &b.receiver) {
                    (Some(ra), Some(rb)) => {
                        assert!(ra == rb, "cannot merge types with different receivers");
                        Some(ra.clone())
                    }
                    (Some(r), None) | (None, Some(r)) => Some(r.clone()),
                    (None, None) => None,
                };
                let wasm_ext = match (&a.wasm_ext, &b.wasm_ext) {
                    (Some(wa), Some(wb)) => {
                        assert!(
                            wa == wb,
                            "cannot merge types with different wasm extensions"
                        );
                        Some(wa.clone())
                    }
                    (Some(w), None) | (None, Some(w)) => Some(w.clone()),
                    (None, None) => None,
                };
                Some(TypeExtension {
                    group,
                    properties: a.properties.union(&b.properties).cloned().collect(),
                    methods: a.methods.union(&b.methods).cloned().collect(),
                    signature,
                    receiver,
                    wasm_ext,
                })
            }
        };
        match ext {
            Some(ext) => Type::with_ext(definite, possible, ext),
            None => Type {
                definite,
                possible,
                ext: None,
            },
        }
    }

    // --- Refinement. ---

    fn map_ext(&self, f: impl FnOnce(&mut TypeExtension)) -> Type {
        let mut ext = self
            .ext
            .as_deref()
            .cloned()
            .unwrap_or_default();
        f(&mut ext);
        Type::with_ext(self.definite, self.possible, ext)
    }

    /// This type with `name` added as a known property.
    pub fn adding_property(&self, name: &str) -> Type {
        self.map_ext(|ext| {
            ext.properties.insert(name.to_owned());
        })
    }

    /// This type with `name` removed from the known properties.
    pub fn removing_property(&self, name: &str) -> Type {
        self.map_ext(|ext| {
            ext.properties.remove(name);
        })
    }

    /// This type with `name` added as a known method.
    pub fn adding_method(&self, name: &str) -> Type {
        self.map_ext(|ext| {
            ext.methods.insert(name.to_owned());
        })
    }

    /// This type with `name` removed from the known methods.
    pub fn removing_method(&self, name: &str) -> Type {
        self.map_ext(|ext| {
            ext.methods.remove(name);
        })
    }

    /// This type with its signature replaced.
    pub fn setting_signature(&self, signature: Signature) -> Type {
        self.map_ext(|ext| ext.signature = Some(signature))
    }

    /// This type with its group replaced.
    pub fn setting_group(&self, group: &str) -> Type {
        self.map_ext(|ext| ext.group = Some(group.to_owned()))
    }
}

impl BitOr for Type {
    type Output = Type;

    fn bitor(self, rhs: Type) -> Type {
        self.union(&rhs)
    }
}

impl BitAnd for Type {
    type Output = Type;

    fn bitand(self, rhs: Type) -> Type {
        self.intersection(&rhs)
    }
}

impl Add for Type {
    type Output = Type;

    fn add(self, rhs: Type) -> Type {
        self.merging(&rhs)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(BaseType, &str); 26] = [
            (BaseType::UNDEFINED, "undefined"),
            (BaseType::INTEGER, "integer"),
            (BaseType::BIGINT, "bigint"),
            (BaseType::FLOAT, "float"),
            (BaseType::STRING, "string"),
            (BaseType::BOOLEAN, "boolean"),
            (BaseType::REGEXP, "regexp"),
            (BaseType::OBJECT, "object"),
            (BaseType::FUNCTION, "function"),
            (BaseType::CONSTRUCTOR, "constructor"),
            (BaseType::UNBOUND_FUNCTION, "unboundFunction"),
            (BaseType::ITERABLE, "iterable"),
            (BaseType::WASM_I32, "wasmI32"),
            (BaseType::WASM_I64, "wasmI64"),
            (BaseType::WASM_F32, "wasmF32"),
            (BaseType::WASM_F64, "wasmF64"),
            (BaseType::WASM_SIMD128, "wasmSimd128"),
            (BaseType::WASM_REF, "wasmRef"),
            (BaseType::WASM_TYPE_DEF, "wasmTypeDef"),
            (BaseType::WASM_PACKED_I8, "wasmPackedI8"),
            (BaseType::WASM_PACKED_I16, "wasmPackedI16"),
            (BaseType::WASM_LABEL, "wasmLabel"),
            (BaseType::WASM_EXCEPTION_LABEL, "wasmExceptionLabel"),
            (BaseType::WASM_FUNCTION_DEF, "wasmFunctionDef"),
            (BaseType::WASM_DATA_SEGMENT, "wasmDataSegment"),
            (BaseType::WASM_ELEMENT_SEGMENT, "wasmElementSegment"),
        ];

        if self.is_nothing() {
            return write!(f, ".nothing");
        }
        if *self == Type::js_anything() {
            return write!(f, ".jsAnything");
        }
        if *self == Type::wasm_anything() {
            return write!(f, ".wasmAnything");
        }
        if *self == Type::anything() {
            return write!(f, ".anything");
        }

        let (bits, separator) = if self.is_union() {
            (self.possible, " | ")
        } else {
            (self.definite, " + ")
        };
        let mut first = true;
        for (bit, name) in NAMES {
            if bits.contains(bit) {
                if !first {
                    write!(f, "{separator}")?;
                }
                write!(f, ".{name}")?;
                first = false;
            }
        }
        if let Some(ext) = self.ext.as_deref() {
            if let Some(group) = &ext.group {
                write!(f, "({group})")?;
            }
            if !ext.properties.is_empty() {
                let mut names: Vec<_> = ext.properties.iter().map(String::as_str).collect();
                names.sort_unstable();
                write!(f, " {{{}}}", names.join(", "))?;
            }
            if !ext.methods.is_empty() {
                let mut names: Vec<_> = ext.methods.iter().map(String::as_str).collect();
                names.sort_unstable();
                write!(f, " [{}()]", names.join("(), "))?;
            }
            if let Some(signature) = &ext.signature {
                write!(f, " {signature}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use test_case::test_case;

    fn random_type(rng: &mut StdRng, depth: usize) -> Type {
        match rng.gen_range(0..14) {
            0 => Type::nothing(),
            1 => Type::undefined(),
            2 => Type::integer(),
            3 => Type::bigint(),
            4 => Type::float(),
            5 => Type::string(),
            6 => Type::boolean(),
            7 => Type::object(),
            8 => Type::object_with(Some("_fuzz_Object1"), &["a", "b"], &["m"]),
            9 => Type::object_with(None, &["a"], &[]),
            10 => Type::function(Some(Signature::for_unknown_function(2, false))),
            11 => Type::js_anything(),
            12 if depth > 0 => {
                let a = random_type(rng, depth - 1);
                let b = random_type(rng, depth - 1);
                a | b
            }
            _ => Type::iterable(),
        }
    }

    #[test]
    fn union_and_intersection_are_idempotent_and_commutative() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..500 {
            let a = random_type(&mut rng, 2);
            let b = random_type(&mut rng, 2);
            assert_eq!(a.union(&a), a);
            assert_eq!(a.intersection(&a), a);
            assert_eq!(a.union(&b), b.union(&a));
            assert_eq!(a.intersection(&b), b.intersection(&a));
        }
    }

    #[test]
    fn union_subsumes_operands_and_operands_subsume_intersection() {
        let mut rng = StdRng::seed_from_u64(0xf00d);
        for _ in 0..500 {
            let a = random_type(&mut rng, 2);
            let b = random_type(&mut rng, 2);
            let union = a.union(&b);
            assert!(union.subsumes(&a), "{union} should subsume {a}");
            assert!(union.subsumes(&b), "{union} should subsume {b}");
            let intersection = a.intersection(&b);
            assert!(a.subsumes(&intersection), "{a} should subsume {intersection}");
            assert!(b.subsumes(&intersection), "{b} should subsume {intersection}");
        }
    }

    #[test]
    fn subsumption_is_transitive() {
        let mut rng = StdRng::seed_from_u64(0xcafe);
        for _ in 0..2000 {
            let a = random_type(&mut rng, 1);
            let b = random_type(&mut rng, 1);
            let c = random_type(&mut rng, 1);
            if a.subsumes(&b) && b.subsumes(&c) {
                assert!(a.subsumes(&c), "{a} >= {b} >= {c} but not {a} >= {c}");
            }
        }
    }

    #[test]
    fn tops_and_bottom() {
        let mut rng = StdRng::seed_from_u64(0xbeef);
        for _ in 0..200 {
            let a = random_type(&mut rng, 2);
            assert!(a.subsumes(&Type::nothing()));
            if a.possible_base().intersects(BaseType::WASM_ANY) {
                continue;
            }
            assert!(Type::js_anything().subsumes(&a), ".jsAnything >= {a}");
        }
        assert!(Type::anything().subsumes(&Type::wasm_i32()));
        assert!(!Type::js_anything().subsumes(&Type::wasm_i32()));
        assert!(Type::wasm_anything().subsumes(&Type::wasm_simd128()));
    }

    #[test_case(Type::integer(), Type::string() ; "integer and string")]
    #[test_case(Type::object(), Type::string() ; "object and string")]
    fn merge_subsumed_by_parts(a: Type, b: Type) {
        let merged = a.clone() + b.clone();
        assert!(a.subsumes(&merged));
        assert!(b.subsumes(&merged));
    }

    #[test]
    fn merged_string_object_is_both() {
        let string_object = Type::string() + Type::object_with(None, &["length"], &[]);
        assert!(string_object.is_a(&Type::string()));
        assert!(string_object.is_a(&Type::object()));
        assert!(string_object.has_property("length"));
    }

    #[test]
    #[should_panic(expected = "cannot merge union types")]
    fn merging_unions_is_an_error() {
        let _ = (Type::integer() | Type::string()) + Type::object();
    }

    #[test]
    #[should_panic(expected = "cannot merge with nothing")]
    fn merging_nothing_is_an_error() {
        let _ = Type::nothing() + Type::object();
    }

    #[test]
    fn union_widens_extensions() {
        let a = Type::object_with(Some("A"), &["x", "y"], &["m"]);
        let b = Type::object_with(Some("A"), &["y", "z"], &[]);
        let union = a.union(&b);
        assert_eq!(union.group(), Some("A"));
        assert!(union.has_property("y"));
        assert!(!union.has_property("x"));
        assert!(!union.has_method("m"));
    }

    #[test]
    fn intersection_narrows_extensions() {
        let a = Type::object_with(None, &["x"], &[]);
        let b = Type::object_with(Some("B"), &["y"], &[]);
        let intersection = a.intersection(&b);
        assert_eq!(intersection.group(), Some("B"));
        assert!(intersection.has_property("x"));
        assert!(intersection.has_property("y"));
    }

    #[test]
    fn mismatched_groups_do_not_intersect() {
        let a = Type::object_with(Some("A"), &[], &[]);
        let b = Type::object_with(Some("B"), &[], &[]);
        assert!(a.intersection(&b).is_nothing());
        assert!(!a.may_be(&b));
    }

    #[test]
    fn uniquified_groups_are_interchangeable() {
        let a = Type::object_with(Some("_fuzz_Object1"), &[], &[]);
        let b = Type::object_with(Some("_fuzz_Object7"), &[], &[]);
        assert!(a.subsumes(&b));
        assert!(b.subsumes(&a));

        let c = Type::object_with(Some("_fuzz_Class2"), &[], &[]);
        assert!(!a.subsumes(&c));
    }

    #[test]
    fn property_refinement() {
        let object = Type::object_with(None, &["p", "q"], &[]);
        let narrowed = object.removing_property("p");
        assert!(!narrowed.has_property("p"));
        assert!(narrowed.has_property("q"));
        let widened = narrowed.adding_property("r");
        assert!(widened.has_property("r"));
        // More properties means a more specific type.
        assert!(narrowed.subsumes(&widened));
    }

    #[test]
    fn function_signature_subsumption() {
        let generic = Type::function(None);
        let typed = Type::function(Some(Signature::for_unknown_function(1, false)));
        assert!(generic.subsumes(&typed));
        assert!(!typed.subsumes(&generic));
    }

    #[test]
    fn may_be_across_unions() {
        let number_or_string = Type::number() | Type::string();
        assert!(number_or_string.may_be(&Type::string()));
        assert!(number_or_string.may_be(&Type::integer()));
        assert!(!number_or_string.may_be(&Type::boolean()));
        assert!(!Type::integer().may_be(&Type::string()));
    }
}
