//! Wasm-side type machinery: value types, the polymorphic type extension
//! attached to wasm handles, and the arena that owns indexed type
//! descriptions.

use crate::{BaseType, Type};

/// A wasm value type as it appears in operation payloads and signatures.
///
/// The raw values are part of the wire format and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum WasmValueType {
    /// 32-bit integer.
    I32 = 0x00,
    /// 64-bit integer.
    I64 = 0x01,
    /// 32-bit float.
    F32 = 0x02,
    /// 64-bit float.
    F64 = 0x03,
    /// 128-bit SIMD vector.
    Simd128 = 0x04,
    /// Nullable function reference.
    FuncRef = 0x05,
    /// Nullable external reference.
    ExternRef = 0x06,
    /// Nullable exception reference.
    ExnRef = 0x07,
}

impl WasmValueType {
    /// The lattice type of a value of this wasm type.
    pub fn lattice_type(self) -> Type {
        match self {
            Self::I32 => Type::wasm_i32(),
            Self::I64 => Type::wasm_i64(),
            Self::F32 => Type::wasm_f32(),
            Self::F64 => Type::wasm_f64(),
            Self::Simd128 => Type::wasm_simd128(),
            Self::FuncRef => {
                Type::wasm_reference(WasmReferenceKind::Abstract(WasmAbstractHeapType::Func), true)
            }
            Self::ExternRef => Type::wasm_reference(
                WasmReferenceKind::Abstract(WasmAbstractHeapType::Extern),
                true,
            ),
            Self::ExnRef => {
                Type::wasm_reference(WasmReferenceKind::Abstract(WasmAbstractHeapType::Exn), true)
            }
        }
    }

    /// Whether this is one of the two integer value types.
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::I32 | Self::I64)
    }

    /// Whether this is one of the two float value types.
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }
}

impl TryFrom<u8> for WasmValueType {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        Ok(match raw {
            0x00 => Self::I32,
            0x01 => Self::I64,
            0x02 => Self::F32,
            0x03 => Self::F64,
            0x04 => Self::Simd128,
            0x05 => Self::FuncRef,
            0x06 => Self::ExternRef,
            0x07 => Self::ExnRef,
            _ => return Err(raw),
        })
    }
}

/// A packed storage type, usable only in struct and array fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum WasmPackedType {
    /// 8-bit packed integer.
    I8 = 0x00,
    /// 16-bit packed integer.
    I16 = 0x01,
}

impl TryFrom<u8> for WasmPackedType {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        match raw {
            0x00 => Ok(Self::I8),
            0x01 => Ok(Self::I16),
            _ => Err(raw),
        }
    }
}

/// An abstract (non-indexed) heap type a reference can point to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum WasmAbstractHeapType {
    /// Any function.
    Func = 0x00,
    /// Any host value.
    Extern = 0x01,
    /// Any exception.
    Exn = 0x02,
    /// The top of the internal hierarchy.
    Any = 0x03,
    /// Comparable references.
    Eq = 0x04,
    /// Unboxed 31-bit integers.
    I31 = 0x05,
    /// Any struct.
    Struct = 0x06,
    /// Any array.
    Array = 0x07,
    /// The bottom of the internal hierarchy.
    None = 0x08,
}

impl TryFrom<u8> for WasmAbstractHeapType {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        Ok(match raw {
            0x00 => Self::Func,
            0x01 => Self::Extern,
            0x02 => Self::Exn,
            0x03 => Self::Any,
            0x04 => Self::Eq,
            0x05 => Self::I31,
            0x06 => Self::Struct,
            0x07 => Self::Array,
            0x08 => Self::None,
            _ => return Err(raw),
        })
    }
}

/// What a wasm reference points to: an abstract heap type or an indexed
/// type description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WasmReferenceKind {
    /// A reference to an abstract heap type.
    Abstract(WasmAbstractHeapType),
    /// A reference to an indexed type description, resolved through the
    /// [`TypeArena`] of the enclosing typer state.
    Index(TypeId),
}

/// Memory or table size limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Limits {
    /// Initial size, in pages or elements.
    pub min: u32,
    /// Optional maximum size.
    pub max: Option<u32>,
}

/// The wasm-specific payload of a type extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WasmTypeExtension {
    /// A global, defined in or imported into a module.
    Global {
        /// The type of the stored value.
        value_type: WasmValueType,
        /// Whether the global can be written.
        is_mutable: bool,
    },
    /// A linear memory.
    Memory {
        /// Size limits in pages.
        limits: Limits,
        /// Whether the memory is shared between threads.
        is_shared: bool,
        /// Whether the memory uses 64-bit addressing.
        is_memory64: bool,
    },
    /// A table of references.
    Table {
        /// The element type of the table.
        element_type: WasmValueType,
        /// Size limits in elements.
        limits: Limits,
    },
    /// An exception tag.
    Tag {
        /// The parameter types carried by exceptions with this tag.
        parameters: Vec<WasmValueType>,
    },
    /// A block label; branch instructions take the label as input.
    Label {
        /// The types of the values a branch to this label carries.
        parameters: Vec<WasmValueType>,
    },
    /// A reference value.
    Reference {
        /// What the reference points to.
        kind: WasmReferenceKind,
        /// Whether the reference may be null.
        nullable: bool,
    },
    /// A type definition produced inside a type group.
    TypeDef {
        /// The arena slot describing the defined type.
        id: TypeId,
    },
    /// A function defined inside a wasm module.
    FunctionDef {
        /// Parameter value types.
        parameters: Vec<WasmValueType>,
        /// Result value types.
        results: Vec<WasmValueType>,
    },
}

impl WasmTypeExtension {
    /// Whether this extension subsumes `other`.
    ///
    /// Extensions are mostly compared for equality; references additionally
    /// allow a nullable reference to subsume a non-nullable one of the same
    /// kind.
    pub fn subsumes(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::Reference {
                    kind: kind_a,
                    nullable: nullable_a,
                },
                Self::Reference {
                    kind: kind_b,
                    nullable: nullable_b,
                },
            ) => kind_a == kind_b && (*nullable_a || !*nullable_b),
            (a, b) => a == b,
        }
    }

    /// The widened combination of two extensions, if one exists.
    pub(crate) fn union(&self, other: &Self) -> Option<Self> {
        match (self, other) {
            (
                Self::Reference {
                    kind: kind_a,
                    nullable: nullable_a,
                },
                Self::Reference {
                    kind: kind_b,
                    nullable: nullable_b,
                },
            ) if kind_a == kind_b => Some(Self::Reference {
                kind: *kind_a,
                nullable: *nullable_a || *nullable_b,
            }),
            (a, b) if a == b => Some(a.clone()),
            _ => None,
        }
    }

    /// The narrowed combination of two extensions, if one exists.
    pub(crate) fn intersection(&self, other: &Self) -> Option<Self> {
        match (self, other) {
            (
                Self::Reference {
                    kind: kind_a,
                    nullable: nullable_a,
                },
                Self::Reference {
                    kind: kind_b,
                    nullable: nullable_b,
                },
            ) if kind_a == kind_b => Some(Self::Reference {
                kind: *kind_a,
                nullable: *nullable_a && *nullable_b,
            }),
            (a, b) if a == b => Some(a.clone()),
            _ => None,
        }
    }
}

/// A stable handle into a [`TypeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeId(u32);

impl TypeId {
    /// Creates a type id from its raw index.
    pub const fn from_index(index: u32) -> Self {
        Self(index)
    }

    /// The arena slot of this id.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A storage type: what a struct field or array element holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WasmStorageType {
    /// A plain value type.
    Value(WasmValueType),
    /// A packed integer type.
    Packed(WasmPackedType),
    /// A reference, possibly back into the arena. Self-referential types
    /// are expressed this way; the id is a non-owning handle.
    Reference {
        /// What the reference points to.
        kind: WasmReferenceKind,
        /// Whether the reference may be null.
        nullable: bool,
    },
}

/// A single struct field description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WasmStructField {
    /// The field's storage type.
    pub ty: WasmStorageType,
    /// Whether the field can be written after construction.
    pub is_mutable: bool,
}

/// The shape of an indexed type definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeDescription {
    /// A struct with the given fields.
    Struct {
        /// Field descriptions in declaration order.
        fields: Vec<WasmStructField>,
    },
    /// An array of the given element type.
    Array {
        /// The element storage type.
        element: WasmStorageType,
        /// Whether elements can be written after construction.
        is_mutable: bool,
    },
}

/// Owns type descriptions and issues the [`TypeId`]s that reference them.
///
/// Cyclic type graphs (a struct field referencing its own type) are broken
/// by declaring a slot first and defining it once the fields are known.
/// The arena is owned by the typer state that created the descriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeArena {
    slots: Vec<Option<TypeDescription>>,
}

impl TypeArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a slot and returns its id, allowing the description to
    /// reference itself.
    pub fn declare(&mut self) -> TypeId {
        let id = TypeId(self.slots.len() as u32);
        self.slots.push(None);
        id
    }

    /// Fills a previously declared slot.
    ///
    /// # Panics
    ///
    /// Panics if the slot is already defined or was never declared.
    pub fn define(&mut self, id: TypeId, description: TypeDescription) {
        let slot = self
            .slots
            .get_mut(id.index())
            .expect("type id was never declared");
        assert!(slot.is_none(), "type id defined twice");
        *slot = Some(description);
    }

    /// Declares and immediately defines a slot.
    pub fn add(&mut self, description: TypeDescription) -> TypeId {
        let id = self.declare();
        self.define(id, description);
        id
    }

    /// Looks up a description. Returns `None` for declared-but-undefined
    /// slots and for ids from a different arena.
    pub fn get(&self, id: TypeId) -> Option<&TypeDescription> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    /// The number of declared slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slots have been declared.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// The lattice type of a storage type, used when typing struct/array
/// accesses.
impl WasmStorageType {
    /// The lattice type corresponding to this storage type.
    pub fn lattice_type(&self) -> Type {
        match self {
            Self::Value(value_type) => value_type.lattice_type(),
            Self::Packed(WasmPackedType::I8) => Type::from_base(BaseType::WASM_PACKED_I8),
            Self::Packed(WasmPackedType::I16) => Type::from_base(BaseType::WASM_PACKED_I16),
            Self::Reference { kind, nullable } => Type::wasm_reference(*kind, *nullable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_self_reference() {
        let mut arena = TypeArena::new();
        let id = arena.declare();
        assert!(arena.get(id).is_none());

        // A linked-list node: one field referencing the node type itself.
        arena.define(
            id,
            TypeDescription::Struct {
                fields: vec![WasmStructField {
                    ty: WasmStorageType::Reference {
                        kind: WasmReferenceKind::Index(id),
                        nullable: true,
                    },
                    is_mutable: true,
                }],
            },
        );

        match arena.get(id) {
            Some(TypeDescription::Struct { fields }) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(
                    fields[0].ty,
                    WasmStorageType::Reference {
                        kind: WasmReferenceKind::Index(id),
                        nullable: true,
                    }
                );
            }
            other => panic!("unexpected description: {other:?}"),
        }
    }

    #[test]
    #[should_panic(expected = "defined twice")]
    fn arena_double_define() {
        let mut arena = TypeArena::new();
        let id = arena.add(TypeDescription::Array {
            element: WasmStorageType::Value(WasmValueType::I32),
            is_mutable: false,
        });
        arena.define(
            id,
            TypeDescription::Struct { fields: Vec::new() },
        );
    }

    #[test]
    fn reference_nullability_subsumption() {
        let kind = WasmReferenceKind::Abstract(WasmAbstractHeapType::Any);
        let nullable = WasmTypeExtension::Reference {
            kind,
            nullable: true,
        };
        let non_null = WasmTypeExtension::Reference {
            kind,
            nullable: false,
        };
        assert!(nullable.subsumes(&non_null));
        assert!(!non_null.subsumes(&nullable));
        assert!(nullable.subsumes(&nullable));
    }
}
