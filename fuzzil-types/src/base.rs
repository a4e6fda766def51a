//! The base-type bitset underlying the lattice.

use bitflags::bitflags;

bitflags! {
    /// The primitive kinds a value can have.
    ///
    /// A [`Type`](crate::Type) carries two of these bitsets: the kinds a
    /// value definitely has and the kinds it may have. JavaScript-side and
    /// wasm-side kinds share the bitset but never mix in well-formed types
    /// produced by the interpreter.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BaseType: u32 {
        /// The JavaScript `undefined` value.
        const UNDEFINED = 1 << 0;
        /// A JavaScript number with an integral value.
        const INTEGER = 1 << 1;
        /// A JavaScript BigInt.
        const BIGINT = 1 << 2;
        /// A JavaScript number with a fractional value.
        const FLOAT = 1 << 3;
        /// A JavaScript string.
        const STRING = 1 << 4;
        /// A JavaScript boolean.
        const BOOLEAN = 1 << 5;
        /// A JavaScript regular expression object.
        const REGEXP = 1 << 6;
        /// An object; properties and methods live in the type extension.
        const OBJECT = 1 << 7;
        /// A value that can be called as a function.
        const FUNCTION = 1 << 8;
        /// A value that can be invoked with `new`.
        const CONSTRUCTOR = 1 << 9;
        /// A function that requires an explicit receiver to be useful.
        const UNBOUND_FUNCTION = 1 << 10;
        /// A value that can be iterated, e.g. with for-of or spreading.
        const ITERABLE = 1 << 11;

        /// A wasm i32 value.
        const WASM_I32 = 1 << 12;
        /// A wasm i64 value.
        const WASM_I64 = 1 << 13;
        /// A wasm f32 value.
        const WASM_F32 = 1 << 14;
        /// A wasm f64 value.
        const WASM_F64 = 1 << 15;
        /// A wasm 128-bit SIMD value.
        const WASM_SIMD128 = 1 << 16;
        /// A wasm reference value; the referenced kind lives in the
        /// extension.
        const WASM_REF = 1 << 17;
        /// A wasm type definition produced inside a type group.
        const WASM_TYPE_DEF = 1 << 18;
        /// A packed 8-bit storage type, valid only in struct/array fields.
        const WASM_PACKED_I8 = 1 << 19;
        /// A packed 16-bit storage type, valid only in struct/array fields.
        const WASM_PACKED_I16 = 1 << 20;
        /// A wasm block label, the branch target handle of block-like
        /// instructions.
        const WASM_LABEL = 1 << 21;
        /// The label of a wasm catch block.
        const WASM_EXCEPTION_LABEL = 1 << 22;
        /// A function defined inside a wasm module.
        const WASM_FUNCTION_DEF = 1 << 23;
        /// A wasm data segment.
        const WASM_DATA_SEGMENT = 1 << 24;
        /// A wasm element segment.
        const WASM_ELEMENT_SEGMENT = 1 << 25;

        /// Every JavaScript-side kind.
        const JS_ANY = Self::UNDEFINED.bits()
            | Self::INTEGER.bits()
            | Self::BIGINT.bits()
            | Self::FLOAT.bits()
            | Self::STRING.bits()
            | Self::BOOLEAN.bits()
            | Self::REGEXP.bits()
            | Self::OBJECT.bits()
            | Self::FUNCTION.bits()
            | Self::CONSTRUCTOR.bits()
            | Self::UNBOUND_FUNCTION.bits()
            | Self::ITERABLE.bits();

        /// Every wasm-side kind.
        const WASM_ANY = Self::WASM_I32.bits()
            | Self::WASM_I64.bits()
            | Self::WASM_F32.bits()
            | Self::WASM_F64.bits()
            | Self::WASM_SIMD128.bits()
            | Self::WASM_REF.bits()
            | Self::WASM_TYPE_DEF.bits()
            | Self::WASM_PACKED_I8.bits()
            | Self::WASM_PACKED_I16.bits()
            | Self::WASM_LABEL.bits()
            | Self::WASM_EXCEPTION_LABEL.bits()
            | Self::WASM_FUNCTION_DEF.bits()
            | Self::WASM_DATA_SEGMENT.bits()
            | Self::WASM_ELEMENT_SEGMENT.bits();
    }
}
