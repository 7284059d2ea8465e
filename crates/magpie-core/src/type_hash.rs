//! Deterministic hash-based identity for types and function signatures.
//!
//! [`TypeHash`] is a 64-bit XXH64 hash computed from a name or a structural
//! description. The same input always produces the same hash, so a signature
//! can be identified before the function it names is registered, and the
//! generic instantiation cache can key on concrete type arguments without
//! holding on to the `Decl`s themselves.

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
///
/// Different entity kinds mix in a different constant so that, for example,
/// the tuple `(Int)` and the array `Int[]` never share a hash.
pub mod hash_constants {
    /// Separator constant used when folding a sequence of hashes.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for named types.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for function signatures.
    pub const FUNCTION: u64 = 0x5ea77ffbcdf5f302;

    /// Domain marker for tuple types.
    pub const TUPLE: u64 = 0x6b1d9e03c45af217;

    /// Domain marker for array types.
    pub const ARRAY: u64 = 0x19f4c07a3de28b51;

    /// Domain marker for function types.
    pub const FUNC_TYPE: u64 = 0x8e2a5c71f0b3d469;

    /// Domain marker for union types.
    pub const UNION: u64 = 0x3e9f5d2a8c7b1403;

    /// Domain marker for generic type parameters.
    pub const GENERIC: u64 = 0x9a7f3d5e2b8c4601;
}

/// A deterministic 64-bit hash identifying a type or a function signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a type hash from a type name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Create a function hash from name and parameter type hashes.
    ///
    /// Parameter order matters: `(Int, Bool)` and `(Bool, Int)` differ.
    ///
    /// ```
    /// use magpie_core::TypeHash;
    ///
    /// let int = TypeHash::from_name("Int");
    /// let string = TypeHash::from_name("String");
    /// assert_ne!(
    ///     TypeHash::from_function("Print", &[int]),
    ///     TypeHash::from_function("Print", &[string]),
    /// );
    /// ```
    #[inline]
    pub fn from_function(name: &str, param_hashes: &[TypeHash]) -> Self {
        Self::fold(hash_constants::FUNCTION ^ xxh64(name.as_bytes(), 0), param_hashes)
    }

    /// Create a hash for a structural type made of component hashes.
    ///
    /// `domain` is one of the [`hash_constants`] markers.
    #[inline]
    pub fn from_parts(domain: u64, parts: &[TypeHash]) -> Self {
        Self::fold(domain, parts)
    }

    /// Create a hash for a generic instance from its template and type arguments.
    #[inline]
    pub fn from_instance(template: TypeHash, args: &[TypeHash]) -> Self {
        Self::fold(template.0, args)
    }

    /// Check if this is an empty/invalid hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn fold(seed: u64, parts: &[TypeHash]) -> Self {
        let mut hash = seed;
        for (i, part) in parts.iter().enumerate() {
            // Position marker keeps the fold order-sensitive.
            let marker = xxh64(&(i as u64).to_le_bytes(), hash_constants::SEP);
            hash = hash
                .wrapping_mul(hash_constants::SEP)
                .wrapping_add(marker ^ part.0);
        }
        TypeHash(hash)
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
