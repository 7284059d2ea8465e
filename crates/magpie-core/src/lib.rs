//! Core types shared by the Magpie compiler crates.
//!
//! - [`Span`]: source positions for diagnostics
//! - [`Decl`]: the resolved type model and its structural comparator
//! - [`TypeHash`]: deterministic identity hashes for types and signatures
//! - [`CompilationError`]: every failure the binder can report

pub mod decl;
pub mod error;
pub mod span;
pub mod type_hash;

pub use decl::{ArrayType, Decl, FuncType, UnionRef, lists_match, params_match, types_match};
pub use error::CompilationError;
pub use span::Span;
pub use type_hash::{TypeHash, hash_constants};
