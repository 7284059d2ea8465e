//! Magpie Compiler
//!
//! The binding pass of the Magpie compiler: it turns parsed function
//! bodies into type-annotated trees ready for code generation.
//!
//! ## Architecture
//!
//! - **Registration**: unions, foreign functions, and every function
//!   signature are added to a [`Program`] up front
//! - **Binding**: function bodies are bound on demand; a call to an
//!   unbound function binds it first, and calls to generic functions create
//!   memoized instances
//!
//! ## Modules
//!
//! - [`ast`]: Arena-allocated unbound expression tree and [`AstBuilder`]
//! - [`binder`]: Expression binder for one function body
//! - [`bound`]: Bound expression tree
//! - [`bytecode`]: Instruction set and chunk encoding for the code generator
//! - [`callable`]: Call targets: user, intrinsic, and foreign functions
//! - [`intrinsics`]: Built-in functions lowered to opcodes
//! - [`program`]: Function table, binding state and instancing
//! - [`resolver`]: Name and overload resolution
//! - [`scope`]: Local scope management for function binding
//! - [`template`]: Generic function instancing
//! - [`type_resolver`]: Type annotations to [`Decl`]s

pub mod ast;
pub mod binder;
pub mod bound;
pub mod bytecode;
pub mod callable;
pub mod intrinsics;
pub mod program;
pub mod resolver;
pub mod scope;
pub mod template;
pub mod type_resolver;

pub use ast::{AstBuilder, Expr, FunctionDecl, TypeExpr};
pub use binder::FunctionBinder;
pub use bound::{BoundExpr, BoundExprKind, BoundFunction};
pub use callable::{Callable, ForeignFunction, FunctionId, FunctionKind, GenericId};
pub use intrinsics::Intrinsic;
pub use program::{BindResult, BindState, Candidate, FunctionEntry, Program};
pub use scope::{LocalScope, LocalVar};
pub use template::InstancingContext;
pub use type_resolver::{TypeResolver, UnionDecl};

// Re-export core types for convenience
pub use magpie_core::{CompilationError, Decl, FuncType, Span};
