//! Magpie
//!
//! Name resolution and type checking for the Magpie language.
//!
//! A [`Unit`] collects the declarations of one program (unions, host
//! functions, and parsed function declarations allocated in a [`Bump`]
//! arena) and binds every function body to a typed tree.
//!
//! # Example
//!
//! ```
//! use magpie::{AstBuilder, Bump, TypeExpr, Unit};
//!
//! let arena = Bump::new();
//! let ast = AstBuilder::new(&arena);
//!
//! let mut unit = Unit::new();
//! unit.add_function(ast.function(
//!     "Double",
//!     &[("x", TypeExpr::Int)],
//!     TypeExpr::Int,
//!     ast.op(ast.name("x"), "+", ast.name("x")),
//! ))
//! .unwrap();
//!
//! unit.build().unwrap();
//! assert!(unit.program().bound(unit.program().lookup("Double").unwrap()).is_some());
//! ```

mod unit;

pub use unit::{BuildError, Unit};

pub use bumpalo::Bump;

pub use magpie_compiler::ast;
pub use magpie_compiler::bytecode;
pub use magpie_compiler::{
    AstBuilder, BindResult, BindState, BoundExpr, BoundExprKind, BoundFunction, Callable,
    Candidate, Expr, ForeignFunction, FunctionDecl, FunctionEntry, FunctionId, FunctionKind,
    GenericId, InstancingContext, Intrinsic, Program, TypeExpr, UnionDecl,
};
pub use magpie_core::{
    CompilationError, Decl, FuncType, Span, TypeHash, lists_match, params_match, types_match,
};
