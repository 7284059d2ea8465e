//! Unbound expression tree produced by the parser.
//!
//! Nodes are arena-allocated: children are `&'ast` references into a
//! [`bumpalo::Bump`], so every node is `Copy` and the whole tree is freed at
//! once with its arena. Names are unresolved and nothing carries a type
//! except explicit annotations ([`TypeExpr`]).
//!
//! [`AstBuilder`] constructs trees the way a parser would; tests and
//! benchmarks use it to write function bodies compactly.

use bumpalo::Bump;
use magpie_core::Span;

use crate::bound::BoundExpr;

/// An unresolved type annotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeExpr<'ast> {
    Unit,
    Bool,
    Int,
    String,
    /// A named type: a union or a type parameter, with optional type arguments.
    Named {
        name: &'ast str,
        args: &'ast [TypeExpr<'ast>],
        span: Span,
    },
    Array {
        element: &'ast TypeExpr<'ast>,
        is_mutable: bool,
    },
    Tuple(&'ast [TypeExpr<'ast>]),
    Func {
        params: &'ast [TypeExpr<'ast>],
        ret: &'ast TypeExpr<'ast>,
    },
}

/// An unbound expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    Literal(LiteralExpr<'ast>),
    Name(NameExpr<'ast>),
    Call(&'ast CallExpr<'ast>),
    Array(&'ast ArrayExpr<'ast>),
    Tuple(&'ast TupleExpr<'ast>),
    Block(&'ast BlockExpr<'ast>),
    Define(&'ast DefineExpr<'ast>),
    Assign(&'ast AssignExpr<'ast>),
    IfThen(&'ast IfThenExpr<'ast>),
    IfThenElse(&'ast IfThenElseExpr<'ast>),
    While(&'ast WhileExpr<'ast>),
    /// `left op right`, sugar for calling `op` with `(left, right)`.
    Operator(&'ast OperatorExpr<'ast>),
    FuncRef(&'ast FuncRefExpr<'ast>),
    ConstructUnion(&'ast ConstructUnionExpr<'ast>),
    /// An already-bound body, used by auto-generated functions.
    Wrap(&'ast BoundExpr),
}

impl<'ast> Expr<'ast> {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Name(e) => e.span,
            Self::Call(e) => e.span,
            Self::Array(e) => e.span,
            Self::Tuple(e) => e.span,
            Self::Block(e) => e.span,
            Self::Define(e) => e.span,
            Self::Assign(e) => e.span,
            Self::IfThen(e) => e.span,
            Self::IfThenElse(e) => e.span,
            Self::While(e) => e.span,
            Self::Operator(e) => e.span,
            Self::FuncRef(e) => e.span,
            Self::ConstructUnion(e) => e.span,
            Self::Wrap(e) => e.span(),
        }
    }

    /// Short description of the node kind for diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Literal(_) => "a literal",
            Self::Name(_) => "a name",
            Self::Call(_) => "a call",
            Self::Array(_) => "an array literal",
            Self::Tuple(_) => "a tuple",
            Self::Block(_) => "a block",
            Self::Define(_) => "a definition",
            Self::Assign(_) => "an assignment",
            Self::IfThen(_) | Self::IfThenElse(_) => "an if expression",
            Self::While(_) => "a while loop",
            Self::Operator(_) => "an operator",
            Self::FuncRef(_) => "a function reference",
            Self::ConstructUnion(_) => "a union constructor",
            Self::Wrap(_) => "a generated expression",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr<'ast> {
    pub kind: LiteralKind<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralKind<'ast> {
    Null,
    Unit,
    Bool(bool),
    Int(i32),
    String(&'ast str),
}

/// A name, optionally with explicit type arguments (`Foo'Int`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NameExpr<'ast> {
    pub name: &'ast str,
    pub type_args: &'ast [TypeExpr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    pub target: Expr<'ast>,
    pub arg: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayExpr<'ast> {
    /// Declared element type; inferred from the elements when absent.
    pub element_type: Option<TypeExpr<'ast>>,
    pub elements: &'ast [Expr<'ast>],
    pub is_mutable: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TupleExpr<'ast> {
    pub fields: &'ast [Expr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockExpr<'ast> {
    pub exprs: &'ast [Expr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefineExpr<'ast> {
    pub name: &'ast str,
    pub value: Expr<'ast>,
    pub is_mutable: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignExpr<'ast> {
    pub target: Expr<'ast>,
    pub value: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfThenExpr<'ast> {
    pub condition: Expr<'ast>,
    pub body: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfThenElseExpr<'ast> {
    pub condition: Expr<'ast>,
    pub then_body: Expr<'ast>,
    pub else_body: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhileExpr<'ast> {
    pub condition: Expr<'ast>,
    pub body: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatorExpr<'ast> {
    pub left: Expr<'ast>,
    pub op: &'ast str,
    pub right: Expr<'ast>,
    pub span: Span,
}

/// `fn name'TypeArgs (ParamTypes)`: a function used as a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuncRefExpr<'ast> {
    pub name: NameExpr<'ast>,
    pub param_types: &'ast [TypeExpr<'ast>],
    pub span: Span,
}

/// Construction of one case of a union, taking the enclosing function's
/// argument as the case value when `has_value` is set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstructUnionExpr<'ast> {
    pub union: TypeExpr<'ast>,
    pub case_index: u8,
    pub has_value: bool,
    pub span: Span,
}

/// A named function parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param<'ast> {
    pub name: &'ast str,
    pub ty: TypeExpr<'ast>,
}

/// An unbound function declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionDecl<'ast> {
    pub name: &'ast str,
    /// Type parameters; non-empty for generic functions.
    pub type_params: &'ast [&'ast str],
    pub params: &'ast [Param<'ast>],
    pub return_type: TypeExpr<'ast>,
    pub body: Expr<'ast>,
    pub span: Span,
}

// ============================================================================
// AstBuilder
// ============================================================================

/// Builds unbound trees in an arena.
///
/// Every node gets the builder's current span; use [`AstBuilder::at`] to
/// move it.
#[derive(Clone, Copy)]
pub struct AstBuilder<'ast> {
    bump: &'ast Bump,
    span: Span,
}

impl<'ast> AstBuilder<'ast> {
    pub fn new(bump: &'ast Bump) -> Self {
        Self {
            bump,
            span: Span::default(),
        }
    }

    /// A builder that stamps nodes with `span`.
    pub fn at(self, span: Span) -> Self {
        Self { span, ..self }
    }

    fn str(&self, s: &str) -> &'ast str {
        self.bump.alloc_str(s)
    }

    fn exprs(&self, exprs: &[Expr<'ast>]) -> &'ast [Expr<'ast>] {
        self.bump.alloc_slice_copy(exprs)
    }

    fn types(&self, types: &[TypeExpr<'ast>]) -> &'ast [TypeExpr<'ast>] {
        self.bump.alloc_slice_copy(types)
    }

    fn literal(&self, kind: LiteralKind<'ast>) -> Expr<'ast> {
        Expr::Literal(LiteralExpr {
            kind,
            span: self.span,
        })
    }

    // ------------------------------------------------------------------
    // Literals and names
    // ------------------------------------------------------------------

    pub fn null(&self) -> Expr<'ast> {
        self.literal(LiteralKind::Null)
    }

    pub fn unit(&self) -> Expr<'ast> {
        self.literal(LiteralKind::Unit)
    }

    pub fn bool(&self, value: bool) -> Expr<'ast> {
        self.literal(LiteralKind::Bool(value))
    }

    pub fn int(&self, value: i32) -> Expr<'ast> {
        self.literal(LiteralKind::Int(value))
    }

    pub fn string(&self, value: &str) -> Expr<'ast> {
        self.literal(LiteralKind::String(self.str(value)))
    }

    pub fn name(&self, name: &str) -> Expr<'ast> {
        self.generic_name(name, &[])
    }

    pub fn generic_name(&self, name: &str, type_args: &[TypeExpr<'ast>]) -> Expr<'ast> {
        Expr::Name(self.name_expr(name, type_args))
    }

    fn name_expr(&self, name: &str, type_args: &[TypeExpr<'ast>]) -> NameExpr<'ast> {
        NameExpr {
            name: self.str(name),
            type_args: self.types(type_args),
            span: self.span,
        }
    }

    // ------------------------------------------------------------------
    // Compound expressions
    // ------------------------------------------------------------------

    pub fn call(&self, target: Expr<'ast>, arg: Expr<'ast>) -> Expr<'ast> {
        Expr::Call(self.bump.alloc(CallExpr {
            target,
            arg,
            span: self.span,
        }))
    }

    /// `name arg`, the common shape of a function call.
    pub fn call_named(&self, name: &str, arg: Expr<'ast>) -> Expr<'ast> {
        self.call(self.name(name), arg)
    }

    pub fn tuple(&self, fields: &[Expr<'ast>]) -> Expr<'ast> {
        Expr::Tuple(self.bump.alloc(TupleExpr {
            fields: self.exprs(fields),
            span: self.span,
        }))
    }

    pub fn array(&self, elements: &[Expr<'ast>]) -> Expr<'ast> {
        self.array_of(None, elements, false)
    }

    pub fn mutable_array(&self, elements: &[Expr<'ast>]) -> Expr<'ast> {
        self.array_of(None, elements, true)
    }

    pub fn array_of(
        &self,
        element_type: Option<TypeExpr<'ast>>,
        elements: &[Expr<'ast>],
        is_mutable: bool,
    ) -> Expr<'ast> {
        Expr::Array(self.bump.alloc(ArrayExpr {
            element_type,
            elements: self.exprs(elements),
            is_mutable,
            span: self.span,
        }))
    }

    pub fn block(&self, exprs: &[Expr<'ast>]) -> Expr<'ast> {
        Expr::Block(self.bump.alloc(BlockExpr {
            exprs: self.exprs(exprs),
            span: self.span,
        }))
    }

    pub fn define(&self, name: &str, value: Expr<'ast>) -> Expr<'ast> {
        self.define_with(name, value, false)
    }

    pub fn define_mut(&self, name: &str, value: Expr<'ast>) -> Expr<'ast> {
        self.define_with(name, value, true)
    }

    fn define_with(&self, name: &str, value: Expr<'ast>, is_mutable: bool) -> Expr<'ast> {
        Expr::Define(self.bump.alloc(DefineExpr {
            name: self.str(name),
            value,
            is_mutable,
            span: self.span,
        }))
    }

    pub fn assign(&self, target: Expr<'ast>, value: Expr<'ast>) -> Expr<'ast> {
        Expr::Assign(self.bump.alloc(AssignExpr {
            target,
            value,
            span: self.span,
        }))
    }

    pub fn if_then(&self, condition: Expr<'ast>, body: Expr<'ast>) -> Expr<'ast> {
        Expr::IfThen(self.bump.alloc(IfThenExpr {
            condition,
            body,
            span: self.span,
        }))
    }

    pub fn if_then_else(
        &self,
        condition: Expr<'ast>,
        then_body: Expr<'ast>,
        else_body: Expr<'ast>,
    ) -> Expr<'ast> {
        Expr::IfThenElse(self.bump.alloc(IfThenElseExpr {
            condition,
            then_body,
            else_body,
            span: self.span,
        }))
    }

    pub fn while_do(&self, condition: Expr<'ast>, body: Expr<'ast>) -> Expr<'ast> {
        Expr::While(self.bump.alloc(WhileExpr {
            condition,
            body,
            span: self.span,
        }))
    }

    pub fn op(&self, left: Expr<'ast>, op: &str, right: Expr<'ast>) -> Expr<'ast> {
        Expr::Operator(self.bump.alloc(OperatorExpr {
            left,
            op: self.str(op),
            right,
            span: self.span,
        }))
    }

    pub fn func_ref(
        &self,
        name: &str,
        type_args: &[TypeExpr<'ast>],
        param_types: &[TypeExpr<'ast>],
    ) -> Expr<'ast> {
        Expr::FuncRef(self.bump.alloc(FuncRefExpr {
            name: self.name_expr(name, type_args),
            param_types: self.types(param_types),
            span: self.span,
        }))
    }

    pub fn construct_union(
        &self,
        union: TypeExpr<'ast>,
        case_index: u8,
        has_value: bool,
    ) -> Expr<'ast> {
        Expr::ConstructUnion(self.bump.alloc(ConstructUnionExpr {
            union,
            case_index,
            has_value,
            span: self.span,
        }))
    }

    /// Wrap an already-bound expression as a function body.
    ///
    /// The expression is borrowed rather than moved into the arena, which
    /// never runs destructors.
    pub fn wrap(&self, bound: &'ast BoundExpr) -> Expr<'ast> {
        Expr::Wrap(bound)
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    pub fn ty_named(&self, name: &str, args: &[TypeExpr<'ast>]) -> TypeExpr<'ast> {
        TypeExpr::Named {
            name: self.str(name),
            args: self.types(args),
            span: self.span,
        }
    }

    pub fn ty_array(&self, element: TypeExpr<'ast>, is_mutable: bool) -> TypeExpr<'ast> {
        TypeExpr::Array {
            element: self.bump.alloc(element),
            is_mutable,
        }
    }

    pub fn ty_tuple(&self, fields: &[TypeExpr<'ast>]) -> TypeExpr<'ast> {
        TypeExpr::Tuple(self.types(fields))
    }

    pub fn ty_func(&self, params: &[TypeExpr<'ast>], ret: TypeExpr<'ast>) -> TypeExpr<'ast> {
        TypeExpr::Func {
            params: self.types(params),
            ret: self.bump.alloc(ret),
        }
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    /// Declare a function. `params` are `(name, type)` pairs.
    pub fn function(
        &self,
        name: &str,
        params: &[(&str, TypeExpr<'ast>)],
        return_type: TypeExpr<'ast>,
        body: Expr<'ast>,
    ) -> &'ast FunctionDecl<'ast> {
        self.generic_function(name, &[], params, return_type, body)
    }

    /// Declare a generic function with the given type parameter names.
    pub fn generic_function(
        &self,
        name: &str,
        type_params: &[&str],
        params: &[(&str, TypeExpr<'ast>)],
        return_type: TypeExpr<'ast>,
        body: Expr<'ast>,
    ) -> &'ast FunctionDecl<'ast> {
        let type_params = self
            .bump
            .alloc_slice_fill_iter(type_params.iter().map(|p| self.str(p)));
        let params = self
            .bump
            .alloc_slice_fill_iter(params.iter().map(|(name, ty)| Param {
                name: self.str(name),
                ty: *ty,
            }));
        self.bump.alloc(FunctionDecl {
            name: self.str(name),
            type_params,
            params,
            return_type,
            body,
            span: self.span,
        })
    }
}
