//! Bound expression tree.
//!
//! Every [`BoundExpr`] carries the [`Decl`] computed for it when it was
//! built. The type is fixed at construction and cannot be changed later;
//! constructors derive it from their children wherever the rule is local
//! (blocks, tuples, stores) and take it explicitly where only the binder
//! knows it (calls, element loads).

use magpie_core::{Decl, Span};

use crate::callable::{Callable, FunctionId};

/// A type-annotated expression.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundExpr {
    kind: BoundExprKind,
    ty: Decl,
    span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoundExprKind {
    /// The null literal. Typed as `Unit`.
    Null,
    Unit,
    Bool(bool),
    Int(i32),
    String(String),
    /// Read a local slot.
    Local { slot: u32 },
    /// Read one field of a tuple value.
    Field { object: Box<BoundExpr>, index: u8 },
    /// Write a local slot. Typed as `Unit`.
    StoreLocal { slot: u32, value: Box<BoundExpr> },
    /// Call a statically resolved callable.
    Call { callable: Callable, arg: Box<BoundExpr> },
    /// Apply a function-typed value.
    Apply {
        target: Box<BoundExpr>,
        arg: Box<BoundExpr>,
    },
    LoadElement {
        array: Box<BoundExpr>,
        index: Box<BoundExpr>,
    },
    /// Write an array element. Typed as `Unit`.
    StoreElement {
        array: Box<BoundExpr>,
        index: Box<BoundExpr>,
        value: Box<BoundExpr>,
    },
    Array { elements: Vec<BoundExpr> },
    Tuple(Vec<BoundExpr>),
    Block(Vec<BoundExpr>),
    IfThen {
        condition: Box<BoundExpr>,
        body: Box<BoundExpr>,
    },
    IfThenElse {
        condition: Box<BoundExpr>,
        then_body: Box<BoundExpr>,
        else_body: Box<BoundExpr>,
    },
    While {
        condition: Box<BoundExpr>,
        body: Box<BoundExpr>,
    },
    /// A user function used as a value.
    FuncRef(FunctionId),
    /// Build a union case, taking the enclosing function's argument as the
    /// case value when `has_value` is set.
    ConstructUnion { case_index: u8, has_value: bool },
}

impl BoundExpr {
    fn new(kind: BoundExprKind, ty: Decl, span: Span) -> Self {
        Self { kind, ty, span }
    }

    pub fn kind(&self) -> &BoundExprKind {
        &self.kind
    }

    pub fn ty(&self) -> &Decl {
        &self.ty
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn into_kind(self) -> BoundExprKind {
        self.kind
    }

    // ------------------------------------------------------------------
    // Literals
    // ------------------------------------------------------------------

    pub fn null(span: Span) -> Self {
        Self::new(BoundExprKind::Null, Decl::Unit, span)
    }

    pub fn unit(span: Span) -> Self {
        Self::new(BoundExprKind::Unit, Decl::Unit, span)
    }

    pub fn bool(value: bool, span: Span) -> Self {
        Self::new(BoundExprKind::Bool(value), Decl::Bool, span)
    }

    pub fn int(value: i32, span: Span) -> Self {
        Self::new(BoundExprKind::Int(value), Decl::Int, span)
    }

    pub fn string(value: impl Into<String>, span: Span) -> Self {
        Self::new(BoundExprKind::String(value.into()), Decl::String, span)
    }

    // ------------------------------------------------------------------
    // Locals
    // ------------------------------------------------------------------

    pub fn local(slot: u32, ty: Decl, span: Span) -> Self {
        Self::new(BoundExprKind::Local { slot }, ty, span)
    }

    pub fn field(object: BoundExpr, index: u8, ty: Decl, span: Span) -> Self {
        Self::new(
            BoundExprKind::Field {
                object: Box::new(object),
                index,
            },
            ty,
            span,
        )
    }

    pub fn store_local(slot: u32, value: BoundExpr, span: Span) -> Self {
        Self::new(
            BoundExprKind::StoreLocal {
                slot,
                value: Box::new(value),
            },
            Decl::Unit,
            span,
        )
    }

    // ------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------

    pub fn call(callable: Callable, ret: Decl, arg: BoundExpr, span: Span) -> Self {
        Self::new(
            BoundExprKind::Call {
                callable,
                arg: Box::new(arg),
            },
            ret,
            span,
        )
    }

    /// Apply a function-typed value. Returns `None` when `target` is not a
    /// function.
    pub fn apply(target: BoundExpr, arg: BoundExpr, span: Span) -> Option<Self> {
        let Decl::Func(func) = target.ty() else {
            return None;
        };
        let ret = (*func.ret).clone();
        Some(Self::new(
            BoundExprKind::Apply {
                target: Box::new(target),
                arg: Box::new(arg),
            },
            ret,
            span,
        ))
    }

    pub fn func_ref(function: FunctionId, ty: Decl, span: Span) -> Self {
        Self::new(BoundExprKind::FuncRef(function), ty, span)
    }

    // ------------------------------------------------------------------
    // Arrays and tuples
    // ------------------------------------------------------------------

    pub fn array(element: Decl, elements: Vec<BoundExpr>, is_mutable: bool, span: Span) -> Self {
        Self::new(
            BoundExprKind::Array { elements },
            Decl::array(element, is_mutable),
            span,
        )
    }

    /// Load an element. Returns `None` when `array` is not array-typed.
    pub fn load_element(array: BoundExpr, index: BoundExpr, span: Span) -> Option<Self> {
        let Decl::Array(array_type) = array.ty() else {
            return None;
        };
        let element = (*array_type.element).clone();
        Some(Self::new(
            BoundExprKind::LoadElement {
                array: Box::new(array),
                index: Box::new(index),
            },
            element,
            span,
        ))
    }

    pub fn store_element(array: BoundExpr, index: BoundExpr, value: BoundExpr, span: Span) -> Self {
        Self::new(
            BoundExprKind::StoreElement {
                array: Box::new(array),
                index: Box::new(index),
                value: Box::new(value),
            },
            Decl::Unit,
            span,
        )
    }

    pub fn tuple(fields: Vec<BoundExpr>, span: Span) -> Self {
        let ty = Decl::tuple(fields.iter().map(|f| f.ty().clone()).collect());
        Self::new(BoundExprKind::Tuple(fields), ty, span)
    }

    /// Extend a call argument with one more trailing value.
    ///
    /// Unit becomes `value`, a tuple literal gains a field, and anything
    /// else becomes the pair `(self, value)`.
    pub fn append_arg(self, value: BoundExpr) -> Self {
        let span = self.span;
        match self.kind {
            BoundExprKind::Unit => value,
            BoundExprKind::Tuple(mut fields) => {
                fields.push(value);
                Self::tuple(fields, span)
            }
            kind => Self::tuple(vec![Self::new(kind, self.ty, span), value], span),
        }
    }

    // ------------------------------------------------------------------
    // Control flow
    // ------------------------------------------------------------------

    /// A sequence. Typed as its last expression, or `Unit` when empty.
    pub fn block(exprs: Vec<BoundExpr>, span: Span) -> Self {
        let ty = exprs.last().map_or(Decl::Unit, |e| e.ty().clone());
        Self::new(BoundExprKind::Block(exprs), ty, span)
    }

    pub fn if_then(condition: BoundExpr, body: BoundExpr, span: Span) -> Self {
        Self::new(
            BoundExprKind::IfThen {
                condition: Box::new(condition),
                body: Box::new(body),
            },
            Decl::Unit,
            span,
        )
    }

    /// Typed as the then-branch; callers check the branches agree.
    pub fn if_then_else(
        condition: BoundExpr,
        then_body: BoundExpr,
        else_body: BoundExpr,
        span: Span,
    ) -> Self {
        let ty = then_body.ty().clone();
        Self::new(
            BoundExprKind::IfThenElse {
                condition: Box::new(condition),
                then_body: Box::new(then_body),
                else_body: Box::new(else_body),
            },
            ty,
            span,
        )
    }

    pub fn while_do(condition: BoundExpr, body: BoundExpr, span: Span) -> Self {
        Self::new(
            BoundExprKind::While {
                condition: Box::new(condition),
                body: Box::new(body),
            },
            Decl::Unit,
            span,
        )
    }

    pub fn construct_union(union: Decl, case_index: u8, has_value: bool, span: Span) -> Self {
        Self::new(
            BoundExprKind::ConstructUnion {
                case_index,
                has_value,
            },
            union,
            span,
        )
    }
}

/// A function whose body has been bound.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundFunction {
    pub id: FunctionId,
    /// Display name; generic instances include their type arguments.
    pub name: String,
    pub params: Vec<Decl>,
    pub ret: Decl,
    pub body: BoundExpr,
    /// Local slots used, including the argument slot.
    pub num_locals: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_takes_last_type() {
        let s = Span::default();
        let block = BoundExpr::block(vec![BoundExpr::unit(s), BoundExpr::int(3, s)], s);
        assert_eq!(block.ty(), &Decl::Int);
        assert_eq!(BoundExpr::block(Vec::new(), s).ty(), &Decl::Unit);
    }

    #[test]
    fn null_is_unit_typed() {
        assert_eq!(BoundExpr::null(Span::default()).ty(), &Decl::Unit);
    }

    #[test]
    fn append_arg_shapes() {
        let s = Span::default();
        let v = BoundExpr::string("v", s);

        let from_unit = BoundExpr::unit(s).append_arg(v.clone());
        assert_eq!(from_unit.ty(), &Decl::String);

        let from_tuple = BoundExpr::tuple(vec![BoundExpr::int(1, s), BoundExpr::int(2, s)], s)
            .append_arg(v.clone());
        assert_eq!(
            from_tuple.ty(),
            &Decl::Tuple(vec![Decl::Int, Decl::Int, Decl::String])
        );

        let from_single = BoundExpr::bool(true, s).append_arg(v);
        assert_eq!(
            from_single.ty(),
            &Decl::Tuple(vec![Decl::Bool, Decl::String])
        );
    }

    #[test]
    fn load_element_requires_array() {
        let s = Span::default();
        let array = BoundExpr::array(Decl::Int, vec![BoundExpr::int(1, s)], false, s);
        let load = BoundExpr::load_element(array, BoundExpr::int(0, s), s).unwrap();
        assert_eq!(load.ty(), &Decl::Int);

        assert!(BoundExpr::load_element(BoundExpr::int(1, s), BoundExpr::int(0, s), s).is_none());
    }

    #[test]
    fn stores_are_unit() {
        let s = Span::default();
        let store = BoundExpr::store_local(1, BoundExpr::int(5, s), s);
        assert_eq!(store.ty(), &Decl::Unit);
    }
}
