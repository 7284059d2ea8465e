//! Assignment.
//!
//! Only mutable locals and mutable array elements are stored directly.
//! Every other target is sugar for a call to a setter named after the
//! target with `<-` appended, taking the target's arguments followed by
//! the value: `Foo 1 <- v` calls `Foo<-` with `(1, v)`.

use magpie_core::{CompilationError, Decl, Span, types_match};

use super::{FunctionBinder, Result};
use crate::ast::{AssignExpr, Expr};
use crate::bound::BoundExpr;
use crate::resolver::NameRef;
use crate::scope::LocalVar;

pub(super) fn bind_assign<'ast>(
    binder: &mut FunctionBinder<'_, 'ast>,
    assign: &AssignExpr<'ast>,
) -> Result<BoundExpr> {
    let span = assign.span;
    let value = binder.bind_expr(&assign.value)?;

    match &assign.target {
        Expr::Name(name) => match binder.scope.get(name.name) {
            Some(local) => store_local(local, value, span),
            None => call_setter(binder, name.into(), BoundExpr::unit(span), value),
        },
        Expr::Call(call) => {
            let arg = binder.bind_expr(&call.arg)?;
            if let Expr::Name(name) = &call.target {
                return call_setter(binder, name.into(), arg, value);
            }

            let target = binder.bind_expr(&call.target)?;
            let element = match (target.ty(), arg.ty()) {
                (Decl::Int, Decl::Array(array)) => {
                    Some((array.is_mutable, (*array.element).clone()))
                }
                _ => None,
            };
            let Some((is_mutable, element)) = element else {
                return Err(CompilationError::InvalidAssignmentTarget {
                    target: "the result of a call".to_string(),
                    span,
                });
            };
            if !is_mutable {
                return Err(CompilationError::ImmutableAssignment {
                    message: "cannot assign an element of an immutable array".to_string(),
                    span,
                });
            }
            if !types_match(&element, value.ty()) {
                return Err(CompilationError::AssignmentTypeMismatch {
                    name: "array element".to_string(),
                    declared: element,
                    actual: value.ty().clone(),
                    span,
                });
            }
            Ok(BoundExpr::store_element(arg, target, value, span))
        }
        Expr::Operator(op) => {
            let left = binder.bind_expr(&op.left)?;
            let right = binder.bind_expr(&op.right)?;
            let name = NameRef {
                name: op.op,
                type_args: &[],
                span: op.span,
            };
            call_setter(
                binder,
                name,
                BoundExpr::tuple(vec![left, right], op.span),
                value,
            )
        }
        Expr::Tuple(_) => Err(CompilationError::UnsupportedTupleAssignment { span }),
        other => Err(CompilationError::InvalidAssignmentTarget {
            target: other.describe().to_string(),
            span,
        }),
    }
}

fn store_local(local: &LocalVar, value: BoundExpr, span: Span) -> Result<BoundExpr> {
    if !local.is_mutable {
        return Err(CompilationError::ImmutableAssignment {
            message: format!("cannot assign to immutable local '{}'", local.name),
            span,
        });
    }
    if !types_match(&local.ty, value.ty()) {
        return Err(CompilationError::AssignmentTypeMismatch {
            name: local.name.clone(),
            declared: local.ty.clone(),
            actual: value.ty().clone(),
            span,
        });
    }
    Ok(BoundExpr::store_local(local.slot, value, span))
}

/// Resolve `name<-` with `arg` extended by `value`.
fn call_setter<'ast>(
    binder: &mut FunctionBinder<'_, 'ast>,
    target: NameRef<'_, 'ast>,
    arg: BoundExpr,
    value: BoundExpr,
) -> Result<BoundExpr> {
    let setter = format!("{}<-", target.name);
    let name = NameRef {
        name: &setter,
        type_args: target.type_args,
        span: target.span,
    };
    binder.resolve(name, Some(arg.append_arg(value)))
}
