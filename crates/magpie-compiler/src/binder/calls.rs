//! Calls, operators and indexing.

use magpie_core::{CompilationError, Decl, params_match};

use super::{FunctionBinder, Result};
use crate::ast::{CallExpr, Expr, OperatorExpr};
use crate::bound::BoundExpr;
use crate::resolver::NameRef;

/// Bind `target arg`.
///
/// A named target is resolved as a call with the bound argument. Otherwise
/// the target is bound as a value: an `Int` applied to an array indexes
/// it, and a function value is applied if the argument fits.
pub(super) fn bind_call<'ast>(
    binder: &mut FunctionBinder<'_, 'ast>,
    call: &CallExpr<'ast>,
) -> Result<BoundExpr> {
    let arg = binder.bind_expr(&call.arg)?;

    if let Expr::Name(name) = &call.target {
        return binder.resolve(name.into(), Some(arg));
    }

    let target = binder.bind_expr(&call.target)?;
    let target_ty = target.ty().clone();
    match &target_ty {
        Decl::Int => {
            if !matches!(arg.ty(), Decl::Array(_)) {
                return Err(CompilationError::NonFunctionCallTarget {
                    message: format!(
                        "integers can only be called with an array argument, not {}",
                        arg.ty()
                    ),
                    span: call.span,
                });
            }
            BoundExpr::load_element(arg, target, call.span).ok_or_else(|| {
                CompilationError::Internal {
                    message: "indexed a non-array".to_string(),
                }
            })
        }
        Decl::Func(func) => {
            if !params_match(&func.params, arg.ty()) {
                let expected: Vec<_> = func.params.iter().map(Decl::to_string).collect();
                return Err(CompilationError::ArgumentMismatch {
                    expected: expected.join(", "),
                    actual: arg.ty().clone(),
                    span: call.span,
                });
            }
            BoundExpr::apply(target, arg, call.span).ok_or_else(|| CompilationError::Internal {
                message: "applied a non-function".to_string(),
            })
        }
        other => Err(CompilationError::NonFunctionCallTarget {
            message: format!("target of an application must be a function, found {other}"),
            span: call.span,
        }),
    }
}

/// Bind `left op right` as a call to `op` with `(left, right)`.
pub(super) fn bind_operator<'ast>(
    binder: &mut FunctionBinder<'_, 'ast>,
    op: &OperatorExpr<'ast>,
) -> Result<BoundExpr> {
    let left = binder.bind_expr(&op.left)?;
    let right = binder.bind_expr(&op.right)?;
    let arg = BoundExpr::tuple(vec![left, right], op.span);

    binder.resolve(
        NameRef {
            name: op.op,
            type_args: &[],
            span: op.span,
        },
        Some(arg),
    )
}
