//! Conditionals and loops.

use magpie_core::{CompilationError, Decl, types_match};

use super::{FunctionBinder, Result};
use crate::ast::{IfThenElseExpr, IfThenExpr, WhileExpr};
use crate::bound::BoundExpr;

/// `if c then body`: the body must be `Unit`, and so is the result.
pub(super) fn bind_if_then<'ast>(
    binder: &mut FunctionBinder<'_, 'ast>,
    if_then: &IfThenExpr<'ast>,
) -> Result<BoundExpr> {
    let condition = binder.bind_expr(&if_then.condition)?;
    check_if_condition(&condition)?;

    let body = binder.bind_expr(&if_then.body)?;
    if !body.ty().is_unit() {
        return Err(CompilationError::NonUnitBranch {
            actual: body.ty().clone(),
            span: body.span(),
        });
    }

    Ok(BoundExpr::if_then(condition, body, if_then.span))
}

/// `if c then a else b`: both arms must have the same type.
pub(super) fn bind_if_then_else<'ast>(
    binder: &mut FunctionBinder<'_, 'ast>,
    if_then_else: &IfThenElseExpr<'ast>,
) -> Result<BoundExpr> {
    let condition = binder.bind_expr(&if_then_else.condition)?;
    check_if_condition(&condition)?;

    let then_body = binder.bind_expr(&if_then_else.then_body)?;
    let else_body = binder.bind_expr(&if_then_else.else_body)?;
    if !types_match(then_body.ty(), else_body.ty()) {
        return Err(CompilationError::BranchTypeMismatch {
            then_type: then_body.ty().clone(),
            else_type: else_body.ty().clone(),
            span: if_then_else.span,
        });
    }

    Ok(BoundExpr::if_then_else(
        condition,
        then_body,
        else_body,
        if_then_else.span,
    ))
}

/// `while c do body`: `Bool` condition, `Unit` body.
pub(super) fn bind_while<'ast>(
    binder: &mut FunctionBinder<'_, 'ast>,
    while_do: &WhileExpr<'ast>,
) -> Result<BoundExpr> {
    let condition = binder.bind_expr(&while_do.condition)?;
    if *condition.ty() != Decl::Bool {
        return Err(CompilationError::WhileConditionType {
            actual: condition.ty().clone(),
            span: condition.span(),
        });
    }

    let body = binder.bind_expr(&while_do.body)?;
    if !body.ty().is_unit() {
        return Err(CompilationError::NonUnitLoopBody {
            actual: body.ty().clone(),
            span: body.span(),
        });
    }

    Ok(BoundExpr::while_do(condition, body, while_do.span))
}

fn check_if_condition(condition: &BoundExpr) -> Result<()> {
    if *condition.ty() != Decl::Bool {
        return Err(CompilationError::IfConditionType {
            actual: condition.ty().clone(),
            span: condition.span(),
        });
    }
    Ok(())
}
