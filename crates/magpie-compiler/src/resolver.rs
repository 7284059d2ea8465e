//! Name and overload resolution.
//!
//! A name in expression position is either a local variable or a call.
//! Calls are resolved against every callable with that name whose
//! parameter list accepts the argument type. Exactly one must match: there
//! is no ranking between candidates, so two matches is an error even when
//! one looks more specific.

use magpie_core::{CompilationError, Decl, FuncType, Span};

use crate::ast::{FuncRefExpr, NameExpr, TypeExpr};
use crate::bound::BoundExpr;
use crate::callable::Callable;
use crate::program::Program;
use crate::scope::{LocalScope, LocalVar};
use crate::template::InstancingContext;
use crate::type_resolver::TypeResolver;

type Result<T> = std::result::Result<T, CompilationError>;

/// A name to resolve, possibly synthesized (`name<-`) rather than parsed.
#[derive(Debug, Clone, Copy)]
pub struct NameRef<'n, 'ast> {
    pub name: &'n str,
    pub type_args: &'ast [TypeExpr<'ast>],
    pub span: Span,
}

impl<'ast> From<&NameExpr<'ast>> for NameRef<'ast, 'ast> {
    fn from(name: &NameExpr<'ast>) -> Self {
        Self {
            name: name.name,
            type_args: name.type_args,
            span: name.span,
        }
    }
}

/// Resolve a name with an optional already-bound argument.
///
/// Without an argument, a local in scope wins. Otherwise the name is a
/// call: a missing argument means `Unit`. Explicit type arguments are
/// resolved in the instancing context first.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn resolve_name<'ast>(
    program: &mut Program<'ast>,
    instancing: Option<&InstancingContext>,
    scope: &LocalScope,
    name: NameRef<'_, 'ast>,
    arg: Option<BoundExpr>,
) -> Result<BoundExpr> {
    if arg.is_none()
        && let Some(local) = scope.get(name.name)
    {
        return Ok(load_local(local, name.span));
    }

    let type_args = TypeResolver::new(program.unions())
        .with_instancing(instancing)
        .resolve_all(name.type_args)?;
    let arg = arg.unwrap_or_else(|| BoundExpr::unit(name.span));

    let (callable, signature) = select(program, name.name, &type_args, arg.ty(), name.span)?;
    Ok(BoundExpr::call(callable, *signature.ret, arg, name.span))
}

/// Resolve `fn name'TypeArgs (ParamTypes)` to a function value.
///
/// Only user functions (including generic instances) can be referenced.
pub fn resolve_function_ref<'ast>(
    program: &mut Program<'ast>,
    instancing: Option<&InstancingContext>,
    func_ref: &FuncRefExpr<'ast>,
) -> Result<BoundExpr> {
    let resolver = TypeResolver::new(program.unions()).with_instancing(instancing);
    let type_args = resolver.resolve_all(func_ref.name.type_args)?;
    let params = resolver.resolve_all(func_ref.param_types)?;
    let arg = Decl::tuple(params);

    let (callable, signature) =
        select(program, func_ref.name.name, &type_args, &arg, func_ref.span)?;
    match callable {
        Callable::Function(id) => Ok(BoundExpr::func_ref(
            id,
            Decl::Func(signature),
            func_ref.span,
        )),
        Callable::Intrinsic(_) | Callable::Foreign(_) => {
            Err(CompilationError::UnsupportedFunctionReference {
                name: func_ref.name.name.to_string(),
                span: func_ref.span,
            })
        }
    }
}

/// Pick the single candidate for `name` taking `arg`.
fn select(
    program: &mut Program<'_>,
    name: &str,
    type_args: &[Decl],
    arg: &Decl,
    span: Span,
) -> Result<(Callable, FuncType)> {
    let mut candidates = program.find_function(name, type_args, arg, span)?;

    if candidates.len() > 1 {
        let described: Vec<_> = candidates.iter().map(|c| program.describe(c)).collect();
        return Err(CompilationError::AmbiguousCall {
            name: name.to_string(),
            arg: arg.clone(),
            candidates: described.join(", "),
            span,
        });
    }

    let Some(candidate) = candidates.pop() else {
        return Err(CompilationError::NoSuchFunction {
            name: name.to_string(),
            arg: arg.clone(),
            span,
        });
    };
    program.commit(candidate, span)
}

/// Read a local. Parameters of multi-parameter functions read their field
/// of the argument slot.
pub fn load_local(local: &LocalVar, span: Span) -> BoundExpr {
    match &local.field {
        None => BoundExpr::local(local.slot, local.ty.clone(), span),
        Some(field) => BoundExpr::field(
            BoundExpr::local(local.slot, field.tuple.clone(), span),
            field.index,
            local.ty.clone(),
            span,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AstBuilder;
    use crate::bound::BoundExprKind;
    use bumpalo::Bump;

    #[test]
    fn local_wins_without_argument() {
        let mut program = Program::new();
        let mut scope = LocalScope::new();
        scope.define("x", Decl::Int, false, Span::default()).unwrap();

        let bound = resolve_name(
            &mut program,
            None,
            &scope,
            NameRef {
                name: "x",
                type_args: &[],
                span: Span::default(),
            },
            None,
        )
        .unwrap();
        assert_eq!(bound.kind(), &BoundExprKind::Local { slot: 0 });
        assert_eq!(bound.ty(), &Decl::Int);
    }

    #[test]
    fn unknown_name_is_no_such_function() {
        let mut program = Program::new();
        let scope = LocalScope::new();
        let result = resolve_name(
            &mut program,
            None,
            &scope,
            NameRef {
                name: "Missing",
                type_args: &[],
                span: Span::point(1, 1),
            },
            None,
        );
        assert_eq!(
            result,
            Err(CompilationError::NoSuchFunction {
                name: "Missing".into(),
                arg: Decl::Unit,
                span: Span::point(1, 1),
            })
        );
    }

    #[test]
    fn intrinsic_call_resolves() {
        let mut program = Program::new();
        let scope = LocalScope::new();
        let s = Span::default();
        let arg = BoundExpr::tuple(vec![BoundExpr::int(1, s), BoundExpr::int(2, s)], s);

        let bound = resolve_name(
            &mut program,
            None,
            &scope,
            NameRef {
                name: "<",
                type_args: &[],
                span: s,
            },
            Some(arg),
        )
        .unwrap();
        assert_eq!(bound.ty(), &Decl::Bool);
        assert!(matches!(
            bound.kind(),
            BoundExprKind::Call {
                callable: Callable::Intrinsic(_),
                ..
            }
        ));
    }

    #[test]
    fn intrinsic_reference_rejected() {
        let bump = Bump::new();
        let ast = AstBuilder::new(&bump);
        let mut program = Program::new();
        let expr = ast.func_ref("Size", &[], &[TypeExpr::String]);
        let crate::ast::Expr::FuncRef(func_ref) = expr else {
            unreachable!()
        };

        assert!(matches!(
            resolve_function_ref(&mut program, None, func_ref),
            Err(CompilationError::UnsupportedFunctionReference { .. })
        ));
    }
}
