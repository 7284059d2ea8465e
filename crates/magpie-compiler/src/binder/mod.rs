//! Function body binder.
//!
//! The [`FunctionBinder`] turns one function's unbound body into a
//! [`BoundExpr`] tree: names become local loads or resolved calls, and every
//! node gets its type. Binding is fail-fast. The first error aborts the
//! whole function.
//!
//! Construct-specific rules live in submodules:
//! - `calls` - calls, operators, indexing and function values
//! - `assignment` - stores and synthesized `name<-` setters
//! - `control` - `if` and `while`

mod assignment;
mod calls;
mod control;

use magpie_core::{CompilationError, Decl, FuncType, types_match};

use crate::ast::{
    ArrayExpr, BlockExpr, ConstructUnionExpr, DefineExpr, Expr, FunctionDecl, LiteralExpr,
    LiteralKind, TupleExpr,
};
use crate::bound::{BoundExpr, BoundFunction};
use crate::callable::FunctionId;
use crate::program::Program;
use crate::resolver::{self, NameRef};
use crate::scope::{LocalScope, ParamField};
use crate::template::InstancingContext;
use crate::type_resolver::TypeResolver;

type Result<T> = std::result::Result<T, CompilationError>;

/// Binds the body of a single function.
pub struct FunctionBinder<'b, 'ast> {
    /// Callables, consulted and extended (generic instances) while binding.
    program: &'b mut Program<'ast>,
    /// Display name of the function being bound.
    function: &'b str,
    /// Type-parameter mapping when binding a generic instance.
    instancing: Option<&'b InstancingContext>,
    scope: LocalScope,
}

impl<'b, 'ast> FunctionBinder<'b, 'ast> {
    /// Bind a function body against its resolved signature.
    ///
    /// Slot 0 holds the argument, if any. A single parameter names it directly;
    /// several parameters name the fields of the argument tuple. The body
    /// must have the declared return type unless it is a pre-bound
    /// [`Expr::Wrap`].
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn bind(
        program: &'b mut Program<'ast>,
        id: FunctionId,
        function: &'b str,
        decl: &'ast FunctionDecl<'ast>,
        signature: &FuncType,
        instancing: Option<&'b InstancingContext>,
    ) -> Result<BoundFunction> {
        let mut binder = Self {
            program,
            function,
            instancing,
            scope: LocalScope::new(),
        };

        binder.define_params(decl, signature)?;
        let body = binder.bind_expr(&decl.body)?;

        if !matches!(decl.body, Expr::Wrap(_)) && !types_match(&signature.ret, body.ty()) {
            return Err(CompilationError::ReturnTypeMismatch {
                function: binder.function.to_string(),
                declared: (*signature.ret).clone(),
                actual: body.ty().clone(),
                span: decl.span,
            });
        }

        Ok(BoundFunction {
            id,
            name: function.to_string(),
            params: signature.params.clone(),
            ret: (*signature.ret).clone(),
            body,
            num_locals: binder.scope.num_slots(),
        })
    }

    fn define_params(&mut self, decl: &FunctionDecl<'ast>, signature: &FuncType) -> Result<()> {
        if decl.params.is_empty() {
            return Ok(());
        }
        let arg = self.scope.reserve_slot();

        if let [param] = decl.params {
            return self
                .scope
                .define_param(param.name, signature.params[0].clone(), arg, None, decl.span);
        }

        let tuple = signature.arg_type();
        for (index, (param, ty)) in decl.params.iter().zip(&signature.params).enumerate() {
            let index = u8::try_from(index).map_err(|_| CompilationError::Internal {
                message: format!("'{}' has too many parameters", decl.name),
            })?;
            let field = ParamField {
                index,
                tuple: tuple.clone(),
            };
            self.scope
                .define_param(param.name, ty.clone(), arg, Some(field), decl.span)?;
        }
        Ok(())
    }

    /// Bind any expression.
    pub fn bind_expr(&mut self, expr: &Expr<'ast>) -> Result<BoundExpr> {
        match expr {
            Expr::Literal(lit) => Ok(bind_literal(lit)),
            Expr::Name(name) => self.resolve(name.into(), None),
            Expr::Call(call) => calls::bind_call(self, call),
            Expr::Array(array) => self.bind_array(array),
            Expr::Tuple(tuple) => self.bind_tuple(tuple),
            Expr::Block(block) => self.bind_block(block),
            Expr::Define(define) => self.bind_define(define),
            Expr::Assign(assign) => assignment::bind_assign(self, assign),
            Expr::IfThen(if_then) => control::bind_if_then(self, if_then),
            Expr::IfThenElse(if_then_else) => control::bind_if_then_else(self, if_then_else),
            Expr::While(while_do) => control::bind_while(self, while_do),
            Expr::Operator(op) => calls::bind_operator(self, op),
            Expr::FuncRef(func_ref) => {
                resolver::resolve_function_ref(self.program, self.instancing, func_ref)
            }
            Expr::ConstructUnion(construct) => self.bind_construct_union(construct),
            Expr::Wrap(bound) => Ok(BoundExpr::clone(bound)),
        }
    }

    fn resolve(&mut self, name: NameRef<'_, 'ast>, arg: Option<BoundExpr>) -> Result<BoundExpr> {
        resolver::resolve_name(self.program, self.instancing, &self.scope, name, arg)
    }

    fn types(&self) -> TypeResolver<'_> {
        TypeResolver::new(self.program.unions()).with_instancing(self.instancing)
    }

    // ==========================================================================
    // Aggregates
    // ==========================================================================

    fn bind_array(&mut self, array: &ArrayExpr<'ast>) -> Result<BoundExpr> {
        let declared = array
            .element_type
            .as_ref()
            .map(|ty| self.types().resolve(ty))
            .transpose()?;
        let elements = array
            .elements
            .iter()
            .map(|e| self.bind_expr(e))
            .collect::<Result<Vec<_>>>()?;

        let element = match declared {
            Some(declared) => declared,
            None => elements.first().map_or(Decl::Unit, |e| e.ty().clone()),
        };
        for (index, e) in elements.iter().enumerate() {
            if !types_match(&element, e.ty()) {
                return Err(CompilationError::InconsistentArrayElementType {
                    expected: element,
                    index,
                    actual: e.ty().clone(),
                    span: e.span(),
                });
            }
        }

        Ok(BoundExpr::array(
            element,
            elements,
            array.is_mutable,
            array.span,
        ))
    }

    fn bind_tuple(&mut self, tuple: &TupleExpr<'ast>) -> Result<BoundExpr> {
        let fields = tuple
            .fields
            .iter()
            .map(|f| self.bind_expr(f))
            .collect::<Result<Vec<_>>>()?;
        Ok(BoundExpr::tuple(fields, tuple.span))
    }

    // ==========================================================================
    // Blocks and locals
    // ==========================================================================

    fn bind_block(&mut self, block: &BlockExpr<'ast>) -> Result<BoundExpr> {
        self.scope.push();
        let exprs = self.bind_sequence(block.exprs);
        self.scope.pop();
        Ok(BoundExpr::block(exprs?, block.span))
    }

    /// Every expression but the last must be `Unit`.
    fn bind_sequence(&mut self, exprs: &[Expr<'ast>]) -> Result<Vec<BoundExpr>> {
        let mut bound = Vec::with_capacity(exprs.len());
        for (i, expr) in exprs.iter().enumerate() {
            let expr = self.bind_expr(expr)?;
            if i + 1 < exprs.len() && !expr.ty().is_unit() {
                return Err(CompilationError::NonUnitInSequence {
                    actual: expr.ty().clone(),
                    span: expr.span(),
                });
            }
            bound.push(expr);
        }
        Ok(bound)
    }

    fn bind_define(&mut self, define: &DefineExpr<'ast>) -> Result<BoundExpr> {
        if self.scope.is_defined_in_current_frame(define.name) {
            return Err(CompilationError::DuplicateLocal {
                name: define.name.to_string(),
                span: define.span,
            });
        }

        let value = self.bind_expr(&define.value)?;
        let slot = self.scope.define(
            define.name,
            value.ty().clone(),
            define.is_mutable,
            define.span,
        )?;
        Ok(BoundExpr::store_local(slot, value, define.span))
    }

    // ==========================================================================
    // Unions
    // ==========================================================================

    fn bind_construct_union(&mut self, construct: &ConstructUnionExpr<'ast>) -> Result<BoundExpr> {
        let ty = self.types().resolve(&construct.union)?;
        let Decl::Union(union) = &ty else {
            return Err(CompilationError::Internal {
                message: format!("union constructor for non-union type {ty}"),
            });
        };

        let cases = self
            .program
            .unions()
            .get(&union.name)
            .map_or(0, |u| u.cases.len());
        if usize::from(construct.case_index) >= cases {
            return Err(CompilationError::Internal {
                message: format!("{} has no case #{}", union.name, construct.case_index),
            });
        }

        Ok(BoundExpr::construct_union(
            ty,
            construct.case_index,
            construct.has_value,
            construct.span,
        ))
    }
}

fn bind_literal(lit: &LiteralExpr<'_>) -> BoundExpr {
    match lit.kind {
        LiteralKind::Null => BoundExpr::null(lit.span),
        LiteralKind::Unit => BoundExpr::unit(lit.span),
        LiteralKind::Bool(value) => BoundExpr::bool(value, lit.span),
        LiteralKind::Int(value) => BoundExpr::int(value, lit.span),
        LiteralKind::String(value) => BoundExpr::string(value, lit.span),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstBuilder, TypeExpr};
    use crate::bound::BoundExprKind;
    use crate::type_resolver::UnionDecl;
    use bumpalo::Bump;

    fn bind<'ast>(
        program: &mut Program<'ast>,
        decl: &'ast FunctionDecl<'ast>,
    ) -> Result<BoundFunction> {
        let id = program.add_function(decl)?;
        program.bind_function(id)?;
        Ok(program.bound(id).cloned().unwrap())
    }

    #[test]
    fn declared_element_type_checks_every_element() {
        let bump = Bump::new();
        let ast = AstBuilder::new(&bump);
        let body = ast.array_of(Some(TypeExpr::String), &[ast.int(1)], false);
        let decl = ast.function("Main", &[], TypeExpr::Unit, body);

        let err = bind(&mut Program::new(), decl).unwrap_err();
        assert!(matches!(
            err,
            CompilationError::InconsistentArrayElementType {
                index: 0,
                expected: Decl::String,
                ..
            }
        ));
    }

    #[test]
    fn empty_arrays() {
        let bump = Bump::new();
        let ast = AstBuilder::new(&bump);

        let typed = ast.function(
            "Typed",
            &[],
            ast.ty_array(TypeExpr::Int, true),
            ast.array_of(Some(TypeExpr::Int), &[], true),
        );
        let untyped = ast.function(
            "Untyped",
            &[],
            ast.ty_array(TypeExpr::Unit, false),
            ast.array(&[]),
        );

        let mut program = Program::new();
        assert_eq!(bind(&mut program, typed).unwrap().ret, Decl::array(Decl::Int, true));
        assert_eq!(
            bind(&mut program, untyped).unwrap().ret,
            Decl::array(Decl::Unit, false)
        );
    }

    #[test]
    fn tuple_type_from_fields() {
        let bump = Bump::new();
        let ast = AstBuilder::new(&bump);
        let body = ast.tuple(&[ast.int(1), ast.string("a")]);
        let decl = ast.function(
            "Pair",
            &[],
            ast.ty_tuple(&[TypeExpr::Int, TypeExpr::String]),
            body,
        );

        let bound = bind(&mut Program::new(), decl).unwrap();
        assert_eq!(bound.body.ty(), &Decl::tuple(vec![Decl::Int, Decl::String]));
    }

    #[test]
    fn parameter_frame_rejects_redefinition() {
        let bump = Bump::new();
        let ast = AstBuilder::new(&bump);
        let decl = ast.function(
            "F",
            &[("x", TypeExpr::Int)],
            TypeExpr::Unit,
            ast.define("x", ast.int(2)),
        );

        let err = bind(&mut Program::new(), decl).unwrap_err();
        assert!(matches!(err, CompilationError::DuplicateLocal { .. }));
    }

    #[test]
    fn block_may_shadow_parameter() {
        let bump = Bump::new();
        let ast = AstBuilder::new(&bump);
        let decl = ast.function(
            "F",
            &[("x", TypeExpr::Int)],
            TypeExpr::String,
            ast.block(&[ast.define("x", ast.string("s")), ast.name("x")]),
        );

        let bound = bind(&mut Program::new(), decl).unwrap();
        assert_eq!(bound.num_locals, 2);
        let BoundExprKind::Block(exprs) = bound.body.kind() else {
            panic!("expected block");
        };
        assert_eq!(exprs[1].kind(), &BoundExprKind::Local { slot: 1 });
    }

    #[test]
    fn union_case_out_of_range() {
        let bump = Bump::new();
        let ast = AstBuilder::new(&bump);
        let flag = ast.ty_named("Flag", &[]);
        let mut program = Program::new();
        program
            .register_union(UnionDecl::new("Flag", &[], &["Off", "On"]))
            .unwrap();

        let ok = ast.function("On", &[], flag, ast.construct_union(flag, 1, false));
        assert!(bind(&mut program, ok).is_ok());

        let bad = ast.function("Bad", &[], flag, ast.construct_union(flag, 2, false));
        assert!(matches!(
            bind(&mut program, bad),
            Err(CompilationError::Internal { .. })
        ));
    }
}
