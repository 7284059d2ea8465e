//! Resolution of type annotations to [`Decl`]s.

use magpie_core::{CompilationError, Decl, FuncType, Span};
use rustc_hash::FxHashMap;

use crate::ast::TypeExpr;
use crate::template::InstancingContext;

/// A declared union type.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionDecl {
    pub name: String,
    pub type_params: Vec<String>,
    /// Case names, indexed by case number.
    pub cases: Vec<String>,
}

impl UnionDecl {
    pub fn new(name: impl Into<String>, type_params: &[&str], cases: &[&str]) -> Self {
        Self {
            name: name.into(),
            type_params: type_params.iter().map(|p| p.to_string()).collect(),
            cases: cases.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Resolves [`TypeExpr`]s in one context.
///
/// Named types are looked up in order: the instancing context's type
/// parameters, the type parameters of the generic being declared, then
/// declared unions.
#[derive(Clone, Copy)]
pub struct TypeResolver<'a> {
    unions: &'a FxHashMap<String, UnionDecl>,
    instancing: Option<&'a InstancingContext>,
    type_params: &'a [&'a str],
}

impl<'a> TypeResolver<'a> {
    pub fn new(unions: &'a FxHashMap<String, UnionDecl>) -> Self {
        Self {
            unions,
            instancing: None,
            type_params: &[],
        }
    }

    /// Substitute the instance's type arguments for its type parameters.
    pub fn with_instancing(self, instancing: Option<&'a InstancingContext>) -> Self {
        Self { instancing, ..self }
    }

    /// Resolve these names to unsubstituted [`Decl::Generic`] parameters.
    pub fn with_type_params(self, type_params: &'a [&'a str]) -> Self {
        Self {
            type_params,
            ..self
        }
    }

    pub fn resolve(&self, ty: &TypeExpr<'_>) -> Result<Decl, CompilationError> {
        Ok(match ty {
            TypeExpr::Unit => Decl::Unit,
            TypeExpr::Bool => Decl::Bool,
            TypeExpr::Int => Decl::Int,
            TypeExpr::String => Decl::String,
            TypeExpr::Named { name, args, span } => self.resolve_named(name, args, *span)?,
            TypeExpr::Array {
                element,
                is_mutable,
            } => Decl::array(self.resolve(element)?, *is_mutable),
            TypeExpr::Tuple(fields) => Decl::tuple(self.resolve_all(fields)?),
            TypeExpr::Func { params, ret } => {
                Decl::Func(FuncType::new(self.resolve_all(params)?, self.resolve(ret)?))
            }
        })
    }

    pub fn resolve_all(&self, types: &[TypeExpr<'_>]) -> Result<Vec<Decl>, CompilationError> {
        types.iter().map(|t| self.resolve(t)).collect()
    }

    fn resolve_named(
        &self,
        name: &str,
        args: &[TypeExpr<'_>],
        span: Span,
    ) -> Result<Decl, CompilationError> {
        if args.is_empty() {
            if let Some(decl) = self.instancing.and_then(|i| i.lookup(name)) {
                return Ok(decl.clone());
            }
            if self.type_params.iter().any(|p| *p == name) {
                return Ok(Decl::generic(name));
            }
        }

        let Some(union) = self.unions.get(name) else {
            return Err(CompilationError::UnknownType {
                name: name.to_string(),
                span,
            });
        };
        if union.type_params.len() != args.len() {
            return Err(CompilationError::TypeArgCountMismatch {
                name: name.to_string(),
                expected: union.type_params.len(),
                got: args.len(),
                span,
            });
        }
        Ok(Decl::union(name, self.resolve_all(args)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AstBuilder;
    use bumpalo::Bump;

    fn unions() -> FxHashMap<String, UnionDecl> {
        let mut unions = FxHashMap::default();
        unions.insert(
            "Option".to_string(),
            UnionDecl::new("Option", &["T"], &["None", "Some"]),
        );
        unions
    }

    #[test]
    fn resolves_structural_types() {
        let bump = Bump::new();
        let ast = AstBuilder::new(&bump);
        let unions = unions();
        let resolver = TypeResolver::new(&unions);

        let ty = ast.ty_func(
            &[ast.ty_array(TypeExpr::Int, true)],
            ast.ty_tuple(&[TypeExpr::Bool, TypeExpr::String]),
        );
        assert_eq!(
            resolver.resolve(&ty).unwrap(),
            Decl::func(
                vec![Decl::array(Decl::Int, true)],
                Decl::Tuple(vec![Decl::Bool, Decl::String]),
            )
        );
    }

    #[test]
    fn instancing_context_wins() {
        let bump = Bump::new();
        let ast = AstBuilder::new(&bump);
        let unions = unions();
        let context = InstancingContext {
            template_name: "Wrap".into(),
            type_params: vec!["T".into()],
            type_args: vec![Decl::Int],
        };
        let resolver = TypeResolver::new(&unions).with_instancing(Some(&context));

        let ty = ast.ty_named("Option", &[ast.ty_named("T", &[])]);
        assert_eq!(
            resolver.resolve(&ty).unwrap(),
            Decl::union("Option", vec![Decl::Int])
        );
    }

    #[test]
    fn declared_type_params_stay_generic() {
        let bump = Bump::new();
        let ast = AstBuilder::new(&bump);
        let unions = unions();
        let params = ["T"];
        let resolver = TypeResolver::new(&unions).with_type_params(&params);

        assert_eq!(
            resolver.resolve(&ast.ty_named("T", &[])).unwrap(),
            Decl::generic("T")
        );
    }

    #[test]
    fn unknown_and_arity_errors() {
        let bump = Bump::new();
        let ast = AstBuilder::new(&bump);
        let unions = unions();
        let resolver = TypeResolver::new(&unions);

        assert!(matches!(
            resolver.resolve(&ast.ty_named("Nope", &[])),
            Err(CompilationError::UnknownType { .. })
        ));
        assert!(matches!(
            resolver.resolve(&ast.ty_named("Option", &[])),
            Err(CompilationError::TypeArgCountMismatch {
                expected: 1,
                got: 0,
                ..
            })
        ));
    }
}
