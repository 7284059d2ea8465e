//! The program being compiled: every callable and its binding state.
//!
//! Functions are bound on demand. Resolving a call to a function that has
//! not been bound yet binds it first, so by the time a whole-program pass
//! finishes every reachable function, including generic instances created
//! along the way, is in its final state.

use magpie_core::{CompilationError, Decl, FuncType, Span, lists_match, params_match};
use rustc_hash::FxHashMap;

use crate::ast::FunctionDecl;
use crate::binder::FunctionBinder;
use crate::bound::BoundFunction;
use crate::callable::{Callable, ForeignFunction, FunctionId, FunctionKind, GenericId};
use crate::intrinsics;
use crate::template::{
    Inference, InstanceCache, InstancingContext, build_substitution_map, infer_type_args,
    substitute_params, substitute_signature,
};
use crate::type_resolver::{TypeResolver, UnionDecl};

/// Deepest type argument an instance may be created with. Only reached by
/// generics that call themselves at an ever larger type.
const MAX_INSTANCE_TYPE_DEPTH: usize = 32;

// ============================================================================
// Types
// ============================================================================

/// Binding progress of one function.
#[derive(Debug, Clone, PartialEq)]
pub enum BindState {
    Unbound,
    /// Being bound further up the stack. Calls to it resolve against its
    /// signature.
    InProgress,
    Bound(BoundFunction),
    /// Binding failed with this error. Never retried.
    Failed(CompilationError),
}

/// A user function or generic instance.
#[derive(Debug)]
pub struct FunctionEntry<'ast> {
    name: String,
    decl: &'ast FunctionDecl<'ast>,
    signature: FuncType,
    kind: FunctionKind,
    instancing: Option<InstancingContext>,
    state: BindState,
}

impl<'ast> FunctionEntry<'ast> {
    /// Display name. Instances include their type arguments.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn decl(&self) -> &'ast FunctionDecl<'ast> {
        self.decl
    }

    pub fn signature(&self) -> &FuncType {
        &self.signature
    }

    pub fn kind(&self) -> FunctionKind {
        self.kind
    }

    pub fn instancing(&self) -> Option<&InstancingContext> {
        self.instancing.as_ref()
    }

    pub fn state(&self) -> &BindState {
        &self.state
    }
}

/// A generic function template. Never bound itself; see [`InstancingContext`].
#[derive(Debug)]
struct GenericFunction<'ast> {
    decl: &'ast FunctionDecl<'ast>,
    type_params: Vec<String>,
    /// Signature with [`Decl::Generic`] placeholders.
    signature: FuncType,
}

/// A callable matching a name and argument type.
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    Callable(Callable),
    /// A generic template with the type arguments it would be instanced with.
    Generic { id: GenericId, type_args: Vec<Decl> },
}

/// Outcome of binding a whole program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindResult {
    /// One error per failed function, in function order.
    pub errors: Vec<CompilationError>,
}

impl BindResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

// ============================================================================
// Program
// ============================================================================

/// All callables of a program plus the union types they refer to.
#[derive(Debug)]
pub struct Program<'ast> {
    functions: Vec<FunctionEntry<'ast>>,
    functions_by_name: FxHashMap<String, Vec<FunctionId>>,
    generics: Vec<GenericFunction<'ast>>,
    generics_by_name: FxHashMap<String, Vec<GenericId>>,
    instances: InstanceCache,
    foreign: FxHashMap<String, Vec<ForeignFunction>>,
    unions: FxHashMap<String, UnionDecl>,
    intrinsics_enabled: bool,
}

impl Default for Program<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'ast> Program<'ast> {
    /// An empty program with the built-in intrinsics available.
    pub fn new() -> Self {
        Self {
            functions: Vec::new(),
            functions_by_name: FxHashMap::default(),
            generics: Vec::new(),
            generics_by_name: FxHashMap::default(),
            instances: InstanceCache::new(),
            foreign: FxHashMap::default(),
            unions: FxHashMap::default(),
            intrinsics_enabled: true,
        }
    }

    /// An empty program where only registered callables resolve.
    pub fn without_intrinsics() -> Self {
        Self {
            intrinsics_enabled: false,
            ..Self::new()
        }
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Declare a union type. Register unions before the functions that
    /// mention them.
    pub fn register_union(&mut self, union: UnionDecl) -> Result<(), CompilationError> {
        if self.unions.contains_key(&union.name) {
            return Err(CompilationError::DuplicateType {
                name: union.name,
                span: Span::default(),
            });
        }
        self.unions.insert(union.name.clone(), union);
        Ok(())
    }

    /// Make a host function callable.
    pub fn register_foreign(&mut self, function: ForeignFunction) -> Result<(), CompilationError> {
        let overloads = self.foreign.entry(function.name.clone()).or_default();
        if overloads
            .iter()
            .any(|f| lists_match(&f.signature.params, &function.signature.params))
        {
            return Err(CompilationError::DuplicateFunction {
                arg: function.signature.arg_type(),
                name: function.name,
                span: Span::default(),
            });
        }
        overloads.push(function);
        Ok(())
    }

    /// Add a non-generic function. Its signature is resolved immediately;
    /// the body is bound later.
    pub fn add_function(
        &mut self,
        decl: &'ast FunctionDecl<'ast>,
    ) -> Result<FunctionId, CompilationError> {
        if !decl.type_params.is_empty() {
            return Err(CompilationError::Internal {
                message: format!("generic function '{}' must be added as a generic", decl.name),
            });
        }

        let signature = self.resolve_signature(decl, &TypeResolver::new(&self.unions))?;
        let overloads = self.functions_by_name.get(decl.name).map_or(&[][..], Vec::as_slice);
        if overloads
            .iter()
            .any(|id| lists_match(&self.functions[id.index()].signature.params, &signature.params))
        {
            return Err(CompilationError::DuplicateFunction {
                name: decl.name.to_string(),
                arg: signature.arg_type(),
                span: decl.span,
            });
        }

        let id = self.push_entry(decl.name.to_string(), decl, signature, None);
        self.functions_by_name
            .entry(decl.name.to_string())
            .or_default()
            .push(id);
        Ok(id)
    }

    /// Add a generic function template.
    pub fn add_generic(
        &mut self,
        decl: &'ast FunctionDecl<'ast>,
    ) -> Result<GenericId, CompilationError> {
        let resolver = TypeResolver::new(&self.unions).with_type_params(decl.type_params);
        let signature = self.resolve_signature(decl, &resolver)?;
        let type_params: Vec<String> = decl.type_params.iter().map(|p| p.to_string()).collect();

        let overloads = self.generics_by_name.get(decl.name).map_or(&[][..], Vec::as_slice);
        if overloads.iter().any(|id| {
            let other = &self.generics[id.index()];
            other.type_params == type_params && lists_match(&other.signature.params, &signature.params)
        }) {
            return Err(CompilationError::DuplicateFunction {
                name: decl.name.to_string(),
                arg: signature.arg_type(),
                span: decl.span,
            });
        }

        let id = GenericId(self.generics.len() as u32);
        self.generics.push(GenericFunction {
            decl,
            type_params,
            signature,
        });
        self.generics_by_name
            .entry(decl.name.to_string())
            .or_default()
            .push(id);
        Ok(id)
    }

    fn resolve_signature(
        &self,
        decl: &FunctionDecl<'_>,
        resolver: &TypeResolver<'_>,
    ) -> Result<FuncType, CompilationError> {
        let params = decl
            .params
            .iter()
            .map(|p| resolver.resolve(&p.ty))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FuncType::new(params, resolver.resolve(&decl.return_type)?))
    }

    fn push_entry(
        &mut self,
        name: String,
        decl: &'ast FunctionDecl<'ast>,
        signature: FuncType,
        instancing: Option<InstancingContext>,
    ) -> FunctionId {
        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(FunctionEntry {
            kind: FunctionKind::of(decl.name),
            name,
            decl,
            signature,
            instancing,
            state: BindState::Unbound,
        });
        id
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// First non-generic function registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<FunctionId> {
        self.functions_by_name
            .get(name)
            .and_then(|ids| ids.first())
            .copied()
    }

    pub fn function(&self, id: FunctionId) -> Option<&FunctionEntry<'ast>> {
        self.functions.get(id.index())
    }

    /// The bound form of a function, once binding succeeded.
    pub fn bound(&self, id: FunctionId) -> Option<&BoundFunction> {
        match &self.functions.get(id.index())?.state {
            BindState::Bound(bound) => Some(bound),
            _ => None,
        }
    }

    /// Every function entry with its id, instances included.
    pub fn functions(&self) -> impl Iterator<Item = (FunctionId, &FunctionEntry<'ast>)> {
        self.functions
            .iter()
            .enumerate()
            .map(|(i, f)| (FunctionId(i as u32), f))
    }

    /// Number of generic instances created so far.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn unions(&self) -> &FxHashMap<String, UnionDecl> {
        &self.unions
    }

    /// Every callable named `name` that accepts `arg`.
    ///
    /// Without explicit type arguments this considers user functions,
    /// intrinsics, foreign functions, and generic templates whose type
    /// arguments can be inferred from `arg`. With explicit type arguments
    /// only generic templates of that arity are considered.
    ///
    /// # Errors
    /// When nothing matches but a generic template came close: its type
    /// arguments could not be inferred, or it takes a different number of
    /// explicit type arguments.
    pub fn find_function(
        &self,
        name: &str,
        type_args: &[Decl],
        arg: &Decl,
        span: Span,
    ) -> Result<Vec<Candidate>, CompilationError> {
        let mut candidates = Vec::new();

        if type_args.is_empty() {
            for id in self.functions_by_name.get(name).into_iter().flatten() {
                if params_match(&self.functions[id.index()].signature.params, arg) {
                    candidates.push(Candidate::Callable(Callable::Function(*id)));
                }
            }
            if self.intrinsics_enabled {
                candidates.extend(
                    intrinsics::lookup(name)
                        .filter(|i| params_match(i.params, arg))
                        .map(|i| Candidate::Callable(Callable::Intrinsic(i))),
                );
            }
            for function in self.foreign.get(name).into_iter().flatten() {
                if params_match(&function.signature.params, arg) {
                    candidates.push(Candidate::Callable(Callable::Foreign(function.clone())));
                }
            }
        }

        let mut undetermined = None;
        let mut expected_arity = None;
        for id in self.generics_by_name.get(name).into_iter().flatten() {
            let generic = &self.generics[id.index()];
            if type_args.is_empty() {
                match infer_type_args(&generic.type_params, &generic.signature.params, arg) {
                    Inference::Inferred(inferred) => candidates.push(Candidate::Generic {
                        id: *id,
                        type_args: inferred,
                    }),
                    Inference::Undetermined(param) => undetermined = Some(param),
                    Inference::Mismatch => {}
                }
            } else if generic.type_params.len() != type_args.len() {
                expected_arity = Some(generic.type_params.len());
            } else {
                let map = build_substitution_map(name, &generic.type_params, type_args, span)?;
                if params_match(&substitute_params(&generic.signature.params, &map), arg) {
                    candidates.push(Candidate::Generic {
                        id: *id,
                        type_args: type_args.to_vec(),
                    });
                }
            }
        }

        if candidates.is_empty() {
            if let Some(param) = undetermined {
                return Err(CompilationError::CannotInferTypeArgs {
                    name: name.to_string(),
                    param,
                    arg: arg.clone(),
                    span,
                });
            }
            if let Some(expected) = expected_arity {
                return Err(CompilationError::TypeArgCountMismatch {
                    name: name.to_string(),
                    expected,
                    got: type_args.len(),
                    span,
                });
            }
        }

        Ok(candidates)
    }

    /// One-line description of a candidate for diagnostics.
    pub fn describe(&self, candidate: &Candidate) -> String {
        match candidate {
            Candidate::Callable(Callable::Function(id)) => {
                let entry = &self.functions[id.index()];
                format!("{} {}", entry.name, Decl::Func(entry.signature.clone()))
            }
            Candidate::Callable(Callable::Intrinsic(i)) => format!(
                "intrinsic {} {}",
                i.name,
                Decl::func(i.params.to_vec(), i.ret.clone())
            ),
            Candidate::Callable(Callable::Foreign(f)) => {
                format!("foreign {} {}", f.name, Decl::Func(f.signature.clone()))
            }
            Candidate::Generic { id, type_args } => {
                let generic = &self.generics[id.index()];
                format!(
                    "{} {}",
                    crate::template::format_instance_name(generic.decl.name, type_args),
                    Decl::Func(generic.signature.clone())
                )
            }
        }
    }

    /// Signature of a resolved callable.
    pub fn signature_of(&self, callable: &Callable) -> FuncType {
        match callable {
            Callable::Function(id) => self.functions[id.index()].signature.clone(),
            Callable::Intrinsic(i) => FuncType::new(i.params.to_vec(), i.ret.clone()),
            Callable::Foreign(f) => f.signature.clone(),
        }
    }

    /// Turn a chosen candidate into a callable, instancing generics and
    /// binding user functions that are still unbound.
    pub(crate) fn commit(
        &mut self,
        candidate: Candidate,
        span: Span,
    ) -> Result<(Callable, FuncType), CompilationError> {
        let callable = match candidate {
            Candidate::Callable(callable) => callable,
            Candidate::Generic { id, type_args } => {
                Callable::Function(self.instantiate(id, type_args, span)?)
            }
        };
        if let Callable::Function(id) = &callable {
            self.request_binding(*id);
        }
        let signature = self.signature_of(&callable);
        Ok((callable, signature))
    }

    // ==========================================================================
    // Instancing
    // ==========================================================================

    /// The instance of a generic template for concrete type arguments,
    /// created on first request.
    ///
    /// # Errors
    /// An unknown template, the wrong number of type arguments, or a type
    /// argument nested deeper than the instancing limit.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn instantiate(
        &mut self,
        id: GenericId,
        type_args: Vec<Decl>,
        span: Span,
    ) -> Result<FunctionId, CompilationError> {
        let generic = self
            .generics
            .get(id.index())
            .ok_or_else(|| CompilationError::Internal {
                message: format!("unknown generic function #{}", id.0),
            })?;

        let arg_hashes: Vec<_> = type_args.iter().map(Decl::type_hash).collect();
        if let Some(instance) = self.instances.get(id, &arg_hashes) {
            return Ok(instance);
        }

        if let Some(deep) = type_args
            .iter()
            .find(|arg| arg.depth() > MAX_INSTANCE_TYPE_DEPTH)
        {
            return Err(CompilationError::Internal {
                message: format!(
                    "instancing '{}' with {} exceeds the type nesting limit of {}",
                    generic.decl.name, deep, MAX_INSTANCE_TYPE_DEPTH
                ),
            });
        }

        let map = build_substitution_map(generic.decl.name, &generic.type_params, &type_args, span)?;
        let signature = substitute_signature(&generic.signature, &map);
        let decl = generic.decl;
        let instancing = InstancingContext {
            template_name: decl.name.to_string(),
            type_params: generic.type_params.clone(),
            type_args,
        };

        let instance = self.push_entry(instancing.instance_name(), decl, signature, Some(instancing));
        self.instances.insert(id, arg_hashes, instance);
        Ok(instance)
    }

    // ==========================================================================
    // Binding
    // ==========================================================================

    /// Bind a function that is still unbound. A failure is recorded on the
    /// function itself, not on the caller that triggered it.
    fn request_binding(&mut self, id: FunctionId) {
        if matches!(self.functions[id.index()].state, BindState::Unbound) {
            // Errors stay in the entry's Failed state.
            self.bind_function(id).ok();
        }
    }

    /// Bind one function's body.
    ///
    /// Already bound or in-progress functions are left as they are. A
    /// function that failed before returns its original error.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn bind_function(&mut self, id: FunctionId) -> Result<(), CompilationError> {
        let entry = self
            .functions
            .get_mut(id.index())
            .ok_or_else(|| CompilationError::Internal {
                message: format!("unknown function {id}"),
            })?;

        match &entry.state {
            BindState::Bound(_) | BindState::InProgress => return Ok(()),
            BindState::Failed(err) => return Err(err.clone()),
            BindState::Unbound => {}
        }

        entry.state = BindState::InProgress;
        let decl = entry.decl;
        let name = entry.name.clone();
        let signature = entry.signature.clone();
        let instancing = entry.instancing.clone();

        let result = FunctionBinder::bind(self, id, &name, decl, &signature, instancing.as_ref());

        let entry = &mut self.functions[id.index()];
        match result {
            Ok(bound) => {
                entry.state = BindState::Bound(bound);
                Ok(())
            }
            Err(err) => {
                entry.state = BindState::Failed(err.clone());
                Err(err)
            }
        }
    }

    /// Bind every function, continuing past failures.
    ///
    /// Generic instances created while binding are bound too.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn bind_all(&mut self) -> BindResult {
        let mut index = 0;
        while index < self.functions.len() {
            self.request_binding(FunctionId(index as u32));
            index += 1;
        }

        let errors = self
            .functions
            .iter()
            .filter_map(|f| match &f.state {
                BindState::Failed(err) => Some(err.clone()),
                _ => None,
            })
            .collect();
        BindResult { errors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstBuilder, TypeExpr};
    use bumpalo::Bump;

    #[test]
    fn duplicate_function_rejected() {
        let bump = Bump::new();
        let ast = AstBuilder::new(&bump);
        let mut program = Program::new();

        let a = ast.function("F", &[("x", TypeExpr::Int)], TypeExpr::Int, ast.name("x"));
        let b = ast.function("F", &[("y", TypeExpr::Int)], TypeExpr::Int, ast.int(0));
        let c = ast.function("F", &[("y", TypeExpr::Bool)], TypeExpr::Int, ast.int(0));

        program.add_function(a).unwrap();
        assert!(matches!(
            program.add_function(b),
            Err(CompilationError::DuplicateFunction { .. })
        ));
        program.add_function(c).unwrap();
    }

    #[test]
    fn generic_must_use_add_generic() {
        let bump = Bump::new();
        let ast = AstBuilder::new(&bump);
        let mut program = Program::new();
        let id = ast.generic_function(
            "Id",
            &["T"],
            &[("x", ast.ty_named("T", &[]))],
            ast.ty_named("T", &[]),
            ast.name("x"),
        );

        assert!(matches!(
            program.add_function(id),
            Err(CompilationError::Internal { .. })
        ));
        program.add_generic(id).unwrap();
    }

    #[test]
    fn find_function_includes_intrinsics() {
        let program = Program::new();
        let arg = Decl::Tuple(vec![Decl::Int, Decl::Int]);
        let found = program.find_function("+", &[], &arg, Span::default()).unwrap();
        assert_eq!(found.len(), 1);

        let bare = Program::without_intrinsics();
        assert!(bare.find_function("+", &[], &arg, Span::default()).unwrap().is_empty());
    }

    #[test]
    fn foreign_functions_resolve() {
        let mut program = Program::without_intrinsics();
        program
            .register_foreign(ForeignFunction::new("Now", 7, vec![], Decl::Int))
            .unwrap();
        assert!(
            program
                .register_foreign(ForeignFunction::new("Now", 8, vec![], Decl::Int))
                .is_err()
        );

        let found = program
            .find_function("Now", &[], &Decl::Unit, Span::default())
            .unwrap();
        assert!(matches!(
            found.as_slice(),
            [Candidate::Callable(Callable::Foreign(f))] if f.id == 7
        ));
    }

    #[test]
    fn duplicate_union_rejected() {
        let mut program = Program::new();
        program
            .register_union(UnionDecl::new("Option", &["T"], &["None", "Some"]))
            .unwrap();
        assert!(matches!(
            program.register_union(UnionDecl::new("Option", &[], &["X"])),
            Err(CompilationError::DuplicateType { .. })
        ));
    }

    #[test]
    fn instances_are_memoized() {
        let bump = Bump::new();
        let ast = AstBuilder::new(&bump);
        let mut program = Program::new();
        let t = ast.ty_named("T", &[]);
        let generic = program
            .add_generic(ast.generic_function("Id", &["T"], &[("x", t)], t, ast.name("x")))
            .unwrap();

        let a = program.instantiate(generic, vec![Decl::Int], Span::default()).unwrap();
        let b = program.instantiate(generic, vec![Decl::Int], Span::default()).unwrap();
        let c = program.instantiate(generic, vec![Decl::Bool], Span::default()).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(program.instance_count(), 2);
        assert_eq!(program.function(a).unwrap().name(), "Id'Int");
        assert_eq!(
            program.function(c).unwrap().signature(),
            &FuncType::new(vec![Decl::Bool], Decl::Bool)
        );
    }

    #[test]
    fn same_signature_templates_keep_separate_instances() {
        let bump = Bump::new();
        let ast = AstBuilder::new(&bump);
        let mut program = Program::new();
        let t = ast.ty_named("T", &[]);
        let u = ast.ty_named("U", &[]);
        let f = program
            .add_generic(ast.generic_function(
                "F",
                &["T"],
                &[("x", TypeExpr::Int)],
                t,
                ast.int(0),
            ))
            .unwrap();
        let g = program
            .add_generic(ast.generic_function(
                "F",
                &["U"],
                &[("x", TypeExpr::Int)],
                u,
                ast.int(0),
            ))
            .unwrap();

        let from_f = program.instantiate(f, vec![Decl::Bool], Span::default()).unwrap();
        let from_g = program.instantiate(g, vec![Decl::Bool], Span::default()).unwrap();

        assert_ne!(from_f, from_g);
        assert_eq!(program.instance_count(), 2);
        let instancing = program.function(from_g).unwrap().instancing().unwrap();
        assert_eq!(instancing.type_params, ["U"]);
    }

    #[test]
    fn polymorphic_recursion_stops_at_depth_limit() {
        let bump = Bump::new();
        let ast = AstBuilder::new(&bump);
        let mut program = Program::new();
        let t = ast.ty_named("T", &[]);
        // Nest'T (x T) calls itself with [x], a new instance at every level.
        program
            .add_generic(ast.generic_function(
                "Nest",
                &["T"],
                &[("x", t)],
                TypeExpr::Unit,
                ast.call_named("Nest", ast.array(&[ast.name("x")])),
            ))
            .unwrap();
        let main = program
            .add_function(ast.function(
                "Main",
                &[],
                TypeExpr::Unit,
                ast.call_named("Nest", ast.int(1)),
            ))
            .unwrap();

        let result = program.bind_all();
        assert!(program.bound(main).is_some());
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(
            &result.errors[0],
            CompilationError::Internal { message } if message.contains("nesting limit")
        ));
        assert_eq!(program.instance_count(), MAX_INSTANCE_TYPE_DEPTH);
    }

    #[test]
    fn explicit_type_arg_count_checked() {
        let bump = Bump::new();
        let ast = AstBuilder::new(&bump);
        let mut program = Program::new();
        let t = ast.ty_named("T", &[]);
        program
            .add_generic(ast.generic_function("Id", &["T"], &[("x", t)], t, ast.name("x")))
            .unwrap();

        let result =
            program.find_function("Id", &[Decl::Int, Decl::Int], &Decl::Int, Span::default());
        assert!(matches!(
            result,
            Err(CompilationError::TypeArgCountMismatch {
                expected: 1,
                got: 2,
                ..
            })
        ));
    }
}
