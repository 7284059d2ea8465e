//! Type substitution and inference for generic instancing.

use magpie_core::{CompilationError, Decl, FuncType, Span, UnionRef};
use rustc_hash::FxHashMap;

/// Map from type parameter name to concrete type.
pub type SubstitutionMap = FxHashMap<String, Decl>;

/// Build a substitution map from type parameters and type arguments.
///
/// # Errors
/// Returns error if the number of arguments doesn't match parameters.
pub fn build_substitution_map(
    name: &str,
    type_params: &[String],
    type_args: &[Decl],
    span: Span,
) -> Result<SubstitutionMap, CompilationError> {
    if type_params.len() != type_args.len() {
        return Err(CompilationError::TypeArgCountMismatch {
            name: name.to_string(),
            expected: type_params.len(),
            got: type_args.len(),
            span,
        });
    }

    Ok(type_params
        .iter()
        .cloned()
        .zip(type_args.iter().cloned())
        .collect())
}

/// Replace every type parameter in `decl` that appears in the map.
pub fn substitute_type(decl: &Decl, map: &SubstitutionMap) -> Decl {
    match decl {
        Decl::Generic(name) => map.get(name).cloned().unwrap_or_else(|| decl.clone()),
        Decl::Unit | Decl::Bool | Decl::Int | Decl::String => decl.clone(),
        Decl::Func(func) => Decl::Func(substitute_signature(func, map)),
        Decl::Array(array) => Decl::array(substitute_type(&array.element, map), array.is_mutable),
        Decl::Tuple(fields) => Decl::Tuple(substitute_params(fields, map)),
        Decl::Union(union) => Decl::Union(UnionRef {
            name: union.name.clone(),
            type_args: substitute_params(&union.type_args, map),
        }),
    }
}

pub fn substitute_params(params: &[Decl], map: &SubstitutionMap) -> Vec<Decl> {
    params.iter().map(|p| substitute_type(p, map)).collect()
}

pub fn substitute_signature(func: &FuncType, map: &SubstitutionMap) -> FuncType {
    FuncType::new(
        substitute_params(&func.params, map),
        substitute_type(&func.ret, map),
    )
}

/// Outcome of inferring type arguments from an argument type.
#[derive(Debug, Clone, PartialEq)]
pub enum Inference {
    /// Every type parameter was determined, in declaration order.
    Inferred(Vec<Decl>),
    /// The argument does not have the shape of the parameter list.
    Mismatch,
    /// The shapes agree but this type parameter appears nowhere it could be
    /// read from.
    Undetermined(String),
}

/// Infer type arguments by unifying `params` against `arg`.
///
/// A single parameter unifies with the whole argument, others with the
/// expanded argument, the same way [`magpie_core::params_match`] pairs them.
pub fn infer_type_args(type_params: &[String], params: &[Decl], arg: &Decl) -> Inference {
    let actual = match params {
        [_] => std::slice::from_ref(arg),
        _ => arg.expanded(),
    };
    if params.len() != actual.len() {
        return Inference::Mismatch;
    }

    let mut bindings = SubstitutionMap::default();
    for (pattern, actual) in params.iter().zip(actual) {
        if !unify(pattern, actual, type_params, &mut bindings) {
            return Inference::Mismatch;
        }
    }

    let mut args = Vec::with_capacity(type_params.len());
    for param in type_params {
        match bindings.remove(param) {
            Some(decl) => args.push(decl),
            None => return Inference::Undetermined(param.clone()),
        }
    }
    Inference::Inferred(args)
}

fn unify(
    pattern: &Decl,
    actual: &Decl,
    type_params: &[String],
    bindings: &mut SubstitutionMap,
) -> bool {
    match (pattern, actual) {
        (Decl::Generic(name), _) if type_params.contains(name) => match bindings.get(name) {
            Some(bound) => bound == actual,
            None => {
                bindings.insert(name.clone(), actual.clone());
                true
            }
        },
        (Decl::Func(p), Decl::Func(a)) => {
            p.params.len() == a.params.len()
                && p.params
                    .iter()
                    .zip(&a.params)
                    .all(|(p, a)| unify(p, a, type_params, bindings))
                && unify(&p.ret, &a.ret, type_params, bindings)
        }
        (Decl::Array(p), Decl::Array(a)) => {
            p.is_mutable == a.is_mutable && unify(&p.element, &a.element, type_params, bindings)
        }
        (Decl::Tuple(p), Decl::Tuple(a)) => {
            p.len() == a.len()
                && p.iter()
                    .zip(a)
                    .all(|(p, a)| unify(p, a, type_params, bindings))
        }
        (Decl::Union(p), Decl::Union(a)) => {
            p.name == a.name
                && p.type_args.len() == a.type_args.len()
                && p.type_args
                    .iter()
                    .zip(&a.type_args)
                    .all(|(p, a)| unify(p, a, type_params, bindings))
        }
        _ => pattern == actual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn count_mismatch() {
        let result = build_substitution_map("Id", &params(&["T"]), &[], Span::default());
        assert!(matches!(
            result,
            Err(CompilationError::TypeArgCountMismatch {
                expected: 1,
                got: 0,
                ..
            })
        ));
    }

    #[test]
    fn substitutes_nested() {
        let map = build_substitution_map("F", &params(&["T"]), &[Decl::Int], Span::default())
            .unwrap();
        let decl = Decl::func(
            vec![Decl::array(Decl::generic("T"), true)],
            Decl::union("Option", vec![Decl::generic("T")]),
        );
        assert_eq!(
            substitute_type(&decl, &map),
            Decl::func(
                vec![Decl::array(Decl::Int, true)],
                Decl::union("Option", vec![Decl::Int]),
            )
        );
    }

    #[test]
    fn infers_from_tuple_argument() {
        let type_params = params(&["A", "B"]);
        let generic = [Decl::generic("A"), Decl::array(Decl::generic("B"), false)];
        let arg = Decl::Tuple(vec![Decl::Int, Decl::array(Decl::String, false)]);
        assert_eq!(
            infer_type_args(&type_params, &generic, &arg),
            Inference::Inferred(vec![Decl::Int, Decl::String])
        );
    }

    #[test]
    fn single_parameter_binds_whole_tuple() {
        let type_params = params(&["T"]);
        let generic = [Decl::generic("T")];
        let pair = Decl::Tuple(vec![Decl::Int, Decl::Bool]);
        assert_eq!(
            infer_type_args(&type_params, &generic, &pair),
            Inference::Inferred(vec![pair.clone()])
        );
        assert_eq!(
            infer_type_args(&type_params, &generic, &Decl::Unit),
            Inference::Inferred(vec![Decl::Unit])
        );
    }

    #[test]
    fn conflicting_bindings_mismatch() {
        let type_params = params(&["T"]);
        let generic = [Decl::generic("T"), Decl::generic("T")];
        let arg = Decl::Tuple(vec![Decl::Int, Decl::Bool]);
        assert_eq!(
            infer_type_args(&type_params, &generic, &arg),
            Inference::Mismatch
        );
    }

    #[test]
    fn unused_parameter_is_undetermined() {
        let type_params = params(&["T", "U"]);
        let generic = [Decl::generic("T")];
        assert_eq!(
            infer_type_args(&type_params, &generic, &Decl::Int),
            Inference::Undetermined("U".into())
        );
    }
}
