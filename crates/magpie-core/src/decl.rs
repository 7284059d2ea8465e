//! The Magpie type model.
//!
//! A [`Decl`] is an immutable, fully resolved type. Types compare
//! structurally: tuples field by field, arrays by element type and
//! mutability, function types by parameter list and return type. Union types
//! and generic type parameters compare by identity (name plus type arguments).

use std::fmt;

use crate::type_hash::{TypeHash, hash_constants};

/// A resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Decl {
    /// The empty value. Also the type of the `null` literal.
    Unit,
    /// `true` / `false`.
    Bool,
    /// 32-bit signed integer.
    Int,
    /// Immutable string.
    String,
    /// A function value.
    Func(FuncType),
    /// An array, optionally mutable.
    Array(ArrayType),
    /// An ordered tuple of at least two fields.
    Tuple(Vec<Decl>),
    /// A tagged union, identified by name and type arguments.
    Union(UnionRef),
    /// An unsubstituted type parameter of a generic function.
    Generic(String),
}

/// The type of a function value: parameter list and return type.
///
/// A function always takes a single argument. Several parameters mean the
/// argument is a tuple; an empty list means the argument is `Unit`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FuncType {
    pub params: Vec<Decl>,
    pub ret: Box<Decl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayType {
    pub element: Box<Decl>,
    pub is_mutable: bool,
}

/// Reference to a declared union type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnionRef {
    pub name: String,
    pub type_args: Vec<Decl>,
}

impl FuncType {
    pub fn new(params: Vec<Decl>, ret: Decl) -> Self {
        Self {
            params,
            ret: Box::new(ret),
        }
    }

    /// The type of the single argument this function takes.
    pub fn arg_type(&self) -> Decl {
        Decl::from_params(&self.params)
    }
}

impl Decl {
    pub fn func(params: Vec<Decl>, ret: Decl) -> Self {
        Decl::Func(FuncType::new(params, ret))
    }

    pub fn array(element: Decl, is_mutable: bool) -> Self {
        Decl::Array(ArrayType {
            element: Box::new(element),
            is_mutable,
        })
    }

    /// Build a tuple type, collapsing the degenerate sizes.
    ///
    /// No fields is `Unit` and one field is the field itself, so that
    /// `tuple(x.expanded())` gives back `x`.
    pub fn tuple(fields: Vec<Decl>) -> Self {
        match fields.len() {
            0 => Decl::Unit,
            1 => fields.into_iter().next().unwrap_or(Decl::Unit),
            _ => Decl::Tuple(fields),
        }
    }

    /// The argument type of a function with the given parameter list.
    pub fn from_params(params: &[Decl]) -> Self {
        Decl::tuple(params.to_vec())
    }

    pub fn union(name: impl Into<String>, type_args: Vec<Decl>) -> Self {
        Decl::Union(UnionRef {
            name: name.into(),
            type_args,
        })
    }

    pub fn generic(name: impl Into<String>) -> Self {
        Decl::Generic(name.into())
    }

    /// The type flattened for positional matching against a parameter list.
    ///
    /// `Unit` expands to no types, a tuple to its fields, anything else to
    /// itself.
    pub fn expanded(&self) -> &[Decl] {
        match self {
            Decl::Unit => &[],
            Decl::Tuple(fields) => fields,
            other => std::slice::from_ref(other),
        }
    }

    #[inline]
    pub fn is_unit(&self) -> bool {
        matches!(self, Decl::Unit)
    }

    /// Nesting depth of this type. Primitives and type parameters are 1.
    pub fn depth(&self) -> usize {
        let deepest = |decls: &[Decl]| decls.iter().map(Decl::depth).max().unwrap_or(0);
        match self {
            Decl::Unit | Decl::Bool | Decl::Int | Decl::String | Decl::Generic(_) => 1,
            Decl::Func(func) => 1 + deepest(&func.params).max(func.ret.depth()),
            Decl::Array(array) => 1 + array.element.depth(),
            Decl::Tuple(fields) => 1 + deepest(fields),
            Decl::Union(union) => 1 + deepest(&union.type_args),
        }
    }

    /// Whether a generic type parameter appears anywhere in this type.
    pub fn is_generic(&self) -> bool {
        match self {
            Decl::Unit | Decl::Bool | Decl::Int | Decl::String => false,
            Decl::Generic(_) => true,
            Decl::Func(func) => func.params.iter().any(Decl::is_generic) || func.ret.is_generic(),
            Decl::Array(array) => array.element.is_generic(),
            Decl::Tuple(fields) => fields.iter().any(Decl::is_generic),
            Decl::Union(union) => union.type_args.iter().any(Decl::is_generic),
        }
    }

    /// Structural identity hash of this type.
    pub fn type_hash(&self) -> TypeHash {
        match self {
            Decl::Unit => TypeHash::from_name("Unit"),
            Decl::Bool => TypeHash::from_name("Bool"),
            Decl::Int => TypeHash::from_name("Int"),
            Decl::String => TypeHash::from_name("String"),
            Decl::Func(func) => {
                let mut parts: Vec<_> = func.params.iter().map(Decl::type_hash).collect();
                parts.push(func.ret.type_hash());
                TypeHash::from_parts(hash_constants::FUNC_TYPE ^ func.params.len() as u64, &parts)
            }
            Decl::Array(array) => TypeHash::from_parts(
                hash_constants::ARRAY ^ u64::from(array.is_mutable),
                &[array.element.type_hash()],
            ),
            Decl::Tuple(fields) => {
                let parts: Vec<_> = fields.iter().map(Decl::type_hash).collect();
                TypeHash::from_parts(hash_constants::TUPLE, &parts)
            }
            Decl::Union(union) => {
                let parts: Vec<_> = union.type_args.iter().map(Decl::type_hash).collect();
                TypeHash::from_instance(
                    TypeHash(hash_constants::UNION ^ TypeHash::from_name(&union.name).0),
                    &parts,
                )
            }
            Decl::Generic(name) => {
                TypeHash(hash_constants::GENERIC ^ TypeHash::from_name(name).0)
            }
        }
    }
}

/// Whether two types are structurally identical.
///
/// Recurses into tuple fields (element-wise, equal length), array element
/// types plus the mutability flag, and function parameter lists plus return
/// types. Unions and type parameters match by name and type arguments.
#[inline]
pub fn types_match(a: &Decl, b: &Decl) -> bool {
    a == b
}

/// Whether two type lists match element-wise.
pub fn lists_match(a: &[Decl], b: &[Decl]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| types_match(a, b))
}

/// Whether an argument of type `arg` can be passed to a parameter list.
///
/// A single parameter takes the whole argument, so `[(Int, Bool)]` accepts a
/// `(Int, Bool)` tuple. Other lists are matched against the expanded
/// argument: the parameter list `[Int, Bool]` accepts a `(Int, Bool)` tuple
/// and an empty list accepts `Unit`.
pub fn params_match(params: &[Decl], arg: &Decl) -> bool {
    match params {
        [single] => types_match(single, arg),
        _ => lists_match(params, arg.expanded()),
    }
}

impl fmt::Display for Decl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decl::Unit => f.write_str("Unit"),
            Decl::Bool => f.write_str("Bool"),
            Decl::Int => f.write_str("Int"),
            Decl::String => f.write_str("String"),
            Decl::Func(func) => {
                f.write_str("fn (")?;
                write_list(f, &func.params)?;
                write!(f, " -> {})", func.ret)
            }
            Decl::Array(array) if array.is_mutable => write!(f, "mutable {}[]", array.element),
            Decl::Array(array) => write!(f, "{}[]", array.element),
            Decl::Tuple(fields) => {
                f.write_str("(")?;
                write_list(f, fields)?;
                f.write_str(")")
            }
            Decl::Union(union) => {
                f.write_str(&union.name)?;
                match union.type_args.as_slice() {
                    [] => Ok(()),
                    [single] => write!(f, "'{}", single),
                    args => {
                        f.write_str("'(")?;
                        write_list(f, args)?;
                        f.write_str(")")
                    }
                }
            }
            Decl::Generic(name) => f.write_str(name),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, decls: &[Decl]) -> fmt::Result {
    for (i, decl) in decls.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", decl)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuples_match_element_wise() {
        let a = Decl::tuple(vec![Decl::Int, Decl::String]);
        let b = Decl::tuple(vec![Decl::Int, Decl::String]);
        let c = Decl::tuple(vec![Decl::String, Decl::Int]);
        let d = Decl::tuple(vec![Decl::Int, Decl::String, Decl::Bool]);
        assert!(types_match(&a, &b));
        assert!(!types_match(&a, &c));
        assert!(!types_match(&a, &d));
    }

    #[test]
    fn array_mutability_is_significant() {
        assert!(types_match(&Decl::array(Decl::Int, true), &Decl::array(Decl::Int, true)));
        assert!(!types_match(&Decl::array(Decl::Int, true), &Decl::array(Decl::Int, false)));
        assert!(!types_match(&Decl::array(Decl::Int, false), &Decl::array(Decl::Bool, false)));
    }

    #[test]
    fn function_types_match_params_and_return() {
        let f = Decl::func(vec![Decl::Int], Decl::Bool);
        assert!(types_match(&f, &Decl::func(vec![Decl::Int], Decl::Bool)));
        assert!(!types_match(&f, &Decl::func(vec![Decl::Int], Decl::Int)));
        assert!(!types_match(&f, &Decl::func(vec![Decl::Int, Decl::Int], Decl::Bool)));
    }

    #[test]
    fn unions_match_by_identity() {
        let a = Decl::union("Option", vec![Decl::Int]);
        assert!(types_match(&a, &Decl::union("Option", vec![Decl::Int])));
        assert!(!types_match(&a, &Decl::union("Option", vec![Decl::Bool])));
        assert!(!types_match(&a, &Decl::union("Maybe", vec![Decl::Int])));
    }

    #[test]
    fn expanded_types() {
        assert!(Decl::Unit.expanded().is_empty());
        assert_eq!(Decl::Int.expanded(), &[Decl::Int]);
        let pair = Decl::tuple(vec![Decl::Int, Decl::Bool]);
        assert_eq!(pair.expanded(), &[Decl::Int, Decl::Bool]);
    }

    #[test]
    fn params_match_expands_argument() {
        assert!(params_match(&[], &Decl::Unit));
        assert!(params_match(&[Decl::Int], &Decl::Int));
        assert!(params_match(
            &[Decl::Int, Decl::String],
            &Decl::tuple(vec![Decl::Int, Decl::String])
        ));
        assert!(!params_match(&[Decl::Int], &Decl::Unit));
        assert!(!params_match(&[Decl::Int, Decl::Int], &Decl::Int));
    }

    #[test]
    fn single_param_takes_whole_argument() {
        let pair = Decl::tuple(vec![Decl::Int, Decl::Bool]);
        assert!(params_match(std::slice::from_ref(&pair), &pair));
        assert!(params_match(&[Decl::Unit], &Decl::Unit));
        assert!(!params_match(std::slice::from_ref(&pair), &Decl::Int));
        assert!(!params_match(&[Decl::Int], &pair));
    }

    #[test]
    fn depth_counts_nesting() {
        assert_eq!(Decl::Int.depth(), 1);
        assert_eq!(Decl::array(Decl::array(Decl::Int, false), false).depth(), 3);
        assert_eq!(
            Decl::tuple(vec![Decl::Int, Decl::array(Decl::Bool, true)]).depth(),
            3
        );
        assert_eq!(Decl::union("Option", vec![]).depth(), 1);
    }

    #[test]
    fn tuple_constructor_collapses() {
        assert_eq!(Decl::tuple(vec![]), Decl::Unit);
        assert_eq!(Decl::tuple(vec![Decl::Int]), Decl::Int);
    }

    #[test]
    fn generic_detection() {
        assert!(Decl::array(Decl::generic("T"), false).is_generic());
        assert!(Decl::func(vec![Decl::Int], Decl::generic("T")).is_generic());
        assert!(!Decl::tuple(vec![Decl::Int, Decl::Bool]).is_generic());
    }

    #[test]
    fn type_hash_is_structural() {
        let a = Decl::tuple(vec![Decl::Int, Decl::Bool]);
        let b = Decl::tuple(vec![Decl::Int, Decl::Bool]);
        assert_eq!(a.type_hash(), b.type_hash());
        assert_ne!(
            Decl::array(Decl::Int, true).type_hash(),
            Decl::array(Decl::Int, false).type_hash()
        );
    }

    #[test]
    fn display() {
        assert_eq!(Decl::tuple(vec![Decl::Int, Decl::String]).to_string(), "(Int, String)");
        assert_eq!(Decl::array(Decl::Int, true).to_string(), "mutable Int[]");
        assert_eq!(Decl::func(vec![Decl::Int], Decl::Bool).to_string(), "fn (Int -> Bool)");
        assert_eq!(Decl::union("Option", vec![Decl::Int]).to_string(), "Option'Int");
    }
}
