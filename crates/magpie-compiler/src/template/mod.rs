//! Generic function instancing.
//!
//! A generic function is a template. Calling it with concrete type
//! arguments, explicit or inferred from the argument type, creates an
//! ordinary function entry bound with an [`InstancingContext`] that maps
//! the template's type parameters to those arguments.
//!
//! ## Components
//!
//! - [`InstanceCache`]: memoizes instances per (template, type arguments)
//! - [`SubstitutionMap`]: maps type parameters to concrete types
//! - [`infer_type_args`]: structural unification against an argument type

mod cache;
mod substitution;

use magpie_core::Decl;

pub use cache::InstanceCache;
pub use substitution::{
    Inference, SubstitutionMap, build_substitution_map, infer_type_args, substitute_params,
    substitute_signature, substitute_type,
};

/// The type-parameter mapping of a generic instance being bound.
#[derive(Debug, Clone, PartialEq)]
pub struct InstancingContext {
    pub template_name: String,
    pub type_params: Vec<String>,
    pub type_args: Vec<Decl>,
}

impl InstancingContext {
    /// The concrete type bound to a type parameter, if `name` is one.
    pub fn lookup(&self, name: &str) -> Option<&Decl> {
        self.type_params
            .iter()
            .position(|p| p == name)
            .and_then(|i| self.type_args.get(i))
    }

    /// Display name of the instance, e.g. `Swap'Int'Bool`.
    pub fn instance_name(&self) -> String {
        format_instance_name(&self.template_name, &self.type_args)
    }
}

/// Format an instance name: `name'Arg1'Arg2`.
pub fn format_instance_name(name: &str, type_args: &[Decl]) -> String {
    let mut out = name.to_string();
    for arg in type_args {
        out.push('\'');
        out.push_str(&arg.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_type_param() {
        let context = InstancingContext {
            template_name: "Pair".into(),
            type_params: vec!["A".into(), "B".into()],
            type_args: vec![Decl::Int, Decl::String],
        };
        assert_eq!(context.lookup("B"), Some(&Decl::String));
        assert_eq!(context.lookup("C"), None);
        assert_eq!(context.instance_name(), "Pair'Int'String");
    }
}
