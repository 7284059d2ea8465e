//! Generic instance cache.

use magpie_core::TypeHash;
use rustc_hash::FxHashMap;

use crate::callable::{FunctionId, GenericId};

/// Maps (template, type argument hashes) → instance function.
///
/// Asking twice for the same template with identical type arguments yields
/// the same instance. Templates are keyed by id, so two templates sharing a
/// name and parameter types never share instances.
#[derive(Debug, Default, Clone)]
pub struct InstanceCache {
    instances: FxHashMap<(GenericId, Vec<TypeHash>), FunctionId>,
}

impl InstanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, template: GenericId, args: Vec<TypeHash>, instance: FunctionId) {
        self.instances.insert((template, args), instance);
    }

    pub fn get(&self, template: GenericId, args: &[TypeHash]) -> Option<FunctionId> {
        self.instances.get(&(template, args.to_vec())).copied()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
