//! Process-wide default comparers, one pair per `(K, V)` instantiation.
//!
//! Every [`ImmutableHashMap::empty`](crate::ImmutableHashMap::empty) call for
//! the same types hands out the same `Arc`s, so default-configured maps
//! recognise each other's strategies by identity.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use tracing::debug;

use crate::equality::{Comparers, DefaultKeyEquality, DefaultValueEquality};

type Registry = RwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>>;

static DEFAULTS: LazyLock<Registry> = LazyLock::new(|| RwLock::new(HashMap::new()));

/// Returns the canonical default comparers for `(K, V)`.
///
/// Lookups after the first one per type only take the read lock.
pub fn default_comparers<K, V>() -> Comparers<K, V>
where
    K: Hash + Eq + 'static,
    V: PartialEq + 'static,
{
    let type_id = TypeId::of::<(K, V)>();

    // Entries are only ever inserted whole, so a poisoned lock is still consistent.
    let cached = lookup(&DEFAULTS.read().unwrap_or_else(PoisonError::into_inner), type_id);
    if let Some(existing) = cached {
        return existing;
    }

    let mut registry = DEFAULTS.write().unwrap_or_else(PoisonError::into_inner);
    // Another thread may have registered the pair between the two locks.
    if let Some(existing) = lookup(&registry, type_id) {
        return existing;
    }

    debug!(
        key = type_name::<K>(),
        value = type_name::<V>(),
        "registering default comparers"
    );
    let comparers = Comparers::new(Arc::new(DefaultKeyEquality), Arc::new(DefaultValueEquality));
    registry.insert(type_id, Box::new(comparers.clone()));
    comparers
}

fn lookup<K: 'static, V: 'static>(
    registry: &HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    type_id: TypeId,
) -> Option<Comparers<K, V>> {
    registry
        .get(&type_id)
        .and_then(|entry| entry.downcast_ref::<Comparers<K, V>>())
        .cloned()
}
