//! Per-run resolution cache.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::core::types::{DeclId, ResolvedType, TypeReference};

/// Resolved types keyed by (reference, scope).
///
/// Shared by every thread of one run. Concurrent first writes for the same
/// key keep the first stored value and hand it to every writer.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: RwLock<HashMap<(TypeReference, DeclId), ResolvedType>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, reference: &TypeReference, scope: DeclId) -> Option<ResolvedType> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(&(reference.clone(), scope)).cloned()
    }

    /// Store `resolved` unless another writer got there first; returns the
    /// value that is cached.
    pub fn insert(&self, reference: TypeReference, scope: DeclId, resolved: ResolvedType) -> ResolvedType {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.entry((reference, scope)).or_insert(resolved).clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_writer_wins() {
        let cache = ResolutionCache::new();
        let reference = TypeReference::simple("Foo");

        let first = cache.insert(reference.clone(), DeclId(0), ResolvedType::opaque("a.Foo"));
        let second = cache.insert(reference.clone(), DeclId(0), ResolvedType::opaque("b.Foo"));
        assert_eq!(first.name, "a.Foo");
        assert_eq!(second.name, "a.Foo");
        assert_eq!(cache.get(&reference, DeclId(0)).unwrap().name, "a.Foo");

        // Scope is part of the key
        assert!(cache.get(&reference, DeclId(1)).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_first_writes_agree() {
        let cache = ResolutionCache::new();
        let reference = TypeReference::simple("Foo");

        let results: Vec<ResolvedType> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let cache = &cache;
                    let reference = reference.clone();
                    s.spawn(move || {
                        cache.insert(reference, DeclId(7), ResolvedType::opaque(format!("p{}.Foo", i)))
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let winner = cache.get(&reference, DeclId(7)).unwrap();
        assert!(results.iter().all(|r| *r == winner));
    }
}
