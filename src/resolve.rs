//! Reference resolution across collections
//!
//! Resolution is total: a foreign-key lookup always yields either the
//! referenced entity or an [`Resolution::Unresolved`] sentinel carrying the
//! raw value it tried to match. Callers render a fallback for unresolved
//! references; nothing in this module panics or returns an error.

use crate::entity::{Collection, Entity, Resource};
use crate::key::Key;
use crate::store::StoreSnapshot;

/// Outcome of a foreign-key lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(Entity),
    /// No match: empty key, foreign value absent from the target, or the
    /// target collection has not (yet) loaded. The raw value is kept for
    /// diagnostics.
    Unresolved { raw: Key },
}

impl Resolution {
    pub fn entity(&self) -> Option<&Entity> {
        match self {
            Resolution::Resolved(e) => Some(e),
            Resolution::Unresolved { .. } => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }
}

/// Find the first entity in `collection` whose normalized identifier matches
/// the normalized foreign-key value.
pub fn resolve_in(value: &Key, collection: &Collection) -> Resolution {
    if value.is_empty() {
        return Resolution::Unresolved { raw: value.clone() };
    }
    match collection.iter().find(|e| e.id.matches(value)) {
        Some(entity) => Resolution::Resolved(entity.clone()),
        None => Resolution::Unresolved { raw: value.clone() },
    }
}

/// Resolver over one store snapshot.
///
/// All hops of a multi-hop resolution (review → request → client) go through
/// the same snapshot, so a concurrent refresh can never mix generations
/// within one projection pass.
pub struct Resolver<'a> {
    snapshot: &'a StoreSnapshot,
}

impl<'a> Resolver<'a> {
    pub fn new(snapshot: &'a StoreSnapshot) -> Self {
        Resolver { snapshot }
    }

    /// Resolve a foreign-key value against a target resource.
    ///
    /// A target that is still loading or failed to load yields `Unresolved`
    /// rather than blocking; the projection degrades to its fallback string.
    pub fn resolve(&self, value: &Key, target: Resource) -> Resolution {
        match self.snapshot.collection(target) {
            Some(collection) => resolve_in(value, collection),
            None => Resolution::Unresolved { raw: value.clone() },
        }
    }

    /// Resolve a foreign key read off `entity`, trying alias spellings.
    pub fn resolve_field(&self, entity: &Entity, aliases: &[&str], target: Resource) -> Resolution {
        self.resolve(&entity.key_field(aliases), target)
    }
}
