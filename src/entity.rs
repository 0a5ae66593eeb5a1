//! Raw entity model for the five flat REST resources
//!
//! Entities are kept as untyped JSON maps rather than typed structs: the
//! backend is a json-server instance whose producers disagree on key casing
//! (`solicitud_id` vs `solicitudId` vs `SolicitudId`) and id typing. The
//! engine tolerates all observed spellings through alias-aware field access
//! and normalizes identifiers through [`Key`].

use crate::key::Key;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// The five resources served by the Destino Expertos API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Clients,
    Professionals,
    Services,
    Requests,
    Reviews,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Clients,
        Resource::Professionals,
        Resource::Services,
        Resource::Requests,
        Resource::Reviews,
    ];

    /// Path segment on the REST API.
    pub fn path(self) -> &'static str {
        match self {
            Resource::Clients => "clientes",
            Resource::Professionals => "profesionales",
            Resource::Services => "servicios",
            Resource::Requests => "solicitudes",
            Resource::Reviews => "resenas",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// One record of a resource: normalized id plus the raw JSON fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: Key,
    pub fields: Map<String, Value>,
}

impl Entity {
    /// Build an entity from a raw JSON object.
    ///
    /// The id is read from `id` or `Id` (both observed in the wild). A record
    /// without a usable id still becomes an entity with an empty key; it can
    /// be displayed but will never be the target of a resolution.
    pub fn from_object(fields: Map<String, Value>) -> Self {
        let id = ["id", "Id"]
            .iter()
            .filter_map(|k| fields.get(*k))
            .map(Key::from_value)
            .find(|k| !k.is_empty())
            .unwrap_or(Key::Empty);
        Entity { id, fields }
    }

    /// Read the first present field among the given alias spellings.
    pub fn field<'a>(&'a self, aliases: &[&str]) -> Option<&'a Value> {
        aliases.iter().find_map(|name| self.fields.get(*name))
    }

    /// Read a field as a foreign-key value, normalized.
    ///
    /// Absent fields and null values both come back as `Key::Empty`, which
    /// resolves to `Unresolved` downstream rather than erroring.
    pub fn key_field(&self, aliases: &[&str]) -> Key {
        self.field(aliases).map(Key::from_value).unwrap_or(Key::Empty)
    }

    /// Read a field as display text, if it holds a non-empty string.
    pub fn text_field(&self, aliases: &[&str]) -> Option<&str> {
        self.field(aliases)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// The full in-memory snapshot of one resource, in fetch order.
///
/// Snapshots are shared immutably between the store and projection passes;
/// a refresh swaps the whole `Arc`, it never edits in place.
pub type Collection = Arc<Vec<Entity>>;

/// Parse a raw JSON array body into entities.
///
/// Non-object elements are skipped with a count so one malformed row cannot
/// poison the rest of the snapshot; the caller decides whether to log.
pub fn entities_from_array(items: Vec<Value>) -> (Vec<Entity>, usize) {
    let mut skipped = 0;
    let entities = items
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(map) => Some(Entity::from_object(map)),
            _ => {
                skipped += 1;
                None
            }
        })
        .collect();
    (entities, skipped)
}
