//! View projection: denormalized display rows
//!
//! A projection pass walks one source collection and produces exactly one
//! [`Row`] per entity: the raw fields, plus reference columns resolved
//! through the store snapshot, plus formatter columns. Source entities are
//! never mutated and rows are never cached; they are rebuilt whenever a
//! snapshot or the filter state changes.
//!
//! Every formatter is total. A missing or malformed raw value yields the
//! formatter's designated fallback, so no code path can leak a raw `null`
//! into display text.

use crate::entity::{Entity, Resource};
use crate::key::Key;
use crate::resolve::{Resolution, Resolver};
use crate::store::StoreSnapshot;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Alias spellings for one logical field, tried in order.
pub type FieldRef = &'static [&'static str];

/// Where a reference column reads its foreign key from.
pub enum KeySource {
    /// Directly off the source entity.
    Own(FieldRef),
    /// Through a hop entity: resolve `via` in `via_target`, then read
    /// `field` off the hop. When the hop is unresolved or the field is
    /// empty, fall back to reading `own` off the source entity itself
    /// (reviews sometimes carry denormalized client/professional ids).
    ViaThenOwn {
        via: FieldRef,
        via_target: Resource,
        field: FieldRef,
        own: FieldRef,
    },
}

/// What to show when a reference does not resolve.
pub enum Fallback {
    /// A fixed token, e.g. `"Unknown client"`.
    Label(&'static str),
    /// The raw key appended to a prefix, e.g. `"Client #7"`.
    WithKey(&'static str),
}

impl Fallback {
    fn render(&self, raw: &Key) -> String {
        match self {
            Fallback::Label(s) => (*s).to_string(),
            Fallback::WithKey(prefix) => match raw.token() {
                Some(t) => format!("{} #{}", prefix, t),
                None => format!("{} #?", prefix),
            },
        }
    }
}

/// A denormalized column built by resolving a foreign key.
pub struct ReferenceColumn {
    /// Output column name, e.g. `clientName`.
    pub name: &'static str,
    pub source: KeySource,
    pub target: Resource,
    /// Label field on the target entity.
    pub label: FieldRef,
    /// Optional label read off the hop entity when the target gives nothing
    /// (the review screen shows the request description when the service
    /// record is missing).
    pub hop_label: Option<FieldRef>,
    pub fallback: Fallback,
}

/// Declarative formatter applied to one raw field.
pub enum Formatter {
    /// Boolean to a yes/no token. Anything that is not `true` (or `"true"`)
    /// reads as no, matching the tolerant screens.
    YesNo,
    /// Array joined with `", "`. A bare string passes through; an empty or
    /// malformed value shows the `empty` token.
    JoinList { empty: &'static str },
    /// Non-empty string passes through; anything else shows `empty`.
    TextOr { empty: &'static str },
    /// Enumerated code to a human label; unknown codes show `unknown`.
    EnumLabel {
        labels: &'static [(&'static str, &'static str)],
        unknown: &'static str,
    },
    /// Star rating 1..=5, rendered as `"4 ★ - Good service"`.
    Rating { labels: &'static [&'static str; 6] },
    /// Fixed two-decimal currency, e.g. `"$25.00"`.
    Currency { symbol: &'static str },
    /// Number with a unit suffix, e.g. `"12 years"`, `"90 min"`.
    Unit { suffix: &'static str },
    /// Date as `dd/mm/yyyy`; unparseable values show `missing`.
    DateDisplay { missing: &'static str },
}

pub struct FormattedColumn {
    pub name: &'static str,
    pub source: FieldRef,
    pub format: Formatter,
}

/// Full projection recipe for one resource.
pub struct ProjectionSpec {
    pub resource: Resource,
    pub references: &'static [ReferenceColumn],
    pub formatted: &'static [FormattedColumn],
    /// Fields (raw or derived) searched by the free-text predicate.
    pub search_fields: &'static [&'static str],
}

/// Display-ready projection of one entity.
///
/// Identity is preserved: `row.id` equals the source entity's id, so edits
/// and deletes issued against a row map straight back to the authoritative
/// record without re-resolving.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: Key,
    /// The source entity's raw fields, untouched.
    pub fields: Map<String, Value>,
    /// Derived columns: resolved references and formatted fields.
    pub display: BTreeMap<String, String>,
}

impl Row {
    pub fn bare(id: Key) -> Self {
        Row {
            id,
            fields: Map::new(),
            display: BTreeMap::new(),
        }
    }

    /// A raw field by name.
    pub fn value(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// A derived column, falling back to the raw field stringified. This is
    /// what the free-text search looks at.
    pub fn text(&self, field: &str) -> Option<String> {
        if let Some(s) = self.display.get(field) {
            return Some(s.clone());
        }
        self.fields.get(field).map(value_text)
    }
}

/// Project a whole collection against a snapshot.
///
/// An unloaded source collection projects to an empty sequence; unloaded
/// reference targets degrade to fallbacks, never to missing rows.
pub fn project_collection(spec: &ProjectionSpec, snapshot: &StoreSnapshot) -> Vec<Row> {
    let Some(collection) = snapshot.collection(spec.resource) else {
        return Vec::new();
    };
    let resolver = Resolver::new(snapshot);
    collection
        .iter()
        .map(|entity| project_entity(spec, entity, &resolver))
        .collect()
}

/// Build the row for one entity. Total: every entity yields a row.
pub fn project_entity(spec: &ProjectionSpec, entity: &Entity, resolver: &Resolver<'_>) -> Row {
    let mut display = BTreeMap::new();

    for column in spec.references {
        display.insert(
            column.name.to_string(),
            reference_text(column, entity, resolver),
        );
    }

    for column in spec.formatted {
        display.insert(
            column.name.to_string(),
            format_value(&column.format, entity.field(column.source)),
        );
    }

    Row {
        id: entity.id.clone(),
        fields: entity.fields.clone(),
        display,
    }
}

fn reference_text(column: &ReferenceColumn, entity: &Entity, resolver: &Resolver<'_>) -> String {
    let (key, hop) = match &column.source {
        KeySource::Own(field) => (entity.key_field(field), None),
        KeySource::ViaThenOwn {
            via,
            via_target,
            field,
            own,
        } => {
            let hop = resolver.resolve_field(entity, via, *via_target);
            let key = match hop.entity() {
                Some(hop_entity) => {
                    let through = hop_entity.key_field(field);
                    if through.is_empty() {
                        entity.key_field(own)
                    } else {
                        through
                    }
                }
                None => entity.key_field(own),
            };
            (key, hop.entity().cloned())
        }
    };

    match resolver.resolve(&key, column.target) {
        Resolution::Resolved(target) => target
            .text_field(column.label)
            .map(str::to_string)
            .unwrap_or_else(|| column.fallback.render(&key)),
        Resolution::Unresolved { raw } => {
            // Before giving up, let the hop entity label the row (request
            // description standing in for a missing service record).
            if let (Some(hop_label), Some(hop_entity)) = (&column.hop_label, &hop) {
                if let Some(text) = hop_entity.text_field(hop_label) {
                    return text.to_string();
                }
            }
            column.fallback.render(&raw)
        }
    }
}

/// Apply one formatter to one (possibly absent) raw value. Total.
pub fn format_value(format: &Formatter, value: Option<&Value>) -> String {
    match format {
        Formatter::YesNo => {
            let truthy = matches!(value, Some(Value::Bool(true)))
                || matches!(value, Some(Value::String(s)) if s == "true");
            if truthy { "Yes" } else { "No" }.to_string()
        }
        Formatter::JoinList { empty } => match value {
            Some(Value::Array(items)) => {
                // Non-scalar elements stringify to nothing; an array of only
                // those is as empty as `[]` and shows the empty token too.
                let parts: Vec<String> = items
                    .iter()
                    .map(value_text)
                    .filter(|s| !s.is_empty())
                    .collect();
                if parts.is_empty() {
                    (*empty).to_string()
                } else {
                    parts.join(", ")
                }
            }
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            _ => (*empty).to_string(),
        },
        Formatter::TextOr { empty } => match value {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            _ => (*empty).to_string(),
        },
        Formatter::EnumLabel { labels, unknown } => {
            let code = value.and_then(Value::as_str).unwrap_or("");
            labels
                .iter()
                .find(|(c, _)| *c == code)
                .map(|(_, label)| (*label).to_string())
                .unwrap_or_else(|| (*unknown).to_string())
        }
        Formatter::Rating { labels } => match value.and_then(as_number) {
            Some(n) if (1.0..=5.0).contains(&n) && n.fract() == 0.0 => {
                let idx = n as usize;
                format!("{} ★ - {}", idx, labels[idx])
            }
            _ => "Unrated".to_string(),
        },
        Formatter::Currency { symbol } => match value.and_then(as_number) {
            Some(n) => format!("{}{:.2}", symbol, n),
            None => "-".to_string(),
        },
        Formatter::Unit { suffix } => match value.and_then(as_number) {
            Some(n) if n.fract() == 0.0 => format!("{} {}", n as i64, suffix),
            Some(n) => format!("{} {}", n, suffix),
            None => "-".to_string(),
        },
        Formatter::DateDisplay { missing } => match value.and_then(parse_date) {
            Some(d) => d.format("%d/%m/%Y").to_string(),
            None => (*missing).to_string(),
        },
    }
}

/// Tolerant numeric read: JSON number or numeric string.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Tolerant date read: RFC 3339 timestamp or a bare `YYYY-MM-DD`.
pub(crate) fn parse_date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Scalar display text for search and list joining. Objects and arrays are
/// not searchable text; they stringify to empty.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn yes_no_tolerates_string_booleans() {
        assert_eq!(format_value(&Formatter::YesNo, Some(&json!(true))), "Yes");
        assert_eq!(format_value(&Formatter::YesNo, Some(&json!("true"))), "Yes");
        assert_eq!(format_value(&Formatter::YesNo, Some(&json!(false))), "No");
        assert_eq!(format_value(&Formatter::YesNo, None), "No");
        assert_eq!(format_value(&Formatter::YesNo, Some(&json!(1))), "No");
    }

    #[test]
    fn join_list_handles_arrays_strings_and_garbage() {
        let f = Formatter::JoinList { empty: "None specified" };
        assert_eq!(
            format_value(&f, Some(&json!(["plumbing", "electrical"]))),
            "plumbing, electrical"
        );
        assert_eq!(format_value(&f, Some(&json!([]))), "None specified");
        assert_eq!(format_value(&f, Some(&json!([{}, {}]))), "None specified");
        assert_eq!(
            format_value(&f, Some(&json!([null, "", [1, 2]]))),
            "None specified"
        );
        assert_eq!(format_value(&f, Some(&json!("gardening"))), "gardening");
        assert_eq!(format_value(&f, Some(&json!(42))), "None specified");
        assert_eq!(format_value(&f, None), "None specified");
    }

    #[test]
    fn rating_formats_in_range_and_rejects_the_rest() {
        const LABELS: [&str; 6] = [
            "",
            "Terrible service",
            "Poor service",
            "Average service",
            "Good service",
            "Excellent service",
        ];
        let f = Formatter::Rating { labels: &LABELS };
        assert_eq!(format_value(&f, Some(&json!(4))), "4 ★ - Good service");
        assert_eq!(format_value(&f, Some(&json!("5"))), "5 ★ - Excellent service");
        assert_eq!(format_value(&f, Some(&json!(0))), "Unrated");
        assert_eq!(format_value(&f, Some(&json!(9))), "Unrated");
        assert_eq!(format_value(&f, Some(&json!("not a number"))), "Unrated");
    }

    #[test]
    fn currency_and_unit_are_total() {
        assert_eq!(
            format_value(&Formatter::Currency { symbol: "$" }, Some(&json!(25))),
            "$25.00"
        );
        assert_eq!(
            format_value(&Formatter::Currency { symbol: "$" }, Some(&json!("19.5"))),
            "$19.50"
        );
        assert_eq!(format_value(&Formatter::Currency { symbol: "$" }, None), "-");
        assert_eq!(
            format_value(&Formatter::Unit { suffix: "years" }, Some(&json!(12))),
            "12 years"
        );
        assert_eq!(
            format_value(&Formatter::Unit { suffix: "min" }, Some(&json!("bad"))),
            "-"
        );
    }

    #[test]
    fn date_display_parses_both_wire_shapes() {
        let f = Formatter::DateDisplay { missing: "No date" };
        assert_eq!(
            format_value(&f, Some(&json!("2025-03-09T14:30:00Z"))),
            "09/03/2025"
        );
        assert_eq!(format_value(&f, Some(&json!("2025-03-09"))), "09/03/2025");
        assert_eq!(format_value(&f, Some(&json!("ayer"))), "No date");
        assert_eq!(format_value(&f, None), "No date");
    }

    #[test]
    fn enum_label_falls_back_on_unknown_codes() {
        const LABELS: [(&str, &str); 2] = [("pendiente", "Pending"), ("completada", "Completed")];
        let f = Formatter::EnumLabel {
            labels: &LABELS,
            unknown: "Unknown",
        };
        assert_eq!(format_value(&f, Some(&json!("pendiente"))), "Pending");
        assert_eq!(format_value(&f, Some(&json!("inventado"))), "Unknown");
        assert_eq!(format_value(&f, None), "Unknown");
    }
}
