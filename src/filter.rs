//! Multi-predicate filtering over projected rows
//!
//! A [`FilterState`] is an explicit value object: the active predicates plus
//! the pagination position. Filtering is a pure function from the unfiltered
//! base sequence; the free-text search in particular always re-derives from
//! the base rows rather than narrowing the previously filtered view, so
//! widening a search can always recover rows an earlier filter excluded.
//!
//! All active predicates AND-combine. A predicate at its "all"/empty
//! sentinel (empty search box, unset category) simply drops out.

use crate::project::{as_number, parse_date, value_text, Row};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Inclusive date range over one date field.
#[derive(Debug, Clone, PartialEq)]
pub struct DateRange {
    pub field: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Active predicates plus pagination position for one screen.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    /// Free-text term matched case-insensitively against the projection's
    /// designated search fields. Empty means inactive.
    pub search: String,
    /// Per-field case-insensitive substring predicates.
    pub contains: BTreeMap<String, String>,
    /// Categorical equality, compared on trimmed string form so numeric ids
    /// and booleans match regardless of wire typing.
    pub equals: BTreeMap<String, String>,
    /// Numeric lower bounds (inclusive).
    pub min_bounds: BTreeMap<String, f64>,
    /// Numeric upper bounds (inclusive).
    pub max_bounds: BTreeMap<String, f64>,
    pub date_range: Option<DateRange>,
    pub page: usize,
    pub page_size: usize,
}

impl Default for FilterState {
    fn default() -> Self {
        FilterState {
            search: String::new(),
            contains: BTreeMap::new(),
            equals: BTreeMap::new(),
            min_bounds: BTreeMap::new(),
            max_bounds: BTreeMap::new(),
            date_range: None,
            page: 1,
            page_size: crate::config::DEFAULT_PAGE_SIZE,
        }
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every predicate change resets the page to 1; the previously selected
    /// page belongs to a result set that no longer exists.
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self.page = 1;
        self
    }

    pub fn with_contains(mut self, field: impl Into<String>, term: impl Into<String>) -> Self {
        self.contains.insert(field.into(), term.into());
        self.page = 1;
        self
    }

    pub fn with_equals(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.equals.insert(field.into(), value.into());
        self.page = 1;
        self
    }

    pub fn with_min(mut self, field: impl Into<String>, min: f64) -> Self {
        self.min_bounds.insert(field.into(), min);
        self.page = 1;
        self
    }

    pub fn with_max(mut self, field: impl Into<String>, max: f64) -> Self {
        self.max_bounds.insert(field.into(), max);
        self.page = 1;
        self
    }

    pub fn with_date_range(
        mut self,
        field: impl Into<String>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Self {
        self.date_range = Some(DateRange {
            field: field.into(),
            from,
            to,
        });
        self.page = 1;
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self.page = 1;
        self
    }

    /// True when every predicate sits at its sentinel, i.e. the filter is
    /// the identity.
    pub fn is_identity(&self) -> bool {
        self.search.trim().is_empty()
            && self.contains.values().all(|t| t.trim().is_empty())
            && self.equals.is_empty()
            && self.min_bounds.is_empty()
            && self.max_bounds.is_empty()
            && self
                .date_range
                .as_ref()
                .map(|r| r.from.is_none() && r.to.is_none())
                .unwrap_or(true)
    }
}

/// Reduce the unfiltered base rows to those matching every active predicate.
/// Never mutates the input; always returns a fresh sequence.
pub fn apply_filters(rows: &[Row], search_fields: &[&str], state: &FilterState) -> Vec<Row> {
    rows.iter()
        .filter(|row| matches_all(row, search_fields, state))
        .cloned()
        .collect()
}

fn matches_all(row: &Row, search_fields: &[&str], state: &FilterState) -> bool {
    // Free-text search over the designated fields, applied to the base row
    // like every other predicate (AND-combined, not view-narrowing).
    let term = state.search.trim().to_lowercase();
    if !term.is_empty() {
        let hit = search_fields.iter().any(|field| {
            row.text(field)
                .map(|t| t.to_lowercase().contains(&term))
                .unwrap_or(false)
        });
        if !hit {
            return false;
        }
    }

    for (field, needle) in &state.contains {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            continue;
        }
        let hit = row
            .text(field)
            .map(|t| t.to_lowercase().contains(&needle))
            .unwrap_or(false);
        if !hit {
            return false;
        }
    }

    for (field, expected) in &state.equals {
        let actual = row.value(field).map(value_text).unwrap_or_default();
        if actual.trim() != expected.trim() {
            return false;
        }
    }

    for (field, min) in &state.min_bounds {
        match row.value(field).and_then(as_number) {
            Some(n) if n >= *min => {}
            _ => return false,
        }
    }

    for (field, max) in &state.max_bounds {
        match row.value(field).and_then(as_number) {
            Some(n) if n <= *max => {}
            _ => return false,
        }
    }

    if let Some(range) = &state.date_range {
        if range.from.is_some() || range.to.is_some() {
            let Some(date) = row.value(&range.field).and_then(parse_date) else {
                return false;
            };
            if let Some(from) = range.from {
                if date < from {
                    return false;
                }
            }
            if let Some(to) = range.to {
                if date > to {
                    return false;
                }
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::key::Key;
    use serde_json::json;

    fn row(v: serde_json::Value) -> Row {
        let entity = match v {
            serde_json::Value::Object(m) => Entity::from_object(m),
            _ => panic!("expected object"),
        };
        Row {
            id: entity.id.clone(),
            fields: entity.fields,
            display: Default::default(),
        }
    }

    fn requests() -> Vec<Row> {
        vec![
            row(json!({"id": 1, "descripcion": "Plumbing repair", "estado": "pendiente", "urgencia": true, "fecha": "2025-01-10"})),
            row(json!({"id": 2, "descripcion": "Garden cleanup", "estado": "completada", "urgencia": false, "fecha": "2025-02-20"})),
            row(json!({"id": 3, "descripcion": "Plumbing install", "estado": "completada", "urgencia": false, "fecha": "2025-03-05"})),
        ]
    }

    const SEARCH: &[&str] = &["descripcion", "estado"];

    #[test]
    fn identity_filter_returns_everything() {
        let rows = requests();
        let filtered = apply_filters(&rows, SEARCH, &FilterState::new());
        assert_eq!(filtered, rows);
    }

    #[test]
    fn search_and_category_and_combine() {
        // Scenario D: the search applies to the base set, additionally
        // restricted by the categorical filter, not to a narrowed view.
        let rows = requests();
        let state = FilterState::new()
            .with_equals("estado", "completada")
            .with_search("plumb");
        let filtered = apply_filters(&rows, SEARCH, &state);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, Key::Numeric(3));
    }

    #[test]
    fn widened_search_recovers_rows_a_previous_filter_excluded() {
        let rows = requests();
        let narrow = FilterState::new().with_search("garden");
        assert_eq!(apply_filters(&rows, SEARCH, &narrow).len(), 1);

        // Re-deriving from the base means clearing the term brings all back.
        let cleared = narrow.with_search("");
        assert_eq!(apply_filters(&rows, SEARCH, &cleared).len(), 3);
    }

    #[test]
    fn boolean_equality_matches_across_typing() {
        let rows = requests();
        let state = FilterState::new().with_equals("urgencia", "true");
        let filtered = apply_filters(&rows, SEARCH, &state);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, Key::Numeric(1));
    }

    #[test]
    fn date_range_is_inclusive() {
        let rows = requests();
        let state = FilterState::new().with_date_range(
            "fecha",
            NaiveDate::from_ymd_opt(2025, 2, 20),
            NaiveDate::from_ymd_opt(2025, 3, 5),
        );
        let filtered = apply_filters(&rows, SEARCH, &state);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn rows_without_a_parseable_date_fail_the_range() {
        let rows = vec![row(json!({"id": 7, "fecha": "mañana"}))];
        let state =
            FilterState::new().with_date_range("fecha", NaiveDate::from_ymd_opt(2025, 1, 1), None);
        assert!(apply_filters(&rows, SEARCH, &state).is_empty());
    }

    #[test]
    fn min_bound_is_inclusive_and_total() {
        let rows = vec![
            row(json!({"id": 1, "experiencia": 5})),
            row(json!({"id": 2, "experiencia": "12"})),
            row(json!({"id": 3})),
        ];
        let state = FilterState::new().with_min("experiencia", 5.0);
        let filtered = apply_filters(&rows, SEARCH, &state);
        assert_eq!(filtered.len(), 2);

        let state = state.with_max("experiencia", 5.0);
        let filtered = apply_filters(&rows, SEARCH, &state);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, Key::Numeric(1));
    }

    #[test]
    fn predicate_changes_reset_the_page() {
        let state = FilterState::new().with_page(4).with_equals("estado", "pendiente");
        assert_eq!(state.page, 1);
        let state = state.with_page(3).with_page_size(20);
        assert_eq!(state.page, 1);
    }
}
