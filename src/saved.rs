//! Saved filter sets
//!
//! A saved set is a flat mapping from saved key (`region`, `opp_date`, ...) to
//! the value the user had selected. Applying one resets the pane, then fills
//! every field the set names and mirrors the values in the pane's filter
//! object.
//!
//! # Examples
//!
//! ```json5
//! {
//!   "q4-east": {
//!     name: "Q4 East",
//!     filters: {
//!       region: ["East"],
//!       opp_date: "2024-10-01BN2024-12-31",
//!       opp_owner: [{ key: "E100", label: "Ann Smith" }],
//!     },
//!   },
//! }
//! ```

use crate::field::{SelectedValue, ValueShape};
use crate::filter_object::{FilterObject, FilterValue};
use crate::manager::FilterManager;
use crate::range::encode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SavedFilterError {
    #[error("Failed to read saved filters '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse saved filters '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: json5::Error,
    },
    #[error("Unknown saved filter set: '{0}'")]
    UnknownSet(String),
}

/// A named, persisted filter object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavedFilterSet {
    pub name: String,
    pub filters: FilterObject,
}

/// Saved filter sets keyed by identifier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedFilterStore(BTreeMap<String, SavedFilterSet>);

impl SavedFilterStore {
    /// Load a store from a JSON or JSON5 file
    pub fn load(path: &Path) -> Result<Self, SavedFilterError> {
        let path_display = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| SavedFilterError::Read {
            path: path_display.clone(),
            source,
        })?;
        Self::parse(&raw).map_err(|source| SavedFilterError::Parse {
            path: path_display,
            source,
        })
    }

    pub fn parse(raw: &str) -> Result<Self, json5::Error> {
        json5::from_str(raw)
    }

    pub fn get(&self, id: &str) -> Option<&SavedFilterSet> {
        self.0.get(id)
    }

    pub fn insert(&mut self, id: impl Into<String>, set: SavedFilterSet) {
        self.0.insert(id.into(), set);
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What happened to each entry of an applied set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyOutcome {
    /// Field ids that were filled from the set
    pub applied: Vec<String>,
    /// Saved keys that matched no field or carried an unusable value
    pub ignored: Vec<String>,
    /// No set was given; the pane was only reset
    pub reset_only: bool,
}

pub struct SavedFilterMapper;

impl SavedFilterMapper {
    /// Reset the pane, then fill it from `set`
    ///
    /// With no set the pane is left at its defaults.
    pub fn apply(manager: &mut FilterManager, set: Option<&SavedFilterSet>) -> ApplyOutcome {
        manager.reset_filters();

        let Some(set) = set else {
            return ApplyOutcome {
                reset_only: true,
                ..Default::default()
            };
        };

        let mut outcome = ApplyOutcome::default();
        for (key, value) in set.filters.iter() {
            let Some(field_id) = manager.pane().field_for_saved_key(key).map(str::to_string)
            else {
                tracing::debug!(pane = %manager.pane_id(), key, "ignoring unknown saved key");
                outcome.ignored.push(key.to_string());
                continue;
            };

            let applied = if manager.pane().range(&field_id).is_some() {
                apply_range(manager, &field_id, key, value)
            } else {
                apply_selection(manager, &field_id, key, value)
            };

            if applied {
                outcome.applied.push(field_id);
            } else {
                outcome.ignored.push(key.to_string());
            }
        }
        outcome
    }

    /// Apply the set stored under `id`; an empty id resets the pane
    pub fn apply_selected(
        manager: &mut FilterManager,
        store: &SavedFilterStore,
        id: &str,
    ) -> Result<ApplyOutcome, SavedFilterError> {
        let id = id.trim();
        if id.is_empty() {
            return Ok(Self::apply(manager, None));
        }
        let set = store
            .get(id)
            .ok_or_else(|| SavedFilterError::UnknownSet(id.to_string()))?;
        Ok(Self::apply(manager, Some(set)))
    }
}

fn apply_range(
    manager: &mut FilterManager,
    field_id: &str,
    key: &str,
    value: &FilterValue,
) -> bool {
    let Some(token) = value.as_text() else {
        tracing::debug!(field = field_id, "saved value for a range is not a token");
        return false;
    };
    let pane = manager.pane_mut();
    if token.is_empty() {
        // No range filter was set when the set was saved
        if let Some(control) = pane.range_mut(field_id) {
            control.enabled = false;
        }
        pane.filter_object_mut().insert(key, "");
        manager.alert(field_id);
        return true;
    }
    let Some(filter) = crate::range::decode(token) else {
        tracing::warn!(field = field_id, token, "saved range token does not decode");
        return false;
    };

    if let Some(control) = pane.range_mut(field_id) {
        control.set_filter(&filter);
    }
    pane.filter_object_mut().insert(key, encode(&filter));
    manager.alert(field_id);
    true
}

fn apply_selection(
    manager: &mut FilterManager,
    field_id: &str,
    key: &str,
    value: &FilterValue,
) -> bool {
    let pane = manager.pane_mut();
    let Some(field) = pane.selection_mut(field_id) else {
        return false;
    };
    let Some(values) = selected_values(field.shape(), value) else {
        tracing::debug!(field = field_id, "saved value for a selection is not a list");
        return false;
    };

    let has_values = !values.is_empty();
    if let Err(e) = field.set_values(values) {
        tracing::warn!(field = field_id, error = %e, "could not apply saved selection");
        return false;
    }
    field.refresh_display();
    pane.filter_object_mut().insert(key, value.clone());

    if has_values {
        manager.alert(field_id);
    }
    true
}

fn selected_values(shape: ValueShape, value: &FilterValue) -> Option<Vec<SelectedValue>> {
    let values = match (shape, value) {
        (ValueShape::Scalar, FilterValue::List(items)) => {
            items.iter().map(SelectedValue::plain).collect()
        }
        (ValueShape::Scalar, FilterValue::Labeled(items)) => items
            .iter()
            .map(|item| SelectedValue::plain(&item.label))
            .collect(),
        (ValueShape::Labeled, FilterValue::Labeled(items)) => items
            .iter()
            .cloned()
            .map(SelectedValue::Labeled)
            .collect(),
        (ValueShape::Labeled, FilterValue::List(items)) => items
            .iter()
            .map(|item| SelectedValue::labeled(item, item))
            .collect(),
        _ => return None,
    };
    Some(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_builtin_template;
    use crate::field::ALL_MARKER;
    use crate::manager::report_manager;
    use crate::range::{Comparator, RangeFilter};
    use chrono::NaiveDate;

    fn mgmt_manager() -> FilterManager {
        let config = load_builtin_template("mgmt").unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let mut manager = report_manager(config.pane("mgmt-report-filters").unwrap(), today);
        manager.reset_filters();
        manager
    }

    fn store() -> SavedFilterStore {
        SavedFilterStore::parse(
            r#"{
                // trailing commas and comments are fine
                "q4": {
                    name: "Q4 East",
                    filters: {
                        region: ["East", "West"],
                        opp_value: "100BN500",
                        opp_owner: [{ key: "E1", label: "Ann" }],
                        retired_key: ["x"],
                    },
                },
                "empty-region": { name: "No region", filters: { region: [] } },
                "date-off": { name: "Any date", filters: { opp_date: "" } },
                "bad-ranges": { name: "Bad", filters: { opp_value: 500, opp_date: ["x"] } },
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_apply_fills_fields() {
        let mut manager = mgmt_manager();
        let store = store();
        let outcome = SavedFilterMapper::apply(&mut manager, store.get("q4"));

        assert_eq!(outcome.ignored, vec!["retired_key".to_string()]);
        assert!(!outcome.reset_only);

        let regions = manager.pane().selection("regions").unwrap();
        assert_eq!(regions.display(), "East, West");

        let value = manager.pane().range("oppVal").unwrap();
        assert!(value.enabled);
        assert_eq!(value.comparator(), Comparator::Between);
        assert!(value.secondary_visible());
        assert_eq!(value.comparator_label(), "BETWEEN");
        assert_eq!(value.operand1, "100");
        assert_eq!(value.operand2, "500");

        let owners = manager.pane().selection("oppOwner").unwrap();
        assert_eq!(owners.get_values(), &[SelectedValue::labeled("E1", "Ann")]);

        let filters = manager.get_filters();
        assert_eq!(filters.list("regions"), Some(vec!["East", "West"]));
        assert_eq!(filters.range("oppVal"), Some(RangeFilter::between("100", "500")));
        assert!(filters.contains_key("closedDate"));
    }

    #[test]
    fn test_empty_region_shows_all() {
        let mut manager = mgmt_manager();
        let store = store();
        SavedFilterMapper::apply_selected(&mut manager, &store, "q4").unwrap();
        SavedFilterMapper::apply_selected(&mut manager, &store, "empty-region").unwrap();

        assert_eq!(manager.pane().selection("regions").unwrap().display(), ALL_MARKER);
        assert_eq!(manager.pane().filter_object().list("region"), Some(Vec::new()));
        assert!(!manager.get_filters().contains_key("regions"));
    }

    #[test]
    fn test_empty_range_token_turns_range_off() {
        let mut manager = mgmt_manager();
        let store = store();
        let outcome = SavedFilterMapper::apply(&mut manager, store.get("date-off"));

        assert_eq!(outcome.applied, vec!["closedDate".to_string()]);
        assert!(!manager.pane().range("closedDate").unwrap().enabled);
        assert_eq!(
            manager.pane().filter_object().get("opp_date"),
            Some(&FilterValue::Text(String::new()))
        );
        assert!(!manager.get_filters().contains_key("closedDate"));
    }

    #[test]
    fn test_non_text_range_values_are_ignored() {
        let mut manager = mgmt_manager();
        let store = store();
        let outcome = SavedFilterMapper::apply(&mut manager, store.get("bad-ranges"));

        assert!(outcome.applied.is_empty());
        assert_eq!(
            outcome.ignored,
            vec!["opp_date".to_string(), "opp_value".to_string()]
        );
        assert!(!manager.pane().range("oppVal").unwrap().enabled);
        assert!(manager.get_filters().contains_key("closedDate"));
    }

    #[test]
    fn test_empty_id_resets() {
        let mut manager = mgmt_manager();
        let store = store();
        SavedFilterMapper::apply_selected(&mut manager, &store, "q4").unwrap();
        let outcome = SavedFilterMapper::apply_selected(&mut manager, &store, "  ").unwrap();

        assert!(outcome.reset_only);
        assert_eq!(manager.pane().selection("regions").unwrap().display(), ALL_MARKER);
        assert!(!manager.pane().range("oppVal").unwrap().enabled);
    }

    #[test]
    fn test_unknown_set_is_an_error() {
        let mut manager = mgmt_manager();
        let err = SavedFilterMapper::apply_selected(&mut manager, &store(), "nope").unwrap_err();
        assert!(matches!(err, SavedFilterError::UnknownSet(_)));
    }

    #[test]
    fn test_single_comparator_hides_second_input() {
        let mut manager = mgmt_manager();
        let set = SavedFilterSet {
            name: "after".to_string(),
            filters: FilterObject::new().with("opp_date", "2023-06-30AF"),
        };
        SavedFilterMapper::apply(&mut manager, Some(&set));

        let date = manager.pane().range("closedDate").unwrap();
        assert_eq!(date.comparator(), Comparator::After);
        assert!(!date.secondary_visible());
        assert_eq!(date.operand1, "2023-06-30");
        assert_eq!(
            manager.pane().filter_object().get("opp_date"),
            Some(&FilterValue::Text("2023-06-30AF".to_string()))
        );
    }
}
