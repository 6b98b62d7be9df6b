//! Hooks for the standard report filter panes
//!
//! Range fields are part of the output only while their checkbox is ticked;
//! multi-select fields only while they hold a selection. Either way a field
//! that is left out also drops off the active stack, so clearing a field and
//! alerting it removes it until it is touched again.

use super::{ActiveFieldStack, FilterManager};
use crate::config::{PaneSchema, SelectionSource, expand_operand};
use crate::field::behavior::{
    ConfigTableBehavior, DataSourceBehavior, HardcodedBehavior, PersonnelBehavior,
};
use crate::field::{BehaviorRegistry, MultiSelectFilterField, ValueShape};
use crate::filter_object::FilterObject;
use crate::pane::{PaneState, RangeControl, RangeDefault};
use crate::range::encode;
use chrono::NaiveDate;

pub fn report_materialize(pane: &mut PaneState, stack: &mut ActiveFieldStack) -> FilterObject {
    let mut filters = FilterObject::new();
    let mut included = ActiveFieldStack::new();

    for id in stack.iter() {
        if let Some(control) = pane.range(id) {
            if control.enabled {
                filters.insert(id, encode(&control.to_filter()));
                included.touch(id);
            }
        } else if let Some(field) = pane.selection(id) {
            if let Some(value) = field.outbound() {
                filters.insert(id, value);
                included.touch(id);
            }
        } else {
            tracing::debug!(field = id, "skipping unknown field");
        }
    }

    stack.replace(included);
    filters
}

/// Restore every control and reseed the pane's filter object
///
/// The filter object mirrors a saved set at its defaults: an empty list per
/// selection and the default token (or `""`) per range, under saved keys.
pub fn report_reset(pane: &mut PaneState, stack: &mut ActiveFieldStack) {
    let mut mirror = FilterObject::new();
    for field in pane.selections_mut() {
        field.reset();
        let key = field.saved_key().unwrap_or(field.id()).to_string();
        mirror.insert(key, Vec::<String>::new());
    }

    let mut defaults = ActiveFieldStack::new();
    for (id, control) in pane.ranges_mut() {
        control.restore_default();
        let key = control.saved_key().unwrap_or(id).to_string();
        if control.enabled {
            defaults.touch(id);
            mirror.insert(key, encode(&control.to_filter()));
        } else {
            mirror.insert(key, "");
        }
    }

    *pane.filter_object_mut() = mirror;
    stack.replace(defaults);
}

pub fn report_alert(_pane: &mut PaneState, stack: &mut ActiveFieldStack, field_id: &str) {
    stack.touch(field_id);
}

/// Build a report pane manager from its configured layout
///
/// `today` resolves `{year}` / `{last_year}` in default operands. The
/// manager is returned unreset; the registry resets it on bootstrap.
pub fn report_manager(schema: &PaneSchema, today: NaiveDate) -> FilterManager {
    let mut pane = PaneState::new();
    let mut behaviors = BehaviorRegistry::new();

    for range in &schema.ranges {
        let default = RangeDefault {
            enabled: range.enabled,
            comparator: range.comparator,
            operand1: expand_operand(&range.operand1, today),
            operand2: expand_operand(&range.operand2, today),
        };
        let mut control = RangeControl::new(range.kind, default);
        if let Some(key) = &range.saved_key {
            control = control.with_saved_key(key);
        }
        pane.add_range(&range.id, control);
    }

    for selection in &schema.selections {
        let shape = match selection.source {
            SelectionSource::Personnel { .. } => ValueShape::Labeled,
            _ => ValueShape::Scalar,
        };
        let title = if selection.title.is_empty() {
            &selection.id
        } else {
            &selection.title
        };
        let mut field = MultiSelectFilterField::new(&selection.id, title, shape);
        if let Some(key) = &selection.saved_key {
            field = field.with_saved_key(key);
        }
        pane.add_selection(field);

        match &selection.source {
            SelectionSource::DataSource {
                value_type,
                options_filter,
            } => behaviors.register(
                &selection.id,
                DataSourceBehavior {
                    value_type: value_type.clone().unwrap_or_else(|| selection.id.clone()),
                    options_filter: options_filter.build(),
                },
            ),
            SelectionSource::ConfigTable {
                table,
                with_codes,
                active_by_seq,
            } => behaviors.register(
                &selection.id,
                ConfigTableBehavior {
                    table: table.clone(),
                    with_codes: *with_codes,
                    active_by_seq: *active_by_seq,
                },
            ),
            SelectionSource::Hardcoded { options } => behaviors.register(
                &selection.id,
                HardcodedBehavior {
                    options: options.clone(),
                },
            ),
            SelectionSource::Personnel {
                sales_area_field,
                region_field,
            } => behaviors.register(
                &selection.id,
                PersonnelBehavior {
                    sales_area_field: sales_area_field.clone(),
                    region_field: region_field.clone(),
                },
            ),
        }
    }

    FilterManager::new(schema.id.as_str(), pane)
        .materialize_with(report_materialize)
        .reset_with(report_reset)
        .alert_with(report_alert)
        .with_behaviors(behaviors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_builtin_template;
    use crate::field::SelectedValue;
    use crate::filter_object::FilterValue;
    use crate::range::{Comparator, RangeFilter};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn mgmt_manager() -> FilterManager {
        let config = load_builtin_template("mgmt").unwrap();
        let mut manager = report_manager(config.pane("mgmt-report-filters").unwrap(), today());
        manager.reset_filters();
        manager
    }

    fn select(manager: &mut FilterManager, field: &str, values: Vec<SelectedValue>) {
        let f = manager.pane_mut().selection_mut(field).unwrap();
        f.set_values(values).unwrap();
        f.refresh_display();
        manager.alert(field);
    }

    #[test]
    fn test_default_filters() {
        let mut manager = mgmt_manager();
        let filters = manager.get_filters();
        assert_eq!(
            filters,
            FilterObject::new().with("closedDate", FilterValue::Text("2024-12-31AF".to_string()))
        );
    }

    #[test]
    fn test_reset_then_get_is_idempotent() {
        let mut manager = mgmt_manager();
        select(&mut manager, "regions", vec![SelectedValue::plain("East")]);

        manager.reset_filters();
        let first = manager.get_filters();
        manager.reset_filters();
        let second = manager.get_filters();
        assert_eq!(first, second);
        assert_eq!(manager.get_filters(), first);
    }

    #[test]
    fn test_cleared_field_drops_from_stack() {
        let mut manager = mgmt_manager();
        manager.alert("regions");
        let filters = manager.get_filters();
        assert!(!filters.contains_key("regions"));
        assert!(!manager.active_fields().contains("regions"));
    }

    #[test]
    fn test_clearing_after_touch_excludes_field() {
        let mut manager = mgmt_manager();
        select(&mut manager, "regions", vec![SelectedValue::plain("East")]);
        select(&mut manager, "sectors", vec![SelectedValue::plain("Energy")]);
        manager.clear_selection("regions").unwrap();

        let filters = manager.get_filters();
        assert!(!filters.contains_key("regions"));
        assert_eq!(filters.list("sectors"), Some(vec!["Energy"]));
    }

    #[test]
    fn test_selection_materializes_labels() {
        let mut manager = mgmt_manager();
        select(
            &mut manager,
            "regions",
            vec![
                SelectedValue::coded("Region A", "RA"),
                SelectedValue::coded("Region B", "RB"),
            ],
        );
        let filters = manager.get_filters();
        assert_eq!(filters.list("regions"), Some(vec!["Region A", "Region B"]));
    }

    #[test]
    fn test_disabled_range_is_left_out() {
        let mut manager = mgmt_manager();
        manager
            .set_range("oppVal", true, &RangeFilter::between("100", "500"))
            .unwrap();
        assert_eq!(
            manager.get_filters().range("oppVal"),
            Some(RangeFilter::between("100", "500"))
        );

        manager
            .set_range("oppVal", false, &RangeFilter::single(Comparator::Equal, "5"))
            .unwrap();
        let filters = manager.get_filters();
        assert!(!filters.contains_key("oppVal"));
        assert!(filters.contains_key("closedDate"));
    }

    #[test]
    fn test_unknown_alert_is_skipped() {
        let mut manager = mgmt_manager();
        manager.alert("noSuchField");
        let filters = manager.get_filters();
        assert_eq!(filters.len(), 1);
        assert!(!manager.active_fields().contains("noSuchField"));
    }

    #[test]
    fn test_reset_seeds_filter_object_by_saved_key() {
        let manager = mgmt_manager();
        let mirror = manager.pane().filter_object();
        assert_eq!(
            mirror.get("opp_date"),
            Some(&FilterValue::Text("2024-12-31AF".to_string()))
        );
        assert_eq!(mirror.get("opp_value"), Some(&FilterValue::Text(String::new())));
        assert_eq!(mirror.list("region"), Some(Vec::new()));
    }

    #[test]
    fn test_personnel_fields_are_keyed() {
        let manager = mgmt_manager();
        let owner = manager.pane().selection("oppOwner").unwrap();
        assert_eq!(owner.shape(), ValueShape::Labeled);
        assert_eq!(owner.saved_key(), Some("opp_owner"));
    }
}
