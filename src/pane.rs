//! In-memory state of one filter pane's controls.

use crate::field::MultiSelectFilterField;
use crate::filter_object::FilterObject;
use crate::range::{Comparator, RangeFilter, RangeKind};
use std::collections::BTreeMap;

/// State a range control returns to on reset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeDefault {
    pub enabled: bool,
    pub comparator: Comparator,
    pub operand1: String,
    pub operand2: String,
}

/// A checkbox, a comparator selector and one or two operand inputs
#[derive(Debug, Clone)]
pub struct RangeControl {
    kind: RangeKind,
    saved_key: Option<String>,
    default: RangeDefault,
    pub enabled: bool,
    comparator: Comparator,
    comparator_label: String,
    pub operand1: String,
    pub operand2: String,
    secondary_visible: bool,
}

impl RangeControl {
    pub fn new(kind: RangeKind, default: RangeDefault) -> Self {
        let mut control = Self {
            kind,
            saved_key: None,
            default,
            enabled: false,
            comparator: Comparator::default(),
            comparator_label: String::new(),
            operand1: String::new(),
            operand2: String::new(),
            secondary_visible: false,
        };
        control.restore_default();
        control
    }

    pub fn with_saved_key(mut self, key: impl Into<String>) -> Self {
        self.saved_key = Some(key.into());
        self
    }

    pub fn kind(&self) -> RangeKind {
        self.kind
    }

    pub fn saved_key(&self) -> Option<&str> {
        self.saved_key.as_deref()
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    pub fn comparator_label(&self) -> &str {
        &self.comparator_label
    }

    /// Whether the second ("and") operand input is shown
    pub fn secondary_visible(&self) -> bool {
        self.secondary_visible
    }

    /// Select a comparator, updating its label and the second input
    pub fn set_comparator(&mut self, comparator: Comparator) {
        self.comparator = comparator;
        self.comparator_label = comparator.label().to_string();
        self.secondary_visible = comparator.is_between();
    }

    /// Current inputs as a filter, whether or not the control is enabled
    pub fn to_filter(&self) -> RangeFilter {
        RangeFilter::new(
            self.comparator,
            self.operand1.clone(),
            Some(self.operand2.clone()),
        )
    }

    /// Enable the control and fill it from a decoded filter
    pub fn set_filter(&mut self, filter: &RangeFilter) {
        self.enabled = true;
        self.set_comparator(filter.comparator());
        self.operand1 = filter.operand1().to_string();
        self.operand2 = filter.operand2().unwrap_or_default().to_string();
    }

    pub fn restore_default(&mut self) {
        self.enabled = self.default.enabled;
        self.set_comparator(self.default.comparator);
        self.operand1 = self.default.operand1.clone();
        self.operand2 = self.default.operand2.clone();
    }
}

/// Every control of one pane, plus the pane's in-memory filter object
#[derive(Debug, Clone, Default)]
pub struct PaneState {
    ranges: BTreeMap<String, RangeControl>,
    selections: BTreeMap<String, MultiSelectFilterField>,
    filter_object: FilterObject,
}

impl PaneState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_range(&mut self, id: impl Into<String>, control: RangeControl) {
        self.ranges.insert(id.into(), control);
    }

    pub fn add_selection(&mut self, field: MultiSelectFilterField) {
        self.selections.insert(field.id().to_string(), field);
    }

    pub fn range(&self, id: &str) -> Option<&RangeControl> {
        self.ranges.get(id)
    }

    pub fn range_mut(&mut self, id: &str) -> Option<&mut RangeControl> {
        self.ranges.get_mut(id)
    }

    pub fn selection(&self, id: &str) -> Option<&MultiSelectFilterField> {
        self.selections.get(id)
    }

    pub fn selection_mut(&mut self, id: &str) -> Option<&mut MultiSelectFilterField> {
        self.selections.get_mut(id)
    }

    pub fn ranges(&self) -> impl Iterator<Item = (&str, &RangeControl)> {
        self.ranges.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn ranges_mut(&mut self) -> impl Iterator<Item = (&str, &mut RangeControl)> {
        self.ranges.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn selections(&self) -> impl Iterator<Item = &MultiSelectFilterField> {
        self.selections.values()
    }

    pub fn selections_mut(&mut self) -> impl Iterator<Item = &mut MultiSelectFilterField> {
        self.selections.values_mut()
    }

    /// Field id stored under `saved_key` in saved filter sets
    ///
    /// A field without an explicit saved key is stored under its own id.
    pub fn field_for_saved_key(&self, saved_key: &str) -> Option<&str> {
        let range = self
            .ranges
            .iter()
            .find(|(id, c)| c.saved_key().unwrap_or(id) == saved_key)
            .map(|(id, _)| id.as_str());
        range.or_else(|| {
            self.selections
                .values()
                .find(|f| f.saved_key().unwrap_or(f.id()) == saved_key)
                .map(|f| f.id())
        })
    }

    /// The filter object last populated from a saved filter set
    pub fn filter_object(&self) -> &FilterObject {
        &self.filter_object
    }

    pub fn filter_object_mut(&mut self) -> &mut FilterObject {
        &mut self.filter_object
    }

    /// `(field id, summary)` for every control, ranges first
    pub fn summary(&self) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = self
            .ranges
            .iter()
            .map(|(id, c)| {
                let text = if !c.enabled {
                    "(off)".to_string()
                } else if c.secondary_visible() {
                    format!("{} {} and {}", c.comparator_label(), c.operand1, c.operand2)
                } else {
                    format!("{} {}", c.comparator_label(), c.operand1)
                };
                (id.clone(), text)
            })
            .collect();
        out.extend(
            self.selections
                .values()
                .map(|f| (f.id().to_string(), f.display().to_string())),
        );
        out
    }
}
