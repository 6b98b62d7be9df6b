//! Multi-select filter fields
//!
//! A field holds the values a user picked for one multi-valued filter
//! (regions, sectors, opportunity owners, ...) and the one-line summary shown
//! in the filter pane. Where the options come from when the field is opened
//! is decided by the [`behavior::SelectionBehavior`] registered for the field.

pub mod behavior;
pub mod options_filter;
pub mod overlay;
pub mod source;

use crate::filter_object::{FilterValue, LabeledKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use behavior::{BehaviorRegistry, FieldEnv, OpenEnv, OverlayContent, SelectionBehavior};
pub use options_filter::{FilterParams, OptionsFilter, ResolveContext, ViewContext};
pub use overlay::{OverlayOption, OverlaySession};
pub use source::{OptionItem, OptionSource, OrgNode, SourceError, StaticOptionSource};

/// Summary shown for a field with nothing selected
pub const ALL_MARKER: &str = "(all)";

/// Errors raised while opening or updating a field
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("Unknown field: '{0}'")]
    UnknownField(String),

    #[error("No selection behavior registered for field '{0}'")]
    NoBehavior(String),

    #[error("Field '{field}' holds {expected} values, got {got}")]
    ShapeMismatch {
        field: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("Selection for field '{0}' is stale: the field was reset or reopened")]
    StaleOverlay(String),

    #[error("Unknown configuration table: '{0}'")]
    UnknownTable(String),

    #[error("Failed to load options for field '{field}': {source}")]
    Source {
        field: String,
        #[source]
        source: SourceError,
    },
}

/// One selected entry of a field
///
/// Serializes as a plain string, a `[label, code]` pair or a `{key, label}`
/// object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectedValue {
    Coded(String, String),
    Labeled(LabeledKey),
    Plain(String),
}

impl SelectedValue {
    pub fn plain(label: impl Into<String>) -> Self {
        SelectedValue::Plain(label.into())
    }

    pub fn coded(label: impl Into<String>, code: impl Into<String>) -> Self {
        SelectedValue::Coded(label.into(), code.into())
    }

    pub fn labeled(key: impl Into<String>, label: impl Into<String>) -> Self {
        SelectedValue::Labeled(LabeledKey::new(key, label))
    }

    /// The text shown for this entry
    pub fn label(&self) -> &str {
        match self {
            SelectedValue::Coded(label, _) => label,
            SelectedValue::Labeled(labeled) => &labeled.label,
            SelectedValue::Plain(label) => label,
        }
    }

    fn shape(&self) -> ValueShape {
        match self {
            SelectedValue::Labeled(_) => ValueShape::Labeled,
            _ => ValueShape::Scalar,
        }
    }
}

/// What kind of values a field holds, fixed when the field is configured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueShape {
    /// Plain labels or `[label, code]` pairs
    #[default]
    Scalar,
    /// `{key, label}` objects (personnel)
    Labeled,
}

impl ValueShape {
    fn name(&self) -> &'static str {
        match self {
            ValueShape::Scalar => "label",
            ValueShape::Labeled => "keyed",
        }
    }
}

/// A multi-valued filter control
#[derive(Debug, Clone)]
pub struct MultiSelectFilterField {
    id: String,
    title: String,
    saved_key: Option<String>,
    shape: ValueShape,
    values: Vec<SelectedValue>,
    display: String,
    // Bumped on every open and reset; an overlay may only save while it
    // still holds the current generation.
    generation: u64,
    open: bool,
}

impl MultiSelectFilterField {
    pub fn new(id: impl Into<String>, title: impl Into<String>, shape: ValueShape) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            saved_key: None,
            shape,
            values: Vec::new(),
            display: ALL_MARKER.to_string(),
            generation: 0,
            open: false,
        }
    }

    /// Key this field is stored under in saved filter sets
    pub fn with_saved_key(mut self, key: impl Into<String>) -> Self {
        self.saved_key = Some(key.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn saved_key(&self) -> Option<&str> {
        self.saved_key.as_deref()
    }

    pub fn shape(&self) -> ValueShape {
        self.shape
    }

    pub fn get_values(&self) -> &[SelectedValue] {
        &self.values
    }

    /// Replace the selection; the summary is left alone until
    /// [`refresh_display`](Self::refresh_display)
    pub fn set_values(&mut self, values: Vec<SelectedValue>) -> Result<(), FieldError> {
        if let Some(bad) = values.iter().find(|v| v.shape() != self.shape) {
            return Err(FieldError::ShapeMismatch {
                field: self.id.clone(),
                expected: self.shape.name(),
                got: bad.shape().name(),
            });
        }
        self.values = values;
        Ok(())
    }

    /// Recompute the summary: comma-joined labels, or `(all)`
    pub fn refresh_display(&mut self) {
        self.display = if self.values.is_empty() {
            ALL_MARKER.to_string()
        } else {
            self.values
                .iter()
                .map(SelectedValue::label)
                .collect::<Vec<_>>()
                .join(", ")
        };
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    /// Clear the selection and refresh the summary
    ///
    /// Any overlay opened before the reset can no longer save.
    pub fn reset(&mut self) {
        self.values.clear();
        self.refresh_display();
        self.generation += 1;
        self.open = false;
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value placed in a materialized filter object, `None` when empty
    ///
    /// `[label, code]` pairs contribute their label, not their code.
    pub fn outbound(&self) -> Option<FilterValue> {
        if self.values.is_empty() {
            return None;
        }
        let value = match self.shape {
            ValueShape::Labeled => FilterValue::Labeled(
                self.values
                    .iter()
                    .filter_map(|v| match v {
                        SelectedValue::Labeled(labeled) => Some(labeled.clone()),
                        _ => None,
                    })
                    .collect(),
            ),
            ValueShape::Scalar => FilterValue::List(
                self.values
                    .iter()
                    .map(|v| v.label().to_string())
                    .collect(),
            ),
        };
        Some(value)
    }

    /// Labels or keys the overlay should show as already selected
    pub(crate) fn preselected(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|v| match v {
                SelectedValue::Labeled(labeled) => labeled.key.clone(),
                other => other.label().to_string(),
            })
            .collect()
    }

    pub(crate) fn begin_open(&mut self) -> u64 {
        self.generation += 1;
        self.open = true;
        self.generation
    }

    pub(crate) fn accepts(&self, generation: u64) -> bool {
        self.open && self.generation == generation
    }

    pub(crate) fn end_open(&mut self) {
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regions() -> MultiSelectFilterField {
        MultiSelectFilterField::new("regions", "Regions", ValueShape::Scalar)
    }

    #[test]
    fn test_new_field_shows_all() {
        let field = regions();
        assert_eq!(field.display(), ALL_MARKER);
        assert!(field.outbound().is_none());
    }

    #[test]
    fn test_outbound_prefers_label_over_code() {
        let mut field = regions();
        field
            .set_values(vec![
                SelectedValue::coded("Region A", "RA"),
                SelectedValue::coded("Region B", "RB"),
            ])
            .unwrap();
        assert_eq!(
            field.outbound(),
            Some(FilterValue::List(vec![
                "Region A".to_string(),
                "Region B".to_string()
            ]))
        );
    }

    #[test]
    fn test_refresh_display_joins_labels() {
        let mut field = regions();
        field
            .set_values(vec![
                SelectedValue::plain("North"),
                SelectedValue::coded("South", "S"),
            ])
            .unwrap();
        assert_eq!(field.display(), ALL_MARKER);
        field.refresh_display();
        assert_eq!(field.display(), "North, South");
    }

    #[test]
    fn test_reset_clears_and_refreshes() {
        let mut field = regions();
        field.set_values(vec![SelectedValue::plain("North")]).unwrap();
        field.refresh_display();
        field.reset();
        assert!(field.is_empty());
        assert_eq!(field.display(), ALL_MARKER);
    }

    #[test]
    fn test_shape_is_enforced() {
        let mut owners = MultiSelectFilterField::new("oppOwner", "Owner", ValueShape::Labeled);
        let err = owners
            .set_values(vec![SelectedValue::plain("Ann")])
            .unwrap_err();
        assert!(matches!(err, FieldError::ShapeMismatch { .. }));
        owners
            .set_values(vec![SelectedValue::labeled("E1", "Ann")])
            .unwrap();
        assert_eq!(
            owners.outbound(),
            Some(FilterValue::Labeled(vec![LabeledKey::new("E1", "Ann")]))
        );
    }

    #[test]
    fn test_selected_value_serde_shapes() {
        let values: Vec<SelectedValue> =
            serde_json::from_str(r#"["North", ["Region A", "RA"], {"key": "E1", "label": "Ann"}]"#)
                .unwrap();
        assert_eq!(
            values,
            vec![
                SelectedValue::plain("North"),
                SelectedValue::coded("Region A", "RA"),
                SelectedValue::labeled("E1", "Ann"),
            ]
        );
    }

    #[test]
    fn test_reset_invalidates_open_generation() {
        let mut field = regions();
        let generation = field.begin_open();
        assert!(field.accepts(generation));
        field.reset();
        assert!(!field.accepts(generation));
    }
}
