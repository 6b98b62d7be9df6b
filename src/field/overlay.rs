use super::{SelectedValue, ValueShape};
use serde::Serialize;

/// One entry offered by a selection overlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlayOption {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl OverlayOption {
    pub fn plain(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            id: None,
        }
    }

    pub fn with_id(label: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            id: Some(id.into()),
        }
    }

    fn matches(&self, chosen: &str) -> bool {
        self.label == chosen || self.id.as_deref() == Some(chosen)
    }
}

/// An open selection overlay for one field
///
/// Created by opening a field; handed back when the user saves. Saving is
/// only accepted while the field has not been reset or reopened since.
#[derive(Debug, Clone, Serialize)]
pub struct OverlaySession {
    pub field_id: String,
    pub title: String,
    pub options: Vec<OverlayOption>,
    /// Labels (or keys, for keyed fields) currently selected
    pub preselected: Vec<String>,
    #[serde(skip)]
    pub(crate) generation: u64,
    #[serde(skip)]
    pub(crate) shape: ValueShape,
}

impl OverlaySession {
    /// Turn the user's choices into field values
    ///
    /// Choices match option labels or ids. Values keep the overlay's option
    /// order; choices that match no option are dropped.
    pub fn selection(&self, chosen: &[&str]) -> Vec<SelectedValue> {
        self.options
            .iter()
            .filter(|option| chosen.iter().any(|c| option.matches(c)))
            .map(|option| match (self.shape, &option.id) {
                (ValueShape::Labeled, Some(id)) => SelectedValue::labeled(id, &option.label),
                (ValueShape::Labeled, None) => {
                    SelectedValue::labeled(&option.label, &option.label)
                }
                (ValueShape::Scalar, Some(id)) => SelectedValue::coded(&option.label, id),
                (ValueShape::Scalar, None) => SelectedValue::plain(&option.label),
            })
            .collect()
    }
}
