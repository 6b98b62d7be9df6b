//! Filter pane managers
//!
//! A [`FilterManager`] owns one pane's controls and answers "what is
//! currently selected" with a [`FilterObject`]. It never materializes on its
//! own: field changes are recorded with [`FilterManager::alert`] and the
//! filter object is computed on the next [`FilterManager::get_filters`].
//!
//! The three hooks are optional. A manager without a materialize hook yields
//! an empty object; without a reset or alert hook those calls do nothing.

pub mod report;

use crate::consumer::DataConsumer;
use crate::field::{BehaviorRegistry, FieldEnv, FieldError, OpenEnv, OverlaySession};
use crate::filter_object::FilterObject;
use crate::pane::PaneState;
use crate::range::RangeFilter;
use crate::registry::FilterPaneId;
use std::collections::BTreeSet;
use std::fmt;

pub use report::{report_alert, report_manager, report_materialize, report_reset};

/// Ids of the fields touched since the last reset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveFieldStack(BTreeSet<String>);

impl ActiveFieldStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touch(&mut self, field_id: impl Into<String>) {
        self.0.insert(field_id.into());
    }

    pub fn contains(&self, field_id: &str) -> bool {
        self.0.contains(field_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Replace the whole stack
    pub fn replace(&mut self, other: ActiveFieldStack) {
        *self = other;
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ActiveFieldStack {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

pub type MaterializeFn = Box<dyn Fn(&mut PaneState, &mut ActiveFieldStack) -> FilterObject>;
pub type ResetFn = Box<dyn Fn(&mut PaneState, &mut ActiveFieldStack)>;
pub type AlertFn = Box<dyn Fn(&mut PaneState, &mut ActiveFieldStack, &str)>;

/// Whether a manager has seen field changes since its last reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Default,
    Dirty,
}

pub struct FilterManager {
    pane_id: FilterPaneId,
    pane: PaneState,
    active: ActiveFieldStack,
    state: ManagerState,
    materialize: Option<MaterializeFn>,
    reset: Option<ResetFn>,
    on_alert: Option<AlertFn>,
    behaviors: BehaviorRegistry,
    consumer: Option<Box<dyn DataConsumer>>,
}

impl fmt::Debug for FilterManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterManager")
            .field("pane_id", &self.pane_id)
            .field("state", &self.state)
            .field("active", &self.active)
            .field("has_materialize", &self.materialize.is_some())
            .field("has_reset", &self.reset.is_some())
            .field("has_alert", &self.on_alert.is_some())
            .field("behaviors", &self.behaviors)
            .finish_non_exhaustive()
    }
}

impl FilterManager {
    pub fn new(pane_id: impl Into<FilterPaneId>, pane: PaneState) -> Self {
        Self {
            pane_id: pane_id.into(),
            pane,
            active: ActiveFieldStack::new(),
            state: ManagerState::Default,
            materialize: None,
            reset: None,
            on_alert: None,
            behaviors: BehaviorRegistry::new(),
            consumer: None,
        }
    }

    pub fn materialize_with(
        mut self,
        f: impl Fn(&mut PaneState, &mut ActiveFieldStack) -> FilterObject + 'static,
    ) -> Self {
        self.materialize = Some(Box::new(f));
        self
    }

    pub fn reset_with(
        mut self,
        f: impl Fn(&mut PaneState, &mut ActiveFieldStack) + 'static,
    ) -> Self {
        self.reset = Some(Box::new(f));
        self
    }

    pub fn alert_with(
        mut self,
        f: impl Fn(&mut PaneState, &mut ActiveFieldStack, &str) + 'static,
    ) -> Self {
        self.on_alert = Some(Box::new(f));
        self
    }

    pub fn with_behaviors(mut self, behaviors: BehaviorRegistry) -> Self {
        self.behaviors = behaviors;
        self
    }

    pub fn with_consumer(mut self, consumer: impl DataConsumer + 'static) -> Self {
        self.consumer = Some(Box::new(consumer));
        self
    }

    pub fn set_consumer(&mut self, consumer: Box<dyn DataConsumer>) {
        self.consumer = Some(consumer);
    }

    pub fn pane_id(&self) -> &FilterPaneId {
        &self.pane_id
    }

    pub fn pane(&self) -> &PaneState {
        &self.pane
    }

    /// Direct access to the controls; follow every change with
    /// [`alert`](Self::alert)
    pub fn pane_mut(&mut self) -> &mut PaneState {
        &mut self.pane
    }

    pub fn active_fields(&self) -> &ActiveFieldStack {
        &self.active
    }

    pub fn state(&self) -> ManagerState {
        self.state
    }

    /// Materialize the current filter object
    pub fn get_filters(&mut self) -> FilterObject {
        match &self.materialize {
            Some(materialize) => materialize(&mut self.pane, &mut self.active),
            None => FilterObject::new(),
        }
    }

    /// Put every control back to its default
    pub fn reset_filters(&mut self) {
        if let Some(reset) = &self.reset {
            reset(&mut self.pane, &mut self.active);
        }
        self.state = ManagerState::Default;
    }

    /// Record that `field_id` changed; nothing is materialized here
    pub fn alert(&mut self, field_id: &str) {
        if let Some(on_alert) = &self.on_alert {
            on_alert(&mut self.pane, &mut self.active, field_id);
        }
        self.state = ManagerState::Dirty;
    }

    /// Update a range control and record the change
    pub fn set_range(
        &mut self,
        field_id: &str,
        enabled: bool,
        filter: &RangeFilter,
    ) -> Result<(), FieldError> {
        let control = self
            .pane
            .range_mut(field_id)
            .ok_or_else(|| FieldError::UnknownField(field_id.to_string()))?;
        control.set_filter(filter);
        control.enabled = enabled;
        self.alert(field_id);
        Ok(())
    }

    /// Clear a multi-select field and record the change
    pub fn clear_selection(&mut self, field_id: &str) -> Result<(), FieldError> {
        let field = self
            .pane
            .selection_mut(field_id)
            .ok_or_else(|| FieldError::UnknownField(field_id.to_string()))?;
        field.reset();
        self.alert(field_id);
        Ok(())
    }

    /// Open a field's selection overlay
    ///
    /// Options are loaded through the field's registered behavior. A failure
    /// leaves the field exactly as it was.
    pub fn open_field(
        &mut self,
        field_id: &str,
        env: FieldEnv<'_>,
    ) -> Result<OverlaySession, FieldError> {
        if self.pane.selection(field_id).is_none() {
            return Err(FieldError::UnknownField(field_id.to_string()));
        }
        let behavior = self
            .behaviors
            .get(field_id)
            .ok_or_else(|| FieldError::NoBehavior(field_id.to_string()))?;

        let pane_filters = match &self.materialize {
            Some(materialize) => materialize(&mut self.pane, &mut self.active),
            None => FilterObject::new(),
        };
        let field = self
            .pane
            .selection(field_id)
            .ok_or_else(|| FieldError::UnknownField(field_id.to_string()))?;

        let content = behavior
            .load(field, &OpenEnv::new(env, &pane_filters))
            .inspect_err(|e| {
                tracing::error!(pane = %self.pane_id, field = field_id, error = %e, "could not load options");
            })?;

        let field = self
            .pane
            .selection_mut(field_id)
            .ok_or_else(|| FieldError::UnknownField(field_id.to_string()))?;
        let generation = field.begin_open();

        Ok(OverlaySession {
            field_id: field_id.to_string(),
            title: field.title().to_string(),
            options: content.options,
            preselected: content.preselected,
            generation,
            shape: field.shape(),
        })
    }

    /// Apply the choices made in an overlay
    ///
    /// Sets the values, refreshes the summary and alerts the manager. Rejects
    /// sessions for a field that was reset or reopened in the meantime.
    pub fn save_overlay(
        &mut self,
        session: &OverlaySession,
        chosen: &[&str],
    ) -> Result<(), FieldError> {
        let field = self
            .pane
            .selection_mut(&session.field_id)
            .ok_or_else(|| FieldError::UnknownField(session.field_id.clone()))?;

        if !field.accepts(session.generation) {
            tracing::warn!(
                pane = %self.pane_id,
                field = %session.field_id,
                "ignoring save from a stale overlay"
            );
            return Err(FieldError::StaleOverlay(session.field_id.clone()));
        }

        field.set_values(session.selection(chosen))?;
        field.refresh_display();
        field.end_open();
        self.alert(&session.field_id);
        Ok(())
    }

    /// Close an overlay without saving
    pub fn cancel_overlay(&mut self, session: &OverlaySession) {
        if let Some(field) = self.pane.selection_mut(&session.field_id)
            && field.accepts(session.generation)
        {
            field.end_open();
        }
    }

    /// Materialize and hand the filters to the data consumer
    pub fn apply(&mut self) -> FilterObject {
        let filters = self.get_filters();
        if let Some(consumer) = self.consumer.as_mut() {
            consumer.update_filters(&filters);
            consumer.get_new_data();
        }
        filters
    }

    /// Reset to defaults, then apply
    pub fn reset_and_apply(&mut self) -> FilterObject {
        self.reset_filters();
        self.apply()
    }
}
