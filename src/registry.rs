//! Registry of filter pane managers
//!
//! Built once at start-up in two phases: every manager is registered, then
//! [`FilterManagerRegistry::initialize`] resets each one. After that, lookups
//! by pane id are expected to succeed; a miss means the pane was never wired
//! up and is reported as an error.

use crate::config::ReportConfig;
use crate::manager::{FilterManager, report_manager};
use chrono::NaiveDate;
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Stable identifier of a filter pane, e.g. `mgmt-report-filters`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FilterPaneId(String);

impl FilterPaneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FilterPaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FilterPaneId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for FilterPaneId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for FilterPaneId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("No filter manager registered for pane '{0}'")]
    UnknownPane(String),

    #[error("Filter pane '{0}' is already registered")]
    DuplicatePane(String),
}

#[derive(Debug, Default)]
pub struct FilterManagerRegistry {
    managers: BTreeMap<FilterPaneId, FilterManager>,
}

impl FilterManagerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a manager under its own pane id
    pub fn register(&mut self, manager: FilterManager) -> Result<(), RegistryError> {
        let id = manager.pane_id().clone();
        if self.managers.contains_key(&id) {
            return Err(RegistryError::DuplicatePane(id.to_string()));
        }
        self.managers.insert(id, manager);
        Ok(())
    }

    /// Reset every registered manager to its defaults
    pub fn initialize(&mut self) {
        for manager in self.managers.values_mut() {
            manager.reset_filters();
        }
        tracing::debug!(panes = self.managers.len(), "filter managers initialized");
    }

    /// Register all managers, then initialize
    pub fn bootstrap(
        managers: impl IntoIterator<Item = FilterManager>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for manager in managers {
            registry.register(manager)?;
        }
        registry.initialize();
        Ok(registry)
    }

    /// One report manager per configured pane
    pub fn from_config(config: &ReportConfig, today: NaiveDate) -> Result<Self, RegistryError> {
        Self::bootstrap(config.panes.iter().map(|pane| report_manager(pane, today)))
    }

    pub fn get(&self, id: &str) -> Result<&FilterManager, RegistryError> {
        self.managers.get(id).ok_or_else(|| unknown_pane(id))
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut FilterManager, RegistryError> {
        self.managers.get_mut(id).ok_or_else(|| unknown_pane(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.managers.contains_key(id)
    }

    pub fn pane_ids(&self) -> impl Iterator<Item = &FilterPaneId> {
        self.managers.keys()
    }

    pub fn len(&self) -> usize {
        self.managers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }
}

fn unknown_pane(id: &str) -> RegistryError {
    tracing::error!(pane = id, "lookup of unregistered filter pane");
    RegistryError::UnknownPane(id.to_string())
}
