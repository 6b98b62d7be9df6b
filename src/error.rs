use crate::config::ConfigError;
use crate::field::{FieldError, SourceError};
use crate::range::RangeError;
use crate::registry::RegistryError;
use crate::saved::SavedFilterError;
use thiserror::Error;

/// Any error raised by the filter pane library
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Range(#[from] RangeError),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Saved(#[from] SavedFilterError),
}

pub type Result<T> = std::result::Result<T, Error>;
