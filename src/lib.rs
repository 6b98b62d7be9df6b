pub mod cli;
pub mod config;
pub mod consumer;
pub mod display;
pub mod error;
pub mod field;
pub mod filter_object;
pub mod manager;
pub mod pane;
pub mod range;
pub mod registry;
pub mod saved;

use crate::config::ReportConfig;
use crate::display::*;
use anyhow::{Context, bail};
use chrono::NaiveDate;
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub use cli::{ColorMode, Commands, OutputFormat, cli_parse};
pub use consumer::DataConsumer;
pub use error::{Error, Result};
pub use field::{
    FieldEnv, MultiSelectFilterField, OptionSource, OverlaySession, SelectedValue,
    StaticOptionSource, ValueShape, ViewContext,
};
pub use filter_object::{FilterObject, FilterValue, LabeledKey};
pub use manager::{ActiveFieldStack, FilterManager, ManagerState};
pub use pane::{PaneState, RangeControl};
pub use range::{Comparator, EncodedRangeToken, RangeFilter, RangeKind, decode, encode};
pub use registry::{FilterManagerRegistry, FilterPaneId, RegistryError};
pub use saved::{ApplyOutcome, SavedFilterMapper, SavedFilterSet, SavedFilterStore};

/// Build the registry for every pane in `config`
pub fn load_registry(config: &ReportConfig, today: NaiveDate) -> Result<FilterManagerRegistry> {
    Ok(FilterManagerRegistry::from_config(config, today)?)
}

fn load_source(path: Option<&Path>) -> Result<StaticOptionSource> {
    match path {
        Some(path) => Ok(StaticOptionSource::load(path)?),
        None => Ok(StaticOptionSource::default()),
    }
}

/// Open `field_id`, optionally save `select`, and return the session
fn open_and_select(
    manager: &mut FilterManager,
    field_id: &str,
    env: FieldEnv<'_>,
    select: &[String],
) -> Result<OverlaySession> {
    let session = manager.open_field(field_id, env)?;
    if !select.is_empty() {
        let chosen: Vec<&str> = select.iter().map(String::as_str).collect();
        manager.save_overlay(&session, &chosen)?;
    }
    Ok(session)
}

fn emit(format: OutputFormat, text: impl FnOnce() -> String, json: impl FnOnce() -> String) {
    match format {
        OutputFormat::Text => print!("{}", text()),
        OutputFormat::Json => println!("{}", json()),
    }
}

/// Log to stderr; `RUST_LOG` overrides the `-v` count
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run() -> anyhow::Result<()> {
    let cli = cli_parse();
    init_logging(cli.verbose);

    match cli.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }

    let config = config::load_config(cli.config.as_deref()).context("Failed to load config")?;
    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    tracing::debug!(profile = %config.profile_name, %today, "configuration loaded");

    let format = cli.format;
    match &cli.command {
        Commands::Encode {
            comparator,
            operand1,
            operand2,
            kind,
        } => {
            let filter = RangeFilter::new(*comparator, operand1.as_str(), operand2.as_deref());
            if let Some(kind) = kind {
                filter
                    .validate("range", *kind)
                    .context("Invalid range filter")?;
            }
            let token = encode(&filter);
            emit(
                format,
                || format_range_text(&token, Some(&filter)),
                || format_range_json(&token, Some(&filter)),
            );
        }
        Commands::Decode { token } => {
            let token = EncodedRangeToken::from(token.as_str());
            let filter = token.decode();
            emit(
                format,
                || format_range_text(&token, filter.as_ref()),
                || format_range_json(&token, filter.as_ref()),
            );
        }
        Commands::Panes => {
            emit(
                format,
                || format_panes_text(&config),
                || format_panes_json(&config),
            );
        }
        Commands::Show { pane } => {
            let mut registry = load_registry(&config, today)?;
            let manager = registry.get_mut(pane)?;
            let filters = manager.get_filters();
            emit(
                format,
                || format_pane_text(pane, manager.pane(), &filters),
                || format_pane_json(pane, manager.pane(), &filters),
            );
        }
        Commands::Apply { pane, saved, name } => {
            let store = SavedFilterStore::load(saved)
                .with_context(|| format!("Failed to load saved filters '{}'", saved.display()))?;
            let mut registry = load_registry(&config, today)?;
            let manager = registry.get_mut(pane)?;
            let outcome =
                SavedFilterMapper::apply_selected(manager, &store, name.as_deref().unwrap_or(""))?;
            let filters = manager.get_filters();
            emit(
                format,
                || format_apply_text(pane, name.as_deref(), &outcome, manager.pane(), &filters),
                || format_apply_json(pane, &outcome, manager.pane(), &filters),
            );
        }
        Commands::Options {
            pane,
            field,
            source,
            roles,
            select,
        } => {
            let source = load_source(source.as_deref())?;
            let view = ViewContext {
                myself: true,
                user_roles: roles.clone(),
                ..Default::default()
            };
            let env = FieldEnv {
                source: &source,
                tables: &config.tables,
                view: &view,
            };

            let mut registry = load_registry(&config, today)?;
            let manager = registry.get_mut(pane)?;
            if manager.pane().range(field).is_some() {
                bail!("Field '{field}' is a range field; it has no options");
            }
            let session = open_and_select(manager, field, env, select)
                .with_context(|| format!("Failed to open field '{field}'"))?;

            if select.is_empty() {
                emit(
                    format,
                    || format_options_text(&session),
                    || format_options_json(&session),
                );
            } else {
                let filters = manager.get_filters();
                emit(
                    format,
                    || {
                        let mut out = format_options_text(&session);
                        out.push('\n');
                        out.push_str(&format_pane_text(pane, manager.pane(), &filters));
                        out
                    },
                    || format_selection_json(&session, pane, manager.pane(), &filters),
                );
            }
        }
    }

    Ok(())
}
