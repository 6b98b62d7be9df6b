use crate::range::{Comparator, RangeKind};
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Inspect and exercise report filter panes
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pane configuration file (TOML); defaults to the built-in `mgmt` template
    #[arg(short, long, global = true, env = "REPORT_FILTERS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'F', long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// When to colorize text output
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Reference date for `{year}` / `{last_year}` defaults (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub today: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode a range filter into its wire token
    Encode {
        /// Comparator code or label (EQ, BF, AF, BN, GT, LT)
        #[arg(short = 'C', long)]
        comparator: Comparator,

        #[arg(long)]
        operand1: String,

        /// Second operand, used by BN only
        #[arg(long)]
        operand2: Option<String>,

        /// Validate operands as dates or values before encoding
        #[arg(long)]
        kind: Option<RangeKind>,
    },
    /// Decode a range token
    Decode {
        /// Token such as `2024-12-31AF` or `100BN500`
        token: String,
    },
    /// List configured panes and built-in templates
    Panes,
    /// Show a pane's default filters and field summaries
    Show {
        #[arg(short, long)]
        pane: String,
    },
    /// Apply a saved filter set to a pane
    Apply {
        #[arg(short, long)]
        pane: String,

        /// JSON or JSON5 file of saved filter sets
        #[arg(short, long)]
        saved: PathBuf,

        /// Saved set to apply; empty or absent resets the pane
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Open a field's selection overlay and list its options
    Options {
        #[arg(short, long)]
        pane: String,

        #[arg(long)]
        field: String,

        /// JSON file backing data-source and personnel fields
        #[arg(long)]
        source: Option<PathBuf>,

        /// Role of the signed-in user (repeatable)
        #[arg(long = "role")]
        roles: Vec<String>,

        /// Save these options (labels or ids) and print the resulting filters
        #[arg(long = "select")]
        select: Vec<String>,
    },
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
