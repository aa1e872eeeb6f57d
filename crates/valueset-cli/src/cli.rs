//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use valueset_loader::SheetConfig;

/// Import and curate clinical value sets.
#[derive(Debug, Parser)]
#[command(name = "valueset", version, about)]
pub struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true, env = "VALUESET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Document store directory (overrides the config file).
    #[arg(long, global = true, env = "VALUESET_STORE")]
    pub store: Option<PathBuf>,

    /// Increase log detail (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load value sets from a spreadsheet export, skipping stored OIDs.
    Spreadsheet {
        path: PathBuf,
        #[command(flatten)]
        sheet: SheetArgs,
    },
    /// Fetch value sets from VSAC, using the response cache when possible.
    Vsac(VsacArgs),
    /// Mark concepts listed in a white-list spreadsheet.
    WhiteList {
        path: PathBuf,
        #[command(flatten)]
        sheet: SheetArgs,
    },
    /// Mark concepts listed in a black-list spreadsheet.
    BlackList {
        path: PathBuf,
        #[command(flatten)]
        sheet: SheetArgs,
    },
    /// Clear every white-list and black-list flag.
    ClearLists,
}

#[derive(Debug, Args)]
pub struct SheetArgs {
    /// Field delimiter (a single ASCII character, `\t` for tabs).
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// Log every parsed row.
    #[arg(long)]
    pub show_rows: bool,
}

impl SheetArgs {
    pub fn sheet_config(&self) -> SheetConfig {
        SheetConfig {
            delimiter: self.delimiter,
            verbose: self.show_rows,
        }
    }
}

#[derive(Debug, Args)]
pub struct VsacArgs {
    /// Value set OID to fetch (repeatable).
    #[arg(long = "oid")]
    pub oids: Vec<String>,

    /// HQMF measure whose referenced value sets are fetched as well.
    #[arg(long)]
    pub hqmf: Option<PathBuf>,

    /// UMLS account name.
    #[arg(long, env = "VSAC_USERNAME")]
    pub username: String,

    /// UMLS account password.
    #[arg(long, env = "VSAC_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Outbound HTTP proxy.
    #[arg(long, env = "http_proxy")]
    pub proxy: Option<String>,

    /// Response cache directory (overrides the config file).
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Per-request timeout in seconds. Requests wait indefinitely by default.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "\\t" | "tab" => Ok(b'\t'),
        _ => match value.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(format!("delimiter must be one ASCII character, got {:?}", value)),
        },
    }
}
