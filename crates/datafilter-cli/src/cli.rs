//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use datafilter::Polarity;

/// Filter a JSON array of records with declarative conditions.
///
/// Conditions come from a conditions file (`--config`) and from `--where`
/// flags, which are appended after the file's conditions. Every condition
/// must hold for a record to pass.
#[derive(Debug, Parser)]
#[command(name = "datafilter", version)]
#[command(after_help = "Examples:\n  \
    datafilter articles.json -w 'data.author.age|>|25' -w 'type|not equal|[\"newsletter\",\"spam\"]'\n  \
    cat articles.json | datafilter --config filters.yaml --first")]
pub struct Cli {
    /// JSON file holding an array of records; stdin when omitted or "-"
    #[arg(value_name = "RECORDS")]
    pub input: Option<PathBuf>,

    /// Conditions file (YAML, or JSON with a .json extension)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Extra condition as "field|operator|value"; the value is JSON or plain text
    #[arg(short = 'w', long = "where", value_name = "CONDITION")]
    pub conditions: Vec<String>,

    /// Keep the records that fail the conditions
    #[arg(short, long, conflicts_with = "whitelist")]
    pub blacklist: bool,

    /// Keep the records that pass the conditions, whatever the conditions file says
    #[arg(long)]
    pub whitelist: bool,

    /// Print only the first kept record, or null
    #[arg(long, conflicts_with = "count")]
    pub first: bool,

    /// Print the number of kept records
    #[arg(long)]
    pub count: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,

    /// Log evaluation details to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// How kept records are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// YAML
    Yaml,
}

impl Cli {
    /// Returns the polarity forced on the command line, if any.
    pub fn polarity(&self) -> Option<Polarity> {
        if self.blacklist {
            Some(Polarity::Blacklist)
        } else if self.whitelist {
            Some(Polarity::Whitelist)
        } else {
            None
        }
    }

    /// Returns `true` when records are read from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.input.as_ref().is_none_or(|path| path.as_os_str() == "-")
    }
}
