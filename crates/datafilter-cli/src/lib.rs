//! Command-line front end for [`datafilter`].
//!
//! The binary reads a JSON array of records, builds a [`Filter`] from a
//! conditions file and `--where` flags, and prints the kept records:
//!
//! ```text
//! datafilter articles.json --config filters.yaml
//! datafilter articles.json -w 'data.tags|has|first' --blacklist --output yaml
//! ```
//!
//! [`run`] holds the whole pipeline and writes to any [`Write`], so it can be
//! driven from tests without a process.

pub mod cli;
pub mod config;

use std::fs;
use std::io::{Read, Write};

use anyhow::{Context, Result};
use datafilter::{Filter, Polarity};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

pub use cli::{Cli, OutputFormat};
pub use config::{parse_where, ConditionSpec, ConfigError, FilterConfig};

/// Runs one invocation, reading records from `stdin` when no file is given.
pub fn run(cli: &Cli, stdin: impl Read, out: &mut impl Write) -> Result<()> {
    let config = match &cli.config {
        Some(path) => FilterConfig::load(path)?,
        None => FilterConfig::default(),
    };

    let mut filter = config.to_filter();
    for expr in &cli.conditions {
        filter.push(parse_where(expr)?.to_condition());
    }

    let polarity = cli
        .polarity()
        .or(config.polarity)
        .unwrap_or_default();
    debug!(conditions = filter.len(), ?polarity, "filter ready");

    let records = read_records(cli, stdin)?;
    write_result(&filter, &records, polarity, cli, out)
}

fn read_records(cli: &Cli, mut stdin: impl Read) -> Result<Value> {
    let text = match &cli.input {
        Some(path) if !cli.reads_stdin() => fs::read_to_string(path)
            .with_context(|| format!("cannot read records from {}", path.display()))?,
        _ => {
            let mut text = String::new();
            stdin
                .read_to_string(&mut text)
                .context("cannot read records from stdin")?;
            text
        }
    };
    serde_json::from_str(&text).context("records are not valid JSON")
}

fn write_result(
    filter: &Filter,
    records: &Value,
    polarity: Polarity,
    cli: &Cli,
    out: &mut impl Write,
) -> Result<()> {
    if !records.is_array() {
        debug!("records input is not a JSON array; nothing is kept");
    }

    if cli.count {
        let kept = filter.matching_json(records, polarity)?;
        writeln!(out, "{}", kept.len())?;
    } else if cli.first {
        let first = filter.first_json(records, polarity)?;
        render(&first, cli.output, out)?;
    } else {
        let kept = filter.matching_json(records, polarity)?;
        render(&kept, cli.output, out)?;
    }
    Ok(())
}

fn render<T: Serialize>(data: &T, format: OutputFormat, out: &mut impl Write) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, data)?;
            writeln!(out)?;
        }
        OutputFormat::Yaml => out.write_all(serde_yaml::to_string(data)?.as_bytes())?,
    }
    Ok(())
}
