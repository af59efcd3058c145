//! `tuoyu search` command - institution search helpers
//!
//! The survey looks institutions up through a remote search endpoint. These
//! commands show the request a lookup sends and render response records the
//! way the dropdown displays them.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

use crate::cli::helpers::{read_input, serialize};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::submission::ORG_NAME_KEY;
use crate::core::{Config, Role};
use crate::schema::{format_search_record, FieldKind, FormRegistry, SearchRecord};

#[derive(Subcommand, Debug)]
pub enum SearchCommands {
    /// Print display strings for search result records
    Format(FormatArgs),

    /// Describe the request sent for a search text
    Request(RequestArgs),
}

#[derive(clap::Args, Debug)]
pub struct FormatArgs {
    /// JSON file holding a record or an array of records (`-` for stdin)
    #[arg(default_value = "-")]
    pub file: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct RequestArgs {
    /// Text typed into the institution search box
    pub text: String,
}

/// One record with its option and display string
#[derive(Debug, Serialize)]
struct FormattedRecord {
    label: Option<String>,
    value: Option<String>,
    display: String,
}

pub fn run(cmd: SearchCommands, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let registry = FormRegistry::from_config(&config);

    match cmd {
        SearchCommands::Format(args) => run_format(&registry, args, global),
        SearchCommands::Request(args) => run_request(&registry, args, global),
    }
}

fn run_format(registry: &FormRegistry, args: FormatArgs, global: &GlobalOpts) -> Result<()> {
    let content = read_input(&args.file)?;
    let parsed: Value = serde_json::from_str(&content)
        .map_err(|e| miette::miette!("Invalid search response JSON: {}", e))?;
    let records = formatted_records(registry, &parsed);
    tracing::debug!(records = records.len(), "formatted search records");

    if matches!(global.format, OutputFormat::Json | OutputFormat::Yaml) {
        print!("{}", serialize(&records, global.format)?);
        return Ok(());
    }

    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            println!();
        }
        if let Some(label) = &record.label {
            println!("{}", style(label).bold());
        }
        if !record.display.is_empty() {
            println!("{}", record.display);
        }
    }
    Ok(())
}

fn formatted_records(registry: &FormRegistry, parsed: &Value) -> Vec<FormattedRecord> {
    let search = registry
        .find_field(ORG_NAME_KEY, Role::default())
        .and_then(|field| match field.kind {
            FieldKind::RemoteSearchableChoice(search) => Some(search),
            _ => None,
        });

    let raw: Vec<&Value> = match parsed {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    raw.into_iter()
        .map(|record| {
            let option = search.as_ref().and_then(|s| s.to_option(record));
            FormattedRecord {
                label: option.as_ref().map(|o| o.label.clone()),
                value: option.map(|o| o.value),
                display: format_search_record(&SearchRecord::from_value(record)),
            }
        })
        .collect()
}

fn run_request(registry: &FormRegistry, args: RequestArgs, global: &GlobalOpts) -> Result<()> {
    let field = registry
        .find_field(ORG_NAME_KEY, Role::default())
        .ok_or_else(|| miette::miette!("The survey has no institution search field"))?;
    let FieldKind::RemoteSearchableChoice(search) = &field.kind else {
        return Err(miette::miette!("Field '{}' is not searchable", field.key));
    };

    let request = search.request(&args.text);
    match global.format {
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&request).into_diagnostic()?),
        _ => println!("{}", serde_json::to_string_pretty(&request).into_diagnostic()?),
    }
    Ok(())
}
