//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    completions::CompletionsArgs, config::ConfigCommands, fill::FillArgs, label::LabelArgs,
    report::ReportArgs, schema::SchemaCommands, search::SearchCommands, validate::ValidateArgs,
};

#[derive(Parser)]
#[command(name = "tuoyu")]
#[command(author, version, about = "Childcare practitioner survey toolkit")]
#[command(
    long_about = "Inspect the survey form, validate and label answer files, render reports and fill the survey from the terminal."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect survey steps and their fields
    #[command(subcommand)]
    Schema(SchemaCommands),

    /// Validate answer files against the survey
    Validate(ValidateArgs),

    /// Show answers with option values replaced by their labels
    Label(LabelArgs),

    /// Render a Markdown report of an answer file
    Report(ReportArgs),

    /// Institution search helpers
    #[command(subcommand)]
    Search(SearchCommands),

    /// Fill in the survey interactively
    Fill(FillArgs),

    /// View and modify configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (table for listings, yaml otherwise)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// JSON format (for programming)
    Json,
    /// Aligned table for terminals
    Table,
    /// CSV format (for spreadsheets)
    Csv,
}

impl OutputFormat {
    /// Resolve `Auto` against the configured default, then `fallback`
    pub fn resolve(self, configured: Option<&str>, fallback: OutputFormat) -> OutputFormat {
        if self != OutputFormat::Auto {
            return self;
        }
        configured
            .and_then(|name| OutputFormat::from_str(name, true).ok())
            .filter(|f| *f != OutputFormat::Auto)
            .unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_resolve_format() {
        assert_eq!(
            OutputFormat::Json.resolve(Some("yaml"), OutputFormat::Table),
            OutputFormat::Json
        );
        assert_eq!(
            OutputFormat::Auto.resolve(Some("YAML"), OutputFormat::Table),
            OutputFormat::Yaml
        );
        assert_eq!(
            OutputFormat::Auto.resolve(Some("bogus"), OutputFormat::Table),
            OutputFormat::Table
        );
        assert_eq!(
            OutputFormat::Auto.resolve(None, OutputFormat::Yaml),
            OutputFormat::Yaml
        );
    }
}
