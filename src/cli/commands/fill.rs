//! `tuoyu fill` command - fill the survey in interactively

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::{emit, parse_role, serialize};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, Role};
use crate::schema::{DocumentValidator, FormRegistry, SurveyWizard};

#[derive(clap::Args, Debug)]
pub struct FillArgs {
    /// Answer as this role instead of asking for the current position
    #[arg(long, short = 'r', value_parser = parse_role)]
    pub role: Option<Role>,

    /// Write the submission to this file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: FillArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let registry = FormRegistry::from_config(&config);

    if !global.quiet {
        println!(
            "{} Filling in the survey. Required questions are marked {}",
            style("→").blue(),
            style("*").red()
        );
    }

    let submission = SurveyWizard::new(&registry).run(args.role)?;

    let format = global
        .format
        .resolve(config.default_format.as_deref(), OutputFormat::Yaml);
    let content = serialize(&submission, format)?;

    // The wizard enforces every rule; re-check the result as a document
    let json = serde_json::to_string(&submission.answers).into_diagnostic()?;
    let report = DocumentValidator::new(&registry).validate(&json, "answers.json")?;
    tracing::debug!(
        id = %submission.id,
        fields = report.fields_checked,
        "survey filled"
    );

    emit(&content, args.output.as_deref(), global.quiet)
}
