//! `tuoyu report` command - Markdown report of one answer file

use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{emit, load_submission};
use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::schema::{FormRegistry, ReportRenderer};

#[derive(clap::Args, Debug)]
pub struct ReportArgs {
    /// Answer file (YAML or JSON), or `-` for stdin
    pub file: PathBuf,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Tera template to render instead of the built-in one
    #[arg(long, short = 't')]
    pub template: Option<PathBuf>,
}

pub fn run(args: ReportArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let registry = FormRegistry::from_config(&config);
    let submission = load_submission(&args.file)?;

    let renderer = match &args.template {
        Some(path) => ReportRenderer::with_template_file(path),
        None => ReportRenderer::from_config(&config),
    }
    .map_err(|e| miette::miette!("{}", e))?;

    let report = renderer
        .render(&submission, &registry)
        .map_err(|e| miette::miette!("{}", e))?;

    emit(&report, args.output.as_deref(), global.quiet)
}
