//! `tuoyu label` command - answers with option values shown as labels

use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{emit, load_submission, serialize};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::schema::{AnswerLabeler, FormRegistry, LabeledAnswer};

#[derive(clap::Args, Debug)]
pub struct LabelArgs {
    /// Answer file (YAML or JSON), or `-` for stdin
    pub file: PathBuf,

    /// Write to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: LabelArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let registry = FormRegistry::from_config(&config);
    let labeler = AnswerLabeler::new(&registry);
    let submission = load_submission(&args.file)?;

    let format = global
        .format
        .resolve(config.default_format.as_deref(), OutputFormat::Yaml);

    let content = match format {
        OutputFormat::Csv => to_csv(&labeler.entries(&submission.answers))?,
        OutputFormat::Table => to_table(&labeler.entries(&submission.answers)),
        _ => serialize(&labeler.label_answers(&submission.answers), format)?,
    };

    emit(&content, args.output.as_deref(), global.quiet)
}

/// CSV rows of `key,label,value`
fn to_csv(entries: &[LabeledAnswer]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["key", "label", "value"])
        .into_diagnostic()?;
    for entry in entries {
        writer
            .write_record([entry.key.as_str(), entry.question.as_str(), &entry.display()])
            .into_diagnostic()?;
    }
    let bytes = writer.into_inner().into_diagnostic()?;
    String::from_utf8(bytes).into_diagnostic()
}

fn to_table(entries: &[LabeledAnswer]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["STEP", "QUESTION", "ANSWER"]);
    for entry in entries {
        builder.push_record([
            entry.step.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
            entry.question.clone(),
            entry.display(),
        ]);
    }
    builder.build().with(Style::psql()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Vec<LabeledAnswer> {
        let registry = FormRegistry::new();
        let labeler = AnswerLabeler::new(&registry);
        let answers = json!({
            "gender": "female",
            "serviceMode": ["全日托", "计时托"],
            "note": "a, \"quoted\" note"
        });
        labeler.entries(answers.as_object().unwrap())
    }

    #[test]
    fn test_csv_rows() {
        let csv = to_csv(&sample()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "key,label,value");
        assert_eq!(lines[1], "serviceMode,机构服务模式,全日托、计时托");
        assert_eq!(lines[2], "gender,性别,女");
        assert_eq!(lines[3], "note,note,\"a, \"\"quoted\"\" note\"");
    }

    #[test]
    fn test_table_marks_unknown_step() {
        let table = to_table(&sample());
        assert!(table.contains("QUESTION"));
        assert!(table.contains("性别"));
    }
}
