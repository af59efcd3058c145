//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::core::{Role, Submission};
use crate::schema::DocumentValidator;

/// Truncate a string to max_len characters, adding "..." if truncated
///
/// Counts characters rather than bytes so CJK labels are cut cleanly.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Parse a `--role` argument, accepting only the selectable positions
pub fn parse_role(s: &str) -> std::result::Result<Role, String> {
    match Role::from_value(s) {
        Role::Unrecognized => {
            let known: Vec<&str> = Role::selectable().iter().map(|r| r.as_str()).collect();
            Err(format!("expected one of: {}", known.join(", ")))
        }
        role => Ok(role),
    }
}

/// Read a file, or stdin when the path is `-`
pub fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .into_diagnostic()?;
        return Ok(buffer);
    }
    std::fs::read_to_string(path)
        .map_err(|e| miette::miette!("Failed to read {}: {}", path.display(), e))
}

/// Load an answer document (YAML or JSON) as a submission
pub fn load_submission(path: &Path) -> Result<Submission> {
    let content = read_input(path)?;
    let filename = path.display().to_string();
    let answers = DocumentValidator::parse(&content, &filename)?;
    tracing::debug!(path = %filename, answers = answers.len(), "loaded answers");

    // Keep the stored id and date when the document carries them
    let document: serde_json::Value = serde_yml::from_str(&content).into_diagnostic()?;
    Ok(Submission::from_document(document).unwrap_or_else(|| Submission::from_answers(answers)))
}

/// Serialize a value in the requested structured format
pub fn serialize<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value).into_diagnostic(),
        _ => serde_yml::to_string(value).into_diagnostic(),
    }
}

/// Print to stdout, or write to `output` when given
pub fn emit(content: &str, output: Option<&Path>, quiet: bool) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content).into_diagnostic()?;
            if !quiet {
                eprintln!(
                    "{} Wrote {}",
                    style("✓").green(),
                    style(path.display()).cyan()
                );
            }
        }
        None => {
            print!("{}", content);
            if !content.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("机构举办主体名称", 5), "机构...");
    }

    #[test]
    fn test_load_submission_keeps_id() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "id: SUB-01J0000000000000000000000A\ncreated: 2026-03-01T08:00:00Z\nanswers:\n  gender: female"
        )
        .unwrap();

        let submission = load_submission(file.path()).unwrap();
        assert_eq!(submission.id.to_string(), "SUB-01J0000000000000000000000A");
        assert_eq!(submission.get("gender").unwrap(), "female");
    }

    #[test]
    fn test_load_bare_answers() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{\"currentPosition\": \"doctor\"}}").unwrap();

        let submission = load_submission(file.path()).unwrap();
        assert_eq!(submission.role(), crate::core::Role::Doctor);
    }

    #[test]
    fn test_serialize_formats() {
        let value = serde_json::json!({"a": 1});
        assert_eq!(serialize(&value, OutputFormat::Yaml).unwrap(), "a: 1\n");
        assert!(serialize(&value, OutputFormat::Json).unwrap().contains("\"a\": 1"));
    }

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role("support_teacher"), Ok(Role::SupportTeacher));
        let err = parse_role("nurse").unwrap_err();
        assert!(err.contains("director"));
        assert!(err.contains("other"));
        assert!(parse_role("").is_err());
    }
}
