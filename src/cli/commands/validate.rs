//! `tuoyu validate` command - validate answer files against the survey

use console::style;
use miette::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::cli::helpers::serialize;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, Role};
use crate::schema::validator::{AnswerWarning, ValidateFileError};
use crate::schema::{DocumentValidator, FormRegistry};

/// Extensions picked up when walking directories
const ANSWER_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Answer files or directories to validate
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Strict mode - warnings become errors
    #[arg(long)]
    pub strict: bool,

    /// Continue validation after first error
    #[arg(long)]
    pub keep_going: bool,

    /// Show summary only, don't show individual errors
    #[arg(long)]
    pub summary: bool,
}

/// Validation statistics
#[derive(Default)]
struct ValidationStats {
    files_checked: usize,
    files_passed: usize,
    files_failed: usize,
    total_errors: usize,
    total_warnings: usize,
}

/// Machine-readable outcome for one file
#[derive(Debug, Serialize)]
struct FileOutcome {
    path: String,
    passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
    errors: Vec<String>,
    warnings: Vec<AnswerWarning>,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let registry = FormRegistry::from_config(&config);
    let validator = DocumentValidator::new(&registry);
    let structured = matches!(global.format, OutputFormat::Json | OutputFormat::Yaml);
    let verbose_output = !args.summary && !global.quiet && !structured;

    let files = expand_paths(&args.paths);
    if files.is_empty() {
        return Err(miette::miette!("No answer files found"));
    }

    let mut stats = ValidationStats::default();
    let mut outcomes = Vec::new();

    if verbose_output {
        println!(
            "{} Validating {} file(s)...\n",
            style("→").blue(),
            files.len()
        );
    }

    for path in &files {
        stats.files_checked += 1;
        let outcome = check_file(&validator, path, args.strict);

        stats.total_errors += outcome.errors.len();
        stats.total_warnings += outcome.warnings.len();
        if outcome.passed {
            stats.files_passed += 1;
        } else {
            stats.files_failed += 1;
        }

        if verbose_output {
            print_outcome(&validator, path, &outcome);
        }

        let failed = !outcome.passed;
        outcomes.push(outcome);
        if failed && !args.keep_going {
            break;
        }
    }

    if structured {
        print!("{}", serialize(&outcomes, global.format)?);
    } else if !global.quiet {
        print_summary(&stats);
    }

    if stats.files_failed > 0 {
        if stats.files_failed == 1 {
            Err(miette::miette!("Validation failed: 1 file has errors"))
        } else {
            Err(miette::miette!(
                "Validation failed: {} files have errors",
                stats.files_failed
            ))
        }
    } else {
        if !global.quiet && !structured {
            println!(
                "{} All files passed validation!",
                style("✓").green().bold()
            );
        }
        Ok(())
    }
}

fn check_file(validator: &DocumentValidator<'_>, path: &Path, strict: bool) -> FileOutcome {
    let display = path.display().to_string();
    match validator.validate_file(path) {
        Ok(report) => {
            let errors = if strict {
                report
                    .warnings
                    .iter()
                    .map(|w| format!("{}: {}", w.key, w.message))
                    .collect()
            } else {
                Vec::new()
            };
            FileOutcome {
                path: display,
                passed: errors.is_empty(),
                role: Some(report.role),
                errors,
                warnings: report.warnings,
            }
        }
        Err(ValidateFileError::Invalid(e)) => FileOutcome {
            path: display,
            passed: false,
            role: None,
            errors: e.violations().iter().map(|v| v.message().to_string()).collect(),
            warnings: Vec::new(),
        },
        Err(e) => FileOutcome {
            path: display,
            passed: false,
            role: None,
            errors: vec![e.to_string()],
            warnings: Vec::new(),
        },
    }
}

fn print_outcome(validator: &DocumentValidator<'_>, path: &Path, outcome: &FileOutcome) {
    if outcome.passed {
        let role = outcome.role.unwrap_or_default();
        println!(
            "{} {} ({})",
            style("✓").green(),
            path.display(),
            style(role.label()).dim()
        );
    } else {
        println!(
            "{} {} - {} error(s)",
            style("✗").red(),
            path.display(),
            outcome.errors.len()
        );

        // Re-run to get the diagnostic with source spans
        if let Err(ValidateFileError::Invalid(e)) = validator.validate_file(path) {
            println!("{:?}", miette::Report::new(e));
        } else {
            for error in &outcome.errors {
                println!("    {}", style(error).red());
            }
            return;
        }
    }

    for warning in &outcome.warnings {
        println!(
            "    {} {}: {}",
            style("!").yellow(),
            style(&warning.key).cyan(),
            warning.message
        );
    }
}

fn print_summary(stats: &ValidationStats) {
    println!();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", style("Validation Summary").bold());
    println!("{}", style("─".repeat(60)).dim());
    println!("  Files checked:  {}", style(stats.files_checked).cyan());
    println!("  Files passed:   {}", style(stats.files_passed).green());
    println!("  Files failed:   {}", style(stats.files_failed).red());
    println!("  Total errors:   {}", style(stats.total_errors).red());

    if stats.total_warnings > 0 {
        println!(
            "  Total warnings: {}",
            style(stats.total_warnings).yellow()
        );
    }

    println!();
}

/// Expand paths - if a directory is given, find all answer files in it
fn expand_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .into_iter()
                .filter_entry(|e| {
                    let name = e.file_name().to_string_lossy();
                    !name.starts_with('.') || e.depth() == 0
                })
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                if has_answer_extension(entry.path()) {
                    files.push(entry.path().to_path_buf());
                }
            }
        } else {
            files.push(path.clone());
        }
    }

    files.sort();
    files
}

fn has_answer_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ANSWER_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_expand_paths_walks_directories() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::create_dir(dir.path().join(".hidden")).unwrap();
        std::fs::write(dir.path().join("a.yaml"), "").unwrap();
        std::fs::write(dir.path().join("nested/b.JSON"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        std::fs::write(dir.path().join(".hidden/c.yml"), "").unwrap();

        let files = expand_paths(&[dir.path().to_path_buf()]);
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["a.yaml", "b.JSON"]);
    }

    #[test]
    fn test_explicit_files_kept() {
        let files = expand_paths(&[PathBuf::from("answers.txt")]);
        assert_eq!(files, [PathBuf::from("answers.txt")]);
    }

    const CAREGIVER: &str = "orgName: 阳光托育中心
location: 北京市-北京市-东城区
orgNature: public
orgType: 独立托育机构
isPovertyFree: \"yes\"
serviceMode: [全日托]
totalSlots: 80
totalChildren: 65
totalStaff: 20
gender: female
education: undergraduate
educationMajor: 学前教育
currentPosition: caregiver
interval: never
reason: [personal]
isFromTeacherToTeacher: \"no\"
reasonFromTeacherToTeacher: 无
responsibilities: 日常保育
careSkills: hygiene
favouriteColour: blue
";

    #[test]
    fn test_strict_turns_warnings_into_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("answers.yaml");
        std::fs::write(&path, CAREGIVER).unwrap();

        let registry = FormRegistry::new();
        let validator = DocumentValidator::new(&registry);

        let relaxed = check_file(&validator, &path, false);
        assert!(relaxed.passed);
        assert_eq!(relaxed.role, Some(Role::Caregiver));
        assert_eq!(relaxed.warnings.len(), 1);

        let strict = check_file(&validator, &path, true);
        assert!(!strict.passed);
        assert!(strict.errors[0].starts_with("favouriteColour"));
    }

    #[test]
    fn test_missing_answers_fail() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("answers.yaml");
        std::fs::write(&path, "currentPosition: doctor\n").unwrap();

        let registry = FormRegistry::new();
        let validator = DocumentValidator::new(&registry);
        let outcome = check_file(&validator, &path, false);
        assert!(!outcome.passed);
        assert!(outcome.errors.iter().any(|e| e.contains("请选择所属机构")));
    }

    #[test]
    fn test_unreadable_file() {
        let registry = FormRegistry::new();
        let validator = DocumentValidator::new(&registry);
        let outcome = check_file(&validator, Path::new("/nonexistent/answers.yaml"), false);
        assert!(!outcome.passed);
        assert_eq!(outcome.errors.len(), 1);
    }
}
