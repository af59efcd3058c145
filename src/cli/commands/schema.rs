//! `tuoyu schema` command - survey structure introspection
//!
//! Lists the survey steps, shows the fields of a step and exports JSON Schema
//! for tooling that produces or consumes answer files.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{parse_role, serialize, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, Role};
use crate::schema::json_schema::{step_schema, submission_schema};
use crate::schema::{FieldDescriptor, FieldKind, FormRegistry, FormStep};

#[derive(Subcommand, Debug)]
pub enum SchemaCommands {
    /// List the survey steps
    List,

    /// Show the fields of one step
    Show(ShowArgs),

    /// Export JSON Schema for a step or the whole survey
    Json(JsonArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Step number (1-5) or name (organization, personal, employment, role, director)
    pub step: FormStep,

    /// Respondent role used to resolve step 4 (e.g. main_teacher)
    #[arg(long, short = 'r', value_parser = parse_role)]
    pub role: Option<Role>,
}

#[derive(clap::Args, Debug)]
pub struct JsonArgs {
    /// Step number or name, or `all` for a whole submission
    #[arg(default_value = "all")]
    pub target: String,

    /// Respondent role used to resolve step 4 and step 5
    #[arg(long, short = 'r', value_parser = parse_role)]
    pub role: Option<Role>,

    /// Leave out the `required` list
    #[arg(long)]
    pub no_required: bool,
}

#[derive(Debug, Serialize)]
struct StepSummary {
    number: u8,
    step: FormStep,
    title: &'static str,
    min_fields: usize,
    max_fields: usize,
    applies_to: &'static str,
}

/// Run a schema subcommand
pub fn run(cmd: SchemaCommands, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let registry = FormRegistry::from_config(&config);
    let format = global
        .format
        .resolve(config.default_format.as_deref(), OutputFormat::Table);

    match cmd {
        SchemaCommands::List => list_steps(&registry, format),
        SchemaCommands::Show(args) => show_step(&registry, args, format, global.quiet),
        SchemaCommands::Json(args) => export_json(&registry, args, format),
    }
}

fn summarize(registry: &FormRegistry) -> Vec<StepSummary> {
    FormStep::all()
        .iter()
        .map(|step| {
            let counts: Vec<usize> = Role::selectable()
                .iter()
                .map(|role| registry.step_fields(*step, *role).len())
                .collect();
            StepSummary {
                number: step.number(),
                step: *step,
                title: step.title(),
                min_fields: counts.iter().copied().min().unwrap_or(0),
                max_fields: counts.iter().copied().max().unwrap_or(0),
                applies_to: match step {
                    FormStep::RoleSpecific => "all (varies by role)",
                    FormStep::Director => "director",
                    _ => "all",
                },
            }
        })
        .collect()
}

fn list_steps(registry: &FormRegistry, format: OutputFormat) -> Result<()> {
    let steps = summarize(registry);

    if matches!(format, OutputFormat::Json | OutputFormat::Yaml) {
        print!("{}", serialize(&steps, format)?);
        return Ok(());
    }

    let mut builder = Builder::default();
    builder.push_record(["STEP", "TITLE", "FIELDS", "APPLIES TO"]);
    for step in &steps {
        let fields = if step.min_fields == step.max_fields {
            step.max_fields.to_string()
        } else {
            format!("{}-{}", step.min_fields, step.max_fields)
        };
        builder.push_record([
            step.number.to_string(),
            step.title.to_string(),
            fields,
            step.applies_to.to_string(),
        ]);
    }
    println!("{}", builder.build().with(Style::psql()));
    Ok(())
}

fn show_step(
    registry: &FormRegistry,
    args: ShowArgs,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    if args.step == FormStep::RoleSpecific && args.role.is_none() && !quiet {
        eprintln!(
            "{} No --role given; showing the questions every role answers",
            style("!").yellow()
        );
    }
    let role = args.role.unwrap_or_default();
    let fields = registry.step_fields(args.step, role);

    if matches!(format, OutputFormat::Json | OutputFormat::Yaml) {
        print!("{}", serialize(&fields, format)?);
        return Ok(());
    }

    println!("{}", style(args.step.title()).bold());
    let mut builder = Builder::default();
    builder.push_record(["KEY", "LABEL", "KIND", "REQ", "OPTIONS"]);
    for field in fields.iter() {
        builder.push_record([
            field.key.clone(),
            truncate_str(&field.label, 24),
            field.kind.name().to_string(),
            if field.is_required() { "yes" } else { "" }.to_string(),
            truncate_str(&describe_options(field), 40),
        ]);
    }
    println!("{}", builder.build().with(Style::psql()));
    Ok(())
}

fn describe_options(field: &FieldDescriptor) -> String {
    match &field.kind {
        FieldKind::RatingMatrix(layout) => format!(
            "{} rows x {} columns",
            layout.rows.len(),
            layout.columns.len()
        ),
        FieldKind::RemoteSearchableChoice(search) => format!("search {}", search.endpoint),
        FieldKind::TextInput(props) => props.suffix.clone().unwrap_or_default(),
        _ => field
            .options()
            .map(|options| {
                options
                    .iter()
                    .map(|o| o.value.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default(),
    }
}

fn export_json(registry: &FormRegistry, args: JsonArgs, format: OutputFormat) -> Result<()> {
    let role = args.role.unwrap_or_default();
    let schema = if args.target.eq_ignore_ascii_case("all") {
        submission_schema(&registry.form_for(role), !args.no_required)
    } else {
        let step: FormStep = args.target.parse().map_err(|e| miette::miette!("{}", e))?;
        let mut schema = step_schema(step, &registry.step_fields(step, role));
        if args.no_required {
            if let Some(map) = schema.as_object_mut() {
                map.remove("required");
            }
        }
        schema
    };

    match format {
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&schema).into_diagnostic()?),
        _ => println!("{}", serde_json::to_string_pretty(&schema).into_diagnostic()?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_field_counts() {
        let steps = summarize(&FormRegistry::new());
        assert_eq!(steps.len(), 5);
        assert_eq!((steps[0].min_fields, steps[0].max_fields), (9, 9));
        assert_eq!((steps[3].min_fields, steps[3].max_fields), (1, 3));
        assert_eq!(steps[4].applies_to, "director");
    }

    #[test]
    fn test_describe_options() {
        let registry = FormRegistry::new();
        let fields = registry.step4_fields(Role::SupportTeacher);
        assert_eq!(describe_options(&fields[2]), "14 rows x 5 columns");

        let gender = registry.step_fields(FormStep::Personal, Role::Other)[0].clone();
        assert_eq!(describe_options(&gender), "male, female");
    }
}
