//! Markdown reports of submissions

use rust_embed::Embed;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tera::Tera;
use thiserror::Error;

use crate::core::submission::{Submission, ORG_NAME_KEY};
use crate::core::Config;
use crate::schema::field::FieldKind;
use crate::schema::labels::{display_value, AnswerLabeler};
use crate::schema::registry::FormRegistry;

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

const DEFAULT_TEMPLATE: &str = "report.md.tera";
const CUSTOM_TEMPLATE: &str = "custom";
const UNANSWERED: &str = "未填写";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("failed to read template {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Template rendering error: {0}")]
    RenderError(String),
}

#[derive(Debug, Serialize)]
struct ReportRow {
    label: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct ReportItem {
    key: String,
    label: String,
    value: String,
    rows: Vec<ReportRow>,
}

#[derive(Debug, Serialize)]
struct ReportSection {
    number: u8,
    title: String,
    items: Vec<ReportItem>,
}

/// Renders submissions into Markdown with Tera
pub struct ReportRenderer {
    tera: Tera,
    template: String,
}

impl ReportRenderer {
    /// Renderer using the embedded report template
    pub fn new() -> Result<Self, ReportError> {
        let mut tera = Tera::default();

        for file in EmbeddedTemplates::iter() {
            let filename = file.as_ref();
            if let Some(content) = EmbeddedTemplates::get(filename) {
                if let Ok(template_str) = std::str::from_utf8(&content.data) {
                    tera.add_raw_template(filename, template_str)
                        .map_err(|e| ReportError::RenderError(e.to_string()))?;
                }
            }
        }

        if !tera.get_template_names().any(|n| n == DEFAULT_TEMPLATE) {
            return Err(ReportError::NotFound(DEFAULT_TEMPLATE.to_string()));
        }

        Ok(Self {
            tera,
            template: DEFAULT_TEMPLATE.to_string(),
        })
    }

    /// Renderer using a template file from disk
    pub fn with_template_file(path: &Path) -> Result<Self, ReportError> {
        let source = std::fs::read_to_string(path).map_err(|source| ReportError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::with_template_str(&source)
    }

    /// Renderer using a template given as a string
    pub fn with_template_str(source: &str) -> Result<Self, ReportError> {
        let mut tera = Tera::default();
        tera.add_raw_template(CUSTOM_TEMPLATE, source)
            .map_err(|e| ReportError::RenderError(e.to_string()))?;
        Ok(Self {
            tera,
            template: CUSTOM_TEMPLATE.to_string(),
        })
    }

    /// Renderer honouring a configured `report_template`
    pub fn from_config(config: &Config) -> Result<Self, ReportError> {
        match &config.report_template {
            Some(path) => Self::with_template_file(path),
            None => Self::new(),
        }
    }

    /// Render one submission
    pub fn render(
        &self,
        submission: &Submission,
        registry: &FormRegistry,
    ) -> Result<String, ReportError> {
        let role = submission.role();
        let labeler = AnswerLabeler::new(registry);

        let sections: Vec<ReportSection> = labeler
            .sections(&submission.answers)
            .into_iter()
            .map(|(step, items)| ReportSection {
                number: step.number(),
                title: step.title().to_string(),
                items: items
                    .into_iter()
                    .map(|(field, value)| {
                        let rows = match (&field.kind, &value) {
                            (FieldKind::RatingMatrix(_), Some(Value::Object(cells))) => cells
                                .iter()
                                .map(|(row, column)| ReportRow {
                                    label: row.clone(),
                                    value: display_value(column),
                                })
                                .collect(),
                            _ => Vec::new(),
                        };
                        let value = value
                            .as_ref()
                            .map(display_value)
                            .filter(|s| !s.trim().is_empty())
                            .unwrap_or_else(|| UNANSWERED.to_string());
                        ReportItem {
                            key: field.key,
                            label: field.label,
                            value,
                            rows,
                        }
                    })
                    .collect(),
            })
            .collect();

        let org_name = submission
            .get(ORG_NAME_KEY)
            .map(display_value)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "未知机构".to_string());

        let mut context = tera::Context::new();
        context.insert("id", &submission.id.to_string());
        context.insert("date", &submission.created.format("%Y-%m-%d").to_string());
        context.insert("org_name", &org_name);
        context.insert("role", role.label());
        context.insert("role_value", role.as_str());
        context.insert("sections", &sections);

        self.tera
            .render(&self.template, &context)
            .map_err(|e| ReportError::RenderError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn main_teacher_submission() -> Submission {
        let mut submission = Submission::new();
        submission.set("orgName", json!("阳光托育中心"));
        submission.set("currentPosition", json!("main_teacher"));
        submission.set("gender", json!("female"));
        submission.set("serviceMode", json!(["全日托", "半日托"]));
        submission.set("competency_matrix", json!({"item1": 5, "item2": 4}));
        submission
    }

    #[test]
    fn test_report_header() {
        let renderer = ReportRenderer::new().unwrap();
        let report = renderer
            .render(&main_teacher_submission(), &FormRegistry::new())
            .unwrap();

        assert!(report.starts_with("# 托育从业者调研：阳光托育中心 - 主班教师\n"));
        assert!(report.contains("> 编号: SUB-"));
    }

    #[test]
    fn test_report_sections_and_values() {
        let renderer = ReportRenderer::new().unwrap();
        let report = renderer
            .render(&main_teacher_submission(), &FormRegistry::new())
            .unwrap();

        assert!(report.contains("## 第一部分：机构信息"));
        assert!(report.contains("## 第四部分：岗位相关信息"));
        assert!(!report.contains("## 第五部分"));
        assert!(report.contains("- **性别**: 女\n"));
        assert!(report.contains("- **机构服务模式**: 全日托、半日托\n"));
        assert!(report.contains("- **最高学历**: 未填写\n"));
    }

    #[test]
    fn test_report_matrix_rows() {
        let renderer = ReportRenderer::new().unwrap();
        let report = renderer
            .render(&main_teacher_submission(), &FormRegistry::new())
            .unwrap();

        assert!(report.contains(
            "- **请选择下列各项素质素养的重要程度**:\n  - 热爱本职，以德立身：非常重要\n  - 负责奉献，主动承担，乐于分享：重要"
        ));
    }

    #[test]
    fn test_unknown_org() {
        let renderer = ReportRenderer::new().unwrap();
        let report = renderer
            .render(&Submission::new(), &FormRegistry::new())
            .unwrap();
        assert!(report.starts_with("# 托育从业者调研：未知机构 - 未知岗位"));
    }

    #[test]
    fn test_custom_template() {
        let renderer =
            ReportRenderer::with_template_str("{{ role_value }}|{{ sections | length }}").unwrap();
        let report = renderer
            .render(&main_teacher_submission(), &FormRegistry::new())
            .unwrap();
        assert_eq!(report, "main_teacher|4");
    }

    #[test]
    fn test_missing_template_file() {
        let result = ReportRenderer::with_template_file(Path::new("/nonexistent/report.tera"));
        assert!(matches!(result, Err(ReportError::Io { .. })));
    }
}
