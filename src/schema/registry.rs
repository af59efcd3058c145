//! Schema registry - ordered field lists per survey step

use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

use crate::core::role::Role;
use crate::core::Config;
use crate::schema::catalog;
use crate::schema::field::FieldDescriptor;
use crate::schema::remote::RemoteSearchConfig;

/// A page of the survey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStep {
    Organization,
    Personal,
    Employment,
    RoleSpecific,
    Director,
}

impl FormStep {
    pub fn all() -> &'static [FormStep] {
        &[
            FormStep::Organization,
            FormStep::Personal,
            FormStep::Employment,
            FormStep::RoleSpecific,
            FormStep::Director,
        ]
    }

    /// 1-based step number
    pub fn number(&self) -> u8 {
        match self {
            FormStep::Organization => 1,
            FormStep::Personal => 2,
            FormStep::Employment => 3,
            FormStep::RoleSpecific => 4,
            FormStep::Director => 5,
        }
    }

    pub fn from_number(number: u8) -> Result<Self, StepParseError> {
        Self::all()
            .iter()
            .copied()
            .find(|s| s.number() == number)
            .ok_or_else(|| StepParseError::OutOfRange(number.to_string()))
    }

    /// Section title shown to respondents
    pub fn title(&self) -> &'static str {
        match self {
            FormStep::Organization => "第一部分：机构信息",
            FormStep::Personal => "第二部分：个人信息",
            FormStep::Employment => "第三部分：从业信息",
            FormStep::RoleSpecific => "第四部分：岗位相关信息",
            FormStep::Director => "第五部分：园长/负责人专属",
        }
    }

    /// Whether the step is the same for every respondent
    pub fn fixed(&self) -> Option<FixedStep> {
        match self {
            FormStep::Organization => Some(FixedStep::Organization),
            FormStep::Personal => Some(FixedStep::Personal),
            FormStep::Employment => Some(FixedStep::Employment),
            FormStep::RoleSpecific => None,
            FormStep::Director => Some(FixedStep::Director),
        }
    }
}

impl fmt::Display for FormStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl FromStr for FormStep {
    type Err = StepParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "organization" | "org" => Ok(FormStep::Organization),
            "personal" => Ok(FormStep::Personal),
            "employment" => Ok(FormStep::Employment),
            "role" | "role_specific" => Ok(FormStep::RoleSpecific),
            "director" => Ok(FormStep::Director),
            other => {
                let number: u8 = other
                    .parse()
                    .map_err(|_| StepParseError::Unknown(s.to_string()))?;
                Self::from_number(number)
            }
        }
    }
}

/// A step whose fields do not depend on the respondent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixedStep {
    Organization,
    Personal,
    Employment,
    Director,
}

impl FixedStep {
    pub fn all() -> &'static [FixedStep] {
        &[
            FixedStep::Organization,
            FixedStep::Personal,
            FixedStep::Employment,
            FixedStep::Director,
        ]
    }

    pub fn step(&self) -> FormStep {
        match self {
            FixedStep::Organization => FormStep::Organization,
            FixedStep::Personal => FormStep::Personal,
            FixedStep::Employment => FormStep::Employment,
            FixedStep::Director => FormStep::Director,
        }
    }

    pub fn number(&self) -> u8 {
        self.step().number()
    }
}

impl TryFrom<u8> for FixedStep {
    type Error = StepParseError;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        FormStep::from_number(number)?
            .fixed()
            .ok_or(StepParseError::NotFixed(number))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StepParseError {
    #[error("unknown step: '{0}' (expected 1-5 or organization, personal, employment, role, director)")]
    Unknown(String),

    #[error("step {0} does not exist (the survey has steps 1-5)")]
    OutOfRange(String),

    #[error("step {0} depends on the respondent's role")]
    NotFixed(u8),
}

/// Holds every step's field definitions
#[derive(Debug, Clone, PartialEq)]
pub struct FormRegistry {
    organization: Vec<FieldDescriptor>,
    personal: Vec<FieldDescriptor>,
    employment: Vec<FieldDescriptor>,
    director: Vec<FieldDescriptor>,
    responsibilities: FieldDescriptor,
    core_tasks: FieldDescriptor,
    training_needs: FieldDescriptor,
    competency_matrix: FieldDescriptor,
    care_skills: FieldDescriptor,
}

impl FormRegistry {
    /// Registry with the built-in institution search endpoint
    pub fn new() -> Self {
        Self::with_search(RemoteSearchConfig::institutions())
    }

    /// Registry whose remote search fields use `search`
    pub fn with_search(search: RemoteSearchConfig) -> Self {
        Self {
            organization: catalog::organization_fields(search),
            personal: catalog::personal_fields(),
            employment: catalog::employment_fields(),
            director: catalog::director_fields(),
            responsibilities: catalog::responsibilities_field(),
            core_tasks: catalog::core_tasks_field(),
            training_needs: catalog::training_needs_field(),
            competency_matrix: catalog::competency_matrix_field(),
            care_skills: catalog::care_skills_field(),
        }
    }

    /// Registry honouring a configured search endpoint
    pub fn from_config(config: &Config) -> Self {
        match &config.search_endpoint {
            Some(endpoint) => {
                Self::with_search(RemoteSearchConfig::institutions().with_endpoint(endpoint))
            }
            None => Self::new(),
        }
    }

    /// Shared registry with built-in settings, built on first use
    pub fn global() -> &'static FormRegistry {
        static REGISTRY: OnceLock<FormRegistry> = OnceLock::new();
        REGISTRY.get_or_init(FormRegistry::new)
    }

    /// Fields of a step that is the same for every respondent
    pub fn fixed_step_fields(&self, step: FixedStep) -> &[FieldDescriptor] {
        match step {
            FixedStep::Organization => &self.organization,
            FixedStep::Personal => &self.personal,
            FixedStep::Employment => &self.employment,
            FixedStep::Director => &self.director,
        }
    }

    /// Step 4 fields for a role
    ///
    /// Every role gets the responsibilities question. Roles without dedicated
    /// questions (doctor, other, unrecognized input) get only that.
    pub fn step4_fields(&self, role: Role) -> Vec<FieldDescriptor> {
        let mut fields = vec![self.responsibilities.clone()];
        match role {
            Role::Director => fields.push(self.core_tasks.clone()),
            Role::MainTeacher | Role::SupportTeacher => {
                fields.push(self.training_needs.clone());
                fields.push(self.competency_matrix.clone());
            }
            Role::Caregiver => fields.push(self.care_skills.clone()),
            Role::Doctor | Role::Other | Role::Unrecognized => {}
        }
        fields
    }

    /// Fields of any step, resolving step 4 with `role`
    pub fn step_fields(&self, step: FormStep, role: Role) -> Cow<'_, [FieldDescriptor]> {
        match step.fixed() {
            Some(fixed) => Cow::Borrowed(self.fixed_step_fields(fixed)),
            None => Cow::Owned(self.step4_fields(role)),
        }
    }

    /// Steps a respondent with `role` goes through, in order
    pub fn steps_for(&self, role: Role) -> Vec<FormStep> {
        FormStep::all()
            .iter()
            .copied()
            .filter(|step| *step != FormStep::Director || role.is_director())
            .collect()
    }

    /// Every applicable step with its fields
    pub fn form_for(&self, role: Role) -> Vec<(FormStep, Vec<FieldDescriptor>)> {
        self.steps_for(role)
            .into_iter()
            .map(|step| (step, self.step_fields(step, role).into_owned()))
            .collect()
    }

    /// First applicable field with `key`, in step order
    pub fn find_field(&self, key: &str, role: Role) -> Option<FieldDescriptor> {
        self.form_for(role)
            .into_iter()
            .flat_map(|(_, fields)| fields)
            .find(|f| f.key == key)
    }
}

impl Default for FormRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Fields of step 1, 2, 3 or 5
pub fn get_fixed_step_fields(step: FixedStep) -> &'static [FieldDescriptor] {
    FormRegistry::global().fixed_step_fields(step)
}

/// Step 4 fields for a raw role value; unknown values get the common field only
pub fn get_step4_fields(role: &str) -> Vec<FieldDescriptor> {
    FormRegistry::global().step4_fields(Role::from_value(role))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::field::FieldKind;
    use std::collections::HashSet;

    fn keys(fields: &[FieldDescriptor]) -> Vec<&str> {
        fields.iter().map(|f| f.key.as_str()).collect()
    }

    #[test]
    fn test_fixed_steps_have_unique_keys() {
        for step in FixedStep::all() {
            let fields = get_fixed_step_fields(*step);
            assert!(!fields.is_empty(), "step {} is empty", step.number());
            let unique: HashSet<_> = fields.iter().map(|f| &f.key).collect();
            assert_eq!(unique.len(), fields.len(), "duplicate key in step {}", step.number());
        }
    }

    #[test]
    fn test_fixed_step_order() {
        assert_eq!(
            keys(get_fixed_step_fields(FixedStep::Personal)),
            ["gender", "education", "educationMajor"]
        );
        assert_eq!(
            keys(get_fixed_step_fields(FixedStep::Director)),
            ["totalStaff", "futureTalentNeeds", "suggestions"]
        );
        assert_eq!(get_fixed_step_fields(FixedStep::Organization)[0].key, "orgName");
        assert_eq!(get_fixed_step_fields(FixedStep::Employment).len(), 6);
    }

    #[test]
    fn test_options_are_non_empty_and_unique() {
        let registry = FormRegistry::new();
        for role in Role::selectable() {
            for (_, fields) in registry.form_for(*role) {
                for field in fields {
                    if let Some(options) = field.options() {
                        assert!(!options.is_empty(), "{} has no options", field.key);
                        let unique: HashSet<_> = options.iter().map(|o| &o.value).collect();
                        assert_eq!(unique.len(), options.len(), "{} repeats a value", field.key);
                    }
                }
            }
        }
    }

    #[test]
    fn test_director_step4() {
        let fields = get_step4_fields("director");
        assert_eq!(keys(&fields), ["responsibilities", "coreTasks"]);
        assert_eq!(fields[1].span, Some(2));
        let options = fields[1].options().unwrap();
        assert_eq!(options.len(), 11);
        assert_eq!(options[0].value, "annual_plan");
        assert_eq!(
            options[10].value,
            "external_collaboration_and_resource_integration"
        );
        assert!(matches!(fields[1].kind, FieldKind::CheckboxGroup { .. }));
    }

    #[test]
    fn test_classroom_teacher_step4() {
        for role in ["main_teacher", "support_teacher"] {
            let fields = get_step4_fields(role);
            assert_eq!(
                keys(&fields),
                ["responsibilities", "trainingNeeds", "competency_matrix"]
            );
            assert_eq!(fields[1].options().unwrap().len(), 3);

            let FieldKind::RatingMatrix(layout) = &fields[2].kind else {
                panic!("competency_matrix is not a matrix");
            };
            assert_eq!(layout.rows.len(), 14);
            let values: Vec<u8> = layout.columns.iter().map(|c| c.value).collect();
            assert_eq!(values, [1, 2, 3, 4, 5]);
            assert_eq!(layout.columns[0].label, "非常不重要");
            assert_eq!(layout.columns[4].label, "非常重要");
            assert!(!fields[2].is_required());
        }
    }

    #[test]
    fn test_caregiver_step4() {
        let fields = get_step4_fields("caregiver");
        assert_eq!(keys(&fields), ["responsibilities", "careSkills"]);
        let values: Vec<&str> = fields[1]
            .options()
            .unwrap()
            .iter()
            .map(|o| o.value.as_str())
            .collect();
        assert_eq!(values, ["hygiene", "accident", "nutrition"]);
    }

    #[test]
    fn test_fallback_step4() {
        for role in ["unknown_role_xyz", "", "doctor", "other", "Director"] {
            let fields = get_step4_fields(role);
            assert_eq!(keys(&fields), ["responsibilities"], "role {:?}", role);
            assert!(fields[0].is_required());
        }
    }

    #[test]
    fn test_queries_are_idempotent() {
        assert_eq!(get_step4_fields("director"), get_step4_fields("director"));
        assert_eq!(
            get_fixed_step_fields(FixedStep::Organization),
            get_fixed_step_fields(FixedStep::Organization)
        );
        assert_eq!(FormRegistry::new(), FormRegistry::new());
    }

    #[test]
    fn test_steps_for_role() {
        let registry = FormRegistry::new();
        assert_eq!(registry.steps_for(Role::Director).len(), 5);
        assert_eq!(
            registry.steps_for(Role::Caregiver),
            [
                FormStep::Organization,
                FormStep::Personal,
                FormStep::Employment,
                FormStep::RoleSpecific
            ]
        );
    }

    #[test]
    fn test_step_parsing() {
        assert_eq!("1".parse::<FormStep>(), Ok(FormStep::Organization));
        assert_eq!("role".parse::<FormStep>(), Ok(FormStep::RoleSpecific));
        assert_eq!(
            "9".parse::<FormStep>(),
            Err(StepParseError::OutOfRange("9".to_string()))
        );
        assert!(matches!("x".parse::<FormStep>(), Err(StepParseError::Unknown(_))));
        assert_eq!(FixedStep::try_from(5), Ok(FixedStep::Director));
        assert_eq!(FixedStep::try_from(4), Err(StepParseError::NotFixed(4)));
    }

    #[test]
    fn test_search_endpoint_from_config() {
        let config = Config {
            search_endpoint: Some("https://example.org/q".to_string()),
            ..Config::default()
        };
        let registry = FormRegistry::from_config(&config);
        let FieldKind::RemoteSearchableChoice(search) =
            &registry.fixed_step_fields(FixedStep::Organization)[0].kind
        else {
            panic!("orgName is not a remote search field");
        };
        assert_eq!(search.endpoint, "https://example.org/q");
    }

    #[test]
    fn test_find_field_prefers_earlier_step() {
        let registry = FormRegistry::new();
        let field = registry.find_field("totalStaff", Role::Director).unwrap();
        assert_eq!(field.label, "机构员工总人数");
        assert!(registry.find_field("coreTasks", Role::Caregiver).is_none());
    }
}
