//! Respondent roles
//!
//! The role a respondent declares in step 3 (`currentPosition`) decides which
//! step 4 questions apply and whether the director-only step 5 is shown.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A respondent's declared current job function
///
/// Matching is exact and case-sensitive. Any value outside the step 3
/// vocabulary parses to [`Role::Unrecognized`] instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    /// 园长/负责人
    Director,
    /// 主班教师
    MainTeacher,
    /// 配班教师
    SupportTeacher,
    /// 保育员
    Caregiver,
    /// 保健医
    Doctor,
    /// 其他
    Other,
    /// Empty or unknown input
    #[default]
    Unrecognized,
}

impl Role {
    /// Parse a stored role value, falling back to `Unrecognized`
    pub fn from_value(value: &str) -> Self {
        match value {
            "director" => Role::Director,
            "main_teacher" => Role::MainTeacher,
            "support_teacher" => Role::SupportTeacher,
            "caregiver" => Role::Caregiver,
            "doctor" => Role::Doctor,
            "other" => Role::Other,
            _ => Role::Unrecognized,
        }
    }

    /// The stored value, as used in the `currentPosition` answer
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Director => "director",
            Role::MainTeacher => "main_teacher",
            Role::SupportTeacher => "support_teacher",
            Role::Caregiver => "caregiver",
            Role::Doctor => "doctor",
            Role::Other => "other",
            Role::Unrecognized => "",
        }
    }

    /// Display label shown to respondents
    pub fn label(&self) -> &'static str {
        match self {
            Role::Director => "园长/负责人",
            Role::MainTeacher => "主班教师",
            Role::SupportTeacher => "配班教师",
            Role::Caregiver => "保育员",
            Role::Doctor => "保健医",
            Role::Other => "其他",
            Role::Unrecognized => "未知岗位",
        }
    }

    /// Roles selectable in the step 3 `currentPosition` field, in display order
    pub fn selectable() -> &'static [Role] {
        &[
            Role::Director,
            Role::MainTeacher,
            Role::SupportTeacher,
            Role::Caregiver,
            Role::Doctor,
            Role::Other,
        ]
    }

    /// Whether the director-only step applies
    pub fn is_director(&self) -> bool {
        matches!(self, Role::Director)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Role::from_value(s))
    }
}

// Serialized as the stored `currentPosition` value, with the same fallback
impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Role::from_value(&s))
    }
}
