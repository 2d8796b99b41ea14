use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyCategory {
    #[serde(rename = "VIDA", alias = "LIFE")]
    Life,
    #[serde(rename = "PLAN_PROTECCION", alias = "PROTECTION_PLAN")]
    ProtectionPlan,
}

impl PolicyCategory {
    pub const ALL: [PolicyCategory; 2] = [PolicyCategory::Life, PolicyCategory::ProtectionPlan];

    pub fn code(self) -> &'static str {
        match self {
            Self::Life => "VIDA",
            Self::ProtectionPlan => "PLAN_PROTECCION",
        }
    }
}

impl fmt::Display for PolicyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown policy category `{0}` (expected VIDA|PLAN_PROTECCION)")]
pub struct UnknownCategory(pub String);

impl FromStr for PolicyCategory {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "VIDA" | "LIFE" => Ok(Self::Life),
            "PLAN_PROTECCION" | "PROTECTION_PLAN" => Ok(Self::ProtectionPlan),
            _ => Err(UnknownCategory(value.to_owned())),
        }
    }
}

/// Category and type chosen for the quotation. The type only makes sense for
/// the category it was picked under, so changing the category drops it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySelection {
    category: Option<PolicyCategory>,
    policy_type: String,
}

impl PolicySelection {
    pub fn category(&self) -> Option<PolicyCategory> {
        self.category
    }

    pub fn policy_type(&self) -> &str {
        &self.policy_type
    }

    pub fn set_category(&mut self, category: Option<PolicyCategory>) {
        self.category = category;
        self.policy_type.clear();
    }

    pub fn set_policy_type(&mut self, policy_type: impl Into<String>) {
        self.policy_type = policy_type.into();
    }

    pub fn is(&self, category: PolicyCategory, policy_type: &str) -> bool {
        self.category == Some(category) && self.policy_type == policy_type
    }
}
