use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_CLIENT_AGE: u8 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn label(self) -> &'static str {
        match self {
            Self::Male => "Masculino",
            Self::Female => "Femenino",
            Self::Other => "Otro",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown gender `{0}` (expected Masculino|Femenino|Otro)")]
pub struct UnknownGender(pub String);

impl FromStr for Gender {
    type Err = UnknownGender;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "masculino" | "male" => Ok(Self::Male),
            "femenino" | "female" => Ok(Self::Female),
            "otro" | "other" => Ok(Self::Other),
            _ => Err(UnknownGender(value.to_owned())),
        }
    }
}

/// Client contact block. Text fields are kept exactly as entered.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub age: String,
    pub gender: Option<Gender>,
    pub city: String,
}

impl Client {
    /// Age in years when the stored text is a whole number within `0..=100`.
    pub fn age_years(&self) -> Option<u8> {
        self.age.trim().parse::<u8>().ok().filter(|age| *age <= MAX_CLIENT_AGE)
    }
}
