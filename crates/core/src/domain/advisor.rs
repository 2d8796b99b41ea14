use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdvisorCode(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisor {
    pub code: AdvisorCode,
    pub name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    /// Path or URL of the portrait shown on the cover and signature blocks.
    pub photo: String,
}
