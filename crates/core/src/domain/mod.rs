pub mod advisor;
pub mod client;
pub mod coverage;
pub mod money;
pub mod policy;
pub mod quotation;
