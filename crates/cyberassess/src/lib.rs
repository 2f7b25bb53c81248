//! Scoring engine for cybersecurity maturity questionnaires, plus the
//! configuration, telemetry and error plumbing shared with the API service.

pub mod assessment;
pub mod config;
pub mod error;
pub mod telemetry;
