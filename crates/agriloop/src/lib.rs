//! Core library for the marketplace onboarding service: applicant document
//! verification, application status derivation, and the producer login gate.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
