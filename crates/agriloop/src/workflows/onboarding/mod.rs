//! Applicant onboarding and document-verification workflow.
//!
//! The workflow covers three concerns: deriving one application status from
//! the per-document review states, gating producer logins on that status, and
//! orchestrating applicant-initiated document resubmission. Storage lives
//! behind the [`registry::OnboardingRegistry`] boundary; the admin-side
//! review tooling is a separate system whose decisions are only observed
//! here.

pub mod domain;
pub mod gate;
pub mod registry;
pub mod router;
pub mod service;
pub mod status;
pub mod submission;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantId, ApplicantRole, Application, ApplicationId, ApplicationStatus,
    ApplicationStatusView, ApplicationSummary, Document, DocumentId, DocumentStatus,
    DocumentStatusView, DocumentTypeCode, FileRef,
};
pub use gate::{evaluate, GateLookup, GateOutcome, LoginGate, REMEDIATION_ROUTE};
pub use registry::{
    OnboardingRegistry, RegistryError, RequestContext, SubmissionToken, UploadReceipt,
};
pub use router::onboarding_router;
pub use service::OnboardingService;
pub use status::{
    derive_application_status, remediation_state, DocumentGuidance, RemediationState,
    RequiredAction,
};
pub use submission::{
    ItemReport, ResubmissionController, ResubmissionItem, SubmissionError, SubmissionReport,
    UploadOutcome,
};
pub use validation::{FileUpload, UploadPolicy, ValidationError, DEFAULT_MAX_UPLOAD_BYTES};
