use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicantId, Application, ApplicationId, ApplicationSummary, Document, DocumentId,
    DocumentStatus,
};
use super::validation::FileUpload;

/// Per-request credentials handed to every registry call at the call site.
/// There is deliberately no ambient/global session lookup anywhere below this
/// boundary, which keeps the workflow testable without a simulated
/// environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub applicant_id: ApplicantId,
    pub access_token: String,
}

impl RequestContext {
    pub fn new(applicant_id: ApplicantId, access_token: impl Into<String>) -> Self {
        Self {
            applicant_id,
            access_token: access_token.into(),
        }
    }
}

/// Client-generated marker carried by one submission batch so the registry
/// can de-duplicate a double-click that fires the same batch twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionToken(pub String);

/// Registry acknowledgement for one stored document upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub document_id: DocumentId,
    pub new_status: DocumentStatus,
    pub uploaded_at: DateTime<Utc>,
}

/// Failures surfaced by the external persistence service.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("record not found")]
    NotFound,
    #[error("access denied: {0}")]
    AccessDenied(String),
    #[error("registry unavailable: {0}")]
    Unavailable(String),
}

/// Typed boundary to the external persistence service that stores
/// applications and documents. The core never reimplements storage; it only
/// consumes these contracts.
#[async_trait]
pub trait OnboardingRegistry: Send + Sync {
    /// Full application for the authenticated applicant, documents included.
    async fn fetch_application(
        &self,
        ctx: &RequestContext,
    ) -> Result<Option<Application>, RegistryError>;

    /// Current document set for one application.
    async fn fetch_document_set(
        &self,
        ctx: &RequestContext,
        application_id: &ApplicationId,
    ) -> Result<Vec<Document>, RegistryError>;

    /// Store one uploaded file and move the document to `UnderReview`,
    /// clearing any prior rejection reason and stamping `uploaded_at`.
    async fn upload_document(
        &self,
        ctx: &RequestContext,
        document_id: &DocumentId,
        payload: &FileUpload,
        token: &SubmissionToken,
        note: Option<&str>,
    ) -> Result<UploadReceipt, RegistryError>;

    /// Narrow authentication-time lookup. May fail with `AccessDenied`, which
    /// callers treat as recoverable rather than as an authorization fault.
    async fn fetch_application_for_login(
        &self,
        ctx: &RequestContext,
    ) -> Result<Option<ApplicationSummary>, RegistryError>;
}
