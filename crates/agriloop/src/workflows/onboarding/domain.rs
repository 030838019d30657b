use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for applicant accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicantId(pub String);

/// Identifier wrapper for onboarding applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for compliance documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub String);

/// Names which compliance artifact a document slot holds (e.g. "registration_certificate").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentTypeCode(pub String);

/// Opaque handle to a stored binary returned by the file-storage service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef(pub String);

/// Applicant roles onboarded through the marketplace. Only producers are
/// subject to the login gate; buyer companies pass straight through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicantRole {
    Producer,
    Company,
}

impl ApplicantRole {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicantRole::Producer => "producer",
            ApplicantRole::Company => "company",
        }
    }
}

/// Review state of a single compliance document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    UnderReview,
    Approved,
    Missing,
    Rejected,
}

impl DocumentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::UnderReview => "under_review",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Missing => "missing",
            DocumentStatus::Rejected => "rejected",
        }
    }

    /// Approved documents are immutable from the applicant side; every other
    /// state may receive a (re)upload.
    pub const fn accepts_upload(self) -> bool {
        !matches!(self, DocumentStatus::Approved)
    }

    /// True for the states that put a document into the remediation cycle.
    pub const fn needs_resubmission(self) -> bool {
        matches!(self, DocumentStatus::Missing | DocumentStatus::Rejected)
    }
}

/// Overall state of an onboarding application, always derived from the
/// document set and the administrative re-review marker, never stored
/// independently by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
    MissingDocuments,
    PendingReviewOfUpdatedDocuments,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::MissingDocuments => "missing_documents",
            ApplicationStatus::PendingReviewOfUpdatedDocuments => {
                "pending_review_of_updated_documents"
            }
        }
    }
}

/// One compliance document slot tracked on an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub application_id: ApplicationId,
    pub type_code: DocumentTypeCode,
    pub required: bool,
    pub status: DocumentStatus,
    pub file_ref: Option<FileRef>,
    pub reviewer_note: Option<String>,
    pub rejection_reason: Option<String>,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Reviewer guidance shown verbatim next to the re-upload slot.
    pub fn guidance(&self) -> Option<&str> {
        self.rejection_reason
            .as_deref()
            .or(self.reviewer_note.as_deref())
    }
}

/// The onboarding record evaluated for account approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub applicant_id: ApplicantId,
    pub role: ApplicantRole,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
    pub last_update_at: DateTime<Utc>,
    pub admin_note: Option<String>,
    pub rejection_reason: Option<String>,
    /// Administrative marker set when freshly resubmitted material awaits
    /// re-review; dominates every document-derived status.
    pub awaiting_updated_documents_review: bool,
    pub documents: Vec<Document>,
}

impl Application {
    pub fn required_documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter().filter(|document| document.required)
    }

    pub fn document(&self, id: &DocumentId) -> Option<&Document> {
        self.documents.iter().find(|document| &document.id == id)
    }

    pub fn has_missing_documents(&self) -> bool {
        self.required_documents()
            .any(|document| document.status == DocumentStatus::Missing)
    }

    /// Sanitized view exposed through the status endpoint.
    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.id.clone(),
            status: self.status.label(),
            admin_note: self.admin_note.clone(),
            rejection_reason: self.rejection_reason.clone(),
            documents: self
                .documents
                .iter()
                .map(|document| DocumentStatusView {
                    document_id: document.id.clone(),
                    type_code: document.type_code.clone(),
                    status: document.status.label(),
                    guidance: document.guidance().map(str::to_string),
                })
                .collect(),
        }
    }

    /// Narrow snapshot consumed by the login gate.
    pub fn summary(&self) -> ApplicationSummary {
        ApplicationSummary {
            application_id: self.id.clone(),
            status: self.status,
            has_missing_documents: self.has_missing_documents(),
            awaiting_updated_documents_review: self.awaiting_updated_documents_review,
        }
    }
}

/// Pre-aggregated snapshot returned by the authentication-time registry
/// lookup so the gate can decide without loading the full document set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSummary {
    pub application_id: ApplicationId,
    pub status: ApplicationStatus,
    pub has_missing_documents: bool,
    pub awaiting_updated_documents_review: bool,
}

/// Per-document row of the status endpoint payload.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentStatusView {
    pub document_id: DocumentId,
    pub type_code: DocumentTypeCode,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
}

/// Sanitized representation of an application's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub documents: Vec<DocumentStatusView>,
}
