use serde::{Deserialize, Serialize};

use super::domain::{Application, ApplicationStatus, Document, DocumentStatus};

/// Derive the application status from the current document set and the
/// administrative re-review marker.
///
/// Pure and total: called from every surface that needs the status so the
/// branching lives in exactly one place. Only `required` documents
/// participate; optional attachments never hold an application back.
pub fn derive_application_status(documents: &[Document], awaiting_review: bool) -> ApplicationStatus {
    if awaiting_review {
        return ApplicationStatus::PendingReviewOfUpdatedDocuments;
    }

    let required = || documents.iter().filter(|document| document.required);

    if required().any(|document| document.status == DocumentStatus::Missing) {
        return ApplicationStatus::MissingDocuments;
    }

    if required().any(|document| document.status == DocumentStatus::Rejected) {
        return ApplicationStatus::Rejected;
    }

    if required().any(|document| {
        matches!(
            document.status,
            DocumentStatus::Pending | DocumentStatus::UnderReview
        )
    }) {
        return ApplicationStatus::UnderReview;
    }

    // No required document left in a non-approved state. An application with
    // zero required documents lands here and is vacuously approved.
    ApplicationStatus::Approved
}

/// What the applicant has to do next, derived from the same status policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredAction {
    UploadDocuments,
    AwaitReview,
    NoneRequired,
}

impl RequiredAction {
    pub const fn label(self) -> &'static str {
        match self {
            RequiredAction::UploadDocuments => "upload_documents",
            RequiredAction::AwaitReview => "await_review",
            RequiredAction::NoneRequired => "none",
        }
    }
}

/// Guidance row driving which documents the remediation screen offers for
/// re-upload, with the reviewer's wording passed through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentGuidance {
    pub document_id: super::domain::DocumentId,
    pub type_code: super::domain::DocumentTypeCode,
    pub status: DocumentStatus,
    pub eligible_for_upload: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
}

/// Remediation view for one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationState {
    pub application_id: super::domain::ApplicationId,
    pub status: ApplicationStatus,
    pub required_action: RequiredAction,
    pub documents: Vec<DocumentGuidance>,
}

pub fn remediation_state(application: &Application) -> RemediationState {
    let status = derive_application_status(
        &application.documents,
        application.awaiting_updated_documents_review,
    );

    let required_action = match status {
        ApplicationStatus::MissingDocuments | ApplicationStatus::Rejected => {
            RequiredAction::UploadDocuments
        }
        ApplicationStatus::Pending
        | ApplicationStatus::UnderReview
        | ApplicationStatus::PendingReviewOfUpdatedDocuments => RequiredAction::AwaitReview,
        ApplicationStatus::Approved => RequiredAction::NoneRequired,
    };

    let documents = application
        .documents
        .iter()
        .map(|document| DocumentGuidance {
            document_id: document.id.clone(),
            type_code: document.type_code.clone(),
            status: document.status,
            eligible_for_upload: document.status.accepts_upload(),
            guidance: document.guidance().map(str::to_string),
        })
        .collect();

    RemediationState {
        application_id: application.id.clone(),
        status,
        required_action,
        documents,
    }
}
