use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::workflows::onboarding::domain::{
    ApplicantId, ApplicantRole, Application, ApplicationId, ApplicationSummary, Document,
    DocumentId, DocumentStatus, DocumentTypeCode, FileRef,
};
use crate::workflows::onboarding::registry::{
    OnboardingRegistry, RegistryError, RequestContext, SubmissionToken, UploadReceipt,
};
use crate::workflows::onboarding::status::derive_application_status;
use crate::workflows::onboarding::validation::{FileUpload, UploadPolicy};
use crate::workflows::onboarding::OnboardingService;

pub(super) fn ctx() -> RequestContext {
    RequestContext::new(ApplicantId("prod-17".to_string()), "token-abc")
}

pub(super) fn document(id: &str, type_code: &str, status: DocumentStatus) -> Document {
    Document {
        id: DocumentId(id.to_string()),
        application_id: ApplicationId("app-17".to_string()),
        type_code: DocumentTypeCode(type_code.to_string()),
        required: true,
        status,
        file_ref: match status {
            DocumentStatus::Pending | DocumentStatus::Missing => None,
            _ => Some(FileRef(format!("blob://{id}"))),
        },
        reviewer_note: None,
        rejection_reason: match status {
            DocumentStatus::Rejected => Some("document is illegible".to_string()),
            _ => None,
        },
        uploaded_at: None,
        reviewed_at: None,
    }
}

pub(super) fn optional_document(id: &str, type_code: &str, status: DocumentStatus) -> Document {
    Document {
        required: false,
        ..document(id, type_code, status)
    }
}

pub(super) fn producer_application(documents: Vec<Document>, awaiting_review: bool) -> Application {
    let status = derive_application_status(&documents, awaiting_review);
    Application {
        id: ApplicationId("app-17".to_string()),
        applicant_id: ApplicantId("prod-17".to_string()),
        role: ApplicantRole::Producer,
        status,
        submitted_at: Utc::now(),
        last_update_at: Utc::now(),
        admin_note: None,
        rejection_reason: None,
        awaiting_updated_documents_review: awaiting_review,
        documents,
    }
}

pub(super) fn pdf_upload(file_name: &str, size_bytes: usize) -> FileUpload {
    FileUpload {
        file_name: file_name.to_string(),
        content_type: "application/pdf".to_string(),
        bytes: vec![0u8; size_bytes],
    }
}

pub(super) fn policy() -> UploadPolicy {
    UploadPolicy::new(10 * 1024 * 1024)
}

/// Controls what the narrow authentication-time lookup returns.
pub(super) enum LoginLookup {
    FromApplication,
    NotFound,
    Denied(String),
    Unavailable(String),
}

/// In-memory registry double tracking every interaction so tests can assert
/// which network calls were (not) issued.
pub(super) struct MockRegistry {
    application: Mutex<Option<Application>>,
    login_lookup: Mutex<LoginLookup>,
    failing_uploads: Mutex<HashSet<DocumentId>>,
    upload_calls: AtomicUsize,
    tokens_seen: Mutex<Vec<SubmissionToken>>,
}

impl MockRegistry {
    pub(super) fn with_application(application: Application) -> Self {
        Self {
            application: Mutex::new(Some(application)),
            login_lookup: Mutex::new(LoginLookup::FromApplication),
            failing_uploads: Mutex::new(HashSet::new()),
            upload_calls: AtomicUsize::new(0),
            tokens_seen: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn empty() -> Self {
        Self {
            application: Mutex::new(None),
            login_lookup: Mutex::new(LoginLookup::NotFound),
            failing_uploads: Mutex::new(HashSet::new()),
            upload_calls: AtomicUsize::new(0),
            tokens_seen: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn set_login_lookup(&self, lookup: LoginLookup) {
        *self.login_lookup.lock().expect("lookup mutex poisoned") = lookup;
    }

    pub(super) fn fail_upload_for(&self, id: &str) {
        self.failing_uploads
            .lock()
            .expect("failure mutex poisoned")
            .insert(DocumentId(id.to_string()));
    }

    pub(super) fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub(super) fn tokens_seen(&self) -> Vec<SubmissionToken> {
        self.tokens_seen
            .lock()
            .expect("token mutex poisoned")
            .clone()
    }

    pub(super) fn current_application(&self) -> Application {
        self.application
            .lock()
            .expect("application mutex poisoned")
            .clone()
            .expect("application seeded")
    }
}

#[async_trait]
impl OnboardingRegistry for MockRegistry {
    async fn fetch_application(
        &self,
        _ctx: &RequestContext,
    ) -> Result<Option<Application>, RegistryError> {
        Ok(self
            .application
            .lock()
            .expect("application mutex poisoned")
            .clone())
    }

    async fn fetch_document_set(
        &self,
        _ctx: &RequestContext,
        application_id: &ApplicationId,
    ) -> Result<Vec<Document>, RegistryError> {
        let guard = self.application.lock().expect("application mutex poisoned");
        match guard.as_ref() {
            Some(application) if &application.id == application_id => {
                Ok(application.documents.clone())
            }
            _ => Err(RegistryError::NotFound),
        }
    }

    async fn upload_document(
        &self,
        _ctx: &RequestContext,
        document_id: &DocumentId,
        payload: &FileUpload,
        token: &SubmissionToken,
        _note: Option<&str>,
    ) -> Result<UploadReceipt, RegistryError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.tokens_seen
            .lock()
            .expect("token mutex poisoned")
            .push(token.clone());

        if self
            .failing_uploads
            .lock()
            .expect("failure mutex poisoned")
            .contains(document_id)
        {
            return Err(RegistryError::Unavailable("simulated network error".to_string()));
        }

        let mut guard = self.application.lock().expect("application mutex poisoned");
        let application = guard.as_mut().ok_or(RegistryError::NotFound)?;
        let uploaded_at = Utc::now();
        {
            let document = application
                .documents
                .iter_mut()
                .find(|document| &document.id == document_id)
                .ok_or(RegistryError::NotFound)?;
            document.status = DocumentStatus::UnderReview;
            document.rejection_reason = None;
            document.uploaded_at = Some(uploaded_at);
            document.file_ref = Some(FileRef(format!("blob://{}", payload.file_name)));
        }
        application.status = derive_application_status(
            &application.documents,
            application.awaiting_updated_documents_review,
        );
        application.last_update_at = uploaded_at;

        Ok(UploadReceipt {
            document_id: document_id.clone(),
            new_status: DocumentStatus::UnderReview,
            uploaded_at,
        })
    }

    async fn fetch_application_for_login(
        &self,
        _ctx: &RequestContext,
    ) -> Result<Option<ApplicationSummary>, RegistryError> {
        match &*self.login_lookup.lock().expect("lookup mutex poisoned") {
            LoginLookup::FromApplication => Ok(self
                .application
                .lock()
                .expect("application mutex poisoned")
                .as_ref()
                .map(Application::summary)),
            LoginLookup::NotFound => Ok(None),
            LoginLookup::Denied(detail) => Err(RegistryError::AccessDenied(detail.clone())),
            LoginLookup::Unavailable(detail) => Err(RegistryError::Unavailable(detail.clone())),
        }
    }
}

pub(super) fn build_service(registry: Arc<MockRegistry>) -> OnboardingService<MockRegistry> {
    OnboardingService::new(registry, policy())
}
