use std::collections::{HashMap, HashSet};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use agriloop::workflows::onboarding::{
    derive_application_status, ApplicantId, ApplicantRole, Application, ApplicationId,
    ApplicationSummary, Document, DocumentId, DocumentStatus, DocumentTypeCode, FileUpload,
    OnboardingRegistry, RegistryError, RequestContext, SubmissionToken, UploadReceipt,
};
use async_trait::async_trait;
use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Registry double backing local runs and route tests. Production deploys
/// point the service at the real persistence backend instead.
#[derive(Default)]
pub(crate) struct InMemoryOnboardingRegistry {
    applications: Mutex<HashMap<ApplicantId, Application>>,
    committed_tokens: Mutex<HashSet<(SubmissionToken, DocumentId)>>,
}

impl InMemoryOnboardingRegistry {
    pub(crate) fn seeded() -> Self {
        let registry = Self::default();
        registry.insert(sample_producer_application());
        registry
    }

    pub(crate) fn insert(&self, application: Application) {
        self.applications
            .lock()
            .expect("registry mutex poisoned")
            .insert(application.applicant_id.clone(), application);
    }
}

#[async_trait]
impl OnboardingRegistry for InMemoryOnboardingRegistry {
    async fn fetch_application(
        &self,
        ctx: &RequestContext,
    ) -> Result<Option<Application>, RegistryError> {
        let guard = self.applications.lock().expect("registry mutex poisoned");
        Ok(guard.get(&ctx.applicant_id).cloned())
    }

    async fn fetch_document_set(
        &self,
        _ctx: &RequestContext,
        application_id: &ApplicationId,
    ) -> Result<Vec<Document>, RegistryError> {
        let guard = self.applications.lock().expect("registry mutex poisoned");
        guard
            .values()
            .find(|application| &application.id == application_id)
            .map(|application| application.documents.clone())
            .ok_or(RegistryError::NotFound)
    }

    async fn upload_document(
        &self,
        ctx: &RequestContext,
        document_id: &DocumentId,
        payload: &FileUpload,
        token: &SubmissionToken,
        _note: Option<&str>,
    ) -> Result<UploadReceipt, RegistryError> {
        let mut applications = self.applications.lock().expect("registry mutex poisoned");
        let application = applications
            .get_mut(&ctx.applicant_id)
            .ok_or(RegistryError::NotFound)?;

        let mut tokens = self.committed_tokens.lock().expect("token mutex poisoned");
        let key = (token.clone(), document_id.clone());
        let duplicate = !tokens.insert(key);

        let uploaded_at = Utc::now();
        {
            let document = application
                .documents
                .iter_mut()
                .find(|document| &document.id == document_id)
                .ok_or(RegistryError::NotFound)?;

            if duplicate {
                // A repeat of an already-committed batch item: acknowledge the
                // stored state instead of applying the upload twice.
                return Ok(UploadReceipt {
                    document_id: document_id.clone(),
                    new_status: document.status,
                    uploaded_at: document.uploaded_at.unwrap_or(uploaded_at),
                });
            }

            document.status = DocumentStatus::UnderReview;
            document.rejection_reason = None;
            document.uploaded_at = Some(uploaded_at);
            document.file_ref = Some(agriloop::workflows::onboarding::FileRef(format!(
                "mem://{}/{}",
                application.id.0, payload.file_name
            )));
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
        ctx: &RequestContext,
    ) -> Result<Option<ApplicationSummary>, RegistryError> {
        let guard = self.applications.lock().expect("registry mutex poisoned");
        Ok(guard.get(&ctx.applicant_id).map(Application::summary))
    }
}

fn sample_document(id: &str, type_code: &str, status: DocumentStatus) -> Document {
    Document {
        id: DocumentId(id.to_string()),
        application_id: ApplicationId("app-demo".to_string()),
        type_code: DocumentTypeCode(type_code.to_string()),
        required: true,
        status,
        file_ref: None,
        reviewer_note: None,
        rejection_reason: match status {
            DocumentStatus::Rejected => Some("document scan is illegible".to_string()),
            _ => None,
        },
        uploaded_at: None,
        reviewed_at: None,
    }
}

pub(crate) fn sample_producer_application() -> Application {
    let documents = vec![
        sample_document("doc-1", "registration_certificate", DocumentStatus::Approved),
        sample_document("doc-2", "tax_plate", DocumentStatus::Rejected),
        sample_document("doc-3", "chamber_of_agriculture_record", DocumentStatus::Missing),
    ];
    let status = derive_application_status(&documents, false);

    Application {
        id: ApplicationId("app-demo".to_string()),
        applicant_id: ApplicantId("producer-demo".to_string()),
        role: ApplicantRole::Producer,
        status,
        submitted_at: Utc::now(),
        last_update_at: Utc::now(),
        admin_note: Some("Tax plate photo must show the current year.".to_string()),
        rejection_reason: None,
        awaiting_updated_documents_review: false,
        documents,
    }
}
