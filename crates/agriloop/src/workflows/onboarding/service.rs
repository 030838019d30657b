use std::sync::Arc;

use super::domain::{ApplicantRole, ApplicationStatusView};
use super::gate::{GateOutcome, LoginGate};
use super::registry::{OnboardingRegistry, RegistryError, RequestContext, SubmissionToken};
use super::status::{derive_application_status, remediation_state, RemediationState};
use super::submission::{ResubmissionController, ResubmissionItem, SubmissionError, SubmissionReport};
use super::validation::UploadPolicy;

/// Facade composing the login gate and the resubmission controller over one
/// registry client, so every surface consumes the same derived status.
pub struct OnboardingService<R> {
    registry: Arc<R>,
    gate: LoginGate<R>,
    controller: ResubmissionController<R>,
}

impl<R> OnboardingService<R>
where
    R: OnboardingRegistry + 'static,
{
    pub fn new(registry: Arc<R>, policy: UploadPolicy) -> Self {
        let gate = LoginGate::new(Arc::clone(&registry));
        let controller = ResubmissionController::new(Arc::clone(&registry), policy);
        Self {
            registry,
            gate,
            controller,
        }
    }

    /// Gate decision consumed by the authentication flow before role routing.
    pub async fn login_gate(&self, ctx: &RequestContext, role: ApplicantRole) -> GateOutcome {
        self.gate.check(ctx, role).await
    }

    /// Current application status for the authenticated applicant, with the
    /// status re-derived from the live document set.
    pub async fn application_status(
        &self,
        ctx: &RequestContext,
    ) -> Result<ApplicationStatusView, SubmissionError> {
        let mut application = self
            .registry
            .fetch_application(ctx)
            .await?
            .ok_or(RegistryError::NotFound)?;
        application.status = derive_application_status(
            &application.documents,
            application.awaiting_updated_documents_review,
        );
        Ok(application.status_view())
    }

    /// Which documents may be re-uploaded, and with what reviewer guidance.
    pub async fn remediation(
        &self,
        ctx: &RequestContext,
    ) -> Result<RemediationState, SubmissionError> {
        let application = self
            .registry
            .fetch_application(ctx)
            .await?
            .ok_or(RegistryError::NotFound)?;
        Ok(remediation_state(&application))
    }

    /// Validate and upload a batch of replacement documents.
    pub async fn submit_documents(
        &self,
        ctx: &RequestContext,
        items: Vec<ResubmissionItem>,
        message: Option<&str>,
        token: Option<SubmissionToken>,
    ) -> Result<SubmissionReport, SubmissionError> {
        self.controller.submit(ctx, items, message, token).await
    }
}
