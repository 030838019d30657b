use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{ApplicantRole, ApplicationStatus, ApplicationSummary};
use super::registry::{OnboardingRegistry, RegistryError, RequestContext};
use super::status::derive_application_status;

/// Route the remediation flow lives under; `RedirectTo` outcomes point here.
pub const REMEDIATION_ROUTE: &str = "/onboarding/remediation";

pub const MSG_UPDATED_DOCUMENTS_IN_REVIEW: &str =
    "Your updated documents have been submitted and are awaiting review.";
pub const MSG_APPLICATION_IN_REVIEW: &str =
    "Your application is currently under review. Please try again later.";
pub const MSG_NOT_YET_APPROVED: &str = "Your application has not been approved yet.";

/// Decision handed back to the authentication flow before any role-based
/// navigation happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GateOutcome {
    Allow,
    RedirectTo { route: String },
    Block { message: String },
}

impl GateOutcome {
    fn remediation() -> Self {
        GateOutcome::RedirectTo {
            route: REMEDIATION_ROUTE.to_string(),
        }
    }

    fn block(message: &str) -> Self {
        GateOutcome::Block {
            message: message.to_string(),
        }
    }
}

/// Outcome of the authentication-time application lookup fed into the pure
/// decision table.
#[derive(Debug, Clone, PartialEq)]
pub enum GateLookup {
    Found(ApplicationSummary),
    NotFound,
    Failed,
}

/// Pure decision table mapping role and lookup result to a gate outcome.
///
/// Ambiguity always lands on `Block`, never `Allow`: letting an unvetted
/// account through is the worse failure mode than one extra friction step
/// for a legitimate applicant.
pub fn evaluate(role: ApplicantRole, lookup: &GateLookup) -> GateOutcome {
    if role != ApplicantRole::Producer {
        return GateOutcome::Allow;
    }

    match lookup {
        GateLookup::Failed => GateOutcome::block(MSG_APPLICATION_IN_REVIEW),
        GateLookup::NotFound => GateOutcome::block(MSG_NOT_YET_APPROVED),
        GateLookup::Found(summary) => match summary.status {
            ApplicationStatus::PendingReviewOfUpdatedDocuments => {
                GateOutcome::block(MSG_UPDATED_DOCUMENTS_IN_REVIEW)
            }
            ApplicationStatus::MissingDocuments if summary.has_missing_documents => {
                GateOutcome::remediation()
            }
            // A missing-documents status without a missing document in the
            // snapshot is inconsistent; treat it like an unreviewed record.
            ApplicationStatus::MissingDocuments => GateOutcome::block(MSG_NOT_YET_APPROVED),
            ApplicationStatus::Pending => GateOutcome::block(MSG_NOT_YET_APPROVED),
            _ => GateOutcome::Allow,
        },
    }
}

/// Synchronous-at-login gate: one narrow lookup, a fallback on access-denied,
/// then the pure decision table.
pub struct LoginGate<R> {
    registry: Arc<R>,
}

impl<R> LoginGate<R>
where
    R: OnboardingRegistry + 'static,
{
    pub fn new(registry: Arc<R>) -> Self {
        Self { registry }
    }

    pub async fn check(&self, ctx: &RequestContext, role: ApplicantRole) -> GateOutcome {
        if role != ApplicantRole::Producer {
            return GateOutcome::Allow;
        }

        let lookup = match self.registry.fetch_application_for_login(ctx).await {
            Ok(Some(summary)) => GateLookup::Found(summary),
            Ok(None) | Err(RegistryError::NotFound) => GateLookup::NotFound,
            Err(RegistryError::AccessDenied(detail)) => {
                // Usually "account state changed between login and document
                // check" rather than a true authorization fault, so retry via
                // the full lookup and let that result win.
                warn!(%detail, "login lookup denied, falling back to full application fetch");
                self.fallback_lookup(ctx).await
            }
            Err(error) => {
                warn!(%error, "login lookup failed, blocking conservatively");
                GateLookup::Failed
            }
        };

        evaluate(role, &lookup)
    }

    async fn fallback_lookup(&self, ctx: &RequestContext) -> GateLookup {
        match self.registry.fetch_application(ctx).await {
            Ok(Some(application)) => {
                let status = derive_application_status(
                    &application.documents,
                    application.awaiting_updated_documents_review,
                );
                let mut summary = application.summary();
                summary.status = status;
                GateLookup::Found(summary)
            }
            Ok(None) | Err(RegistryError::NotFound) => GateLookup::NotFound,
            Err(error) => {
                warn!(%error, "fallback application fetch failed");
                GateLookup::Failed
            }
        }
    }
}
