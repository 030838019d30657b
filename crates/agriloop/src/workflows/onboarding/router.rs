use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicantId, ApplicantRole};
use super::registry::{OnboardingRegistry, RegistryError, RequestContext, SubmissionToken};
use super::service::OnboardingService;
use super::submission::{ResubmissionItem, SubmissionError};

/// Router builder exposing the onboarding workflow over HTTP.
pub fn onboarding_router<R>(service: Arc<OnboardingService<R>>) -> Router
where
    R: OnboardingRegistry + 'static,
{
    Router::new()
        .route("/api/v1/onboarding/gate", post(gate_handler::<R>))
        .route(
            "/api/v1/onboarding/applications/:applicant_id",
            get(status_handler::<R>),
        )
        .route(
            "/api/v1/onboarding/applications/:applicant_id/remediation",
            get(remediation_handler::<R>),
        )
        .route(
            "/api/v1/onboarding/documents",
            post(submit_documents_handler::<R>),
        )
        .with_state(service)
}

fn bearer_token(headers: &HeaderMap) -> String {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start_matches("Bearer ").trim().to_string())
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
pub(crate) struct GateRequest {
    pub(crate) applicant_id: String,
    pub(crate) role: ApplicantRole,
}

pub(crate) async fn gate_handler<R>(
    State(service): State<Arc<OnboardingService<R>>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<GateRequest>,
) -> Response
where
    R: OnboardingRegistry + 'static,
{
    let ctx = RequestContext::new(ApplicantId(request.applicant_id), bearer_token(&headers));
    let outcome = service.login_gate(&ctx, request.role).await;
    (StatusCode::OK, axum::Json(outcome)).into_response()
}

pub(crate) async fn status_handler<R>(
    State(service): State<Arc<OnboardingService<R>>>,
    headers: HeaderMap,
    Path(applicant_id): Path<String>,
) -> Response
where
    R: OnboardingRegistry + 'static,
{
    let ctx = RequestContext::new(ApplicantId(applicant_id), bearer_token(&headers));
    match service.application_status(&ctx).await {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn remediation_handler<R>(
    State(service): State<Arc<OnboardingService<R>>>,
    headers: HeaderMap,
    Path(applicant_id): Path<String>,
) -> Response
where
    R: OnboardingRegistry + 'static,
{
    let ctx = RequestContext::new(ApplicantId(applicant_id), bearer_token(&headers));
    match service.remediation(&ctx).await {
        Ok(state) => (StatusCode::OK, axum::Json(state)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitDocumentsRequest {
    pub(crate) applicant_id: String,
    #[serde(default)]
    pub(crate) message: Option<String>,
    #[serde(default)]
    pub(crate) submission_token: Option<String>,
    pub(crate) items: Vec<ResubmissionItem>,
}

pub(crate) async fn submit_documents_handler<R>(
    State(service): State<Arc<OnboardingService<R>>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<SubmitDocumentsRequest>,
) -> Response
where
    R: OnboardingRegistry + 'static,
{
    let ctx = RequestContext::new(ApplicantId(request.applicant_id), bearer_token(&headers));
    let token = request.submission_token.map(SubmissionToken);

    match service
        .submit_documents(&ctx, request.items, request.message.as_deref(), token)
        .await
    {
        Ok(report) => {
            let status = if report.all_accepted() {
                StatusCode::ACCEPTED
            } else {
                StatusCode::MULTI_STATUS
            };
            (status, axum::Json(report)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: SubmissionError) -> Response {
    match error {
        SubmissionError::Validation(violations) => {
            let payload = json!({
                "error": "submission rejected",
                "violations": violations
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        SubmissionError::EmptyBatch => {
            let payload = json!({ "error": SubmissionError::EmptyBatch.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        SubmissionError::Registry(RegistryError::NotFound) => {
            let payload = json!({ "error": "application not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        SubmissionError::Registry(RegistryError::AccessDenied(detail)) => {
            let payload = json!({ "error": format!("access denied: {detail}") });
            (StatusCode::FORBIDDEN, axum::Json(payload)).into_response()
        }
        SubmissionError::Registry(error @ RegistryError::Unavailable(_)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
    }
}
