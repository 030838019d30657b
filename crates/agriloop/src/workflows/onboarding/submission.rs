use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{Application, DocumentId};
use super::registry::{
    OnboardingRegistry, RegistryError, RequestContext, SubmissionToken, UploadReceipt,
};
use super::validation::{FileUpload, UploadPolicy, ValidationError};

/// One document slot plus the replacement file offered for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResubmissionItem {
    pub document_id: DocumentId,
    pub file: FileUpload,
}

/// Result of one item of a submission batch. Committed items stay committed
/// even when a sibling fails; there is no rollback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum UploadOutcome {
    Accepted { receipt: UploadReceipt },
    Failed { reason: String },
}

/// Per-item report for a submission batch, replacing the old single
/// success/failure boolean so callers can react precisely instead of
/// re-deriving state with a second fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemReport {
    pub document_id: DocumentId,
    pub file_name: String,
    #[serde(flatten)]
    pub outcome: UploadOutcome,
}

/// Batch result returned to presentation code, including the refreshed
/// application snapshot so the caller sees the re-derived status directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReport {
    pub token: SubmissionToken,
    pub items: Vec<ItemReport>,
    pub application: Application,
}

impl SubmissionReport {
    pub fn all_accepted(&self) -> bool {
        self.items
            .iter()
            .all(|item| matches!(item.outcome, UploadOutcome::Accepted { .. }))
    }

    pub fn accepted_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item.outcome, UploadOutcome::Accepted { .. }))
            .count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &ItemReport> {
        self.items
            .iter()
            .filter(|item| matches!(item.outcome, UploadOutcome::Failed { .. }))
    }
}

/// Errors raised before any upload is attempted. Once the fan-out starts,
/// failures are reported per item instead.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("no documents were offered for submission")]
    EmptyBatch,
    #[error("submission rejected: {}", format_violations(.0))]
    Validation(Vec<ValidationError>),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

fn format_violations(violations: &[ValidationError]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

static SUBMISSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_submission_token() -> SubmissionToken {
    let id = SUBMISSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SubmissionToken(format!("sub-{id:06}"))
}

/// Orchestrates applicant-initiated document (re)uploads against the
/// registry: local validation first, then a concurrent wait-for-all fan-out,
/// then a fresh snapshot so the status is re-derived from committed state.
pub struct ResubmissionController<R> {
    registry: Arc<R>,
    policy: UploadPolicy,
}

impl<R> ResubmissionController<R>
where
    R: OnboardingRegistry + 'static,
{
    pub fn new(registry: Arc<R>, policy: UploadPolicy) -> Self {
        Self { registry, policy }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Submit a batch of replacement documents.
    ///
    /// Every item must pass the size/MIME whitelist and target a document
    /// that still accepts uploads; otherwise the whole batch is rejected
    /// locally and no upload is issued. Validated items are uploaded
    /// concurrently and reported per item; already-committed items are never
    /// rolled back when a sibling fails.
    pub async fn submit(
        &self,
        ctx: &RequestContext,
        items: Vec<ResubmissionItem>,
        message: Option<&str>,
        token: Option<SubmissionToken>,
    ) -> Result<SubmissionReport, SubmissionError> {
        if items.is_empty() {
            return Err(SubmissionError::EmptyBatch);
        }

        let mut violations: Vec<ValidationError> = items
            .iter()
            .filter_map(|item| self.policy.validate(&item.file).err())
            .collect();
        if !violations.is_empty() {
            return Err(SubmissionError::Validation(violations));
        }

        let application = self
            .registry
            .fetch_application(ctx)
            .await?
            .ok_or(RegistryError::NotFound)?;

        for item in &items {
            match application.document(&item.document_id) {
                None => violations.push(ValidationError::UnknownDocument {
                    document_id: item.document_id.clone(),
                }),
                Some(document) if !document.status.accepts_upload() => {
                    violations.push(ValidationError::AlreadyApproved {
                        document_id: item.document_id.clone(),
                    })
                }
                Some(_) => {}
            }
        }
        if !violations.is_empty() {
            return Err(SubmissionError::Validation(violations));
        }

        let token = token.unwrap_or_else(next_submission_token);
        info!(
            application = %application.id.0,
            batch = items.len(),
            token = %token.0,
            "submitting document batch"
        );

        let uploads = items.iter().map(|item| {
            let registry = Arc::clone(&self.registry);
            let token = &token;
            async move {
                registry
                    .upload_document(ctx, &item.document_id, &item.file, token, message)
                    .await
            }
        });
        let results = join_all(uploads).await;

        let reports = items
            .into_iter()
            .zip(results)
            .map(|(item, result)| {
                let outcome = match result {
                    Ok(receipt) => UploadOutcome::Accepted { receipt },
                    Err(error) => {
                        warn!(
                            document = %item.document_id.0,
                            %error,
                            "document upload failed"
                        );
                        UploadOutcome::Failed {
                            reason: error.to_string(),
                        }
                    }
                };
                ItemReport {
                    document_id: item.document_id,
                    file_name: item.file.file_name,
                    outcome,
                }
            })
            .collect();

        // Fresh snapshot after the fan-out: the registry re-derives the
        // application status from whatever actually committed.
        let application = self
            .registry
            .fetch_application(ctx)
            .await?
            .ok_or(RegistryError::NotFound)?;

        Ok(SubmissionReport {
            token,
            items: reports,
            application,
        })
    }
}
