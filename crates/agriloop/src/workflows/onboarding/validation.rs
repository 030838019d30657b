use mime::Mime;
use serde::{Deserialize, Serialize};

use super::domain::DocumentId;

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// One file handed in by the applicant for a document slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Size/MIME whitelist applied locally before any network call.
#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    pub max_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadPolicy {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Check one upload against the policy. Errors always carry the file name
    /// so the applicant can tell which item of a batch is at fault.
    pub fn validate(&self, upload: &FileUpload) -> Result<(), ValidationError> {
        if upload.size_bytes() > self.max_bytes {
            return Err(ValidationError::FileTooLarge {
                file_name: upload.file_name.clone(),
                size_bytes: upload.size_bytes(),
                max_bytes: self.max_bytes,
            });
        }

        let mime: Mime =
            upload
                .content_type
                .parse()
                .map_err(|_| ValidationError::UnsupportedFileType {
                    file_name: upload.file_name.clone(),
                    content_type: upload.content_type.clone(),
                })?;

        if !is_accepted_mime(&mime) {
            return Err(ValidationError::UnsupportedFileType {
                file_name: upload.file_name.clone(),
                content_type: upload.content_type.clone(),
            });
        }

        Ok(())
    }
}

fn is_accepted_mime(mime: &Mime) -> bool {
    [mime::APPLICATION_PDF, mime::IMAGE_JPEG, mime::IMAGE_PNG]
        .iter()
        .any(|accepted| accepted.essence_str() == mime.essence_str())
}

/// Local validation failures; no upload is attempted while any of these
/// apply to a batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("file '{file_name}' is {size_bytes} bytes, above the {max_bytes} byte limit")]
    FileTooLarge {
        file_name: String,
        size_bytes: u64,
        max_bytes: u64,
    },
    #[error("file '{file_name}' has unsupported type '{content_type}' (accepted: pdf, jpeg, png)")]
    UnsupportedFileType {
        file_name: String,
        content_type: String,
    },
    #[error("document {document_id:?} is already approved and cannot be replaced")]
    AlreadyApproved { document_id: DocumentId },
    #[error("document {document_id:?} does not belong to this application")]
    UnknownDocument { document_id: DocumentId },
}
