/// Errors raised by the core services and the document store.
///
/// The variants fall into three groups that the API layer maps to status codes:
/// validation (caller must resupply input), interaction (plan refused) and everything else,
/// which is a persistence failure.
#[derive(Debug, thiserror::Error)]
pub enum CdssError {
    #[error("Please provide all required fields.")]
    MissingRequiredFields,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    InteractionDetected(String),

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("data directory does not exist: {}", path.display())]
    DataDirMissing { path: std::path::PathBuf },
    #[error("failed to write document: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read document: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize document: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize document {}: {source}", path.display())]
    Deserialization {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{collection} index points at a missing document: {key}")]
    DanglingIndex {
        collection: &'static str,
        key: String,
    },
    #[error("{collection} document under the digest of '{key}' belongs to another key")]
    KeyCollision {
        collection: &'static str,
        key: String,
    },
    #[error("storage path has no parent directory: {}", path.display())]
    InvalidStoragePath { path: std::path::PathBuf },
    #[error("invalid document id: {0}")]
    InvalidDocumentId(#[from] cdss_uuid::UuidError),
}

impl CdssError {
    /// True for errors the caller can fix by resubmitting different input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CdssError::MissingRequiredFields | CdssError::InvalidInput(_)
        )
    }

    /// True when the plan was refused by the interaction check.
    pub fn is_conflict(&self) -> bool {
        matches!(self, CdssError::InteractionDetected(_))
    }
}

pub type CdssResult<T> = std::result::Result<T, CdssError>;
