use airdrop_merkle::MerkleError;
use thiserror::Error;

pub type DataResult<T> = Result<T, DataError>;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Merkle error: {0}")]
    Merkle(#[from] MerkleError),

    #[error("Invalid {context}: {source}")]
    InvalidEntry {
        context: String,
        #[source]
        source: MerkleError,
    },

    #[error("Schema validation error: {0}")]
    SchemaValidation(String),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: String, found: String },

    #[error("Leaf encoding mismatch: configured {expected}, document declares {found}")]
    EncodingMismatch { expected: String, found: String },

    #[error("Root mismatch: document declares {expected}, recomputed {computed}")]
    RootMismatch { expected: String, computed: String },

    #[error("Metadata inconsistent with leaves: {0}")]
    MetadataMismatch(String),

    #[error("Cached proof for index {index} does not match the rebuilt tree")]
    CachedProofMismatch { index: u64 },

    #[error("Tree store unavailable: {0}")]
    Unavailable(String),

    #[error("Gave up fetching {location}: {last_error}")]
    RetriesExhausted { location: String, last_error: String },
}

impl DataError {
    /// Whether retrying the same fetch could succeed. Integrity failures never
    /// qualify.
    pub fn is_transient(&self) -> bool {
        match self {
            DataError::Unavailable(_) => true,
            DataError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::WouldBlock
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}
