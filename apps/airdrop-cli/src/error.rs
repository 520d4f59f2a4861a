use airdrop_merkle::MerkleError;
use airdrop_tree_data::DataError;
use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tree data error: {0}")]
    Data(#[from] DataError),

    #[error("Merkle error: {0}")]
    Merkle(#[from] MerkleError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Tree failed integrity validation with {0} issue(s)")]
    IntegrityFailed(usize),

    #[error("Proof rejected: {0}")]
    ProofRejected(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}
