use thiserror::Error;

/// hydrotrack error types
#[derive(Error, Debug)]
pub enum HydroError {
    /// Owner identifier is not a well-formed ObjectId
    #[error("invalid owner id: {0:?}")]
    InvalidOwnerId(String),

    /// No profile exists for the owner
    #[error("owner not found: {0}")]
    OwnerNotFound(String),

    /// Record or profile store failed (I/O, lock, corrupt file)
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Record rejected at ingestion
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Record id does not exist
    #[error("record not found: {0}")]
    RecordNotFound(String),

    /// Failed to parse user input
    #[error("parse error: {0}")]
    Parse(String),

    /// Failed to serialize program output
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

impl HydroError {
    /// HTTP-style status for callers that expose reports over the wire.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidOwnerId(_) | Self::InvalidRecord(_) | Self::Parse(_) => 400,
            Self::OwnerNotFound(_) | Self::RecordNotFound(_) => 404,
            Self::StoreUnavailable(_) | Self::Serialize(_) | Self::Io(_) | Self::Config(_) => 500,
        }
    }
}

/// Result type alias for hydrotrack
pub type Result<T> = std::result::Result<T, HydroError>;
