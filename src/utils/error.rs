use thiserror::Error;

#[derive(Error, Debug)]
pub enum NoteError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache backend error: {0}")]
    CacheError(#[from] redis::RedisError),

    #[error("Invalid decimal value from upstream: {value:?}")]
    InvalidDecimal { value: String },

    #[error("Upstream data error: {message}")]
    UpstreamDataError { message: String },

    #[error("Invalid configuration value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, NoteError>;
