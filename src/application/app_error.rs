use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Too many requests. Please slow down.")]
    RateLimited,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The verifier judged the address undeliverable, or could not be reached.
    #[error("Undeliverable: {0}")]
    Undeliverable(String),

    /// Unique key already present at write time. Callers translate this into
    /// an "already exists" outcome; it should never reach a client.
    #[error("Record already exists")]
    Conflict,

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Text safe to show to an end user.
    pub fn public_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) | AppError::Undeliverable(msg) => msg.clone(),
            AppError::RateLimited => self.to_string(),
            _ => "Server error".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    DatabaseError,
    RateLimited,
    InvalidInput,
    Undeliverable,
    Conflict,
    NotificationFailed,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::Undeliverable => "UNDELIVERABLE",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::NotificationFailed => "NOTIFICATION_FAILED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
