//! Error types for the rota schedule service.

use thiserror::Error;

/// Main error type for rota operations.
#[derive(Error, Debug)]
pub enum RotaError {
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Enrollment error: {0}")]
    Enrollment(#[from] EnrollmentError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the schedule domain: time parsing and calendar layout.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Invalid interval for '{id}': end {end} is not after start {start}")]
    InvalidInterval {
        id: String,
        start: String,
        end: String,
    },

    #[error("Duplicate identifier in layout input: {0}")]
    DuplicateIdentifier(String),

    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Invalid day of week: {0} (expected 0-6)")]
    InvalidDay(u8),
}

/// Enrollment-related errors.
#[derive(Error, Debug)]
pub enum EnrollmentError {
    #[error("Lecture '{lecture_id}' is full (capacity {capacity})")]
    LectureFull { lecture_id: String, capacity: u32 },

    #[error("Student '{student_id}' is already enrolled in '{lecture_id}'")]
    AlreadyEnrolled {
        student_id: String,
        lecture_id: String,
    },

    #[error("Student '{student_id}' is not enrolled in '{lecture_id}'")]
    NotEnrolled {
        student_id: String,
        lecture_id: String,
    },
}

/// Storage-related errors for the in-memory stores.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Lecture not found: {0}")]
    LectureNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Username already taken: {0}")]
    DuplicateUsername(String),
}

/// Authentication and authorization errors.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No credentials provided")]
    MissingCredentials,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Session expired")]
    SessionExpired,

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Result type alias for rota operations.
pub type Result<T> = std::result::Result<T, RotaError>;
