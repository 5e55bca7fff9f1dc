use thiserror::Error;

#[derive(Error, Debug)]
pub enum RekognizerError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Image processing error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{message}")]
    BadRequest { message: String },

    #[error("{message}")]
    ValidationError { message: String },

    #[error("No face found in image {image}")]
    NoFace { image: String },

    #[error("Found {count} faces in image {image}, expected exactly one")]
    TooManyFaces { image: String, count: usize },

    #[error("Face does not match any known person")]
    UnknownPerson,

    #[error("{service} returned {status}: {message}")]
    UpstreamError {
        service: String,
        status: u16,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Client,
    Recognition,
    Upstream,
    Storage,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RekognizerError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn upstream(service: &str, status: u16, message: impl Into<String>) -> Self {
        Self::UpstreamError {
            service: service.to_string(),
            status,
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::BadRequest { .. } | Self::ValidationError { .. } => ErrorCategory::Client,
            Self::NoFace { .. } | Self::TooManyFaces { .. } | Self::UnknownPerson => {
                ErrorCategory::Recognition
            }
            Self::HttpError(_) | Self::UpstreamError { .. } => ErrorCategory::Upstream,
            Self::DatabaseError(_) | Self::MigrationError(_) => ErrorCategory::Storage,
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::ImageError(_) | Self::IoError(_) | Self::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Client | ErrorCategory::Recognition => ErrorSeverity::Low,
            ErrorCategory::Upstream => ErrorSeverity::Medium,
            ErrorCategory::Storage | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 對外回應使用的錯誤代碼
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "BAD_REQUEST",
            Self::ValidationError { .. } => "VALIDATION_ERROR",
            Self::NoFace { .. } => "NO_FACE",
            Self::TooManyFaces { .. } => "TOO_MANY_FACE",
            Self::UnknownPerson => "UNKNOWN_PERSON",
            _ => "UNEXPECTED_ERROR",
        }
    }

    /// Only mapped client-facing errors answer with 400.
    pub fn status_code(&self) -> u16 {
        match self.error_code() {
            "UNEXPECTED_ERROR" => 500,
            _ => 400,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::HttpError(_) => "Check that the image host and model backends are reachable",
            Self::UpstreamError { .. } => {
                "Check the facenet and detector services; they may be overloaded or misconfigured"
            }
            Self::DatabaseError(_) => "Check database.url and that PostgreSQL is running",
            Self::MigrationError(_) => {
                "Inspect the _sqlx_migrations table; a previous migration may have failed halfway"
            }
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => {
                "Fix the configuration file or export the referenced environment variables"
            }
            Self::BadRequest { .. } | Self::ValidationError { .. } => {
                "Check the request body and image URLs"
            }
            Self::NoFace { .. } | Self::TooManyFaces { .. } => {
                "Use a photo with exactly one clearly visible face"
            }
            Self::UnknownPerson => "Enroll the person before trying to recognize them",
            Self::ImageError(_) | Self::IoError(_) | Self::SerializationError(_) => {
                "This is unexpected; rerun with -v and inspect the logs"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Storage => format!("Database problem: {}", self),
            ErrorCategory::Upstream => format!("Backend service problem: {}", self),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RekognizerError>;
