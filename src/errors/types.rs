//! # Error Types
//!
//! Error types for restcov using `thiserror`.

/// Custom result type for restcov operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for coverage analysis
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An operation descriptor did not split into exactly a method and a path
    #[error("Invalid method:path pair '{descriptor}'")]
    InvalidOperationFormat { descriptor: String },

    /// The API contract could not be loaded or parsed
    #[error("Contract error: {message}")]
    Contract {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O errors with additional context
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String> },

    /// The hit recorder task failed or went away
    #[error("Recorder error: {message}")]
    Recorder { message: String },
}

impl Error {
    /// Create an invalid operation format error
    pub fn invalid_operation<S: Into<String>>(descriptor: S) -> Self {
        Self::InvalidOperationFormat { descriptor: descriptor.into() }
    }

    /// Create a contract error
    pub fn contract<S: Into<String>>(message: S) -> Self {
        Self::Contract { message: message.into(), source: None }
    }

    /// Create a contract error with source
    pub fn contract_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Contract { message: message.into(), source: Some(source) }
    }

    /// Create an I/O error with context
    pub fn io<S: Into<String>>(source: std::io::Error, context: S) -> Self {
        Self::Io { source, context: context.into() }
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        Self::Serialization { message: message.into(), source: None }
    }

    /// Create a serialization error with source
    pub fn serialization_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Serialization { message: message.into(), source: Some(source) }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    /// Create a recorder error
    pub fn recorder<S: Into<String>>(message: S) -> Self {
        Self::Recorder { message: message.into() }
    }

    /// Process exit code the CLI should use for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidOperationFormat { .. } | Error::Contract { .. } => 3,
            Error::Config { .. } | Error::Validation { .. } => 2,
            Error::Io { .. } | Error::Serialization { .. } | Error::Recorder { .. } => 1,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io { source: error, context: "I/O operation failed".to_string() }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization_with_source("JSON serialization failed", Box::new(error))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Self::serialization_with_source("YAML serialization failed", Box::new(error))
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::validation(format!("Validation failed: {}", message))
    }
}
