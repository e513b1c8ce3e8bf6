use thiserror::Error;

#[derive(Error, Debug)]
pub enum CharcoalError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source file not found or unreadable: {path}")]
    SourceNotFound { path: String },

    #[error("Extraction pattern is invalid: {message}")]
    Pattern {
        message: String,
        #[source]
        source: regex::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Permission denied: {path}")]
    Permission { path: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Destination is not a directory: {path}")]
    DestinationNotDirectory { path: String },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for CharcoalError {
    fn user_message(&self) -> String {
        match self {
            CharcoalError::SourceNotFound { path } => {
                format!("Source file not found: {}", path)
            }
            CharcoalError::Pattern { message, .. } => {
                format!("Extraction pattern is invalid: {}", message)
            }
            CharcoalError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            CharcoalError::Permission { path } => {
                format!("Permission denied accessing: {}", path)
            }
            CharcoalError::InvalidPath { path } => {
                format!("Invalid path: {}", path)
            }
            CharcoalError::DestinationNotDirectory { path } => {
                format!("Destination exists but is not a directory: {}", path)
            }
            CharcoalError::Cancelled => "Operation was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            CharcoalError::SourceNotFound { .. } => Some(
                "Check that the path exists and points to a readable log file or directory."
                    .to_string(),
            ),
            CharcoalError::Pattern { .. } => Some(
                "The language tag in your configuration produced an invalid matching rule. \
                 Check the [extractor] section of your config file."
                    .to_string(),
            ),
            CharcoalError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present."
                    .to_string(),
            ),
            CharcoalError::Permission { .. } => Some(
                "Ensure you have the necessary read/write permissions for the target directory."
                    .to_string(),
            ),
            CharcoalError::DestinationNotDirectory { .. } => Some(
                "Remove the conflicting file or choose a different destination with --output."
                    .to_string(),
            ),
            _ => None,
        }
    }
}

impl From<regex::Error> for CharcoalError {
    fn from(error: regex::Error) -> Self {
        CharcoalError::Pattern {
            message: error.to_string(),
            source: error,
        }
    }
}

impl From<toml::de::Error> for CharcoalError {
    fn from(error: toml::de::Error) -> Self {
        CharcoalError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CharcoalError>;
