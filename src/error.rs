use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read calendar file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Invalid file pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for CalendarError {
    fn user_message(&self) -> String {
        match self {
            CalendarError::Read { path, source } => {
                format!("Could not read {}: {}", path.display(), source)
            }
            CalendarError::Write { path, source } => {
                format!("Could not write {}: {}", path.display(), source)
            }
            CalendarError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            CalendarError::InvalidPath { path } => {
                format!("Invalid input path: {}", path)
            }
            CalendarError::InvalidPattern { pattern, message } => {
                format!("Invalid file pattern '{}': {}", pattern, message)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            CalendarError::Read { source, .. }
                if source.kind() == std::io::ErrorKind::InvalidData =>
            {
                Some(
                    "The file is not valid UTF-8 text. \
                     Re-save the calendar page with UTF-8 encoding."
                        .to_string(),
                )
            }
            CalendarError::Read { .. } => {
                Some("Check that the calendar file still exists and is readable.".to_string())
            }
            CalendarError::Write { .. } => Some(
                "Ensure you have write permission for the output location, \
                 or choose another path with --output."
                    .to_string(),
            ),
            CalendarError::Config { .. } => Some(
                "Check your configuration file syntax, \
                 or run with --generate-config to start from a sample."
                    .to_string(),
            ),
            CalendarError::InvalidPath { .. } => Some(
                "Point --input at the directory holding the saved calendar pages.".to_string()
            ),
            CalendarError::InvalidPattern { .. } => Some(
                "Use a shell-style glob such as calendar_day_*_year_*.html".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for CalendarError {
    fn from(error: toml::de::Error) -> Self {
        CalendarError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CalendarError>;
