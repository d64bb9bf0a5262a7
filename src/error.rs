use std::path::PathBuf;
use thiserror::Error;

/// Result type alias used throughout the library.
pub type Result<T> = std::result::Result<T, DocgenError>;

/// Everything that can go wrong between reading the input and printing the
/// generated documentation.
#[derive(Error, Debug)]
pub enum DocgenError {
    /// A local input path is missing or is not a directory.
    #[error("Invalid directory path: {}", path.display())]
    InvalidPath { path: PathBuf },

    /// A remote repository could not be fetched.
    #[error("Failed to clone repository {reference}: {message}")]
    SourceUnavailable { reference: String, message: String },

    /// One file could not be read or parsed.
    #[error("Error parsing {}: {message}", path.display())]
    Extraction { path: PathBuf, message: String },

    /// The generation agent failed or returned nothing usable.
    #[error("Error generating documentation: {message}")]
    Generation { message: String },

    /// The grading response could not be turned into a report.
    #[error("Error grading documentation: {message}")]
    Grading { message: String },

    /// Missing or contradictory settings.
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("IO error accessing '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DocgenError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    pub fn grading(message: impl Into<String>) -> Self {
        Self::Grading {
            message: message.into(),
        }
    }

    /// The message shown to the person running the tool.
    ///
    /// Generation failures are reduced to a generic hint so provider
    /// responses and internals stay in the log.
    pub fn user_message(&self) -> String {
        match self {
            Self::Generation { .. } => {
                "Failed to generate documentation. Please check your input and try again."
                    .to_string()
            }
            other => other.to_string(),
        }
    }
}
