use std::path::PathBuf;

use thiserror::Error;

/// Errors from the I/O edges of the application.
///
/// Editing a quotation never fails: malformed numbers become zero and
/// out-of-range list edits leave the document untouched. Everything here
/// comes from files, templates, prompts or the command line.
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize TOML: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("Client list JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] inquire::InquireError),

    #[error("Unknown field path: {0}")]
    UnknownField(String),

    #[error("Expected path=value, got: {0}")]
    InvalidAssignment(String),
}

impl QuoteError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        QuoteError::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the user backed out of a prompt (Esc / Ctrl-C).
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            QuoteError::Prompt(
                inquire::InquireError::OperationCanceled
                    | inquire::InquireError::OperationInterrupted
            )
        )
    }
}

pub type Result<T> = std::result::Result<T, QuoteError>;
