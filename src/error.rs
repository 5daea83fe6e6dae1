use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while loading, laying out or writing a recipe
#[derive(Error, Debug)]
pub enum RecipeError {
    /// The input record is missing a required field or has the wrong shape.
    /// `field` is a JSON path such as `components[1].name`.
    #[error("invalid recipe: `{field}` {reason}")]
    Validation { field: String, reason: String },

    /// The input could not be read or the output could not be written
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The PDF backend failed to produce a document
    #[error("render failed: {0}")]
    Render(String),
}

impl RecipeError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// The offending field for validation errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field.as_str()),
            _ => None,
        }
    }

    /// Process exit code used by the binary for this error class.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } => 2,
            Self::Io { .. } => 3,
            Self::Render(_) => 4,
        }
    }
}

impl From<serde_json::Error> for RecipeError {
    fn from(e: serde_json::Error) -> Self {
        Self::validation("$", format!("is not valid JSON: {e}"))
    }
}

pub type Result<T> = std::result::Result<T, RecipeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_field() {
        let e = RecipeError::validation("components[0].name", "is required");
        assert_eq!(e.to_string(), "invalid recipe: `components[0].name` is required");
        assert_eq!(e.field(), Some("components[0].name"));
        assert_eq!(e.exit_code(), 2);
    }

    #[test]
    fn io_message_names_path() {
        let e = RecipeError::io(
            Path::new("/nowhere/cake.json"),
            io::Error::new(io::ErrorKind::NotFound, "not found"),
        );
        assert!(e.to_string().contains("/nowhere/cake.json"));
        assert_eq!(e.field(), None);
        assert_eq!(e.exit_code(), 3);
    }

    #[test]
    fn json_syntax_error_is_validation() {
        let err = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let e = RecipeError::from(err);
        assert_eq!(e.field(), Some("$"));
    }
}
