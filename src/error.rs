//! Error types for cloneplan

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// cloneplan errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Descriptor parse error: {0}")]
    DescriptorParse(String),

    #[error("Invalid descriptor for `{type_name}`: {reason}")]
    InvalidDescriptor { type_name: String, reason: String },

    #[error("Render error: {0}")]
    Render(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("No clone plan registered for type `{0}`")]
    MissingPlan(String),

    #[error("Value is not a cloneable object: {0}")]
    NotCloneable(String),

    #[error("Null value reached non-nullable member `{member}`")]
    NullReference { member: String },

    #[error("Member `{member}` expected {expected}, found {found}")]
    ShapeMismatch {
        member: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_norway::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}
