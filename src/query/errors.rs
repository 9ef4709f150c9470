use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("query root must have a 'kind' or be a '$any' wildcard")]
    MissingKind,

    #[error("query pattern must be a JSON object, got {found}")]
    NotAnObject { found: String },

    #[error("invalid $text regex '{pattern}': {message}")]
    InvalidTextRegex { pattern: String, message: String },

    #[error("reserved key '{key}' expects a {expected}")]
    InvalidKeyType { key: String, expected: &'static str },

    #[error("query pattern is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
