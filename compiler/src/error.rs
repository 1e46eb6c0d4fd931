use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataClassError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("The provided JSON is malformed or couldn't be parsed!")]
    MalformedJson,

    #[error("Primitive JSON arrays are not supported! Please serialize them directly.")]
    PrimitiveJsonArray,

    #[error("Invalid settings: {0}")]
    Settings(String),

    #[error("Unknown member group \"{0}\" (expected constructor, copyWith, serialization, toString, equality or useEquatable)")]
    UnknownPart(String),

    #[error("Failed to create file {}: {source}", path.display())]
    WriteFailed {
        path:   PathBuf,
        source: std::io::Error,
    },
}

/// Why a detected class can't be turned into a data class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassIssue {
    #[error("{0} couldn't be converted to a data class: Class must have at least one property!")]
    NoProperties(String),

    #[error("{0} couldn't be converted to a data class: Class has no ending!")]
    NoEnding(String),

    #[error("{0} couldn't be converted to a data class: Class doesn't have unique property names!")]
    DuplicatePropertyNames(String),
}
