use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TilescapeError {
    // Construction errors
    #[error("Invalid grid dimensions {width}x{height}: width and height must be greater than 0")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Tile catalog has no entry for palette tile '{tile_id}'")]
    MissingPaletteTile { tile_id: String },

    #[error("Invalid generator config: {reason}")]
    InvalidConfig { reason: String },

    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    // Config-related errors
    #[error("Failed to get config directory")]
    ConfigDirNotFound,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize config: {0}")]
    SerializationFailed(#[from] toml::ser::Error),

    #[error("Failed to deserialize config: {0}")]
    DeserializationFailed(#[from] toml::de::Error),

    // Document-related errors
    #[error("Failed to encode landscape document: {0}")]
    JsonFailed(#[from] serde_json::Error),

    #[error("Failed to encode landscape document: {reason}")]
    EncodeFailed { reason: String },

    #[error("Landscape document is corrupted: {reason}")]
    CorruptedDocument { reason: String },

    #[error("Landscape document not found at path: {path}")]
    DocumentNotFound { path: PathBuf },

    #[error("Landscape document validation failed: {reason}")]
    DocumentValidationFailed { reason: String },
}

/// Result type alias for all operations
pub type TilescapeResult<T> = Result<T, TilescapeError>;

/// Flatten `validator` field errors into a single readable line.
pub fn describe_validation_errors(errors: &validator::ValidationErrors) -> String {
    let details = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            format!("{field}: {}", error_msgs.join(", "))
        })
        .collect::<Vec<String>>()
        .join("; ");

    // Nested struct errors don't show up in field_errors()
    if details.is_empty() {
        errors.to_string()
    } else {
        details
    }
}
