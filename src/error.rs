//! Error types for the form schema engine

use thiserror::Error;

/// Result type for form schema operations
pub type Result<T> = std::result::Result<T, FormSchemaError>;

/// Business rule violations raised while building or emitting a schema.
///
/// Every variant maps to a stable string code (see [`FormSchemaError::code`])
/// so callers can branch on the kind of failure without matching on messages.
#[derive(Error, Debug)]
pub enum FormSchemaError {
    #[error("Schema text is empty")]
    EmptySchemaText,

    #[error("Invalid schema format: {0}")]
    InvalidSchemaFormat(String),

    #[error("Invalid schema structure: {0}")]
    InvalidSchemaStructure(String),

    #[error("Duplicate field code: {0}")]
    DuplicateFieldCode(String),

    #[error("Invalid field type: {0}")]
    InvalidFieldType(String),

    #[error("Invalid layout structure: {0}")]
    InvalidLayoutStructure(String),

    #[error("Invalid decoration element: {0}")]
    InvalidDecorationElement(String),

    #[error("Field code must not be empty")]
    EmptyFieldCode,

    #[error("Failed to serialize schema: {0}")]
    SerializationFailed(#[from] serde_yaml_ng::Error),
}

impl FormSchemaError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            FormSchemaError::EmptySchemaText => "EmptySchemaText",
            FormSchemaError::InvalidSchemaFormat(_) => "InvalidSchemaFormat",
            FormSchemaError::InvalidSchemaStructure(_) => "InvalidSchemaStructure",
            FormSchemaError::DuplicateFieldCode(_) => "DuplicateFieldCode",
            FormSchemaError::InvalidFieldType(_) => "InvalidFieldType",
            FormSchemaError::InvalidLayoutStructure(_) => "InvalidLayoutStructure",
            FormSchemaError::InvalidDecorationElement(_) => "InvalidDecorationElement",
            FormSchemaError::EmptyFieldCode => "EmptyFieldCode",
            FormSchemaError::SerializationFailed(_) => "SerializationFailed",
        }
    }

    pub(crate) fn structure(message: impl Into<String>) -> Self {
        FormSchemaError::InvalidSchemaStructure(message.into())
    }

    pub(crate) fn layout(message: impl Into<String>) -> Self {
        FormSchemaError::InvalidLayoutStructure(message.into())
    }
}
