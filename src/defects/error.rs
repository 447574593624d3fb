use thiserror::Error;

#[derive(Error, Debug)]
pub enum DefectError {
    #[error("Missing required fields. Please fill out all required fields.")]
    MissingFields,

    #[error("No valid image data provided: {0}")]
    InvalidImage(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Defect not found: {0}")]
    DefectNotFound(String),

    #[error("Image not found: {0}")]
    ImageNotFound(String),

    #[error("Defect already exists: {0}")]
    DuplicateId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl DefectError {
    /// HTTP status code this error maps to at the request boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            DefectError::MissingFields
            | DefectError::InvalidImage(_)
            | DefectError::InvalidField { .. }
            | DefectError::InvalidRequest(_) => 400,
            DefectError::DefectNotFound(_) | DefectError::ImageNotFound(_) => 404,
            DefectError::DuplicateId(_) => 409,
            DefectError::Io(_)
            | DefectError::Serialization(_)
            | DefectError::Store(_)
            | DefectError::Config(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, DefectError>;
