//! Error types for block model resolution and baking.

use thiserror::Error;

/// Result type alias using BakerError.
pub type Result<T> = std::result::Result<T, BakerError>;

/// Main error type for catalog loading, model resolution and baking.
#[derive(Error, Debug)]
pub enum BakerError {
    /// I/O error while reading catalog tables.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse JSON data.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to read a ZIP archive.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// One of the three catalog tables is absent.
    #[error("Catalog table missing: {0}")]
    MissingTable(String),

    /// A catalog table exists but is not well-formed.
    #[error("Catalog table {table} is malformed: {source}")]
    InvalidTable {
        table: String,
        #[source]
        source: serde_json::Error,
    },

    /// No model definition matched the requested name.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// A parent chain revisits a model it already walked through.
    #[error("Cyclic model inheritance: {}", chain.join(" -> "))]
    CyclicModel { chain: Vec<String> },

    /// A texture slot could not be dereferenced to a literal path.
    #[error("Unresolved texture reference: {0}")]
    UnresolvedTexture(String),

    /// A model element has coordinates outside the allowed range.
    #[error("Malformed element: {0}")]
    MalformedElement(String),

    /// The atlas provider could not produce a mapping.
    #[error("Atlas building error: {0}")]
    AtlasBuild(String),
}

impl BakerError {
    /// Whether this error must abort the whole conversion run.
    ///
    /// Cyclic inheritance and catalog load failures mean the definition tables
    /// themselves are broken. Everything else only affects one block group,
    /// element or face and is degraded locally.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BakerError::CyclicModel { .. }
                | BakerError::MissingTable(_)
                | BakerError::InvalidTable { .. }
                | BakerError::Io(_)
                | BakerError::Zip(_)
                | BakerError::AtlasBuild(_)
        )
    }
}
