use thiserror::Error;

/// Error types for the veilmark-serializer crate.
///
/// Every failure raised while walking an object graph carries the path of
/// the offending member (e.g. `Baz.Quxes[0].Grault`). Failures are never
/// retried; they abort the enclosing top-level serialize/deserialize call.
#[derive(Error, Debug)]
pub enum MarkupError {
    #[error("malformed entity reference at '{path}': {detail}")]
    EscapeFormat { path: String, detail: String },

    #[error("encryption mechanism failed at '{path}': {source}")]
    Encryption {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("cannot coerce text into {target} at '{path}': {detail}")]
    TypeCoercion {
        path: String,
        target: &'static str,
        detail: String,
    },

    #[error("malformed document: {0}")]
    Document(String),
}

/// Result type for veilmark-serializer operations
pub type Result<T> = std::result::Result<T, MarkupError>;
