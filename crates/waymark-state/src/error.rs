//! Navigation state error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Cannot remove {requested} items from a stack of {available}")]
    Underflow { requested: usize, available: usize },

    #[error("Failed to encode item of type {type_name}: {source}")]
    Encode {
        type_name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to decode item of type {type_name}: {source}")]
    Decode {
        type_name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
}
