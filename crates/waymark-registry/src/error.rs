//! Registry error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Nothing was registered for the key. Registration must precede
    /// resolution, so this is a wiring mistake rather than a runtime state.
    #[error("Unresolved registry key: {0}")]
    UnresolvedKey(String),
}
