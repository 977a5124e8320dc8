//! Action error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ActionError {
    #[error("State error: {0}")]
    State(#[from] waymark_state::StateError),

    #[error("Registry error: {0}")]
    Registry(#[from] waymark_registry::RegistryError),

    #[error("Cannot render entry of type {0}")]
    Unrenderable(String),
}
