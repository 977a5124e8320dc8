//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Registry error: {0}")]
    Registry(#[from] waymark_registry::RegistryError),

    #[error("State error: {0}")]
    State(#[from] waymark_state::StateError),

    #[error("Action error: {0}")]
    Action(#[from] waymark_action::ActionError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
