//! Waymark Core
//!
//! Coordination layer for a navigation surface: one [`NavigationStack`] per
//! stack instance, configured by [`Config`], logging through `tracing`.

mod config;
mod error;
mod stack;

pub use config::Config;
pub use error::CoreError;
pub use stack::NavigationStack;

// Re-export core components
pub use waymark_action::{
    ActionError, NavigationAction, NavigationDestinationTransformer, NavigationOperation,
    NavigationPerform, PerformKind, SceneAction, SceneActionTransformer, SceneSubscription,
    ViewResolver,
};
pub use waymark_registry::{Registry, RegistryError, RegistryLayer, Seed, SharedRegistry, WeakSeed};
pub use waymark_state::{
    item_hash, ChangeKind, CodableItem, CodableNavigationItem, CodableRepresentation, ItemEnvelope,
    ItemHash, ItemKey, NavigationItem, NavigationPath, NavigationState, PathEntry,
    PendingNavigationItems, StateChange, StateError, StateOptions, SubscriptionId, Transaction,
    UnderflowPolicy,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
///
/// `RUST_LOG` takes precedence over `config.log_filter`. Calling this more
/// than once keeps the first subscriber.
pub fn init_logging(config: &Config) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_filter)
            .map_err(|e| CoreError::Config(format!("invalid log filter: {}", e)))?,
    };

    if fmt().with_env_filter(filter).with_target(true).try_init().is_err() {
        tracing::debug!("Logging already initialized");
    }

    Ok(())
}
