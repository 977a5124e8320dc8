//! Waymark Navigation Actions
//!
//! Public entry point for stack mutations. Every mutation first checks the
//! interception pipeline for a handler registered on the item's type:
//! 1. No handler → applied to the engine as is
//! 2. Handler returns a replacement → replacement applied directly
//! 3. Handler returns nothing → vetoed
//!
//! Also hosts the type-keyed collaborators built on the registry:
//! [`ViewResolver`] and the scene broadcaster [`SceneAction`].

mod action;
mod error;
mod perform;
mod scene;
mod transformer;
mod view_resolver;

pub use action::NavigationAction;
pub use error::ActionError;
pub use perform::{NavigationOperation, NavigationPerform, PerformKind};
pub use scene::{SceneAction, SceneActionTransformer, SceneSubscription};
pub use transformer::NavigationDestinationTransformer;
pub use view_resolver::ViewResolver;

pub type Result<T> = std::result::Result<T, ActionError>;
