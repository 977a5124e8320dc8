//! Waymark Navigation State
//!
//! The stack engine behind a navigation surface:
//! - Ordered Path of type-erased items
//! - Hash Index kept parallel to the path
//! - Restore Table used to rebuild the path after removing a non-top item
//!
//! Items cross the engine boundary through [`ItemEnvelope`], which keeps the
//! concrete type recoverable while the engine itself stays untyped.

mod error;
mod item;
mod path;
mod snapshot;
mod state;

pub use error::StateError;
pub use item::{item_hash, CodableNavigationItem, ItemEnvelope, ItemHash, ItemKey, NavigationItem};
pub use path::{CodableItem, NavigationPath, PathEntry};
pub use snapshot::{CodableRepresentation, PendingNavigationItems};
pub use state::{
    ChangeKind, NavigationState, StateChange, StateOptions, SubscriptionId, Transaction,
    UnderflowPolicy,
};

pub type Result<T> = std::result::Result<T, StateError>;
