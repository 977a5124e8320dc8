//! Waymark Registry
//!
//! A type-keyed store used to inject views, modifiers and handlers into a
//! navigation surface. Entries remember which [`Seed`] installed them so a
//! re-evaluated composing layer cannot thrash the resolved value:
//! - same owner re-registering → accepted
//! - expired owner → accepted (first writer is gone)
//! - different live owner → dropped, first value wins

mod error;
mod registry;
mod seed;

pub use error::RegistryError;
pub use registry::{Registry, RegistryLayer, SharedRegistry};
pub use seed::{Seed, WeakSeed};

pub type Result<T> = std::result::Result<T, RegistryError>;
