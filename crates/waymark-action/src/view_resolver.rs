//! Type → renderer lookup
//!
//! Keyed by the item's type name so that both live entries and entries
//! ingested from a snapshot find their renderer.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use waymark_registry::{Registry, Seed};
use waymark_state::{CodableNavigationItem, NavigationItem, NavigationPath, PathEntry};

use crate::error::ActionError;
use crate::Result;

type Renderer<O> = Arc<dyn Fn(&PathEntry) -> Option<O> + Send + Sync>;

pub struct ViewResolver<O> {
    registry: Registry<String, Renderer<O>>,
}

impl<O: 'static> ViewResolver<O> {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
        }
    }

    /// Render live items of type `I` with `render`.
    pub fn register<I, F>(&mut self, seed: &Seed, render: F) -> bool
    where
        I: NavigationItem,
        F: Fn(&I) -> O + Send + Sync + 'static,
    {
        let renderer: Renderer<O> = Arc::new(move |entry: &PathEntry| {
            entry
                .envelope()
                .and_then(|envelope| envelope.downcast_ref::<I>())
                .map(&render)
        });
        self.registry
            .register(renderer, type_name::<I>().to_string(), seed)
    }

    /// Like [`register`](Self::register), but also decodes snapshot entries.
    pub fn register_codable<I, F>(&mut self, seed: &Seed, render: F) -> bool
    where
        I: CodableNavigationItem,
        F: Fn(&I) -> O + Send + Sync + 'static,
    {
        let renderer: Renderer<O> = Arc::new(move |entry: &PathEntry| match entry {
            PathEntry::Live { envelope, .. } => envelope.downcast_ref::<I>().map(&render),
            PathEntry::Encoded(codable) => match codable.decode::<I>() {
                Ok(item) => Some(render(&item)),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to decode entry for rendering");
                    None
                }
            },
        });
        self.registry
            .register(renderer, type_name::<I>().to_string(), seed)
    }

    pub fn resolve<I: NavigationItem>(&self, item: &I) -> Result<O> {
        self.resolve_entry(&PathEntry::live(item.clone()))
    }

    pub fn resolve_entry(&self, entry: &PathEntry) -> Result<O> {
        let renderer = self.registry.resolve(&entry.type_name().to_string())?;
        renderer(entry).ok_or_else(|| ActionError::Unrenderable(entry.type_name().to_string()))
    }

    /// Render every entry of `path`, bottom to top.
    pub fn render_path(&self, path: &NavigationPath) -> Result<Vec<O>> {
        path.iter().map(|entry| self.resolve_entry(entry)).collect()
    }
}

impl<O: 'static> Default for ViewResolver<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> Clone for ViewResolver<O> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<O> fmt::Debug for ViewResolver<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewResolver")
            .field("registry", &self.registry)
            .finish()
    }
}
