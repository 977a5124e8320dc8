//! Navigation stack coordination
//!
//! A [`NavigationStack`] owns the engine for one stack instance and hands out
//! the [`NavigationAction`] and [`SceneAction`] its views dispatch through.

use std::sync::Arc;

use parking_lot::RwLock;
use waymark_action::{NavigationAction, SceneAction};
use waymark_state::{
    CodableRepresentation, NavigationState, PendingNavigationItems, StateChange, SubscriptionId,
};

use crate::{Config, Result};

pub struct NavigationStack {
    state: Arc<RwLock<NavigationState>>,
    action: NavigationAction,
    scene: SceneAction,
}

impl NavigationStack {
    pub fn new(config: &Config) -> Self {
        Self::with_pending(config, None)
    }

    /// Create a stack seeded from an optional pending snapshot.
    pub fn with_pending(config: &Config, pending: Option<PendingNavigationItems>) -> Self {
        let state = NavigationState::with_pending(config.state_options(), pending.as_ref());
        let state = Arc::new(RwLock::new(state));
        let action = NavigationAction::new(state.clone());

        tracing::info!(
            count = action.count(),
            policy = ?config.underflow_policy,
            "Navigation stack created"
        );

        Self {
            state,
            action,
            scene: SceneAction::new(),
        }
    }

    /// Create a stack from a JSON snapshot. An undecodable snapshot yields an
    /// empty stack.
    pub fn from_snapshot_json(config: &Config, json: &str) -> Self {
        Self::with_pending(config, Self::decode_pending(json))
    }

    /// Default action for this stack, with no interceptors installed.
    pub fn action(&self) -> NavigationAction {
        self.action.clone()
    }

    pub fn scene_action(&self) -> &SceneAction {
        &self.scene
    }

    pub fn state(&self) -> &Arc<RwLock<NavigationState>> {
        &self.state
    }

    pub fn count(&self) -> usize {
        self.state.read().count()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().is_empty()
    }

    /// Observers run under the state lock and must not dispatch on the action.
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        self.state.write().subscribe(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.state.write().unsubscribe(id)
    }

    pub fn apply_pending(&self, pending: Option<&PendingNavigationItems>) -> bool {
        self.state.write().apply_pending(pending)
    }

    pub fn snapshot(&self) -> Option<CodableRepresentation> {
        self.state.read().codable()
    }

    /// Serialize the stack, or `Ok(None)` if any entry is not codable.
    pub fn snapshot_json(&self) -> Result<Option<String>> {
        match self.snapshot() {
            Some(representation) => Ok(Some(serde_json::to_string(&representation)?)),
            None => {
                tracing::debug!("Stack holds non-codable entries, no snapshot");
                Ok(None)
            }
        }
    }

    /// Apply a JSON snapshot as the pending state. Returns `true` when the
    /// stack was replaced.
    pub fn restore_from_json(&self, json: &str) -> bool {
        let pending = Self::decode_pending(json);
        self.apply_pending(pending.as_ref())
    }

    /// Decode a JSON snapshot, logging and discarding it on failure.
    pub fn decode_pending(json: &str) -> Option<PendingNavigationItems> {
        match serde_json::from_str::<CodableRepresentation>(json) {
            Ok(representation) => Some(representation.into()),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding undecodable navigation snapshot");
                None
            }
        }
    }
}

impl Default for NavigationStack {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl std::fmt::Debug for NavigationStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationStack")
            .field("count", &self.count())
            .field("scene", self.scene.seed())
            .finish()
    }
}
