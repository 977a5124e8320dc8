//! Scene action broadcasting
//!
//! Fire-and-forget, type-keyed notifications scoped to one [`Seed`]. Two
//! `SceneAction` handles are equal iff they share a seed, and only handles
//! sharing a seed see each other's actions.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use waymark_registry::Seed;

type Listener = Arc<dyn Fn(&dyn Any) + Send + Sync>;
type Channels = RwLock<HashMap<TypeId, Vec<(SceneSubscription, Listener)>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneSubscription(u64);

#[derive(Clone)]
pub struct SceneAction {
    seed: Seed,
    channels: Arc<Channels>,
    next_id: Arc<AtomicU64>,
}

impl SceneAction {
    pub fn new() -> Self {
        Self {
            seed: Seed::new(),
            channels: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn seed(&self) -> &Seed {
        &self.seed
    }

    /// Broadcast `action` to every listener of type `A`.
    pub fn send<A: Any + Send + Sync>(&self, action: A) {
        broadcast(&self.channels, &self.seed, &action);
    }

    pub fn subscribe<A, F>(&self, listener: F) -> SceneSubscription
    where
        A: Any + Send + Sync,
        F: Fn(&A) + Send + Sync + 'static,
    {
        let id = SceneSubscription(self.next_id.fetch_add(1, Ordering::Relaxed));
        let listener: Listener = Arc::new(move |action: &dyn Any| {
            if let Some(action) = action.downcast_ref::<A>() {
                listener(action);
            }
        });

        self.channels
            .write()
            .entry(TypeId::of::<A>())
            .or_default()
            .push((id, listener));
        id
    }

    pub fn unsubscribe(&self, id: SceneSubscription) -> bool {
        let mut channels = self.channels.write();
        let mut removed = false;
        for listeners in channels.values_mut() {
            let before = listeners.len();
            listeners.retain(|(other, _)| *other != id);
            removed |= listeners.len() != before;
        }
        removed
    }

    /// Re-broadcast every `A` as the `B` produced by `mapper`.
    ///
    /// Returns `None` without subscribing when `A` and `B` are the same type,
    /// since the mapped action would land back on the channel it came from.
    pub fn map<A, B, F>(&self, mapper: F) -> Option<SceneSubscription>
    where
        A: Any + Send + Sync,
        B: Any + Send + Sync,
        F: Fn(&A) -> B + Send + Sync + 'static,
    {
        if TypeId::of::<A>() == TypeId::of::<B>() {
            tracing::warn!(
                action = type_name::<A>(),
                "Refusing to map a scene action onto its own type"
            );
            return None;
        }

        let channels = Arc::downgrade(&self.channels);
        let seed = self.seed.clone();
        Some(self.subscribe::<A, _>(move |action| {
            if let Some(channels) = Weak::upgrade(&channels) {
                broadcast(&channels, &seed, &mapper(action));
            }
        }))
    }

    /// Run `closure` with a fresh [`SceneActionTransformer`] for every `A`
    /// and broadcast whatever it records.
    pub fn transform<A, F>(&self, closure: F) -> SceneSubscription
    where
        A: Any + Send + Sync,
        F: Fn(&SceneActionTransformer, &A) + Send + Sync + 'static,
    {
        let channels = Arc::downgrade(&self.channels);
        let seed = self.seed.clone();
        let next_id = Arc::clone(&self.next_id);
        self.subscribe::<A, _>(move |action| {
            let Some(channels) = Weak::upgrade(&channels) else {
                return;
            };
            let transformer = SceneActionTransformer::new();
            closure(&transformer, action);
            transformer.perform(&SceneAction {
                seed: seed.clone(),
                channels,
                next_id: Arc::clone(&next_id),
            });
        })
    }
}

fn broadcast<A: Any>(channels: &Channels, seed: &Seed, action: &A) {
    // Listeners may subscribe or send while being notified
    let listeners: Vec<Listener> = match channels.read().get(&TypeId::of::<A>()) {
        Some(listeners) => listeners.iter().map(|(_, l)| Arc::clone(l)).collect(),
        None => Vec::new(),
    };

    if listeners.is_empty() {
        tracing::debug!(scene = %seed, action = type_name::<A>(), "Scene action without listeners");
        return;
    }

    for listener in listeners {
        listener(action as &dyn Any);
    }
}

impl Default for SceneAction {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for SceneAction {
    fn eq(&self, other: &Self) -> bool {
        self.seed == other.seed
    }
}

impl Eq for SceneAction {}

impl Hash for SceneAction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.seed.hash(state);
    }
}

impl fmt::Debug for SceneAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneAction")
            .field("seed", &self.seed)
            .field("channels", &self.channels.read().len())
            .finish()
    }
}

/// One-shot builder for a scene action replacement.
#[derive(Default)]
pub struct SceneActionTransformer {
    pending: Mutex<Option<Box<dyn FnOnce(&SceneAction) + Send>>>,
}

impl SceneActionTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `action` as the replacement; the last call wins.
    pub fn send<A: Any + Send + Sync>(&self, action: A) {
        *self.pending.lock() = Some(Box::new(move |scene: &SceneAction| scene.send(action)));
    }

    /// Broadcast the recorded action on `scene`. Returns `false` if nothing
    /// was recorded.
    pub fn perform(self, scene: &SceneAction) -> bool {
        match self.pending.into_inner() {
            Some(execute) => {
                execute(scene);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for SceneActionTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneActionTransformer")
            .field("pending", &self.pending.lock().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Sheet {
        Open(String),
    }

    fn collect<A: Any + Send + Sync + Clone>(scene: &SceneAction) -> Arc<Mutex<Vec<A>>> {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        scene.subscribe::<A, _>(move |action| sink.lock().push(action.clone()));
        received
    }

    #[test]
    fn test_send_reaches_typed_listeners() {
        let scene = SceneAction::new();
        let sheets = collect::<Sheet>(&scene);
        let numbers = collect::<u32>(&scene);

        scene.send(Sheet::Open("settings".to_string()));
        scene.send(3_u32);

        assert_eq!(*sheets.lock(), vec![Sheet::Open("settings".to_string())]);
        assert_eq!(*numbers.lock(), vec![3]);
    }

    #[test]
    fn test_scenes_are_isolated_by_seed() {
        let scene = SceneAction::new();
        let other = SceneAction::new();
        let received = collect::<u32>(&scene);

        other.send(1_u32);
        scene.clone().send(2_u32);

        assert_eq!(*received.lock(), vec![2]);
        assert_eq!(scene, scene.clone());
        assert_ne!(scene, other);
    }

    #[test]
    fn test_unsubscribe() {
        let scene = SceneAction::new();
        let received = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&received);
        let id = scene.subscribe::<u32, _>(move |_| *sink.lock() += 1);

        scene.send(1_u32);
        assert!(scene.unsubscribe(id));
        scene.send(1_u32);

        assert_eq!(*received.lock(), 1);
        assert!(!scene.unsubscribe(id));
    }

    #[test]
    fn test_map() {
        let scene = SceneAction::new();
        let sheets = collect::<Sheet>(&scene);
        assert!(scene
            .map::<u32, Sheet, _>(|id| Sheet::Open(format!("user-{}", id)))
            .is_some());

        scene.send(9_u32);

        assert_eq!(*sheets.lock(), vec![Sheet::Open("user-9".to_string())]);
    }

    #[test]
    fn test_map_onto_same_type_is_refused() {
        let scene = SceneAction::new();
        let received = collect::<u32>(&scene);

        assert!(scene.map::<u32, u32, _>(|value| value + 1).is_none());
        scene.send(1_u32);

        assert_eq!(*received.lock(), vec![1]);
    }

    #[test]
    fn test_transform_can_drop_actions() {
        let scene = SceneAction::new();
        let sheets = collect::<Sheet>(&scene);
        scene.transform::<i32, _>(|transformer, value| {
            if *value > 0 {
                transformer.send(Sheet::Open(value.to_string()));
            }
        });

        scene.send(-1_i32);
        scene.send(4_i32);

        assert_eq!(*sheets.lock(), vec![Sheet::Open("4".to_string())]);
    }

    #[test]
    fn test_transformer_without_action() {
        let scene = SceneAction::new();
        assert!(!SceneActionTransformer::new().perform(&scene));

        let transformer = SceneActionTransformer::new();
        transformer.send(1_u8);
        transformer.send(2_u8);
        let received = collect::<u8>(&scene);
        assert!(transformer.perform(&scene));
        assert_eq!(*received.lock(), vec![2]);
    }
}
