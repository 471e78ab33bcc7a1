//! Game event dispatch
//!
//! Engine-wide notifications (start, pause, coin collected, ...) delivered to
//! registered listeners in registration order.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle returned by [`EventDispatcher::add_listener`], used for removal
    pub struct ListenerId;
}

/// Events raised by the engine and the game session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameEvent {
    GameStart,
    GamePause,
    GameResume,
    GameOver,
    LevelComplete,
    PlayerHit,
    CoinCollected,
    BombUsed,
    AchievementUnlocked,
}

/// Listener callback type.
///
/// Shared so callers can snapshot the listeners for an event and run them
/// after releasing whatever lock guards the dispatcher.
pub type Listener = Arc<dyn Fn(GameEvent) + Send + Sync>;

/// Dispatches game events to registered listeners
pub struct EventDispatcher {
    listeners: SlotMap<ListenerId, (GameEvent, Listener)>,
    order: FxHashMap<GameEvent, Vec<ListenerId>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            listeners: SlotMap::with_key(),
            order: FxHashMap::default(),
        }
    }

    /// Register a listener for one event kind
    pub fn add_listener<F>(&mut self, event: GameEvent, listener: F) -> ListenerId
    where
        F: Fn(GameEvent) + Send + Sync + 'static,
    {
        let id = self.listeners.insert((event, Arc::new(listener)));
        self.order.entry(event).or_default().push(id);
        id
    }

    /// Remove a listener. Returns false if the id was already gone.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let Some((event, _)) = self.listeners.remove(id) else {
            return false;
        };
        if let Some(ids) = self.order.get_mut(&event) {
            ids.retain(|other| *other != id);
        }
        true
    }

    /// Clone the listeners registered for `event`, in registration order
    pub fn listeners_for(&self, event: GameEvent) -> Vec<Listener> {
        self.order
            .get(&event)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.listeners.get(*id))
                    .map(|(_, listener)| Arc::clone(listener))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Deliver an event, returning how many listeners ran
    pub fn trigger(&self, event: GameEvent) -> usize {
        deliver(event, self.listeners_for(event))
    }

    /// Number of registered listeners across all events
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

/// Run a snapshot taken with [`EventDispatcher::listeners_for`]
pub fn deliver(event: GameEvent, listeners: Vec<Listener>) -> usize {
    if listeners.is_empty() {
        tracing::trace!(?event, "no listeners");
        return 0;
    }
    for listener in &listeners {
        listener(event);
    }
    tracing::debug!(?event, delivered = listeners.len(), "game event dispatched");
    listeners.len()
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
