//! State Machine Runtime
//!
//! Flat statecharts used for the activity lifecycle and the game session.
//! Supports:
//! - Guards (conditional transitions)
//! - Entry/exit actions
//! - Transition actions
//! - Terminal states that swallow every further event

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Identifier for a state within a state machine
pub type StateId = u32;

/// Identifier for an event type
pub type EventId = u32;

/// A guard function that determines if a transition should occur
pub type Guard = Box<dyn Fn() -> bool + Send>;

/// An action function executed during transitions
pub type Action = Box<dyn FnMut() + Send>;

/// A transition in the state machine
pub struct Transition {
    pub from_state: StateId,
    pub event: EventId,
    pub to_state: StateId,
    pub guard: Option<Guard>,
    pub actions: SmallVec<[Action; 2]>,
}

impl Transition {
    /// Create a simple transition without guard or actions
    pub fn new(from: StateId, event: EventId, to: StateId) -> Self {
        Self {
            from_state: from,
            event,
            to_state: to,
            guard: None,
            actions: SmallVec::new(),
        }
    }

    /// Add a guard condition
    pub fn with_guard<F: Fn() -> bool + Send + 'static>(mut self, guard: F) -> Self {
        self.guard = Some(Box::new(guard));
        self
    }

    /// Add an action to execute during transition
    pub fn with_action<F: FnMut() + Send + 'static>(mut self, action: F) -> Self {
        self.actions.push(Box::new(action));
        self
    }

    fn matches(&self, state: StateId, event: EventId) -> bool {
        self.from_state == state
            && self.event == event
            && self.guard.as_ref().map_or(true, |guard| guard())
    }
}

/// Builder for creating state machines
pub struct StateMachineBuilder {
    name: &'static str,
    initial_state: StateId,
    transitions: Vec<Transition>,
    terminal: FxHashSet<StateId>,
    entry_callbacks: FxHashMap<StateId, Vec<Action>>,
    exit_callbacks: FxHashMap<StateId, Vec<Action>>,
}

impl StateMachineBuilder {
    pub fn new(initial_state: StateId) -> Self {
        Self {
            name: "fsm",
            initial_state,
            transitions: Vec::new(),
            terminal: FxHashSet::default(),
            entry_callbacks: FxHashMap::default(),
            exit_callbacks: FxHashMap::default(),
        }
    }

    /// Name used in trace output
    pub fn name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Add a transition
    pub fn transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add a simple transition (from, event, to)
    pub fn on(mut self, from: StateId, event: EventId, to: StateId) -> Self {
        self.transitions.push(Transition::new(from, event, to));
        self
    }

    /// Mark a state as terminal: once entered, no event leaves it
    pub fn terminal(mut self, state: StateId) -> Self {
        self.terminal.insert(state);
        self
    }

    /// Add an entry action for a state
    pub fn on_enter<F: FnMut() + Send + 'static>(mut self, state: StateId, action: F) -> Self {
        self.entry_callbacks
            .entry(state)
            .or_default()
            .push(Box::new(action));
        self
    }

    /// Add an exit action for a state
    pub fn on_exit<F: FnMut() + Send + 'static>(mut self, state: StateId, action: F) -> Self {
        self.exit_callbacks
            .entry(state)
            .or_default()
            .push(Box::new(action));
        self
    }

    /// Build the state machine
    pub fn build(self) -> StateMachine {
        StateMachine {
            name: self.name,
            current_state: self.initial_state,
            transitions: self.transitions,
            terminal: self.terminal,
            entry_callbacks: self.entry_callbacks,
            exit_callbacks: self.exit_callbacks,
            history: Vec::new(),
        }
    }
}

/// A state machine instance
pub struct StateMachine {
    name: &'static str,
    current_state: StateId,
    transitions: Vec<Transition>,
    terminal: FxHashSet<StateId>,
    entry_callbacks: FxHashMap<StateId, Vec<Action>>,
    exit_callbacks: FxHashMap<StateId, Vec<Action>>,
    /// History of state transitions (for debugging)
    history: Vec<(StateId, EventId, StateId)>,
}

impl StateMachine {
    /// Create a new state machine with an initial state and transitions
    pub fn new(initial_state: StateId, transitions: Vec<Transition>) -> Self {
        Self {
            name: "fsm",
            current_state: initial_state,
            transitions,
            terminal: FxHashSet::default(),
            entry_callbacks: FxHashMap::default(),
            exit_callbacks: FxHashMap::default(),
            history: Vec::new(),
        }
    }

    /// Create a builder for a state machine
    pub fn builder(initial_state: StateId) -> StateMachineBuilder {
        StateMachineBuilder::new(initial_state)
    }

    /// Get the current state
    pub fn current_state(&self) -> StateId {
        self.current_state
    }

    /// Check if we're in a specific state
    pub fn is_in(&self, state: StateId) -> bool {
        self.current_state == state
    }

    /// Whether the machine sits in a terminal state
    pub fn is_terminated(&self) -> bool {
        self.terminal.contains(&self.current_state)
    }

    /// Get transition history
    pub fn history(&self) -> &[(StateId, EventId, StateId)] {
        &self.history
    }

    /// Check if an event can trigger a transition from current state
    pub fn can_send(&self, event: EventId) -> bool {
        if self.is_terminated() {
            return false;
        }
        let current = self.current_state;
        self.transitions.iter().any(|t| t.matches(current, event))
    }

    /// Send an event, returning the state the machine ends up in.
    ///
    /// Events with no matching transition leave the state untouched.
    pub fn send(&mut self, event: EventId) -> StateId {
        let current = self.current_state;
        if self.is_terminated() {
            tracing::trace!(
                fsm = self.name,
                state = current,
                event,
                "event ignored in terminal state"
            );
            return current;
        }

        let Some(idx) = self.transitions.iter().position(|t| t.matches(current, event)) else {
            return current;
        };

        let to_state = self.transitions[idx].to_state;

        if let Some(callbacks) = self.exit_callbacks.get_mut(&current) {
            for callback in callbacks.iter_mut() {
                callback();
            }
        }

        for action in self.transitions[idx].actions.iter_mut() {
            action();
        }

        self.current_state = to_state;
        self.history.push((current, event, to_state));
        tracing::trace!(fsm = self.name, from = current, event, to = to_state, "transition");

        if let Some(callbacks) = self.entry_callbacks.get_mut(&to_state) {
            for callback in callbacks.iter_mut() {
                callback();
            }
        }

        to_state
    }

    /// Register an entry callback for a state
    pub fn on_enter<F: FnMut() + Send + 'static>(&mut self, state: StateId, callback: F) {
        self.entry_callbacks
            .entry(state)
            .or_default()
            .push(Box::new(callback));
    }

    /// Register an exit callback for a state
    pub fn on_exit<F: FnMut() + Send + 'static>(&mut self, state: StateId, callback: F) {
        self.exit_callbacks
            .entry(state)
            .or_default()
            .push(Box::new(callback));
    }
}
