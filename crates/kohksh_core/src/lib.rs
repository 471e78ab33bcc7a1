//! Kohksh Core Runtime
//!
//! Foundational primitives shared by the Kohksh shell and engine:
//!
//! - **State Machines**: flat statecharts for the activity lifecycle and game session
//! - **Event Dispatch**: listener registry for engine-wide game events
//!
//! # Example
//!
//! ```rust
//! use kohksh_core::fsm::{StateMachine, Transition};
//!
//! const CREATED: u32 = 0;
//! const RUNNING: u32 = 1;
//! const START: u32 = 1;
//!
//! let mut fsm = StateMachine::new(CREATED, vec![Transition::new(CREATED, START, RUNNING)]);
//! fsm.send(START);
//! assert!(fsm.is_in(RUNNING));
//! ```

pub mod events;
pub mod fsm;

pub use events::{deliver, EventDispatcher, GameEvent, Listener, ListenerId};
pub use fsm::{EventId, StateId, StateMachine, StateMachineBuilder, Transition};
