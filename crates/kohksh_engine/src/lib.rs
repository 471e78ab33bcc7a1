//! Kohksh Engine
//!
//! The native side of the Kohksh shell. [`KohkshRuntime`] implements
//! [`kohksh_platform::NativeBridge`]: `getVersion` reports the build,
//! `nativeInit` builds and initializes a [`GameEngine`], and `startKohksh`
//! runs its frame loop.
//!
//! # Example
//!
//! ```ignore
//! use kohksh_engine::{EngineSettings, KohkshRuntime};
//! use kohksh_platform::{EngineMode, NativeBridge};
//!
//! let runtime = KohkshRuntime::new(EngineSettings::default(), EngineMode::Blocking);
//! runtime.native_init()?;
//! runtime.start()?; // returns once the loop is stopped
//! ```

pub mod engine;
pub mod error;
pub mod frame;
pub mod game;
pub mod runtime;
pub mod session;
pub mod settings;
pub mod time;

pub use engine::{EngineContext, EngineHandle, Game, GameEngine};
pub use error::{EngineError, Result};
pub use frame::{FrameClock, FrameStats};
pub use game::KohkshGame;
pub use runtime::{version_string, KohkshRuntime};
pub use session::{GameSession, GameState, SessionStats, SharedDispatcher};
pub use settings::{AudioSettings, EngineSettings, GraphicsSettings, PhysicsSettings};
pub use time::TimeManager;
