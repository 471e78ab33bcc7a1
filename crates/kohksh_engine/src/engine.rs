//! Engine core loop
//!
//! [`GameEngine`] owns a [`Game`] and drives it frame by frame:
//! clamp the delta, advance game time, update, render, sample FPS, and
//! sleep off the remaining frame budget. [`EngineHandle`] controls the loop
//! from other threads.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use kohksh_core::events::{EventDispatcher, GameEvent, ListenerId};

use crate::error::{EngineError, Result};
use crate::frame::FrameClock;
use crate::session::{emit, SharedDispatcher};
use crate::settings::EngineSettings;
use crate::time::TimeManager;

/// Game hooks called by the engine loop
pub trait Game: Send {
    fn on_initialize(&mut self, _ctx: &mut EngineContext) -> Result<()> {
        Ok(())
    }

    /// Called once per unpaused frame with the scaled delta
    fn on_update(&mut self, dt: f32, ctx: &mut EngineContext);

    fn on_render(&mut self, _ctx: &EngineContext) {}

    fn on_cleanup(&mut self, _ctx: &mut EngineContext) {}
}

struct EngineShared {
    running: AtomicBool,
    stop_requested: AtomicBool,
    paused: AtomicBool,
    fps_bits: AtomicU32,
    events: SharedDispatcher,
}

/// Thread-safe control surface of a [`GameEngine`]
#[derive(Clone)]
pub struct EngineHandle {
    shared: Arc<EngineShared>,
}

impl EngineHandle {
    pub fn pause(&self) {
        if !self.shared.paused.swap(true, Ordering::SeqCst) {
            tracing::info!("engine paused");
            emit(&self.shared.events, GameEvent::GamePause);
        }
    }

    pub fn resume(&self) {
        if self.shared.paused.swap(false, Ordering::SeqCst) {
            tracing::info!("engine resumed");
            emit(&self.shared.events, GameEvent::GameResume);
        }
    }

    /// Stop the loop. Also honored if issued before `run` starts.
    pub fn stop(&self) {
        self.shared.stop_requested.store(true, Ordering::SeqCst);
        if self.shared.running.swap(false, Ordering::SeqCst) {
            tracing::info!("engine stop requested");
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::SeqCst)
    }

    /// FPS from the most recent one-second sample
    pub fn fps(&self) -> f32 {
        f32::from_bits(self.shared.fps_bits.load(Ordering::Relaxed))
    }

    pub fn add_listener<F>(&self, event: GameEvent, listener: F) -> ListenerId
    where
        F: Fn(GameEvent) + Send + Sync + 'static,
    {
        self.shared
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .add_listener(event, listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.shared
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove_listener(id)
    }

    pub fn events(&self) -> SharedDispatcher {
        Arc::clone(&self.shared.events)
    }
}

/// State the loop exposes to game hooks
pub struct EngineContext {
    pub settings: EngineSettings,
    pub time: TimeManager,
    frame: u64,
    handle: EngineHandle,
}

impl EngineContext {
    /// Frames completed so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn handle(&self) -> &EngineHandle {
        &self.handle
    }

    pub fn trigger(&self, event: GameEvent) {
        emit(&self.handle.shared.events, event);
    }
}

/// The frame loop around a [`Game`]
pub struct GameEngine<G: Game> {
    game: G,
    ctx: EngineContext,
    clock: FrameClock,
    initialized: bool,
}

impl<G: Game> GameEngine<G> {
    pub fn new(settings: EngineSettings, game: G) -> Result<Self> {
        settings.validate()?;
        let handle = EngineHandle {
            shared: Arc::new(EngineShared {
                running: AtomicBool::new(false),
                stop_requested: AtomicBool::new(false),
                paused: AtomicBool::new(false),
                fps_bits: AtomicU32::new(0.0f32.to_bits()),
                events: Arc::new(Mutex::new(EventDispatcher::new())),
            }),
        };
        let clock = FrameClock::new(settings.target_fps, settings.max_delta);
        let time = TimeManager::with_time_scale(settings.physics.time_scale);

        Ok(Self {
            game,
            ctx: EngineContext {
                settings,
                time,
                frame: 0,
                handle,
            },
            clock,
            initialized: false,
        })
    }

    pub fn handle(&self) -> EngineHandle {
        self.ctx.handle.clone()
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Err(EngineError::AlreadyInitialized);
        }
        self.game.on_initialize(&mut self.ctx)?;
        self.initialized = true;

        let shared = &self.ctx.handle.shared;
        if !shared.stop_requested.load(Ordering::SeqCst) {
            shared.running.store(true, Ordering::SeqCst);
        }
        tracing::info!(
            title = %self.ctx.settings.title,
            target_fps = self.ctx.settings.target_fps,
            "engine initialized"
        );
        Ok(())
    }

    /// Run until stopped (or `max_frames` elapse). Returns frames executed.
    pub fn run(&mut self) -> Result<u64> {
        self.run_limited(self.ctx.settings.max_frames)
    }

    /// Like [`run`](Self::run) but executes at most `frames` frames
    pub fn run_frames(&mut self, frames: u64) -> Result<u64> {
        let limit = self
            .ctx
            .settings
            .max_frames
            .map_or(frames, |max| max.min(frames));
        self.run_limited(Some(limit))
    }

    fn run_limited(&mut self, limit: Option<u64>) -> Result<u64> {
        if !self.initialized {
            return Err(EngineError::NotInitialized);
        }

        let handle = self.handle();
        self.ctx.trigger(GameEvent::GameStart);
        tracing::info!(?limit, "engine loop starting");

        self.clock.reset();
        let mut frames = 0u64;
        while handle.is_running() && limit.map_or(true, |max| frames < max) {
            let dt = self.clock.tick();
            if !handle.is_paused() {
                self.ctx.time.update(dt);
                let scaled = self.ctx.time.scaled_delta();
                self.game.on_update(scaled, &mut self.ctx);
                self.game.on_render(&self.ctx);
            }

            frames += 1;
            self.ctx.frame = frames;
            if let Some(fps) = self.clock.finish_frame() {
                handle.shared.fps_bits.store(fps.to_bits(), Ordering::Relaxed);
                tracing::debug!(fps, frames, "frame stats");
            }
        }

        handle.shared.running.store(false, Ordering::SeqCst);
        self.game.on_cleanup(&mut self.ctx);
        self.initialized = false;
        tracing::info!(frames, game_time = self.ctx.time.game_time(), "engine loop exited");
        Ok(frames)
    }
}
