//! The Kohksh game hooked into the engine loop

use crate::engine::{EngineContext, Game};
use crate::error::Result;
use crate::session::GameSession;

/// Seconds between progress log lines
const REPORT_INTERVAL: f32 = 5.0;

/// Headless game: runs a session through boot and loading, then keeps it
/// ticking while the engine loop runs
#[derive(Default)]
pub struct KohkshGame {
    session: Option<GameSession>,
    since_report: f32,
}

impl KohkshGame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }
}

impl Game for KohkshGame {
    fn on_initialize(&mut self, ctx: &mut EngineContext) -> Result<()> {
        let mut session = GameSession::new(ctx.handle().events());
        session.finish_boot();
        session.new_game();
        session.finish_loading();
        tracing::info!(state = ?session.state(), lives = session.lives(), "session ready");
        self.session = Some(session);
        Ok(())
    }

    fn on_update(&mut self, dt: f32, ctx: &mut EngineContext) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.update(dt);

        self.since_report += dt;
        if self.since_report >= REPORT_INTERVAL {
            self.since_report = 0.0;
            tracing::debug!(
                frame = ctx.frame(),
                fps = ctx.handle().fps(),
                play_time = session.play_time(),
                wave = session.wave(),
                score = session.score(),
                "session progress"
            );
        }
    }

    fn on_cleanup(&mut self, _ctx: &mut EngineContext) {
        if let Some(session) = &self.session {
            tracing::info!(
                score = session.score(),
                high_score = session.high_score(),
                play_time = session.play_time(),
                wave = session.wave(),
                "session closed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::GameEngine;
    use crate::session::GameState;
    use crate::settings::EngineSettings;

    #[test]
    fn test_session_is_playing_after_initialize() {
        let settings = EngineSettings {
            target_fps: 1000,
            max_frames: Some(3),
            ..EngineSettings::default()
        };
        let mut engine = GameEngine::new(settings, KohkshGame::new()).unwrap();
        engine.initialize().unwrap();
        assert_eq!(
            engine.game().session().map(|s| s.state()),
            Some(GameState::Playing)
        );

        engine.run().unwrap();
        let session = engine.game().session().unwrap();
        assert!(session.play_time() > 0.0);
    }
}
