//! Game session: state flow, score, combo multiplier, lives, waves and
//! achievements

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use kohksh_core::events::{deliver, EventDispatcher, GameEvent};
use kohksh_core::fsm::{EventId, StateId, StateMachine, Transition};

/// Dispatcher shared between the engine, the session and listeners
pub type SharedDispatcher = Arc<Mutex<EventDispatcher>>;

pub const STARTING_LIVES: u32 = 3;
pub const STARTING_CONTINUES: u32 = 3;
pub const STARTING_BOMBS: u32 = 3;
/// Seconds a combo survives without a new hit
pub const COMBO_WINDOW: f32 = 3.0;
pub const MAX_MULTIPLIER: u32 = 10;
/// Score per coin value point
pub const COIN_SCORE: u64 = 10;
/// Seconds each wave lasts
pub const WAVE_DURATION: f32 = 30.0;
pub const MAX_WAVES: u32 = 10;

/// High-level flow of a play session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Boot,
    MainMenu,
    Loading,
    Playing,
    Paused,
    LevelComplete,
    GameOver,
}

impl GameState {
    const ALL: [GameState; 7] = [
        GameState::Boot,
        GameState::MainMenu,
        GameState::Loading,
        GameState::Playing,
        GameState::Paused,
        GameState::LevelComplete,
        GameState::GameOver,
    ];

    fn id(self) -> StateId {
        self as StateId
    }

    fn from_id(id: StateId) -> Self {
        Self::ALL
            .get(id as usize)
            .copied()
            .unwrap_or(GameState::Boot)
    }
}

const BOOTED: EventId = 1;
const NEW_GAME: EventId = 2;
const LOADED: EventId = 3;
const PAUSE: EventId = 4;
const RESUME: EventId = 5;
const COMPLETE_LEVEL: EventId = 6;
const NEXT_LEVEL: EventId = 7;
const DIE: EventId = 8;
const BACK_TO_MENU: EventId = 9;
const CONTINUE: EventId = 10;

/// Deliver an event without holding the dispatcher lock, so listeners may
/// call back into the engine
pub(crate) fn emit(events: &SharedDispatcher, event: GameEvent) -> usize {
    let listeners = events
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .listeners_for(event);
    deliver(event, listeners)
}

/// Totals kept across runs of one session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub games_played: u32,
    pub games_completed: u32,
    pub deaths: u32,
    pub coins_collected: u32,
    pub max_combo: u32,
}

/// An unlockable goal checked against [`SessionStats`]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    unlocked_when: fn(&SessionStats) -> bool,
}

pub static ACHIEVEMENTS: [Achievement; 3] = [
    Achievement {
        id: "coin_collector",
        name: "Coin Collector",
        unlocked_when: |stats| stats.coins_collected >= 100,
    },
    Achievement {
        id: "survivor",
        name: "Survivor",
        unlocked_when: |stats| stats.games_completed >= 10,
    },
    Achievement {
        id: "combo_master",
        name: "Combo Master",
        unlocked_when: |stats| stats.max_combo >= 50,
    },
];

/// Counters the state machine's guards and callbacks read and update
#[derive(Default)]
struct Counters {
    lives: AtomicU32,
    continues: AtomicU32,
    games_played: AtomicU32,
    games_completed: AtomicU32,
    deaths: AtomicU32,
}

/// Score and progress of the current run
pub struct GameSession {
    fsm: StateMachine,
    events: SharedDispatcher,
    counters: Arc<Counters>,
    score: u64,
    high_score: u64,
    coins: u32,
    coins_collected: u32,
    max_combo: u32,
    bombs: u32,
    level: u32,
    wave: u32,
    wave_timer: f32,
    unlocked: Vec<&'static str>,
    combo: u32,
    multiplier: u32,
    combo_time: f32,
    play_time: f32,
}

impl GameSession {
    pub fn new(events: SharedDispatcher) -> Self {
        use GameState::*;

        let counters = Arc::new(Counters::default());
        counters.lives.store(STARTING_LIVES, Ordering::Relaxed);
        counters.continues.store(STARTING_CONTINUES, Ordering::Relaxed);

        let over_events = Arc::clone(&events);
        let level_events = Arc::clone(&events);
        let out_of_lives = Arc::clone(&counters);
        let has_continue = Arc::clone(&counters);
        let spend_continue = Arc::clone(&counters);
        let played = Arc::clone(&counters);
        let died = Arc::clone(&counters);
        let completed = Arc::clone(&counters);

        let fsm = StateMachine::builder(Boot.id())
            .name("session")
            .on(Boot.id(), BOOTED, MainMenu.id())
            .transition(
                Transition::new(MainMenu.id(), NEW_GAME, Loading.id()).with_action(move || {
                    played.games_played.fetch_add(1, Ordering::Relaxed);
                }),
            )
            .on(Loading.id(), LOADED, Playing.id())
            .on(Playing.id(), PAUSE, Paused.id())
            .on(Paused.id(), RESUME, Playing.id())
            .on(Playing.id(), COMPLETE_LEVEL, LevelComplete.id())
            .on(LevelComplete.id(), NEXT_LEVEL, Loading.id())
            .transition(
                Transition::new(Playing.id(), DIE, GameOver.id())
                    .with_guard(move || out_of_lives.lives.load(Ordering::Relaxed) == 0),
            )
            .transition(
                Transition::new(GameOver.id(), CONTINUE, Playing.id())
                    .with_guard(move || has_continue.continues.load(Ordering::Relaxed) > 0)
                    .with_action(move || {
                        spend_continue.continues.fetch_sub(1, Ordering::Relaxed);
                        spend_continue.lives.store(STARTING_LIVES, Ordering::Relaxed);
                    }),
            )
            .on(Paused.id(), BACK_TO_MENU, MainMenu.id())
            .on(GameOver.id(), BACK_TO_MENU, MainMenu.id())
            .on_enter(GameOver.id(), move || {
                died.deaths.fetch_add(1, Ordering::Relaxed);
                emit(&over_events, GameEvent::GameOver);
            })
            .on_enter(LevelComplete.id(), move || {
                completed.games_completed.fetch_add(1, Ordering::Relaxed);
                emit(&level_events, GameEvent::LevelComplete);
            })
            .build();

        Self {
            fsm,
            events,
            counters,
            score: 0,
            high_score: 0,
            coins: 0,
            coins_collected: 0,
            max_combo: 0,
            bombs: STARTING_BOMBS,
            level: 1,
            wave: 1,
            wave_timer: WAVE_DURATION,
            unlocked: Vec::new(),
            combo: 0,
            multiplier: 1,
            combo_time: 0.0,
            play_time: 0.0,
        }
    }

    pub fn state(&self) -> GameState {
        GameState::from_id(self.fsm.current_state())
    }

    fn send(&mut self, event: EventId) -> bool {
        let before = self.fsm.current_state();
        let after = self.fsm.send(event);
        if before != after {
            tracing::debug!(
                from = ?GameState::from_id(before),
                to = ?self.state(),
                "session state"
            );
        }
        before != after
    }

    pub fn finish_boot(&mut self) -> bool {
        self.send(BOOTED)
    }

    /// Leave the menu for a fresh run
    pub fn new_game(&mut self) -> bool {
        if !self.fsm.can_send(NEW_GAME) {
            return false;
        }
        self.score = 0;
        self.coins = 0;
        self.bombs = STARTING_BOMBS;
        self.level = 1;
        self.play_time = 0.0;
        self.counters.lives.store(STARTING_LIVES, Ordering::Relaxed);
        self.counters.continues.store(STARTING_CONTINUES, Ordering::Relaxed);
        self.reset_combo();
        self.start_wave(1);
        self.send(NEW_GAME)
    }

    pub fn finish_loading(&mut self) -> bool {
        self.send(LOADED)
    }

    pub fn pause(&mut self) -> bool {
        self.send(PAUSE)
    }

    pub fn resume(&mut self) -> bool {
        self.send(RESUME)
    }

    pub fn complete_level(&mut self) -> bool {
        let completed = self.send(COMPLETE_LEVEL);
        if completed {
            self.check_achievements();
        }
        completed
    }

    pub fn next_level(&mut self) -> bool {
        if !self.send(NEXT_LEVEL) {
            return false;
        }
        self.level += 1;
        self.start_wave(1);
        true
    }

    /// Spend a continue to resume a lost run with full lives
    pub fn use_continue(&mut self) -> bool {
        let resumed = self.send(CONTINUE);
        if resumed {
            self.reset_combo();
            tracing::info!(continues = self.continues(), "run continued");
        }
        resumed
    }

    pub fn add_continue(&mut self) {
        self.counters.continues.fetch_add(1, Ordering::Relaxed);
    }

    /// Detonate a bomb while playing
    pub fn use_bomb(&mut self) -> bool {
        if self.state() != GameState::Playing || self.bombs == 0 {
            return false;
        }
        self.bombs -= 1;
        emit(&self.events, GameEvent::BombUsed);
        true
    }

    pub fn add_bomb(&mut self) {
        self.bombs += 1;
    }

    fn start_wave(&mut self, wave: u32) {
        self.wave = wave;
        self.wave_timer = WAVE_DURATION;
    }

    pub fn back_to_menu(&mut self) -> bool {
        self.send(BACK_TO_MENU)
    }

    /// Advance play time and the combo timer
    pub fn update(&mut self, dt: f32) {
        if self.state() != GameState::Playing {
            return;
        }
        self.play_time += dt;
        self.wave_timer -= dt;
        if self.wave_timer <= 0.0 {
            if self.wave < MAX_WAVES {
                self.start_wave(self.wave + 1);
                tracing::debug!(wave = self.wave, level = self.level, "next wave");
            } else {
                self.wave_timer = 0.0;
            }
        }
        if self.combo > 0 {
            self.combo_time -= dt;
            if self.combo_time <= 0.0 {
                self.reset_combo();
            }
        }
    }

    /// Add points scaled by the current multiplier
    pub fn add_score(&mut self, points: u64) -> u64 {
        let actual = points * self.multiplier as u64;
        self.score += actual;
        self.high_score = self.high_score.max(self.score);
        actual
    }

    pub fn add_combo(&mut self) {
        self.combo += 1;
        self.combo_time = COMBO_WINDOW;
        self.multiplier = (1 + self.combo / 10).min(MAX_MULTIPLIER);
        if self.combo > self.max_combo {
            self.max_combo = self.combo;
            self.check_achievements();
        }
    }

    fn reset_combo(&mut self) {
        self.combo = 0;
        self.combo_time = 0.0;
        self.multiplier = 1;
    }

    pub fn collect_coin(&mut self, value: u64) {
        self.coins += 1;
        self.coins_collected += 1;
        self.add_score(value * COIN_SCORE);
        emit(&self.events, GameEvent::CoinCollected);
        self.check_achievements();
    }

    /// Unlock every achievement whose condition now holds, once each
    fn check_achievements(&mut self) {
        let stats = self.stats();
        for achievement in &ACHIEVEMENTS {
            if self.unlocked.contains(&achievement.id) || !(achievement.unlocked_when)(&stats) {
                continue;
            }
            self.unlocked.push(achievement.id);
            tracing::info!(id = achievement.id, name = achievement.name, "achievement unlocked");
            emit(&self.events, GameEvent::AchievementUnlocked);
        }
    }

    /// Lose a life; the run ends when none remain
    pub fn lose_life(&mut self) {
        if self.state() != GameState::Playing {
            return;
        }
        let lives = self.lives().saturating_sub(1);
        self.counters.lives.store(lives, Ordering::Relaxed);
        self.reset_combo();
        emit(&self.events, GameEvent::PlayerHit);
        if self.send(DIE) {
            tracing::info!(score = self.score, high_score = self.high_score, "game over");
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn coins(&self) -> u32 {
        self.coins
    }

    pub fn lives(&self) -> u32 {
        self.counters.lives.load(Ordering::Relaxed)
    }

    pub fn continues(&self) -> u32 {
        self.counters.continues.load(Ordering::Relaxed)
    }

    pub fn bombs(&self) -> u32 {
        self.bombs
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            games_played: self.counters.games_played.load(Ordering::Relaxed),
            games_completed: self.counters.games_completed.load(Ordering::Relaxed),
            deaths: self.counters.deaths.load(Ordering::Relaxed),
            coins_collected: self.coins_collected,
            max_combo: self.max_combo,
        }
    }

    /// Ids of the achievements unlocked so far, in unlock order
    pub fn achievements(&self) -> &[&'static str] {
        &self.unlocked
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    pub fn play_time(&self) -> f32 {
        self.play_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing_session() -> (GameSession, SharedDispatcher) {
        let events: SharedDispatcher = Arc::new(Mutex::new(EventDispatcher::new()));
        let mut session = GameSession::new(Arc::clone(&events));
        assert!(session.finish_boot());
        assert!(session.new_game());
        assert!(session.finish_loading());
        (session, events)
    }

    #[test]
    fn test_state_flow() {
        let (mut session, _) = playing_session();
        assert_eq!(session.state(), GameState::Playing);

        assert!(session.pause());
        assert!(!session.pause());
        assert!(session.resume());

        assert!(session.complete_level());
        assert!(session.next_level());
        assert_eq!(session.state(), GameState::Loading);
        assert_eq!(session.level(), 2);
    }

    #[test]
    fn test_multiplier_grows_every_ten_combo_and_caps() {
        let (mut session, _) = playing_session();
        for _ in 0..9 {
            session.add_combo();
        }
        assert_eq!(session.multiplier(), 1);
        session.add_combo();
        assert_eq!(session.multiplier(), 2);
        assert_eq!(session.add_score(50), 100);

        for _ in 0..200 {
            session.add_combo();
        }
        assert_eq!(session.multiplier(), MAX_MULTIPLIER);
    }

    #[test]
    fn test_combo_expires_after_window() {
        let (mut session, _) = playing_session();
        for _ in 0..10 {
            session.add_combo();
        }
        session.update(2.0);
        assert_eq!(session.combo(), 10);
        session.update(1.5);
        assert_eq!(session.combo(), 0);
        assert_eq!(session.multiplier(), 1);
    }

    #[test]
    fn test_paused_session_does_not_advance() {
        let (mut session, _) = playing_session();
        session.update(1.0);
        session.pause();
        session.update(5.0);
        assert_eq!(session.play_time(), 1.0);
    }

    #[test]
    fn test_coins_score_and_notify() {
        let (mut session, events) = playing_session();
        let hits = Arc::new(Mutex::new(0));
        let counter = hits.clone();
        events
            .lock()
            .unwrap()
            .add_listener(GameEvent::CoinCollected, move |_| *counter.lock().unwrap() += 1);

        session.collect_coin(3);
        assert_eq!(session.coins(), 1);
        assert_eq!(session.score(), 30);
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn test_losing_all_lives_ends_the_run() {
        let (mut session, events) = playing_session();
        let over = Arc::new(Mutex::new(false));
        let flag = over.clone();
        events
            .lock()
            .unwrap()
            .add_listener(GameEvent::GameOver, move |_| *flag.lock().unwrap() = true);

        session.add_score(500);
        for _ in 0..STARTING_LIVES {
            session.lose_life();
        }
        assert_eq!(session.state(), GameState::GameOver);
        assert!(*over.lock().unwrap());

        // High score survives into the next run
        assert!(session.back_to_menu());
        assert!(session.new_game());
        assert_eq!(session.score(), 0);
        assert_eq!(session.lives(), STARTING_LIVES);
        assert_eq!(session.high_score(), 500);
    }

    #[test]
    fn test_run_ends_only_on_last_life() {
        let (mut session, _) = playing_session();
        session.lose_life();
        session.lose_life();
        assert_eq!(session.state(), GameState::Playing);
        assert_eq!(session.lives(), 1);

        session.lose_life();
        assert_eq!(session.state(), GameState::GameOver);
        assert_eq!(session.stats().deaths, 1);

        // Out of the playing state, further hits are ignored
        session.lose_life();
        assert_eq!(session.stats().deaths, 1);
    }

    #[test]
    fn test_continues_restore_lives_until_spent() {
        let (mut session, _) = playing_session();
        assert!(!session.use_continue());

        for round in 0..STARTING_CONTINUES {
            for _ in 0..STARTING_LIVES {
                session.lose_life();
            }
            assert_eq!(session.state(), GameState::GameOver);
            assert!(session.use_continue(), "continue {} refused", round);
            assert_eq!(session.state(), GameState::Playing);
            assert_eq!(session.lives(), STARTING_LIVES);
        }
        assert_eq!(session.continues(), 0);

        for _ in 0..STARTING_LIVES {
            session.lose_life();
        }
        assert!(!session.use_continue());
        assert_eq!(session.state(), GameState::GameOver);

        session.add_continue();
        assert!(session.use_continue());
        assert_eq!(session.stats().deaths, STARTING_CONTINUES + 1);
    }

    #[test]
    fn test_bombs_run_out_and_notify() {
        let (mut session, events) = playing_session();
        let used = Arc::new(Mutex::new(0));
        let counter = used.clone();
        events
            .lock()
            .unwrap()
            .add_listener(GameEvent::BombUsed, move |_| *counter.lock().unwrap() += 1);

        for _ in 0..STARTING_BOMBS {
            assert!(session.use_bomb());
        }
        assert!(!session.use_bomb());
        assert_eq!(session.bombs(), 0);
        assert_eq!(*used.lock().unwrap(), STARTING_BOMBS);

        session.add_bomb();
        session.pause();
        assert!(!session.use_bomb());
        assert_eq!(session.bombs(), 1);
    }

    #[test]
    fn test_waves_advance_and_cap() {
        let (mut session, _) = playing_session();
        assert_eq!(session.wave(), 1);
        session.update(WAVE_DURATION - 1.0);
        assert_eq!(session.wave(), 1);
        session.update(1.0);
        assert_eq!(session.wave(), 2);

        for _ in 0..(MAX_WAVES * 2) {
            session.update(WAVE_DURATION);
        }
        assert_eq!(session.wave(), MAX_WAVES);

        assert!(session.complete_level());
        assert!(session.next_level());
        assert_eq!(session.wave(), 1);
    }

    #[test]
    fn test_stats_accumulate_across_runs() {
        let (mut session, _) = playing_session();
        for _ in 0..12 {
            session.add_combo();
        }
        session.collect_coin(1);
        assert!(session.complete_level());

        let stats = session.stats();
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.games_completed, 1);
        assert_eq!(stats.max_combo, 12);
        assert_eq!(stats.coins_collected, 1);

        assert!(session.next_level());
        assert!(session.finish_loading());
        for _ in 0..STARTING_LIVES {
            session.lose_life();
        }
        assert!(session.back_to_menu());
        assert!(session.new_game());

        let stats = session.stats();
        assert_eq!(stats.games_played, 2);
        assert_eq!(stats.deaths, 1);
        assert_eq!(stats.max_combo, 12);
        assert_eq!(session.coins(), 0);
        assert_eq!(stats.coins_collected, 1);
    }

    #[test]
    fn test_achievements_unlock_once() {
        let (mut session, events) = playing_session();
        let unlocked = Arc::new(Mutex::new(0));
        let counter = unlocked.clone();
        events
            .lock()
            .unwrap()
            .add_listener(GameEvent::AchievementUnlocked, move |_| {
                *counter.lock().unwrap() += 1
            });

        for _ in 0..120 {
            session.collect_coin(1);
        }
        assert_eq!(session.achievements(), ["coin_collector"]);

        for _ in 0..60 {
            session.add_combo();
        }
        assert_eq!(session.achievements(), ["coin_collector", "combo_master"]);
        assert_eq!(*unlocked.lock().unwrap(), 2);
    }

    #[test]
    fn test_listener_can_reenter_the_dispatcher() {
        let (mut session, events) = playing_session();
        let dispatcher = events.clone();
        events
            .lock()
            .unwrap()
            .add_listener(GameEvent::PlayerHit, move |_| {
                dispatcher
                    .lock()
                    .unwrap()
                    .add_listener(GameEvent::GameOver, |_| {});
            });

        session.lose_life();
        assert_eq!(events.lock().unwrap().len(), 2);
    }
}
