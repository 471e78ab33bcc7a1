//! UI thread and the loading label
//!
//! The label is owned by the thread that created the [`UiThread`]. Other
//! threads never touch it directly: they post [`UiCommand`]s through a
//! [`UiHandle`], and the host loop applies them with [`UiThread::pump`].
//!
//! ```ignore
//! let mut ui = UiThread::new(TextView::default());
//! let handle = ui.handle();
//! std::thread::spawn(move || handle.set_text("Starting SDL Engine..."));
//! ui.pump_timeout(Duration::from_secs(1));
//! ```

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::Duration;

use crate::error::{PlatformError, Result};
use crate::window::WindowConfig;

/// Text alignment inside the label
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Gravity {
    #[default]
    Center,
    Start,
    End,
}

/// The single text label of the loading screen
#[derive(Clone, Debug, PartialEq)]
pub struct TextView {
    text: String,
    text_size: f32,
    gravity: Gravity,
}

impl TextView {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn text_size(&self) -> f32 {
        self.text_size
    }

    pub fn gravity(&self) -> Gravity {
        self.gravity
    }

    pub fn set_text_size(&mut self, size: f32) {
        self.text_size = size;
    }

    pub fn set_gravity(&mut self, gravity: Gravity) {
        self.gravity = gravity;
    }
}

impl Default for TextView {
    fn default() -> Self {
        Self {
            text: String::new(),
            text_size: 20.0,
            gravity: Gravity::Center,
        }
    }
}

/// Mutation posted to the UI thread
#[derive(Clone, Debug, PartialEq)]
pub enum UiCommand {
    SetText(String),
}

/// Callback used to nudge the host event loop after a post
pub type UiWaker = Arc<dyn Fn() + Send + Sync>;

/// Sending side of the UI handoff. Cheap to clone and `Send`.
#[derive(Clone)]
pub struct UiHandle {
    tx: Sender<UiCommand>,
    waker: Option<UiWaker>,
}

impl UiHandle {
    /// Wake the host loop after every post
    pub fn with_waker<F: Fn() + Send + Sync + 'static>(mut self, waker: F) -> Self {
        self.waker = Some(Arc::new(waker));
        self
    }

    /// Queue a command for the UI thread
    pub fn post(&self, command: UiCommand) -> Result<()> {
        self.tx
            .send(command)
            .map_err(|_| PlatformError::UiUnavailable("label receiver dropped".to_string()))?;
        if let Some(waker) = &self.waker {
            waker();
        }
        Ok(())
    }

    /// Replace the label text on the UI thread
    pub fn set_text(&self, text: impl Into<String>) -> Result<()> {
        self.post(UiCommand::SetText(text.into()))
    }
}

type TextObserver = Box<dyn FnMut(&TextView)>;
type WindowObserver = Box<dyn FnMut(&WindowConfig)>;

/// Receiving side of the UI handoff, bound to the thread that created it
pub struct UiThread {
    view: TextView,
    window: WindowConfig,
    owner: ThreadId,
    tx: Sender<UiCommand>,
    rx: Receiver<UiCommand>,
    waker: Option<UiWaker>,
    text_observers: Vec<TextObserver>,
    window_observers: Vec<WindowObserver>,
}

impl UiThread {
    /// Create the UI side on the current thread
    pub fn new(view: TextView) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            view,
            window: WindowConfig::default(),
            owner: thread::current().id(),
            tx,
            rx,
            waker: None,
            text_observers: Vec::new(),
            window_observers: Vec::new(),
        }
    }

    /// Wake the host loop whenever a handle from [`handle`](Self::handle) posts
    pub fn with_waker<F: Fn() + Send + Sync + 'static>(mut self, waker: F) -> Self {
        self.waker = Some(Arc::new(waker));
        self
    }

    /// A handle other threads can post through
    pub fn handle(&self) -> UiHandle {
        UiHandle {
            tx: self.tx.clone(),
            waker: self.waker.clone(),
        }
    }

    pub fn view(&self) -> &TextView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut TextView {
        &mut self.view
    }

    pub fn window(&self) -> WindowConfig {
        self.window
    }

    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    /// Whether the caller is running on the UI thread
    pub fn is_ui_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Called with the label after every text change
    pub fn on_text_changed<F: FnMut(&TextView) + 'static>(&mut self, observer: F) {
        self.text_observers.push(Box::new(observer));
    }

    /// Called whenever window chrome is (re)applied
    pub fn on_window_changed<F: FnMut(&WindowConfig) + 'static>(&mut self, observer: F) {
        self.window_observers.push(Box::new(observer));
    }

    /// Set the label text. Must be called on the UI thread.
    pub fn set_text(&mut self, text: impl Into<String>) {
        debug_assert!(self.is_ui_thread(), "label mutated off the UI thread");
        self.view.text = text.into();
        tracing::debug!(text = %self.view.text.escape_debug(), "label updated");
        for observer in self.text_observers.iter_mut() {
            observer(&self.view);
        }
    }

    pub fn apply_window(&mut self, window: WindowConfig) {
        self.window = window;
        tracing::debug!(
            fullscreen = window.fullscreen,
            show_title = window.show_title,
            "window configured"
        );
        for observer in self.window_observers.iter_mut() {
            observer(&self.window);
        }
    }

    /// Apply every queued command without blocking. Returns how many ran.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(command) = self.rx.try_recv() {
            self.apply(command);
            applied += 1;
        }
        applied
    }

    /// Wait up to `timeout` for the first command, then drain the queue
    pub fn pump_timeout(&mut self, timeout: Duration) -> usize {
        match self.rx.recv_timeout(timeout) {
            Ok(command) => {
                self.apply(command);
                1 + self.pump()
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => 0,
        }
    }

    fn apply(&mut self, command: UiCommand) {
        match command {
            UiCommand::SetText(text) => self.set_text(text),
        }
    }
}
