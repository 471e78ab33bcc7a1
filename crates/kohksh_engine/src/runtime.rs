//! In-process native runtime behind `getVersion` / `nativeInit` / `startKohksh`

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread::{self, JoinHandle};

use kohksh_platform::bridge::{NativeBridge, NATIVE_INIT, START_KOHKSH};
use kohksh_platform::{EngineMode, PlatformError};

use crate::engine::{EngineHandle, GameEngine};
use crate::error::EngineError;
use crate::game::KohkshGame;
use crate::settings::EngineSettings;

static GLOBAL_RUNTIME: OnceLock<KohkshRuntime> = OnceLock::new();

/// Version string reported through `getVersion`
pub fn version_string() -> String {
    format!("Kohksh v{}", env!("CARGO_PKG_VERSION"))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Engine lifecycle owner used by the shell and the JNI exports
pub struct KohkshRuntime {
    settings: EngineSettings,
    mode: EngineMode,
    engine: Mutex<Option<GameEngine<KohkshGame>>>,
    handle: Mutex<Option<EngineHandle>>,
    detached: Mutex<Option<JoinHandle<()>>>,
    stop_requested: AtomicBool,
    frames: Arc<AtomicU64>,
}

impl KohkshRuntime {
    pub fn new(settings: EngineSettings, mode: EngineMode) -> Self {
        Self {
            settings,
            mode,
            engine: Mutex::new(None),
            handle: Mutex::new(None),
            detached: Mutex::new(None),
            stop_requested: AtomicBool::new(false),
            frames: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Process-wide runtime, created with defaults on first use
    pub fn global() -> &'static KohkshRuntime {
        GLOBAL_RUNTIME
            .get_or_init(|| KohkshRuntime::new(EngineSettings::default(), EngineMode::Blocking))
    }

    /// Install a configured runtime as the global one. Fails if one exists.
    pub fn install_global(
        runtime: KohkshRuntime,
    ) -> Result<&'static KohkshRuntime, PlatformError> {
        GLOBAL_RUNTIME.set(runtime).map_err(|_| {
            PlatformError::Lifecycle("global runtime already installed".to_string())
        })?;
        Ok(Self::global())
    }

    pub fn mode(&self) -> EngineMode {
        self.mode
    }

    /// Control handle, available once `native_init` succeeded
    pub fn engine_handle(&self) -> Option<EngineHandle> {
        lock(&self.handle).clone()
    }

    /// Frames executed by the last engine loop that returned
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::SeqCst)
    }

    /// Wait for a detached engine thread to exit
    pub fn join_detached(&self) {
        let worker = lock(&self.detached).take();
        if let Some(worker) = worker {
            if worker.join().is_err() {
                tracing::error!("detached engine thread panicked");
            }
        }
    }

    fn init_engine(&self) -> Result<(), EngineError> {
        let mut slot = lock(&self.engine);
        let mut handle_slot = lock(&self.handle);
        if slot.is_some() || handle_slot.is_some() {
            return Err(EngineError::AlreadyInitialized);
        }

        let mut engine = GameEngine::new(self.settings.clone(), KohkshGame::new())?;
        let handle = engine.handle();
        if self.stop_requested.load(Ordering::SeqCst) {
            handle.stop();
        }
        engine.initialize()?;

        *handle_slot = Some(handle);
        *slot = Some(engine);
        Ok(())
    }

    fn start_engine(&self) -> Result<(), EngineError> {
        let mut engine = lock(&self.engine).take().ok_or(EngineError::NotInitialized)?;

        match self.mode {
            EngineMode::Blocking => {
                let frames = engine.run()?;
                self.frames.store(frames, Ordering::SeqCst);
            }
            EngineMode::Detached => {
                let frames = Arc::clone(&self.frames);
                let worker = thread::Builder::new()
                    .name("kohksh-engine".to_string())
                    .spawn(move || {
                        match engine.run() {
                            Ok(count) => frames.store(count, Ordering::SeqCst),
                            Err(e) => tracing::error!("detached engine failed: {}", e),
                        }
                    })
                    .map_err(|e| EngineError::Spawn(e.to_string()))?;
                *lock(&self.detached) = Some(worker);
            }
        }
        Ok(())
    }
}

impl NativeBridge for KohkshRuntime {
    fn version(&self) -> kohksh_platform::Result<String> {
        Ok(version_string())
    }

    fn native_init(&self) -> kohksh_platform::Result<()> {
        tracing::info!(mode = ?self.mode, "{}", NATIVE_INIT);
        self.init_engine()
            .map_err(|e| PlatformError::native(NATIVE_INIT, e))
    }

    fn start(&self) -> kohksh_platform::Result<()> {
        tracing::info!("{}", START_KOHKSH);
        self.start_engine()
            .map_err(|e| PlatformError::native(START_KOHKSH, e))
    }

    fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
        if let Some(handle) = self.engine_handle() {
            handle.stop();
        }
    }
}
