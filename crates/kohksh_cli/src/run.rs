//! Headless host run of the shell and engine

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use kohksh_engine::KohkshRuntime;
use kohksh_platform::{EngineMode, LaunchOutcome, Shell, TextView, UiThread};
use serde::Serialize;

use crate::config::KohkshConfig;

/// How long one UI pump waits for posted work
const UI_FRAME: Duration = Duration::from_millis(16);

/// How the launch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Cancelled,
    Failed,
}

/// Machine-readable result of a run, printed with `--report-json`
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub status: RunStatus,
    pub message: Option<String>,
    pub version: String,
    /// Every label text the UI thread applied, in order
    pub labels: Vec<String>,
    pub phase: String,
    pub engine_mode: EngineMode,
    pub elapsed_frames: u64,
    pub elapsed_ms: u64,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

/// Run the shell on the current thread, which acts as the UI thread
pub fn run(config: KohkshConfig) -> Result<RunReport> {
    let started = Instant::now();
    let mode = config.shell.engine_mode;
    let runtime = Arc::new(KohkshRuntime::new(config.engine.clone(), mode));

    let mut ui = UiThread::new(TextView::default());
    let labels = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&labels);
    ui.on_text_changed(move |view| {
        tracing::info!(text = %view.text().replace('\n', " | "), "label");
        sink.borrow_mut().push(view.text().to_string());
    });

    let mut shell = Shell::new(config.shell, runtime.clone()).context("Invalid shell config")?;
    let launch = shell.on_create(&mut ui).context("Shell creation failed")?;

    while !launch.is_finished() {
        ui.pump_timeout(UI_FRAME);
    }
    ui.pump();
    let outcome = launch.join();

    if mode == EngineMode::Detached && outcome == LaunchOutcome::Completed {
        tracing::info!("waiting for detached engine");
        runtime.join_detached();
    }
    shell.on_destroy();

    let phase = launch.phase();
    if let LaunchOutcome::Failed(message) = &outcome {
        tracing::error!(?phase, "launch failed: {}", message);
    }

    let labels = labels.borrow().clone();
    // Loading label ends with the version line
    let version = labels
        .first()
        .and_then(|text| text.lines().last())
        .unwrap_or_default()
        .to_string();

    let (status, message) = match outcome {
        LaunchOutcome::Completed => (RunStatus::Completed, None),
        LaunchOutcome::Cancelled => (RunStatus::Cancelled, None),
        LaunchOutcome::Failed(message) => (RunStatus::Failed, Some(message)),
    };

    Ok(RunReport {
        status,
        message,
        version,
        labels,
        phase: format!("{:?}", phase),
        engine_mode: mode,
        elapsed_frames: runtime.frames(),
        elapsed_ms: started.elapsed().as_millis() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config(mode: EngineMode) -> KohkshConfig {
        let mut config = KohkshConfig::default();
        config.shell.launch_delay_ms = 10;
        config.shell.engine_mode = mode;
        config.engine.target_fps = 500;
        config.engine.max_frames = Some(5);
        config
    }

    #[test]
    fn test_blocking_run_report() {
        let report = run(quick_config(EngineMode::Blocking)).unwrap();
        assert!(report.succeeded());
        assert_eq!(report.elapsed_frames, 5);
        assert_eq!(report.phase, "Finished");
        assert_eq!(report.labels.len(), 2);
        assert_eq!(report.version, kohksh_engine::version_string());
        assert_eq!(report.labels[1], "Starting SDL Engine...");
    }

    #[test]
    fn test_detached_run_waits_for_engine() {
        let report = run(quick_config(EngineMode::Detached)).unwrap();
        assert!(report.succeeded());
        assert_eq!(report.elapsed_frames, 5);
    }

    #[test]
    fn test_report_serializes() {
        let report = run(quick_config(EngineMode::Blocking)).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "completed");
        assert!(json["message"].is_null());
        assert_eq!(json["engine_mode"], "blocking");
    }
}
