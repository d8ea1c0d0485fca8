pub mod config;
pub mod controller;
pub mod engine;
pub mod persist;
pub mod session;
pub mod stats;
pub mod types;
pub mod worker;

pub use config::{load_config_inner, now_ms, save_config_inner, StorePaths};
pub use controller::{ChoiceOutcome, MatchController, Phase};
pub use engine::{BracketEngine, MatchStep, PairingStrategy};
pub use persist::PersistenceStore;
pub use session::TournamentSession;
pub use stats::Stats;
pub use types::{
    DecisionEvent, EventOutcome, KeyBindings, MatchLogEntry, SharedSession, TournamentConfig,
    TournamentFormat, TournamentState,
};
pub use worker::{spawn_autosave_timer, AutosaveHandle, SaveWorker};

use std::fs;
use std::path::Path;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initialize tracing with file + stderr-friendly output. The returned
/// guard must be held for the life of the process or buffered log lines
/// are lost. Call once, before building a session.
pub fn init_logging(logs_dir: &Path) -> WorkerGuard {
    fs::create_dir_all(logs_dir).ok();
    let file_appender = tracing_appender::rolling::daily(logs_dir, "photo_bracket.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();
    info!("photo bracket engine starting");
    guard
}
