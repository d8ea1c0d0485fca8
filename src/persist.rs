use crate::config::StorePaths;
use crate::stats::Stats;
use crate::types::{MatchLogEntry, TournamentState};
use chrono::Local;
use serde_json::Value;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

/// Durable checkpointing: the fixed-path autosave, user-chosen manual
/// saves, the timestamped emergency log export, and the append-only
/// session history, plus the one recovery read at startup.
pub struct PersistenceStore {
  paths: StorePaths,
}

impl PersistenceStore {
  pub fn new(paths: StorePaths) -> Self {
    PersistenceStore { paths }
  }

  pub fn paths(&self) -> &StorePaths {
    &self.paths
  }

  /// Overwrite the fixed autosave file with the full snapshot. Failures
  /// are logged and swallowed so the caller's schedule is never
  /// disturbed.
  pub fn autosave(&self, state: &TournamentState) {
    if let Err(err) = self.write_state(&self.paths.autosave_path, state) {
      warn!("auto-save failed: {err}");
    }
  }

  /// Same snapshot to a caller-chosen path. No retry; the collaborator
  /// reports the outcome to the user.
  pub fn manual_save(&self, state: &TournamentState, dest: &Path) -> Result<(), String> {
    self.write_state(dest, state)
  }

  fn write_state(&self, path: &Path, state: &TournamentState) -> Result<(), String> {
    let payload = serde_json::to_string(state).map_err(|e| e.to_string())?;
    if let Some(parent) = path.parent() {
      if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
          .map_err(|e| format!("create save folder {}: {e}", parent.display()))?;
      }
    }
    fs::write(path, payload).map_err(|e| format!("write state {}: {e}", path.display()))
  }

  /// Export the match log alone to
  /// `<emergency_dir>/log_<YYYYMMDD_HHMMSS>.json`, creating the folder on
  /// first use. Returns the written path.
  pub fn export_emergency_log(&self, log: &[MatchLogEntry]) -> Result<PathBuf, String> {
    let dir = &self.paths.emergency_dir;
    fs::create_dir_all(dir).map_err(|e| format!("create emergency folder {}: {e}", dir.display()))?;
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("log_{timestamp}.json"));
    let payload = serde_json::to_string(log).map_err(|e| e.to_string())?;
    fs::write(&path, payload).map_err(|e| format!("write log {}: {e}", path.display()))?;
    Ok(path)
  }

  /// Append a timestamped snapshot record to the cumulative history
  /// array. The file is rewritten in place, not atomically: a crash
  /// mid-write can corrupt it. A corrupt or missing file starts a fresh
  /// array rather than failing the append.
  pub fn append_session_history(&self, state: &TournamentState) -> Result<(), String> {
    let path = &self.paths.session_history_path;
    let mut history: Vec<Value> = fs::read_to_string(path)
      .ok()
      .and_then(|data| serde_json::from_str(&data).ok())
      .unwrap_or_default();

    let mut record = serde_json::to_value(state).map_err(|e| e.to_string())?;
    if let Some(object) = record.as_object_mut() {
      object.insert(
        "timestamp".to_string(),
        Value::String(Local::now().to_rfc3339()),
      );
    }
    history.push(record);

    let payload = serde_json::to_string(&history).map_err(|e| e.to_string())?;
    fs::write(path, payload)
      .map_err(|e| format!("write session history {}: {e}", path.display()))
  }

  /// Startup recovery. Every snapshot field present in the autosave file
  /// replaces its default individually; a missing or malformed field
  /// keeps the default instead of failing the whole recovery.
  pub fn recover(&self, defaults: TournamentState) -> TournamentState {
    let path = &self.paths.autosave_path;
    if !path.is_file() {
      return defaults;
    }
    let data = match fs::read_to_string(path) {
      Ok(data) => data,
      Err(err) => {
        warn!("read autosave {}: {err}", path.display());
        return defaults;
      }
    };
    let value: Value = match serde_json::from_str(&data) {
      Ok(value) => value,
      Err(err) => {
        warn!("parse autosave {}: {err}", path.display());
        return defaults;
      }
    };
    info!("restoring tournament checkpoint from {}", path.display());
    restore_state_fields(&value, defaults)
  }
}

pub fn restore_state_fields(value: &Value, mut state: TournamentState) -> TournamentState {
  if let Some(round) = value.get("round").and_then(Value::as_u64) {
    state.round = round as u32;
  }
  if let Some(match_number) = value.get("match_number").and_then(Value::as_u64) {
    state.match_number = match_number as usize;
  }
  if let Some(winners) = value.get("winners") {
    if let Ok(parsed) = serde_json::from_value::<Vec<String>>(winners.clone()) {
      state.winners = parsed;
    }
  }
  if let Some(photo_paths) = value.get("photo_paths") {
    if let Ok(parsed) = serde_json::from_value::<Vec<String>>(photo_paths.clone()) {
      state.photo_paths = parsed;
    }
  }
  if let Some(current_choices) = value.get("current_choices") {
    if let Ok(parsed) = serde_json::from_value::<Vec<String>>(current_choices.clone()) {
      state.current_choices = parsed;
    }
  }
  if let Some(match_log) = value.get("match_log") {
    if let Ok(parsed) = serde_json::from_value::<Vec<MatchLogEntry>>(match_log.clone()) {
      state.match_log = parsed;
    }
  }
  if let Some(stats) = value.get("stats") {
    if let Ok(parsed) = serde_json::from_value::<Stats>(stats.clone()) {
      state.stats = parsed;
    }
  }
  state
}
