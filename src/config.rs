use crate::types::{
    TournamentConfig, AUTO_SAVE_FILE_NAME, EMERGENCY_SAVE_DIR_NAME, SESSION_HISTORY_FILE_NAME,
    SETTINGS_FILE_NAME,
};
use std::{
    env,
    fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

pub fn home_dir() -> PathBuf {
  env::var_os("HOME")
    .map(PathBuf::from)
    .unwrap_or_else(|| PathBuf::from("."))
}

/// Where the autosave, session history, and settings files live.
/// `PHOTO_BRACKET_DATA_DIR` overrides the home directory default.
pub fn default_data_dir() -> PathBuf {
  if let Some(raw) = env_default("PHOTO_BRACKET_DATA_DIR") {
    return PathBuf::from(raw);
  }
  home_dir()
}

pub fn settings_path() -> PathBuf {
  default_data_dir().join(SETTINGS_FILE_NAME)
}

pub fn env_default(key: &str) -> Option<String> {
  env::var(key)
    .ok()
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
}

pub fn apply_env_defaults(mut config: TournamentConfig) -> TournamentConfig {
  if let Some(value) = env_default("PHOTO_BRACKET_AUTOSAVE_INTERVAL_MS") {
    if let Ok(ms) = value.parse::<u64>() {
      config.auto_save_interval_ms = ms;
    }
  }
  config
}

pub fn load_config_from(path: &Path) -> Result<TournamentConfig, String> {
  if !path.is_file() {
    return Ok(apply_env_defaults(TournamentConfig::default()));
  }
  let data =
    fs::read_to_string(path).map_err(|e| format!("read settings {}: {e}", path.display()))?;
  let config = serde_json::from_str::<TournamentConfig>(&data)
    .map_err(|e| format!("parse settings {}: {e}", path.display()))?;
  Ok(apply_env_defaults(config))
}

pub fn save_config_to(path: &Path, config: &TournamentConfig) -> Result<(), String> {
  let payload = serde_json::to_string_pretty(config).map_err(|e| e.to_string())?;
  fs::write(path, payload).map_err(|e| format!("write settings {}: {e}", path.display()))
}

pub fn load_config_inner() -> Result<TournamentConfig, String> {
  load_config_from(&settings_path())
}

pub fn save_config_inner(config: TournamentConfig) -> Result<TournamentConfig, String> {
  save_config_to(&settings_path(), &config)?;
  Ok(config)
}

pub fn now_ms() -> u64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .unwrap_or_default()
    .as_millis() as u64
}

// ── Store paths ────────────────────────────────────────────────────────

/// Locations of the three persistence targets, resolved once at startup
/// and passed by value into the store. The emergency folder is only
/// created when the first export actually happens.
#[derive(Clone, Debug)]
pub struct StorePaths {
  pub autosave_path: PathBuf,
  pub emergency_dir: PathBuf,
  pub session_history_path: PathBuf,
}

impl StorePaths {
  pub fn new(base_dir: &Path) -> Self {
    StorePaths {
      autosave_path: base_dir.join(AUTO_SAVE_FILE_NAME),
      emergency_dir: base_dir.join(EMERGENCY_SAVE_DIR_NAME),
      session_history_path: base_dir.join(SESSION_HISTORY_FILE_NAME),
    }
  }

  pub fn default_paths() -> Self {
    StorePaths::new(&default_data_dir())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::{TournamentFormat, DEFAULT_NUM_CHOICES};

  #[test]
  fn test_missing_settings_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config_from(&dir.path().join("does_not_exist.json")).unwrap();
    assert_eq!(config.num_choices, DEFAULT_NUM_CHOICES);
    assert_eq!(config.tournament_type, TournamentFormat::SingleElimination);
    assert_eq!(config.keys.left, 'd');
  }

  #[test]
  fn test_settings_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tournament_settings.json");
    let mut config = TournamentConfig::default();
    config.num_choices = 4;
    config.tournament_type = TournamentFormat::RoundRobin;
    config.keys.undo = 'u';
    save_config_to(&path, &config).unwrap();
    let loaded = load_config_from(&path).unwrap();
    assert_eq!(loaded, config);
  }

  #[test]
  fn test_format_names_match_settings_labels() {
    let json = serde_json::to_string(&TournamentFormat::SingleElimination).unwrap();
    assert_eq!(json, "\"Single Elimination\"");
    let parsed: TournamentFormat = serde_json::from_str("\"Round Robin\"").unwrap();
    assert_eq!(parsed, TournamentFormat::RoundRobin);
  }

  #[test]
  fn test_store_paths_layout() {
    let paths = StorePaths::new(Path::new("/tmp/pb"));
    assert_eq!(paths.autosave_path, Path::new("/tmp/pb/autosave_state.json"));
    assert_eq!(paths.emergency_dir, Path::new("/tmp/pb/EmergencySaves"));
    assert_eq!(
      paths.session_history_path,
      Path::new("/tmp/pb/session_history.json")
    );
  }

  #[test]
  fn test_corrupt_settings_report_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tournament_settings.json");
    fs::write(&path, "{not json").unwrap();
    let err = load_config_from(&path).unwrap_err();
    assert!(err.contains("parse settings"));
    assert!(err.contains("tournament_settings.json"));
  }
}
