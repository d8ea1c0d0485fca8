use serde::{Deserialize, Serialize};
use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use crate::session::TournamentSession;
use crate::stats::Stats;

// ── Constants ──────────────────────────────────────────────────────────

pub const DEFAULT_NUM_CHOICES: usize = 2;
pub const MAX_NUM_CHOICES: usize = 4;
pub const AUTO_SAVE_INTERVAL_MS: u64 = 5000;
pub const AUTO_SAVE_FILE_NAME: &str = "autosave_state.json";
pub const EMERGENCY_SAVE_DIR_NAME: &str = "EmergencySaves";
pub const SESSION_HISTORY_FILE_NAME: &str = "session_history.json";
pub const SETTINGS_FILE_NAME: &str = "tournament_settings.json";

// ── Shared state type aliases ──────────────────────────────────────────

pub type SharedSession = Arc<Mutex<TournamentSession>>;

// ── Tournament formats ─────────────────────────────────────────────────

/// The five selectable bracket formats. Every format currently pairs
/// candidates with the same flat-slice strategy; see
/// `TournamentFormat::strategy`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentFormat {
    #[default]
    #[serde(rename = "Single Elimination")]
    SingleElimination,
    #[serde(rename = "Double Elimination")]
    DoubleElimination,
    #[serde(rename = "Round Robin")]
    RoundRobin,
    #[serde(rename = "One Round")]
    OneRound,
    Custom,
}

pub const TOURNAMENT_FORMATS: [TournamentFormat; 5] = [
    TournamentFormat::SingleElimination,
    TournamentFormat::DoubleElimination,
    TournamentFormat::RoundRobin,
    TournamentFormat::OneRound,
    TournamentFormat::Custom,
];

// ── Key bindings ───────────────────────────────────────────────────────

/// Keyboard layout the collaborator feeds into `handle_key`. Replaces the
/// fixed key constants of earlier builds so hosts can rebind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyBindings {
    pub left: char,
    pub right: char,
    pub option3: char,
    pub option4: char,
    pub undo: char,
}

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings {
            left: 'd',
            right: 'f',
            option3: 'j',
            option4: 'k',
            undo: 'z',
        }
    }
}

impl KeyBindings {
    pub fn option_key(&self, index: usize) -> Option<char> {
        match index {
            0 => Some(self.left),
            1 => Some(self.right),
            2 => Some(self.option3),
            3 => Some(self.option4),
            _ => None,
        }
    }

    pub fn option_index(&self, key: char) -> Option<usize> {
        if key == self.left {
            Some(0)
        } else if key == self.right {
            Some(1)
        } else if key == self.option3 {
            Some(2)
        } else if key == self.option4 {
            Some(3)
        } else {
            None
        }
    }

    pub fn option_labels(&self) -> [String; 4] {
        [
            self.left.to_string(),
            self.right.to_string(),
            self.option3.to_string(),
            self.option4.to_string(),
        ]
    }
}

// ── Config types ───────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TournamentConfig {
    pub tournament_type: TournamentFormat,
    pub num_choices: usize,
    pub auto_save_interval_ms: u64,
    pub keys: KeyBindings,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        TournamentConfig {
            tournament_type: TournamentFormat::SingleElimination,
            num_choices: DEFAULT_NUM_CHOICES,
            auto_save_interval_ms: AUTO_SAVE_INTERVAL_MS,
            keys: KeyBindings::default(),
        }
    }
}

// ── Match log ──────────────────────────────────────────────────────────

/// One decided match. `match` is the zero-based index of the pair within
/// the flat candidate array. `timestamp` (epoch ms) is absent in files
/// written by older builds, so it defaults on read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchLogEntry {
    pub round: u32,
    #[serde(rename = "match")]
    pub match_number: usize,
    pub winner: String,
    #[serde(default)]
    pub timestamp: u64,
}

// ── Tournament state ───────────────────────────────────────────────────

/// The full serializable snapshot. Field names are the on-disk autosave
/// keys and must stay as they are for checkpoint compatibility.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TournamentState {
    pub round: u32,
    pub match_number: usize,
    pub winners: Vec<String>,
    pub photo_paths: Vec<String>,
    pub current_choices: Vec<String>,
    pub match_log: Vec<MatchLogEntry>,
    pub stats: Stats,
}

// ── Decision events ────────────────────────────────────────────────────

/// Discrete inputs the collaborator dispatches into the session.
#[derive(Clone, Debug, PartialEq)]
pub enum DecisionEvent {
    OptionIndex(usize),
    Undo,
    Save(PathBuf),
    Quit,
}

/// What the collaborator should render after an event.
#[derive(Clone, Debug, PartialEq)]
pub enum EventOutcome {
    NextMatch(Vec<String>),
    Champion(String),
    Rewound,
    Ignored,
    Saved(PathBuf),
    QuitRequested,
}
