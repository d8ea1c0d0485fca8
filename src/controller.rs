use crate::engine::{BracketEngine, MatchStep};
use crate::stats::Stats;
use crate::types::{KeyBindings, MatchLogEntry, TournamentConfig, TournamentState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
  AwaitingDecision,
  Completed,
}

/// Pre-decision pointers, captured in full before every choice and popped
/// on undo. Winners and the match log only ever grow by one per decision,
/// so truncating them by one alongside this record is an exact rewind.
#[derive(Clone, Debug)]
struct UndoRecord {
  round: u32,
  match_number: usize,
  current_pair: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ChoiceOutcome {
  NextMatch(Vec<String>),
  Champion(String),
}

/// Applies user decisions to the bracket: winners accumulator, match log,
/// stats, and the undo stack all move together here.
pub struct MatchController {
  engine: BracketEngine,
  keys: KeyBindings,
  winners: Vec<String>,
  match_log: Vec<MatchLogEntry>,
  stats: Stats,
  undo_stack: Vec<UndoRecord>,
  phase: Phase,
}

impl MatchController {
  pub fn new(candidates: Vec<String>, config: &TournamentConfig) -> Result<Self, String> {
    let engine = BracketEngine::new(candidates, config.tournament_type, config.num_choices)?;
    Ok(MatchController {
      engine,
      keys: config.keys.clone(),
      winners: Vec::new(),
      match_log: Vec::new(),
      stats: Stats::new(&config.keys),
      undo_stack: Vec::new(),
      phase: Phase::AwaitingDecision,
    })
  }

  /// Reset the pointers and accumulators and deal the first pair.
  pub fn start(&mut self, now_ms: u64) {
    let format = self.engine.format();
    self.engine.start_round(format);
    self.winners.clear();
    self.match_log.clear();
    self.undo_stack.clear();
    self.phase = match self.engine.next_match(now_ms) {
      MatchStep::Pair(_) => Phase::AwaitingDecision,
      MatchStep::Complete => Phase::Completed,
    };
  }

  pub fn make_choice(&mut self, option_index: usize, now_ms: u64) -> Result<ChoiceOutcome, String> {
    if self.phase == Phase::Completed {
      return Err("The tournament is already complete.".to_string());
    }
    let pair = self.engine.current_pair();
    if option_index >= pair.len() {
      return Err(format!(
        "Choice {option_index} is out of range for the current match ({} options).",
        pair.len()
      ));
    }
    let winner = pair[option_index].clone();

    self.undo_stack.push(UndoRecord {
      round: self.engine.round(),
      match_number: self.engine.match_number(),
      current_pair: pair.to_vec(),
    });

    let elapsed_secs =
      now_ms.saturating_sub(self.engine.match_started_at_ms()) as f64 / 1000.0;
    self
      .stats
      .record_decision(elapsed_secs, self.keys.option_key(option_index));

    self.winners.push(winner.clone());
    self.match_log.push(MatchLogEntry {
      round: self.engine.round(),
      match_number: self.engine.current_match_index(),
      winner,
      timestamp: now_ms,
    });

    match self.engine.next_match(now_ms) {
      MatchStep::Pair(pair) => Ok(ChoiceOutcome::NextMatch(pair)),
      MatchStep::Complete => {
        self.phase = Phase::Completed;
        // index 0 is the champion slot: the flat-slice layout never
        // promotes winners into later rounds
        let champion = self.winners.first().cloned().unwrap_or_default();
        Ok(ChoiceOutcome::Champion(champion))
      }
    }
  }

  /// Rewind one decision. Returns false (leaving everything untouched)
  /// when there is nothing to undo.
  pub fn undo(&mut self, now_ms: u64) -> bool {
    let record = match self.undo_stack.pop() {
      Some(record) => record,
      None => return false,
    };
    self.match_log.pop();
    self.winners.pop();
    self
      .engine
      .rewind_to(record.round, record.match_number, record.current_pair, now_ms);
    self.phase = Phase::AwaitingDecision;
    self.stats.record_undo();
    true
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  pub fn is_complete(&self) -> bool {
    self.phase == Phase::Completed
  }

  /// The reported champion once the tournament has completed.
  pub fn champion(&self) -> Option<&str> {
    if self.phase != Phase::Completed {
      return None;
    }
    self.winners.first().map(String::as_str)
  }

  pub fn current_pair(&self) -> &[String] {
    self.engine.current_pair()
  }

  pub fn round(&self) -> u32 {
    self.engine.round()
  }

  pub fn match_number(&self) -> usize {
    self.engine.match_number()
  }

  pub fn winners(&self) -> &[String] {
    &self.winners
  }

  pub fn match_log(&self) -> &[MatchLogEntry] {
    &self.match_log
  }

  pub fn stats(&self) -> &Stats {
    &self.stats
  }

  pub fn progress(&self) -> f64 {
    self.engine.progress()
  }

  /// The full serializable snapshot handed to the persistence store.
  pub fn snapshot(&self) -> TournamentState {
    TournamentState {
      round: self.engine.round(),
      match_number: self.engine.match_number(),
      winners: self.winners.clone(),
      photo_paths: self.engine.candidates().to_vec(),
      current_choices: self.engine.current_pair().to_vec(),
      match_log: self.match_log.clone(),
      stats: self.stats.clone(),
    }
  }

  /// Adopt a recovered snapshot. Undo records are not persisted, so the
  /// undo history does not survive a restart. A snapshot that was taken
  /// without a dealt pair gets one dealt here so the session is playable.
  pub fn restore(&mut self, state: TournamentState, now_ms: u64) {
    self.engine.restore(
      state.round,
      state.match_number,
      state.photo_paths,
      state.current_choices,
      now_ms,
    );
    self.winners = state.winners;
    self.match_log = state.match_log;
    self.stats = state.stats;
    self.undo_stack.clear();
    let decided_everything = !self.winners.is_empty()
      && self.winners.len() * self.engine.arity() >= self.engine.candidates().len();
    self.phase = if decided_everything {
      Phase::Completed
    } else {
      Phase::AwaitingDecision
    };
    if self.phase == Phase::AwaitingDecision && self.engine.current_pair().is_empty() {
      if let MatchStep::Complete = self.engine.next_match(now_ms) {
        self.phase = Phase::Completed;
      }
    }
  }
}
