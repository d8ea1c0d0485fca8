use crate::types::{TournamentFormat, MAX_NUM_CHOICES};

/// Closed set of pairing strategies behind one seam. Every entry in
/// `TOURNAMENT_FORMATS` maps to `FlatSlices` today: the double-elimination,
/// round-robin, one-round, and custom formats are aliases of the
/// single-elimination behavior, kept as distinct names so saved settings
/// stay meaningful if they ever diverge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PairingStrategy {
  FlatSlices,
}

impl TournamentFormat {
  pub fn strategy(&self) -> PairingStrategy {
    match self {
      TournamentFormat::SingleElimination
      | TournamentFormat::DoubleElimination
      | TournamentFormat::RoundRobin
      | TournamentFormat::OneRound
      | TournamentFormat::Custom => PairingStrategy::FlatSlices,
    }
  }
}

impl PairingStrategy {
  /// The pair for `match_number`, or `None` once the flat array is
  /// consumed. The tail slice of an odd-sized list has a single entry.
  pub fn next_pair(
    &self,
    candidates: &[String],
    match_number: usize,
    arity: usize,
  ) -> Option<Vec<String>> {
    match self {
      PairingStrategy::FlatSlices => {
        let start = match_number * arity;
        if start >= candidates.len() {
          return None;
        }
        let end = (start + arity).min(candidates.len());
        Some(candidates[start..end].to_vec())
      }
    }
  }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MatchStep {
  Pair(Vec<String>),
  Complete,
}

/// Tracks the round and match pointers over the flat candidate array and
/// deals consecutive slices until the array is consumed. Winners are never
/// promoted into a later round; completion is reached after one pass.
#[derive(Clone, Debug)]
pub struct BracketEngine {
  format: TournamentFormat,
  arity: usize,
  candidates: Vec<String>,
  round: u32,
  match_number: usize,
  current_pair: Vec<String>,
  match_started_at_ms: u64,
}

impl BracketEngine {
  pub fn new(
    candidates: Vec<String>,
    format: TournamentFormat,
    num_choices: usize,
  ) -> Result<Self, String> {
    if candidates.len() < 2 {
      return Err("A tournament needs at least two candidates.".to_string());
    }
    Ok(BracketEngine {
      format,
      arity: num_choices.clamp(2, MAX_NUM_CHOICES),
      candidates,
      round: 1,
      match_number: 0,
      current_pair: Vec::new(),
      match_started_at_ms: 0,
    })
  }

  pub fn start_round(&mut self, format: TournamentFormat) {
    self.format = format;
    self.round = 1;
    self.match_number = 0;
    self.current_pair.clear();
  }

  /// Deal the next pair, or report completion. The match pointer advances
  /// only after a pair has been dealt, and the decision timer reference is
  /// taken from `now_ms` at deal time.
  pub fn next_match(&mut self, now_ms: u64) -> MatchStep {
    let strategy = self.format.strategy();
    match strategy.next_pair(&self.candidates, self.match_number, self.arity) {
      None => MatchStep::Complete,
      Some(pair) => {
        self.current_pair = pair.clone();
        self.match_number += 1;
        self.match_started_at_ms = now_ms;
        MatchStep::Pair(pair)
      }
    }
  }

  /// Put the pointers back exactly where they were before a decision.
  pub fn rewind_to(&mut self, round: u32, match_number: usize, pair: Vec<String>, now_ms: u64) {
    self.round = round;
    self.match_number = match_number;
    self.current_pair = pair;
    self.match_started_at_ms = now_ms;
  }

  /// Adopt recovered fields wholesale; format and arity keep their
  /// configured values.
  pub fn restore(
    &mut self,
    round: u32,
    match_number: usize,
    candidates: Vec<String>,
    current_pair: Vec<String>,
    now_ms: u64,
  ) {
    self.round = round;
    self.match_number = match_number;
    self.candidates = candidates;
    self.current_pair = current_pair;
    self.match_started_at_ms = now_ms;
  }

  pub fn format(&self) -> TournamentFormat {
    self.format
  }

  pub fn round(&self) -> u32 {
    self.round
  }

  /// Index of the next pair to deal. While a pair is awaiting a decision
  /// this has already moved past it; see `current_match_index`.
  pub fn match_number(&self) -> usize {
    self.match_number
  }

  /// Zero-based index of the pair currently on display.
  pub fn current_match_index(&self) -> usize {
    self.match_number.saturating_sub(1)
  }

  pub fn arity(&self) -> usize {
    self.arity
  }

  pub fn candidates(&self) -> &[String] {
    &self.candidates
  }

  pub fn current_pair(&self) -> &[String] {
    &self.current_pair
  }

  pub fn match_started_at_ms(&self) -> u64 {
    self.match_started_at_ms
  }

  /// Fraction of the candidate array consumed, as a percentage for the
  /// collaborator's progress bar.
  pub fn progress(&self) -> f64 {
    if self.candidates.is_empty() {
      return 0.0;
    }
    (self.match_number as f64 / self.candidates.len() as f64) * 100.0
  }
}
