use crate::controller::{ChoiceOutcome, MatchController};
use crate::persist::PersistenceStore;
use crate::stats::Stats;
use crate::types::{
    DecisionEvent, EventOutcome, MatchLogEntry, TournamentConfig, TournamentState,
};
use std::path::{Path, PathBuf};
use tracing::info;

/// The narrow surface the collaborator drives. It owns the controller and
/// the persistence store, runs recovery once at construction, and turns
/// decision events into render instructions.
pub struct TournamentSession {
    config: TournamentConfig,
    controller: MatchController,
    store: PersistenceStore,
}

impl TournamentSession {
    /// Build a session from an already-filtered candidate list. Fails when
    /// fewer than two candidates are supplied; the collaborator must not
    /// start a tournament in that case. Any checkpoint at the autosave
    /// path is restored before the session is handed back.
    pub fn new(
        candidates: Vec<String>,
        config: TournamentConfig,
        store: PersistenceStore,
        now_ms: u64,
    ) -> Result<Self, String> {
        let mut controller = MatchController::new(candidates, &config)?;
        controller.start(now_ms);
        let recovered = store.recover(controller.snapshot());
        controller.restore(recovered, now_ms);
        Ok(TournamentSession {
            config,
            controller,
            store,
        })
    }

    pub fn handle_event(&mut self, event: DecisionEvent, now_ms: u64) -> Result<EventOutcome, String> {
        match event {
            DecisionEvent::OptionIndex(index) => {
                match self.controller.make_choice(index, now_ms)? {
                    ChoiceOutcome::NextMatch(pair) => Ok(EventOutcome::NextMatch(pair)),
                    ChoiceOutcome::Champion(champion) => {
                        info!("tournament complete, champion: {champion}");
                        Ok(EventOutcome::Champion(champion))
                    }
                }
            }
            DecisionEvent::Undo => {
                if self.controller.undo(now_ms) {
                    Ok(EventOutcome::Rewound)
                } else {
                    Ok(EventOutcome::Ignored)
                }
            }
            DecisionEvent::Save(path) => {
                self.manual_save(&path)?;
                Ok(EventOutcome::Saved(path))
            }
            // the collaborator confirms before discarding state
            DecisionEvent::Quit => Ok(EventOutcome::QuitRequested),
        }
    }

    /// Map a raw key press onto a decision event using the configured
    /// bindings. Unbound keys are ignored.
    pub fn handle_key(&mut self, key: char, now_ms: u64) -> Result<EventOutcome, String> {
        if key == self.config.keys.undo {
            return self.handle_event(DecisionEvent::Undo, now_ms);
        }
        match self.config.keys.option_index(key) {
            Some(index) => self.handle_event(DecisionEvent::OptionIndex(index), now_ms),
            None => Ok(EventOutcome::Ignored),
        }
    }

    pub fn manual_save(&self, dest: &Path) -> Result<(), String> {
        self.store.manual_save(&self.controller.snapshot(), dest)
    }

    /// Synchronous checkpoint for hosts without the background worker.
    pub fn autosave_now(&self) {
        self.store.autosave(&self.controller.snapshot());
    }

    pub fn export_emergency_log(&self) -> Result<PathBuf, String> {
        self.store.export_emergency_log(self.controller.match_log())
    }

    /// Record this run in the cumulative session history. Called by the
    /// collaborator after the user confirms quitting.
    pub fn finish(&self) -> Result<(), String> {
        self.store.append_session_history(&self.controller.snapshot())
    }

    /// Throw away all progress and start over. Confirmation is the
    /// collaborator's job.
    pub fn restart(&mut self, now_ms: u64) {
        info!("restarting tournament");
        self.controller.start(now_ms);
    }

    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    pub fn current_pair(&self) -> &[String] {
        self.controller.current_pair()
    }

    pub fn champion(&self) -> Option<&str> {
        self.controller.champion()
    }

    pub fn is_complete(&self) -> bool {
        self.controller.is_complete()
    }

    pub fn round(&self) -> u32 {
        self.controller.round()
    }

    pub fn match_number(&self) -> usize {
        self.controller.match_number()
    }

    pub fn progress(&self) -> f64 {
        self.controller.progress()
    }

    pub fn stats(&self) -> &Stats {
        self.controller.stats()
    }

    pub fn match_log(&self) -> &[MatchLogEntry] {
        self.controller.match_log()
    }

    pub fn state_snapshot(&self) -> TournamentState {
        self.controller.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorePaths;
    use std::fs;

    fn candidates(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn session_in(dir: &Path, names: &[&str]) -> TournamentSession {
        let store = PersistenceStore::new(StorePaths::new(dir));
        TournamentSession::new(candidates(names), TournamentConfig::default(), store, 0).unwrap()
    }

    #[test]
    fn test_rejects_fewer_than_two_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let store = PersistenceStore::new(StorePaths::new(dir.path()));
        let result =
            TournamentSession::new(candidates(&["only"]), TournamentConfig::default(), store, 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_event_dispatch_full_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path(), &["A", "B", "C", "D"]);
        assert_eq!(session.current_pair(), ["A", "B"]);
        assert_eq!(session.progress(), 25.0);

        let outcome = session
            .handle_event(DecisionEvent::OptionIndex(1), 1000)
            .unwrap();
        assert_eq!(outcome, EventOutcome::NextMatch(candidates(&["C", "D"])));
        assert_eq!(session.progress(), 50.0);

        let outcome = session
            .handle_event(DecisionEvent::OptionIndex(0), 2000)
            .unwrap();
        assert_eq!(outcome, EventOutcome::Champion("B".to_string()));
        assert!(session.is_complete());
        assert_eq!(session.champion(), Some("B"));
    }

    #[test]
    fn test_undo_event_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path(), &["A", "B", "C", "D"]);
        assert_eq!(
            session.handle_event(DecisionEvent::Undo, 0).unwrap(),
            EventOutcome::Ignored
        );
        session
            .handle_event(DecisionEvent::OptionIndex(0), 0)
            .unwrap();
        assert_eq!(
            session.handle_event(DecisionEvent::Undo, 0).unwrap(),
            EventOutcome::Rewound
        );
        assert_eq!(session.current_pair(), ["A", "B"]);
    }

    #[test]
    fn test_save_event_writes_the_destination() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path(), &["A", "B", "C", "D"]);
        let dest = dir.path().join("manual.json");
        let outcome = session
            .handle_event(DecisionEvent::Save(dest.clone()), 0)
            .unwrap();
        assert_eq!(outcome, EventOutcome::Saved(dest.clone()));
        let state: TournamentState =
            serde_json::from_str(&fs::read_to_string(&dest).unwrap()).unwrap();
        assert_eq!(state, session.state_snapshot());
    }

    #[test]
    fn test_quit_only_requests_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path(), &["A", "B"]);
        assert_eq!(
            session.handle_event(DecisionEvent::Quit, 0).unwrap(),
            EventOutcome::QuitRequested
        );
        // state untouched
        assert_eq!(session.current_pair(), ["A", "B"]);
    }

    #[test]
    fn test_key_dispatch_uses_bindings() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path(), &["A", "B", "C", "D"]);
        assert_eq!(
            session.handle_key('f', 0).unwrap(),
            EventOutcome::NextMatch(candidates(&["C", "D"]))
        );
        assert_eq!(session.handle_key('x', 0).unwrap(), EventOutcome::Ignored);
        assert_eq!(session.handle_key('z', 0).unwrap(), EventOutcome::Rewound);
        assert_eq!(session.current_pair(), ["A", "B"]);
        assert_eq!(session.stats().selection_counts.get("f"), Some(&1));
    }

    #[test]
    fn test_recovers_checkpoint_on_startup() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut session = session_in(dir.path(), &["A", "B", "C", "D"]);
            session
                .handle_event(DecisionEvent::OptionIndex(1), 1000)
                .unwrap();
            session.autosave_now();
        }

        let session = session_in(dir.path(), &["A", "B", "C", "D"]);
        assert_eq!(session.current_pair(), ["C", "D"]);
        assert_eq!(session.state_snapshot().winners, candidates(&["B"]));
        assert_eq!(session.round(), 1);
    }

    #[test]
    fn test_recovery_merges_partial_checkpoints() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StorePaths::new(dir.path());
        fs::write(&paths.autosave_path, r#"{"round": 2, "winners": ["B"]}"#).unwrap();

        let session = session_in(dir.path(), &["A", "B", "C", "D"]);
        assert_eq!(session.round(), 2);
        assert_eq!(session.state_snapshot().winners, candidates(&["B"]));
        // defaults everywhere the checkpoint was silent
        assert_eq!(session.current_pair(), ["A", "B"]);
        assert_eq!(
            session.state_snapshot().photo_paths,
            candidates(&["A", "B", "C", "D"])
        );
    }

    #[test]
    fn test_restart_discards_progress() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path(), &["A", "B"]);
        session
            .handle_event(DecisionEvent::OptionIndex(0), 0)
            .unwrap();
        assert!(session.is_complete());

        session.restart(0);
        assert!(!session.is_complete());
        assert_eq!(session.current_pair(), ["A", "B"]);
        assert!(session.state_snapshot().winners.is_empty());
    }

    #[test]
    fn test_finish_appends_session_history() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StorePaths::new(dir.path());
        let mut session = session_in(dir.path(), &["A", "B"]);
        session
            .handle_event(DecisionEvent::OptionIndex(0), 0)
            .unwrap();
        session.finish().unwrap();
        session.finish().unwrap();

        let data = fs::read_to_string(&paths.session_history_path).unwrap();
        let history: Vec<serde_json::Value> = serde_json::from_str(&data).unwrap();
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_emergency_log_export_via_facade() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path(), &["A", "B", "C", "D"]);
        session
            .handle_event(DecisionEvent::OptionIndex(0), 0)
            .unwrap();
        let path = session.export_emergency_log().unwrap();
        let parsed: Vec<MatchLogEntry> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].winner, "A");
    }
}
