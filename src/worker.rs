use crate::persist::PersistenceStore;
use crate::types::{SharedSession, TournamentState};
use std::{
    sync::mpsc::{sync_channel, SyncSender, TrySendError},
    thread::{self, JoinHandle},
    time::Duration,
};
use tracing::{debug, warn};

enum SaveJob {
    Snapshot(TournamentState),
    Shutdown,
}

/// Handle for submitting snapshots to the save worker. Cheap to clone;
/// the timer thread keeps one.
#[derive(Clone)]
pub struct AutosaveHandle {
    tx: SyncSender<SaveJob>,
}

impl AutosaveHandle {
    /// Queue a snapshot for writing. The channel holds at most one
    /// pending snapshot behind the write in flight; while it is full,
    /// further submissions are coalesced away and the next timer tick
    /// supplies a fresh snapshot instead.
    pub fn submit(&self, state: TournamentState) {
        match self.tx.try_send(SaveJob::Snapshot(state)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                debug!("auto-save already queued; dropping snapshot");
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!("auto-save worker is no longer running");
            }
        }
    }
}

/// Owns the thread that performs autosave disk writes off the event
/// dispatch path. Snapshots arrive as owned copies, never the live state.
pub struct SaveWorker {
    tx: SyncSender<SaveJob>,
    handle: Option<JoinHandle<()>>,
}

impl SaveWorker {
    pub fn spawn(store: PersistenceStore) -> SaveWorker {
        let (tx, rx) = sync_channel(1);
        let handle = thread::spawn(move || {
            while let Ok(job) = rx.recv() {
                match job {
                    SaveJob::Snapshot(state) => store.autosave(&state),
                    SaveJob::Shutdown => break,
                }
            }
        });
        SaveWorker {
            tx,
            handle: Some(handle),
        }
    }

    pub fn handle(&self) -> AutosaveHandle {
        AutosaveHandle {
            tx: self.tx.clone(),
        }
    }

    /// Drain pending writes and stop the thread.
    pub fn shutdown(mut self) {
        self.shutdown_inner();
    }

    fn shutdown_inner(&mut self) {
        let _ = self.tx.send(SaveJob::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SaveWorker {
    fn drop(&mut self) {
        self.shutdown_inner();
    }
}

/// Wake every `interval_ms`, snapshot the session under its lock, and
/// hand the copy to the save worker. Runs for the life of the process.
pub fn spawn_autosave_timer(session: SharedSession, saver: AutosaveHandle, interval_ms: u64) {
    thread::spawn(move || loop {
        thread::sleep(Duration::from_millis(interval_ms.max(1)));
        let snapshot = {
            let guard = session.lock().unwrap_or_else(|e| e.into_inner());
            guard.state_snapshot()
        };
        saver.submit(snapshot);
    });
}
