// Session store - workout sessions keyed by client id
//
// The HTTP layer maps each client onto one session. Sessions are created on
// first use, replaced wholesale on an explicit reset, and guarded by their
// own mutex so independent clients never contend on each other's counters.
// The store's own map lock is held only for lookup/insert, never across a
// frame analysis.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::info;

use crate::clock::Clock;
use crate::config::ExerciseConfig;
use crate::error::SessionError;
use crate::session::{ExerciseMode, WorkoutSession};

/// Shared handle to one client's session.
pub type SessionHandle = Arc<Mutex<WorkoutSession>>;

pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionHandle>>,
    exercises: ExerciseConfig,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    pub fn new(exercises: ExerciseConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            exercises,
            clock,
        }
    }

    /// Fetch the session for `id`, creating one in `mode` if absent.
    pub fn get_or_create(
        &self,
        id: &str,
        mode: ExerciseMode,
    ) -> Result<SessionHandle, SessionError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| SessionError::LockPoisoned {
                component: "SessionStore".to_string(),
            })?;

        if let Some(handle) = sessions.get(id) {
            return Ok(Arc::clone(handle));
        }

        info!("Creating workout session '{}' (mode={})", id, mode);
        let session = WorkoutSession::new(mode, self.exercises.clone(), self.clock.clone());
        let handle = Arc::new(Mutex::new(session));
        sessions.insert(id.to_string(), Arc::clone(&handle));
        Ok(handle)
    }

    /// Look up an existing session without creating one.
    pub fn get(&self, id: &str) -> Result<Option<SessionHandle>, SessionError> {
        let sessions = self
            .sessions
            .lock()
            .map_err(|_| SessionError::LockPoisoned {
                component: "SessionStore".to_string(),
            })?;
        Ok(sessions.get(id).map(Arc::clone))
    }

    /// Replace the session for `id` with a fresh one in `mode`.
    ///
    /// Used by the reset endpoint: any concurrent holder of the old handle
    /// keeps a detached session that simply stops receiving frames.
    pub fn replace(&self, id: &str, mode: ExerciseMode) -> Result<SessionHandle, SessionError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| SessionError::LockPoisoned {
                component: "SessionStore".to_string(),
            })?;

        info!("Resetting workout session '{}' (mode={})", id, mode);
        let session = WorkoutSession::new(mode, self.exercises.clone(), self.clock.clone());
        let handle = Arc::new(Mutex::new(session));
        sessions.insert(id.to_string(), Arc::clone(&handle));
        Ok(handle)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::testing::fixtures::pushup_frame;

    fn store() -> SessionStore {
        SessionStore::new(ExerciseConfig::default(), Arc::new(ManualClock::new()))
    }

    #[test]
    fn get_or_create_returns_same_session() {
        let store = store();
        let first = store
            .get_or_create("alice", ExerciseMode::Pushup)
            .unwrap();
        {
            let frame = pushup_frame(170.0, 0.9);
            first.lock().unwrap().update(Some(&frame));
        }

        let second = store
            .get_or_create("alice", ExerciseMode::Pushup)
            .unwrap();
        assert_eq!(second.lock().unwrap().frame_count(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn sessions_are_isolated_per_client() {
        let store = store();
        let alice = store
            .get_or_create("alice", ExerciseMode::Pushup)
            .unwrap();
        let bob = store.get_or_create("bob", ExerciseMode::Squat).unwrap();

        let frame = pushup_frame(170.0, 0.9);
        alice.lock().unwrap().update(Some(&frame));

        assert_eq!(alice.lock().unwrap().frame_count(), 1);
        assert_eq!(bob.lock().unwrap().frame_count(), 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn replace_discards_previous_state() {
        let store = store();
        let session = store
            .get_or_create("alice", ExerciseMode::Pushup)
            .unwrap();
        {
            let frame = pushup_frame(170.0, 0.9);
            session.lock().unwrap().update(Some(&frame));
        }

        let fresh = store.replace("alice", ExerciseMode::Armcurl).unwrap();
        let fresh = fresh.lock().unwrap();
        assert_eq!(fresh.frame_count(), 0);
        assert_eq!(fresh.mode(), ExerciseMode::Armcurl);
    }

    #[test]
    fn get_without_create() {
        let store = store();
        assert!(store.get("nobody").unwrap().is_none());
        store.get_or_create("alice", ExerciseMode::Squat).unwrap();
        assert!(store.get("alice").unwrap().is_some());
    }
}
