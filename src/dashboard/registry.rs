use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use rand::Rng;

use super::session::{LeadSession, SessionSettings, SessionUser};
use crate::store::LeadStore;

/// Live dashboard sessions keyed by an opaque random token.
///
/// The token is what the cookie session stores; the session state itself
/// never leaves the process.
pub struct SessionRegistry<S> {
    store: Arc<S>,
    settings: SessionSettings,
    sessions: Mutex<HashMap<String, Arc<LeadSession<S>>>>,
}

fn new_key() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

impl<S: LeadStore> SessionRegistry<S> {
    pub fn new(store: Arc<S>, settings: SessionSettings) -> Self {
        SessionRegistry {
            store,
            settings,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, Arc<LeadSession<S>>>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Create a fresh session for `user`. Nothing is loaded until it is mounted.
    pub fn open(&self, user: SessionUser) -> (String, Arc<LeadSession<S>>) {
        let key = new_key();
        let session = Arc::new(LeadSession::new(self.store.clone(), user, self.settings.clone()));
        self.sessions().insert(key.clone(), session.clone());
        log::info!("Opened dashboard session for user {}", session.user().id);
        (key, session)
    }

    pub fn get(&self, key: &str) -> Option<Arc<LeadSession<S>>> {
        self.sessions().get(key).cloned()
    }

    /// Remove and dispose the session. Returns false for an unknown key.
    pub fn close(&self, key: &str) -> bool {
        let removed = self.sessions().remove(key);
        match removed {
            Some(session) => {
                session.dispose();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}
