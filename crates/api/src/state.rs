//! Application state

use std::collections::HashMap;
use std::sync::Arc;

use engine::{GameEngine, GameSession};
use tokio::sync::Mutex;
use uuid::Uuid;

/// A live session, locked independently of the others. Holds `None` once
/// the session has been handed off to finish or abandon.
pub type SessionHandle = Arc<Mutex<Option<GameSession>>>;

/// Shared application state
pub struct AppState {
    pub engine: GameEngine,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(engine: GameEngine) -> Self {
        Self {
            engine,
            sessions: SessionRegistry::default(),
        }
    }
}

struct Entry {
    user_id: String,
    handle: SessionHandle,
}

#[derive(Default)]
struct Registry {
    sessions: HashMap<Uuid, Entry>,
    by_user: HashMap<String, Uuid>,
}

/// In-memory sessions, at most one per user
#[derive(Default)]
pub struct SessionRegistry {
    inner: Mutex<Registry>,
}

impl SessionRegistry {
    /// Register `session`, handing back the session the same user had before
    pub async fn insert(&self, session: GameSession) -> Option<GameSession> {
        let previous = {
            let mut inner = self.inner.lock().await;
            let user_id = session.user_id().to_string();
            let previous_id = inner.by_user.insert(user_id.clone(), session.id());
            let previous = previous_id.and_then(|id| inner.sessions.remove(&id));
            inner.sessions.insert(
                session.id(),
                Entry {
                    user_id,
                    handle: Arc::new(Mutex::new(Some(session))),
                },
            );
            previous
        };

        match previous {
            Some(entry) => take(&entry.handle).await,
            None => None,
        }
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        self.inner
            .lock()
            .await
            .sessions
            .get(&id)
            .map(|entry| entry.handle.clone())
    }

    /// Take a session out of the registry.
    ///
    /// Waits for any in-flight answer on it to complete; requests that
    /// still hold the handle afterwards find it empty.
    pub async fn remove(&self, id: Uuid) -> Option<GameSession> {
        let entry = {
            let mut inner = self.inner.lock().await;
            let entry = inner.sessions.remove(&id)?;
            if inner.by_user.get(&entry.user_id) == Some(&id) {
                inner.by_user.remove(&entry.user_id);
            }
            entry
        };

        take(&entry.handle).await
    }
}

async fn take(handle: &SessionHandle) -> Option<GameSession> {
    handle.lock().await.take()
}
