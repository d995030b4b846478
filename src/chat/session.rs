//! Session store — one isolated conversation per session id.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::intake::{ConversationState, IntakeMachine, Reply};

/// A single user's conversation.
#[derive(Debug)]
pub struct Session {
    pub state: ConversationState,
    last_active: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            state: ConversationState::default(),
            last_active: Instant::now(),
        }
    }

    fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_active.elapsed()
    }
}

/// Maps session ids to conversations.
///
/// Every session sits behind its own `Mutex`, so inputs for one session are
/// applied strictly one after another while other sessions proceed in parallel.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
        })
    }

    /// Get the session for `id`, creating an empty one if needed.
    pub async fn session(&self, id: &str) -> Arc<Mutex<Session>> {
        if let Some(session) = self.sessions.read().await.get(id) {
            return Arc::clone(session);
        }
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(id.to_string()).or_insert_with(|| {
            debug!(session_id = %id, "Session created");
            Arc::new(Mutex::new(Session::new()))
        });
        Arc::clone(session)
    }

    /// Feed one input to the session's conversation.
    pub async fn process(&self, machine: &IntakeMachine, id: &str, text: &str) -> Reply {
        let session = self.session(id).await;
        let mut session = session.lock().await;
        session.touch();
        machine.process(&mut session.state, text).await
    }

    /// Reset the session to the initial state.
    pub async fn reset(&self, id: &str) {
        let session = self.session(id).await;
        let mut session = session.lock().await;
        session.state.reset();
        session.touch();
        info!(session_id = %id, "Session reset");
    }

    /// Reset the session and return the greeting.
    pub async fn welcome(&self, machine: &IntakeMachine, id: &str) -> Reply {
        self.reset(id).await;
        machine.welcome()
    }

    /// Snapshot of a session's state, if it exists.
    pub async fn state(&self, id: &str) -> Option<ConversationState> {
        let session = self.sessions.read().await.get(id).cloned()?;
        let session = session.lock().await;
        Some(session.state.clone())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop sessions idle for at least `max_idle`. Sessions currently being
    /// processed are kept. Returns how many were removed.
    pub async fn prune_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| match session.try_lock() {
            Ok(s) => s.idle_for() < max_idle,
            Err(_) => true,
        });
        let removed = before - sessions.len();
        if removed > 0 {
            info!(removed, remaining = sessions.len(), "Pruned idle sessions");
        }
        removed
    }
}

/// Spawn a background task that prunes idle sessions every `interval`.
pub fn spawn_expiry_task(
    store: Arc<SessionStore>,
    max_idle: Duration,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            store.prune_idle(max_idle).await;
        }
    })
}
