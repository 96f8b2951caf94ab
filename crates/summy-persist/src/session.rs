use chrono::{DateTime, Utc};
use std::collections::HashMap;
use summy_types::{ConversationHandle, TabId};
use tokio::sync::RwLock;

/// Conversation state tracked for one browser tab
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: TabId,
    pub handle: ConversationHandle,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: TabId) -> Self {
        Self {
            id,
            handle: ConversationHandle::new(),
            created_at: Utc::now(),
        }
    }
}

/// Tab id to session map. At most one session exists per tab.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<TabId, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the tab's session, creating it on first use.
    /// The flag is `true` when the session was created by this call.
    pub async fn get_or_create(&self, tab: TabId) -> (Session, bool) {
        if let Some(session) = self.sessions.read().await.get(&tab) {
            return (session.clone(), false);
        }

        let mut sessions = self.sessions.write().await;
        // Another request may have won the race between the two locks
        if let Some(session) = sessions.get(&tab) {
            return (session.clone(), false);
        }

        let session = Session::new(tab);
        sessions.insert(tab, session.clone());
        tracing::debug!(tab = %tab, handle = %session.handle, "session created");
        (session, true)
    }

    pub async fn get(&self, tab: TabId) -> Option<Session> {
        self.sessions.read().await.get(&tab).cloned()
    }

    pub async fn remove(&self, tab: TabId) -> Option<Session> {
        let removed = self.sessions.write().await.remove(&tab);
        if let Some(session) = &removed {
            tracing::debug!(tab = %tab, handle = %session.handle, "session released");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    pub async fn tabs(&self) -> Vec<TabId> {
        let mut tabs: Vec<TabId> = self.sessions.read().await.keys().copied().collect();
        tabs.sort();
        tabs
    }
}
