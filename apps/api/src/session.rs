//! Per-session context: inputs plus the latest successful result per slot.
//!
//! Sessions are keyed by id so several reviewers can share one process. Within
//! a session, two overlapping actions race on the same slot and the last
//! successful write wins; the store lock is never held across a remote call.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;

/// Named result slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    AnalysisJson,
    EditorOutput,
    SalaryJson,
    RoleSalaryJson,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotEntry {
    pub value: Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionContext {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub resume_text: Option<String>,
    pub job_description: String,
    pub slots: HashMap<Slot, SlotEntry>,
}

impl SessionContext {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            resume_text: None,
            job_description: String::new(),
            slots: HashMap::new(),
        }
    }

    pub fn slot(&self, slot: Slot) -> Option<&Value> {
        self.slots.get(&slot).map(|e| &e.value)
    }

    /// Resume text, or "" when none was uploaded.
    pub fn resume(&self) -> &str {
        self.resume_text.as_deref().unwrap_or("")
    }
}

/// Cheap-to-clone handle to the in-memory session map.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, SessionContext>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> SessionContext {
        let session = SessionContext::new();
        self.inner.write().await.insert(session.id, session.clone());
        info!("Created session {}", session.id);
        session
    }

    /// Snapshot of the session; later writes do not show up in it.
    pub async fn get(&self, id: Uuid) -> Option<SessionContext> {
        self.inner.read().await.get(&id).cloned()
    }

    /// Like `get`, but an unknown id is a `NotFound` error.
    pub async fn require(&self, id: Uuid) -> Result<SessionContext, AppError> {
        self.get(id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.inner.write().await.remove(&id).is_some();
        if removed {
            info!("Removed session {id}");
        }
        removed
    }

    pub async fn set_resume_text(&self, id: Uuid, text: String) -> bool {
        self.update(id, |s| s.resume_text = Some(text)).await
    }

    pub async fn set_job_description(&self, id: Uuid, text: String) -> bool {
        self.update(id, |s| s.job_description = text).await
    }

    /// Replaces the slot wholesale. Returns false when the session is gone.
    pub async fn write_slot(&self, id: Uuid, slot: Slot, value: Value) -> bool {
        let written = self
            .update(id, |s| {
                s.slots.insert(
                    slot,
                    SlotEntry {
                        value,
                        updated_at: Utc::now(),
                    },
                );
            })
            .await;
        debug!("Slot {slot:?} write for session {id}: stored={written}");
        written
    }

    /// Drops every session created before `cutoff`. Returns how many went.
    pub async fn evict_created_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.created_at >= cutoff);
        before - sessions.len()
    }

    /// Background sweep removing sessions older than `ttl`, run every `every`.
    pub fn spawn_eviction(&self, ttl: Duration, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        let ttl =
            chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36_500));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let evicted = store.evict_created_before(Utc::now() - ttl).await;
                if evicted > 0 {
                    info!("Evicted {evicted} expired sessions");
                }
            }
        })
    }

    async fn update(&self, id: Uuid, apply: impl FnOnce(&mut SessionContext)) -> bool {
        match self.inner.write().await.get_mut(&id) {
            Some(session) => {
                apply(session);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_new_session_is_empty() {
        let store = SessionStore::new();
        let session = store.create().await;
        let fetched = store.get(session.id).await.unwrap();
        assert!(fetched.resume_text.is_none());
        assert!(fetched.job_description.is_empty());
        assert!(fetched.slots.is_empty());
        assert_eq!(fetched.resume(), "");
    }

    #[tokio::test]
    async fn test_slot_write_replaces_never_merges() {
        let store = SessionStore::new();
        let id = store.create().await.id;

        store
            .write_slot(id, Slot::AnalysisJson, json!({"a": 1, "b": 2}))
            .await;
        store.write_slot(id, Slot::AnalysisJson, json!({"c": 3})).await;

        let session = store.get(id).await.unwrap();
        assert_eq!(session.slot(Slot::AnalysisJson), Some(&json!({"c": 3})));
    }

    #[tokio::test]
    async fn test_slots_are_independent() {
        let store = SessionStore::new();
        let id = store.create().await.id;

        store.write_slot(id, Slot::SalaryJson, json!({"s": 1})).await;
        store
            .write_slot(id, Slot::EditorOutput, json!("# Resume"))
            .await;

        let session = store.get(id).await.unwrap();
        assert_eq!(session.slot(Slot::SalaryJson), Some(&json!({"s": 1})));
        assert_eq!(session.slot(Slot::EditorOutput), Some(&json!("# Resume")));
        assert!(session.slot(Slot::AnalysisJson).is_none());
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        let a = store.create().await.id;
        let b = store.create().await.id;

        store.set_resume_text(a, "resume A".to_string()).await;

        assert_eq!(store.get(a).await.unwrap().resume(), "resume A");
        assert_eq!(store.get(b).await.unwrap().resume(), "");
    }

    #[tokio::test]
    async fn test_unknown_session_writes_are_rejected() {
        let store = SessionStore::new();
        let ghost = Uuid::new_v4();
        assert!(!store.write_slot(ghost, Slot::SalaryJson, json!({})).await);
        assert!(!store.set_job_description(ghost, "jd".to_string()).await);
        assert!(store.get(ghost).await.is_none());
    }

    #[tokio::test]
    async fn test_remove_session() {
        let store = SessionStore::new();
        let id = store.create().await.id;
        assert!(store.remove(id).await);
        assert!(!store.remove(id).await);
        assert!(store.get(id).await.is_none());
    }

    #[tokio::test]
    async fn test_evict_created_before_keeps_newer_sessions() {
        let store = SessionStore::new();
        let old = store.create().await.id;
        let cutoff = Utc::now() + chrono::Duration::milliseconds(1);
        store.inner.write().await.insert(
            Uuid::new_v4(),
            SessionContext {
                created_at: cutoff + chrono::Duration::hours(1),
                ..SessionContext::new()
            },
        );

        assert_eq!(store.evict_created_before(cutoff).await, 1);
        assert!(store.get(old).await.is_none());
        assert_eq!(store.inner.read().await.len(), 1);
        assert_eq!(store.evict_created_before(cutoff).await, 0);
    }

    #[tokio::test]
    async fn test_eviction_sweep_removes_expired_sessions() {
        let store = SessionStore::new();
        let id = store.create().await.id;

        let sweep = store.spawn_eviction(Duration::ZERO, Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        sweep.abort();

        assert!(store.get(id).await.is_none());
    }
}
