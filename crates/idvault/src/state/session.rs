use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{AppError, WebSession};

use super::AppState;

/// How long a session lives after it is created.
pub const SESSION_TTL: Duration = Duration::days(7);

#[derive(Debug)]
pub(super) struct SessionEntry {
    blob: Value,
    expires_at: OffsetDateTime,
}

impl SessionEntry {
    fn is_live(&self, now: OffsetDateTime) -> bool {
        self.expires_at > now
    }
}

impl AppState {
    #[tracing::instrument(skip(self))]
    pub async fn new_session(&self) -> WebSession {
        self.new_session_expiring(OffsetDateTime::now_utc() + SESSION_TTL)
            .await
    }

    pub(crate) async fn new_session_expiring(&self, expires_at: OffsetDateTime) -> WebSession {
        let session = WebSession {
            id: Uuid::now_v7(),
            blob: Value::Object(Map::new()),
        };

        let now = OffsetDateTime::now_utc();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.is_live(now));
        let expired = before - sessions.len();
        if expired > 0 {
            tracing::debug!(expired, "evicted expired sessions");
        }

        sessions.insert(
            session.id,
            SessionEntry {
                blob: session.blob.clone(),
                expires_at,
            },
        );

        session
    }

    /// The live session with `session_id`. Expired sessions are dropped here.
    pub async fn get_session(&self, session_id: Uuid) -> Option<WebSession> {
        let now = OffsetDateTime::now_utc();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(&session_id) {
                Some(entry) if entry.is_live(now) => {
                    return Some(WebSession {
                        id: session_id,
                        blob: entry.blob.clone(),
                    });
                }
                Some(_) => {}
                None => return None,
            }
        }

        self.sessions.write().await.remove(&session_id);
        None
    }

    pub async fn end_session(&self, web_session: &WebSession) {
        if self.sessions.write().await.remove(&web_session.id).is_some() {
            tracing::debug!(session_id = %web_session.id, "ended session");
        }
    }

    pub async fn insert_into_session<T: Serialize + Sync>(
        &self,
        web_session: &WebSession,
        key: &str,
        value: &T,
    ) -> Result<WebSession, AppError> {
        let value = serde_json::to_value(value).map_err(|e| AppError::ValueError(e.to_string()))?;

        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .entry(web_session.id)
            .or_insert_with(|| SessionEntry {
                blob: Value::Object(Map::new()),
                expires_at: OffsetDateTime::now_utc() + SESSION_TTL,
            });

        if let Value::Object(m) = &mut entry.blob {
            m.insert(key.to_string(), value);
        }

        Ok(WebSession {
            id: web_session.id,
            blob: entry.blob.clone(),
        })
    }

    pub async fn get_from_session<T: DeserializeOwned>(
        &self,
        web_session: &WebSession,
        key: &str,
    ) -> Option<T> {
        self.sessions
            .read()
            .await
            .get(&web_session.id)
            .and_then(|entry| entry.blob.get(key).cloned())
            .and_then(|v| serde_json::from_value(v).ok())
    }

    #[cfg(test)]
    pub(crate) async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use ledger::Ledger;

    use super::*;

    #[tokio::test]
    async fn session_values_round_trip() {
        let state = AppState::in_memory(Ledger::new());
        let session = state.new_session().await;

        state
            .insert_into_session(&session, "user_id", &7_u64)
            .await
            .expect("insert");
        assert_eq!(state.get_from_session::<u64>(&session, "user_id").await, Some(7));

        state.end_session(&session).await;
        assert!(state.get_session(session.id).await.is_none());
        assert_eq!(state.get_from_session::<u64>(&session, "user_id").await, None);
    }

    #[tokio::test]
    async fn unknown_session_is_absent() {
        let state = AppState::in_memory(Ledger::new());
        assert!(state.get_session(Uuid::now_v7()).await.is_none());
    }

    #[tokio::test]
    async fn expired_session_is_absent_and_evicted() {
        let state = AppState::in_memory(Ledger::new());
        let stale = state
            .new_session_expiring(OffsetDateTime::now_utc() - Duration::seconds(1))
            .await;

        assert!(state.get_session(stale.id).await.is_none());
        assert_eq!(state.session_count().await, 0);
    }

    #[tokio::test]
    async fn creating_a_session_sweeps_expired_ones() {
        let state = AppState::in_memory(Ledger::new());
        for _ in 0..3 {
            state
                .new_session_expiring(OffsetDateTime::now_utc() - Duration::seconds(1))
                .await;
        }
        assert_eq!(state.session_count().await, 3);

        let fresh = state.new_session().await;
        assert_eq!(state.session_count().await, 1);
        assert!(state.get_session(fresh.id).await.is_some());
    }
}
