use std::sync::{Mutex, RwLock};

use rusqlite::Connection;

use crate::db;
use crate::db::queries;
use crate::models::User;

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// The signed-in customer's credential and user record.
///
/// Created with [`SessionContext::init`], which restores whatever a previous
/// run persisted, and cleared with [`SessionContext::teardown`]. Callers pass
/// it explicitly to whatever needs the credential.
pub struct SessionContext {
    store: Mutex<Connection>,
    current: RwLock<Option<Session>>,
}

impl SessionContext {
    pub fn init(path: &str) -> anyhow::Result<Self> {
        let conn = db::init_db(path)?;
        let current = queries::load_session(&conn)?.map(|(token, user)| Session { token, user });

        if let Some(session) = &current {
            tracing::info!(user_id = %session.user.id, "restored persisted session");
        }

        Ok(Self {
            store: Mutex::new(conn),
            current: RwLock::new(current),
        })
    }

    /// A session store that lives only as long as the process.
    pub fn in_memory() -> anyhow::Result<Self> {
        Self::init(":memory:")
    }

    pub fn begin(&self, token: &str, user: &User) {
        {
            let conn = self.store.lock().unwrap();
            if let Err(e) = queries::save_session(&conn, token, user) {
                // The in-memory session still works for this run.
                tracing::error!(error = %e, "failed to persist session");
            }
        }

        *self.current.write().unwrap() = Some(Session {
            token: token.to_string(),
            user: user.clone(),
        });
        tracing::info!(user_id = %user.id, "session started");
    }

    /// Replaces the stored user record, keeping the credential.
    pub fn refresh_user(&self, user: &User) {
        let token = match self.token() {
            Some(t) => t,
            None => return,
        };
        self.begin(&token, user);
    }

    pub fn token(&self) -> Option<String> {
        self.current
            .read()
            .unwrap()
            .as_ref()
            .map(|s| s.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.current
            .read()
            .unwrap()
            .as_ref()
            .map(|s| s.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().unwrap().is_some()
    }

    pub fn teardown(&self) {
        let had_session = self.current.write().unwrap().take().is_some();

        let conn = self.store.lock().unwrap();
        if let Err(e) = queries::clear_session(&conn) {
            tracing::error!(error = %e, "failed to clear persisted session");
        }

        if had_session {
            tracing::info!("session cleared");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seed::demo_user;

    #[test]
    fn test_begin_and_teardown() {
        let session = SessionContext::in_memory().unwrap();
        assert!(!session.is_authenticated());

        session.begin("token-1", &demo_user());
        assert!(session.is_authenticated());
        assert_eq!(session.token().as_deref(), Some("token-1"));
        assert_eq!(session.user().unwrap().email, "dev@example.com");

        session.teardown();
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
    }

    #[test]
    fn test_persisted_session_is_restored() {
        let path = std::env::temp_dir().join(format!("garagebook-session-{}.db", uuid::Uuid::new_v4()));
        let path = path.to_string_lossy().to_string();

        {
            let session = SessionContext::init(&path).unwrap();
            session.begin("token-1", &demo_user());
        }

        let restored = SessionContext::init(&path).unwrap();
        assert_eq!(restored.token().as_deref(), Some("token-1"));

        restored.teardown();
        let cleared = SessionContext::init(&path).unwrap();
        assert!(!cleared.is_authenticated());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_refresh_user_requires_session() {
        let session = SessionContext::in_memory().unwrap();
        session.refresh_user(&demo_user());
        assert!(!session.is_authenticated());
    }
}
