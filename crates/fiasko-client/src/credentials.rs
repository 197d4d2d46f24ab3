use fiasko_common::models::auth::User;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The persisted session: the signed token and the identity it was minted
/// for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub user: User,
    pub token: String,
}

/// Durable client-side session storage: one JSON file under the state
/// directory. Absence of the file means signed out, so a reload picks up
/// the previous session without re-login. Access is synchronous and
/// single-writer.
pub struct CredentialStore {
    path: PathBuf,
    session: Option<StoredSession>,
}

const SESSION_FILE: &str = "fiasko-session.json";

impl CredentialStore {
    /// Open the store rooted at `state_dir`, hydrating any persisted
    /// session. A missing or unreadable file degrades to signed out.
    pub fn open(state_dir: &Path) -> Self {
        let path = state_dir.join(SESSION_FILE);
        let session = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!("Ignoring corrupt session file {}: {}", path.display(), e);
                    None
                }
            },
            Err(_) => None,
        };
        Self { path, session }
    }

    pub fn current(&self) -> Option<&StoredSession> {
        self.session.as_ref()
    }

    /// Persist a new session, replacing any previous one
    pub fn set(&mut self, session: StoredSession) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&session)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(&self.path, raw)?;
        self.session = Some(session);
        Ok(())
    }

    /// Drop the session and remove the persisted file
    pub fn clear(&mut self) -> std::io::Result<()> {
        self.session = None;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn sample_session() -> StoredSession {
        StoredSession {
            user: User {
                user_id: Uuid::new_v4(),
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                created_at: Utc::now(),
            },
            token: "signed.jwt.token".to_string(),
        }
    }

    #[test]
    fn test_empty_store_is_signed_out() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::open(dir.path());
        assert!(store.current().is_none());
    }

    #[test]
    fn test_session_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let session = sample_session();

        let mut store = CredentialStore::open(dir.path());
        store.set(session.clone()).unwrap();
        assert_eq!(store.current().unwrap().token, session.token);
        drop(store);

        // Simulates a page reload: a fresh store hydrates from disk
        let store = CredentialStore::open(dir.path());
        let current = store.current().expect("session persisted");
        assert_eq!(current.token, session.token);
        assert_eq!(current.user.username, "alice");
    }

    #[test]
    fn test_clear_removes_persisted_session() {
        let dir = TempDir::new().unwrap();

        let mut store = CredentialStore::open(dir.path());
        store.set(sample_session()).unwrap();
        store.clear().unwrap();
        assert!(store.current().is_none());

        let store = CredentialStore::open(dir.path());
        assert!(store.current().is_none());
    }

    #[test]
    fn test_clear_without_session_is_ok() {
        let dir = TempDir::new().unwrap();
        let mut store = CredentialStore::open(dir.path());
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file_degrades_to_signed_out() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), "{not json").unwrap();

        let store = CredentialStore::open(dir.path());
        assert!(store.current().is_none());
    }
}
