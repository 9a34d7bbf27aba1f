//! Session lifecycle: who is logged in, and the durable credential record.
//!
//! The record is a single `session.json` holding token and user together,
//! so the pair is written and cleared as a unit - there is no window where
//! one half exists without the other.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::models::UserProfile;

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

/// The persisted credential: bearer token plus the identity it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub user: UserProfile,
}

/// File-backed store for the credential record.
///
/// Cheap to clone; the API client holds its own handle and re-reads the
/// token per request, so a record written or cleared by another process is
/// honored on the next call.
#[derive(Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            path: data_dir.join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record. A record that does not parse is deleted and treated
    /// as absent, so one corrupt write cannot wedge the app at startup.
    pub fn load(&self) -> Result<Option<SessionData>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents =
            std::fs::read_to_string(&self.path).context("Failed to read session file")?;
        match serde_json::from_str::<SessionData>(&contents) {
            Ok(data) => Ok(Some(data)),
            Err(e) => {
                warn!(error = %e, "Discarding unparseable session file");
                self.clear()?;
                Ok(None)
            }
        }
    }

    pub fn save(&self, data: &SessionData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(data)?;
        std::fs::write(&self.path, contents).context("Failed to write session file")?;
        Ok(())
    }

    /// Remove the record. A no-op when it is already gone, so clearing an
    /// already-cleared session (logout after a 401, a late response after
    /// logout) always succeeds.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove session file"),
        }
    }

    /// Current token, read fresh from disk. None on any failure - a request
    /// without a token proceeds unauthenticated rather than erroring here.
    pub fn token(&self) -> Option<String> {
        match self.load() {
            Ok(data) => data.map(|d| d.token),
            Err(e) => {
                warn!(error = %e, "Could not read session for token");
                None
            }
        }
    }
}

/// Authentication state machine.
///
/// `Unknown -(restore)-> Authenticated | Anonymous`;
/// `Anonymous -(login ok | register ok)-> Authenticated`;
/// `Authenticated -(logout | 401 observed)-> Anonymous`.
/// There are no other transitions.
#[derive(Debug, Clone)]
pub enum AuthState {
    Unknown,
    Anonymous,
    Authenticated(SessionData),
}

/// In-memory view of the session, backed by the store.
///
/// `is_authenticated` is true only when a complete record (token and user
/// together) was installed by a successful restore, login, or register.
pub struct Session {
    store: SessionStore,
    state: AuthState,
}

impl Session {
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            state: AuthState::Unknown,
        }
    }

    /// Load the persisted record. Runs once at startup, before any command.
    /// Never fails the caller over a bad record; the store self-heals.
    pub fn restore(&mut self) -> Result<()> {
        self.state = match self.store.load()? {
            Some(data) => {
                debug!(email = %data.user.email, "Restored session");
                AuthState::Authenticated(data)
            }
            None => AuthState::Anonymous,
        };
        Ok(())
    }

    /// Exchange credentials for a session. On failure the state and the
    /// persisted record are left exactly as they were.
    pub async fn login(&mut self, client: &ApiClient, email: &str, password: &str) -> Result<()> {
        let auth = client.login(email, password).await?;
        self.install(SessionData {
            token: auth.token,
            user: auth.user,
        })
    }

    pub async fn register(
        &mut self,
        client: &ApiClient,
        name: &str,
        email: &str,
        password: &str,
        country: &str,
    ) -> Result<()> {
        let auth = client.register(name, email, password, country).await?;
        self.install(SessionData {
            token: auth.token,
            user: auth.user,
        })
    }

    fn install(&mut self, data: SessionData) -> Result<()> {
        self.store
            .save(&data)
            .context("Failed to persist session")?;
        self.state = AuthState::Authenticated(data);
        Ok(())
    }

    /// Clear the record and go anonymous. Unconditional and idempotent;
    /// never calls the backend.
    pub fn logout(&mut self) -> Result<()> {
        self.store.clear()?;
        self.state = AuthState::Anonymous;
        Ok(())
    }

    /// React to a 401 observed by a caller. The store was already cleared
    /// by the client; only the in-memory state moves.
    pub fn expire(&mut self) {
        self.state = AuthState::Anonymous;
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::Authenticated(_))
    }

    pub fn user(&self) -> Option<&UserProfile> {
        match &self.state {
            AuthState::Authenticated(data) => Some(&data.user),
            _ => None,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::new(dir.path().to_path_buf())
    }

    #[test]
    fn test_store_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let data = SessionData {
            token: "abc".to_string(),
            user: UserProfile {
                id: "1".to_string(),
                name: "A".to_string(),
                email: "a@x.com".to_string(),
                country: None,
            },
        };
        store.save(&data).expect("save");
        let loaded = store.load().expect("load").expect("record present");
        assert_eq!(loaded.token, "abc");
        assert_eq!(loaded.user.name, "A");
    }

    #[test]
    fn test_restore_with_valid_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            r#"{"token":"abc","user":{"_id":"1","name":"A","email":"a@x.com"}}"#,
        )
        .expect("seed record");

        let mut session = Session::new(store);
        session.restore().expect("restore");
        assert!(session.is_authenticated());
        assert_eq!(session.user().expect("user").name, "A");
    }

    #[test]
    fn test_restore_heals_corrupt_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        std::fs::write(store.path(), "not json{").expect("seed garbage");

        let mut session = Session::new(store.clone());
        session.restore().expect("restore must not fail on corrupt data");
        assert!(!session.is_authenticated());
        assert!(!store.path().exists(), "corrupt record should be deleted");
    }

    #[test]
    fn test_restore_with_no_record_is_anonymous() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = Session::new(store_in(&dir));
        session.restore().expect("restore");
        assert!(!session.is_authenticated());
        assert!(matches!(session.state(), AuthState::Anonymous));
    }

    #[test]
    fn test_logout_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let data = SessionData {
            token: "abc".to_string(),
            user: UserProfile {
                id: "1".to_string(),
                name: "A".to_string(),
                email: "a@x.com".to_string(),
                country: None,
            },
        };
        store.save(&data).expect("save");

        let mut session = Session::new(store.clone());
        session.restore().expect("restore");
        assert!(session.is_authenticated());

        session.logout().expect("first logout");
        session.logout().expect("second logout must also succeed");
        assert!(!session.is_authenticated());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_clear_when_already_clear_is_noop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        store.clear().expect("clear on empty store");
        store.clear().expect("clear twice");
        assert!(store.token().is_none());
    }
}
