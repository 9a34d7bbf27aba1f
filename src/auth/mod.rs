//! Authentication: the session lifecycle and credential storage.
//!
//! - `Session` / `SessionStore`: the state machine over "who is logged in"
//!   and the single durable credential record behind it
//! - `CredentialStore`: optional remembered passwords in the OS keychain

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{AuthState, Session, SessionData, SessionStore};
