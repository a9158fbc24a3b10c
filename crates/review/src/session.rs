//! Reviewer identity and the session cache.
//!
//! A [`Session`] is an explicit value handed to every protected component at
//! construction time. [`SessionCache`] owns the sign-in state behind it and
//! is initialized and torn down only through `login`/`signup`/`logout`.
//! Credentials are checked locally; the hosted identity provider is not
//! consulted.

use std::path::PathBuf;
use std::sync::{OnceLock, PoisonError, RwLock};

use chrono::Utc;
use modguard_core::error::CoreError;
use modguard_core::types::Timestamp;
use rand::Rng;
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

const USER_ID_PREFIX: &str = "user-";
const USER_ID_SUFFIX_LEN: usize = 7;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

static GLOBAL: OnceLock<SessionCache> = OnceLock::new();

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Pro,
    Enterprise,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub plan: Plan,
}

/// A signed-in reviewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub started_at: Timestamp,
}

impl Session {
    pub fn new(user: User) -> Self {
        Self {
            user,
            started_at: Utc::now(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("A global session cache is already installed")]
    AlreadyInstalled,
}

// ---------------------------------------------------------------------------
// SessionCache
// ---------------------------------------------------------------------------

/// Holder of the current session, optionally mirrored to a JSON file.
#[derive(Debug, Default)]
pub struct SessionCache {
    current: RwLock<Option<Session>>,
    path: Option<PathBuf>,
}

impl SessionCache {
    /// In-memory cache; nothing survives the process.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache mirrored to `path`. Call [`restore`](Self::restore) to pick up
    /// a session saved by an earlier run.
    pub fn with_persistence(path: impl Into<PathBuf>) -> Self {
        Self {
            current: RwLock::new(None),
            path: Some(path.into()),
        }
    }

    /// Install `cache` as the process-wide instance.
    pub fn install(cache: SessionCache) -> Result<&'static SessionCache, SessionError> {
        GLOBAL
            .set(cache)
            .map_err(|_| SessionError::AlreadyInstalled)?;
        Ok(Self::global())
    }

    /// The process-wide instance, in-memory unless one was installed.
    pub fn global() -> &'static SessionCache {
        GLOBAL.get_or_init(SessionCache::new)
    }

    /// Load a previously persisted session, if any.
    pub fn restore(&self) -> Result<Option<Session>, SessionError> {
        let Some(path) = &self.path else {
            return Ok(self.current());
        };

        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let session: Session = serde_json::from_str(&raw)?;
        tracing::debug!(user_id = %session.user.id, "Restored session");
        self.set(Some(session.clone()));
        Ok(Some(session))
    }

    /// Sign in with an email and password.
    pub fn login(&self, email: &str, password: &str) -> Result<Session, SessionError> {
        validate_email(email)?;
        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(CoreError::Unauthorized("Invalid credentials".to_string()).into());
        }

        let name = email.split('@').next().unwrap_or(email).to_string();
        self.start(email, name)
    }

    /// Register and sign in.
    pub fn signup(&self, name: &str, email: &str, password: &str) -> Result<Session, SessionError> {
        validate_email(email)?;
        if name.trim().is_empty() {
            return Err(CoreError::Validation("Name must not be empty".to_string()).into());
        }
        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(CoreError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            ))
            .into());
        }

        self.start(email, name.trim().to_string())
    }

    /// Sign out and forget any persisted session.
    pub fn logout(&self) -> Result<(), SessionError> {
        if let Some(session) = self.current() {
            tracing::info!(user_id = %session.user.id, "Signed out");
        }
        self.set(None);

        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    /// The current session, or `Unauthorized` when signed out.
    pub fn require(&self) -> Result<Session, SessionError> {
        self.current()
            .ok_or_else(|| CoreError::Unauthorized("Not signed in".to_string()).into())
    }

    fn start(&self, email: &str, name: String) -> Result<Session, SessionError> {
        let session = Session::new(User {
            id: generate_user_id(),
            email: email.to_string(),
            name,
            plan: Plan::Free,
        });

        if let Some(path) = &self.path {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, serde_json::to_string_pretty(&session)?)?;
        }

        self.set(Some(session.clone()));
        tracing::info!(user_id = %session.user.id, email = %session.user.email, "Signed in");
        Ok(session)
    }

    fn set(&self, session: Option<Session>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = session;
    }
}

fn validate_email(email: &str) -> Result<(), CoreError> {
    if email.validate_email() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("Invalid email address '{email}'")))
    }
}

fn generate_user_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..USER_ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    format!("{USER_ID_PREFIX}{suffix}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
