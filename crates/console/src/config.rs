use std::path::PathBuf;

/// Default location of the persisted session, relative to the working
/// directory.
pub const DEFAULT_SESSION_FILE: &str = ".modguard-session.json";

/// Settings for the `modguard` binary.
///
/// | Env Var                 | Default                  |
/// |-------------------------|--------------------------|
/// | `MODGUARD_SESSION_FILE` | `.modguard-session.json` |
///
/// Store settings are read through `StoreConfig::from_env` only by commands
/// that reach the store, so login and analyze work without them.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub session_file: PathBuf,
}

impl ConsoleConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let session_file = lookup("MODGUARD_SESSION_FILE")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_FILE.to_string());

        Self {
            session_file: PathBuf::from(session_file),
        }
    }
}
