use secrecy::SecretString;

use crate::error::StoreError;

/// Default name of the hosted table holding moderation requests.
pub const DEFAULT_TABLE: &str = "request_data";

/// Connection settings for the hosted request store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Anonymous (publishable) API key, sent as `apikey` and bearer token.
    pub api_key: SecretString,
    /// Table name (default: `request_data`).
    pub table: String,
    /// Per-request timeout. `None` leaves requests unbounded.
    pub timeout_secs: Option<u64>,
    /// Whether updates carry a `version` precondition (default: `true`).
    pub optimistic_locking: bool,
}

impl StoreConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            api_key: SecretString::from(api_key.into()),
            table: DEFAULT_TABLE.to_string(),
            timeout_secs: None,
            optimistic_locking: true,
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var                       | Default        |
    /// |-------------------------------|----------------|
    /// | `SUPABASE_URL`                | required       |
    /// | `SUPABASE_ANON_KEY`           | required       |
    /// | `MODGUARD_REQUEST_TABLE`      | `request_data` |
    /// | `MODGUARD_STORE_TIMEOUT_SECS` | unset          |
    /// | `MODGUARD_OPTIMISTIC_LOCKING` | `true`         |
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StoreError> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| StoreError::Config(format!("{key} must be set")))
        };

        let mut config = Self::new(required("SUPABASE_URL")?, required("SUPABASE_ANON_KEY")?);

        if let Some(table) = lookup("MODGUARD_REQUEST_TABLE").filter(|t| !t.is_empty()) {
            config = config.with_table(table);
        }

        if let Some(raw) = lookup("MODGUARD_STORE_TIMEOUT_SECS") {
            let secs = raw.parse::<u64>().map_err(|_| {
                StoreError::Config(format!(
                    "MODGUARD_STORE_TIMEOUT_SECS must be a valid u64, got '{raw}'"
                ))
            })?;
            config = config.with_timeout_secs(secs);
        }

        if let Some(raw) = lookup("MODGUARD_OPTIMISTIC_LOCKING") {
            config.optimistic_locking = match raw.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(StoreError::Config(format!(
                        "MODGUARD_OPTIMISTIC_LOCKING must be a boolean, got '{raw}'"
                    )))
                }
            };
        }

        Ok(config)
    }
}
