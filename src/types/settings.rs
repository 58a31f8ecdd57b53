use serde::{Deserialize, Serialize};

/// Top-level application settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppSettings {
    /// Path of the SQLite database. `None` uses `smartmark.db` in the data directory.
    #[serde(default)]
    pub database_path: Option<String>,
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Synchronization engine settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SyncSettings {
    #[serde(default)]
    pub delete_policy: DeletePolicy,
}

/// What the engine does when a remote delete fails after the entry was
/// already removed locally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Log the failure and keep the entry hidden.
    #[default]
    FireAndForget,
    /// Retry with exponential backoff; restore the entry once attempts run out.
    Retry {
        max_attempts: u32,
        initial_backoff_ms: u64,
        max_backoff_ms: u64,
    },
}

impl DeletePolicy {
    /// A retry policy with the defaults used by `settings.json` templates.
    pub fn default_retry() -> Self {
        DeletePolicy::Retry {
            max_attempts: 4,
            initial_backoff_ms: 250,
            max_backoff_ms: 4_000,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging settings. `RUST_LOG` takes precedence over `filter`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    pub filter: String,
    pub format: LogFormat,
    /// Optional log file; rotated daily.
    pub file: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "smartmark=info".to_string(),
            format: LogFormat::Text,
            file: None,
        }
    }
}
