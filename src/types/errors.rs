use thiserror::Error;

// === SyncError ===

/// Errors surfaced by the synchronization engine to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Title or URL was blank after trimming. No remote call was made.
    #[error("{0}")]
    Validation(String),
    /// The remote store rejected or failed the request.
    #[error("{0}")]
    Remote(String),
    /// No user is signed in.
    #[error("You must be signed in to manage bookmarks.")]
    NotSignedIn,
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SignedOut => SyncError::NotSignedIn,
            other => SyncError::Remote(other.message().to_string()),
        }
    }
}

// === StoreError ===

/// Errors returned by a `RemoteStore` implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Storage operation failed.
    #[error("Store database error: {0}")]
    Database(String),
    /// The current session may not perform the operation.
    #[error("Store authorization error: {0}")]
    Unauthorized(String),
    /// The change feed could not be established.
    #[error("Store subscription error: {0}")]
    Subscription(String),
    /// The session has no signed-in user.
    #[error("Store authorization error: not signed in")]
    SignedOut,
}

impl StoreError {
    /// The bare message, without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            StoreError::Database(msg)
            | StoreError::Unauthorized(msg)
            | StoreError::Subscription(msg) => msg,
            StoreError::SignedOut => "not signed in",
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}
