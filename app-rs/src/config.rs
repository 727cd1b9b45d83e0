//! App build/runtime configuration.

use std::path::PathBuf;

/// Configuration passed in by the embedding app shell.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Base url of the hosted backend, e.g. "https://api.perch.app".
    pub backend_url: String,
    /// User agent string sent with every backend request.
    pub user_agent: String,
    /// Root directory for app-local data.
    pub app_data_dir: PathBuf,
}

impl AppConfig {
    /// The directory holding the session key-value store.
    pub fn session_dir(&self) -> PathBuf {
        self.app_data_dir.join("session")
    }
}
