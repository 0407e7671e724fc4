//! Per-user local state: theme, fallback credential and profile.
//!
//! A single pretty-printed JSON file. It is the only place a client-side
//! credential is kept, and is read only when the backend cannot be reached.

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    config::{ConfigError, Credential, Provider},
    types::UserProfile,
};

/// File name inside the data directory.
pub const LOCAL_STATE_FILE: &str = "scholarai.json";

/// UI colour theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ConfigError::InvalidValue {
                field: "theme".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Credential kept for direct provider calls.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalCredential {
    pub provider: Provider,
    pub key: String,
}

impl LocalCredential {
    pub fn new(provider: Provider, key: impl Into<String>) -> Self {
        Self {
            provider,
            key: key.into(),
        }
    }

    pub fn credential(&self) -> Credential {
        Credential::new(self.key.clone())
    }
}

impl fmt::Debug for LocalCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalCredential")
            .field("provider", &self.provider)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Everything persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalState {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<LocalCredential>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
}

/// JSON file holding [`LocalState`].
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// Store at an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store named [`LOCAL_STATE_FILE`] inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(LOCAL_STATE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the state. A missing file is the default state.
    pub async fn load(&self) -> Result<LocalState> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(LocalState::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn save(&self, state: &LocalState) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(state)?;
        tokio::fs::write(&self.path, json).await?;
        tracing::debug!(path = %self.path.display(), "Saved local state");
        Ok(())
    }

    /// Load, apply `f`, save. Returns the updated state.
    pub async fn update<F>(&self, f: F) -> Result<LocalState>
    where
        F: FnOnce(&mut LocalState),
    {
        let mut state = self.load().await?;
        f(&mut state);
        self.save(&state).await?;
        Ok(state)
    }

    pub async fn credential(&self) -> Result<Option<LocalCredential>> {
        Ok(self.load().await?.credential)
    }

    pub async fn set_credential(&self, credential: LocalCredential) -> Result<()> {
        self.update(|state| state.credential = Some(credential))
            .await
            .map(|_| ())
    }

    pub async fn clear_credential(&self) -> Result<()> {
        self.update(|state| state.credential = None).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::in_dir(dir.path());
        assert_eq!(store.load().await.unwrap(), LocalState::default());
        assert_eq!(store.credential().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_credential_roundtrip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::in_dir(dir.path().join("nested"));
        store
            .set_credential(LocalCredential::new(Provider::Google, "local-key"))
            .await
            .unwrap();
        store.update(|s| s.theme = Theme::Dark).await.unwrap();

        let state = store.load().await.unwrap();
        assert_eq!(state.theme, Theme::Dark);
        assert_eq!(state.credential.as_ref().unwrap().key, "local-key");

        store.clear_credential().await.unwrap();
        let state = store.load().await.unwrap();
        assert!(state.credential.is_none());
        assert_eq!(state.theme, Theme::Dark);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::in_dir(dir.path());
        tokio::fs::write(store.path(), "not json").await.unwrap();
        let err = store.load().await.unwrap_err();
        assert!(!err.is_io_error());
    }

    #[tokio::test]
    async fn test_unreadable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let err = store.load().await.unwrap_err();
        assert!(err.is_io_error());
    }

    #[test]
    fn test_debug_redacts_key() {
        let credential = LocalCredential::new(Provider::OpenRouter, "sk-secret");
        assert!(!format!("{credential:?}").contains("sk-secret"));
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("blue".parse::<Theme>().is_err());
    }
}
