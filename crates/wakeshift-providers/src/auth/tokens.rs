//! OAuth token persistence.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};

/// Seconds shaved off the advertised lifetime so a token is refreshed
/// before the server starts rejecting it.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Information about an OAuth token set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// The access token for API requests.
    pub access_token: String,

    /// The refresh token for obtaining new access tokens.
    pub refresh_token: Option<String>,

    /// When the access token expires.
    pub expires_at: Option<DateTime<Utc>>,

    /// The OAuth scopes that were granted.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// When the tokens were last refreshed.
    pub last_refresh: DateTime<Utc>,
}

fn expiry_from(expires_in_secs: Option<i64>) -> Option<DateTime<Utc>> {
    expires_in_secs.map(|secs| Utc::now() + Duration::seconds(secs - EXPIRY_MARGIN_SECS))
}

impl TokenInfo {
    /// Creates a new token info from OAuth response data.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at: expiry_from(expires_in_secs),
            scopes,
            last_refresh: Utc::now(),
        }
    }

    /// Returns true if the access token is expired or about to expire.
    ///
    /// Tokens without a known expiry are treated as valid.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|expires_at| Utc::now() >= expires_at)
    }

    /// Returns true if the token has the required scopes.
    pub fn has_scopes(&self, required: &[String]) -> bool {
        required.iter().all(|scope| self.scopes.contains(scope))
    }

    /// Applies the result of a refresh.
    ///
    /// Some servers rotate the refresh token and some do not; when the
    /// response carries none the previous one is kept.
    pub fn apply_refresh(
        &mut self,
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
    ) {
        self.access_token = access_token.into();
        if refresh_token.is_some() {
            self.refresh_token = refresh_token;
        }
        self.expires_at = expiry_from(expires_in_secs);
        self.last_refresh = Utc::now();
    }
}

/// File-backed token storage with an in-memory copy.
///
/// Tokens are stored as pretty JSON, written through a temp file and
/// renamed into place, and restricted to the owner on Unix.
#[derive(Debug)]
pub struct TokenStorage {
    path: PathBuf,
    tokens: RwLock<Option<TokenInfo>>,
}

impl TokenStorage {
    /// Creates a new token storage at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tokens: RwLock::new(None),
        }
    }

    /// Creates a storage and loads whatever is on disk.
    pub fn open(path: impl Into<PathBuf>) -> ProviderResult<Self> {
        let storage = Self::new(path);
        storage.load()?;
        Ok(storage)
    }

    /// Loads tokens from disk into memory.
    ///
    /// Returns Ok(true) if tokens were loaded, Ok(false) if no tokens exist.
    pub fn load(&self) -> ProviderResult<bool> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no token file");
            return Ok(false);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            ProviderError::configuration(format!("failed to read token file: {e}"))
        })?;

        let tokens: TokenInfo = serde_json::from_str(&content).map_err(|e| {
            ProviderError::configuration(format!("failed to parse token file: {e}"))
        })?;

        debug!(path = %self.path.display(), "loaded tokens");
        *self.tokens.write().unwrap_or_else(PoisonError::into_inner) = Some(tokens);
        Ok(true)
    }

    fn save(&self, tokens: &TokenInfo) -> ProviderResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ProviderError::configuration(format!("failed to create token directory: {e}"))
            })?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(tokens)
            .map_err(|e| ProviderError::internal(format!("failed to serialize tokens: {e}")))?;

        fs::write(&temp_path, &content)
            .map_err(|e| ProviderError::internal(format!("failed to write token file: {e}")))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600));
        }

        fs::rename(&temp_path, &self.path)
            .map_err(|e| ProviderError::internal(format!("failed to rename token file: {e}")))?;

        debug!(path = %self.path.display(), "saved tokens");
        Ok(())
    }

    /// Returns a clone of the current tokens, if any.
    pub fn get(&self) -> Option<TokenInfo> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the tokens and saves them to disk.
    pub fn set(&self, tokens: TokenInfo) -> ProviderResult<()> {
        self.save(&tokens)?;
        *self.tokens.write().unwrap_or_else(PoisonError::into_inner) = Some(tokens);
        Ok(())
    }

    /// Applies a refresh result to the stored tokens and saves them.
    pub fn apply_refresh(
        &self,
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
    ) -> ProviderResult<TokenInfo> {
        let mut tokens = self
            .get()
            .ok_or_else(|| ProviderError::internal("no tokens to update"))?;
        tokens.apply_refresh(access_token, refresh_token, expires_in_secs);
        self.set(tokens.clone())?;
        info!(path = %self.path.display(), "refreshed access token");
        Ok(tokens)
    }

    /// Returns the token storage path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the stored tokens lack any of the required scopes.
    pub fn needs_reauth(&self, required_scopes: &[String]) -> bool {
        self.get()
            .is_none_or(|tokens| !tokens.has_scopes(required_scopes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scopes(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fresh_token_is_not_expired() {
        let token = TokenInfo::new("access", Some("refresh".into()), Some(3600), vec![]);
        assert!(token.expires_at.is_some());
        assert!(!token.is_expired());
    }

    #[test]
    fn token_expires_inside_margin() {
        let token = TokenInfo::new("access", None, Some(30), vec![]);
        assert!(token.is_expired());

        let mut token = TokenInfo::new("access", None, Some(3600), vec![]);
        token.expires_at = Some(Utc::now() - Duration::hours(1));
        assert!(token.is_expired());
    }

    #[test]
    fn no_expiry_means_valid() {
        let token = TokenInfo::new("access", None, None, vec![]);
        assert!(!token.is_expired());
    }

    #[test]
    fn refresh_keeps_previous_refresh_token() {
        let mut token = TokenInfo::new("old", Some("keep-me".into()), Some(10), vec![]);
        token.apply_refresh("new", None, Some(3600));
        assert_eq!(token.access_token, "new");
        assert_eq!(token.refresh_token.as_deref(), Some("keep-me"));
        assert!(!token.is_expired());

        token.apply_refresh("newer", Some("rotated".into()), Some(3600));
        assert_eq!(token.refresh_token.as_deref(), Some("rotated"));
    }

    #[test]
    fn storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("oura-tokens.json");

        let storage = TokenStorage::new(&path);
        let token = TokenInfo::new("access", Some("refresh".into()), Some(3600), scopes(&["daily"]));
        storage.set(token.clone()).unwrap();
        assert!(path.exists());

        let reopened = TokenStorage::open(&path).unwrap();
        assert_eq!(reopened.get(), Some(token));
    }

    #[cfg(unix)]
    #[test]
    fn storage_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        TokenStorage::new(&path)
            .set(TokenInfo::new("a", None, None, vec![]))
            .unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn storage_apply_refresh_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        let storage = TokenStorage::new(&path);
        storage
            .set(TokenInfo::new("old", Some("refresh".into()), Some(10), vec![]))
            .unwrap();

        storage.apply_refresh("new", None, Some(3600)).unwrap();

        let reopened = TokenStorage::open(&path).unwrap().get().unwrap();
        assert_eq!(reopened.access_token, "new");
        assert_eq!(reopened.refresh_token.as_deref(), Some("refresh"));
    }

    #[test]
    fn apply_refresh_without_tokens_fails() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TokenStorage::new(dir.path().join("tokens.json"));
        assert!(storage.apply_refresh("new", None, None).is_err());
    }

    #[test]
    fn missing_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TokenStorage::new(dir.path().join("absent.json"));
        assert!(!storage.load().unwrap());
        assert!(storage.get().is_none());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        fs::write(&path, "not json").unwrap();
        assert!(TokenStorage::open(&path).is_err());
    }

    #[test]
    fn needs_reauth_on_missing_scope() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TokenStorage::new(dir.path().join("tokens.json"));
        assert!(storage.needs_reauth(&scopes(&["calendar"])));

        storage
            .set(TokenInfo::new("a", None, None, scopes(&["calendar"])))
            .unwrap();
        assert!(!storage.needs_reauth(&scopes(&["calendar"])));
        assert!(storage.needs_reauth(&scopes(&["calendar", "sleep"])));
    }
}
