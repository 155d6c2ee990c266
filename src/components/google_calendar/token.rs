use super::auth::AuthOutcome;
use crate::config::Config;
use crate::error::{auth_error, BotResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// OAuth token material for calendar access
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiry in milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expiry_date", &self.expiry_date)
            .field("scope", &self.scope)
            .field("token_type", &self.token_type)
            .field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Token endpoint response body
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
    pub id_token: Option<String>,
}

impl Credential {
    /// Parse a credential from its JSON form
    pub fn from_json(raw: &str) -> BotResult<Self> {
        let credential: Credential = serde_json::from_str(raw.trim())?;
        if credential.access_token.is_empty() {
            return Err(auth_error("Token has an empty access_token"));
        }
        Ok(credential)
    }

    /// Build a credential from a token endpoint response received at `now`
    pub fn from_token_response(response: TokenResponse, now: DateTime<Utc>) -> BotResult<Self> {
        let access_token = response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| auth_error("Token response missing 'access_token' field"))?;

        let expiry_date = response
            .expires_in
            .map(|secs| (now + Duration::seconds(secs)).timestamp_millis());

        Ok(Self {
            access_token,
            refresh_token: response.refresh_token,
            expiry_date,
            scope: response.scope,
            token_type: response.token_type,
            id_token: response.id_token,
        })
    }

    /// Expiry as a timestamp, if the provider reported one
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expiry_date.and_then(DateTime::from_timestamp_millis)
    }

    /// Whether the reported expiry lies at or before `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map(|at| at <= now).unwrap_or(false)
    }
}

/// Reads and writes the single persisted credential
#[derive(Debug, Clone)]
pub struct CredentialStore {
    env_token: Option<String>,
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(env_token: Option<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            env_token,
            path: path.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.google_token.clone(), config.token_path.clone())
    }

    /// Load the credential from the environment value, else from the token file
    pub async fn load(&self) -> AuthOutcome {
        let (source, raw) = match &self.env_token {
            Some(raw) => ("GOOGLE_TOKEN", raw.clone()),
            None => match tokio::fs::read_to_string(&self.path).await {
                Ok(raw) => ("token file", raw),
                Err(e) => {
                    debug!("No token at {}: {}", self.path.display(), e);
                    return AuthOutcome::CredentialMissing;
                }
            },
        };

        match Credential::from_json(&raw) {
            Ok(credential) => {
                if credential.is_expired_at(Utc::now()) {
                    // Reused anyway, refreshing is not supported
                    warn!(
                        "Stored credential from {} expired at {:?}",
                        source,
                        credential.expires_at()
                    );
                }
                info!("Using saved tokens from {}", source);
                AuthOutcome::CredentialFound(credential)
            }
            Err(e) => {
                warn!("Ignoring unreadable token from {}: {}", source, e);
                AuthOutcome::CredentialMissing
            }
        }
    }

    /// Persist the credential, overwriting any previous content
    pub async fn save(&self, credential: &Credential) -> BotResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string(credential)?;
        tokio::fs::write(&self.path, json).await?;
        info!("Tokens saved to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const TOKEN_JSON: &str = r#"{
        "access_token": "ya29.test",
        "refresh_token": "1//refresh",
        "scope": "https://www.googleapis.com/auth/calendar.readonly",
        "token_type": "Bearer",
        "expiry_date": 1718000000000
    }"#;

    #[test]
    fn test_credential_from_json() {
        let credential = Credential::from_json(TOKEN_JSON).unwrap();
        assert_eq!(credential.access_token, "ya29.test");
        assert_eq!(credential.refresh_token.as_deref(), Some("1//refresh"));
        assert_eq!(credential.expiry_date, Some(1_718_000_000_000));
    }

    #[test]
    fn test_credential_rejects_missing_access_token() {
        assert!(Credential::from_json(r#"{"refresh_token": "x"}"#).is_err());
        assert!(Credential::from_json(r#"{"access_token": ""}"#).is_err());
        assert!(Credential::from_json("not json").is_err());
    }

    #[test]
    fn test_from_token_response_computes_expiry() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 7, 0, 0).unwrap();
        let response = TokenResponse {
            access_token: Some("abc".to_string()),
            refresh_token: Some("def".to_string()),
            expires_in: Some(3599),
            scope: Some("scope".to_string()),
            token_type: Some("Bearer".to_string()),
            id_token: None,
        };

        let credential = Credential::from_token_response(response, now).unwrap();
        assert_eq!(credential.expires_at(), Some(now + Duration::seconds(3599)));
        assert!(!credential.is_expired_at(now));
        assert!(credential.is_expired_at(now + Duration::hours(1)));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let credential = Credential::from_json(TOKEN_JSON).unwrap();
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("ya29.test"));
        assert!(!debug.contains("1//refresh"));
    }

    #[test]
    fn test_debug_shows_id_token_redacted() {
        let mut credential = Credential::from_json(TOKEN_JSON).unwrap();
        assert!(format!("{:?}", credential).contains("id_token: None"));

        credential.id_token = Some("eyJhbGciOi.secret".to_string());
        let debug = format!("{:?}", credential);
        assert!(debug.contains("id_token: Some(\"<redacted>\")"));
        assert!(!debug.contains("eyJhbGciOi.secret"));
    }

    #[tokio::test]
    async fn test_load_prefers_environment_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        tokio::fs::write(&path, r#"{"access_token":"from-file"}"#).await.unwrap();

        let store = CredentialStore::new(Some(r#"{"access_token":"from-env"}"#.to_string()), &path);
        match store.load().await {
            AuthOutcome::CredentialFound(credential) => assert_eq!(credential.access_token, "from-env"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        tokio::fs::write(&path, TOKEN_JSON).await.unwrap();

        let store = CredentialStore::new(None, &path);
        assert!(matches!(store.load().await, AuthOutcome::CredentialFound(_)));
    }

    #[tokio::test]
    async fn test_load_missing_or_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");

        let store = CredentialStore::new(None, &path);
        assert!(matches!(store.load().await, AuthOutcome::CredentialMissing));

        tokio::fs::write(&path, "{ broken").await.unwrap();
        assert!(matches!(store.load().await, AuthOutcome::CredentialMissing));

        let store = CredentialStore::new(Some("garbage".to_string()), &path);
        assert!(matches!(store.load().await, AuthOutcome::CredentialMissing));
    }

    #[tokio::test]
    async fn test_expired_credential_is_still_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        tokio::fs::write(&path, r#"{"access_token":"old","expiry_date":1000}"#)
            .await
            .unwrap();

        let store = CredentialStore::new(None, &path);
        assert!(matches!(store.load().await, AuthOutcome::CredentialFound(_)));
    }

    #[tokio::test]
    async fn test_save_overwrites_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("token.json");
        let store = CredentialStore::new(None, &path);

        let first = Credential::from_json(r#"{"access_token":"first"}"#).unwrap();
        store.save(&first).await.unwrap();

        let second = Credential::from_json(TOKEN_JSON).unwrap();
        store.save(&second).await.unwrap();

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(Credential::from_json(&raw).unwrap(), second);
    }
}
