use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// App installation summary from the org installation discovery endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Installation {
    pub id: u64,
    pub access_tokens_url: String,
}

/// Short-lived installation access token minted from an App JWT.
///
/// Discarded after one run; `Debug` redacts the token itself.
#[derive(Clone, Deserialize)]
pub struct InstallationToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub permissions: TokenPermissions,
    #[serde(default)]
    pub repository_selection: Option<String>,
}

impl fmt::Debug for InstallationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallationToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("permissions", &self.permissions)
            .field("repository_selection", &self.repository_selection)
            .finish()
    }
}

/// Permission grants carried on an installation token.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenPermissions {
    #[serde(default)]
    pub organization_dependabot_secrets: Option<String>,
    #[serde(default)]
    pub dependabot_secrets: Option<String>,
    #[serde(default)]
    pub metadata: Option<String>,
}

/// Org public key for secret encryption, fetched fresh each run.
#[derive(Debug, Clone, Deserialize)]
pub struct OrgPublicKey {
    pub key_id: String,
    /// Standard-base64 X25519 public key.
    pub key: String,
}

/// Request body for the org secret upsert endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EncryptedOrgSecret {
    pub encrypted_value: String,
    pub key_id: String,
    pub visibility: String,
}
