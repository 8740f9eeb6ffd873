use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info};

use crate::auth::AppTokenMinter;
use crate::error::GitHubError;
use crate::github::types::{EncryptedOrgSecret, Installation, InstallationToken, OrgPublicKey};
use crate::secrets::seal_for_github;
use crate::security::SecureString;

/// Name under which the CodeArtifact token is stored in the organization.
pub const DEPENDABOT_SECRET_NAME: &str = "CodeArtifactSecret";

/// Visibility granted to the upserted secret.
const SECRET_VISIBILITY: &str = "all";

const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const USER_AGENT: &str = concat!("codeartifact-dependabot-rotator/", env!("CARGO_PKG_VERSION"));

/// Result of an org secret upsert, distinguished by response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretUpsertOutcome {
    /// HTTP 201, the secret did not exist before.
    Created,
    /// HTTP 204, an existing secret was overwritten.
    Updated,
}

impl SecretUpsertOutcome {
    /// Map an upsert response status. Anything other than 201/204 is a
    /// failure and yields `None`.
    pub fn from_status(status: StatusCode) -> Option<Self> {
        match status {
            StatusCode::CREATED => Some(Self::Created),
            StatusCode::NO_CONTENT => Some(Self::Updated),
            _ => None,
        }
    }
}

/// GitHub REST client for the App-authenticated secret publish flow.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    minter: AppTokenMinter,
}

impl GitHubClient {
    pub fn new(minter: AppTokenMinter) -> Self {
        Self::with_base_url(minter, GITHUB_API_BASE)
    }

    /// Client against a custom API base (used by tests).
    pub fn with_base_url(minter: AppTokenMinter, base_url: &str) -> Self {
        Self {
            client: Self::create_optimized_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            minter,
        }
    }

    /// Create an optimized HTTP client with connection pooling
    fn create_optimized_client() -> Client {
        Client::builder()
            .pool_max_idle_per_host(5)
            .pool_idle_timeout(Duration::from_secs(30))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .tcp_keepalive(Duration::from_secs(60))
            .user_agent(USER_AGENT)
            .build()
            .expect("failed to create HTTP client")
    }

    /// Discover the App installation for `owner`.
    pub async fn find_org_installation(&self, owner: &str) -> Result<Installation, GitHubError> {
        const ENDPOINT: &str = "find organization installation";

        let jwt = self.minter.mint()?;
        let response = self
            .client
            .get(format!("{}/orgs/{}/installation", self.base_url, owner))
            .bearer_auth(&jwt)
            .header(ACCEPT, GITHUB_ACCEPT)
            .send()
            .await
            .map_err(|source| GitHubError::Request {
                endpoint: ENDPOINT,
                source,
            })?;

        if !response.status().is_success() {
            return Err(GitHubError::UnexpectedStatus {
                endpoint: ENDPOINT,
                status: response.status(),
            });
        }

        response.json().await.map_err(|source| GitHubError::Decode {
            endpoint: ENDPOINT,
            source,
        })
    }

    /// Exchange the App JWT for an installation access token at the
    /// `access_tokens_url` returned by installation discovery.
    pub async fn create_installation_token(
        &self,
        access_tokens_url: &str,
    ) -> Result<InstallationToken, GitHubError> {
        const ENDPOINT: &str = "create installation token";

        let jwt = self.minter.mint()?;
        let response = self
            .client
            .post(access_tokens_url)
            .bearer_auth(&jwt)
            .header(ACCEPT, GITHUB_ACCEPT)
            .send()
            .await
            .map_err(|source| GitHubError::Request {
                endpoint: ENDPOINT,
                source,
            })?;

        if !response.status().is_success() {
            return Err(GitHubError::UnexpectedStatus {
                endpoint: ENDPOINT,
                status: response.status(),
            });
        }

        response.json().await.map_err(|source| GitHubError::Decode {
            endpoint: ENDPOINT,
            source,
        })
    }

    /// Fetch the org Dependabot public key with an installation token.
    /// Never cached; each run seals against a freshly served key.
    pub async fn get_org_public_key(
        &self,
        token: &str,
        org: &str,
    ) -> Result<OrgPublicKey, GitHubError> {
        const ENDPOINT: &str = "get org public key";

        let response = self
            .client
            .get(format!(
                "{}/orgs/{}/dependabot/secrets/public-key",
                self.base_url, org
            ))
            .bearer_auth(token)
            .header(ACCEPT, GITHUB_ACCEPT)
            .send()
            .await
            .map_err(|source| GitHubError::Request {
                endpoint: ENDPOINT,
                source,
            })?;

        if !response.status().is_success() {
            return Err(GitHubError::UnexpectedStatus {
                endpoint: ENDPOINT,
                status: response.status(),
            });
        }

        response.json().await.map_err(|source| GitHubError::Decode {
            endpoint: ENDPOINT,
            source,
        })
    }

    /// Upsert an encrypted org Dependabot secret.
    pub async fn put_org_secret(
        &self,
        token: &str,
        org: &str,
        name: &str,
        secret: &EncryptedOrgSecret,
    ) -> Result<SecretUpsertOutcome, GitHubError> {
        const ENDPOINT: &str = "put org secret";

        let response = self
            .client
            .put(format!(
                "{}/orgs/{}/dependabot/secrets/{}",
                self.base_url, org, name
            ))
            .bearer_auth(token)
            .header(ACCEPT, GITHUB_ACCEPT)
            .json(secret)
            .send()
            .await
            .map_err(|source| GitHubError::Request {
                endpoint: ENDPOINT,
                source,
            })?;

        SecretUpsertOutcome::from_status(response.status()).ok_or(GitHubError::UnexpectedStatus {
            endpoint: ENDPOINT,
            status: response.status(),
        })
    }

    /// Full publish flow: installation discovery, token exchange, public key
    /// fetch, sealing, upsert.
    pub async fn publish_org_secret(
        &self,
        owner: &str,
        org: &str,
        name: &str,
        value: &SecureString,
    ) -> Result<SecretUpsertOutcome, GitHubError> {
        let installation = self.find_org_installation(owner).await?;
        debug!(installation_id = installation.id, "resolved app installation");

        let installation_token = self
            .create_installation_token(&installation.access_tokens_url)
            .await?;
        debug!(expires_at = %installation_token.expires_at, "exchanged app jwt for installation token");

        let public_key = self.get_org_public_key(&installation_token.token, org).await?;

        let encrypted_value = seal_for_github(value.as_str().as_bytes(), &public_key.key)?;
        let secret = EncryptedOrgSecret {
            encrypted_value,
            key_id: public_key.key_id,
            visibility: SECRET_VISIBILITY.to_string(),
        };

        let outcome = self
            .put_org_secret(&installation_token.token, org, name, &secret)
            .await?;

        match outcome {
            SecretUpsertOutcome::Created => info!(secret = name, "created new dependabot secret"),
            SecretUpsertOutcome::Updated => {
                info!(secret = name, "updated existing dependabot secret")
            }
        }

        Ok(outcome)
    }
}
