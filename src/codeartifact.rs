use aws_sdk_codeartifact::Client;
use tracing::debug;

use crate::error::CodeArtifactError;
use crate::security::SecureString;

/// Fetches time-boxed CodeArtifact authorization tokens.
pub struct TokenSource {
    client: Client,
    domain: String,
    domain_owner: String,
    duration_seconds: i64,
}

impl TokenSource {
    pub fn new(
        sdk_config: &aws_config::SdkConfig,
        domain: &str,
        domain_owner: &str,
        duration_seconds: i64,
    ) -> Self {
        Self {
            client: Client::new(sdk_config),
            domain: domain.to_string(),
            domain_owner: domain_owner.to_string(),
            duration_seconds,
        }
    }

    /// Request a fresh authorization token with the configured TTL.
    ///
    /// The token is opaque and discarded after one cycle; it only ever lives
    /// in a zeroizing container.
    pub async fn fetch_token(&self) -> Result<SecureString, CodeArtifactError> {
        let output = self
            .client
            .get_authorization_token()
            .domain(&self.domain)
            .domain_owner(&self.domain_owner)
            .duration_seconds(self.duration_seconds)
            .send()
            .await
            .map_err(aws_sdk_codeartifact::Error::from)?;

        let token = output
            .authorization_token()
            .ok_or(CodeArtifactError::MissingToken)?;

        debug!(
            domain = %self.domain,
            expiration = ?output.expiration(),
            "fetched codeartifact authorization token"
        );

        Ok(SecureString::from(token))
    }
}
