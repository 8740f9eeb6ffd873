//! One credential-rotation cycle and the fixed-interval scheduler.

use std::future::Future;
use std::time::Duration;
use tracing::{error, info};

use crate::codeartifact::TokenSource;
use crate::error::AppError;
use crate::github::{GitHubClient, DEPENDABOT_SECRET_NAME};
use crate::metrics::MetricsRecorder;

/// Fixed pause between rotation cycles.
pub const ROTATION_INTERVAL: Duration = Duration::from_secs(10 * 60 * 60);

/// Drives the fetch-seal-publish pipeline.
pub struct Rotator {
    tokens: TokenSource,
    github: GitHubClient,
    organization: String,
    organization_owner: String,
    metrics: MetricsRecorder,
}

impl Rotator {
    pub fn new(
        tokens: TokenSource,
        github: GitHubClient,
        organization: String,
        organization_owner: String,
        metrics: MetricsRecorder,
    ) -> Self {
        Self {
            tokens,
            github,
            organization,
            organization_owner,
            metrics,
        }
    }

    /// Run a single rotation cycle.
    ///
    /// Two error tiers: a CodeArtifact failure is fatal and propagates out,
    /// while GitHub-side failures are logged and the cycle skipped. The next
    /// scheduled run is the retry mechanism.
    pub async fn run_once(&self) -> Result<(), AppError> {
        let token = self.tokens.fetch_token().await?;

        match self
            .github
            .publish_org_secret(
                &self.organization_owner,
                &self.organization,
                DEPENDABOT_SECRET_NAME,
                &token,
            )
            .await
        {
            Ok(_) => self.metrics.record_rotation(true),
            Err(e) => {
                error!(error = %e, "publishing dependabot secret failed, next cycle will retry");
                self.metrics.record_rotation(false);
            }
        }

        Ok(())
    }

    /// Run one cycle immediately, then every [`ROTATION_INTERVAL`] until
    /// `shutdown` resolves.
    ///
    /// Shutdown takes effect between cycles; an in-flight cycle always runs
    /// to completion.
    pub async fn run_forever(&self, shutdown: impl Future<Output = ()>) -> Result<(), AppError> {
        tokio::pin!(shutdown);

        let mut ticker = tokio::time::interval(ROTATION_INTERVAL);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.run_once().await?,
                _ = &mut shutdown => {
                    info!("shutdown signal received, stopping rotation loop");
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{jwt::test_rsa_pem, AppTokenMinter};
    use aws_config::BehaviorVersion;

    fn offline_rotator() -> Rotator {
        // SdkConfig without region or credentials: the first CodeArtifact
        // call fails deterministically before reaching the network.
        let sdk_config = aws_config::SdkConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .build();
        let tokens = TokenSource::new(&sdk_config, "domain", "123456789012", 3600);

        let minter = AppTokenMinter::new("12345", &test_rsa_pem()).unwrap();
        let github = GitHubClient::new(minter);

        Rotator::new(
            tokens,
            github,
            "acme".to_string(),
            "acme".to_string(),
            MetricsRecorder::new(),
        )
    }

    #[tokio::test]
    async fn test_codeartifact_failure_is_fatal() {
        let rotator = offline_rotator();
        let result = rotator.run_once().await;
        assert!(matches!(result, Err(AppError::CodeArtifact(_))));
    }

    #[tokio::test]
    async fn test_run_forever_propagates_fatal_tier() {
        let rotator = offline_rotator();
        // First tick fires immediately; the failing cycle must abort the loop
        // rather than being swallowed.
        let result = rotator.run_forever(std::future::pending()).await;
        assert!(matches!(result, Err(AppError::CodeArtifact(_))));
    }
}
