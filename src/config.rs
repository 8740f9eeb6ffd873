use clap::Parser;
use jsonwebtoken::EncodingKey;
use std::fmt;
use std::net::SocketAddr;

use crate::error::ConfigError;

/// Lower bound GetAuthorizationToken accepts for a non-zero duration.
const MIN_TOKEN_DURATION_SECS: i64 = 900;
/// Upper bound GetAuthorizationToken accepts (12 hours).
const MAX_TOKEN_DURATION_SECS: i64 = 43_200;

/// Default listen address for the Prometheus exposition endpoint.
const DEFAULT_METRICS_ADDR: &str = "0.0.0.0:8701";

/// Runtime settings, sourced from flags with environment-variable fallbacks.
#[derive(Clone, Parser)]
#[command(
    name = "codeartifact-dependabot-rotator",
    about = "Publishes short-lived AWS CodeArtifact tokens as GitHub org Dependabot secrets",
    version
)]
pub struct Settings {
    /// GitHub organization that receives the Dependabot secret
    #[arg(long = "dependabot-org", env = "DEPENDABOT_ORG")]
    pub organization: String,

    /// PEM-encoded RSA private key of the GitHub App
    #[arg(
        long = "github-private-key",
        env = "GITHUB_PRIVATE_KEY",
        hide_env_values = true
    )]
    pub github_private_key: String,

    /// ID of the GitHub App used for authentication
    #[arg(long = "github-app-id", env = "GITHUB_APP_ID")]
    pub github_app_id: String,

    /// Owner of the GitHub organization installation
    #[arg(long = "dependabot-owner", env = "DEPENDABOT_OWNER")]
    pub organization_owner: String,

    /// Requested CodeArtifact token lifetime in seconds (0, or 900-43200)
    #[arg(long = "codeartifact-duration", env = "CODEARTIFACT_DURATION")]
    pub token_duration: i64,

    /// CodeArtifact domain to authorize against
    #[arg(long = "codeartifact-domain", env = "CODEARTIFACT_DOMAIN")]
    pub codeartifact_domain: String,

    /// AWS account that owns the CodeArtifact domain
    #[arg(long = "codeartifact-domain-owner", env = "CODEARTIFACT_DOMAIN_OWNER")]
    pub codeartifact_domain_owner: String,

    /// Listen address for the Prometheus exposition endpoint
    #[arg(
        long = "metrics-addr",
        env = "METRICS_ADDR",
        default_value = DEFAULT_METRICS_ADDR
    )]
    pub metrics_addr: String,
}

impl Settings {
    /// Validate every setting before anything touches the network.
    ///
    /// Flags sourced from environment variables can be present but empty, so
    /// presence alone is not enough.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require("DEPENDABOT_ORG", &self.organization)?;
        Self::require("DEPENDABOT_OWNER", &self.organization_owner)?;
        Self::require("GITHUB_APP_ID", &self.github_app_id)?;
        Self::require("GITHUB_PRIVATE_KEY", &self.github_private_key)?;
        Self::require("CODEARTIFACT_DOMAIN", &self.codeartifact_domain)?;
        Self::require("CODEARTIFACT_DOMAIN_OWNER", &self.codeartifact_domain_owner)?;

        if self.github_app_id.parse::<u64>().is_err() {
            return Err(ConfigError::InvalidAppId {
                value: self.github_app_id.clone(),
            });
        }

        // CodeArtifact accepts 0 (credential lifetime) or 900-43200 seconds.
        if self.token_duration != 0
            && !(MIN_TOKEN_DURATION_SECS..=MAX_TOKEN_DURATION_SECS).contains(&self.token_duration)
        {
            return Err(ConfigError::InvalidDuration {
                value: self.token_duration,
                reason: format!(
                    "must be 0 or between {MIN_TOKEN_DURATION_SECS} and {MAX_TOKEN_DURATION_SECS} seconds"
                ),
            });
        }

        EncodingKey::from_rsa_pem(self.github_private_key.as_bytes())
            .map_err(ConfigError::InvalidPrivateKey)?;

        self.metrics_addr
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidMetricsAddr {
                value: self.metrics_addr.clone(),
            })?;

        Ok(())
    }

    fn require(name: &'static str, value: &str) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingValue { name });
        }
        Ok(())
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("organization", &self.organization)
            .field("github_private_key", &"<redacted>")
            .field("github_app_id", &self.github_app_id)
            .field("organization_owner", &self.organization_owner)
            .field("token_duration", &self.token_duration)
            .field("codeartifact_domain", &self.codeartifact_domain)
            .field("codeartifact_domain_owner", &self.codeartifact_domain_owner)
            .field("metrics_addr", &self.metrics_addr)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::test_rsa_pem;
    use serial_test::serial;

    const ENV_VARS: &[&str] = &[
        "DEPENDABOT_ORG",
        "GITHUB_PRIVATE_KEY",
        "GITHUB_APP_ID",
        "DEPENDABOT_OWNER",
        "CODEARTIFACT_DURATION",
        "CODEARTIFACT_DOMAIN",
        "CODEARTIFACT_DOMAIN_OWNER",
        "METRICS_ADDR",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    fn parse_with(pem: &str, overrides: &[(&str, &str)]) -> Settings {
        let mut args: Vec<String> = vec![
            "codeartifact-dependabot-rotator".into(),
            "--dependabot-org=acme".into(),
            format!("--github-private-key={pem}"),
            "--github-app-id=123456".into(),
            "--dependabot-owner=acme".into(),
            "--codeartifact-duration=3600".into(),
            "--codeartifact-domain=acme-artifacts".into(),
            "--codeartifact-domain-owner=123456789012".into(),
        ];

        for (flag, value) in overrides {
            args.retain(|a| !a.starts_with(&format!("{flag}=")));
            args.push(format!("{flag}={value}"));
        }

        Settings::try_parse_from(args).expect("arguments should parse")
    }

    #[test]
    #[serial]
    fn test_valid_settings_pass_validation() {
        clear_env();
        let settings = parse_with(&test_rsa_pem(), &[]);
        assert!(settings.validate().is_ok());
        assert_eq!(settings.metrics_addr, DEFAULT_METRICS_ADDR);
    }

    #[test]
    #[serial]
    fn test_empty_organization_rejected() {
        clear_env();
        let settings = parse_with(&test_rsa_pem(), &[("--dependabot-org", "")]);
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::MissingValue {
                name: "DEPENDABOT_ORG"
            })
        ));
    }

    #[test]
    #[serial]
    fn test_duration_bounds() {
        clear_env();
        let pem = test_rsa_pem();

        for duration in ["0", "900", "43200"] {
            let settings = parse_with(&pem, &[("--codeartifact-duration", duration)]);
            assert!(settings.validate().is_ok(), "duration {duration} should pass");
        }

        for duration in ["100", "899", "43201", "-1"] {
            let settings = parse_with(&pem, &[("--codeartifact-duration", duration)]);
            assert!(
                matches!(settings.validate(), Err(ConfigError::InvalidDuration { .. })),
                "duration {duration} should fail"
            );
        }
    }

    #[test]
    #[serial]
    fn test_non_numeric_app_id_rejected() {
        clear_env();
        let settings = parse_with(&test_rsa_pem(), &[("--github-app-id", "my-app")]);
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidAppId { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_malformed_private_key_rejected() {
        clear_env();
        let settings = parse_with("not a pem at all", &[]);
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidPrivateKey(_))
        ));
    }

    #[test]
    #[serial]
    fn test_invalid_metrics_addr_rejected() {
        clear_env();
        let settings = parse_with(&test_rsa_pem(), &[("--metrics-addr", "not-an-addr")]);
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidMetricsAddr { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_environment_fallback() {
        clear_env();
        let pem = test_rsa_pem();

        std::env::set_var("DEPENDABOT_ORG", "env-org");
        std::env::set_var("GITHUB_PRIVATE_KEY", &pem);
        std::env::set_var("GITHUB_APP_ID", "424242");
        std::env::set_var("DEPENDABOT_OWNER", "env-owner");
        std::env::set_var("CODEARTIFACT_DURATION", "1800");
        std::env::set_var("CODEARTIFACT_DOMAIN", "env-domain");
        std::env::set_var("CODEARTIFACT_DOMAIN_OWNER", "210987654321");

        let settings = Settings::try_parse_from(["codeartifact-dependabot-rotator"])
            .expect("environment variables should satisfy required arguments");

        assert_eq!(settings.organization, "env-org");
        assert_eq!(settings.token_duration, 1800);
        assert!(settings.validate().is_ok());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_required_argument_fails_parse() {
        clear_env();
        let result = Settings::try_parse_from(["codeartifact-dependabot-rotator"]);
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_debug_redacts_private_key() {
        clear_env();
        let pem = test_rsa_pem();
        let settings = parse_with(&pem, &[]);
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("PRIVATE KEY"));
        assert!(rendered.contains("<redacted>"));
    }
}
