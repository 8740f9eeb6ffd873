use thiserror::Error;

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("github api error: {0}")]
    GitHub(#[from] GitHubError),

    #[error("codeartifact error: {0}")]
    CodeArtifact(#[from] CodeArtifactError),

    #[error("metrics error: {0}")]
    Metrics(#[from] MetricsError),
}

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required value: {name}")]
    MissingValue { name: &'static str },

    #[error("invalid codeartifact token duration {value}: {reason}")]
    InvalidDuration { value: i64, reason: String },

    #[error("github app id must be numeric, got {value:?}")]
    InvalidAppId { value: String },

    #[error("github private key is not a valid rsa pem: {0}")]
    InvalidPrivateKey(#[source] jsonwebtoken::errors::Error),

    #[error("invalid metrics listen address {value:?}")]
    InvalidMetricsAddr { value: String },
}

/// GitHub App JWT minting errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to parse app private key: {0}")]
    KeyParse(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign app jwt: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// GitHub REST API errors
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned status {status}")]
    UnexpectedStatus {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("sealing secret value: {0}")]
    Seal(#[from] SealError),

    #[error("auth: {0}")]
    Auth(#[from] AuthError),
}

/// Sealed-box encryption errors
#[derive(Debug, Error)]
pub enum SealError {
    #[error("public key is not valid base64: {0}")]
    KeyEncoding(#[from] base64::DecodeError),

    #[error("public key must decode to 32 bytes, got {len}")]
    KeyLength { len: usize },

    #[error("sealed box encryption failed")]
    Encrypt,
}

/// AWS CodeArtifact errors
#[derive(Debug, Error)]
pub enum CodeArtifactError {
    #[error("GetAuthorizationToken failed: {0}")]
    GetToken(#[from] aws_sdk_codeartifact::Error),

    #[error("GetAuthorizationToken response contained no token")]
    MissingToken,
}

/// Metrics exporter errors
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("invalid metrics listen address {addr:?}: {source}")]
    InvalidAddr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("failed to install prometheus exporter: {0}")]
    ExporterInstall(String),
}
