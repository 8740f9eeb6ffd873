pub mod client;
pub mod types;

pub use client::{GitHubClient, SecretUpsertOutcome, DEPENDABOT_SECRET_NAME};
pub use types::{EncryptedOrgSecret, Installation, InstallationToken, OrgPublicKey, TokenPermissions};
