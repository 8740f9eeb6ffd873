use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;

/// Clock-skew allowance subtracted from `iat`, in seconds.
const ISSUED_AT_SKEW_SECS: i64 = 60;

/// App JWT lifetime in seconds. GitHub rejects anything above ten minutes.
const TOKEN_LIFETIME_SECS: i64 = 600;

/// Claims of a GitHub App JWT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppClaims {
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

impl AppClaims {
    /// Claims for an App JWT issued now: `iat` backdated one minute to
    /// tolerate clock skew, `exp` ten minutes out, `iss` the App ID.
    pub fn new(app_id: &str) -> Self {
        let now = Utc::now().timestamp();
        Self {
            iat: now - ISSUED_AT_SKEW_SECS,
            exp: now + TOKEN_LIFETIME_SECS,
            iss: app_id.to_string(),
        }
    }
}

/// Mints RS256-signed GitHub App JWTs from the App's private key.
pub struct AppTokenMinter {
    app_id: String,
    encoding_key: EncodingKey,
}

impl AppTokenMinter {
    /// Parse the PEM private key and build a minter.
    ///
    /// Accepts the PKCS#1 keys GitHub issues for Apps as well as PKCS#8
    /// re-encodings.
    pub fn new(app_id: &str, private_key_pem: &str) -> Result<Self, AuthError> {
        let encoding_key =
            EncodingKey::from_rsa_pem(private_key_pem.as_bytes()).map_err(AuthError::KeyParse)?;

        Ok(Self {
            app_id: app_id.to_string(),
            encoding_key,
        })
    }

    /// Sign a fresh App JWT.
    pub fn mint(&self) -> Result<String, AuthError> {
        let claims = AppClaims::new(&self.app_id);
        let token = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(AuthError::Signing)?;

        debug!(app_id = %self.app_id, "minted app jwt");
        Ok(token)
    }

    /// The App ID this minter issues tokens for.
    pub fn app_id(&self) -> &str {
        &self.app_id
    }
}

/// Generate a throwaway PKCS#8 RSA private key for tests.
#[cfg(test)]
pub(crate) fn test_rsa_pem() -> String {
    use rsa::pkcs8::EncodePrivateKey;
    use rsa::RsaPrivateKey;

    let mut rng = rand::thread_rng();
    let key = RsaPrivateKey::new(&mut rng, 2048).expect("failed to generate rsa key");
    key.to_pkcs8_pem(rsa::pkcs8::LineEnding::LF)
        .expect("failed to encode private key")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};
    use rsa::pkcs8::{DecodePrivateKey, EncodePublicKey};
    use rsa::{RsaPrivateKey, RsaPublicKey};

    fn public_pem_for(private_pem: &str) -> String {
        let private = RsaPrivateKey::from_pkcs8_pem(private_pem).expect("parse private key");
        RsaPublicKey::from(&private)
            .to_public_key_pem(rsa::pkcs8::LineEnding::LF)
            .expect("encode public key")
    }

    #[test]
    fn test_minter_rejects_garbage_key() {
        let result = AppTokenMinter::new("12345", "definitely not pem");
        assert!(matches!(result, Err(AuthError::KeyParse(_))));
    }

    #[test]
    fn test_claims_carry_documented_offsets() {
        let before = Utc::now().timestamp();
        let claims = AppClaims::new("12345");
        let after = Utc::now().timestamp();

        assert_eq!(claims.iss, "12345");
        assert_eq!(
            claims.exp - claims.iat,
            ISSUED_AT_SKEW_SECS + TOKEN_LIFETIME_SECS
        );
        assert!(claims.iat >= before - ISSUED_AT_SKEW_SECS);
        assert!(claims.iat <= after - ISSUED_AT_SKEW_SECS);
        assert!(claims.exp >= before + TOKEN_LIFETIME_SECS);
        assert!(claims.exp <= after + TOKEN_LIFETIME_SECS);
    }

    #[test]
    fn test_minted_token_verifies_and_matches_claims() {
        let private_pem = test_rsa_pem();
        let minter = AppTokenMinter::new("987654", &private_pem).unwrap();

        let before = Utc::now().timestamp();
        let token = minter.mint().unwrap();

        // Three dot-separated segments
        assert_eq!(token.split('.').count(), 3);

        let decoding_key =
            DecodingKey::from_rsa_pem(public_pem_for(&private_pem).as_bytes()).unwrap();

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&["987654"]);

        let decoded = decode::<AppClaims>(&token, &decoding_key, &validation)
            .expect("token should verify against the matching public key");

        assert_eq!(decoded.claims.iss, "987654");
        assert!(decoded.claims.iat <= before - ISSUED_AT_SKEW_SECS + 2);
        assert!(decoded.claims.exp >= before + TOKEN_LIFETIME_SECS - 2);
    }

    #[test]
    fn test_header_algorithm_is_rs256() {
        let minter = AppTokenMinter::new("11111", &test_rsa_pem()).unwrap();
        let token = minter.mint().unwrap();

        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
    }
}
