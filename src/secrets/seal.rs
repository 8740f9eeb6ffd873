use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use crypto_box::PublicKey;
use rand::rngs::OsRng;

use crate::error::SealError;

/// Length of an X25519 public key.
const PUBLIC_KEY_LEN: usize = 32;

/// Bytes a sealed box adds over the plaintext: ephemeral public key + MAC.
pub const SEAL_OVERHEAD: usize = 48;

/// Seal `plaintext` for the holder of `public_key_b64` and return the sealed
/// box as standard base64, the format the GitHub secret-upsert endpoint
/// expects. The key is the standard-base64 X25519 key served by the org
/// public-key endpoint.
///
/// The sender stays anonymous: an ephemeral key pair is generated per call,
/// so the ciphertext differs between calls even for identical plaintext.
/// Only the holder of the matching private key (GitHub) can open the box.
pub fn seal_for_github(plaintext: &[u8], public_key_b64: &str) -> Result<String, SealError> {
    let key_bytes = BASE64.decode(public_key_b64)?;
    if key_bytes.len() != PUBLIC_KEY_LEN {
        return Err(SealError::KeyLength {
            len: key_bytes.len(),
        });
    }

    let mut key = [0u8; PUBLIC_KEY_LEN];
    key.copy_from_slice(&key_bytes);
    let public_key = PublicKey::from(key);

    let sealed = public_key
        .seal(&mut OsRng, plaintext)
        .map_err(|_| SealError::Encrypt)?;

    Ok(BASE64.encode(sealed))
}
