//! AES-256-GCM sealing of provider access tokens at rest.
//!
//! A sealed token is `base64(nonce || ciphertext)`, with a fresh 96-bit nonce
//! per call. The key is 32 bytes, configured as standard base64.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit, OsRng},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::{EngineError, ResultEngine};

const NONCE_SIZE: usize = 12;

/// Key length in bytes.
pub const TOKEN_KEY_SIZE: usize = 32;

#[derive(Clone)]
pub struct TokenCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TokenCipher(..)")
    }
}

impl TokenCipher {
    pub fn new(key: &[u8; TOKEN_KEY_SIZE]) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)),
        }
    }

    /// Build a cipher from a base64-encoded 32-byte key.
    pub fn from_base64_key(encoded: &str) -> ResultEngine<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| EngineError::Encryption(format!("invalid key encoding: {e}")))?;
        let key: [u8; TOKEN_KEY_SIZE] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            EngineError::Encryption(format!(
                "key must be {TOKEN_KEY_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self::new(&key))
    }

    pub fn seal(&self, plaintext: &str) -> ResultEngine<String> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| EngineError::Encryption(format!("encryption failed: {e}")))?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(sealed))
    }

    pub fn open(&self, sealed: &str) -> ResultEngine<String> {
        let bytes = STANDARD
            .decode(sealed)
            .map_err(|e| EngineError::Encryption(format!("invalid token encoding: {e}")))?;
        if bytes.len() <= NONCE_SIZE {
            return Err(EngineError::Encryption("sealed token too short".to_string()));
        }
        let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_SIZE);

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| {
                EngineError::Encryption("decryption failed: wrong key or corrupted token".to_string())
            })?;
        String::from_utf8(plaintext)
            .map_err(|e| EngineError::Encryption(format!("decrypted token is not UTF-8: {e}")))
    }
}
