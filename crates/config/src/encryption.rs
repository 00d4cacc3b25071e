//! Sealing and opening of secured remote payloads.
//!
//! Responsibilities:
//! - Provide AES-256-GCM encryption and decryption.
//! - Derive the cipher key from a secret key with Argon2id.
//! - Define the sealed payload envelope stored in remote key-value backends.
//!
//! Does NOT handle:
//! - Fetching payloads (see `remote`).
//!
//! Invariants:
//! - Envelope layout is `uniconf:v1:<salt hex>:<nonce hex>:<ciphertext hex>`.
//! - A fresh salt and nonce are generated for every sealed payload.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::Argon2;
use rand::RngExt;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::constants::SEALED_PAYLOAD_PREFIX;

/// Errors that can occur during encryption operations.
#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Invalid nonce size: expected 12 bytes")]
    InvalidNonceSize,

    #[error("Payload is not a sealed configuration envelope")]
    InvalidEnvelope,
}

pub type Result<T> = std::result::Result<T, EncryptionError>;

/// Core cryptographic logic for AES-256-GCM.
pub struct Encryptor;

impl Encryptor {
    /// Encrypts data using AES-256-GCM.
    /// Returns (ciphertext + tag, nonce).
    pub fn encrypt(data: &[u8], key: &[u8; 32]) -> Result<(Vec<u8>, [u8; 12])> {
        let cipher = Aes256Gcm::new(key.into());
        let mut nonce_bytes = [0u8; 12];
        rand::rng().fill(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, data)
            .map_err(|e| EncryptionError::EncryptionFailed(e.to_string()))?;

        Ok((ciphertext, nonce_bytes))
    }

    /// Decrypts data using AES-256-GCM.
    pub fn decrypt(ciphertext: &[u8], key: &[u8; 32], nonce: &[u8; 12]) -> Result<Vec<u8>> {
        let cipher = Aes256Gcm::new(key.into());
        let nonce = Nonce::from_slice(nonce);

        cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| EncryptionError::DecryptionFailed(e.to_string()))
    }

    /// Derives a 32-byte key from a secret and salt using Argon2id.
    pub fn derive_key(secret: &SecretString, salt: &[u8]) -> Result<[u8; 32]> {
        let argon2 = Argon2::default();
        let mut key = [0u8; 32];
        argon2
            .hash_password_into(secret.expose_secret().as_bytes(), salt, &mut key)
            .map_err(|e| EncryptionError::KeyDerivationFailed(e.to_string()))?;
        Ok(key)
    }

    /// Generates a random 16-byte salt for key derivation.
    pub fn generate_salt() -> [u8; 16] {
        let mut salt = [0u8; 16];
        rand::rng().fill(&mut salt);
        salt
    }
}

/// Encrypt `plaintext` under `secret` into a sealed envelope.
///
/// This is the format `add_secure_remote_provider` expects to find in the
/// remote store.
pub fn seal(plaintext: &[u8], secret: &SecretString) -> Result<Vec<u8>> {
    let salt = Encryptor::generate_salt();
    let key = Encryptor::derive_key(secret, &salt)?;
    let (ciphertext, nonce) = Encryptor::encrypt(plaintext, &key)?;

    let envelope = format!(
        "{}{}:{}:{}",
        SEALED_PAYLOAD_PREFIX,
        hex::encode(salt),
        hex::encode(nonce),
        hex::encode(ciphertext)
    );
    Ok(envelope.into_bytes())
}

/// Open a sealed envelope produced by [`seal`].
pub fn open(payload: &[u8], secret: &SecretString) -> Result<Vec<u8>> {
    let text = std::str::from_utf8(payload).map_err(|_| EncryptionError::InvalidEnvelope)?;
    let body = text
        .trim()
        .strip_prefix(SEALED_PAYLOAD_PREFIX)
        .ok_or(EncryptionError::InvalidEnvelope)?;

    let mut parts = body.splitn(3, ':');
    let (Some(salt), Some(nonce), Some(ciphertext)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(EncryptionError::InvalidEnvelope);
    };

    let salt = hex::decode(salt).map_err(|_| EncryptionError::InvalidEnvelope)?;
    let nonce: [u8; 12] = hex::decode(nonce)
        .map_err(|_| EncryptionError::InvalidEnvelope)?
        .try_into()
        .map_err(|_| EncryptionError::InvalidNonceSize)?;
    let ciphertext = hex::decode(ciphertext).map_err(|_| EncryptionError::InvalidEnvelope)?;

    let key = Encryptor::derive_key(secret, &salt)?;
    Encryptor::decrypt(&ciphertext, &key, &nonce)
}
