//! CryptoJS-compatible AES envelope encryption.
//!
//! Onboardbase envelopes are produced by `CryptoJS.AES.encrypt` with a string
//! passphrase: `base64("Salted__" || salt[8] || AES-256-CBC ciphertext)`,
//! with key and IV derived from the passphrase via the OpenSSL
//! `EVP_BytesToKey` scheme (MD5, one iteration). This module implements the
//! decrypting half used by the client, plus the matching encryptor.

use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use rand::RngCore;
use thiserror::Error;
use zeroize::Zeroize;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const SALT_HEADER: &[u8] = b"Salted__";
const SALT_LEN: usize = 8;
const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;

/// Envelope encryption/decryption errors.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The envelope is not valid base64
    #[error("envelope is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The envelope is too short or lacks the salt header
    #[error("envelope is malformed (missing salt header)")]
    MalformedEnvelope,

    /// Block decryption failed; wrong passphrase or corrupted ciphertext
    #[error("decryption failed (wrong passphrase or corrupted data)")]
    Decrypt,

    /// The decrypted payload is not valid UTF-8
    #[error("decrypted payload is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Derive an AES-256 key and IV from a passphrase and salt.
///
/// OpenSSL `EVP_BytesToKey` with MD5 and a single iteration, as used by
/// CryptoJS when encrypting with a string passphrase.
fn evp_bytes_to_key(passphrase: &[u8], salt: &[u8]) -> ([u8; KEY_LEN], [u8; IV_LEN]) {
    let mut derived = Vec::with_capacity(KEY_LEN + IV_LEN);
    let mut block = Vec::new();
    while derived.len() < KEY_LEN + IV_LEN {
        let mut input = Vec::with_capacity(block.len() + passphrase.len() + salt.len());
        input.extend_from_slice(&block);
        input.extend_from_slice(passphrase);
        input.extend_from_slice(salt);
        block = md5::compute(&input).0.to_vec();
        derived.extend_from_slice(&block);
        input.zeroize();
    }

    let mut key = [0u8; KEY_LEN];
    let mut iv = [0u8; IV_LEN];
    key.copy_from_slice(&derived[..KEY_LEN]);
    iv.copy_from_slice(&derived[KEY_LEN..KEY_LEN + IV_LEN]);
    derived.zeroize();
    block.zeroize();
    (key, iv)
}

/// Decrypt one envelope with the given passphrase.
///
/// # Errors
///
/// Returns a [`CryptoError`] if the envelope is not base64, lacks the
/// `Salted__` header, fails block decryption, or decrypts to non-UTF-8.
pub fn decrypt(envelope: &str, passphrase: &str) -> Result<String, CryptoError> {
    let raw = STANDARD.decode(envelope.trim())?;
    if raw.len() < SALT_HEADER.len() + SALT_LEN || &raw[..SALT_HEADER.len()] != SALT_HEADER {
        return Err(CryptoError::MalformedEnvelope);
    }
    let salt = &raw[SALT_HEADER.len()..SALT_HEADER.len() + SALT_LEN];
    let ciphertext = &raw[SALT_HEADER.len() + SALT_LEN..];

    let (mut key, iv) = evp_bytes_to_key(passphrase.as_bytes(), salt);
    let plaintext = Aes256CbcDec::new(&key.into(), &iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::Decrypt);
    key.zeroize();

    Ok(String::from_utf8(plaintext?)?)
}

/// Encrypt a payload into a CryptoJS-compatible envelope.
///
/// Counterpart of [`decrypt`]; a fresh random salt is drawn per call, so two
/// encryptions of the same payload differ.
#[must_use]
pub fn encrypt(plaintext: &str, passphrase: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    let (mut key, iv) = evp_bytes_to_key(passphrase.as_bytes(), &salt);
    let ciphertext = Aes256CbcEnc::new(&key.into(), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
    key.zeroize();

    let mut raw = Vec::with_capacity(SALT_HEADER.len() + SALT_LEN + ciphertext.len());
    raw.extend_from_slice(SALT_HEADER);
    raw.extend_from_slice(&salt);
    raw.extend_from_slice(&ciphertext);
    STANDARD.encode(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let envelope = encrypt(r#"{"key":"DB_URL","value":"postgres://x"}"#, "p1");
        let plaintext = decrypt(&envelope, "p1").unwrap();
        assert_eq!(plaintext, r#"{"key":"DB_URL","value":"postgres://x"}"#);
    }

    #[test]
    fn test_fresh_salt_per_encryption() {
        let a = encrypt("payload", "pass");
        let b = encrypt("payload", "pass");
        assert_ne!(a, b);
        assert_eq!(decrypt(&a, "pass").unwrap(), decrypt(&b, "pass").unwrap());
    }

    #[test]
    fn test_wrong_passphrase_never_yields_plaintext() {
        let envelope = encrypt("top secret", "right");
        assert_ne!(decrypt(&envelope, "wrong").ok(), Some("top secret".to_string()));
    }

    #[test]
    fn test_rejects_invalid_base64() {
        assert!(matches!(
            decrypt("%%% not base64 %%%", "pass"),
            Err(CryptoError::Base64(_))
        ));
    }

    #[test]
    fn test_rejects_missing_salt_header() {
        let envelope = STANDARD.encode(b"NotSaltedSomeBytesHere");
        assert!(matches!(
            decrypt(&envelope, "pass"),
            Err(CryptoError::MalformedEnvelope)
        ));
    }

    #[test]
    fn test_rejects_truncated_envelope() {
        let envelope = STANDARD.encode(b"Salted__");
        assert!(matches!(
            decrypt(&envelope, "pass"),
            Err(CryptoError::MalformedEnvelope)
        ));
    }

    #[test]
    fn test_rejects_corrupted_ciphertext() {
        let envelope = encrypt("payload", "pass");
        let mut raw = STANDARD.decode(&envelope).unwrap();
        // Drop one ciphertext byte so the length is no longer a block multiple.
        raw.pop();
        let tampered = STANDARD.encode(raw);
        assert!(decrypt(&tampered, "pass").is_err());
    }
}
