//! Reversible encryption for RFC and CURP values.
//!
//! Values are stored as `base64(IV || AES-256-CBC(plaintext))` with a fresh random
//! IV per value, so equal plaintexts never produce equal ciphertexts. Equality
//! lookups go through [`FieldCipher::blind_index`], a keyed HMAC of the
//! normalized plaintext stored in its own indexed column.

use crate::{
    core::validation::normalize_id_code,
    errors::{Error, Result},
};
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use base64::{Engine as _, engine::general_purpose};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type HmacSha256 = Hmac<Sha256>;

const KEY_SIZE: usize = 32;
const IV_SIZE: usize = 16;

/// Symmetric cipher for sensitive identity fields.
pub struct FieldCipher {
    key: [u8; KEY_SIZE],
}

impl std::fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldCipher").finish_non_exhaustive()
    }
}

impl FieldCipher {
    /// Derives the key from a secret: secrets shorter than 32 bytes are hashed with
    /// SHA-256, longer ones are truncated to their first 32 bytes.
    pub fn new(secret: &str) -> Result<Self> {
        if secret.is_empty() {
            return Err(Error::Config {
                message: "ENCRYPTION_KEY must not be empty".to_string(),
            });
        }

        let bytes = secret.as_bytes();
        let mut key = [0u8; KEY_SIZE];
        if bytes.len() < KEY_SIZE {
            key.copy_from_slice(&Sha256::digest(bytes));
        } else {
            key.copy_from_slice(&bytes[..KEY_SIZE]);
        }

        Ok(Self { key })
    }

    /// Encrypts `plaintext`; an empty string is returned unchanged.
    #[must_use]
    pub fn encrypt(&self, plaintext: &str) -> String {
        if plaintext.is_empty() {
            return String::new();
        }

        let mut iv = [0u8; IV_SIZE];
        rand::thread_rng().fill_bytes(&mut iv);

        #[allow(clippy::expect_used)] // Key and IV are fixed-size arrays of the right length
        let ciphertext = Aes256CbcEnc::new_from_slices(&self.key, &iv)
            .expect("Key and IV sizes are always valid")
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

        let mut result = Vec::with_capacity(IV_SIZE + ciphertext.len());
        result.extend_from_slice(&iv);
        result.extend_from_slice(&ciphertext);

        general_purpose::STANDARD.encode(result)
    }

    /// Decrypts a value produced by [`FieldCipher::encrypt`].
    ///
    /// Anything that does not decrypt cleanly (not base64, too short, wrong key,
    /// bad padding, not UTF-8) is returned unchanged, so rows written before
    /// encryption was enabled still read back as their plaintext.
    #[must_use]
    pub fn decrypt(&self, value: &str) -> String {
        self.try_decrypt(value)
            .unwrap_or_else(|| value.to_string())
    }

    fn try_decrypt(&self, value: &str) -> Option<String> {
        let data = general_purpose::STANDARD.decode(value).ok()?;
        if data.len() <= IV_SIZE || (data.len() - IV_SIZE) % IV_SIZE != 0 {
            return None;
        }

        let (iv, ciphertext) = data.split_at(IV_SIZE);
        let plaintext = Aes256CbcDec::new_from_slices(&self.key, iv)
            .ok()?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .ok()?;

        String::from_utf8(plaintext).ok()
    }

    /// Normalizes (trim, upper-case) and encrypts an RFC.
    #[must_use]
    pub fn encrypt_rfc(&self, rfc: &str) -> String {
        self.encrypt(&normalize_id_code(rfc))
    }

    /// Normalizes (trim, upper-case) and encrypts a CURP.
    #[must_use]
    pub fn encrypt_curp(&self, curp: &str) -> String {
        self.encrypt(&normalize_id_code(curp))
    }

    /// Deterministic keyed hash of a normalized RFC/CURP, hex-encoded.
    #[must_use]
    pub fn blind_index(&self, value: &str) -> String {
        #[allow(clippy::expect_used)] // HMAC accepts keys of any length
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.key)
            .expect("HMAC key is always valid");
        mac.update(normalize_id_code(value).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn cipher() -> FieldCipher {
        FieldCipher::new("clave-de-prueba").unwrap()
    }

    #[test]
    fn test_round_trip() {
        let cipher = cipher();
        let encrypted = cipher.encrypt("GODE561231HDFRRN09");
        assert_ne!(encrypted, "GODE561231HDFRRN09");
        assert_eq!(cipher.decrypt(&encrypted), "GODE561231HDFRRN09");
    }

    #[test]
    fn test_random_iv_gives_distinct_ciphertexts() {
        let cipher = cipher();
        let first = cipher.encrypt("ABCD123456XY1");
        let second = cipher.encrypt("ABCD123456XY1");
        assert_ne!(first, second);
        assert_eq!(cipher.decrypt(&first), cipher.decrypt(&second));
    }

    #[test]
    fn test_plaintext_passes_through_decrypt() {
        // Legacy rows were stored unencrypted; decrypt must hand them back as-is.
        let cipher = cipher();
        assert_eq!(cipher.decrypt("ABCD123456XY1"), "ABCD123456XY1");
        assert_eq!(cipher.decrypt("no es base64!"), "no es base64!");
        assert_eq!(cipher.decrypt(""), "");
    }

    #[test]
    fn test_wrong_key_passes_through() {
        let encrypted = cipher().encrypt("ABCD123456XY1");
        let other = FieldCipher::new("otra-clave").unwrap();
        let result = other.decrypt(&encrypted);
        // Either padding fails (input returned) or garbage fails UTF-8; never the plaintext.
        assert_ne!(result, "ABCD123456XY1");
    }

    #[test]
    fn test_empty_input_is_not_encrypted() {
        assert_eq!(cipher().encrypt(""), "");
    }

    #[test]
    fn test_key_derivation() {
        // Long secrets use their first 32 bytes, so anything after byte 32 is ignored.
        let long_a = FieldCipher::new(&format!("{}{}", "k".repeat(32), "A")).unwrap();
        let long_b = FieldCipher::new(&format!("{}{}", "k".repeat(32), "B")).unwrap();
        assert_eq!(long_a.key, long_b.key);
        assert_eq!(&long_a.key, "k".repeat(32).as_bytes());

        let short = FieldCipher::new("corta").unwrap();
        assert_eq!(short.key.as_slice(), Sha256::digest(b"corta").as_slice());

        assert!(matches!(FieldCipher::new(""), Err(Error::Config { .. })));
    }

    #[test]
    fn test_blind_index_is_deterministic_and_normalized() {
        let cipher = cipher();
        assert_eq!(
            cipher.blind_index("abcd123456xy1 "),
            cipher.blind_index("ABCD123456XY1")
        );
        assert_ne!(
            cipher.blind_index("ABCD123456XY1"),
            cipher.blind_index("ABCD123456XY2")
        );
        assert_ne!(
            cipher.blind_index("ABCD123456XY1"),
            FieldCipher::new("otra").unwrap().blind_index("ABCD123456XY1")
        );
    }

    #[test]
    fn test_encrypt_rfc_normalizes() {
        let cipher = cipher();
        let encrypted = cipher.encrypt_rfc("  abcd123456xy1 ");
        assert_eq!(cipher.decrypt(&encrypted), "ABCD123456XY1");
    }
}
