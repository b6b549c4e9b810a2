//! Encrypt-then-MAC composition
//!
//! Encrypt: validate → derive sub-keys → ChaCha20 → tag → `ciphertext || tag`.
//!
//! Decrypt: validate → split → derive sub-keys → tag → constant-time verify →
//! ChaCha20. The keystream is never applied to unauthenticated input, and no
//! output is written when verification fails.

use crate::{
    MAX_CIPHERTEXT_LEN, MAX_PLAINTEXT_LEN, TAG_LEN,
    derivation::derive_keys,
    error::AeadError,
    keystream::apply_keystream,
    tag::{compute_tag, verify},
    validation::{decrypt_inputs, encrypt_inputs},
};

/// Label hashed under the master key to derive the encryption key
const ENCRYPTION_CONTEXT: &[u8] = b"ChaCha20.Encrypt()";

/// Label hashed (with the nonce) under the master key to derive the MAC key
const MAC_CONTEXT: &[u8] = b"BLAKE2b-256.KeyedHash()";

/// MAC label of the legacy construction
const LEGACY_MAC_CONTEXT: &[u8] = b"BLAKE2b.KeyedHash()";

/// Domain-separation labels for sub-key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DomainLabels {
    pub(crate) encryption: &'static [u8],
    pub(crate) mac: &'static [u8],
}

/// The ChaCha20-BLAKE2b AEAD construction.
///
/// Stateless: every call derives its own sub-keys from the master key and
/// nonce and wipes them before returning. The handle only selects the
/// domain-separation labels, so it is `Copy` and safe to share across threads.
///
/// # Security
///
/// - Nonces must never repeat under the same key; uniqueness is not checked
/// - Associated data is authenticated but not transmitted; supply it
///   identically on decrypt
/// - Ciphertexts from [`new`](Self::new) and [`legacy`](Self::legacy) never
///   authenticate under each other
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChaCha20Blake2b {
    labels: DomainLabels,
}

impl ChaCha20Blake2b {
    /// The current construction (MAC label `BLAKE2b-256.KeyedHash()`).
    pub const fn new() -> Self {
        Self { labels: DomainLabels { encryption: ENCRYPTION_CONTEXT, mac: MAC_CONTEXT } }
    }

    /// The earlier construction (MAC label `BLAKE2b.KeyedHash()`), for
    /// reading data produced before the label change.
    pub const fn legacy() -> Self {
        Self { labels: DomainLabels { encryption: ENCRYPTION_CONTEXT, mac: LEGACY_MAC_CONTEXT } }
    }

    #[cfg(test)]
    pub(crate) fn labels(self) -> DomainLabels {
        self.labels
    }

    /// Encrypt `plaintext`, returning `ciphertext || tag`.
    ///
    /// The output is exactly [`TAG_LEN`] bytes longer than `plaintext`.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        nonce: &[u8],
        key: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, AeadError> {
        // An oversized plaintext gets an empty buffer; validation reports why
        let mut ciphertext = vec![0u8; ciphertext_len(plaintext.len()).unwrap_or_default()];
        self.encrypt_into(&mut ciphertext, plaintext, nonce, key, associated_data)?;
        Ok(ciphertext)
    }

    /// Encrypt `plaintext` into a caller-supplied buffer.
    ///
    /// `ciphertext` must be exactly `plaintext.len() + TAG_LEN` bytes.
    pub fn encrypt_into(
        &self,
        ciphertext: &mut [u8],
        plaintext: &[u8],
        nonce: &[u8],
        key: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<(), AeadError> {
        let fixed = encrypt_inputs(
            plaintext.len(),
            ciphertext.len(),
            nonce,
            key,
            associated_data.map(<[u8]>::len),
        )?;
        let associated_data = associated_data.unwrap_or_default();

        let (encryption_key, mac_key) = derive_keys(self.labels, fixed.key, fixed.nonce);

        let (body, tag_out) = ciphertext.split_at_mut(plaintext.len());
        apply_keystream(&encryption_key, fixed.nonce, plaintext, body)?;
        drop(encryption_key);

        let tag = compute_tag(&mac_key, associated_data, body);
        drop(mac_key);
        tag_out.copy_from_slice(tag.as_bytes());

        tracing::trace!(
            plaintext_len = plaintext.len(),
            associated_data_len = associated_data.len(),
            "encrypted"
        );
        Ok(())
    }

    /// Authenticate and decrypt `ciphertext || tag`.
    ///
    /// # Errors
    ///
    /// - `AuthenticationFailed`: wrong key, nonce or associated data, or the
    ///   ciphertext was modified. No plaintext is returned.
    /// - Size violations are reported before any cryptographic work.
    pub fn decrypt(
        &self,
        ciphertext: &[u8],
        nonce: &[u8],
        key: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, AeadError> {
        // An impossible length gets an empty buffer; validation reports why
        let mut plaintext = vec![0u8; plaintext_len(ciphertext.len()).unwrap_or_default()];
        self.decrypt_into(&mut plaintext, ciphertext, nonce, key, associated_data)?;
        Ok(plaintext)
    }

    /// Authenticate and decrypt into a caller-supplied buffer.
    ///
    /// `plaintext` must be exactly `ciphertext.len() - TAG_LEN` bytes. It is
    /// left untouched unless authentication succeeds.
    pub fn decrypt_into(
        &self,
        plaintext: &mut [u8],
        ciphertext: &[u8],
        nonce: &[u8],
        key: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<(), AeadError> {
        let (fixed, body_len) = decrypt_inputs(
            ciphertext.len(),
            plaintext.len(),
            nonce,
            key,
            associated_data.map(<[u8]>::len),
        )?;
        let associated_data = associated_data.unwrap_or_default();

        let (body, supplied_tag) = ciphertext.split_at(body_len);

        let (encryption_key, mac_key) = derive_keys(self.labels, fixed.key, fixed.nonce);

        let computed_tag = compute_tag(&mac_key, associated_data, body);
        drop(mac_key);

        if !verify(supplied_tag, &computed_tag) {
            drop(encryption_key);
            tracing::debug!(
                ciphertext_len = ciphertext.len(),
                associated_data_len = associated_data.len(),
                "authentication failed"
            );
            return Err(AeadError::AuthenticationFailed);
        }

        apply_keystream(&encryption_key, fixed.nonce, body, plaintext)?;

        tracing::trace!(
            ciphertext_len = ciphertext.len(),
            associated_data_len = associated_data.len(),
            "decrypted"
        );
        Ok(())
    }
}

impl Default for ChaCha20Blake2b {
    fn default() -> Self {
        Self::new()
    }
}

/// Encrypt with the default construction. See [`ChaCha20Blake2b::encrypt`].
pub fn encrypt(
    plaintext: &[u8],
    nonce: &[u8],
    key: &[u8],
    associated_data: Option<&[u8]>,
) -> Result<Vec<u8>, AeadError> {
    ChaCha20Blake2b::new().encrypt(plaintext, nonce, key, associated_data)
}

/// Decrypt with the default construction. See [`ChaCha20Blake2b::decrypt`].
pub fn decrypt(
    ciphertext: &[u8],
    nonce: &[u8],
    key: &[u8],
    associated_data: Option<&[u8]>,
) -> Result<Vec<u8>, AeadError> {
    ChaCha20Blake2b::new().decrypt(ciphertext, nonce, key, associated_data)
}

/// Encrypt into a caller-supplied buffer with the default construction.
pub fn encrypt_into(
    ciphertext: &mut [u8],
    plaintext: &[u8],
    nonce: &[u8],
    key: &[u8],
    associated_data: Option<&[u8]>,
) -> Result<(), AeadError> {
    ChaCha20Blake2b::new().encrypt_into(ciphertext, plaintext, nonce, key, associated_data)
}

/// Decrypt into a caller-supplied buffer with the default construction.
pub fn decrypt_into(
    plaintext: &mut [u8],
    ciphertext: &[u8],
    nonce: &[u8],
    key: &[u8],
    associated_data: Option<&[u8]>,
) -> Result<(), AeadError> {
    ChaCha20Blake2b::new().decrypt_into(plaintext, ciphertext, nonce, key, associated_data)
}

/// Ciphertext length for a plaintext of `plaintext_len` bytes, or `None` if
/// the plaintext is too long to encrypt.
pub fn ciphertext_len(plaintext_len: usize) -> Option<usize> {
    if plaintext_len < MAX_PLAINTEXT_LEN { Some(plaintext_len + TAG_LEN) } else { None }
}

/// Plaintext length for a ciphertext of `ciphertext_len` bytes, or `None` if
/// no valid ciphertext has that length.
pub fn plaintext_len(ciphertext_len: usize) -> Option<usize> {
    if ciphertext_len < MAX_CIPHERTEXT_LEN { ciphertext_len.checked_sub(TAG_LEN) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        KEY_LEN, NONCE_LEN,
        error::{ErrorKind, Parameter},
    };

    const KEY: [u8; KEY_LEN] = [0x11; KEY_LEN];
    const NONCE: [u8; NONCE_LEN] = [0x22; NONCE_LEN];

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let plaintext = b"Hello, World!";

        let ciphertext = encrypt(plaintext, &NONCE, &KEY, Some(b"header")).unwrap();
        let decrypted = decrypt(&ciphertext, &NONCE, &KEY, Some(b"header")).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn encrypt_decrypt_empty_message() {
        let ciphertext = encrypt(b"", &NONCE, &KEY, None).unwrap();
        assert_eq!(ciphertext.len(), TAG_LEN);

        let decrypted = decrypt(&ciphertext, &NONCE, &KEY, None).unwrap();
        assert!(decrypted.is_empty());
    }

    #[test]
    fn encrypt_decrypt_large_message() {
        let plaintext = vec![0x42u8; 64 * 1024]; // 64KB

        let ciphertext = encrypt(&plaintext, &NONCE, &KEY, None).unwrap();
        let decrypted = decrypt(&ciphertext, &NONCE, &KEY, None).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn ciphertext_is_plaintext_plus_tag() {
        let plaintext = b"test message";
        let ciphertext = encrypt(plaintext, &NONCE, &KEY, None).unwrap();

        assert_eq!(ciphertext.len(), plaintext.len() + TAG_LEN);
    }

    #[test]
    fn absent_associated_data_equals_empty() {
        let absent = encrypt(b"payload", &NONCE, &KEY, None).unwrap();
        let empty = encrypt(b"payload", &NONCE, &KEY, Some(&[])).unwrap();

        assert_eq!(absent, empty);
        assert!(decrypt(&absent, &NONCE, &KEY, Some(&[])).is_ok());
    }

    #[test]
    fn buffer_and_vec_forms_agree() {
        let plaintext = b"same bytes either way";
        let expected = encrypt(plaintext, &NONCE, &KEY, Some(b"ad")).unwrap();

        let mut ciphertext = vec![0u8; plaintext.len() + TAG_LEN];
        encrypt_into(&mut ciphertext, plaintext, &NONCE, &KEY, Some(b"ad")).unwrap();
        assert_eq!(ciphertext, expected);

        let mut decrypted = vec![0u8; plaintext.len()];
        decrypt_into(&mut decrypted, &ciphertext, &NONCE, &KEY, Some(b"ad")).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn ciphertext_body_is_raw_keystream_xor() {
        // Composer layout: body first, tag last
        let plaintext = [0u8; 40];
        let ciphertext = encrypt(&plaintext, &NONCE, &KEY, None).unwrap();

        let (encryption_key, _) = derive_keys(ChaCha20Blake2b::new().labels(), &KEY, &NONCE);
        let mut keystream = [0u8; 40];
        apply_keystream(&encryption_key, &NONCE, &plaintext, &mut keystream).unwrap();

        assert_eq!(&ciphertext[..40], &keystream);
    }

    #[test]
    fn failed_decrypt_leaves_output_untouched() {
        let mut ciphertext = encrypt(b"secret", &NONCE, &KEY, None).unwrap();
        ciphertext[0] ^= 0x01;

        let mut plaintext = [0xEEu8; 6];
        let result = decrypt_into(&mut plaintext, &ciphertext, &NONCE, &KEY, None);

        assert_eq!(result, Err(AeadError::AuthenticationFailed));
        assert_eq!(plaintext, [0xEE; 6], "no plaintext may be released on failure");
    }

    #[test]
    fn wrong_associated_data_fails() {
        let ciphertext = encrypt(b"secret", &NONCE, &KEY, Some(b"v1.0.0")).unwrap();

        let result = decrypt(&ciphertext, &NONCE, &KEY, Some(b"v1.0.1"));
        assert_eq!(result.unwrap_err().kind(), ErrorKind::AuthenticationFailure);

        let result = decrypt(&ciphertext, &NONCE, &KEY, None);
        assert_eq!(result, Err(AeadError::AuthenticationFailed));
    }

    #[test]
    fn constructions_do_not_cross_verify() {
        let ciphertext = ChaCha20Blake2b::legacy().encrypt(b"data", &NONCE, &KEY, None).unwrap();

        assert!(ChaCha20Blake2b::legacy().decrypt(&ciphertext, &NONCE, &KEY, None).is_ok());
        assert_eq!(
            ChaCha20Blake2b::new().decrypt(&ciphertext, &NONCE, &KEY, None),
            Err(AeadError::AuthenticationFailed)
        );
    }

    #[test]
    fn default_is_current_construction() {
        assert_eq!(ChaCha20Blake2b::default(), ChaCha20Blake2b::new());
        assert_ne!(ChaCha20Blake2b::new(), ChaCha20Blake2b::legacy());
    }

    #[test]
    fn decrypt_rejects_ciphertext_shorter_than_tag() {
        let result = decrypt(&[0u8; TAG_LEN - 1], &NONCE, &KEY, None);
        assert!(matches!(
            result,
            Err(AeadError::InvalidLength { parameter: Parameter::Ciphertext, .. })
        ));
    }

    #[test]
    fn invalid_arguments_are_reported_before_authentication() {
        let ciphertext = encrypt(b"data", &NONCE, &KEY, None).unwrap();

        let result = decrypt(&ciphertext, &NONCE[..8], &KEY, None);
        assert_eq!(result.unwrap_err().parameter(), Some(Parameter::Nonce));

        let result = decrypt(&ciphertext, &NONCE, &KEY[..16], None);
        assert_eq!(result.unwrap_err().parameter(), Some(Parameter::Key));
    }

    #[test]
    fn length_helpers() {
        assert_eq!(ciphertext_len(0), Some(TAG_LEN));
        assert_eq!(ciphertext_len(10), Some(10 + TAG_LEN));
        assert_eq!(ciphertext_len(MAX_PLAINTEXT_LEN), None);
        assert_eq!(ciphertext_len(usize::MAX), None);

        assert_eq!(plaintext_len(TAG_LEN), Some(0));
        assert_eq!(plaintext_len(TAG_LEN - 1), None);
        assert_eq!(plaintext_len(MAX_CIPHERTEXT_LEN), None);
    }
}
