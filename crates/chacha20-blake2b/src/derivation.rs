//! Sub-key derivation using keyed BLAKE2b
//!
//! ```text
//! encryption_key = BLAKE2b-256(key = master_key, message = encryption_context)
//! mac_key        = BLAKE2b-256(key = master_key, message = mac_context || nonce)
//! ```
//!
//! Distinct context labels keep the two sub-keys independent. The nonce is
//! bound into the MAC key only; the stream cipher consumes it directly.

use blake2::{
    Blake2bMac,
    digest::{Mac, consts::U32},
};
use zeroize::Zeroize;

use crate::{KEY_LEN, NONCE_LEN, aead::DomainLabels};

/// Keyed BLAKE2b with a 256-bit output.
pub(crate) type Blake2b256Mac = Blake2bMac<U32>;

/// A call-scoped 32-byte sub-key. Wiped on drop.
pub(crate) struct SubKey([u8; KEY_LEN]);

impl SubKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Drop for SubKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Derive the encryption key and MAC key for one call.
///
/// Returned as `(encryption_key, mac_key)`.
pub(crate) fn derive_keys(
    labels: DomainLabels,
    master_key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
) -> (SubKey, SubKey) {
    let encryption_key = keyed_hash(master_key, &[labels.encryption]);
    let mac_key = keyed_hash(master_key, &[labels.mac, nonce.as_slice()]);
    (encryption_key, mac_key)
}

/// BLAKE2b-256 of the concatenated `parts` under `key`.
fn keyed_hash(key: &[u8; KEY_LEN], parts: &[&[u8]]) -> SubKey {
    let Ok(mut mac) = Blake2b256Mac::new_from_slice(key) else {
        unreachable!("BLAKE2b accepts keys up to 64 bytes");
    };
    for part in parts {
        mac.update(part);
    }

    let mut digest = mac.finalize().into_bytes();
    let mut bytes = [0u8; KEY_LEN];
    bytes.copy_from_slice(&digest);
    digest.as_mut_slice().zeroize();

    SubKey::from_bytes(bytes)
}
