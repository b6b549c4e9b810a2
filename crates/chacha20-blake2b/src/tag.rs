//! Authentication tag computation and verification
//!
//! The tag is keyed BLAKE2b-256 over a canonical framing of the associated
//! data and ciphertext body:
//!
//! ```text
//! associated_data || ciphertext || LE64(len(associated_data)) || LE64(len(ciphertext))
//! ```
//!
//! Both length fields are always appended, so no two distinct
//! (associated data, ciphertext) splits of the same bytes share a message.
//! The framing is fed incrementally; no concatenated copy is allocated.

use blake2::digest::Mac;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::{
    TAG_LEN,
    derivation::{Blake2b256Mac, SubKey},
};

/// Size of the two little-endian `u64` length fields.
pub(crate) const LENGTH_FIELDS_LEN: usize = 16;

/// A computed authentication tag. Wiped on drop.
pub(crate) struct Tag([u8; TAG_LEN]);

impl Tag {
    pub(crate) fn as_bytes(&self) -> &[u8; TAG_LEN] {
        &self.0
    }
}

impl Drop for Tag {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Compute the tag over `associated_data` and `ciphertext` under `mac_key`.
pub(crate) fn compute_tag(mac_key: &SubKey, associated_data: &[u8], ciphertext: &[u8]) -> Tag {
    let Ok(mut mac) = Blake2b256Mac::new_from_slice(mac_key.as_bytes()) else {
        unreachable!("BLAKE2b accepts keys up to 64 bytes");
    };

    mac.update(associated_data);
    mac.update(ciphertext);
    mac.update(&length_field(associated_data.len()));
    mac.update(&length_field(ciphertext.len()));

    let mut digest = mac.finalize().into_bytes();
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&digest);
    digest.as_mut_slice().zeroize();

    Tag(tag)
}

/// Compare a supplied tag against a computed one in constant time.
///
/// A supplied tag of the wrong length never matches.
pub(crate) fn verify(supplied: &[u8], computed: &Tag) -> bool {
    supplied.ct_eq(computed.as_bytes()).into()
}

/// Encode a length as a 64-bit little-endian field.
fn length_field(len: usize) -> [u8; 8] {
    (len as u64).to_le_bytes()
}
