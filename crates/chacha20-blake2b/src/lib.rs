//! ChaCha20-BLAKE2b Authenticated Encryption
//!
//! An AEAD built from the ChaCha20 stream cipher and keyed BLAKE2b in an
//! Encrypt-then-MAC arrangement. Pure functions over explicit inputs: no
//! global state, no I/O, no randomness. Callers supply the key and nonce.
//!
//! # Construction
//!
//! ```text
//! Master Key (32 bytes)        Nonce (12 bytes)
//!        │                           │
//!        ├─ BLAKE2b-256("ChaCha20.Encrypt()") ──────────► Encryption Key
//!        │                           │
//!        └─ BLAKE2b-256(mac_context || nonce) ──────────► MAC Key
//!
//! Encryption Key + Nonce ─► ChaCha20 ─► Ciphertext
//!
//! MAC Key ─► BLAKE2b-256(AD || Ciphertext || LE64(|AD|) || LE64(|Ciphertext|)) ─► Tag
//!
//! Output: Ciphertext || Tag (32 bytes)
//! ```
//!
//! Neither the nonce nor the associated data is embedded in the output; both
//! must be transported separately and supplied identically on decrypt.
//!
//! # Security
//!
//! Key Separation:
//! - Encryption and MAC keys come from distinct domain labels
//! - The MAC key is bound to the nonce, so every message has its own MAC key
//!
//! Authenticity:
//! - The tag covers associated data, ciphertext and both lengths
//! - Tags are compared in constant time
//! - Failed authentication tag -> reject before decrypting anything
//!
//! Memory Hygiene:
//! - Derived keys and computed tags are zeroized on drop, on every exit path
//!
//! Caller Obligations:
//! - Never reuse a nonce under the same key

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod aead;
mod derivation;
pub mod error;
mod keystream;
mod tag;
mod validation;

pub use aead::{
    ChaCha20Blake2b, ciphertext_len, decrypt, decrypt_into, encrypt, encrypt_into, plaintext_len,
};
pub use error::{AeadError, ErrorKind, Parameter};

/// Size of the master key (256-bit)
pub const KEY_LEN: usize = 32;

/// Size of the nonce (96-bit, RFC 8439 ChaCha20)
pub const NONCE_LEN: usize = 12;

/// Size of the BLAKE2b-256 authentication tag
pub const TAG_LEN: usize = 32;

/// Plaintext that still leaves room for the tag and both length fields in
/// the largest addressable object.
const ADDRESSABLE_PLAINTEXT_LEN: usize = isize::MAX as usize - tag::LENGTH_FIELDS_LEN - TAG_LEN;

/// Bytes of keystream ChaCha20 produces for one (key, nonce) pair.
const KEYSTREAM_LEN: u64 = u32::MAX as u64 * 64;

/// Exclusive upper bound on plaintext length.
///
/// The smaller of the addressable-size limit and the ChaCha20 keystream limit.
pub const MAX_PLAINTEXT_LEN: usize = if (ADDRESSABLE_PLAINTEXT_LEN as u64) < KEYSTREAM_LEN {
    ADDRESSABLE_PLAINTEXT_LEN
} else {
    KEYSTREAM_LEN as usize
};

/// Exclusive upper bound on ciphertext length (body and tag).
pub const MAX_CIPHERTEXT_LEN: usize = MAX_PLAINTEXT_LEN + TAG_LEN;

// Every valid ciphertext plus its length fields must stay addressable
const _: () = assert!(MAX_PLAINTEXT_LEN <= ADDRESSABLE_PLAINTEXT_LEN);
const _: () = assert!(MAX_PLAINTEXT_LEN as u64 <= KEYSTREAM_LEN);
