//! Fuzz target for encrypt/decrypt round trips
//!
//! # Strategy
//!
//! - Arbitrary plaintext, key, nonce and associated data
//! - Both constructions
//! - A single mutation of ciphertext, nonce, key or associated data
//!
//! # Invariants
//!
//! - Encryption with well-sized inputs never fails
//! - Ciphertext is exactly one tag longer than the plaintext
//! - Encryption is deterministic
//! - decrypt(encrypt(m)) == m
//! - Any mutation fails authentication and leaves the output buffer untouched

#![no_main]

use arbitrary::Arbitrary;
use chacha20_blake2b::{AeadError, ChaCha20Blake2b, KEY_LEN, NONCE_LEN, TAG_LEN};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
struct RoundtripScenario {
    legacy: bool,
    key: [u8; KEY_LEN],
    nonce: [u8; NONCE_LEN],
    plaintext: Vec<u8>,
    associated_data: Option<Vec<u8>>,
    mutation: Mutation,
}

#[derive(Debug, Clone, Arbitrary)]
enum Mutation {
    /// Flip bits in one ciphertext byte (index wraps)
    Ciphertext { index: usize, mask: u8 },
    /// Flip bits in one nonce byte
    Nonce { index: u8, mask: u8 },
    /// Flip bits in one key byte
    Key { index: u8, mask: u8 },
    /// Append a byte to the associated data
    ExtendAssociatedData { byte: u8 },
    /// Drop the last ciphertext byte
    Truncate,
}

fuzz_target!(|scenario: RoundtripScenario| {
    let aead = if scenario.legacy { ChaCha20Blake2b::legacy() } else { ChaCha20Blake2b::new() };
    let associated_data = scenario.associated_data.as_deref();

    let Ok(ciphertext) =
        aead.encrypt(&scenario.plaintext, &scenario.nonce, &scenario.key, associated_data)
    else {
        panic!("encryption of well-sized inputs must succeed");
    };
    assert_eq!(ciphertext.len(), scenario.plaintext.len() + TAG_LEN);

    let again = aead.encrypt(&scenario.plaintext, &scenario.nonce, &scenario.key, associated_data);
    assert_eq!(again.as_ref(), Ok(&ciphertext), "encryption must be deterministic");

    let decrypted = aead.decrypt(&ciphertext, &scenario.nonce, &scenario.key, associated_data);
    assert_eq!(decrypted.as_ref(), Ok(&scenario.plaintext), "roundtrip must restore plaintext");

    let mut ciphertext = ciphertext;
    let mut nonce = scenario.nonce;
    let mut key = scenario.key;
    let mut extended = scenario.associated_data.clone().unwrap_or_default();
    let mut associated_data = associated_data;

    match scenario.mutation {
        Mutation::Ciphertext { index, mask } => {
            if mask == 0 {
                return;
            }
            let i = index % ciphertext.len();
            ciphertext[i] ^= mask;
        },
        Mutation::Nonce { index, mask } => {
            if mask == 0 {
                return;
            }
            nonce[usize::from(index) % NONCE_LEN] ^= mask;
        },
        Mutation::Key { index, mask } => {
            if mask == 0 {
                return;
            }
            key[usize::from(index) % KEY_LEN] ^= mask;
        },
        Mutation::ExtendAssociatedData { byte } => {
            extended.push(byte);
            associated_data = Some(extended.as_slice());
        },
        Mutation::Truncate => {
            ciphertext.pop();
        },
    }

    let mut output = vec![0xA5u8; ciphertext.len().saturating_sub(TAG_LEN)];
    let result = aead.decrypt_into(&mut output, &ciphertext, &nonce, &key, associated_data);

    match result {
        Err(AeadError::AuthenticationFailed) => {},
        // Truncating an empty message leaves less than a tag
        Err(AeadError::InvalidLength { .. }) if ciphertext.len() < TAG_LEN => {},
        other => panic!("mutated input must not verify: {other:?}"),
    }
    assert!(output.iter().all(|&b| b == 0xA5), "failed decrypt must not write plaintext");
});
