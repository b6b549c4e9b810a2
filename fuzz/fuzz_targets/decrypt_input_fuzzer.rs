//! Fuzz target for decryption of untrusted input
//!
//! Feeds attacker-controlled ciphertext, nonce, key, associated data and
//! output buffer sizes straight into decryption.
//!
//! # Invariants
//!
//! - Decryption never panics
//! - Malformed sizes are reported as argument errors, not authentication
//!   failures
//! - Random ciphertext never authenticates

#![no_main]

use arbitrary::Arbitrary;
use chacha20_blake2b::{ChaCha20Blake2b, ErrorKind, KEY_LEN, NONCE_LEN, TAG_LEN, plaintext_len};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
struct DecryptInput {
    legacy: bool,
    ciphertext: Vec<u8>,
    nonce: Vec<u8>,
    key: Vec<u8>,
    associated_data: Option<Vec<u8>>,
    /// Offset applied to the correct output length
    output_skew: i8,
}

fuzz_target!(|input: DecryptInput| {
    let aead = if input.legacy { ChaCha20Blake2b::legacy() } else { ChaCha20Blake2b::new() };

    let associated_data = input.associated_data.as_deref();
    let expected_len = plaintext_len(input.ciphertext.len());
    let output_len = expected_len
        .unwrap_or_default()
        .saturating_add_signed(isize::from(input.output_skew));
    let mut output = vec![0u8; output_len];

    let result =
        aead.decrypt_into(&mut output, &input.ciphertext, &input.nonce, &input.key, associated_data);

    let well_sized = input.ciphertext.len() >= TAG_LEN
        && input.nonce.len() == NONCE_LEN
        && input.key.len() == KEY_LEN
        && expected_len == Some(output_len);

    match result {
        Ok(()) => panic!("random ciphertext authenticated"),
        Err(error) if well_sized => assert_eq!(error.kind(), ErrorKind::AuthenticationFailure),
        Err(error) => assert_eq!(error.kind(), ErrorKind::InvalidArgument),
    }

    let owned = aead.decrypt(&input.ciphertext, &input.nonce, &input.key, associated_data);
    assert!(owned.is_err());
});
