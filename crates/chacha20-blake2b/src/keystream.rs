//! ChaCha20 keystream application
//!
//! RFC 8439 ChaCha20 with a 12-byte nonce and the block counter starting at
//! zero. Encryption and decryption are the same operation.

use chacha20::{
    ChaCha20,
    cipher::{KeyIvInit, StreamCipher},
};

use crate::{
    NONCE_LEN,
    derivation::SubKey,
    error::{AeadError, Parameter},
};

/// XOR the keystream for (`encryption_key`, `nonce`) over `input` into `output`.
///
/// `output` must be exactly as long as `input`.
pub(crate) fn apply_keystream(
    encryption_key: &SubKey,
    nonce: &[u8; NONCE_LEN],
    input: &[u8],
    output: &mut [u8],
) -> Result<(), AeadError> {
    if output.len() != input.len() {
        return Err(AeadError::InvalidLength {
            parameter: Parameter::Output,
            expected: input.len(),
            actual: output.len(),
        });
    }

    let mut cipher = ChaCha20::new(encryption_key.as_bytes().into(), nonce.into());
    output.copy_from_slice(input);
    cipher.try_apply_keystream(output).map_err(|_| AeadError::TooLong {
        parameter: Parameter::Plaintext,
        max: crate::MAX_PLAINTEXT_LEN,
        actual: input.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> SubKey {
        SubKey::from_bytes([byte; 32])
    }

    #[test]
    fn output_length_matches_input() {
        let input = b"length preserving";
        let mut output = [0u8; 17];

        apply_keystream(&key(1), &[0u8; NONCE_LEN], input, &mut output).unwrap();

        assert_ne!(&output, input);
    }

    #[test]
    fn applying_twice_restores_input() {
        let input = vec![0x5Au8; 1000];
        let mut encrypted = vec![0u8; input.len()];
        let mut decrypted = vec![0u8; input.len()];

        apply_keystream(&key(2), &[7u8; NONCE_LEN], &input, &mut encrypted).unwrap();
        apply_keystream(&key(2), &[7u8; NONCE_LEN], &encrypted, &mut decrypted).unwrap();

        assert_eq!(decrypted, input);
    }

    #[test]
    fn rfc8439_zero_key_keystream() {
        // RFC 8439 appendix A.1, test vector #1: zero key, zero nonce, counter 0
        let mut output = [0u8; 32];

        apply_keystream(&key(0), &[0u8; NONCE_LEN], &[0u8; 32], &mut output).unwrap();

        let expected =
            hex::decode("76b8e0ada0f13d90405d6ae55386bd28bdd219b8a08ded1aa836efcc8b770dc7").unwrap();
        assert_eq!(output.as_slice(), expected.as_slice());
    }

    #[test]
    fn empty_input_is_a_no_op() {
        let mut output: [u8; 0] = [];
        apply_keystream(&key(3), &[0u8; NONCE_LEN], &[], &mut output).unwrap();
    }

    #[test]
    fn rejects_mismatched_output() {
        let mut output = [0u8; 4];
        let result = apply_keystream(&key(4), &[0u8; NONCE_LEN], b"abc", &mut output);

        assert!(matches!(
            result,
            Err(AeadError::InvalidLength { parameter: Parameter::Output, expected: 3, actual: 4 })
        ));
    }
}
