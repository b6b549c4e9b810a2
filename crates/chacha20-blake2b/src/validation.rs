//! Input validation
//!
//! Every size constraint is checked here before any key derivation or cipher
//! work. Body and associated-data sizes are passed as lengths so the overflow
//! rules can be exercised without allocating the buffers they describe.

use crate::{
    KEY_LEN, MAX_CIPHERTEXT_LEN, MAX_PLAINTEXT_LEN, NONCE_LEN, TAG_LEN,
    error::{AeadError, Parameter},
    tag::LENGTH_FIELDS_LEN,
};

/// Largest authenticated message (body + associated data + length fields).
const MAX_FRAMED_LEN: usize = isize::MAX as usize;

/// Fixed-size inputs after their lengths have been checked.
pub(crate) struct FixedInputs<'a> {
    pub(crate) key: &'a [u8; KEY_LEN],
    pub(crate) nonce: &'a [u8; NONCE_LEN],
}

/// Validate the inputs of an encrypt call.
pub(crate) fn encrypt_inputs<'a>(
    plaintext_len: usize,
    output_len: usize,
    nonce: &'a [u8],
    key: &'a [u8],
    associated_data_len: Option<usize>,
) -> Result<FixedInputs<'a>, AeadError> {
    let result = check_encrypt(plaintext_len, output_len, nonce, key, associated_data_len);
    if let Err(error) = &result {
        tracing::debug!(%error, plaintext_len, output_len, "rejected encrypt input");
    }
    result
}

/// Validate the inputs of a decrypt call.
///
/// Returns the fixed-size inputs and the length of the ciphertext body.
pub(crate) fn decrypt_inputs<'a>(
    ciphertext_len: usize,
    output_len: usize,
    nonce: &'a [u8],
    key: &'a [u8],
    associated_data_len: Option<usize>,
) -> Result<(FixedInputs<'a>, usize), AeadError> {
    let result = check_decrypt(ciphertext_len, output_len, nonce, key, associated_data_len);
    if let Err(error) = &result {
        tracing::debug!(%error, ciphertext_len, output_len, "rejected decrypt input");
    }
    result
}

fn check_encrypt<'a>(
    plaintext_len: usize,
    output_len: usize,
    nonce: &'a [u8],
    key: &'a [u8],
    associated_data_len: Option<usize>,
) -> Result<FixedInputs<'a>, AeadError> {
    if plaintext_len >= MAX_PLAINTEXT_LEN {
        return Err(AeadError::TooLong {
            parameter: Parameter::Plaintext,
            max: MAX_PLAINTEXT_LEN,
            actual: plaintext_len,
        });
    }

    // Cannot overflow: plaintext_len < MAX_PLAINTEXT_LEN <= isize::MAX - TAG_LEN
    let expected = plaintext_len + TAG_LEN;
    if output_len != expected {
        return Err(AeadError::InvalidLength { parameter: Parameter::Output, expected, actual: output_len });
    }

    let fixed = fixed_inputs(nonce, key)?;
    check_framed_len(plaintext_len, associated_data_len)?;
    Ok(fixed)
}

fn check_decrypt<'a>(
    ciphertext_len: usize,
    output_len: usize,
    nonce: &'a [u8],
    key: &'a [u8],
    associated_data_len: Option<usize>,
) -> Result<(FixedInputs<'a>, usize), AeadError> {
    if ciphertext_len >= MAX_CIPHERTEXT_LEN {
        return Err(AeadError::TooLong {
            parameter: Parameter::Ciphertext,
            max: MAX_CIPHERTEXT_LEN,
            actual: ciphertext_len,
        });
    }

    let Some(body_len) = ciphertext_len.checked_sub(TAG_LEN) else {
        return Err(AeadError::InvalidLength {
            parameter: Parameter::Ciphertext,
            expected: TAG_LEN,
            actual: ciphertext_len,
        });
    };

    if output_len != body_len {
        return Err(AeadError::InvalidLength {
            parameter: Parameter::Output,
            expected: body_len,
            actual: output_len,
        });
    }

    let fixed = fixed_inputs(nonce, key)?;
    check_framed_len(body_len, associated_data_len)?;
    Ok((fixed, body_len))
}

fn fixed_inputs<'a>(nonce: &'a [u8], key: &'a [u8]) -> Result<FixedInputs<'a>, AeadError> {
    let Ok(nonce) = <&[u8; NONCE_LEN]>::try_from(nonce) else {
        return Err(AeadError::InvalidLength {
            parameter: Parameter::Nonce,
            expected: NONCE_LEN,
            actual: nonce.len(),
        });
    };

    let Ok(key) = <&[u8; KEY_LEN]>::try_from(key) else {
        return Err(AeadError::InvalidLength {
            parameter: Parameter::Key,
            expected: KEY_LEN,
            actual: key.len(),
        });
    };

    Ok(FixedInputs { key, nonce })
}

/// Reject associated data whose framed message size cannot be represented.
///
/// Absent associated data adds nothing to the body, which is already bounded.
fn check_framed_len(body_len: usize, associated_data_len: Option<usize>) -> Result<(), AeadError> {
    let Some(associated_data_len) = associated_data_len else {
        return Ok(());
    };

    let framed_len = body_len
        .checked_add(associated_data_len)
        .and_then(|len| len.checked_add(LENGTH_FIELDS_LEN));

    match framed_len {
        Some(len) if len <= MAX_FRAMED_LEN => Ok(()),
        _ => Err(AeadError::LengthOverflow { parameter: Parameter::AssociatedData }),
    }
}
