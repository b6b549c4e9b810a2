//! Error types for AEAD operations

use std::fmt;

use thiserror::Error;

/// Input that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    /// Plaintext passed to encrypt
    Plaintext,
    /// Ciphertext (body and tag) passed to decrypt
    Ciphertext,
    /// Nonce
    Nonce,
    /// Master key
    Key,
    /// Associated data
    AssociatedData,
    /// Caller-supplied output buffer
    Output,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Plaintext => "plaintext",
            Self::Ciphertext => "ciphertext",
            Self::Nonce => "nonce",
            Self::Key => "key",
            Self::AssociatedData => "associated data",
            Self::Output => "output buffer",
        };
        f.write_str(name)
    }
}

/// Broad classification of an [`AeadError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A size constraint was violated. Raised before any cryptographic work.
    InvalidArgument,
    /// The tag did not match. No plaintext was produced.
    AuthenticationFailure,
}

/// Errors from encrypt and decrypt operations.
///
/// Never carries key, nonce, plaintext or tag bytes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AeadError {
    /// A fixed-size input or the output buffer has the wrong length
    #[error("invalid {parameter} length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Offending input
        parameter: Parameter,
        /// Required length in bytes
        expected: usize,
        /// Supplied length in bytes
        actual: usize,
    },

    /// A variable-size input is at or above its bound
    #[error("{parameter} too long: {actual} bytes, must be less than {max}")]
    TooLong {
        /// Offending input
        parameter: Parameter,
        /// Exclusive upper bound in bytes
        max: usize,
        /// Supplied length in bytes
        actual: usize,
    },

    /// Body length + associated data length + length fields overflowed
    #[error("length overflow: {parameter} makes the authenticated message too large")]
    LengthOverflow {
        /// Offending input
        parameter: Parameter,
    },

    /// Tag mismatch on decrypt
    #[error("authentication failed")]
    AuthenticationFailed,
}

impl AeadError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidLength { .. } | Self::TooLong { .. } | Self::LengthOverflow { .. } => {
                ErrorKind::InvalidArgument
            },
            Self::AuthenticationFailed => ErrorKind::AuthenticationFailure,
        }
    }

    /// The input that failed validation, if this is an invalid-argument error.
    pub fn parameter(&self) -> Option<Parameter> {
        match self {
            Self::InvalidLength { parameter, .. }
            | Self::TooLong { parameter, .. }
            | Self::LengthOverflow { parameter } => Some(*parameter),
            Self::AuthenticationFailed => None,
        }
    }
}
