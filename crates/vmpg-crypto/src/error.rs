//! Error types for the crypto facade.

use thiserror::Error;

/// Errors surfaced by the crypto facade.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    /// A byte span had the wrong length for the key or signature it should hold.
    #[error("invalid length (expected {expected}, got {actual})")]
    InvalidLength {
        /// Required length in bytes.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// The bytes do not decode to a valid Ed25519 public key.
    #[error("invalid Ed25519 public key")]
    InvalidPublicKey,

    /// The signature did not verify over the given message.
    #[error("signature verification failed")]
    SignatureVerificationFailed,
}

/// Result type alias for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
