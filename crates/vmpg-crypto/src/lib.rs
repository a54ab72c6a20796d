//! Crypto primitives for VMPG packages.
//!
//! This crate is the narrow facade between the package format and the
//! underlying cryptography. Everything the format layer needs is re-exported
//! from here:
//!
//! - [`hash`] - BLAKE2b-256 digests, incremental and one-shot
//! - [`ed25519`] - Ed25519 signing and verification (RFC 8032, SHA-512)
//! - [`wipe`] - constant-time comparison and secure memory wiping
//!
//! The package wire format stores 32-byte digests in fields named `sha256`
//! for historical reasons; the algorithm actually used is BLAKE2b-256. Any
//! implementation of this facade must produce identical digest bytes.
//!
//! # Example: hashing and verifying
//!
//! ```rust
//! use vmpg_crypto::hash::{digest, verify_digest};
//!
//! let payload = b"bitstream bytes";
//! let d = digest(payload);
//! assert!(verify_digest(payload, &d));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod ed25519;
pub mod error;
pub mod hash;
pub mod wipe;

pub use ed25519::{PublicKey, Signature, SigningKey, PUBLIC_KEY_SIZE, SECRET_KEY_SIZE, SIGNATURE_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use hash::{digest, verify_digest, Digest32, PackageHasher, DIGEST_SIZE};
pub use wipe::{ct_eq, wipe};
