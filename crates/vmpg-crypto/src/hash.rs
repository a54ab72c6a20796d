//! BLAKE2b-256 hashing for VMPG packages.
//!
//! Digests are 32 bytes. The wire format calls the digest fields `sha256`;
//! the algorithm is BLAKE2b with a 256-bit output, and every implementation
//! must produce byte-identical digests.

use std::fmt;

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use subtle::ConstantTimeEq;

type Blake2b256 = Blake2b<U32>;

/// Digest size in bytes.
pub const DIGEST_SIZE: usize = 32;

/// A 32-byte package digest.
///
/// Equality is constant-time, so digests read from untrusted packages can be
/// compared against computed values without leaking timing.
#[derive(Clone, Copy, Default)]
pub struct Digest32([u8; DIGEST_SIZE]);

impl Digest32 {
    /// Construct a digest from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    /// True if every byte is zero.
    ///
    /// An all-zero digest is the wire convention for "no digest recorded".
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.ct_eq(&[0u8; DIGEST_SIZE]).into()
    }
}

impl PartialEq for Digest32 {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for Digest32 {}

impl AsRef<[u8]> for Digest32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Digest32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Digest32").field(&self.to_string()).finish()
    }
}

impl fmt::Display for Digest32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Incremental BLAKE2b-256 hasher.
///
/// Use this to hash payloads that arrive in chunks, e.g. when streaming a
/// package from slow storage through a scratch buffer.
pub struct PackageHasher {
    inner: Blake2b256,
}

impl PackageHasher {
    /// Start a new hash stream.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Blake2b256::new(),
        }
    }

    /// Feed more bytes into the stream.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Finish the stream and return the digest.
    #[must_use]
    pub fn finalize(self) -> Digest32 {
        Digest32(self.inner.finalize().into())
    }
}

impl Default for PackageHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot digest of a byte span.
#[must_use]
pub fn digest(data: &[u8]) -> Digest32 {
    let mut h = PackageHasher::new();
    h.update(data);
    h.finalize()
}

/// Hash `data` and compare against `expected` in constant time.
#[must_use]
pub fn verify_digest(data: &[u8], expected: &Digest32) -> bool {
    digest(data) == *expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_matches_incremental() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let one_shot = digest(data);

        let mut h = PackageHasher::new();
        h.update(&data[..10]);
        h.update(&data[10..]);
        assert_eq!(one_shot, h.finalize());
    }

    #[test]
    fn blake2b_256_empty_vector() {
        // BLAKE2b-256 of the empty string, from the BLAKE2 reference suite.
        let expected =
            hex::decode("0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8")
                .unwrap();
        assert_eq!(digest(b"").as_bytes().as_slice(), expected.as_slice());
    }

    #[test]
    fn blake2b_256_abc_vector() {
        let expected =
            hex::decode("bddd813c634239723171ef3fee98579b94964e3bb1cb3e427262c8c068d52319")
                .unwrap();
        assert_eq!(digest(b"abc").as_bytes().as_slice(), expected.as_slice());
    }

    #[test]
    fn verify_digest_round_trip() {
        let data = b"payload";
        let d = digest(data);
        assert!(verify_digest(data, &d));
        assert!(!verify_digest(b"payloae", &d));

        let mut flipped = *d.as_bytes();
        flipped[0] ^= 0x01;
        assert!(!verify_digest(data, &Digest32::from_bytes(flipped)));
    }

    #[test]
    fn zero_digest_detection() {
        assert!(Digest32::from_bytes([0u8; 32]).is_zero());
        assert!(!digest(b"x").is_zero());
    }
}
