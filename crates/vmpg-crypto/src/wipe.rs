//! Constant-time comparison and secure memory wiping.

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// Compare two byte spans in constant time.
///
/// Spans of different lengths compare unequal; the length check itself is not
/// secret. Use this for hashes, signatures, and key material read from
/// untrusted packages.
#[must_use]
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Zero a buffer in a way the compiler is not allowed to optimize away.
///
/// Callers own their sensitive buffers (signatures, scratch holding key
/// material) and are responsible for wiping them when done; this is the
/// primitive they use.
pub fn wipe(buf: &mut [u8]) {
    buf.zeroize();
}
