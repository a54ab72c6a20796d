//! Built-in trust anchors.
//!
//! The firmware image ships with this list compiled in; it is not
//! configurable at runtime. Tests exercising signature verification supply
//! their own key through the caller-key path instead of mutating this list.

use vmpg_crypto::PUBLIC_KEY_SIZE;

/// Ed25519 public keys trusted to sign packages.
pub const TRUSTED_KEYS: [[u8; PUBLIC_KEY_SIZE]; 1] = [[
    0xd4, 0xda, 0x2b, 0x01, 0x98, 0x06, 0x77, 0x89, //
    0x21, 0x75, 0x3d, 0xa9, 0x1d, 0xb8, 0xef, 0x9b, //
    0xb7, 0x9a, 0xac, 0xf4, 0x13, 0x66, 0x70, 0xfd, //
    0x7c, 0x8d, 0x48, 0x69, 0x1a, 0xd7, 0x4e, 0x4b,
]];
