//! Ed25519 signature verification over signed descriptors.
//!
//! The signed message is the raw 332 stored bytes of the descriptor, never a
//! hash of them. A package is signed-valid only when the header flag is set,
//! the descriptor and signature entries exist with their exact contractual
//! sizes and verify structurally, the signature verifies over the stored
//! descriptor bytes, and the descriptor's config digest matches the config
//! payload actually present.

use tracing::debug;
use vmpg_crypto::{PublicKey, Signature, SIGNATURE_SIZE};

use crate::descriptor::{SignedDescriptor, SIGNED_DESCRIPTOR_LEN};
use crate::integrity::{payload_digest, payload_of};
use crate::result::{PackageError, PackageResult};
use crate::toc::{find_entry, TocEntry};
use crate::trust::TRUSTED_KEYS;
use crate::types::TocEntryType;

/// Verify a signature over raw descriptor bytes with one key.
#[must_use]
pub fn verify_descriptor_signature(
    descriptor_bytes: &[u8; SIGNED_DESCRIPTOR_LEN],
    signature: &Signature,
    public_key: &PublicKey,
) -> bool {
    public_key.verify(descriptor_bytes, signature).is_ok()
}

/// Try every built-in trust anchor; returns the index of the first key that
/// verifies.
#[must_use]
pub fn verify_with_trusted_keys(
    descriptor_bytes: &[u8; SIGNED_DESCRIPTOR_LEN],
    signature: &Signature,
) -> Option<usize> {
    TRUSTED_KEYS.iter().position(|key_bytes| {
        PublicKey::from_bytes(key_bytes)
            .map(|key| verify_descriptor_signature(descriptor_bytes, signature, &key))
            .unwrap_or(false)
    })
}

/// Locate the signed descriptor entry and decode its payload.
///
/// The entry size must be exactly [`SIGNED_DESCRIPTOR_LEN`].
///
/// # Errors
///
/// `InvalidTocEntry` if the entry is missing or mis-sized; decode and
/// validation errors from the descriptor itself.
pub fn read_descriptor(file: &[u8], toc: &[TocEntry]) -> PackageResult<SignedDescriptor> {
    let (_, entry) =
        find_entry(toc, TocEntryType::SignedDescriptor).ok_or(PackageError::InvalidTocEntry)?;
    if entry.size as usize != SIGNED_DESCRIPTOR_LEN {
        return Err(PackageError::InvalidTocEntry);
    }
    let descriptor = SignedDescriptor::decode(payload_of(file, entry)?)?;
    descriptor.validate()?;
    Ok(descriptor)
}

/// Locate the signature entry and decode its payload.
///
/// The entry size must be exactly 64.
///
/// # Errors
///
/// `InvalidTocEntry` if the entry is missing; `InvalidHash` if it is
/// mis-sized or unreadable.
pub fn read_signature(file: &[u8], toc: &[TocEntry]) -> PackageResult<Signature> {
    let (_, entry) =
        find_entry(toc, TocEntryType::Signature).ok_or(PackageError::InvalidTocEntry)?;
    if entry.size as usize != SIGNATURE_SIZE {
        return Err(PackageError::InvalidHash);
    }
    Signature::try_from_slice(payload_of(file, entry)?).map_err(|_| PackageError::InvalidHash)
}

/// Verify the package signature and the descriptor's config binding.
///
/// With `public_key` the caller's key is used and `Ok(None)` is returned on
/// success; without it the built-in registry is tried and the matching index
/// is returned. When a `config` entry is present, its payload digest must
/// equal the descriptor's `config_sha256`.
///
/// # Errors
///
/// `InvalidTocEntry` for missing entries; `InvalidHash` for a signature that
/// does not verify or a config digest that does not bind.
pub fn verify_package_signature(
    file: &[u8],
    toc: &[TocEntry],
    public_key: Option<&PublicKey>,
) -> PackageResult<Option<usize>> {
    let (_, desc_entry) =
        find_entry(toc, TocEntryType::SignedDescriptor).ok_or(PackageError::InvalidTocEntry)?;
    if desc_entry.size as usize != SIGNED_DESCRIPTOR_LEN {
        return Err(PackageError::InvalidTocEntry);
    }
    let payload = payload_of(file, desc_entry)?;
    let mut descriptor_bytes = [0u8; SIGNED_DESCRIPTOR_LEN];
    descriptor_bytes.copy_from_slice(payload);
    let descriptor = SignedDescriptor::decode(payload)?;
    descriptor.validate()?;

    let signature = read_signature(file, toc)?;

    let matched = match public_key {
        Some(key) => {
            if !verify_descriptor_signature(&descriptor_bytes, &signature, key) {
                debug!("signature rejected by caller-supplied key");
                return Err(PackageError::InvalidHash);
            }
            None
        }
        None => match verify_with_trusted_keys(&descriptor_bytes, &signature) {
            Some(index) => Some(index),
            None => {
                debug!("signature rejected by every built-in trust anchor");
                return Err(PackageError::InvalidHash);
            }
        },
    };

    // Bind the signed descriptor to the config payload actually shipped.
    if let Some((_, config_entry)) = find_entry(toc, TocEntryType::Config) {
        let config_payload = payload_of(file, config_entry)?;
        if payload_digest(config_payload) != descriptor.config_sha256 {
            debug!("config digest does not match the signed descriptor");
            return Err(PackageError::InvalidHash);
        }
    }

    Ok(matched)
}
