//! Signed descriptor: the Ed25519 message binding a package's contents.
//!
//! The descriptor carries the digest of the program config plus the digest of
//! every artifact payload. Signing the 332 descriptor bytes therefore signs
//! the package content transitively. The signature engine consumes the raw
//! stored bytes; the descriptor is never hashed before signing.

use vmpg_crypto::Digest32;

use crate::result::{PackageError, PackageResult};
use crate::types::TocEntryType;

/// Artifact hash record length in bytes.
pub const ARTIFACT_HASH_LEN: usize = 36;

/// Signed descriptor record length in bytes.
pub const SIGNED_DESCRIPTOR_LEN: usize = 332;

/// Maximum artifacts a descriptor can bind.
pub const MAX_ARTIFACTS: usize = 8;

/// Artifact type plus the digest of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArtifactHash {
    /// Artifact payload type; `None` marks an unused slot.
    pub artifact_type: Option<TocEntryType>,
    /// Digest of the artifact payload bytes as stored.
    pub sha256: Digest32,
}

impl ArtifactHash {
    /// Encode to the 36-byte wire layout.
    #[must_use]
    pub fn encode(&self) -> [u8; ARTIFACT_HASH_LEN] {
        let mut buf = [0u8; ARTIFACT_HASH_LEN];
        let type_wire = self.artifact_type.map_or(0, TocEntryType::to_wire);
        buf[0..4].copy_from_slice(&type_wire.to_le_bytes());
        buf[4..36].copy_from_slice(self.sha256.as_bytes());
        buf
    }

    /// Decode from wire bytes.
    ///
    /// # Errors
    ///
    /// `InvalidTocEntry` on short input; `InvalidEnumValue` if the type field
    /// is outside the enumeration.
    pub fn decode(bytes: &[u8]) -> PackageResult<Self> {
        if bytes.len() < ARTIFACT_HASH_LEN {
            return Err(PackageError::InvalidTocEntry);
        }
        let type_wire = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&bytes[4..36]);
        Ok(Self {
            artifact_type: TocEntryType::from_wire(type_wire)?,
            sha256: Digest32::from_bytes(digest),
        })
    }

    /// True if the slot is entirely zero (unused).
    #[must_use]
    pub fn is_zeroed(&self) -> bool {
        self.artifact_type.is_none() && self.sha256.is_zero()
    }
}

/// Signed descriptor: config digest, artifact digests, flags, build id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignedDescriptor {
    /// Digest of the `config` payload bytes as stored.
    pub config_sha256: Digest32,
    /// Number of live artifact slots (0..=8).
    pub artifact_count: u8,
    /// Reserved padding; must be zero.
    pub reserved_pad: [u8; 3],
    /// Artifact digest slots; entries past `artifact_count` must be zeroed.
    pub artifacts: [ArtifactHash; MAX_ARTIFACTS],
    /// Reserved flag word; must be zero in v1.0.
    pub flags: u32,
    /// Build identifier assigned by the packaging tool.
    pub build_id: u32,
}

impl SignedDescriptor {
    /// Encode to the 332-byte wire layout. These are the exact bytes the
    /// Ed25519 signature covers.
    #[must_use]
    pub fn encode(&self) -> [u8; SIGNED_DESCRIPTOR_LEN] {
        let mut buf = [0u8; SIGNED_DESCRIPTOR_LEN];
        buf[0..32].copy_from_slice(self.config_sha256.as_bytes());
        buf[32] = self.artifact_count;
        buf[33..36].copy_from_slice(&self.reserved_pad);
        for (i, artifact) in self.artifacts.iter().enumerate() {
            let at = 36 + i * ARTIFACT_HASH_LEN;
            buf[at..at + ARTIFACT_HASH_LEN].copy_from_slice(&artifact.encode());
        }
        buf[324..328].copy_from_slice(&self.flags.to_le_bytes());
        buf[328..332].copy_from_slice(&self.build_id.to_le_bytes());
        buf
    }

    /// Decode from wire bytes.
    ///
    /// # Errors
    ///
    /// `InvalidTocEntry` on short input; `InvalidEnumValue` if an artifact
    /// type is outside the enumeration.
    pub fn decode(bytes: &[u8]) -> PackageResult<Self> {
        if bytes.len() < SIGNED_DESCRIPTOR_LEN {
            return Err(PackageError::InvalidTocEntry);
        }
        let mut config_digest = [0u8; 32];
        config_digest.copy_from_slice(&bytes[0..32]);
        let mut artifacts = [ArtifactHash::default(); MAX_ARTIFACTS];
        for (i, artifact) in artifacts.iter_mut().enumerate() {
            let at = 36 + i * ARTIFACT_HASH_LEN;
            *artifact = ArtifactHash::decode(&bytes[at..at + ARTIFACT_HASH_LEN])?;
        }
        Ok(Self {
            config_sha256: Digest32::from_bytes(config_digest),
            artifact_count: bytes[32],
            reserved_pad: [bytes[33], bytes[34], bytes[35]],
            artifacts,
            flags: u32::from_le_bytes([bytes[324], bytes[325], bytes[326], bytes[327]]),
            build_id: u32::from_le_bytes([bytes[328], bytes[329], bytes[330], bytes[331]]),
        })
    }

    /// Validate slot consistency and reserved zeroing.
    ///
    /// # Errors
    ///
    /// The first failed check, as a [`PackageError`].
    pub fn validate(&self) -> PackageResult<()> {
        if usize::from(self.artifact_count) > MAX_ARTIFACTS {
            return Err(PackageError::InvalidArtifactCount);
        }
        if self.reserved_pad.iter().any(|&b| b != 0) {
            return Err(PackageError::ReservedFieldNotZero);
        }
        let count = usize::from(self.artifact_count);
        for artifact in &self.artifacts[..count] {
            if artifact.artifact_type.is_none() {
                return Err(PackageError::InvalidArtifactCount);
            }
        }
        for artifact in &self.artifacts[count..] {
            if artifact.artifact_type.is_some() {
                return Err(PackageError::InvalidArtifactCount);
            }
            if !artifact.is_zeroed() {
                return Err(PackageError::ReservedFieldNotZero);
            }
        }
        if self.flags != 0 {
            return Err(PackageError::ReservedFieldNotZero);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vmpg_crypto::digest;

    fn valid_descriptor() -> SignedDescriptor {
        let mut descriptor = SignedDescriptor {
            config_sha256: digest(b"config bytes"),
            artifact_count: 2,
            build_id: 0x0100_0042,
            ..SignedDescriptor::default()
        };
        descriptor.artifacts[0] = ArtifactHash {
            artifact_type: Some(TocEntryType::FpgaBitstream),
            sha256: digest(b"bitstream a"),
        };
        descriptor.artifacts[1] = ArtifactHash {
            artifact_type: Some(TocEntryType::BitstreamHdHdmi),
            sha256: digest(b"bitstream b"),
        };
        descriptor
    }

    #[test]
    fn encode_decode_round_trip() {
        let descriptor = valid_descriptor();
        let bytes = descriptor.encode();
        assert_eq!(bytes.len(), SIGNED_DESCRIPTOR_LEN);
        assert_eq!(SignedDescriptor::decode(&bytes).unwrap(), descriptor);
    }

    #[test]
    fn valid_descriptor_passes() {
        assert_eq!(valid_descriptor().validate(), Ok(()));
    }

    #[test]
    fn zeroed_slot_detection() {
        assert!(ArtifactHash::default().is_zeroed());
        assert!(!valid_descriptor().artifacts[0].is_zeroed());

        let stray = ArtifactHash {
            artifact_type: None,
            sha256: digest(b"stray"),
        };
        assert!(!stray.is_zeroed());
    }

    #[test]
    fn rejects_count_above_maximum() {
        let mut descriptor = valid_descriptor();
        descriptor.artifact_count = 9;
        assert_eq!(
            descriptor.validate(),
            Err(PackageError::InvalidArtifactCount)
        );
    }

    #[test]
    fn rejects_nonzero_reserved_pad() {
        let mut descriptor = valid_descriptor();
        descriptor.reserved_pad[1] = 0xFF;
        assert_eq!(
            descriptor.validate(),
            Err(PackageError::ReservedFieldNotZero)
        );
    }

    #[test]
    fn rejects_none_type_in_live_slot() {
        let mut descriptor = valid_descriptor();
        descriptor.artifacts[1].artifact_type = None;
        descriptor.artifacts[1].sha256 = Digest32::default();
        assert_eq!(
            descriptor.validate(),
            Err(PackageError::InvalidArtifactCount)
        );
    }

    #[test]
    fn rejects_live_type_in_unused_slot() {
        let mut descriptor = valid_descriptor();
        descriptor.artifacts[5].artifact_type = Some(TocEntryType::FpgaBitstream);
        assert_eq!(
            descriptor.validate(),
            Err(PackageError::InvalidArtifactCount)
        );
    }

    #[test]
    fn rejects_stray_hash_in_unused_slot() {
        let mut descriptor = valid_descriptor();
        descriptor.artifacts[7].sha256 = digest(b"stray");
        assert_eq!(
            descriptor.validate(),
            Err(PackageError::ReservedFieldNotZero)
        );
    }

    #[test]
    fn rejects_nonzero_flags() {
        let mut descriptor = valid_descriptor();
        descriptor.flags = 1;
        assert_eq!(
            descriptor.validate(),
            Err(PackageError::ReservedFieldNotZero)
        );
    }
}
