//! Package header: 64 bytes of file-level framing.
//!
//! # Wire Format
//!
//! ```text
//! Bytes 0-3:    Magic (0x56 0x4D 0x50 0x47 = "VMPG")
//! Bytes 4-5:    Version major (u16 LE, must be 1)
//! Bytes 6-7:    Version minor (u16 LE)
//! Bytes 8-9:    Header size (u16 LE, must be 64)
//! Bytes 10-11:  Reserved padding (u16 LE, must be 0)
//! Bytes 12-15:  File size (u32 LE)
//! Bytes 16-19:  Flags (u32 LE, bit 0 = signed)
//! Bytes 20-23:  TOC offset (u32 LE)
//! Bytes 24-27:  TOC size in bytes (u32 LE)
//! Bytes 28-31:  TOC entry count (u32 LE)
//! Bytes 32-63:  Package digest (32 bytes, all-zero = absent)
//! ```

use vmpg_crypto::Digest32;

use crate::result::{PackageError, PackageResult};
use crate::toc::TOC_ENTRY_LEN;
use crate::types::HeaderFlags;

/// Header magic: "VMPG" read as a little-endian u32.
pub const MAGIC: u32 = 0x4750_4D56;

/// Fixed header length in bytes.
pub const HEADER_LEN: usize = 64;

/// Current format major version.
pub const VERSION_MAJOR: u16 = 1;

/// Highest minor version this reader understands.
pub const VERSION_MINOR: u16 = 0;

/// Maximum package file size in bytes (1 MiB).
pub const MAX_FILE_SIZE: u32 = 1_048_576;

/// Maximum number of TOC entries a well-formed package may declare.
pub const MAX_TOC_COUNT: u32 = 256;

/// Parsed package header.
///
/// `flags` stays raw so that validation can report unknown bits with the
/// correct result code in the contractual check order; use
/// [`Header::header_flags`] after validation for the typed view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Magic number ("VMPG").
    pub magic: u32,
    /// Format major version.
    pub version_major: u16,
    /// Format minor version.
    pub version_minor: u16,
    /// Header length (always 64).
    pub header_size: u16,
    /// Reserved; zero in well-formed packages.
    pub reserved_pad: u16,
    /// Total file size in bytes.
    pub file_size: u32,
    /// Raw header flags.
    pub flags: u32,
    /// Byte offset of the TOC from file start.
    pub toc_offset: u32,
    /// TOC size in bytes.
    pub toc_bytes: u32,
    /// Number of TOC entries.
    pub toc_count: u32,
    /// Whole-file digest with this field zeroed; all-zero means absent.
    pub sha256_package: Digest32,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            version_major: VERSION_MAJOR,
            version_minor: VERSION_MINOR,
            header_size: HEADER_LEN as u16,
            reserved_pad: 0,
            file_size: 0,
            flags: 0,
            toc_offset: 0,
            toc_bytes: 0,
            toc_count: 0,
            sha256_package: Digest32::default(),
        }
    }
}

impl Header {
    /// Encode to the 64-byte wire layout.
    #[must_use]
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0..4].copy_from_slice(&self.magic.to_le_bytes());
        buf[4..6].copy_from_slice(&self.version_major.to_le_bytes());
        buf[6..8].copy_from_slice(&self.version_minor.to_le_bytes());
        buf[8..10].copy_from_slice(&self.header_size.to_le_bytes());
        buf[10..12].copy_from_slice(&self.reserved_pad.to_le_bytes());
        buf[12..16].copy_from_slice(&self.file_size.to_le_bytes());
        buf[16..20].copy_from_slice(&self.flags.to_le_bytes());
        buf[20..24].copy_from_slice(&self.toc_offset.to_le_bytes());
        buf[24..28].copy_from_slice(&self.toc_bytes.to_le_bytes());
        buf[28..32].copy_from_slice(&self.toc_count.to_le_bytes());
        buf[32..64].copy_from_slice(self.sha256_package.as_bytes());
        buf
    }

    /// Decode from wire bytes.
    ///
    /// Pure reinterpretation: nothing is checked here beyond the length, so
    /// [`Header::validate`] can report failures in the contractual order.
    ///
    /// # Errors
    ///
    /// `InvalidFileSize` if fewer than 64 bytes are supplied.
    pub fn decode(bytes: &[u8]) -> PackageResult<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(PackageError::InvalidFileSize);
        }
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&bytes[32..64]);
        Ok(Self {
            magic: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            version_major: u16::from_le_bytes([bytes[4], bytes[5]]),
            version_minor: u16::from_le_bytes([bytes[6], bytes[7]]),
            header_size: u16::from_le_bytes([bytes[8], bytes[9]]),
            reserved_pad: u16::from_le_bytes([bytes[10], bytes[11]]),
            file_size: u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
            flags: u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]),
            toc_offset: u32::from_le_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]),
            toc_bytes: u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]),
            toc_count: u32::from_le_bytes([bytes[28], bytes[29], bytes[30], bytes[31]]),
            sha256_package: Digest32::from_bytes(digest),
        })
    }

    /// Validate against the actual file size.
    ///
    /// Check order is contractual: magic, version, header size, file-size
    /// envelope, TOC count, TOC offset, TOC byte size. The count is bounded
    /// before it is multiplied so the size check cannot overflow.
    ///
    /// # Errors
    ///
    /// The first failed check, as a [`PackageError`].
    pub fn validate(&self, file_size: u32) -> PackageResult<()> {
        if self.magic != MAGIC {
            return Err(PackageError::InvalidMagic);
        }
        if self.version_major != VERSION_MAJOR || self.version_minor > VERSION_MINOR {
            return Err(PackageError::InvalidVersion);
        }
        if self.header_size != HEADER_LEN as u16 {
            return Err(PackageError::InvalidHeaderSize);
        }
        if self.reserved_pad != 0 {
            return Err(PackageError::ReservedFieldNotZero);
        }
        if file_size < HEADER_LEN as u32
            || file_size > MAX_FILE_SIZE
            || file_size != self.file_size
        {
            return Err(PackageError::InvalidFileSize);
        }
        if self.toc_count == 0 || self.toc_count > MAX_TOC_COUNT {
            return Err(PackageError::InvalidTocCount);
        }
        if self.toc_offset < HEADER_LEN as u32 || self.toc_offset >= file_size {
            return Err(PackageError::InvalidTocOffset);
        }
        // Safe from overflow: count <= 256 and offset < file_size <= 1 MiB.
        let toc_bytes = self.toc_count * TOC_ENTRY_LEN as u32;
        if self.toc_bytes != toc_bytes || self.toc_offset + toc_bytes > file_size {
            return Err(PackageError::InvalidTocSize);
        }
        // Unknown flag bits are rejected so signatures stay stable across
        // minor revisions.
        HeaderFlags::from_wire(self.flags)?;
        Ok(())
    }

    /// Typed view of the header flags.
    ///
    /// # Errors
    ///
    /// `ReservedFieldNotZero` if any undefined bit is set.
    pub fn header_flags(&self) -> PackageResult<HeaderFlags> {
        HeaderFlags::from_wire(self.flags)
    }

    /// True if the signed flag bit is set.
    #[must_use]
    pub fn is_signed(&self) -> bool {
        self.flags & HeaderFlags::SIGNED.bits() != 0
    }
}
