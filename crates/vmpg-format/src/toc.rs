//! Table-of-contents entries: one 64-byte record per payload section.
//!
//! # Wire Format
//!
//! ```text
//! Bytes 0-3:    Entry type (u32 LE, nonzero)
//! Bytes 4-7:    Flags (u32 LE, must be 0 in v1.0)
//! Bytes 8-11:   Payload offset from file start (u32 LE)
//! Bytes 12-15:  Payload size (u32 LE, 0 = no payload)
//! Bytes 16-47:  Payload digest (32 bytes)
//! Bytes 48-63:  Reserved (4 x u32 LE, must be 0)
//! ```

use vmpg_crypto::Digest32;

use crate::header::{Header, HEADER_LEN};
use crate::result::{PackageError, PackageResult};
use crate::types::TocEntryType;

/// Fixed TOC entry length in bytes.
pub const TOC_ENTRY_LEN: usize = 64;

/// One table-of-contents entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TocEntry {
    /// Payload section type; `None` is the zeroed "unused" value, which is
    /// forbidden in a live TOC.
    pub entry_type: Option<TocEntryType>,
    /// Reserved flag word; must be zero in v1.0.
    pub flags: u32,
    /// Payload offset from file start.
    pub offset: u32,
    /// Payload size in bytes; zero means no payload.
    pub size: u32,
    /// Digest of the payload bytes exactly as stored.
    pub sha256: Digest32,
    /// Reserved words; must be zero.
    pub reserved: [u32; 4],
}

impl Default for TocEntry {
    fn default() -> Self {
        Self {
            entry_type: None,
            flags: 0,
            offset: 0,
            size: 0,
            sha256: Digest32::default(),
            reserved: [0; 4],
        }
    }
}

impl TocEntry {
    /// Encode to the 64-byte wire layout.
    #[must_use]
    pub fn encode(&self) -> [u8; TOC_ENTRY_LEN] {
        let mut buf = [0u8; TOC_ENTRY_LEN];
        let type_wire = self.entry_type.map_or(0, TocEntryType::to_wire);
        buf[0..4].copy_from_slice(&type_wire.to_le_bytes());
        buf[4..8].copy_from_slice(&self.flags.to_le_bytes());
        buf[8..12].copy_from_slice(&self.offset.to_le_bytes());
        buf[12..16].copy_from_slice(&self.size.to_le_bytes());
        buf[16..48].copy_from_slice(self.sha256.as_bytes());
        for (i, word) in self.reserved.iter().enumerate() {
            buf[48 + i * 4..52 + i * 4].copy_from_slice(&word.to_le_bytes());
        }
        buf
    }

    /// Decode from wire bytes.
    ///
    /// # Errors
    ///
    /// `InvalidTocEntry` if fewer than 64 bytes are supplied;
    /// `InvalidEnumValue` if the type field is outside the enumeration.
    pub fn decode(bytes: &[u8]) -> PackageResult<Self> {
        if bytes.len() < TOC_ENTRY_LEN {
            return Err(PackageError::InvalidTocEntry);
        }
        let type_wire = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&bytes[16..48]);
        let mut reserved = [0u32; 4];
        for (i, word) in reserved.iter_mut().enumerate() {
            *word = u32::from_le_bytes([
                bytes[48 + i * 4],
                bytes[49 + i * 4],
                bytes[50 + i * 4],
                bytes[51 + i * 4],
            ]);
        }
        Ok(Self {
            entry_type: TocEntryType::from_wire(type_wire)?,
            flags: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            offset: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            size: u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
            sha256: Digest32::from_bytes(digest),
            reserved,
        })
    }

    /// Validate against the surrounding file size.
    ///
    /// # Errors
    ///
    /// The first failed check, as a [`PackageError`].
    pub fn validate(&self, file_size: u32) -> PackageResult<()> {
        if self.entry_type.is_none() {
            return Err(PackageError::InvalidTocEntry);
        }
        if self.flags != 0 {
            return Err(PackageError::ReservedFieldNotZero);
        }
        if self.offset < HEADER_LEN as u32 || self.offset >= file_size {
            return Err(PackageError::InvalidPayloadOffset);
        }
        // Widened so a size near u32::MAX cannot wrap the bound check.
        if self.size > 0 && u64::from(self.offset) + u64::from(self.size) > u64::from(file_size) {
            return Err(PackageError::InvalidPayloadOffset);
        }
        if self.reserved.iter().any(|&w| w != 0) {
            return Err(PackageError::ReservedFieldNotZero);
        }
        Ok(())
    }
}

/// Decode the full TOC referenced by a validated header.
///
/// # Errors
///
/// `InvalidTocOffset` if the TOC span falls outside the file; decode errors
/// from individual entries otherwise.
pub fn read_toc(file: &[u8], header: &Header) -> PackageResult<Vec<TocEntry>> {
    let start = header.toc_offset as usize;
    let end = start
        .checked_add(header.toc_bytes as usize)
        .ok_or(PackageError::InvalidTocOffset)?;
    let span = file
        .get(start..end)
        .ok_or(PackageError::InvalidTocOffset)?;
    span.chunks_exact(TOC_ENTRY_LEN).map(TocEntry::decode).collect()
}

/// Find the first entry of a type, with its index.
#[must_use]
pub fn find_entry(toc: &[TocEntry], entry_type: TocEntryType) -> Option<(usize, &TocEntry)> {
    toc.iter()
        .enumerate()
        .find(|(_, e)| e.entry_type == Some(entry_type))
}

/// True if the TOC contains an entry of the given type.
#[must_use]
pub fn has_entry(toc: &[TocEntry], entry_type: TocEntryType) -> bool {
    find_entry(toc, entry_type).is_some()
}

/// Number of entries of the given type.
#[must_use]
pub fn count_entries(toc: &[TocEntry], entry_type: TocEntryType) -> usize {
    toc.iter()
        .filter(|e| e.entry_type == Some(entry_type))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_entry() -> TocEntry {
        TocEntry {
            entry_type: Some(TocEntryType::FpgaBitstream),
            offset: 128,
            size: 32,
            ..TocEntry::default()
        }
    }

    #[test]
    fn encode_decode_round_trip() {
        let entry = valid_entry();
        assert_eq!(TocEntry::decode(&entry.encode()).unwrap(), entry);
    }

    #[test]
    fn valid_entry_passes() {
        assert_eq!(valid_entry().validate(256), Ok(()));
    }

    #[test]
    fn rejects_none_type() {
        let mut entry = valid_entry();
        entry.entry_type = None;
        assert_eq!(entry.validate(256), Err(PackageError::InvalidTocEntry));
    }

    #[test]
    fn decode_rejects_out_of_range_type() {
        let mut bytes = valid_entry().encode();
        bytes[0] = 11;
        assert_eq!(TocEntry::decode(&bytes), Err(PackageError::InvalidEnumValue));
    }

    #[test]
    fn rejects_nonzero_flags() {
        let mut entry = valid_entry();
        entry.flags = 1;
        assert_eq!(entry.validate(256), Err(PackageError::ReservedFieldNotZero));
    }

    #[test]
    fn rejects_offset_outside_file() {
        let mut entry = valid_entry();
        entry.offset = 32;
        assert_eq!(entry.validate(256), Err(PackageError::InvalidPayloadOffset));
        entry.offset = 256;
        assert_eq!(entry.validate(256), Err(PackageError::InvalidPayloadOffset));
    }

    #[test]
    fn rejects_payload_overrunning_file() {
        let mut entry = valid_entry();
        entry.size = 129;
        assert_eq!(entry.validate(256), Err(PackageError::InvalidPayloadOffset));
        // size 0 is always fine once the offset is in range
        entry.size = 0;
        assert_eq!(entry.validate(256), Ok(()));
    }

    #[test]
    fn overflowing_size_is_rejected() {
        let mut entry = valid_entry();
        entry.size = u32::MAX;
        assert_eq!(entry.validate(256), Err(PackageError::InvalidPayloadOffset));
    }

    #[test]
    fn rejects_nonzero_reserved_words() {
        let mut entry = valid_entry();
        entry.reserved[3] = 7;
        assert_eq!(entry.validate(256), Err(PackageError::ReservedFieldNotZero));
    }

    #[test]
    fn toc_search_helpers() {
        let toc = [
            TocEntry {
                entry_type: Some(TocEntryType::Config),
                ..valid_entry()
            },
            valid_entry(),
            valid_entry(),
        ];
        assert_eq!(find_entry(&toc, TocEntryType::Config).unwrap().0, 0);
        assert_eq!(find_entry(&toc, TocEntryType::FpgaBitstream).unwrap().0, 1);
        assert!(!has_entry(&toc, TocEntryType::Signature));
        assert_eq!(count_entries(&toc, TocEntryType::FpgaBitstream), 2);
    }
}
