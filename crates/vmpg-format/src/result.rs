//! The discriminated validation result shared by every validator and engine.
//!
//! Codes are stable integers so resource-constrained consumers can log them
//! without carrying strings. `Ok(())` is code 0 on the wire ("ok"); the
//! failure variants below are codes 1 through 18.

use thiserror::Error;

/// Validation and verification failures for VMPG packages.
///
/// Every validator, reader, and engine returns this error directly; the first
/// failure in a composite operation aborts it, preserving the specific code.
/// A caller that receives an error must treat any output buffers as invalid.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PackageError {
    /// Header magic is not `VMPG`.
    #[error("invalid magic number")]
    InvalidMagic,

    /// Unsupported format version.
    #[error("invalid version")]
    InvalidVersion,

    /// Header size field does not equal 64.
    #[error("invalid header size")]
    InvalidHeaderSize,

    /// File size field out of range or inconsistent with the actual file.
    #[error("invalid file size")]
    InvalidFileSize,

    /// TOC offset outside the file envelope.
    #[error("invalid TOC offset")]
    InvalidTocOffset,

    /// TOC byte size inconsistent with the entry count, or TOC overruns the file.
    #[error("invalid TOC size")]
    InvalidTocSize,

    /// TOC entry count out of range, or larger than the reader's capacity.
    #[error("invalid TOC count")]
    InvalidTocCount,

    /// Signed descriptor artifact count out of range or slots inconsistent.
    #[error("invalid artifact count")]
    InvalidArtifactCount,

    /// Program config parameter count out of range.
    #[error("invalid parameter count")]
    InvalidParameterCount,

    /// Parameter value label count out of range.
    #[error("invalid value label count")]
    InvalidValueLabelCount,

    /// Program ABI range empty, inverted, or with a zero major bound.
    #[error("invalid ABI range")]
    InvalidAbiRange,

    /// A fixed-capacity string field has no null terminator, or a required
    /// string is empty.
    #[error("string not terminated")]
    StringNotTerminated,

    /// A digest or signature did not verify.
    #[error("invalid hash")]
    InvalidHash,

    /// TOC entry malformed, missing, or duplicated.
    #[error("invalid TOC entry")]
    InvalidTocEntry,

    /// Payload span outside the file, or a payload that cannot be
    /// materialized into the available scratch space.
    #[error("invalid payload offset")]
    InvalidPayloadOffset,

    /// Parameter min/max/initial or display range inconsistent.
    #[error("invalid parameter values")]
    InvalidParameterValues,

    /// A 32-bit enumeration field holds a value outside its range.
    #[error("invalid enum value")]
    InvalidEnumValue,

    /// A reserved field holds a nonzero value.
    #[error("reserved field not zero")]
    ReservedFieldNotZero,
}

impl PackageError {
    /// Stable wire code for embedded logging. `Ok` is 0; failures are 1..=18.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::InvalidMagic => 1,
            Self::InvalidVersion => 2,
            Self::InvalidHeaderSize => 3,
            Self::InvalidFileSize => 4,
            Self::InvalidTocOffset => 5,
            Self::InvalidTocSize => 6,
            Self::InvalidTocCount => 7,
            Self::InvalidArtifactCount => 8,
            Self::InvalidParameterCount => 9,
            Self::InvalidValueLabelCount => 10,
            Self::InvalidAbiRange => 11,
            Self::StringNotTerminated => 12,
            Self::InvalidHash => 13,
            Self::InvalidTocEntry => 14,
            Self::InvalidPayloadOffset => 15,
            Self::InvalidParameterValues => 16,
            Self::InvalidEnumValue => 17,
            Self::ReservedFieldNotZero => 18,
        }
    }

    /// Static diagnostic text for a result code, including 0 for success.
    #[must_use]
    pub const fn code_string(code: u32) -> &'static str {
        match code {
            0 => "OK",
            1 => "Invalid magic number",
            2 => "Invalid version",
            3 => "Invalid header size",
            4 => "Invalid file size",
            5 => "Invalid TOC offset",
            6 => "Invalid TOC size",
            7 => "Invalid TOC count",
            8 => "Invalid artifact count",
            9 => "Invalid parameter count",
            10 => "Invalid value label count",
            11 => "Invalid ABI range",
            12 => "String not terminated",
            13 => "Invalid hash",
            14 => "Invalid TOC entry",
            15 => "Invalid payload offset",
            16 => "Invalid parameter values",
            17 => "Invalid enum value",
            18 => "Reserved field not zero",
            _ => "Unknown error",
        }
    }

    /// Static diagnostic text for this failure.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        Self::code_string(self.code())
    }
}

/// Result type alias for package operations.
pub type PackageResult<T> = Result<T, PackageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(PackageError::InvalidMagic.code(), 1);
        assert_eq!(PackageError::InvalidHash.code(), 13);
        assert_eq!(PackageError::ReservedFieldNotZero.code(), 18);
    }

    #[test]
    fn code_strings_cover_all_codes() {
        assert_eq!(PackageError::code_string(0), "OK");
        for code in 1..=18 {
            assert_ne!(PackageError::code_string(code), "Unknown error");
        }
        assert_eq!(PackageError::code_string(99), "Unknown error");
    }

    #[test]
    fn display_matches_thiserror_message() {
        assert_eq!(PackageError::InvalidMagic.to_string(), "invalid magic number");
    }
}
