//! Wire enumerations and flag sets.
//!
//! Every enumeration has a 32-bit little-endian representation on the wire.
//! Values are never transmuted from raw integers: each type offers a checked
//! conversion that rejects out-of-range values with
//! [`PackageError::InvalidEnumValue`].

use bitflags::bitflags;

use crate::result::{PackageError, PackageResult};

/// Payload section types carried in the table of contents.
///
/// `0` ("none") marks an unused artifact slot and is forbidden in live TOC
/// entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TocEntryType {
    /// Program configuration record.
    Config = 1,
    /// Signed descriptor binding the config and artifacts to a signature.
    SignedDescriptor = 2,
    /// Ed25519 signature over the signed descriptor.
    Signature = 3,
    /// Generic FPGA bitstream (variant does not matter).
    FpgaBitstream = 4,
    /// SD-resolution bitstream, analog output.
    BitstreamSdAnalog = 5,
    /// SD-resolution bitstream, HDMI output.
    BitstreamSdHdmi = 6,
    /// SD-resolution bitstream, dual output.
    BitstreamSdDual = 7,
    /// HD-resolution bitstream, analog output.
    BitstreamHdAnalog = 8,
    /// HD-resolution bitstream, HDMI output.
    BitstreamHdHdmi = 9,
    /// HD-resolution bitstream, dual output.
    BitstreamHdDual = 10,
}

impl TocEntryType {
    /// Checked conversion from the wire value. Zero is rejected here; use
    /// [`TocEntryType::from_wire`] for slots where "none" is legal.
    ///
    /// # Errors
    ///
    /// `InvalidEnumValue` for 0 or anything above `BitstreamHdDual`.
    pub fn try_from_wire(value: u32) -> PackageResult<Self> {
        match Self::from_wire(value)? {
            Some(t) => Ok(t),
            None => Err(PackageError::InvalidEnumValue),
        }
    }

    /// Checked conversion that maps 0 to `None` (an unused slot).
    ///
    /// # Errors
    ///
    /// `InvalidEnumValue` for values above `BitstreamHdDual`.
    pub fn from_wire(value: u32) -> PackageResult<Option<Self>> {
        Ok(Some(match value {
            0 => return Ok(None),
            1 => Self::Config,
            2 => Self::SignedDescriptor,
            3 => Self::Signature,
            4 => Self::FpgaBitstream,
            5 => Self::BitstreamSdAnalog,
            6 => Self::BitstreamSdHdmi,
            7 => Self::BitstreamSdDual,
            8 => Self::BitstreamHdAnalog,
            9 => Self::BitstreamHdHdmi,
            10 => Self::BitstreamHdDual,
            _ => return Err(PackageError::InvalidEnumValue),
        }))
    }

    /// Wire representation.
    #[must_use]
    pub const fn to_wire(self) -> u32 {
        self as u32
    }
}

bitflags! {
    /// Package header flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct HeaderFlags: u32 {
        /// The package carries a signed descriptor and signature.
        const SIGNED = 1 << 0;
    }
}

impl HeaderFlags {
    /// Checked conversion from the wire value.
    ///
    /// Unknown bits are rejected rather than ignored so that a v1.0 signature
    /// can never cover semantics this reader does not understand.
    ///
    /// # Errors
    ///
    /// `ReservedFieldNotZero` if any undefined bit is set.
    pub fn from_wire(value: u32) -> PackageResult<Self> {
        Self::from_bits(value).ok_or(PackageError::ReservedFieldNotZero)
    }
}

bitflags! {
    /// Hardware compatibility mask in the program config.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct HardwareFlags: u32 {
        /// Revision A hardware.
        const REV_A = 1 << 0;
        /// Revision B hardware.
        const REV_B = 1 << 1;
    }
}

impl HardwareFlags {
    /// Checked conversion from the wire value; unknown bits are rejected.
    ///
    /// # Errors
    ///
    /// `ReservedFieldNotZero` if any undefined bit is set.
    pub fn from_wire(value: u32) -> PackageResult<Self> {
        Self::from_bits(value).ok_or(PackageError::ReservedFieldNotZero)
    }
}

/// FPGA core architecture identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum CoreId {
    /// No core selected. Invalid in a live program config.
    #[default]
    None = 0,
    /// 30-bit YUV 4:4:4 core.
    Yuv444_30b = 1,
    /// 20-bit YUV 4:2:2 core.
    Yuv422_20b = 2,
}

impl CoreId {
    /// Checked conversion from the wire value.
    ///
    /// # Errors
    ///
    /// `InvalidEnumValue` for values above `Yuv422_20b`.
    pub fn from_wire(value: u32) -> PackageResult<Self> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Yuv444_30b),
            2 => Ok(Self::Yuv422_20b),
            _ => Err(PackageError::InvalidEnumValue),
        }
    }

    /// Wire representation.
    #[must_use]
    pub const fn to_wire(self) -> u32 {
        self as u32
    }
}

/// Physical control a parameter is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum ParameterId {
    /// Unassigned slot.
    #[default]
    None = 0,
    /// Rotary potentiometer 1.
    RotaryPot1 = 1,
    /// Rotary potentiometer 2.
    RotaryPot2 = 2,
    /// Rotary potentiometer 3.
    RotaryPot3 = 3,
    /// Rotary potentiometer 4.
    RotaryPot4 = 4,
    /// Rotary potentiometer 5.
    RotaryPot5 = 5,
    /// Rotary potentiometer 6.
    RotaryPot6 = 6,
    /// Toggle switch 7.
    ToggleSwitch7 = 7,
    /// Toggle switch 8.
    ToggleSwitch8 = 8,
    /// Toggle switch 9.
    ToggleSwitch9 = 9,
    /// Toggle switch 10.
    ToggleSwitch10 = 10,
    /// Toggle switch 11.
    ToggleSwitch11 = 11,
    /// Linear potentiometer 12.
    LinearPot12 = 12,
}

impl ParameterId {
    /// Checked conversion from the wire value.
    ///
    /// # Errors
    ///
    /// `InvalidEnumValue` for values above `LinearPot12`.
    pub fn from_wire(value: u32) -> PackageResult<Self> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::RotaryPot1),
            2 => Ok(Self::RotaryPot2),
            3 => Ok(Self::RotaryPot3),
            4 => Ok(Self::RotaryPot4),
            5 => Ok(Self::RotaryPot5),
            6 => Ok(Self::RotaryPot6),
            7 => Ok(Self::ToggleSwitch7),
            8 => Ok(Self::ToggleSwitch8),
            9 => Ok(Self::ToggleSwitch9),
            10 => Ok(Self::ToggleSwitch10),
            11 => Ok(Self::ToggleSwitch11),
            12 => Ok(Self::LinearPot12),
            _ => Err(PackageError::InvalidEnumValue),
        }
    }

    /// Wire representation.
    #[must_use]
    pub const fn to_wire(self) -> u32 {
        self as u32
    }
}
