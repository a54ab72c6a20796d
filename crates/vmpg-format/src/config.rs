//! Program and parameter configuration records.
//!
//! `ProgramConfig` (7372 bytes) is the program-description payload: identity
//! strings, version and ABI window, hardware mask, and up to 12 parameter
//! slots. `ParameterConfig` (572 bytes) describes how one physical control is
//! interpreted and displayed. Slots past the declared counts must stay
//! zeroed so the record hashes deterministically.

use crate::curve::ControlMode;
use crate::result::{PackageError, PackageResult};
use crate::strings;
use crate::types::{CoreId, HardwareFlags, ParameterId};

/// Parameter config record length in bytes.
pub const PARAMETER_CONFIG_LEN: usize = 572;

/// Program config record length in bytes.
pub const PROGRAM_CONFIG_LEN: usize = 7372;

/// Maximum parameters per program.
pub const MAX_PARAMETERS: usize = 12;

/// Maximum discrete value labels per parameter.
pub const MAX_VALUE_LABELS: usize = 16;

/// Maximum fractional display digits.
pub const MAX_FLOAT_DIGITS: u8 = 6;

/// Capacity of the parameter name label, terminator included.
pub const NAME_LABEL_LEN: usize = 32;

/// Capacity of one value label, terminator included.
pub const VALUE_LABEL_LEN: usize = 32;

/// Capacity of the suffix label, terminator included.
pub const SUFFIX_LABEL_LEN: usize = 4;

/// One parameter's interpretation metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterConfig {
    /// Physical control binding.
    pub parameter_id: ParameterId,
    /// Control curve applied to raw values.
    pub control_mode: ControlMode,
    /// Minimum raw output value (hardware dependent).
    pub min_value: u16,
    /// Maximum raw output value.
    pub max_value: u16,
    /// Initial value; must lie in `[min_value, max_value]`.
    pub initial_value: u16,
    /// Lower bound of the displayed range.
    pub display_min_value: i16,
    /// Upper bound of the displayed range.
    pub display_max_value: i16,
    /// Fractional digits shown (0..=6).
    pub display_float_digits: u8,
    /// Number of live value labels (0..=16); 2 or more switches the display
    /// to discrete labels.
    pub value_label_count: u8,
    /// Reserved padding; must be zero.
    pub reserved_pad: [u8; 2],
    /// Null-terminated parameter name.
    pub name_label: [u8; NAME_LABEL_LEN],
    /// Null-terminated discrete value labels.
    pub value_labels: [[u8; VALUE_LABEL_LEN]; MAX_VALUE_LABELS],
    /// Null-terminated display suffix (up to 3 visible characters).
    pub suffix_label: [u8; SUFFIX_LABEL_LEN],
    /// Reserved; must be zero.
    pub reserved: [u8; 2],
}

impl Default for ParameterConfig {
    fn default() -> Self {
        Self {
            parameter_id: ParameterId::None,
            control_mode: ControlMode::Linear,
            min_value: 0,
            max_value: 65535,
            initial_value: 0,
            display_min_value: 0,
            display_max_value: 100,
            display_float_digits: 0,
            value_label_count: 0,
            reserved_pad: [0; 2],
            name_label: [0; NAME_LABEL_LEN],
            value_labels: [[0; VALUE_LABEL_LEN]; MAX_VALUE_LABELS],
            suffix_label: [0; SUFFIX_LABEL_LEN],
            reserved: [0; 2],
        }
    }
}

impl ParameterConfig {
    /// An entirely zeroed slot, as required past `parameter_count`.
    #[must_use]
    pub fn zeroed() -> Self {
        Self {
            max_value: 0,
            display_max_value: 0,
            ..Self::default()
        }
    }

    /// Encode to the 572-byte wire layout.
    #[must_use]
    pub fn encode(&self) -> [u8; PARAMETER_CONFIG_LEN] {
        let mut buf = [0u8; PARAMETER_CONFIG_LEN];
        buf[0..4].copy_from_slice(&self.parameter_id.to_wire().to_le_bytes());
        buf[4..8].copy_from_slice(&self.control_mode.to_wire().to_le_bytes());
        buf[8..10].copy_from_slice(&self.min_value.to_le_bytes());
        buf[10..12].copy_from_slice(&self.max_value.to_le_bytes());
        buf[12..14].copy_from_slice(&self.initial_value.to_le_bytes());
        buf[14..16].copy_from_slice(&self.display_min_value.to_le_bytes());
        buf[16..18].copy_from_slice(&self.display_max_value.to_le_bytes());
        buf[18] = self.display_float_digits;
        buf[19] = self.value_label_count;
        buf[20..22].copy_from_slice(&self.reserved_pad);
        buf[22..54].copy_from_slice(&self.name_label);
        for (i, label) in self.value_labels.iter().enumerate() {
            let at = 54 + i * VALUE_LABEL_LEN;
            buf[at..at + VALUE_LABEL_LEN].copy_from_slice(label);
        }
        buf[566..570].copy_from_slice(&self.suffix_label);
        buf[570..572].copy_from_slice(&self.reserved);
        buf
    }

    /// Decode from wire bytes.
    ///
    /// # Errors
    ///
    /// `InvalidTocEntry` on short input; `InvalidEnumValue` if the parameter
    /// id or control mode is outside its enumeration.
    pub fn decode(bytes: &[u8]) -> PackageResult<Self> {
        if bytes.len() < PARAMETER_CONFIG_LEN {
            return Err(PackageError::InvalidTocEntry);
        }
        let parameter_id =
            ParameterId::from_wire(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))?;
        let control_mode =
            ControlMode::from_wire(u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]))?;
        let mut name_label = [0u8; NAME_LABEL_LEN];
        name_label.copy_from_slice(&bytes[22..54]);
        let mut value_labels = [[0u8; VALUE_LABEL_LEN]; MAX_VALUE_LABELS];
        for (i, label) in value_labels.iter_mut().enumerate() {
            let at = 54 + i * VALUE_LABEL_LEN;
            label.copy_from_slice(&bytes[at..at + VALUE_LABEL_LEN]);
        }
        Ok(Self {
            parameter_id,
            control_mode,
            min_value: u16::from_le_bytes([bytes[8], bytes[9]]),
            max_value: u16::from_le_bytes([bytes[10], bytes[11]]),
            initial_value: u16::from_le_bytes([bytes[12], bytes[13]]),
            display_min_value: i16::from_le_bytes([bytes[14], bytes[15]]),
            display_max_value: i16::from_le_bytes([bytes[16], bytes[17]]),
            display_float_digits: bytes[18],
            value_label_count: bytes[19],
            reserved_pad: [bytes[20], bytes[21]],
            name_label,
            value_labels,
            suffix_label: [bytes[566], bytes[567], bytes[568], bytes[569]],
            reserved: [bytes[570], bytes[571]],
        })
    }

    /// Validate value consistency, string termination, and reserved zeroing.
    ///
    /// # Errors
    ///
    /// The first failed check, as a [`PackageError`].
    pub fn validate(&self) -> PackageResult<()> {
        if usize::from(self.value_label_count) > MAX_VALUE_LABELS {
            return Err(PackageError::InvalidValueLabelCount);
        }
        if self.min_value > self.max_value {
            return Err(PackageError::InvalidParameterValues);
        }
        if self.initial_value < self.min_value || self.initial_value > self.max_value {
            return Err(PackageError::InvalidParameterValues);
        }
        if self.display_min_value > self.display_max_value {
            return Err(PackageError::InvalidParameterValues);
        }
        if self.display_float_digits > MAX_FLOAT_DIGITS {
            return Err(PackageError::InvalidParameterValues);
        }
        if !strings::is_terminated(&self.name_label)
            || !strings::is_terminated(&self.suffix_label)
        {
            return Err(PackageError::StringNotTerminated);
        }
        for label in &self.value_labels[..usize::from(self.value_label_count)] {
            if !strings::is_terminated(label) {
                return Err(PackageError::StringNotTerminated);
            }
        }
        if self.reserved_pad != [0; 2] || self.reserved != [0; 2] {
            return Err(PackageError::ReservedFieldNotZero);
        }
        Ok(())
    }

    /// True if every byte of the encoded record is zero.
    #[must_use]
    pub fn is_zeroed(&self) -> bool {
        self.encode().iter().all(|&b| b == 0)
    }
}

/// Program identity, compatibility window, and parameter table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramConfig {
    /// Unique program identifier (reverse-DNS style), null-terminated.
    pub program_id: [u8; 64],
    /// Program version, major.
    pub program_version_major: u16,
    /// Program version, minor.
    pub program_version_minor: u16,
    /// Program version, patch.
    pub program_version_patch: u16,
    /// Minimum supported ABI, major (inclusive).
    pub abi_min_major: u16,
    /// Minimum supported ABI, minor (inclusive).
    pub abi_min_minor: u16,
    /// Maximum supported ABI, major (exclusive).
    pub abi_max_major: u16,
    /// Maximum supported ABI, minor (exclusive).
    pub abi_max_minor: u16,
    /// Compatible hardware revisions; must be nonempty.
    pub hw_mask: HardwareFlags,
    /// Target core architecture; must not be `None`.
    pub core_id: CoreId,
    /// Display name, null-terminated.
    pub program_name: [u8; 32],
    /// Author, null-terminated.
    pub author: [u8; 64],
    /// License identifier, null-terminated.
    pub license: [u8; 32],
    /// Category, null-terminated.
    pub category: [u8; 32],
    /// Description, null-terminated.
    pub description: [u8; 128],
    /// Project URL, null-terminated.
    pub url: [u8; 128],
    /// Number of live parameter slots (0..=12).
    pub parameter_count: u16,
    /// Reserved padding; must be zero.
    pub reserved_pad: u16,
    /// Parameter slots; entries past `parameter_count` must be zeroed.
    pub parameters: [ParameterConfig; MAX_PARAMETERS],
    /// Reserved; must be zero.
    pub reserved: [u8; 2],
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            program_id: [0; 64],
            program_version_major: 1,
            program_version_minor: 0,
            program_version_patch: 0,
            abi_min_major: 1,
            abi_min_minor: 0,
            abi_max_major: 2,
            abi_max_minor: 0,
            hw_mask: HardwareFlags::REV_A,
            core_id: CoreId::Yuv444_30b,
            program_name: [0; 32],
            author: [0; 64],
            license: [0; 32],
            category: [0; 32],
            description: [0; 128],
            url: [0; 128],
            parameter_count: 0,
            reserved_pad: 0,
            parameters: [ParameterConfig::zeroed(); MAX_PARAMETERS],
            reserved: [0; 2],
        }
    }
}

impl ProgramConfig {
    /// Encode to the 7372-byte wire layout.
    #[must_use]
    pub fn encode(&self) -> [u8; PROGRAM_CONFIG_LEN] {
        let mut buf = [0u8; PROGRAM_CONFIG_LEN];
        buf[0..64].copy_from_slice(&self.program_id);
        buf[64..66].copy_from_slice(&self.program_version_major.to_le_bytes());
        buf[66..68].copy_from_slice(&self.program_version_minor.to_le_bytes());
        buf[68..70].copy_from_slice(&self.program_version_patch.to_le_bytes());
        buf[70..72].copy_from_slice(&self.abi_min_major.to_le_bytes());
        buf[72..74].copy_from_slice(&self.abi_min_minor.to_le_bytes());
        buf[74..76].copy_from_slice(&self.abi_max_major.to_le_bytes());
        buf[76..78].copy_from_slice(&self.abi_max_minor.to_le_bytes());
        buf[78..82].copy_from_slice(&self.hw_mask.bits().to_le_bytes());
        buf[82..86].copy_from_slice(&self.core_id.to_wire().to_le_bytes());
        buf[86..118].copy_from_slice(&self.program_name);
        buf[118..182].copy_from_slice(&self.author);
        buf[182..214].copy_from_slice(&self.license);
        buf[214..246].copy_from_slice(&self.category);
        buf[246..374].copy_from_slice(&self.description);
        buf[374..502].copy_from_slice(&self.url);
        buf[502..504].copy_from_slice(&self.parameter_count.to_le_bytes());
        buf[504..506].copy_from_slice(&self.reserved_pad.to_le_bytes());
        for (i, parameter) in self.parameters.iter().enumerate() {
            let at = 506 + i * PARAMETER_CONFIG_LEN;
            buf[at..at + PARAMETER_CONFIG_LEN].copy_from_slice(&parameter.encode());
        }
        buf[7370..7372].copy_from_slice(&self.reserved);
        buf
    }

    /// Decode from wire bytes.
    ///
    /// # Errors
    ///
    /// `InvalidTocEntry` on short input; enum and flag range errors from the
    /// embedded fields.
    pub fn decode(bytes: &[u8]) -> PackageResult<Self> {
        if bytes.len() < PROGRAM_CONFIG_LEN {
            return Err(PackageError::InvalidTocEntry);
        }
        let hw_mask =
            HardwareFlags::from_wire(u32::from_le_bytes([bytes[78], bytes[79], bytes[80], bytes[81]]))?;
        let core_id =
            CoreId::from_wire(u32::from_le_bytes([bytes[82], bytes[83], bytes[84], bytes[85]]))?;
        let mut parameters = [ParameterConfig::zeroed(); MAX_PARAMETERS];
        for (i, parameter) in parameters.iter_mut().enumerate() {
            let at = 506 + i * PARAMETER_CONFIG_LEN;
            *parameter = ParameterConfig::decode(&bytes[at..at + PARAMETER_CONFIG_LEN])?;
        }
        let mut config = Self {
            program_id: [0; 64],
            program_version_major: u16::from_le_bytes([bytes[64], bytes[65]]),
            program_version_minor: u16::from_le_bytes([bytes[66], bytes[67]]),
            program_version_patch: u16::from_le_bytes([bytes[68], bytes[69]]),
            abi_min_major: u16::from_le_bytes([bytes[70], bytes[71]]),
            abi_min_minor: u16::from_le_bytes([bytes[72], bytes[73]]),
            abi_max_major: u16::from_le_bytes([bytes[74], bytes[75]]),
            abi_max_minor: u16::from_le_bytes([bytes[76], bytes[77]]),
            hw_mask,
            core_id,
            program_name: [0; 32],
            author: [0; 64],
            license: [0; 32],
            category: [0; 32],
            description: [0; 128],
            url: [0; 128],
            parameter_count: u16::from_le_bytes([bytes[502], bytes[503]]),
            reserved_pad: u16::from_le_bytes([bytes[504], bytes[505]]),
            parameters,
            reserved: [bytes[7370], bytes[7371]],
        };
        config.program_id.copy_from_slice(&bytes[0..64]);
        config.program_name.copy_from_slice(&bytes[86..118]);
        config.author.copy_from_slice(&bytes[118..182]);
        config.license.copy_from_slice(&bytes[182..214]);
        config.category.copy_from_slice(&bytes[214..246]);
        config.description.copy_from_slice(&bytes[246..374]);
        config.url.copy_from_slice(&bytes[374..502]);
        Ok(config)
    }

    /// Validate counts, ABI window, strings, and every parameter slot.
    ///
    /// # Errors
    ///
    /// The first failed check, as a [`PackageError`].
    pub fn validate(&self) -> PackageResult<()> {
        if usize::from(self.parameter_count) > MAX_PARAMETERS {
            return Err(PackageError::InvalidParameterCount);
        }
        // The ABI window is inclusive-lower, exclusive-upper; an empty or
        // inverted window can match nothing.
        let abi_min = (self.abi_min_major, self.abi_min_minor);
        let abi_max = (self.abi_max_major, self.abi_max_minor);
        if abi_min >= abi_max {
            return Err(PackageError::InvalidAbiRange);
        }
        if self.abi_min_major == 0 || self.abi_max_major == 0 {
            return Err(PackageError::InvalidAbiRange);
        }
        if !strings::is_terminated(&self.program_id)
            || !strings::is_terminated(&self.program_name)
            || !strings::is_terminated(&self.author)
            || !strings::is_terminated(&self.license)
            || !strings::is_terminated(&self.category)
            || !strings::is_terminated(&self.description)
            || !strings::is_terminated(&self.url)
        {
            return Err(PackageError::StringNotTerminated);
        }
        if strings::is_empty(&self.program_id) || strings::is_empty(&self.program_name) {
            return Err(PackageError::StringNotTerminated);
        }
        if self.hw_mask.is_empty() {
            return Err(PackageError::InvalidEnumValue);
        }
        if self.core_id == CoreId::None {
            return Err(PackageError::InvalidEnumValue);
        }
        if self.reserved_pad != 0 || self.reserved != [0; 2] {
            return Err(PackageError::ReservedFieldNotZero);
        }
        let count = usize::from(self.parameter_count);
        for parameter in &self.parameters[..count] {
            parameter.validate()?;
        }
        // Unused slots are ignored during interpretation but must still be
        // zeroed so the config digest is canonical.
        for parameter in &self.parameters[count..] {
            if !parameter.is_zeroed() {
                return Err(PackageError::ReservedFieldNotZero);
            }
        }
        Ok(())
    }

    /// Live parameter slots.
    #[must_use]
    pub fn active_parameters(&self) -> &[ParameterConfig] {
        &self.parameters[..usize::from(self.parameter_count).min(MAX_PARAMETERS)]
    }
}
