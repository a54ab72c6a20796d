//! Buffer-based consumer API: validate and read a fully loaded package.
//!
//! The composite validation runs in a fixed order: header, every TOC entry,
//! uniqueness of the singleton entry types, optional digest walk, config
//! interpretation, and optional signature verification. The first failure
//! aborts with its specific code and no record is surfaced.

use tracing::debug;
use vmpg_crypto::PublicKey;

use crate::config::{ProgramConfig, PROGRAM_CONFIG_LEN};
use crate::header::{Header, HEADER_LEN};
use crate::integrity::{payload_of, verify_all_payload_hashes, verify_package_hash};
use crate::result::{PackageError, PackageResult};
use crate::signature::{read_descriptor, verify_package_signature};
use crate::toc::{count_entries, find_entry, read_toc, TocEntry};
use crate::types::TocEntryType;

/// Verification policy for opening a package.
#[derive(Debug, Clone, Copy)]
pub struct VerifyOptions<'a> {
    /// Verify every payload digest and the whole-file digest.
    pub verify_hashes: bool,
    /// Verify the Ed25519 signature when the package is flagged signed.
    pub verify_signature: bool,
    /// Key to verify with; `None` falls back to the built-in registry.
    pub public_key: Option<&'a PublicKey>,
}

impl Default for VerifyOptions<'_> {
    fn default() -> Self {
        Self {
            verify_hashes: true,
            verify_signature: false,
            public_key: None,
        }
    }
}

/// Entry types that may appear at most once per TOC.
const SINGLETON_TYPES: [TocEntryType; 3] = [
    TocEntryType::Config,
    TocEntryType::SignedDescriptor,
    TocEntryType::Signature,
];

/// Validate a fully buffered package under the given policy.
///
/// # Errors
///
/// The first failed check, as a [`PackageError`].
pub fn validate_package(file: &[u8], options: &VerifyOptions<'_>) -> PackageResult<()> {
    PackageView::open(file, options).map(|_| ())
}

/// A validated, borrowed view over a buffered package.
///
/// Constructing the view runs the composite validation pipeline; accessors
/// then hand out typed records without re-checking.
#[derive(Debug)]
pub struct PackageView<'a> {
    file: &'a [u8],
    header: Header,
    toc: Vec<TocEntry>,
}

impl<'a> PackageView<'a> {
    /// Open and validate a buffered package.
    ///
    /// # Errors
    ///
    /// The first failed check, as a [`PackageError`].
    pub fn open(file: &'a [u8], options: &VerifyOptions<'_>) -> PackageResult<Self> {
        let file_size = u32::try_from(file.len()).map_err(|_| PackageError::InvalidFileSize)?;
        if file.len() < HEADER_LEN {
            return Err(PackageError::InvalidFileSize);
        }

        let header = Header::decode(&file[..HEADER_LEN])?;
        header.validate(file_size)?;

        let toc = read_toc(file, &header)?;
        for entry in &toc {
            entry.validate(file_size)?;
        }
        for entry_type in SINGLETON_TYPES {
            if count_entries(&toc, entry_type) > 1 {
                return Err(PackageError::InvalidTocEntry);
            }
        }

        if options.verify_hashes {
            verify_all_payload_hashes(file, &header)?;
            verify_package_hash(file)?;
        }

        let view = Self { file, header, toc };

        // Interpret the config only when its payload has the contractual
        // size; other sizes are opaque to this reader.
        if let Some((_, entry)) = find_entry(&view.toc, TocEntryType::Config) {
            if entry.size as usize == PROGRAM_CONFIG_LEN {
                let config = ProgramConfig::decode(payload_of(file, entry)?)?;
                config.validate()?;
            }
        }

        if let Some((_, entry)) = find_entry(&view.toc, TocEntryType::SignedDescriptor) {
            if entry.size as usize == crate::descriptor::SIGNED_DESCRIPTOR_LEN {
                read_descriptor(file, &view.toc)?;
            }
        }

        if options.verify_signature && view.header.is_signed() {
            view.verify_signature(options.public_key)?;
        }

        debug!(
            toc_count = view.header.toc_count,
            signed = view.header.is_signed(),
            "package validated"
        );
        Ok(view)
    }

    /// The validated header.
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The validated TOC, in file order.
    #[must_use]
    pub fn toc(&self) -> &[TocEntry] {
        &self.toc
    }

    /// True if the signed flag bit is set.
    #[must_use]
    pub fn is_signed(&self) -> bool {
        self.header.is_signed()
    }

    /// Find the first TOC entry of a type.
    #[must_use]
    pub fn find_entry(&self, entry_type: TocEntryType) -> Option<&TocEntry> {
        find_entry(&self.toc, entry_type).map(|(_, entry)| entry)
    }

    /// Borrow the payload a TOC entry points at.
    ///
    /// # Errors
    ///
    /// `InvalidPayloadOffset` if the span falls outside the file.
    pub fn payload(&self, entry: &TocEntry) -> PackageResult<&'a [u8]> {
        payload_of(self.file, entry)
    }

    /// Borrow the first payload of a type.
    ///
    /// # Errors
    ///
    /// `InvalidTocEntry` if no entry of that type exists.
    pub fn payload_by_type(&self, entry_type: TocEntryType) -> PackageResult<&'a [u8]> {
        let entry = self
            .find_entry(entry_type)
            .ok_or(PackageError::InvalidTocEntry)?;
        self.payload(entry)
    }

    /// Decode and validate the program config payload.
    ///
    /// # Errors
    ///
    /// `InvalidTocEntry` if no config entry of the contractual size exists;
    /// decode and validation errors otherwise.
    pub fn config(&self) -> PackageResult<ProgramConfig> {
        let entry = self
            .find_entry(TocEntryType::Config)
            .ok_or(PackageError::InvalidTocEntry)?;
        if entry.size as usize != PROGRAM_CONFIG_LEN {
            return Err(PackageError::InvalidTocEntry);
        }
        let config = ProgramConfig::decode(self.payload(entry)?)?;
        config.validate()?;
        Ok(config)
    }

    /// Decode and validate the signed descriptor payload.
    ///
    /// # Errors
    ///
    /// `InvalidTocEntry` if the entry is missing or mis-sized.
    pub fn descriptor(&self) -> PackageResult<crate::descriptor::SignedDescriptor> {
        read_descriptor(self.file, &self.toc)
    }

    /// Verify the package signature under an explicit key choice.
    ///
    /// Returns the matching built-in key index when the registry was used.
    ///
    /// # Errors
    ///
    /// `InvalidTocEntry` if the package is not flagged signed or entries are
    /// missing; `InvalidHash` if verification fails.
    pub fn verify_signature(
        &self,
        public_key: Option<&PublicKey>,
    ) -> PackageResult<Option<usize>> {
        if !self.header.is_signed() {
            return Err(PackageError::InvalidTocEntry);
        }
        verify_package_signature(self.file, &self.toc, public_key)
    }
}
