//! High-level package reader over a byte source.
//!
//! `open` runs the validation pipeline up to optional digest verification
//! and caches the header and TOC; signature verification is a separate,
//! explicit call because it involves a trust policy choice the caller owns.

use vmpg_crypto::PublicKey;
use vmpg_format::config::ProgramConfig;
use vmpg_format::header::Header;
use vmpg_format::result::{PackageError, PackageResult};
use vmpg_format::toc::{count_entries, TocEntry};
use vmpg_format::types::TocEntryType;

use crate::reader::{
    find_and_read, read_and_validate_header, read_and_validate_toc, read_program_config,
    verify_all_payload_hashes_stream, verify_package_hash_stream, verify_signature_stream,
    TocBuffer,
};
use crate::source::ByteSource;

/// Entry types that may appear at most once per TOC.
const SINGLETON_TYPES: [TocEntryType; 3] = [
    TocEntryType::Config,
    TocEntryType::SignedDescriptor,
    TocEntryType::Signature,
];

/// A validated package over a byte source.
///
/// Construction validates; a `PackageReader` that exists is open. Reads go
/// back to the source on demand, so only the header and TOC stay resident.
#[derive(Debug)]
pub struct PackageReader<S> {
    source: S,
    header: Header,
    toc: TocBuffer,
}

impl<S: ByteSource> PackageReader<S> {
    /// Open a package: validate the header and TOC, and optionally verify
    /// every digest through `scratch`.
    ///
    /// # Errors
    ///
    /// The first failed check, as a [`PackageError`].
    pub fn open(
        mut source: S,
        file_size: u32,
        verify_hashes: bool,
        scratch: Option<&mut [u8]>,
    ) -> PackageResult<Self> {
        let header = read_and_validate_header(&mut source, file_size)?;
        let toc = read_and_validate_toc(&mut source, &header, file_size)?;
        for entry_type in SINGLETON_TYPES {
            if count_entries(toc.entries(), entry_type) > 1 {
                return Err(PackageError::InvalidTocEntry);
            }
        }
        if verify_hashes {
            let scratch = scratch.unwrap_or(&mut []);
            verify_all_payload_hashes_stream(&mut source, toc.entries(), scratch)?;
            verify_package_hash_stream(&mut source, &header, file_size)?;
        }
        Ok(Self {
            source,
            header,
            toc,
        })
    }

    /// The validated header.
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The validated TOC, in file order.
    #[must_use]
    pub fn toc(&self) -> &[TocEntry] {
        self.toc.entries()
    }

    /// Number of TOC entries.
    #[must_use]
    pub fn toc_count(&self) -> u32 {
        self.header.toc_count
    }

    /// True if the signed flag bit is set.
    #[must_use]
    pub fn is_signed(&self) -> bool {
        self.header.is_signed()
    }

    /// Read and validate the program config.
    ///
    /// Digest verification happened at `open` when requested, so this read
    /// only re-checks structure.
    ///
    /// # Errors
    ///
    /// `InvalidTocEntry` if no config entry of the contractual size exists;
    /// read and validation errors otherwise.
    pub fn read_config(&mut self) -> PackageResult<ProgramConfig> {
        let (_, entry) = vmpg_format::toc::find_entry(self.toc.entries(), TocEntryType::Config)
            .ok_or(PackageError::InvalidTocEntry)?;
        let entry = *entry;
        read_program_config(&mut self.source, &entry, false)
    }

    /// Read the first payload of a type into `dst`, returning the count.
    ///
    /// # Errors
    ///
    /// `InvalidTocEntry` if no entry of the type exists;
    /// `InvalidPayloadOffset` if the payload does not fit or cannot be read.
    pub fn read_payload_by_type(
        &mut self,
        entry_type: TocEntryType,
        dst: &mut [u8],
    ) -> PackageResult<usize> {
        find_and_read(&mut self.source, self.toc.entries(), entry_type, dst)
    }

    /// Read the generic FPGA bitstream payload into `dst`.
    ///
    /// # Errors
    ///
    /// As [`PackageReader::read_payload_by_type`].
    pub fn read_bitstream(&mut self, dst: &mut [u8]) -> PackageResult<usize> {
        self.read_payload_by_type(TocEntryType::FpgaBitstream, dst)
    }

    /// Verify the package signature.
    ///
    /// With `public_key` the caller's key is used; without it the built-in
    /// registry is tried and the matching index returned.
    ///
    /// # Errors
    ///
    /// `InvalidTocEntry` if the package is not flagged signed or entries are
    /// missing; `InvalidHash` if verification fails.
    pub fn verify_signature(
        &mut self,
        public_key: Option<&PublicKey>,
    ) -> PackageResult<Option<usize>> {
        if !self.is_signed() {
            return Err(PackageError::InvalidTocEntry);
        }
        verify_signature_stream(&mut self.source, self.toc.entries(), public_key)
    }
}
