//! Typed reads over a byte source, composed into package verification.
//!
//! Each function issues at most one seek followed by sequential reads, so a
//! source backed by slow storage is touched in a predictable pattern:
//! header, then TOC, then whichever payloads the caller asks for.

use tracing::debug;
use vmpg_crypto::{PackageHasher, PublicKey, Signature, SIGNATURE_SIZE};
use vmpg_format::config::{ProgramConfig, PROGRAM_CONFIG_LEN};
use vmpg_format::descriptor::{SignedDescriptor, SIGNED_DESCRIPTOR_LEN};
use vmpg_format::header::{Header, HEADER_LEN};
use vmpg_format::integrity::verify_payload_hash;
use vmpg_format::result::{PackageError, PackageResult};
use vmpg_format::signature::{verify_descriptor_signature, verify_with_trusted_keys};
use vmpg_format::toc::{count_entries, find_entry, TocEntry, TOC_ENTRY_LEN};
use vmpg_format::types::TocEntryType;

use crate::source::ByteSource;

/// Compile-time TOC capacity of the stream reader.
///
/// A package may declare up to 256 entries, but resource-constrained
/// consumers only ever ship a handful of sections; packages above this
/// capacity yield [`PackageError::InvalidTocCount`].
pub const MAX_TOC_ENTRIES: usize = 16;

/// Chunk size for incremental hashing of spans larger than the stack.
const HASH_CHUNK_LEN: usize = 256;

/// Fixed-capacity TOC storage for stream readers.
#[derive(Debug, Clone, Copy)]
pub struct TocBuffer {
    entries: [TocEntry; MAX_TOC_ENTRIES],
    len: usize,
}

impl TocBuffer {
    /// The populated entries, in file order.
    #[must_use]
    pub fn entries(&self) -> &[TocEntry] {
        &self.entries[..self.len]
    }
}

impl Default for TocBuffer {
    fn default() -> Self {
        Self {
            entries: [TocEntry::default(); MAX_TOC_ENTRIES],
            len: 0,
        }
    }
}

fn read_exact<S: ByteSource>(source: &mut S, dst: &mut [u8]) -> bool {
    source.read(dst) == dst.len()
}

/// Seek to the file start and read the header record.
///
/// # Errors
///
/// `InvalidFileSize` if the source cannot produce 64 bytes at offset 0.
pub fn read_header<S: ByteSource>(source: &mut S) -> PackageResult<Header> {
    if !source.seek(0) {
        return Err(PackageError::InvalidFileSize);
    }
    let mut bytes = [0u8; HEADER_LEN];
    if !read_exact(source, &mut bytes) {
        return Err(PackageError::InvalidFileSize);
    }
    Header::decode(&bytes)
}

/// Read the header and validate it against the declared file size.
///
/// # Errors
///
/// Read failures or any header validation failure.
pub fn read_and_validate_header<S: ByteSource>(
    source: &mut S,
    file_size: u32,
) -> PackageResult<Header> {
    let header = read_header(source)?;
    header.validate(file_size)?;
    Ok(header)
}

/// Read the TOC referenced by a validated header into fixed storage.
///
/// # Errors
///
/// `InvalidTocCount` if the package declares more entries than
/// [`MAX_TOC_ENTRIES`]; `InvalidTocOffset` on a failed seek;
/// `InvalidTocSize` on a short read; decode errors per entry.
pub fn read_toc<S: ByteSource>(source: &mut S, header: &Header) -> PackageResult<TocBuffer> {
    let count = header.toc_count as usize;
    if count > MAX_TOC_ENTRIES {
        return Err(PackageError::InvalidTocCount);
    }
    if !source.seek(header.toc_offset) {
        return Err(PackageError::InvalidTocOffset);
    }
    let mut toc = TocBuffer::default();
    let mut bytes = [0u8; TOC_ENTRY_LEN];
    for slot in &mut toc.entries[..count] {
        if !read_exact(source, &mut bytes) {
            return Err(PackageError::InvalidTocSize);
        }
        *slot = TocEntry::decode(&bytes)?;
    }
    toc.len = count;
    Ok(toc)
}

/// Read the TOC and validate every entry.
///
/// # Errors
///
/// Read failures or any entry validation failure.
pub fn read_and_validate_toc<S: ByteSource>(
    source: &mut S,
    header: &Header,
    file_size: u32,
) -> PackageResult<TocBuffer> {
    let toc = read_toc(source, header)?;
    for entry in toc.entries() {
        entry.validate(file_size)?;
    }
    Ok(toc)
}

/// Read a payload into `dst`, returning the byte count.
///
/// # Errors
///
/// `InvalidPayloadOffset` if the payload exceeds `dst`, the seek fails, or
/// the read comes up short.
pub fn read_payload<S: ByteSource>(
    source: &mut S,
    entry: &TocEntry,
    dst: &mut [u8],
) -> PackageResult<usize> {
    let size = entry.size as usize;
    if size > dst.len() {
        return Err(PackageError::InvalidPayloadOffset);
    }
    if !source.seek(entry.offset) {
        return Err(PackageError::InvalidPayloadOffset);
    }
    if !read_exact(source, &mut dst[..size]) {
        return Err(PackageError::InvalidPayloadOffset);
    }
    Ok(size)
}

/// Linear-scan the TOC for a type and read that payload.
///
/// # Errors
///
/// `InvalidTocEntry` if no entry of the type exists; read failures from
/// [`read_payload`].
pub fn find_and_read<S: ByteSource>(
    source: &mut S,
    toc: &[TocEntry],
    entry_type: TocEntryType,
    dst: &mut [u8],
) -> PackageResult<usize> {
    let (_, entry) = find_entry(toc, entry_type).ok_or(PackageError::InvalidTocEntry)?;
    read_payload(source, entry, dst)
}

/// Hash a payload span incrementally through a small stack chunk.
fn hash_payload_stream<S: ByteSource>(
    source: &mut S,
    entry: &TocEntry,
) -> PackageResult<vmpg_crypto::Digest32> {
    if !source.seek(entry.offset) {
        return Err(PackageError::InvalidPayloadOffset);
    }
    let mut hasher = PackageHasher::new();
    let mut chunk = [0u8; HASH_CHUNK_LEN];
    let mut remaining = entry.size as usize;
    while remaining > 0 {
        let n = remaining.min(HASH_CHUNK_LEN);
        if !read_exact(source, &mut chunk[..n]) {
            return Err(PackageError::InvalidPayloadOffset);
        }
        hasher.update(&chunk[..n]);
        remaining -= n;
    }
    Ok(hasher.finalize())
}

/// Read and validate the program config a TOC entry points at.
///
/// # Errors
///
/// `InvalidTocEntry` for a wrong entry type or size;
/// `InvalidPayloadOffset` on read failure; `InvalidHash` when
/// `verify_hash` is set and the payload digest does not match; decode and
/// validation errors from the record.
pub fn read_program_config<S: ByteSource>(
    source: &mut S,
    entry: &TocEntry,
    verify_hash: bool,
) -> PackageResult<ProgramConfig> {
    if entry.entry_type != Some(TocEntryType::Config)
        || entry.size as usize != PROGRAM_CONFIG_LEN
    {
        return Err(PackageError::InvalidTocEntry);
    }
    let mut bytes = [0u8; PROGRAM_CONFIG_LEN];
    read_payload(source, entry, &mut bytes)?;
    let config = ProgramConfig::decode(&bytes)?;
    config.validate()?;
    if verify_hash && !verify_payload_hash(&bytes, &entry.sha256) {
        return Err(PackageError::InvalidHash);
    }
    Ok(config)
}

/// Read and validate the signed descriptor a TOC entry points at.
///
/// # Errors
///
/// `InvalidTocEntry` for a wrong entry type or size; read, decode, and
/// validation errors otherwise.
pub fn read_signed_descriptor<S: ByteSource>(
    source: &mut S,
    entry: &TocEntry,
) -> PackageResult<SignedDescriptor> {
    if entry.entry_type != Some(TocEntryType::SignedDescriptor)
        || entry.size as usize != SIGNED_DESCRIPTOR_LEN
    {
        return Err(PackageError::InvalidTocEntry);
    }
    let mut bytes = [0u8; SIGNED_DESCRIPTOR_LEN];
    read_payload(source, entry, &mut bytes)?;
    let descriptor = SignedDescriptor::decode(&bytes)?;
    descriptor.validate()?;
    Ok(descriptor)
}

/// Read the Ed25519 signature a TOC entry points at.
///
/// # Errors
///
/// `InvalidTocEntry` for a wrong entry type; `InvalidHash` for a wrong size
/// or a failed read.
pub fn read_signature<S: ByteSource>(
    source: &mut S,
    entry: &TocEntry,
) -> PackageResult<Signature> {
    if entry.entry_type != Some(TocEntryType::Signature) {
        return Err(PackageError::InvalidTocEntry);
    }
    if entry.size as usize != SIGNATURE_SIZE {
        return Err(PackageError::InvalidHash);
    }
    let mut bytes = [0u8; SIGNATURE_SIZE];
    read_payload(source, entry, &mut bytes).map_err(|_| PackageError::InvalidHash)?;
    Ok(Signature::from_bytes(&bytes))
}

/// Verify every nonempty payload digest, one payload at a time through the
/// caller's scratch buffer.
///
/// A payload larger than the scratch cannot be materialized and fails with
/// `InvalidPayloadOffset`.
///
/// # Errors
///
/// `InvalidPayloadOffset` for unmaterializable payloads; `InvalidHash` on
/// the first digest mismatch.
pub fn verify_all_payload_hashes_stream<S: ByteSource>(
    source: &mut S,
    toc: &[TocEntry],
    scratch: &mut [u8],
) -> PackageResult<()> {
    for entry in toc {
        if entry.size == 0 {
            continue;
        }
        let size = entry.size as usize;
        if size > scratch.len() {
            return Err(PackageError::InvalidPayloadOffset);
        }
        read_payload(source, entry, scratch)?;
        if !verify_payload_hash(&scratch[..size], &entry.sha256) {
            return Err(PackageError::InvalidHash);
        }
    }
    Ok(())
}

/// Verify the optional whole-file digest by walking the source.
///
/// The digest covers bytes [0, 32), 32 zero bytes in place of the digest
/// field, then [64, `file_size`). An absent (all-zero) digest verifies
/// without touching the source.
///
/// # Errors
///
/// `InvalidFileSize` if the source ends early; `InvalidHash` on mismatch.
pub fn verify_package_hash_stream<S: ByteSource>(
    source: &mut S,
    header: &Header,
    file_size: u32,
) -> PackageResult<()> {
    if header.sha256_package.is_zero() {
        return Ok(());
    }
    if (file_size as usize) < HEADER_LEN || !source.seek(0) {
        return Err(PackageError::InvalidFileSize);
    }
    let mut hasher = PackageHasher::new();
    let mut chunk = [0u8; HASH_CHUNK_LEN];
    if !read_exact(source, &mut chunk[..32]) {
        return Err(PackageError::InvalidFileSize);
    }
    hasher.update(&chunk[..32]);
    hasher.update(&[0u8; 32]);
    if !source.seek(HEADER_LEN as u32) {
        return Err(PackageError::InvalidFileSize);
    }
    let mut remaining = file_size as usize - HEADER_LEN;
    while remaining > 0 {
        let n = remaining.min(HASH_CHUNK_LEN);
        if !read_exact(source, &mut chunk[..n]) {
            return Err(PackageError::InvalidFileSize);
        }
        hasher.update(&chunk[..n]);
        remaining -= n;
    }
    if hasher.finalize() != header.sha256_package {
        return Err(PackageError::InvalidHash);
    }
    Ok(())
}

/// Verify the package signature from a stream.
///
/// With `public_key` the caller's key is used and `Ok(None)` returned on
/// success; without it the built-in registry is tried and the matching index
/// returned. When a `config` entry is present its payload digest must equal
/// the descriptor's `config_sha256`.
///
/// # Errors
///
/// `InvalidTocEntry` for missing entries; `InvalidHash` for a signature or
/// config binding that does not verify.
pub fn verify_signature_stream<S: ByteSource>(
    source: &mut S,
    toc: &[TocEntry],
    public_key: Option<&PublicKey>,
) -> PackageResult<Option<usize>> {
    let (_, desc_entry) =
        find_entry(toc, TocEntryType::SignedDescriptor).ok_or(PackageError::InvalidTocEntry)?;
    if desc_entry.size as usize != SIGNED_DESCRIPTOR_LEN {
        return Err(PackageError::InvalidTocEntry);
    }
    let mut descriptor_bytes = [0u8; SIGNED_DESCRIPTOR_LEN];
    read_payload(source, desc_entry, &mut descriptor_bytes)?;
    let descriptor = SignedDescriptor::decode(&descriptor_bytes)?;
    descriptor.validate()?;

    let (_, sig_entry) =
        find_entry(toc, TocEntryType::Signature).ok_or(PackageError::InvalidTocEntry)?;
    let signature = read_signature(source, sig_entry)?;

    let matched = match public_key {
        Some(key) => {
            if !verify_descriptor_signature(&descriptor_bytes, &signature, key) {
                debug!("stream signature rejected by caller-supplied key");
                return Err(PackageError::InvalidHash);
            }
            None
        }
        None => match verify_with_trusted_keys(&descriptor_bytes, &signature) {
            Some(index) => Some(index),
            None => {
                debug!("stream signature rejected by every built-in trust anchor");
                return Err(PackageError::InvalidHash);
            }
        },
    };

    if let Some((_, config_entry)) = find_entry(toc, TocEntryType::Config) {
        if hash_payload_stream(source, config_entry)? != descriptor.config_sha256 {
            debug!("config digest does not match the signed descriptor");
            return Err(PackageError::InvalidHash);
        }
    }

    Ok(matched)
}

/// Verification policy for stream-based package validation.
///
/// `scratch` must hold the largest payload to be digest-verified; with no
/// scratch, a hash walk over any nonempty payload fails with
/// `InvalidPayloadOffset`.
#[derive(Default)]
pub struct StreamOptions<'a> {
    /// Verify every payload digest and the whole-file digest.
    pub verify_hashes: bool,
    /// Verify the Ed25519 signature when the package is flagged signed.
    pub verify_signature: bool,
    /// Key to verify with; `None` falls back to the built-in registry.
    pub public_key: Option<&'a PublicKey>,
    /// Caller-owned scratch for payload materialization.
    pub scratch: Option<&'a mut [u8]>,
}

/// Entry types that may appear at most once per TOC.
const SINGLETON_TYPES: [TocEntryType; 3] = [
    TocEntryType::Config,
    TocEntryType::SignedDescriptor,
    TocEntryType::Signature,
];

/// Full stream-based package validation.
///
/// Fixed order: header, TOC, singleton uniqueness, optional digest walk
/// (payloads then whole-file), config interpretation, optional signature.
///
/// # Errors
///
/// The first failed check, as a [`PackageError`].
pub fn validate_package_stream<S: ByteSource>(
    source: &mut S,
    file_size: u32,
    options: StreamOptions<'_>,
) -> PackageResult<()> {
    let header = read_and_validate_header(source, file_size)?;
    let toc = read_and_validate_toc(source, &header, file_size)?;
    for entry_type in SINGLETON_TYPES {
        if count_entries(toc.entries(), entry_type) > 1 {
            return Err(PackageError::InvalidTocEntry);
        }
    }

    if options.verify_hashes {
        let scratch = options.scratch.unwrap_or(&mut []);
        verify_all_payload_hashes_stream(source, toc.entries(), scratch)?;
        verify_package_hash_stream(source, &header, file_size)?;
    }

    if let Some((_, entry)) = find_entry(toc.entries(), TocEntryType::Config) {
        if entry.size as usize == PROGRAM_CONFIG_LEN {
            read_program_config(source, entry, options.verify_hashes)?;
        }
    }

    if options.verify_signature && header.is_signed() {
        verify_signature_stream(source, toc.entries(), options.public_key)?;
    }

    debug!(
        toc_count = header.toc_count,
        signed = header.is_signed(),
        "stream package validated"
    );
    Ok(())
}
