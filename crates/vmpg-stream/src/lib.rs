//! Stream-based reading of VMPG packages.
//!
//! Resource-constrained consumers rarely hold a whole package in memory.
//! This crate reads packages from any seekable [`source::ByteSource`],
//! materializing one record or payload at a time, and composes the format
//! crate's validators, integrity checks, and signature verification into a
//! streaming pipeline.
//!
//! # Example
//!
//! ```rust
//! use vmpg_stream::{PackageReader, SliceSource};
//!
//! # fn demo(file: &[u8]) -> vmpg_format::PackageResult<()> {
//! let mut scratch = [0u8; 8192];
//! let mut reader = PackageReader::open(
//!     SliceSource::new(file),
//!     file.len() as u32,
//!     true,
//!     Some(&mut scratch),
//! )?;
//! if reader.is_signed() {
//!     let key_index = reader.verify_signature(None)?;
//!     let _ = key_index;
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod package;
pub mod reader;
pub mod source;

pub use package::PackageReader;
pub use reader::{
    find_and_read, read_and_validate_header, read_and_validate_toc, read_header, read_payload,
    read_program_config, read_signature, read_signed_descriptor, read_toc,
    validate_package_stream, verify_all_payload_hashes_stream, verify_package_hash_stream,
    verify_signature_stream, StreamOptions, TocBuffer, MAX_TOC_ENTRIES,
};
pub use source::{ByteSource, SliceSource};
