//! VMPG package format: the binary container delivering FPGA configurations
//! and control metadata to video-effects hardware.
//!
//! A package is a single file: a 64-byte header, a table of contents, and
//! payload sections (program config, signed descriptor, Ed25519 signature,
//! FPGA bitstreams). Nothing read from a package is trusted until it has
//! been structurally validated, digest-verified, and - for signed packages -
//! signature-verified.
//!
//! # Modules
//!
//! - [`header`], [`toc`], [`descriptor`], [`config`] - record layouts,
//!   encode/decode, and per-record validators
//! - [`types`] - wire enumerations and flag sets
//! - [`integrity`] - payload and whole-file digest verification
//! - [`signature`] - Ed25519 verification over the signed descriptor
//! - [`trust`] - built-in trust anchors
//! - [`curve`], [`display`] - the parameter control-curve kernel and the
//!   value display renderer
//! - [`package`] - buffer-based composite validation and typed access
//! - [`result`] - the discriminated result kind with stable codes
//!
//! # Example
//!
//! ```rust,no_run
//! use vmpg_format::package::{PackageView, VerifyOptions};
//!
//! # fn load() -> Vec<u8> { Vec::new() }
//! let file: Vec<u8> = load();
//! let view = PackageView::open(&file, &VerifyOptions::default())?;
//! let config = view.config()?;
//! for parameter in config.active_parameters() {
//!     let output = vmpg_format::curve::curve_and_scale(512, parameter);
//!     let _ = output;
//! }
//! # Ok::<(), vmpg_format::PackageError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod curve;
pub mod descriptor;
pub mod display;
pub mod header;
pub mod integrity;
pub mod package;
pub mod result;
pub mod signature;
pub mod strings;
pub mod toc;
pub mod trust;
pub mod types;

pub use config::{ParameterConfig, ProgramConfig, PARAMETER_CONFIG_LEN, PROGRAM_CONFIG_LEN};
pub use curve::{curve_and_scale, ControlMode, ALL_CONTROL_MODES, CURVE_MAX};
pub use descriptor::{ArtifactHash, SignedDescriptor, SIGNED_DESCRIPTOR_LEN};
pub use display::{render_value, DISPLAY_BUF_LEN};
pub use header::{Header, HEADER_LEN, MAGIC, MAX_FILE_SIZE, MAX_TOC_COUNT};
pub use package::{validate_package, PackageView, VerifyOptions};
pub use result::{PackageError, PackageResult};
pub use toc::{TocEntry, TOC_ENTRY_LEN};
pub use types::{CoreId, HardwareFlags, HeaderFlags, ParameterId, TocEntryType};
