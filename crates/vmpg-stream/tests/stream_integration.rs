//! Stream-pipeline integration: packages laid out in memory, read back
//! through the byte-source interface as device firmware would.

use vmpg_crypto::SigningKey;
use vmpg_format::config::{ProgramConfig, PROGRAM_CONFIG_LEN};
use vmpg_format::descriptor::{ArtifactHash, SignedDescriptor};
use vmpg_format::header::{Header, HEADER_LEN};
use vmpg_format::integrity::{package_digest, payload_digest};
use vmpg_format::strings::copy_str;
use vmpg_format::toc::{TocEntry, TOC_ENTRY_LEN};
use vmpg_format::types::{HeaderFlags, TocEntryType};
use vmpg_format::PackageError;
use vmpg_stream::{
    read_header, validate_package_stream, PackageReader, SliceSource, StreamOptions,
    MAX_TOC_ENTRIES,
};

fn build_package(signed: bool, sections: &[(TocEntryType, Vec<u8>)]) -> Vec<u8> {
    let toc_offset = HEADER_LEN as u32;
    let toc_bytes = (sections.len() * TOC_ENTRY_LEN) as u32;
    let mut payload_offset = toc_offset + toc_bytes;

    let mut toc = Vec::new();
    for (entry_type, payload) in sections {
        toc.push(TocEntry {
            entry_type: Some(*entry_type),
            offset: payload_offset,
            size: payload.len() as u32,
            sha256: payload_digest(payload),
            ..TocEntry::default()
        });
        payload_offset += payload.len() as u32;
    }

    let header = Header {
        file_size: payload_offset,
        flags: if signed { HeaderFlags::SIGNED.bits() } else { 0 },
        toc_offset,
        toc_bytes,
        toc_count: sections.len() as u32,
        ..Header::default()
    };

    let mut file = Vec::with_capacity(payload_offset as usize);
    file.extend_from_slice(&header.encode());
    for entry in &toc {
        file.extend_from_slice(&entry.encode());
    }
    for (_, payload) in sections {
        file.extend_from_slice(payload);
    }

    let d = package_digest(&file).unwrap();
    file[32..64].copy_from_slice(d.as_bytes());
    file
}

fn sample_config() -> ProgramConfig {
    let mut config = ProgramConfig::default();
    copy_str(&mut config.program_id, "com.example.feedback");
    copy_str(&mut config.program_name, "Video Feedback");
    config
}

fn build_signed_package(signing_key: &SigningKey) -> Vec<u8> {
    let config_bytes = sample_config().encode().to_vec();
    let bitstream = vec![0xC3u8; 200];

    let mut descriptor = SignedDescriptor {
        config_sha256: payload_digest(&config_bytes),
        artifact_count: 1,
        build_id: 7,
        ..SignedDescriptor::default()
    };
    descriptor.artifacts[0] = ArtifactHash {
        artifact_type: Some(TocEntryType::FpgaBitstream),
        sha256: payload_digest(&bitstream),
    };
    let descriptor_bytes = descriptor.encode();
    let signature = signing_key.sign(&descriptor_bytes);

    build_package(
        true,
        &[
            (TocEntryType::Config, config_bytes),
            (TocEntryType::SignedDescriptor, descriptor_bytes.to_vec()),
            (TocEntryType::Signature, signature.to_bytes().to_vec()),
            (TocEntryType::FpgaBitstream, bitstream),
        ],
    )
}

#[test]
fn signed_package_validates_end_to_end() {
    let sk = SigningKey::from_bytes(&[0x11u8; 32]);
    let file = build_signed_package(&sk);

    let mut scratch = vec![0u8; PROGRAM_CONFIG_LEN];
    let pk = sk.public_key();
    let result = validate_package_stream(
        &mut SliceSource::new(&file),
        file.len() as u32,
        StreamOptions {
            verify_hashes: true,
            verify_signature: true,
            public_key: Some(&pk),
            scratch: Some(&mut scratch),
        },
    );
    assert_eq!(result, Ok(()));
}

#[test]
fn reader_object_exposes_package_contents() {
    let sk = SigningKey::from_bytes(&[0x22u8; 32]);
    let file = build_signed_package(&sk);

    let mut scratch = vec![0u8; PROGRAM_CONFIG_LEN];
    let mut reader = PackageReader::open(
        SliceSource::new(&file),
        file.len() as u32,
        true,
        Some(&mut scratch),
    )
    .unwrap();

    assert!(reader.is_signed());
    assert_eq!(reader.toc_count(), 4);

    let config = reader.read_config().unwrap();
    assert_eq!(
        vmpg_format::strings::as_str(&config.program_id),
        Some("com.example.feedback")
    );

    let mut bitstream = vec![0u8; 256];
    let n = reader.read_bitstream(&mut bitstream).unwrap();
    assert_eq!(n, 200);
    assert!(bitstream[..n].iter().all(|&b| b == 0xC3));

    // Signature verification is an explicit, deferred policy call.
    assert_eq!(reader.verify_signature(Some(&sk.public_key())), Ok(None));
    assert_eq!(
        reader.verify_signature(None),
        Err(PackageError::InvalidHash),
        "no shipped trust anchor signed this package"
    );
}

#[test]
fn scratch_too_small_cannot_materialize_payloads() {
    let sk = SigningKey::from_bytes(&[0x33u8; 32]);
    let file = build_signed_package(&sk);

    let mut scratch = vec![0u8; 64]; // smaller than every payload
    let result = validate_package_stream(
        &mut SliceSource::new(&file),
        file.len() as u32,
        StreamOptions {
            verify_hashes: true,
            verify_signature: false,
            public_key: None,
            scratch: Some(&mut scratch),
        },
    );
    assert_eq!(result, Err(PackageError::InvalidPayloadOffset));
}

#[test]
fn missing_scratch_behaves_like_zero_capacity() {
    let sk = SigningKey::from_bytes(&[0x44u8; 32]);
    let file = build_signed_package(&sk);

    let result = validate_package_stream(
        &mut SliceSource::new(&file),
        file.len() as u32,
        StreamOptions {
            verify_hashes: true,
            ..StreamOptions::default()
        },
    );
    assert_eq!(result, Err(PackageError::InvalidPayloadOffset));
}

#[test]
fn hash_walk_can_be_skipped() {
    let sk = SigningKey::from_bytes(&[0x55u8; 32]);
    let file = build_signed_package(&sk);

    let result = validate_package_stream(
        &mut SliceSource::new(&file),
        file.len() as u32,
        StreamOptions::default(),
    );
    assert_eq!(result, Ok(()));
}

#[test]
fn corrupted_payload_fails_the_stream_hash_walk() {
    let sk = SigningKey::from_bytes(&[0x66u8; 32]);
    let mut file = build_signed_package(&sk);
    let last = file.len() - 1;
    file[last] ^= 0xFF;
    // Re-record the whole-file digest so only the payload digest objects.
    let d = package_digest(&file).unwrap();
    file[32..64].copy_from_slice(d.as_bytes());

    let mut scratch = vec![0u8; PROGRAM_CONFIG_LEN];
    let result = validate_package_stream(
        &mut SliceSource::new(&file),
        file.len() as u32,
        StreamOptions {
            verify_hashes: true,
            verify_signature: false,
            public_key: None,
            scratch: Some(&mut scratch),
        },
    );
    assert_eq!(result, Err(PackageError::InvalidHash));
}

#[test]
fn corrupted_package_digest_fails_the_stream_walk() {
    let sk = SigningKey::from_bytes(&[0x77u8; 32]);
    let mut file = build_signed_package(&sk);
    file[40] ^= 0x01;

    let mut scratch = vec![0u8; PROGRAM_CONFIG_LEN];
    let result = validate_package_stream(
        &mut SliceSource::new(&file),
        file.len() as u32,
        StreamOptions {
            verify_hashes: true,
            verify_signature: false,
            public_key: None,
            scratch: Some(&mut scratch),
        },
    );
    assert_eq!(result, Err(PackageError::InvalidHash));
}

#[test]
fn toc_above_reader_capacity_is_a_typed_error() {
    // 17 one-byte payloads: a valid package, but beyond this reader.
    let sections: Vec<(TocEntryType, Vec<u8>)> = (0..=MAX_TOC_ENTRIES)
        .map(|i| (TocEntryType::FpgaBitstream, vec![i as u8]))
        .collect();
    let file = build_package(false, &sections);

    let result = validate_package_stream(
        &mut SliceSource::new(&file),
        file.len() as u32,
        StreamOptions::default(),
    );
    assert_eq!(result, Err(PackageError::InvalidTocCount));
}

#[test]
fn truncated_source_fails_header_read() {
    let mut source = SliceSource::new(&[0u8; 32]);
    assert_eq!(read_header(&mut source), Err(PackageError::InvalidFileSize));
}

#[test]
fn header_reader_reproduces_stored_bytes() {
    let sk = SigningKey::from_bytes(&[0x88u8; 32]);
    let file = build_signed_package(&sk);

    let header = read_header(&mut SliceSource::new(&file)).unwrap();
    assert_eq!(header.encode().as_slice(), &file[..HEADER_LEN]);
}

#[test]
fn wrong_file_size_is_rejected() {
    let sk = SigningKey::from_bytes(&[0x99u8; 32]);
    let file = build_signed_package(&sk);

    let result = validate_package_stream(
        &mut SliceSource::new(&file),
        file.len() as u32 + 1,
        StreamOptions::default(),
    );
    assert_eq!(result, Err(PackageError::InvalidFileSize));
}
