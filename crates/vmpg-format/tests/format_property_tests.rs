//! Property-based tests across the format crate: digest round-trips, curve
//! domain properties, string truncation idempotence, and record round-trips.

use proptest::prelude::*;

use vmpg_crypto::{digest, verify_digest, wipe, Digest32};
use vmpg_format::curve::{ControlMode, ALL_CONTROL_MODES, CURVE_MAX};
use vmpg_format::header::Header;
use vmpg_format::strings;
use vmpg_format::toc::TocEntry;

fn any_mode() -> impl Strategy<Value = ControlMode> {
    (0usize..ALL_CONTROL_MODES.len()).prop_map(|i| ALL_CONTROL_MODES[i])
}

proptest! {
    /// Hashing then verifying the same bytes always succeeds; flipping any
    /// single bit of either side always fails.
    #[test]
    fn prop_digest_round_trip(data in prop::collection::vec(any::<u8>(), 0..512),
                              bit in 0usize..4096) {
        let d = digest(&data);
        prop_assert!(verify_digest(&data, &d));

        // Flip a bit in the digest.
        let mut flipped = *d.as_bytes();
        flipped[(bit / 8) % 32] ^= 1 << (bit % 8);
        prop_assert!(!verify_digest(&data, &Digest32::from_bytes(flipped)));

        // Flip a bit in the data (when there is any).
        if !data.is_empty() {
            let mut corrupted = data.clone();
            let index = bit % corrupted.len();
            corrupted[index] ^= 1 << (bit % 8);
            prop_assert!(!verify_digest(&corrupted, &d));
        }
    }

    /// Every curve output stays in the 10-bit range for any input.
    #[test]
    fn prop_curve_output_in_range(mode in any_mode(), x in any::<i32>()) {
        prop_assert!(mode.apply(x) <= CURVE_MAX);
    }

    /// Polar curves are periodic with period 1024 over the whole i32 domain.
    #[test]
    fn prop_polar_wrap(x in -1_000_000i32..1_000_000) {
        for mode in ALL_CONTROL_MODES.into_iter().filter(|m| m.is_polar()) {
            prop_assert_eq!(mode.apply(x), mode.apply(x + 1024));
        }
    }

    /// Truncating copy is idempotent: re-copying a truncated string yields
    /// the same bytes and the same probed length.
    #[test]
    fn prop_copy_str_idempotent(text in "[ -~]{0,64}") {
        let mut buf = [0u8; 16];
        strings::copy_str(&mut buf, &text);
        let first = buf;
        let probed = strings::str_len(&first);

        let copied = strings::as_str(&first).unwrap().to_owned();
        strings::copy_str(&mut buf, &copied);
        prop_assert_eq!(buf, first);
        prop_assert_eq!(strings::str_len(&buf), probed);
    }

    /// Wiping leaves no nonzero byte behind.
    #[test]
    fn prop_wipe_clears(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let mut buf = data;
        wipe(&mut buf);
        prop_assert!(buf.iter().all(|&b| b == 0));
    }

    /// Header bytes survive a decode/encode round trip untouched.
    #[test]
    fn prop_header_bytes_round_trip(bytes in prop::array::uniform32(any::<u8>())) {
        // Stretch 32 random bytes over the 64-byte record deterministically.
        let mut raw = [0u8; 64];
        for (i, b) in raw.iter_mut().enumerate() {
            *b = bytes[i % 32] ^ (i as u8);
        }
        let header = Header::decode(&raw).unwrap();
        prop_assert_eq!(header.encode(), raw);
    }

    /// TOC entry bytes survive a decode/encode round trip whenever the type
    /// field decodes at all.
    #[test]
    fn prop_toc_entry_bytes_round_trip(type_wire in 0u32..=10,
                                       words in prop::array::uniform16(any::<u8>())) {
        let mut raw = [0u8; 64];
        raw[0..4].copy_from_slice(&type_wire.to_le_bytes());
        for (i, b) in raw[4..].iter_mut().enumerate() {
            *b = words[i % 16].wrapping_add(i as u8);
        }
        let entry = TocEntry::decode(&raw).unwrap();
        prop_assert_eq!(entry.encode(), raw);
    }
}
