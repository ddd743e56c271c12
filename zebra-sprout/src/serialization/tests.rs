//! Tests for basic serialization primitives.

use std::io::Cursor;

use proptest::prelude::*;

use crate::serialization::{
    zcash_deserialize_external_count, ReadZcashExt, SerializationError, TrustedPreallocate,
    WriteZcashExt, ZcashDeserialize, MAX_PROTOCOL_MESSAGE_LEN,
};

proptest! {
    #[test]
    fn compactsize_read_then_write_round_trip(bytes in prop::array::uniform9(0u8..)) {
        zebra_test::init();

        // Only canonical encodings decode, so re-encoding the decoded size
        // must reproduce the bytes that were read.
        if let Ok(s) = Cursor::new(&bytes[..]).read_compactsize() {
            let mut expect_bytes = bytes;
            Cursor::new(&mut expect_bytes[..]).write_compactsize(s).unwrap();
            prop_assert_eq!(bytes, expect_bytes);
        }
    }
}

#[test]
fn compactsize_rejects_non_canonical_encodings() {
    zebra_test::init();

    // 0x12 encoded with a 2-byte length.
    let err = Cursor::new(b"\xfd\x12\x00").read_compactsize();
    assert!(matches!(err, Err(SerializationError::Parse(_))));

    // 0xfd encoded with a 4-byte length.
    let err = Cursor::new(b"\xfe\xfd\x00\x00\x00").read_compactsize();
    assert!(matches!(err, Err(SerializationError::Parse(_))));
}

#[test]
fn compactsize_rejects_sizes_over_message_limit() {
    zebra_test::init();

    let mut buf = Vec::new();
    buf.write_compactsize(MAX_PROTOCOL_MESSAGE_LEN as u64 + 1)
        .unwrap();

    let err = Cursor::new(&buf).read_compactsize();
    assert!(matches!(err, Err(SerializationError::Parse(_))));
}

/// A one-byte item that can appear at most four times in a message.
#[derive(Debug)]
struct Tiny;

impl ZcashDeserialize for Tiny {
    fn zcash_deserialize<R: std::io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let mut byte = [0u8; 1];
        reader.read_exact(&mut byte)?;
        Ok(Tiny)
    }
}

impl TrustedPreallocate for Tiny {
    fn max_allocation() -> u64 {
        4
    }
}

#[test]
fn external_count_is_capped_by_max_allocation() {
    zebra_test::init();

    let data = [0u8; 8];

    let items: Vec<Tiny> = zcash_deserialize_external_count(4, &data[..]).unwrap();
    assert_eq!(items.len(), 4);

    let err = zcash_deserialize_external_count::<_, Tiny>(5, &data[..]);
    assert!(matches!(err, Err(SerializationError::Parse(_))));
}
