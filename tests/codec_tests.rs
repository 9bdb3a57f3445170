mod common;

use common::chains::{build, quiet_state};
use wrapped_error::codec::{Codec, Compression, CRC_LEN, FRAME_PLAIN, FRAME_WRAPPED};
use wrapped_error::{decode, encode, Link, WrapError, WrappedError};

fn chains_up_to_five(state: &wrapped_error::State) -> Vec<WrappedError> {
    let contexts = ["one", "two", "three", "four", "five"];
    let mut out = Vec::new();
    for len in 1..=contexts.len() {
        out.push(build(state, &contexts[..len], None));
        if len < contexts.len() {
            out.push(build(state, &contexts[..len], Some("opaque leaf")));
        }
    }
    out
}

#[test]
fn test_round_trip_preserves_rendering_and_callers() {
    let state = quiet_state();
    for codec in [Codec::new(Compression::None), Codec::new(Compression::Zlib)] {
        for err in chains_up_to_five(&state) {
            let decoded = codec.decode(&codec.encode(&err).unwrap()).unwrap();

            assert_eq!(decoded.rendered_message(), err.rendered_message());
            assert_eq!(decoded.depth(), err.depth());

            let originals = err.chain();
            let restored = decoded.chain();
            for (original, restored) in originals.iter().zip(restored.iter()) {
                match (original, restored) {
                    (Link::Wrapped(o), Link::Wrapped(r)) => {
                        assert_eq!(o.context(), r.context());
                        let (oc, rc) = (o.caller().unwrap(), r.caller().unwrap());
                        assert_eq!(
                            (oc.file(), oc.function(), oc.line()),
                            (rc.file(), rc.function(), rc.line())
                        );
                    }
                    (Link::Plain(o), Link::Plain(r)) => assert_eq!(o.to_string(), r.to_string()),
                    _ => panic!("link kinds differ"),
                }
            }
        }
    }
}

#[test]
fn test_decoded_links_have_empty_metadata() {
    let state = quiet_state();
    let err = build(&state, &["a"], None);
    let decoded = decode(&encode(&err).unwrap()).unwrap();

    assert_eq!(decoded.metadata().index(), 0);
    assert!(decoded.process().is_none());
}

#[test]
fn test_layout_is_frames_then_crc() {
    let state = quiet_state();
    let err = build(&state, &["a"], Some("b"));
    let bytes = Codec::new(Compression::None).encode(&err).unwrap();

    assert_eq!(bytes[0], FRAME_WRAPPED);
    let plain_frame_len = 1 + 8 + 1;
    let plain_start = bytes.len() - CRC_LEN - plain_frame_len;
    assert_eq!(bytes[plain_start], FRAME_PLAIN);
    assert_eq!(&bytes[plain_start + 1..plain_start + 9], &1u64.to_le_bytes());
    assert_eq!(bytes[plain_start + 9], b'b');
}

#[test]
fn test_any_crc_byte_corruption_is_integrity_error() {
    let state = quiet_state();
    let codec = Codec::new(Compression::None);
    for err in chains_up_to_five(&state) {
        let bytes = codec.encode(&err).unwrap();
        for offset in 1..=CRC_LEN {
            let mut corrupt = bytes.clone();
            let index = corrupt.len() - offset;
            corrupt[index] = corrupt[index].wrapping_add(1);

            assert!(matches!(
                codec.decode(&corrupt),
                Err(WrapError::Integrity { .. })
            ));
        }
    }
}

#[test]
fn test_payload_corruption_is_detected() {
    let state = quiet_state();
    let codec = Codec::new(Compression::None);
    let err = build(&state, &["context A"], Some("root cause"));
    let mut bytes = codec.encode(&err).unwrap();

    // Flip a byte inside the leaf's message text.
    let index = bytes.len() - CRC_LEN - 1;
    bytes[index] ^= 0x20;

    let result = codec.decode(&bytes);
    assert!(matches!(result, Err(WrapError::Integrity { .. })));
}

#[test]
fn test_truncated_buffer_is_decoding_error() {
    let state = quiet_state();
    let codec = Codec::new(Compression::None);
    let err = build(&state, &["outer", "inner"], Some("leaf"));
    let bytes = codec.encode(&err).unwrap();

    for cut in [1, 3, CRC_LEN, 9, bytes.len() - CRC_LEN - 1, bytes.len() - 1] {
        let result = codec.decode(&bytes[..cut]);
        assert!(
            matches!(result, Err(WrapError::Decoding { .. })),
            "truncating to {} bytes gave {:?}",
            cut,
            result.err()
        );
    }
}

#[test]
fn test_empty_buffer_is_decoding_error() {
    assert!(matches!(decode(&[]), Err(WrapError::Decoding { .. })));
}

#[test]
fn test_raw_buffers_decode_with_default_codec() {
    let state = quiet_state();
    let err = build(&state, &["a", "b"], None);
    let raw = Codec::new(Compression::None).encode(&err).unwrap();

    assert_eq!(decode(&raw).unwrap().rendered_message(), "a: b");
}
