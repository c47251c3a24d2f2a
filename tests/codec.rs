use dmxp_framering::MPSC::Buffer::layout::{HEADER_SIZE, MARKER_COMPLETE, MARKER_OFFSET};
use dmxp_framering::{FormatError, FrameConfig};
use proptest::prelude::*;

fn payload_and_config() -> impl Strategy<Value = (usize, Vec<u8>)> {
    (1usize..=64).prop_flat_map(|max| (Just(max), prop::collection::vec(any::<u8>(), 0..=max)))
}

proptest! {
    #[test]
    fn decode_restores_encoded_fields(
        (max, payload) in payload_and_config(),
        total in 1u16..=u16::MAX,
        index in any::<u16>(),
    ) {
        let cfg = FrameConfig::new(max).unwrap();
        let frame = cfg.encode(total, index, &payload).unwrap();
        prop_assert_eq!(frame.len(), HEADER_SIZE + max);

        let block = cfg.decode(&frame).unwrap();
        prop_assert_eq!(block.total_fragments, total);
        prop_assert_eq!(block.fragment_index, index);
        prop_assert_eq!(block.payload_len as usize, payload.len());
        prop_assert_eq!(block.data(), &payload[..]);
        prop_assert!(block.payload[payload.len()..].iter().all(|&b| b == 0));
        prop_assert!(!block.is_complete());
    }

    #[test]
    fn oversized_payload_never_encodes(max in 1usize..=64, extra in 1usize..16) {
        let cfg = FrameConfig::new(max).unwrap();
        let payload = vec![7u8; max + extra];
        prop_assert_eq!(
            cfg.encode(1, 0, &payload),
            Err(FormatError::PayloadTooLarge { len: max + extra, max })
        );
    }
}

#[test]
fn marker_flip_is_visible_after_decode() {
    let cfg = FrameConfig::default();
    let mut frame = cfg.encode(3, 2, b"tail").unwrap();
    frame[MARKER_OFFSET] = MARKER_COMPLETE;
    let block = cfg.decode(&frame).unwrap();
    assert!(block.is_complete());
    assert_eq!(block.data(), b"tail");
}

#[test]
fn decode_rejects_truncated_frame() {
    let cfg = FrameConfig::default();
    let frame = cfg.encode(1, 0, b"abc").unwrap();
    assert_eq!(
        cfg.decode(&frame[..frame.len() - 1]),
        Err(FormatError::FrameLength {
            len: cfg.frame_size() - 1,
            expected: cfg.frame_size()
        })
    );
}
