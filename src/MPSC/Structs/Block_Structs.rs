// Block codec: one fixed-size frame carrying one fragment of a message.

use crate::Core::error::{ConfigError, FormatError};
use crate::MPSC::Buffer::layout::{
    DEFAULT_MAX_PAYLOAD, HEADER_SIZE, INDEX_OFFSET, LEN_OFFSET, MARKER_COMPLETE, MARKER_OFFSET,
    MARKER_PENDING, MAX_FRAGMENTS, MAX_PAYLOAD_LIMIT, PAYLOAD_OFFSET, TOTAL_OFFSET,
};

/// Framing parameters of one ring.
///
/// Every ring owns its own copy, so rings with different frame sizes can
/// live side by side.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrameConfig {
    max_payload: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload: DEFAULT_MAX_PAYLOAD,
        }
    }
}

/// A decoded frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub total_fragments: u16,
    pub fragment_index: u16,
    pub payload_len: u16,
    pub completion_marker: u8,
    /// Always `max_payload` bytes; bytes past `payload_len` are zero on encode.
    pub payload: Vec<u8>,
}

impl Block {
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.completion_marker == MARKER_COMPLETE
    }

    /// The real data carried, without padding.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.payload[..self.payload_len as usize]
    }
}

impl FrameConfig {
    pub fn new(max_payload: usize) -> Result<Self, ConfigError> {
        if max_payload == 0 || max_payload > MAX_PAYLOAD_LIMIT {
            return Err(ConfigError::InvalidMaxPayload {
                got: max_payload,
                max: MAX_PAYLOAD_LIMIT,
            });
        }
        Ok(Self { max_payload })
    }

    #[inline]
    pub fn max_payload(&self) -> usize {
        self.max_payload
    }

    /// Header plus payload capacity; constant for the lifetime of a ring.
    #[inline]
    pub fn frame_size(&self) -> usize {
        HEADER_SIZE + self.max_payload
    }

    /// Frames needed for a message of `len` bytes. Empty messages still take one frame.
    #[inline]
    pub fn fragments_for(&self, len: usize) -> usize {
        len.div_ceil(self.max_payload).max(1)
    }

    /// Like [`fragments_for`](Self::fragments_for), but rejects counts the header cannot carry.
    pub fn checked_fragments_for(&self, len: usize) -> Result<u16, FormatError> {
        let count = self.fragments_for(len);
        if count > MAX_FRAGMENTS {
            return Err(FormatError::TooManyFragments {
                len,
                max: MAX_FRAGMENTS,
            });
        }
        Ok(count as u16)
    }

    /// Encodes one fragment into a new frame with the marker unset.
    pub fn encode(
        &self,
        total_fragments: u16,
        fragment_index: u16,
        payload: &[u8],
    ) -> Result<Vec<u8>, FormatError> {
        let mut frame = vec![0u8; self.frame_size()];
        self.encode_into(total_fragments, fragment_index, payload, &mut frame)?;
        Ok(frame)
    }

    /// Encodes into `out`, which must be exactly one frame long.
    ///
    /// The marker byte is written as pending; the caller flips it once the
    /// frame is in ring storage.
    pub fn encode_into(
        &self,
        total_fragments: u16,
        fragment_index: u16,
        payload: &[u8],
        out: &mut [u8],
    ) -> Result<(), FormatError> {
        if payload.len() > self.max_payload {
            return Err(FormatError::PayloadTooLarge {
                len: payload.len(),
                max: self.max_payload,
            });
        }
        if out.len() != self.frame_size() {
            return Err(FormatError::FrameLength {
                len: out.len(),
                expected: self.frame_size(),
            });
        }

        self.write_frame(total_fragments, fragment_index, payload, out);
        Ok(())
    }

    /// Writes a frame whose payload and buffer sizes were already checked.
    pub(crate) fn write_frame(
        &self,
        total_fragments: u16,
        fragment_index: u16,
        payload: &[u8],
        out: &mut [u8],
    ) {
        debug_assert!(payload.len() <= self.max_payload);
        debug_assert_eq!(out.len(), self.frame_size());

        out[MARKER_OFFSET] = MARKER_PENDING;
        out[TOTAL_OFFSET..TOTAL_OFFSET + 2].copy_from_slice(&total_fragments.to_le_bytes());
        out[INDEX_OFFSET..INDEX_OFFSET + 2].copy_from_slice(&fragment_index.to_le_bytes());
        out[LEN_OFFSET..LEN_OFFSET + 2].copy_from_slice(&(payload.len() as u16).to_le_bytes());

        let body = &mut out[PAYLOAD_OFFSET..];
        body[..payload.len()].copy_from_slice(payload);
        body[payload.len()..].fill(0);
    }

    pub fn decode(&self, frame: &[u8]) -> Result<Block, FormatError> {
        if frame.len() != self.frame_size() {
            return Err(FormatError::FrameLength {
                len: frame.len(),
                expected: self.frame_size(),
            });
        }

        let read_u16 = |at: usize| u16::from_le_bytes([frame[at], frame[at + 1]]);
        let fragment_index = read_u16(INDEX_OFFSET);
        let payload_len = read_u16(LEN_OFFSET);
        if payload_len as usize > self.max_payload {
            return Err(FormatError::PayloadLength {
                index: fragment_index,
                len: payload_len as usize,
                max: self.max_payload,
            });
        }

        Ok(Block {
            total_fragments: read_u16(TOTAL_OFFSET),
            fragment_index,
            payload_len,
            completion_marker: frame[MARKER_OFFSET],
            payload: frame[PAYLOAD_OFFSET..].to_vec(),
        })
    }
}
