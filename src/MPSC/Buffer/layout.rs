// Wire layout of one frame in the framed ring.
//
//   offset  size  field
//   0       1     completion marker (0 = pending, 1 = written)
//   1       2     total fragments      (u16, little-endian)
//   3       2     fragment index       (u16, little-endian)
//   5       2     payload length       (u16, little-endian)
//   7       N     payload, zero-padded to max_payload
//
// Every frame in a ring has the same size, HEADER_SIZE + max_payload.

pub const MARKER_OFFSET: usize = 0;
pub const TOTAL_OFFSET: usize = 1;
pub const INDEX_OFFSET: usize = 3;
pub const LEN_OFFSET: usize = 5;
pub const PAYLOAD_OFFSET: usize = 7;

/// Bytes in front of the payload.
pub const HEADER_SIZE: usize = PAYLOAD_OFFSET;

pub const MARKER_PENDING: u8 = 0;
pub const MARKER_COMPLETE: u8 = 1;

/// Default payload capacity per frame; gives 32-byte frames.
pub const DEFAULT_MAX_PAYLOAD: usize = 25;

/// Fragment counts and payload lengths are carried in u16 fields.
pub const MAX_FRAGMENTS: usize = u16::MAX as usize;
pub const MAX_PAYLOAD_LIMIT: usize = u16::MAX as usize;
