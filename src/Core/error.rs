// Error types shared by the byte ring and the framed ring.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Failures reported by `save`/`get` on either ring.
///
/// None of these are retried internally; the only wait the rings perform is
/// the bounded completion-marker poll inside `FramedRing::get`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The write would not fit in the free space of the ring.
    #[error("out of capacity: requested {requested} bytes, {available} available")]
    OutOfCapacity { requested: usize, available: usize },

    /// The write-cursor compare-and-swap lost a race with another producer.
    #[error("write cursor contended by a concurrent producer")]
    Contention,

    /// A frame or read window is malformed.
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// The first fragment at `offset` was still unmarked after the bounded wait.
    #[error("frame at offset {offset} not ready after {waited:?}")]
    NotReady { offset: usize, waited: Duration },
}

/// Framing violations detected by the block codec or during reassembly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("payload of {len} bytes exceeds block capacity {max}")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("frame is {len} bytes, expected {expected}")]
    FrameLength { len: usize, expected: usize },

    #[error("used length {used} is not a multiple of frame size {frame_size}")]
    MisalignedWindow { used: usize, frame_size: usize },

    #[error("fragment {index}/{total} found where fragment {expected_index}/{expected_total} was expected")]
    FragmentMismatch {
        index: u16,
        total: u16,
        expected_index: u16,
        expected_total: u16,
    },

    #[error("message of {len} bytes needs more than {max} fragments")]
    TooManyFragments { len: usize, max: usize },

    #[error("message claims {total} fragments but only {available} frames are readable")]
    TruncatedMessage { total: usize, available: usize },

    #[error("fragment {index} carries {len} payload bytes (max {max})")]
    PayloadLength { index: u16, len: usize, max: usize },
}

/// Rejected ring configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("capacity must be greater than zero")]
    ZeroCapacity,

    #[error("max payload must be in 1..={max}, got {got}")]
    InvalidMaxPayload { got: usize, max: usize },

    #[error("frame size {frame_size} exceeds ring capacity {capacity}")]
    FrameLargerThanCapacity { frame_size: usize, capacity: usize },
}

impl From<QueueError> for io::Error {
    fn from(err: QueueError) -> Self {
        let kind = match &err {
            QueueError::OutOfCapacity { .. } | QueueError::Contention => io::ErrorKind::WouldBlock,
            QueueError::NotReady { .. } => io::ErrorKind::WouldBlock,
            QueueError::Format(_) => io::ErrorKind::InvalidData,
        };
        io::Error::new(kind, err)
    }
}

impl From<ConfigError> for io::Error {
    fn from(err: ConfigError) -> Self {
        io::Error::new(io::ErrorKind::InvalidInput, err)
    }
}
