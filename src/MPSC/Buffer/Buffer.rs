// This is the shared framed ring for MPSC - storage addressed as fixed-size frames

use crate::Core::cursor::RingCursors;
use crate::Core::wait::ReadyWait;
use crate::MPSC::Structs::Block_Structs::FrameConfig;

use std::sync::atomic::AtomicU8;

/// A lock-free, multi-producer, single-consumer ring of fixed-size frames.
///
/// ### Concurrency Design:
/// - **Producers (`save`)**: a producer computes how many frames its message
///   needs, then claims that many bytes with one compare-and-swap on the write
///   cursor. A lost race is reported as `QueueError::Contention`; the ring
///   never retries for the caller. The claimed region is filled last fragment
///   first, and each frame's completion marker is published with `Release`
///   after its bytes, so the marker of fragment 0 goes out last.
/// - **Consumer (`get`)**: the single consumer walks the readable window one
///   message at a time. It only polls the marker of a message's first frame;
///   once that is set, the whole message is in place. Consumed frames are
///   zeroed before the read cursor moves past them, so a region that is
///   reserved again starts with every marker unset.
///
/// Storage is `capacity + 1` atomic bytes. Reads of a frame that a producer
/// is still writing are therefore well defined, they just may not be
/// meaningful until the marker says so.
pub struct FramedRing {
    /// Read and write positions, in bytes.
    pub(crate) cursors: RingCursors,

    /// Raw frame bytes, `cursors.queue_len()` long.
    pub(crate) storage: Box<[AtomicU8]>,

    /// Frame size and payload capacity of this ring.
    pub(crate) config: FrameConfig,

    /// How long `get` waits on an unmarked first fragment.
    pub(crate) ready_wait: ReadyWait,
}
