use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering::{Acquire, Relaxed, Release};

use tracing::{debug, trace, warn};

use super::layout::{MARKER_COMPLETE, MARKER_OFFSET};
use super::Buffer::FramedRing;
use crate::Core::cursor::RingCursors;
use crate::Core::error::{ConfigError, FormatError, QueueError};
use crate::Core::wait::ReadyWait;
use crate::MPSC::Structs::Block_Structs::{Block, FrameConfig};

impl FramedRing {
    /// Creates an empty ring with `capacity` usable bytes.
    ///
    /// At least one whole frame must fit.
    pub fn new(capacity: usize, config: FrameConfig) -> Result<Self, ConfigError> {
        Self::with_ready_wait(capacity, config, ReadyWait::default())
    }

    pub fn with_ready_wait(
        capacity: usize,
        config: FrameConfig,
        ready_wait: ReadyWait,
    ) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if config.frame_size() > capacity {
            return Err(ConfigError::FrameLargerThanCapacity {
                frame_size: config.frame_size(),
                capacity,
            });
        }

        let cursors = RingCursors::new(capacity);
        let storage = (0..cursors.queue_len())
            .map(|_| AtomicU8::new(0))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self {
            cursors,
            storage,
            config,
            ready_wait,
        })
    }

    /// Usable bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cursors.capacity()
    }

    #[inline]
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    #[inline]
    pub fn frame_size(&self) -> usize {
        self.config.frame_size()
    }

    #[inline]
    pub fn ready_wait(&self) -> ReadyWait {
        self.ready_wait
    }

    /// Frames a message of `len` bytes occupies.
    #[inline]
    pub fn fragments_for(&self, len: usize) -> usize {
        self.config.fragments_for(len)
    }

    /// Bytes reserved by producers and not yet consumed.
    ///
    /// Inaccurate in the presence of concurrent method invocations.
    pub fn used_len(&self) -> usize {
        self.cursors.snapshot().used
    }

    /// Inaccurate in the presence of concurrent method invocations.
    pub fn free_len(&self) -> usize {
        self.capacity() - self.used_len()
    }

    /// Inaccurate in the presence of concurrent method invocations.
    pub fn is_empty(&self) -> bool {
        self.used_len() == 0
    }

    /// Enqueues one message, split across as many frames as it needs.
    ///
    /// Makes exactly one attempt at reserving space. Returns
    /// `QueueError::Contention` if another producer moved the write cursor
    /// first; callers that must succeed retry.
    pub fn save(&self, message: &[u8]) -> Result<(), QueueError> {
        let fragments = self.config.checked_fragments_for(message.len())?;
        let region = fragments as usize * self.frame_size();

        let snap = self.cursors.snapshot();
        let available = self.cursors.free_between(snap.read, snap.write);
        if region > available {
            return Err(QueueError::OutOfCapacity {
                requested: region,
                available,
            });
        }

        // Reserve
        let start = snap.write;
        if self
            .cursors
            .try_reserve(start, self.cursors.advance(start, region))
            .is_err()
        {
            debug!(position = start, region, "write cursor contended");
            return Err(QueueError::Contention);
        }
        trace!(position = start, region, fragments, "reserved region");

        // Fill
        self.fill(start, fragments, message);
        Ok(())
    }

    /// Writes the fragments of `message` into the region reserved at `start`,
    /// last fragment first.
    ///
    /// Cannot fail: once the region is reserved every frame of it must be
    /// marked, or the consumer would wait on it forever.
    fn fill(&self, start: usize, fragments: u16, message: &[u8]) {
        let frame_size = self.frame_size();
        let max_payload = self.config.max_payload();
        let mut frame = vec![0u8; frame_size];

        for index in (0..fragments).rev() {
            let lo = index as usize * max_payload;
            let hi = (lo + max_payload).min(message.len());
            let chunk = &message[lo.min(hi)..hi];

            self.config.write_frame(fragments, index, chunk, &mut frame);

            let position = self.cursors.advance(start, index as usize * frame_size);
            self.write_bytes(self.cursors.advance(position, 1), &frame[MARKER_OFFSET + 1..]);
            self.storage[self.cursors.slot(position)].store(MARKER_COMPLETE, Release);
        }
    }

    /// Dequeues every complete message currently readable, in placement order.
    ///
    /// Must only be called from one thread at a time.
    ///
    /// Reconstruction stops at the first message whose first frame is still
    /// unmarked after the bounded wait; that message and everything behind it
    /// stay in the ring for a later call. If nothing at all was ready the
    /// result is `QueueError::NotReady`. The read cursor advances by exactly
    /// the frames that were returned.
    ///
    /// A corrupt frame sequence also ends the batch: messages reconstructed
    /// before it are returned and consumed, and the format error is reported
    /// by the next call, which finds the corrupt frame at the head of the
    /// window and consumes nothing.
    pub fn get(&self) -> Result<Vec<Vec<u8>>, QueueError> {
        let snap = self.cursors.snapshot();
        if snap.used == 0 {
            return Ok(Vec::new());
        }

        let frame_size = self.frame_size();
        if snap.used % frame_size != 0 {
            let err = FormatError::MisalignedWindow {
                used: snap.used,
                frame_size,
            };
            warn!(%err, "read window is not frame aligned");
            return Err(err.into());
        }

        let frames = snap.used / frame_size;
        let mut scratch = vec![0u8; frame_size];
        let mut messages = Vec::new();
        let mut consumed = 0usize;

        while consumed < frames {
            let head = self.cursors.advance(snap.read, consumed * frame_size);
            if let Err(waited) = self.ready_wait.poll(|| self.is_marked(head)) {
                debug!(
                    slot = self.cursors.slot(head),
                    ?waited,
                    ready = messages.len(),
                    "first fragment not ready"
                );
                if messages.is_empty() {
                    return Err(QueueError::NotReady {
                        offset: self.cursors.slot(head),
                        waited,
                    });
                }
                break;
            }

            match self.reassemble(head, frames - consumed, &mut scratch) {
                Ok((message, used_frames)) => {
                    consumed += used_frames;
                    messages.push(message);
                }
                Err(err) => {
                    warn!(
                        %err,
                        slot = self.cursors.slot(head),
                        ready = messages.len(),
                        "corrupt frame sequence"
                    );
                    if messages.is_empty() {
                        return Err(err.into());
                    }
                    break;
                }
            }
        }

        self.release(snap.read, consumed * frame_size);
        trace!(messages = messages.len(), frames = consumed, "reconstructed batch");
        Ok(messages)
    }

    /// Rebuilds the message whose first frame sits at `head`.
    ///
    /// Returns the payload and the number of frames it spanned.
    fn reassemble(
        &self,
        head: usize,
        available: usize,
        scratch: &mut [u8],
    ) -> Result<(Vec<u8>, usize), FormatError> {
        let frame_size = self.frame_size();
        let first = self.read_block(head, scratch)?;
        if first.fragment_index != 0 || first.total_fragments == 0 {
            return Err(FormatError::FragmentMismatch {
                index: first.fragment_index,
                total: first.total_fragments,
                expected_index: 0,
                expected_total: first.total_fragments.max(1),
            });
        }

        let total = first.total_fragments as usize;
        if total > available {
            return Err(FormatError::TruncatedMessage { total, available });
        }

        let mut message = Vec::with_capacity(total * self.config.max_payload());
        self.append_fragment(&first, total, &mut message)?;
        for index in 1..total {
            let position = self.cursors.advance(head, index * frame_size);
            let block = self.read_block(position, scratch)?;
            if block.fragment_index as usize != index
                || block.total_fragments != first.total_fragments
            {
                return Err(FormatError::FragmentMismatch {
                    index: block.fragment_index,
                    total: block.total_fragments,
                    expected_index: index as u16,
                    expected_total: first.total_fragments,
                });
            }
            self.append_fragment(&block, total, &mut message)?;
        }

        Ok((message, total))
    }

    fn append_fragment(
        &self,
        block: &Block,
        total: usize,
        message: &mut Vec<u8>,
    ) -> Result<(), FormatError> {
        // Only the last fragment may be short.
        let is_last = block.fragment_index as usize + 1 == total;
        if !is_last && block.payload_len as usize != self.config.max_payload() {
            return Err(FormatError::PayloadLength {
                index: block.fragment_index,
                len: block.payload_len as usize,
                max: self.config.max_payload(),
            });
        }
        message.extend_from_slice(block.data());
        Ok(())
    }

    /// Zeroes `len` consumed bytes at `read`, then publishes the new read position.
    fn release(&self, read: usize, len: usize) {
        if len == 0 {
            return;
        }
        let (a, b) = self.cursors.split(read, len);
        for byte in self.storage[a].iter().chain(self.storage[b].iter()) {
            byte.store(0, Relaxed);
        }
        self.cursors.store_read(self.cursors.advance(read, len));
    }

    #[inline]
    fn is_marked(&self, position: usize) -> bool {
        self.storage[self.cursors.slot(position)].load(Acquire) == MARKER_COMPLETE
    }

    fn read_block(&self, position: usize, scratch: &mut [u8]) -> Result<Block, FormatError> {
        self.read_bytes(position, scratch);
        self.config.decode(scratch)
    }

    fn write_bytes(&self, position: usize, src: &[u8]) {
        let (a, b) = self.cursors.split(position, src.len());
        let (head, tail) = src.split_at(a.len());
        for (dst, &byte) in self.storage[a].iter().zip(head) {
            dst.store(byte, Relaxed);
        }
        for (dst, &byte) in self.storage[b].iter().zip(tail) {
            dst.store(byte, Relaxed);
        }
    }

    fn read_bytes(&self, position: usize, dst: &mut [u8]) {
        let (a, b) = self.cursors.split(position, dst.len());
        let bytes = self.storage[a].iter().chain(self.storage[b].iter());
        for (out, byte) in dst.iter_mut().zip(bytes) {
            *out = byte.load(Relaxed);
        }
    }
}
