//! Single-producer/single-consumer byte ring.
//!
//! A [`ByteRing`] is a fixed-capacity circular buffer of raw bytes. The
//! producer appends with [`save`](ByteRing::save) and the consumer drains
//! everything written so far with [`get`](ByteRing::get).
//!
//! ```text
//!    _______________________
//!   |   | a | b | c |   |   |
//!    ¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯
//!         ^           ^
//!         read        write
//! ```
//!
//! A ring owned by one thread is used directly through `&mut self`. To hand
//! the two ends to different threads, [`split`](ByteRing::split) it into a
//! [`ByteWriter`] and a [`ByteReader`]; neither can be cloned, which is what
//! keeps the ring single-producer and single-consumer. No lock is taken: the
//! writer only stores the write cursor, the reader only stores the read
//! cursor, and both publish with release/acquire ordering.

use std::cell::UnsafeCell;
use std::ptr;
use std::sync::Arc;

use crate::Core::cursor::RingCursors;
use crate::Core::error::{ConfigError, QueueError};

/// Storage and cursors shared by the two ends.
struct Shared {
    cursors: RingCursors,

    /// `capacity + 1` bytes. The writer only touches `[write, read)` and the
    /// reader only touches `[read, write)`, so the two never overlap.
    buf: Box<[UnsafeCell<u8>]>,
}

// Access to `buf` is partitioned by the cursors.
unsafe impl Sync for Shared {}

/// Fixed-capacity byte queue for one producer and one consumer.
pub struct ByteRing {
    shared: Arc<Shared>,
}

/// Producing end of a split [`ByteRing`].
pub struct ByteWriter {
    shared: Arc<Shared>,
}

/// Consuming end of a split [`ByteRing`].
pub struct ByteReader {
    shared: Arc<Shared>,
}

impl Shared {
    fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        let cursors = RingCursors::new(capacity);
        let buf = (0..cursors.queue_len())
            .map(|_| UnsafeCell::new(0))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Ok(Self { cursors, buf })
    }

    #[inline]
    fn base(&self) -> *mut u8 {
        UnsafeCell::raw_get(self.buf.as_ptr())
    }

    fn used_len(&self) -> usize {
        self.cursors.snapshot().used
    }

    fn free_len(&self) -> usize {
        let snap = self.cursors.snapshot();
        self.cursors.free_between(snap.read, snap.write)
    }

    /// # Safety
    /// Only one thread may be saving at a time.
    unsafe fn save(&self, bytes: &[u8]) -> Result<(), QueueError> {
        // The write cursor is ours; only the read cursor can move under us.
        let write = self.cursors.load_write();
        let read = self.cursors.load_read();
        let available = self.cursors.free_between(read, write);
        if bytes.len() > available {
            return Err(QueueError::OutOfCapacity {
                requested: bytes.len(),
                available,
            });
        }
        if bytes.is_empty() {
            return Ok(());
        }

        let (a, b) = self.cursors.split(write, bytes.len());
        let (head, tail) = bytes.split_at(a.len());
        ptr::copy_nonoverlapping(head.as_ptr(), self.base().add(a.start), head.len());
        ptr::copy_nonoverlapping(tail.as_ptr(), self.base().add(b.start), tail.len());

        // Publish
        self.cursors.store_write(self.cursors.advance(write, bytes.len()));
        Ok(())
    }

    /// # Safety
    /// Only one thread may be reading at a time.
    unsafe fn get(&self) -> Vec<u8> {
        let read = self.cursors.load_read();
        let write = self.cursors.load_write();
        let used = self.cursors.used_between(read, write);
        if used == 0 {
            return Vec::new();
        }

        let (a, b) = self.cursors.split(read, used);
        let mut out = Vec::with_capacity(used);
        ptr::copy_nonoverlapping(self.base().add(a.start), out.as_mut_ptr(), a.len());
        ptr::copy_nonoverlapping(
            self.base().add(b.start),
            out.as_mut_ptr().add(a.len()),
            b.len(),
        );
        out.set_len(used);

        // Free the space for the writer.
        self.cursors.store_read(write);
        out
    }
}

impl ByteRing {
    /// Creates an empty ring holding up to `capacity` bytes.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            shared: Arc::new(Shared::new(capacity)?),
        })
    }

    pub fn capacity(&self) -> usize {
        self.shared.cursors.capacity()
    }

    /// Bytes written and not yet read.
    pub fn len(&self) -> usize {
        self.shared.used_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn free_len(&self) -> usize {
        self.shared.free_len()
    }

    /// Appends `bytes`, or fails without touching the ring if they do not fit.
    pub fn save(&mut self, bytes: &[u8]) -> Result<(), QueueError> {
        // SAFETY: `&mut self` and no split halves exist.
        unsafe { self.shared.save(bytes) }
    }

    /// Drains everything written so far, reassembling across the wrap point.
    ///
    /// Returns an empty vector when there is nothing to read.
    pub fn get(&mut self) -> Vec<u8> {
        // SAFETY: `&mut self` and no split halves exist.
        unsafe { self.shared.get() }
    }

    /// Splits the ring into its producing and consuming ends.
    pub fn split(self) -> (ByteWriter, ByteReader) {
        let writer = ByteWriter {
            shared: Arc::clone(&self.shared),
        };
        let reader = ByteReader {
            shared: self.shared,
        };
        (writer, reader)
    }
}

impl ByteWriter {
    pub fn capacity(&self) -> usize {
        self.shared.cursors.capacity()
    }

    /// Free bytes as seen by the writer; may grow concurrently.
    pub fn free_len(&self) -> usize {
        self.shared.free_len()
    }

    pub fn save(&mut self, bytes: &[u8]) -> Result<(), QueueError> {
        // SAFETY: there is exactly one `ByteWriter` per ring.
        unsafe { self.shared.save(bytes) }
    }
}

impl ByteReader {
    /// Readable bytes as seen by the reader; may grow concurrently.
    pub fn len(&self) -> usize {
        self.shared.used_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&mut self) -> Vec<u8> {
        // SAFETY: there is exactly one `ByteReader` per ring.
        unsafe { self.shared.get() }
    }
}
