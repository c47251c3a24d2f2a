use crossbeam_utils::CachePadded;
use std::ops::Range;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering::{AcqRel, Acquire, Release};

/// Read/write cursors of a circular buffer with `capacity + 1` slots.
///
/// The cursors are stored as running positions in `0..position_limit`, where
/// the limit is the largest multiple of `queue_len` a `usize` can hold; the
/// slot a position refers to is `position % queue_len`. Because the limit is a
/// multiple of `queue_len`, slots stay contiguous when a position wraps back
/// to zero. A position that comes back to the same slot after a full lap is
/// still a different value, so a stale snapshot can never win the
/// write-cursor exchange.
///
/// `read == write` means empty. Producers never let `write - read` exceed
/// `capacity`, so one slot of the storage is always left unused.
///
/// The cursors are the only synchronization points of the rings built on top:
/// loads are `Acquire`, stores and successful exchanges are `Release`.
pub struct RingCursors {
    /// `capacity + 1`.
    queue_len: usize,

    /// Positions are reduced modulo this multiple of `queue_len`.
    position_limit: usize,

    /// Position of the next slot the consumer will read. Only the consumer stores it.
    read: CachePadded<AtomicUsize>,

    /// Position of the next slot a producer will reserve.
    write: CachePadded<AtomicUsize>,
}

/// Both cursors as seen by one side of the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorSnapshot {
    pub read: usize,
    pub write: usize,
    pub used: usize,
}

impl RingCursors {
    pub fn new(capacity: usize) -> Self {
        let queue_len = capacity + 1;
        Self {
            queue_len,
            position_limit: (usize::MAX / queue_len) * queue_len,
            read: CachePadded::new(AtomicUsize::new(0)),
            write: CachePadded::new(AtomicUsize::new(0)),
        }
    }

    /// Number of addressable slots, one more than the usable capacity.
    #[inline]
    pub fn queue_len(&self) -> usize {
        self.queue_len
    }

    /// Exclusive upper bound of a cursor position.
    #[inline]
    pub fn position_limit(&self) -> usize {
        self.position_limit
    }

    /// Usable slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.queue_len - 1
    }

    #[inline]
    pub fn load_read(&self) -> usize {
        self.read.load(Acquire)
    }

    #[inline]
    pub fn load_write(&self) -> usize {
        self.write.load(Acquire)
    }

    #[inline]
    pub fn store_read(&self, position: usize) {
        self.read.store(position, Release);
    }

    #[inline]
    pub fn store_write(&self, position: usize) {
        self.write.store(position, Release);
    }

    /// Single strong compare-and-swap on the write cursor.
    ///
    /// Returns the observed position on failure. Never spins.
    #[inline]
    pub fn try_reserve(&self, current: usize, new: usize) -> Result<usize, usize> {
        self.write.compare_exchange(current, new, AcqRel, Acquire)
    }

    /// Loads the read cursor, then the write cursor, and computes the used length.
    ///
    /// Read is loaded first: it never passes a write position that already
    /// existed, so the later write load is never behind it.
    pub fn snapshot(&self) -> CursorSnapshot {
        let read = self.load_read();
        let write = self.load_write();
        CursorSnapshot {
            read,
            write,
            used: self.used_between(read, write),
        }
    }

    #[inline]
    pub fn used_between(&self, read: usize, write: usize) -> usize {
        if write >= read {
            write - read
        } else {
            self.position_limit - read + write
        }
    }

    /// The position `len` slots after `position`.
    #[inline]
    pub fn advance(&self, position: usize, len: usize) -> usize {
        let room = self.position_limit - position;
        if len >= room {
            len - room
        } else {
            position + len
        }
    }

    #[inline]
    pub fn free_between(&self, read: usize, write: usize) -> usize {
        self.capacity().saturating_sub(self.used_between(read, write))
    }

    /// Storage slot of a running position.
    #[inline]
    pub fn slot(&self, position: usize) -> usize {
        position % self.queue_len
    }

    /// Splits `len` slots starting at `position` into at most two in-bounds ranges.
    ///
    /// The second range is empty unless the region wraps past the end.
    pub fn split(&self, position: usize, len: usize) -> (Range<usize>, Range<usize>) {
        debug_assert!(len <= self.queue_len);
        let start = self.slot(position);
        let tail_room = self.queue_len - start;
        if len <= tail_room {
            (start..start + len, 0..0)
        } else {
            (start..self.queue_len, 0..len - tail_room)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn used_and_free_lengths() {
        let c = RingCursors::new(10);
        assert_eq!(c.queue_len(), 11);
        assert_eq!(c.used_between(0, 0), 0);
        assert_eq!(c.used_between(2, 7), 5);
        assert_eq!(c.free_between(2, 7), 5);
        assert_eq!(c.used_between(20, 30), 10);
        assert_eq!(c.free_between(20, 30), 0);
    }

    #[test]
    fn slots_and_split() {
        let c = RingCursors::new(10);
        assert_eq!(c.slot(13), 2);
        assert_eq!(c.slot(22), 0);
        assert_eq!(c.split(3, 4), (3..7, 0..0));
        assert_eq!(c.split(8, 5), (8..11, 0..2));
        assert_eq!(c.split(19, 5), (8..11, 0..2));
        assert_eq!(c.split(0, 11), (0..11, 0..0));
    }

    #[test]
    fn reservation_is_single_shot() {
        let c = RingCursors::new(16);
        assert_eq!(c.try_reserve(0, 4), Ok(0));
        assert_eq!(c.try_reserve(0, 8), Err(4));
        assert_eq!(c.load_write(), 4);
        c.store_read(4);
        let snap = c.snapshot();
        assert_eq!(
            snap,
            CursorSnapshot {
                read: 4,
                write: 4,
                used: 0
            }
        );
    }

    #[test]
    fn positions_wrap_on_a_slot_boundary() {
        let c = RingCursors::new(10);
        let limit = c.position_limit();
        assert_eq!(limit % c.queue_len(), 0);

        let near_end = limit - 3;
        let past_end = c.advance(near_end, 5);
        assert_eq!(past_end, 2);
        assert_eq!(c.slot(past_end), (c.slot(near_end) + 5) % c.queue_len());
        assert_eq!(c.used_between(near_end, past_end), 5);
        assert_eq!(c.free_between(near_end, past_end), 5);
        assert_eq!(c.split(near_end, 5), c.split(c.slot(near_end), 5));

        c.store_write(near_end);
        assert_eq!(c.try_reserve(near_end, past_end), Ok(near_end));
        assert_eq!(c.load_write(), 2);
    }

    #[test]
    fn stale_position_loses_after_full_lap() {
        let c = RingCursors::new(4);
        let stale = c.load_write();
        // Same slot as `stale`, one lap later.
        c.store_write(stale + c.queue_len());
        assert_eq!(c.slot(c.load_write()), c.slot(stale));
        assert!(c.try_reserve(stale, stale + 1).is_err());
    }
}
