use std::fmt;
use crate::MPSC::Buffer::FramedRing;
use crate::MPSC::{Consumer, Producer};
use crate::SPSC::{ByteReader, ByteRing, ByteWriter};

/// Debug function for FramedRing
///
/// Shows the framing parameters and a cursor snapshot. Storage bytes are
/// never dumped.
pub fn debug_framed_ring(ring: &FramedRing, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let snap = ring.cursors.snapshot();
    f.debug_struct("FramedRing")
        .field("capacity", &ring.capacity())
        .field("frame_size", &ring.frame_size())
        .field("max_payload", &ring.config().max_payload())
        .field("ready_wait", &ring.ready_wait().limit())
        .field("read", &snap.read)
        .field("write", &snap.write)
        .field("used", &snap.used)
        .finish()
}

/// Debug function for ByteRing
pub fn debug_byte_ring(ring: &ByteRing, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ByteRing")
        .field("capacity", &ring.capacity())
        .field("len", &ring.len())
        .finish()
}

impl fmt::Debug for FramedRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_framed_ring(self, f)
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("max_message_size", &self.max_message_size())
            .field("ring", self.ring())
            .finish()
    }
}

impl fmt::Debug for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("producers_alive", &self.producers_alive())
            .field("ring", self.ring())
            .finish()
    }
}

impl fmt::Debug for ByteRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_byte_ring(self, f)
    }
}

impl fmt::Debug for ByteWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteWriter")
            .field("capacity", &self.capacity())
            .field("free_len", &self.free_len())
            .finish()
    }
}

impl fmt::Debug for ByteReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteReader")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
