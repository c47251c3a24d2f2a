// src/MPSC/consumer.rs

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::Core::error::QueueError;
use crate::MPSC::Buffer::FramedRing;

/// The single consumer of a framed ring.
///
/// There is exactly one per ring and it cannot be cloned; receiving takes
/// `&mut self`, so reconstruction never runs on two threads at once.
pub struct Consumer {
    pub(crate) ring: Arc<FramedRing>,
}

impl Consumer {
    pub(crate) fn new(ring: Arc<FramedRing>) -> Self {
        Self { ring }
    }

    /// Receives every message that is completely written right now.
    ///
    /// # Returns
    /// * `Ok(messages)`, possibly empty if nothing is ready yet
    /// * `Err(io::Error)` with `BrokenPipe` if nothing can be received and
    ///   every producer is gone, or `InvalidData` if the ring holds corrupt frames
    pub fn receive(&mut self) -> io::Result<Vec<Vec<u8>>> {
        let messages = match self.ring.get() {
            Ok(messages) => messages,
            // A producer is still filling the next message, unless none is left.
            Err(QueueError::NotReady { .. }) => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        if messages.is_empty() && !self.producers_alive() {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "All producers have terminated",
            ));
        }
        Ok(messages)
    }

    /// Receives messages, waiting up to `timeout` for at least one.
    ///
    /// # Returns
    /// * `Ok(messages)` with at least one message
    /// * `Ok(vec![])` if the timeout was reached
    /// * `Err(io::Error)` as for [`receive`](Self::receive)
    pub fn receive_timeout(&mut self, timeout: Duration) -> io::Result<Vec<Vec<u8>>> {
        let start = Instant::now();

        loop {
            let messages = self.receive()?;
            if !messages.is_empty() {
                return Ok(messages);
            }

            let remaining = timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                return Ok(Vec::new());
            }
            std::thread::sleep(remaining.min(Duration::from_millis(1)));
        }
    }

    /// Whether any `Producer` handle for this ring still exists.
    pub fn producers_alive(&self) -> bool {
        Arc::strong_count(&self.ring) > 1
    }

    /// Returns the shared ring this consumer drains.
    pub fn ring(&self) -> &FramedRing {
        &self.ring
    }
}
