// In src/MPSC/producer.rs
use crossbeam_utils::Backoff;
use std::io;
use std::sync::Arc;
use tracing::trace;

use crate::Core::error::QueueError;
use crate::MPSC::Buffer::layout::MAX_FRAGMENTS;
use crate::MPSC::Buffer::FramedRing;

/// A producer for sending messages into a framed ring.
///
/// Producers are cheap to clone; every clone writes into the same ring and
/// clones may live on different threads.
#[derive(Clone)]
pub struct Producer {
    pub(crate) ring: Arc<FramedRing>,
    max_message_size: usize,
}

impl Producer {
    pub(crate) fn new(ring: Arc<FramedRing>) -> Self {
        let frames = (ring.capacity() / ring.frame_size()).min(MAX_FRAGMENTS);
        let max_message_size = frames * ring.config().max_payload();
        Self {
            ring,
            max_message_size,
        }
    }

    /// Sends a message, retrying for as long as the only obstacle is
    /// another producer winning the write cursor.
    ///
    /// # Returns
    /// * `Ok(())` once every fragment is in the ring
    /// * `Err(io::Error)` with `InvalidInput` if the message can never fit,
    ///   or `WouldBlock` if the ring is currently too full
    pub fn send<T: AsRef<[u8]>>(&self, message: T) -> io::Result<()> {
        let message = message.as_ref();

        // Check message size before attempting to reserve
        if message.len() > self.max_message_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "Message too large ({} > {})",
                    message.len(),
                    self.max_message_size
                ),
            ));
        }

        let backoff = Backoff::new();
        let mut attempts = 1u32;
        loop {
            match self.ring.save(message) {
                Ok(()) => {
                    trace!(len = message.len(), attempts, "message sent");
                    return Ok(());
                }
                Err(QueueError::Contention) => {
                    // lost the reservation race; back off and retry
                    backoff.spin();
                    attempts += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Makes a single attempt at saving `message`, surfacing contention.
    pub fn try_send<T: AsRef<[u8]>>(&self, message: T) -> Result<(), QueueError> {
        self.ring.save(message.as_ref())
    }

    /// Returns the largest message the ring could hold when empty.
    pub fn max_message_size(&self) -> usize {
        self.max_message_size
    }

    /// Returns the shared ring this producer writes into.
    pub fn ring(&self) -> &FramedRing {
        &self.ring
    }
}
