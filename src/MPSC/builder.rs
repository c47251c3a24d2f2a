use std::sync::Arc;
use std::time::Duration;

use super::{Consumer, Producer};
use crate::Core::error::ConfigError;
use crate::Core::wait::{ReadyWait, DEFAULT_READY_WAIT};
use crate::MPSC::Buffer::layout::DEFAULT_MAX_PAYLOAD;
use crate::MPSC::Buffer::FramedRing;
use crate::MPSC::Structs::Block_Structs::FrameConfig;

pub struct RingBuilder {
    capacity: usize,
    max_payload: usize,
    ready_wait: Duration,
}

impl Default for RingBuilder {
    fn default() -> Self {
        Self {
            capacity: 1000, // bytes
            max_payload: DEFAULT_MAX_PAYLOAD,
            ready_wait: DEFAULT_READY_WAIT,
        }
    }
}

impl RingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Usable bytes of ring storage.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Payload bytes per frame; the frame adds a 7-byte header.
    pub fn with_max_payload(mut self, max_payload: usize) -> Self {
        self.max_payload = max_payload;
        self
    }

    /// Upper bound on the consumer's wait for a half-written message.
    pub fn with_ready_wait(mut self, ready_wait: Duration) -> Self {
        self.ready_wait = ready_wait;
        self
    }

    pub fn build_ring(self) -> Result<FramedRing, ConfigError> {
        let config = FrameConfig::new(self.max_payload)?;
        FramedRing::with_ready_wait(self.capacity, config, ReadyWait::new(self.ready_wait))
    }

    /// Builds the ring and returns its producer and its only consumer.
    pub fn build(self) -> std::io::Result<(Producer, Consumer)> {
        let ring = Arc::new(self.build_ring()?);
        Ok((Producer::new(Arc::clone(&ring)), Consumer::new(ring)))
    }
}
