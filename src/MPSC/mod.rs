mod builder;
mod consumer;
mod producer;

pub use builder::RingBuilder;
pub use consumer::Consumer;
pub use producer::Producer;

pub mod Buffer {
    pub mod Buffer;
    pub mod Buffer_impl;
    pub mod layout;
    pub use Buffer::FramedRing; // re-export for stable path
}

pub mod Structs {
    pub mod Block_Structs;
    pub use Block_Structs::{Block, FrameConfig}; // re-export for stable path
}
