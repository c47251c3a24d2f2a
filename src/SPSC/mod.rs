pub mod Ring;

pub use Ring::{ByteReader, ByteRing, ByteWriter}; // re-export for stable path
