// Module naming follows project convention
// (MPSC = Multi-Producer Single-Consumer, SPSC = Single-Producer Single-Consumer)
#[allow(non_snake_case)]
pub mod MPSC;
#[allow(non_snake_case)]
pub mod SPSC;
#[allow(non_snake_case)]
pub mod Core;
#[allow(non_snake_case)]
pub mod Debug;

pub use Core::error::{ConfigError, FormatError, QueueError};
pub use MPSC::Buffer::FramedRing;
pub use MPSC::Structs::{Block, FrameConfig};
pub use MPSC::{Consumer, Producer, RingBuilder};
pub use SPSC::{ByteReader, ByteRing, ByteWriter};
