pub mod cursor;
pub mod error;
pub mod wait;

pub use cursor::{CursorSnapshot, RingCursors};
pub use error::{ConfigError, FormatError, QueueError};
pub use wait::{ReadyWait, DEFAULT_READY_WAIT};
