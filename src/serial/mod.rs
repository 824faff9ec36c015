pub mod reader;
pub mod traits;

pub use reader::{ReadResult, SerialCommandReader};
#[cfg(feature = "embedded")]
pub use traits::IoPort;
pub use traits::{SerialError, SerialPort};
