#[cfg(feature = "embedded")]
pub mod driver;
pub mod traits;

#[cfg(feature = "embedded")]
pub use driver::{Sx126xDriver, Sx126xPins};
pub use traits::{LoraError, LoraRadio};
