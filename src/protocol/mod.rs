pub mod framing;

pub use framing::FrameAccumulator;
