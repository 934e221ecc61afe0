//! Time subsystem.
//!
//! One `FrameClock` per window; call `tick()` once per presented frame to
//! obtain `FrameTime`. Throughput is summarized periodically in the log.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameStats, FrameTime};
