//! # Photos and Buffers
//!
//! Decoded pixel buffers, the float working frame the pipeline renders into,
//! captured photos and the capture session that owns them.

pub mod buffer;
pub mod frame;
pub mod loader;
pub mod session;
pub mod types;

pub use buffer::{PixelBuffer, PixelLayout};
pub use frame::Frame;
pub use session::{CaptureSession, SessionSettings, StampStyle};
pub use types::{CaptureMode, CapturedPhoto};
