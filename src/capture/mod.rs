//! Video capture sources.
//!
//! A capture source hands the sampling loop native-order frames until
//! the signal ends. Opening is retriable; the loop blocks on it before
//! the first tick.

use std::io;
use std::path::PathBuf;

use crate::frame::Frame;

#[cfg(target_os = "linux")]
mod v4l2;
#[cfg(target_os = "linux")]
pub use v4l2::V4l2Source;

/// Failures while opening or negotiating a capture device.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to open capture device {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("failed to negotiate a pixel format on {}: {source}", .path.display())]
    Negotiate { path: PathBuf, source: io::Error },
    #[error("capture device {} offers no supported pixel format", .path.display())]
    UnsupportedFormat { path: PathBuf },
}

/// A source of native-order video frames.
pub trait CaptureSource {
    /// Check if the source is ready to read
    fn is_open(&self) -> bool;

    /// Open the source; retriable until `is_open` reports true
    fn open(&mut self) -> Result<(), CaptureError>;

    /// Block for the next frame; `None` means the signal ended
    fn read(&mut self) -> Option<Frame>;
}
