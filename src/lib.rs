pub mod border;
pub mod capture;
pub mod color;
pub mod filter;
pub mod frame;
pub mod mapper;
pub mod sampler;
pub mod strip;

pub use filter::{BrightnessFilter, FilterChain};
pub use sampler::{Sampler, SamplerConfig, SamplerError, StopHandle, remaining_sleep};
pub use mapper::{MapperId, MapperSlot};
pub use border::BorderSet;
pub use capture::{CaptureError, CaptureSource};
pub use frame::Frame;
pub use strip::{MemoryStrip, NullStrip, SmartLedsStrip, StripError, StripGuard, TermStrip};

pub use color::{Bgr, Hsv, Rgb};

/// Errors raised while validating startup configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("resized frame dimensions must be at least 1x1, got {width}x{height}")]
    Dimensions { width: u32, height: u32 },
    #[error("brightness threshold must be a percentage within 0-100, got {0}")]
    Threshold(f32),
    #[error("led strip must have at least one led")]
    EmptyStrip,
}

/// Abstract LED strip trait
///
/// Implement this trait to support different strip backends.
/// The sampling loop is generic over this trait.
pub trait LedStrip {
    /// Number of addressable LEDs
    fn len(&self) -> usize;

    /// Check if the strip has no LEDs
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Buffer one color at an LED index below `len`
    fn set(&mut self, index: usize, color: Rgb);

    /// Commit buffered colors to the backend
    fn flush(&mut self) -> Result<(), StripError>;
}
