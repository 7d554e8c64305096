use crate::border::BorderSet;
use crate::color::Rgb;

mod brightness;

pub use brightness::BrightnessFilter;

pub(crate) trait Filter {
    /// Apply the filter to one border sequence in place
    fn apply(&mut self, border: &mut [Rgb]);
}

/// Filter chain - applies post-processing to extracted borders
///
/// The chain is fixed at startup and runs in a specific order.
/// An empty chain passes borders through unchanged.
#[derive(Debug, Default)]
pub struct FilterChain {
    /// Brightness filter
    brightness: Option<BrightnessFilter>,
}

impl FilterChain {
    /// Create an empty chain that leaves borders untouched
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a chain with the brightness filter enabled
    pub fn with_brightness(filter: BrightnessFilter) -> Self {
        Self {
            brightness: Some(filter),
        }
    }

    /// Run every configured filter over the four borders
    pub fn apply(&mut self, borders: &mut BorderSet) {
        if let Some(brightness) = &mut self.brightness {
            brightness.apply(&mut borders.top);
            brightness.apply(&mut borders.bottom);
            brightness.apply(&mut borders.left);
            brightness.apply(&mut borders.right);
        }
    }
}
