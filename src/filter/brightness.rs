//! Dark pixel suppression with a hue-aware threshold.
//!
//! Pixels whose Value channel falls below the configured threshold are
//! turned off entirely. Survivors keep their hue and value, with a
//! raised saturation floor so washed-out colors still tint the strip.

use super::Filter;
use crate::ConfigError;
use crate::color::{Hsv, Rgb, hsv2rgb, rgb2hsv};

/// Inclusive hue band treated as green, in half-degree units.
const GREEN_MIN_HUE: u8 = 75 / 2;
const GREEN_MAX_HUE: u8 = 135 / 2;

/// Lowest saturation kept after filtering, half of full scale.
const MIN_SATURATION: u8 = 128;

/// Per-pixel brightness filter over RGB border sequences.
///
/// The threshold is configured as a percentage and held on the 0-255
/// Value scale. Green hues are held to half the threshold.
#[derive(Debug, Clone)]
pub struct BrightnessFilter {
    /// Minimal Value for a pixel to stay lit, on the 0-255 scale.
    threshold: f32,
}

impl BrightnessFilter {
    /// Create a filter from a threshold percentage
    ///
    /// # Arguments
    /// * `threshold_pct` - percentage of full brightness within 0-100
    pub fn new(threshold_pct: f32) -> Result<Self, ConfigError> {
        if !(0.0..=100.0).contains(&threshold_pct) {
            return Err(ConfigError::Threshold(threshold_pct));
        }
        Ok(Self {
            threshold: (threshold_pct / 100.0) * 255.0,
        })
    }

    fn is_green(hue: u8) -> bool {
        (GREEN_MIN_HUE..=GREEN_MAX_HUE).contains(&hue)
    }

    /// Filter a single pixel
    pub fn filter_pixel(&self, pixel: Rgb) -> Rgb {
        let hsv = rgb2hsv(pixel);

        let mut threshold = self.threshold;
        if Self::is_green(hsv.hue) {
            threshold /= 2.0;
        }

        if f32::from(hsv.val) < threshold {
            return Rgb { r: 0, g: 0, b: 0 };
        }

        hsv2rgb(Hsv {
            sat: hsv.sat.max(MIN_SATURATION),
            ..hsv
        })
    }
}

impl Filter for BrightnessFilter {
    fn apply(&mut self, border: &mut [Rgb]) {
        for pixel in border {
            *pixel = self.filter_pixel(*pixel);
        }
    }
}
