//! Direct top border mapping
//!
//! LED `i` mirrors top border pixel `i`. Trailing LEDs with no
//! matching pixel are blanked every pass.

use super::Mapper;
use crate::LedStrip;
use crate::border::BorderSet;
use crate::color::Rgb;

const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

/// Maps the top border one-to-one onto the start of the strip.
///
/// The lit range is bounded by the shorter of border and strip.
/// No flush is issued; the strip is assumed to commit on write.
#[derive(Debug, Clone, Default)]
pub struct TopMapper;

impl TopMapper {
    pub fn new() -> Self {
        Self
    }
}

impl Mapper for TopMapper {
    fn apply<S: LedStrip>(&mut self, borders: &BorderSet, strip: &mut S) {
        let lit = borders.top.len().min(strip.len());

        for (i, pixel) in borders.top.iter().take(lit).enumerate() {
            strip.set(i, *pixel);
        }
        for i in lit..strip.len() {
            strip.set(i, BLACK);
        }
    }
}
