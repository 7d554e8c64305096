//! Four border mapping at fixed offsets
//!
//! One pass writes the first bottom pixel, the left border, the top
//! border and the right border back to back from LED 0, then the last
//! bottom pixel. LEDs outside that range keep their previous color.

use super::Mapper;
use crate::LedStrip;
use crate::border::BorderSet;

/// Maps all four borders at consecutive fixed offsets.
///
/// Traversal order is bottom first pixel, left top-to-bottom, top
/// left-to-right, right top-to-bottom, bottom last pixel. Writes past
/// the end of the strip are dropped; untouched LEDs are not blanked.
/// No flush is issued; the strip is assumed to commit on write.
#[derive(Debug, Clone, Default)]
pub struct SegmentsMapper;

impl SegmentsMapper {
    pub fn new() -> Self {
        Self
    }
}

impl Mapper for SegmentsMapper {
    fn apply<S: LedStrip>(&mut self, borders: &BorderSet, strip: &mut S) {
        let len = strip.len();
        let first = borders.bottom.first().copied();
        let last = borders.bottom.last().copied();

        let pass = first
            .iter()
            .chain(&borders.left)
            .chain(&borders.top)
            .chain(&borders.right)
            .chain(last.iter());

        for (i, pixel) in pass.enumerate() {
            if i >= len {
                break;
            }
            strip.set(i, *pixel);
        }
    }
}
