//! Four border mapping over a wrap-around cursor
//!
//! Same traversal as the fixed offset pass, but the write position
//! survives between frames and wraps modulo the strip length, turning
//! the strip into a ring buffer of border pixels.

use super::Mapper;
use crate::LedStrip;
use crate::border::BorderSet;

/// Maps all four borders behind a persistent wrapping cursor.
///
/// Traversal order is bottom first pixel, left top-to-bottom, top
/// left-to-right, right top-to-bottom, bottom last pixel. The cursor
/// starts at LED 0 on the first pass and carries over between passes.
/// Untouched LEDs are not blanked. Each pass is committed with one
/// explicit flush.
#[derive(Debug, Clone, Default)]
pub struct RingMapper {
    cursor: usize,
}

impl RingMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write position for the next pixel, always below the strip length
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl Mapper for RingMapper {
    const EXPLICIT_FLUSH: bool = true;

    fn apply<S: LedStrip>(&mut self, borders: &BorderSet, strip: &mut S) {
        let len = strip.len();
        if len == 0 {
            return;
        }
        self.cursor %= len;

        let first = borders.bottom.first().copied();
        let last = borders.bottom.last().copied();

        let pass = first
            .iter()
            .chain(&borders.left)
            .chain(&borders.top)
            .chain(&borders.right)
            .chain(last.iter());

        for pixel in pass {
            strip.set(self.cursor, *pixel);
            self.cursor = (self.cursor + 1) % len;
        }
    }
}
