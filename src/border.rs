//! Border extraction from a resized frame.

use crate::color::Rgb;
use crate::frame::Frame;

/// The four border pixel sequences of one frame, in RGB order.
///
/// `top` and `bottom` run left-to-right and span the full frame width.
/// `left` and `right` run top-to-bottom and skip the corner rows, so
/// their length is the frame height minus two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorderSet {
    pub top: Vec<Rgb>,
    pub bottom: Vec<Rgb>,
    pub left: Vec<Rgb>,
    pub right: Vec<Rgb>,
}

impl BorderSet {
    /// Extract the four borders of a frame, converting every pixel from
    /// native order to RGB.
    ///
    /// Frames with a height of one collapse to four copies of the single
    /// row. Frames must have at least one row and one column.
    pub fn extract(frame: &Frame) -> Self {
        let width = frame.width();
        let height = frame.height();
        debug_assert!(width >= 1 && height >= 1, "zero-extent frame");

        let row = |y: u32| -> Vec<Rgb> { (0..width).map(|x| frame.pixel(x, y).to_rgb()).collect() };

        if height <= 1 {
            let top = row(0);
            return Self {
                bottom: top.clone(),
                left: top.clone(),
                right: top.clone(),
                top,
            };
        }

        let sides = height as usize - 2;
        let mut left = Vec::with_capacity(sides);
        let mut right = Vec::with_capacity(sides);
        for y in 1..height - 1 {
            left.push(frame.pixel(0, y).to_rgb());
            right.push(frame.pixel(width - 1, y).to_rgb());
        }

        Self {
            top: row(0),
            bottom: row(height - 1),
            left,
            right,
        }
    }
}
