//! Owned pixel grid in the capture device's native byte order.

use image::{ImageBuffer, imageops};

use crate::color::Bgr;

/// Bytes per pixel in the packed layout.
const PIXEL_STRIDE: usize = 3;

/// One captured frame, packed native-order bytes in row-major order.
#[derive(Debug, Clone)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    /// Wrap a packed native-order byte buffer.
    ///
    /// # Panics
    /// Panics when the buffer length does not match `width * height * 3`.
    pub fn from_bgr(width: u32, height: u32, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            width as usize * height as usize * PIXEL_STRIDE,
            "pixel buffer does not match frame dimensions"
        );
        Self {
            width,
            height,
            data,
        }
    }

    /// Build a frame filled with a single native-order pixel.
    pub fn filled(width: u32, height: u32, pixel: Bgr) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * PIXEL_STRIDE);
        for _ in 0..width as usize * height as usize {
            data.extend_from_slice(&[pixel.b, pixel.g, pixel.r]);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Native-order pixel at the given coordinates.
    ///
    /// # Panics
    /// Panics when the coordinates fall outside the grid.
    pub fn pixel(&self, x: u32, y: u32) -> Bgr {
        assert!(
            x < self.width && y < self.height,
            "pixel coordinates out of bounds"
        );
        let offset = (y as usize * self.width as usize + x as usize) * PIXEL_STRIDE;
        Bgr {
            b: self.data[offset],
            g: self.data[offset + 1],
            r: self.data[offset + 2],
        }
    }

    /// Resample to the target working resolution with bilinear filtering.
    pub fn resize(self, width: u32, height: u32) -> Frame {
        if width == self.width && height == self.height {
            return self;
        }

        // Resampling is per-channel, so the native bytes ride through an
        // RGB-labeled buffer unchanged.
        let buffer: ImageBuffer<image::Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_raw(self.width, self.height, self.data)
                .expect("frame buffer matches its dimensions");
        let resized = imageops::resize(&buffer, width, height, imageops::FilterType::Triangle);

        Frame {
            width,
            height,
            data: resized.into_raw(),
        }
    }
}
