//! V4L2 capture source.
//!
//! Negotiates one of the pixel formats the pipeline can normalize and
//! converts every frame to packed native-order bytes at the device
//! resolution.

use std::path::PathBuf;

use image::ImageFormat;
use tracing::{debug, warn};
use v4l::buffer::Type;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, FourCC};

use super::{CaptureError, CaptureSource};
use crate::frame::Frame;

/// Formats the source can normalize, in preference order.
const PREFERRED_LAYOUTS: [PixelLayout; 4] = [
    PixelLayout::Bgr,
    PixelLayout::Rgb,
    PixelLayout::Mjpeg,
    PixelLayout::Yuyv,
];

/// Driver-side buffers to map for streaming.
const BUFFER_COUNT: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PixelLayout {
    Bgr,
    Rgb,
    Mjpeg,
    Yuyv,
}

impl PixelLayout {
    fn fourcc(self) -> FourCC {
        match self {
            Self::Bgr => FourCC::new(b"BGR3"),
            Self::Rgb => FourCC::new(b"RGB3"),
            Self::Mjpeg => FourCC::new(b"MJPG"),
            Self::Yuyv => FourCC::new(b"YUYV"),
        }
    }
}

struct OpenState {
    stream: MmapStream<'static>,
    layout: PixelLayout,
    width: u32,
    height: u32,
    stride: usize,
}

/// Capture source over a V4L2 device node.
///
/// The device resolution is kept as-is; resizing happens downstream.
pub struct V4l2Source {
    path: PathBuf,
    state: Option<OpenState>,
}

impl V4l2Source {
    /// Create a source for a device node; the device is opened later
    ///
    /// # Arguments
    /// * `path` - device node such as `/dev/video0`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: None,
        }
    }

    fn negotiate(&self) -> Result<OpenState, CaptureError> {
        let device = Device::with_path(&self.path).map_err(|source| CaptureError::Open {
            path: self.path.clone(),
            source,
        })?;

        for layout in PREFERRED_LAYOUTS {
            let mut wanted = device.format().map_err(|source| CaptureError::Negotiate {
                path: self.path.clone(),
                source,
            })?;
            wanted.fourcc = layout.fourcc();

            let applied = device
                .set_format(&wanted)
                .map_err(|source| CaptureError::Negotiate {
                    path: self.path.clone(),
                    source,
                })?;
            if applied.fourcc != layout.fourcc() {
                continue;
            }

            debug!(
                "negotiated {}x{} {} on {}",
                applied.width,
                applied.height,
                applied.fourcc,
                self.path.display()
            );

            let stream = MmapStream::with_buffers(&device, Type::VideoCapture, BUFFER_COUNT)
                .map_err(|source| CaptureError::Open {
                    path: self.path.clone(),
                    source,
                })?;

            return Ok(OpenState {
                stream,
                layout,
                width: applied.width,
                height: applied.height,
                stride: applied.stride as usize,
            });
        }

        Err(CaptureError::UnsupportedFormat {
            path: self.path.clone(),
        })
    }
}

impl CaptureSource for V4l2Source {
    fn is_open(&self) -> bool {
        self.state.is_some()
    }

    fn open(&mut self) -> Result<(), CaptureError> {
        if self.state.is_none() {
            self.state = Some(self.negotiate()?);
        }
        Ok(())
    }

    fn read(&mut self) -> Option<Frame> {
        let state = self.state.as_mut()?;
        let (layout, width, height, stride) =
            (state.layout, state.width, state.height, state.stride);

        let (data, meta) = match state.stream.next() {
            Ok(buffer) => buffer,
            Err(err) => {
                warn!("video capture read failed: {err}");
                return None;
            }
        };

        match layout {
            PixelLayout::Bgr => copy_packed(data, width, height, stride, false),
            PixelLayout::Rgb => copy_packed(data, width, height, stride, true),
            PixelLayout::Mjpeg => {
                let used = (meta.bytesused as usize).min(data.len());
                decode_mjpeg(&data[..used])
            }
            PixelLayout::Yuyv => convert_yuyv(data, width, height, stride),
        }
    }
}

/// Copy a packed 24-bit frame row by row, honoring the device stride.
fn copy_packed(data: &[u8], width: u32, height: u32, stride: usize, swap: bool) -> Option<Frame> {
    let w = width as usize;
    let h = height as usize;
    let row_bytes = w * 3;
    let stride = if stride == 0 { row_bytes } else { stride };

    if stride < row_bytes || data.len() < stride * h {
        warn!("short capture buffer: {} bytes", data.len());
        return None;
    }

    let mut out = Vec::with_capacity(row_bytes * h);
    for y in 0..h {
        out.extend_from_slice(&data[y * stride..y * stride + row_bytes]);
    }
    if swap {
        for pixel in out.chunks_exact_mut(3) {
            pixel.swap(0, 2);
        }
    }

    Some(Frame::from_bgr(width, height, out))
}

/// Decode one MJPEG frame; dimensions come from the JPEG header.
fn decode_mjpeg(data: &[u8]) -> Option<Frame> {
    let decoded = match image::load_from_memory_with_format(data, ImageFormat::Jpeg) {
        Ok(decoded) => decoded.into_rgb8(),
        Err(err) => {
            warn!("failed to decode mjpeg frame: {err}");
            return None;
        }
    };

    let (width, height) = decoded.dimensions();
    let mut out = decoded.into_raw();
    for pixel in out.chunks_exact_mut(3) {
        pixel.swap(0, 2);
    }

    Some(Frame::from_bgr(width, height, out))
}

/// Expand a YUYV frame to packed 24-bit, honoring the device stride.
///
/// Odd widths leave a trailing luma sample without a chroma pair; it
/// is expanded with neutral chroma.
fn convert_yuyv(data: &[u8], width: u32, height: u32, stride: usize) -> Option<Frame> {
    let w = width as usize;
    let h = height as usize;
    let row_bytes = w * 2;
    let stride = if stride == 0 { row_bytes } else { stride };

    if stride < row_bytes || data.len() < stride * h {
        warn!("short capture buffer: {} bytes", data.len());
        return None;
    }

    let mut out = Vec::with_capacity(w * h * 3);
    for y in 0..h {
        let row = &data[y * stride..y * stride + row_bytes];
        for chunk in row.chunks_exact(4) {
            out.extend_from_slice(&yuv_to_bgr(chunk[0], chunk[1], chunk[3]));
            out.extend_from_slice(&yuv_to_bgr(chunk[2], chunk[1], chunk[3]));
        }
        if !w.is_multiple_of(2) {
            let tail = &row[row_bytes - 2..];
            out.extend_from_slice(&yuv_to_bgr(tail[0], tail[1], 128));
        }
    }

    Some(Frame::from_bgr(width, height, out))
}

/// ITU-R BT.601 studio-swing conversion of one YUV sample.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn yuv_to_bgr(y: u8, u: u8, v: u8) -> [u8; 3] {
    let c = i32::from(y) - 16;
    let d = i32::from(u) - 128;
    let e = i32::from(v) - 128;

    let r = (298 * c + 409 * e + 128) >> 8;
    let g = (298 * c - 100 * d - 208 * e + 128) >> 8;
    let b = (298 * c + 516 * d + 128) >> 8;

    [
        b.clamp(0, 255) as u8,
        g.clamp(0, 255) as u8,
        r.clamp(0, 255) as u8,
    ]
}
