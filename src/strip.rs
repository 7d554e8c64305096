//! LED strip backends and the blanking guard.

use std::fmt;
use std::io::{self, Write};

use smart_leds::SmartLedsWrite;
use tracing::{debug, warn};

use crate::LedStrip;
use crate::color::Rgb;

const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

/// Strip-level failures surfaced by `flush`.
#[derive(Debug, thiserror::Error)]
pub enum StripError {
    #[error("terminal write failed: {0}")]
    Io(#[from] io::Error),
    #[error("led driver write failed: {0}")]
    Driver(String),
}

/// In-memory strip for tests and headless runs.
#[derive(Debug, Clone)]
pub struct MemoryStrip {
    colors: Vec<Rgb>,
    flushes: usize,
}

impl MemoryStrip {
    pub fn new(len: usize) -> Self {
        Self {
            colors: vec![BLACK; len],
            flushes: 0,
        }
    }

    /// Colors as last written, committed or not
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Number of `flush` calls seen so far
    pub fn flush_count(&self) -> usize {
        self.flushes
    }
}

impl LedStrip for MemoryStrip {
    fn len(&self) -> usize {
        self.colors.len()
    }

    fn set(&mut self, index: usize, color: Rgb) {
        self.colors[index] = color;
    }

    fn flush(&mut self) -> Result<(), StripError> {
        self.flushes += 1;
        Ok(())
    }
}

/// Discards every write; useful to measure loop throughput.
#[derive(Debug, Clone)]
pub struct NullStrip {
    len: usize,
}

impl NullStrip {
    pub fn new(len: usize) -> Self {
        Self { len }
    }
}

impl LedStrip for NullStrip {
    fn len(&self) -> usize {
        self.len
    }

    fn set(&mut self, _index: usize, _color: Rgb) {}

    fn flush(&mut self) -> Result<(), StripError> {
        Ok(())
    }
}

/// ANSI truecolor strip preview on standard output.
///
/// Redraws the whole strip as one line of colored cells, in place.
/// With `auto_write` every `set` redraws immediately, mirroring strips
/// that commit on write; otherwise the strip redraws on `flush`.
#[derive(Debug, Clone)]
pub struct TermStrip {
    colors: Vec<Rgb>,
    auto_write: bool,
}

impl TermStrip {
    /// Create a preview strip that redraws on every write
    pub fn new(len: usize) -> Self {
        Self {
            colors: vec![BLACK; len],
            auto_write: true,
        }
    }

    /// Toggle redraw-per-write off so the strip only redraws on `flush`
    pub fn with_auto_write(mut self, auto_write: bool) -> Self {
        self.auto_write = auto_write;
        self
    }

    fn render(&self) -> io::Result<()> {
        let mut out = io::stdout().lock();
        write!(out, "\r")?;
        for color in &self.colors {
            write!(out, "\x1b[48;2;{};{};{}m ", color.r, color.g, color.b)?;
        }
        write!(out, "\x1b[0m")?;
        out.flush()
    }
}

impl LedStrip for TermStrip {
    fn len(&self) -> usize {
        self.colors.len()
    }

    fn set(&mut self, index: usize, color: Rgb) {
        self.colors[index] = color;
        if self.auto_write {
            if let Err(err) = self.render() {
                debug!("terminal redraw failed: {err}");
            }
        }
    }

    fn flush(&mut self) -> Result<(), StripError> {
        self.render()?;
        Ok(())
    }
}

/// Adapter driving any `smart_leds` writer through the strip interface.
///
/// Writes are buffered and pushed to the driver on `flush`; pair it
/// with a mapping strategy that flushes.
pub struct SmartLedsStrip<D> {
    driver: D,
    colors: Vec<Rgb>,
}

impl<D> SmartLedsStrip<D>
where
    D: SmartLedsWrite<Color = Rgb>,
    D::Error: fmt::Debug,
{
    pub fn new(driver: D, len: usize) -> Self {
        Self {
            driver,
            colors: vec![BLACK; len],
        }
    }

    /// Hand the driver back, dropping the buffered colors
    pub fn into_driver(self) -> D {
        self.driver
    }
}

impl<D> LedStrip for SmartLedsStrip<D>
where
    D: SmartLedsWrite<Color = Rgb>,
    D::Error: fmt::Debug,
{
    fn len(&self) -> usize {
        self.colors.len()
    }

    fn set(&mut self, index: usize, color: Rgb) {
        self.colors[index] = color;
    }

    fn flush(&mut self) -> Result<(), StripError> {
        self.driver
            .write(self.colors.iter().copied())
            .map_err(|err| StripError::Driver(format!("{err:?}")))
    }
}

/// Blanks the wrapped strip when dropped.
///
/// Covers normal completion, errors and unwinding. An uncaught kill
/// signal still leaves the last frame lit.
pub struct StripGuard<S: LedStrip> {
    strip: S,
}

impl<S: LedStrip> StripGuard<S> {
    pub fn new(strip: S) -> Self {
        Self { strip }
    }
}

impl<S: LedStrip> LedStrip for StripGuard<S> {
    fn len(&self) -> usize {
        self.strip.len()
    }

    fn set(&mut self, index: usize, color: Rgb) {
        self.strip.set(index, color);
    }

    fn flush(&mut self) -> Result<(), StripError> {
        self.strip.flush()
    }
}

impl<S: LedStrip> Drop for StripGuard<S> {
    fn drop(&mut self) {
        for i in 0..self.strip.len() {
            self.strip.set(i, BLACK);
        }
        if let Err(err) = self.strip.flush() {
            warn!("failed to blank led strip: {err}");
        }
    }
}
