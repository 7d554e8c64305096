//! Frame sampling loop and its runtime state.
//!
//! The sampler owns the capture source, the strip and the configured
//! strategies for one run. The loop stays on the calling thread and
//! paces itself with sleeps; cancellation arrives through a shared
//! `StopHandle` and is honored at tick boundaries.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::border::BorderSet;
use crate::capture::CaptureSource;
use crate::filter::FilterChain;
use crate::mapper::MapperSlot;
use crate::strip::StripError;
use crate::{ConfigError, LedStrip};

/// Pause between capture open attempts.
const OPEN_RETRY_PAUSE: Duration = Duration::from_millis(500);

/// Sampling loop configuration.
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// Target framerate in frames per second, 0 runs unpaced.
    pub framerate: u32,
    /// Working frame width after resizing, in pixels.
    pub width: u32,
    /// Working frame height after resizing, in pixels.
    pub height: u32,
    /// Log an instantaneous rate estimate every tick.
    pub show_fps: bool,
    /// Append rate estimates to this file as well.
    pub fps_log: Option<PathBuf>,
}

impl SamplerConfig {
    /// Check the configuration before a run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < 1 || self.height < 1 {
            return Err(ConfigError::Dimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Target interval between ticks, `None` when unpaced
    pub fn frame_delay(&self) -> Option<Duration> {
        if self.framerate == 0 {
            None
        } else {
            Some(Duration::from_secs(1) / self.framerate)
        }
    }
}

/// Errors that end a run or prevent it from starting.
#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to open framerate log {}: {source}", .path.display())]
    FpsLog {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Strip(#[from] StripError),
}

/// Cooperative stop flag shared with cancellation contexts.
///
/// The loop observes the flag at tick boundaries only; a tick already
/// in flight completes before the stop takes effect.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop; takes effect before the next tick
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Instantaneous framerate log, echoed to tracing and an optional file.
struct RateTelemetry {
    last_tick: Option<Instant>,
    log: Option<File>,
}

impl RateTelemetry {
    fn open(path: Option<&PathBuf>) -> Result<Self, SamplerError> {
        let log = match path {
            Some(path) => Some(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|source| SamplerError::FpsLog {
                        path: path.clone(),
                        source,
                    })?,
            ),
            None => None,
        };
        Ok(Self {
            last_tick: None,
            log,
        })
    }

    /// Log the rate estimated from the previous tick; the first tick
    /// has no estimate and zero-length intervals are skipped.
    fn record(&mut self, tick_start: Instant) {
        if let Some(last) = self.last_tick {
            let duration = tick_start - last;
            if duration > Duration::ZERO {
                let seconds = duration.as_secs_f64();
                let message = format!(
                    "Estimate framerate: {}fps /// Last frame duration: {}s",
                    1.0 / seconds,
                    seconds
                );
                info!("{message}");
                if let Some(log) = &mut self.log {
                    if let Err(err) = writeln!(log, "{message}") {
                        warn!("failed to append framerate log: {err}");
                    }
                }
            }
        }
        self.last_tick = Some(tick_start);
    }
}

/// Frame sampling loop: capture, resize, extract, filter, map.
pub struct Sampler<C: CaptureSource, S: LedStrip> {
    config: SamplerConfig,
    capture: C,
    strip: S,
    mapper: MapperSlot,
    filters: FilterChain,
    telemetry: Option<RateTelemetry>,
    stop: StopHandle,
}

impl<C: CaptureSource, S: LedStrip> Sampler<C, S> {
    /// Build a sampler, failing fast on malformed configuration
    ///
    /// # Arguments
    /// * `config` - loop pacing and frame geometry
    /// * `capture` - source of native-order frames
    /// * `strip` - output strip, must have at least one LED
    /// * `mapper` - strategy writing borders onto the strip
    /// * `filters` - chain applied to borders before mapping
    /// * `stop` - shared flag observed at tick boundaries
    pub fn new(
        config: SamplerConfig,
        capture: C,
        strip: S,
        mapper: MapperSlot,
        filters: FilterChain,
        stop: StopHandle,
    ) -> Result<Self, SamplerError> {
        config.validate()?;
        if strip.is_empty() {
            return Err(ConfigError::EmptyStrip.into());
        }

        let telemetry = if config.show_fps {
            Some(RateTelemetry::open(config.fps_log.as_ref())?)
        } else {
            None
        };

        Ok(Self {
            config,
            capture,
            strip,
            mapper,
            filters,
            telemetry,
            stop,
        })
    }

    /// Block until the capture source opens, retrying forever.
    ///
    /// Returns false when a stop request arrives first.
    fn await_capture(&mut self) -> bool {
        info!("Opening video capture stream...");
        let mut tries: u64 = 0;

        while !self.capture.is_open() {
            if self.stop.is_stopped() {
                return false;
            }
            tries += 1;
            if tries > 1 {
                info!("Opening video capture stream... Try {tries}");
            }
            if let Err(err) = self.capture.open() {
                debug!("capture open failed: {err}");
                thread::sleep(OPEN_RETRY_PAUSE);
            }
        }

        info!("Video capture stream open.");
        true
    }

    /// Run the sampling loop until the stream ends or a stop request
    /// arrives. Consumes the sampler; a stopped loop is never resumed.
    pub fn run(mut self) -> Result<(), SamplerError> {
        if !self.await_capture() {
            info!("Stop requested before the capture stream opened.");
            return Ok(());
        }

        let frame_delay = self.config.frame_delay();

        while !self.stop.is_stopped() {
            let tick_start = Instant::now();

            if let Some(telemetry) = &mut self.telemetry {
                telemetry.record(tick_start);
            }

            let Some(frame) = self.capture.read() else {
                info!("No signal from video stream, stop sampling.");
                break;
            };

            let resized = frame.resize(self.config.width, self.config.height);
            let mut borders = BorderSet::extract(&resized);
            trace!(
                top = borders.top.len(),
                sides = borders.left.len(),
                "extracted frame borders"
            );

            self.filters.apply(&mut borders);
            self.mapper.apply(&borders, &mut self.strip);
            if self.mapper.flushes_strip() {
                self.strip.flush()?;
            }

            let pause = remaining_sleep(frame_delay, tick_start.elapsed());
            if !pause.is_zero() {
                thread::sleep(pause);
            }
        }

        Ok(())
    }
}

/// Time left until the next tick is due.
///
/// Overruns never accumulate; a late tick only shrinks or removes its
/// own pause.
pub fn remaining_sleep(frame_delay: Option<Duration>, processing: Duration) -> Duration {
    match frame_delay {
        Some(delay) => delay.saturating_sub(processing),
        None => Duration::ZERO,
    }
}
