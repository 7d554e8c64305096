//! Ambient lighting sampler binary.
//!
//! Drives the sampling loop against a V4L2 capture device and renders
//! the mapped borders on a terminal preview strip.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[cfg(target_os = "linux")]
use edgelight::{
    BrightnessFilter, FilterChain, LedStrip, MapperId, NullStrip, Rgb, Sampler, SamplerConfig,
    StopHandle, StripError, StripGuard, TermStrip, capture::V4l2Source,
};

#[derive(Debug, Parser)]
#[command(
    name = "edgelight",
    version,
    about = "Samples screen borders onto an ambient LED strip"
)]
struct Args {
    /// Target framerate in frames per second, 0 runs unpaced
    framerate: u32,
    /// Resized frame width in pixels
    width: u32,
    /// Resized frame height in pixels
    height: u32,
    /// Number of LEDs on the strip
    leds: usize,
    /// V4L2 capture device path
    #[arg(long, default_value = "/dev/video0")]
    device: PathBuf,
    /// Turn off pixels whose Value stays below this percentage
    #[arg(long, value_name = "PCT")]
    threshold: Option<f32>,
    /// Mapping strategy: top, segments or ring
    #[arg(long, default_value = "ring")]
    mapper: String,
    /// Log a framerate estimate every tick
    #[arg(long)]
    show_fps: bool,
    /// Append framerate estimates to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
    /// Discard mapped colors instead of drawing the terminal preview
    #[arg(long)]
    no_output: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let args = Args::parse();

    #[cfg(target_os = "linux")]
    return run(args).await;

    #[cfg(not(target_os = "linux"))]
    {
        let _ = args;
        anyhow::bail!("video capture requires a v4l2 device and a linux build");
    }
}

/// Output selection for the binary, preview or discard.
#[cfg(target_os = "linux")]
enum Output {
    Term(StripGuard<TermStrip>),
    Null(NullStrip),
}

#[cfg(target_os = "linux")]
impl LedStrip for Output {
    fn len(&self) -> usize {
        match self {
            Self::Term(strip) => strip.len(),
            Self::Null(strip) => strip.len(),
        }
    }

    fn set(&mut self, index: usize, color: Rgb) {
        match self {
            Self::Term(strip) => strip.set(index, color),
            Self::Null(strip) => strip.set(index, color),
        }
    }

    fn flush(&mut self) -> Result<(), StripError> {
        match self {
            Self::Term(strip) => strip.flush(),
            Self::Null(strip) => strip.flush(),
        }
    }
}

#[cfg(target_os = "linux")]
async fn run(args: Args) -> Result<()> {
    let Args {
        framerate,
        width,
        height,
        leds,
        device,
        threshold,
        mapper,
        show_fps,
        log_file,
        no_output,
    } = args;

    let mapper = MapperId::parse_from_str(&mapper)
        .with_context(|| format!("unknown mapper strategy {mapper:?}"))?
        .to_slot();

    let filters = match threshold {
        Some(pct) => FilterChain::with_brightness(
            BrightnessFilter::new(pct).context("invalid brightness threshold")?,
        ),
        None => FilterChain::new(),
    };

    let config = SamplerConfig {
        framerate,
        width,
        height,
        show_fps,
        fps_log: log_file,
    };

    let output = if no_output {
        Output::Null(NullStrip::new(leds))
    } else {
        // Flushing strategies redraw once per pass instead of per write.
        let preview = TermStrip::new(leds).with_auto_write(!mapper.flushes_strip());
        Output::Term(StripGuard::new(preview))
    };

    let stop = StopHandle::new();
    let sampler = Sampler::new(
        config,
        V4l2Source::new(device),
        output,
        mapper,
        filters,
        stop.clone(),
    )
    .context("invalid sampler configuration")?;

    let interrupt_stop = stop.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!("interrupt handler failed: {err}");
            return;
        }
        tracing::info!("interrupt received, stopping after the current tick");
        interrupt_stop.stop();
    });

    let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .context("failed to install termination signal handler")?;
    let terminate_stop = stop;
    tokio::spawn(async move {
        terminate.recv().await;
        tracing::info!("termination signal received, stopping after the current tick");
        terminate_stop.stop();
    });

    tokio::task::spawn_blocking(move || sampler.run())
        .await
        .context("sampler thread panicked")??;

    Ok(())
}
