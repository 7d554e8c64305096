mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use edgelight::LedStrip;
    use edgelight::capture::{CaptureError, CaptureSource};
    use edgelight::color::{Bgr, Rgb};
    use edgelight::filter::{BrightnessFilter, FilterChain};
    use edgelight::frame::Frame;
    use edgelight::mapper::MapperId;
    use edgelight::sampler::{Sampler, SamplerConfig, StopHandle, remaining_sleep};
    use edgelight::strip::{MemoryStrip, StripError, StripGuard};

    const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    /// Strip that stays inspectable after the sampler consumed it.
    #[derive(Clone)]
    struct SharedStrip(Arc<Mutex<MemoryStrip>>);

    impl SharedStrip {
        fn new(len: usize) -> Self {
            Self(Arc::new(Mutex::new(MemoryStrip::new(len))))
        }

        fn colors(&self) -> Vec<Rgb> {
            self.0.lock().unwrap().colors().to_vec()
        }

        fn flush_count(&self) -> usize {
            self.0.lock().unwrap().flush_count()
        }
    }

    impl LedStrip for SharedStrip {
        fn len(&self) -> usize {
            self.0.lock().unwrap().len()
        }

        fn set(&mut self, index: usize, color: Rgb) {
            self.0.lock().unwrap().set(index, color);
        }

        fn flush(&mut self) -> Result<(), StripError> {
            self.0.lock().unwrap().flush()
        }
    }

    fn uniform_frame(value: u8) -> Frame {
        Frame::filled(
            6,
            5,
            Bgr {
                b: value,
                g: value,
                r: value,
            },
        )
    }

    /// Serves a fixed number of uniform frames, then end of stream.
    struct ScriptedSource {
        frames: Vec<Frame>,
        reads: Arc<AtomicUsize>,
        stop_after: Option<(usize, StopHandle)>,
    }

    impl ScriptedSource {
        fn new(count: usize) -> Self {
            Self::with_value(count, 120)
        }

        fn with_value(count: usize, value: u8) -> Self {
            Self {
                frames: (0..count).map(|_| uniform_frame(value)).collect(),
                reads: Arc::new(AtomicUsize::new(0)),
                stop_after: None,
            }
        }

        fn reads(&self) -> Arc<AtomicUsize> {
            self.reads.clone()
        }

        /// Raise the stop flag during the n-th read.
        fn stop_after(mut self, reads: usize, handle: StopHandle) -> Self {
            self.stop_after = Some((reads, handle));
            self
        }
    }

    impl CaptureSource for ScriptedSource {
        fn is_open(&self) -> bool {
            true
        }

        fn open(&mut self) -> Result<(), CaptureError> {
            Ok(())
        }

        fn read(&mut self) -> Option<Frame> {
            let served = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some((after, handle)) = &self.stop_after {
                if served >= *after {
                    handle.stop();
                }
            }
            if self.frames.is_empty() {
                None
            } else {
                Some(self.frames.remove(0))
            }
        }
    }

    fn config(width: u32, height: u32) -> SamplerConfig {
        SamplerConfig {
            framerate: 0,
            width,
            height,
            show_fps: false,
            fps_log: None,
        }
    }

    #[test]
    fn test_sleep_remainder() {
        assert_eq!(
            remaining_sleep(Some(Duration::from_millis(100)), Duration::from_millis(30)),
            Duration::from_millis(70)
        );
        assert_eq!(
            remaining_sleep(Some(Duration::from_millis(100)), Duration::from_millis(120)),
            Duration::ZERO
        );
        assert_eq!(
            remaining_sleep(None, Duration::from_millis(30)),
            Duration::ZERO
        );
    }

    #[test]
    fn test_frame_delay_from_framerate() {
        assert_eq!(config(4, 4).frame_delay(), None);
        let mut limited = config(4, 4);
        limited.framerate = 10;
        assert_eq!(limited.frame_delay(), Some(Duration::from_millis(100)));
    }

    #[test]
    fn test_config_rejects_zero_dimensions() {
        assert!(config(0, 4).validate().is_err());
        assert!(config(4, 0).validate().is_err());
        assert!(config(4, 4).validate().is_ok());
    }

    #[test]
    fn test_empty_strip_is_rejected() {
        let result = Sampler::new(
            config(4, 4),
            ScriptedSource::new(1),
            SharedStrip::new(0),
            MapperId::Top.to_slot(),
            FilterChain::new(),
            StopHandle::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_run_stops_at_end_of_stream() {
        let source = ScriptedSource::new(3);
        let reads = source.reads();
        let strip = SharedStrip::new(8);
        let sampler = Sampler::new(
            config(6, 5),
            source,
            strip.clone(),
            MapperId::Ring.to_slot(),
            FilterChain::new(),
            StopHandle::new(),
        )
        .unwrap();

        sampler.run().unwrap();

        // Three frames plus the read that reported end of stream.
        assert_eq!(reads.load(Ordering::SeqCst), 4);
        // The ring strategy commits one flush per frame.
        assert_eq!(strip.flush_count(), 3);
        assert!(strip.colors().iter().any(|&c| c != BLACK));
    }

    #[test]
    fn test_non_flushing_strategy_never_flushes() {
        let source = ScriptedSource::new(2);
        let strip = SharedStrip::new(6);
        let sampler = Sampler::new(
            config(6, 5),
            source,
            strip.clone(),
            MapperId::Top.to_slot(),
            FilterChain::new(),
            StopHandle::new(),
        )
        .unwrap();

        sampler.run().unwrap();

        assert_eq!(strip.flush_count(), 0);
        assert_eq!(
            strip.colors()[0],
            Rgb {
                r: 120,
                g: 120,
                b: 120
            }
        );
    }

    #[test]
    fn test_stop_between_ticks_halts_reads() {
        let stop = StopHandle::new();
        let source = ScriptedSource::new(5).stop_after(1, stop.clone());
        let reads = source.reads();
        let strip = SharedStrip::new(6);
        let sampler = Sampler::new(
            config(6, 5),
            source,
            strip.clone(),
            MapperId::Top.to_slot(),
            FilterChain::new(),
            stop,
        )
        .unwrap();

        sampler.run().unwrap();

        // The stop lands during the first tick; that tick completes and
        // the second read never happens.
        assert_eq!(reads.load(Ordering::SeqCst), 1);
        assert_eq!(
            strip.colors()[0],
            Rgb {
                r: 120,
                g: 120,
                b: 120
            }
        );
    }

    #[test]
    fn test_pre_stopped_sampler_never_reads() {
        let stop = StopHandle::new();
        stop.stop();
        let source = ScriptedSource::new(2);
        let reads = source.reads();
        let sampler = Sampler::new(
            config(4, 4),
            source,
            SharedStrip::new(4),
            MapperId::Ring.to_slot(),
            FilterChain::new(),
            stop,
        )
        .unwrap();

        sampler.run().unwrap();
        assert_eq!(reads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_filtered_run_blanks_dark_frames() {
        let source = ScriptedSource::with_value(2, 10);
        let strip = SharedStrip::new(6);
        let filters = FilterChain::with_brightness(BrightnessFilter::new(80.0).unwrap());
        let sampler = Sampler::new(
            config(6, 5),
            source,
            strip.clone(),
            MapperId::Top.to_slot(),
            filters,
            StopHandle::new(),
        )
        .unwrap();

        sampler.run().unwrap();
        assert!(strip.colors().iter().all(|&c| c == BLACK));
    }

    #[test]
    fn test_open_retries_until_ready() {
        /// Fails the first open attempt, then serves one frame.
        struct SlowOpen {
            open_attempts: Arc<AtomicUsize>,
            open: bool,
            served: bool,
        }

        impl CaptureSource for SlowOpen {
            fn is_open(&self) -> bool {
                self.open
            }

            fn open(&mut self) -> Result<(), CaptureError> {
                let attempt = self.open_attempts.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 2 {
                    return Err(CaptureError::Open {
                        path: "/dev/video9".into(),
                        source: std::io::Error::from(std::io::ErrorKind::NotFound),
                    });
                }
                self.open = true;
                Ok(())
            }

            fn read(&mut self) -> Option<Frame> {
                if self.served {
                    None
                } else {
                    self.served = true;
                    Some(uniform_frame(120))
                }
            }
        }

        let attempts = Arc::new(AtomicUsize::new(0));
        let source = SlowOpen {
            open_attempts: attempts.clone(),
            open: false,
            served: false,
        };
        let strip = SharedStrip::new(6);
        let sampler = Sampler::new(
            config(6, 5),
            source,
            strip.clone(),
            MapperId::Top.to_slot(),
            FilterChain::new(),
            StopHandle::new(),
        )
        .unwrap();

        sampler.run().unwrap();

        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert!(strip.colors().iter().any(|&c| c != BLACK));
    }

    #[test]
    fn test_stop_during_open_retry_never_reads() {
        /// Never opens; raises the stop flag on its second attempt.
        struct NeverOpens {
            open_attempts: Arc<AtomicUsize>,
            reads: Arc<AtomicUsize>,
            stop: StopHandle,
        }

        impl CaptureSource for NeverOpens {
            fn is_open(&self) -> bool {
                false
            }

            fn open(&mut self) -> Result<(), CaptureError> {
                let attempt = self.open_attempts.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt >= 2 {
                    self.stop.stop();
                }
                Err(CaptureError::Open {
                    path: "/dev/video9".into(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                })
            }

            fn read(&mut self) -> Option<Frame> {
                self.reads.fetch_add(1, Ordering::SeqCst);
                None
            }
        }

        let stop = StopHandle::new();
        let attempts = Arc::new(AtomicUsize::new(0));
        let reads = Arc::new(AtomicUsize::new(0));
        let source = NeverOpens {
            open_attempts: attempts.clone(),
            reads: reads.clone(),
            stop: stop.clone(),
        };
        let sampler = Sampler::new(
            config(6, 5),
            source,
            SharedStrip::new(6),
            MapperId::Ring.to_slot(),
            FilterChain::new(),
            stop,
        )
        .unwrap();

        sampler.run().unwrap();

        // The retry loop tries again after the failed first attempt,
        // then honors the flag and ends without reading a frame.
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(reads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_fps_log_appends_estimates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fps.log");

        let source = ScriptedSource::new(3);
        let mut paced = config(6, 5);
        // The pacing sleep guarantees measurable tick spacing.
        paced.framerate = 50;
        paced.show_fps = true;
        paced.fps_log = Some(path.clone());

        let sampler = Sampler::new(
            paced,
            source,
            SharedStrip::new(4),
            MapperId::Ring.to_slot(),
            FilterChain::new(),
            StopHandle::new(),
        )
        .unwrap();

        sampler.run().unwrap();

        let log = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        // Four ticks ran (three frames and the end-of-stream read); the
        // first tick has no estimate.
        assert_eq!(lines.len(), 3);
        for line in lines {
            assert!(line.starts_with("Estimate framerate: "), "line: {line}");
            assert!(line.contains("fps /// Last frame duration: "), "line: {line}");
            assert!(line.ends_with('s'), "line: {line}");
        }
    }

    #[test]
    fn test_strip_guard_blanks_on_scope_exit() {
        let strip = SharedStrip::new(4);
        {
            let mut guard = StripGuard::new(strip.clone());
            for i in 0..4 {
                guard.set(i, Rgb { r: 9, g: 9, b: 9 });
            }
            assert!(strip.colors().iter().all(|&c| c != BLACK));
        }
        assert!(strip.colors().iter().all(|&c| c == BLACK));
        // The blanking pass commits exactly one flush.
        assert_eq!(strip.flush_count(), 1);
    }
}
