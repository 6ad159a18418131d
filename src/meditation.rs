// Yoga Pose Coach 🧘 AGPL-3.0 License

//! Guided yoga-nidra timer.
//!
//! The timer runs on a background thread that advances a shared position counter
//! once per tick. Callers read the position and derive the current script segment
//! from it; nothing else is shared.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::{CoachError, Result};

/// Script length in seconds.
pub const TOTAL_DURATION_SECS: u64 = 1260;

/// A named span of the script, `[start, end)` in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub name: &'static str,
    pub start: u64,
    pub end: u64,
}

impl Segment {
    /// Title-cased name, e.g. "Body Scan".
    #[must_use]
    pub fn title(&self) -> String {
        self.name
            .split('_')
            .map(|w| {
                let mut chars = w.chars();
                chars.next().map_or_else(String::new, |c| {
                    c.to_uppercase().chain(chars).collect::<String>()
                })
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Script segments in order.
pub const SEGMENTS: [Segment; 5] = [
    Segment { name: "intro", start: 0, end: 30 },
    Segment { name: "body_scan", start: 30, end: 300 },
    Segment { name: "breath_awareness", start: 300, end: 480 },
    Segment { name: "visualization", start: 480, end: 720 },
    Segment { name: "conclusion", start: 720, end: 1260 },
];

/// Segment containing `position` seconds, or `None` past the end of the script.
#[must_use]
pub fn segment_at(position: u64) -> Option<&'static Segment> {
    SEGMENTS.iter().find(|s| (s.start..s.end).contains(&position))
}

/// Format seconds as `MM:SS`.
#[must_use]
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Background meditation timer.
#[derive(Debug)]
pub struct MeditationTimer {
    position: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    tick: Duration,
    total: u64,
    handle: Option<JoinHandle<()>>,
}

impl Default for MeditationTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl MeditationTimer {
    /// Timer advancing one second of script per real second.
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Arc::new(AtomicU64::new(0)),
            running: Arc::new(AtomicBool::new(false)),
            paused: Arc::new(AtomicBool::new(false)),
            tick: Duration::from_secs(1),
            total: TOTAL_DURATION_SECS,
            handle: None,
        }
    }

    /// Real time per script second.
    #[must_use]
    pub const fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Override the script length.
    #[must_use]
    pub const fn with_total(mut self, secs: u64) -> Self {
        self.total = secs;
        self
    }

    /// Start the timer, or resume it if paused.
    ///
    /// # Errors
    ///
    /// Returns [`CoachError::ConfigError`] if the timer thread cannot be spawned.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            self.resume();
            return Ok(());
        }
        self.join();

        self.running.store(true, Ordering::SeqCst);
        self.paused.store(false, Ordering::SeqCst);

        let position = Arc::clone(&self.position);
        let running = Arc::clone(&self.running);
        let paused = Arc::clone(&self.paused);
        let tick = self.tick;
        let total = self.total;

        let handle = thread::Builder::new()
            .name("meditation-timer".to_string())
            .spawn(move || {
                while running.load(Ordering::SeqCst) {
                    thread::sleep(tick);
                    if !running.load(Ordering::SeqCst) {
                        break;
                    }
                    if paused.load(Ordering::SeqCst) {
                        continue;
                    }
                    if position.fetch_add(1, Ordering::SeqCst) + 1 >= total {
                        running.store(false, Ordering::SeqCst);
                    }
                }
            })
            .map_err(|e| CoachError::ConfigError(format!("Failed to start timer thread: {e}")))?;

        self.handle = Some(handle);
        Ok(())
    }

    pub fn pause(&self) {
        if self.is_running() {
            self.paused.store(true, Ordering::SeqCst);
        }
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    /// Stop the timer and rewind to the start.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.join();
        self.paused.store(false, Ordering::SeqCst);
        self.position.store(0, Ordering::SeqCst);
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Elapsed script seconds.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Fraction of the script completed (0.0 to 1.0).
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.total == 0 {
            return 1.0;
        }
        (self.position() as f32 / self.total as f32).min(1.0)
    }

    #[must_use]
    pub fn current_segment(&self) -> Option<&'static Segment> {
        segment_at(self.position())
    }
}

impl Drop for MeditationTimer {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.join();
    }
}
