use orbitscene_common::FrameStats;

/// Publish interval of the frame counter, in milliseconds.
pub const STATS_INTERVAL_MS: f64 = 1000.0;

/// Counts frames and turns the count into [`FrameStats`] once per interval.
#[derive(Debug, Clone)]
pub struct FrameCounter {
    frames: u32,
    last_publish_ms: f64,
    last: Option<FrameStats>,
}

impl FrameCounter {
    /// Start counting from `now_ms`.
    pub fn new(now_ms: f64) -> Self {
        Self {
            frames: 0,
            last_publish_ms: now_ms,
            last: None,
        }
    }

    /// Record one frame. Returns the stats when an interval has elapsed.
    pub fn record(&mut self, now_ms: f64, object_count: usize) -> Option<FrameStats> {
        self.frames += 1;
        if now_ms - self.last_publish_ms < STATS_INTERVAL_MS {
            return None;
        }
        let stats = FrameStats {
            fps: self.frames,
            object_count,
        };
        self.frames = 0;
        self.last_publish_ms = now_ms;
        self.last = Some(stats);
        Some(stats)
    }

    /// Frames counted since the last publish.
    pub fn pending_frames(&self) -> u32 {
        self.frames
    }

    /// The most recently published stats.
    pub fn last(&self) -> Option<FrameStats> {
        self.last
    }
}
