//! Frame scheduling: one pending display-refresh callback at a time.

/// Identifies one scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

/// A frame-tick event delivered by the host when a scheduled frame fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    pub handle: FrameHandle,
    /// Wall-clock time of the refresh, in milliseconds.
    pub timestamp_ms: f64,
}

impl FrameTick {
    pub fn new(handle: FrameHandle, timestamp_ms: f64) -> Self {
        Self {
            handle,
            timestamp_ms,
        }
    }
}

/// Host-side scheduling primitive: asks the host for the next display refresh.
pub trait FrameScheduler {
    /// Request one callback at the next display refresh.
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraw a previously requested callback.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Scheduler whose frames fire only when the caller says so.
///
/// Used by the headless CLI and by tests to drive a simulated display.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: u64,
    pending: Option<FrameHandle>,
    cancelled: Vec<FrameHandle>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The callback currently waiting for a refresh, if any.
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Fire the pending callback: returns its handle and clears it.
    pub fn fire(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }

    pub fn cancelled(&self) -> &[FrameHandle] {
        &self.cancelled
    }

    /// Total number of frames requested so far.
    pub fn requested(&self) -> u64 {
        self.next
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next += 1;
        let handle = FrameHandle(self.next);
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
        self.cancelled.push(handle);
    }
}
