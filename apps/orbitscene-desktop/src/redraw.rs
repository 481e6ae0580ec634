use orbitscene_driver::{FrameHandle, FrameScheduler};
use std::sync::Arc;
use winit::window::Window;

/// Redraw requests issued by the render loop and not yet consumed.
///
/// Redraws the platform sends on its own (expose, live resize) find nothing
/// outstanding and do not run a frame.
#[derive(Debug, Default)]
pub struct RedrawRequests {
    next: u64,
    outstanding: Option<FrameHandle>,
}

impl RedrawRequests {
    pub fn issue(&mut self) -> FrameHandle {
        self.next += 1;
        let handle = FrameHandle(self.next);
        self.outstanding = Some(handle);
        handle
    }

    pub fn withdraw(&mut self, handle: FrameHandle) {
        if self.outstanding == Some(handle) {
            self.outstanding = None;
        }
    }

    /// Consume the outstanding request, if the loop asked for this redraw.
    pub fn take(&mut self) -> Option<FrameHandle> {
        self.outstanding.take()
    }
}

/// Frame scheduler backed by winit redraw requests.
///
/// winit cannot withdraw a redraw request, so cancelling only forgets the
/// handle and the redraw that still arrives is skipped.
pub struct RedrawScheduler {
    window: Arc<Window>,
    requests: RedrawRequests,
}

impl RedrawScheduler {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            requests: RedrawRequests::default(),
        }
    }

    pub fn take_requested(&mut self) -> Option<FrameHandle> {
        self.requests.take()
    }
}

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = self.requests.issue();
        self.window.request_redraw();
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.requests.withdraw(handle);
        tracing::trace!(handle = handle.0, "redraw request withdrawn");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrequested_redraw_finds_nothing() {
        let mut requests = RedrawRequests::default();
        assert_eq!(requests.take(), None);
    }

    #[test]
    fn request_is_consumed_once() {
        let mut requests = RedrawRequests::default();
        let handle = requests.issue();
        assert_eq!(requests.take(), Some(handle));
        // a second platform redraw before the next request
        assert_eq!(requests.take(), None);
    }

    #[test]
    fn withdrawn_request_is_not_run() {
        let mut requests = RedrawRequests::default();
        let first = requests.issue();
        requests.withdraw(first);
        assert_eq!(requests.take(), None);

        let second = requests.issue();
        requests.withdraw(first);
        assert_eq!(requests.take(), Some(second));
        assert_ne!(first, second);
    }
}
