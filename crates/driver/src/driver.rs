use orbitscene_common::{ControlSettings, FrameStats, SurfaceSize};
use orbitscene_render::{FrameView, PerspectiveCamera, Renderer, ShadingOptions};
use orbitscene_scene::Scene;
use std::sync::mpsc::{Receiver, Sender};

use crate::animation::{self, BobbingMode};
use crate::error::MountError;
use crate::schedule::{FrameHandle, FrameScheduler, FrameTick};
use crate::stats::FrameCounter;
use crate::viewport::Viewport;

/// Render loop configuration, fixed at mount.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriverConfig {
    pub bobbing: BobbingMode,
    pub initial_settings: ControlSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

/// Result of one executed frame.
#[derive(Debug)]
pub struct FrameReport<T> {
    /// Whatever the renderer's draw call produced.
    pub output: T,
    /// Stats, on the frame that closed a one-second interval.
    pub stats: Option<FrameStats>,
}

/// Per-viewport render loop: owns the scene, camera, renderer and the single
/// pending frame callback.
///
/// Lifecycle is `Stopped -> Running` on [`RenderLoop::mount`] and
/// `Running -> Stopped` on [`RenderLoop::teardown`]; there is no way back.
/// Each executed frame requests exactly one successor, so at most one frame
/// callback is in flight.
pub struct RenderLoop<R: Renderer, S: FrameScheduler> {
    state: LoopState,
    scene: Scene,
    camera: PerspectiveCamera,
    viewport: Viewport,
    renderer: Option<R>,
    scheduler: S,
    pending: Option<FrameHandle>,
    config: DriverConfig,
    settings: ControlSettings,
    counter: FrameCounter,
    frames: u64,
    settings_rx: Option<Receiver<ControlSettings>>,
    stats_tx: Option<Sender<FrameStats>>,
}

impl<R: Renderer, S: FrameScheduler> RenderLoop<R, S> {
    /// Build the scene, take ownership of the renderer and request the first
    /// frame.
    ///
    /// Fails if the container has no area; nothing is scheduled in that case.
    pub fn mount(
        container: SurfaceSize,
        mut renderer: R,
        mut scheduler: S,
        config: DriverConfig,
        now_ms: f64,
    ) -> Result<Self, MountError> {
        if container.is_empty() {
            tracing::warn!(%container, "refusing to mount on an empty container");
            return Err(MountError::empty(container));
        }

        let settings = match config.initial_settings.validate() {
            Ok(()) => config.initial_settings,
            Err(e) => {
                tracing::warn!("initial settings rejected, using defaults: {e}");
                ControlSettings::default()
            }
        };

        if renderer.surface_size() != container {
            renderer.resize(container);
        }
        let pending = scheduler.request_frame();
        tracing::info!(
            %container,
            bobbing = config.bobbing.name(),
            "render loop mounted"
        );

        Ok(Self {
            state: LoopState::Running,
            scene: Scene::build(),
            camera: PerspectiveCamera::for_surface(container),
            viewport: Viewport::new(container),
            renderer: Some(renderer),
            scheduler,
            pending: Some(pending),
            config,
            settings,
            counter: FrameCounter::new(now_ms),
            frames: 0,
            settings_rx: None,
            stats_tx: None,
        })
    }

    /// Consume settings snapshots from `rx`, newest wins, at each frame start.
    pub fn connect_settings(&mut self, rx: Receiver<ControlSettings>) {
        self.settings_rx = Some(rx);
    }

    /// Publish stats to `tx` once per second.
    pub fn connect_stats(&mut self, tx: Sender<FrameStats>) {
        self.stats_tx = Some(tx);
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// The frame callback currently scheduled, if any.
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn settings(&self) -> &ControlSettings {
        &self.settings
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn renderer(&self) -> Option<&R> {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> Option<&mut R> {
        self.renderer.as_mut()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Frames executed since mount.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_stats(&self) -> Option<FrameStats> {
        self.counter.last()
    }

    /// Replace the active settings. Invalid snapshots are dropped.
    pub fn apply_settings(&mut self, settings: ControlSettings) {
        if let Err(e) = settings.validate() {
            tracing::warn!("settings snapshot rejected: {e}");
            return;
        }
        if settings != self.settings {
            tracing::debug!(?settings, "settings applied");
            self.settings = settings;
        }
    }

    fn drain_settings(&mut self) {
        let Some(rx) = &self.settings_rx else {
            return;
        };
        let latest = rx
            .try_iter()
            .filter(|s| match s.validate() {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("settings snapshot rejected: {e}");
                    false
                }
            })
            .last();
        if let Some(settings) = latest {
            self.apply_settings(settings);
        }
    }

    fn shading(&self) -> ShadingOptions {
        ShadingOptions {
            wireframe: self.settings.wireframe,
            light_scale: self.settings.light_intensity,
        }
    }

    /// Run one frame if `tick` is for the pending callback.
    ///
    /// Ticks arriving while stopped, or carrying any other handle, are
    /// ignored and return `None`.
    pub fn on_frame(&mut self, tick: FrameTick) -> Option<FrameReport<R::Output>> {
        if self.state != LoopState::Running {
            tracing::trace!(handle = tick.handle.0, "tick after teardown ignored");
            return None;
        }
        if self.pending != Some(tick.handle) {
            tracing::trace!(handle = tick.handle.0, "stale tick ignored");
            return None;
        }
        self.pending = None;
        let _span = tracing::trace_span!("frame", n = self.frames).entered();

        self.drain_settings();

        let now = tick.timestamp_ms;
        animation::animate_objects(&mut self.scene, &self.settings, self.config.bobbing, now);
        animation::orbit_camera(&mut self.camera, now);

        let shading = self.shading();
        let renderer = self.renderer.as_mut()?;
        let output = renderer.draw(&FrameView {
            scene: &self.scene,
            camera: &self.camera,
            shading,
        });
        self.frames += 1;

        let stats = self.counter.record(now, self.scene.object_count());
        if let Some(stats) = stats {
            tracing::debug!(fps = stats.fps, objects = stats.object_count, "frame stats");
            let disconnected = self
                .stats_tx
                .as_ref()
                .is_some_and(|tx| tx.send(stats).is_err());
            if disconnected {
                tracing::debug!("stats receiver gone, disconnecting");
                self.stats_tx = None;
            }
        }

        self.pending = Some(self.scheduler.request_frame());
        Some(FrameReport { output, stats })
    }

    /// Resize signal from the host. Returns true if the viewport changed.
    pub fn on_resize(&mut self, size: SurfaceSize) -> bool {
        let Some(renderer) = self.renderer.as_mut() else {
            return false;
        };
        self.viewport.resize(size, &mut self.camera, renderer)
    }

    /// Cancel the pending frame, release the renderer and stop.
    ///
    /// Returns the released renderer on the first call, `None` afterwards.
    pub fn teardown(&mut self) -> Option<R> {
        if self.state == LoopState::Stopped {
            return None;
        }
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        self.state = LoopState::Stopped;
        self.settings_rx = None;
        self.stats_tx = None;
        let mut renderer = self.renderer.take()?;
        renderer.release();
        tracing::info!(frames = self.frames, "render loop torn down");
        Some(renderer)
    }
}

impl<R: Renderer, S: FrameScheduler> Drop for RenderLoop<R, S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::spin_rate;
    use crate::schedule::ManualScheduler;
    use orbitscene_scene::OBJECT_COUNT;
    use std::cell::RefCell;
    use std::f32::consts::TAU;
    use std::rc::Rc;
    use std::sync::mpsc;

    /// Renderer that only counts calls.
    #[derive(Debug, Default)]
    struct CountingRenderer {
        size: SurfaceSize,
        draws: u32,
        resizes: u32,
        released: bool,
        last_shading: Option<ShadingOptions>,
    }

    impl Renderer for CountingRenderer {
        type Output = u32;

        fn draw(&mut self, frame: &FrameView<'_>) -> u32 {
            self.draws += 1;
            self.last_shading = Some(frame.shading);
            self.draws
        }

        fn resize(&mut self, size: SurfaceSize) {
            self.resizes += 1;
            self.size = size;
        }

        fn surface_size(&self) -> SurfaceSize {
            self.size
        }

        fn release(&mut self) {
            self.released = true;
        }
    }

    const T0: f64 = 1_700_000_000_000.0;

    type TestLoop = RenderLoop<CountingRenderer, ManualScheduler>;

    fn mount(size: SurfaceSize) -> TestLoop {
        RenderLoop::mount(
            size,
            CountingRenderer::default(),
            ManualScheduler::new(),
            DriverConfig::default(),
            T0,
        )
        .unwrap()
    }

    /// Fire `n` display refreshes at 60 Hz starting one refresh after T0.
    fn run_frames(driver: &mut TestLoop, n: u32) -> Vec<FrameStats> {
        let mut published = Vec::new();
        let start = driver.frames();
        for k in 1..=n as u64 {
            let handle = driver.scheduler_mut().fire().unwrap();
            let t = T0 + (start + k) as f64 * 1000.0 / 60.0;
            let report = driver.on_frame(FrameTick::new(handle, t)).unwrap();
            published.extend(report.stats);
        }
        published
    }

    #[test]
    fn mount_starts_running_with_one_pending_frame() {
        let driver = mount(SurfaceSize::new(800, 600));
        assert_eq!(driver.state(), LoopState::Running);
        assert!(driver.pending_frame().is_some());
        assert_eq!(driver.scheduler().pending(), driver.pending_frame());
        assert_eq!(driver.renderer().unwrap().size, SurfaceSize::new(800, 600));
    }

    #[test]
    fn mount_rejects_empty_container() {
        let result = RenderLoop::mount(
            SurfaceSize::new(0, 600),
            CountingRenderer::default(),
            ManualScheduler::new(),
            DriverConfig::default(),
            T0,
        );
        assert_eq!(
            result.err(),
            Some(MountError::EmptyContainer {
                width: 0,
                height: 600
            })
        );
    }

    #[test]
    fn mount_800x600_sets_camera_aspect() {
        let driver = mount(SurfaceSize::new(800, 600));
        assert!((driver.camera().aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn one_second_at_60hz_reports_60_fps() {
        let mut driver = mount(SurfaceSize::new(800, 600));
        let published = run_frames(&mut driver, 60);
        assert_eq!(
            published,
            vec![FrameStats {
                fps: 60,
                object_count: OBJECT_COUNT
            }]
        );
        assert_eq!(driver.last_stats().unwrap().fps, 60);
    }

    #[test]
    fn object_count_constant_across_intervals() {
        let mut driver = mount(SurfaceSize::new(640, 480));
        let published = run_frames(&mut driver, 300);
        assert_eq!(published.len(), 5);
        assert!(published.iter().all(|s| s.object_count == OBJECT_COUNT));
    }

    #[test]
    fn rotation_after_k_frames_matches_tier() {
        let mut driver = mount(SurfaceSize::new(800, 600));
        let k = 250;
        run_frames(&mut driver, k);
        for obj in driver.scene().objects() {
            let (dx, _) = spin_rate(obj.index());
            let expected = (k as f32 * dx).rem_euclid(TAU);
            let gap = (obj.transform.rotation.x - expected).rem_euclid(TAU);
            assert!(gap.min(TAU - gap) < 1e-3, "object {}", obj.index());
        }
    }

    #[test]
    fn each_frame_draws_once_and_reschedules_once() {
        let mut driver = mount(SurfaceSize::new(800, 600));
        run_frames(&mut driver, 10);
        assert_eq!(driver.renderer().unwrap().draws, 10);
        // first request at mount plus one per frame
        assert_eq!(driver.scheduler().requested(), 11);
        assert!(driver.pending_frame().is_some());
    }

    #[test]
    fn stale_handle_is_ignored() {
        let mut driver = mount(SurfaceSize::new(800, 600));
        let first = driver.scheduler_mut().fire().unwrap();
        assert!(driver.on_frame(FrameTick::new(first, T0 + 16.0)).is_some());
        let before = driver.scene().clone();
        assert!(driver.on_frame(FrameTick::new(first, T0 + 32.0)).is_none());
        assert_eq!(driver.scene(), &before);
        assert_eq!(driver.renderer().unwrap().draws, 1);
    }

    #[test]
    fn tick_after_teardown_changes_nothing() {
        let mut driver = mount(SurfaceSize::new(800, 600));
        run_frames(&mut driver, 3);
        let handle = driver.pending_frame().unwrap();
        let scene_before = driver.scene().clone();
        let camera_before = driver.camera().clone();

        let renderer = driver.teardown().unwrap();
        assert!(renderer.released);
        assert_eq!(renderer.draws, 3);
        assert_eq!(driver.state(), LoopState::Stopped);
        assert_eq!(driver.scheduler().cancelled(), &[handle]);
        assert!(driver.pending_frame().is_none());

        assert!(driver.on_frame(FrameTick::new(handle, T0 + 5000.0)).is_none());
        assert_eq!(driver.scene(), &scene_before);
        assert_eq!(driver.camera(), &camera_before);
        assert!(driver.teardown().is_none());
    }

    #[test]
    fn resize_same_dimensions_is_idempotent() {
        let mut driver = mount(SurfaceSize::new(800, 600));
        assert!(driver.on_resize(SurfaceSize::new(1024, 512)));
        let aspect = driver.camera().aspect;
        let resizes = driver.renderer().unwrap().resizes;

        assert!(!driver.on_resize(SurfaceSize::new(1024, 512)));
        assert_eq!(driver.camera().aspect, aspect);
        assert!((aspect - 2.0).abs() < 1e-6);
        assert_eq!(driver.viewport().size(), SurfaceSize::new(1024, 512));
        assert_eq!(driver.renderer().unwrap().resizes, resizes);
        assert_eq!(driver.renderer().unwrap().size, SurfaceSize::new(1024, 512));
    }

    #[test]
    fn empty_resize_keeps_previous_state() {
        let mut driver = mount(SurfaceSize::new(800, 600));
        assert!(!driver.on_resize(SurfaceSize::new(0, 0)));
        assert_eq!(driver.viewport().size(), SurfaceSize::new(800, 600));
    }

    #[test]
    fn camera_stays_on_orbit() {
        let mut driver = mount(SurfaceSize::new(800, 600));
        for _ in 0..200 {
            let handle = driver.scheduler_mut().fire().unwrap();
            let t = T0 + driver.frames() as f64 * 333.0;
            driver.on_frame(FrameTick::new(handle, t));
            let p = driver.camera().position;
            let r = (p.x / 15.0).powi(2) + ((p.z - 10.0) / 15.0).powi(2);
            assert!((r - 1.0).abs() < 1e-4);
            assert_eq!(driver.camera().target, glam::Vec3::ZERO);
        }
    }

    #[test]
    fn settings_channel_drives_shading_and_spin() {
        let mut driver = mount(SurfaceSize::new(800, 600));
        let (tx, rx) = mpsc::channel();
        driver.connect_settings(rx);

        tx.send(ControlSettings {
            wireframe: true,
            ..ControlSettings::default()
        })
        .unwrap();
        tx.send(ControlSettings {
            wireframe: true,
            light_intensity: 1.5,
            auto_rotate: false,
            ..ControlSettings::default()
        })
        .unwrap();
        run_frames(&mut driver, 1);

        let shading = driver.renderer().unwrap().last_shading.unwrap();
        assert!(shading.wireframe);
        assert_eq!(shading.light_scale, 1.5);
        assert!(!driver.settings().auto_rotate);
        for obj in driver.scene().objects() {
            assert_eq!(obj.transform.rotation, glam::Vec3::ZERO);
        }
    }

    #[test]
    fn invalid_settings_are_dropped() {
        let mut driver = mount(SurfaceSize::new(800, 600));
        driver.apply_settings(ControlSettings {
            rotation_speed: -1.0,
            ..ControlSettings::default()
        });
        assert_eq!(driver.settings(), &ControlSettings::default());
    }

    #[test]
    fn invalid_snapshot_does_not_mask_earlier_valid_one() {
        let mut driver = mount(SurfaceSize::new(800, 600));
        let (tx, rx) = mpsc::channel();
        driver.connect_settings(rx);

        tx.send(ControlSettings {
            wireframe: true,
            ..ControlSettings::default()
        })
        .unwrap();
        tx.send(ControlSettings {
            rotation_speed: -1.0,
            ..ControlSettings::default()
        })
        .unwrap();
        run_frames(&mut driver, 1);

        assert!(driver.settings().wireframe);
        assert_eq!(driver.settings().rotation_speed, 1.0);
        assert!(driver.renderer().unwrap().last_shading.unwrap().wireframe);
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Requested(FrameHandle),
        Cancelled(FrameHandle),
        Released,
    }

    type EventLog = Rc<RefCell<Vec<Event>>>;

    struct LoggingScheduler {
        next: u64,
        log: EventLog,
    }

    impl FrameScheduler for LoggingScheduler {
        fn request_frame(&mut self) -> FrameHandle {
            self.next += 1;
            let handle = FrameHandle(self.next);
            self.log.borrow_mut().push(Event::Requested(handle));
            handle
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            self.log.borrow_mut().push(Event::Cancelled(handle));
        }
    }

    struct LoggingRenderer {
        size: SurfaceSize,
        log: EventLog,
    }

    impl Renderer for LoggingRenderer {
        type Output = ();

        fn draw(&mut self, _frame: &FrameView<'_>) {}

        fn resize(&mut self, size: SurfaceSize) {
            self.size = size;
        }

        fn surface_size(&self) -> SurfaceSize {
            self.size
        }

        fn release(&mut self) {
            self.log.borrow_mut().push(Event::Released);
        }
    }

    #[test]
    fn dropping_running_loop_cancels_and_releases() {
        let log: EventLog = Rc::default();
        let size = SurfaceSize::new(800, 600);
        let driver = RenderLoop::mount(
            size,
            LoggingRenderer {
                size,
                log: Rc::clone(&log),
            },
            LoggingScheduler {
                next: 0,
                log: Rc::clone(&log),
            },
            DriverConfig::default(),
            T0,
        )
        .unwrap();
        let pending = driver.pending_frame().unwrap();
        drop(driver);

        assert_eq!(
            *log.borrow(),
            vec![
                Event::Requested(pending),
                Event::Cancelled(pending),
                Event::Released
            ]
        );
    }

    #[test]
    fn drop_after_teardown_releases_once() {
        let log: EventLog = Rc::default();
        let size = SurfaceSize::new(800, 600);
        let mut driver = RenderLoop::mount(
            size,
            LoggingRenderer {
                size,
                log: Rc::clone(&log),
            },
            LoggingScheduler {
                next: 0,
                log: Rc::clone(&log),
            },
            DriverConfig::default(),
            T0,
        )
        .unwrap();
        let released = driver.teardown();
        assert!(released.is_some());
        drop(released);
        drop(driver);

        let log = log.borrow();
        assert_eq!(log.iter().filter(|e| **e == Event::Released).count(), 1);
        assert_eq!(
            log.iter()
                .filter(|e| matches!(e, Event::Cancelled(_)))
                .count(),
            1
        );
    }

    #[test]
    fn stats_channel_receives_published_stats() {
        let mut driver = mount(SurfaceSize::new(800, 600));
        let (tx, rx) = mpsc::channel();
        driver.connect_stats(tx);
        run_frames(&mut driver, 120);
        let received: Vec<FrameStats> = rx.try_iter().collect();
        assert_eq!(received.len(), 2);
        assert!(received.iter().all(|s| s.fps == 60));
    }
}
