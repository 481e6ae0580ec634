mod config;
mod redraw;

use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use orbitscene_common::{ControlSettings, FrameStats, SurfaceSize};
use orbitscene_controls::SettingsPanel;
use orbitscene_driver::{BobbingMode, DriverConfig, FrameReport, FrameTick, RenderLoop};
use orbitscene_render_wgpu::{PresentableFrame, WgpuRenderer};
use orbitscene_scene::ShadowParams;
use redraw::RedrawScheduler;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "orbitscene-desktop", about = "Orbiting lit scene viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Initial window width in pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Initial window height in pixels
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Vertical bobbing model: oscillate or drift
    #[arg(long, default_value = "oscillate")]
    bobbing: BobbingMode,

    /// JSON file with initial settings
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Show the settings panel without wiring it to the render loop
    #[arg(long)]
    detach_settings: bool,
}

type Driver = RenderLoop<WgpuRenderer, RedrawScheduler>;

fn wall_clock_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

struct ViewerApp {
    initial_size: SurfaceSize,
    config: DriverConfig,
    detach_settings: bool,
    window: Option<Arc<Window>>,
    driver: Option<Driver>,
    panel: SettingsPanel,
    stats_rx: Option<Receiver<FrameStats>>,
    last_stats: Option<FrameStats>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    failure: Option<anyhow::Error>,
}

impl ViewerApp {
    fn new(initial_size: SurfaceSize, config: DriverConfig, detach_settings: bool) -> Self {
        Self {
            initial_size,
            config,
            detach_settings,
            window: None,
            driver: None,
            panel: SettingsPanel::new(config.initial_settings),
            stats_rx: None,
            last_stats: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
            failure: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Orbit Scene")
            .with_inner_size(PhysicalSize::new(
                self.initial_size.width,
                self.initial_size.height,
            ));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);
        let inner = window.inner_size();
        let size = SurfaceSize::new(inner.width, inner.height);

        let renderer = pollster::block_on(WgpuRenderer::new(
            window.clone(),
            size,
            ShadowParams::default(),
        ))
        .context("initialize GPU")?;
        let format = renderer.surface_format().context("surface not configured")?;
        let device = renderer.device().context("device not available")?;
        let egui_renderer = egui_wgpu::Renderer::new(device, format, None, 1, false);

        let scheduler = RedrawScheduler::new(window.clone());
        let mut driver = RenderLoop::mount(size, renderer, scheduler, self.config, wall_clock_ms())
            .context("mount render loop")?;

        let (stats_tx, stats_rx) = mpsc::channel();
        driver.connect_stats(stats_tx);
        self.stats_rx = Some(stats_rx);

        if self.detach_settings {
            tracing::info!("settings panel detached from the render loop");
        } else {
            let (settings_tx, settings_rx) = mpsc::channel::<ControlSettings>();
            driver.connect_settings(settings_rx);
            self.panel.set_listener(move |settings| {
                let _ = settings_tx.send(settings);
            });
        }

        self.egui_winit = Some(egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        ));
        self.egui_renderer = Some(egui_renderer);
        self.driver = Some(driver);
        self.window = Some(window);
        Ok(())
    }

    fn redraw(&mut self) {
        let Some(driver) = self.driver.as_mut() else {
            return;
        };
        let Some(handle) = driver.scheduler_mut().take_requested() else {
            tracing::trace!("redraw not requested by the render loop, skipped");
            return;
        };
        let Some(FrameReport { output, .. }) =
            driver.on_frame(FrameTick::new(handle, wall_clock_ms()))
        else {
            return;
        };

        if let Some(latest) = self.stats_rx.as_ref().and_then(|rx| rx.try_iter().last()) {
            self.last_stats = Some(latest);
        }

        if let Some(frame) = output {
            self.paint_overlay(&frame);
            frame.present();
        }
    }

    /// Draw the settings panel and stats readout over the lit frame.
    fn paint_overlay(&mut self, frame: &PresentableFrame) {
        let (Some(window), Some(driver), Some(egui_winit), Some(egui_renderer)) = (
            &self.window,
            &self.driver,
            &mut self.egui_winit,
            &mut self.egui_renderer,
        ) else {
            return;
        };
        let Some(renderer) = driver.renderer() else {
            return;
        };
        let (Some(device), Some(queue), Some(config)) =
            (renderer.device(), renderer.queue(), renderer.config())
        else {
            return;
        };

        let raw_input = egui_winit.take_egui_input(window);
        let panel = &mut self.panel;
        let stats = self.last_stats;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            egui::SidePanel::right("controls")
                .default_width(260.0)
                .show(ctx, |ui| panel.show(ui));
            egui::Area::new(egui::Id::new("stats"))
                .anchor(egui::Align2::LEFT_TOP, [12.0, 12.0])
                .show(ctx, |ui| {
                    let text = stats.map_or_else(|| "FPS: --".to_string(), |s| s.to_string());
                    ui.label(egui::RichText::new(text).monospace().color(egui::Color32::WHITE));
                });
        });
        egui_winit.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [config.width, config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        egui_renderer.update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &frame.view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }
    }

    fn shutdown(&mut self) {
        self.egui_renderer = None;
        if let Some(mut driver) = self.driver.take() {
            driver.teardown();
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            tracing::error!("startup failed: {e:#}");
            self.failure = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let _ = egui_winit.on_window_event(window, &event);
        }

        match event {
            WindowEvent::CloseRequested => {
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(driver) = self.driver.as_mut() {
                    driver.on_resize(SurfaceSize::new(new_size.width, new_size.height));
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("orbitscene-desktop starting");

    let initial_settings = match &cli.settings {
        Some(path) => config::load_settings(path)?,
        None => ControlSettings::default(),
    };
    let driver_config = DriverConfig {
        bobbing: cli.bobbing,
        initial_settings,
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = ViewerApp::new(
        SurfaceSize::new(cli.width, cli.height),
        driver_config,
        cli.detach_settings,
    );
    event_loop.run_app(&mut app)?;

    match app.failure.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
