use crate::gpu::ScenePipelines;
use orbitscene_common::SurfaceSize;
use orbitscene_render::{FrameView, Renderer};
use orbitscene_scene::ShadowParams;

#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}

/// An acquired swapchain image with lit scene contents, not yet presented.
///
/// The host may draw more on top of `view` before calling [`present`].
///
/// [`present`]: PresentableFrame::present
pub struct PresentableFrame {
    pub texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
}

impl PresentableFrame {
    pub fn present(self) {
        self.texture.present();
    }
}

struct GpuContext {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipelines: ScenePipelines,
}

/// wgpu renderer that owns its surface.
///
/// `release` drops the surface, the device and every pipeline; later draws
/// return `None`.
pub struct WgpuRenderer {
    gpu: Option<GpuContext>,
    size: SurfaceSize,
}

impl WgpuRenderer {
    /// Create a surface over `target` and everything needed to draw into it.
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        size: SurfaceSize,
        shadow: ShadowParams,
    ) -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(target)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("orbitscene_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(caps.formats.first())
            .copied()
            .ok_or(GpuError::NoSurfaceFormat)?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let pipelines = ScenePipelines::new(&device, format, config.width, config.height, shadow);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            adapter = %adapter.get_info().name,
            ?format,
            "GPU initialized"
        );

        Ok(Self {
            gpu: Some(GpuContext {
                surface,
                device,
                queue,
                config,
                pipelines,
            }),
            size,
        })
    }

    pub fn device(&self) -> Option<&wgpu::Device> {
        self.gpu.as_ref().map(|g| &g.device)
    }

    pub fn queue(&self) -> Option<&wgpu::Queue> {
        self.gpu.as_ref().map(|g| &g.queue)
    }

    pub fn config(&self) -> Option<&wgpu::SurfaceConfiguration> {
        self.gpu.as_ref().map(|g| &g.config)
    }

    pub fn surface_format(&self) -> Option<wgpu::TextureFormat> {
        self.config().map(|c| c.format)
    }

    pub fn is_released(&self) -> bool {
        self.gpu.is_none()
    }
}

impl Renderer for WgpuRenderer {
    type Output = Option<PresentableFrame>;

    fn draw(&mut self, frame: &FrameView<'_>) -> Option<PresentableFrame> {
        let gpu = self.gpu.as_mut()?;

        let texture = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::warn!("surface lost or outdated, reconfiguring");
                gpu.surface.configure(&gpu.device, &gpu.config);
                return None;
            }
            Err(e) => {
                tracing::warn!("surface error: {e}");
                return None;
            }
        };
        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.pipelines.render(&gpu.device, &gpu.queue, &view, frame);
        Some(PresentableFrame { texture, view })
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        gpu.config.width = size.width.max(1);
        gpu.config.height = size.height.max(1);
        gpu.surface.configure(&gpu.device, &gpu.config);
        gpu.pipelines
            .resize(&gpu.device, gpu.config.width, gpu.config.height);
    }

    fn surface_size(&self) -> SurfaceSize {
        self.size
    }

    fn release(&mut self) {
        if self.gpu.take().is_some() {
            tracing::info!("GPU resources released");
        }
    }
}
