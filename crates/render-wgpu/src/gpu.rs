use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use orbitscene_common::Transform;
use orbitscene_render::mesh::{self, MeshData};
use orbitscene_render::{FrameView, ShadingOptions};
use orbitscene_scene::{Geometry, LightKind, Material, Scene, ShadowParams};
use wgpu::util::DeviceExt;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const SHADOW_BIAS: f32 = 0.0015;

/// Per-frame uniforms shared by the lit and shadow passes.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct Globals {
    view_proj: [[f32; 4]; 4],
    light_view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    ambient: [f32; 4],
    key_dir: [f32; 4],
    key_color: [f32; 4],
    point_pos: [f32; 4],
    point_color: [f32; 4],
    fog_color: [f32; 4],
    params: [f32; 4],
}

fn rgb4(c: [f32; 3]) -> [f32; 4] {
    [c[0], c[1], c[2], 1.0]
}

fn vec4(v: Vec3) -> [f32; 4] {
    [v.x, v.y, v.z, 0.0]
}

impl Globals {
    pub(crate) fn from_frame(frame: &FrameView<'_>, shadow: &ShadowParams) -> Self {
        let scene = frame.scene;
        let scale = frame.shading.light_scale;
        let rig = scene.lights();

        let key = rig.directional();
        let key_dir = match key.kind {
            LightKind::Directional { position, .. } => position.normalize_or(Vec3::Y),
            _ => Vec3::Y,
        };
        let point = rig.point();
        let point_pos = match point.kind {
            LightKind::Point { position } => position,
            _ => Vec3::ZERO,
        };
        let fog = scene.fog();

        Self {
            view_proj: frame.camera.view_projection().to_cols_array_2d(),
            light_view_proj: key
                .shadow_view_projection()
                .unwrap_or(Mat4::IDENTITY)
                .to_cols_array_2d(),
            camera_pos: vec4(frame.camera.position),
            ambient: rgb4(rig.ambient().radiance(scale)),
            key_dir: vec4(key_dir),
            key_color: rgb4(key.radiance(scale)),
            point_pos: vec4(point_pos),
            point_color: rgb4(point.radiance(scale)),
            fog_color: rgb4(fog.color.to_linear()),
            params: [
                fog.near,
                fog.far,
                1.0 / shadow.map_size.max(1) as f32,
                SHADOW_BIAS,
            ],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

/// Model matrix and surface parameters for one drawable.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
    emissive: [f32; 4],
    surface: [f32; 4],
}

impl InstanceData {
    pub(crate) fn new(transform: &Transform, material: &Material, receive_shadow: bool) -> Self {
        let cols = transform.matrix().to_cols_array_2d();
        let [er, eg, eb] = material.emissive().to_linear();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color: rgb4(material.color().to_linear()),
            emissive: [er, eg, eb, material.shininess()],
            surface: [
                material.specular(),
                if receive_shadow { 1.0 } else { 0.0 },
                0.0,
                0.0,
            ],
        }
    }

    /// One instance per object in scene order, then the ground.
    pub(crate) fn for_scene(scene: &Scene) -> Vec<Self> {
        let ground = scene.ground();
        scene
            .objects()
            .iter()
            .map(|o| Self::new(&o.transform, o.material(), o.receive_shadow))
            .chain(std::iter::once(Self::new(
                &ground.transform,
                &ground.material,
                ground.receive_shadow,
            )))
            .collect()
    }
}

/// Vertex, triangle and edge buffers for one geometry.
struct GpuMesh {
    vertices: wgpu::Buffer,
    triangles: wgpu::Buffer,
    triangle_count: u32,
    edges: wgpu::Buffer,
    edge_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, geometry: &Geometry) -> Self {
        let data: MeshData = mesh::build(geometry);
        let vertices: Vec<Vertex> = data
            .positions
            .iter()
            .zip(&data.normals)
            .map(|(&position, &normal)| Vertex { position, normal })
            .collect();
        let edge_indices = data.edge_indices();

        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let triangles = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_triangles"),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let edges = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_edges"),
            contents: bytemuck::cast_slice(&edge_indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertices,
            triangles,
            triangle_count: data.indices.len() as u32,
            edges,
            edge_count: edge_indices.len() as u32,
        }
    }
}

fn vertex_layouts() -> [wgpu::VertexBufferLayout<'static>; 2] {
    const VERTEX_ATTRS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
    const INSTANCE_ATTRS: [wgpu::VertexAttribute; 7] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
        8 => Float32x4,
    ];
    [
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &VERTEX_ATTRS,
        },
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &INSTANCE_ATTRS,
        },
    ]
}

/// Pipelines, buffers and attachments for drawing a [`Scene`].
pub(crate) struct ScenePipelines {
    lit_pipeline: wgpu::RenderPipeline,
    wire_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    shadow_bind_group: wgpu::BindGroup,
    shadow_view: wgpu::TextureView,
    shadow: ShadowParams,
    instance_buffer: wgpu::Buffer,
    /// Objects in scene order, then the ground. Uploaded on first draw.
    meshes: Vec<GpuMesh>,
    depth_view: wgpu::TextureView,
}

impl ScenePipelines {
    pub(crate) fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        shadow: ShadowParams,
    ) -> Self {
        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals_buffer"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let shadow_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shadow_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });
        let shadow_view = create_depth_target(device, "shadow_map", shadow.map_size, shadow.map_size, true);
        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });
        let shadow_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow_bind_group"),
            layout: &shadow_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&shadow_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&shadow_sampler),
                },
            ],
        });

        let lit_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lit_pipeline_layout"),
            bind_group_layouts: &[&globals_layout, &shadow_layout],
            push_constant_ranges: &[],
        });
        let shadow_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shadow_pipeline_layout"),
            bind_group_layouts: &[&globals_layout],
            push_constant_ranges: &[],
        });

        let world_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("world_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::WORLD_SHADER.into()),
        });
        let shadow_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shadow_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SHADOW_SHADER.into()),
        });

        let layouts = vertex_layouts();
        let lit_pipeline_for = |label: &str, topology: wgpu::PrimitiveTopology, cull_mode| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&lit_layout),
                vertex: wgpu::VertexState {
                    module: &world_shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &layouts,
                },
                fragment: Some(wgpu::FragmentState {
                    module: &world_shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    cull_mode,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
        };
        let lit_pipeline = lit_pipeline_for(
            "lit_pipeline",
            wgpu::PrimitiveTopology::TriangleList,
            Some(wgpu::Face::Back),
        );
        let wire_pipeline =
            lit_pipeline_for("wire_pipeline", wgpu::PrimitiveTopology::LineList, None);

        let shadow_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shadow_pipeline"),
            layout: Some(&shadow_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shadow_shader,
                entry_point: Some("vs_shadow"),
                compilation_options: Default::default(),
                buffers: &layouts,
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: Default::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (orbitscene_scene::OBJECT_COUNT as u64 + 1)
                * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_view = create_depth_target(device, "depth_texture", width, height, false);

        Self {
            lit_pipeline,
            wire_pipeline,
            shadow_pipeline,
            globals_buffer,
            globals_bind_group,
            shadow_bind_group,
            shadow_view,
            shadow,
            instance_buffer,
            meshes: Vec::new(),
            depth_view,
        }
    }

    pub(crate) fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_view = create_depth_target(device, "depth_texture", width, height, false);
    }

    fn ensure_meshes(&mut self, device: &wgpu::Device, scene: &Scene) {
        if !self.meshes.is_empty() {
            return;
        }
        self.meshes = scene
            .objects()
            .iter()
            .map(|o| o.geometry())
            .chain(std::iter::once(&scene.ground().geometry))
            .map(|g| GpuMesh::upload(device, g))
            .collect();
        tracing::debug!(meshes = self.meshes.len(), "uploaded scene meshes");
    }

    /// Record the shadow and lit passes for one frame into `view`.
    pub(crate) fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        frame: &FrameView<'_>,
    ) {
        let scene = frame.scene;
        self.ensure_meshes(device, scene);

        let globals = Globals::from_frame(frame, &self.shadow);
        queue.write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
        let instances = InstanceData::for_scene(scene);
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));

        let casters: Vec<u32> = scene
            .objects()
            .iter()
            .enumerate()
            .filter(|(_, o)| o.cast_shadow)
            .map(|(i, _)| i as u32)
            .collect();

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("scene_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shadow_pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            pass.set_pipeline(&self.shadow_pipeline);
            pass.set_bind_group(0, &self.globals_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            for &i in &casters {
                let mesh = &self.meshes[i as usize];
                pass.set_vertex_buffer(0, mesh.vertices.slice(..));
                pass.set_index_buffer(mesh.triangles.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.triangle_count, 0, i..i + 1);
            }
        }

        {
            let [r, g, b] = scene.background().to_linear();
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("lit_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            pass.set_bind_group(0, &self.globals_bind_group, &[]);
            pass.set_bind_group(1, &self.shadow_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));

            let ground = self.meshes.len() as u32 - 1;
            for (i, mesh) in self.meshes.iter().enumerate() {
                let i = i as u32;
                pass.set_vertex_buffer(0, mesh.vertices.slice(..));
                if wire_enabled(&frame.shading, i == ground) {
                    pass.set_pipeline(&self.wire_pipeline);
                    pass.set_index_buffer(mesh.edges.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..mesh.edge_count, 0, i..i + 1);
                } else {
                    pass.set_pipeline(&self.lit_pipeline);
                    pass.set_index_buffer(mesh.triangles.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..mesh.triangle_count, 0, i..i + 1);
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}

/// The ground plane stays solid in wireframe mode.
fn wire_enabled(shading: &ShadingOptions, is_ground: bool) -> bool {
    shading.wireframe && !is_ground
}

fn create_depth_target(
    device: &wgpu::Device,
    label: &str,
    width: u32,
    height: u32,
    sampled: bool,
) -> wgpu::TextureView {
    let mut usage = wgpu::TextureUsages::RENDER_ATTACHMENT;
    if sampled {
        usage |= wgpu::TextureUsages::TEXTURE_BINDING;
    }
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbitscene_common::SurfaceSize;
    use orbitscene_render::PerspectiveCamera;
    use orbitscene_scene::OBJECT_COUNT;

    fn frame<'a>(scene: &'a Scene, camera: &'a PerspectiveCamera, light_scale: f32) -> FrameView<'a> {
        FrameView {
            scene,
            camera,
            shading: ShadingOptions {
                wireframe: false,
                light_scale,
            },
        }
    }

    #[test]
    fn uniform_layouts_match_wgsl() {
        // 2 mat4 + 8 vec4
        assert_eq!(std::mem::size_of::<Globals>(), 256);
        // 7 vec4
        assert_eq!(std::mem::size_of::<InstanceData>(), 112);
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
    }

    #[test]
    fn light_scale_multiplies_radiance() {
        let scene = Scene::build();
        let camera = PerspectiveCamera::for_surface(SurfaceSize::new(800, 600));
        let shadow = ShadowParams::default();
        let full = Globals::from_frame(&frame(&scene, &camera, 1.0), &shadow);
        let double = Globals::from_frame(&frame(&scene, &camera, 2.0), &shadow);
        let dark = Globals::from_frame(&frame(&scene, &camera, 0.0), &shadow);

        assert!((full.ambient[0] - 0.6).abs() < 1e-6);
        assert!((double.key_color[1] - 2.0 * full.key_color[1]).abs() < 1e-6);
        assert_eq!(dark.point_color[..3], [0.0, 0.0, 0.0]);
        // fog is not a light
        assert_eq!(dark.fog_color, full.fog_color);
    }

    #[test]
    fn globals_carry_fog_and_shadow_texel() {
        let scene = Scene::build();
        let camera = PerspectiveCamera::for_surface(SurfaceSize::new(800, 600));
        let g = Globals::from_frame(&frame(&scene, &camera, 1.0), &ShadowParams::default());
        assert_eq!(g.params[0], 100.0);
        assert_eq!(g.params[1], 1000.0);
        assert!((g.params[2] - 1.0 / 2048.0).abs() < 1e-9);
        let dir = Vec3::new(g.key_dir[0], g.key_dir[1], g.key_dir[2]);
        assert!(dir.abs_diff_eq(Vec3::ONE.normalize(), 1e-6));
    }

    #[test]
    fn instances_cover_objects_then_ground() {
        let scene = Scene::build();
        let instances = InstanceData::for_scene(&scene);
        assert_eq!(instances.len(), OBJECT_COUNT + 1);

        let cube = &instances[0];
        assert_eq!(cube.model_3, [-4.0, 0.0, 0.0, 1.0]);
        assert_eq!(cube.emissive[3], 100.0);

        let ground = &instances[OBJECT_COUNT];
        assert_eq!(ground.model_3, [0.0, -6.0, 0.0, 1.0]);
        assert_eq!(ground.surface[1], 1.0);
    }

    #[test]
    fn wireframe_skips_ground() {
        let wire = ShadingOptions {
            wireframe: true,
            light_scale: 1.0,
        };
        assert!(wire_enabled(&wire, false));
        assert!(!wire_enabled(&wire, true));
        assert!(!wire_enabled(&ShadingOptions::default(), false));
    }
}
