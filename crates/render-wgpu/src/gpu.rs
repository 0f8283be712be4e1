use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::Vec4;
use prism_common::{GpuMeshId, ShaderHandle, TextureHandle};
use prism_render::light::{MAX_DIRECTIONAL_LIGHTS, MAX_POINT_LIGHTS};
use prism_render::mesh::validate_geometry;
use prism_render::texture::{self, CUBE_FACES};
use prism_render::{
    CubemapImage, GraphicsContext, Lighting, MaterialParams, ObjectUniforms, PipelineState,
    RenderError, ResourceFactory, ShaderProgram, ShaderStage, TextureBinding, TextureImage, Vertex,
};
use std::collections::HashMap;
use std::num::NonZeroU64;
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Distance between per-draw object blocks; the default
/// `min_uniform_buffer_offset_alignment`.
const OBJECT_STRIDE: u64 = 256;
const INITIAL_OBJECT_CAPACITY: u64 = 256;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ObjectData {
    world: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    tint: [f32; 4],
}

impl ObjectData {
    fn new(uniforms: &ObjectUniforms, tint: Vec4) -> Self {
        Self {
            world: uniforms.world.to_cols_array_2d(),
            view: uniforms.view.to_cols_array_2d(),
            projection: uniforms.projection.to_cols_array_2d(),
            tint: tint.to_array(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct DirectionalLightData {
    ambient: [f32; 4],
    diffuse: [f32; 4],
    direction: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct PointLightData {
    ambient: [f32; 4],
    diffuse: [f32; 4],
    position_range: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct LightingData {
    directional: [DirectionalLightData; MAX_DIRECTIONAL_LIGHTS],
    point: [PointLightData; MAX_POINT_LIGHTS],
    counts: [u32; 4],
}

impl From<&Lighting> for LightingData {
    fn from(lighting: &Lighting) -> Self {
        let mut data = Self::zeroed();
        for (slot, light) in data.directional.iter_mut().zip(lighting.directional()) {
            *slot = DirectionalLightData {
                ambient: light.ambient.extend(1.0).to_array(),
                diffuse: light.diffuse.extend(1.0).to_array(),
                direction: light.direction.extend(0.0).to_array(),
            };
        }
        for (slot, light) in data.point.iter_mut().zip(lighting.point()) {
            *slot = PointLightData {
                ambient: light.ambient.extend(1.0).to_array(),
                diffuse: light.diffuse.extend(1.0).to_array(),
                position_range: light.position.extend(light.range).to_array(),
            };
        }
        data.counts = [
            lighting.directional().len().min(MAX_DIRECTIONAL_LIGHTS) as u32,
            lighting.point().len().min(MAX_POINT_LIGHTS) as u32,
            0,
            0,
        ];
        data
    }
}

struct GpuMesh {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

struct GpuShader {
    module: wgpu::ShaderModule,
    program: ShaderProgram,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextureKind {
    Flat,
    Cube,
}

struct GpuTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    kind: TextureKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    vertex: ShaderHandle,
    pixel: ShaderHandle,
    state: PipelineState,
}

#[derive(Debug, Clone, Copy)]
struct PendingDraw {
    pipeline: PipelineKey,
    mesh: GpuMeshId,
    index_count: u32,
    object_offset: u32,
    material: TextureBinding,
}

/// Per-frame CPU state between `begin_frame` and `submit`: the pending
/// clear, the recorded draws and their packed object blocks.
#[derive(Debug, Default)]
struct FrameStaging {
    objects: Vec<u8>,
    draws: Vec<PendingDraw>,
    clear: Option<([f32; 4], f32)>,
}

impl FrameStaging {
    /// Append one object block padded to [`OBJECT_STRIDE`]; returns its offset.
    fn stage_object(&mut self, data: &ObjectData) -> u32 {
        let offset = self.objects.len();
        self.objects.extend_from_slice(bytemuck::bytes_of(data));
        self.objects.resize(offset + OBJECT_STRIDE as usize, 0);
        offset as u32
    }

    fn object_blocks(&self) -> u64 {
        (self.objects.len() as u64).div_ceil(OBJECT_STRIDE)
    }

    fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.draws.is_empty() && self.clear.is_none()
    }

    /// Drop everything staged so far. Buffers keep their allocation.
    fn reset(&mut self) {
        self.objects.clear();
        self.draws.clear();
        self.clear = None;
    }
}

/// Reject texture sizes the device cannot allocate before wgpu sees them.
fn check_texture_extent(
    label: &str,
    width: u32,
    height: u32,
    limits: &wgpu::Limits,
) -> Result<(), RenderError> {
    let max = limits.max_texture_dimension_2d;
    if width == 0 || height == 0 || width > max || height > max {
        return Err(RenderError::Backend(format!(
            "texture '{label}' is {width}x{height}; the device allows 1..={max} per side"
        )));
    }
    Ok(())
}

struct Layouts {
    lighting: wgpu::BindGroupLayout,
    object: wgpu::BindGroupLayout,
    surface: wgpu::BindGroupLayout,
    sky: wgpu::BindGroupLayout,
    surface_pipeline: wgpu::PipelineLayout,
    sky_pipeline: wgpu::PipelineLayout,
}

/// [`GraphicsContext`] over a wgpu device.
///
/// Binds and pushes only update CPU-side state; `draw_indexed` validates that
/// state, creates any missing pipeline or material bind group, and records
/// the draw. `submit` uploads all per-draw data in one write and replays the
/// frame into a single render pass targeting the view passed to
/// [`WgpuContext::begin_frame`].
pub struct WgpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    depth_view: wgpu::TextureView,
    layouts: Layouts,
    sampler: wgpu::Sampler,
    lighting_buffer: wgpu::Buffer,
    lighting_group: wgpu::BindGroup,
    object_buffer: wgpu::Buffer,
    object_group: wgpu::BindGroup,
    object_capacity: u64,
    white: GpuTexture,
    flat_normal: GpuTexture,
    meshes: Vec<GpuMesh>,
    shaders: Vec<GpuShader>,
    textures: Vec<GpuTexture>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    material_groups: HashMap<TextureBinding, wgpu::BindGroup>,
    state: PipelineState,
    vertex_shader: Option<ShaderHandle>,
    pixel_shader: Option<ShaderHandle>,
    uniforms: ObjectUniforms,
    material: MaterialParams,
    staging: FrameStaging,
    target: Option<wgpu::TextureView>,
    frames: u64,
}

impl WgpuContext {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let layouts = create_layouts(&device);

        let lighting_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lighting_buffer"),
            contents: bytemuck::bytes_of(&LightingData::from(&Lighting::default())),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let lighting_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lighting_bind_group"),
            layout: &layouts.lighting,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: lighting_buffer.as_entire_binding(),
            }],
        });

        let (object_buffer, object_group) =
            create_object_buffer(&device, &layouts.object, INITIAL_OBJECT_CAPACITY);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("surface_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let white = upload_flat(&device, &queue, "white", &texture::solid([255; 4]));
        let flat_normal = upload_flat(&device, &queue, "flat_normal", &texture::flat_normal());
        let depth_view = create_depth_view(&device, width, height);

        tracing::info!(?surface_format, width, height, "wgpu context ready");

        Self {
            device,
            queue,
            surface_format,
            depth_view,
            layouts,
            sampler,
            lighting_buffer,
            lighting_group,
            object_buffer,
            object_group,
            object_capacity: INITIAL_OBJECT_CAPACITY,
            white,
            flat_normal,
            meshes: Vec::new(),
            shaders: Vec::new(),
            textures: Vec::new(),
            pipelines: HashMap::new(),
            material_groups: HashMap::new(),
            state: PipelineState::Default,
            vertex_shader: None,
            pixel_shader: None,
            uniforms: ObjectUniforms {
                world: glam::Mat4::IDENTITY,
                view: glam::Mat4::IDENTITY,
                projection: glam::Mat4::IDENTITY,
            },
            material: MaterialParams {
                color_tint: Vec4::ONE,
                textures: TextureBinding::Surface {
                    diffuse: None,
                    normal_map: None,
                },
            },
            staging: FrameStaging::default(),
            target: None,
            frames: 0,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn frames_submitted(&self) -> u64 {
        self.frames
    }

    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.depth_view = create_depth_view(&self.device, width, height);
    }

    /// Set the color target for the next `submit` and drop anything a
    /// failed previous frame left staged.
    pub fn begin_frame(&mut self, target: wgpu::TextureView) {
        if !self.staging.is_empty() {
            tracing::debug!(
                draws = self.staging.draws.len(),
                "discarding draws from an unsubmitted frame"
            );
        }
        self.staging.reset();
        self.target = Some(target);
    }

    /// Run `f` inside a validation error scope, turning a captured error into
    /// [`RenderError::Backend`].
    fn scoped<T>(&self, f: impl FnOnce(&wgpu::Device) -> T) -> Result<T, RenderError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f(&self.device);
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(err) => Err(RenderError::Backend(err.to_string())),
            None => Ok(value),
        }
    }

    fn shader(&self, handle: ShaderHandle, expected: ShaderStage) -> Result<&GpuShader, RenderError> {
        let shader = self
            .shaders
            .get(handle.0 as usize)
            .ok_or(RenderError::UnknownShader(handle))?;
        let actual = shader.program.stage();
        if actual != expected {
            return Err(RenderError::ShaderStage {
                shader: handle,
                expected,
                actual,
            });
        }
        Ok(shader)
    }

    fn texture_view(&self, handle: TextureHandle, kind: TextureKind) -> Result<&wgpu::TextureView, RenderError> {
        let texture = self
            .textures
            .get(handle.0 as usize)
            .ok_or(RenderError::UnknownTexture(handle))?;
        if texture.kind != kind {
            return Err(RenderError::TextureBindingMismatch(self.state));
        }
        Ok(&texture.view)
    }

    fn ensure_pipeline(&mut self, key: PipelineKey) -> Result<(), RenderError> {
        if self.pipelines.contains_key(&key) {
            return Ok(());
        }
        let vs = self.shader(key.vertex, ShaderStage::Vertex)?;
        let ps = self.shader(key.pixel, ShaderStage::Pixel)?;
        let (layout, cull_mode, depth_write_enabled, depth_compare) = match key.state {
            PipelineState::Default => (
                &self.layouts.surface_pipeline,
                wgpu::Face::Back,
                true,
                wgpu::CompareFunction::Less,
            ),
            PipelineState::Skybox => (
                &self.layouts.sky_pipeline,
                wgpu::Face::Front,
                false,
                wgpu::CompareFunction::LessEqual,
            ),
        };
        let label = format!("{}+{}", vs.program.name(), ps.program.name());
        let format = self.surface_format;

        let pipeline = self.scoped(|device| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&label),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: &vs.module,
                    entry_point: Some(shaders::VERTEX_ENTRY),
                    compilation_options: Default::default(),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                            2 => Float32x2,
                            3 => Float32x3,
                        ],
                    }],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &ps.module,
                    entry_point: Some(shaders::PIXEL_ENTRY),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Cw,
                    cull_mode: Some(cull_mode),
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled,
                    depth_compare,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
        })?;
        tracing::debug!(pipeline = %label, state = ?key.state, "render pipeline created");
        self.pipelines.insert(key, pipeline);
        Ok(())
    }

    fn ensure_material_group(&mut self, binding: TextureBinding) -> Result<(), RenderError> {
        // Cached groups are keyed by binding alone, so check the state first.
        match (self.state, binding) {
            (PipelineState::Default, TextureBinding::Surface { .. })
            | (PipelineState::Skybox, TextureBinding::Cubemap(_)) => {}
            (state, _) => return Err(RenderError::TextureBindingMismatch(state)),
        }
        if self.material_groups.contains_key(&binding) {
            return Ok(());
        }
        let group = match (self.state, binding) {
            (PipelineState::Default, TextureBinding::Surface { diffuse, normal_map }) => {
                let diffuse = match diffuse {
                    Some(h) => self.texture_view(h, TextureKind::Flat)?,
                    None => &self.white.view,
                };
                let normal_map = match normal_map {
                    Some(h) => self.texture_view(h, TextureKind::Flat)?,
                    None => &self.flat_normal.view,
                };
                self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("surface_bind_group"),
                    layout: &self.layouts.surface,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(diffuse),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(normal_map),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(&self.sampler),
                        },
                    ],
                })
            }
            (PipelineState::Skybox, TextureBinding::Cubemap(h)) => {
                let view = self.texture_view(h, TextureKind::Cube)?;
                self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("sky_bind_group"),
                    layout: &self.layouts.sky,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(&self.sampler),
                        },
                    ],
                })
            }
            (state, _) => return Err(RenderError::TextureBindingMismatch(state)),
        };
        self.material_groups.insert(binding, group);
        Ok(())
    }

    fn ensure_object_capacity(&mut self) {
        let needed = self.staging.object_blocks();
        if needed <= self.object_capacity {
            return;
        }
        let capacity = needed.next_power_of_two();
        let (buffer, group) = create_object_buffer(&self.device, &self.layouts.object, capacity);
        self.object_buffer = buffer;
        self.object_group = group;
        self.object_capacity = capacity;
        tracing::debug!(capacity, "object buffer grown");
    }
}

impl ResourceFactory for WgpuContext {
    fn create_shader(&mut self, program: ShaderProgram) -> Result<ShaderHandle, RenderError> {
        let module = self.scoped(|device| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(program.name()),
                source: wgpu::ShaderSource::Wgsl(shaders::source(program).into()),
            })
        })?;
        self.shaders.push(GpuShader { module, program });
        tracing::debug!(shader = program.name(), "shader module created");
        Ok(ShaderHandle(self.shaders.len() as u32 - 1))
    }

    fn create_texture(&mut self, label: &str, image: &TextureImage) -> Result<TextureHandle, RenderError> {
        check_texture_extent(label, image.width(), image.height(), &self.device.limits())?;
        let queue = &self.queue;
        let texture = self.scoped(|device| upload_flat(device, queue, label, image))?;
        self.textures.push(texture);
        Ok(TextureHandle(self.textures.len() as u32 - 1))
    }

    fn create_cubemap(&mut self, label: &str, image: &CubemapImage) -> Result<TextureHandle, RenderError> {
        check_texture_extent(label, image.size(), image.size(), &self.device.limits())?;
        let queue = &self.queue;
        let (texture, view) = self.scoped(|device| {
            let texture = device.create_texture_with_data(
                queue,
                &wgpu::TextureDescriptor {
                    label: Some(label),
                    size: wgpu::Extent3d {
                        width: image.size(),
                        height: image.size(),
                        depth_or_array_layers: CUBE_FACES as u32,
                    },
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: wgpu::TextureFormat::Rgba8UnormSrgb,
                    usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                    view_formats: &[],
                },
                wgpu::util::TextureDataOrder::LayerMajor,
                image.pixels(),
            );
            let view = texture.create_view(&wgpu::TextureViewDescriptor {
                label: Some(label),
                dimension: Some(wgpu::TextureViewDimension::Cube),
                ..Default::default()
            });
            (texture, view)
        })?;
        self.textures.push(GpuTexture {
            _texture: texture,
            view,
            kind: TextureKind::Cube,
        });
        Ok(TextureHandle(self.textures.len() as u32 - 1))
    }
}

impl GraphicsContext for WgpuContext {
    fn create_mesh(&mut self, vertices: &[Vertex], indices: &[u32]) -> Result<GpuMeshId, RenderError> {
        validate_geometry(vertices, indices)?;
        let (vertex_buffer, index_buffer) = self.scoped(|device| {
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_vertices"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_indices"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            (vertex_buffer, index_buffer)
        })?;
        self.meshes.push(GpuMesh {
            vertices: vertex_buffer,
            indices: index_buffer,
            index_count: indices.len() as u32,
        });
        Ok(GpuMeshId(self.meshes.len() as u32 - 1))
    }

    fn clear(&mut self, color: [f32; 4], depth: f32) {
        self.staging.clear = Some((color, depth));
    }

    fn set_pipeline_state(&mut self, state: PipelineState) {
        self.state = state;
    }

    fn bind_vertex_shader(&mut self, shader: ShaderHandle) {
        self.vertex_shader = Some(shader);
    }

    fn bind_pixel_shader(&mut self, shader: ShaderHandle) {
        self.pixel_shader = Some(shader);
    }

    fn push_object_uniforms(&mut self, uniforms: &ObjectUniforms) {
        self.uniforms = *uniforms;
    }

    fn push_material(&mut self, params: &MaterialParams) {
        self.material = *params;
    }

    fn push_lighting(&mut self, lighting: &Lighting) {
        self.queue.write_buffer(
            &self.lighting_buffer,
            0,
            bytemuck::bytes_of(&LightingData::from(lighting)),
        );
    }

    fn draw_indexed(&mut self, mesh: GpuMeshId, index_count: u32) -> Result<(), RenderError> {
        let gpu_mesh = self
            .meshes
            .get(mesh.0 as usize)
            .ok_or(RenderError::UnknownGpuMesh(mesh))?;
        if index_count > gpu_mesh.index_count {
            return Err(RenderError::IndexOutOfRange {
                index: index_count,
                vertex_count: gpu_mesh.index_count as usize,
            });
        }
        let key = PipelineKey {
            vertex: self
                .vertex_shader
                .ok_or(RenderError::ShaderNotBound(ShaderStage::Vertex))?,
            pixel: self
                .pixel_shader
                .ok_or(RenderError::ShaderNotBound(ShaderStage::Pixel))?,
            state: self.state,
        };
        self.ensure_pipeline(key)?;
        let material = self.material.textures;
        self.ensure_material_group(material)?;
        let object_offset = self
            .staging
            .stage_object(&ObjectData::new(&self.uniforms, self.material.color_tint));
        self.staging.draws.push(PendingDraw {
            pipeline: key,
            mesh,
            index_count,
            object_offset,
            material,
        });
        Ok(())
    }

    fn submit(&mut self) -> Result<(), RenderError> {
        let Some(target) = self.target.take() else {
            self.staging.reset();
            return Err(RenderError::NoFrameTarget);
        };
        self.ensure_object_capacity();
        if !self.staging.objects.is_empty() {
            self.queue
                .write_buffer(&self.object_buffer, 0, &self.staging.objects);
        }

        let (color_load, depth_load) = match self.staging.clear.take() {
            Some((c, depth)) => (
                wgpu::LoadOp::Clear(wgpu::Color {
                    r: c[0] as f64,
                    g: c[1] as f64,
                    b: c[2] as f64,
                    a: c[3] as f64,
                }),
                wgpu::LoadOp::Clear(depth),
            ),
            None => (wgpu::LoadOp::Load, wgpu::LoadOp::Load),
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("frame_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            let mut current: Option<PipelineKey> = None;
            for draw in &self.staging.draws {
                let (Some(pipeline), Some(mesh), Some(material)) = (
                    self.pipelines.get(&draw.pipeline),
                    self.meshes.get(draw.mesh.0 as usize),
                    self.material_groups.get(&draw.material),
                ) else {
                    tracing::warn!(?draw, "skipping draw with missing GPU state");
                    continue;
                };
                if current != Some(draw.pipeline) {
                    pass.set_pipeline(pipeline);
                    pass.set_bind_group(0, &self.lighting_group, &[]);
                    current = Some(draw.pipeline);
                }
                pass.set_bind_group(1, &self.object_group, &[draw.object_offset]);
                pass.set_bind_group(2, material, &[]);
                pass.set_vertex_buffer(0, mesh.vertices.slice(..));
                pass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..draw.index_count, 0, 0..1);
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        self.staging.reset();
        self.frames += 1;
        Ok(())
    }
}

fn create_layouts(device: &wgpu::Device) -> Layouts {
    let uniform_entry = |dynamic: bool, size: u64| wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size: NonZeroU64::new(size),
        },
        count: None,
    };
    let texture_entry = |binding: u32, view_dimension: wgpu::TextureViewDimension| {
        wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension,
                multisampled: false,
            },
            count: None,
        }
    };
    let sampler_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    };

    let lighting = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("lighting_layout"),
        entries: &[uniform_entry(false, std::mem::size_of::<LightingData>() as u64)],
    });
    let object = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("object_layout"),
        entries: &[uniform_entry(true, std::mem::size_of::<ObjectData>() as u64)],
    });
    let surface = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("surface_layout"),
        entries: &[
            texture_entry(0, wgpu::TextureViewDimension::D2),
            texture_entry(1, wgpu::TextureViewDimension::D2),
            sampler_entry(2),
        ],
    });
    let sky = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("sky_layout"),
        entries: &[
            texture_entry(0, wgpu::TextureViewDimension::Cube),
            sampler_entry(1),
        ],
    });

    let surface_pipeline = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("surface_pipeline_layout"),
        bind_group_layouts: &[&lighting, &object, &surface],
        push_constant_ranges: &[],
    });
    let sky_pipeline = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("sky_pipeline_layout"),
        bind_group_layouts: &[&lighting, &object, &sky],
        push_constant_ranges: &[],
    });

    Layouts {
        lighting,
        object,
        surface,
        sky,
        surface_pipeline,
        sky_pipeline,
    }
}

fn create_object_buffer(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    capacity: u64,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("object_buffer"),
        size: capacity * OBJECT_STRIDE,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("object_bind_group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(std::mem::size_of::<ObjectData>() as u64),
            }),
        }],
    });
    (buffer, group)
}

fn upload_flat(device: &wgpu::Device, queue: &wgpu::Queue, label: &str, image: &TextureImage) -> GpuTexture {
    let format = if image.is_srgb() {
        wgpu::TextureFormat::Rgba8UnormSrgb
    } else {
        wgpu::TextureFormat::Rgba8Unorm
    };
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: image.width(),
                height: image.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        image.pixels(),
    );
    let view = texture.create_view(&Default::default());
    GpuTexture {
        _texture: texture,
        view,
        kind: TextureKind::Flat,
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}
