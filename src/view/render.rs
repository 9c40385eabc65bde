use wgpu::util::DeviceExt;
use wgpu::*;

use crate::controller::{LightingUniform, TransformUniform};
use crate::model::Mesh;
use crate::view::shader::ShaderProgramSpec;
use crate::view::GpuContext;

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Mesh buffers as the mesh shader consumes them: positions and indices are
/// read from storage, normals stream one per corner.
pub struct GpuMesh {
    pub position_buffer: Buffer,
    pub normal_buffer: Buffer,
    pub index_buffer: Buffer,
    pub corner_count: u32,
}

impl GpuMesh {
    pub fn upload(device: &Device, mesh: &Mesh) -> Self {
        // Storage bindings must not be empty; a mesh without faces still gets
        // a placeholder element and simply draws nothing.
        let positions: &[f32] = if mesh.vertices.is_empty() { &[0.0; 3] } else { mesh.flat_vertices() };
        let normals: &[f32] = if mesh.normals.is_empty() { &[0.0; 3] } else { mesh.flat_normals() };
        let indices: &[u32] = if mesh.indices.is_empty() { &[0] } else { &mesh.indices };

        let position_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
            label: Some("mesh_positions"),
            contents: bytemuck::cast_slice(positions),
            usage: BufferUsages::STORAGE,
        });
        let normal_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
            label: Some("mesh_normals"),
            contents: bytemuck::cast_slice(normals),
            usage: BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
            label: Some("mesh_indices"),
            contents: bytemuck::cast_slice(indices),
            usage: BufferUsages::STORAGE,
        });

        Self {
            position_buffer,
            normal_buffer,
            index_buffer,
            corner_count: mesh.corner_count() as u32,
        }
    }
}

/// Uniform buffers plus the single bind group the mesh program uses
pub struct SceneResources {
    pub transform_buffer: Buffer,
    pub lighting_buffer: Buffer,
    pub bind_group_layout: BindGroupLayout,
    pub bind_group: BindGroup,
}

pub struct PipelineResources {
    pub pipeline: RenderPipeline,
    pub wireframe_pipeline: Option<RenderPipeline>,
}

pub fn create_depth_texture(device: &Device, width: u32, height: u32) -> (Texture, TextureView) {
    let depth_texture = device.create_texture(&TextureDescriptor {
        label: Some("depth_texture"),
        size: Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

pub fn create_scene_resources(
    device: &Device,
    program: &ShaderProgramSpec,
    mesh: &GpuMesh,
    transforms: &TransformUniform,
    lighting: &LightingUniform,
) -> SceneResources {
    let transform_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
        label: Some("transform_buffer"),
        contents: bytemuck::bytes_of(transforms),
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
    });
    let lighting_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
        label: Some("lighting_buffer"),
        contents: bytemuck::bytes_of(lighting),
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
    });

    let layout_entries = program.bind_group_layout_entries(0);
    let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("scene_bind_group_layout"),
        entries: &layout_entries,
    });

    let bind_group = device.create_bind_group(&BindGroupDescriptor {
        label: Some("scene_bind_group"),
        layout: &bind_group_layout,
        entries: &[
            BindGroupEntry { binding: 0, resource: transform_buffer.as_entire_binding() },
            BindGroupEntry { binding: 1, resource: lighting_buffer.as_entire_binding() },
            BindGroupEntry { binding: 2, resource: mesh.position_buffer.as_entire_binding() },
            BindGroupEntry { binding: 3, resource: mesh.index_buffer.as_entire_binding() },
        ],
    });

    SceneResources { transform_buffer, lighting_buffer, bind_group_layout, bind_group }
}

/// Build the fill pipeline, and a line pipeline when the device supports it.
/// `program` must already have passed [`ShaderProgramSpec::validate`].
pub fn create_mesh_pipelines(
    device: &Device,
    format: TextureFormat,
    bind_group_layout: &BindGroupLayout,
    program: &ShaderProgramSpec,
) -> PipelineResources {
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some(program.label),
        source: ShaderSource::Wgsl(program.source.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("mesh_pipeline_layout"),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    let (attributes, stride) = program.vertex_attributes();
    let build = |label: &str, polygon_mode: PolygonMode| {
        device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some(program.vertex_entry),
                buffers: &[VertexBufferLayout {
                    array_stride: stride,
                    step_mode: VertexStepMode::Vertex,
                    attributes: &attributes,
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some(program.fragment_entry),
                targets: &[Some(ColorTargetState { format, blend: Some(BlendState::REPLACE), write_mask: ColorWrites::ALL })],
                compilation_options: Default::default(),
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                // OBJ winding is not reliable, draw both sides
                cull_mode: None,
                polygon_mode,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: CompareFunction::Less,
                stencil: StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
            multiview: None,
            cache: None,
        })
    };

    let pipeline = build("mesh_pipeline", PolygonMode::Fill);
    let wireframe_pipeline = device
        .features()
        .contains(Features::POLYGON_MODE_LINE)
        .then(|| build("mesh_wireframe_pipeline", PolygonMode::Line));

    PipelineResources { pipeline, wireframe_pipeline }
}

/// egui output ready to be painted over the scene
pub struct OverlayFrame {
    pub primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub screen_descriptor: egui_wgpu::ScreenDescriptor,
}

/// Everything needed to draw one frame
pub struct RenderState {
    pub pipelines: PipelineResources,
    pub scene: SceneResources,
    pub mesh: GpuMesh,
    pub depth_texture: Texture,
    pub depth_view: TextureView,
    pub clear_color: Color,
    pub wireframe_mode: bool,
    pub egui_renderer: egui_wgpu::Renderer,
}

impl RenderState {
    pub fn new(
        gpu: &GpuContext,
        program: &ShaderProgramSpec,
        mesh: &Mesh,
        transforms: &TransformUniform,
        lighting: &LightingUniform,
        clear_color: [f64; 4],
    ) -> Self {
        let device = gpu.device.as_ref();
        let mesh = GpuMesh::upload(device, mesh);
        let scene = create_scene_resources(device, program, &mesh, transforms, lighting);
        let pipelines = create_mesh_pipelines(device, gpu.format, &scene.bind_group_layout, program);
        let (depth_texture, depth_view) = create_depth_texture(device, gpu.config.width, gpu.config.height);
        let egui_renderer = egui_wgpu::Renderer::new(device, gpu.format, egui_wgpu::RendererOptions::default());

        let [r, g, b, a] = clear_color;
        Self {
            pipelines,
            scene,
            mesh,
            depth_texture,
            depth_view,
            clear_color: Color { r, g, b, a },
            wireframe_mode: false,
            egui_renderer,
        }
    }

    pub fn resize(&mut self, device: &Device, width: u32, height: u32) {
        let (depth_texture, depth_view) = create_depth_texture(device, width, height);
        self.depth_texture = depth_texture;
        self.depth_view = depth_view;
    }

    /// Flip wireframe mode; stays off when the device has no line pipeline
    pub fn toggle_wireframe(&mut self) -> bool {
        self.wireframe_mode = !self.wireframe_mode && self.pipelines.wireframe_pipeline.is_some();
        self.wireframe_mode
    }

    pub fn write_transforms(&self, queue: &Queue, transforms: &TransformUniform) {
        queue.write_buffer(&self.scene.transform_buffer, 0, bytemuck::bytes_of(transforms));
    }

    pub fn draw_frame(&mut self, gpu: &GpuContext, overlay: Option<OverlayFrame>) -> Result<(), SurfaceError> {
        let device = gpu.device.as_ref();
        let queue = gpu.queue.as_ref();

        let frame = gpu.surface.get_current_texture()?;
        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("mesh_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(self.clear_color),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if self.mesh.corner_count > 0 {
                let pipeline = match (&self.pipelines.wireframe_pipeline, self.wireframe_mode) {
                    (Some(wireframe), true) => wireframe,
                    _ => &self.pipelines.pipeline,
                };
                rp.set_pipeline(pipeline);
                rp.set_bind_group(0, &self.scene.bind_group, &[]);
                rp.set_vertex_buffer(0, self.mesh.normal_buffer.slice(..));
                rp.draw(0..self.mesh.corner_count, 0..1);
            }
        }

        let mut command_buffers = Vec::new();
        if let Some(overlay) = overlay {
            for (id, image_delta) in &overlay.textures_delta.set {
                self.egui_renderer.update_texture(device, queue, *id, image_delta);
            }
            command_buffers = self.egui_renderer.update_buffers(
                device,
                queue,
                &mut encoder,
                &overlay.primitives,
                &overlay.screen_descriptor,
            );

            {
                let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                    label: Some("egui_render_pass"),
                    color_attachments: &[Some(RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: Operations {
                            load: LoadOp::Load,
                            store: StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });

                self.egui_renderer.render(
                    &mut egui_pass.forget_lifetime(),
                    &overlay.primitives,
                    &overlay.screen_descriptor,
                );
            }

            for id in &overlay.textures_delta.free {
                self.egui_renderer.free_texture(id);
            }
        }

        command_buffers.push(encoder.finish());
        queue.submit(command_buffers);
        frame.present();
        Ok(())
    }
}
