use std::time::Instant;

use fnv::FnvHashMap;
use glam::{Mat4, Quat, Vec2, Vec3};
use rand::prelude::*;
use wgpu::util::DeviceExt;
use winit::{event::*, event_loop::EventLoop, window::WindowBuilder};

use map_core::{
    DebugDraw, EntityId, Extent, IconId, MapConfig, MarkerHost, MarkerId, MiniMap, PrototypeId,
    SceneWorld, SurfaceBinding, SurfaceId, Transform3, VolumeKind,
};

// Minimap panel placement and look
const PANEL_SIZE: f32 = 240.0; // display units == pixels here
const PANEL_MARGIN: f32 = 24.0;
const PANEL_BORDER: f32 = 2.0;
const DOT_SIZE: f32 = 10.0;

// Simulated world
const ARENA_SIZE: f32 = 40.0; // side length of the anchor's solid volume
const SCOUT_COUNT: usize = 5;
const SCOUT_SPEED: f32 = 4.0; // world units per second
const SCOUT_TURN_RATE: f32 = 1.6; // radians of heading drift per second
const PLAYER_RADIUS: f32 = 12.0;
const PLAYER_ANGULAR_SPEED: f32 = 0.4;

const CENTERED_SURFACE: SurfaceId = SurfaceId(0);
const PERIPHERAL_SURFACE: SurfaceId = SurfaceId(1);

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct InstanceData {
    pos: [f32; 2],
    rot: f32,
    shape: f32, // 0 = quad, 1 = dot
    scale: [f32; 2],
    color: [f32; 4],
}

const MAX_INSTANCES: usize = 64;

// ---------------- Marker host over instanced quads ----------------

struct MarkerVisual {
    surface: SurfaceId,
    icon: Option<IconId>,
    position: Vec2,
    rotation: f32,
}

/// UI layer for the map: markers are quad instances grouped under two
/// logical surfaces that share one on-screen panel.
#[derive(Default)]
struct QuadHost {
    next_marker: u64,
    markers: FnvHashMap<MarkerId, MarkerVisual>,
    surface_local: FnvHashMap<SurfaceId, (Vec2, f32)>,
}

impl MarkerHost for QuadHost {
    fn create_marker(
        &mut self,
        surface: SurfaceId,
        _prototype: PrototypeId,
        icon: Option<IconId>,
    ) -> MarkerId {
        let marker = MarkerId(self.next_marker);
        self.next_marker += 1;
        self.markers.insert(
            marker,
            MarkerVisual {
                surface,
                icon,
                position: Vec2::ZERO,
                rotation: 0.0,
            },
        );
        marker
    }

    fn destroy_marker(&mut self, marker: MarkerId) {
        self.markers.remove(&marker);
    }

    fn set_marker_transform(&mut self, marker: MarkerId, position: Vec2, rotation: f32) {
        if let Some(visual) = self.markers.get_mut(&marker) {
            visual.position = position;
            visual.rotation = rotation;
        }
    }

    fn set_surface_transform(&mut self, surface: SurfaceId, position: Vec2, rotation: f32) {
        self.surface_local.insert(surface, (position, rotation));
    }
}

fn icon_color(icon: Option<IconId>) -> [f32; 4] {
    match icon {
        Some(IconId(1)) => [0.95, 0.85, 0.25, 1.0], // player, amber
        Some(IconId(2)) => [0.9, 0.3, 0.3, 1.0],    // scouts, red
        _ => [0.7, 0.7, 0.75, 1.0],
    }
}

/// Diagnostic sink for `render_debug`; the demo just logs the box.
struct GizmoLog;

impl DebugDraw for GizmoLog {
    fn wire_box(&mut self, center: Vec3, size: Vec3) {
        log::info!(
            "[map] reference extent center=({:.1},{:.1},{:.1}) size=({:.1},{:.1},{:.1})",
            center.x,
            center.y,
            center.z,
            size.x,
            size.y,
            size.z
        );
    }
}

// ---------------- Simulated world ----------------

struct Scout {
    entity: EntityId,
    heading: f32,
    rng: StdRng,
}

struct Demo {
    world: SceneWorld,
    map: MiniMap,
    host: QuadHost,
    player: EntityId,
    scouts: Vec<Scout>,
    t: f32,
}

impl Demo {
    fn new(seed: u64) -> anyhow::Result<Self> {
        let mut world = SceneWorld::new();

        let anchor = world.spawn(Transform3::IDENTITY);
        world.attach_volume(
            anchor,
            VolumeKind::Solid,
            Extent::from_center_size(Vec3::ZERO, Vec3::new(ARENA_SIZE, 4.0, ARENA_SIZE)),
        );

        let player = world.spawn(Transform3::from_translation(Vec3::new(
            PLAYER_RADIUS,
            0.0,
            0.0,
        )));
        let scouts: Vec<Scout> = (0..SCOUT_COUNT)
            .map(|i| {
                // per-scout RNGs derived from the base seed, like voice seeding
                let mix = seed ^ (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
                let mut rng = StdRng::seed_from_u64(mix);
                let heading = rng.gen_range(0.0..std::f32::consts::TAU);
                let position = Vec3::new(
                    rng.gen_range(-12.0..12.0),
                    0.0,
                    rng.gen_range(-12.0..12.0),
                );
                Scout {
                    entity: world.spawn(Transform3::from_translation(position)),
                    heading,
                    rng,
                }
            })
            .collect();

        let mut map = MiniMap::new(MapConfig {
            anchor: Some(anchor),
            centered_surface: Some(SurfaceBinding::new(CENTERED_SURFACE, Vec2::splat(PANEL_SIZE))),
            peripheral_surface: Some(SurfaceBinding::new(
                PERIPHERAL_SURFACE,
                Vec2::splat(PANEL_SIZE),
            )),
            default_icon: None,
            marker_prototype: Some(PrototypeId(0)),
        });
        map.activate(&world);
        map.render_debug(&mut GizmoLog);

        let mut host = QuadHost::default();
        map.follow_centered(&world, &mut host, player, Some(IconId(1)))?;
        for scout in &scouts {
            map.follow(&mut host, scout.entity, Some(IconId(2)))?;
        }
        log::info!(
            "[demo] tracking 1 centered + {} peripheral entities",
            map.peripheral_count()
        );

        Ok(Self {
            world,
            map,
            host,
            player,
            scouts,
            t: 0.0,
        })
    }

    fn step(&mut self, dt: f32) {
        self.t += dt;

        // player runs a circle, facing along the tangent
        let angle = self.t * PLAYER_ANGULAR_SPEED;
        let position = Vec3::new(angle.cos(), 0.0, angle.sin()) * PLAYER_RADIUS;
        self.world.set_transform(
            self.player,
            Transform3::from_translation_rotation(
                position,
                Quat::from_rotation_y(angle + std::f32::consts::FRAC_PI_2),
            ),
        );

        // scouts wander with drifting headings, turning back at the walls
        let half = ARENA_SIZE * 0.5 - 1.0;
        for scout in &mut self.scouts {
            scout.heading += scout.rng.gen_range(-1.0..=1.0) * SCOUT_TURN_RATE * dt;
            let dir = Vec3::new(scout.heading.cos(), 0.0, scout.heading.sin());
            let mut position =
                self.world.translation(scout.entity).unwrap_or(Vec3::ZERO) + dir * SCOUT_SPEED * dt;
            if position.x.abs() > half || position.z.abs() > half {
                position.x = position.x.clamp(-half, half);
                position.z = position.z.clamp(-half, half);
                scout.heading += std::f32::consts::PI;
            }
            self.world.set_transform(
                scout.entity,
                Transform3::from_translation_rotation(
                    position,
                    Quat::from_rotation_y(scout.heading),
                ),
            );
        }

        self.map.tick(&self.world, &mut self.host);
    }

    /// Flattens the host's marker state into quad instances.
    fn instances(&self, width: f32, height: f32) -> Vec<InstanceData> {
        let panel = Vec2::new(
            width * 0.5 - PANEL_SIZE * 0.5 - PANEL_MARGIN,
            -height * 0.5 + PANEL_SIZE * 0.5 + PANEL_MARGIN,
        );
        let mut out = Vec::with_capacity(8 + self.host.markers.len());

        // panel background and border
        out.push(InstanceData {
            pos: panel.to_array(),
            rot: 0.0,
            shape: 0.0,
            scale: [PANEL_SIZE, PANEL_SIZE],
            color: [0.05, 0.07, 0.1, 0.85],
        });
        let edge = PANEL_SIZE * 0.5;
        for (offset, scale) in [
            (Vec2::new(0.0, edge), [PANEL_SIZE, PANEL_BORDER]),
            (Vec2::new(0.0, -edge), [PANEL_SIZE, PANEL_BORDER]),
            (Vec2::new(edge, 0.0), [PANEL_BORDER, PANEL_SIZE]),
            (Vec2::new(-edge, 0.0), [PANEL_BORDER, PANEL_SIZE]),
        ] {
            out.push(InstanceData {
                pos: (panel + offset).to_array(),
                rot: 0.0,
                shape: 0.0,
                scale,
                color: [0.35, 0.45, 0.6, 1.0],
            });
        }

        for visual in self.host.markers.values() {
            let (surface_pos, surface_rot) = self
                .host
                .surface_local
                .get(&visual.surface)
                .copied()
                .unwrap_or((Vec2::ZERO, 0.0));
            let (sin, cos) = surface_rot.sin_cos();
            let rotated = Vec2::new(
                cos * visual.position.x - sin * visual.position.y,
                sin * visual.position.x + cos * visual.position.y,
            );
            let pos = panel + surface_pos + rotated;
            // the centered marker is a heading wedge, peripherals are dots
            let centered = visual.surface == CENTERED_SURFACE;
            out.push(InstanceData {
                pos: pos.to_array(),
                rot: surface_rot + visual.rotation,
                shape: if centered { 0.0 } else { 1.0 },
                scale: if centered {
                    [DOT_SIZE * 0.8, DOT_SIZE * 1.6]
                } else {
                    [DOT_SIZE, DOT_SIZE]
                },
                color: icon_color(visual.icon),
            });
        }

        out.truncate(MAX_INSTANCES);
        out
    }
}

// ---------------- Renderer ----------------

struct GpuState<'w> {
    window: &'w winit::window::Window,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    quad_vb: wgpu::Buffer,
    instance_vb: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

impl<'w> GpuState<'w> {
    async fn new(window: &'w winit::window::Window) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps.formats[0];
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            desired_maximum_frame_latency: 2,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("minimap shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/minimap.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniforms"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        // Quad vertices for two triangles
        let quad_vertices: [f32; 12] = [
            -0.5, -0.5, 0.5, -0.5, 0.5, 0.5, -0.5, -0.5, 0.5, 0.5, -0.5, 0.5,
        ];
        let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vb"),
            contents: bytemuck::cast_slice(&quad_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let instance_vb = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_vb"),
            size: (std::mem::size_of::<InstanceData>() * MAX_INSTANCES) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bgl"),
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
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bg"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_buffers = [
            // slot 0: quad corners
            wgpu::VertexBufferLayout {
                array_stride: (std::mem::size_of::<f32>() * 2) as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 0,
                }],
            },
            // slot 1: instance data
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<InstanceData>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &[
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x2,
                        offset: 0,
                        shader_location: 1,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32,
                        offset: 8,
                        shader_location: 2,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32,
                        offset: 12,
                        shader_location: 3,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x2,
                        offset: 16,
                        shader_location: 4,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x4,
                        offset: 24,
                        shader_location: 5,
                    },
                ],
            },
        ];
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &vertex_buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            pipeline,
            uniform_buffer,
            quad_vb,
            instance_vb,
            bind_group,
            width: size.width,
            height: size.height,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.width = new_size.width;
        self.height = new_size.height;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    fn view_proj(&self) -> [[f32; 4]; 4] {
        let w = self.width as f32 * 0.5;
        let h = self.height as f32 * 0.5;
        Mat4::orthographic_rh(-w, w, -h, h, -1.0, 1.0).to_cols_array_2d()
    }

    fn render(&mut self, instances: &[InstanceData]) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: self.view_proj(),
            }),
        );
        self.queue
            .write_buffer(&self.instance_vb, 0, bytemuck::cast_slice(instances));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("rpass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.02,
                            g: 0.02,
                            b: 0.04,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.bind_group, &[]);
            rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
            rpass.set_vertex_buffer(1, self.instance_vb.slice(..));
            rpass.draw(0..6, 0..instances.len() as u32);
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut demo = Demo::new(42).expect("demo setup");

    let event_loop = EventLoop::new().expect("event loop");
    let window = WindowBuilder::new()
        .with_title("Overhead Map (native)")
        .build(&event_loop)
        .expect("window");

    let mut state = pollster::block_on(GpuState::new(&window)).expect("gpu");
    let mut last_frame = Instant::now();

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent {
                event: WindowEvent::Resized(size),
                ..
            } => state.resize(size),
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => elwt.exit(),
            Event::AboutToWait => {
                let now = Instant::now();
                let dt = (now - last_frame).as_secs_f32();
                last_frame = now;
                demo.step(dt);

                let instances = demo.instances(state.width as f32, state.height as f32);
                match state.render(&instances) {
                    Ok(_) => state.window.request_redraw(),
                    Err(wgpu::SurfaceError::Lost) => state.resize(state.window.inner_size()),
                    Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                    Err(_) => {}
                }
            }
            _ => {}
        })
        .unwrap();
}
