use std::collections::HashSet;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use meshview::{
    config::ViewerConfig,
    controller::{FpsCounter, InputProcessor, LightingUniform, TransformUniform, ViewportController},
    error::{Result, ViewerError},
    logging,
    model::{self, Mesh},
    ui::{self, OverlayStats},
    view::{GpuContext, OverlayFrame, RenderState, MESH_PROGRAM},
};

/// Window, GPU and per-frame state; exists once the event loop has resumed
struct App {
    window: Arc<Window>,
    gpu: GpuContext,
    render_state: RenderState,

    egui_state: egui_winit::State,
    egui_ctx: egui::Context,

    mesh: Mesh,
    mesh_name: String,
    controller: ViewportController,
    input_processor: InputProcessor,
    pressed_keys: HashSet<KeyCode>,

    start_time: Instant,
    fps: FpsCounter,
}

impl App {
    fn new(window: Arc<Window>, config: &ViewerConfig, mesh: Mesh) -> Result<Self> {
        let gpu = pollster::block_on(GpuContext::new(window.clone()))?;
        if !gpu.supports_wireframe() {
            info!("adapter lacks line polygon mode, wireframe toggle disabled");
        }

        let mut controller = ViewportController::new(&config.camera, &config.controls, config.window.aspect());
        controller.set_aspect(gpu.config.width, gpu.config.height);

        let transforms = TransformUniform::from_matrices(&controller.matrices());
        let lighting = LightingUniform::from_config(&config.lighting);
        let render_state = RenderState::new(
            &gpu,
            &MESH_PROGRAM,
            &mesh,
            &transforms,
            &lighting,
            config.window.clear_color,
        );

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        let mesh_name = config
            .mesh_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| config.mesh_path.display().to_string());

        Ok(Self {
            window,
            gpu,
            render_state,
            egui_state,
            egui_ctx,
            mesh,
            mesh_name,
            controller,
            input_processor: InputProcessor::default(),
            pressed_keys: HashSet::new(),
            start_time: Instant::now(),
            fps: FpsCounter::new(),
        })
    }

    fn handle_key(&mut self, code: KeyCode, state: ElementState, repeat: bool) {
        match state {
            ElementState::Pressed => {
                self.pressed_keys.insert(code);
                if !repeat && self.input_processor.wants_to_toggle_wireframe(code) {
                    let on = self.render_state.toggle_wireframe();
                    info!("wireframe {}", if on { "on" } else { "off" });
                }
            }
            ElementState::Released => {
                self.pressed_keys.remove(&code);
            }
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.gpu.resize(width, height);
        self.render_state.resize(&self.gpu.device, width, height);
        self.controller.set_aspect(width, height);
    }

    /// One loop iteration: sample input, advance the view, draw. Returns false to stop.
    fn frame(&mut self) -> bool {
        let now = self.start_time.elapsed().as_secs_f64();
        let dt = self.controller.state.advance_clock(now);

        let input = self.input_processor.snapshot(&self.pressed_keys);
        if input.quit {
            return false;
        }

        self.fps.tick(dt);
        let matrices = self.controller.update(dt, &input);
        self.render_state
            .write_transforms(&self.gpu.queue, &TransformUniform::from_matrices(&matrices));

        let overlay = self.build_overlay();
        match self.render_state.draw_frame(&self.gpu, Some(overlay)) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => self.gpu.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("surface out of memory");
                return false;
            }
            Err(e) => warn!("dropped frame: {e:?}"),
        }
        true
    }

    fn build_overlay(&mut self) -> OverlayFrame {
        let stats = OverlayStats {
            fps: self.fps.fps(),
            view: &self.controller.state,
            mesh: &self.mesh,
            mesh_name: &self.mesh_name,
            wireframe_mode: self.render_state.wireframe_mode,
            wireframe_available: self.render_state.pipelines.wireframe_pipeline.is_some(),
        };
        let bindings = self.input_processor.bindings();

        let raw_input = self.egui_state.take_egui_input(&self.window);
        let output = self.egui_ctx.run(raw_input, |ctx| ui::build_ui(ctx, &stats, bindings));
        self.egui_state.handle_platform_output(&self.window, output.platform_output);

        OverlayFrame {
            primitives: self.egui_ctx.tessellate(output.shapes, output.pixels_per_point),
            textures_delta: output.textures_delta,
            screen_descriptor: egui_wgpu::ScreenDescriptor {
                size_in_pixels: [self.gpu.config.width, self.gpu.config.height],
                pixels_per_point: output.pixels_per_point,
            },
        }
    }
}

/// winit handler: loads nothing itself, owns the app once a window exists
struct Viewer {
    config: ViewerConfig,
    mesh: Option<Mesh>,
    app: Option<App>,
    error: Option<ViewerError>,
}

impl Viewer {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: ViewerError) {
        error!("{err}");
        self.error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for Viewer {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_some() {
            return;
        }
        let Some(mesh) = self.mesh.take() else { return };

        let attributes = Window::default_attributes()
            .with_title(format!("{} - {}", self.config.window.title, self.config.mesh_path.display()))
            .with_inner_size(LogicalSize::new(self.config.window.width, self.config.window.height));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };

        match App::new(window, &self.config, mesh) {
            Ok(app) => self.app = Some(app),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(app) = self.app.as_mut() else { return };

        if app.egui_state.on_window_event(&app.window, &event).consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => app.resize(size.width, size.height),
            WindowEvent::Focused(false) => app.pressed_keys.clear(),
            WindowEvent::KeyboardInput {
                event: KeyEvent { physical_key: PhysicalKey::Code(code), state, repeat, .. },
                ..
            } => app.handle_key(code, state, repeat),
            WindowEvent::RedrawRequested => {
                if !app.frame() {
                    info!("exiting");
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(app) = &self.app {
            app.window.request_redraw();
        }
    }
}

fn run() -> Result<()> {
    let config = ViewerConfig::from_args(std::env::args().skip(1));

    MESH_PROGRAM.validate()?;
    let mesh = model::load_obj(&config.mesh_path)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut viewer = Viewer {
        config,
        mesh: Some(mesh),
        app: None,
        error: None,
    };
    event_loop.run_app(&mut viewer)?;

    // GPU resources are released here, after the loop has exited
    drop(viewer.app.take());
    viewer.error.map_or(Ok(()), Err)
}

fn main() -> ExitCode {
    logging::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
