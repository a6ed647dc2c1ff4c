use std::error::Error;

use pixels::{PixelsBuilder, SurfaceTexture};
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::pixels_surface::PixelsSurface;
use crate::surface::{Surface, SurfaceSize};
use crate::widget::{BoardWidget, PaintStats};

pub struct AppConfig {
    pub title: String,
    pub desired_size: PhysicalSize<u32>,
    pub clamp_to_monitor: bool,
    pub vsync: Option<bool>,
}

pub struct AppContext {
    pub window: Window,
    pub surface: PixelsSurface,
}

/// A windowed owner of one [`BoardWidget`].
pub trait BoardApp {
    fn widget(&mut self) -> &mut BoardWidget;

    fn init(&mut self, _ctx: &mut AppContext) {}

    /// Sees every window event first; returning `true` swallows it.
    fn handle_window_event(
        &mut self,
        _event: &WindowEvent,
        _ctx: &mut AppContext,
        _control_flow: &mut ControlFlow,
    ) -> bool {
        false
    }

    /// Paints the widget into the window surface. Override to profile or post-process.
    fn paint(&mut self, surface: &mut PixelsSurface) -> crate::error::Result<PaintStats> {
        self.widget().paint(surface)
    }
}

fn paint_and_present<A: BoardApp>(app: &mut A, ctx: &mut AppContext) {
    if let Err(err) = app.paint(&mut ctx.surface) {
        eprintln!("paint failed: {err}");
    }
    if let Err(err) = ctx.surface.present() {
        eprintln!("present failed: {err}");
    }
}

pub fn run_board_app<A: BoardApp + 'static>(config: AppConfig, mut app: A) -> Result<(), Box<dyn Error>> {
    let event_loop = EventLoop::new();
    let monitor_size = if config.clamp_to_monitor {
        event_loop.primary_monitor().map(|m| m.size())
    } else {
        None
    };
    let initial_size = match monitor_size {
        Some(monitor) => PhysicalSize::new(
            config.desired_size.width.min(monitor.width),
            config.desired_size.height.min(monitor.height),
        ),
        None => config.desired_size,
    };
    let window = WindowBuilder::new()
        .with_title(config.title)
        .with_inner_size(initial_size)
        .build(&event_loop)?;

    let window_size = window.inner_size();
    let surface_size = SurfaceSize::new(window_size.width, window_size.height);

    let surface_texture = SurfaceTexture::new(surface_size.width, surface_size.height, &window);
    let mut builder = PixelsBuilder::new(surface_size.width, surface_size.height, surface_texture);
    if let Some(vsync) = config.vsync {
        builder = builder.enable_vsync(vsync);
    }
    let pixels = builder.build()?;
    let surface = PixelsSurface::new(pixels, surface_size)?;

    let mut ctx = AppContext { window, surface };
    app.widget().realize(surface_size);
    app.init(&mut ctx);

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match &event {
            Event::WindowEvent { event, .. } => {
                if app.handle_window_event(event, &mut ctx, control_flow) {
                    return;
                }
                match event {
                    WindowEvent::CloseRequested => {
                        *control_flow = ControlFlow::Exit;
                    }
                    WindowEvent::Resized(size) => {
                        let size = SurfaceSize::new(size.width, size.height);
                        if let Err(err) = ctx.surface.resize(size) {
                            eprintln!("resize failed: {err}");
                        }
                        app.widget().resize(size);
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        let size = SurfaceSize::new(new_inner_size.width, new_inner_size.height);
                        if let Err(err) = ctx.surface.resize(size) {
                            eprintln!("resize failed: {err}");
                        }
                        app.widget().resize(size);
                    }
                    WindowEvent::Occluded(false) | WindowEvent::Focused(true) => {
                        let size = ctx.surface.size();
                        app.widget().expose(size.rect());
                    }
                    _ => {}
                }
            }
            Event::RedrawRequested(_) => paint_and_present(&mut app, &mut ctx),
            Event::MainEventsCleared => {
                if app.widget().needs_paint() {
                    ctx.window.request_redraw();
                }
            }
            _ => {}
        }
    });

    #[allow(unreachable_code)]
    Ok(())
}
