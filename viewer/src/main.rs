use std::error::Error;

use board::app::{AppConfig, AppContext, BoardApp, run_board_app};
use board::pixels_surface::PixelsSurface;
use board::profiling::{PaintTimings, Profiler};
use board::{BoardWidget, ConfigStore, PaintStats};
use viewer::controller::{Command, Controller};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyboardInput, MouseButton, VirtualKeyCode, WindowEvent};
use winit::event_loop::ControlFlow;

/// Logs per-phase paint timings at debug level.
#[derive(Debug, Default)]
struct LogProfiler;

impl Profiler for LogProfiler {
    fn on_paint(&mut self, frame: u64, stats: &PaintStats, timings: PaintTimings) {
        log::debug!(
            "frame {frame}: {} squares in {:?} (hud {:?}, squares {:?}, border {:?}, overlay {:?})",
            stats.squares_painted(),
            timings.total,
            timings.hud,
            timings.squares,
            timings.border,
            timings.overlay
        );
    }
}

struct ViewerApp {
    widget: BoardWidget,
    controller: Controller,
    store: ConfigStore,
    profiler: LogProfiler,
}

fn key_command(key: VirtualKeyCode) -> Option<Command> {
    Some(match key {
        VirtualKeyCode::F => Command::Flip,
        VirtualKeyCode::B => Command::ToggleBorder,
        VirtualKeyCode::C => Command::ToggleCursor,
        VirtualKeyCode::M => Command::ToggleMarkerMode,
        VirtualKeyCode::Space => Command::MarkCursor,
        VirtualKeyCode::Escape => Command::ClearAnnotations,
        VirtualKeyCode::Left => Command::MoveCursor(-1, 0),
        VirtualKeyCode::Right => Command::MoveCursor(1, 0),
        VirtualKeyCode::Up => Command::MoveCursor(0, -1),
        VirtualKeyCode::Down => Command::MoveCursor(0, 1),
        _ => return None,
    })
}

impl BoardApp for ViewerApp {
    fn widget(&mut self) -> &mut BoardWidget {
        &mut self.widget
    }

    fn handle_window_event(
        &mut self,
        event: &WindowEvent,
        _ctx: &mut AppContext,
        _control_flow: &mut ControlFlow,
    ) -> bool {
        let widget = &mut self.widget;
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.controller.pointer_moved(widget, position.x, position.y);
                true
            }
            WindowEvent::MouseInput { state, button, .. } => {
                match (button, state) {
                    (MouseButton::Left, ElementState::Pressed) => self.controller.primary_pressed(widget),
                    (MouseButton::Left, ElementState::Released) => self.controller.primary_released(widget),
                    (MouseButton::Right, ElementState::Pressed) => self.controller.secondary_pressed(widget),
                    (MouseButton::Right, ElementState::Released) => self.controller.secondary_released(widget),
                    _ => {}
                }
                true
            }
            WindowEvent::KeyboardInput {
                input:
                    KeyboardInput {
                        state: ElementState::Pressed,
                        virtual_keycode: Some(key),
                        ..
                    },
                ..
            } => match key_command(*key) {
                Some(command) => {
                    self.controller.command(widget, command);
                    true
                }
                None => false,
            },
            WindowEvent::CloseRequested => {
                if let Err(err) = self.store.save(widget.config()) {
                    log::error!("saving config failed: {err}");
                }
                false
            }
            _ => false,
        }
    }

    fn paint(&mut self, surface: &mut PixelsSurface) -> board::Result<PaintStats> {
        self.widget.paint_profiled(surface, &mut self.profiler)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    viewer::logger::init();

    let store = ConfigStore::from_env();
    let mut widget = BoardWidget::with_config(store.load());
    let controller = Controller::new(&mut widget);

    let app = ViewerApp {
        widget,
        controller,
        store,
        profiler: LogProfiler,
    };
    run_board_app(
        AppConfig {
            title: "Board".to_string(),
            desired_size: PhysicalSize::new(720, 720),
            clamp_to_monitor: true,
            vsync: Some(true),
        },
        app,
    )
}
