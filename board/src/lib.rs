//! Rendering and compositing core of an 8x8 board widget.
//!
//! The widget keeps a cached image of the board and repaints only what changed: squares are
//! invalidated individually, host damage rectangles are classified back into squares and border
//! cells, HUD layers regenerate per square, and floating pieces are drawn over the cached image.

pub mod app;
pub mod arrow;
pub mod artist;
pub mod config;
pub mod dirty;
pub mod error;
pub mod floating;
pub mod font;
pub mod geometry;
pub mod hud;
pub mod palette;
pub mod pixels_surface;
pub mod pixmap;
pub mod profiling;
pub mod region;
pub mod regression;
pub mod render;
pub mod rules;
pub mod square;
pub mod surface;
pub mod ui;
pub mod widget;

pub use arrow::ArrowHandle;
pub use config::{BoardConfig, ConfigStore};
pub use error::{Error, Result};
pub use floating::{FloatingHandle, FloatingPiece};
pub use geometry::Geometry;
pub use hud::{HudCanvas, HudLayer, HudPainter};
pub use palette::{ColorHandle, Rgb};
pub use region::{Segments, SegmentsMask};
pub use render::{CompositePlan, LayerStep};
pub use rules::{Placement, PositionSource};
pub use square::{Piece, PieceKind, Side, SquareCode, SquareMask};
pub use surface::{RgbaBufferSurface, Surface, SurfaceSize};
pub use ui::Rect;
pub use widget::{BoardWidget, PaintStats};
