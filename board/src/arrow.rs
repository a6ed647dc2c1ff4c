//! Arrows drawn on the HUD layers, and the footprint of squares each one touches per layer.
//!
//! Arrow geometry lives in "board units": square `(c, r)` spans `[c, c+1] x [r, r+1]` and its
//! center is `(c + 0.5, r + 0.5)`. Both flip states mirror whole axes, so footprints never depend
//! on the current geometry; only drawing maps units to pixels.

use std::ops::{Add, Mul, Sub};

use crate::geometry::Geometry;
use crate::hud::HudLayer;
use crate::pixmap::{Color, Pixmap};
use crate::square::{BOARD_SIZE, SquareMask, Squares, square_bit, square_coords, square_index};

/// Shaft half-width used for the footprint; wider than the drawn shaft so every drawn pixel lies
/// on a footprint square.
pub const FOOTPRINT_SHAFT_HALF_WIDTH: f64 = 0.25;
pub const SHAFT_HALF_WIDTH: f64 = 0.1;
pub const HEAD_HALF_WIDTH: f64 = 0.3;
pub const HEAD_LENGTH: f64 = 0.45;

const SAT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Vec2 {
    x: f64,
    y: f64,
}

impl Vec2 {
    const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn dot(self, o: Vec2) -> f64 {
        self.x * o.x + self.y * o.y
    }

    fn cross(self, o: Vec2) -> f64 {
        self.x * o.y - self.y * o.x
    }

    fn perp(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    fn length(self) -> f64 {
        self.dot(self).sqrt()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, o: Vec2) -> Vec2 {
        Vec2::new(self.x + o.x, self.y + o.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, o: Vec2) -> Vec2 {
        Vec2::new(self.x - o.x, self.y - o.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, k: f64) -> Vec2 {
        Vec2::new(self.x * k, self.y * k)
    }
}

fn center(col: i32, row: i32) -> Vec2 {
    Vec2::new(col as f64 + 0.5, row as f64 + 0.5)
}

/// Shaft quad plus head triangle, both convex.
#[derive(Debug, Clone, Copy)]
struct ArrowShape {
    shaft: [Vec2; 4],
    head: [Vec2; 3],
}

impl ArrowShape {
    fn new(from: Vec2, to: Vec2, shaft_half_width: f64) -> Option<Self> {
        let delta = to - from;
        let len = delta.length();
        if len <= HEAD_LENGTH {
            return None;
        }
        let dir = delta * (1.0 / len);
        let n = dir.perp();
        let base = to - dir * HEAD_LENGTH;
        let sw = n * shaft_half_width;
        let hw = n * HEAD_HALF_WIDTH;
        Some(Self {
            shaft: [from + sw, base + sw, base - sw, from - sw],
            head: [base + hw, to, base - hw],
        })
    }

    fn contains(&self, p: Vec2) -> bool {
        point_in_convex(&self.shaft, p) || point_in_convex(&self.head, p)
    }

    fn overlaps_square(&self, col: i32, row: i32) -> bool {
        polygon_overlaps_box(&self.shaft, col, row) || polygon_overlaps_box(&self.head, col, row)
    }

    fn bounds(&self) -> (Vec2, Vec2) {
        self.shaft.iter().chain(self.head.iter()).fold(
            (
                Vec2::new(f64::INFINITY, f64::INFINITY),
                Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            ),
            |(lo, hi), p| {
                (
                    Vec2::new(lo.x.min(p.x), lo.y.min(p.y)),
                    Vec2::new(hi.x.max(p.x), hi.y.max(p.y)),
                )
            },
        )
    }

    fn map(&self, f: impl Fn(Vec2) -> Vec2) -> Self {
        Self {
            shaft: self.shaft.map(&f),
            head: self.head.map(&f),
        }
    }
}

/// Works for either winding order; points on an edge count as inside.
fn point_in_convex(poly: &[Vec2], p: Vec2) -> bool {
    let mut sign = 0.0f64;
    for i in 0..poly.len() {
        let a = poly[i];
        let b = poly[(i + 1) % poly.len()];
        let c = (b - a).cross(p - a);
        if c == 0.0 {
            continue;
        }
        if sign == 0.0 {
            sign = c.signum();
        } else if c.signum() != sign {
            return false;
        }
    }
    true
}

fn project(points: &[Vec2], axis: Vec2) -> (f64, f64) {
    points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        let d = p.dot(axis);
        (lo.min(d), hi.max(d))
    })
}

/// Separating-axis test of a convex polygon against the unit box of square `(col, row)`.
fn polygon_overlaps_box(poly: &[Vec2], col: i32, row: i32) -> bool {
    let (x0, y0) = (col as f64, row as f64);
    let square = [
        Vec2::new(x0, y0),
        Vec2::new(x0 + 1.0, y0),
        Vec2::new(x0 + 1.0, y0 + 1.0),
        Vec2::new(x0, y0 + 1.0),
    ];
    let edge_normals = (0..poly.len()).map(|i| (poly[(i + 1) % poly.len()] - poly[i]).perp());
    [Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)]
        .into_iter()
        .chain(edge_normals)
        .all(|axis| {
            let (a0, a1) = project(poly, axis);
            let (b0, b1) = project(&square, axis);
            a1 > b0 + SAT_EPSILON && b1 > a0 + SAT_EPSILON
        })
}

/// A straight arrow from the center of one square to the center of another.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrow {
    pub begin: (i32, i32),
    pub end: (i32, i32),
    pub color: Color,
    footprint: [SquareMask; 2],
}

impl Arrow {
    /// `None` when either end is off the board.
    pub fn new(begin: (i32, i32), end: (i32, i32), color: Color) -> Option<Self> {
        let start = square_index(begin.0, begin.1)?;
        square_index(end.0, end.1)?;

        let touched = if begin == end {
            0
        } else if begin.0 == end.0 || begin.1 == end.1 {
            orthogonal_run(begin, end)
        } else {
            ArrowShape::new(
                center(begin.0, begin.1),
                center(end.0, end.1),
                FOOTPRINT_SHAFT_HALF_WIDTH,
            )
            .map(|shape| shape_footprint(&shape))
            .unwrap_or(0)
        };

        let start_bit = square_bit(start);
        Some(Self {
            begin,
            end,
            color,
            footprint: [start_bit, touched & !start_bit],
        })
    }

    pub fn footprint(&self, layer: HudLayer) -> SquareMask {
        self.footprint[layer.index()]
    }

    pub fn footprint_all(&self) -> SquareMask {
        self.footprint[0] | self.footprint[1]
    }

    pub fn is_orthogonal(&self) -> bool {
        self.begin.0 == self.end.0 || self.begin.1 == self.end.1
    }

    fn drawn_shape(&self) -> Option<ArrowShape> {
        ArrowShape::new(
            center(self.begin.0, self.begin.1),
            center(self.end.0, self.end.1),
            SHAFT_HALF_WIDTH,
        )
    }

    /// Blends the arrow into a board-local HUD image, restricted to squares in `clip` that are
    /// also part of the footprint. Each pixel is blended at most once.
    pub fn draw(&self, image: &mut Pixmap, geometry: &Geometry, clip: SquareMask) -> SquareMask {
        let clip = clip & self.footprint_all();
        let Some(shape) = self.drawn_shape() else {
            return 0;
        };
        if clip == 0 {
            return 0;
        }

        let side = geometry.side as f64;
        let extent = BOARD_SIZE as f64;
        let flipped = geometry.flipped;
        let px = shape.map(|p| {
            if flipped {
                Vec2::new((extent - p.x) * side, p.y * side)
            } else {
                Vec2::new(p.x * side, (extent - p.y) * side)
            }
        });
        let (lo, hi) = px.bounds();

        let mut drawn = 0;
        for idx in Squares::new(clip) {
            let (col, row) = square_coords(idx);
            let cell = geometry.local_square_rect(col, row);
            let x0 = cell.x.max(lo.x.floor() as i32);
            let x1 = cell.right().min(hi.x.ceil() as i32);
            let y0 = cell.y.max(lo.y.floor() as i32);
            let y1 = cell.bottom().min(hi.y.ceil() as i32);
            for y in y0..y1 {
                for x in x0..x1 {
                    if px.contains(Vec2::new(x as f64 + 0.5, y as f64 + 0.5)) {
                        image.blend_pixel(x, y, self.color);
                        drawn |= square_bit(idx);
                    }
                }
            }
        }
        log::trace!(
            "arrow {:?}->{:?} drew {} squares",
            self.begin,
            self.end,
            drawn.count_ones()
        );
        drawn
    }
}

fn orthogonal_run(begin: (i32, i32), end: (i32, i32)) -> SquareMask {
    let (c0, c1) = (begin.0.min(end.0), begin.0.max(end.0));
    let (r0, r1) = (begin.1.min(end.1), begin.1.max(end.1));
    let mut mask = 0;
    for row in r0..=r1 {
        for col in c0..=c1 {
            if let Some(idx) = square_index(col, row) {
                mask |= square_bit(idx);
            }
        }
    }
    mask
}

fn shape_footprint(shape: &ArrowShape) -> SquareMask {
    let (lo, hi) = shape.bounds();
    let c0 = (lo.x.floor() as i32).max(0);
    let c1 = (hi.x.ceil() as i32).min(BOARD_SIZE);
    let r0 = (lo.y.floor() as i32).max(0);
    let r1 = (hi.y.ceil() as i32).min(BOARD_SIZE);
    let mut mask = 0;
    for row in r0..r1 {
        for col in c0..c1 {
            if shape.overlaps_square(col, row) {
                if let Some(idx) = square_index(col, row) {
                    mask |= square_bit(idx);
                }
            }
        }
    }
    mask
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArrowHandle(u32);

/// Arrows in insertion order; later arrows draw on top.
#[derive(Debug, Clone, Default)]
pub struct Arrows {
    next_id: u32,
    arrows: Vec<(ArrowHandle, Arrow)>,
}

impl Arrows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.arrows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrows.is_empty()
    }

    pub fn insert(&mut self, arrow: Arrow) -> ArrowHandle {
        let handle = ArrowHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.arrows.push((handle, arrow));
        handle
    }

    pub fn get(&self, handle: ArrowHandle) -> Option<&Arrow> {
        self.arrows.iter().find(|(h, _)| *h == handle).map(|(_, a)| a)
    }

    /// Removes and returns the arrow; a stale handle asserts in debug builds.
    pub fn remove(&mut self, handle: ArrowHandle) -> Option<Arrow> {
        let Some(pos) = self.arrows.iter().position(|(h, _)| *h == handle) else {
            debug_assert!(false, "stale arrow handle {handle:?}");
            log::warn!("remove_arrow: stale handle {handle:?} ignored");
            return None;
        };
        Some(self.arrows.remove(pos).1)
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Arrow> + '_ {
        self.arrows.drain(..).map(|(_, a)| a)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arrow> {
        self.arrows.iter().map(|(_, a)| a)
    }
}
