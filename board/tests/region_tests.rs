use board::geometry::Geometry;
use board::region::{Segments, classify_rect};
use board::render::{corner_rect, edge_cell_rect};
use board::square::{BOARD_SIZE, square_bit, square_index};
use board::{Rect, SurfaceSize};
use proptest::prelude::*;

fn geometry_strategy() -> impl Strategy<Value = Geometry> {
    (80u32..400, 80u32..400, any::<bool>(), any::<bool>())
        .prop_map(|(w, h, border, flipped)| Geometry::recompute(SurfaceSize::new(w, h), border, flipped))
}

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (-40i32..440, -40i32..440, 0i32..300, 0i32..300).prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn squares_marked_iff_rect_overlaps_them(g in geometry_strategy(), rect in rect_strategy()) {
        let m = classify_rect(&g, rect);
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let bit = square_bit(square_index(col, row).unwrap());
                let overlaps = g.square_rect(col, row).intersects(&rect);
                prop_assert_eq!(m.squares & bit != 0, overlaps, "square ({}, {})", col, row);
            }
        }
    }

    #[test]
    fn border_cells_marked_iff_rect_overlaps_them(g in geometry_strategy(), rect in rect_strategy()) {
        if g.border == 0 {
            return Ok(());
        }
        let m = classify_rect(&g, rect);
        let edges = [
            (Segments::TOP, m.top),
            (Segments::BOTTOM, m.bottom),
            (Segments::LEFT, m.left),
            (Segments::RIGHT, m.right),
        ];
        for (edge, cells) in edges {
            for k in 0..BOARD_SIZE {
                let overlaps = edge_cell_rect(&g, edge, k).intersects(&rect);
                prop_assert_eq!(cells & (1 << k) != 0, overlaps, "{:?} cell {}", edge, k);
            }
        }
        for corner in [Segments::TOP_LEFT, Segments::TOP_RIGHT, Segments::BOTTOM_LEFT, Segments::BOTTOM_RIGHT] {
            let overlaps = corner_rect(&g, corner).intersects(&rect);
            prop_assert_eq!(m.segments.contains(corner), overlaps, "{:?}", corner);
        }
    }

    #[test]
    fn union_of_rects_classifies_as_or(g in geometry_strategy(), a in rect_strategy(), b in rect_strategy()) {
        prop_assert_eq!(classify_rect(&g, a) | classify_rect(&g, b), board::region::classify_all(&g, [a, b].iter()));
    }

    #[test]
    fn pixel_to_square_round_trips(g in geometry_strategy(), col in 0i32..8, row in 0i32..8, dx in 0f64..1.0, dy in 0f64..1.0) {
        let r = g.square_rect(col, row);
        let px = r.x + ((r.w - 1) as f64 * dx) as i32;
        let py = r.y + ((r.h - 1) as f64 * dy) as i32;
        prop_assert_eq!(g.pixel_to_square(px, py), (col, row));
    }

    #[test]
    fn recompute_fits_available_area(w in 0u32..2000, h in 0u32..2000, border in any::<bool>()) {
        let g = Geometry::recompute(SurfaceSize::new(w, h), border, false);
        let total = BOARD_SIZE * g.side + 2 * g.border;
        if g.side > board::geometry::MIN_SQUARE_SIDE {
            prop_assert!(total <= w.min(h) as i32);
        }
        prop_assert!(g.side >= board::geometry::MIN_SQUARE_SIDE);
    }
}

#[test]
fn rect_outside_ring_contributes_nothing() {
    let g = Geometry::recompute(SurfaceSize::new(400, 200), true, false);
    let left_of_ring = Rect::new(0, 0, g.x - g.border, 200);
    assert!(classify_rect(&g, left_of_ring).is_empty());
}

#[test]
fn exposing_one_square_marks_only_that_square() {
    let g = Geometry::recompute(SurfaceSize::new(240, 240), true, false);
    let m = classify_rect(&g, g.square_rect(3, 4));
    assert_eq!(m.squares, 1u64 << 35);
    assert!(!m.touches_border());
}
