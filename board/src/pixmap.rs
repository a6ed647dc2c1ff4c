//! CPU-side RGBA image used for the cached board image, HUD layers and glyph tiles.
//!
//! Pixels are straight (non-premultiplied) RGBA. Every drawing call clips to the image bounds, so
//! callers can pass rects that hang off the edges.

use crate::surface::SurfaceSize;
use crate::ui::{Insets, Rect};

pub type Color = [u8; 4];

pub const TRANSPARENT: Color = [0, 0, 0, 0];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pixmap {
    size: SurfaceSize,
    buf: Vec<u8>,
}

impl Pixmap {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            buf: vec![0u8; size.rgba_len()],
        }
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn rect(&self) -> Rect {
        self.size.rect()
    }

    pub fn data(&self) -> &[u8] {
        &self.buf
    }

    /// Reallocates to `size`; all pixels become transparent.
    pub fn reset(&mut self, size: SurfaceSize) {
        self.size = size;
        self.buf.clear();
        self.buf.resize(size.rgba_len(), 0u8);
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        let idx = self.index(x, y)?;
        let px = &self.buf[idx..idx + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.size.width || y as u32 >= self.size.height {
            return None;
        }
        let idx = ((y as usize) * (self.size.width as usize) + x as usize) * 4;
        (idx + 4 <= self.buf.len()).then_some(idx)
    }

    fn row_span(&self, rect: Rect) -> Option<(Rect, usize)> {
        let clipped = rect.intersection(&self.rect());
        if clipped.is_empty() {
            return None;
        }
        let stride = (self.size.width as usize).checked_mul(4)?;
        Some((clipped, stride))
    }

    /// Opaque fill: writes `color` verbatim, alpha included.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some((r, stride)) = self.row_span(rect) else {
            return;
        };
        let row_bytes = (r.w as usize) * 4;
        let mut row_start = (r.y as usize) * stride + (r.x as usize) * 4;
        for _ in r.y..r.bottom() {
            let row = &mut self.buf[row_start..row_start + row_bytes];
            for px in row.chunks_exact_mut(4) {
                px.copy_from_slice(&color);
            }
            row_start += stride;
        }
    }

    /// Resets the rect to fully transparent.
    pub fn clear_rect(&mut self, rect: Rect) {
        self.fill_rect(rect, TRANSPARENT);
    }

    /// Alpha-blends `color` (alpha taken from `color[3]`) over existing content.
    pub fn blend_rect(&mut self, rect: Rect, color: Color) {
        if color[3] == 0 {
            return;
        }
        if color[3] == 255 {
            self.fill_rect(rect, color);
            return;
        }
        let Some((r, stride)) = self.row_span(rect) else {
            return;
        };
        let row_bytes = (r.w as usize) * 4;
        let mut row_start = (r.y as usize) * stride + (r.x as usize) * 4;
        for _ in r.y..r.bottom() {
            let row = &mut self.buf[row_start..row_start + row_bytes];
            for px in row.chunks_exact_mut(4) {
                blend_over(px, color);
            }
            row_start += stride;
        }
    }

    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(idx) = self.index(x, y) {
            blend_over(&mut self.buf[idx..idx + 4], color);
        }
    }

    /// Hollow frame: `outer` minus `outer` inset by `thickness`, filled even-odd so the middle
    /// keeps whatever was underneath.
    pub fn fill_ring(&mut self, outer: Rect, thickness: i32, color: Color) {
        if thickness <= 0 || outer.is_empty() {
            return;
        }
        let inner = outer.inset(Insets::all(thickness));
        if inner.is_empty() {
            self.blend_rect(outer, color);
            return;
        }
        for strip in outer.subtract(&inner) {
            self.blend_rect(strip, color);
        }
    }

    /// Alpha-composites `src_rect` of `src` over this image with its top-left at `(dst_x, dst_y)`.
    pub fn composite(&mut self, src: &Pixmap, src_rect: Rect, dst_x: i32, dst_y: i32) {
        let src_rect = src_rect.intersection(&src.rect());
        if src_rect.is_empty() {
            return;
        }
        let dx = dst_x - src_rect.x;
        let dy = dst_y - src_rect.y;
        let dst_rect = src_rect.translate(dx, dy).intersection(&self.rect());
        for y in dst_rect.y..dst_rect.bottom() {
            for x in dst_rect.x..dst_rect.right() {
                let Some(si) = src.index(x - dx, y - dy) else {
                    continue;
                };
                let color = [
                    src.buf[si],
                    src.buf[si + 1],
                    src.buf[si + 2],
                    src.buf[si + 3],
                ];
                if color[3] == 0 {
                    continue;
                }
                if let Some(di) = self.index(x, y) {
                    blend_over(&mut self.buf[di..di + 4], color);
                }
            }
        }
    }

    /// Copies `rect` verbatim into a frame of the same size (the double-buffer refresh).
    pub fn copy_to_frame(&self, frame: &mut [u8], rect: Rect) {
        let Some((r, stride)) = self.row_span(rect) else {
            return;
        };
        if frame.len() < self.buf.len() {
            return;
        }
        let row_bytes = (r.w as usize) * 4;
        let mut row_start = (r.y as usize) * stride + (r.x as usize) * 4;
        for _ in r.y..r.bottom() {
            let end = row_start + row_bytes;
            frame[row_start..end].copy_from_slice(&self.buf[row_start..end]);
            row_start += stride;
        }
    }
}

/// Blends a frame-sized pixmap tile onto a raw frame buffer (used for floating pieces, which are
/// drawn straight into the presented frame rather than the cached board image).
pub fn composite_into_frame(
    frame: &mut [u8],
    frame_size: SurfaceSize,
    src: &Pixmap,
    dst_x: i32,
    dst_y: i32,
    clip: Rect,
) {
    let dst = Rect::new(dst_x, dst_y, src.size.width as i32, src.size.height as i32)
        .intersection(&clip)
        .intersection(&frame_size.rect());
    if dst.is_empty() || frame.len() < frame_size.rgba_len() {
        return;
    }
    let stride = frame_size.width as usize * 4;
    for y in dst.y..dst.bottom() {
        for x in dst.x..dst.right() {
            let Some(color) = src.pixel(x - dst_x, y - dst_y) else {
                continue;
            };
            if color[3] == 0 {
                continue;
            }
            let di = (y as usize) * stride + (x as usize) * 4;
            blend_over(&mut frame[di..di + 4], color);
        }
    }
}

/// Straight-alpha "over" operator.
pub fn blend_over(dst: &mut [u8], src: Color) {
    let sa = src[3] as u32;
    if sa == 0 {
        return;
    }
    if sa == 255 {
        dst.copy_from_slice(&src);
        return;
    }
    let inv = 255 - sa;
    let da = dst[3] as u32;
    if da == 255 {
        for c in 0..3 {
            dst[c] = ((src[c] as u32 * sa + dst[c] as u32 * inv + 127) / 255) as u8;
        }
        return;
    }

    let out_a = sa * 255 + da * inv;
    if out_a == 0 {
        dst.copy_from_slice(&TRANSPARENT);
        return;
    }
    for c in 0..3 {
        let num = src[c] as u32 * sa * 255 + dst[c] as u32 * da * inv;
        dst[c] = ((num + out_a / 2) / out_a) as u8;
    }
    dst[3] = ((out_a + 127) / 255) as u8;
}
