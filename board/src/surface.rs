use std::convert::Infallible;

use crate::ui::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn rgba_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }

    pub fn rect(self) -> Rect {
        Rect::from_size(self.width as i32, self.height as i32)
    }
}

/// A resizable RGBA surface the widget paints into.
///
/// This is the seam between:
/// - the widget (refreshing damaged regions of `frame_mut()` from its cached board image), and
/// - presentation (showing those pixels in a window, or keeping them for a test).
pub trait Surface {
    type Error;

    fn size(&self) -> SurfaceSize;
    fn frame_mut(&mut self) -> &mut [u8];

    fn resize(&mut self, size: SurfaceSize) -> Result<(), Self::Error>;
    fn present(&mut self) -> Result<(), Self::Error>;
}

/// A simple in-memory RGBA surface for headless execution and tests.
#[derive(Debug, Clone)]
pub struct RgbaBufferSurface {
    size: SurfaceSize,
    buf: Vec<u8>,
    presented: u64,
}

impl RgbaBufferSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            buf: vec![0u8; size.rgba_len()],
            presented: 0,
        }
    }

    pub fn frame(&self) -> &[u8] {
        &self.buf
    }

    /// Number of `present()` calls so far.
    pub fn presented(&self) -> u64 {
        self.presented
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let idx = ((y as usize) * (self.size.width as usize) + x as usize) * 4;
        let px = self.buf.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

impl Surface for RgbaBufferSurface {
    type Error = Infallible;

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn frame_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    fn resize(&mut self, size: SurfaceSize) -> Result<(), Self::Error> {
        self.size = size;
        self.buf.resize(size.rgba_len(), 0u8);
        Ok(())
    }

    fn present(&mut self) -> Result<(), Self::Error> {
        self.presented += 1;
        Ok(())
    }
}
