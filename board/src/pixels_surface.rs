use pixels::Pixels;

use crate::error::{Error, Result};
use crate::surface::{Surface, SurfaceSize};

/// Windowed [`Surface`] backed by a `pixels` frame buffer of the same size as the window.
pub struct PixelsSurface {
    pixels: Pixels,
    size: SurfaceSize,
}

impl PixelsSurface {
    pub fn new(mut pixels: Pixels, size: SurfaceSize) -> Result<Self> {
        if !size.is_empty() {
            pixels
                .resize_buffer(size.width, size.height)
                .map_err(|e| Error::Surface(e.to_string()))?;
        }
        Ok(Self { pixels, size })
    }

    pub fn pixels(&self) -> &Pixels {
        &self.pixels
    }
}

impl Surface for PixelsSurface {
    type Error = Error;

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn frame_mut(&mut self) -> &mut [u8] {
        self.pixels.frame_mut()
    }

    /// A minimized window reports a zero size; the buffer keeps its last size until it grows.
    fn resize(&mut self, size: SurfaceSize) -> Result<()> {
        self.size = size;
        if size.is_empty() {
            return Ok(());
        }
        self.pixels
            .resize_surface(size.width, size.height)
            .map_err(|e| Error::Surface(e.to_string()))?;
        self.pixels
            .resize_buffer(size.width, size.height)
            .map_err(|e| Error::Surface(e.to_string()))
    }

    fn present(&mut self) -> Result<()> {
        if self.size.is_empty() {
            return Ok(());
        }
        self.pixels.render().map_err(|e| Error::Surface(e.to_string()))
    }
}
