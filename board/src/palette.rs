//! Small owner-managed color palette referenced by per-square background and marker handles.

use serde::{Deserialize, Serialize};

use crate::pixmap::Color;

pub const PALETTE_CAPACITY: usize = 31;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn opaque(self) -> Color {
        [self.r, self.g, self.b, 255]
    }

    pub const fn with_alpha(self, a: u8) -> Color {
        [self.r, self.g, self.b, a]
    }
}

/// Index into the palette, `1..=31`. Zero is reserved for "no color".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorHandle(u8);

impl ColorHandle {
    pub const fn get(self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Palette {
    colors: [Rgb; PALETTE_CAPACITY + 1],
    /// Bit `n` set ⇔ handle `n` is allocated. Bit 0 is never set.
    allocated: u32,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

impl Palette {
    pub const fn new() -> Self {
        Self {
            colors: [Rgb::new(0, 0, 0); PALETTE_CAPACITY + 1],
            allocated: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.allocated.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.allocated == 0
    }

    /// Allocates the lowest free handle. Running out is a contract violation: it asserts in
    /// debug builds and returns `None` in release builds.
    pub fn allocate(&mut self, color: Rgb) -> Option<ColorHandle> {
        let free = !self.allocated & !1u32;
        if free == 0 {
            debug_assert!(false, "color palette exhausted ({PALETTE_CAPACITY} handles)");
            log::warn!("color palette exhausted; allocation ignored");
            return None;
        }
        let slot = free.trailing_zeros() as usize;
        self.allocated |= 1 << slot;
        self.colors[slot] = color;
        Some(ColorHandle(slot as u8))
    }

    pub fn free(&mut self, handle: ColorHandle) {
        let bit = 1u32 << handle.0;
        debug_assert!(self.allocated & bit != 0, "freeing unallocated color handle {}", handle.0);
        self.allocated &= !bit;
    }

    pub fn is_allocated(&self, handle: ColorHandle) -> bool {
        self.allocated & (1u32 << handle.0) != 0
    }

    pub fn get(&self, handle: ColorHandle) -> Rgb {
        debug_assert!(self.is_allocated(handle), "color handle {} used after free", handle.0);
        self.colors[handle.0 as usize]
    }

    /// Replaces the color behind an allocated handle.
    pub fn set(&mut self, handle: ColorHandle, color: Rgb) {
        debug_assert!(self.is_allocated(handle), "color handle {} used after free", handle.0);
        self.colors[handle.0 as usize] = color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_reuses_lowest_freed_handle() {
        let mut palette = Palette::new();
        let a = palette.allocate(Rgb::new(1, 2, 3)).unwrap();
        let b = palette.allocate(Rgb::new(4, 5, 6)).unwrap();
        assert_eq!((a.get(), b.get()), (1, 2));
        assert_eq!(palette.get(b), Rgb::new(4, 5, 6));

        palette.free(a);
        let c = palette.allocate(Rgb::new(7, 8, 9)).unwrap();
        assert_eq!(c.get(), 1);
        assert_eq!(palette.get(c), Rgb::new(7, 8, 9));
        assert_eq!(palette.len(), 2);
    }

    #[test]
    fn capacity_is_thirty_one_handles() {
        let mut palette = Palette::new();
        for _ in 0..PALETTE_CAPACITY {
            assert!(palette.allocate(Rgb::default()).is_some());
        }
        assert_eq!(palette.len(), PALETTE_CAPACITY);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "palette exhausted")]
    fn exhaustion_asserts_in_debug_builds() {
        let mut palette = Palette::new();
        for _ in 0..=PALETTE_CAPACITY {
            palette.allocate(Rgb::default());
        }
    }
}
