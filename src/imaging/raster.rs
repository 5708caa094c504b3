//! In-memory pixel grid and the reusable drawing surface.
//!
//! A [`Raster`] is owned by exactly one pipeline stage at a time and moves
//! between stages by value. The [`Surface`] is the one piece of state that
//! outlives a call: a scratch canvas that export stages draw onto before
//! encoding. Drawing requires `&mut Surface`, so a surface can only ever be
//! in use by one operation. [`SharedSurface`] lets several callers reuse one
//! surface; [`SharedSurface::acquire`] queues them so their draws never
//! interleave.

use super::operations::{PipelineError, Result};
use image::{Rgba, RgbaImage};
use parking_lot::{Mutex, MutexGuard};
use std::ops::{Deref, DerefMut};

/// Width × height grid of straight-alpha RGBA8 pixels, row-major.
///
/// Always at least 1×1, and the buffer length is always `width * height * 4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    image: RgbaImage,
}

impl Raster {
    /// Wrap a raw RGBA buffer, rejecting empty or inconsistent dimensions.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidDimension { width, height });
        }
        RgbaImage::from_raw(width, height, pixels)
            .map(|image| Self { image })
            .ok_or(PipelineError::InvalidDimension { width, height })
    }

    /// Wrap an existing image buffer.
    pub fn from_image(image: RgbaImage) -> Result<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(PipelineError::InvalidDimension {
                width: image.width(),
                height: image.height(),
            });
        }
        Ok(Self { image })
    }

    /// A raster with every pixel set to `color`.
    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Result<Self> {
        Self::from_image(RgbaImage::from_pixel(width, height, Rgba(color)))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub(crate) fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.image
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

/// Reusable off-screen canvas.
///
/// Each use starts with [`Surface::prepare`], which resizes the canvas and
/// fills it; the previous contents never leak into the next draw.
#[derive(Debug, Default)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resize the canvas to `width × height` and fill every pixel with `fill`.
    ///
    /// The backing allocation is kept and reused when it is large enough.
    pub fn prepare(&mut self, width: u32, height: u32, fill: [u8; 4]) {
        let len = width as usize * height as usize * 4;
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.reserve(len);
        for _ in 0..(len / 4) {
            self.pixels.extend_from_slice(&fill);
        }
    }

    /// Draw `raster` at the origin with source-over compositing.
    ///
    /// Pixels outside the prepared canvas are dropped.
    pub fn draw(&mut self, raster: &Raster) {
        let w = raster.width().min(self.width) as usize;
        let h = raster.height().min(self.height) as usize;
        let src_stride = raster.width() as usize * 4;
        let dst_stride = self.width as usize * 4;
        let src = raster.as_raw();

        for row in 0..h {
            let src_row = &src[row * src_stride..row * src_stride + w * 4];
            let dst_row = &mut self.pixels[row * dst_stride..row * dst_stride + w * 4];
            for (s, d) in src_row.chunks_exact(4).zip(dst_row.chunks_exact_mut(4)) {
                source_over(s, d);
            }
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Copy the canvas out as a raster.
    pub fn snapshot(&self) -> Result<Raster> {
        Raster::from_rgba(self.width, self.height, self.pixels.clone())
    }
}

/// Porter-Duff source-over on straight-alpha RGBA8.
fn source_over(src: &[u8], dst: &mut [u8]) {
    let sa = src[3] as f32 / 255.0;
    if sa >= 1.0 {
        dst.copy_from_slice(src);
        return;
    }
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for c in 0..3 {
        let s = src[c] as f32 / 255.0;
        let d = dst[c] as f32 / 255.0;
        let out = (s * sa + d * da * (1.0 - sa)) / out_a;
        dst[c] = (out * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// One [`Surface`] shared between callers, handed out one lease at a time.
#[derive(Debug, Default)]
pub struct SharedSurface {
    inner: Mutex<Surface>,
}

impl SharedSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the surface is free, then take exclusive use of it.
    ///
    /// The surface is released when the lease is dropped.
    pub fn acquire(&self) -> SurfaceLease<'_> {
        SurfaceLease {
            guard: self.inner.lock(),
        }
    }

    /// Take the surface only if nobody else holds it.
    pub fn try_acquire(&self) -> Option<SurfaceLease<'_>> {
        self.inner.try_lock().map(|guard| SurfaceLease { guard })
    }
}

/// Exclusive use of a [`SharedSurface`] until dropped.
pub struct SurfaceLease<'a> {
    guard: MutexGuard<'a, Surface>,
}

impl Deref for SurfaceLease<'_> {
    type Target = Surface;

    fn deref(&self) -> &Surface {
        &self.guard
    }
}

impl DerefMut for SurfaceLease<'_> {
    fn deref_mut(&mut self) -> &mut Surface {
        &mut self.guard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgba_rejects_mismatched_buffer() {
        let err = Raster::from_rgba(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidDimension {
                width: 2,
                height: 2
            }
        ));
    }

    #[test]
    fn from_rgba_rejects_zero_dimension() {
        assert!(Raster::from_rgba(0, 4, Vec::new()).is_err());
        assert!(Raster::filled(3, 0, [0; 4]).is_err());
    }

    #[test]
    fn buffer_length_matches_dimensions() {
        let raster = Raster::filled(7, 3, [1, 2, 3, 4]).unwrap();
        assert_eq!(raster.as_raw().len(), 7 * 3 * 4);
        assert_eq!(raster.pixel(6, 2), [1, 2, 3, 4]);
    }

    #[test]
    fn prepare_discards_previous_contents() {
        let mut surface = Surface::new();
        surface.prepare(2, 2, [255, 0, 0, 255]);
        surface.prepare(3, 1, [0, 0, 0, 0]);
        let snap = surface.snapshot().unwrap();
        assert_eq!(snap.dimensions(), (3, 1));
        assert!(snap.as_raw().iter().all(|&b| b == 0));
    }

    #[test]
    fn draw_over_white_flattens_transparency() {
        let mut raster = Raster::filled(2, 1, [10, 20, 30, 255]).unwrap();
        raster.as_raw_mut()[4..8].copy_from_slice(&[0, 0, 0, 0]);

        let mut surface = Surface::new();
        surface.prepare(2, 1, [255, 255, 255, 255]);
        surface.draw(&raster);
        let snap = surface.snapshot().unwrap();

        assert_eq!(snap.pixel(0, 0), [10, 20, 30, 255]);
        assert_eq!(snap.pixel(1, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn draw_over_transparent_keeps_straight_alpha() {
        let raster = Raster::filled(1, 1, [200, 100, 50, 128]).unwrap();
        let mut surface = Surface::new();
        surface.prepare(1, 1, [0, 0, 0, 0]);
        surface.draw(&raster);
        assert_eq!(surface.snapshot().unwrap().pixel(0, 0), [200, 100, 50, 128]);
    }

    #[test]
    fn half_alpha_over_white_blends() {
        let raster = Raster::filled(1, 1, [0, 0, 0, 128]).unwrap();
        let mut surface = Surface::new();
        surface.prepare(1, 1, [255, 255, 255, 255]);
        surface.draw(&raster);
        let [r, g, b, a] = surface.snapshot().unwrap().pixel(0, 0);
        assert_eq!(a, 255);
        assert_eq!((r, g, b), (127, 127, 127));
    }

    #[test]
    fn shared_surface_is_exclusive_while_leased() {
        let shared = SharedSurface::new();
        let lease = shared.acquire();
        assert!(shared.try_acquire().is_none());
        drop(lease);
        assert!(shared.try_acquire().is_some());
    }

    #[test]
    fn shared_surface_serializes_threads() {
        use std::sync::Arc;

        let shared = Arc::new(SharedSurface::new());
        let handles: Vec<_> = (0..4u8)
            .map(|i| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || {
                    let mut lease = shared.acquire();
                    let size = 2 + i as u32;
                    lease.prepare(size, size, [i, i, i, 255]);
                    std::thread::yield_now();
                    let snap = lease.snapshot().unwrap();
                    assert_eq!(snap.dimensions(), (size, size));
                    assert!(snap.as_raw().chunks_exact(4).all(|p| p == [i, i, i, 255]));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
