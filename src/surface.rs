use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RayfanError, RayfanResult};

/// Logical (CSS-pixel) size of the container the backdrop fills.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn diagonal(self) -> f64 {
        self.width.hypot(self.height)
    }

    fn validate(self) -> RayfanResult<()> {
        if !self.width.is_finite() || !self.height.is_finite() {
            return Err(RayfanError::validation("viewport size must be finite"));
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(RayfanError::validation(format!(
                "viewport size must be non-negative, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Borrowed view of a backing buffer. Pixels are premultiplied RGBA8,
/// row-major, `width * height * 4` bytes.
#[derive(Clone, Copy, Debug)]
pub struct FrameRef<'a> {
    pub width: u32,
    pub height: u32,
    pub data: &'a [u8],
}

/// Owns the backing pixel buffer and keeps it sized to the observed
/// container: device size = floor(logical * scale) per axis.
///
/// Geometry stays in logical units; the stored scale maps logical to device
/// pixels at paint time.
#[derive(Debug)]
pub struct Surface {
    viewport: Viewport,
    scale: f64,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    pub fn new() -> Self {
        Self {
            viewport: Viewport::new(0.0, 0.0),
            scale: 1.0,
            width: 0,
            height: 0,
            data: Vec::new(),
        }
    }

    /// Applies a size observation. `None` means the container is not
    /// attached; previous dimensions are kept. Returns whether the backing
    /// buffer was reallocated, so callers can tell a real resize from a
    /// repeat observation.
    pub fn fit(&mut self, observed: Option<Viewport>, scale: f64) -> RayfanResult<bool> {
        let Some(viewport) = observed else {
            return Ok(false);
        };
        if !scale.is_finite() || scale <= 0.0 {
            return Err(RayfanError::validation(format!(
                "scale factor must be finite and positive, got {scale}"
            )));
        }
        viewport.validate()?;

        let width = (viewport.width * scale).floor() as u32;
        let height = (viewport.height * scale).floor() as u32;
        self.viewport = viewport;
        self.scale = scale;
        if width == self.width && height == self.height {
            return Ok(false);
        }

        let len = buffer_len(width, height)?;
        debug!(width, height, scale, "resized backing buffer");
        self.width = width;
        self.height = height;
        self.data = vec![0; len];
        Ok(true)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn device_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// True when there is nothing to paint into (unobserved or zero-sized
    /// container).
    pub fn is_blank(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn frame(&self) -> FrameRef<'_> {
        FrameRef {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn buffer_len(width: u32, height: u32) -> RayfanResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| RayfanError::validation("buffer size overflow"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_floors_logical_times_scale() {
        let mut s = Surface::new();
        let changed = s.fit(Some(Viewport::new(100.4, 50.9)), 2.0).unwrap();
        assert!(changed);
        assert_eq!(s.device_size(), (200, 101));
        assert_eq!(s.data().len(), 200 * 101 * 4);
        assert_eq!(s.scale(), 2.0);
    }

    #[test]
    fn fit_is_idempotent_for_identical_observations() {
        let mut s = Surface::new();
        assert!(s.fit(Some(Viewport::new(64.0, 32.0)), 1.5).unwrap());
        assert!(!s.fit(Some(Viewport::new(64.0, 32.0)), 1.5).unwrap());
        assert_eq!(s.device_size(), (96, 48));
    }

    #[test]
    fn unobserved_container_is_a_no_op() {
        let mut s = Surface::new();
        s.fit(Some(Viewport::new(10.0, 10.0)), 1.0).unwrap();
        assert!(!s.fit(None, 3.0).unwrap());
        assert_eq!(s.device_size(), (10, 10));
        assert_eq!(s.scale(), 1.0);
    }

    #[test]
    fn zero_sized_viewport_is_valid_and_blank() {
        let mut s = Surface::new();
        s.fit(Some(Viewport::new(0.0, 600.0)), 2.0).unwrap();
        assert!(s.is_blank());
        assert!(s.data().is_empty());
    }

    #[test]
    fn rejects_bad_scale_and_size() {
        let mut s = Surface::new();
        assert!(s.fit(Some(Viewport::new(10.0, 10.0)), 0.0).is_err());
        assert!(s.fit(Some(Viewport::new(10.0, 10.0)), -1.0).is_err());
        assert!(s.fit(Some(Viewport::new(10.0, 10.0)), f64::NAN).is_err());
        assert!(s.fit(Some(Viewport::new(-1.0, 10.0)), 1.0).is_err());
        assert!(s.fit(Some(Viewport::new(f64::INFINITY, 10.0)), 1.0).is_err());
    }

    #[test]
    fn same_device_size_keeps_buffer() {
        let mut s = Surface::new();
        assert!(s.fit(Some(Viewport::new(100.2, 50.0)), 1.0).unwrap());
        // Different logical size, same floored device size.
        assert!(!s.fit(Some(Viewport::new(100.8, 50.4)), 1.0).unwrap());
        assert_eq!(s.device_size(), (100, 50));
        assert_eq!(s.viewport(), Viewport::new(100.8, 50.4));
    }
}
