//! Collaborator interfaces: label images and the raster backend.

use thiserror::Error;

use crate::color::Rgba;
use crate::layout::FontMetrics;

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("label surface creation failed: {0}")]
    SurfaceCreation(String),
    #[error("no label surface is active")]
    NoActiveSurface,
    #[error("glyph rasterization failed: {0}")]
    Rasterization(String),
}

/// A cached, device-resident label bitmap.
pub trait LabelImage {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Whether the underlying resource is still usable. An image invalidated
    /// outside the cache (device loss, reset) reads as a cache miss and is
    /// regenerated on the next queue/drain round trip.
    fn is_valid(&self) -> bool;
}

/// Graphics backend driven by the cache and the renderer.
///
/// At most one label surface is active at a time, mirroring devices that
/// render to a single target: [`begin_label`](LabelBackend::begin_label)
/// claims the device and clears the surface to transparent,
/// [`finish_label`](LabelBackend::finish_label) restores whatever target was
/// previously bound and yields the finished image. Because of that, label
/// generation must never run while the host has a frame batch open; see
/// [`crate::LabelCache::drain`].
pub trait LabelBackend: FontMetrics {
    type Image: LabelImage;
    /// Per-frame sink the renderer composites label draws into.
    type Frame;

    /// False while the device is lost or otherwise unusable. Drains no-op
    /// and retry on the next tick.
    fn is_ready(&self) -> bool;

    /// Open an offscreen label surface of the given pixel dimensions,
    /// cleared to transparent.
    fn begin_label(&mut self, width: u32, height: u32) -> Result<(), RasterError>;

    /// Draw `text` into the active label surface with its top-left at
    /// `(x, y)`, scaled by `scale`.
    fn stamp(&mut self, text: &str, x: f32, y: f32, color: Rgba, scale: f32);

    /// Close the active label surface and hand back the rendered image.
    fn finish_label(&mut self) -> Result<Self::Image, RasterError>;

    /// Queue `image` to be drawn this frame with its top-left at `(x, y)`.
    fn composite(&mut self, frame: &mut Self::Frame, image: &Self::Image, x: f32, y: f32);
}
