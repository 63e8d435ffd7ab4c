//! Per-frame label drawing: cache lookup, viewport culling, compositing.

use std::f32::consts::PI;

use crate::backend::{LabelBackend, LabelImage};
use crate::cache::LabelCache;
use crate::color::Rgba;

/// Screen-space position in pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Visible screen region in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Draws cached label images over world objects.
///
/// The anchor passed to [`draw_at`](LabelRenderer::draw_at) is the top-center
/// of the labeled object's tile, already converted to screen space by the
/// caller; this component only culls and composites.
pub struct LabelRenderer {
    viewport: Viewport,
}

impl LabelRenderer {
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }

    /// Call when the host window or camera viewport changes size.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Draw the label for `text` centered on `anchor`, or queue it for
    /// generation on a cache miss.
    ///
    /// A miss draws nothing this frame: the label appears one tick late
    /// rather than flashing a stale or placeholder image. Images fully
    /// outside the viewport emit no draw call.
    pub fn draw_at<B: LabelBackend>(
        &self,
        backend: &mut B,
        frame: &mut B::Frame,
        cache: &mut LabelCache<B::Image>,
        anchor: Point,
        text: &str,
        object_color: Rgba,
    ) {
        if text.trim().is_empty() {
            return;
        }

        let Some(image) = cache.try_get(text) else {
            cache.queue(text, object_color);
            return;
        };

        let width = image.width() as f32;
        let height = image.height() as f32;
        let left = anchor.x - width / 2.0;
        let top = anchor.y - height / 2.0;

        if left + width < 0.0
            || left > self.viewport.width
            || top + height < 0.0
            || top > self.viewport.height
        {
            return;
        }

        backend.composite(frame, image, left, top);
    }
}

/// Largest stamp offset from the text position, in pixel units.
const OUTLINE_OFFSET_MAX: f32 = 2.5;
/// Offset shrink per stamp within one ring.
const OUTLINE_RADIUS_STEP: f32 = 0.25;
/// First ring's angular step; later rings grow toward the max.
const MIN_DELTA_THETA: f32 = PI / 10.0;
const MAX_DELTA_THETA: f32 = PI / 3.0;

/// Stamps `text` repeatedly at offsets around shrinking circles in the
/// outline color, then once at zero offset in the fill color.
///
/// A brute-force halo standing in for a real stroke pass; the overdraw is
/// fine because this only runs while a label surface is being generated,
/// never per on-screen frame.
pub(crate) fn draw_outlined_text<B: LabelBackend>(
    backend: &mut B,
    text: &str,
    x: f32,
    y: f32,
    scale: f32,
    outline_color: Rgba,
    fill_color: Rgba,
) {
    let mut delta_theta = MIN_DELTA_THETA;
    let mut theta = 0.0f32;
    while theta <= 2.0 * PI {
        let mut radius = OUTLINE_OFFSET_MAX;
        while radius > 0.0 {
            let dx = theta.cos() * radius;
            let dy = theta.sin() * radius;
            backend.stamp(text, x + dx, y + dy, outline_color, scale);
            radius -= OUTLINE_RADIUS_STEP;
        }
        delta_theta = 0.5 * delta_theta + 0.5 * MAX_DELTA_THETA;
        theta += delta_theta;
    }

    backend.stamp(text, x, y, fill_color, scale);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;
    use crate::backend::RasterError;
    use crate::config::LabelConfig;

    type MockCache = LabelCache<crate::backend::mock::MockImage>;

    fn renderer() -> LabelRenderer {
        LabelRenderer::new(Viewport::new(800.0, 600.0))
    }

    fn warmed_cache(backend: &mut MockBackend, text: &str) -> MockCache {
        let mut cache = LabelCache::new(LabelConfig::default());
        cache.queue(text, Rgba::WHITE);
        cache.drain(backend);
        cache
    }

    #[test]
    fn test_miss_queues_and_draws_nothing() {
        let mut backend = MockBackend::new();
        let mut cache = LabelCache::new(LabelConfig::default());
        let mut frame = Vec::new();

        renderer().draw_at(
            &mut backend,
            &mut frame,
            &mut cache,
            Point::new(100.0, 100.0),
            "Seeds",
            Rgba::WHITE,
        );

        assert!(frame.is_empty());
        assert_eq!(cache.pending_len(), 1);
    }

    #[test]
    fn test_hit_composites_centered_on_anchor() {
        let mut backend = MockBackend::new();
        let mut cache = warmed_cache(&mut backend, "Seeds");
        let mut frame = Vec::new();

        renderer().draw_at(
            &mut backend,
            &mut frame,
            &mut cache,
            Point::new(100.0, 100.0),
            "Seeds",
            Rgba::WHITE,
        );

        let image = cache.try_get("Seeds").unwrap();
        let expected = (
            image.id,
            100.0 - image.width as f32 / 2.0,
            100.0 - image.height as f32 / 2.0,
        );
        assert_eq!(frame, [expected]);
    }

    #[test]
    fn test_offscreen_label_is_culled() {
        let mut backend = MockBackend::new();
        let mut cache = warmed_cache(&mut backend, "Seeds");
        let mut frame = Vec::new();
        let renderer = renderer();

        for anchor in [
            Point::new(-500.0, 100.0),
            Point::new(1500.0, 100.0),
            Point::new(100.0, -500.0),
            Point::new(100.0, 1500.0),
        ] {
            renderer.draw_at(
                &mut backend,
                &mut frame,
                &mut cache,
                anchor,
                "Seeds",
                Rgba::WHITE,
            );
        }

        assert!(frame.is_empty());
        assert_eq!(cache.pending_len(), 0);
    }

    #[test]
    fn test_partially_visible_label_still_draws() {
        let mut backend = MockBackend::new();
        let mut cache = warmed_cache(&mut backend, "Seeds");
        let mut frame = Vec::new();

        // Anchor just outside the left edge: the image straddles it.
        renderer().draw_at(
            &mut backend,
            &mut frame,
            &mut cache,
            Point::new(-1.0, 300.0),
            "Seeds",
            Rgba::WHITE,
        );

        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn test_blank_text_is_ignored() {
        let mut backend = MockBackend::new();
        let mut cache = LabelCache::new(LabelConfig::default());
        let mut frame = Vec::new();

        renderer().draw_at(
            &mut backend,
            &mut frame,
            &mut cache,
            Point::new(100.0, 100.0),
            "   ",
            Rgba::WHITE,
        );

        assert!(frame.is_empty());
        assert_eq!(cache.pending_len(), 0);
    }

    #[test]
    fn test_clear_then_draw_requeues() {
        let mut backend = MockBackend::new();
        let mut cache = warmed_cache(&mut backend, "Seeds");
        cache.clear();
        let mut frame = Vec::new();

        renderer().draw_at(
            &mut backend,
            &mut frame,
            &mut cache,
            Point::new(100.0, 100.0),
            "Seeds",
            Rgba::WHITE,
        );

        assert!(frame.is_empty());
        assert_eq!(cache.pending_len(), 1);
    }

    #[test]
    fn test_two_objects_share_one_cached_image() {
        let mut backend = MockBackend::new();
        let mut cache = warmed_cache(&mut backend, "Seeds");
        let mut frame = Vec::new();
        let renderer = renderer();

        renderer.draw_at(
            &mut backend,
            &mut frame,
            &mut cache,
            Point::new(100.0, 100.0),
            "Seeds",
            Rgba::WHITE,
        );
        renderer.draw_at(
            &mut backend,
            &mut frame,
            &mut cache,
            Point::new(300.0, 100.0),
            "Seeds",
            Rgba::WHITE,
        );

        assert_eq!(backend.generated, 1);
        assert_eq!(frame.len(), 2);
        assert_eq!(frame[0].0, frame[1].0);
    }

    #[test]
    fn test_stipple_stamps_outline_rings_then_fill() -> Result<(), RasterError> {
        let mut backend = MockBackend::new();
        backend.begin_label(64, 32)?;
        draw_outlined_text(
            &mut backend,
            "Seeds",
            10.0,
            5.0,
            1.0,
            Rgba::BLACK,
            Rgba::WHITE,
        );
        let image = backend.finish_label()?;

        let (fill, outline) = image.stamps.split_last().unwrap();
        assert!(outline.len() > 50, "halo too sparse: {}", outline.len());
        assert!(outline.iter().all(|stamp| stamp.color == Rgba::BLACK));

        // First stamp sits at theta 0, full offset; every outline stamp
        // stays within the max offset of the text position.
        assert_eq!((outline[0].x, outline[0].y), (10.0 + 2.5, 5.0));
        for stamp in outline {
            let (dx, dy) = (stamp.x - 10.0, stamp.y - 5.0);
            assert!(dx * dx + dy * dy <= 2.5 * 2.5 + 1e-3);
            assert!(dx * dx + dy * dy > 0.0);
        }

        assert_eq!((fill.x, fill.y), (10.0, 5.0));
        assert_eq!(fill.color, Rgba::WHITE);
        Ok(())
    }
}
