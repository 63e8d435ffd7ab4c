//! Content-keyed cache of rasterized label images.

use std::collections::HashMap;

use log::{debug, warn};

use crate::backend::{LabelBackend, LabelImage, RasterError};
use crate::color::{resolve_outline_color, resolve_text_color, Rgba};
use crate::config::LabelConfig;
use crate::layout::wrap;
use crate::renderer::draw_outlined_text;

/// Owns every rasterized label image, keyed by the raw label text, plus the
/// pending set of texts awaiting generation.
///
/// `draw` paths only queue misses; generation happens in [`drain`], once per
/// tick, so no label ever rasterizes mid-frame. Colors and font scale are
/// baked into the images: the cache key stays the bare text, and any
/// configuration change clears the cache wholesale via [`set_config`].
///
/// [`drain`]: LabelCache::drain
/// [`set_config`]: LabelCache::set_config
pub struct LabelCache<I: LabelImage> {
    images: HashMap<String, I>,
    /// Pending text -> object display color captured at queue time.
    pending: HashMap<String, Rgba>,
    config: LabelConfig,
}

impl<I: LabelImage> LabelCache<I> {
    pub fn new(config: LabelConfig) -> Self {
        Self {
            images: HashMap::new(),
            pending: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &LabelConfig {
        &self.config
    }

    /// Replace the configuration. Cached bitmaps bake the old colors and
    /// scale, so the cache (and pending set) are cleared.
    pub fn set_config(&mut self, config: LabelConfig) {
        self.config = config;
        self.clear();
    }

    /// Add `text` to the pending set for the next [`drain`](LabelCache::drain).
    ///
    /// Blank text is ignored; so is text that already has a valid image. The
    /// first queued color wins for texts queued twice in one tick.
    pub fn queue(&mut self, text: &str, object_color: Rgba) {
        if text.trim().is_empty() {
            return;
        }
        if self.images.get(text).is_some_and(|image| image.is_valid()) {
            return;
        }
        self.pending.entry(text.to_owned()).or_insert(object_color);
    }

    /// The cached image for `text`, if present and still valid. An
    /// invalidated image reads as a miss.
    pub fn try_get(&self, text: &str) -> Option<&I> {
        self.images.get(text).filter(|image| image.is_valid())
    }

    /// Rasterize every distinct pending text that is not already cached.
    ///
    /// Call once per tick, outside any open frame batch: generation switches
    /// the backend's render target, which is illegal mid-batch. The pending
    /// set is snapshotted and cleared up front, so queues made during
    /// generation collect for the next drain. With an unusable backend this
    /// is a no-op and the pending set survives for a retry next tick; an
    /// entry whose generation fails is likewise put back.
    pub fn drain<B>(&mut self, backend: &mut B)
    where
        B: LabelBackend<Image = I>,
    {
        if self.pending.is_empty() || !backend.is_ready() {
            return;
        }

        let tasks = std::mem::take(&mut self.pending);
        debug!("generating {} pending label image(s)", tasks.len());

        for (text, object_color) in tasks {
            if self.try_get(&text).is_some() {
                continue;
            }
            match self.generate(backend, &text, object_color) {
                Ok(Some(image)) => {
                    self.images.insert(text, image);
                }
                Ok(None) => {} // degenerate wrap, nothing to cache
                Err(err) => {
                    warn!("label generation failed for {text:?}: {err}");
                    self.pending.entry(text).or_insert(object_color);
                }
            }
        }
    }

    /// Drop every cached image and forget all pending requests. Called on
    /// world/save transitions to bound memory.
    pub fn clear(&mut self) {
        if !self.images.is_empty() {
            debug!("clearing {} cached label image(s)", self.images.len());
        }
        self.images.clear();
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Wrap, size, and rasterize one label: each wrapped line is drawn
    /// centered, outline stipple first, fill on top.
    fn generate<B>(
        &self,
        backend: &mut B,
        text: &str,
        object_color: Rgba,
    ) -> Result<Option<B::Image>, RasterError>
    where
        B: LabelBackend<Image = I>,
    {
        let scale = self.config.effective_font_scale();
        let layout = wrap(text, self.config.max_label_width / scale, backend);
        if layout.lines.is_empty() {
            return Ok(None);
        }

        let padding = self.config.padding;
        let width = (layout.size.width + padding * 2.0) as u32;
        let height = (layout.size.height + padding * 2.0) as u32;

        backend.begin_label(width, height)?;

        let text_color = resolve_text_color(self.config.text_color, object_color);
        let outline_color = resolve_outline_color(self.config.outline_color, text_color);

        let mut cursor_y = padding;
        for line in &layout.lines {
            let line_size = backend.measure(line);
            let x = (width as f32 - line_size.width * scale) / 2.0;
            draw_outlined_text(backend, line, x, cursor_y, scale, outline_color, text_color);
            cursor_y += line_size.height * scale;
        }

        backend.finish_label().map(Some)
    }
}
