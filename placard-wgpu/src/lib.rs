//! # placard-wgpu
//!
//! wgpu + glyphon raster backend for [`placard`] labels.
//!
//! Label text is measured with cosmic-text, stamped through glyphon into
//! small offscreen `wgpu` textures during the cache drain, and composited
//! back into the host's frame pass as alpha-blended quads.
//!
//! ## Example
//!
//! ```no_run
//! use placard::{LabelCache, LabelConfig, LabelRenderer, Point, Rgba, Viewport};
//! use placard_wgpu::{LabelFrame, WgpuLabelBackend};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut backend = WgpuLabelBackend::headless()?;
//!     let mut cache = LabelCache::new(LabelConfig::default());
//!     let renderer = LabelRenderer::new(Viewport::new(1280.0, 720.0));
//!
//!     // Draw pass: misses are queued, hits are collected into the frame.
//!     let mut frame = LabelFrame::new(1280.0, 720.0);
//!     renderer.draw_at(
//!         &mut backend,
//!         &mut frame,
//!         &mut cache,
//!         Point::new(640.0, 200.0),
//!         "Iron Ore x99",
//!         Rgba::opaque(139, 69, 19),
//!     );
//!
//!     // Between frames, outside any open render pass.
//!     cache.drain(&mut backend);
//!     Ok(())
//! }
//! ```
//!
//! Inside its render pass the host replays the frame with
//! [`WgpuLabelBackend::render_labels`].

mod pipeline;

pub use pipeline::LabelPipeline;

use std::sync::Arc;

use glyphon::{
    Attrs, Buffer, Family, FontSystem, Metrics, Resolution, Shaping, SwashCache, TextArea,
    TextAtlas, TextBounds, TextRenderer,
};
use log::warn;
use placard::{FontMetrics, LabelBackend, LabelImage, RasterError, Rgba, Size};
use thiserror::Error;
use wgpu::{Device, Queue, TextureFormat};

/// Format label textures are rendered in.
pub const LABEL_TEXTURE_FORMAT: TextureFormat = TextureFormat::Rgba8UnormSrgb;

const DEFAULT_FONT_SIZE: f32 = 24.0;
const LINE_HEIGHT_FACTOR: f32 = 1.2;

#[derive(Error, Debug)]
pub enum BackendInitError {
    #[error("no suitable wgpu adapter available")]
    AdapterUnavailable,
    #[error("failed to request wgpu device: {0}")]
    DeviceRequestFailed(#[from] wgpu::RequestDeviceError),
}

/// A finished, GPU-resident label bitmap.
pub struct LabelTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl LabelTexture {
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

impl LabelImage for LabelTexture {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    /// wgpu textures stay usable until dropped, so a cached label texture
    /// never goes stale on its own; hosts with resettable devices supply
    /// their own image type.
    fn is_valid(&self) -> bool {
        true
    }
}

struct Stamp {
    text: String,
    x: f32,
    y: f32,
    color: Rgba,
    scale: f32,
}

struct ActiveLabel {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
    stamps: Vec<Stamp>,
}

/// Per-frame sink of prepared label draws.
///
/// `composite` fills it during the host's update/draw pass;
/// [`WgpuLabelBackend::render_labels`] replays it inside the frame's render
/// pass. Create a fresh frame each tick.
pub struct LabelFrame {
    viewport: [f32; 2],
    draws: Vec<wgpu::BindGroup>,
}

impl LabelFrame {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            viewport: [viewport_width, viewport_height],
            draws: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }
}

/// [`LabelBackend`] over a shared wgpu device and queue.
///
/// Holds the glyphon font system, glyph atlas, and the quad pipeline used
/// for compositing. One label surface is open at a time between
/// `begin_label` and `finish_label`; stamps are recorded and flushed in a
/// single text-prepare and render pass, so the whole label costs one queue
/// submission regardless of how many outline stamps it contains.
pub struct WgpuLabelBackend {
    device: Arc<Device>,
    queue: Arc<Queue>,
    font_system: FontSystem,
    swash_cache: SwashCache,
    atlas: TextAtlas,
    text_renderer: TextRenderer,
    measure_buffer: Buffer,
    font_size: f32,
    line_height: f32,
    pipeline: LabelPipeline,
    active: Option<ActiveLabel>,
}

impl WgpuLabelBackend {
    /// Create a backend compositing into frames of `surface_format`.
    pub fn new(device: Arc<Device>, queue: Arc<Queue>, surface_format: TextureFormat) -> Self {
        let mut font_system = FontSystem::new();
        let swash_cache = SwashCache::new();
        let mut atlas = TextAtlas::new(&device, &queue, LABEL_TEXTURE_FORMAT);
        let text_renderer =
            TextRenderer::new(&mut atlas, &device, wgpu::MultisampleState::default(), None);

        let font_size = DEFAULT_FONT_SIZE;
        let line_height = font_size * LINE_HEIGHT_FACTOR;
        let mut measure_buffer = Buffer::new(&mut font_system, Metrics::new(font_size, line_height));
        measure_buffer.set_size(&mut font_system, f32::MAX, f32::MAX);

        let pipeline = LabelPipeline::new(&device, surface_format);

        Self {
            device,
            queue,
            font_system,
            swash_cache,
            atlas,
            text_renderer,
            measure_buffer,
            font_size,
            line_height,
            pipeline,
            active: None,
        }
    }

    /// Create a backend on a headless device, for tools and offline label
    /// baking.
    pub fn headless() -> Result<Self, BackendInitError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let adapter =
            pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))
                .ok_or(BackendInitError::AdapterUnavailable)?;
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("placard device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
            },
            None,
        ))?;
        Ok(Self::new(
            Arc::new(device),
            Arc::new(queue),
            LABEL_TEXTURE_FORMAT,
        ))
    }

    /// Set the unscaled font size used for measurement and stamping.
    pub fn with_font_size(mut self, px: f32) -> Self {
        self.font_size = px;
        self.line_height = px * LINE_HEIGHT_FACTOR;
        self.measure_buffer
            .set_metrics(&mut self.font_system, Metrics::new(px, self.line_height));
        self
    }

    /// Replay a frame's collected label draws inside the host's render pass.
    pub fn render_labels<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>, frame: &'a LabelFrame) {
        for draw in &frame.draws {
            self.pipeline.render_bind_group(render_pass, draw);
        }
    }

    fn default_attrs() -> Attrs<'static> {
        Attrs::new().family(Family::SansSerif)
    }
}

impl FontMetrics for WgpuLabelBackend {
    fn measure(&mut self, text: &str) -> Size {
        self.measure_buffer.set_text(
            &mut self.font_system,
            text,
            Self::default_attrs(),
            Shaping::Advanced,
        );

        let mut width = 0.0f32;
        let mut lines = 0;
        for run in self.measure_buffer.layout_runs() {
            width = width.max(run.line_w);
            lines += 1;
        }
        Size::new(width, lines as f32 * self.line_height)
    }
}

impl LabelBackend for WgpuLabelBackend {
    type Image = LabelTexture;
    type Frame = LabelFrame;

    /// A live wgpu device is always usable; loss surfaces through failed
    /// label generation, which the cache retries next tick.
    fn is_ready(&self) -> bool {
        true
    }

    fn begin_label(&mut self, width: u32, height: u32) -> Result<(), RasterError> {
        if self.active.is_some() {
            return Err(RasterError::SurfaceCreation(
                "a label surface is already active".into(),
            ));
        }
        if width == 0 || height == 0 {
            return Err(RasterError::SurfaceCreation(format!(
                "degenerate label surface {width}x{height}"
            )));
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Label Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: LABEL_TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.active = Some(ActiveLabel {
            texture,
            view,
            width,
            height,
            stamps: Vec::new(),
        });
        Ok(())
    }

    fn stamp(&mut self, text: &str, x: f32, y: f32, color: Rgba, scale: f32) {
        match &mut self.active {
            Some(active) => active.stamps.push(Stamp {
                text: text.to_owned(),
                x,
                y,
                color,
                scale,
            }),
            None => warn!("stamp {text:?} with no active label surface"),
        }
    }

    fn finish_label(&mut self) -> Result<LabelTexture, RasterError> {
        let active = self.active.take().ok_or(RasterError::NoActiveSurface)?;

        // One shaped buffer per distinct stamp text; the outline stamps all
        // reuse their line's buffer at different offsets.
        let mut buffers: Vec<(String, Buffer)> = Vec::new();
        for stamp in &active.stamps {
            if !buffers.iter().any(|(text, _)| text == &stamp.text) {
                let mut buffer = Buffer::new(
                    &mut self.font_system,
                    Metrics::new(self.font_size, self.line_height),
                );
                buffer.set_size(&mut self.font_system, f32::MAX, f32::MAX);
                buffer.set_text(
                    &mut self.font_system,
                    &stamp.text,
                    Self::default_attrs(),
                    Shaping::Advanced,
                );
                buffers.push((stamp.text.clone(), buffer));
            }
        }

        let areas: Vec<TextArea> = active
            .stamps
            .iter()
            .filter_map(|stamp| {
                let (_, buffer) = buffers.iter().find(|(text, _)| text == &stamp.text)?;
                Some(TextArea {
                    buffer,
                    left: stamp.x,
                    top: stamp.y,
                    scale: stamp.scale,
                    bounds: TextBounds {
                        left: 0,
                        top: 0,
                        right: active.width as i32,
                        bottom: active.height as i32,
                    },
                    default_color: glyphon::Color::rgba(
                        stamp.color.r,
                        stamp.color.g,
                        stamp.color.b,
                        stamp.color.a,
                    ),
                })
            })
            .collect();

        self.text_renderer
            .prepare(
                &self.device,
                &self.queue,
                &mut self.font_system,
                &mut self.atlas,
                Resolution {
                    width: active.width,
                    height: active.height,
                },
                areas,
                &mut self.swash_cache,
            )
            .map_err(|e| RasterError::Rasterization(e.to_string()))?;

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Label Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Label Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &active.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.text_renderer
                .render(&self.atlas, &mut render_pass)
                .map_err(|e| RasterError::Rasterization(e.to_string()))?;
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        Ok(LabelTexture {
            texture: active.texture,
            view: active.view,
            width: active.width,
            height: active.height,
        })
    }

    fn composite(&mut self, frame: &mut LabelFrame, image: &LabelTexture, x: f32, y: f32) {
        let bind_group =
            self.pipeline
                .create_bind_group_at_position(&self.device, image, [x, y], frame.viewport);
        frame.draws.push(bind_group);
    }
}
