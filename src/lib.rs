//! # placard
//!
//! Rasterize-once text labels for world objects.
//!
//! Short user-authored labels are wrapped, outlined, and rendered to small
//! offscreen images exactly once, then cached keyed by the raw text and
//! composited over a scrolling viewport every frame.
//!
//! ## Features
//! - Greedy character-wise wrapping with category-boundary break points
//! - Outline-stippled, size-bounded label bitmaps with transparent padding
//! - Content-keyed image cache with a once-per-tick pending-generation drain
//! - Viewport culling and center-on-anchor compositing
//! - Fixed / inverted / follow-box color policies, toml-configurable
//!
//! The core is backend-agnostic: the host supplies a [`LabelBackend`] (font
//! measurement, offscreen label surfaces, frame compositing). A wgpu + glyphon
//! backend lives in the `placard-wgpu` crate.
//!
//! ## Example
//!
//! The layout engine alone, with fixed-advance metrics:
//!
//! ```
//! use placard::{wrap, FontMetrics, Size};
//!
//! struct Mono;
//!
//! impl FontMetrics for Mono {
//!     fn measure(&mut self, text: &str) -> Size {
//!         Size::new(text.chars().count() as f32 * 10.0, 20.0)
//!     }
//! }
//!
//! let layout = wrap("Iron Ore x99", 70.0, &mut Mono);
//! assert_eq!(layout.lines, ["Iron ", "Ore x99"]);
//! assert_eq!(layout.size, Size::new(70.0, 40.0));
//! ```

pub mod backend;
pub mod cache;
pub mod color;
pub mod config;
pub mod layout;
pub mod renderer;

// Backend interface
pub use backend::{LabelBackend, LabelImage, RasterError};

// Cache
pub use cache::LabelCache;

// Colors and policies
pub use color::{
    resolve_outline_color, resolve_text_color, OutlineColorPolicy, Rgba, TextColorPolicy,
};

// Configuration
pub use config::{ConfigError, LabelConfig, Locale};

// Layout engine
pub use layout::{wrap, wrap_with_threshold, FontMetrics, Size, WrappedLayout};

// Renderer
pub use renderer::{LabelRenderer, Point, Viewport};
