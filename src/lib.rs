//! Banner Forge
//!
//! Deterministic banner rasterizer: a [`BannerSettings`] snapshot goes in,
//! a `width x height` pixmap (exportable as PNG) comes out.
//!
//! # Features
//!
//! - **Fills**: solid colors and multi-stop linear/radial gradients for the
//!   background, outline and text
//! - **Themes**: a plain banner and an "OS window" terminal mock-up
//! - **Resources**: web fonts fetched from a Google-Fonts-compatible service
//!   (`remote-fonts` feature, default) and SVG icons, both awaited before
//!   drawing and both optional
//! - **Stale-render guard**: renders started for older settings never
//!   overwrite newer pixels
//!
//! # Example
//!
//! ```no_run
//! use banner_forge::{BannerRenderer, BannerSettings, RendererConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let renderer = BannerRenderer::new(RendererConfig::default())?;
//! let settings = BannerSettings {
//!     text: "Hello".to_string(),
//!     ..Default::default()
//! };
//! renderer.render(&settings).await?;
//! let png = renderer.snapshot()?;
//! std::fs::write("banner.png", &png.png_data)?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod color;
pub mod fonts;
pub mod icons;
pub mod orchestrator;
pub mod preview;
pub mod rendering;
pub mod settings;

pub use color::Color;
pub use orchestrator::{BannerRenderer, RenderOutcome, RenderPhase};
pub use preview::Preview;
pub use rendering::Screenshot;
pub use settings::{BannerSettings, ColorStop, Fill, Gradient, GradientKind, TextAlign, Theme, VerticalAlign};

/// Configuration for a [`BannerRenderer`]
///
/// The defaults fetch fonts from Google Fonts and give each resource ten
/// seconds before falling back.
///
/// # Examples
///
/// ```
/// let cfg = banner_forge::RendererConfig::default();
/// assert_eq!(cfg.resource_timeout_ms, 10_000);
/// ```
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Base URL of the font stylesheet service
    pub font_service_url: String,
    /// User agent sent to the font service
    pub user_agent: String,
    /// Upper bound on font and icon waits in milliseconds (0 => disabled)
    pub resource_timeout_ms: u64,
    /// Per-request HTTP timeout for font downloads in milliseconds
    pub font_fetch_timeout_ms: u64,
    /// Whether to fetch non-generic font families from the service
    pub enable_remote_fonts: bool,
    /// Whether to decode and draw icons
    pub enable_icons: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            font_service_url: "https://fonts.googleapis.com".to_string(),
            // The service picks the font format from the agent; this one gets TrueType.
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) banner-forge/0.1".to_string(),
            resource_timeout_ms: 10_000,
            font_fetch_timeout_ms: 8_000,
            enable_remote_fonts: true,
            enable_icons: true,
        }
    }
}

impl RendererConfig {
    /// Config that never touches the network.
    pub fn offline() -> Self {
        Self {
            enable_remote_fonts: false,
            ..Default::default()
        }
    }
}
