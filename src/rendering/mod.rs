//! Rendering: theme composition, paint resolution and rasterization.
//!
//! A theme turns a settings snapshot plus its loaded resources into a
//! `DisplayList`; `raster` replays that list onto a pixmap. Nothing here waits
//! on I/O; resource loading happens in the orchestrator beforehand.

use std::sync::Arc;

use base64::Engine as _;
use sha2::{Digest, Sha256};
use tiny_skia::Pixmap;

use crate::fonts::Typeface;
use crate::settings::{BannerSettings, Theme};
use crate::{Error, Result};

pub mod fill;
pub mod frame;
pub mod icon;
pub mod paint;
pub mod raster;
pub mod terminal;
pub mod text;

pub use paint::{DisplayList, PaintCommand};
pub use terminal::TerminalTheme;

/// Encoded PNG of a committed surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl Screenshot {
    pub fn empty(width: u32, height: u32) -> Self {
        Self { width, height, png_data: Vec::new() }
    }

    pub fn from_pixmap(pixmap: &Pixmap) -> Result<Self> {
        let png_data = pixmap
            .encode_png()
            .map_err(|e| Error::RenderError(format!("PNG encoding failed: {}", e)))?;
        Ok(Self {
            width: pixmap.width(),
            height: pixmap.height(),
            png_data,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.png_data.is_empty()
    }

    /// `data:image/png;base64,...` URL, suitable for a download link.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.png_data)
        )
    }

    /// Hex-encoded SHA-256 of the PNG bytes.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.png_data))
    }
}

/// Everything a theme may draw with, resolved before composition.
#[derive(Debug, Clone, Default)]
pub struct RenderResources {
    /// Face for `fontFamily`; `None` only when no font exists at all.
    pub text_face: Option<Typeface>,
    pub mono_face: Option<Typeface>,
    pub mono_bold_face: Option<Typeface>,
    /// Decoded icon, already sized for the banner.
    pub icon: Option<Arc<Pixmap>>,
}

/// A visual theme: settings and resources in, paint commands out.
pub trait ThemeRenderer: Send + Sync {
    fn compose(&self, settings: &BannerSettings, resources: &RenderResources) -> DisplayList;
}

/// Plain banner: frame, then icon, then text.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTheme;

impl ThemeRenderer for DefaultTheme {
    fn compose(&self, settings: &BannerSettings, resources: &RenderResources) -> DisplayList {
        let mut list = DisplayList::new(settings.width, settings.height);
        frame::draw_frame(&mut list, settings);
        icon::composite(&mut list, resources.icon.as_ref());
        let brush = fill::resolve(&settings.font_color, list.bounds());
        text::draw_text(&mut list, settings, &brush, resources.text_face.as_ref());
        list
    }
}

/// Renderer for a theme.
pub fn theme_renderer(theme: Theme) -> &'static dyn ThemeRenderer {
    match theme {
        Theme::Default => &DefaultTheme,
        Theme::OsWindow => &TerminalTheme,
    }
}

/// Compose and rasterize in one step.
pub fn render_to_pixmap(settings: &BannerSettings, resources: &RenderResources) -> Result<Pixmap> {
    raster::rasterize(&theme_renderer(settings.theme).compose(settings, resources))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use paint::Brush;

    fn dot() -> Arc<Pixmap> {
        let mut pm = Pixmap::new(4, 4).unwrap();
        pm.fill(tiny_skia::Color::from_rgba8(255, 0, 0, 255));
        Arc::new(pm)
    }

    #[test]
    fn default_theme_paints_icon_before_text() {
        let settings = BannerSettings { text: "Hi".into(), ..Default::default() };
        let resources = RenderResources { icon: Some(dot()), ..Default::default() };
        let list = DefaultTheme.compose(&settings, &resources);

        let kinds: Vec<_> = list
            .commands()
            .iter()
            .map(|c| match c {
                PaintCommand::FillRoundRect { .. } => "background",
                PaintCommand::StrokeRoundRectInset { .. } => "outline",
                PaintCommand::Image { .. } => "icon",
                PaintCommand::Text(_) => "text",
                PaintCommand::FillCircle { .. } => "circle",
            })
            .collect();
        assert_eq!(kinds, ["background", "outline", "icon", "text"]);
    }

    #[test]
    fn default_theme_without_icon_or_text() {
        let settings = BannerSettings { text: String::new(), outline_thickness: 0, ..Default::default() };
        let list = DefaultTheme.compose(&settings, &RenderResources::default());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn text_uses_the_font_fill() {
        let settings = BannerSettings {
            font_color: Color::rgb(1, 2, 3).into(),
            ..Default::default()
        };
        let list = DefaultTheme.compose(&settings, &RenderResources::default());
        assert!(list.text_runs().all(|r| r.brush == Brush::Solid(Color::rgb(1, 2, 3))));
    }

    #[test]
    fn screenshot_exports() {
        let pm = Pixmap::new(3, 2).unwrap();
        let shot = Screenshot::from_pixmap(&pm).unwrap();
        assert_eq!((shot.width, shot.height), (3, 2));
        assert!(shot.png_data.starts_with(&[0x89, b'P', b'N', b'G']));
        assert!(shot.to_data_url().starts_with("data:image/png;base64,iVBOR"));
        assert_eq!(shot.digest().len(), 64);
        assert!(Screenshot::empty(3, 2).is_empty());
    }
}
