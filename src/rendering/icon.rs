//! Icon compositing: SVG markup decoded to a pixmap and centered in the banner.

use std::sync::Arc;

use log::warn;
use resvg::usvg;
use tiny_skia::{Pixmap, Transform};

use crate::rendering::paint::{DisplayList, PaintCommand, Rect};
use crate::settings::BannerSettings;
use crate::{Error, Result};

/// Icon side as a fraction of the banner's smaller dimension.
pub const ICON_SCALE: f32 = 0.2;

/// Whether the icon layer was painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconOutcome {
    Drawn,
    Skipped,
}

/// Square the icon occupies: side `min(width, height) / 5`, centered.
pub fn icon_rect(width: u32, height: u32) -> Rect {
    let side = width.min(height) as f32 * ICON_SCALE;
    Rect::new(
        (width as f32 - side) / 2.0,
        (height as f32 - side) / 2.0,
        side,
        side,
    )
}

/// Decode SVG markup into a `side x side` pixmap, preserving aspect ratio.
pub fn decode_svg(svg: &str, side: u32) -> Result<Pixmap> {
    let tree = usvg::Tree::from_str(svg, &usvg::Options::default())
        .map_err(|e| Error::IconDecodeError(format!("Failed to parse SVG: {}", e)))?;

    let size = tree.size();
    if size.width() <= 0.0 || size.height() <= 0.0 {
        return Err(Error::IconDecodeError("SVG has an empty viewport".into()));
    }
    let mut pixmap = Pixmap::new(side, side)
        .ok_or_else(|| Error::IconDecodeError(format!("cannot allocate a {side}x{side} icon")))?;

    let scale = (side as f32 / size.width()).min(side as f32 / size.height());
    let tx = (side as f32 - size.width() * scale) / 2.0;
    let ty = (side as f32 - size.height() * scale) / 2.0;
    resvg::render(&tree, Transform::from_row(scale, 0.0, 0.0, scale, tx, ty), &mut pixmap.as_mut());
    Ok(pixmap)
}

/// Decode on the blocking pool so the caller's task stays responsive.
pub async fn decode_svg_async(svg: String, side: u32) -> Result<Arc<Pixmap>> {
    tokio::task::spawn_blocking(move || decode_svg(&svg, side).map(Arc::new))
        .await
        .map_err(|e| Error::IconDecodeError(format!("decode task failed: {}", e)))?
}

/// Decode the icon the settings select, if any. Failures are logged and
/// reported as `None`; the banner renders without the icon layer.
pub async fn load_icon(settings: &BannerSettings) -> Option<Arc<Pixmap>> {
    let svg = settings.icon_source()?.to_string();
    let rect = icon_rect(settings.width, settings.height);
    let side = rect.width.ceil().max(1.0) as u32;
    match decode_svg_async(svg, side).await {
        Ok(pixmap) => Some(pixmap),
        Err(e) => {
            warn!("{}; drawing banner without icon", e);
            None
        }
    }
}

/// Append the icon layer when a decoded image is available.
pub fn composite(list: &mut DisplayList, icon: Option<&Arc<Pixmap>>) -> IconOutcome {
    match icon {
        Some(pixmap) => {
            list.push(PaintCommand::Image {
                rect: icon_rect(list.width, list.height),
                pixmap: Arc::clone(pixmap),
            });
            IconOutcome::Drawn
        }
        None => IconOutcome::Skipped,
    }
}
