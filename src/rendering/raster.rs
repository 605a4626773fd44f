//! Rasterizer: replays a `DisplayList` onto a tiny-skia pixmap.

use log::debug;
use tiny_skia::{
    FillRule, FilterQuality, GradientStop, LinearGradient, Mask, Paint, PathBuilder, Pixmap,
    PixmapPaint, Point, RadialGradient, Shader, SpreadMode, Stroke, Transform,
};

use crate::rendering::paint::{
    Brush, CornerRadii, DisplayList, PaintCommand, PaintStop, Rect, TextBaseline, TextRun,
};
use crate::rendering::Screenshot;
use crate::settings::TextAlign;
use crate::{Error, Result};

/// Cubic Bézier handle length for a quarter circle.
const KAPPA: f32 = 0.552_284_8;

/// Allocate a transparent pixmap of the list's size and paint it.
pub fn rasterize(list: &DisplayList) -> Result<Pixmap> {
    let mut pixmap = Pixmap::new(list.width, list.height).ok_or_else(|| {
        Error::RenderError(format!("cannot allocate a {}x{} surface", list.width, list.height))
    })?;
    paint_into(&mut pixmap, list);
    Ok(pixmap)
}

/// Rasterize straight to a PNG screenshot.
pub fn rasterize_png(list: &DisplayList) -> Result<Screenshot> {
    let pixmap = rasterize(list)?;
    Screenshot::from_pixmap(&pixmap)
}

/// Paint every command in order. Commands with degenerate geometry are skipped.
pub fn paint_into(pixmap: &mut Pixmap, list: &DisplayList) {
    for cmd in list.commands() {
        match cmd {
            PaintCommand::FillRoundRect { rect, radii, brush } => {
                if let (Some(path), Some(paint)) = (round_rect_path(*rect, *radii), to_paint(brush)) {
                    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
                }
            }
            PaintCommand::StrokeRoundRectInset { rect, radii, width, brush } => {
                stroke_inset(pixmap, *rect, *radii, *width, brush);
            }
            PaintCommand::FillCircle { cx, cy, radius, color } => {
                if let Some(path) = PathBuilder::from_circle(*cx, *cy, *radius) {
                    let mut paint = Paint::default();
                    paint.set_color(color.to_skia());
                    paint.anti_alias = true;
                    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
                }
            }
            PaintCommand::Image { rect, pixmap: image } => {
                if image.width() == 0 || image.height() == 0 {
                    continue;
                }
                let sx = rect.width / image.width() as f32;
                let sy = rect.height / image.height() as f32;
                let paint = PixmapPaint {
                    quality: FilterQuality::Bilinear,
                    ..PixmapPaint::default()
                };
                let transform = Transform::from_row(sx, 0.0, 0.0, sy, rect.x, rect.y);
                let src: &Pixmap = image;
                pixmap.draw_pixmap(0, 0, src.as_ref(), &paint, transform, None);
            }
            PaintCommand::Text(run) => draw_text_run(pixmap, run),
        }
    }
}

fn stroke_inset(pixmap: &mut Pixmap, rect: Rect, radii: CornerRadii, width: f32, brush: &Brush) {
    if width <= 0.0 {
        return;
    }
    let (Some(path), Some(paint)) = (round_rect_path(rect, radii), to_paint(brush)) else {
        return;
    };
    let Some(mut clip) = Mask::new(pixmap.width(), pixmap.height()) else {
        return;
    };
    clip.fill_path(&path, FillRule::Winding, true, Transform::identity());
    let stroke = Stroke { width, ..Stroke::default() };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), Some(&clip));
}

fn draw_text_run(pixmap: &mut Pixmap, run: &TextRun) {
    let Some(face) = run.typeface.as_ref() else {
        debug!("no typeface for '{}'; text run skipped", run.text);
        return;
    };
    let width = face.measure(&run.text, run.size);
    let left = match run.align {
        TextAlign::Left => run.x,
        TextAlign::Center => run.x - width / 2.0,
        TextAlign::Right => run.x - width,
    };
    let ascent = face.ascent(run.size);
    let descent = face.descent(run.size);
    let baseline = match run.baseline {
        TextBaseline::Top => run.y + ascent,
        TextBaseline::Middle => run.y + (ascent + descent) / 2.0,
    };
    let (Some(path), Some(paint)) = (face.outline(&run.text, left, baseline, run.size), to_paint(&run.brush)) else {
        return;
    };
    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
}

/// Rounded rectangle path. Each radius is clipped to half the smaller side.
pub fn round_rect_path(rect: Rect, radii: CornerRadii) -> Option<tiny_skia::Path> {
    if !(rect.width > 0.0 && rect.height > 0.0) {
        return None;
    }
    let max = rect.width.min(rect.height) / 2.0;
    let clip = |r: f32| r.clamp(0.0, max);
    let (tl, tr, br, bl) = (
        clip(radii.top_left),
        clip(radii.top_right),
        clip(radii.bottom_right),
        clip(radii.bottom_left),
    );
    let (x, y, r, b) = (rect.x, rect.y, rect.right(), rect.bottom());

    let mut pb = PathBuilder::new();
    pb.move_to(x + tl, y);
    pb.line_to(r - tr, y);
    if tr > 0.0 {
        pb.cubic_to(r - tr + tr * KAPPA, y, r, y + tr - tr * KAPPA, r, y + tr);
    }
    pb.line_to(r, b - br);
    if br > 0.0 {
        pb.cubic_to(r, b - br + br * KAPPA, r - br + br * KAPPA, b, r - br, b);
    }
    pb.line_to(x + bl, b);
    if bl > 0.0 {
        pb.cubic_to(x + bl - bl * KAPPA, b, x, b - bl + bl * KAPPA, x, b - bl);
    }
    pb.line_to(x, y + tl);
    if tl > 0.0 {
        pb.cubic_to(x, y + tl - tl * KAPPA, x + tl - tl * KAPPA, y, x + tl, y);
    }
    pb.close();
    pb.finish()
}

fn skia_stops(stops: &[PaintStop]) -> Vec<GradientStop> {
    stops
        .iter()
        .map(|s| GradientStop::new(s.offset, s.color.to_skia()))
        .collect()
}

fn to_paint(brush: &Brush) -> Option<Paint<'static>> {
    let mut paint = Paint::default();
    paint.anti_alias = true;
    match brush {
        Brush::Solid(color) => paint.set_color(color.to_skia()),
        Brush::Linear { start, end, stops } => {
            paint.shader = LinearGradient::new(
                Point::from_xy(start.0, start.1),
                Point::from_xy(end.0, end.1),
                skia_stops(stops),
                SpreadMode::Pad,
                Transform::identity(),
            )
            .or_else(|| last_stop_shader(stops))?;
        }
        Brush::Radial { center, radius, stops } => {
            let c = Point::from_xy(center.0, center.1);
            paint.shader = RadialGradient::new(c, c, *radius, skia_stops(stops), SpreadMode::Pad, Transform::identity())
                .or_else(|| last_stop_shader(stops))?;
        }
    }
    Some(paint)
}

/// Degenerate ramps (zero length or radius) paint with their final color.
fn last_stop_shader(stops: &[PaintStop]) -> Option<Shader<'static>> {
    stops.last().map(|s| Shader::SolidColor(s.color.to_skia()))
}
