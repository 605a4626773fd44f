//! Banner frame: rounded background plus inset outline.

use crate::rendering::fill;
use crate::rendering::paint::{CornerRadii, DisplayList, PaintCommand};
use crate::settings::BannerSettings;

/// Append the background and, when `outline_thickness > 0`, the outline.
///
/// The outline is stroked at twice the thickness and clipped to the frame, so
/// exactly `outline_thickness` pixels show inside the banner edge.
pub fn draw_frame(list: &mut DisplayList, settings: &BannerSettings) {
    let bounds = list.bounds();
    let radii = CornerRadii::uniform(settings.corner_radius as f32);

    list.push(PaintCommand::FillRoundRect {
        rect: bounds,
        radii,
        brush: fill::resolve(&settings.background_color, bounds),
    });

    if settings.outline_thickness > 0 {
        list.push(PaintCommand::StrokeRoundRectInset {
            rect: bounds,
            radii,
            width: settings.outline_thickness as f32 * 2.0,
            brush: fill::resolve(&settings.outline_color, bounds),
        });
    }
}
