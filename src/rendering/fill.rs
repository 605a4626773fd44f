//! Fill resolution: `Fill` + target rectangle → `Brush`.

use crate::color::Color;
use crate::rendering::paint::{Brush, PaintStop, Rect};
use crate::settings::{Fill, Gradient, GradientKind};

/// Resolve an abstract fill against the rectangle it will cover.
///
/// Solid colors ignore `bounds`. Gradients are anchored on the center of
/// `bounds`: a linear ramp runs along `angle` (0° = +x, clockwise) across the
/// extent of the rectangle in that direction, a radial ramp reaches its last
/// stop at half the larger side. A gradient with a single stop degrades to
/// that stop's color; one with no stops (rejected by validation) is
/// transparent.
pub fn resolve(fill: &Fill, bounds: Rect) -> Brush {
    match fill {
        Fill::Solid(color) => Brush::Solid(*color),
        Fill::Gradient(gradient) => resolve_gradient(gradient, bounds),
    }
}

fn resolve_gradient(gradient: &Gradient, bounds: Rect) -> Brush {
    let sorted = gradient.sorted_stops();
    let stops: Vec<PaintStop> = match sorted.as_slice() {
        [] => return Brush::Solid(Color::TRANSPARENT),
        [only] => return Brush::Solid(only.color),
        many => many
            .iter()
            .map(|s| PaintStop {
                offset: (s.position / 100.0).clamp(0.0, 1.0),
                color: s.color,
            })
            .collect(),
    };

    let (cx, cy) = bounds.center();
    match gradient.kind {
        GradientKind::Linear => {
            let theta = gradient.normalized_angle().to_radians();
            let (dx, dy) = (theta.cos(), theta.sin());
            let half = (bounds.width * dx.abs() + bounds.height * dy.abs()) / 2.0;
            Brush::Linear {
                start: (cx - dx * half, cy - dy * half),
                end: (cx + dx * half, cy + dy * half),
                stops,
            }
        }
        GradientKind::Radial => Brush::Radial {
            center: (cx, cy),
            radius: bounds.width.max(bounds.height) / 2.0,
            stops,
        },
    }
}
