//! Banner settings snapshot and its validation rules.
//!
//! A `BannerSettings` value is produced by the configuration surface and
//! consumed exactly once per render. It deserializes from the camelCase JSON
//! the editor emits, e.g. `{"width": 1200, "backgroundColor": "#161b22", ...}`.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::{Error, Result};

/// Range the editing surface offers for `width`/`height`.
pub const RECOMMENDED_DIMENSION_RANGE: std::ops::RangeInclusive<u32> = 100..=2000;

/// Horizontal text anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical placement of the text block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// Composition strategy used to turn settings into pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "os-window")]
    OsWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    Linear,
    Radial,
}

/// One anchor of a gradient ramp; `position` is a percentage in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub color: Color,
    pub position: f32,
}

impl ColorStop {
    pub fn new(position: f32, color: Color) -> Self {
        Self { color, position }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    #[serde(rename = "type")]
    pub kind: GradientKind,
    /// Degrees, clockwise from the positive x-axis. Ignored for radial gradients.
    #[serde(default)]
    pub angle: f32,
    pub stops: Vec<ColorStop>,
}

impl Gradient {
    pub fn linear(angle: f32, stops: Vec<ColorStop>) -> Self {
        Self { kind: GradientKind::Linear, angle, stops }
    }

    pub fn radial(stops: Vec<ColorStop>) -> Self {
        Self { kind: GradientKind::Radial, angle: 0.0, stops }
    }

    /// Stops ordered by position. Equal positions keep their input order.
    pub fn sorted_stops(&self) -> Vec<ColorStop> {
        let mut stops = self.stops.clone();
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        stops
    }

    /// Angle folded into `[0, 360)`.
    pub fn normalized_angle(&self) -> f32 {
        self.angle.rem_euclid(360.0)
    }

    fn validate(&self, field: &str) -> Result<()> {
        if self.stops.is_empty() {
            return Err(Error::InvalidSettings(format!("{field}: gradient has no color stops")));
        }
        if !self.angle.is_finite() {
            return Err(Error::InvalidSettings(format!("{field}: gradient angle is not finite")));
        }
        if let Some(stop) = self.stops.iter().find(|s| !s.position.is_finite()) {
            return Err(Error::InvalidSettings(format!(
                "{field}: stop position {} is not finite",
                stop.position
            )));
        }
        Ok(())
    }
}

/// Paint source for a region: a flat color or a gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fill {
    Solid(Color),
    Gradient(Gradient),
}

impl From<Color> for Fill {
    fn from(c: Color) -> Self {
        Fill::Solid(c)
    }
}

impl From<Gradient> for Fill {
    fn from(g: Gradient) -> Self {
        Fill::Gradient(g)
    }
}

/// Complete, immutable description of one banner.
///
/// Fields missing from JSON input take their `Default` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BannerSettings {
    pub width: u32,
    pub height: u32,
    pub background_color: Fill,
    pub corner_radius: u32,
    pub outline_color: Fill,
    pub outline_thickness: u32,
    pub font_family: String,
    pub font_size: u32,
    pub font_color: Fill,
    pub text: String,
    pub text_align: TextAlign,
    pub vertical_align: VerticalAlign,
    /// Key into the predefined icon table, or `"none"`.
    pub icon: String,
    /// Raw SVG markup; takes precedence over `icon` when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_icon_svg: Option<String>,
    pub theme: Theme,
    pub window_title: String,
}

impl Default for BannerSettings {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 630,
            background_color: Fill::Solid(Color::rgb(0x16, 0x1b, 0x22)),
            corner_radius: 12,
            outline_color: Fill::Solid(Color::rgb(0x58, 0xa6, 0xff)),
            outline_thickness: 8,
            font_family: "Roboto".to_string(),
            font_size: 72,
            font_color: Fill::Solid(Color::rgb(0xe6, 0xed, 0xf3)),
            text: "Hello World!\nWelcome to the Banner Creator.".to_string(),
            text_align: TextAlign::Center,
            vertical_align: VerticalAlign::Middle,
            icon: crate::icons::NO_ICON.to_string(),
            uploaded_icon_svg: None,
            theme: Theme::Default,
            window_title: "bash".to_string(),
        }
    }
}

impl BannerSettings {
    /// Parse a settings snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: BannerSettings = serde_json::from_str(json)?;
        Ok(settings)
    }

    /// Reject snapshots that cannot produce a meaningful raster.
    ///
    /// Zero dimensions or font size, non-finite gradient parameters and
    /// gradients without stops are errors. Dimensions outside the editor's
    /// range are only logged.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidSettings(format!(
                "surface size {}x{} must be positive",
                self.width, self.height
            )));
        }
        if self.font_size == 0 {
            return Err(Error::InvalidSettings("fontSize must be positive".into()));
        }
        for (field, fill) in [
            ("backgroundColor", &self.background_color),
            ("outlineColor", &self.outline_color),
            ("fontColor", &self.font_color),
        ] {
            if let Fill::Gradient(g) = fill {
                g.validate(field)?;
            }
        }
        if !RECOMMENDED_DIMENSION_RANGE.contains(&self.width)
            || !RECOMMENDED_DIMENSION_RANGE.contains(&self.height)
        {
            log::warn!(
                "banner size {}x{} is outside the recommended {:?} px range",
                self.width,
                self.height,
                RECOMMENDED_DIMENSION_RANGE
            );
        }
        Ok(())
    }

    /// SVG markup of the icon to composite, if any.
    pub fn icon_source(&self) -> Option<&str> {
        match self.uploaded_icon_svg.as_deref() {
            Some(svg) if !svg.trim().is_empty() => Some(svg),
            _ => crate::icons::lookup(&self.icon),
        }
    }

    /// Whether an icon layer was requested at all (regardless of whether it decodes).
    pub fn wants_icon(&self) -> bool {
        self.uploaded_icon_svg.as_deref().is_some_and(|s| !s.trim().is_empty())
            || (!self.icon.is_empty() && self.icon != crate::icons::NO_ICON)
    }
}
