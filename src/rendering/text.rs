//! Multi-line text layout for the default theme.

use crate::fonts::Typeface;
use crate::rendering::paint::{Brush, DisplayList, PaintCommand, TextBaseline, TextRun};
use crate::settings::{BannerSettings, TextAlign, VerticalAlign};

/// Inset between the banner edge (inside the outline) and the text block.
pub const PADDING: f32 = 40.0;

/// Line box height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// Width used for measuring when no typeface is available, per em.
const FALLBACK_ADVANCE: f32 = 0.6;

/// Measure `text`, approximating a monospace advance without a face.
pub fn measure_text(face: Option<&Typeface>, text: &str, size: f32) -> f32 {
    match face {
        Some(face) => face.measure(text, size),
        None => text.chars().count() as f32 * size * FALLBACK_ADVANCE,
    }
}

/// Position of one laid-out line. `y` is the vertical middle of its line box.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub align: TextAlign,
    pub font_size: f32,
    pub line_height: f32,
    pub total_height: f32,
    pub lines: Vec<PlacedLine>,
}

/// Compute line positions for the settings' text. Empty text yields no lines.
pub fn layout(settings: &BannerSettings) -> TextLayout {
    let font_size = settings.font_size as f32;
    let line_height = font_size * LINE_HEIGHT_FACTOR;
    if settings.text.is_empty() {
        return TextLayout {
            align: settings.text_align,
            font_size,
            line_height,
            total_height: 0.0,
            lines: Vec::new(),
        };
    }

    let width = settings.width as f32;
    let height = settings.height as f32;
    let inset = PADDING + settings.outline_thickness as f32;

    let raw: Vec<&str> = settings.text.split('\n').collect();
    let total_height = raw.len() as f32 * line_height;

    let x = match settings.text_align {
        TextAlign::Left => inset,
        TextAlign::Right => width - inset,
        TextAlign::Center => width / 2.0,
    };
    let start_y = match settings.vertical_align {
        VerticalAlign::Top => inset + line_height / 2.0,
        VerticalAlign::Bottom => height - inset - total_height + line_height / 2.0,
        VerticalAlign::Middle => height / 2.0 - total_height / 2.0 + line_height / 2.0,
    };

    let lines = raw
        .into_iter()
        .enumerate()
        .map(|(i, line)| PlacedLine {
            text: line.trim_end_matches('\r').to_string(),
            x,
            y: start_y + i as f32 * line_height,
        })
        .collect();

    TextLayout {
        align: settings.text_align,
        font_size,
        line_height,
        total_height,
        lines,
    }
}

/// Lay out the settings' text and append one run per line.
pub fn draw_text(list: &mut DisplayList, settings: &BannerSettings, brush: &Brush, face: Option<&Typeface>) {
    let layout = layout(settings);
    for line in layout.lines {
        list.push(PaintCommand::Text(TextRun {
            text: line.text,
            x: line.x,
            y: line.y,
            align: layout.align,
            baseline: TextBaseline::Middle,
            size: layout.font_size,
            typeface: face.cloned(),
            brush: brush.clone(),
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn settings(text: &str, h: TextAlign, v: VerticalAlign) -> BannerSettings {
        BannerSettings {
            text: text.to_string(),
            text_align: h,
            vertical_align: v,
            ..Default::default()
        }
    }

    #[test]
    fn empty_text_is_a_noop() {
        let s = settings("", TextAlign::Center, VerticalAlign::Middle);
        assert!(layout(&s).lines.is_empty());
        let mut list = DisplayList::new(10, 10);
        draw_text(&mut list, &s, &Brush::Solid(Color::WHITE), None);
        assert!(list.is_empty());
    }

    #[test]
    fn single_centered_line_sits_on_the_midpoint() {
        let s = settings("Hello", TextAlign::Center, VerticalAlign::Middle);
        let l = layout(&s);
        assert_eq!(l.lines.len(), 1);
        assert_eq!(l.lines[0].x, s.width as f32 / 2.0);
        assert_eq!(l.lines[0].y, s.height as f32 / 2.0);
    }

    #[test]
    fn lines_are_spaced_by_line_height() {
        let s = BannerSettings {
            font_size: 20,
            ..settings("a\nb\nc", TextAlign::Left, VerticalAlign::Top)
        };
        let l = layout(&s);
        assert_eq!(l.line_height, 24.0);
        assert_eq!(l.total_height, 72.0);
        assert_eq!(l.lines[1].y - l.lines[0].y, 24.0);
        assert_eq!(l.lines[2].y - l.lines[1].y, 24.0);
    }

    #[test]
    fn left_and_right_respect_padding_and_outline() {
        let left = settings("x", TextAlign::Left, VerticalAlign::Top);
        let right = settings("x", TextAlign::Right, VerticalAlign::Top);
        assert_eq!(layout(&left).lines[0].x, 48.0);
        assert_eq!(layout(&right).lines[0].x, 1200.0 - 48.0);
    }

    #[test]
    fn vertical_anchors() {
        let s = BannerSettings {
            font_size: 50,
            outline_thickness: 10,
            height: 600,
            ..settings("a\nb", TextAlign::Center, VerticalAlign::Top)
        };
        // line height 60, total 120
        assert_eq!(layout(&s).lines[0].y, 40.0 + 10.0 + 30.0);

        let bottom = BannerSettings { vertical_align: VerticalAlign::Bottom, ..s.clone() };
        assert_eq!(layout(&bottom).lines[0].y, 600.0 - 40.0 - 10.0 - 120.0 + 30.0);
        assert_eq!(layout(&bottom).lines[1].y, 600.0 - 40.0 - 10.0 - 30.0);

        let middle = BannerSettings { vertical_align: VerticalAlign::Middle, ..s };
        assert_eq!(layout(&middle).lines[0].y, 300.0 - 60.0 + 30.0);
    }

    #[test]
    fn blank_lines_keep_their_slot() {
        let s = settings("top\n\nbottom", TextAlign::Center, VerticalAlign::Middle);
        let l = layout(&s);
        assert_eq!(l.lines.len(), 3);
        assert_eq!(l.lines[1].text, "");
    }

    #[test]
    fn fallback_measure_is_monospace() {
        assert_eq!(measure_text(None, "abcd", 10.0), 24.0);
    }
}
