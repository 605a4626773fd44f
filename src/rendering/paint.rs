//! Paint command set and geometry shared by the theme renderers
//!
//! Themes do not touch pixels directly; they emit an ordered `DisplayList`
//! that `raster` replays onto a pixmap. Command order is paint order.

use std::sync::Arc;

use tiny_skia::Pixmap;

use crate::color::Color;
use crate::fonts::Typeface;
use crate::settings::TextAlign;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle at the origin covering a `width x height` surface.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f32, height as f32)
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    pub fn to_skia(self) -> Option<tiny_skia::Rect> {
        tiny_skia::Rect::from_xywh(self.x, self.y, self.width, self.height)
    }
}

/// Per-corner radii, clockwise from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CornerRadii {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl CornerRadii {
    pub fn uniform(r: f32) -> Self {
        Self { top_left: r, top_right: r, bottom_right: r, bottom_left: r }
    }

    pub fn top(r: f32) -> Self {
        Self { top_left: r, top_right: r, ..Self::default() }
    }

    pub fn bottom(r: f32) -> Self {
        Self { bottom_right: r, bottom_left: r, ..Self::default() }
    }
}

/// Gradient anchor in the paint's native `[0, 1]` offset domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintStop {
    pub offset: f32,
    pub color: Color,
}

/// Resolved paint, ready for the rasterizer.
#[derive(Debug, Clone, PartialEq)]
pub enum Brush {
    Solid(Color),
    Linear {
        start: (f32, f32),
        end: (f32, f32),
        stops: Vec<PaintStop>,
    },
    Radial {
        center: (f32, f32),
        radius: f32,
        stops: Vec<PaintStop>,
    },
}

/// Where a text run's `y` sits relative to its glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBaseline {
    /// `y` is the top of the em box.
    Top,
    /// `y` is the vertical middle of the em box.
    Middle,
}

/// A single line of text anchored at `(x, y)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub align: TextAlign,
    pub baseline: TextBaseline,
    pub size: f32,
    pub typeface: Option<Typeface>,
    pub brush: Brush,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    FillRoundRect {
        rect: Rect,
        radii: CornerRadii,
        brush: Brush,
    },
    /// Stroke of a rounded rectangle clipped to its own interior, so only the
    /// inner half of `width` is visible.
    StrokeRoundRectInset {
        rect: Rect,
        radii: CornerRadii,
        width: f32,
        brush: Brush,
    },
    FillCircle {
        cx: f32,
        cy: f32,
        radius: f32,
        color: Color,
    },
    Image {
        rect: Rect,
        pixmap: Arc<Pixmap>,
    },
    Text(TextRun),
}

/// Ordered paint commands for one surface size.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayList {
    pub width: u32,
    pub height: u32,
    commands: Vec<PaintCommand>,
}

impl DisplayList {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, commands: Vec::new() }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    pub fn push(&mut self, cmd: PaintCommand) {
        self.commands.push(cmd);
    }

    pub fn commands(&self) -> &[PaintCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Text runs in paint order.
    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> {
        self.commands.iter().filter_map(|c| match c {
            PaintCommand::Text(run) => Some(run),
            _ => None,
        })
    }
}
