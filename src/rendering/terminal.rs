//! "OS window" theme: a synthetic terminal window.
//!
//! Layout, top to bottom:
//!
//! ```text
//! ╭──────────────────────────────────────────────╮
//! │ ● ● ●              <window title>            │  header, HEADER_HEIGHT
//! ├──────────────────────────────────────────────┤
//! │ $ <banner text>                              │  settings font/size
//! │ <ascii art>                                  │  monospace, fixed
//! │ ╭ label value ╮ ╭ label value ╮ ╭ label … ╮  │  1-3 info columns
//! │ $ █                                          │  trailing prompt if room
//! ╰──────────────────────────────────────────────╯
//! ```
//!
//! Background, outline, icon and fill settings are ignored; the theme carries
//! its own palette. The ASCII art and info rows are static sample content.

use crate::color::Color;
use crate::fonts::Typeface;
use crate::rendering::paint::{
    Brush, CornerRadii, DisplayList, PaintCommand, Rect, TextBaseline, TextRun,
};
use crate::rendering::text::measure_text;
use crate::rendering::{RenderResources, ThemeRenderer};
use crate::settings::{BannerSettings, TextAlign};

pub const HEADER_HEIGHT: f32 = 40.0;
/// Inset used around the window content and between info columns.
pub const INSET: f32 = 15.0;
pub const DOT_RADIUS: f32 = 6.0;
const DOT_GAP: f32 = 5.0;
const TITLE_SIZE: f32 = 14.0;
const PANEL_FONT_SIZE: f32 = 14.0;
const PANEL_ROW_FACTOR: f32 = 1.5;
const ART_LINE_FACTOR: f32 = 1.2;
const COMMAND_LINE_FACTOR: f32 = 1.5;
const PANEL_RADIUS: f32 = 8.0;
const PANEL_PADDING: f32 = 10.0;
const LABEL_GAP: f32 = 8.0;
const CURSOR_WIDTH_FACTOR: f32 = 0.6;

pub const MAX_COLUMNS: usize = 3;
pub const MIN_COLUMN_WIDTH: f32 = 220.0;
pub const COLUMN_GAP: f32 = INSET;

pub const PROMPT: &str = "$";
pub const ELLIPSIS: &str = "…";

struct Palette {
    header: Color,
    body: Color,
    title: Color,
    text: Color,
    comment: Color,
    prompt: Color,
    art: Color,
    label: Color,
    panel: Color,
    dots: [Color; 3],
}

const PALETTE: Palette = Palette {
    header: Color::rgb(0x30, 0x36, 0x3d),
    body: Color::rgb(30, 30, 46),
    title: Color::rgb(205, 214, 244),
    text: Color::rgb(205, 214, 244),
    comment: Color::rgb(108, 112, 134),
    prompt: Color::rgb(166, 227, 161),
    art: Color::rgb(137, 180, 250),
    label: Color::rgb(203, 166, 247),
    panel: Color::rgb(49, 50, 68),
    dots: [
        Color::rgb(255, 95, 86),
        Color::rgb(255, 189, 46),
        Color::rgb(39, 201, 63),
    ],
};

const ASCII_ART: [&str; 5] = [
    r" ____                             ",
    r"| __ )  __ _ _ __  _ __   ___ _ __",
    r"|  _ \ / _` | '_ \| '_ \ / _ \ '__|",
    r"| |_) | (_| | | | | | | |  __/ |  ",
    r"|____/ \__,_|_| |_|_| |_|\___|_|  ",
];

/// Sample "system info" rows shown in the panel grid.
pub const INFO_ROWS: [(&str, &str); 9] = [
    ("OS", "BannerOS 1.0 LTS x86_64"),
    ("Host", "Virtual Canvas Workstation"),
    ("Kernel", "6.1.0-banner-generic"),
    ("Uptime", "42 days, 7 hours, 12 mins"),
    ("Packages", "1337 (cargo), 256 (apt)"),
    ("Shell", "bash 5.2.15"),
    ("Terminal", "banner-term 0.1"),
    ("CPU", "Raster Core i9 @ 4.20GHz (16 threads)"),
    ("Memory", "3141MiB / 16384MiB"),
];

/// Number of info columns and the width of each for the available width.
pub fn grid_columns(available: f32) -> (usize, f32) {
    let fit = ((available + COLUMN_GAP) / (MIN_COLUMN_WIDTH + COLUMN_GAP)).floor();
    let count = (fit.max(1.0) as usize).min(MAX_COLUMNS);
    let width = (available - COLUMN_GAP * (count as f32 - 1.0)) / count as f32;
    (count, width.max(0.0))
}

/// Shorten `text` one character at a time, appending an ellipsis, until it
/// measures within `max_width`. A lone ellipsis is returned when nothing fits.
pub fn truncate_to_width<F>(text: &str, max_width: f32, measure: F) -> String
where
    F: Fn(&str) -> f32,
{
    if measure(text) <= max_width {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    for keep in (1..chars.len()).rev() {
        let head: String = chars[..keep].iter().collect();
        let candidate = format!("{}{}", head.trim_end(), ELLIPSIS);
        if measure(&candidate) <= max_width {
            return candidate;
        }
    }
    ELLIPSIS.to_string()
}

/// The terminal-window theme.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalTheme;

impl ThemeRenderer for TerminalTheme {
    fn compose(&self, settings: &BannerSettings, resources: &RenderResources) -> DisplayList {
        let mut painter = TerminalPainter {
            list: DisplayList::new(settings.width, settings.height),
            text_face: resources.text_face.as_ref(),
            mono: resources.mono_face.as_ref(),
        };
        painter.window(settings, resources.mono_bold_face.as_ref());
        let bottom = settings.height as f32 - INSET;
        let mut y = HEADER_HEIGHT + INSET;
        y = painter.command_line(settings, y, bottom);
        y = painter.ascii_art(y, bottom);
        y = painter.info_grid(settings.width as f32, y, bottom);
        painter.trailing_prompt(settings.font_size as f32, y, bottom);
        painter.list
    }
}

struct TerminalPainter<'a> {
    list: DisplayList,
    text_face: Option<&'a Typeface>,
    mono: Option<&'a Typeface>,
}

impl<'a> TerminalPainter<'a> {
    fn text(&mut self, text: &str, x: f32, y: f32, size: f32, face: Option<&Typeface>, color: Color) {
        self.list.push(PaintCommand::Text(TextRun {
            text: text.to_string(),
            x,
            y,
            align: TextAlign::Left,
            baseline: TextBaseline::Top,
            size,
            typeface: face.cloned(),
            brush: Brush::Solid(color),
        }));
    }

    fn window(&mut self, settings: &BannerSettings, title_face: Option<&Typeface>) {
        let width = settings.width as f32;
        let height = settings.height as f32;
        let radius = settings.corner_radius as f32;

        self.list.push(PaintCommand::FillRoundRect {
            rect: Rect::new(0.0, 0.0, width, height),
            radii: CornerRadii::uniform(radius),
            brush: Brush::Solid(PALETTE.header),
        });
        if height > HEADER_HEIGHT {
            self.list.push(PaintCommand::FillRoundRect {
                rect: Rect::new(0.0, HEADER_HEIGHT, width, height - HEADER_HEIGHT),
                radii: CornerRadii::bottom(radius),
                brush: Brush::Solid(PALETTE.body),
            });
        }

        let cy = HEADER_HEIGHT / 2.0;
        for (i, color) in PALETTE.dots.iter().enumerate() {
            self.list.push(PaintCommand::FillCircle {
                cx: INSET + i as f32 * (DOT_RADIUS * 2.0 + DOT_GAP),
                cy,
                radius: DOT_RADIUS,
                color: *color,
            });
        }

        self.list.push(PaintCommand::Text(TextRun {
            text: settings.window_title.clone(),
            x: width / 2.0,
            y: cy,
            align: TextAlign::Center,
            baseline: TextBaseline::Middle,
            size: TITLE_SIZE,
            typeface: title_face.cloned(),
            brush: Brush::Solid(PALETTE.title),
        }));
    }

    /// Prompt plus the banner text on a single line. Lines are joined with
    /// spaces and a joined text beginning with `#` is a comment: dimmed and
    /// without a prompt. Blank text leaves no line at all.
    fn command_line(&mut self, settings: &BannerSettings, y: f32, bottom: f32) -> f32 {
        if y > bottom || settings.text.trim().is_empty() {
            return y;
        }
        let size = settings.font_size as f32;
        let command = settings.text.lines().collect::<Vec<_>>().join(" ");
        let face = self.text_face;

        if command.starts_with('#') {
            self.text(&command, INSET, y, size, face, PALETTE.comment);
        } else {
            self.text(PROMPT, INSET, y, size, face, PALETTE.prompt);
            let offset = measure_text(face, &format!("{PROMPT} "), size);
            self.text(&command, INSET + offset, y, size, face, PALETTE.text);
        }
        y + size * COMMAND_LINE_FACTOR
    }

    fn ascii_art(&mut self, mut y: f32, bottom: f32) -> f32 {
        let line_height = PANEL_FONT_SIZE * ART_LINE_FACTOR;
        let mut drawn = false;
        for line in ASCII_ART {
            if y + line_height > bottom {
                break;
            }
            self.text(line, INSET, y, PANEL_FONT_SIZE, self.mono, PALETTE.art);
            y += line_height;
            drawn = true;
        }
        if drawn {
            y + INSET
        } else {
            y
        }
    }

    fn info_grid(&mut self, width: f32, y: f32, bottom: f32) -> f32 {
        let (columns, column_width) = grid_columns(width - INSET * 2.0);
        let rows_per_column = INFO_ROWS.len().div_ceil(columns);
        let row_height = PANEL_FONT_SIZE * PANEL_ROW_FACTOR;
        let room = ((bottom - y - PANEL_PADDING * 2.0) / row_height).floor();
        if room < 1.0 {
            return y;
        }
        let visible = rows_per_column.min(room as usize);

        let mono = self.mono;
        let measure = |s: &str| measure_text(mono, s, PANEL_FONT_SIZE);
        let label_width = INFO_ROWS
            .iter()
            .map(|(label, _)| measure(&format!("{label}:")))
            .fold(0.0_f32, f32::max)
            + LABEL_GAP;
        let value_width = column_width - PANEL_PADDING * 2.0 - label_width;

        for (column, rows) in INFO_ROWS.chunks(rows_per_column).enumerate() {
            let rows = &rows[..rows.len().min(visible)];
            let x = INSET + column as f32 * (column_width + COLUMN_GAP);
            self.list.push(PaintCommand::FillRoundRect {
                rect: Rect::new(x, y, column_width, rows.len() as f32 * row_height + PANEL_PADDING * 2.0),
                radii: CornerRadii::uniform(PANEL_RADIUS),
                brush: Brush::Solid(PALETTE.panel),
            });
            let mut row_y = y + PANEL_PADDING;
            for (label, value) in rows {
                self.text(&format!("{label}:"), x + PANEL_PADDING, row_y, PANEL_FONT_SIZE, mono, PALETTE.label);
                let shown = truncate_to_width(value, value_width, measure);
                self.text(&shown, x + PANEL_PADDING + label_width, row_y, PANEL_FONT_SIZE, mono, PALETTE.text);
                row_y += row_height;
            }
        }

        y + visible as f32 * row_height + PANEL_PADDING * 2.0 + INSET
    }

    fn trailing_prompt(&mut self, size: f32, y: f32, bottom: f32) {
        if y + size > bottom {
            return;
        }
        let face = self.text_face;
        self.text(PROMPT, INSET, y, size, face, PALETTE.prompt);
        let x = INSET + measure_text(face, &format!("{PROMPT} "), size);
        self.list.push(PaintCommand::FillRoundRect {
            rect: Rect::new(x, y, size * CURSOR_WIDTH_FACTOR, size),
            radii: CornerRadii::default(),
            brush: Brush::Solid(PALETTE.text),
        });
    }
}
