use std::sync::Arc;

use banner_forge::fonts::{system_typeface, FontCache, FontLoader, OfflineFetcher};
use banner_forge::rendering::icon::{decode_svg, icon_rect};
use banner_forge::rendering::paint::{PaintCommand, TextBaseline};
use banner_forge::rendering::terminal::{HEADER_HEIGHT, PROMPT};
use banner_forge::rendering::{render_to_pixmap, theme_renderer, RenderResources};
use banner_forge::{BannerRenderer, BannerSettings, Color, RendererConfig, TextAlign, Theme, VerticalAlign};

fn offline_renderer() -> BannerRenderer {
    let fonts = FontLoader::with_cache(Arc::new(OfflineFetcher), Arc::new(FontCache::new()));
    BannerRenderer::with_font_loader(RendererConfig::offline(), fonts)
}

fn hello() -> BannerSettings {
    BannerSettings {
        width: 1200,
        height: 630,
        text: "Hello".to_string(),
        text_align: TextAlign::Center,
        vertical_align: VerticalAlign::Middle,
        font_size: 72,
        ..Default::default()
    }
}

fn terminal(text: &str) -> BannerSettings {
    BannerSettings {
        theme: Theme::OsWindow,
        window_title: "bash".to_string(),
        text: text.to_string(),
        ..Default::default()
    }
}

#[test]
fn default_theme_centers_single_line() {
    let settings = hello();
    let list = theme_renderer(settings.theme).compose(&settings, &RenderResources::default());
    let runs: Vec<_> = list.text_runs().collect();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].text, "Hello");
    assert_eq!((runs[0].x, runs[0].y), (600.0, 315.0));
    assert_eq!(runs[0].align, TextAlign::Center);
    assert_eq!(runs[0].baseline, TextBaseline::Middle);
    assert_eq!(runs[0].size, 72.0);
}

#[test]
fn icon_is_painted_before_text() {
    let settings = BannerSettings { icon: "heart".into(), ..hello() };
    let svg = settings.icon_source().expect("heart icon");
    let icon = banner_forge::rendering::icon::decode_svg(svg, 126).expect("decode");
    let resources = RenderResources { icon: Some(Arc::new(icon)), ..Default::default() };

    let list = theme_renderer(settings.theme).compose(&settings, &resources);
    let icon_at = list
        .commands()
        .iter()
        .position(|c| matches!(c, PaintCommand::Image { .. }))
        .expect("icon command");
    let text_at = list
        .commands()
        .iter()
        .position(|c| matches!(c, PaintCommand::Text(_)))
        .expect("text command");
    assert!(icon_at < text_at);
}

#[test]
fn text_stays_on_top_of_the_icon_in_pixels() {
    let Some(face) = system_typeface("sans-serif", false) else {
        println!("No system font found. Skipping.");
        return;
    };
    let settings = BannerSettings {
        icon: "circle".into(),
        text: "MMMM".to_string(),
        font_size: 160,
        font_color: Color::rgb(255, 0, 0).into(),
        ..hello()
    };
    let area = icon_rect(settings.width, settings.height);
    let svg = settings.icon_source().expect("circle icon");
    let icon = decode_svg(svg, area.width as u32).expect("decode");

    let text_only = RenderResources { text_face: Some(face.clone()), ..Default::default() };
    let with_icon = RenderResources { icon: Some(Arc::new(icon)), ..text_only.clone() };
    let plain = render_to_pixmap(&settings, &text_only).expect("text only");
    let layered = render_to_pixmap(&settings, &with_icon).expect("with icon");

    let mut glyph_pixels = 0;
    let mut icon_pixels = 0;
    for y in area.y as u32..(area.y + area.height) as u32 {
        for x in area.x as u32..(area.x + area.width) as u32 {
            let below = plain.pixel(x, y).expect("pixel");
            let above = layered.pixel(x, y).expect("pixel");
            let rgba = |p: tiny_skia::PremultipliedColorU8| (p.red(), p.green(), p.blue(), p.alpha());
            if rgba(below) == (255, 0, 0, 255) {
                glyph_pixels += 1;
                assert_eq!(rgba(above), (255, 0, 0, 255), "icon covers text at ({}, {})", x, y);
            } else if rgba(above) != rgba(below) {
                icon_pixels += 1;
            }
        }
    }
    assert!(glyph_pixels > 0, "text never crosses the icon area");
    assert!(icon_pixels > 0, "icon left no visible pixels");
}

#[test]
fn os_window_theme_header_and_command() {
    let settings = terminal("ls -la");
    let list = theme_renderer(settings.theme).compose(&settings, &RenderResources::default());

    let dots = list
        .commands()
        .iter()
        .filter(|c| matches!(c, PaintCommand::FillCircle { cy, .. } if *cy < HEADER_HEIGHT))
        .count();
    assert_eq!(dots, 3);

    let title = list.text_runs().find(|r| r.text == "bash").expect("title");
    assert_eq!(title.x, settings.width as f32 / 2.0);
    assert!(title.y < HEADER_HEIGHT);

    let body: Vec<_> = list.text_runs().filter(|r| r.y > HEADER_HEIGHT).collect();
    assert_eq!(body[0].text, PROMPT);
    assert_eq!(body[1].text, "ls -la");
    assert_eq!(body[0].y, body[1].y);
}

#[tokio::test]
async fn full_render_commits_requested_size() {
    let renderer = offline_renderer();
    let outcome = renderer.render(&hello()).await.expect("render");
    assert!(outcome.is_committed());

    let shot = renderer.snapshot().expect("snapshot");
    assert_eq!((shot.width, shot.height), (1200, 630));
    assert!(shot.to_data_url().starts_with("data:image/png;base64,"));

    // Background shows at the center-left, clear of text and outline.
    let px = renderer.with_surface(|pm| pm.pixel(60, 315)).flatten().expect("pixel");
    assert_eq!((px.red(), px.green(), px.blue(), px.alpha()), (0x16, 0x1b, 0x22, 255));
}

#[tokio::test]
async fn full_render_of_terminal_theme() {
    let renderer = offline_renderer();
    let outcome = renderer.render(&terminal("ls -la")).await.expect("render");
    assert!(outcome.is_committed());

    // Header band color just right of the traffic lights.
    let header = renderer.with_surface(|pm| pm.pixel(80, 5)).flatten().expect("pixel");
    assert_eq!((header.red(), header.green(), header.blue()), (0x30, 0x36, 0x3d));
    // Body band near the bottom-right, away from any content.
    let body = renderer.with_surface(|pm| pm.pixel(1190, 600)).flatten().expect("pixel");
    assert_eq!((body.red(), body.green(), body.blue()), (30, 30, 46));
}

#[tokio::test]
async fn uploaded_garbage_icon_does_not_fail_render() {
    let renderer = offline_renderer();
    let settings = BannerSettings {
        uploaded_icon_svg: Some("definitely not svg".into()),
        ..hello()
    };
    assert!(renderer.render(&settings).await.expect("render").is_committed());
}
