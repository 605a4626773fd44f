use banner_forge::rendering::{render_to_pixmap, RenderResources};
use banner_forge::{BannerSettings, Color, ColorStop, Fill, Gradient};
use tiny_skia::Pixmap;

fn flat(background: Fill) -> BannerSettings {
    BannerSettings {
        width: 200,
        height: 100,
        corner_radius: 0,
        outline_thickness: 0,
        background_color: background,
        text: String::new(),
        ..Default::default()
    }
}

fn rgb(pm: &Pixmap, x: u32, y: u32) -> (u8, u8, u8) {
    let px = pm.pixel(x, y).expect("pixel in bounds");
    (px.red(), px.green(), px.blue())
}

fn near(actual: (u8, u8, u8), expected: (u8, u8, u8), tolerance: u8) -> bool {
    actual.0.abs_diff(expected.0) <= tolerance
        && actual.1.abs_diff(expected.1) <= tolerance
        && actual.2.abs_diff(expected.2) <= tolerance
}

fn red_to_blue() -> Vec<ColorStop> {
    vec![
        ColorStop::new(0.0, Color::rgb(255, 0, 0)),
        ColorStop::new(100.0, Color::rgb(0, 0, 255)),
    ]
}

#[test]
fn solid_background_is_exact() {
    let pm = render_to_pixmap(&flat(Color::rgb(12, 34, 56).into()), &RenderResources::default()).unwrap();
    for (x, y) in [(0, 0), (100, 50), (199, 99)] {
        assert_eq!(rgb(&pm, x, y), (12, 34, 56));
    }
}

#[test]
fn linear_zero_degrees_runs_left_to_right() {
    let pm = render_to_pixmap(&flat(Gradient::linear(0.0, red_to_blue()).into()), &RenderResources::default()).unwrap();
    let start = rgb(&pm, 0, 50);
    let end = rgb(&pm, 199, 50);
    assert!(near(start, (255, 0, 0), 4), "start {:?}", start);
    assert!(near(end, (0, 0, 255), 4), "end {:?}", end);
    // Constant along the cross axis.
    assert_eq!(rgb(&pm, 100, 0), rgb(&pm, 100, 99));
}

#[test]
fn linear_ninety_degrees_runs_top_to_bottom() {
    let pm = render_to_pixmap(&flat(Gradient::linear(90.0, red_to_blue()).into()), &RenderResources::default()).unwrap();
    assert!(near(rgb(&pm, 100, 0), (255, 0, 0), 8));
    assert!(near(rgb(&pm, 100, 99), (0, 0, 255), 8));
}

#[test]
fn radial_pads_with_last_stop_beyond_radius() {
    let pm = render_to_pixmap(&flat(Gradient::radial(red_to_blue()).into()), &RenderResources::default()).unwrap();
    assert!(near(rgb(&pm, 100, 50), (255, 0, 0), 4));
    assert!(near(rgb(&pm, 0, 0), (0, 0, 255), 1));
    assert!(near(rgb(&pm, 199, 99), (0, 0, 255), 1));
}

#[test]
fn single_stop_gradient_draws_solid() {
    let fill = Gradient::linear(30.0, vec![ColorStop::new(40.0, Color::rgb(7, 8, 9))]).into();
    let pm = render_to_pixmap(&flat(fill), &RenderResources::default()).unwrap();
    assert_eq!(rgb(&pm, 0, 0), (7, 8, 9));
    assert_eq!(rgb(&pm, 199, 99), (7, 8, 9));
}
