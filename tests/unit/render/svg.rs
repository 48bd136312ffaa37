use super::*;

fn sample_points() -> Vec<Point> {
    (0..6)
        .map(|i| Point::new(2000.0 + f64::from(i), 50.0 + f64::from(i * i)))
        .collect()
}

fn bounds() -> Rect {
    Rect::new(2000.0, 45.0, 2005.0, 80.0)
}

fn line_pixels(rgb: &[u8]) -> usize {
    rgb.chunks_exact(3)
        .filter(|p| p[2] > 150 && p[0] < 120 && p[1] < 120)
        .count()
}

#[test]
fn data_to_pixels_maps_bounds_corners_onto_plot_area() {
    let canvas = Canvas::new(200, 100);
    let area = plot_area(canvas);
    let xf = data_to_pixels(bounds(), area);

    let bottom_left = xf * Point::new(2000.0, 45.0);
    let top_right = xf * Point::new(2005.0, 80.0);
    assert!((bottom_left.x - area.x0).abs() < 1e-9);
    assert!((bottom_left.y - area.y1).abs() < 1e-9);
    assert!((top_right.x - area.x1).abs() < 1e-9);
    assert!((top_right.y - area.y0).abs() < 1e-9);
}

#[test]
fn chart_svg_escapes_labels_and_skips_single_point_line() {
    let style = ChartStyle {
        title: "GDP <&> \"growth\"".to_string(),
        ..ChartStyle::default()
    };
    let pts = sample_points();
    let one = DataWindow {
        points: &pts[..1],
        bounds: bounds(),
    };
    let svg = chart_svg(&one, &style, Canvas::new(320, 180)).unwrap();
    assert!(svg.contains("GDP &lt;&amp;&gt; &quot;growth&quot;"));
    assert!(!svg.contains("<path"));

    let all = DataWindow {
        points: &pts,
        bounds: bounds(),
    };
    let svg = chart_svg(&all, &style, Canvas::new(320, 180)).unwrap();
    assert!(svg.contains("<path d=\"M"));
    assert!(svg.contains("stroke=\"#0000ff\""));
}

#[test]
fn chart_svg_rejects_degenerate_bounds() {
    let pts = sample_points();
    let w = DataWindow {
        points: &pts,
        bounds: Rect::new(0.0, 1.0, 0.0, 2.0),
    };
    assert!(chart_svg(&w, &ChartStyle::default(), Canvas::new(64, 64)).is_err());
}

#[test]
fn render_chart_grows_line_with_window_and_is_deterministic() {
    let mut r = SvgRenderer::new();
    let style = ChartStyle::default();
    let canvas = Canvas::new(320, 180);
    let pts = sample_points();

    let mut last = 0usize;
    for n in 2..=pts.len() {
        let w = DataWindow {
            points: &pts[..n],
            bounds: bounds(),
        };
        let a = r.render_chart(&w, &style, canvas).unwrap();
        let b = r.render_chart(&w, &style, canvas).unwrap();
        assert_eq!(a.len(), canvas.rgb_len());
        assert_eq!(a, b);
        let count = line_pixels(&a);
        assert!(count > last, "window {n}: {count} <= {last}");
        last = count;
    }
}

#[test]
fn render_card_fills_background() {
    let mut r = SvgRenderer::new();
    let card = TitleCard {
        title: "Hello".to_string(),
        description: "World".to_string(),
    };
    let canvas = Canvas::new(128, 72);
    let rgb = r.render_card(&card, &CardStyle::default(), canvas).unwrap();
    assert_eq!(rgb.len(), canvas.rgb_len());
    // Bottom-right corner is far from both text baselines.
    let off = canvas.rgb_len() - 3;
    assert_eq!(&rgb[off..], &[0, 0, 0]);
}

#[test]
fn card_svg_scales_design_space_to_canvas() {
    let card = TitleCard {
        title: "T".to_string(),
        description: String::new(),
    };
    let svg = card_svg(&card, &CardStyle::default(), Canvas::new(640, 360)).unwrap();
    assert!(svg.contains("matrix(0.5 0 0 0.5 0 0)"));
    assert_eq!(svg.matches("<text").count(), 1);
}
