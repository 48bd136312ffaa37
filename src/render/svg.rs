use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use kurbo::{Affine, BezPath, Point, Rect};

use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::{ExplainerError, ExplainerResult};
use crate::render::frame::rgb_from_premul_rgba;
use crate::render::{CardRenderer, CardStyle, ChartRenderer, ChartStyle, DataWindow, TitleCard};

/// Renderer that emits an SVG document per frame and rasterizes it with `resvg`.
///
/// Clones share one font database.
#[derive(Clone)]
pub struct SvgRenderer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl std::fmt::Debug for SvgRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgRenderer")
            .field("font_faces", &self.fontdb.faces().count())
            .finish()
    }
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgRenderer {
    /// Renderer using the system fonts.
    pub fn new() -> Self {
        Self::with_font_dirs(&[])
    }

    /// Renderer using the system fonts plus every `.ttf`/`.otf`/`.ttc` in `dirs`.
    pub fn with_font_dirs(dirs: &[&Path]) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        for dir in dirs {
            load_fonts_from_dir(&mut db, dir);
        }
        tracing::debug!(faces = db.faces().count(), "svg renderer font database ready");
        Self {
            fontdb: Arc::new(db),
        }
    }

    fn rasterize(&self, svg: &str, canvas: Canvas, bg: Rgb8) -> ExplainerResult<Vec<u8>> {
        let opts = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(svg, &opts)
            .map_err(|e| ExplainerError::validation(format!("generated svg is invalid: {e}")))?;
        let premul = rasterize_svg_to_premul_rgba8(&tree, canvas.width, canvas.height)?;
        rgb_from_premul_rgba(&premul, bg)
    }
}

impl ChartRenderer for SvgRenderer {
    fn render_chart(
        &mut self,
        window: &DataWindow<'_>,
        style: &ChartStyle,
        canvas: Canvas,
    ) -> ExplainerResult<Vec<u8>> {
        let svg = chart_svg(window, style, canvas)?;
        self.rasterize(&svg, canvas, style.background)
    }
}

impl CardRenderer for SvgRenderer {
    fn render_card(
        &mut self,
        card: &TitleCard,
        style: &CardStyle,
        canvas: Canvas,
    ) -> ExplainerResult<Vec<u8>> {
        let svg = card_svg(card, style, canvas)?;
        self.rasterize(&svg, canvas, style.background)
    }
}

/// Plot area inside the canvas, leaving margins for the title and axis labels.
fn plot_area(canvas: Canvas) -> Rect {
    let w = f64::from(canvas.width);
    let h = f64::from(canvas.height);
    Rect::new(w * 0.09, h * 0.10, w * 0.97, h * 0.86)
}

/// Map data space (`bounds`, y up) onto pixel space (`area`, y down).
fn data_to_pixels(bounds: Rect, area: Rect) -> Affine {
    let sx = area.width() / bounds.width();
    let sy = area.height() / bounds.height();
    Affine::translate((area.x0, area.y1))
        * Affine::scale_non_uniform(sx, -sy)
        * Affine::translate((-bounds.x0, -bounds.y0))
}

/// Build the SVG document for one chart frame.
pub fn chart_svg(
    window: &DataWindow<'_>,
    style: &ChartStyle,
    canvas: Canvas,
) -> ExplainerResult<String> {
    let b = window.bounds;
    if !(b.width().is_finite() && b.height().is_finite()) || b.width() <= 0.0 || b.height() <= 0.0
    {
        return Err(ExplainerError::validation(format!(
            "chart bounds must have positive finite extent, got {b:?}"
        )));
    }

    let area = plot_area(canvas);
    let xf = data_to_pixels(b, area);
    let h = f64::from(canvas.height);
    let label_size = (h * 0.03).max(6.0);
    let fg = style.foreground.to_hex();
    let font = escape_xml(&style.font_family);

    let mut svg = svg_open(canvas, style.background);

    let _ = write!(
        svg,
        r#"<rect x="{:.3}" y="{:.3}" width="{:.3}" height="{:.3}" fill="none" stroke="{fg}" stroke-width="1"/>"#,
        area.x0,
        area.y0,
        area.width(),
        area.height()
    );

    let ticks = style.ticks.max(2);
    for i in 0..ticks {
        let t = f64::from(i) / f64::from(ticks - 1);
        let xv = b.x0 + t * b.width();
        let yv = b.y0 + t * b.height();
        let px = xf * Point::new(xv, b.y0);
        let py = xf * Point::new(b.x0, yv);
        let _ = write!(
            svg,
            r#"<text x="{:.3}" y="{:.3}" font-family="{font}" font-size="{label_size:.3}" fill="{fg}" text-anchor="middle">{xv:.0}</text>"#,
            px.x,
            px.y + label_size * 1.3
        );
        let _ = write!(
            svg,
            r#"<text x="{:.3}" y="{:.3}" font-family="{font}" font-size="{label_size:.3}" fill="{fg}" text-anchor="end">{yv:.0}</text>"#,
            py.x - label_size * 0.5,
            py.y + label_size * 0.35
        );
    }

    let _ = write!(
        svg,
        r#"<text x="{:.3}" y="{:.3}" font-family="{font}" font-size="{:.3}" fill="{fg}" text-anchor="middle">{}</text>"#,
        area.center().x,
        area.y0 - label_size * 0.8,
        label_size * 1.3,
        escape_xml(&style.title)
    );
    let _ = write!(
        svg,
        r#"<text x="{:.3}" y="{:.3}" font-family="{font}" font-size="{label_size:.3}" fill="{fg}" text-anchor="middle">{}</text>"#,
        area.center().x,
        h - label_size * 0.8,
        escape_xml(&style.x_label)
    );
    let (lx, ly) = (label_size * 1.2, area.center().y);
    let _ = write!(
        svg,
        r#"<text x="{lx:.3}" y="{ly:.3}" transform="rotate(-90 {lx:.3} {ly:.3})" font-family="{font}" font-size="{label_size:.3}" fill="{fg}" text-anchor="middle">{}</text>"#,
        escape_xml(&style.y_label)
    );

    if window.points.len() >= 2 {
        let mut line = BezPath::new();
        for (i, p) in window.points.iter().enumerate() {
            if !(p.x.is_finite() && p.y.is_finite()) {
                return Err(ExplainerError::validation(format!(
                    "chart point {i} is not finite: {p:?}"
                )));
            }
            if i == 0 {
                line.move_to(*p);
            } else {
                line.line_to(*p);
            }
        }
        line.apply_affine(xf);
        let _ = write!(
            svg,
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="{:.3}" stroke-linejoin="round" stroke-linecap="round"/>"#,
            line.to_svg(),
            style.line_color.to_hex(),
            style.line_width
        );
    }

    svg.push_str("</svg>");
    Ok(svg)
}

/// Build the SVG document for a title card.
pub fn card_svg(card: &TitleCard, style: &CardStyle, canvas: Canvas) -> ExplainerResult<String> {
    if style.design.width == 0 || style.design.height == 0 {
        return Err(ExplainerError::validation(
            "card design size must be non-zero",
        ));
    }
    let sx = f64::from(canvas.width) / f64::from(style.design.width);
    let sy = f64::from(canvas.height) / f64::from(style.design.height);
    let fg = style.foreground.to_hex();
    let font = escape_xml(&style.font_family);

    let mut svg = svg_open(canvas, style.background);
    let _ = write!(
        svg,
        r#"<g transform="matrix({sx} 0 0 {sy} 0 0)" font-family="{font}" fill="{fg}">"#
    );
    for (text, (x, y), size) in [
        (&card.title, style.title_origin, style.title_size),
        (
            &card.description,
            style.description_origin,
            style.description_size,
        ),
    ] {
        if text.is_empty() {
            continue;
        }
        let _ = write!(
            svg,
            r#"<text x="{x:.3}" y="{y:.3}" font-size="{size:.3}">{}</text>"#,
            escape_xml(text)
        );
    }
    svg.push_str("</g></svg>");
    Ok(svg)
}

fn svg_open(canvas: Canvas, bg: Rgb8) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><rect width="{w}" height="{h}" fill="{}"/>"#,
        bg.to_hex(),
        w = canvas.width,
        h = canvas.height
    )
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> ExplainerResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| ExplainerError::validation("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory is not readable, skipping");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to load font file");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg.rs"]
mod tests;
