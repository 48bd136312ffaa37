//! Rasterization collaborators.
//!
//! Frame sources never draw pixels themselves: they hand a data window or a title card to a
//! renderer and wrap the returned `rgb24` buffer in a [`frame::Frame`]. [`svg::SvgRenderer`] is
//! the built-in implementation.

use kurbo::{Point, Rect};

use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::ExplainerResult;

/// Immutable raster frames and pixel helpers.
pub mod frame;
/// SVG + `resvg` renderer.
pub mod svg;

/// The visible prefix of a dataset plus the fixed axis bounds of the whole dataset.
///
/// Bounds stay constant across a reveal so that frames only differ by the drawn line.
#[derive(Clone, Copy, Debug)]
pub struct DataWindow<'a> {
    /// Visible points, in data space, in x order.
    pub points: &'a [Point],
    /// Axis bounds in data space (`x0..x1` horizontal, `y0..y1` vertical).
    pub bounds: Rect,
}

/// Chart look. Defaults reproduce the stock explainer chart.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub line_color: Rgb8,
    pub line_width: f64,
    pub background: Rgb8,
    pub foreground: Rgb8,
    pub font_family: String,
    /// Number of labelled ticks per axis (including both ends).
    pub ticks: u32,
    /// Headroom added above the maximum and below the minimum value.
    pub y_padding: f64,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            title: "Ethiopian Economic Trends".to_string(),
            x_label: "Year".to_string(),
            y_label: "GDP (in billions)".to_string(),
            line_color: Rgb8::BLUE,
            line_width: 2.0,
            background: Rgb8::WHITE,
            foreground: Rgb8::BLACK,
            font_family: "sans-serif".to_string(),
            ticks: 5,
            y_padding: 5.0,
        }
    }
}

/// Text shown on a title card.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TitleCard {
    pub title: String,
    pub description: String,
}

/// Title card look. Positions and sizes are in `design` space and scale with the output canvas.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CardStyle {
    pub design: Canvas,
    pub background: Rgb8,
    pub foreground: Rgb8,
    pub font_family: String,
    /// Baseline origin of the title.
    pub title_origin: (f64, f64),
    pub title_size: f64,
    /// Baseline origin of the description.
    pub description_origin: (f64, f64),
    pub description_size: f64,
}

impl Default for CardStyle {
    fn default() -> Self {
        Self {
            design: Canvas::HD,
            background: Rgb8::BLACK,
            foreground: Rgb8::WHITE,
            font_family: "sans-serif".to_string(),
            title_origin: (50.0, 200.0),
            title_size: 64.0,
            description_origin: (50.0, 400.0),
            description_size: 32.0,
        }
    }
}

/// Renders one chart frame from a data window.
///
/// Implementations must be pure: the same window, style and canvas always give the same bytes.
pub trait ChartRenderer {
    /// Return packed `rgb24` pixels of exactly `canvas` size.
    fn render_chart(
        &mut self,
        window: &DataWindow<'_>,
        style: &ChartStyle,
        canvas: Canvas,
    ) -> ExplainerResult<Vec<u8>>;
}

/// Renders a static title card.
pub trait CardRenderer {
    /// Return packed `rgb24` pixels of exactly `canvas` size.
    fn render_card(
        &mut self,
        card: &TitleCard,
        style: &CardStyle,
        canvas: Canvas,
    ) -> ExplainerResult<Vec<u8>>;
}
