use kurbo::{Point, Rect};
use xxhash_rust::xxh3::xxh3_64;

use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{ExplainerError, ExplainerResult};
use crate::render::frame::Frame;
use crate::render::{ChartRenderer, ChartStyle, DataWindow};
use crate::source::{FrameSource, SegmentSpec};

/// How to obtain the chart's data series.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatasetSpec {
    /// Explicit series.
    Inline { x: Vec<f64>, y: Vec<f64> },
    /// Random walk `base + cumsum(uniform(min_step, max_step))` at `x_start, x_start + 1, ...`,
    /// fully determined by `seed`.
    Seeded {
        seed: u64,
        x_start: f64,
        len: u32,
        base: f64,
        min_step: f64,
        max_step: f64,
    },
}

impl Default for DatasetSpec {
    /// Twenty-one yearly values from 2000 to 2020.
    fn default() -> Self {
        Self::Seeded {
            seed: 0,
            x_start: 2000.0,
            len: 21,
            base: 50.0,
            min_step: -1.0,
            max_step: 5.0,
        }
    }
}

impl DatasetSpec {
    /// Materialize the series.
    pub fn build(&self) -> ExplainerResult<Dataset> {
        match self {
            DatasetSpec::Inline { x, y } => {
                if x.len() != y.len() {
                    return Err(ExplainerError::validation(format!(
                        "dataset x has {} values but y has {}",
                        x.len(),
                        y.len()
                    )));
                }
                Dataset::new(
                    x.iter()
                        .zip(y.iter())
                        .map(|(&x, &y)| Point::new(x, y))
                        .collect(),
                )
            }
            DatasetSpec::Seeded {
                seed,
                x_start,
                len,
                base,
                min_step,
                max_step,
            } => {
                if min_step.is_nan() || max_step.is_nan() || min_step > max_step {
                    return Err(ExplainerError::validation(
                        "seeded dataset min_step must be <= max_step",
                    ));
                }
                let mut acc = 0.0;
                let points = (0..*len)
                    .map(|i| {
                        acc += min_step + unit_sample(*seed, u64::from(i)) * (max_step - min_step);
                        Point::new(x_start + f64::from(i), base + acc)
                    })
                    .collect();
                Dataset::new(points)
            }
        }
    }
}

/// Deterministic sample in `[0, 1)` for `(seed, i)`.
fn unit_sample(seed: u64, i: u64) -> f64 {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&seed.to_le_bytes());
    key[8..].copy_from_slice(&i.to_le_bytes());
    (xxh3_64(&key) >> 11) as f64 / (1u64 << 53) as f64
}

/// A validated, x-ordered data series.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    points: Vec<Point>,
}

impl Dataset {
    /// Validate that the series is non-empty, finite and strictly increasing in x.
    pub fn new(points: Vec<Point>) -> ExplainerResult<Self> {
        if points.is_empty() {
            return Err(ExplainerError::validation("dataset must contain at least one point"));
        }
        for (i, p) in points.iter().enumerate() {
            if !(p.x.is_finite() && p.y.is_finite()) {
                return Err(ExplainerError::validation(format!(
                    "dataset point {i} is not finite"
                )));
            }
            if i > 0 && p.x <= points[i - 1].x {
                return Err(ExplainerError::validation(format!(
                    "dataset x values must be strictly increasing (index {i})"
                )));
            }
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Axis bounds covering the whole series, with `y_padding` above and below.
    ///
    /// Degenerate extents (one point, flat series with no padding) are widened by one unit so the
    /// bounds always have positive area.
    pub fn bounds(&self, y_padding: f64) -> Rect {
        let (mut x0, mut x1) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut y0, mut y1) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in &self.points {
            x0 = x0.min(p.x);
            x1 = x1.max(p.x);
            y0 = y0.min(p.y);
            y1 = y1.max(p.y);
        }
        let pad = y_padding.max(0.0);
        y0 -= pad;
        y1 += pad;
        if x1 <= x0 {
            x0 -= 0.5;
            x1 += 0.5;
        }
        if y1 <= y0 {
            y0 -= 0.5;
            y1 += 0.5;
        }
        Rect::new(x0, y0, x1, y1)
    }
}

/// Progressive-reveal segment: frame `i` draws the series prefix `[0..=i]` on fixed axes.
///
/// The segment has one frame per data point.
pub struct ChartRevealSource {
    spec: SegmentSpec,
    dataset: Dataset,
    bounds: Rect,
    style: ChartStyle,
    renderer: Box<dyn ChartRenderer>,
    next: u64,
}

impl ChartRevealSource {
    pub fn new(
        name: impl Into<String>,
        fps: Fps,
        canvas: Canvas,
        dataset: Dataset,
        style: ChartStyle,
        renderer: Box<dyn ChartRenderer>,
    ) -> ExplainerResult<Self> {
        let spec = SegmentSpec::new(name, fps, canvas, dataset.len() as u64)?;
        let bounds = dataset.bounds(style.y_padding);
        Ok(Self {
            spec,
            dataset,
            bounds,
            style,
            renderer,
            next: 0,
        })
    }
}

impl FrameSource for ChartRevealSource {
    fn spec(&self) -> &SegmentSpec {
        &self.spec
    }

    fn next_frame(&mut self) -> ExplainerResult<Option<Frame>> {
        if self.next >= self.spec.frame_count {
            return Ok(None);
        }
        let idx = self.next;
        let window = DataWindow {
            points: &self.dataset.points()[..=idx as usize],
            bounds: self.bounds,
        };
        let rgb = self
            .renderer
            .render_chart(&window, &self.style, self.spec.canvas)
            .map_err(|e| ExplainerError::render(&self.spec.name, idx, e.to_string()))?;
        let frame = Frame::from_rgb(FrameIndex(idx), self.spec.canvas, rgb)
            .map_err(|e| ExplainerError::render(&self.spec.name, idx, e.to_string()))?;
        self.next += 1;
        Ok(Some(frame))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/chart.rs"]
mod tests;
