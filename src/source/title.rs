use std::sync::Arc;

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ExplainerError, ExplainerResult};
use crate::render::frame::Frame;
use crate::render::{CardRenderer, CardStyle, TitleCard};
use crate::source::{FrameSource, SegmentSpec};

/// Static-text segment: the same title card for every frame.
///
/// The card is rasterized once, on the first pull, and every frame shares its pixels.
pub struct TitleCardSource {
    spec: SegmentSpec,
    card: TitleCard,
    style: CardStyle,
    renderer: Box<dyn CardRenderer>,
    pixels: Option<Arc<Vec<u8>>>,
    next: u64,
}

impl TitleCardSource {
    pub fn new(
        spec: SegmentSpec,
        card: TitleCard,
        style: CardStyle,
        renderer: Box<dyn CardRenderer>,
    ) -> ExplainerResult<Self> {
        spec.validate()?;
        Ok(Self {
            spec,
            card,
            style,
            renderer,
            pixels: None,
            next: 0,
        })
    }

    fn card_pixels(&mut self) -> ExplainerResult<Arc<Vec<u8>>> {
        if let Some(p) = &self.pixels {
            return Ok(Arc::clone(p));
        }
        let rgb = self
            .renderer
            .render_card(&self.card, &self.style, self.spec.canvas)
            .map_err(|e| ExplainerError::render(&self.spec.name, self.next, e.to_string()))?;
        if rgb.len() != self.spec.canvas.rgb_len() {
            return Err(ExplainerError::render(
                &self.spec.name,
                self.next,
                format!(
                    "card renderer returned {} bytes, expected {}",
                    rgb.len(),
                    self.spec.canvas.rgb_len()
                ),
            ));
        }
        let rgb = Arc::new(rgb);
        self.pixels = Some(Arc::clone(&rgb));
        Ok(rgb)
    }
}

impl FrameSource for TitleCardSource {
    fn spec(&self) -> &SegmentSpec {
        &self.spec
    }

    fn next_frame(&mut self) -> ExplainerResult<Option<Frame>> {
        if self.next >= self.spec.frame_count {
            return Ok(None);
        }
        let pixels = self.card_pixels()?;
        let frame = Frame::from_shared(FrameIndex(self.next), self.spec.canvas, pixels)?;
        self.next += 1;
        Ok(Some(frame))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/title.rs"]
mod tests;
