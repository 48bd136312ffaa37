use std::cell::Cell;
use std::rc::Rc;

use super::*;
use crate::foundation::core::{Canvas, Fps};

/// Paints the card as a solid gray whose level is the title length; counts calls.
struct CountingCard {
    calls: Rc<Cell<u32>>,
}

impl CardRenderer for CountingCard {
    fn render_card(
        &mut self,
        card: &TitleCard,
        _style: &CardStyle,
        canvas: crate::foundation::core::Canvas,
    ) -> ExplainerResult<Vec<u8>> {
        self.calls.set(self.calls.get() + 1);
        Ok(vec![card.title.len() as u8; canvas.rgb_len()])
    }
}

struct BrokenCard;

impl CardRenderer for BrokenCard {
    fn render_card(
        &mut self,
        _card: &TitleCard,
        _style: &CardStyle,
        _canvas: crate::foundation::core::Canvas,
    ) -> ExplainerResult<Vec<u8>> {
        Err(ExplainerError::validation("no fonts"))
    }
}

fn spec(frames: u64) -> SegmentSpec {
    SegmentSpec::new("title", Fps::whole(24).unwrap(), Canvas::new(8, 4), frames).unwrap()
}

fn card() -> TitleCard {
    TitleCard {
        title: "GDP".to_string(),
        description: "trend".to_string(),
    }
}

#[test]
fn yields_declared_count_of_identical_frames_rendering_once() {
    let calls = Rc::new(Cell::new(0));
    let mut src = TitleCardSource::new(
        spec(5),
        card(),
        CardStyle::default(),
        Box::new(CountingCard {
            calls: Rc::clone(&calls),
        }),
    )
    .unwrap();

    let mut frames = Vec::new();
    while let Some(f) = src.next_frame().unwrap() {
        frames.push(f);
    }
    assert_eq!(frames.len(), 5);
    assert_eq!(calls.get(), 1);
    for (i, f) in frames.iter().enumerate() {
        assert_eq!(f.index(), FrameIndex(i as u64));
        assert_eq!(f.fingerprint(), frames[0].fingerprint());
        assert_eq!(f.data()[0], 3);
    }
    assert!(src.next_frame().unwrap().is_none());
}

#[test]
fn zero_frame_segment_never_renders() {
    let calls = Rc::new(Cell::new(0));
    let mut src = TitleCardSource::new(
        spec(0),
        card(),
        CardStyle::default(),
        Box::new(CountingCard {
            calls: Rc::clone(&calls),
        }),
    )
    .unwrap();
    assert!(src.next_frame().unwrap().is_none());
    assert_eq!(calls.get(), 0);
}

#[test]
fn renderer_error_becomes_render_failure() {
    let mut src =
        TitleCardSource::new(spec(3), card(), CardStyle::default(), Box::new(BrokenCard)).unwrap();
    let err = src.next_frame().unwrap_err();
    assert!(matches!(
        err,
        ExplainerError::RenderFailure { ref segment, frame: 0, .. } if segment == "title"
    ));
}
