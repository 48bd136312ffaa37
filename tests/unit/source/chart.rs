use super::*;

/// Encodes the window length and bounds into the pixels so tests can read them back.
struct WindowProbe;

impl ChartRenderer for WindowProbe {
    fn render_chart(
        &mut self,
        window: &DataWindow<'_>,
        _style: &ChartStyle,
        canvas: Canvas,
    ) -> ExplainerResult<Vec<u8>> {
        let mut out = vec![0u8; canvas.rgb_len()];
        out[0] = window.points.len() as u8;
        out[1] = window.bounds.y0 as u8;
        out[2] = window.bounds.y1 as u8;
        Ok(out)
    }
}

/// Fails on the window of a given length.
struct FailAt(usize);

impl ChartRenderer for FailAt {
    fn render_chart(
        &mut self,
        window: &DataWindow<'_>,
        _style: &ChartStyle,
        canvas: Canvas,
    ) -> ExplainerResult<Vec<u8>> {
        if window.points.len() == self.0 {
            return Err(ExplainerError::validation("plot backend crashed"));
        }
        Ok(vec![0u8; canvas.rgb_len()])
    }
}

fn inline(y: &[f64]) -> Dataset {
    DatasetSpec::Inline {
        x: (0..y.len()).map(|i| 2000.0 + i as f64).collect(),
        y: y.to_vec(),
    }
    .build()
    .unwrap()
}

#[test]
fn seeded_dataset_is_deterministic_and_within_step_bounds() {
    let spec = DatasetSpec::default();
    let a = spec.build().unwrap();
    let b = spec.build().unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), 21);
    assert_eq!(a.points()[0].x, 2000.0);
    assert_eq!(a.points()[20].x, 2020.0);

    let mut prev = 50.0;
    for p in a.points() {
        let step = p.y - prev;
        assert!((-1.0..5.0).contains(&step), "step {step} out of range");
        prev = p.y;
    }

    let other = DatasetSpec::Seeded {
        seed: 7,
        x_start: 2000.0,
        len: 21,
        base: 50.0,
        min_step: -1.0,
        max_step: 5.0,
    }
    .build()
    .unwrap();
    assert_ne!(a, other);
}

#[test]
fn dataset_validation() {
    assert!(
        DatasetSpec::Inline {
            x: vec![1.0, 2.0],
            y: vec![1.0]
        }
        .build()
        .is_err()
    );
    assert!(Dataset::new(vec![]).is_err());
    assert!(Dataset::new(vec![Point::new(1.0, 0.0), Point::new(1.0, 1.0)]).is_err());
    assert!(Dataset::new(vec![Point::new(f64::NAN, 0.0)]).is_err());
    assert!(
        DatasetSpec::Seeded {
            seed: 0,
            x_start: 0.0,
            len: 3,
            base: 0.0,
            min_step: 2.0,
            max_step: 1.0,
        }
        .build()
        .is_err()
    );
}

#[test]
fn bounds_pad_y_and_widen_degenerate_extents() {
    let d = inline(&[10.0, 30.0, 20.0]);
    assert_eq!(d.bounds(5.0), Rect::new(2000.0, 5.0, 2002.0, 35.0));

    let single = inline(&[10.0]);
    assert_eq!(single.bounds(0.0), Rect::new(1999.5, 9.5, 2000.5, 10.5));
}

#[test]
fn reveal_frame_i_shows_prefix_of_len_i_plus_one_on_fixed_axes() {
    let d = inline(&[10.0, 30.0, 20.0, 40.0]);
    let mut src = ChartRevealSource::new(
        "chart",
        Fps::whole(2).unwrap(),
        Canvas::new(4, 4),
        d,
        ChartStyle::default(),
        Box::new(WindowProbe),
    )
    .unwrap();
    assert_eq!(src.spec().frame_count, 4);

    let mut i = 0u8;
    while let Some(frame) = src.next_frame().unwrap() {
        assert_eq!(frame.index(), FrameIndex(u64::from(i)));
        assert_eq!(frame.data()[0], i + 1);
        assert_eq!(frame.data()[1], 5);
        assert_eq!(frame.data()[2], 45);
        i += 1;
    }
    assert_eq!(i, 4);
    assert!(src.next_frame().unwrap().is_none());
}

#[test]
fn fresh_instances_produce_identical_sequences() {
    let run = || {
        let mut src = ChartRevealSource::new(
            "chart",
            Fps::whole(2).unwrap(),
            Canvas::new(4, 4),
            DatasetSpec::default().build().unwrap(),
            ChartStyle::default(),
            Box::new(WindowProbe),
        )
        .unwrap();
        let mut prints = Vec::new();
        while let Some(f) = src.next_frame().unwrap() {
            prints.push(f.fingerprint());
        }
        prints
    };
    assert_eq!(run(), run());
}

#[test]
fn renderer_failure_names_segment_and_frame() {
    let mut src = ChartRevealSource::new(
        "chart",
        Fps::whole(2).unwrap(),
        Canvas::new(4, 4),
        inline(&[1.0, 2.0, 3.0, 4.0, 5.0]),
        ChartStyle::default(),
        Box::new(FailAt(3)),
    )
    .unwrap();
    assert!(src.next_frame().unwrap().is_some());
    assert!(src.next_frame().unwrap().is_some());
    let err = src.next_frame().unwrap_err();
    match err {
        ExplainerError::RenderFailure {
            segment,
            frame,
            message,
        } => {
            assert_eq!(segment, "chart");
            assert_eq!(frame, 2);
            assert!(message.contains("plot backend crashed"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
