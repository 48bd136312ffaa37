use super::*;

#[test]
fn segment_duration_is_count_over_rate() {
    let spec = SegmentSpec::new("chart", Fps::whole(2).unwrap(), Canvas::HD, 21).unwrap();
    assert_eq!(spec.duration_secs(), 10.5);

    let empty = SegmentSpec::new("empty", Fps::whole(24).unwrap(), Canvas::HD, 0).unwrap();
    assert_eq!(empty.duration_secs(), 0.0);
}

#[test]
fn segment_validation_rejects_bad_fields() {
    let fps = Fps::whole(24).unwrap();
    assert!(SegmentSpec::new(" ", fps, Canvas::HD, 1).is_err());
    assert!(SegmentSpec::new("a", fps, Canvas::new(0, 2), 1).is_err());
    let bad_fps = Fps { num: 0, den: 1 };
    assert!(SegmentSpec::new("a", bad_fps, Canvas::HD, 1).is_err());
}
