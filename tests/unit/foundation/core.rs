use super::*;

#[test]
fn fps_parses_integer_and_rational_forms() {
    assert_eq!("24".parse::<Fps>().unwrap(), Fps::new(24, 1).unwrap());
    assert_eq!(
        "30000/1001".parse::<Fps>().unwrap(),
        Fps::new(30000, 1001).unwrap()
    );
    assert!("0".parse::<Fps>().is_err());
    assert!("24/0".parse::<Fps>().is_err());
    assert!("abc".parse::<Fps>().is_err());
}

#[test]
fn fps_frames_to_secs_is_count_over_rate() {
    let fps = Fps::new(2, 1).unwrap();
    assert_eq!(fps.frames_to_secs(21), 10.5);
    let fps = Fps::new(24, 1).unwrap();
    assert!((fps.frames_to_secs(120) - 5.0).abs() < 1e-12);
}

#[test]
fn fps_display_round_trips_through_parse() {
    for s in ["24", "30000/1001"] {
        assert_eq!(s.parse::<Fps>().unwrap().to_string(), s);
    }
}

#[test]
fn canvas_parse_and_encode_validation() {
    let c: Canvas = "1280x720".parse().unwrap();
    assert_eq!(c, Canvas::HD);
    assert_eq!(c.rgb_len(), 1280 * 720 * 3);
    c.validate_for_encode().unwrap();

    assert!(Canvas::new(0, 10).validate_for_encode().is_err());
    assert!(Canvas::new(11, 10).validate_for_encode().is_err());
    assert!("1280".parse::<Canvas>().is_err());
}

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(FrameRange::new(FrameIndex(3), FrameIndex(2)).is_err());
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert_eq!(r.len_frames(), 3);
    assert!(!r.is_empty());
}

#[test]
fn rgb_hex_is_lowercase_six_digits() {
    assert_eq!(Rgb8::BLUE.to_hex(), "#0000ff");
    assert_eq!(Rgb8::new(1, 2, 255).to_hex(), "#0102ff");
}
