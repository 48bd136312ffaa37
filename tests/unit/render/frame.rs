use super::*;

#[test]
fn from_rgb_checks_buffer_length() {
    let canvas = Canvas::new(2, 2);
    assert!(Frame::from_rgb(FrameIndex(0), canvas, vec![0; 12]).is_ok());
    assert!(Frame::from_rgb(FrameIndex(0), canvas, vec![0; 11]).is_err());
}

#[test]
fn fingerprint_ignores_index_but_not_pixels() {
    let canvas = Canvas::new(4, 2);
    let a = Frame::solid(FrameIndex(0), canvas, Rgb8::WHITE);
    let b = a.with_index(FrameIndex(7));
    let c = Frame::solid(FrameIndex(0), canvas, Rgb8::BLACK);

    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_ne!(a.fingerprint(), c.fingerprint());
    assert_eq!(b.index(), FrameIndex(7));
}

#[test]
fn rescale_changes_size_and_keeps_solid_color() {
    let frame = Frame::solid(FrameIndex(3), Canvas::new(8, 4), Rgb8::new(10, 200, 30));
    let out = frame.rescaled(Canvas::new(16, 10)).unwrap();
    assert_eq!(out.canvas(), Canvas::new(16, 10));
    assert_eq!(out.data().len(), 16 * 10 * 3);
    assert_eq!(out.index(), FrameIndex(3));
    assert_eq!(out.pixel(15, 9), Some(Rgb8::new(10, 200, 30)));
    assert_eq!(out.pixel(16, 0), None);
}

#[test]
fn rescale_to_same_size_is_identity() {
    let frame = Frame::solid(FrameIndex(0), Canvas::new(4, 4), Rgb8::BLUE);
    assert_eq!(frame.rescaled(Canvas::new(4, 4)).unwrap(), frame);
    assert!(frame.rescaled(Canvas::new(0, 4)).is_err());
}

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let out = rgb_from_premul_rgba(&[0, 0, 0, 0], Rgb8::new(10, 20, 30)).unwrap();
    assert_eq!(out, vec![10, 20, 30]);
}

#[test]
fn flatten_premul_alpha_255_drops_alpha() {
    let out = rgb_from_premul_rgba(&[1, 2, 3, 255, 4, 5, 6, 255], Rgb8::BLACK).unwrap();
    assert_eq!(out, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn flatten_premul_half_alpha_over_white() {
    // Premultiplied red @ ~50% over white: r = 128 + 127, g = b = 127.
    let out = rgb_from_premul_rgba(&[128, 0, 0, 128], Rgb8::WHITE).unwrap();
    assert_eq!(out, vec![255, 127, 127]);
    assert!(rgb_from_premul_rgba(&[1, 2, 3], Rgb8::WHITE).is_err());
}
