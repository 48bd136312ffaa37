use super::*;
use crate::foundation::core::Rgb8;

fn config() -> StreamConfig {
    StreamConfig::new(Canvas::new(4, 2), Fps::whole(24).unwrap())
}

#[test]
fn writes_are_fifo_with_timestamps_at_index_over_rate() {
    let mut enc = InMemoryEncoder::open(config()).unwrap();
    let colors = [Rgb8::BLACK, Rgb8::WHITE, Rgb8::BLUE];
    for (i, c) in colors.iter().enumerate() {
        enc.write(&Frame::solid(FrameIndex(i as u64), Canvas::new(4, 2), *c))
            .unwrap();
    }
    enc.close().unwrap();

    assert_eq!(enc.stream().frames_written(), 3);
    assert!((enc.stream().duration_secs() - 3.0 / 24.0).abs() < 1e-12);
    for (i, f) in enc.frames().iter().enumerate() {
        assert_eq!(f.index, FrameIndex(i as u64));
        assert!((f.timestamp_secs - i as f64 / 24.0).abs() < 1e-12);
        assert_eq!(
            f.fingerprint,
            Frame::solid(FrameIndex(0), Canvas::new(4, 2), colors[i]).fingerprint()
        );
    }
}

#[test]
fn wrong_size_frame_is_dimension_mismatch() {
    let mut enc = InMemoryEncoder::open(config()).unwrap();
    let err = enc
        .write(&Frame::solid(FrameIndex(0), Canvas::new(2, 2), Rgb8::BLACK))
        .unwrap_err();
    assert!(matches!(
        err,
        ExplainerError::DimensionMismatch { expected, got }
            if expected == Canvas::new(4, 2) && got == Canvas::new(2, 2)
    ));
    assert_eq!(enc.stream().frames_written(), 0);
}

#[test]
fn close_is_idempotent_and_blocks_further_writes() {
    let mut enc = InMemoryEncoder::open(config()).unwrap();
    enc.close().unwrap();
    enc.close().unwrap();
    assert!(enc.is_closed());
    assert!(
        enc.write(&Frame::solid(FrameIndex(0), Canvas::new(4, 2), Rgb8::BLACK))
            .is_err()
    );
}

#[test]
fn stream_config_validation_requires_even_size() {
    assert!(config().validate().is_ok());
    let odd = StreamConfig::new(Canvas::new(5, 2), Fps::whole(24).unwrap());
    assert!(odd.validate().is_err());
    assert!(InMemoryEncoder::open(odd).is_ok());
}
