use super::*;
use crate::foundation::core::Canvas;

#[test]
fn open_rejects_odd_size_before_touching_disk() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("odd.mp4");
    let cfg = StreamConfig::new(Canvas::new(11, 10), Fps::whole(30).unwrap());
    let err = FfmpegEncoder::open(cfg, &out, FfmpegEncoderOpts::default())
        .err()
        .expect("odd size must be rejected");
    assert!(matches!(err, ExplainerError::Validation(_)));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn open_refuses_existing_output_without_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("taken.mp4");
    std::fs::write(&out, b"keep me").unwrap();
    let cfg = StreamConfig::new(Canvas::new(16, 16), Fps::whole(24).unwrap());
    let err = FfmpegEncoder::open(cfg, &out, FfmpegEncoderOpts { overwrite: false })
        .err()
        .expect("existing output must be refused");
    assert!(err.to_string().contains("already exists"));
    assert_eq!(std::fs::read(&out).unwrap(), b"keep me");
}

#[test]
fn input_fps_is_passed_as_rational() {
    let mut cmd = Command::new("ffmpeg");
    push_input_fps(&mut cmd, Fps::new(30000, 1001).unwrap());
    let args: Vec<String> = cmd
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    assert_eq!(args, vec!["-r".to_string(), "30000/1001".to_string()]);
}
