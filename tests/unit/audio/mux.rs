use super::*;

fn strings(args: &[OsString]) -> Vec<String> {
    args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
}

#[test]
fn video_paced_pads_and_trims_to_video_length() {
    let muxer = FfmpegMuxer::default();
    assert_eq!(muxer.policy(), MuxPolicy::VideoPaced);
    let args = strings(&muxer.args(
        Path::new("v.mp4"),
        Path::new("a.wav"),
        Path::new("out.mp4"),
        5.0,
    ));

    let pos = |flag: &str| args.iter().position(|a| a == flag).unwrap();
    assert_eq!(args[pos("-c:v") + 1], "copy");
    assert_eq!(args[pos("-c:a") + 1], "aac");
    assert_eq!(args[pos("-af") + 1], "apad");
    assert_eq!(args[pos("-t") + 1], "5.000000");
    assert_eq!(args[pos("-map_metadata") + 1], "-1");
    assert_eq!(args.last().unwrap(), "out.mp4");
    // Video first, audio second.
    let inputs: Vec<&String> = args
        .iter()
        .enumerate()
        .filter(|(i, _)| *i > 0 && args[i - 1] == "-i")
        .map(|(_, a)| a)
        .collect();
    assert_eq!(inputs, ["v.mp4", "a.wav"]);
}

#[test]
fn longest_policy_neither_pads_nor_trims() {
    let muxer = FfmpegMuxer::new(MuxPolicy::Longest);
    let args = strings(&muxer.args(
        Path::new("v.mp4"),
        Path::new("a.wav"),
        Path::new("out.mp4"),
        5.0,
    ));
    assert!(!args.iter().any(|a| a == "-t" || a == "apad"));
}

#[test]
fn output_equal_to_an_input_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("v.mp4");
    std::fs::write(&video, b"not really a video").unwrap();

    let err = FfmpegMuxer::default()
        .mux(&video, Path::new("a.wav"), &video)
        .unwrap_err();
    assert!(matches!(err, ExplainerError::Validation(_)));
    assert_eq!(std::fs::read(&video).unwrap(), b"not really a video");
}

#[test]
fn missing_video_is_container_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = FfmpegMuxer::default()
        .mux(
            &dir.path().join("missing.mp4"),
            &dir.path().join("a.wav"),
            &dir.path().join("out.mp4"),
        )
        .unwrap_err();
    assert!(matches!(err, ExplainerError::Container { .. }));
    assert!(!dir.path().join("out.mp4").exists());
}
