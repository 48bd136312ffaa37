use super::*;

#[test]
fn publish_copies_into_the_destination() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("take3.wav");
    std::fs::write(&src, b"RIFF narration bytes").unwrap();
    let asset = AudioAsset {
        path: src.clone(),
        duration_secs: 3.0,
    };

    let dest = dir.path().join("out").join("voiceover.wav");
    let published = asset.publish_to(&dest).unwrap();

    assert_eq!(published.path, dest);
    assert_eq!(published.duration_secs, 3.0);
    assert_eq!(std::fs::read(&dest).unwrap(), b"RIFF narration bytes");
    assert_eq!(std::fs::read(&src).unwrap(), b"RIFF narration bytes");
    assert_eq!(std::fs::read_dir(dir.path().join("out")).unwrap().count(), 1);
}

#[test]
fn publish_onto_itself_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("voiceover.wav");
    std::fs::write(&src, b"keep me").unwrap();
    let asset = AudioAsset {
        path: src.clone(),
        duration_secs: 1.5,
    };

    assert_eq!(asset.publish_to(&src).unwrap(), asset);
    assert_eq!(std::fs::read(&src).unwrap(), b"keep me");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn publish_of_a_missing_file_leaves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let asset = AudioAsset {
        path: dir.path().join("gone.wav"),
        duration_secs: 1.0,
    };
    let dest = dir.path().join("voiceover.wav");
    assert!(asset.publish_to(&dest).is_err());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
