use super::*;

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn commit_moves_temp_into_final_path() {
    let dir = tempfile::tempdir().unwrap();
    let final_path = dir.path().join("out").join("clip.mp4");

    let pending = PendingFile::reserve(&final_path).unwrap();
    let temp = pending.temp_path().to_path_buf();
    assert_eq!(temp.parent(), final_path.parent());
    assert!(
        temp.file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(".clip.")
    );
    assert_eq!(temp.extension().unwrap(), "mp4");
    assert!(!final_path.exists());

    std::fs::write(&temp, b"payload").unwrap();
    let out = pending.commit().unwrap();
    assert_eq!(out, final_path);
    assert_eq!(std::fs::read(&final_path).unwrap(), b"payload");
    assert!(!temp.exists());
}

#[test]
fn drop_without_commit_leaves_nothing_behind() {
    let dir = tempfile::tempdir().unwrap();
    let final_path = dir.path().join("final_video.mp4");
    {
        let pending = PendingFile::reserve(&final_path).unwrap();
        std::fs::write(pending.temp_path(), b"half written").unwrap();
    }
    assert!(!final_path.exists());
    assert!(dir_entries(dir.path()).is_empty());
}

#[test]
fn commit_replaces_existing_final_file() {
    let dir = tempfile::tempdir().unwrap();
    let final_path = dir.path().join("a.wav");
    std::fs::write(&final_path, b"old").unwrap();

    let pending = PendingFile::reserve(&final_path).unwrap();
    std::fs::write(pending.temp_path(), b"new").unwrap();
    pending.commit().unwrap();

    assert_eq!(std::fs::read(&final_path).unwrap(), b"new");
    assert_eq!(dir_entries(dir.path()), vec!["a.wav".to_string()]);
}
