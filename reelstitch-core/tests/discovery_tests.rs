// reelstitch-core/tests/discovery_tests.rs

use reelstitch_core::discovery::{find_artifacts, find_audio_tracks, find_source_clips};
use reelstitch_core::error::CoreError;
use std::fs::{self, File};
use tempfile::tempdir;

#[test]
fn test_find_source_clips() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input_dir = dir.path();

    File::create(input_dir.join("b.mp4"))?;
    File::create(input_dir.join("a.MP4"))?; // Case insensitive
    File::create(input_dir.join("c.mov"))?;
    File::create(input_dir.join("notes.txt"))?;
    fs::create_dir(input_dir.join("subdir"))?;
    File::create(input_dir.join("subdir").join("nested.mp4"))?; // Top level only

    let files = find_source_clips(input_dir)?;
    let names: Vec<_> = files.iter().map(|f| f.file_name().unwrap().to_owned()).collect();
    assert_eq!(names, vec!["a.MP4", "b.mp4"]);
    Ok(())
}

#[test]
fn test_find_source_clips_empty() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    File::create(dir.path().join("readme.md"))?;

    assert!(matches!(find_source_clips(dir.path()), Err(CoreError::NoFilesFound)));
    Ok(())
}

#[test]
fn test_find_source_clips_missing_dir() {
    let result = find_source_clips(std::path::Path::new("/nonexistent/clips"));
    assert!(matches!(result, Err(CoreError::Io(_))));
}

#[test]
fn test_find_audio_tracks() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    File::create(dir.path().join("z.wav"))?;
    File::create(dir.path().join("m.mp3"))?;
    File::create(dir.path().join("cover.jpg"))?;

    let tracks = find_audio_tracks(dir.path())?;
    let names: Vec<_> = tracks.iter().map(|f| f.file_name().unwrap().to_owned()).collect();
    assert_eq!(names, vec!["m.mp3", "z.wav"]);

    assert!(find_audio_tracks(&dir.path().join("missing"))?.is_empty());
    Ok(())
}

#[test]
fn test_find_artifacts_orders_numerically() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    for name in [
        "compilation-10.mp4",
        "compilation-2.mp4",
        "compilation-1.mp4",
        ".compilation-3.mp4.partial",
        "compilation-x.mp4",
        "other-4.mp4",
    ] {
        File::create(dir.path().join(name))?;
    }
    fs::create_dir(dir.path().join(".reelstitch-ws-5-abc"))?;

    let artifacts = find_artifacts(dir.path(), "compilation")?;
    let names: Vec<_> = artifacts.iter().map(|a| a.name()).collect();
    assert_eq!(names, vec!["compilation-1.mp4", "compilation-2.mp4", "compilation-10.mp4"]);
    assert_eq!(artifacts[2].index, 10);
    Ok(())
}
