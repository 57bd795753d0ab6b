use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use tempfile::tempdir;

use super::load::{load, resolve_audio_ref};
use crate::config::CatalogSettings;

fn sample_index() -> BTreeMap<String, PathBuf> {
    let mut index = BTreeMap::new();
    index.insert(
        "clip.mp3".to_string(),
        PathBuf::from("/srv/sounds/clip.mp3"),
    );
    index
}

#[test]
fn resolve_passes_absolute_paths_through() {
    let index = sample_index();
    assert_eq!(
        resolve_audio_ref("/elsewhere/other.mp3", &index),
        Some(PathBuf::from("/elsewhere/other.mp3"))
    );
}

#[test]
fn resolve_reduces_bare_and_pathy_refs_to_file_name() {
    let index = sample_index();
    // Bare file name and a path-shaped ref normalize identically.
    assert_eq!(
        resolve_audio_ref("clip.mp3", &index),
        Some(PathBuf::from("/srv/sounds/clip.mp3"))
    );
    assert_eq!(
        resolve_audio_ref("legacy/folder/clip.mp3", &index),
        Some(PathBuf::from("/srv/sounds/clip.mp3"))
    );
}

#[test]
fn resolve_rejects_remote_urls_and_unknown_names() {
    let index = sample_index();
    assert_eq!(resolve_audio_ref("https://cdn.example/clip.mp3", &index), None);
    assert_eq!(resolve_audio_ref("missing.mp3", &index), None);
}

#[test]
fn load_parses_manifest_and_skips_unresolvable_clips() {
    let dir = tempdir().unwrap();
    let sounds = dir.path().join("sounds");
    fs::create_dir_all(&sounds).unwrap();
    fs::write(sounds.join("glimpse.mp3"), b"not a real mp3").unwrap();

    let manifest = dir.path().join("catalog.toml");
    fs::write(
        &manifest,
        r#"
[[tracks]]
id = "joji1"
title = "Glimpse of Us"
artist = "Joji"
audio = "glimpse.mp3"
decoys = ["Slow Dancing in the Dark", "Die For You", "Run"]

[[tracks]]
id = "ghost"
title = "Never Here"
artist = "Nobody"
audio = "gone.mp3"
decoys = ["A", "B", "C"]
"#,
    )
    .unwrap();

    let settings = CatalogSettings {
        manifest,
        assets_dir: sounds,
        ..CatalogSettings::default()
    };

    let tracks = load(&settings).unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].id, "joji1");
    assert_eq!(tracks[0].title, "Glimpse of Us");
    assert_eq!(tracks[0].decoys.len(), 3);
    // The bytes are not decodable audio, so the probe yields no duration.
    assert!(tracks[0].duration.is_none());
}

#[test]
fn load_accepts_empty_manifest() {
    let dir = tempdir().unwrap();
    let manifest = dir.path().join("catalog.toml");
    fs::write(&manifest, "").unwrap();

    let settings = CatalogSettings {
        manifest,
        assets_dir: dir.path().join("sounds"),
        ..CatalogSettings::default()
    };

    let tracks = load(&settings).unwrap();
    assert!(tracks.is_empty());
}

#[test]
fn load_reports_missing_manifest_as_error() {
    let dir = tempdir().unwrap();
    let settings = CatalogSettings {
        manifest: dir.path().join("nope.toml"),
        assets_dir: dir.path().to_path_buf(),
        ..CatalogSettings::default()
    };

    assert!(load(&settings).is_err());
}
