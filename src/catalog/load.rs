use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::prelude::*;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::CatalogSettings;
use crate::error::{Error, Result};

use super::assets::index_audio_files;
use super::model::Track;

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    tracks: Vec<ManifestTrack>,
}

#[derive(Debug, Deserialize)]
struct ManifestTrack {
    id: String,
    title: String,
    artist: String,
    #[serde(default)]
    cover_url: Option<String>,
    #[serde(default)]
    artist_image_url: Option<String>,
    /// Absolute path, or a bare file name resolved against the assets dir.
    audio: String,
    #[serde(default)]
    decoys: Vec<String>,
}

fn is_remote_url(field: &str) -> bool {
    let lower = field.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Normalize an audio ref the same way for every form the manifest allows:
/// absolute paths pass through, anything else is reduced to its file name and
/// looked up in the assets index. Remote URLs are not playable here.
pub fn resolve_audio_ref(
    field: &str,
    index: &BTreeMap<String, PathBuf>,
) -> Option<PathBuf> {
    if is_remote_url(field) {
        return None;
    }

    let path = Path::new(field);
    if path.is_absolute() {
        return Some(path.to_path_buf());
    }

    let name = path.file_name().and_then(|s| s.to_str())?;
    index.get(name).cloned()
}

fn probe_duration(path: &Path) -> Option<Duration> {
    match lofty::read_from_path(path) {
        Ok(tagged) => Some(tagged.properties().duration()),
        Err(err) => {
            debug!(path = %path.display(), %err, "could not probe clip duration");
            None
        }
    }
}

/// Load the track catalog: parse the manifest, resolve every audio ref and
/// probe clip durations. Entries whose clip cannot be located are skipped
/// with a warning; an unreadable manifest is an error, an empty one is not.
pub fn load(settings: &CatalogSettings) -> Result<Vec<Track>> {
    let text = fs::read_to_string(&settings.manifest)?;
    let manifest: Manifest = toml::from_str(&text).map_err(|e| {
        Error::Config(format!(
            "bad catalog manifest {}: {e}",
            settings.manifest.display()
        ))
    })?;

    let index = index_audio_files(&settings.assets_dir, &settings.extensions);

    let mut tracks: Vec<Track> = Vec::with_capacity(manifest.tracks.len());
    for entry in manifest.tracks {
        let Some(audio_path) = resolve_audio_ref(&entry.audio, &index) else {
            warn!(id = %entry.id, audio = %entry.audio, "skipping track: clip not found in assets");
            continue;
        };

        let duration = probe_duration(&audio_path);
        tracks.push(Track {
            id: entry.id,
            title: entry.title,
            artist: entry.artist,
            cover_url: entry.cover_url,
            artist_image_url: entry.artist_image_url,
            audio_path,
            decoys: entry.decoys,
            duration,
        });
    }

    debug!(count = tracks.len(), "catalog loaded");
    Ok(tracks)
}
