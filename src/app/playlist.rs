use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::Track;

/// One row of the playlist screen.
#[derive(Debug, Clone)]
pub struct PlaylistEntry {
    pub id: String,
    pub title: String,
    pub artist: String,
    /// `None` when the clip could not be located; the row still renders.
    pub audio_path: Option<PathBuf>,
    pub duration: Option<Duration>,
    /// Pinned rows are always present and cannot be removed.
    pub pinned: bool,
}

impl PlaylistEntry {
    pub fn from_track(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            audio_path: Some(track.audio_path.clone()),
            duration: track.duration,
            pinned: false,
        }
    }
}

/// The two house tracks that open every playlist, resolved against the
/// assets index the same way catalog refs are.
pub fn pinned_entries(assets_index: &BTreeMap<String, PathBuf>) -> Vec<PlaylistEntry> {
    [
        ("pinned1", "Id", "Keshi", "keshi.mp3"),
        ("pinned2", "e-Asphyxiation", "Cafuné", "cafune.mp3"),
    ]
    .into_iter()
    .map(|(id, title, artist, file)| PlaylistEntry {
        id: id.to_string(),
        title: title.to_string(),
        artist: artist.to_string(),
        audio_path: assets_index.get(file).cloned(),
        duration: None,
        pinned: true,
    })
    .collect()
}
