use std::path::PathBuf;
use std::time::Duration;

/// One playable track, immutable once loaded from the manifest.
#[derive(Clone, Debug)]
pub struct Track {
    /// Unique id, used as the key for saved-playlist entries.
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Cover art location, shown as context only.
    pub cover_url: Option<String>,
    pub artist_image_url: Option<String>,
    /// Resolved location of the audio clip on disk.
    pub audio_path: PathBuf,
    /// Incorrect titles offered alongside the real one.
    pub decoys: Vec<String>,
    /// Clip length probed from the file; `None` when the file is unreadable.
    pub duration: Option<Duration>,
}
