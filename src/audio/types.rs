//! Audio-related small types and handles.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug)]
pub enum AudioCmd {
    /// Tear down whatever is playing and start the clip at `path`.
    /// `token` is echoed into `PlaybackInfo` so readers can tell which load
    /// the snapshot describes. `fallback_duration` stands in when the
    /// decoder cannot report a total length.
    Load {
        path: PathBuf,
        token: u64,
        fallback_duration: Option<Duration>,
    },
    /// Toggle pause/resume of the current clip.
    TogglePause,
    /// Stop playback immediately and release the sink.
    Stop,
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// Runtime playback snapshot shared with the event loop and UI.
#[derive(Debug, Clone)]
pub struct PlaybackInfo {
    /// Which `Load` this snapshot belongs to; 0 before the first load.
    pub token: u64,
    /// Clip length, published once the source decodes ("ready").
    pub duration: Option<Duration>,
    /// Elapsed playback time, sampled every ~200ms ("progress").
    pub elapsed: Duration,
    pub playing: bool,
    /// The sink drained to its end ("ended").
    pub ended: bool,
    /// The clip failed to open/decode; playback is in the nothing-playing state.
    pub failed: Option<String>,
}

impl Default for PlaybackInfo {
    fn default() -> Self {
        Self {
            token: 0,
            duration: None,
            elapsed: Duration::ZERO,
            playing: false,
            ended: false,
            failed: None,
        }
    }
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;
