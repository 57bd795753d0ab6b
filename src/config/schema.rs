use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/bardle/config.toml` or `~/.config/bardle/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `BARDLE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub game: GameSettings,
    pub profile: ProfileSettings,
    pub audio: AudioSettings,
    pub ui: UiSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog: CatalogSettings::default(),
            game: GameSettings::default(),
            profile: ProfileSettings::default(),
            audio: AudioSettings::default(),
            ui: UiSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Path to the track manifest (TOML, `[[tracks]]` entries).
    pub manifest: PathBuf,
    /// Directory holding the audio clips; bare audio refs resolve here.
    pub assets_dir: PathBuf,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("catalog.toml"),
            assets_dir: PathBuf::from("sounds"),
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Number of rounds in a session (capped by catalog size).
    pub rounds: usize,
    /// Track id that always opens the session when present in the catalog.
    pub anchor_track_id: String,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            rounds: 10,
            anchor_track_id: "joji1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProfileSettings {
    /// Where profile documents live. Defaults to the XDG data dir.
    pub data_dir: Option<PathBuf>,
    /// Skip the entry screen and sign in as this nickname on startup.
    pub auto_login: Option<String>,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            data_dir: None,
            auto_login: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            quit_fade_out_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top "bardle" header box.
    pub header_text: String,
    /// How long a toast notification stays on screen (milliseconds).
    pub toast_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ Bardle: name that tune ~ ".to_string(),
            toast_ms: 3000,
        }
    }
}
