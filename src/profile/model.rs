use serde::{Deserialize, Serialize};

/// The per-player persisted document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub nickname: String,
    /// Overwritten, not accumulated, at the end of each completed session.
    pub daily_score: u32,
    /// Ids of catalog tracks the player saved to their playlist.
    pub saved_track_ids: Vec<String>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            nickname: String::new(),
            daily_score: 0,
            saved_track_ids: Vec::new(),
        }
    }
}

impl UserProfile {
    pub fn new(nickname: &str) -> Self {
        Self {
            nickname: nickname.to_string(),
            ..Self::default()
        }
    }
}

/// Nicknames are 6-15 ASCII letters/digits.
pub fn valid_nickname(nickname: &str) -> bool {
    let len = nickname.chars().count();
    (6..=15).contains(&len) && nickname.chars().all(|c| c.is_ascii_alphanumeric())
}
