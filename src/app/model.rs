use std::time::{Duration, Instant};

use crate::audio::PlaybackHandle;
use crate::catalog::Track;
use crate::game::GameSession;
use crate::profile::UserProfile;

use super::playlist::PlaylistEntry;

/// Which screen the player is on. Every screen except `Auth` requires a
/// signed-in profile.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    Auth,
    Home,
    Game,
    Playlist,
    Profile,
}

/// A transient notification, dismissed by timeout.
#[derive(Debug, Clone)]
pub struct Toast {
    pub text: String,
    pub expires_at: Instant,
}

/// Fixed competitors shown on the home ranking next to the player.
pub const HOUSE_PLAYERS: [(&str, u32); 5] = [
    ("MelodyMaster", 180),
    ("TuneTitan", 150),
    ("HarmonyHero", 130),
    ("LyricLord", 110),
    ("BeatBoss", 90),
];

/// The main application model.
pub struct App {
    pub screen: Screen,
    pub catalog: Vec<Track>,
    pub profile: Option<UserProfile>,
    pub playback_handle: Option<PlaybackHandle>,

    pub toasts: Vec<Toast>,
    /// Text buffer for the entry and profile screens.
    pub input: String,

    // Game screen
    pub session: Option<GameSession>,
    pub selected_option: usize,
    pub final_modal: bool,

    // Playlist screen
    pub playlist: Vec<PlaylistEntry>,
    pub playlist_selected: usize,
    /// Index of the entry currently playing, if any.
    pub playlist_playing: Option<usize>,
    /// Index pending removal while the confirmation modal is open.
    pub confirm_remove: Option<usize>,
}

impl App {
    pub fn new(catalog: Vec<Track>) -> Self {
        Self {
            screen: Screen::Auth,
            catalog,
            profile: None,
            playback_handle: None,
            toasts: Vec::new(),
            input: String::new(),
            session: None,
            selected_option: 0,
            final_modal: false,
            playlist: Vec::new(),
            playlist_selected: 0,
            playlist_playing: None,
            confirm_remove: None,
        }
    }

    /// Attach a `PlaybackHandle` used to observe playback progress.
    pub fn set_playback_handle(&mut self, h: PlaybackHandle) {
        self.playback_handle = Some(h);
    }

    pub fn nickname(&self) -> &str {
        self.profile.as_ref().map(|p| p.nickname.as_str()).unwrap_or("")
    }

    /// The signed-in profile, or `Unauthenticated` when the player never
    /// passed the entry screen.
    pub fn profile_mut(&mut self) -> crate::error::Result<&mut UserProfile> {
        self.profile
            .as_mut()
            .ok_or(crate::error::Error::Unauthenticated)
    }

    pub fn has_tracks(&self) -> bool {
        !self.catalog.is_empty()
    }

    /// Queue a toast that expires after `ttl`.
    pub fn push_toast(&mut self, text: impl Into<String>, now: Instant, ttl: Duration) {
        self.toasts.push(Toast {
            text: text.into(),
            expires_at: now + ttl,
        });
        // Keep the stack shallow; the oldest entries go first.
        while self.toasts.len() > 4 {
            self.toasts.remove(0);
        }
    }

    /// Drop toasts whose lifetime passed.
    pub fn prune_toasts(&mut self, now: Instant) {
        self.toasts.retain(|t| t.expires_at > now);
    }

    /// Ranking shown on the home screen: the house players plus the current
    /// player, best five by score. Ties keep the house entry on top.
    pub fn ranking(&self) -> Vec<(String, u32)> {
        let mut rows: Vec<(String, u32)> = HOUSE_PLAYERS
            .iter()
            .map(|(name, pts)| (name.to_string(), *pts))
            .collect();
        if let Some(profile) = &self.profile {
            rows.push((profile.nickname.clone(), profile.daily_score));
        }
        rows.sort_by(|a, b| b.1.cmp(&a.1));
        rows.truncate(5);
        rows
    }

    /// Rebuild the playlist view: pinned house entries first, then every
    /// saved track that still exists in the catalog.
    pub fn rebuild_playlist(&mut self, pinned: &[PlaylistEntry]) {
        let mut list: Vec<PlaylistEntry> = pinned.to_vec();
        if let Some(profile) = &self.profile {
            for id in &profile.saved_track_ids {
                if let Some(track) = self.catalog.iter().find(|t| t.id == *id) {
                    list.push(PlaylistEntry::from_track(track));
                }
            }
        }
        self.playlist = list;
        if self.playlist_selected >= self.playlist.len() {
            self.playlist_selected = self.playlist.len().saturating_sub(1);
        }
    }

    /// Move the playlist cursor down, wrapping.
    pub fn playlist_next(&mut self) {
        if !self.playlist.is_empty() {
            self.playlist_selected = (self.playlist_selected + 1) % self.playlist.len();
        }
    }

    /// Move the playlist cursor up, wrapping.
    pub fn playlist_prev(&mut self) {
        if !self.playlist.is_empty() {
            self.playlist_selected = self
                .playlist_selected
                .checked_sub(1)
                .unwrap_or(self.playlist.len() - 1);
        }
    }

    /// Move the answer cursor within the live round's options.
    pub fn option_next(&mut self) {
        if let Some(count) = self.option_count() {
            if count > 0 {
                self.selected_option = (self.selected_option + 1) % count;
            }
        }
    }

    pub fn option_prev(&mut self) {
        if let Some(count) = self.option_count() {
            if count > 0 {
                self.selected_option = self
                    .selected_option
                    .checked_sub(1)
                    .unwrap_or(count - 1);
            }
        }
    }

    fn option_count(&self) -> Option<usize> {
        self.session
            .as_ref()
            .and_then(|s| s.round())
            .map(|r| r.options().len())
    }

    /// Leave the game screen: the session and any modal go away. The caller
    /// is responsible for stopping audio and the round ticker.
    pub fn leave_game(&mut self) {
        self.session = None;
        self.selected_option = 0;
        self.final_modal = false;
        self.screen = Screen::Home;
    }
}
