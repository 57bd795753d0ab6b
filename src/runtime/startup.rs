use tracing::warn;

use crate::app::{App, PlaylistEntry, Screen};
use crate::config;
use crate::profile::{ProfileStore, valid_nickname};

/// Sign in the configured player, when there is one, so the session starts
/// on the home screen instead of the entry screen.
pub fn apply_startup(
    app: &mut App,
    store: &ProfileStore,
    settings: &config::Settings,
    pinned: &[PlaylistEntry],
) {
    let Some(nickname) = settings.profile.auto_login.as_deref() else {
        return;
    };

    if !valid_nickname(nickname) {
        warn!(nickname, "ignoring auto_login: invalid nickname");
        return;
    }

    match store.load_or_create(nickname) {
        Ok(profile) => {
            app.profile = Some(profile);
            app.screen = Screen::Home;
            app.rebuild_playlist(pinned);
        }
        Err(err) => {
            warn!(nickname, %err, "auto_login failed, showing entry screen");
        }
    }
}
