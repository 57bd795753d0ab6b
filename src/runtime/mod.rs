use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::app::{App, pinned_entries};
use crate::audio::AudioPlayer;
use crate::catalog;
use crate::config;
use crate::profile::ProfileStore;

mod event_loop;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();

    let data_dir = settings
        .profile
        .data_dir
        .clone()
        .or_else(config::default_data_dir)
        .unwrap_or_else(|| PathBuf::from(".bardle"));
    init_logging(&data_dir);

    // A missing or broken catalog degrades to an empty one; the game screen
    // reports it instead of the process dying.
    let catalog = match catalog::load(&settings.catalog) {
        Ok(tracks) => tracks,
        Err(err) => {
            warn!(%err, "catalog unavailable, starting with no tracks");
            Vec::new()
        }
    };

    let assets_index =
        catalog::index_audio_files(&settings.catalog.assets_dir, &settings.catalog.extensions);
    let pinned = pinned_entries(&assets_index);

    let store = ProfileStore::open(data_dir.join("profiles"))?;
    let audio_player = AudioPlayer::new();

    let mut app = App::new(catalog);
    app.set_playback_handle(audio_player.playback_handle());

    startup::apply_startup(&mut app, &store, &settings, &pinned);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::new();
        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            &audio_player,
            &store,
            &pinned,
            &mut state,
        )
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    audio_player.quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
    store.shutdown();

    run_result
}

/// Log to a file under the data dir; stderr belongs to the alternate screen.
/// Filter via `BARDLE_LOG`, default `info`. Failures here are swallowed: a
/// game without a log file is still a game.
fn init_logging(data_dir: &Path) {
    if fs::create_dir_all(data_dir).is_err() {
        return;
    }
    let Ok(file) = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("bardle.log"))
    else {
        return;
    };

    let filter = EnvFilter::try_from_env("BARDLE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}
