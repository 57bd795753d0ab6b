use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::warn;

use crate::app::{App, PlaylistEntry, Screen};
use crate::audio::{AudioCmd, AudioPlayer};
use crate::config;
use crate::game::{Advance, Clock, GameSession, RoundResult, RoundStatus, RoundTicker, SystemClock};
use crate::profile::{ProfileStore, valid_nickname};
use crate::ui;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Monotonic counter behind every `Load`; snapshots are only trusted
    /// when their token matches the load this screen last issued.
    next_load_token: u64,
    round_load_token: u64,
    playlist_load_token: u64,
    /// Countdown source for the live round; dropped on every transition.
    ticker: Option<RoundTicker>,
    clock: SystemClock,
}

impl EventLoopState {
    pub fn new() -> Self {
        Self {
            next_load_token: 0,
            round_load_token: 0,
            playlist_load_token: 0,
            ticker: None,
            clock: SystemClock,
        }
    }

    fn issue_token(&mut self) -> u64 {
        self.next_load_token += 1;
        self.next_load_token
    }
}

/// Main terminal event loop: handles input, UI drawing and sync with the
/// audio thread. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
    store: &ProfileStore,
    pinned: &[PlaylistEntry],
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    let toast_ttl = Duration::from_millis(settings.ui.toast_ms);

    loop {
        let now = state.clock.now();
        app.prune_toasts(now);

        // No profile means the entry screen, whatever was on display.
        if app.profile.is_none() && app.screen != Screen::Auth {
            app.screen = Screen::Auth;
        }

        // Surface background writer failures as toasts.
        let notices = store.notices();
        if let Ok(mut pending) = notices.lock() {
            for msg in pending.drain(..) {
                app.push_toast(msg, now, toast_ttl);
            }
        }

        sync_game(app, state, audio_player, now, toast_ttl);
        sync_playlist(app, state, audio_player, now, toast_ttl);

        terminal.draw(|f| ui::draw(f, app, &settings.ui))?;

        // Poll at the usual cadence, but wake for the next countdown second
        // when it lands sooner.
        let poll_timeout = state
            .ticker
            .as_ref()
            .map(|t| t.until_next(now).min(Duration::from_millis(50)))
            .unwrap_or(Duration::from_millis(50));
        if event::poll(poll_timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, audio_player, store, pinned, state, now, toast_ttl)? {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn feedback_text(result: &RoundResult) -> String {
    if result.timed_out {
        "⏰ Time's up!".to_string()
    } else if result.correct {
        format!("✅ You got it! +{} pts", result.score)
    } else {
        "❌ Wrong one!".to_string()
    }
}

/// Push audio readiness and countdown ticks into the live round.
fn sync_game(
    app: &mut App,
    state: &mut EventLoopState,
    audio_player: &AudioPlayer,
    now: Instant,
    toast_ttl: Duration,
) {
    if app.screen != Screen::Game {
        return;
    }

    let mut messages: Vec<String> = Vec::new();

    if let Some(session) = app.session.as_mut() {
        let loading = session
            .round()
            .map(|r| r.status() == RoundStatus::Loading)
            .unwrap_or(false);

        if loading {
            let info = audio_player.snapshot();
            // Only trust a snapshot describing this round's load; anything
            // else is a previous clip still winding down.
            if info.token == state.round_load_token {
                if info.failed.is_some() {
                    messages.push("Could not play this clip".to_string());
                    // A broken clip resolves through the zero-budget path so
                    // the session cannot wedge.
                    if let Some(result) = session.audio_ready(0.0) {
                        messages.push(feedback_text(&result));
                    }
                } else {
                    let secs = info.duration.map(|d| d.as_secs_f64()).unwrap_or(0.0);
                    match session.audio_ready(secs) {
                        None => {
                            state.ticker = Some(RoundTicker::start(session.generation(), now));
                        }
                        Some(result) => messages.push(feedback_text(&result)),
                    }
                }
            }
        }

        if let Some(ticker) = state.ticker.as_mut() {
            let mut resolved = false;
            for tick in ticker.poll(now) {
                if let Some(result) = session.apply_tick(tick) {
                    messages.push(feedback_text(&result));
                    resolved = true;
                }
            }
            if resolved {
                // The clip is allowed to ring out through the reveal; only
                // the countdown stops here.
                state.ticker = None;
            }
        }
    }

    for msg in messages {
        app.push_toast(msg, now, toast_ttl);
    }
}

/// Auto-advance the playlist when the current clip drains.
fn sync_playlist(
    app: &mut App,
    state: &mut EventLoopState,
    audio_player: &AudioPlayer,
    now: Instant,
    toast_ttl: Duration,
) {
    if app.screen != Screen::Playlist {
        return;
    }
    let Some(playing) = app.playlist_playing else {
        return;
    };

    let info = audio_player.snapshot();
    if info.token != state.playlist_load_token {
        return;
    }

    // A clip that failed to start falls back to the nothing-playing state.
    if info.failed.is_some() {
        app.playlist_playing = None;
        app.push_toast("Could not play that clip", now, toast_ttl);
        return;
    }

    if !info.ended {
        return;
    }

    let next = playing + 1;
    if next < app.playlist.len() {
        play_playlist_entry(app, state, audio_player, next, now, toast_ttl);
    } else {
        app.playlist_playing = None;
    }
}

fn play_playlist_entry(
    app: &mut App,
    state: &mut EventLoopState,
    audio_player: &AudioPlayer,
    index: usize,
    now: Instant,
    toast_ttl: Duration,
) {
    let Some(entry) = app.playlist.get(index) else {
        return;
    };
    let title = entry.title.clone();
    let fallback = entry.duration;
    let Some(path) = entry.audio_path.clone() else {
        app.push_toast("Clip not available", now, toast_ttl);
        return;
    };

    let token = state.issue_token();
    state.playlist_load_token = token;
    let _ = audio_player.send(AudioCmd::Load {
        path,
        token,
        fallback_duration: fallback,
    });
    app.playlist_playing = Some(index);
    app.push_toast(format!("Playing: {title}"), now, toast_ttl);
}

/// Construct the round at the current index and kick off its clip.
fn start_current_round(app: &mut App, state: &mut EventLoopState, audio_player: &AudioPlayer) {
    app.selected_option = 0;
    let Some(session) = app.session.as_mut() else {
        return;
    };

    let mut rng = rand::rng();
    let (path, fallback) = match session.start_round(&mut rng) {
        Some(round) => (round.track().audio_path.clone(), round.track().duration),
        None => return,
    };

    let token = state.issue_token();
    state.round_load_token = token;
    state.ticker = None;
    let _ = audio_player.send(AudioCmd::Load {
        path,
        token,
        fallback_duration: fallback,
    });
}

fn start_game(
    app: &mut App,
    state: &mut EventLoopState,
    audio_player: &AudioPlayer,
    settings: &config::Settings,
    now: Instant,
    toast_ttl: Duration,
) {
    let mut rng = rand::rng();
    match GameSession::new(
        &app.catalog,
        &settings.game.anchor_track_id,
        settings.game.rounds,
        &mut rng,
    ) {
        Ok(session) => {
            app.session = Some(session);
            app.final_modal = false;
            app.playlist_playing = None;
            app.screen = Screen::Game;
            let _ = audio_player.send(AudioCmd::Stop);
            start_current_round(app, state, audio_player);
        }
        Err(err) => {
            warn!(%err, "could not start a session");
            app.push_toast("No tracks available!", now, toast_ttl);
        }
    }
}

fn submit_answer(
    app: &mut App,
    state: &mut EventLoopState,
    index: usize,
    now: Instant,
    toast_ttl: Duration,
) {
    let result = app.session.as_mut().and_then(|s| s.submit_answer(index));
    if let Some(result) = result {
        state.ticker = None;
        let msg = feedback_text(&result);
        app.push_toast(msg, now, toast_ttl);
    }
}

fn advance_session(
    app: &mut App,
    state: &mut EventLoopState,
    audio_player: &AudioPlayer,
    store: &ProfileStore,
) {
    let advance = match app.session.as_mut() {
        Some(session) => session.advance(),
        None => return,
    };

    match advance {
        Advance::NextRound => start_current_round(app, state, audio_player),
        Advance::Complete { .. } => {
            state.ticker = None;
            let _ = audio_player.send(AudioCmd::Stop);
            app.final_modal = true;

            // The session hands the tally out once, so the write cannot
            // repeat even if completion is reached again.
            let to_persist = app.session.as_mut().and_then(|s| s.completion_to_persist());
            if let Some(total) = to_persist {
                if let Some(profile) = app.profile.as_mut() {
                    store.set_daily_score(profile, total);
                }
            }
        }
    }
}

fn save_current_track(
    app: &mut App,
    store: &ProfileStore,
    pinned: &[PlaylistEntry],
    now: Instant,
    toast_ttl: Duration,
) {
    let Some(track_id) = app
        .session
        .as_ref()
        .and_then(|s| s.round())
        .filter(|r| r.is_resolved())
        .map(|r| r.track().id.clone())
    else {
        return;
    };

    let saved = match app.profile_mut() {
        Ok(profile) => store.add_saved_track(profile, &track_id),
        Err(err) => {
            app.push_toast(format!("Sign in to save tracks ({err})"), now, toast_ttl);
            return;
        }
    };

    if saved {
        app.rebuild_playlist(pinned);
        app.push_toast("🎵 Added to your playlist!", now, toast_ttl);
    } else {
        app.push_toast("Already in your playlist", now, toast_ttl);
    }
}

fn leave_game(app: &mut App, state: &mut EventLoopState, audio_player: &AudioPlayer) {
    state.ticker = None;
    let _ = audio_player.send(AudioCmd::Stop);
    app.leave_game();
}

fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
    store: &ProfileStore,
    pinned: &[PlaylistEntry],
    state: &mut EventLoopState,
    now: Instant,
    toast_ttl: Duration,
) -> Result<bool, Box<dyn std::error::Error>> {
    match app.screen {
        Screen::Auth => match key.code {
            KeyCode::Esc => return Ok(true),
            KeyCode::Backspace => {
                app.input.pop();
            }
            KeyCode::Enter => {
                let nickname = app.input.trim().to_string();
                if !valid_nickname(&nickname) {
                    app.push_toast("Nickname must be 6-15 letters/numbers", now, toast_ttl);
                } else {
                    match store.load_or_create(&nickname) {
                        Ok(profile) => {
                            app.profile = Some(profile);
                            app.input.clear();
                            app.screen = Screen::Home;
                            app.rebuild_playlist(pinned);
                            app.push_toast(format!("Welcome, {nickname}!"), now, toast_ttl);
                        }
                        Err(err) => {
                            warn!(nickname, %err, "sign-in failed");
                            app.push_toast("Could not load that profile", now, toast_ttl);
                        }
                    }
                }
            }
            KeyCode::Char(c) => {
                if !c.is_control() {
                    app.input.push(c);
                }
            }
            _ => {}
        },

        Screen::Home => match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('g') => start_game(app, state, audio_player, settings, now, toast_ttl),
            KeyCode::Char('m') => {
                app.rebuild_playlist(pinned);
                app.screen = Screen::Playlist;
            }
            KeyCode::Char('p') => {
                app.input.clear();
                app.screen = Screen::Profile;
            }
            _ => {}
        },

        Screen::Game => match key.code {
            KeyCode::Esc => leave_game(app, state, audio_player),
            KeyCode::Char(c @ '1'..='9') => {
                let index = (c as usize) - ('1' as usize);
                submit_answer(app, state, index, now, toast_ttl);
            }
            KeyCode::Char('j') | KeyCode::Down => app.option_next(),
            KeyCode::Char('k') | KeyCode::Up => app.option_prev(),
            KeyCode::Enter => {
                let index = app.selected_option;
                submit_answer(app, state, index, now, toast_ttl);
            }
            KeyCode::Char('a') => save_current_track(app, store, pinned, now, toast_ttl),
            KeyCode::Char('n') => {
                let resolved = app
                    .session
                    .as_ref()
                    .and_then(|s| s.round())
                    .map(|r| r.is_resolved())
                    .unwrap_or(false);
                if resolved {
                    advance_session(app, state, audio_player, store);
                }
            }
            KeyCode::Char('r') => {
                if app.final_modal {
                    app.final_modal = false;
                    if let Some(session) = app.session.as_mut() {
                        let mut rng = rand::rng();
                        session.restart(&mut rng);
                    }
                    start_current_round(app, state, audio_player);
                }
            }
            _ => {}
        },

        Screen::Playlist => match key.code {
            KeyCode::Char('y') => {
                if let Some(index) = app.confirm_remove.take() {
                    remove_playlist_entry(app, audio_player, store, pinned, index, now, toast_ttl);
                }
            }
            KeyCode::Char('n') => {
                app.confirm_remove = None;
            }
            KeyCode::Esc => {
                if app.confirm_remove.take().is_none() {
                    app.playlist_playing = None;
                    let _ = audio_player.send(AudioCmd::Stop);
                    app.screen = Screen::Home;
                }
            }
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('j') | KeyCode::Down => app.playlist_next(),
            KeyCode::Char('k') | KeyCode::Up => app.playlist_prev(),
            KeyCode::Enter => {
                let index = app.playlist_selected;
                play_playlist_entry(app, state, audio_player, index, now, toast_ttl);
            }
            KeyCode::Char(' ') => {
                let _ = audio_player.send(AudioCmd::TogglePause);
            }
            KeyCode::Char('l') => {
                if let Some(playing) = app.playlist_playing {
                    let next = playing + 1;
                    if next < app.playlist.len() {
                        play_playlist_entry(app, state, audio_player, next, now, toast_ttl);
                    } else {
                        app.playlist_playing = None;
                        let _ = audio_player.send(AudioCmd::Stop);
                    }
                }
            }
            KeyCode::Char('h') => {
                if let Some(playing) = app.playlist_playing {
                    if playing > 0 {
                        play_playlist_entry(app, state, audio_player, playing - 1, now, toast_ttl);
                    }
                }
            }
            KeyCode::Char('d') => {
                let selected = app.playlist_selected;
                match app.playlist.get(selected) {
                    Some(entry) if entry.pinned => {
                        app.push_toast("House tracks stay put", now, toast_ttl);
                    }
                    Some(_) => app.confirm_remove = Some(selected),
                    None => {}
                }
            }
            _ => {}
        },

        Screen::Profile => match key.code {
            KeyCode::Esc => {
                app.input.clear();
                app.screen = Screen::Home;
            }
            KeyCode::Backspace => {
                app.input.pop();
            }
            KeyCode::Enter => {
                let nickname = app.input.trim().to_string();
                if !valid_nickname(&nickname) {
                    app.push_toast("Nickname must be 6-15 letters/numbers", now, toast_ttl);
                } else {
                    if let Some(profile) = app.profile.as_mut() {
                        profile.nickname = nickname;
                        store.save(profile);
                    }
                    app.input.clear();
                    app.screen = Screen::Home;
                    app.push_toast("Profile updated", now, toast_ttl);
                }
            }
            KeyCode::Char(c) => {
                if !c.is_control() {
                    app.input.push(c);
                }
            }
            _ => {}
        },
    }

    Ok(false)
}

fn remove_playlist_entry(
    app: &mut App,
    audio_player: &AudioPlayer,
    store: &ProfileStore,
    pinned: &[PlaylistEntry],
    index: usize,
    now: Instant,
    toast_ttl: Duration,
) {
    let Some(track_id) = app
        .playlist
        .get(index)
        .filter(|e| !e.pinned)
        .map(|e| e.id.clone())
    else {
        return;
    };

    let removed = match app.profile_mut() {
        Ok(profile) => store.remove_saved_track(profile, &track_id),
        Err(_) => return,
    };
    if !removed {
        return;
    }

    match app.playlist_playing {
        Some(playing) if playing == index => {
            app.playlist_playing = None;
            let _ = audio_player.send(AudioCmd::Stop);
        }
        Some(playing) if playing > index => {
            app.playlist_playing = Some(playing - 1);
        }
        _ => {}
    }

    app.rebuild_playlist(pinned);
    app.push_toast("Removed from your playlist", now, toast_ttl);
}
