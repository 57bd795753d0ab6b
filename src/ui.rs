//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`. All
//! state lives in `App`; nothing here mutates it.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::{App, Screen};
use crate::config::UiSettings;
use crate::game::RoundStatus;

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    // Keep the popup smaller and avoid covering the entire UI.
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn controls_text(screen: Screen) -> &'static str {
    match screen {
        Screen::Auth => "[type] nickname | [enter] sign in | [q/esc] quit",
        Screen::Home => "[g] play | [m] playlist | [p] profile | [q] quit",
        Screen::Game => {
            "[1-9/j/k] pick | [enter] answer | [a] save track | [n] next round | [esc] home"
        }
        Screen::Playlist => {
            "[j/k] move | [enter] play | [space] pause | [l/h] next/prev | [d] remove | [esc] home"
        }
        Screen::Profile => "[type] new nickname | [enter] save | [esc] home",
    }
}

/// Render the entire UI into the provided `frame` using `app` state.
pub fn draw(frame: &mut Frame, app: &App, ui_settings: &UiSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" bardle ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let status = {
        let mut parts: Vec<String> = Vec::new();
        match &app.profile {
            Some(profile) => {
                parts.push(format!("Player: {}", profile.nickname));
                parts.push(format!("Today: {} pts", profile.daily_score));
            }
            None => parts.push("Not signed in".to_string()),
        }
        parts.push(format!("Tracks: {}", app.catalog.len()));
        parts.join(" • ")
    };
    let status_par = Paragraph::new(status)
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    let body = chunks[2];
    match app.screen {
        Screen::Auth => draw_auth(frame, app, body),
        Screen::Home => draw_home(frame, app, body),
        Screen::Game => draw_game(frame, app, body),
        Screen::Playlist => draw_playlist(frame, app, body),
        Screen::Profile => draw_profile(frame, app, body),
    }

    draw_toasts(frame, app, body);

    let footer = Paragraph::new(controls_text(app.screen))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}

fn draw_auth(frame: &mut Frame, app: &App, area: Rect) {
    let popup = centered_rect_sized(46, 7, area);
    let text = format!(
        "Pick a nickname (6-15 letters/numbers)\n\n> {}_",
        app.input
    );
    let par = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" welcome "));
    frame.render_widget(par, popup);
}

fn draw_home(frame: &mut Frame, app: &App, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(1)])
        .split(area);

    let greeting = format!(
        "Hello, {}!\nYour score today: {} pts",
        app.nickname(),
        app.profile.as_ref().map(|p| p.daily_score).unwrap_or(0)
    );
    let par = Paragraph::new(greeting)
        .block(Block::default().borders(Borders::ALL).title(" home "));
    frame.render_widget(par, halves[0]);

    let items: Vec<ListItem> = app
        .ranking()
        .into_iter()
        .enumerate()
        .map(|(i, (name, pts))| {
            let row = format!("{}. {} — {} pts", i + 1, name, pts);
            if name == app.nickname() {
                ListItem::new(row).style(Style::default().add_modifier(Modifier::BOLD))
            } else {
                ListItem::new(row)
            }
        })
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" daily ranking "));
    frame.render_widget(list, halves[1]);
}

fn draw_game(frame: &mut Frame, app: &App, area: Rect) {
    let Some(session) = &app.session else {
        let par = Paragraph::new("No tracks available!")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" game "));
        frame.render_widget(par, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(area);

    // Round strip: one pill per round, colored by outcome.
    let state = session.state();
    let total_rounds = session.sequence_len();
    let mut pills = String::new();
    for i in 0..total_rounds {
        let pill = if i < state.round_index {
            if state.round_scores.get(i).copied().unwrap_or(0) > 0 {
                "●"
            } else {
                "○"
            }
        } else if i == state.round_index {
            "◉"
        } else {
            "·"
        };
        pills.push_str(pill);
        pills.push(' ');
    }
    let round_line = format!(
        "{}  Round {} / {}",
        pills.trim_end(),
        (state.round_index + 1).min(total_rounds),
        total_rounds
    );
    let par = Paragraph::new(round_line)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" rounds "));
    frame.render_widget(par, chunks[0]);

    // Timer + clip progress.
    if let Some(round) = session.round() {
        let timer_style = if round.warning_active() {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let label = match round.status() {
            RoundStatus::Loading => "loading…".to_string(),
            _ => format!("{}s  —  {}", round.remaining_secs(), round.track().artist),
        };

        let ratio = app
            .playback_handle
            .as_ref()
            .and_then(|h| h.lock().ok())
            .and_then(|info| {
                info.duration.map(|d| {
                    if d.is_zero() {
                        0.0
                    } else {
                        (info.elapsed.as_secs_f64() / d.as_secs_f64()).min(1.0)
                    }
                })
            })
            .unwrap_or(0.0);

        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(" now playing "))
            .gauge_style(timer_style)
            .label(label)
            .ratio(ratio);
        frame.render_widget(gauge, chunks[1]);

        // Options
        let correct = round.correct_index();
        let items: Vec<ListItem> = round
            .options()
            .iter()
            .enumerate()
            .map(|(i, option)| {
                let row = format!("{}. {}", i + 1, option);
                let style = if round.is_resolved() {
                    if Some(i) == correct {
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
                    } else if Some(i) == round.chosen() {
                        Style::default().fg(Color::Red)
                    } else {
                        Style::default().add_modifier(Modifier::DIM)
                    }
                } else {
                    Style::default()
                };
                ListItem::new(row).style(style)
            })
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" which track is this? "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut list_state = ratatui::widgets::ListState::default();
        if !round.options().is_empty() && !round.is_resolved() {
            list_state.select(Some(app.selected_option.min(round.options().len() - 1)));
        }
        frame.render_stateful_widget(list, chunks[2], &mut list_state);

        // Feedback, plus the art link the reveal would show as a cover image.
        let mut feedback = match round.status() {
            RoundStatus::AnsweredCorrect => "You got it! [a] save  [n] next round".to_string(),
            RoundStatus::AnsweredWrong => "Wrong one. [a] save  [n] next round".to_string(),
            RoundStatus::TimedOut => "Time's up! [a] save  [n] next round".to_string(),
            _ => String::new(),
        };
        if round.is_resolved() {
            let art = round
                .track()
                .cover_url
                .as_deref()
                .or(round.track().artist_image_url.as_deref());
            if let Some(url) = art {
                feedback.push_str(&format!("\nart: {url}"));
            }
        }
        let par = Paragraph::new(feedback).alignment(Alignment::Center);
        frame.render_widget(par, chunks[3]);
    }

    // Final score modal.
    if app.final_modal {
        let popup = centered_rect_sized(44, 9, area);
        frame.render_widget(Clear, popup);
        let text = format!(
            "Session over!\n\nTotal score: {} pts\nHits: {}  Misses: {}\n\n[r] play again   [esc] home",
            session.total_score(),
            state.hits,
            state.misses
        );
        let par = Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" final score "));
        frame.render_widget(par, popup);
    }
}

fn draw_playlist(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(area);

    let items: Vec<ListItem> = app
        .playlist
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let marker = if Some(i) == app.playlist_playing {
                "♪ "
            } else if entry.pinned {
                "• "
            } else {
                "  "
            };
            let row = format!("{}{} — {}", marker, entry.artist, entry.title);
            if Some(i) == app.playlist_playing {
                ListItem::new(row).style(Style::default().add_modifier(Modifier::BOLD))
            } else {
                ListItem::new(row)
            }
        })
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" your playlist "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ratatui::widgets::ListState::default();
    if !app.playlist.is_empty() {
        state.select(Some(app.playlist_selected));
    }
    frame.render_stateful_widget(list, chunks[0], &mut state);

    // Now-playing bar.
    let (label, ratio) = match (app.playlist_playing, app.playback_handle.as_ref()) {
        (Some(idx), Some(handle)) => {
            let entry = app.playlist.get(idx);
            let info = handle.lock().ok();
            match (entry, info) {
                (Some(entry), Some(info)) => {
                    let time = match info.duration {
                        Some(total) => {
                            format!("{} / {}", format_mmss(info.elapsed), format_mmss(total))
                        }
                        None => format_mmss(info.elapsed),
                    };
                    let state_txt = if info.playing { "Playing" } else { "Paused" };
                    let ratio = info
                        .duration
                        .filter(|d| !d.is_zero())
                        .map(|d| (info.elapsed.as_secs_f64() / d.as_secs_f64()).min(1.0))
                        .unwrap_or(0.0);
                    (
                        format!("{state_txt}: {} — {} [{time}]", entry.artist, entry.title),
                        ratio,
                    )
                }
                _ => ("Nothing playing".to_string(), 0.0),
            }
        }
        _ => ("Nothing playing".to_string(), 0.0),
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .label(label)
        .ratio(ratio);
    frame.render_widget(gauge, chunks[1]);

    // Remove confirmation modal.
    if let Some(idx) = app.confirm_remove {
        let popup = centered_rect_sized(44, 7, area);
        frame.render_widget(Clear, popup);
        let name = app
            .playlist
            .get(idx)
            .map(|e| e.title.as_str())
            .unwrap_or("this track");
        let text = format!("Remove \"{name}\" from your playlist?\n\n[y] remove   [n] keep");
        let par = Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" remove track? "));
        frame.render_widget(par, popup);
    }
}

fn draw_profile(frame: &mut Frame, app: &App, area: Rect) {
    let text = format!(
        "Nickname: {}\nScore today: {} pts\n\nNew nickname: {}_\n\n(6-15 letters/numbers)",
        app.nickname(),
        app.profile.as_ref().map(|p| p.daily_score).unwrap_or(0),
        app.input
    );
    let par = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" profile "));
    frame.render_widget(par, area);
}

fn draw_toasts(frame: &mut Frame, app: &App, area: Rect) {
    if app.toasts.is_empty() {
        return;
    }

    let height = (app.toasts.len() as u16) + 2;
    let width = app
        .toasts
        .iter()
        .map(|t| t.text.chars().count() as u16 + 4)
        .max()
        .unwrap_or(20)
        .min(area.width.saturating_sub(2));
    let rect = Rect {
        x: area.x + area.width.saturating_sub(width + 1),
        y: area.y,
        width,
        height: height.min(area.height),
    };

    frame.render_widget(Clear, rect);
    let text = app
        .toasts
        .iter()
        .map(|t| t.text.clone())
        .collect::<Vec<_>>()
        .join("\n");
    let par = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(par, rect);
}
