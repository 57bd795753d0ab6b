use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::catalog::Track;
use crate::profile::UserProfile;

use super::model::App;
use super::playlist::pinned_entries;

fn t(id: &str, title: &str) -> Track {
    Track {
        id: id.into(),
        title: title.into(),
        artist: "Artist".into(),
        cover_url: None,
        artist_image_url: None,
        audio_path: PathBuf::from(format!("/sounds/{id}.mp3")),
        decoys: vec!["X".into(), "Y".into(), "Z".into()],
        duration: None,
    }
}

#[test]
fn toasts_expire_and_stack_stays_shallow() {
    let mut app = App::new(vec![]);
    let now = Instant::now();
    let ttl = Duration::from_secs(3);

    for i in 0..6 {
        app.push_toast(format!("toast {i}"), now, ttl);
    }
    assert_eq!(app.toasts.len(), 4);
    assert_eq!(app.toasts[0].text, "toast 2");

    app.prune_toasts(now + Duration::from_secs(2));
    assert_eq!(app.toasts.len(), 4);
    app.prune_toasts(now + Duration::from_secs(4));
    assert!(app.toasts.is_empty());
}

#[test]
fn profile_mut_reports_unauthenticated_without_a_sign_in() {
    let mut app = App::new(vec![]);
    assert!(matches!(
        app.profile_mut(),
        Err(crate::error::Error::Unauthenticated)
    ));

    app.profile = Some(UserProfile::new("nightowl7"));
    assert!(app.profile_mut().is_ok());
}

#[test]
fn ranking_places_player_by_score_and_keeps_five_rows() {
    let mut app = App::new(vec![]);
    let mut profile = UserProfile::new("nightowl7");
    profile.daily_score = 140;
    app.profile = Some(profile);

    let rows = app.ranking();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].0, "MelodyMaster");
    assert_eq!(rows[1].0, "TuneTitan");
    assert_eq!(rows[2].0, "nightowl7");
    assert_eq!(rows[3].0, "HarmonyHero");
    assert_eq!(rows[4].0, "LyricLord");
}

#[test]
fn ranking_ties_keep_house_players_on_top() {
    let mut app = App::new(vec![]);
    let mut profile = UserProfile::new("nightowl7");
    profile.daily_score = 90;
    app.profile = Some(profile);

    let rows = app.ranking();
    assert_eq!(rows[4].0, "BeatBoss");
    assert!(!rows.iter().any(|(name, _)| name == "nightowl7"));
}

#[test]
fn playlist_combines_pinned_and_saved_tracks() {
    let mut app = App::new(vec![t("joji1", "Glimpse of Us"), t("t2", "Song 2")]);
    let mut profile = UserProfile::new("nightowl7");
    profile.saved_track_ids = vec!["t2".into(), "gone".into()];
    app.profile = Some(profile);

    let mut index = BTreeMap::new();
    index.insert("keshi.mp3".to_string(), PathBuf::from("/sounds/keshi.mp3"));
    let pinned = pinned_entries(&index);
    assert_eq!(pinned.len(), 2);
    assert!(pinned[0].audio_path.is_some());
    assert!(pinned[1].audio_path.is_none()); // cafune.mp3 absent from assets

    app.rebuild_playlist(&pinned);
    // Two pinned rows, one saved track; the stale "gone" id is dropped.
    assert_eq!(app.playlist.len(), 3);
    assert!(app.playlist[0].pinned);
    assert!(app.playlist[1].pinned);
    assert_eq!(app.playlist[2].id, "t2");
    assert!(!app.playlist[2].pinned);
}

#[test]
fn playlist_cursor_wraps_both_ways() {
    let mut app = App::new(vec![t("a", "A"), t("b", "B")]);
    let mut profile = UserProfile::new("nightowl7");
    profile.saved_track_ids = vec!["a".into(), "b".into()];
    app.profile = Some(profile);
    app.rebuild_playlist(&[]);
    assert_eq!(app.playlist.len(), 2);

    app.playlist_prev();
    assert_eq!(app.playlist_selected, 1);
    app.playlist_next();
    assert_eq!(app.playlist_selected, 0);
    app.playlist_next();
    assert_eq!(app.playlist_selected, 1);
}

#[test]
fn rebuild_clamps_a_dangling_selection() {
    let mut app = App::new(vec![t("a", "A")]);
    let mut profile = UserProfile::new("nightowl7");
    profile.saved_track_ids = vec!["a".into()];
    app.profile = Some(profile);
    app.rebuild_playlist(&[]);
    app.playlist_selected = 0;

    // Removing the only saved track leaves an empty list.
    app.profile.as_mut().unwrap().saved_track_ids.clear();
    app.rebuild_playlist(&[]);
    assert!(app.playlist.is_empty());
    assert_eq!(app.playlist_selected, 0);
}
