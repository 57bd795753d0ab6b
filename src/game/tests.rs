use std::path::PathBuf;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::catalog::Track;

use super::clock::{RoundTicker, Tick};
use super::options::build_options;
use super::round::RoundStatus;
use super::session::{Advance, GameSession};

fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

fn track(id: &str, title: &str, duration_secs: u64) -> Track {
    Track {
        id: id.into(),
        title: title.into(),
        artist: "Artist".into(),
        cover_url: None,
        artist_image_url: None,
        audio_path: PathBuf::from(format!("/sounds/{id}.mp3")),
        decoys: vec!["Decoy X".into(), "Decoy Y".into(), "Decoy Z".into()],
        duration: Some(Duration::from_secs(duration_secs)),
    }
}

fn ten_track_catalog() -> Vec<Track> {
    let mut catalog = vec![track("joji1", "Glimpse of Us", 30)];
    for i in 2..=10 {
        catalog.push(track(&format!("t{i}"), &format!("Song {i}"), 20 + i));
    }
    catalog
}

fn correct_index(session: &GameSession) -> usize {
    session.round().unwrap().correct_index().unwrap()
}

fn wrong_index(session: &GameSession) -> usize {
    let round = session.round().unwrap();
    let correct = round.correct_index().unwrap();
    (0..round.options().len()).find(|&i| i != correct).unwrap()
}

#[test]
fn options_contain_title_and_all_unique_decoys() {
    let mut rng = rng(1);
    let opts = build_options(
        "Real",
        &["A".into(), "B".into(), "A".into(), "Real".into()],
        &mut rng,
    );
    assert_eq!(opts.len(), 3); // Real, A, B — duplicates collapse
    assert!(opts.iter().any(|o| o == "Real"));
    assert!(opts.iter().any(|o| o == "A"));
    assert!(opts.iter().any(|o| o == "B"));
}

#[test]
fn option_shuffle_is_uniform_over_positions() {
    // Chi-square against the uniform distribution: with 4 options over 4000
    // shuffles each position should hold the title ~1000 times. Critical
    // value for df=3 at p=0.001 is 16.27; the deterministic seed keeps this
    // stable well under 16.
    let mut rng = rng(42);
    let decoys: Vec<String> = vec!["A".into(), "B".into(), "C".into()];
    const TRIALS: usize = 4000;
    let mut counts = [0usize; 4];

    for _ in 0..TRIALS {
        let opts = build_options("Real", &decoys, &mut rng);
        let pos = opts.iter().position(|o| o == "Real").unwrap();
        counts[pos] += 1;
    }

    let expected = TRIALS as f64 / 4.0;
    let chi2: f64 = counts
        .iter()
        .map(|&c| {
            let d = c as f64 - expected;
            d * d / expected
        })
        .sum();
    assert!(chi2 < 16.0, "chi-square too high: {chi2}, counts {counts:?}");
}

#[test]
fn score_equals_remaining_budget_and_stays_in_bounds() {
    let mut rng = rng(2);
    let mut session = GameSession::new(&ten_track_catalog(), "joji1", 10, &mut rng).unwrap();
    session.start_round(&mut rng).unwrap();
    assert!(session.audio_ready(30.0).is_none());

    // Five seconds pass before the (correct) answer.
    for _ in 0..5 {
        assert!(session.submit_answer(usize::MAX).is_none()); // out of range, no-op
        let r#gen = session.generation();
        assert!(session.apply_tick(Tick { generation: r#gen }).is_none());
    }

    let idx = correct_index(&session);
    let result = session.submit_answer(idx).unwrap();
    assert!(result.correct);
    assert_eq!(result.score, 25);
    assert!(result.score <= 30);
    assert_eq!(session.round().unwrap().status(), RoundStatus::AnsweredCorrect);
}

#[test]
fn wrong_answer_scores_zero() {
    let mut rng = rng(3);
    let mut session = GameSession::new(&ten_track_catalog(), "joji1", 10, &mut rng).unwrap();
    session.start_round(&mut rng).unwrap();
    session.audio_ready(30.0);

    let idx = wrong_index(&session);
    let result = session.submit_answer(idx).unwrap();
    assert!(!result.correct);
    assert!(!result.timed_out);
    assert_eq!(result.score, 0);
    assert_eq!(session.round().unwrap().status(), RoundStatus::AnsweredWrong);
    assert_eq!(session.state().misses, 1);
}

#[test]
fn countdown_reaching_zero_times_the_round_out() {
    let mut rng = rng(4);
    let mut session = GameSession::new(&[track("a", "A", 3)], "a", 10, &mut rng).unwrap();
    session.start_round(&mut rng).unwrap();
    session.audio_ready(3.0);

    let r#gen = session.generation();
    assert!(session.apply_tick(Tick { generation: r#gen }).is_none());
    assert!(session.apply_tick(Tick { generation: r#gen }).is_none());
    let result = session.apply_tick(Tick { generation: r#gen }).unwrap();
    assert!(result.timed_out);
    assert_eq!(result.score, 0);
    assert_eq!(session.round().unwrap().status(), RoundStatus::TimedOut);

    // Timeout takes precedence: a late click is a no-op.
    let idx = correct_index(&session);
    assert!(session.submit_answer(idx).is_none());
    assert_eq!(session.state().round_scores, vec![0]);
}

#[test]
fn submit_answer_is_idempotent_after_resolution() {
    let mut rng = rng(5);
    let mut session = GameSession::new(&ten_track_catalog(), "joji1", 10, &mut rng).unwrap();
    session.start_round(&mut rng).unwrap();
    session.audio_ready(30.0);

    let idx = correct_index(&session);
    let first = session.submit_answer(idx).unwrap();
    assert!(session.submit_answer(idx).is_none());
    assert!(session.submit_answer(wrong_index(&session)).is_none());

    assert_eq!(session.state().round_scores, vec![first.score]);
    assert_eq!(session.state().hits, 1);
    assert_eq!(session.state().misses, 0);
}

#[test]
fn zero_or_unparseable_duration_times_out_immediately() {
    let mut rng = rng(6);
    for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
        let mut session = GameSession::new(&[track("a", "A", 0)], "a", 10, &mut rng).unwrap();
        session.start_round(&mut rng).unwrap();
        let result = session.audio_ready(bad).unwrap();
        assert!(result.timed_out, "duration {bad} should time out");
        assert_eq!(result.score, 0);
        assert_eq!(session.state().misses, 1);
    }
}

#[test]
fn warning_fires_inside_final_quarter() {
    let mut rng = rng(7);
    let mut session = GameSession::new(&[track("a", "A", 30)], "a", 10, &mut rng).unwrap();
    session.start_round(&mut rng).unwrap();
    session.audio_ready(30.0);

    // floor(30 * 0.25) = 7: warning at remaining <= 7.
    let r#gen = session.generation();
    for _ in 0..22 {
        session.apply_tick(Tick { generation: r#gen });
    }
    assert_eq!(session.round().unwrap().remaining_secs(), 8);
    assert!(!session.round().unwrap().warning_active());

    session.apply_tick(Tick { generation: r#gen });
    assert_eq!(session.round().unwrap().remaining_secs(), 7);
    assert!(session.round().unwrap().warning_active());
}

#[test]
fn stale_ticks_from_a_superseded_round_are_ignored() {
    let mut rng = rng(8);
    let base = Instant::now();
    let mut session = GameSession::new(&ten_track_catalog(), "joji1", 10, &mut rng).unwrap();

    session.start_round(&mut rng).unwrap();
    session.audio_ready(30.0);
    let mut stale_ticker = RoundTicker::start(session.generation(), base);

    let idx = correct_index(&session);
    session.submit_answer(idx).unwrap();
    assert_eq!(session.advance(), Advance::NextRound);

    session.start_round(&mut rng).unwrap();
    session.audio_ready(25.0);
    let mut live_ticker = RoundTicker::start(session.generation(), base);

    // The old ticker fires long after its round is gone; the fake clock
    // advances five seconds and none of them may touch the new round.
    for tick in stale_ticker.poll(base + Duration::from_secs(5)) {
        assert!(session.apply_tick(tick).is_none());
    }
    assert_eq!(session.round().unwrap().remaining_secs(), 25);

    // The live ticker's seconds do count.
    for tick in live_ticker.poll(base + Duration::from_secs(5)) {
        session.apply_tick(tick);
    }
    assert_eq!(session.round().unwrap().remaining_secs(), 20);
}

#[test]
fn ticker_emits_missed_seconds_in_one_poll() {
    let base = Instant::now();
    let mut ticker = RoundTicker::start(7, base);

    assert!(ticker.poll(base + Duration::from_millis(900)).is_empty());
    let ticks = ticker.poll(base + Duration::from_millis(3200));
    assert_eq!(ticks.len(), 3);
    assert!(ticks.iter().all(|t| t.generation == 7));
    assert!(ticker.poll(base + Duration::from_millis(3400)).is_empty());
    assert!(ticker.until_next(base + Duration::from_millis(3400)) <= Duration::from_millis(600));
}

#[test]
fn tallies_stay_consistent_across_a_session() {
    let mut rng = rng(9);
    let mut session = GameSession::new(&ten_track_catalog(), "joji1", 10, &mut rng).unwrap();

    for round in 0..session.sequence_len() {
        session.start_round(&mut rng).unwrap();
        session.audio_ready(30.0);
        if round % 2 == 0 {
            session.submit_answer(correct_index(&session));
        } else {
            session.submit_answer(wrong_index(&session));
        }
        session.advance();

        let state = session.state();
        assert_eq!(
            state.hits + state.misses,
            state.round_scores.len() as u32
        );
        assert_eq!(state.round_scores.len(), state.round_index);
    }

    assert!(session.is_complete());
    assert_eq!(session.state().hits, 5);
    assert_eq!(session.state().misses, 5);
    assert_eq!(
        session.total_score(),
        session.state().round_scores.iter().sum::<u32>()
    );
}

#[test]
fn anchored_session_plays_ten_rounds_and_sums_full_budgets() {
    let mut rng = rng(10);
    let catalog = ten_track_catalog();
    let mut session = GameSession::new(&catalog, "joji1", 10, &mut rng).unwrap();

    assert_eq!(session.sequence_len(), 10);

    let mut expected_total = 0u32;
    loop {
        let round = session.start_round(&mut rng).unwrap();
        let budget = round.track().duration.unwrap().as_secs_f64();
        expected_total += budget.floor() as u32;

        session.audio_ready(budget);
        // Answer instantly: zero elapsed, full budget scored.
        session.submit_answer(correct_index(&session));

        if let Advance::Complete { total } = session.advance() {
            assert_eq!(total, expected_total);
            break;
        }
    }

    assert_eq!(session.state().hits, 10);
    assert_eq!(session.state().misses, 0);
}

#[test]
fn anchor_track_opens_the_sequence_when_present() {
    for seed in 0..20 {
        let mut rng = rng(seed);
        let mut session = GameSession::new(&ten_track_catalog(), "joji1", 10, &mut rng).unwrap();
        let first = session.start_round(&mut rng).unwrap();
        assert_eq!(first.track().id, "joji1");
    }
}

#[test]
fn session_length_is_capped_by_catalog_size() {
    let mut rng = rng(11);
    let catalog = vec![
        track("a", "A", 10),
        track("b", "B", 10),
        track("c", "C", 10),
    ];
    let session = GameSession::new(&catalog, "joji1", 10, &mut rng).unwrap();
    assert_eq!(session.sequence_len(), 3);
}

#[test]
fn empty_catalog_reports_not_found() {
    let mut rng = rng(12);
    let err = GameSession::new(&[], "joji1", 10, &mut rng).unwrap_err();
    assert!(matches!(err, crate::error::Error::NotFound(_)));
}

#[test]
fn completion_tally_is_handed_out_exactly_once() {
    let mut rng = rng(13);
    let mut session = GameSession::new(&[track("a", "A", 10)], "a", 1, &mut rng).unwrap();
    assert!(session.completion_to_persist().is_none());

    session.start_round(&mut rng).unwrap();
    session.audio_ready(10.0);
    session.submit_answer(correct_index(&session));
    assert!(matches!(session.advance(), Advance::Complete { total: 10 }));

    assert_eq!(session.completion_to_persist(), Some(10));
    assert_eq!(session.completion_to_persist(), None);
}

#[test]
fn restart_resets_tallies_and_allows_a_fresh_run() {
    let mut rng = rng(14);
    let mut session = GameSession::new(&ten_track_catalog(), "joji1", 10, &mut rng).unwrap();

    session.start_round(&mut rng).unwrap();
    session.audio_ready(30.0);
    session.submit_answer(correct_index(&session));
    session.advance();

    session.restart(&mut rng);
    let state = session.state();
    assert_eq!(state.round_index, 0);
    assert!(state.round_scores.is_empty());
    assert_eq!(state.hits, 0);
    assert_eq!(state.misses, 0);
    assert!(!session.is_complete());
    assert_eq!(session.sequence_len(), 10);

    let first = session.start_round(&mut rng).unwrap();
    assert_eq!(first.track().id, "joji1");
}
