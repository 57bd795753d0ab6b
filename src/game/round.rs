use rand::Rng;

use crate::catalog::Track;

use super::options::build_options;

/// Lifecycle of a single round. The three resolved states are terminal; a
/// new round always constructs a fresh `RoundState`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RoundStatus {
    /// Waiting for the clip to decode and report a duration.
    Loading,
    /// Clip playing, countdown running, answers accepted.
    Playing,
    AnsweredCorrect,
    AnsweredWrong,
    TimedOut,
}

/// Outcome of one resolved round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundResult {
    pub correct: bool,
    pub timed_out: bool,
    pub score: u32,
}

/// State for one guess-the-track cycle.
#[derive(Debug)]
pub struct RoundState {
    track: Track,
    options: Vec<String>,
    status: RoundStatus,
    /// Scoring budget in seconds, fixed once the clip reports its length.
    duration_secs: f64,
    remaining_secs: u32,
    /// Index of the option the player picked, kept for the reveal.
    chosen: Option<usize>,
}

impl RoundState {
    /// Start a round for `track`: options are regenerated and shuffled, the
    /// countdown waits for `audio_ready`.
    pub fn new<R: Rng + ?Sized>(track: Track, rng: &mut R) -> Self {
        let options = build_options(&track.title, &track.decoys, rng);
        Self {
            track,
            options,
            status: RoundStatus::Loading,
            duration_secs: 0.0,
            remaining_secs: 0,
            chosen: None,
        }
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn status(&self) -> RoundStatus {
        self.status
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn chosen(&self) -> Option<usize> {
        self.chosen
    }

    pub fn is_resolved(&self) -> bool {
        matches!(
            self.status,
            RoundStatus::AnsweredCorrect | RoundStatus::AnsweredWrong | RoundStatus::TimedOut
        )
    }

    /// Index of the correct option, for the post-resolution reveal.
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| *o == self.track.title)
    }

    /// True while the countdown is inside the final quarter of the budget.
    /// Purely presentational.
    pub fn warning_active(&self) -> bool {
        self.status == RoundStatus::Playing
            && self.remaining_secs <= (self.duration_secs * 0.25).floor() as u32
    }

    /// The clip reported its length: fix the scoring budget and start the
    /// countdown. Non-finite or negative lengths clamp to zero, and a zero
    /// budget times the round out on the spot.
    pub fn audio_ready(&mut self, duration_secs: f64) -> Option<RoundResult> {
        if self.status != RoundStatus::Loading {
            return None;
        }

        let budget = if duration_secs.is_finite() && duration_secs > 0.0 {
            duration_secs
        } else {
            0.0
        };
        self.duration_secs = budget;
        self.remaining_secs = budget.floor() as u32;

        if self.remaining_secs == 0 {
            self.status = RoundStatus::TimedOut;
            return Some(RoundResult {
                correct: false,
                timed_out: true,
                score: 0,
            });
        }

        self.status = RoundStatus::Playing;
        None
    }

    /// One countdown second elapsed. Resolves to a timeout when the counter
    /// reaches zero; no-op in any other state.
    pub fn tick(&mut self) -> Option<RoundResult> {
        if self.status != RoundStatus::Playing {
            return None;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.status = RoundStatus::TimedOut;
            return Some(RoundResult {
                correct: false,
                timed_out: true,
                score: 0,
            });
        }

        None
    }

    /// Resolve the round with the player's pick. First call wins: once the
    /// round is resolved (answered or timed out) further calls are no-ops.
    pub fn submit_answer(&mut self, option_index: usize) -> Option<RoundResult> {
        if self.status != RoundStatus::Playing {
            return None;
        }
        let Some(option) = self.options.get(option_index) else {
            return None;
        };

        self.chosen = Some(option_index);
        let correct = *option == self.track.title;

        let score = if correct {
            let elapsed = self.duration_secs - f64::from(self.remaining_secs);
            (self.duration_secs - elapsed).floor().max(0.0) as u32
        } else {
            0
        };

        self.status = if correct {
            RoundStatus::AnsweredCorrect
        } else {
            RoundStatus::AnsweredWrong
        };

        Some(RoundResult {
            correct,
            timed_out: false,
            score,
        })
    }
}
