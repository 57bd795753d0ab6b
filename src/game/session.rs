use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::catalog::Track;
use crate::error::{Error, Result};

use super::clock::Tick;
use super::round::{RoundResult, RoundState};

/// Per-session tallies. `round_scores` is append-only, one entry per
/// resolved round; `hits + misses` always equals its length.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub round_index: usize,
    pub round_scores: Vec<u32>,
    pub hits: u32,
    pub misses: u32,
}

/// What `advance` moved the session into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    NextRound,
    Complete { total: u32 },
}

/// Sequences the rounds of one game, accumulates results and hands the
/// final tally to the caller exactly once for persistence.
#[derive(Debug)]
pub struct GameSession {
    catalog: Vec<Track>,
    anchor_id: String,
    round_limit: usize,
    sequence: Vec<Track>,
    state: SessionState,
    round: Option<RoundState>,
    /// Bumped on every round start and on advance/restart; ticks stamped
    /// with an older generation are discarded.
    generation: u64,
    completion_persisted: bool,
}

impl GameSession {
    /// Build a session over `catalog`: the anchor track opens the sequence
    /// when present, followed by up to `round_limit - 1` uniformly shuffled
    /// others. An empty catalog is a degraded state, not a crash.
    pub fn new<R: Rng + ?Sized>(
        catalog: &[Track],
        anchor_id: &str,
        round_limit: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if catalog.is_empty() {
            return Err(Error::NotFound("no tracks in the catalog".to_string()));
        }

        let mut session = Self {
            catalog: catalog.to_vec(),
            anchor_id: anchor_id.to_string(),
            round_limit,
            sequence: Vec::new(),
            state: SessionState::default(),
            round: None,
            generation: 0,
            completion_persisted: false,
        };
        session.sequence = session.build_sequence(rng);
        debug!(rounds = session.sequence.len(), "session sequence built");
        Ok(session)
    }

    fn build_sequence<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Track> {
        let anchor = self.catalog.iter().find(|t| t.id == self.anchor_id).cloned();
        let mut rest: Vec<Track> = self
            .catalog
            .iter()
            .filter(|t| t.id != self.anchor_id)
            .cloned()
            .collect();
        rest.shuffle(rng);

        let tail_len = if anchor.is_some() {
            self.round_limit.saturating_sub(1)
        } else {
            self.round_limit
        };

        let mut sequence: Vec<Track> = anchor.into_iter().collect();
        sequence.extend(rest.into_iter().take(tail_len));
        sequence
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn round(&self) -> Option<&RoundState> {
        self.round.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn sequence_len(&self) -> usize {
        self.sequence.len()
    }

    pub fn total_score(&self) -> u32 {
        self.state.round_scores.iter().sum()
    }

    pub fn is_complete(&self) -> bool {
        self.state.round_index >= self.sequence.len()
    }

    /// Construct the round for the current index. Returns `None` once the
    /// sequence is exhausted.
    pub fn start_round<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&RoundState> {
        let track = self.sequence.get(self.state.round_index)?.clone();
        self.generation += 1;
        self.round = Some(RoundState::new(track, rng));
        self.round.as_ref()
    }

    /// Forward the clip duration to the live round. May resolve it
    /// immediately (zero budget).
    pub fn audio_ready(&mut self, duration_secs: f64) -> Option<RoundResult> {
        let result = self.round.as_mut()?.audio_ready(duration_secs);
        if let Some(r) = result {
            self.record(r);
        }
        result
    }

    /// Apply one countdown tick, discarding ticks from superseded rounds.
    pub fn apply_tick(&mut self, tick: Tick) -> Option<RoundResult> {
        if tick.generation != self.generation {
            debug!(
                stale = tick.generation,
                live = self.generation,
                "ignoring tick from a superseded round"
            );
            return None;
        }

        let result = self.round.as_mut()?.tick();
        if let Some(r) = result {
            self.record(r);
        }
        result
    }

    /// Resolve the live round with the player's pick. No-op after the round
    /// resolved (first click wins, timeout takes precedence).
    pub fn submit_answer(&mut self, option_index: usize) -> Option<RoundResult> {
        let result = self.round.as_mut()?.submit_answer(option_index);
        if let Some(r) = result {
            self.record(r);
        }
        result
    }

    fn record(&mut self, result: RoundResult) {
        self.state.round_scores.push(result.score);
        if result.correct {
            self.state.hits += 1;
        } else {
            self.state.misses += 1;
        }
        info!(
            round = self.state.round_index,
            correct = result.correct,
            timed_out = result.timed_out,
            score = result.score,
            "round resolved"
        );
    }

    /// Move past the resolved round. Completion is reported when the index
    /// reaches the end of the sequence; the generation bump cancels any
    /// ticker still pointed at the old round.
    pub fn advance(&mut self) -> Advance {
        self.state.round_index += 1;
        self.round = None;
        self.generation += 1;

        if self.is_complete() {
            let total = self.total_score();
            info!(
                total,
                hits = self.state.hits,
                misses = self.state.misses,
                "session complete"
            );
            Advance::Complete { total }
        } else {
            Advance::NextRound
        }
    }

    /// The final tally, handed out at most once per completed session so
    /// the profile write cannot race or repeat.
    pub fn completion_to_persist(&mut self) -> Option<u32> {
        if self.is_complete() && !self.completion_persisted {
            self.completion_persisted = true;
            Some(self.total_score())
        } else {
            None
        }
    }

    /// Reset tallies and reshuffle the non-anchor tail for a fresh run.
    /// The new ordering is independent of the previous one.
    pub fn restart<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.sequence = self.build_sequence(rng);
        self.state = SessionState::default();
        self.round = None;
        self.generation += 1;
        self.completion_persisted = false;
    }
}
