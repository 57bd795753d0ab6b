//! Audio playback adapter.
//!
//! A single worker thread owns the output stream and at most one sink at a
//! time; the rest of the app talks to it over an mpsc channel and reads a
//! shared `PlaybackInfo` snapshot. Loads carry a token so a poll can never
//! mistake a superseded clip's state for the current one.

mod player;
mod sink;
mod thread;
mod types;

pub use player::AudioPlayer;
pub use types::{AudioCmd, PlaybackHandle, PlaybackInfo};
