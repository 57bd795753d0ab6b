//! Game core: round engine, session controller and the round clock.
//!
//! Everything in here is a plain state machine with no UI or audio types;
//! the runtime adapter feeds it audio readiness, clock ticks and player
//! input, and renders whatever state comes back.

mod clock;
mod options;
mod round;
mod session;

pub use clock::{Clock, RoundTicker, SystemClock, Tick};
pub use options::build_options;
pub use round::{RoundResult, RoundState, RoundStatus};
pub use session::{Advance, GameSession, SessionState};

#[cfg(test)]
mod tests;
