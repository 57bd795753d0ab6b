//! Application model: screens, toasts and the state each screen reads.
//!
//! The `App` struct is plain data plus small mutators; the event loop owns
//! it and the UI renders from it.

mod model;
mod playlist;

pub use model::{App, Screen, Toast};
pub use playlist::{PlaylistEntry, pinned_entries};

#[cfg(test)]
mod tests;
