//! Track catalog provider.
//!
//! The catalog is a read-only collection of playable tracks described by a
//! TOML manifest, with audio clips resolved against an assets directory.

mod assets;
mod load;
mod model;

pub use assets::index_audio_files;
pub use load::{load, resolve_audio_ref};
pub use model::Track;

#[cfg(test)]
mod tests;
