//! Utilities for creating `rodio` sinks from clip files.
//!
//! Unlike a library player, the game treats an unreadable clip as a
//! recoverable condition, so open/decode failures come back as errors
//! instead of panics.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::error::{Error, Result};

/// Create a paused `Sink` for the clip at `path`, returning the decoded
/// total length when the format exposes one.
pub(super) fn create_sink(handle: &OutputStream, path: &Path) -> Result<(Sink, Option<Duration>)> {
    let file = File::open(path)
        .map_err(|e| Error::Playback(format!("open {}: {e}", path.display())))?;

    let source = Decoder::new(BufReader::new(file))
        .map_err(|e| Error::Playback(format!("decode {}: {e}", path.display())))?;
    let total = source.total_duration();

    let sink = Sink::connect_new(handle.mixer());
    sink.append(source);
    sink.pause();
    Ok((sink, total))
}
