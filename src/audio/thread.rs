use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rodio::{OutputStreamBuilder, Sink};
use tracing::warn;

use super::sink::create_sink;
use super::types::{AudioCmd, PlaybackHandle};

/// Sampling cadence for progress updates and end-of-clip detection.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    playback_info: PlaybackHandle,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream = OutputStreamBuilder::open_default_stream().expect("ERR: No audio output device");
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        let mut stream = stream;
        stream.log_on_drop(false);

        let mut sink: Option<Sink> = None;
        let mut paused = false;

        // Clip start time and accumulated elapsed when paused.
        let mut started_at: Option<Instant> = None;
        let mut accumulated = Duration::ZERO;

        fn do_stop(
            sink: &mut Option<Sink>,
            paused: &mut bool,
            started_at: &mut Option<Instant>,
            accumulated: &mut Duration,
            playback_info: &PlaybackHandle,
        ) {
            if let Some(s) = sink.as_ref() {
                s.stop();
            }
            *sink = None;
            *paused = false;
            *started_at = None;
            *accumulated = Duration::ZERO;
            if let Ok(mut info) = playback_info.lock() {
                info.elapsed = Duration::ZERO;
                info.playing = false;
            }
        }

        fn fade_out_sink(sink: &Sink, fade_out_ms: u64) {
            if fade_out_ms == 0 {
                sink.set_volume(0.0);
                return;
            }
            let steps: u64 = 20;
            let step_ms = (fade_out_ms / steps).max(1);
            sink.set_volume(1.0);
            for step in 1..=steps {
                let t = step as f32 / steps as f32;
                sink.set_volume(1.0 - t);
                thread::sleep(Duration::from_millis(step_ms));
            }
            sink.set_volume(0.0);
        }

        loop {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(cmd) => match cmd {
                    AudioCmd::Load {
                        path,
                        token,
                        fallback_duration,
                    } => {
                        // At most one active resource: tear the old one down
                        // before touching the new clip.
                        do_stop(
                            &mut sink,
                            &mut paused,
                            &mut started_at,
                            &mut accumulated,
                            &playback_info,
                        );

                        match create_sink(&stream, &path) {
                            Ok((new_sink, decoded_duration)) => {
                                new_sink.set_volume(1.0);
                                new_sink.play();
                                sink = Some(new_sink);
                                paused = false;
                                started_at = Some(Instant::now());
                                accumulated = Duration::ZERO;

                                if let Ok(mut info) = playback_info.lock() {
                                    info.token = token;
                                    info.duration = decoded_duration.or(fallback_duration);
                                    info.elapsed = Duration::ZERO;
                                    info.playing = true;
                                    info.ended = false;
                                    info.failed = None;
                                }
                            }
                            Err(err) => {
                                warn!(path = %path.display(), %err, "clip failed to start");
                                if let Ok(mut info) = playback_info.lock() {
                                    info.token = token;
                                    info.duration = None;
                                    info.elapsed = Duration::ZERO;
                                    info.playing = false;
                                    info.ended = false;
                                    info.failed = Some(err.to_string());
                                }
                            }
                        }
                    }

                    AudioCmd::TogglePause => {
                        if let Some(ref s) = sink {
                            if paused {
                                s.play();
                                started_at = Some(Instant::now());
                                if let Ok(mut info) = playback_info.lock() {
                                    info.playing = true;
                                }
                            } else {
                                s.pause();
                                if let Some(st) = started_at {
                                    accumulated += Instant::now() - st;
                                }
                                started_at = None;
                                if let Ok(mut info) = playback_info.lock() {
                                    info.playing = false;
                                }
                            }
                            paused = !paused;
                        }
                    }

                    AudioCmd::Stop => {
                        do_stop(
                            &mut sink,
                            &mut paused,
                            &mut started_at,
                            &mut accumulated,
                            &playback_info,
                        );
                    }

                    AudioCmd::Quit { fade_out_ms } => {
                        if let Some(ref s) = sink {
                            // Fade out gently before stopping.
                            fade_out_sink(s, fade_out_ms);
                            s.stop();
                        }
                        if let Ok(mut info) = playback_info.lock() {
                            info.playing = false;
                        }
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => {
                    // Progress sample + end-of-clip detection.
                    if sink.is_none() {
                        continue;
                    }

                    let drained = sink
                        .as_ref()
                        .map(|s| !paused && s.empty())
                        .unwrap_or(false);
                    if drained {
                        do_stop(
                            &mut sink,
                            &mut paused,
                            &mut started_at,
                            &mut accumulated,
                            &playback_info,
                        );
                        if let Ok(mut info) = playback_info.lock() {
                            info.ended = true;
                        }
                    } else {
                        let elapsed =
                            accumulated + started_at.map_or(Duration::ZERO, |st| st.elapsed());
                        if let Ok(mut info) = playback_info.lock() {
                            info.elapsed = elapsed;
                        }
                    }
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}
