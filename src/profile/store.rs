use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tracing::{info, warn};

use crate::error::{Error, Result};

use super::model::UserProfile;

/// Messages the event loop reads back from the writer thread (failed saves,
/// mostly) and shows as toasts.
pub type NoticeHandle = Arc<Mutex<Vec<String>>>;

enum WriteJob {
    Save(PathBuf, UserProfile),
    Quit,
}

/// Filesystem-backed profile store with a fire-and-forget writer thread.
pub struct ProfileStore {
    dir: PathBuf,
    tx: Sender<WriteJob>,
    notices: NoticeHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl ProfileStore {
    /// Open (and create if needed) the store at `dir` and spawn the writer.
    pub fn open(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)?;

        let (tx, rx) = mpsc::channel::<WriteJob>();
        let notices: NoticeHandle = Arc::new(Mutex::new(Vec::new()));

        let notices_for_thread = notices.clone();
        let join = thread::spawn(move || {
            while let Ok(job) = rx.recv() {
                match job {
                    WriteJob::Save(path, profile) => {
                        if let Err(err) = write_profile(&path, &profile) {
                            warn!(nickname = %profile.nickname, %err, "profile save failed");
                            if let Ok(mut n) = notices_for_thread.lock() {
                                n.push(format!("Could not save profile: {err}"));
                            }
                        } else {
                            info!(nickname = %profile.nickname, "profile saved");
                        }
                    }
                    WriteJob::Quit => break,
                }
            }
        });

        Ok(Self {
            dir,
            tx,
            notices,
            join: Mutex::new(Some(join)),
        })
    }

    pub fn notices(&self) -> NoticeHandle {
        self.notices.clone()
    }

    fn profile_path(&self, nickname: &str) -> PathBuf {
        self.dir.join(format!("{nickname}.toml"))
    }

    /// Load the profile for `nickname`, creating a fresh document when none
    /// exists yet. A present-but-corrupt document is an error, not a reset.
    pub fn load_or_create(&self, nickname: &str) -> Result<UserProfile> {
        let path = self.profile_path(nickname);
        if !path.exists() {
            let profile = UserProfile::new(nickname);
            self.save(&profile);
            return Ok(profile);
        }

        let text = fs::read_to_string(&path)?;
        let profile: UserProfile = toml::from_str(&text)
            .map_err(|e| Error::Config(format!("bad profile {}: {e}", path.display())))?;
        Ok(profile)
    }

    /// Queue a save of `profile`. Fire-and-forget: failures come back
    /// through the notice handle.
    pub fn save(&self, profile: &UserProfile) {
        let path = self.profile_path(&profile.nickname);
        let _ = self.tx.send(WriteJob::Save(path, profile.clone()));
    }

    /// Overwrite the daily score and queue the save.
    pub fn set_daily_score(&self, profile: &mut UserProfile, score: u32) {
        profile.daily_score = score;
        self.save(profile);
    }

    /// Add a track id to the saved list with set semantics. Returns false
    /// when the id was already present (nothing written).
    pub fn add_saved_track(&self, profile: &mut UserProfile, track_id: &str) -> bool {
        if profile.saved_track_ids.iter().any(|id| id == track_id) {
            return false;
        }
        profile.saved_track_ids.push(track_id.to_string());
        self.save(profile);
        true
    }

    /// Remove a track id from the saved list. Returns false when absent.
    pub fn remove_saved_track(&self, profile: &mut UserProfile, track_id: &str) -> bool {
        let before = profile.saved_track_ids.len();
        profile.saved_track_ids.retain(|id| id != track_id);
        if profile.saved_track_ids.len() == before {
            return false;
        }
        self.save(profile);
        true
    }

    /// Flush pending writes and stop the writer thread.
    pub fn shutdown(&self) {
        let _ = self.tx.send(WriteJob::Quit);
        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

fn write_profile(path: &PathBuf, profile: &UserProfile) -> Result<()> {
    let text = toml::to_string_pretty(profile)
        .map_err(|e| Error::Config(format!("profile serialize: {e}")))?;
    fs::write(path, text)?;
    Ok(())
}
