//! Crash recovery: a periodic snapshot of the working guide to a session
//! file beside (not inside) the main store.
//!
//! The autosave loop is best-effort by contract. A failed tick is logged
//! and the loop keeps going; nothing here may interrupt an active capture
//! or edit. Orphaned session files left behind by an abnormal exit are the
//! crash evidence that `list_recoverable_sessions` surfaces.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{error, info};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::models::validate::check_guide;
use crate::models::Guide;
use crate::storage::GuideStore;

const AUTOSAVE_DIR: &str = "autosave";
const SESSION_PREFIX: &str = "session-";

/// What kind of session produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Capture,
    Editor,
}

/// One on-disk snapshot of an in-progress guide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoverySession {
    pub guide_id: String,
    pub guide: Guide,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: SessionKind,
}

#[derive(Debug, Clone)]
pub struct AutosaveConfig {
    pub interval: Duration,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
        }
    }
}

pub struct CrashRecovery {
    store: Arc<GuideStore>,
    autosave_path: PathBuf,
    config: AutosaveConfig,
    task: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

impl CrashRecovery {
    pub fn new(store: Arc<GuideStore>, config: AutosaveConfig) -> Self {
        let autosave_path = store.base_path().join(AUTOSAVE_DIR);
        Self {
            store,
            autosave_path,
            config,
            task: Mutex::new(None),
        }
    }

    pub fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.autosave_path)?;
        Ok(())
    }

    fn session_path(&self, guide_id: &str) -> PathBuf {
        self.autosave_path
            .join(format!("{SESSION_PREFIX}{guide_id}.json"))
    }

    /// Writes (or overwrites) the snapshot for this guide id.
    pub fn save_session(&self, guide: &Guide, kind: SessionKind) -> Result<()> {
        write_session(&self.autosave_path, guide, kind)
    }

    /// Reads one session back; absent or unparseable files are `None`.
    pub fn load_session(&self, guide_id: &str) -> Option<RecoverySession> {
        let path = self.session_path(guide_id);
        let contents = fs::read_to_string(&path).ok()?;
        parse_session(&contents)
    }

    /// Deletes the session file if present; idempotent.
    pub fn clear_session(&self, guide_id: &str) -> Result<()> {
        let path = self.session_path(guide_id);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Every valid session on disk, newest snapshot first. Unreadable files
    /// are skipped silently; a bad session must never break the listing.
    pub fn list_recoverable_sessions(&self) -> Vec<RecoverySession> {
        let Ok(entries) = fs::read_dir(&self.autosave_path) else {
            return Vec::new();
        };

        let mut sessions: Vec<RecoverySession> = entries
            .flatten()
            .filter(|entry| {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                name.starts_with(SESSION_PREFIX) && name.ends_with(".json")
            })
            .filter_map(|entry| fs::read_to_string(entry.path()).ok())
            .filter_map(|contents| parse_session(&contents))
            .collect();

        sessions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        sessions
    }

    /// Commits the snapshot into the main store, deletes the session file,
    /// and returns the recovered guide. The recovered version overwrites
    /// any stored guide of the same id; there is no merging.
    ///
    /// Absence is `Ok(None)`. A session file that exists but cannot be
    /// parsed is an error here — unlike listing, the caller asked for this
    /// specific session, so silently treating it as absent would hide the
    /// corruption.
    pub fn recover_session(&self, guide_id: &str) -> Result<Option<Guide>> {
        let path = self.session_path(guide_id);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(_) => return Ok(None),
        };
        let Some(session) = parse_session(&contents) else {
            return Err(Error::MalformedSession {
                path: path.display().to_string(),
            });
        };

        self.store.save_guide(&session.guide, true)?;
        self.clear_session(guide_id)?;
        info!("recovered guide {guide_id} from autosave");
        Ok(Some(session.guide))
    }

    /// Spawns the periodic snapshot task. Each tick asks the accessor for
    /// the current guide (`None` is skipped silently) and overwrites that
    /// guide's session file. Restarting replaces any prior task.
    pub fn start_autosave<F>(&self, get_guide: F, kind: SessionKind)
    where
        F: Fn() -> Option<Guide> + Send + Sync + 'static,
    {
        self.stop_autosave();

        let token = CancellationToken::new();
        let child = token.clone();
        let dir = self.autosave_path.clone();
        let interval = self.config.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of a tokio interval fires immediately; consume
            // it so snapshots start one full period in.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let Some(guide) = get_guide() else { continue };
                        if let Err(err) = write_session(&dir, &guide, kind) {
                            error!("autosave failed for guide {}: {err}", guide.id);
                        }
                    }
                    _ = child.cancelled() => {
                        info!("autosave loop shutting down");
                        break;
                    }
                }
            }
        });

        let mut guard = match self.task.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some((token, handle));
    }

    /// Cancels the autosave task; safe to call when none is running.
    pub fn stop_autosave(&self) {
        let mut guard = match self.task.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some((token, _handle)) = guard.take() {
            token.cancel();
        }
    }
}

impl Drop for CrashRecovery {
    fn drop(&mut self) {
        self.stop_autosave();
    }
}

fn write_session(autosave_dir: &std::path::Path, guide: &Guide, kind: SessionKind) -> Result<()> {
    let errors = check_guide(guide);
    if !errors.is_empty() {
        return Err(Error::SchemaViolation(errors));
    }

    let session = RecoverySession {
        guide_id: guide.id.clone(),
        guide: guide.clone(),
        timestamp: Utc::now(),
        kind,
    };

    let path = autosave_dir.join(format!("{SESSION_PREFIX}{}.json", guide.id));
    fs::write(&path, serde_json::to_string_pretty(&session)?)?;
    Ok(())
}

/// Parse plus guide re-validation; any failure means "not a session".
fn parse_session(contents: &str) -> Option<RecoverySession> {
    let session: RecoverySession = serde_json::from_str(contents).ok()?;
    if check_guide(&session.guide).is_empty() {
        Some(session)
    } else {
        None
    }
}
