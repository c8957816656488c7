// Debug frame log - persists per-frame analysis records for troubleshooting
//
// When frame saving is enabled, every analyzed frame produces one JSON
// record on disk: frame number, mode, state label, rep count, and the raw
// displacement for motion exercises. Filenames follow the
// frame_{n:04}_reps_{r}_{timestamp} convention so a directory listing reads
// as a timeline. Sink failures are logged and swallowed; debugging output
// must never take down frame analysis.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::telemetry::{self, DiagnosticError};

/// One analyzed frame's debug record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameRecord {
    pub frame: u64,
    pub mode: String,
    /// State label: position name or formatted angle
    pub state: String,
    pub rep_count: u32,
    /// Wrist-shoulder displacement for motion exercises, 0 otherwise
    pub displacement: f32,
}

/// Writes frame records into a debug directory.
pub struct DebugFrameLog {
    dir: PathBuf,
}

impl DebugFrameLog {
    /// Create the log, ensuring the directory exists.
    pub fn create(dir: &Path) -> std::io::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Persist one record. Failures are logged, never propagated.
    pub fn save(&self, record: &FrameRecord) {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let filename = format!(
            "frame_{:04}_reps_{}_{}.json",
            record.frame, record.rep_count, timestamp
        );
        let path = self.dir.join(&filename);

        let json = match serde_json::to_string_pretty(record) {
            Ok(json) => json,
            Err(err) => {
                error!("Error serializing debug frame record: {}", err);
                telemetry::hub().record_error(DiagnosticError::DebugSinkFailure, err.to_string());
                return;
            }
        };

        match fs::write(&path, json) {
            Ok(()) => debug!("Debug frame saved: {}", filename),
            Err(err) => {
                error!("Error saving debug frame {}: {}", filename, err);
                telemetry::hub().record_error(DiagnosticError::DebugSinkFailure, err.to_string());
            }
        }
    }
}
