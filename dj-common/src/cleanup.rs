//! Library folder cleanup planning
//!
//! Given a flat listing of a download folder, partitions entries into
//! convert/flatten/delete action sets. The plan is advisory; file
//! operations are performed by the caller.

use serde::{Deserialize, Serialize};

/// Directory used by the download client for in-flight transfers.
/// Never queued for any cleanup action.
pub const INCOMPLETE_DIR: &str = ".incomplete";

/// One entry from a flat directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesystemEntry {
    pub name: String,
    pub is_directory: bool,
    /// Lowercase extension without the dot; empty when none
    pub extension: String,
    /// Directory depth below the target folder; 0 = folder root
    pub depth: u32,
}

/// Planned cleanup actions for a download folder
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanupPlan {
    /// FLAC files to convert to WAV
    pub to_convert: Vec<FilesystemEntry>,
    /// Audio files in subfolders to move to the folder root
    pub to_flatten: Vec<FilesystemEntry>,
    /// Junk files (m4a, artwork images) to remove
    pub to_delete: Vec<FilesystemEntry>,
}

/// Compute the cleanup plan for a folder listing.
///
/// Rules are evaluated independently per entry; buckets are not mutually
/// exclusive. Directories (including `.incomplete`) are never queued.
pub fn plan_cleanup(entries: &[FilesystemEntry]) -> CleanupPlan {
    let mut plan = CleanupPlan::default();

    for entry in entries {
        if entry.is_directory {
            continue;
        }

        let ext = entry.extension.to_lowercase();

        if ext == "flac" {
            plan.to_convert.push(entry.clone());
        } else if matches!(ext.as_str(), "m4a" | "jpg" | "jpeg" | "png") {
            plan.to_delete.push(entry.clone());
        }

        if entry.depth > 0 && matches!(ext.as_str(), "wav" | "mp3") {
            plan.to_flatten.push(entry.clone());
        }
    }

    plan
}
