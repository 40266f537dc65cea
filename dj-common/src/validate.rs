//! Download validation
//!
//! Rejects downloaded artifacts that are too small or too short to be a
//! genuine track (streaming previews, stubs). Both floors are inclusive:
//! exactly 512000 bytes and exactly 30 seconds pass.

use serde::{Deserialize, Serialize};

/// Minimum size for a genuine track; anything below is a preview/stub
pub const MIN_TRACK_BYTES: u64 = 512_000;

/// Minimum duration for a genuine track, when duration is known
pub const MIN_TRACK_SECONDS: u64 = 30;

/// Outcome code for a download validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerdictReason {
    Ok,
    TooSmall,
    TooShort,
}

/// Validation verdict for a downloaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub accepted: bool,
    pub reason: VerdictReason,
}

/// Validate a downloaded file by size and (optional) duration.
///
/// Size is checked first; an unknown duration never causes rejection.
pub fn validate_download(size_bytes: u64, duration_seconds: Option<u64>) -> Verdict {
    if size_bytes < MIN_TRACK_BYTES {
        return Verdict {
            accepted: false,
            reason: VerdictReason::TooSmall,
        };
    }

    if let Some(duration) = duration_seconds {
        if duration < MIN_TRACK_SECONDS {
            return Verdict {
                accepted: false,
                reason: VerdictReason::TooShort,
            };
        }
    }

    Verdict {
        accepted: true,
        reason: VerdictReason::Ok,
    }
}
