//! Filename utilities
//!
//! Shared helpers for presenting and normalizing the filenames that come
//! back from peer shares.

use once_cell::sync::Lazy;
use regex::Regex;

static SHARE_INDEX_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+\]\s*").unwrap());
static ILLEGAL_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap());
static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

/// Sanitize a filename: strip `[12345]`-style share-index prefixes,
/// illegal filesystem characters, and redundant whitespace.
pub fn sanitize_name(name: &str) -> String {
    let stripped = SHARE_INDEX_PREFIX.replace_all(name, "");
    let legal = ILLEGAL_CHARS.replace_all(&stripped, "");
    let collapsed = MULTI_SPACE.replace_all(&legal, " ");
    collapsed.trim().to_string()
}

/// Extension of a filename, uppercased; empty when there is none.
pub fn extension(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_uppercase(),
        None => String::new(),
    }
}

/// Human-readable size in megabytes, e.g. `"52.4MB"`.
pub fn format_size(bytes: u64) -> String {
    format!("{:.1}MB", bytes as f64 / (1024.0 * 1024.0))
}
