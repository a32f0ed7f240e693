//! Small helpers shared by the importer and the CLI.

use rand::Rng;
use rand::distr::Alphanumeric;

/// Length of generated correlation prefixes.
pub const LOG_PREFIX_LENGTH: usize = 12;

/// Generate a random alphanumeric token of `len` characters.
pub fn random_token(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generate a fresh log prefix used to correlate the lines of one import run.
pub fn generate_log_prefix() -> String {
    random_token(LOG_PREFIX_LENGTH)
}

/// Turn an arbitrary label into a valid node name.
///
/// Lowercases ASCII letters, keeps digits, and folds every other run of
/// characters into a single `-`. Returns `None` when nothing usable is left.
pub fn to_node_name(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut pending_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if out.is_empty() { None } else { Some(out) }
}

/// Format a duration in milliseconds for human output.
pub fn format_duration_ms(ms: u128) -> String {
    if ms >= 60_000 {
        format!("{}m {}s", ms / 60_000, (ms % 60_000) / 1000)
    } else if ms >= 1000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        format!("{ms}ms")
    }
}
