//! Deduplicated warnings routed through the `log` facade.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the tokenizer and tree builder to report misuse of the streaming
//! API (writing after the last chunk, resuming a parser that is not paused).
//! These are not HTML parse errors; those go to the `on_parse_error` callback.

use std::collections::HashSet;
use std::sync::Mutex;

/// Global set of warnings we've already logged (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Log a warning once per unique `(component, message)` pair.
///
/// Returns `true` if the warning was logged, `false` if it was a duplicate.
///
/// # Example
/// ```
/// use koala_common::warning::{clear_warnings, warn_once};
///
/// clear_warnings();
/// assert!(warn_once("Tokenizer", "write() after the last chunk"));
/// assert!(!warn_once("Tokenizer", "write() after the last chunk"));
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let should_log = WARNED
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_log {
        log::warn!(target: "koala", "[{component}] {message}");
    }
    should_log
}

/// Clear all recorded warnings (call before starting a new parse)
pub fn clear_warnings() {
    let mut guard = WARNED
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
