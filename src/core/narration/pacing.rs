//! Punctuation driven pacing for narration text.
//!
//! Speech engines read pause markers as hesitation, so pacing is encoded in the
//! text itself: sentence and clause punctuation gets a long marker, commas a short
//! one, and adjacent markers collapse to a single long one.

use once_cell::sync::Lazy;
use regex::Regex;

/// Long pause, also the longest marker that survives normalization.
pub const LONG_PAUSE: &str = "...";
pub const SHORT_PAUSE: &str = "..";

static DECORATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[=\-_*#~]{3,}$").expect("static regex compile"));
static SENTENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([.!?;:]+)(\s+|$)").expect("static regex compile"));
static COMMA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",(\s+|$)").expect("static regex compile"));
static MARKER_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.{2,}(?:\s*\.{2,})+").expect("static regex compile"));
static OVERLONG_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.{4,}").expect("static regex compile"));
static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("static regex compile"));

/// Expand punctuation into pause markers and normalize marker runs.
pub fn add_pauses(text: &str) -> String {
    // Headings and list items rarely end in punctuation; give each line a stop.
    let lines: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !DECORATION_RE.is_match(line))
        .map(|line| {
            if line.ends_with(['.', '!', '?', ';', ':', ',']) {
                line.to_string()
            } else {
                format!("{} {}", line, LONG_PAUSE)
            }
        })
        .collect();
    let joined = lines.join(" ");

    let expanded = SENTENCE_RE.replace_all(&joined, format!("${{1}} {} ", LONG_PAUSE).as_str());
    let expanded = COMMA_RE.replace_all(&expanded, format!(", {} ", SHORT_PAUSE).as_str());
    let collapsed = MARKER_RUN_RE.replace_all(&expanded, LONG_PAUSE);
    let collapsed = OVERLONG_MARKER_RE.replace_all(&collapsed, LONG_PAUSE);

    WHITESPACE_RE
        .replace_all(collapsed.trim(), " ")
        .into_owned()
}
