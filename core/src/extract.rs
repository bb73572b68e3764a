use std::sync::OnceLock;

use regex::Regex;

/// Marker line emitted by the runner when it persists its output.
/// Exact substring match; any other phrasing means no result path.
pub const RESULT_MARKER: &str = "Results written to ";

fn marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!("{RESULT_MARKER}(.+)$")).expect("valid marker regex")
    })
}

/// Scan captured runner output for the result path.
///
/// Takes everything after the marker up to end of line, trimmed. When the
/// runner printed the marker more than once (internal retries), the last
/// occurrence wins as the most recent write. `None` is not an error; the
/// caller reports the miss and skips the upload phase.
pub fn extract_result_path(lines: &[String]) -> Option<String> {
    lines
        .iter()
        .rev()
        .find_map(|line| {
            marker_re()
                .captures(line)
                .map(|caps| caps[1].trim().to_string())
        })
        .filter(|path| !path.is_empty())
}
