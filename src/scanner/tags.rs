//! Inline map tag detection.

use regex::Regex;

/// Build the tag matcher for the configured names.
///
/// Matches `<name attrs />` and `<name attrs></name>` (only whitespace
/// between the tags). Names are case-insensitive. Attribute text may span
/// lines but can't contain `<` or `>`.
pub(crate) fn tag_regex(names: &[String]) -> Option<Regex> {
    let names: Vec<String> = names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .map(regex::escape)
        .collect();
    if names.is_empty() {
        return None;
    }
    let alternatives = names.join("|");
    let pattern = format!(
        r"(?i)<(?:{alternatives})(?P<attrs>\s[^<>]*?)?\s*(?:/>|>\s*</(?:{alternatives})\s*>)"
    );

    match Regex::new(&pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            log::warn!("Cannot build inline tag matcher, inline maps disabled: {}", e);
            None
        }
    }
}
