//! Text helpers shared by the dialects.

use regex::Regex;
use std::sync::LazyLock;

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*(?:\n[ \t]*)+\n?").expect("static regex must compile"));

/// Strips the common indentation of every line after the first, trims the
/// first line and drops leading and trailing blank lines.
pub(crate) fn clean(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\t', "    ");
    let mut lines = text.lines();
    let first = lines.next().unwrap_or_default().trim();
    let rest: Vec<&str> = lines.collect();

    let margin = rest
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut cleaned = vec![first.to_string()];
    cleaned.extend(rest.iter().map(|line| {
        if line.trim().is_empty() {
            String::new()
        } else {
            line.get(margin..).unwrap_or(line.trim_start()).trim_end().to_string()
        }
    }));

    cleaned.join("\n").trim_matches('\n').to_string()
}

/// Splits cleaned text into blocks separated by one or more blank lines.
pub(crate) fn blocks(text: &str) -> Vec<&str> {
    BLANK_LINES
        .split(text)
        .map(|block| block.trim_matches('\n'))
        .filter(|block| !block.trim().is_empty())
        .collect()
}

/// Collapses every whitespace run into a single space.
pub(crate) fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_dedents_after_first_line() {
        let text = "Brief.\n\n    More text\n      indented\n    ";
        assert_eq!(clean(text), "Brief.\n\nMore text\n  indented");
    }

    #[test]
    fn test_clean_handles_leading_newline() {
        let text = "\n    Brief.\n\n    Body.\n";
        assert_eq!(clean(text), "Brief.\n\nBody.");
    }

    #[test]
    fn test_blocks_split_on_blank_runs() {
        let text = "one\ntwo\n\n  \nthree\n\n\nfour";
        assert_eq!(blocks(text), vec!["one\ntwo", "three", "four"]);
    }

    #[test]
    fn test_collapse() {
        assert_eq!(collapse("  a\n   b\tc  "), "a b c");
    }
}
