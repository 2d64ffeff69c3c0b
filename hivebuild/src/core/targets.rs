//! Parsing of the caller-supplied target directory list.

use anyhow::{Result, bail};

/// Split a comma-separated directory list, trimming each entry.
///
/// Empty entries (`"a,,b"`, trailing commas) are dropped. Order is preserved
/// and duplicates are kept, since each listed entry is reported separately.
pub fn parse_target_list(raw: &str) -> Result<Vec<String>> {
    let targets: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect();
    if targets.is_empty() {
        bail!("no target directories provided");
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_whitespace_and_keeps_order() {
        let targets = parse_target_list(" puzzles , extra/set1,b ").expect("parse");
        assert_eq!(targets, vec!["puzzles", "extra/set1", "b"]);
    }

    #[test]
    fn drops_empty_entries() {
        let targets = parse_target_list("a,, ,b,").expect("parse");
        assert_eq!(targets, vec!["a", "b"]);
    }

    #[test]
    fn rejects_list_without_entries() {
        let err = parse_target_list(" , ").expect_err("empty list");
        assert!(err.to_string().contains("no target directories"));
    }
}
