//! Post-conversion cleanup pipeline for markdown output.
//!
//! Each cleanup pass is a function `&str -> String` applied in sequence.

use std::sync::LazyLock;

use regex::Regex;

/// Run the full cleanup pipeline on raw markdown text.
pub(crate) fn run_pipeline(md: &str) -> String {
    let mut result = md.to_string();

    result = normalize_whitespace(&result);
    result = clean_blank_lines(&result);
    result = trim_edges(&result);

    result
}

// ---------------------------------------------------------------------------
// Pass 1: Normalize whitespace
// ---------------------------------------------------------------------------

/// Trim trailing whitespace on every line and drop non-breaking spaces at line ends.
fn normalize_whitespace(md: &str) -> String {
    md.lines()
        .map(|line| line.trim_end_matches([' ', '\t', '\u{a0}']))
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Pass 2: Clean up excessive blank lines
// ---------------------------------------------------------------------------

/// Collapse runs of 2+ blank lines into exactly one.
fn clean_blank_lines(md: &str) -> String {
    static MULTI_BLANK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

    MULTI_BLANK_RE.replace_all(md, "\n\n").to_string()
}

// ---------------------------------------------------------------------------
// Pass 3: Trim edges
// ---------------------------------------------------------------------------

/// Drop leading and trailing blank lines.
fn trim_edges(md: &str) -> String {
    md.trim_matches('\n').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_blank_lines_collapses_excess() {
        let input = "Line 1\n\n\n\n\nLine 2";
        assert_eq!(clean_blank_lines(input), "Line 1\n\nLine 2");
    }

    #[test]
    fn clean_blank_lines_keeps_single_gap() {
        let input = "Line 1\n\nLine 2";
        assert_eq!(clean_blank_lines(input), input);
    }

    #[test]
    fn normalize_whitespace_trims_trailing() {
        let input = "Line 1   \nLine 2\t\nLine 3\u{a0}";
        assert_eq!(normalize_whitespace(input), "Line 1\nLine 2\nLine 3");
    }

    #[test]
    fn normalize_whitespace_keeps_indentation() {
        let input = "```\n    indented();\n```";
        assert_eq!(normalize_whitespace(input), input);
    }

    #[test]
    fn full_pipeline_cleans_markdown() {
        let input = "\n\n# Title   \n\n\n\n\ntext \n\n";
        assert_eq!(run_pipeline(input), "# Title\n\ntext");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(run_pipeline(""), "");
    }
}
