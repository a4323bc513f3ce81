use similar::TextDiff;

/// Unified diff between two renderings of the page at `path`, or `None` when
/// they are identical.
pub fn build_unified_diff(original: &str, modified: &str, path: &str) -> Option<String> {
    if original == modified {
        return None;
    }

    let diff = TextDiff::from_lines(original, modified);
    let header_old = format!("a/{path}");
    let header_new = format!("b/{path}");

    Some(
        diff.unified_diff()
            .context_radius(2)
            .header(&header_old, &header_new)
            .to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_none_for_identical_content() {
        assert!(build_unified_diff("<p>x</p>", "<p>x</p>", "index.html").is_none());
    }

    #[test]
    fn produces_diff_for_changes() {
        let diff = build_unified_diff(
            "<blockquote>\n<p>[!note] Hi</p>\n</blockquote>\n",
            "<blockquote class=\"callout callout-note\">\n<div class=\"callout-title\">Hi</div><p></p>\n</blockquote>\n",
            "posts/index.html",
        )
        .unwrap();
        assert!(diff.contains("--- a/posts/index.html"));
        assert!(diff.contains("+++ b/posts/index.html"));
        assert!(diff.contains("-<p>[!note] Hi</p>"));
        assert!(diff.contains("+<blockquote class=\"callout callout-note\">"));
    }
}
