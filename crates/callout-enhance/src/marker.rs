use regex::Regex;
use std::sync::OnceLock;

// Whitespace is the ECMAScript `\s` set (U+FEFF in, U+0085 out). Type
// characters are ASCII word characters; the title stops at any line
// terminator, including U+2028 and U+2029.
const MARKER_PATTERN: &str = concat!(
    r"^[\t\n\x0B\x0C\r \xA0\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}]*",
    r"\[!([A-Za-z0-9_]+)\]",
    r"[\t\n\x0B\x0C\r \xA0\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}]*",
    r"([^\n\r\x{2028}\x{2029}]*)",
);

fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(MARKER_PATTERN).expect("marker pattern is valid"))
}

/// A `[!type] title` marker found at the start of a callout's first block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerMatch {
    /// Lowercased callout type, e.g. `note`.
    pub kind: String,
    /// Custom title, or the capitalised type when the marker carries none.
    pub title: String,
    /// Byte offset just past the matched marker.
    pub end: usize,
}

impl MarkerMatch {
    /// Text left over once the marker has been stripped.
    pub fn remainder<'a>(&self, text: &'a str) -> &'a str {
        &text[self.end..]
    }
}

pub fn match_marker(text: &str) -> Option<MarkerMatch> {
    let captures = marker_regex().captures(text)?;
    let whole = captures.get(0)?;
    let kind = captures.get(1)?.as_str().to_ascii_lowercase();
    let custom = captures.get(2).map_or("", |m| m.as_str());

    let title = if custom.is_empty() {
        default_title(&kind)
    } else {
        custom.to_owned()
    };

    Some(MarkerMatch {
        kind,
        title,
        end: whole.end(),
    })
}

pub fn default_title(kind: &str) -> String {
    let mut chars = kind.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_marker_with_title() {
        let text = "[!note] Remember this";
        let marker = match_marker(text).unwrap();
        assert_eq!(marker.kind, "note");
        assert_eq!(marker.title, "Remember this");
        assert_eq!(marker.remainder(text), "");
    }

    #[test]
    fn falls_back_to_capitalised_kind() {
        let marker = match_marker("  [!WARNING]").unwrap();
        assert_eq!(marker.kind, "warning");
        assert_eq!(marker.title, "Warning");
    }

    #[test]
    fn keeps_text_after_the_first_line() {
        let text = "[!tip] Short title\nBody continues here";
        let marker = match_marker(text).unwrap();
        assert_eq!(marker.title, "Short title");
        assert_eq!(marker.remainder(text), "\nBody continues here");
    }

    #[test]
    fn whitespace_after_marker_may_span_lines() {
        let text = "[!info]\nFirst body line\nSecond";
        let marker = match_marker(text).unwrap();
        assert_eq!(marker.title, "First body line");
        assert_eq!(marker.remainder(text), "\nSecond");
    }

    #[test]
    fn title_stops_at_carriage_return() {
        let text = "[!note] Title\r\nBody";
        let marker = match_marker(text).unwrap();
        assert_eq!(marker.title, "Title");
        assert_eq!(marker.remainder(text), "\r\nBody");
    }

    #[test]
    fn type_is_ascii_word_characters_only() {
        assert!(match_marker("[!café] x").is_none());
        assert!(match_marker("[!my_type2] x").is_some());
    }

    #[test]
    fn next_line_is_not_whitespace() {
        let marker = match_marker("[!note]\u{85}Title").unwrap();
        assert_eq!(marker.title, "\u{85}Title");
        assert!(match_marker("\u{85}[!note] x").is_none());
    }

    #[test]
    fn byte_order_mark_is_whitespace() {
        let marker = match_marker("\u{feff}[!note]\u{feff}Title").unwrap();
        assert_eq!(marker.kind, "note");
        assert_eq!(marker.title, "Title");
    }

    #[test]
    fn rejects_markers_not_at_the_start() {
        assert!(match_marker("See [!note] here").is_none());
        assert!(match_marker("[note] plain").is_none());
        assert!(match_marker("[!] empty").is_none());
    }
}
