//! Markdown link target scanning
//!
//! Finds the byte ranges of link destinations so the rewriter can replace
//! them in place, leaving every other byte of the document untouched.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// `](target` of an inline link or image; angle-bracket destinations keep
/// their brackets in the match
static INLINE_DESTINATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\]\((?:[ \t]*)(<[^<>\n]*>|[^()\s]+)").expect("valid inline link regex")
});

/// `[id]: target` reference definitions; `[^id]:` footnotes are not links
static REFERENCE_DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ {0,3}\[[^\]^][^\]]*\]:[ \t]*(<[^<>\n]*>|\S+)").expect("valid reference regex")
});

/// How a link target is treated by the rewriter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TargetKind {
    /// Has a URI scheme (`https:`, `mailto:`, ...)
    External,
    /// `//host/...`
    ProtocolRelative,
    /// `/path`, rooted at the site
    Rooted,
    /// `#anchor` within the same document
    Anchor,
    /// Everything else: resolved against the document's directory
    Relative,
}

pub(crate) fn classify(target: &str) -> TargetKind {
    if target.starts_with("//") {
        TargetKind::ProtocolRelative
    } else if target.starts_with('/') {
        TargetKind::Rooted
    } else if target.starts_with('#') {
        TargetKind::Anchor
    } else if has_uri_scheme(target) {
        TargetKind::External
    } else {
        TargetKind::Relative
    }
}

/// Split `path?query#fragment` into the path and the untouched suffix.
pub(crate) fn split_suffix(target: &str) -> (&str, &str) {
    match target.find(['?', '#']) {
        Some(idx) => target.split_at(idx),
        None => (target, ""),
    }
}

/// Decode `%XX` escapes in a link path.
///
/// `None` when the path has no escape, a malformed one, or decodes to
/// invalid UTF-8; such paths are used verbatim.
pub(crate) fn percent_decode(path: &str) -> Option<String> {
    if !path.contains('%') {
        return None;
    }
    let bytes = path.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = path.get(i + 1..i + 3)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}

/// Escape every byte outside the URL path character set as `%XX`.
pub(crate) fn percent_encode(path: &str) -> String {
    let mut encoded = String::with_capacity(path.len());
    for byte in path.bytes() {
        let keep = byte.is_ascii_alphanumeric()
            || matches!(
                byte,
                b'/' | b'-' | b'.' | b'_' | b'~' | b'!' | b'$' | b'&' | b'\'' | b'*' | b'+' | b',' | b';' | b'=' | b':' | b'@'
            );
        if keep {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

fn has_uri_scheme(target: &str) -> bool {
    let Some((scheme, _)) = target.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_alphabetic() && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
}

/// Byte ranges of every link destination in `content`, in document order.
///
/// Angle brackets around a destination are excluded from its range. Fenced
/// code blocks and inline code spans are skipped.
pub(crate) fn link_destinations(content: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut fence: Option<(char, usize)> = None;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        if let Some(marker) = fence_marker(line) {
            match fence {
                None => fence = Some(marker),
                Some((c, len)) if marker.0 == c && marker.1 >= len && is_closing_fence(line) => {
                    fence = None;
                }
                Some(_) => {}
            }
            continue;
        }
        if fence.is_some() {
            continue;
        }

        let code_spans = code_spans(line);
        let in_code = |pos: usize| code_spans.iter().any(|span| span.contains(&pos));

        if let Some(caps) = REFERENCE_DEFINITION.captures(line) {
            if let Some(m) = caps.get(1) {
                ranges.push(shift(unbracket(line, m.range()), line_start));
            }
            continue;
        }

        for caps in INLINE_DESTINATION.captures_iter(line) {
            let (Some(whole), Some(m)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if in_code(whole.start()) {
                continue;
            }
            ranges.push(shift(unbracket(line, m.range()), line_start));
        }
    }
    ranges
}

/// Fence character and run length when `line` opens or closes a fence.
fn fence_marker(line: &str) -> Option<(char, usize)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let c = rest.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = rest.chars().take_while(|x| *x == c).count();
    (len >= 3).then_some((c, len))
}

/// A closing fence carries no info string.
fn is_closing_fence(line: &str) -> bool {
    line.trim().chars().all(|c| c == '`' || c == '~')
}

/// Byte ranges covered by inline code spans, delimiters included.
fn code_spans(line: &str) -> Vec<Range<usize>> {
    let bytes = line.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }
        let open_start = i;
        while i < bytes.len() && bytes[i] == b'`' {
            i += 1;
        }
        let run = i - open_start;

        // Look for a closing run of exactly the same length
        let mut j = i;
        let mut closed = None;
        while j < bytes.len() {
            if bytes[j] != b'`' {
                j += 1;
                continue;
            }
            let close_start = j;
            while j < bytes.len() && bytes[j] == b'`' {
                j += 1;
            }
            if j - close_start == run {
                closed = Some(j);
                break;
            }
        }

        match closed {
            Some(end) => {
                spans.push(open_start..end);
                i = end;
            }
            None => break,
        }
    }
    spans
}

fn unbracket(line: &str, range: Range<usize>) -> Range<usize> {
    let text = &line[range.clone()];
    if text.len() >= 2 && text.starts_with('<') && text.ends_with('>') {
        range.start + 1..range.end - 1
    } else {
        range
    }
}

fn shift(range: Range<usize>, by: usize) -> Range<usize> {
    range.start + by..range.end + by
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn targets(content: &str) -> Vec<&str> {
        link_destinations(content)
            .into_iter()
            .map(|range| &content[range])
            .collect()
    }

    #[test]
    fn inline_links_and_images() {
        let content = "See [guide](docs/guide.md \"Guide\") and ![logo](./img/logo.png).\n";
        assert_eq!(targets(content), vec!["docs/guide.md", "./img/logo.png"]);
    }

    #[test]
    fn angle_bracket_destinations_drop_brackets() {
        let content = "[spaced](<docs/my guide.md>)\n";
        assert_eq!(targets(content), vec!["docs/my guide.md"]);
    }

    #[test]
    fn reference_definitions() {
        let content = "Text [ref][a].\n\n[a]: ../beta/README.md \"Beta\"\n   [b]: <./x.md>\n    [c]: indented-code.md\n";
        assert_eq!(targets(content), vec!["../beta/README.md", "./x.md"]);
    }

    #[test]
    fn footnote_definitions_are_not_targets() {
        let content = "Claim.[^1]\n\n[^1]: This is a footnote.\n[^note]: See [beta](../beta/README.md).\n";
        assert_eq!(targets(content), vec!["../beta/README.md"]);
    }

    #[test]
    fn fenced_code_is_skipped() {
        // A shorter run does not close a longer fence
        let content = "[a](a.md)\n````md\n[b](b.md)\n```\n[c](c.md)\n````\n~~~\n[d](d.md)\n~~~\n[e](e.md)\n";
        assert_eq!(targets(content), vec!["a.md", "e.md"]);
    }

    #[test]
    fn inline_code_is_skipped() {
        let content = "Use `[x](x.md)` or ``[y](y.md)`` but [z](z.md).\n";
        assert_eq!(targets(content), vec!["z.md"]);
    }

    #[test]
    fn ranges_are_absolute_offsets() {
        let content = "line one\n[a](target.md)\r\n";
        let ranges = link_destinations(content);
        assert_eq!(ranges, vec![13..22]);
    }

    #[rstest]
    #[case("https://example.com/a.md", TargetKind::External)]
    #[case("mailto:team@example.com", TargetKind::External)]
    #[case("//cdn.example.com/x.js", TargetKind::ProtocolRelative)]
    #[case("/docs/a.md", TargetKind::Rooted)]
    #[case("#usage", TargetKind::Anchor)]
    #[case("../beta/README.md", TargetKind::Relative)]
    #[case("docs/a.md#usage", TargetKind::Relative)]
    fn target_classification(#[case] target: &str, #[case] expected: TargetKind) {
        assert_eq!(classify(target), expected);
    }

    #[rstest]
    #[case("docs/my%20guide.md", Some("docs/my guide.md"))]
    #[case("caf%C3%A9.md", Some("café.md"))]
    #[case("docs/guide.md", None)]
    #[case("100%.md", None)]
    #[case("bad%zz.md", None)]
    #[case("sign%+1.md", None)]
    #[case("%FF.md", None)]
    fn percent_decoding(#[case] path: &str, #[case] expected: Option<&str>) {
        assert_eq!(percent_decode(path).as_deref(), expected);
    }

    #[test]
    fn percent_encoding_keeps_path_characters() {
        assert_eq!(percent_encode("../my guide (v2).md"), "../my%20guide%20%28v2%29.md");
        assert_eq!(percent_encode("café/100%.md"), "caf%C3%A9/100%25.md");
    }

    #[rstest]
    #[case("a.md#top", "a.md", "#top")]
    #[case("a.md?raw=1#top", "a.md", "?raw=1#top")]
    #[case("a.md", "a.md", "")]
    fn suffix_splitting(#[case] target: &str, #[case] path: &str, #[case] suffix: &str) {
        assert_eq!(split_suffix(target), (path, suffix));
    }
}
