//! Document metadata from YAML frontmatter and headings

use serde_yaml::Value;

use super::DocKind;

/// Metadata read from a document's leading `---` block and first heading
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocMetadata {
    pub title: Option<String>,
    pub kind: Option<DocKind>,
    pub tags: Vec<String>,
}

/// Extract title, kind and tags from markdown content.
///
/// Malformed frontmatter is ignored rather than reported; the document is
/// still mirrored.
pub fn extract_metadata(content: &str) -> DocMetadata {
    let (frontmatter, body) = split_frontmatter(content);
    let mut metadata = DocMetadata::default();

    if let Some(yaml) = frontmatter {
        match serde_yaml::from_str::<Value>(yaml) {
            Ok(Value::Mapping(map)) => {
                metadata.title = map
                    .get("title")
                    .and_then(scalar_string)
                    .filter(|t| !t.is_empty());
                metadata.kind = map
                    .get("kind")
                    .and_then(Value::as_str)
                    .and_then(DocKind::from_name);
                metadata.tags = map.get("tags").map(tag_list).unwrap_or_default();
            }
            Ok(_) => {}
            Err(e) => tracing::debug!(error = %e, "ignoring malformed frontmatter"),
        }
    }

    if metadata.title.is_none() {
        metadata.title = first_heading(body);
    }
    metadata
}

/// Split a leading `---` ... `---` block off `content`.
fn split_frontmatter(content: &str) -> (Option<&str>, &str) {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let Some(rest) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return (None, content);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, content)
}

/// First level-one ATX heading outside fenced code.
fn first_heading(body: &str) -> Option<String> {
    let mut in_fence = false;
    for line in body.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some(heading) = trimmed.strip_prefix("# ") {
            let heading = heading.trim().trim_end_matches('#').trim();
            if !heading.is_empty() {
                return Some(heading.to_string());
            }
        }
    }
    None
}

/// Join every run of whitespace, line breaks included, into one space.
pub(crate) fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(collapse_whitespace(s)),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn tag_list(value: &Value) -> Vec<String> {
    let mut tags: Vec<String> = match value {
        Value::Sequence(items) => items.iter().filter_map(scalar_string).collect(),
        Value::String(s) => s.split(',').map(|t| t.trim().to_string()).collect(),
        _ => Vec::new(),
    };
    tags.retain(|t| !t.is_empty());
    tags.sort();
    tags.dedup();
    tags
}
