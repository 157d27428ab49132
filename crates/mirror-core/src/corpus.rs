//! Corpus rendering
//!
//! Concatenates every package-scoped mirrored document into one text
//! artifact for retrieval tooling. Each document is introduced by a small
//! frontmatter block naming where it lives in the mirror.

use mirror_fs::NormalizedPath;

use crate::Result;
use crate::docs_map::{DocsMap, DocsMapEntry, collapse_whitespace};

/// Preamble at the top of every corpus
pub const CORPUS_HEADER: &str = "# Package documentation corpus\n\n\
This file is generated by docmirror from the mirrored package documentation.\n\
Each document is preceded by a frontmatter block with its mirrored path.\n";

/// Render the corpus for `map`, reading mirrored files under `workspace_root`.
///
/// Entries are emitted in ascending output path order. Entries without a
/// package, and entries whose output file does not exist yet, are skipped.
/// Any other read failure is returned.
///
/// # Panics
///
/// Panics if an entry's output path is absolute or resolves outside
/// `workspace_root`. Maps produced by the generator never contain such a
/// path, so hitting this means the map was corrupted.
pub fn render_corpus(map: &DocsMap, workspace_root: &NormalizedPath) -> Result<String> {
    let mut sections = vec![CORPUS_HEADER.trim_end().to_string()];

    for entry in map.sorted_entries() {
        let Some(package) = entry.package.as_deref() else {
            continue;
        };

        let relative = NormalizedPath::new(&entry.output_path);
        let absolute = workspace_root.join(relative.as_str());
        assert!(
            !relative.is_absolute() && absolute.is_inside(workspace_root),
            "docs map output path `{}` escapes workspace root `{}`",
            entry.output_path,
            workspace_root
        );

        let content = match mirror_fs::io::read_text(&absolute) {
            Ok(content) => content,
            Err(e) if e.is_not_found() => {
                tracing::debug!(path = %entry.output_path, "not generated yet, skipping");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        sections.push(render_section(entry, package, &content));
    }

    let mut corpus = sections.join("\n\n");
    corpus.push('\n');
    Ok(corpus)
}

fn render_section(entry: &DocsMapEntry, package: &str, content: &str) -> String {
    // Maps read from JSON may carry line breaks the generator never emits
    let mut section = format!(
        "---\npath: {}\npackage: {}\n",
        entry.output_path,
        collapse_whitespace(package)
    );
    let title = collapse_whitespace(&entry.title);
    if !title.is_empty() {
        section.push_str(&format!("title: {title}\n"));
    }
    section.push_str("---");

    let body = content.trim_end();
    if !body.is_empty() {
        section.push_str("\n\n");
        section.push_str(body);
    }
    section
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs_map::DocKind;

    fn entry(output: &str, package: Option<&str>, title: &str) -> DocsMapEntry {
        DocsMapEntry {
            id: output.replace('/', "-"),
            kind: DocKind::Guide,
            title: title.into(),
            source_path: format!("packages/{output}"),
            output_path: output.into(),
            package: package.map(str::to_string),
            tags: Vec::new(),
        }
    }

    #[test]
    fn section_omits_empty_title_and_trims_content() {
        let with_title = render_section(&entry("docs/a.md", Some("a"), "Alpha"), "a", "# Alpha\n\n\n");
        assert_eq!(with_title, "---\npath: docs/a.md\npackage: a\ntitle: Alpha\n---\n\n# Alpha");

        let without = render_section(&entry("docs/b.md", Some("b"), ""), "b", "  \n");
        assert_eq!(without, "---\npath: docs/b.md\npackage: b\n---");
    }

    #[test]
    fn multi_line_fields_stay_on_one_line() {
        let section = render_section(
            &entry("docs/a.md", Some("a"), "Line one\npath: evil\n"),
            "a\nb",
            "Body\n",
        );
        assert_eq!(
            section,
            "---\npath: docs/a.md\npackage: a b\ntitle: Line one path: evil\n---\n\nBody"
        );
    }

    #[test]
    fn empty_map_renders_only_the_header() {
        let corpus = render_corpus(&DocsMap::new(Vec::new()), &NormalizedPath::new("/nonexistent")).unwrap();
        assert_eq!(corpus, format!("{}\n", CORPUS_HEADER.trim_end()));
    }

    #[test]
    #[should_panic(expected = "escapes workspace root")]
    fn escaping_output_path_panics() {
        let map = DocsMap::new(vec![entry("../outside.md", Some("a"), "")]);
        let _ = render_corpus(&map, &NormalizedPath::new("/nonexistent/workspace"));
    }

    #[test]
    #[should_panic(expected = "escapes workspace root")]
    fn absolute_output_path_panics() {
        let map = DocsMap::new(vec![entry("/etc/passwd", Some("a"), "")]);
        let _ = render_corpus(&map, &NormalizedPath::new("/nonexistent/workspace"));
    }

    #[test]
    fn entries_without_package_are_never_read() {
        // Would panic if the escape check ran for unpackaged entries
        let map = DocsMap::new(vec![entry("../outside.md", None, "")]);
        let corpus = render_corpus(&map, &NormalizedPath::new("/nonexistent/workspace")).unwrap();
        assert!(!corpus.contains("outside"));
    }
}
