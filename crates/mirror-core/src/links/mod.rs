//! Relative link rewriting for relocated documents
//!
//! A document moved from `source_path` to `output_path` keeps working links
//! when each relative target is re-pointed at the target's own new location.
//! Resolution order for a relative target, after resolving it against the
//! source document's directory:
//!
//! 1. another mapped document: link to its output path;
//! 2. a publishable package's root directory: link to that package's
//!    mirrored README, or its mirrored directory when it has none;
//! 3. a directory with a fixed mirrored counterpart (the output root maps to
//!    itself): link to the counterpart;
//! 4. anything else: link back to the original location, adjusted for the
//!    new directory depth. The target is not checked for existence.
//!
//! Targets with a URI scheme, protocol-relative and root-relative targets,
//! pure anchors and targets resolving outside the workspace are left as is.

mod scan;

use std::collections::HashMap;

use mirror_fs::{NormalizedPath, relative_path};

use crate::docs_map::{DocKind, DocsMap, GeneratedDocs};
use crate::layout::MirrorLayout;
use crate::package::PackageDescriptor;
use scan::{TargetKind, classify, link_destinations, percent_decode, percent_encode, split_suffix};

/// Where relocated link targets end up, built once per run
#[derive(Debug, Clone, Default)]
pub struct LinkIndex {
    /// Source path → output path of every mapped document
    outputs: HashMap<String, String>,
    /// Package root → mirrored README (or mirrored directory)
    package_roots: HashMap<String, String>,
    /// Fixed mirror pairs, most specific source first
    mirrors: Vec<(NormalizedPath, NormalizedPath)>,
}

/// Where a resolved target maps to
enum Destination {
    /// A document; trailing slashes on the original target are dropped
    Document(NormalizedPath),
    /// A location whose shape (file or directory) is unchanged
    Location(NormalizedPath),
}

impl LinkIndex {
    pub fn new(map: &DocsMap, layout: &MirrorLayout, packages: &[PackageDescriptor]) -> Self {
        let outputs: HashMap<String, String> = map
            .entries
            .iter()
            .map(|e| (e.source_path.clone(), e.output_path.clone()))
            .collect();

        let package_roots = packages
            .iter()
            .map(|package| {
                let readme = map.entries.iter().find(|e| {
                    e.kind == DocKind::Readme
                        && NormalizedPath::new(&e.source_path).parent().as_ref()
                            == Some(&package.root_path)
                });
                let target = match readme {
                    Some(entry) => entry.output_path.clone(),
                    None => layout.package_output_dir(&package.short_name).to_string(),
                };
                (package.root_path.to_string(), target)
            })
            .collect();

        let mut mirrors = layout.fixed_mirrors();
        // Stable sort keeps configured pairs ahead of the output root on ties
        mirrors.sort_by_key(|(source, _)| std::cmp::Reverse(source.components().len()));

        Self {
            outputs,
            package_roots,
            mirrors,
        }
    }

    pub fn from_generated(generated: &GeneratedDocs) -> Self {
        Self::new(&generated.map, &generated.layout, &generated.packages)
    }

    fn destination(&self, resolved: &NormalizedPath) -> Destination {
        if let Some(output) = self.outputs.get(resolved.as_str()) {
            return Destination::Document(NormalizedPath::new(output));
        }
        if let Some(target) = self.package_roots.get(resolved.as_str()) {
            return Destination::Document(NormalizedPath::new(target));
        }
        for (source, target) in &self.mirrors {
            if let Some(rest) = resolved.relative_to(source) {
                return Destination::Location(target.join(rest.as_str()));
            }
        }
        Destination::Location(resolved.clone())
    }
}

/// Rewrite the relative link targets of a document relocated from
/// `source_path` to `output_path` (both workspace-relative).
///
/// Only link destinations change; every other byte is copied through.
pub fn rewrite(content: &str, source_path: &str, output_path: &str, index: &LinkIndex) -> String {
    let source_dir = directory_of(source_path);
    let output_dir = directory_of(output_path);

    let mut rewritten = String::with_capacity(content.len());
    let mut copied = 0;
    for range in link_destinations(content) {
        let target = &content[range.clone()];
        rewritten.push_str(&content[copied..range.start]);
        match rewrite_target(target, &source_dir, &output_dir, index) {
            Some(new_target) => {
                if new_target != target {
                    tracing::trace!(from = target, to = %new_target, source = source_path, "rewrote link");
                }
                rewritten.push_str(&new_target);
            }
            None => rewritten.push_str(target),
        }
        copied = range.end;
    }
    rewritten.push_str(&content[copied..]);
    rewritten
}

fn rewrite_target(
    target: &str,
    source_dir: &NormalizedPath,
    output_dir: &NormalizedPath,
    index: &LinkIndex,
) -> Option<String> {
    if classify(target) != TargetKind::Relative {
        return None;
    }
    let (path, suffix) = split_suffix(target);
    if path.is_empty() {
        return None;
    }

    // Escaped targets are matched decoded and written back escaped
    let decoded = percent_decode(path);
    let resolved = source_dir.join(decoded.as_deref().unwrap_or(path));
    if resolved.is_absolute() || resolved.escapes_root() {
        return None;
    }

    let (destination, keep_slash) = match index.destination(&resolved) {
        Destination::Document(path) => (path, false),
        Destination::Location(path) => (path, true),
    };

    let mut relative = relative_path(output_dir, &destination);
    if decoded.is_some() {
        relative = percent_encode(&relative);
    }
    if relative == "." {
        relative = "./".to_string();
    } else if keep_slash && path.ends_with('/') {
        relative.push('/');
    }
    Some(format!("{relative}{suffix}"))
}

fn directory_of(path: &str) -> NormalizedPath {
    NormalizedPath::new(path)
        .parent()
        .unwrap_or_else(|| NormalizedPath::new("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MirrorConfig;
    use crate::docs_map::DocsMapEntry;
    use pretty_assertions::assert_eq;

    fn entry(source: &str, output: &str, kind: DocKind) -> DocsMapEntry {
        DocsMapEntry {
            id: String::new(),
            kind,
            title: String::new(),
            source_path: source.into(),
            output_path: output.into(),
            package: Some("pkg".into()),
            tags: Vec::new(),
        }
    }

    fn package(name: &str) -> PackageDescriptor {
        PackageDescriptor {
            name: name.into(),
            short_name: name.into(),
            root_path: NormalizedPath::new(format!("packages/{name}")),
            publishable: true,
        }
    }

    fn index() -> LinkIndex {
        let map = DocsMap::new(vec![
            entry("packages/alpha/README.md", "docs/packages/alpha/README.md", DocKind::Readme),
            entry("packages/alpha/docs/guide.md", "docs/packages/alpha/docs/guide.md", DocKind::Guide),
            entry("packages/alpha/docs/api/client.mdx", "docs/packages/alpha/docs/api/client.md", DocKind::Reference),
            entry("packages/alpha/docs/my guide.md", "docs/packages/alpha/docs/my guide.md", DocKind::Guide),
            entry("packages/beta/README.md", "docs/packages/beta/README.md", DocKind::Readme),
            entry("packages/gamma/docs/intro.md", "docs/packages/gamma/docs/intro.md", DocKind::Guide),
        ]);
        let config = MirrorConfig::new("/nonexistent/workspace").with_mirror("guides", "docs/guides");
        let layout = MirrorLayout::from_config(&config).unwrap();
        LinkIndex::new(&map, &layout, &[package("alpha"), package("beta"), package("gamma")])
    }

    fn rewrite_readme(content: &str) -> String {
        rewrite(
            content,
            "packages/alpha/README.md",
            "docs/packages/alpha/README.md",
            &index(),
        )
    }

    fn rewrite_guide(content: &str) -> String {
        rewrite(
            content,
            "packages/alpha/docs/guide.md",
            "docs/packages/alpha/docs/guide.md",
            &index(),
        )
    }

    #[test]
    fn output_root_and_sibling_package_links() {
        let content = "See [patterns](../../docs/PATTERNS.md) and [beta](../beta/README.md).\n";
        assert_eq!(
            rewrite_readme(content),
            "See [patterns](../../PATTERNS.md) and [beta](../beta/README.md).\n"
        );
    }

    #[test]
    fn mapped_entries_follow_extension_changes() {
        let content = "[client](api/client.mdx#new) [readme](../README.md)\n";
        assert_eq!(
            rewrite_guide(content),
            "[client](api/client.md#new) [readme](../README.md)\n"
        );
    }

    #[test]
    fn package_root_links_resolve_to_mirrored_readme() {
        assert_eq!(rewrite_guide("[home](..)\n"), "[home](../README.md)\n");
        assert_eq!(rewrite_guide("[home](../)\n"), "[home](../README.md)\n");
        assert_eq!(rewrite_readme("[self](./)\n"), "[self](README.md)\n");
    }

    #[test]
    fn package_without_readme_links_to_its_mirror_directory() {
        assert_eq!(
            rewrite_readme("[gamma](../gamma)\n"),
            "[gamma](../gamma)\n"
        );
        assert_eq!(
            rewrite_guide("[gamma](../../gamma/)\n"),
            "[gamma](../../gamma)\n"
        );
    }

    #[test]
    fn configured_mirror_is_used() {
        assert_eq!(
            rewrite_readme("[setup](../../guides/setup.md)\n"),
            "[setup](../../guides/setup.md)\n"
        );
        assert_eq!(
            rewrite_guide("[setup](../../../guides/setup.md)\n"),
            "[setup](../../../guides/setup.md)\n"
        );
    }

    #[test]
    fn unmapped_targets_point_back_to_the_source_tree() {
        assert_eq!(
            rewrite_readme("[code](src/lib.rs) [dir](src/)\n"),
            "[code](../../../packages/alpha/src/lib.rs) [dir](../../../packages/alpha/src/)\n"
        );
        assert_eq!(
            rewrite_readme("[license](../../LICENSE)\n"),
            "[license](../../../LICENSE)\n"
        );
    }

    #[test]
    fn percent_encoded_targets_match_mapped_entries() {
        let content = "[g](docs/my%20guide.md#top) [h](<docs/my guide.md>)\n";
        assert_eq!(rewrite_readme(content), content);
        assert_eq!(
            rewrite_guide("[g](my%20guide.md) [c](api/client.mdx)\n"),
            "[g](my%20guide.md) [c](api/client.md)\n"
        );
        assert_eq!(
            rewrite("[g](../packages/alpha/docs/my%20guide.md)\n", "docs/PATTERNS.md", "docs/PATTERNS.md", &index()),
            "[g](packages/alpha/docs/my%20guide.md)\n"
        );
    }

    #[test]
    fn percent_encoded_unmapped_targets_stay_encoded() {
        assert_eq!(
            rewrite_readme("[s](src/a%20b.rs) [p](src/100%.md)\n"),
            "[s](../../../packages/alpha/src/a%20b.rs) [p](../../../packages/alpha/src/100%.md)\n"
        );
    }

    #[test]
    fn non_relative_and_escaping_targets_are_untouched() {
        let content = "[a](https://example.com) [b](#usage) [c](/abs.md) [d](//cdn/x) [e](../../../outside.md) [f](mailto:x@y.z)\n";
        assert_eq!(rewrite_readme(content), content);
    }

    #[test]
    fn reference_definitions_and_code_blocks() {
        let content = "[beta][b]\n\n[b]: ../beta/README.md\n\n```\n[x](../beta/README.md)\n```\n";
        assert_eq!(rewrite_readme(content), content);

        let guide = "[r]: ../../beta/README.md \"Beta\"\n";
        assert_eq!(rewrite_guide(guide), "[r]: ../../beta/README.md \"Beta\"\n");
    }

    #[test]
    fn rewriting_is_deterministic_and_preserves_other_bytes() {
        let content = "# Title\r\n\r\nText with [link](docs/guide.md?plain=1#top) here.\r\n";
        let first = rewrite_readme(content);
        assert_eq!(first, rewrite_readme(content));
        assert_eq!(first, "# Title\r\n\r\nText with [link](docs/guide.md?plain=1#top) here.\r\n");
    }
}
