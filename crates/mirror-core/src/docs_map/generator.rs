//! Docs map generation
//!
//! Enumerates the documentation sources of every publishable package and
//! assigns each one a unique output path under the generated subtree.

use std::collections::BTreeMap;
use std::fs;

use mirror_fs::{MirrorPath, NormalizedPath};

use super::{DocKind, DocsMap, DocsMapEntry, extract_metadata};
use crate::config::MirrorConfig;
use crate::layout::MirrorLayout;
use crate::package::{PackageDescriptor, discover_packages};
use crate::{Error, Result};

/// Extensions of the markdown family, compared case-insensitively
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "mdx", "markdown"];

/// Everything one generation pass computed, kept together so later stages
/// do not rediscover packages or revalidate the layout.
#[derive(Debug, Clone)]
pub struct GeneratedDocs {
    pub layout: MirrorLayout,
    pub packages: Vec<PackageDescriptor>,
    pub map: DocsMap,
}

/// A source file found in a package, relative to the package root
struct SourceDoc {
    relative: NormalizedPath,
    /// Kind fixed by the file's position, bypassing frontmatter
    fixed_kind: Option<DocKind>,
}

/// Validate the layout, discover packages and build the docs map.
///
/// Layout problems fail with [`Error::Configuration`] before any source is
/// read. Two sources sharing an output path fail with [`Error::Collision`];
/// no partial map is returned.
pub fn generate(config: &MirrorConfig) -> Result<GeneratedDocs> {
    let layout = MirrorLayout::from_config(config)?;
    let packages = discover_packages(config, &layout)?;

    let mut by_output: BTreeMap<String, DocsMapEntry> = BTreeMap::new();
    for package in &packages {
        for source in package_sources(config, &layout, package)? {
            let entry = build_entry(&layout, package, &source)?;
            if let Some(existing) = by_output.get(&entry.output_path) {
                return Err(Error::Collision {
                    output: entry.output_path.clone(),
                    first: existing.source_path.clone(),
                    second: entry.source_path,
                });
            }
            tracing::debug!(source = %entry.source_path, output = %entry.output_path, "mapped");
            by_output.insert(entry.output_path.clone(), entry);
        }
    }

    // BTreeMap iteration already yields ascending output paths
    let map = DocsMap::new(by_output.into_values().collect());
    tracing::info!(
        packages = packages.len(),
        entries = map.entries.len(),
        "generated docs map"
    );
    Ok(GeneratedDocs {
        layout,
        packages,
        map,
    })
}

/// [`generate`] without the intermediate layout and package list.
pub fn generate_docs_map(config: &MirrorConfig) -> Result<DocsMap> {
    Ok(generate(config)?.map)
}

/// Whether a path has a markdown-family extension.
pub fn is_markdown_path(path: &str) -> bool {
    NormalizedPath::new(path)
        .extension()
        .is_some_and(|ext| MARKDOWN_EXTENSIONS.iter().any(|m| ext.eq_ignore_ascii_case(m)))
}

/// Lowercase ASCII slug; every run of other characters becomes one `-`.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

fn package_sources(
    config: &MirrorConfig,
    layout: &MirrorLayout,
    package: &PackageDescriptor,
) -> Result<Vec<SourceDoc>> {
    let package_dir = layout.resolve_inside(&package.root_path)?;
    let mut sources = Vec::new();

    let native = package_dir.to_native();
    let entries = fs::read_dir(&native).map_err(|e| mirror_fs::Error::io(&native, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| mirror_fs::Error::io(&native, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| mirror_fs::Error::io(entry.path(), e))?;
        let name = entry.file_name().to_string_lossy().to_string();
        if !file_type.is_file() || !is_markdown_path(&name) {
            continue;
        }

        let relative = NormalizedPath::new(&name);
        let stem = relative.file_stem().unwrap_or_default();
        if stem.eq_ignore_ascii_case("readme") {
            sources.push(SourceDoc {
                relative,
                fixed_kind: Some(DocKind::Readme),
            });
        } else if config.root_files.permits(stem) {
            sources.push(SourceDoc {
                relative,
                fixed_kind: Some(DocKind::Guide),
            });
        } else {
            tracing::debug!(package = %package.name, file = %name, "root file excluded by policy");
        }
    }

    let docs_dir = package_dir.join(MirrorPath::PackageDocsDir.as_str());
    match fs::symlink_metadata(docs_dir.to_native()) {
        Ok(meta) if meta.file_type().is_dir() => {
            for file in mirror_fs::io::list_files(&docs_dir)? {
                let is_regular = fs::symlink_metadata(file.to_native())
                    .map(|meta| meta.file_type().is_file())
                    .unwrap_or(false);
                if !is_regular || !is_markdown_path(file.as_str()) {
                    continue;
                }
                let relative = file
                    .relative_to(&package_dir)
                    .ok_or_else(|| Error::escape(&file, &package_dir))?;
                sources.push(SourceDoc {
                    relative,
                    fixed_kind: None,
                });
            }
        }
        Ok(_) => {
            tracing::debug!(path = %docs_dir, "docs directory is not a plain directory, skipping");
        }
        Err(_) => {}
    }

    sources.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(sources)
}

fn build_entry(
    layout: &MirrorLayout,
    package: &PackageDescriptor,
    source: &SourceDoc,
) -> Result<DocsMapEntry> {
    let source_path = package.root_path.join(source.relative.as_str());

    let generated_root = layout.generated_root();
    let output_path = layout
        .package_output_dir(&package.short_name)
        .join(&with_markdown_extension(&source.relative));
    if !output_path.is_inside(&generated_root) {
        return Err(Error::escape(&output_path, &generated_root));
    }

    let bytes = mirror_fs::io::read_bytes(&layout.resolve_inside(&source_path)?)?;
    let metadata = extract_metadata(&String::from_utf8_lossy(&bytes));

    let kind = source
        .fixed_kind
        .or(metadata.kind)
        .unwrap_or_else(|| DocKind::infer(source.relative.as_str()));

    Ok(DocsMapEntry {
        id: slugify(&format!("{}/{}", package.short_name, source.relative)),
        kind,
        title: metadata.title.unwrap_or_default(),
        source_path: source_path.to_string(),
        output_path: output_path.to_string(),
        package: Some(package.name.clone()),
        tags: metadata.tags,
    })
}

/// Replace a markdown-family extension with `.md`.
fn with_markdown_extension(relative: &NormalizedPath) -> String {
    let path = relative.as_str();
    match relative.extension() {
        Some(ext) if is_markdown_path(path) => {
            format!("{}md", &path[..path.len() - ext.len()])
        }
        _ => path.to_string(),
    }
}
