//! In-memory rendering of the expected mirror
//!
//! Both sync and check start from a [`MirrorPlan`]: every source is read and
//! rewritten before anything touches the generated subtree.

use mirror_fs::NormalizedPath;

use crate::config::{MarkdownMode, MirrorConfig};
use crate::docs_map::{GeneratedDocs, generate};
use crate::links::{LinkIndex, rewrite};
use crate::{Error, Result};

/// One file the mirror should contain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    /// Workspace-relative output path
    pub output_path: NormalizedPath,
    pub content: Vec<u8>,
}

/// The expected mirror, in docs map order
#[derive(Debug, Clone)]
pub struct MirrorPlan {
    pub generated: GeneratedDocs,
    pub files: Vec<PlannedFile>,
}

/// Generate the docs map and render every entry's expected output.
pub fn build_plan(config: &MirrorConfig) -> Result<MirrorPlan> {
    let generated = generate(config)?;
    let index = LinkIndex::from_generated(&generated);
    let layout = &generated.layout;

    let mut files = Vec::with_capacity(generated.map.entries.len());
    for entry in &generated.map.entries {
        let source = layout.resolve_inside(&NormalizedPath::new(&entry.source_path))?;
        let bytes = mirror_fs::io::read_bytes(&source)?;

        let text = decode(bytes, &entry.source_path, config.markdown_mode)?;
        let content = rewrite(&text, &entry.source_path, &entry.output_path, &index).into_bytes();

        files.push(PlannedFile {
            output_path: NormalizedPath::new(&entry.output_path),
            content,
        });
    }

    Ok(MirrorPlan { generated, files })
}

/// Decode a source document according to the markdown mode.
fn decode(bytes: Vec<u8>, path: &str, mode: MarkdownMode) -> Result<String> {
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => match mode {
            MarkdownMode::Strict => Err(Error::Encoding {
                path: path.to_string(),
            }),
            MarkdownMode::Lossy => {
                tracing::warn!(path, "source is not valid UTF-8, decoding lossily");
                Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
            }
        },
    }
}
