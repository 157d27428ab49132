//! Corpus command implementation

use std::path::Path;

use colored::Colorize;

use mirror_core::{DocsMap, MirrorConfig, generate_docs_map, render_corpus};
use mirror_fs::NormalizedPath;

use crate::error::Result;

/// Run the corpus command
///
/// Renders from `map_file` when given, otherwise from a freshly generated
/// map. Writes atomically to `output` or prints to stdout.
pub fn run_corpus(config: &MirrorConfig, map_file: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let map = match map_file {
        Some(path) => {
            let json = mirror_fs::io::read_text(&NormalizedPath::new(path))?;
            DocsMap::from_json(&json)?
        }
        None => generate_docs_map(config)?,
    };

    let corpus = render_corpus(&map, &config.workspace_root)?;

    match output {
        Some(path) => {
            mirror_fs::io::write_text(&NormalizedPath::new(path), &corpus)?;
            println!(
                "{} Wrote corpus to {}",
                "OK".green().bold(),
                path.display().to_string().cyan()
            );
        }
        None => print!("{corpus}"),
    }
    Ok(())
}
