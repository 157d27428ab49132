//! Package listing and docs map output

use colored::Colorize;

use mirror_core::{MirrorConfig, MirrorLayout, discover_packages, generate_docs_map};

use crate::error::Result;

/// Run the packages command
///
/// Lists publishable packages in directory order.
pub fn run_packages(config: &MirrorConfig, json: bool) -> Result<()> {
    let layout = MirrorLayout::from_config(config)?;
    let packages = discover_packages(config, &layout)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&packages)?);
        return Ok(());
    }

    if packages.is_empty() {
        println!(
            "No publishable packages under {}.",
            layout.packages_root().as_str().cyan()
        );
        return Ok(());
    }

    println!("{}", "Publishable packages:".bold());
    for package in &packages {
        println!(
            "   {} {} {}",
            "+".green(),
            package.name,
            format!("({})", package.root_path).dimmed()
        );
    }
    Ok(())
}

/// Run the map command
///
/// Prints the freshly generated docs map as pretty JSON.
pub fn run_map(config: &MirrorConfig) -> Result<()> {
    let map = generate_docs_map(config)?;
    println!("{}", map.to_json_pretty()?);
    Ok(())
}
