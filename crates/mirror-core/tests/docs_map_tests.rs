//! Docs map generation against real workspace fixtures

use mirror_core::{
    DocKind, Error, MirrorConfig, RootFilePolicy, SyncEngine, discover_packages, generate,
    generate_docs_map, scan_packages,
};
use mirror_core::layout::MirrorLayout;
use mirror_test_utils::TestWorkspace;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn config(ws: &TestWorkspace) -> MirrorConfig {
    MirrorConfig::new(ws.root())
}

#[test]
fn sample_workspace_entries_are_sorted_by_output_path() {
    let ws = TestWorkspace::sample();
    let map = generate_docs_map(&config(&ws)).unwrap();

    let outputs: Vec<&str> = map.entries.iter().map(|e| e.output_path.as_str()).collect();
    assert_eq!(
        outputs,
        vec![
            "docs/packages/alpha/README.md",
            "docs/packages/alpha/docs/api/client.md",
            "docs/packages/alpha/docs/guide.md",
            "docs/packages/beta/HARVEST_MAP.md",
            "docs/packages/beta/README.md",
        ]
    );
    assert!(map.generator.starts_with("docmirror@"));
}

#[test]
fn entry_metadata_is_derived_from_path_and_frontmatter() {
    let ws = TestWorkspace::sample();
    let map = generate_docs_map(&config(&ws)).unwrap();

    let readme = map.entry_for_source("packages/alpha/README.md").unwrap();
    assert_eq!(readme.kind, DocKind::Readme);
    assert_eq!(readme.title, "Alpha");
    assert_eq!(readme.id, "alpha-readme-md");
    assert_eq!(readme.package.as_deref(), Some("@acme/alpha"));

    let guide = map.entry_for_source("packages/alpha/docs/guide.md").unwrap();
    assert_eq!(guide.kind, DocKind::Guide);
    assert_eq!(guide.title, "Alpha Guide");
    assert_eq!(guide.tags, vec!["intro".to_string()]);

    let client = map.entry_for_source("packages/alpha/docs/api/client.md").unwrap();
    assert_eq!(client.kind, DocKind::Reference);
    assert_eq!(client.id, "alpha-docs-api-client-md");

    let harvest = map.entry_for_source("packages/beta/HARVEST_MAP.md").unwrap();
    assert_eq!(harvest.kind, DocKind::Guide);
}

#[test]
fn private_and_manifestless_packages_are_excluded() {
    let ws = TestWorkspace::sample();
    let map = generate_docs_map(&config(&ws)).unwrap();

    assert_eq!(
        map.package_names(),
        vec!["@acme/alpha".to_string(), "@acme/beta".to_string()]
    );
    assert!(map.entries.iter().all(|e| !e.source_path.contains("internal")));
    assert!(map.entries.iter().all(|e| !e.source_path.contains("scratch")));

    SyncEngine::new(config(&ws)).sync().unwrap();
    ws.assert_file_not_exists("docs/packages/internal");
    ws.assert_file_not_exists("docs/packages/scratch");
}

#[test]
fn scan_reports_every_directory_with_publishability() {
    let ws = TestWorkspace::sample();
    let cfg = config(&ws);
    let layout = MirrorLayout::from_config(&cfg).unwrap();

    let scanned: Vec<(String, bool)> = scan_packages(&cfg, &layout)
        .unwrap()
        .into_iter()
        .map(|p| (p.name, p.publishable))
        .collect();
    assert_eq!(
        scanned,
        vec![
            ("@acme/alpha".to_string(), true),
            ("@acme/beta".to_string(), true),
            ("internal".to_string(), false),
            ("scratch".to_string(), false),
        ]
    );

    let discovered = discover_packages(&cfg, &layout).unwrap();
    assert_eq!(discovered[0].short_name, "alpha");
    assert_eq!(discovered[0].root_path.as_str(), "packages/alpha");
}

#[test]
fn malformed_manifest_excludes_the_package() {
    let ws = TestWorkspace::sample();
    ws.write("packages/broken/package.json", "{ not json")
        .write("packages/broken/README.md", "# Broken\n");

    let map = generate_docs_map(&config(&ws)).unwrap();
    assert!(map.entries.iter().all(|e| !e.source_path.starts_with("packages/broken")));
}

#[test]
fn missing_packages_root_yields_empty_map() {
    let ws = TestWorkspace::new();
    let map = generate_docs_map(&config(&ws)).unwrap();
    assert!(map.entries.is_empty());
}

#[test]
fn md_and_mdx_siblings_collide() {
    let ws = TestWorkspace::new();
    ws.add_package("alpha", "alpha")
        .write("packages/alpha/docs/guide.md", "# One\n")
        .write("packages/alpha/docs/guide.mdx", "# Two\n");

    let err = generate_docs_map(&config(&ws)).unwrap_err();
    match err {
        Error::Collision {
            output,
            first,
            second,
        } => {
            assert_eq!(output, "docs/packages/alpha/docs/guide.md");
            assert_eq!(first, "packages/alpha/docs/guide.md");
            assert_eq!(second, "packages/alpha/docs/guide.mdx");
        }
        other => panic!("expected collision, got {other:?}"),
    }
}

#[test]
fn packages_sharing_a_short_name_collide() {
    let ws = TestWorkspace::new();
    ws.add_package("one", "@first/shared")
        .write("packages/one/README.md", "# One\n");
    ws.add_package("two", "@second/shared")
        .write("packages/two/README.md", "# Two\n");

    let err = generate(&config(&ws)).unwrap_err();
    assert!(matches!(
        err,
        Error::Collision { ref first, ref second, .. }
            if first == "packages/one/README.md" && second == "packages/two/README.md"
    ));
}

#[test]
fn collision_performs_no_writes() {
    let ws = TestWorkspace::new();
    ws.add_package("alpha", "alpha")
        .write("packages/alpha/README.md", "# Alpha\n")
        .write("packages/alpha/README.mdx", "# Alpha X\n");

    assert!(SyncEngine::new(config(&ws)).sync().is_err());
    ws.assert_file_not_exists("docs");
}

#[rstest]
#[case(".")]
#[case("packages")]
#[case("..")]
#[case("packages/alpha/docs")]
#[case("docs/../../elsewhere")]
fn unsafe_output_roots_are_rejected_before_any_write(#[case] output_root: &str) {
    let ws = TestWorkspace::sample();
    let cfg = config(&ws).with_output_root(output_root);

    let err = SyncEngine::new(cfg.clone()).sync().unwrap_err();
    assert!(
        matches!(err, Error::Configuration { ref path, .. } if path == output_root),
        "unexpected error for {output_root}: {err:?}"
    );
    assert!(generate(&cfg).is_err());
    ws.assert_file_not_exists("docs/packages");
    assert!(ws.files_under("packages").iter().all(|f| !f.contains("/docs/packages/")));
}

#[test]
fn output_root_outside_workspace_as_absolute_path_is_rejected() {
    let ws = TestWorkspace::sample();
    let outside = tempfile::TempDir::new().unwrap();
    let cfg = config(&ws).with_output_root(outside.path().to_string_lossy().to_string());

    assert!(matches!(
        generate(&cfg).unwrap_err(),
        Error::Configuration { .. }
    ));
}

#[test]
fn root_file_policy_controls_extra_root_files() {
    let ws = TestWorkspace::new();
    ws.add_package("alpha", "alpha")
        .write("packages/alpha/README.md", "# Alpha\n")
        .write("packages/alpha/USAGE.md", "# Usage\n")
        .write("packages/alpha/CONTRIBUTING.md", "# Contributing\n")
        .write("packages/alpha/changelog.md", "# Changes\n");

    let default_sources: Vec<String> = generate_docs_map(&config(&ws))
        .unwrap()
        .entries
        .into_iter()
        .map(|e| e.source_path)
        .collect();
    assert_eq!(
        default_sources,
        vec![
            "packages/alpha/CONTRIBUTING.md".to_string(),
            "packages/alpha/README.md".to_string(),
            "packages/alpha/USAGE.md".to_string(),
        ]
    );

    let restricted = config(&ws).with_root_files(RootFilePolicy {
        allow: vec!["usage".into()],
        deny: Vec::new(),
    });
    let sources: Vec<String> = generate_docs_map(&restricted)
        .unwrap()
        .entries
        .into_iter()
        .map(|e| e.source_path)
        .collect();
    assert_eq!(
        sources,
        vec![
            "packages/alpha/README.md".to_string(),
            "packages/alpha/USAGE.md".to_string(),
        ]
    );
}

#[test]
fn markdown_variants_are_normalized_and_other_files_ignored() {
    let ws = TestWorkspace::new();
    ws.add_package("alpha", "alpha")
        .write("packages/alpha/README.markdown", "# Alpha\n")
        .write("packages/alpha/docs/examples/basic.mdx", "# Basic\n")
        .write("packages/alpha/docs/diagram.png", [0x89u8, b'P', b'N', b'G'])
        .write("packages/alpha/notes.txt", "not markdown");

    let map = generate_docs_map(&config(&ws)).unwrap();
    let outputs: Vec<(&str, DocKind)> = map
        .entries
        .iter()
        .map(|e| (e.output_path.as_str(), e.kind))
        .collect();
    assert_eq!(
        outputs,
        vec![
            ("docs/packages/alpha/README.md", DocKind::Readme),
            ("docs/packages/alpha/docs/examples/basic.md", DocKind::Example),
        ]
    );
}

#[test]
fn frontmatter_kind_overrides_path_inference() {
    let ws = TestWorkspace::new();
    ws.add_package("alpha", "alpha").write(
        "packages/alpha/docs/api/overview.md",
        "---\nkind: guide\n---\n# Overview\n",
    );

    let map = generate_docs_map(&config(&ws)).unwrap();
    assert_eq!(map.entries[0].kind, DocKind::Guide);
    assert_eq!(map.entries[0].title, "Overview");
}

#[test]
fn json_form_round_trips_through_the_cli_format() {
    let ws = TestWorkspace::sample();
    let map = generate_docs_map(&config(&ws)).unwrap();

    let json = map.to_json_pretty().unwrap();
    assert!(json.contains("\"outputPath\": \"docs/packages/alpha/README.md\""));
    assert_eq!(mirror_core::DocsMap::from_json(&json).unwrap(), map);
}

#[cfg(unix)]
#[test]
fn symlinked_docs_directories_are_not_followed() {
    let ws = TestWorkspace::new();
    ws.add_package("alpha", "alpha")
        .write("packages/alpha/README.md", "# Alpha\n")
        .write("shared/outside.md", "# Outside\n");
    std::os::unix::fs::symlink(ws.path("shared"), ws.path("packages/alpha/docs")).unwrap();

    let map = generate_docs_map(&config(&ws)).unwrap();
    assert_eq!(map.entries.len(), 1);
}
