//! Conformance tests that run YAML fixtures against the operator registry
//!
//! Run with: cargo test -p ipmatch-test --test conformance --features ipmatch-test/fixtures
//!
//! Note: This test file requires the `fixtures` feature to be enabled.

#![cfg(feature = "fixtures")]

use ipmatch_test::fixture::Fixture;
use std::fs;
use std::path::{Path, PathBuf};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Load and run every fixture in one file
fn run_fixture_file(name: &str) {
    let path = fixtures_dir().join(name);
    println!("Running fixture file: {}", path.display());

    let yaml = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));

    // Parse potentially multiple fixtures (separated by ---)
    let fixtures = Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
        panic!("Failed to parse {}: {}", path.display(), e);
    });
    assert!(!fixtures.is_empty(), "{} holds no fixtures", path.display());

    for fixture in fixtures {
        println!("  Running: {}", fixture.name);
        fixture.run_and_assert();
    }
}

#[test]
fn test_ip_match() {
    run_fixture_file("01_ip_match.yaml");
}

#[test]
fn test_ip_match_from_file() {
    run_fixture_file("02_ip_match_from_file.yaml");
}

#[test]
fn test_invalid() {
    run_fixture_file("03_invalid.yaml");
}

#[test]
fn test_every_fixture_file_is_listed() {
    let mut names: Vec<String> = fs::read_dir(fixtures_dir())
        .expect("read fixtures dir")
        .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".yaml") || name.ends_with(".yml"))
        .collect();
    names.sort();
    assert_eq!(
        names,
        ["01_ip_match.yaml", "02_ip_match_from_file.yaml", "03_invalid.yaml"]
    );
}
