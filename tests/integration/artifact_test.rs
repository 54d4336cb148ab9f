use std::fs;

use chrono::Local;
use dbdiag::core::artifact::{finalized_path, OutputArtifact};
use dbdiag::core::context::RunContext;
use tempfile::TempDir;

const HEADER: &str = "Timestamp,Value";

#[test]
fn test_performance_header_written_once_across_invocations() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("perf.csv");

    {
        let mut artifact = OutputArtifact::open_performance(&path, HEADER).unwrap();
        artifact.append_line("2026-01-01 00:00:00,1").unwrap();
    }

    // Second invocation against the same path: append only, no new header.
    {
        let mut artifact = OutputArtifact::open_performance(&path, HEADER).unwrap();
        artifact.append_line("2026-01-01 00:01:00,2").unwrap();
    }

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], HEADER);
    assert_eq!(
        lines.iter().filter(|l| **l == HEADER).count(),
        1,
        "header must appear exactly once"
    );
}

#[test]
fn test_finalize_renames_into_original_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("perf.csv");
    let ctx = RunContext::capture();

    let mut artifact = OutputArtifact::open_performance(&path, HEADER).unwrap();
    artifact.append_line("2026-01-01 00:00:00,1").unwrap();
    let dest = artifact.finalize(&ctx).unwrap();

    assert!(!path.exists(), "original path must be gone after finalize");
    assert!(dest.exists());
    assert_eq!(dest.parent(), Some(dir.path()));
    assert_eq!(
        dest.file_name().unwrap().to_string_lossy(),
        format!("{}-{}-perf.csv", ctx.hostname, ctx.run_stamp)
    );

    // Content survives the rename.
    let content = fs::read_to_string(&dest).unwrap();
    assert!(content.starts_with(HEADER));
}

#[test]
fn test_finalized_path_shape() {
    let ctx = RunContext::at(Local::now());
    let dest = finalized_path(std::path::Path::new("/var/log/out.txt"), &ctx).unwrap();

    assert_eq!(dest.parent(), Some(std::path::Path::new("/var/log")));
    let name = dest.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with(&ctx.hostname));
    assert!(name.contains(&ctx.run_stamp));
    assert!(name.ends_with("-out.txt"));
}

#[test]
fn test_inventory_recreated_fresh_with_identity_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("inventory.txt");
    let ctx = RunContext::capture();

    {
        let mut artifact = OutputArtifact::create_inventory(&path, &ctx).unwrap();
        artifact.append("stale content from a previous run\n").unwrap();
    }

    // A new run recreates the file; nothing from the previous run survives.
    {
        let _artifact = OutputArtifact::create_inventory(&path, &ctx).unwrap();
    }

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with(&ctx.hostname));
    assert!(!content.contains("stale content"));
}
