//! Full harness run over the shipped kernels and mapping.
//!
//! Needs a working GPU adapter; skips cleanly on machines without one.

use std::path::PathBuf;

use kernelcheck::{harness, mapping, try_create_context, RunOptions};

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn test_shipped_kernels_pass_on_device() {
    let Some(ctx) = try_create_context() else {
        eprintln!("skipping: no GPU adapter available");
        return;
    };

    let options = RunOptions {
        mapping_path: repo_root().join(mapping::DEFAULT_MAPPING_FILE),
        kernels_dir: repo_root().join("kernels"),
        filter: None,
    };
    let report = harness::run(&ctx, &options).expect("harness run should not error");

    assert!(report.skipped.is_empty(), "shipped kernels went missing");
    assert_eq!(report.build_failures, 0);
    assert_eq!(report.resolve_failures, 0);
    assert!(report.tests_run() > 0);
    assert!(report.passed(), "{}", report.format());
}

#[test]
fn test_suite_filter_limits_the_run() {
    let Some(ctx) = try_create_context() else {
        eprintln!("skipping: no GPU adapter available");
        return;
    };

    let options = RunOptions {
        mapping_path: repo_root().join(mapping::DEFAULT_MAPPING_FILE),
        kernels_dir: repo_root().join("kernels"),
        filter: Some("relu".to_string()),
    };
    let report = harness::run(&ctx, &options).expect("harness run should not error");

    assert!(report.tests_run() > 0);
    assert!(report.outcomes.iter().all(|o| o.suite == "relu"));
    assert!(report.passed(), "{}", report.format());
}
