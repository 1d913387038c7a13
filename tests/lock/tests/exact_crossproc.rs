//! Cross-process determinism of canonical encodings and fingerprints.
//!
//! Spawns the `exact_fixture` binary under several environment variants
//! and asserts that all produce identical output. This proves canonical
//! bytes are not influenced by process-level state (cwd, locale, env vars,
//! hash seeds).

use std::path::Path;
use std::process::Command;

use lock_tests::fixtures::{record_schema, sample_record};
use msgcmp_compare::Comparator;
use msgcmp_kernel::wire::encode::{encode, EncodeOptions};

/// Resolve the path to the compiled binary.
///
/// `cargo test` puts test binaries in `target/debug/deps/`; the
/// `exact_fixture` binary lives one level up.
fn binary_path() -> String {
    let mut path = std::env::current_exe()
        .expect("can resolve test binary path")
        .parent()
        .expect("binary dir exists")
        .parent()
        .expect("deps parent exists")
        .to_path_buf();
    path.push("exact_fixture");
    path.to_string_lossy().to_string()
}

fn workspace_root() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("tests/ exists")
        .parent()
        .expect("workspace root exists")
        .to_string_lossy()
        .to_string()
}

/// Run the binary with the given cwd and environment overrides.
/// Returns stdout as a string.
fn run_variant(work_dir: &str, env_overrides: &[(&str, &str)]) -> String {
    let bin = binary_path();
    let mut command = Command::new(&bin);
    command
        .current_dir(work_dir)
        .env_remove("LC_ALL")
        .env_remove("LC_COLLATE")
        .env_remove("LANG")
        .env_remove("LANGUAGE");
    for &(key, val) in env_overrides {
        command.env(key, val);
    }

    let output = command.output().unwrap_or_else(|e| {
        panic!("failed to spawn {bin} (work_dir={work_dir}, overrides={env_overrides:?}): {e}")
    });
    assert!(
        output.status.success(),
        "exact_fixture exited with {}: stderr={}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout is valid UTF-8")
}

#[test]
fn crossproc_determinism_env_variants() {
    let root = workspace_root();
    let baseline = run_variant(&root, &[]);
    assert!(
        baseline.contains("fingerprint=sha256:"),
        "baseline output missing fingerprint"
    );

    let alt_cwd = if cfg!(target_os = "windows") {
        "C:\\"
    } else {
        "/tmp"
    };
    assert_eq!(
        baseline,
        run_variant(alt_cwd, &[]),
        "output differs when cwd changes from {root} to {alt_cwd}"
    );
    assert_eq!(
        baseline,
        run_variant(&root, &[("LC_ALL", "C"), ("LANG", "C")]),
        "output differs when LC_ALL=C LANG=C"
    );
    assert_eq!(
        baseline,
        run_variant(
            &root,
            &[
                ("MSGCMP_NOISE", "should_not_matter"),
                ("TZ", "America/New_York"),
                ("RUST_LOG", "trace"),
            ],
        ),
        "output differs with spurious env vars"
    );
}

#[test]
fn crossproc_output_matches_in_process() {
    let output = run_variant(&workspace_root(), &[]);
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 5, "expected 5 output lines, got {}", lines.len());

    let schema = record_schema();
    let msg = sample_record(&schema, &[("alpha", 1), ("beta", -2), ("gamma", 3)]);
    let canonical = encode(&msg, &schema, &EncodeOptions::CANONICAL).unwrap();
    let fp = Comparator::default().exact_fingerprint(&msg, &schema).unwrap();

    assert_eq!(lines[0], format!("canonical_hex={}", hex::encode(&canonical)));
    assert_eq!(lines[1], format!("fingerprint={fp}"));
    assert_eq!(lines[2], format!("fingerprint_reordered={fp}"));
    assert_eq!(lines[3], "is_equal=true");
    assert_eq!(lines[4], "is_exactly_equal=true");
}
