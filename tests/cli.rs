//! Binary-level tests for `grag`. Every test runs in its own temp directory
//! with `OPENAI_API_KEY` removed, so nothing touches the network.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn grag_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("grag");
    path
}

/// Temp workspace with `data/` holding two documents and a config file
/// using relative paths, so commands run with the workspace as cwd.
fn setup_test_env(extra_config: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    fs::create_dir_all(root.join("config")).unwrap();
    fs::create_dir_all(root.join("data/notes")).unwrap();
    fs::write(
        root.join("data/alpha.md"),
        "# Alpha\n\nThe alpha service handles authentication and sessions.",
    )
    .unwrap();
    fs::write(
        root.join("data/notes/beta.txt"),
        "Beta notes about deployment windows and rollback procedures.",
    )
    .unwrap();
    fs::write(root.join("data/empty.txt"), "  \n").unwrap();

    let config = format!(
        r#"[db]
path = "./index/grag.sqlite"

[chunking]
chunk_size = 40
overlap = 10

[ingest]
data_dir = "./data"
{}
"#,
        extra_config
    );
    fs::write(root.join("config/grag.toml"), config).unwrap();
    tmp
}

fn run_grag(cwd: &Path, args: &[&str]) -> (String, String, Option<i32>) {
    let output = Command::new(grag_binary())
        .current_dir(cwd)
        .env_remove("OPENAI_API_KEY")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run grag");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code(),
    )
}

#[test]
fn test_init_creates_database() {
    let tmp = setup_test_env("");
    let (stdout, stderr, code) = run_grag(tmp.path(), &["init"]);
    assert_eq!(code, Some(0), "init failed: {}", stderr);
    assert!(stdout.contains("Database initialized"));
    assert!(tmp.path().join("index/grag.sqlite").exists());
}

#[test]
fn test_init_writes_default_config_when_missing() {
    let tmp = TempDir::new().unwrap();
    let (stdout, stderr, code) = run_grag(tmp.path(), &["init"]);
    assert_eq!(code, Some(0), "init failed: {}", stderr);
    assert!(stdout.contains("Wrote default config"));

    let written = fs::read_to_string(tmp.path().join("config/grag.toml")).unwrap();
    assert!(written.contains("text-embedding-3-small"));
    assert!(tmp.path().join("data/grag.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let tmp = setup_test_env("");
    run_grag(tmp.path(), &["init"]);
    let (_, stderr, code) = run_grag(tmp.path(), &["init"]);
    assert_eq!(code, Some(0), "second init failed: {}", stderr);
}

#[test]
fn test_ingest_dry_run_needs_no_credential() {
    let tmp = setup_test_env("");
    let (stdout, stderr, code) = run_grag(tmp.path(), &["ingest", "--dry-run", "--progress", "off"]);
    assert_eq!(code, Some(0), "dry run failed: {}", stderr);
    assert!(stdout.contains("(dry-run)"));
    assert!(stdout.contains("files scanned: 3"), "{}", stdout);
    assert!(stdout.contains("files processed: 2"), "{}", stdout);
    assert!(stdout.contains("files skipped: 1"), "{}", stdout);
    assert!(!tmp.path().join("index/grag.sqlite").exists());
}

#[test]
fn test_ingest_without_credential_is_not_configured() {
    let tmp = setup_test_env("");
    let (_, stderr, code) = run_grag(tmp.path(), &["ingest", "--progress", "off"]);
    assert_eq!(code, Some(2));
    assert!(stderr.contains("service not configured"), "{}", stderr);
    assert!(stderr.contains("OPENAI_API_KEY"), "{}", stderr);
}

#[test]
fn test_ask_with_disabled_chat_is_not_configured() {
    let tmp = setup_test_env("\n[chat]\nprovider = \"disabled\"\n");
    let (stdout, stderr, code) = run_grag(tmp.path(), &["ask", "What is alpha?"]);
    assert_eq!(code, Some(2));
    assert!(stdout.is_empty());
    assert!(stderr.contains("service not configured"), "{}", stderr);
}

#[test]
fn test_search_with_disabled_embeddings_is_not_configured() {
    let tmp = setup_test_env("\n[embedding]\nprovider = \"disabled\"\n");
    let (_, stderr, code) = run_grag(tmp.path(), &["search", "deployment"]);
    assert_eq!(code, Some(2), "{}", stderr);
    assert!(stderr.contains("service not configured"));
}

#[test]
fn test_search_blank_query_is_rejected() {
    let tmp = setup_test_env("\n[embedding]\nprovider = \"disabled\"\n");
    let (_, stderr, code) = run_grag(tmp.path(), &["search", "   "]);
    assert_eq!(code, Some(1));
    assert!(stderr.contains("empty"), "{}", stderr);
}

#[test]
fn test_ask_unreadable_history_fails() {
    let tmp = setup_test_env("");
    let (_, stderr, code) = run_grag(
        tmp.path(),
        &["ask", "hello", "--history", "missing-history.json"],
    );
    assert_eq!(code, Some(1));
    assert!(stderr.contains("history"), "{}", stderr);
}

#[test]
fn test_stats_on_empty_index() {
    let tmp = setup_test_env("");
    run_grag(tmp.path(), &["init"]);
    let (stdout, stderr, code) = run_grag(tmp.path(), &["stats"]);
    assert_eq!(code, Some(0), "stats failed: {}", stderr);
    assert!(stdout.contains("Chunks:      0"), "{}", stdout);
    assert!(stdout.contains("Last ingest: never"), "{}", stdout);
}

#[test]
fn test_missing_config_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, code) = run_grag(tmp.path(), &["stats"]);
    assert_eq!(code, Some(1));
    assert!(stderr.contains("Failed to read config file"), "{}", stderr);
}

#[test]
fn test_invalid_chunking_config_is_rejected() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("config")).unwrap();
    fs::write(
        tmp.path().join("config/grag.toml"),
        "[chunking]\nchunk_size = 100\noverlap = 100\n",
    )
    .unwrap();
    let (_, stderr, code) = run_grag(tmp.path(), &["ingest", "--dry-run"]);
    assert_eq!(code, Some(1));
    assert!(stderr.contains("overlap"), "{}", stderr);
}
