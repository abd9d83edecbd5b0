//! # Integration Tests
//!
//! CLI workflows: initialization, key export/import, lock/unlock, status and
//! configuration.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test integration_test
//! ```

mod common;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::{create_git_repo, create_sealed_repo, git, git_seal_cmd, run_filter};
use git_seal::CryptoKey;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_init_command() {
    let temp = create_git_repo();

    git_seal_cmd()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initializing git-seal"))
        .stdout(predicate::str::contains("Generated new key (fingerprint"));

    assert!(temp.path().join(".git/git-seal/keys/default").exists());

    let clean = git(temp.path(), &["config", "filter.git-seal.clean"]);
    assert_eq!(String::from_utf8_lossy(&clean).trim(), "git-seal clean %f");
    let required = git(temp.path(), &["config", "--bool", "filter.git-seal.required"]);
    assert_eq!(String::from_utf8_lossy(&required).trim(), "true");
}

#[test]
fn test_init_twice_succeeds_but_warns() {
    let temp = create_git_repo();

    git_seal_cmd()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .success();

    git_seal_cmd()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("already initialized"));
}

#[test]
fn test_init_outside_git_repo_fails() {
    let temp = TempDir::new().unwrap();

    git_seal_cmd()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not in a git repository"));
}

#[test]
fn test_export_and_import_key() {
    let source = create_sealed_repo(&["*.env"]);
    let key_file = source.path().join("exported.key");

    git_seal_cmd()
        .args(["export-key", key_file.to_str().unwrap()])
        .current_dir(source.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Key exported"));
    assert_eq!(fs::metadata(&key_file).unwrap().len(), 32);

    let sealed = run_filter(source.path(), &["clean", "a.env"], b"A=1\n").stdout;

    let target = create_git_repo();
    git_seal_cmd()
        .arg("init")
        .current_dir(target.path())
        .assert()
        .success();
    git_seal_cmd()
        .args(["import-key", key_file.to_str().unwrap()])
        .current_dir(target.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Key imported"));

    let opened = run_filter(target.path(), &["smudge", "a.env"], &sealed);
    assert!(opened.status.success());
    assert_eq!(opened.stdout, b"A=1\n");
}

#[test]
fn test_export_key_before_init_fails() {
    let temp = create_git_repo();
    let key_file = temp.path().join("exported.key");

    git_seal_cmd()
        .args(["export-key", key_file.to_str().unwrap()])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn test_unlock_fresh_clone_with_key_file() {
    let source = create_git_repo();
    git_seal_cmd()
        .arg("init")
        .current_dir(source.path())
        .assert()
        .success();
    let key_dir = TempDir::new().unwrap();
    let key_file = key_dir.path().join("team.key");
    git_seal_cmd()
        .args(["export-key", key_file.to_str().unwrap()])
        .current_dir(source.path())
        .assert()
        .success();

    // never initialized: unlocking imports the key and registers filters
    let clone = create_git_repo();
    git_seal_cmd()
        .args(["unlock", "--key-file", key_file.to_str().unwrap()])
        .current_dir(clone.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Repository unlocked"));

    assert!(clone.path().join(".git/git-seal/keys/default").exists());
    git(clone.path(), &["config", "filter.git-seal.smudge"]);
}

#[test]
fn test_unlock_without_key_fails() {
    let temp = create_git_repo();

    git_seal_cmd()
        .arg("unlock")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn test_lock_and_unlock() {
    let temp = create_git_repo();

    git_seal_cmd()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .success();

    git_seal_cmd()
        .arg("lock")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Repository locked"));

    let lookup = std::process::Command::new("git")
        .args(["config", "filter.git-seal.clean"])
        .current_dir(temp.path())
        .output()
        .unwrap();
    assert!(!lookup.status.success());

    git_seal_cmd()
        .arg("unlock")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Repository unlocked"));
}

#[test]
fn test_status_lists_sealed_paths() {
    let temp = create_sealed_repo(&["*.enc.yaml"]);
    fs::write(temp.path().join("a.enc.yaml"), "a: 1\n").unwrap();
    fs::write(temp.path().join("notes.txt"), "hello\n").unwrap();
    git(temp.path(), &["add", "a.enc.yaml", "notes.txt"]);

    git_seal_cmd()
        .arg("status")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("a.enc.yaml: sealed (index added"))
        .stdout(predicate::str::contains("notes.txt").not());

    git_seal_cmd()
        .args(["status", "notes.txt"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("notes.txt: NOT SEALED"));
}

#[test]
fn test_unknown_format_is_rejected() {
    let temp = create_sealed_repo(&["*.enc"]);

    git_seal_cmd()
        .args(["clean", "x.enc", "--input-type", "toml"])
        .current_dir(temp.path())
        .write_stdin("a = 1\n")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Unknown format 'toml'"));
}

#[test]
fn test_key_from_environment() {
    let temp = create_git_repo();
    let key = CryptoKey::generate();

    let output = git_seal_cmd()
        .args(["clean", "ci.env"])
        .env("GIT_SEAL_KEY", STANDARD.encode(key.as_bytes()))
        .current_dir(temp.path())
        .write_stdin("CI=1\n")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        key.decrypt(&output.stdout, git_seal::Format::Dotenv).unwrap(),
        b"CI=1\n"
    );
}

#[test]
fn test_default_format_from_repo_config() {
    let temp = create_sealed_repo(&["*.secret"]);
    fs::write(temp.path().join(".git-seal.toml"), "default_format = \"yaml\"\n").unwrap();

    let output = run_filter(temp.path(), &["clean", "db.secret"], b"a: 1\n");

    assert!(output.status.success());
    assert_eq!(
        CryptoKey::sealed_format(&output.stdout),
        Some(git_seal::Format::Yaml)
    );
}

#[test]
fn test_repo_config_cannot_override_key() {
    let temp = create_sealed_repo(&["*.env"]);
    let key_file = temp.path().join(".git").join("own.key");
    git_seal_cmd()
        .args(["export-key", key_file.to_str().unwrap()])
        .current_dir(temp.path())
        .assert()
        .success();
    let own = CryptoKey::from_bytes(&fs::read(&key_file).unwrap()).unwrap();

    let published = CryptoKey::generate();
    fs::write(
        temp.path().join(".git-seal.toml"),
        format!("key = \"{}\"\n", STANDARD.encode(published.as_bytes())),
    )
    .unwrap();

    let output = run_filter(temp.path(), &["clean", "prod.env"], b"TOKEN=abc\n");

    assert!(output.status.success());
    assert_eq!(
        own.decrypt(&output.stdout, git_seal::Format::Dotenv).unwrap(),
        b"TOKEN=abc\n"
    );
    assert!(!published.can_open(&output.stdout));
}

#[test]
fn test_diff_without_key_prints_marker() {
    let temp = create_git_repo();
    let sealed = CryptoKey::generate()
        .encrypt(b"hidden", git_seal::Format::Binary)
        .unwrap();

    git_seal_cmd()
        .arg("diff")
        .current_dir(temp.path())
        .write_stdin(sealed)
        .assert()
        .success()
        .stdout(predicate::str::contains("sealed with git-seal"));
}

#[test]
fn test_help_command() {
    git_seal_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("re-encryption noise"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("clean"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn test_version_command() {
    git_seal_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}
