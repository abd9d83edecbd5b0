use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command as StdCommand, Output, Stdio};
use tempfile::TempDir;

/// Create a new temporary git repository with user config set.
pub fn create_git_repo() -> TempDir {
    let temp = TempDir::new().expect("failed to create temp dir");

    git(temp.path(), &["init", "--quiet"]);
    git(temp.path(), &["config", "user.email", "test@example.com"]);
    git(temp.path(), &["config", "user.name", "Test User"]);

    temp
}

/// Run git in `repo` and return stdout, panicking on failure.
pub fn git(repo: &Path, args: &[&str]) -> Vec<u8> {
    let output = StdCommand::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    output.stdout
}

/// Convenience helper for spawning the git-seal binary via assert_cmd.
#[allow(dead_code)]
pub fn git_seal_cmd() -> Command {
    cargo_bin_cmd!("git-seal")
}

/// Absolute path to the git-seal test binary.
#[allow(dead_code)]
pub fn git_seal_bin() -> &'static str {
    env!("CARGO_BIN_EXE_git-seal")
}

/// Repository with git-seal initialized, filters pointing at the test
/// binary, and `pattern` routed through the filter in a committed
/// `.gitattributes`.
#[allow(dead_code)]
pub fn create_sealed_repo(patterns: &[&str]) -> TempDir {
    let temp = create_git_repo();

    git_seal_cmd()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .success();

    let bin = format!("\"{}\"", git_seal_bin());
    git(temp.path(), &["config", "filter.git-seal.clean", &format!("{bin} clean %f")]);
    git(temp.path(), &["config", "filter.git-seal.smudge", &format!("{bin} smudge %f")]);
    git(temp.path(), &["config", "diff.git-seal.textconv", &format!("{bin} diff")]);

    let attributes: String = patterns
        .iter()
        .map(|pattern| format!("{pattern} filter=git-seal diff=git-seal\n"))
        .collect();
    fs::write(temp.path().join(".gitattributes"), attributes).unwrap();
    git(temp.path(), &["add", ".gitattributes"]);
    git(temp.path(), &["commit", "--quiet", "-m", "Configure git-seal"]);

    temp
}

/// Pipe `stdin` through `git-seal <args>` inside `repo`.
#[allow(dead_code)]
pub fn run_filter(repo: &Path, args: &[&str], stdin: &[u8]) -> Output {
    let mut child = StdCommand::new(git_seal_bin())
        .args(args)
        .current_dir(repo)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn git-seal");

    child
        .stdin
        .take()
        .expect("failed to open stdin")
        .write_all(stdin)
        .expect("failed to write to stdin");

    child.wait_with_output().expect("failed to read output")
}
