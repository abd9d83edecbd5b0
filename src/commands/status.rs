use git_seal::reconcile::{GitArea, ObjectLocator, StatusClassifier};
use git_seal::{CryptoKey, GitRepo, Result};

/// Print the index/worktree state of sealed paths
pub fn status(paths: &[String]) -> Result<()> {
    let repo = GitRepo::open(".")?;

    let paths = if paths.is_empty() {
        repo.sealed_paths()?
    } else {
        paths.iter().map(|p| repo.repo_relative(p)).collect()
    };

    if paths.is_empty() {
        println!("No sealed files in the index");
        return Ok(());
    }

    for path in paths {
        let status = repo.classify(&path)?;
        let staged = match repo.locate(&path, GitArea::Staging)? {
            Some(object) if CryptoKey::is_encrypted(&object.bytes) => "sealed",
            Some(_) => "NOT SEALED",
            None => "not staged",
        };
        println!(
            "{path}: {staged} (index {}, worktree {})",
            status.staging, status.worktree
        );
    }

    Ok(())
}
