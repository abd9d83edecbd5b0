use super::key_store;
use git_seal::config::Settings;
use git_seal::{GitRepo, Result, SealError};

/// Remove the filters so sealed files show their envelopes
pub fn lock(settings: &Settings) -> Result<()> {
    let repo = GitRepo::open(".")?;

    if !key_store(&repo, settings).is_initialized() {
        return Err(SealError::NotInitialized);
    }

    repo.remove_filters()?;

    println!("Repository locked.");
    println!("Run 'git-seal unlock' to restore the filters.");

    Ok(())
}
