use super::{key_store, FILTER_PROGRAM};
use git_seal::config::Settings;
use git_seal::{GitRepo, Result};
use std::path::Path;

/// Register the filters again, importing `key_file` first when given
pub fn unlock(settings: &Settings, key_file: Option<&Path>) -> Result<()> {
    let repo = GitRepo::open(".")?;
    let store = key_store(&repo, settings);

    // a fresh clone has no key directory yet; importing creates it
    let key = match key_file {
        Some(path) => {
            println!("Importing key from: {}", path.display());
            store.import(path)?
        }
        None => store.load()?,
    };

    repo.configure_filters(FILTER_PROGRAM)?;

    println!("Repository unlocked (key {}).", key.fingerprint());
    println!("Run 'git checkout HEAD -- .' to open sealed files");

    Ok(())
}
