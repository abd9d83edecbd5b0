use super::key_store;
use git_seal::config::Settings;
use git_seal::{GitRepo, Result};
use std::path::Path;

pub fn export_key(settings: &Settings, output_path: &Path) -> Result<()> {
    let repo = GitRepo::open(".")?;
    key_store(&repo, settings).export(output_path)?;

    println!("Key exported to {}", output_path.display());
    println!("Anyone with this file can open every sealed file in the repository.");

    Ok(())
}

pub fn import_key(settings: &Settings, input_path: &Path) -> Result<()> {
    let repo = GitRepo::open(".")?;
    let key = key_store(&repo, settings).import(input_path)?;

    println!("Key imported (fingerprint {})", key.fingerprint());

    Ok(())
}
