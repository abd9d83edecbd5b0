use super::{key_store, FILTER_PROGRAM};
use git_seal::config::Settings;
use git_seal::{GitRepo, Result};

/// Generate a repository key and register the filters
pub fn init(settings: &Settings) -> Result<()> {
    println!("Initializing git-seal...");

    let repo = GitRepo::open(".")?;
    let store = key_store(&repo, settings);

    if store.is_initialized() {
        println!("Repository already initialized for git-seal");
        return Ok(());
    }

    let key = store.init()?;
    println!("Generated new key (fingerprint {})", key.fingerprint());

    repo.configure_filters(FILTER_PROGRAM)?;
    println!("Configured git filters");

    println!("\nNext steps:");
    println!("1. Mark files to seal in .gitattributes");
    println!("   Example: echo '*.enc.yaml filter=git-seal diff=git-seal' >> .gitattributes");
    println!("2. Commit the .gitattributes file");
    println!("3. Share the key with 'git-seal export-key <file>'");

    Ok(())
}
