pub mod export_key;
pub mod filters;
pub mod init;
pub mod lock;
pub mod status;
pub mod unlock;

pub use export_key::{export_key, import_key};
pub use filters::{clean, diff, smudge};
pub use init::init;
pub use lock::lock;
pub use status::status;
pub use unlock::unlock;

use git_seal::config::Settings;
use git_seal::{GitRepo, KeyStore, Result};
use std::path::Path;

/// Command git runs for the registered filters
pub const FILTER_PROGRAM: &str = "git-seal";

/// Settings for the repository around the current directory, if there is one
pub fn load_settings() -> Result<Settings> {
    let root = GitRepo::open(".")
        .ok()
        .and_then(|repo| repo.workdir().ok().map(Path::to_path_buf));
    Settings::load(root.as_deref())
}

fn key_store(repo: &GitRepo, settings: &Settings) -> KeyStore {
    KeyStore::new(repo.git_dir())
        .with_key_file(settings.key_file.clone())
        .with_inline_key(settings.key.clone())
}
