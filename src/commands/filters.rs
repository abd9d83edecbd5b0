use super::key_store;
use git_seal::config::Settings;
use git_seal::filter::{clean_filter, diff_filter, smudge_filter};
use git_seal::{FormatRequest, GitRepo, Result};
use std::fs::File;
use std::io;
use std::path::Path;

fn formats(settings: &Settings, input: Option<&str>, output: Option<&str>) -> Result<FormatRequest> {
    Ok(FormatRequest::parse(input, output)?.with_default(settings.default_format))
}

/// Clean filter (called by git during add/commit)
pub fn clean(
    settings: &Settings,
    path: &str,
    input_type: Option<&str>,
    output_type: Option<&str>,
) -> Result<()> {
    let formats = formats(settings, input_type, output_type)?;
    let repo = GitRepo::open(".")?;
    let key = key_store(&repo, settings).load()?;
    let path = repo.repo_relative(path);

    clean_filter(
        &repo,
        &key,
        &path,
        formats,
        &mut io::stdin().lock(),
        &mut io::stdout().lock(),
    )
}

/// Smudge filter (called by git during checkout)
pub fn smudge(
    settings: &Settings,
    path: &str,
    input_type: Option<&str>,
    output_type: Option<&str>,
) -> Result<()> {
    let formats = formats(settings, input_type, output_type)?;
    let repo = GitRepo::open(".")?;
    let key = key_store(&repo, settings).load()?;
    let path = repo.repo_relative(path);

    smudge_filter(
        &key,
        &path,
        formats,
        &mut io::stdin().lock(),
        &mut io::stdout().lock(),
    )
}

/// Diff textconv (called by git during diff); works without a key
pub fn diff(settings: &Settings, file: Option<&Path>) -> Result<()> {
    let key = GitRepo::open(".")
        .and_then(|repo| key_store(&repo, settings).load())
        .ok();

    let mut stdout = io::stdout().lock();
    match file {
        Some(file) => diff_filter(key.as_ref(), &mut File::open(file)?, &mut stdout),
        None => diff_filter(key.as_ref(), &mut io::stdin().lock(), &mut stdout),
    }
}
