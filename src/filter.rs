//! Stream drivers for the git filter and textconv commands.
//!
//! ```text
//! git add   : working tree ──clean──> index      (seal, reusing stored bytes)
//! checkout  : index ──smudge──> working tree     (open)
//! git diff  : blob ──textconv──> readable text   (open if a key is available)
//! ```

use crate::crypto::CryptoKey;
use crate::error::{Result, SealError};
use crate::format::FormatRequest;
use crate::reconcile::{ObjectLocator, ReconciliationInput, Reconciler, StatusClassifier};
use std::io::{Read, Write};

pub const LOCKED_MARKER: &str = "*** This file is sealed with git-seal ***";

/// Write the chosen bytes verbatim and flush.
pub fn emit<W: Write>(output: &mut W, bytes: &[u8]) -> Result<()> {
    output
        .write_all(bytes)
        .and_then(|()| output.flush())
        .map_err(SealError::WriteFailure)
}

fn read_all<R: Read>(input: &mut R) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    input.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Clean filter: seal `input`, preferring a stored envelope of the same plaintext.
pub fn clean_filter<G, R, W>(
    repo: &G,
    key: &CryptoKey,
    path: &str,
    formats: FormatRequest,
    input: &mut R,
    output: &mut W,
) -> Result<()>
where
    G: ObjectLocator + StatusClassifier,
    R: Read,
    W: Write,
{
    let plaintext = read_all(input)?;

    // An envelope this key opens is stored as is; anything else is plaintext
    if key.can_open(&plaintext) {
        tracing::debug!(path, "input already sealed, passing through");
        return emit(output, &plaintext);
    }

    let fresh = key.encrypt(&plaintext, formats.resolve_output(path))?;
    let result = Reconciler::new(repo, repo, key).decide(ReconciliationInput {
        path: path.to_string(),
        formats,
        plaintext,
        fresh,
    })?;

    emit(output, result.bytes())
}

/// Smudge filter: open sealed input, pass anything else through.
pub fn smudge_filter<R: Read, W: Write>(
    key: &CryptoKey,
    path: &str,
    formats: FormatRequest,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    let sealed = read_all(input)?;

    if !CryptoKey::is_encrypted(&sealed) {
        return emit(output, &sealed);
    }

    let plaintext = key.decrypt(&sealed, formats.resolve_output(path))?;
    emit(output, &plaintext)
}

/// Textconv for `git diff`: show plaintext when possible, a marker otherwise.
pub fn diff_filter<R: Read, W: Write>(
    key: Option<&CryptoKey>,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    let content = read_all(input)?;

    let Some(format) = CryptoKey::sealed_format(&content) else {
        return emit(output, &content);
    };

    match key.map(|key| key.decrypt(&content, format)) {
        Some(Ok(plaintext)) => emit(output, &plaintext),
        Some(Err(err)) => {
            tracing::warn!(%err, "cannot open sealed content for diff");
            emit(output, format!("{LOCKED_MARKER}\n").as_bytes())
        }
        None => emit(output, format!("{LOCKED_MARKER}\n").as_bytes()),
    }
}
