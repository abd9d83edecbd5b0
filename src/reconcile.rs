//! # Clean-Filter Reconciliation
//!
//! Sealing is non-deterministic: the same plaintext encrypts to different
//! bytes every time. If the clean filter always emitted a fresh envelope, git
//! would see every sealed file as modified whenever it re-runs the filter
//! (`git status` after a `touch`, `git add -A`, stash, rebase...).
//!
//! [`Reconciler::decide`] fixes this. Before the freshly sealed bytes are
//! emitted it looks for an envelope git already has for the same path, first
//! in the index, then in the `HEAD` tree. If that envelope opens to exactly
//! the plaintext git handed to the filter, the stored bytes are emitted
//! instead and git sees no change.
//!
//! ```text
//! classify(path) ──fatal?──> UnhandledStatus
//!      │
//!      ├─ Staging ──locate──recover──equal?──> Reuse(staged bytes)
//!      │
//!      ├─ Committed (skipped when Added) ──locate──recover──equal?──> Reuse(HEAD bytes)
//!      │
//!      └──────────────────────────────────────> Fresh(supplied bytes)
//! ```
//!
//! Repository access and decryption come in through the [`ObjectLocator`],
//! [`StatusClassifier`] and [`PlaintextRecoverer`] traits so the policy can be
//! exercised without a repository or a key.

use crate::error::{DecodeError, Result, SealError};
use crate::format::{Format, FormatRequest};
use std::fmt;

/// Snapshot of the repository a stored object is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GitArea {
    Staging,
    Committed,
}

impl fmt::Display for GitArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitArea::Staging => f.write_str("staging area"),
            GitArea::Committed => f.write_str("HEAD"),
        }
    }
}

/// State of one side (index or working tree) of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileState {
    Unmodified,
    Modified,
    Added,
    Deleted,
    Renamed,
    Copied,
    Untracked,
    UpdatedButUnmerged,
}

impl FileState {
    /// States the clean filter refuses to reconcile.
    pub fn is_fatal(self) -> bool {
        match self {
            FileState::UpdatedButUnmerged
            | FileState::Renamed
            | FileState::Copied
            | FileState::Deleted => true,
            FileState::Unmodified
            | FileState::Modified
            | FileState::Added
            | FileState::Untracked => false,
        }
    }
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileState::Unmodified => "unmodified",
            FileState::Modified => "modified",
            FileState::Added => "added",
            FileState::Deleted => "deleted",
            FileState::Renamed => "renamed",
            FileState::Copied => "copied",
            FileState::Untracked => "untracked",
            FileState::UpdatedButUnmerged => "updated but unmerged",
        };
        f.write_str(name)
    }
}

/// Combined index/worktree status of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectStatus {
    pub staging: FileState,
    pub worktree: FileState,
}

impl ObjectStatus {
    pub fn new(staging: FileState, worktree: FileState) -> Self {
        Self { staging, worktree }
    }

    pub fn untracked() -> Self {
        Self::new(FileState::Untracked, FileState::Untracked)
    }

    /// The single state that drives reconciliation.
    ///
    /// Conflicts win, then any fatal state, then `Added`, then `Modified`,
    /// then `Untracked`. A path that is unchanged on both sides is
    /// `Unmodified`.
    pub fn governing(&self) -> FileState {
        let sides = [self.staging, self.worktree];
        if sides.contains(&FileState::UpdatedButUnmerged) {
            return FileState::UpdatedButUnmerged;
        }
        if let Some(fatal) = sides.into_iter().find(|s| s.is_fatal()) {
            return fatal;
        }
        [
            FileState::Added,
            FileState::Modified,
            FileState::Untracked,
        ]
        .into_iter()
        .find(|state| sides.contains(state))
        .unwrap_or(FileState::Unmodified)
    }
}

/// Raw bytes git has recorded for a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub path: String,
    pub bytes: Vec<u8>,
}

/// Everything the clean filter collected before deciding what to emit.
#[derive(Debug, Clone)]
pub struct ReconciliationInput {
    /// Path relative to the repository root
    pub path: String,
    pub formats: FormatRequest,
    /// Bytes git piped to the filter
    pub plaintext: Vec<u8>,
    /// Freshly sealed `plaintext`, used when nothing stored matches
    pub fresh: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationResult {
    /// A stored envelope that opens to the same plaintext
    Reuse(Vec<u8>),
    /// The supplied fresh envelope, unmodified
    Fresh(Vec<u8>),
}

impl ReconciliationResult {
    pub fn bytes(&self) -> &[u8] {
        match self {
            ReconciliationResult::Reuse(bytes) | ReconciliationResult::Fresh(bytes) => bytes,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            ReconciliationResult::Reuse(bytes) | ReconciliationResult::Fresh(bytes) => bytes,
        }
    }

    pub fn is_reuse(&self) -> bool {
        matches!(self, ReconciliationResult::Reuse(_))
    }
}

/// Reads stored objects out of the repository.
pub trait ObjectLocator {
    /// `Ok(None)` means git has nothing for `path` in `area`.
    fn locate(&self, path: &str, area: GitArea) -> Result<Option<StoredObject>>;
}

pub trait StatusClassifier {
    fn classify(&self, path: &str) -> Result<ObjectStatus>;
}

/// Opens a stored envelope. Any failure only disqualifies that envelope.
pub trait PlaintextRecoverer {
    fn recover(&self, stored: &[u8], format: Format) -> std::result::Result<Vec<u8>, DecodeError>;
}

/// Outcome of checking one area.
#[derive(Debug)]
enum Candidate {
    Matched(Vec<u8>),
    Mismatched,
    Undecodable(DecodeError),
    Absent,
}

fn never_skip(_: FileState) -> bool {
    false
}

// An added path has no history worth comparing against.
fn skip_when_added(state: FileState) -> bool {
    state == FileState::Added
}

/// Areas in priority order, each with the predicate that rules it out.
const CANDIDATE_AREAS: [(GitArea, fn(FileState) -> bool); 2] = [
    (GitArea::Staging, never_skip),
    (GitArea::Committed, skip_when_added),
];

pub struct Reconciler<'a> {
    locator: &'a dyn ObjectLocator,
    classifier: &'a dyn StatusClassifier,
    recoverer: &'a dyn PlaintextRecoverer,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        locator: &'a dyn ObjectLocator,
        classifier: &'a dyn StatusClassifier,
        recoverer: &'a dyn PlaintextRecoverer,
    ) -> Self {
        Self {
            locator,
            classifier,
            recoverer,
        }
    }

    /// Choose between a stored envelope and `input.fresh`.
    ///
    /// # Errors
    ///
    /// - [`SealError::UnhandledStatus`] for conflicted, renamed, copied or
    ///   deleted paths
    /// - [`SealError::RepositoryUnavailable`] / [`SealError::ReadFailure`]
    ///   from the locator or classifier
    pub fn decide(&self, input: ReconciliationInput) -> Result<ReconciliationResult> {
        let status = self.classifier.classify(&input.path)?;
        let state = status.governing();
        tracing::debug!(
            path = %input.path,
            staging = %status.staging,
            worktree = %status.worktree,
            "classified path"
        );

        if state.is_fatal() {
            return Err(SealError::UnhandledStatus {
                path: input.path,
                state,
            });
        }

        // Stored envelopes were written in the output format.
        let format = input.formats.resolve_output(&input.path);

        for (area, skip) in CANDIDATE_AREAS {
            if skip(state) {
                tracing::debug!(path = %input.path, %area, %state, "skipping area");
                continue;
            }
            match self.candidate(&input, area, format)? {
                Candidate::Matched(stored) => {
                    tracing::info!(path = %input.path, %area, "plaintext unchanged, reusing stored ciphertext");
                    return Ok(ReconciliationResult::Reuse(stored));
                }
                Candidate::Mismatched => {
                    tracing::debug!(path = %input.path, %area, "plaintext differs");
                }
                Candidate::Undecodable(err) => {
                    tracing::warn!(path = %input.path, %area, %err, "stored object could not be decoded");
                }
                Candidate::Absent => {
                    tracing::debug!(path = %input.path, %area, "no stored object");
                }
            }
        }

        tracing::info!(path = %input.path, "emitting fresh ciphertext");
        Ok(ReconciliationResult::Fresh(input.fresh))
    }

    fn candidate(
        &self,
        input: &ReconciliationInput,
        area: GitArea,
        format: Format,
    ) -> Result<Candidate> {
        let Some(stored) = self.locator.locate(&input.path, area)? else {
            return Ok(Candidate::Absent);
        };
        let candidate = match self.recoverer.recover(&stored.bytes, format) {
            Ok(plaintext) if plaintext == input.plaintext => Candidate::Matched(stored.bytes),
            Ok(_) => Candidate::Mismatched,
            Err(err) => Candidate::Undecodable(err),
        };
        Ok(candidate)
    }
}
