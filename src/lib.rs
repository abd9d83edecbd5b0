//! # git-seal
//!
//! A git clean/smudge filter for encrypted files that does not churn.
//!
//! Encrypting the same plaintext twice never gives the same bytes (every
//! envelope has a fresh nonce). A naive clean filter therefore makes git see
//! every encrypted file as modified whenever it re-runs the filter. git-seal
//! compares *plaintext* instead: when the content git hands to the clean
//! filter opens identically from the envelope already in the index (or in
//! `HEAD`), that stored envelope is emitted again, byte for byte.
//!
//! ## Quick Start
//!
//! ```bash
//! git-seal init
//!
//! cat >> .gitattributes << 'EOF'
//! *.enc.yaml filter=git-seal diff=git-seal
//! .env.production filter=git-seal diff=git-seal
//! EOF
//!
//! git add .gitattributes config.enc.yaml
//! git commit -m "Add sealed config"
//!
//! # share the key out of band
//! git-seal export-key team.key
//! ```
//!
//! On another machine:
//!
//! ```bash
//! git clone <repository-url> && cd <repository>
//! git-seal unlock --key-file team.key
//! git checkout HEAD -- .
//! ```
//!
//! ## How It Works
//!
//! 1. **Clean** (`git add`): the plaintext is sealed, then
//!    [`reconcile::Reconciler`] decides whether a stored envelope can be
//!    reused instead.
//! 2. **Smudge** (`git checkout`): sealed content is opened into the working tree.
//! 3. **Textconv** (`git diff`): sealed blobs are shown as plaintext when a key
//!    is available.
//!
//! ### Reconciliation
//!
//! ```text
//! stdin plaintext ──seal──> fresh envelope
//!        │
//!        ├─ index envelope opens to the same plaintext?  ──> emit index bytes
//!        ├─ HEAD envelope opens to the same plaintext?   ──> emit HEAD bytes
//!        └─ otherwise                                    ──> emit fresh envelope
//! ```
//!
//! Paths that are conflicted, renamed, copied or deleted are refused rather
//! than guessed at.
//!
//! ## Formats
//!
//! Each envelope records the format of its plaintext (`binary`, `dotenv`,
//! `ini`, `json`, `yaml`), declared with `--input-type`/`--output-type` or
//! inferred from the path. See [`format`].
//!
//! ## Module Overview
//!
//! - [`reconcile`] - reuse-or-reseal decision for the clean filter
//! - [`git`] - repository access via git2
//! - [`crypto`] - AES-256-GCM envelope
//! - [`key`] - key storage, import and export
//! - [`format`] - content formats and inference
//! - [`filter`] - clean, smudge and diff stream drivers
//! - [`config`] - layered settings
//! - [`logging`] - stderr diagnostics
//! - [`error`] - error types
//!
//! ## Testing
//!
//! ```bash
//! # unit tests
//! cargo test --lib
//!
//! # end-to-end tests through a real git repository
//! cargo test --test filter_test
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod filter;
pub mod format;
pub mod git;
pub mod key;
pub mod logging;
pub mod reconcile;

pub use crypto::CryptoKey;
pub use error::{SealError, Result};
pub use format::{Format, FormatRequest};
pub use git::GitRepo;
pub use key::KeyStore;
pub use reconcile::{ReconciliationInput, ReconciliationResult, Reconciler};
