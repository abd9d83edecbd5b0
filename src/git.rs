use crate::error::{Result, SealError};
use crate::reconcile::{
    FileState, GitArea, ObjectLocator, ObjectStatus, StatusClassifier, StoredObject,
};
use git2::{AttrCheckFlags, ErrorCode, ObjectType, Repository, Status};
use std::path::{Component, Path};

/// Name of the filter and diff drivers in `.gitattributes`
pub const DRIVER: &str = "git-seal";

pub struct GitRepo {
    repo: Repository,
}

impl GitRepo {
    /// Open the repository containing `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let repo = Repository::discover(path).map_err(|_| SealError::RepositoryUnavailable)?;
        Ok(Self { repo })
    }

    /// Get the git directory path
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    pub fn workdir(&self) -> Result<&Path> {
        self.repo.workdir().ok_or(SealError::Other(
            "Repository has no working directory".into(),
        ))
    }

    /// Register the clean/smudge filter and the textconv diff driver
    pub fn configure_filters(&self, program: &str) -> Result<()> {
        let mut config = self.repo.config()?;

        config.set_str(
            &format!("filter.{DRIVER}.clean"),
            &format!("{program} clean %f"),
        )?;
        config.set_str(
            &format!("filter.{DRIVER}.smudge"),
            &format!("{program} smudge %f"),
        )?;
        config.set_bool(&format!("filter.{DRIVER}.required"), true)?;
        config.set_str(
            &format!("diff.{DRIVER}.textconv"),
            &format!("{program} diff"),
        )?;

        Ok(())
    }

    pub fn remove_filters(&self) -> Result<()> {
        let mut config = self.repo.config()?;

        for key in ["clean", "smudge", "required"] {
            remove_entry(&mut config, &format!("filter.{DRIVER}.{key}"))?;
        }
        remove_entry(&mut config, &format!("diff.{DRIVER}.textconv"))
    }

    pub fn filters_configured(&self) -> bool {
        self.repo
            .config()
            .and_then(|config| config.get_string(&format!("filter.{DRIVER}.clean")))
            .is_ok()
    }

    /// Normalize a filter argument into a `/`-separated path relative to the
    /// repository root.
    pub fn repo_relative(&self, path: &str) -> String {
        let path = Path::new(path);
        let relative = match self.repo.workdir() {
            Some(workdir) if path.is_absolute() => path.strip_prefix(workdir).unwrap_or(path),
            _ => path,
        };
        relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Index paths whose `filter` attribute selects this driver
    pub fn sealed_paths(&self) -> Result<Vec<String>> {
        let index = self.repo.index()?;
        let mut paths = Vec::new();
        for entry in index.iter() {
            let path = String::from_utf8_lossy(&entry.path).into_owned();
            let filter = self.repo.get_attr(
                Path::new(&path),
                "filter",
                AttrCheckFlags::FILE_THEN_INDEX,
            )?;
            if filter == Some(DRIVER) && !paths.contains(&path) {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    fn staged_blob(&self, path: &str) -> std::result::Result<Option<Vec<u8>>, git2::Error> {
        let mut index = self.repo.index()?;
        index.read(false)?;
        let Some(entry) = index.get_path(Path::new(path), 0) else {
            return Ok(None);
        };
        let blob = self.repo.find_blob(entry.id)?;
        Ok(Some(blob.content().to_vec()))
    }

    fn head_blob(&self, path: &str) -> std::result::Result<Option<Vec<u8>>, git2::Error> {
        let head = match self.repo.head() {
            Ok(head) => head,
            // no commits yet
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Ok(None)
            }
            Err(e) => return Err(e),
        };
        let tree = head.peel_to_tree()?;
        let entry = match tree.get_path(Path::new(path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        if entry.kind() != Some(ObjectType::Blob) {
            return Ok(None);
        }
        let blob = self.repo.find_blob(entry.id())?;
        Ok(Some(blob.content().to_vec()))
    }
}

impl ObjectLocator for GitRepo {
    fn locate(&self, path: &str, area: GitArea) -> Result<Option<StoredObject>> {
        let path = self.repo_relative(path);
        let bytes = match area {
            GitArea::Staging => self.staged_blob(&path),
            GitArea::Committed => self.head_blob(&path),
        }
        .map_err(|e| SealError::ReadFailure {
            path: path.clone(),
            area,
            message: e.message().to_string(),
        })?;
        Ok(bytes.map(|bytes| StoredObject { path, bytes }))
    }
}

impl StatusClassifier for GitRepo {
    fn classify(&self, path: &str) -> Result<ObjectStatus> {
        let path = self.repo_relative(path);
        match self.repo.status_file(Path::new(&path)) {
            Ok(status) => Ok(object_status(status)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(ObjectStatus::untracked()),
            Err(e) => Err(e.into()),
        }
    }
}

// An entry that is already gone is fine; failing to write the config is not.
fn remove_entry(config: &mut git2::Config, name: &str) -> Result<()> {
    match config.remove(name) {
        Err(e) if e.code() != ErrorCode::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}

fn object_status(status: Status) -> ObjectStatus {
    if status.is_conflicted() {
        return ObjectStatus::new(
            FileState::UpdatedButUnmerged,
            FileState::UpdatedButUnmerged,
        );
    }

    let staging = if status.is_index_new() {
        FileState::Added
    } else if status.is_index_deleted() {
        FileState::Deleted
    } else if status.is_index_renamed() {
        FileState::Renamed
    } else if status.is_index_modified() || status.is_index_typechange() {
        FileState::Modified
    } else {
        FileState::Unmodified
    };

    let worktree = if status.is_wt_new() || status.is_ignored() {
        FileState::Untracked
    } else if status.is_wt_deleted() {
        FileState::Deleted
    } else if status.is_wt_renamed() {
        FileState::Renamed
    } else if status.is_wt_modified() || status.is_wt_typechange() {
        FileState::Modified
    } else {
        FileState::Unmodified
    };

    // nothing in the index for an untracked file
    if worktree == FileState::Untracked && staging == FileState::Unmodified {
        return ObjectStatus::untracked();
    }
    ObjectStatus::new(staging, worktree)
}
