//! Repository wrapper implementing the lifecycle's git capabilities.

use std::path::Path;

use git2::{BranchType, DiffFormat, DiffOptions, ErrorCode, Oid, PushOptions, Sort};
use tracing::debug;

use crate::error::{Error, Result};
use crate::settings::GitSettings;
use crate::traits::GitOps;
use crate::types::{Author, BranchRef, CommitMeta, REMOTE_PREFIX};

/// Name of the only remote the engine talks to.
pub const ORIGIN: &str = "origin";

/// Message of the commit holding an archived patch.
const ARCHIVE_COMMIT_MESSAGE: &str = "add new file";

/// High-level wrapper around a git repository.
pub struct Repository {
    inner: git2::Repository,
    settings: GitSettings,
}

impl Repository {
    /// Open a repository at the given path.
    ///
    /// # Errors
    /// Returns error if no repository found at path or any parent.
    pub fn open(path: impl AsRef<Path>, settings: GitSettings) -> Result<Self> {
        let path = path.as_ref();
        let inner = git2::Repository::discover(path)
            .map_err(|_| Error::NotARepository(path.display().to_string()))?;
        Ok(Self { inner, settings })
    }

    /// Initialize an empty repository whose `origin` points at `url`.
    ///
    /// Used for throwaway working directories that only push.
    ///
    /// # Errors
    /// Returns error if the repository or remote cannot be created.
    pub fn init_with_origin(
        path: impl AsRef<Path>,
        url: &str,
        settings: GitSettings,
    ) -> Result<Self> {
        let inner = git2::Repository::init(path)?;
        inner.remote(ORIGIN, url)?;
        Ok(Self { inner, settings })
    }

    /// Get the path to the .git directory.
    #[must_use]
    pub fn git_dir(&self) -> &Path {
        self.inner.path()
    }

    fn resolve_commit(&self, spec: &str) -> Result<git2::Commit<'_>> {
        self.inner
            .revparse_single(spec)
            .and_then(|object| object.peel_to_commit())
            .map_err(|e| resolution(spec, &e))
    }

    fn resolve_tree(&self, spec: &str) -> Result<git2::Tree<'_>> {
        self.inner
            .revparse_single(spec)
            .and_then(|object| object.peel_to_tree())
            .map_err(|e| resolution(spec, &e))
    }

    /// Push a single refspec to `origin`, collecting per-ref rejections.
    fn push(&self, refspec: &str) -> Result<()> {
        let mut remote = self
            .inner
            .find_remote(ORIGIN)
            .map_err(|_| Error::RemoteNotFound(ORIGIN.into()))?;

        let mut rejections = Vec::new();
        {
            let mut callbacks = self.settings.remote_callbacks();
            callbacks.push_update_reference(|refname, status| {
                if let Some(message) = status {
                    rejections.push(format!("{refname}: {message}"));
                }
                Ok(())
            });

            let mut options = PushOptions::new();
            options.remote_callbacks(callbacks);
            remote
                .push(&[refspec], Some(&mut options))
                .map_err(|e| Error::PushRejected(e.message().to_string()))?;
        }

        if rejections.is_empty() {
            debug!(refspec, "pushed");
            Ok(())
        } else {
            Err(Error::PushRejected(rejections.join("; ")))
        }
    }
}

impl GitOps for Repository {
    fn list_remote_branches(&self) -> Result<Vec<BranchRef>> {
        let branches = self
            .inner
            .branches(Some(BranchType::Remote))
            .map_err(|e| access(&e))?;

        let mut refs = Vec::new();
        for entry in branches {
            let (branch, _) = entry.map_err(|e| access(&e))?;
            let reference = branch.get();
            let Some(name) = reference.name() else {
                debug!("skipping remote branch with non-utf8 name");
                continue;
            };
            // origin/HEAD is symbolic
            let resolved = reference.resolve().map_err(|e| access(&e))?;
            if let Some(target) = resolved.target() {
                refs.push(BranchRef::new(name, target));
            }
        }

        refs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(refs)
    }

    fn last_commit_of(&self, branch: &BranchRef) -> Result<CommitMeta> {
        let mut revwalk = self.inner.revwalk().map_err(|e| access(&e))?;
        revwalk.set_sorting(Sort::TIME).map_err(|e| access(&e))?;
        revwalk
            .push(branch.target)
            .map_err(|e| resolution(&branch.name, &e))?;

        let oid = match revwalk.next() {
            Some(oid) => oid.map_err(|e| resolution(&branch.name, &e))?,
            None => return Err(Error::NoCommits(branch.name.clone())),
        };
        let commit = self
            .inner
            .find_commit(oid)
            .map_err(|e| resolution(&branch.name, &e))?;

        let author = commit.author();
        Ok(CommitMeta {
            id: commit.id(),
            author: Author::new(
                String::from_utf8_lossy(author.name_bytes()),
                String::from_utf8_lossy(author.email_bytes()),
            ),
            time: commit.time().seconds(),
            summary: commit.summary().unwrap_or_default().to_string(),
        })
    }

    fn diff(&self, base: &str, target: &str) -> Result<Vec<u8>> {
        let old_tree = self.resolve_tree(base)?;
        let new_tree = self.resolve_tree(target)?;

        let mut options = DiffOptions::new();
        options.show_binary(true);
        let diff = self
            .inner
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(&mut options))?;

        // Blob content is kept byte for byte; it need not be UTF-8.
        let mut patch = Vec::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            let origin = line.origin();
            if matches!(origin, '+' | '-' | ' ') {
                let mut buf = [0; 4];
                patch.extend_from_slice(origin.encode_utf8(&mut buf).as_bytes());
            }
            patch.extend_from_slice(line.content());
            true
        })?;

        Ok(patch)
    }

    fn merge_base(&self, one: &str, two: &str) -> Result<Option<Oid>> {
        let one = self.resolve_commit(one)?.id();
        let two = self.resolve_commit(two)?.id();

        match self.inner.merge_base(one, two) {
            Ok(oid) => Ok(Some(oid)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remote_origin_url(&self) -> Result<String> {
        let remote = self
            .inner
            .find_remote(ORIGIN)
            .map_err(|_| Error::RemoteNotFound(ORIGIN.into()))?;

        remote
            .url()
            .map(String::from)
            .ok_or_else(|| Error::RemoteNotFound(ORIGIN.into()))
    }

    fn delete_remote_branch(&self, name: &str) -> Result<()> {
        let tracking = format!("{REMOTE_PREFIX}{name}");
        match self.inner.find_reference(&tracking) {
            Ok(mut reference) => reference.delete()?,
            Err(e) if e.code() == ErrorCode::NotFound => {
                debug!(tracking, "no local tracking ref to delete");
            }
            Err(e) => return Err(e.into()),
        }

        // Equivalent to `git push origin :refs/heads/<name>`
        self.push(&format!(":refs/heads/{name}"))
    }

    fn commit_orphan_file(&self, branch: &str, file_name: &str, content: &[u8]) -> Result<Oid> {
        let workdir = self
            .inner
            .workdir()
            .ok_or_else(|| Error::NotARepository(self.git_dir().display().to_string()))?;
        std::fs::write(workdir.join(file_name), content)?;

        let mut index = self.inner.index()?;
        index.clear()?;
        index.add_path(Path::new(file_name))?;
        index.write()?;
        let tree = self.inner.find_tree(index.write_tree()?)?;

        let signature = self.settings.signature()?;
        let refname = format!("refs/heads/{branch}");
        let oid = self.inner.commit(
            Some(&refname),
            &signature,
            &signature,
            ARCHIVE_COMMIT_MESSAGE,
            &tree,
            &[],
        )?;
        self.inner.set_head(&refname)?;
        debug!(%oid, branch, file_name, "created orphan commit");

        self.push(&format!("{refname}:{refname}"))?;
        Ok(oid)
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("path", &self.git_dir())
            .finish_non_exhaustive()
    }
}

fn access(e: &git2::Error) -> Error {
    Error::RepositoryAccess(e.message().to_string())
}

fn resolution(spec: &str, e: &git2::Error) -> Error {
    Error::ObjectResolution {
        spec: spec.to_string(),
        message: e.message().to_string(),
    }
}
