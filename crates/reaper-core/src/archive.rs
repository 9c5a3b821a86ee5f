//! Archival of branch patches before deletion.
//!
//! Every archived branch becomes a parentless branch in the archive
//! repository holding exactly one file: the tree diff from the default
//! branch to the archived branch. The file is named after the merge-base
//! so the patch can be applied on top of it later.

use chrono::{DateTime, TimeZone};
use reaper_git::{GitOps, GitSettings, Oid, Repository};
use tracing::{debug, info};

use crate::classify::BranchInfo;
use crate::identity::RepositoryIdentity;

/// A patch ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedPatch {
    /// Branch created in the archive repository.
    pub branch_name: String,
    /// Name of the single file on that branch.
    pub file_name: String,
    /// Patch bytes, exactly as produced by the diff.
    pub content: Vec<u8>,
}

/// Destination for archived patches.
pub trait PatchArchive {
    /// Store a patch on a fresh branch.
    ///
    /// # Errors
    /// Returns error if the patch could not be committed or pushed.
    fn store(&self, patch: &ArchivedPatch) -> reaper_git::Result<()>;
}

/// Archive backed by a remote git repository.
///
/// Each patch is committed in a throwaway repository whose `origin` is the
/// archive URL, then pushed.
#[derive(Debug, Clone)]
pub struct GitPatchArchive {
    url: String,
    settings: GitSettings,
}

impl GitPatchArchive {
    /// Create an archive pushing to `url` with the given identity.
    #[must_use]
    pub fn new(url: impl Into<String>, settings: GitSettings) -> Self {
        Self {
            url: url.into(),
            settings,
        }
    }
}

impl PatchArchive for GitPatchArchive {
    fn store(&self, patch: &ArchivedPatch) -> reaper_git::Result<()> {
        let dir = tempfile::Builder::new().prefix("reaper-archive-").tempdir()?;
        let repo = Repository::init_with_origin(dir.path(), &self.url, self.settings.clone())?;
        let oid = repo.commit_orphan_file(&patch.branch_name, &patch.file_name, &patch.content)?;
        debug!(%oid, branch = %patch.branch_name, "patch pushed to archive");
        Ok(())
    }
}

/// Timestamp suffix making archive branch names unique per run.
#[must_use]
pub fn archive_timestamp<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%Y%m%d%H%M%S%3f").to_string()
}

/// `{project}_{repo}_{branch}_{timestamp}`.
#[must_use]
pub fn archive_branch_name(identity: &RepositoryIdentity, branch: &str, timestamp: &str) -> String {
    format!(
        "{}_{}_{}_{}",
        identity.project, identity.repo, branch, timestamp
    )
}

/// `{merge-base}.diff`, or the branch name with `/` replaced when the
/// histories are unrelated.
#[must_use]
pub fn archive_file_name(merge_base: Option<Oid>, branch: &str) -> String {
    match merge_base {
        Some(oid) => format!("{oid}.diff"),
        None => format!("{}.diff", branch.replace('/', "_")),
    }
}

/// Archive one branch's patch against `default_branch`.
///
/// The source repository is only read.
///
/// # Errors
/// Returns error if the merge-base or diff cannot be computed, or the
/// archive refuses the patch.
pub fn archive_branch<G, A>(
    repo: &G,
    archive: &A,
    identity: &RepositoryIdentity,
    branch: &BranchInfo,
    default_branch: &str,
    timestamp: &str,
) -> reaper_git::Result<ArchivedPatch>
where
    G: GitOps,
    A: PatchArchive + ?Sized,
{
    let short = branch.short_name();
    let full = &branch.branch.name;

    let merge_base = repo.merge_base(default_branch, full)?;
    let content = repo.diff(default_branch, full)?;

    let patch = ArchivedPatch {
        branch_name: archive_branch_name(identity, short, timestamp),
        file_name: archive_file_name(merge_base, short),
        content,
    };
    archive.store(&patch)?;

    info!(branch = short, archive_branch = %patch.branch_name, file = %patch.file_name, "archived");
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_mocks::{MockArchive, MockGitOps, branch_info};
    use chrono::Utc;
    use git2::{RepositoryInitOptions, Signature, Time};
    use reaper_git::{BranchRef, ORIGIN};
    use tempfile::TempDir;

    const T0: i64 = 1_700_000_000;

    fn identity() -> RepositoryIdentity {
        RepositoryIdentity::parse("ssh://git@git.example.com/BE/payments.git")
    }

    fn settings() -> GitSettings {
        GitSettings::new("Branch Reaper", "reaper@example.com")
    }

    fn commit(
        repo: &git2::Repository,
        refname: &str,
        parent: Option<Oid>,
        file: &str,
        content: &[u8],
        time: i64,
    ) -> Oid {
        let parent = parent.map(|oid| repo.find_commit(oid).unwrap());
        let parent_tree = parent.as_ref().map(|c| c.tree().unwrap());
        let blob = repo.blob(content).unwrap();
        let mut builder = repo.treebuilder(parent_tree.as_ref()).unwrap();
        builder.insert(file, blob, 0o100_644).unwrap();
        let tree = repo.find_tree(builder.write().unwrap()).unwrap();
        let sig = Signature::new("Jane Doe", "jane@example.com", &Time::new(time, 0)).unwrap();
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        repo.commit(Some(refname), &sig, &sig, file, &tree, &parents)
            .unwrap()
    }

    /// Source working copy with a bare origin, plus a bare archive.
    struct Fixture {
        _dirs: Vec<TempDir>,
        raw: git2::Repository,
        archive: git2::Repository,
        archive_url: String,
        work_path: std::path::PathBuf,
    }

    fn fixture() -> Fixture {
        let origin_dir = TempDir::new().unwrap();
        let archive_dir = TempDir::new().unwrap();
        let work_dir = TempDir::new().unwrap();

        git2::Repository::init_bare(origin_dir.path()).unwrap();
        let archive = git2::Repository::init_bare(archive_dir.path()).unwrap();
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("master");
        let raw = git2::Repository::init_opts(work_dir.path(), &opts).unwrap();
        raw.remote(ORIGIN, origin_dir.path().to_str().unwrap()).unwrap();

        Fixture {
            archive_url: archive_dir.path().to_str().unwrap().to_string(),
            work_path: work_dir.path().to_path_buf(),
            _dirs: vec![origin_dir, archive_dir, work_dir],
            raw,
            archive,
        }
    }

    fn publish(raw: &git2::Repository, branches: &[&str]) {
        let mut remote = raw.find_remote(ORIGIN).unwrap();
        let refspecs: Vec<String> = branches
            .iter()
            .map(|b| format!("refs/heads/{b}:refs/heads/{b}"))
            .collect();
        remote.push(&refspecs, None).unwrap();
        remote.fetch::<&str>(&[], None, None).unwrap();
    }

    fn stale(repo: &Repository, name: &str) -> BranchInfo {
        let branch = repo
            .list_remote_branches()
            .unwrap()
            .into_iter()
            .find(|b: &BranchRef| b.name == name)
            .unwrap();
        let last_commit = repo.last_commit_of(&branch).unwrap();
        BranchInfo {
            branch,
            last_commit,
        }
    }

    fn archive_onto_master<G: GitOps>(
        repo: &G,
        archive: &impl PatchArchive,
        info: &BranchInfo,
        timestamp: &str,
    ) -> reaper_git::Result<ArchivedPatch> {
        archive_branch(
            repo,
            archive,
            &identity(),
            info,
            "origin/master",
            timestamp,
        )
    }

    fn archived_file(archive: &git2::Repository, branch: &str, file: &str) -> (usize, Vec<u8>) {
        let commit = archive
            .find_reference(&format!("refs/heads/{branch}"))
            .unwrap()
            .peel_to_commit()
            .unwrap();
        let tree = commit.tree().unwrap();
        assert_eq!(tree.len(), 1);
        let blob = tree
            .get_name(file)
            .unwrap()
            .to_object(archive)
            .unwrap()
            .peel_to_blob()
            .unwrap();
        (commit.parent_count(), blob.content().to_vec())
    }

    #[test]
    fn test_file_name_from_merge_base() {
        let oid = Oid::from_str("1234567890abcdef1234567890abcdef12345678").unwrap();
        assert_eq!(
            archive_file_name(Some(oid), "feature/login"),
            "1234567890abcdef1234567890abcdef12345678.diff"
        );
        assert_eq!(archive_file_name(None, "feature/login"), "feature_login.diff");
    }

    #[test]
    fn test_branch_name_and_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()
            + chrono::Duration::milliseconds(42);
        let timestamp = archive_timestamp(&now);
        assert_eq!(timestamp, "20240506070809042");
        assert_eq!(
            archive_branch_name(&identity(), "feature/login", &timestamp),
            "BE_payments_feature/login_20240506070809042"
        );
    }

    #[test]
    fn test_archive_failure_propagates() {
        let repo = MockGitOps::new();
        let archive = MockArchive::new().with_failure("feature_x");
        let info = branch_info("refs/remotes/origin/feature/x", "Jane", "jane@example.com", 1);

        let err = archive_onto_master(&repo, &archive, &info, "1").unwrap_err();
        assert!(matches!(err, reaper_git::Error::PushRejected(_)));
        assert!(archive.stored.borrow().is_empty());
    }

    #[test]
    fn test_archive_forked_branch_named_after_merge_base() {
        let f = fixture();
        let master = "refs/heads/master";
        let a = commit(&f.raw, master, None, "build.gradle", b"line\n", T0);
        let b = commit(
            &f.raw,
            master,
            Some(a),
            "gradle.properties",
            b"version=1.0.1\n",
            T0 + 10,
        );
        let c = commit(&f.raw, master, Some(b), "master.txt", b"master\n", T0 + 20);
        let x = commit(
            &f.raw,
            "refs/heads/feature",
            Some(b),
            "test.txt",
            b"testing\n",
            T0 + 30,
        );
        publish(&f.raw, &["master", "feature"]);

        let repo = Repository::open(&f.work_path, settings()).unwrap();
        let archive = GitPatchArchive::new(&f.archive_url, settings());
        let info = stale(&repo, "refs/remotes/origin/feature");

        let patch = archive_onto_master(&repo, &archive, &info, "20240101000000000").unwrap();
        assert_eq!(patch.file_name, format!("{b}.diff"));
        assert_eq!(patch.branch_name, "BE_payments_feature_20240101000000000");

        let (parents, content) = archived_file(&f.archive, &patch.branch_name, &patch.file_name);
        assert_eq!(parents, 0);
        assert_eq!(content, patch.content);

        // Applying the archived patch on the default branch reproduces the branch tree.
        let diff = git2::Diff::from_buffer(&content).unwrap();
        let base_tree = f.raw.find_commit(c).unwrap().tree().unwrap();
        let mut index = f.raw.apply_to_tree(&base_tree, &diff, None).unwrap();
        let rebuilt = index.write_tree_to(&f.raw).unwrap();
        assert_eq!(rebuilt, f.raw.find_commit(x).unwrap().tree_id());

        // The source repository is untouched.
        assert!(f.raw.find_reference("refs/remotes/origin/feature").is_ok());
    }

    #[test]
    fn test_archive_keeps_non_utf8_bytes() {
        let f = fixture();
        let base = commit(&f.raw, "refs/heads/master", None, "a.txt", b"a\n", T0);
        // cp1251 text, not valid UTF-8
        let legacy: &[u8] = &[0xcf, 0xf0, 0xe8, 0xe2, 0xe5, 0xf2, b'\n'];
        let legacy_ref = "refs/heads/legacy";
        let tip = commit(&f.raw, legacy_ref, Some(base), "ru.txt", legacy, T0 + 5);
        publish(&f.raw, &["master", "legacy"]);

        let repo = Repository::open(&f.work_path, settings()).unwrap();
        let archive = GitPatchArchive::new(&f.archive_url, settings());
        let info = stale(&repo, "refs/remotes/origin/legacy");
        let patch = archive_onto_master(&repo, &archive, &info, "1").unwrap();

        let (_, content) = archived_file(&f.archive, &patch.branch_name, &patch.file_name);
        assert_eq!(content, patch.content);
        assert!(content.windows(legacy.len()).any(|w| w == legacy));

        let diff = git2::Diff::from_buffer(&content).unwrap();
        let base_tree = f.raw.find_commit(base).unwrap().tree().unwrap();
        let mut index = f.raw.apply_to_tree(&base_tree, &diff, None).unwrap();
        let rebuilt = index.write_tree_to(&f.raw).unwrap();
        assert_eq!(rebuilt, f.raw.find_commit(tip).unwrap().tree_id());
    }

    #[test]
    fn test_archive_unrelated_branch_uses_branch_name() {
        let f = fixture();
        commit(&f.raw, "refs/heads/master", None, "build.gradle", b"line\n", T0);
        commit(
            &f.raw,
            "refs/heads/feature/login",
            None,
            "login.txt",
            b"login\n",
            T0 + 5,
        );
        publish(&f.raw, &["master", "feature/login"]);

        let repo = Repository::open(&f.work_path, settings()).unwrap();
        let archive = GitPatchArchive::new(&f.archive_url, settings());
        let info = stale(&repo, "refs/remotes/origin/feature/login");

        let patch = archive_onto_master(&repo, &archive, &info, "1").unwrap();
        assert_eq!(patch.file_name, "feature_login.diff");

        let (_, content) = archived_file(&f.archive, &patch.branch_name, "feature_login.diff");
        assert!(String::from_utf8(content).unwrap().contains("+login"));
    }

    #[test]
    fn test_archive_commit_uses_configured_identity() {
        let f = fixture();
        commit(&f.raw, "refs/heads/master", None, "a.txt", b"a\n", T0);
        commit(&f.raw, "refs/heads/old", None, "b.txt", b"b\n", T0);
        publish(&f.raw, &["master", "old"]);

        let repo = Repository::open(&f.work_path, settings()).unwrap();
        let archive = GitPatchArchive::new(&f.archive_url, settings());
        let info = stale(&repo, "refs/remotes/origin/old");
        let patch = archive_onto_master(&repo, &archive, &info, "1").unwrap();

        let commit = f
            .archive
            .find_reference(&format!("refs/heads/{}", patch.branch_name))
            .unwrap()
            .peel_to_commit()
            .unwrap();
        assert_eq!(commit.author().name(), Some("Branch Reaper"));
        assert_eq!(commit.author().email(), Some("reaper@example.com"));
    }
}
