//! Mock implementations for testing the engine.
//!
//! These mocks implement the traits from reaper-git, reaper-mail and
//! reaper-core to unit test classification and the lifecycle workflows
//! without real repositories or mail servers.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};

use reaper_git::{Author, BranchRef, CommitMeta, GitOps, Oid, Result as GitResult};
use reaper_mail::{Email, MailTransport, Result as MailResult};

use crate::archive::{ArchivedPatch, PatchArchive};
use crate::classify::BranchInfo;

pub fn branch_ref(name: &str) -> BranchRef {
    BranchRef::new(name, Oid::zero())
}

pub fn commit_at(name: &str, email: &str, time: i64) -> CommitMeta {
    CommitMeta {
        id: Oid::zero(),
        author: Author::new(name, email),
        time,
        summary: format!("work by {name}"),
    }
}

pub fn branch_info(ref_name: &str, name: &str, email: &str, time: i64) -> BranchInfo {
    BranchInfo {
        branch: branch_ref(ref_name),
        last_commit: commit_at(name, email, time),
    }
}

enum Tip {
    Commit(CommitMeta),
    Empty,
    Corrupt,
}

/// Mock implementation of `GitOps`.
pub struct MockGitOps {
    branches: RefCell<Vec<BranchRef>>,
    tips: RefCell<HashMap<String, Tip>>,
    unreadable: RefCell<bool>,
    pub merge_bases: RefCell<HashMap<String, Oid>>,
    pub diff_failures: RefCell<HashSet<String>>,
    pub delete_failures: RefCell<HashSet<String>>,
    pub deleted: RefCell<Vec<String>>,
    pub origin_url: String,
}

impl Default for MockGitOps {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGitOps {
    pub fn new() -> Self {
        Self {
            branches: RefCell::new(Vec::new()),
            tips: RefCell::new(HashMap::new()),
            unreadable: RefCell::new(false),
            merge_bases: RefCell::new(HashMap::new()),
            diff_failures: RefCell::new(HashSet::new()),
            delete_failures: RefCell::new(HashSet::new()),
            deleted: RefCell::new(Vec::new()),
            origin_url: "ssh://git@git.example.com/proj/repo.git".to_string(),
        }
    }

    fn add(&self, name: &str, tip: Tip) {
        self.branches.borrow_mut().push(branch_ref(name));
        self.tips.borrow_mut().insert(name.to_string(), tip);
    }

    pub fn with_branch(self, name: &str, commit: CommitMeta) -> Self {
        self.add(name, Tip::Commit(commit));
        self
    }

    pub fn with_empty_branch(self, name: &str) -> Self {
        self.add(name, Tip::Empty);
        self
    }

    pub fn with_corrupt_branch(self, name: &str) -> Self {
        self.add(name, Tip::Corrupt);
        self
    }

    pub fn with_unreadable_refs(self) -> Self {
        *self.unreadable.borrow_mut() = true;
        self
    }

    /// Fail `delete_remote_branch` for a short branch name.
    pub fn with_delete_failure(self, name: &str) -> Self {
        self.delete_failures.borrow_mut().insert(name.to_string());
        self
    }

    /// Fail `diff` for a full ref name.
    pub fn with_diff_failure(self, ref_name: &str) -> Self {
        self.diff_failures.borrow_mut().insert(ref_name.to_string());
        self
    }

    pub fn set_commit(&self, name: &str, commit: CommitMeta) {
        self.tips
            .borrow_mut()
            .insert(name.to_string(), Tip::Commit(commit));
    }
}

impl GitOps for MockGitOps {
    fn list_remote_branches(&self) -> GitResult<Vec<BranchRef>> {
        if *self.unreadable.borrow() {
            return Err(reaper_git::Error::RepositoryAccess(
                "refs database locked".into(),
            ));
        }
        let mut branches = self.branches.borrow().clone();
        branches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(branches)
    }

    fn last_commit_of(&self, branch: &BranchRef) -> GitResult<CommitMeta> {
        match self.tips.borrow().get(&branch.name) {
            Some(Tip::Commit(commit)) => Ok(commit.clone()),
            Some(Tip::Corrupt) => Err(reaper_git::Error::ObjectResolution {
                spec: branch.name.clone(),
                message: "object not found".into(),
            }),
            Some(Tip::Empty) | None => Err(reaper_git::Error::NoCommits(branch.name.clone())),
        }
    }

    fn diff(&self, base: &str, target: &str) -> GitResult<Vec<u8>> {
        if self.diff_failures.borrow().contains(target) {
            return Err(reaper_git::Error::ObjectResolution {
                spec: target.to_string(),
                message: "bad tree".into(),
            });
        }
        Ok(format!("diff {base}..{target}\n").into_bytes())
    }

    fn merge_base(&self, _one: &str, two: &str) -> GitResult<Option<Oid>> {
        Ok(self.merge_bases.borrow().get(two).copied())
    }

    fn remote_origin_url(&self) -> GitResult<String> {
        Ok(self.origin_url.clone())
    }

    fn delete_remote_branch(&self, name: &str) -> GitResult<()> {
        if self.delete_failures.borrow().contains(name) {
            return Err(reaper_git::Error::PushRejected(format!(
                "refs/heads/{name}: pre-receive hook declined"
            )));
        }
        self.deleted.borrow_mut().push(name.to_string());
        Ok(())
    }

    fn commit_orphan_file(
        &self,
        _branch: &str,
        _file_name: &str,
        _content: &[u8],
    ) -> GitResult<Oid> {
        Ok(Oid::zero())
    }
}

/// Mock implementation of `PatchArchive` recording every stored patch.
#[derive(Default)]
pub struct MockArchive {
    pub stored: RefCell<Vec<ArchivedPatch>>,
    pub failures: RefCell<HashSet<String>>,
}

impl MockArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail storing patches whose file name starts with `prefix`.
    pub fn with_failure(self, prefix: &str) -> Self {
        self.failures.borrow_mut().insert(prefix.to_string());
        self
    }
}

impl PatchArchive for MockArchive {
    fn store(&self, patch: &ArchivedPatch) -> GitResult<()> {
        if self
            .failures
            .borrow()
            .iter()
            .any(|prefix| patch.file_name.starts_with(prefix.as_str()))
        {
            return Err(reaper_git::Error::PushRejected(format!(
                "refs/heads/{}: archive unavailable",
                patch.branch_name
            )));
        }
        self.stored.borrow_mut().push(patch.clone());
        Ok(())
    }
}

/// Mock `MailTransport` replaying scripted results and logging every attempt.
#[derive(Default)]
pub struct MockTransport {
    script: RefCell<VecDeque<MailResult<()>>>,
    pub sent: RefCell<Vec<Email>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next send; unscripted sends succeed.
    pub fn then(self, result: MailResult<()>) -> Self {
        self.script.borrow_mut().push_back(result);
        self
    }
}

impl MailTransport for MockTransport {
    fn send(&self, email: &Email) -> MailResult<()> {
        self.sent.borrow_mut().push(email.clone());
        self.script.borrow_mut().pop_front().unwrap_or(Ok(()))
    }
}
