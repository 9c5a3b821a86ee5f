//! Aggregation of branches by the author of their last commit.

use std::collections::BTreeMap;

use reaper_git::Author;

use crate::classify::BranchInfo;

/// Branches keyed by the author of their last commit.
pub type AuthorGroups = BTreeMap<Author, Vec<BranchInfo>>;

/// Group branches by last-commit author.
///
/// Every branch lands in exactly one group; authors are equal when both
/// name and email match. Within a group branches keep their input order.
#[must_use]
pub fn group_by_author<I>(branches: I) -> AuthorGroups
where
    I: IntoIterator<Item = BranchInfo>,
{
    let mut groups = AuthorGroups::new();
    for info in branches {
        groups
            .entry(info.last_commit.author.clone())
            .or_default()
            .push(info);
    }
    groups
}
