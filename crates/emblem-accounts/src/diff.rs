//! Change detection between the pre-merge cached copy and the merged record.

use crate::types::AccountRecord;

/// Whether a merged record should be committed and signaled to subscribers.
///
/// A first fetch always commits. Otherwise the merged record is compared
/// structurally against the copy taken before the merge began: merges are
/// cheap, but subscriber re-renders are not, so a fetch that returned
/// nothing new must not produce a signal.
pub fn should_commit(before: Option<&AccountRecord>, merged: &AccountRecord) -> bool {
    match before {
        None => true,
        Some(prev) => prev != merged,
    }
}
