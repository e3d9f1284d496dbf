//! Tree flattening and the sorted lock-step diff
//!
//! A stored tree graph is flattened into a sorted path → (mode, hash) map,
//! and two such maps (tree-derived vs index-derived) are walked in
//! lock-step merge-join fashion: always advance whichever side sits at the
//! lexicographically smaller path, or both on a tie. One pass over each
//! side, O(n+m), no repeated scanning.

pub mod myers;
pub mod stat;

use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use std::collections::BTreeMap;

/// Mode and hash of one path on one diff side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatEntry {
    pub mode: EntryMode,
    pub oid: ObjectId,
}

impl FlatEntry {
    pub fn new(mode: EntryMode, oid: ObjectId) -> Self {
        FlatEntry { mode, oid }
    }
}

/// Sorted path → entry map, one diff side
pub type FlatTree = BTreeMap<String, FlatEntry>;

/// Recursively flatten a stored tree graph into a path-keyed map
///
/// `load` resolves a tree hash to its object; subdirectory rows recurse
/// with their name joined onto the prefix.
pub fn flatten_tree<F>(load: &F, root: &ObjectId) -> anyhow::Result<FlatTree>
where
    F: Fn(&ObjectId) -> anyhow::Result<Tree>,
{
    let mut flat = FlatTree::new();
    flatten_into(load, root, "", &mut flat)?;
    Ok(flat)
}

fn flatten_into<F>(
    load: &F,
    oid: &ObjectId,
    prefix: &str,
    flat: &mut FlatTree,
) -> anyhow::Result<()>
where
    F: Fn(&ObjectId) -> anyhow::Result<Tree>,
{
    let tree = load(oid)?;

    for entry in tree.into_entries() {
        let path = if prefix.is_empty() {
            entry.name().to_string()
        } else {
            format!("{prefix}/{}", entry.name())
        };

        if entry.is_tree() {
            flatten_into(load, entry.oid(), &path, flat)?;
        } else {
            flat.insert(path, FlatEntry::new(entry.mode(), entry.oid().clone()));
        }
    }

    Ok(())
}

/// Build the index-side flat map from sorted index entries
pub fn flatten_index<'e>(entries: impl Iterator<Item = &'e IndexEntry>) -> FlatTree {
    entries
        .map(|entry| {
            (
                entry.path.clone(),
                FlatEntry::new(entry.metadata.mode, entry.oid.clone()),
            )
        })
        .collect()
}

/// Per-path classification of a compared pair
///
/// Exactly one kind applies to any pair where at most one side is missing;
/// equal pairs produce no change at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Added(FlatEntry),
    Deleted(FlatEntry),
    Modified { old: FlatEntry, new: FlatEntry },
}

impl Change {
    /// Classify one path given its two sides; `None` means unchanged
    ///
    /// A missing side reads as the sentinel pair (no mode, zero hash).
    pub fn classify(old: Option<&FlatEntry>, new: Option<&FlatEntry>) -> Option<Self> {
        match (old, new) {
            (None, Some(new)) => Some(Change::Added(new.clone())),
            (Some(old), None) => Some(Change::Deleted(old.clone())),
            (Some(old), Some(new)) if old != new => Some(Change::Modified {
                old: old.clone(),
                new: new.clone(),
            }),
            _ => None,
        }
    }

    pub fn status_char(&self) -> char {
        match self {
            Change::Added(_) => 'A',
            Change::Deleted(_) => 'D',
            Change::Modified { .. } => 'M',
        }
    }

    /// A modification that only touched the mode, not the content
    pub fn is_mode_only(&self) -> bool {
        match self {
            Change::Modified { old, new } => old.oid == new.oid && old.mode != new.mode,
            _ => false,
        }
    }

    pub fn old_entry(&self) -> Option<&FlatEntry> {
        match self {
            Change::Deleted(entry) => Some(entry),
            Change::Modified { old, .. } => Some(old),
            Change::Added(_) => None,
        }
    }

    pub fn new_entry(&self) -> Option<&FlatEntry> {
        match self {
            Change::Added(entry) => Some(entry),
            Change::Modified { new, .. } => Some(new),
            Change::Deleted(_) => None,
        }
    }

    /// Hash for one side of a printed diff; the zero hash stands in for a
    /// missing side
    pub fn old_oid(&self) -> ObjectId {
        self.old_entry()
            .map(|entry| entry.oid.clone())
            .unwrap_or_else(ObjectId::zero)
    }

    pub fn new_oid(&self) -> ObjectId {
        self.new_entry()
            .map(|entry| entry.oid.clone())
            .unwrap_or_else(ObjectId::zero)
    }
}

/// Ordered set of per-path changes between two flat sides
pub type ChangeSet = Vec<(String, Change)>;

/// Walk both sorted sides in lock-step and classify every path
pub fn diff_flat_trees(old: &FlatTree, new: &FlatTree) -> ChangeSet {
    let mut changes = ChangeSet::new();
    let mut old_iter = old.iter().peekable();
    let mut new_iter = new.iter().peekable();

    loop {
        let (path, old_entry, new_entry) = match (old_iter.peek(), new_iter.peek()) {
            (Some(&(old_path, old_entry)), Some(&(new_path, new_entry))) => {
                match old_path.cmp(new_path) {
                    std::cmp::Ordering::Less => {
                        old_iter.next();
                        (old_path, Some(old_entry), None)
                    }
                    std::cmp::Ordering::Greater => {
                        new_iter.next();
                        (new_path, None, Some(new_entry))
                    }
                    std::cmp::Ordering::Equal => {
                        old_iter.next();
                        new_iter.next();
                        (old_path, Some(old_entry), Some(new_entry))
                    }
                }
            }
            (Some(&(old_path, old_entry)), None) => {
                old_iter.next();
                (old_path, Some(old_entry), None)
            }
            (None, Some(&(new_path, new_entry))) => {
                new_iter.next();
                (new_path, None, Some(new_entry))
            }
            (None, None) => break,
        };

        if let Some(change) = Change::classify(old_entry, new_entry) {
            changes.push((path.clone(), change));
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::entry_mode::FileMode;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn entry(mode: EntryMode, hex_char: &str) -> FlatEntry {
        FlatEntry::new(mode, ObjectId::try_parse(hex_char.repeat(40)).unwrap())
    }

    fn regular(hex_char: &str) -> FlatEntry {
        entry(EntryMode::File(FileMode::Regular), hex_char)
    }

    #[test]
    fn classification_covers_every_pair_shape() {
        let a = regular("a");
        let b = regular("b");

        assert_eq!(Change::classify(None, None), None);
        assert_eq!(Change::classify(Some(&a), Some(&a)), None);
        assert_eq!(
            Change::classify(None, Some(&a)),
            Some(Change::Added(a.clone()))
        );
        assert_eq!(
            Change::classify(Some(&a), None),
            Some(Change::Deleted(a.clone()))
        );
        assert_eq!(
            Change::classify(Some(&a), Some(&b)),
            Some(Change::Modified {
                old: a.clone(),
                new: b.clone()
            })
        );
    }

    #[rstest]
    #[case(Change::Added(regular("a")), 'A')]
    #[case(Change::Deleted(regular("a")), 'D')]
    #[case(Change::Modified { old: regular("a"), new: regular("b") }, 'M')]
    fn status_chars(#[case] change: Change, #[case] expected: char) {
        assert_eq!(change.status_char(), expected);
    }

    #[test]
    fn mode_only_change_is_flagged() {
        let old = entry(EntryMode::File(FileMode::Regular), "a");
        let new = entry(EntryMode::File(FileMode::Executable), "a");

        let change = Change::classify(Some(&old), Some(&new)).unwrap();
        assert!(change.is_mode_only());

        let content_change = Change::classify(Some(&regular("a")), Some(&regular("b"))).unwrap();
        assert!(!content_change.is_mode_only());
    }

    #[test]
    fn lock_step_walk_emits_paths_in_order() {
        let old: FlatTree = [
            ("a.txt".to_string(), regular("a")),
            ("c.txt".to_string(), regular("c")),
            ("d.txt".to_string(), regular("d")),
        ]
        .into();
        let new: FlatTree = [
            ("a.txt".to_string(), regular("a")), // unchanged
            ("b.txt".to_string(), regular("b")), // added
            ("d.txt".to_string(), regular("e")), // modified
        ]
        .into();

        let changes = diff_flat_trees(&old, &new);
        let summary: Vec<(&str, char)> = changes
            .iter()
            .map(|(path, change)| (path.as_str(), change.status_char()))
            .collect();

        assert_eq!(summary, vec![("b.txt", 'A'), ("c.txt", 'D'), ("d.txt", 'M')]);
    }

    #[test]
    fn empty_sides_walk_zero_paths() {
        assert!(diff_flat_trees(&FlatTree::new(), &FlatTree::new()).is_empty());
    }

    #[test]
    fn missing_sides_read_as_zero_hash() {
        let change = Change::Added(regular("a"));
        assert!(change.old_oid().is_zero());
        assert_eq!(change.new_oid(), regular("a").oid);
    }
}
