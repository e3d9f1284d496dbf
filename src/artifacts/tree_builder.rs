//! Segment tree: from a flat index to nested tree objects
//!
//! The index is a flat, sorted path → entry map. Committing needs one tree
//! object per directory, so the flat entries are first grouped into a
//! transient recursive structure keyed by single path segments, then
//! materialized bottom-up into tree objects.
//!
//! Directory keys carry a trailing `/` so that the BTreeMap's byte-wise key
//! order at each level reproduces the index's global full-path order
//! restricted to that level ("foo.txt" sorts before the "foo/" subtree, the
//! same way "foo.txt" sorts before "foo/bar" in the index). Tree hashes stay
//! reproducible because rows are appended straight out of this order.

use crate::artifacts::core::GitError;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::{Tree, TreeEntry};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One node: a staged file or a nested directory
#[derive(Debug, Clone)]
pub enum SegmentNode {
    Leaf(IndexEntry),
    Subtree(SegmentTree),
}

/// Transient recursive structure grouping index entries by path segment
///
/// Built fresh for every write-tree/commit; never persisted itself.
#[derive(Debug, Clone, Default)]
pub struct SegmentTree {
    nodes: BTreeMap<String, SegmentNode>,
}

impl SegmentTree {
    /// Group sorted index entries into a segment tree
    ///
    /// Each entry path is split on `/`; intermediate segments become
    /// subtrees and the final segment becomes a leaf. A segment that is
    /// already taken by the other node kind signals a corrupt index.
    pub fn build<'e>(entries: impl Iterator<Item = &'e IndexEntry>) -> anyhow::Result<Self> {
        let mut root = Self::default();

        for entry in entries {
            root.insert(entry)?;
        }

        Ok(root)
    }

    fn insert(&mut self, entry: &IndexEntry) -> anyhow::Result<()> {
        let mut segments = entry.path.split('/').peekable();
        let mut node = self;

        while let Some(segment) = segments.next() {
            if segment.is_empty() {
                return Err(GitError::ObjectParse {
                    reason: format!("empty path segment in {:?}", entry.path),
                }
                .into());
            }

            if segments.peek().is_none() {
                node.insert_leaf(segment, entry)?;
                break;
            }
            node = SegmentTree::descend(node, segment, entry)?;
        }

        Ok(())
    }

    fn insert_leaf(&mut self, segment: &str, entry: &IndexEntry) -> anyhow::Result<()> {
        if self.nodes.contains_key(&format!("{segment}/")) {
            return Err(collision(segment, entry));
        }

        self.nodes
            .insert(segment.to_string(), SegmentNode::Leaf(entry.clone()));
        Ok(())
    }

    fn descend(&mut self, segment: &str, entry: &IndexEntry) -> anyhow::Result<&mut Self> {
        if self.nodes.contains_key(segment) {
            return Err(collision(segment, entry));
        }

        let key = format!("{segment}/");
        let node = self
            .nodes
            .entry(key)
            .or_insert_with(|| SegmentNode::Subtree(Self::default()));

        match node {
            SegmentNode::Subtree(subtree) => Ok(subtree),
            SegmentNode::Leaf(_) => unreachable!("leaf keys never carry a trailing slash"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&String, &SegmentNode)> {
        self.nodes.iter()
    }

    /// Materialize tree objects bottom-up, handing each finished tree to
    /// `store` before its parent references it
    ///
    /// Returns the root tree's hash, the write-tree result.
    pub fn materialize<F>(&self, store: &F) -> anyhow::Result<ObjectId>
    where
        F: Fn(&Tree) -> anyhow::Result<()>,
    {
        let mut tree = Tree::new();

        for (key, node) in &self.nodes {
            match node {
                SegmentNode::Leaf(entry) => {
                    tree.append(TreeEntry::new(
                        entry.metadata.mode,
                        ObjectType::Blob,
                        entry.oid.clone(),
                        key.clone(),
                    )?);
                }
                SegmentNode::Subtree(subtree) => {
                    let child_oid = subtree.materialize(store)?;
                    tree.append(TreeEntry::new(
                        EntryMode::Directory,
                        ObjectType::Tree,
                        child_oid,
                        key.trim_end_matches('/').to_string(),
                    )?);
                }
            }
        }

        store(&tree)?;
        tree.object_id()
    }
}

fn collision(segment: &str, entry: &IndexEntry) -> anyhow::Error {
    GitError::SegmentCollision {
        segment: segment.to_string(),
        path: PathBuf::from(&entry.path),
    }
    .into()
}
