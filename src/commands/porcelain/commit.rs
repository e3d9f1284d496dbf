use crate::areas::repository::Repository;
use crate::artifacts::diff::stat::{DiffStat, DiffSummary, FileStatus, mode_line};
use crate::artifacts::diff::{Change, FlatEntry, FlatTree, myers};
use crate::artifacts::diff::{diff_flat_trees, flatten_index, flatten_tree};
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::tree_builder::SegmentTree;
use std::io::Write;

impl Repository {
    /// Record the staged tree as a commit; returns false when the index
    /// matches HEAD and nothing is committed
    pub fn commit(&self, message: &str) -> anyhow::Result<bool> {
        let mut index = self.index();
        index.rehydrate()?;

        let parent = self.refs().read_head()?;
        let head_flat = match &parent {
            Some(oid) => {
                let commit = self.database().load_commit(oid)?;
                self.flatten_stored_tree(commit.tree_oid())?
            }
            None => FlatTree::new(),
        };
        let index_flat = flatten_index(index.entries());
        let changes = diff_flat_trees(&head_flat, &index_flat);

        if changes.is_empty() {
            writeln!(self.writer(), "nothing to commit, working tree clean")?;
            return Ok(false);
        }

        let segment_tree = SegmentTree::build(index.entries())?;
        let tree_oid = segment_tree.materialize(&|tree| {
            self.database().store(tree)?;
            Ok(())
        })?;

        let author = Author::load_from_env()?;
        let commit = Commit::new(
            parent.clone(),
            tree_oid,
            author,
            message.trim().to_string(),
        );
        let commit_oid = self.database().store(&commit)?;
        self.refs().update_head(&commit_oid)?;

        let root_marker = if parent.is_none() { "(root-commit) " } else { "" };
        writeln!(
            self.writer(),
            "[{root_marker}{}] {}",
            commit_oid.to_short_oid(),
            commit.short_message()
        )?;

        let mut summary = DiffSummary::default();
        let mut mode_lines = Vec::new();
        for (path, change) in &changes {
            let stat = self.change_stat(change)?;
            summary.record(&stat);
            if let Some(line) = mode_line(
                path,
                &stat,
                change.old_entry().map(|entry| entry.mode),
                change.new_entry().map(|entry| entry.mode),
            ) {
                mode_lines.push(line);
            }
        }
        writeln!(self.writer(), "{}", summary.display())?;
        for line in mode_lines {
            writeln!(self.writer(), "{line}")?;
        }

        Ok(true)
    }

    pub(crate) fn flatten_stored_tree(&self, root: &ObjectId) -> anyhow::Result<FlatTree> {
        flatten_tree(&|oid| self.database().load_tree(oid), root)
    }

    /// Line counts and status for one committed change; both sides come
    /// from the object database
    fn change_stat(&self, change: &Change) -> anyhow::Result<DiffStat> {
        let old_text = self.stored_text(change.old_entry())?;
        let new_text = self.stored_text(change.new_entry())?;
        let (insertions, deletions) = myers::line_diff_counts(&old_text, &new_text);

        let status = match change {
            Change::Added(_) => FileStatus::Added,
            Change::Deleted(_) => FileStatus::Dropped,
            Change::Modified { .. } => FileStatus::Unchanged,
        };

        Ok(DiffStat {
            insertions,
            deletions,
            status,
        })
    }

    pub(crate) fn stored_text(&self, entry: Option<&FlatEntry>) -> anyhow::Result<String> {
        match entry {
            None => Ok(String::new()),
            Some(entry) => {
                let blob = self.database().load_blob(&entry.oid)?;
                Ok(String::from_utf8_lossy(blob.content()).into_owned())
            }
        }
    }
}
