use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::diff::stat::{DiffStat, DiffSummary, FileStatus, format_stat_rows};
use crate::artifacts::diff::{Change, ChangeSet, FlatEntry, FlatTree, myers};
use crate::artifacts::diff::{diff_flat_trees, flatten_index};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Compare the index against the working tree, or HEAD against the
    /// index with `--cached`
    pub fn diff(&self, cached: bool, stat: bool) -> anyhow::Result<()> {
        let mut index = self.index();
        index.rehydrate()?;

        let (old_flat, new_flat) = if cached {
            let head_flat = match self.refs().read_head()? {
                Some(oid) => {
                    let commit = self.database().load_commit(&oid)?;
                    self.flatten_stored_tree(commit.tree_oid())?
                }
                None => FlatTree::new(),
            };
            (head_flat, flatten_index(index.entries()))
        } else {
            (flatten_index(index.entries()), self.flatten_workspace(&index)?)
        };

        let changes = diff_flat_trees(&old_flat, &new_flat);

        if stat {
            self.print_stat(&changes, cached)
        } else {
            for (path, change) in &changes {
                self.print_diff(path, change, cached)?;
            }
            Ok(())
        }
    }

    /// Working-tree side of an unstaged diff, restricted to tracked paths
    ///
    /// Untracked files never show up here; a tracked path missing from
    /// disk reads as a deletion.
    fn flatten_workspace(&self, index: &Index) -> anyhow::Result<FlatTree> {
        let mut flat = FlatTree::new();
        for entry in index.entries() {
            if !self.workspace().file_exists(&entry.path) {
                continue;
            }

            let content = self.workspace().read_file(&entry.path)?;
            let metadata = self.workspace().stat_file(&entry.path)?;

            // stat-match shortcut: reuse the staged hash when size, mode
            // and timestamps are untouched
            let oid = if entry.stat_match(&metadata) && entry.times_match(&metadata) {
                entry.oid.clone()
            } else {
                Blob::new(content).object_id()?
            };

            flat.insert(entry.path.clone(), FlatEntry::new(metadata.mode, oid));
        }
        Ok(flat)
    }

    fn print_stat(&self, changes: &ChangeSet, cached: bool) -> anyhow::Result<()> {
        let mut stats = Vec::new();
        let mut summary = DiffSummary::default();
        for (path, change) in changes {
            let stat = self.diff_side_stat(path, change, cached)?;
            summary.record(&stat);
            stats.push((path.clone(), stat));
        }

        for row in format_stat_rows(&stats) {
            writeln!(self.writer(), "{row}")?;
        }
        if summary.files_changed > 0 {
            writeln!(self.writer(), "{}", summary.display())?;
        }

        Ok(())
    }

    fn diff_side_stat(&self, path: &str, change: &Change, cached: bool) -> anyhow::Result<DiffStat> {
        let old_text = self.stored_text(change.old_entry())?;
        let new_text = self.new_side_text(path, change, cached)?;
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

    /// New-side content: the database for `--cached`, the working tree
    /// otherwise
    fn new_side_text(&self, path: &str, change: &Change, cached: bool) -> anyhow::Result<String> {
        match change.new_entry() {
            None => Ok(String::new()),
            Some(entry) if cached || self.database().exists(&entry.oid) => {
                self.stored_text(Some(entry))
            }
            Some(_) => {
                let content = self.workspace().read_file(path)?;
                Ok(String::from_utf8_lossy(&content).into_owned())
            }
        }
    }

    fn print_diff(&self, path: &str, change: &Change, cached: bool) -> anyhow::Result<()> {
        writeln!(
            self.writer(),
            "{}",
            format!("diff --git a/{path} b/{path}").bold()
        )?;
        self.print_diff_mode(change)?;
        self.print_diff_content(path, change, cached)?;

        Ok(())
    }

    fn print_diff_mode(&self, change: &Change) -> anyhow::Result<()> {
        match change {
            Change::Added(new) => writeln!(
                self.writer(),
                "{}",
                format!("new file mode {}", new.mode.as_str()).bold()
            )?,
            Change::Deleted(old) => writeln!(
                self.writer(),
                "{}",
                format!("deleted file mode {}", old.mode.as_str()).bold()
            )?,
            Change::Modified { old, new } if old.mode != new.mode => {
                writeln!(
                    self.writer(),
                    "{}",
                    format!("old mode {}", old.mode.as_str()).bold()
                )?;
                writeln!(
                    self.writer(),
                    "{}",
                    format!("new mode {}", new.mode.as_str()).bold()
                )?;
            }
            Change::Modified { .. } => {}
        }

        Ok(())
    }

    fn print_diff_content(&self, path: &str, change: &Change, cached: bool) -> anyhow::Result<()> {
        if change.is_mode_only() {
            return Ok(());
        }

        let old_oid = change.old_oid();
        let new_oid = change.new_oid();

        let mut oid_range = format!(
            "index {}..{}",
            old_oid.to_short_oid(),
            new_oid.to_short_oid()
        );
        if let Change::Modified { old, new } = change
            && old.mode == new.mode
        {
            oid_range.push_str(&format!(" {}", old.mode.as_str()));
        }
        writeln!(self.writer(), "{}", oid_range.bold())?;

        let old_label = match change.old_entry() {
            Some(_) => format!("a/{path}"),
            None => "/dev/null".to_string(),
        };
        let new_label = match change.new_entry() {
            Some(_) => format!("b/{path}"),
            None => "/dev/null".to_string(),
        };
        writeln!(self.writer(), "{}", format!("--- {old_label}").bold())?;
        writeln!(self.writer(), "{}", format!("+++ {new_label}").bold())?;

        let old_text = self.stored_text(change.old_entry())?;
        let new_text = self.new_side_text(path, change, cached)?;
        let old_lines: Vec<&str> = old_text.lines().collect();
        let new_lines: Vec<&str> = new_text.lines().collect();

        writeln!(
            self.writer(),
            "{}",
            format!("@@ -1,{} +1,{} @@", old_lines.len(), new_lines.len()).cyan()
        )?;
        for edit in myers::diff(&old_lines, &new_lines) {
            let line = match &edit {
                myers::Edit::Delete { .. } => edit.as_string().red().to_string(),
                myers::Edit::Insert { .. } => edit.as_string().green().to_string(),
                myers::Edit::Equal { .. } => edit.as_string(),
            };
            writeln!(self.writer(), "{line}")?;
        }

        Ok(())
    }
}
