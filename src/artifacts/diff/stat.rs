//! Per-path diff accumulators and commit/--stat summaries

use crate::artifacts::index::entry_mode::EntryMode;

/// Tri-state file status for one compared path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileStatus {
    #[default]
    Unchanged,
    Added,
    Dropped,
}

/// Per-path accumulator: line counts plus the file-status flag
///
/// Transient, one instance per compared path, discarded after the pass.
#[derive(Debug, Clone, Default)]
pub struct DiffStat {
    pub insertions: usize,
    pub deletions: usize,
    pub status: FileStatus,
}

impl DiffStat {
    pub fn total(&self) -> usize {
        self.insertions + self.deletions
    }

    /// A path counts as changed for commit purposes if it was added,
    /// dropped, or touched any line
    pub fn is_changed(&self) -> bool {
        !matches!(self.status, FileStatus::Unchanged) || self.insertions > 0 || self.deletions > 0
    }
}

/// Aggregated counts across all compared paths
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSummary {
    pub files_changed: usize,
    pub insertions: usize,
    pub deletions: usize,
}

impl DiffSummary {
    pub fn record(&mut self, stat: &DiffStat) {
        if stat.is_changed() {
            self.files_changed += 1;
            self.insertions += stat.insertions;
            self.deletions += stat.deletions;
        }
    }

    /// The one-line commit summary, e.g.
    /// `" 1 files changed, 1 insertions(+), 0 deletions(-)"`
    pub fn display(&self) -> String {
        format!(
            " {} files changed, {} insertions(+), {} deletions(-)",
            self.files_changed, self.insertions, self.deletions
        )
    }
}

/// `create mode` / `delete mode` / `mode change` line for one committed path
pub fn mode_line(path: &str, stat: &DiffStat, old_mode: Option<EntryMode>, new_mode: Option<EntryMode>) -> Option<String> {
    match stat.status {
        FileStatus::Added => {
            new_mode.map(|mode| format!(" create mode {} {}", mode.as_str(), path))
        }
        FileStatus::Dropped => {
            old_mode.map(|mode| format!(" delete mode {} {}", mode.as_str(), path))
        }
        FileStatus::Unchanged => match (old_mode, new_mode) {
            (Some(old), Some(new)) if old != new => Some(format!(
                " mode change {} => {} {}",
                old.as_str(),
                new.as_str(),
                path
            )),
            _ => None,
        },
    }
}

/// Right-aligned `--stat` rows
///
/// Column widths come from the longest path and the widest per-path total
/// among *changed* paths only; unchanged paths never influence alignment.
pub fn format_stat_rows(stats: &[(String, DiffStat)]) -> Vec<String> {
    let changed: Vec<&(String, DiffStat)> =
        stats.iter().filter(|(_, stat)| stat.is_changed()).collect();

    let path_width = changed
        .iter()
        .map(|(path, _)| path.len())
        .max()
        .unwrap_or(0);
    let total_width = changed
        .iter()
        .map(|(_, stat)| stat.total().to_string().len())
        .max()
        .unwrap_or(0);

    changed
        .iter()
        .map(|(path, stat)| {
            format!(
                " {:<path_width$} | {:>total_width$} {}{}",
                path,
                stat.total(),
                "+".repeat(stat.insertions),
                "-".repeat(stat.deletions),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::entry_mode::FileMode;
    use pretty_assertions::assert_eq;

    fn stat(insertions: usize, deletions: usize, status: FileStatus) -> DiffStat {
        DiffStat {
            insertions,
            deletions,
            status,
        }
    }

    #[test]
    fn summary_counts_only_changed_paths() {
        let mut summary = DiffSummary::default();
        summary.record(&stat(1, 0, FileStatus::Added));
        summary.record(&stat(0, 0, FileStatus::Unchanged));
        summary.record(&stat(2, 3, FileStatus::Unchanged));

        assert_eq!(
            summary,
            DiffSummary {
                files_changed: 2,
                insertions: 3,
                deletions: 3,
            }
        );
    }

    #[test]
    fn single_added_file_summary_line() {
        let mut summary = DiffSummary::default();
        summary.record(&stat(1, 0, FileStatus::Added));
        assert_eq!(
            summary.display(),
            " 1 files changed, 1 insertions(+), 0 deletions(-)"
        );
    }

    #[test]
    fn added_and_dropped_paths_get_mode_lines() {
        let created = mode_line(
            "file1",
            &stat(1, 0, FileStatus::Added),
            None,
            Some(EntryMode::File(FileMode::Regular)),
        );
        assert_eq!(created.as_deref(), Some(" create mode 100644 file1"));

        let deleted = mode_line(
            "old.sh",
            &stat(0, 3, FileStatus::Dropped),
            Some(EntryMode::File(FileMode::Executable)),
            None,
        );
        assert_eq!(deleted.as_deref(), Some(" delete mode 100755 old.sh"));
    }

    #[test]
    fn mode_only_change_gets_a_mode_change_line() {
        let line = mode_line(
            "run.sh",
            &stat(0, 0, FileStatus::Unchanged),
            Some(EntryMode::File(FileMode::Regular)),
            Some(EntryMode::File(FileMode::Executable)),
        );
        assert_eq!(
            line.as_deref(),
            Some(" mode change 100644 => 100755 run.sh")
        );
    }

    #[test]
    fn stat_columns_ignore_unchanged_paths() {
        let rows = format_stat_rows(&[
            ("short".to_string(), stat(2, 1, FileStatus::Unchanged)),
            (
                "a/very/long/unchanged/path.rs".to_string(),
                stat(0, 0, FileStatus::Unchanged),
            ),
            ("mid.rs".to_string(), stat(10, 0, FileStatus::Added)),
        ]);

        // widths come from "short"/"mid.rs" and totals 3/10, not from the
        // long unchanged path
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], " short  |  3 ++-");
        assert_eq!(rows[1], " mid.rs | 10 ++++++++++");
    }
}
