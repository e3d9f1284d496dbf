use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::blob::Blob;
use anyhow::Context;
use std::path::Path;

impl Repository {
    pub fn add(&self, paths: &[String]) -> anyhow::Result<()> {
        let mut index = self.index();
        index.rehydrate()?;

        let mut files = Vec::new();
        let mut prefixes = Vec::new();
        for path in paths {
            let prefix = self.workspace().relative_prefix(Path::new(path))?;
            if self.workspace().file_exists(&prefix) {
                files.extend(
                    self.workspace()
                        .list_files(Some(Path::new(path)))
                        .context(format!("Unable to list files under {path}"))?,
                );
            } else if !index.is_tracked(&prefix)
                && index.entries_under_path(&prefix).is_empty()
            {
                anyhow::bail!("pathspec '{path}' did not match any files");
            }
            prefixes.push(prefix);
        }

        for file in files {
            let content = self.workspace().read_file(&file)?;
            let stat = self.workspace().stat_file(&file)?;

            let oid = self.database().store(&Blob::new(content))?;
            index.add(IndexEntry::new(file, oid, stat));
        }

        // tracked files that vanished under a named path are staged as
        // deletions
        for prefix in prefixes {
            for tracked in index.entries_under_path(&prefix) {
                if !self.workspace().file_exists(&tracked) {
                    index.remove(&tracked);
                }
            }
        }

        index.write_updates()
    }
}
