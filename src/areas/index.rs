//! Staging area persistence
//!
//! Holds the sorted path → entry map in memory and reads/writes the binary
//! index file described in `artifacts::index`.
//!
//! ## Load protocol
//!
//! Header first, then entries streamed one at a time against the header's
//! declared count (extra entries fail immediately, missing ones at
//! finalize), then the checksum trailer is verified. Saves serialize the
//! whole file into a temporary sibling and rename it into place, so a
//! failed save never exposes a half-written index.

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::{ENTRY_BLOCK, ENTRY_MIN_SIZE, IndexEntry};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{CHECKSUM_SIZE, EntryLoader, HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// The staging area
///
/// Tracks files staged for the next commit. `entries` is the canonical
/// sorted map; `children` mirrors the directory structure for fast
/// file-vs-directory conflict eviction.
#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.git/index`)
    path: Box<Path>,
    /// Tracked files keyed by repository-relative path
    entries: BTreeMap<String, IndexEntry>,
    /// Directory path → paths of entries underneath it
    children: BTreeMap<String, BTreeSet<String>>,
    /// Header of the file as last loaded/saved
    header: IndexHeader,
    /// Set when in-memory state has diverged from disk
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            children: BTreeMap::new(),
            header: IndexHeader::new(String::from(SIGNATURE), VERSION, 0),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entry_by_path(&self, path: &str) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    pub fn is_tracked(&self, path: &str) -> bool {
        self.entries.contains_key(path) || self.children.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in strict ascending path order
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.children.clear();
        self.header = IndexHeader::empty();
        self.changed = false;
    }

    /// Load the index from disk, verifying entry count and checksum
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.clear();

        if !self.path.exists() {
            return Ok(());
        }

        let file = std::fs::File::open(&self.path)
            .context(format!("Unable to open index file {}", self.path.display()))?;
        let file_len = file.metadata()?.len() as usize;

        // an empty index file is the same as no index file
        if file_len == 0 {
            return Ok(());
        }

        if file_len < HEADER_SIZE + CHECKSUM_SIZE {
            anyhow::bail!("index file {} is truncated", self.path.display());
        }

        let mut reader = Checksum::new(std::io::BufReader::new(file));
        let expected_count = self.parse_header(&mut reader)?;
        let payload_len = file_len - HEADER_SIZE - CHECKSUM_SIZE;
        self.parse_entries(expected_count, payload_len, &mut reader)?;

        reader.verify()
    }

    fn parse_header(
        &self,
        reader: &mut Checksum<impl std::io::Read>,
    ) -> anyhow::Result<u32> {
        let header_bytes = reader.read(HEADER_SIZE)?;
        let header = IndexHeader::deserialize(&header_bytes)?;

        Ok(header.entries_count())
    }

    /// Stream entries against the declared count
    ///
    /// Each entry is at least `ENTRY_MIN_SIZE` bytes and extends in 8-byte
    /// blocks until its NUL padding appears.
    fn parse_entries(
        &mut self,
        expected_count: u32,
        payload_len: usize,
        reader: &mut Checksum<impl std::io::Read>,
    ) -> anyhow::Result<()> {
        let mut loader = EntryLoader::new(expected_count);
        let mut consumed = 0;

        while consumed < payload_len {
            loader.record()?;

            let mut entry_bytes = reader.read(ENTRY_MIN_SIZE)?.to_vec();
            while entry_bytes[entry_bytes.len() - 1] != 0 {
                entry_bytes.extend_from_slice(&reader.read(ENTRY_BLOCK)?);
            }
            consumed += entry_bytes.len();

            let entry = IndexEntry::deserialize(&entry_bytes)?;
            self.store_entry(entry);
        }

        self.header = IndexHeader::new(String::from(SIGNATURE), VERSION, loader.finalize()?);

        Ok(())
    }

    /// Evict entries that conflict with the incoming one: any parent
    /// directory staged as a file, and any children if the incoming path
    /// was previously a directory
    fn discard_conflicts(&mut self, entry: &IndexEntry) {
        let parents: Vec<String> = entry
            .parent_dirs()
            .into_iter()
            .map(str::to_string)
            .collect();
        for parent in parents {
            self.remove_entry(&parent);
        }
        self.remove_children(&entry.path.clone());
    }

    fn store_entry(&mut self, entry: IndexEntry) {
        for parent in entry.parent_dirs() {
            self.children
                .entry(parent.to_string())
                .or_default()
                .insert(entry.path.clone());
        }

        self.entries.insert(entry.path.clone(), entry);
    }

    fn remove_children(&mut self, path: &str) {
        if let Some(children) = self.children.remove(path) {
            for child in children {
                self.remove_entry(&child);
            }
        }
    }

    fn remove_entry(&mut self, path: &str) {
        if let Some(entry) = self.entries.remove(path) {
            for parent in entry.parent_dirs() {
                if let Some(children) = self.children.get_mut(parent) {
                    children.remove(path);
                    if children.is_empty() {
                        self.children.remove(parent);
                    }
                }
            }
        }
    }

    /// Stage an entry, replacing any previous entry at the same path
    pub fn add(&mut self, entry: IndexEntry) {
        self.discard_conflicts(&entry);
        self.store_entry(entry);

        self.changed = true;
    }

    /// Stage a (mode, hash, path) triple with no stat information
    pub fn add_cacheinfo(&mut self, mode: EntryMode, oid: ObjectId, path: String) {
        self.add(IndexEntry::cacheinfo(mode, oid, path));
    }

    pub fn remove(&mut self, path: &str) {
        self.remove_entry(path);
        self.remove_children(path);

        self.changed = true;
    }

    /// Rewrite the index file wholesale: header, entries, checksum trailer
    ///
    /// A no-op when in-memory state still matches disk.
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        if !self.changed {
            return Ok(());
        }

        let temp_path = self.path.with_extension("lock");
        let file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .context(format!("Unable to open index file {}", temp_path.display()))?;

        let mut writer = Checksum::new(file);

        self.header = IndexHeader::new(
            String::from(SIGNATURE),
            VERSION,
            self.entries.len() as u32,
        );
        let header_bytes: Bytes = self.header.serialize()?;
        writer.write(&header_bytes)?;

        for entry in self.entries.values() {
            let entry_bytes = entry.serialize()?;
            writer.write(&entry_bytes)?;
        }

        writer.write_checksum()?;

        std::fs::rename(&temp_path, &self.path).context(format!(
            "Unable to rename index file to {}",
            self.path.display()
        ))?;
        self.changed = false;

        Ok(())
    }

    /// Paths of entries at or under the given path ("." selects all)
    pub fn entries_under_path(&self, path: &str) -> Vec<String> {
        self.entries
            .keys()
            .filter(|entry_path| {
                path == "."
                    || entry_path.as_str() == path
                    || entry_path.starts_with(&format!("{path}/"))
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::core::GitError;
    use crate::artifacts::index::entry_mode::FileMode;
    use pretty_assertions::assert_eq;

    fn oid(hex_char: &str) -> ObjectId {
        ObjectId::try_parse(hex_char.repeat(40)).unwrap()
    }

    fn temp_index() -> (assert_fs::TempDir, Index) {
        let dir = assert_fs::TempDir::new().unwrap();
        let index = Index::new(dir.path().join("index").into_boxed_path());
        (dir, index)
    }

    #[test]
    fn missing_file_rehydrates_to_an_empty_index() {
        let (_dir, mut index) = temp_index();
        index.rehydrate().unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn save_and_rehydrate_round_trips() {
        let (_dir, mut index) = temp_index();
        index.add_cacheinfo(
            EntryMode::File(FileMode::Regular),
            oid("a"),
            "hello.txt".to_string(),
        );
        index.add_cacheinfo(
            EntryMode::File(FileMode::Executable),
            oid("b"),
            "bin/run".to_string(),
        );
        index.write_updates().unwrap();

        let mut reloaded = Index::new(index.path().into());
        reloaded.rehydrate().unwrap();

        let paths: Vec<String> = reloaded.entries().map(|entry| entry.path.clone()).collect();
        assert_eq!(paths, vec!["bin/run", "hello.txt"]);
        assert_eq!(reloaded.entry_by_path("hello.txt").unwrap().oid, oid("a"));
        assert_eq!(
            reloaded.entry_by_path("bin/run").unwrap().metadata.mode,
            EntryMode::File(FileMode::Executable)
        );
    }

    #[test]
    fn unchanged_index_skips_the_disk_write() {
        let (_dir, mut index) = temp_index();
        index.write_updates().unwrap();
        assert!(!index.path().exists());
    }

    #[test]
    fn corrupted_payload_fails_checksum_verification() {
        let (_dir, mut index) = temp_index();
        index.add_cacheinfo(
            EntryMode::File(FileMode::Regular),
            oid("a"),
            "hello.txt".to_string(),
        );
        index.write_updates().unwrap();

        // flip a hash byte: the entry still parses, the digest no longer
        // matches
        let mut content = std::fs::read(index.path()).unwrap();
        content[HEADER_SIZE + 40] ^= 0xFF;
        std::fs::write(index.path(), &content).unwrap();

        let error = index.rehydrate().unwrap_err();
        assert!(matches!(
            error.downcast_ref::<GitError>(),
            Some(GitError::ChecksumMismatch)
        ));
    }

    #[test]
    fn a_file_replacing_a_directory_evicts_its_children() {
        let (_dir, mut index) = temp_index();
        index.add_cacheinfo(
            EntryMode::File(FileMode::Regular),
            oid("a"),
            "nested/a.txt".to_string(),
        );
        index.add_cacheinfo(
            EntryMode::File(FileMode::Regular),
            oid("b"),
            "nested/deep/b.txt".to_string(),
        );
        index.add_cacheinfo(
            EntryMode::File(FileMode::Regular),
            oid("c"),
            "nested".to_string(),
        );

        let paths: Vec<String> = index.entries().map(|entry| entry.path.clone()).collect();
        assert_eq!(paths, vec!["nested"]);
    }

    #[test]
    fn a_directory_replacing_a_file_evicts_the_file() {
        let (_dir, mut index) = temp_index();
        index.add_cacheinfo(
            EntryMode::File(FileMode::Regular),
            oid("a"),
            "nested".to_string(),
        );
        index.add_cacheinfo(
            EntryMode::File(FileMode::Regular),
            oid("b"),
            "nested/a.txt".to_string(),
        );

        let paths: Vec<String> = index.entries().map(|entry| entry.path.clone()).collect();
        assert_eq!(paths, vec!["nested/a.txt"]);
    }

    #[test]
    fn entries_under_path_selects_the_subtree() {
        let (_dir, mut index) = temp_index();
        for path in ["a/one.txt", "a/two.txt", "ab/three.txt", "b.txt"] {
            index.add_cacheinfo(
                EntryMode::File(FileMode::Regular),
                oid("d"),
                path.to_string(),
            );
        }

        assert_eq!(index.entries_under_path("a"), vec!["a/one.txt", "a/two.txt"]);
        assert_eq!(index.entries_under_path("b.txt"), vec!["b.txt"]);
        assert_eq!(index.entries_under_path(".").len(), 4);
    }
}
