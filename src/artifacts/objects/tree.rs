//! Tree object
//!
//! Trees snapshot one directory level: a row per file (blob) or
//! subdirectory (tree), each carrying mode, type, hash, and a single path
//! segment as its name.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<rows>`
//! Each row: `<mode:6> <type> <40-hex-sha1>\t<name>\n`
//!
//! Rows are kept in the order they are appended; ordering is the
//! responsibility of the segment-tree materializer, which walks the index
//! in its global sort order.

use crate::artifacts::core::GitError;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::anyhow;
use bytes::Bytes;
use std::io::{BufRead, Write};

/// One row of a tree object
///
/// Only blobs and trees may appear inside a tree; commit and tag rows are
/// rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    mode: EntryMode,
    object_type: ObjectType,
    oid: ObjectId,
    name: String,
}

impl TreeEntry {
    pub fn new(
        mode: EntryMode,
        object_type: ObjectType,
        oid: ObjectId,
        name: String,
    ) -> anyhow::Result<Self> {
        match object_type {
            ObjectType::Blob | ObjectType::Tree => Ok(TreeEntry {
                mode,
                object_type,
                oid,
                name,
            }),
            ObjectType::Commit | ObjectType::Tag => Err(anyhow!(
                "object type {object_type} is not allowed in a tree entry"
            )),
        }
    }

    pub fn mode(&self) -> EntryMode {
        self.mode
    }

    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }

    pub fn oid(&self) -> &ObjectId {
        &self.oid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_tree(&self) -> bool {
        self.object_type == ObjectType::Tree
    }

    fn as_row(&self) -> String {
        format!(
            "{:0>6} {} {}\t{}\n",
            self.mode.as_str(),
            self.object_type.as_str(),
            self.oid.as_ref(),
            self.name
        )
    }

    fn from_row(row: &str) -> anyhow::Result<Self> {
        let (prefix, name) = row.split_once('\t').ok_or_else(|| GitError::ObjectParse {
            reason: format!("missing tab in tree row {row:?}"),
        })?;

        let mut fields = prefix.split(' ');
        let (mode, object_type, oid) = match (fields.next(), fields.next(), fields.next()) {
            (Some(mode), Some(object_type), Some(oid)) if fields.next().is_none() => {
                (mode, object_type, oid)
            }
            _ => {
                return Err(GitError::ObjectParse {
                    reason: format!("malformed tree row {row:?}"),
                }
                .into());
            }
        };

        TreeEntry::new(
            EntryMode::from_octal_str(mode)?,
            ObjectType::try_from(object_type)?,
            ObjectId::try_parse(oid.to_string())?,
            name.to_string(),
        )
    }
}

/// Tree object representing one directory snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new() -> Self {
        Tree::default()
    }

    /// Append a row; callers provide rows already in path order
    pub fn append(&mut self, entry: TreeEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> impl Iterator<Item = TreeEntry> {
        self.entries.into_iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let content: String = self.entries.iter().map(TreeEntry::as_row).collect();

        let mut tree_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content.len());
        tree_bytes.write_all(header.as_bytes())?;
        tree_bytes.write_all(content.as_bytes())?;

        Ok(Bytes::from(tree_bytes))
    }
}

impl Unpackable for Tree {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        // the header has already been read
        let mut entries = Vec::new();

        for row in reader.lines() {
            let row = row?;
            if row.is_empty() {
                continue;
            }
            entries.push(TreeEntry::from_row(&row)?);
        }

        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.entries
            .iter()
            .map(|entry| entry.as_row())
            .collect::<String>()
            .trim_end()
            .to_string()
    }
}
