//! References: HEAD and branch files
//!
//! References are text files holding either a 40-character hash (direct)
//! or `ref: <path>` (symbolic). HEAD normally points at a branch under
//! `refs/heads/`; a HEAD holding a bare hash is detached.

use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use derive_new::new;
use std::path::{Path, PathBuf};

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

/// Prefix marking a symbolic reference
const SYMREF_PREFIX: &str = "ref: ";

/// Default branch a fresh repository's HEAD points at
pub const DEFAULT_BRANCH_REF: &str = "refs/heads/master";

/// Reference file content: symbolic pointer or direct object ID
#[derive(Debug, Clone)]
enum SymRefOrOid {
    SymRef(String),
    Oid(ObjectId),
}

impl SymRefOrOid {
    fn read_from(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }

        match content.strip_prefix(SYMREF_PREFIX) {
            Some(target) => Ok(Some(SymRefOrOid::SymRef(target.to_string()))),
            None => Ok(Some(SymRefOrOid::Oid(ObjectId::try_parse(
                content.to_string(),
            )?))),
        }
    }
}

/// Reference store rooted at the `.git` directory
#[derive(Debug, new)]
pub struct Refs {
    path: Box<Path>,
}

impl Refs {
    fn head_path(&self) -> PathBuf {
        self.path.join(HEAD_REF_NAME)
    }

    /// Point a fresh repository's HEAD at the default branch
    pub fn init_head(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(self.path.join("refs").join("heads"))?;
        std::fs::write(
            self.head_path(),
            format!("{SYMREF_PREFIX}{DEFAULT_BRANCH_REF}\n"),
        )
        .context("Unable to initialize HEAD")
    }

    /// Resolve HEAD to a commit hash, following one level of symref
    ///
    /// Returns None before the first commit.
    pub fn read_head(&self) -> anyhow::Result<Option<ObjectId>> {
        match SymRefOrOid::read_from(&self.head_path())? {
            None => Ok(None),
            Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
            Some(SymRefOrOid::SymRef(target)) => self.read_ref(&target),
        }
    }

    /// Whether HEAD holds a bare hash instead of a branch pointer
    pub fn is_head_detached(&self) -> anyhow::Result<bool> {
        Ok(matches!(
            SymRefOrOid::read_from(&self.head_path())?,
            Some(SymRefOrOid::Oid(_))
        ))
    }

    /// Advance HEAD: through its symref when attached, in place when
    /// detached
    pub fn update_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        match SymRefOrOid::read_from(&self.head_path())? {
            Some(SymRefOrOid::SymRef(target)) => self.update_ref(&target, oid),
            _ => self.write_ref_file(&self.head_path(), oid),
        }
    }

    /// Read a reference by its path relative to `.git` (e.g.
    /// `refs/heads/master`)
    pub fn read_ref(&self, name: &str) -> anyhow::Result<Option<ObjectId>> {
        match SymRefOrOid::read_from(&self.path.join(name))? {
            None => Ok(None),
            Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
            Some(SymRefOrOid::SymRef(target)) => self.read_ref(&target),
        }
    }

    pub fn update_ref(&self, name: &str, oid: &ObjectId) -> anyhow::Result<()> {
        self.write_ref_file(&self.path.join(name), oid)
    }

    fn write_ref_file(&self, path: &Path, oid: &ObjectId) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, format!("{oid}\n"))
            .context(format!("Unable to write ref {}", path.display()))
    }
}
