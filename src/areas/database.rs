//! Loose-object database
//!
//! Objects are zlib-compressed and stored at `objects/<2hex>/<38hex>`.
//! Writes go through a temporary file renamed into place, so a failed save
//! never leaves a half-written object visible. Content addressing makes
//! stores idempotent: an object that already exists is skipped.

use crate::artifacts::core::GitError;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use anyhow::Context;
use bytes::Bytes;
use std::io::{BufRead, Cursor, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).exists()
    }

    /// Persist an object, returning its hash
    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let object_id = object.object_id()?;
        let object_path = self.path.join(object_id.to_path());

        if !object_path.exists() {
            std::fs::create_dir_all(
                object_path
                    .parent()
                    .context(format!("Invalid object path {}", object_path.display()))?,
            )
            .context(format!(
                "Unable to create object directory {}",
                object_path.display()
            ))?;

            self.write_object(object_path, object.serialize()?)?;
        }

        Ok(object_id)
    }

    /// Read and decompress a stored object's canonical bytes
    pub fn load(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        let object_path = self.path.join(object_id.to_path());

        let object_content = std::fs::read(&object_path).context(format!(
            "Unable to read object file {}",
            object_path.display()
        ))?;

        Self::decompress(object_content.into())
    }

    /// Parse a stored object into its typed representation
    ///
    /// Tags parse as a valid type on the wire but have no typed
    /// representation here.
    pub fn parse_object(&self, object_id: &ObjectId) -> anyhow::Result<ObjectBox> {
        let (object_type, object_reader) = self.read_object_body(object_id)?;

        match object_type {
            ObjectType::Blob => Ok(ObjectBox::Blob(Box::new(Blob::deserialize(object_reader)?))),
            ObjectType::Tree => Ok(ObjectBox::Tree(Box::new(Tree::deserialize(object_reader)?))),
            ObjectType::Commit => Ok(ObjectBox::Commit(Box::new(Commit::deserialize(
                object_reader,
            )?))),
            ObjectType::Tag => Err(GitError::TypeMismatch {
                oid: object_id.to_string(),
                expected: "blob, tree or commit",
                actual: object_type.to_string(),
            }
            .into()),
        }
    }

    pub fn load_blob(&self, object_id: &ObjectId) -> anyhow::Result<Blob> {
        let (object_type, object_reader) = self.read_object_body(object_id)?;

        match object_type {
            ObjectType::Blob => Blob::deserialize(object_reader),
            _ => Err(self.type_mismatch(object_id, "blob", object_type)),
        }
    }

    pub fn load_tree(&self, object_id: &ObjectId) -> anyhow::Result<Tree> {
        let (object_type, object_reader) = self.read_object_body(object_id)?;

        match object_type {
            ObjectType::Tree => Tree::deserialize(object_reader),
            _ => Err(self.type_mismatch(object_id, "tree", object_type)),
        }
    }

    pub fn load_commit(&self, object_id: &ObjectId) -> anyhow::Result<Commit> {
        let (object_type, object_reader) = self.read_object_body(object_id)?;

        match object_type {
            ObjectType::Commit => Commit::deserialize(object_reader),
            _ => Err(self.type_mismatch(object_id, "commit", object_type)),
        }
    }

    /// Resolve any tree-ish to its tree: commits dereference to their tree
    pub fn load_tree_ish(&self, object_id: &ObjectId) -> anyhow::Result<Tree> {
        match self.parse_object(object_id)? {
            ObjectBox::Tree(tree) => Ok(*tree),
            ObjectBox::Commit(commit) => self.load_tree(commit.tree_oid()),
            ObjectBox::Blob(_) => Err(self.type_mismatch(object_id, "tree", ObjectType::Blob)),
        }
    }

    fn type_mismatch(
        &self,
        object_id: &ObjectId,
        expected: &'static str,
        actual: ObjectType,
    ) -> anyhow::Error {
        GitError::TypeMismatch {
            oid: object_id.to_string(),
            expected,
            actual: actual.to_string(),
        }
        .into()
    }

    fn read_object_body(&self, object_id: &ObjectId) -> anyhow::Result<(ObjectType, impl BufRead)> {
        let object_content = self.load(object_id)?;
        let mut object_reader = Cursor::new(object_content);

        let (object_type, _) = ObjectType::parse_header(&mut object_reader)?;

        Ok((object_type, object_reader))
    }

    fn write_object(&self, object_path: PathBuf, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        file.write_all(&object_content).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;

        // expose the finished file atomically
        std::fs::rename(&temp_object_path, &object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    /// zlib-compress; pure, no I/O
    pub fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&data).map_err(|e| GitError::Compression {
            reason: e.to_string(),
        })?;

        encoder
            .finish()
            .map(|compressed| compressed.into())
            .map_err(|e| {
                GitError::Compression {
                    reason: e.to_string(),
                }
                .into()
            })
    }

    /// zlib-decompress; exact inverse of `compress`
    pub fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .map_err(|e| GitError::Compression {
                reason: e.to_string(),
            })?;

        Ok(decompressed.into())
    }

    fn generate_temp_name() -> String {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|elapsed| elapsed.subsec_nanos())
            .unwrap_or_default();
        format!("tmp-obj-{}-{}", std::process::id(), nanos)
    }
}
