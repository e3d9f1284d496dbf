//! Error taxonomy for the plumbing core
//!
//! Corrupt data and violated invariants map to one of these variants, each
//! carrying the context (path, hash, expected vs actual) the command layer
//! needs to format a precise message. Errors travel through `anyhow` and can
//! be recovered with `downcast_ref` where a caller branches on the kind.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    /// Malformed object header or body encountered while parsing
    #[error("malformed object: {reason}")]
    ObjectParse { reason: String },

    /// A typed accessor was handed an object of a different type
    #[error("object {oid} is a {actual}, expected {expected}")]
    TypeMismatch {
        oid: String,
        expected: &'static str,
        actual: String,
    },

    /// The index file does not start with the expected signature
    #[error("invalid index signature {actual:?}, expected {expected:?}")]
    IndexSignature {
        expected: &'static str,
        actual: String,
    },

    /// The index file uses an unsupported format version
    #[error("unsupported index version {actual}, expected {expected}")]
    IndexVersion { expected: u32, actual: u32 },

    /// More entries are present in the index file than the header declared
    #[error("index declared {expected} entries but more are present")]
    EntryOverflow { expected: u32 },

    /// Fewer entries were read than the header declared (truncated file)
    #[error("index declared {expected} entries but only {loaded} are present")]
    EntryUnderflow { expected: u32, loaded: u32 },

    /// An entry path is too long to be recorded in the on-disk format
    #[error("path {path:?} exceeds the maximum index path length")]
    PathOverflow { path: PathBuf },

    /// The index trailer does not match the recomputed digest
    #[error("index checksum does not match value stored on disk")]
    ChecksumMismatch,

    /// A path segment is used both as a file and as a directory
    #[error("'{segment}' is both a file and a directory (while adding {path:?})")]
    SegmentCollision { segment: String, path: PathBuf },

    /// zlib failed on data we produced ourselves; indicates an internal bug
    #[error("zlib failure: {reason}")]
    Compression { reason: String },
}
