//! Index entry representation
//!
//! Each entry records one tracked file: its repository-relative path, the
//! hash of its staged content, and the stat metadata used for fast change
//! detection.
//!
//! ## Entry Format
//!
//! A fixed 62-byte part (ten big-endian u32 fields, the 20-byte raw
//! hash, and a 16-bit flags field) followed by the path, a NUL
//! terminator, and zero padding to a multiple of 8 bytes.
//!
//! The low 12 bits of the flags field store the path length saturated at
//! 0xFFF. A path that does not fit cannot be serialized at all; the format
//! never truncates paths.

use crate::artifacts::core::GitError;
use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::objects::object_id::ObjectId;
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use is_executable::IsExecutable;
use std::fs::Metadata;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Maximum path length storable in the 12-bit flags field
pub const MAX_PATH_SIZE: usize = 0xFFF;

/// Block size for entry alignment (8 bytes)
pub const ENTRY_BLOCK: usize = 8;

/// Length of the fixed part of an entry, before the path
pub const ENTRY_FIXED_SIZE: usize = 62;

/// Minimum total size of an entry (fixed part + one path byte, padded)
pub const ENTRY_MIN_SIZE: usize = 64;

/// One staged file
///
/// Paths are repository-relative, `/`-separated, normalized strings; the
/// byte-wise ordering of the path is the index's global sort order.
#[derive(Debug, Clone, Default, new)]
pub struct IndexEntry {
    /// Repository-relative path
    pub path: String,
    /// SHA-1 hash of the staged content
    pub oid: ObjectId,
    /// File metadata (mode, size, timestamps)
    pub metadata: EntryMetadata,
}

impl IndexEntry {
    /// Build an entry from a mode, hash, and path alone, with zeroed stat
    /// fields (the `update-index --cacheinfo` shape).
    pub fn cacheinfo(mode: EntryMode, oid: ObjectId, path: String) -> Self {
        IndexEntry {
            path,
            oid,
            metadata: EntryMetadata {
                mode,
                ..EntryMetadata::default()
            },
        }
    }

    /// Final path segment
    pub fn basename(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// All proper directory prefixes, shortest first
    ///
    /// `"a/b/c.txt"` yields `["a", "a/b"]`.
    pub fn parent_dirs(&self) -> Vec<&str> {
        self.path
            .char_indices()
            .filter(|&(_, c)| c == '/')
            .map(|(i, _)| &self.path[..i])
            .collect()
    }

    pub fn stat_match(&self, other: &EntryMetadata) -> bool {
        (self.metadata.size == 0 || self.metadata.size == other.size)
            && self.metadata.mode == other.mode
    }

    pub fn times_match(&self, other: &EntryMetadata) -> bool {
        self.metadata.ctime == other.ctime
            && self.metadata.ctime_nsec == other.ctime_nsec
            && self.metadata.mtime == other.mtime
            && self.metadata.mtime_nsec == other.mtime_nsec
    }

    pub fn serialize(&self) -> anyhow::Result<Bytes> {
        if self.path.len() > MAX_PATH_SIZE {
            return Err(GitError::PathOverflow {
                path: PathBuf::from(&self.path),
            }
            .into());
        }

        let flags = self.path.len().min(MAX_PATH_SIZE) as u16;
        let mode = self.metadata.mode.as_index_mode()?;

        let mut entry_bytes = Vec::new();
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ctime as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ctime_nsec as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime_nsec as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.dev as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ino as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(mode)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.uid)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.gid)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.size as u32)?;
        self.oid.write_raw_to(&mut entry_bytes)?;
        entry_bytes.write_u16::<byteorder::NetworkEndian>(flags)?;
        entry_bytes.write_all(self.path.as_bytes())?;

        // NUL terminator, then zero padding to the 8-byte block boundary
        entry_bytes.push(0);
        while entry_bytes.len() % ENTRY_BLOCK != 0 {
            entry_bytes.push(0);
        }

        Ok(Bytes::from(entry_bytes))
    }

    pub fn deserialize(bytes: &[u8]) -> anyhow::Result<Self> {
        if bytes.len() < ENTRY_MIN_SIZE {
            return Err(GitError::ObjectParse {
                reason: format!("index entry truncated at {} bytes", bytes.len()),
            }
            .into());
        }

        let ctime = byteorder::NetworkEndian::read_u32(&bytes[0..4]) as i64;
        let ctime_nsec = byteorder::NetworkEndian::read_u32(&bytes[4..8]) as i64;
        let mtime = byteorder::NetworkEndian::read_u32(&bytes[8..12]) as i64;
        let mtime_nsec = byteorder::NetworkEndian::read_u32(&bytes[12..16]) as i64;
        let dev = byteorder::NetworkEndian::read_u32(&bytes[16..20]) as u64;
        let ino = byteorder::NetworkEndian::read_u32(&bytes[20..24]) as u64;
        let mode = EntryMode::from_index_mode(byteorder::NetworkEndian::read_u32(&bytes[24..28]))?;
        let uid = byteorder::NetworkEndian::read_u32(&bytes[28..32]);
        let gid = byteorder::NetworkEndian::read_u32(&bytes[32..36]);
        let size = byteorder::NetworkEndian::read_u32(&bytes[36..40]) as u64;
        let mut oid_bytes = &bytes[40..60];
        let oid = ObjectId::read_raw_from(&mut oid_bytes)?;
        let flags = byteorder::NetworkEndian::read_u16(&bytes[60..62]);

        // the path runs to the NUL terminator; the flags length saturates at
        // 0xFFF so it cannot be trusted for long paths
        let path_end = bytes[ENTRY_FIXED_SIZE..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| GitError::ObjectParse {
                reason: "missing NUL terminator after entry path".to_string(),
            })?;
        let path_bytes = &bytes[ENTRY_FIXED_SIZE..ENTRY_FIXED_SIZE + path_end];
        let path = std::str::from_utf8(path_bytes)
            .map_err(|_| GitError::ObjectParse {
                reason: "entry path is not valid UTF-8".to_string(),
            })?
            .to_string();

        if (flags & 0xFFF) as usize != path.len().min(MAX_PATH_SIZE) {
            return Err(GitError::ObjectParse {
                reason: format!("entry flags disagree with path length for {path:?}"),
            }
            .into());
        }

        Ok(IndexEntry {
            path,
            oid,
            metadata: EntryMetadata {
                ctime,
                ctime_nsec,
                mtime,
                mtime_nsec,
                dev,
                ino,
                mode,
                uid,
                gid,
                size,
            },
        })
    }
}

impl PartialEq for IndexEntry {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for IndexEntry {}

impl PartialOrd for IndexEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.path.cmp(&other.path)
    }
}

/// File metadata stored in index entries
///
/// Comparing these fields against a fresh stat answers "did this file
/// change" without reading content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    /// Change time (seconds since Unix epoch)
    pub ctime: i64,
    /// Change time nanoseconds
    pub ctime_nsec: i64,
    /// Modification time (seconds since Unix epoch)
    pub mtime: i64,
    /// Modification time nanoseconds
    pub mtime_nsec: i64,
    /// Device ID
    pub dev: u64,
    /// Inode number
    pub ino: u64,
    /// File mode
    pub mode: EntryMode,
    /// User ID of owner
    pub uid: u32,
    /// Group ID of owner
    pub gid: u32,
    /// File size in bytes
    pub size: u64,
}

impl TryFrom<(&Path, Metadata)> for EntryMetadata {
    type Error = anyhow::Error;

    fn try_from((file_path, metadata): (&Path, Metadata)) -> Result<Self, Self::Error> {
        use std::os::unix::prelude::MetadataExt;

        let mode = if metadata.file_type().is_symlink() {
            EntryMode::Symlink
        } else if file_path.is_executable() {
            EntryMode::File(FileMode::Executable)
        } else {
            EntryMode::File(FileMode::Regular)
        };

        Ok(EntryMetadata {
            ctime: metadata.ctime(),
            ctime_nsec: metadata.ctime_nsec(),
            mtime: metadata.mtime(),
            mtime_nsec: metadata.mtime_nsec(),
            dev: metadata.dev(),
            ino: metadata.ino(),
            mode,
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn entry(path: &str) -> IndexEntry {
        IndexEntry {
            path: path.to_string(),
            oid: ObjectId::try_parse("a94a8fe5ccb19ba61c4c0873d391e987982fbbd3".into()).unwrap(),
            metadata: EntryMetadata {
                ctime: 1_700_000_000,
                ctime_nsec: 12,
                mtime: 1_700_000_001,
                mtime_nsec: 34,
                dev: 66306,
                ino: 4242,
                mode: EntryMode::File(FileMode::Regular),
                uid: 1000,
                gid: 1000,
                size: 11,
            },
        }
    }

    #[rstest]
    #[case("a")] // shortest possible path
    #[case("file1.txt")]
    #[case("deeply/nested/dir/file.rs")]
    fn round_trips_every_field(#[case] path: &str) {
        let original = entry(path);
        let bytes = original.serialize().unwrap();
        assert_eq!(bytes.len() % ENTRY_BLOCK, 0);

        let parsed = IndexEntry::deserialize(&bytes).unwrap();
        assert_eq!(parsed.path, original.path);
        assert_eq!(parsed.oid, original.oid);
        assert_eq!(parsed.metadata, original.metadata);
    }

    #[test]
    fn fixed_part_is_62_bytes_and_big_endian() {
        let bytes = entry("file1.txt").serialize().unwrap();

        assert_eq!(
            byteorder::NetworkEndian::read_u32(&bytes[0..4]),
            1_700_000_000
        );
        // packed mode: regular-file kind in the upper nibble, 0644 permission
        assert_eq!(
            byteorder::NetworkEndian::read_u32(&bytes[24..28]),
            (0b1000 << 12) | 0o644
        );
        // flags: path length in the low 12 bits
        assert_eq!(byteorder::NetworkEndian::read_u16(&bytes[60..62]), 9);
        assert_eq!(&bytes[ENTRY_FIXED_SIZE..ENTRY_FIXED_SIZE + 9], b"file1.txt");
    }

    #[test]
    fn padding_always_reaches_the_next_block() {
        // a 2-byte path lands the fixed part + path + NUL at 65, padded to 72
        let bytes = entry("ab").serialize().unwrap();
        assert_eq!(bytes.len(), 72);
        assert!(bytes[ENTRY_FIXED_SIZE + 2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn oversized_path_fails_to_serialize() {
        let long_path = "d/".repeat(2048) + "f"; // 4097 bytes
        assert!(long_path.len() > MAX_PATH_SIZE);

        let error = entry(&long_path).serialize().unwrap_err();
        assert!(matches!(
            error.downcast_ref::<GitError>(),
            Some(GitError::PathOverflow { .. })
        ));
    }

    #[test]
    fn path_at_the_limit_still_serializes() {
        let path = "x".repeat(MAX_PATH_SIZE);
        let bytes = entry(&path).serialize().unwrap();
        assert_eq!(
            byteorder::NetworkEndian::read_u16(&bytes[60..62]),
            MAX_PATH_SIZE as u16
        );

        let parsed = IndexEntry::deserialize(&bytes).unwrap();
        assert_eq!(parsed.path.len(), MAX_PATH_SIZE);
    }

    #[test]
    fn parent_dirs_lists_proper_prefixes() {
        let entry = entry("a/b/c.txt");
        assert_eq!(entry.parent_dirs(), vec!["a", "a/b"]);
        assert_eq!(entry.basename(), "c.txt");
    }
}
