//! File modes for index entries and tree rows
//!
//! The accepted set is deliberately narrow: regular file, executable file,
//! directory, symlink, and submodule. Conversions to stat modes or object
//! types fail fast on the variants the covered operations never produce,
//! instead of widening the set.

use crate::artifacts::core::GitError;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::anyhow;

/// Permission half of a file mode, restricted to the two blessed values
#[derive(Debug, Clone, Copy, Eq, Ord, Default, PartialEq, PartialOrd)]
pub enum FileMode {
    #[default]
    Regular,
    Executable,
}

#[derive(Debug, Clone, Copy, Eq, Ord, Default, PartialEq, PartialOrd)]
pub enum EntryMode {
    File(FileMode),
    #[default]
    Directory,
    Symlink,
    Submodule,
}

/// Object kind bits packed into the upper 4 bits of an index entry mode
const KIND_REGULAR: u32 = 0b1000;
const KIND_SYMLINK: u32 = 0b1010;
const KIND_GITLINK: u32 = 0b1110;

impl EntryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryMode::File(FileMode::Regular) => "100644",
            EntryMode::File(FileMode::Executable) => "100755",
            EntryMode::Directory => "40000",
            EntryMode::Symlink => "120000",
            EntryMode::Submodule => "160000",
        }
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            EntryMode::File(FileMode::Regular) => 0o100644,
            EntryMode::File(FileMode::Executable) => 0o100755,
            EntryMode::Directory => 0o40000,
            EntryMode::Symlink => 0o120000,
            EntryMode::Submodule => 0o160000,
        }
    }

    /// Pack into the 32-bit mode field of an index entry:
    /// `(object_kind << 12) | (permission & 0x1FF)`, bits 9..12 reserved.
    ///
    /// Directories never appear in the index, so packing one is an error.
    pub fn as_index_mode(&self) -> anyhow::Result<u32> {
        match self {
            EntryMode::File(FileMode::Regular) => Ok((KIND_REGULAR << 12) | 0o644),
            EntryMode::File(FileMode::Executable) => Ok((KIND_REGULAR << 12) | 0o755),
            EntryMode::Symlink => Ok(KIND_SYMLINK << 12),
            EntryMode::Submodule => Ok(KIND_GITLINK << 12),
            EntryMode::Directory => Err(anyhow!("directories cannot be stored in the index")),
        }
    }

    /// Unpack the 32-bit mode field of an index entry
    pub fn from_index_mode(mode: u32) -> anyhow::Result<Self> {
        let kind = (mode >> 12) & 0xF;
        let permission = mode & 0x1FF;

        match (kind, permission) {
            (KIND_REGULAR, 0o644) => Ok(EntryMode::File(FileMode::Regular)),
            (KIND_REGULAR, 0o755) => Ok(EntryMode::File(FileMode::Executable)),
            (KIND_SYMLINK, _) => Ok(EntryMode::Symlink),
            (KIND_GITLINK, _) => Ok(EntryMode::Submodule),
            _ => Err(anyhow!("invalid index entry mode {mode:o}")),
        }
    }

    /// Object type a tree row with this mode points at
    ///
    /// Symlinks and submodules never reach tree construction in the covered
    /// operations, so converting them fails fast rather than guessing.
    pub fn object_type(&self) -> anyhow::Result<ObjectType> {
        match self {
            EntryMode::File(_) => Ok(ObjectType::Blob),
            EntryMode::Directory => Ok(ObjectType::Tree),
            EntryMode::Symlink | EntryMode::Submodule => {
                Err(anyhow!("no object type for entry mode {}", self.as_str()))
            }
        }
    }

    /// Parse an octal mode string from a tree row, zero-padded or not
    pub fn from_octal_str(value: &str) -> anyhow::Result<Self> {
        match value.trim_start_matches('0') {
            "100644" => Ok(EntryMode::File(FileMode::Regular)),
            "100755" => Ok(EntryMode::File(FileMode::Executable)),
            "40000" => Ok(EntryMode::Directory),
            "120000" => Ok(EntryMode::Symlink),
            "160000" => Ok(EntryMode::Submodule),
            _ => Err(GitError::ObjectParse {
                reason: format!("invalid entry mode {value:?}"),
            }
            .into()),
        }
    }
}

impl TryFrom<u32> for EntryMode {
    type Error = anyhow::Error;

    fn try_from(mode: u32) -> anyhow::Result<Self> {
        match mode {
            0o100644 => Ok(EntryMode::File(FileMode::Regular)),
            0o100755 => Ok(EntryMode::File(FileMode::Executable)),
            0o40000 => Ok(EntryMode::Directory),
            0o120000 => Ok(EntryMode::Symlink),
            0o160000 => Ok(EntryMode::Submodule),
            _ => Err(anyhow!("invalid entry mode {mode:o}")),
        }
    }
}

impl From<FileMode> for EntryMode {
    fn from(mode: FileMode) -> Self {
        EntryMode::File(mode)
    }
}

impl TryFrom<EntryMode> for FileMode {
    type Error = anyhow::Error;

    fn try_from(value: EntryMode) -> anyhow::Result<Self> {
        match value {
            EntryMode::File(mode) => Ok(mode),
            _ => Err(anyhow!("entry mode {} is not a file", value.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(EntryMode::File(FileMode::Regular), (0b1000 << 12) | 0o644)]
    #[case(EntryMode::File(FileMode::Executable), (0b1000 << 12) | 0o755)]
    #[case(EntryMode::Symlink, 0b1010 << 12)]
    #[case(EntryMode::Submodule, 0b1110 << 12)]
    fn packs_index_mode(#[case] mode: EntryMode, #[case] packed: u32) {
        assert_eq!(mode.as_index_mode().unwrap(), packed);
        assert_eq!(EntryMode::from_index_mode(packed).unwrap(), mode);
    }

    #[test]
    fn directories_never_pack_into_the_index() {
        assert!(EntryMode::Directory.as_index_mode().is_err());
    }

    #[rstest]
    #[case("100644", EntryMode::File(FileMode::Regular))]
    #[case("100755", EntryMode::File(FileMode::Executable))]
    #[case("040000", EntryMode::Directory)]
    #[case("40000", EntryMode::Directory)]
    #[case("120000", EntryMode::Symlink)]
    #[case("160000", EntryMode::Submodule)]
    fn parses_octal_strings(#[case] raw: &str, #[case] expected: EntryMode) {
        assert_eq!(EntryMode::from_octal_str(raw).unwrap(), expected);
    }

    #[test]
    fn unsupported_conversions_fail_fast() {
        assert!(EntryMode::Symlink.object_type().is_err());
        assert!(EntryMode::Submodule.object_type().is_err());
        assert!(FileMode::try_from(EntryMode::Directory).is_err());
    }
}
