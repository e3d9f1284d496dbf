//! Staging area binary format
//!
//! The index file is `header || entries... || SHA-1(header || entries)`:
//! a 12-byte header, a sorted run of variable-length entries, and a
//! self-verifying checksum trailer.

use crate::artifacts::core::GitError;

pub mod checksum;
pub mod entry_mode;
pub mod index_entry;
pub mod index_header;

/// SHA-1 digest length, the size of the checksum trailer
pub const CHECKSUM_SIZE: usize = 20;

/// Header length: 4-byte signature, 4-byte version, 4-byte entry count
pub const HEADER_SIZE: usize = 12;

/// Index file signature
pub const SIGNATURE: &str = "DIRC";

/// The only supported index format version
pub const VERSION: u32 = 2;

/// Streaming entry-count bookkeeper for index loads
///
/// The header promises an entry count before any entry is read; entries are
/// then parsed one by one without buffering the file. Recording more entries
/// than promised fails immediately, and `finalize` catches truncated files
/// that delivered fewer.
#[derive(Debug)]
pub struct EntryLoader {
    expected: u32,
    loaded: u32,
}

impl EntryLoader {
    pub fn new(expected: u32) -> Self {
        EntryLoader {
            expected,
            loaded: 0,
        }
    }

    pub fn record(&mut self) -> anyhow::Result<()> {
        if self.loaded == self.expected {
            return Err(GitError::EntryOverflow {
                expected: self.expected,
            }
            .into());
        }
        self.loaded += 1;
        Ok(())
    }

    pub fn finalize(self) -> anyhow::Result<u32> {
        if self.loaded < self.expected {
            return Err(GitError::EntryUnderflow {
                expected: self.expected,
                loaded: self.loaded,
            }
            .into());
        }
        Ok(self.loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_count_finalizes() {
        let mut loader = EntryLoader::new(2);
        loader.record().unwrap();
        loader.record().unwrap();
        assert_eq!(loader.finalize().unwrap(), 2);
    }

    #[test]
    fn one_entry_too_many_is_an_overflow() {
        let mut loader = EntryLoader::new(1);
        loader.record().unwrap();
        let error = loader.record().unwrap_err();
        assert!(matches!(
            error.downcast_ref::<GitError>(),
            Some(GitError::EntryOverflow { expected: 1 })
        ));
    }

    #[test]
    fn truncated_load_fails_at_finalize() {
        let mut loader = EntryLoader::new(3);
        loader.record().unwrap();
        let error = loader.finalize().unwrap_err();
        assert!(matches!(
            error.downcast_ref::<GitError>(),
            Some(GitError::EntryUnderflow {
                expected: 3,
                loaded: 1
            })
        ));
    }

    #[test]
    fn zero_expected_zero_loaded_is_fine() {
        let loader = EntryLoader::new(0);
        assert_eq!(loader.finalize().unwrap(), 0);
    }
}
