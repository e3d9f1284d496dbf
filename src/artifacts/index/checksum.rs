//! Digest-tracking reader/writer for the index file
//!
//! Every byte read or written through this wrapper feeds a running SHA-1.
//! On save the digest becomes the trailer; on load `verify` recomputes it
//! and compares against the stored trailer.

use crate::artifacts::core::GitError;
use crate::artifacts::index::CHECKSUM_SIZE;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::{Read, Write};

#[derive(Debug)]
pub struct Checksum<T> {
    inner: T,
    digest: Sha1,
}

impl<T> Checksum<T> {
    pub fn new(inner: T) -> Self {
        Checksum {
            inner,
            digest: Sha1::new(),
        }
    }
}

impl<T: Read> Checksum<T> {
    pub fn read(&mut self, size: usize) -> anyhow::Result<Bytes> {
        let mut buffer = vec![0; size];
        self.inner
            .read_exact(&mut buffer)
            .map_err(|_| GitError::ObjectParse {
                reason: "unexpected end-of-file while reading index".to_string(),
            })?;

        self.digest.update(&buffer);
        Ok(Bytes::from(buffer))
    }

    /// Read the 20-byte trailer and compare it against the running digest
    pub fn verify(&mut self) -> anyhow::Result<()> {
        let mut expected = [0u8; CHECKSUM_SIZE];
        self.inner
            .read_exact(&mut expected)
            .map_err(|_| GitError::ObjectParse {
                reason: "index file is missing its checksum trailer".to_string(),
            })?;

        let actual = self.digest.clone().finalize();
        if expected != actual.as_slice() {
            return Err(GitError::ChecksumMismatch.into());
        }

        Ok(())
    }
}

impl<T: Write> Checksum<T> {
    pub fn write(&mut self, data: &[u8]) -> anyhow::Result<()> {
        self.inner.write_all(data)?;
        self.digest.update(data);
        Ok(())
    }

    pub fn write_checksum(&mut self) -> anyhow::Result<()> {
        let checksum = self.digest.clone().finalize();
        self.inner.write_all(checksum.as_slice())?;

        Ok(())
    }
}
