use crate::artifacts::core::GitError;
use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::Write;

/// Index file header: signature, format version, entry count
///
/// Signature and version are validated at parse time; a header with the
/// wrong signature or version never leaves `deserialize`.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexHeader {
    pub(crate) marker: String,
    pub(crate) version: u32,
    pub(crate) entries_count: u32,
}

impl IndexHeader {
    pub(crate) fn empty() -> Self {
        IndexHeader {
            marker: String::from(SIGNATURE),
            version: VERSION,
            entries_count: 0,
        }
    }

    pub fn entries_count(&self) -> u32 {
        self.entries_count
    }

    pub fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut bytes = Vec::new();
        bytes.write_all(self.marker.as_bytes())?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.version)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.entries_count)?;

        Ok(Bytes::from(bytes))
    }

    pub fn deserialize(bytes: &[u8]) -> anyhow::Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(GitError::ObjectParse {
                reason: format!("index header truncated at {} bytes", bytes.len()),
            }
            .into());
        }

        let marker = String::from_utf8(bytes[0..4].to_vec()).unwrap_or_default();
        if marker != SIGNATURE {
            return Err(GitError::IndexSignature {
                expected: SIGNATURE,
                actual: marker,
            }
            .into());
        }

        let version = byteorder::NetworkEndian::read_u32(&bytes[4..8]);
        if version != VERSION {
            return Err(GitError::IndexVersion {
                expected: VERSION,
                actual: version,
            }
            .into());
        }

        let entries_count = byteorder::NetworkEndian::read_u32(&bytes[8..12]);

        Ok(IndexHeader {
            marker,
            version,
            entries_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn round_trips() {
        let header = IndexHeader::new(SIGNATURE.to_string(), VERSION, 7);
        let bytes = header.serialize().unwrap();
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(IndexHeader::deserialize(&bytes).unwrap(), header);
    }

    #[test]
    fn rejects_bad_signature() {
        let mut bytes = IndexHeader::empty().serialize().unwrap().to_vec();
        bytes[0..4].copy_from_slice(b"DDDD");

        let error = IndexHeader::deserialize(&bytes).unwrap_err();
        match error.downcast_ref::<GitError>() {
            Some(GitError::IndexSignature { actual, .. }) => assert_eq!(actual, "DDDD"),
            other => panic!("expected IndexSignature, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unsupported_version() {
        let header = IndexHeader::new(SIGNATURE.to_string(), 3, 0);
        let bytes = header.serialize().unwrap();

        let error = IndexHeader::deserialize(&bytes).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<GitError>(),
            Some(GitError::IndexVersion {
                expected: VERSION,
                actual: 3
            })
        ));
    }

    #[test]
    fn rejects_truncated_header() {
        assert!(IndexHeader::deserialize(b"DIRC\0\0").is_err());
    }
}
