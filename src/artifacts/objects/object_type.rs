use crate::artifacts::core::GitError;
use std::io::BufRead;

/// Object type tag carried in every serialized object header
///
/// `Tag` is a recognized tag on the wire but has no typed representation
/// here; loading one through a typed accessor is a type-mismatch error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
            ObjectType::Tag => "tag",
        }
    }

    /// Parse the canonical header `"{type} {size}\0"` off the front of a
    /// serialized object, leaving the reader positioned at the body.
    ///
    /// Fails if either segment is empty, the type is unknown, or the size is
    /// not a valid non-negative integer.
    pub fn parse_header(reader: &mut impl BufRead) -> anyhow::Result<(ObjectType, usize)> {
        let mut header = Vec::new();
        reader.read_until(b'\0', &mut header)?;

        if header.pop() != Some(b'\0') {
            return Err(GitError::ObjectParse {
                reason: "missing NUL terminator in object header".to_string(),
            }
            .into());
        }

        let header = std::str::from_utf8(&header).map_err(|_| GitError::ObjectParse {
            reason: "object header is not valid UTF-8".to_string(),
        })?;
        let (object_type, size) = header.split_once(' ').ok_or_else(|| GitError::ObjectParse {
            reason: format!("missing space in object header {header:?}"),
        })?;

        if object_type.is_empty() || size.is_empty() {
            return Err(GitError::ObjectParse {
                reason: format!("empty segment in object header {header:?}"),
            }
            .into());
        }

        let object_type = ObjectType::try_from(object_type)?;
        let size = size.parse::<usize>().map_err(|_| GitError::ObjectParse {
            reason: format!("invalid object size {size:?}"),
        })?;

        Ok((object_type, size))
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            "tag" => Ok(ObjectType::Tag),
            _ => Err(GitError::ObjectParse {
                reason: format!("invalid object type {value:?}"),
            }
            .into()),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::io::Cursor;

    #[rstest]
    #[case(b"blob 11\0hello world", ObjectType::Blob, 11)]
    #[case(b"tree 0\0", ObjectType::Tree, 0)]
    #[case(b"commit 5\0abcde", ObjectType::Commit, 5)]
    #[case(b"tag 3\0xyz", ObjectType::Tag, 3)]
    fn parses_valid_headers(
        #[case] raw: &[u8],
        #[case] expected_type: ObjectType,
        #[case] expected_size: usize,
    ) {
        let mut reader = Cursor::new(raw);
        let (object_type, size) = ObjectType::parse_header(&mut reader).unwrap();
        assert_eq!(object_type, expected_type);
        assert_eq!(size, expected_size);
    }

    #[rstest]
    #[case(b"blob 11" as &[u8])] // no NUL
    #[case(b"blob\0")] // no space
    #[case(b" 11\0")] // empty type
    #[case(b"blob \0")] // empty size
    #[case(b"branch 11\0")] // unknown type
    #[case(b"blob -4\0")] // negative size
    #[case(b"blob abc\0")] // non-integer size
    fn rejects_malformed_headers(#[case] raw: &[u8]) {
        let mut reader = Cursor::new(raw);
        let result = ObjectType::parse_header(&mut reader);
        let error = result.unwrap_err();
        assert!(error.downcast_ref::<GitError>().is_some());
    }
}
