//! Commit object
//!
//! Commits snapshot the repository at a point in time. They record:
//! - A tree object ID (directory snapshot)
//! - An optional parent commit ID
//! - Author and committer signatures
//! - The commit message
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```

use crate::artifacts::core::GitError;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use std::io::{BufRead, Write};

/// Author or committer signature
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Author {
    /// Create a signature stamped with the current local time
    pub fn new(name: String, email: String) -> Self {
        Author {
            name,
            email,
            timestamp: chrono::Local::now().fixed_offset(),
        }
    }

    pub fn new_with_timestamp(
        name: String,
        email: String,
        timestamp: chrono::DateTime<chrono::FixedOffset>,
    ) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    /// Load a signature from `GIT_AUTHOR_NAME`, `GIT_AUTHOR_EMAIL`, and
    /// optionally `GIT_AUTHOR_DATE`.
    pub fn load_from_env() -> anyhow::Result<Self> {
        let name = std::env::var("GIT_AUTHOR_NAME").context("GIT_AUTHOR_NAME not set")?;
        let email = std::env::var("GIT_AUTHOR_EMAIL").context("GIT_AUTHOR_EMAIL not set")?;
        let timestamp = std::env::var("GIT_AUTHOR_DATE").ok().and_then(|date_str| {
            chrono::DateTime::parse_from_rfc2822(&date_str)
                .or_else(|_| chrono::DateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M:%S %z"))
                .ok()
        });

        match timestamp {
            Some(ts) => Ok(Author::new_with_timestamp(name, email, ts)),
            None => Ok(Author::new(name, email)),
        }
    }

    /// `"Name <email> unix_timestamp ±HHMM"`, the on-disk signature form
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.timestamp
    }
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // "name <email> timestamp timezone", split from the right so names
        // may contain spaces
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(GitError::ObjectParse {
                reason: format!("invalid signature {value:?}"),
            }
            .into());
        }

        let timezone = parts[0];
        let timestamp = parts[1]
            .parse::<i64>()
            .map_err(|_| GitError::ObjectParse {
                reason: format!("invalid signature timestamp {:?}", parts[1]),
            })?;
        let name_email = parts[2];

        let email_start = name_email.find('<').ok_or_else(|| GitError::ObjectParse {
            reason: format!("signature missing '<' in {name_email:?}"),
        })?;
        let email_end = name_email.find('>').ok_or_else(|| GitError::ObjectParse {
            reason: format!("signature missing '>' in {name_email:?}"),
        })?;

        let name = name_email[..email_start].trim().to_string();
        let email = name_email[email_start + 1..email_end].to_string();

        let datetime = chrono::DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| GitError::ObjectParse {
                reason: format!("invalid signature timestamp {timestamp}"),
            })?;
        let datetime = chrono::DateTime::parse_from_str(
            &format!("{} {}", datetime.format("%Y-%m-%d %H:%M:%S"), timezone),
            "%Y-%m-%d %H:%M:%S %z",
        )
        .map_err(|_| GitError::ObjectParse {
            reason: format!("invalid signature timezone {timezone:?}"),
        })?;

        Ok(Author {
            name,
            email,
            timestamp: datetime,
        })
    }
}

/// Commit object
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    parent: Option<ObjectId>,
    tree_oid: ObjectId,
    author: Author,
    committer: Author,
    message: String,
}

impl Commit {
    /// Create a commit; the author doubles as the committer
    pub fn new(
        parent: Option<ObjectId>,
        tree_oid: ObjectId,
        author: Author,
        message: String,
    ) -> Self {
        Commit {
            parent,
            tree_oid,
            author: author.clone(),
            committer: author,
            message,
        }
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parent.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// First line of the message, for one-line displays
    pub fn short_message(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }

    pub fn author(&self) -> &Author {
        &self.author
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut content = String::new();
        content.push_str(&format!("tree {}\n", self.tree_oid.as_ref()));
        if let Some(parent) = &self.parent {
            content.push_str(&format!("parent {}\n", parent.as_ref()));
        }
        content.push_str(&format!("author {}\n", self.author.display()));
        content.push_str(&format!("committer {}\n", self.committer.display()));
        content.push('\n');
        content.push_str(&self.message);
        content.push('\n');

        let mut commit_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content.len());
        commit_bytes.write_all(header.as_bytes())?;
        commit_bytes.write_all(content.as_bytes())?;

        Ok(Bytes::from(commit_bytes))
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        // the header has already been read
        let mut tree_oid = None;
        let mut parent = None;
        let mut author = None;
        let mut committer = None;

        let mut lines = reader.lines();
        for line in lines.by_ref() {
            let line = line?;
            if line.is_empty() {
                break; // headers end, message follows
            }

            let (field, value) = line.split_once(' ').ok_or_else(|| GitError::ObjectParse {
                reason: format!("malformed commit header line {line:?}"),
            })?;

            match field {
                "tree" => tree_oid = Some(ObjectId::try_parse(value.to_string())?),
                "parent" => parent = Some(ObjectId::try_parse(value.to_string())?),
                "author" => author = Some(Author::try_from(value)?),
                "committer" => committer = Some(Author::try_from(value)?),
                _ => {
                    return Err(GitError::ObjectParse {
                        reason: format!("unknown commit header field {field:?}"),
                    }
                    .into());
                }
            }
        }

        let message = lines
            .collect::<Result<Vec<_>, _>>()?
            .join("\n")
            .trim_end()
            .to_string();

        let tree_oid = tree_oid.ok_or_else(|| GitError::ObjectParse {
            reason: "commit is missing its tree header".to_string(),
        })?;
        let author = author.ok_or_else(|| GitError::ObjectParse {
            reason: "commit is missing its author header".to_string(),
        })?;
        let committer = committer.unwrap_or_else(|| author.clone());

        Ok(Commit {
            parent,
            tree_oid,
            author,
            committer,
            message,
        })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        let serialized = self.serialize().unwrap_or_default();
        let body_start = serialized
            .iter()
            .position(|&b| b == 0)
            .map(|i| i + 1)
            .unwrap_or(0);
        String::from_utf8_lossy(&serialized[body_start..]).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fixed_author() -> Author {
        Author::new_with_timestamp(
            "Jane Doe".to_string(),
            "jane@example.com".to_string(),
            chrono::DateTime::parse_from_rfc3339("2024-03-01T12:00:00+02:00").unwrap(),
        )
    }

    fn tree_oid() -> ObjectId {
        ObjectId::try_parse("4b825dc642cb6eb9a060e54bf8d69288fbee4904".into()).unwrap()
    }

    #[test]
    fn serializes_root_commit_without_parent_line() {
        let commit = Commit::new(None, tree_oid(), fixed_author(), "initial".to_string());
        let serialized = commit.serialize().unwrap();
        let text = String::from_utf8(serialized.to_vec()).unwrap();

        assert!(text.contains("tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904\n"));
        assert!(!text.contains("parent"));
        assert!(text.contains("author Jane Doe <jane@example.com> 1709287200 +0200\n"));
        assert!(text.ends_with("\ninitial\n"));
    }

    #[test]
    fn round_trips_with_parent_and_multiline_message() {
        let parent =
            ObjectId::try_parse("a94a8fe5ccb19ba61c4c0873d391e987982fbbd3".into()).unwrap();
        let commit = Commit::new(
            Some(parent.clone()),
            tree_oid(),
            fixed_author(),
            "summary line\n\nbody paragraph".to_string(),
        );

        let serialized = commit.serialize().unwrap();
        let mut reader = std::io::Cursor::new(serialized);
        let (object_type, _) = ObjectType::parse_header(&mut reader).unwrap();
        assert_eq!(object_type, ObjectType::Commit);

        let parsed = Commit::deserialize(reader).unwrap();
        assert_eq!(parsed.parent(), Some(&parent));
        assert_eq!(parsed.tree_oid(), commit.tree_oid());
        assert_eq!(parsed.message(), commit.message());
        assert_eq!(parsed.author(), commit.author());
    }

    #[test]
    fn signature_parse_keeps_timezone() {
        let author = Author::try_from("Jane Doe <jane@example.com> 1709287200 +0200").unwrap();
        assert_eq!(
            author.display(),
            "Jane Doe <jane@example.com> 1709287200 +0200"
        );
    }

    #[test]
    fn commit_without_tree_is_rejected() {
        let raw = b"author Jane <j@e.com> 1709287200 +0200\n\nmsg\n";
        let result = Commit::deserialize(std::io::Cursor::new(&raw[..]));
        assert!(result.is_err());
    }
}
