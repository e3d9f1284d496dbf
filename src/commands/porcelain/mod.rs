//! Porcelain commands (user-facing workflows)
//!
//! ## Commands
//!
//! - `init`: initialize a new repository
//! - `add`: stage files into the index
//! - `commit`: record the staged tree as a commit
//! - `diff`: compare the index against the working tree or HEAD

pub mod add;
pub mod commit;
pub mod diff;
pub mod init;
