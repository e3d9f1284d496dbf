//! Command implementations
//!
//! Commands are split into two layers, following git's own architecture:
//!
//! - `plumbing`: low-level object and tree manipulation (hash-object,
//!   cat-file, ls-tree, write-tree)
//! - `porcelain`: user-facing workflows (init, add, commit, diff)
//!
//! Every command is a method on [`crate::areas::repository::Repository`]
//! and writes its output through the repository's injected writer, so the
//! same code paths serve the CLI and the integration tests.

pub mod plumbing;
pub mod porcelain;
