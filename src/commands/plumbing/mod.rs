//! Plumbing commands (low-level object store operations)
//!
//! ## Commands
//!
//! - `hash-object`: compute a blob's hash and optionally store it
//! - `cat-file`: print a stored object
//! - `ls-tree`: list the rows of a tree object
//! - `write-tree`: materialize the staging index as a tree graph

pub mod cat_file;
pub mod hash_object;
pub mod ls_tree;
pub mod write_tree;
