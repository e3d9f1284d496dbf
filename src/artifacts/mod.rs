//! Core data structures and algorithms
//!
//! - `core`: Shared utilities (error taxonomy)
//! - `objects`: Object model (blob, tree, commit) and content addressing
//! - `index`: Staging area binary format
//! - `tree_builder`: Segment tree built from the index to materialize trees
//! - `diff`: Tree flattening, lock-step diffing, Myers line diff, stats

pub mod core;
pub mod diff;
pub mod index;
pub mod objects;
pub mod tree_builder;
