//! Storage collaborators around the core
//!
//! - `repository`: path configuration and component wiring
//! - `database`: loose-object store (zlib-compressed, content-addressed)
//! - `index`: staging area persistence
//! - `refs`: HEAD and branch reference files
//! - `workspace`: working tree access (stat, read, list)

pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
