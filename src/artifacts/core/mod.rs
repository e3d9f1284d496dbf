pub mod errors;

pub use errors::GitError;
