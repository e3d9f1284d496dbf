//! Repository wiring
//!
//! `RepositoryPaths` is the single place repository-layout paths come
//! from: built once at startup from the chosen root and passed into every
//! component that needs it, never recomputed from ambient process state.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};

/// Repository directory layout, derived from one root path
#[derive(Debug, Clone)]
pub struct RepositoryPaths {
    root: PathBuf,
}

impl RepositoryPaths {
    pub fn new(root: PathBuf) -> Self {
        RepositoryPaths { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn git_dir(&self) -> PathBuf {
        self.root.join(".git")
    }

    pub fn objects_dir(&self) -> PathBuf {
        self.git_dir().join("objects")
    }

    pub fn index_file(&self) -> PathBuf {
        self.git_dir().join("index")
    }
}

pub struct Repository {
    paths: RepositoryPaths,
    writer: RefCell<Box<dyn std::io::Write>>,
    index: RefCell<Index>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    pub fn new(path: &str, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let root = Path::new(path);
        if !root.exists() {
            std::fs::create_dir_all(root)?;
        }
        let paths = RepositoryPaths::new(root.canonicalize()?);

        let index = Index::new(paths.index_file().into_boxed_path());
        let database = Database::new(paths.objects_dir().into_boxed_path());
        let workspace = Workspace::new(paths.root().to_path_buf().into_boxed_path());
        let refs = Refs::new(paths.git_dir().into_boxed_path());

        Ok(Repository {
            paths,
            writer: RefCell::new(writer),
            index: RefCell::new(index),
            database,
            workspace,
            refs,
        })
    }

    pub fn paths(&self) -> &RepositoryPaths {
        &self.paths
    }

    pub fn writer(&self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&self) -> RefMut<'_, Index> {
        self.index.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }
}
