//! Repository abstraction and coordination
//!
//! The `Repository` type is a facade over the collaborating areas the diff
//! core needs: the object database, the index, the working directory, and
//! the ignore/attribute engines. Diff synthesis borrows it immutably; the
//! mutable accessors exist so callers can stage content before diffing.

use crate::areas::attributes::Attributes;
use crate::areas::database::Database;
use crate::areas::ignores::IgnoreContext;
use crate::areas::index::Index;
use crate::areas::workspace::Workspace;
use std::path::Path;

/// Repository facade
///
/// Coordinates the object database, index and workspace for diff operations.
pub struct Repository {
    /// Repository root path
    path: Box<Path>,
    /// Object database
    database: Database,
    /// Index (staging area)
    index: Index,
    /// Working directory
    workspace: Workspace,
}

impl Repository {
    pub fn new(path: &Path) -> anyhow::Result<Self> {
        let path = path.canonicalize()?;
        let workspace = Workspace::new(path.clone().into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            database: Database::new(),
            index: Index::new(),
            workspace,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn database_mut(&mut self) -> &mut Database {
        &mut self.database
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut Index {
        &mut self.index
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Ignore rules in effect for a repository-relative directory
    pub fn ignores_for(&self, dir: &str) -> anyhow::Result<IgnoreContext> {
        IgnoreContext::load_for_path(&self.path, dir)
    }

    /// Attribute rules for the repository
    pub fn attributes(&self) -> anyhow::Result<Attributes> {
        Attributes::load(&self.path)
    }
}
