//! Catalog file facade.
//!
//! # Responsibility
//! - Create/open one catalog file and own its SQLite connection.
//! - Expose repositories, service, full tree loading and memo counting.
//! - Store per-catalog session state in the `session` table.
//!
//! # Invariants
//! - `create` refuses an existing file; `open` refuses a missing file.
//! - Session values are JSON-encoded strings keyed by name.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::{FolderId, MemoId};
use crate::repo::{RepoError, SqliteFolderRepository, SqliteMemoRepository};
use crate::service::{CatalogService, CatalogServiceError};
use crate::tree::{TreeModel, TreeModelError};
use log::info;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::path::{Path, PathBuf};

/// Session key used by [`Catalog::load_session`]/[`Catalog::store_session`].
const SESSION_STATE_KEY: &str = "session";

/// Result type for catalog-level operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors from catalog file operations.
#[derive(Debug)]
pub enum CatalogError {
    /// `create` target already exists on disk.
    FileExists(PathBuf),
    /// `open` target does not exist on disk.
    FileMissing(PathBuf),
    /// Connection/migration failure.
    Db(DbError),
    /// Repository failure.
    Repo(RepoError),
    /// Service failure.
    Service(CatalogServiceError),
    /// Tree build failure (corrupt hierarchy rows).
    Tree(TreeModelError),
    /// Stored session value is not valid JSON for the expected shape.
    InvalidSession(String),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileExists(path) => {
                write!(f, "catalog file already exists: {}", path.display())
            }
            Self::FileMissing(path) => write!(f, "catalog file not found: {}", path.display()),
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Service(err) => write!(f, "{err}"),
            Self::Tree(err) => write!(f, "{err}"),
            Self::InvalidSession(message) => write!(f, "invalid session value: {message}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Service(err) => Some(err),
            Self::Tree(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for CatalogError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for CatalogError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<RepoError> for CatalogError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<CatalogServiceError> for CatalogError {
    fn from(value: CatalogServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<TreeModelError> for CatalogError {
    fn from(value: TreeModelError) -> Self {
        Self::Tree(value)
    }
}

/// Editor session restored when a catalog is reopened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Memos opened in editor windows, in opening order.
    #[serde(default)]
    pub opened_memos: Vec<MemoId>,
    /// Memo focused when the catalog was closed.
    #[serde(default)]
    pub active_memo: Option<MemoId>,
    /// Folders expanded in the tree view.
    #[serde(default)]
    pub expanded_folders: Vec<FolderId>,
}

/// One opened catalog file.
pub struct Catalog {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Debug for Catalog {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl Catalog {
    /// Creates a new catalog file and applies the full schema.
    ///
    /// # Errors
    /// - [`CatalogError::FileExists`] when `path` already exists.
    pub fn create(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref().to_path_buf();
        if path.exists() {
            return Err(CatalogError::FileExists(path));
        }
        let conn = match open_db(&path) {
            Ok(conn) => conn,
            Err(err) => {
                // SQLite creates the file before migrations run; a failed
                // create must not leave a half-initialized catalog behind.
                let _ = std::fs::remove_file(&path);
                return Err(err.into());
            }
        };
        info!(
            "event=catalog_create module=catalog status=ok path={}",
            path.display()
        );
        Ok(Self {
            conn,
            path: Some(path),
        })
    }

    /// Opens an existing catalog file.
    ///
    /// # Errors
    /// - [`CatalogError::FileMissing`] when `path` does not exist.
    /// - [`DbError::UnsupportedSchemaVersion`] when the file was written by a
    ///   newer application version.
    pub fn open(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(CatalogError::FileMissing(path));
        }
        let conn = open_db(&path)?;
        info!(
            "event=catalog_open module=catalog status=ok path={}",
            path.display()
        );
        Ok(Self {
            conn,
            path: Some(path),
        })
    }

    /// Opens a scratch in-memory catalog. Used by tests and previews.
    pub fn open_in_memory() -> CatalogResult<Self> {
        let conn = open_db_in_memory()?;
        Ok(Self { conn, path: None })
    }

    /// Returns the backing file path. `None` for in-memory catalogs.
    pub fn file_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the file name shown in window titles.
    pub fn file_name(&self) -> Option<String> {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
    }

    /// Returns the underlying connection for repository construction.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Builds the catalog service over this connection.
    pub fn service(
        &self,
    ) -> CatalogResult<CatalogService<SqliteFolderRepository<'_>, SqliteMemoRepository<'_>>> {
        let folders = SqliteFolderRepository::try_new(&self.conn)?;
        let memos = SqliteMemoRepository::try_new(&self.conn)?;
        Ok(CatalogService::new(folders, memos))
    }

    /// Loads the full tree model from the store.
    pub fn load_tree(&self) -> CatalogResult<TreeModel> {
        let service = self.service()?;
        let (folders, memos) = service.snapshot()?;
        Ok(TreeModel::from_store(folders, memos)?)
    }

    /// Counts all memos in the catalog.
    pub fn count_memos(&self) -> CatalogResult<u64> {
        let service = self.service()?;
        Ok(service.count_memos()?)
    }

    /// Reads one raw session value.
    pub fn session_value(&self, key: &str) -> CatalogResult<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM session WHERE key = ?1;", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Writes one raw session value, replacing any previous value.
    pub fn store_session_value(&self, key: &str, value: &str) -> CatalogResult<()> {
        self.conn.execute(
            "INSERT INTO session (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
            params![key, value],
        )?;
        Ok(())
    }

    /// Loads the stored editor session, or the default when none was stored.
    pub fn load_session(&self) -> CatalogResult<SessionState> {
        match self.session_value(SESSION_STATE_KEY)? {
            None => Ok(SessionState::default()),
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|err| CatalogError::InvalidSession(err.to_string())),
        }
    }

    /// Stores the editor session for the next open of this file.
    pub fn store_session(&self, session: &SessionState) -> CatalogResult<()> {
        let raw = serde_json::to_string(session)
            .map_err(|err| CatalogError::InvalidSession(err.to_string()))?;
        self.store_session_value(SESSION_STATE_KEY, &raw)
    }

    /// Closes the catalog, reporting any failure to flush the file.
    ///
    /// Dropping a [`Catalog`] closes it too, but swallows errors.
    pub fn close(self) -> CatalogResult<()> {
        let Catalog { conn, path } = self;
        conn.close()
            .map_err(|(_conn, err)| CatalogError::Db(DbError::Sqlite(err)))?;
        if let Some(path) = path {
            info!(
                "event=catalog_close module=catalog status=ok path={}",
                path.display()
            );
        }
        Ok(())
    }
}
