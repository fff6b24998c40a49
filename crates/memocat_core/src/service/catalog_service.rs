//! Catalog use-case service.
//!
//! # Responsibility
//! - Validate hierarchy invariants above the repository layer.
//! - Provide folder/memo create, rename, move, delete and listing operations.
//!
//! # Invariants
//! - Parent folder must exist when provided.
//! - Titles are trimmed and must not be blank.
//! - Folder moves must not create parent-child cycles.

use crate::model::{Folder, FolderId, Memo, MemoId, MemoKind};
use crate::repo::{CascadeDelete, FolderRepository, MemoRepository, RepoError};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from catalog service operations.
#[derive(Debug)]
pub enum CatalogServiceError {
    /// Title is blank after trim.
    InvalidTitle,
    /// Target folder does not exist.
    FolderNotFound(FolderId),
    /// Parent folder does not exist.
    ParentNotFound(FolderId),
    /// Target memo does not exist.
    MemoNotFound(MemoId),
    /// Move operation would create a cycle.
    CycleDetected {
        folder_uuid: FolderId,
        parent_uuid: FolderId,
    },
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for CatalogServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle => write!(f, "title must not be blank"),
            Self::FolderNotFound(id) => write!(f, "folder not found: {id}"),
            Self::ParentNotFound(id) => write!(f, "parent folder not found: {id}"),
            Self::MemoNotFound(id) => write!(f, "memo not found: {id}"),
            Self::CycleDetected {
                folder_uuid,
                parent_uuid,
            } => write!(
                f,
                "move would create cycle: folder {folder_uuid} under parent {parent_uuid}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CatalogServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CatalogServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::FolderNotFound(uuid) => Self::FolderNotFound(uuid),
            RepoError::MemoNotFound(uuid) => Self::MemoNotFound(uuid),
            other => Self::Repo(other),
        }
    }
}

/// Children of one folder, grouped the way the tree displays them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildListing {
    /// Child folders, title-sorted.
    pub folders: Vec<Folder>,
    /// Child memos, title-sorted.
    pub memos: Vec<Memo>,
}

/// Catalog service facade over folder and memo repositories.
pub struct CatalogService<F: FolderRepository, M: MemoRepository> {
    folders: F,
    memos: M,
}

impl<F: FolderRepository, M: MemoRepository> CatalogService<F, M> {
    /// Creates a service from repository implementations.
    pub fn new(folders: F, memos: M) -> Self {
        Self { folders, memos }
    }

    /// Creates one folder under an optional parent.
    pub fn create_folder(
        &self,
        parent_uuid: Option<FolderId>,
        title: impl Into<String>,
    ) -> Result<Folder, CatalogServiceError> {
        let normalized = normalize_title(title.into())?;
        if let Some(parent_uuid) = parent_uuid {
            self.ensure_folder_exists(parent_uuid)?;
        }
        self.folders
            .create_folder(parent_uuid, normalized.as_str())
            .map_err(Into::into)
    }

    /// Renames one folder.
    pub fn rename_folder(
        &self,
        folder_uuid: FolderId,
        title: impl Into<String>,
    ) -> Result<(), CatalogServiceError> {
        let normalized = normalize_title(title.into())?;
        self.folders
            .rename_folder(folder_uuid, normalized.as_str())
            .map_err(Into::into)
    }

    /// Moves one folder under an optional new parent.
    pub fn move_folder(
        &self,
        folder_uuid: FolderId,
        new_parent_uuid: Option<FolderId>,
    ) -> Result<(), CatalogServiceError> {
        self.folders
            .get_folder(folder_uuid)?
            .ok_or(CatalogServiceError::FolderNotFound(folder_uuid))?;

        if let Some(parent_uuid) = new_parent_uuid {
            if parent_uuid == folder_uuid {
                return Err(CatalogServiceError::CycleDetected {
                    folder_uuid,
                    parent_uuid,
                });
            }
            self.ensure_folder_exists(parent_uuid)?;
            if self.would_create_cycle(folder_uuid, parent_uuid)? {
                return Err(CatalogServiceError::CycleDetected {
                    folder_uuid,
                    parent_uuid,
                });
            }
        }

        self.folders
            .move_folder(folder_uuid, new_parent_uuid)
            .map_err(Into::into)
    }

    /// Deletes one folder and its whole subtree.
    pub fn delete_folder(
        &self,
        folder_uuid: FolderId,
    ) -> Result<CascadeDelete, CatalogServiceError> {
        self.folders
            .delete_folder_cascade(folder_uuid)
            .map_err(Into::into)
    }

    /// Creates one memo with empty body under an optional folder.
    pub fn create_memo(
        &self,
        folder_uuid: Option<FolderId>,
        title: impl Into<String>,
        kind: MemoKind,
    ) -> Result<Memo, CatalogServiceError> {
        let normalized = normalize_title(title.into())?;
        if let Some(folder_uuid) = folder_uuid {
            self.ensure_folder_exists(folder_uuid)?;
        }
        self.memos
            .create_memo(folder_uuid, normalized.as_str(), kind)
            .map_err(Into::into)
    }

    /// Loads one memo header.
    pub fn get_memo(&self, memo_uuid: MemoId) -> Result<Option<Memo>, CatalogServiceError> {
        self.memos.get_memo(memo_uuid).map_err(Into::into)
    }

    /// Loads one memo body text.
    pub fn memo_text(&self, memo_uuid: MemoId) -> Result<String, CatalogServiceError> {
        self.memos
            .memo_text(memo_uuid)?
            .ok_or(CatalogServiceError::MemoNotFound(memo_uuid))
    }

    /// Replaces title, info, kind and body of one memo, returning the
    /// refreshed header.
    pub fn save_memo(
        &self,
        memo_uuid: MemoId,
        title: impl Into<String>,
        info: impl Into<String>,
        kind: MemoKind,
        content: &str,
    ) -> Result<Memo, CatalogServiceError> {
        let normalized = normalize_title(title.into())?;
        self.memos
            .update_memo(memo_uuid, normalized.as_str(), &info.into(), kind, content)?;
        self.memos
            .get_memo(memo_uuid)?
            .ok_or(CatalogServiceError::MemoNotFound(memo_uuid))
    }

    /// Moves one memo into an optional folder.
    pub fn move_memo(
        &self,
        memo_uuid: MemoId,
        new_folder_uuid: Option<FolderId>,
    ) -> Result<(), CatalogServiceError> {
        if let Some(folder_uuid) = new_folder_uuid {
            self.ensure_folder_exists(folder_uuid)?;
        }
        self.memos
            .move_memo(memo_uuid, new_folder_uuid)
            .map_err(Into::into)
    }

    /// Deletes one memo permanently.
    pub fn delete_memo(&self, memo_uuid: MemoId) -> Result<(), CatalogServiceError> {
        self.memos.delete_memo(memo_uuid).map_err(Into::into)
    }

    /// Lists children of an optional folder, folders before memos.
    pub fn list_children(
        &self,
        folder_uuid: Option<FolderId>,
    ) -> Result<ChildListing, CatalogServiceError> {
        if let Some(folder_uuid) = folder_uuid {
            self.ensure_folder_exists(folder_uuid)?;
        }
        Ok(ChildListing {
            folders: self.folders.list_child_folders(folder_uuid)?,
            memos: self.memos.list_memos(folder_uuid)?,
        })
    }

    /// Loads every folder and memo header for a full tree build.
    pub fn snapshot(&self) -> Result<(Vec<Folder>, Vec<Memo>), CatalogServiceError> {
        Ok((
            self.folders.list_all_folders()?,
            self.memos.list_all_memos()?,
        ))
    }

    /// Counts all memos in the catalog.
    pub fn count_memos(&self) -> Result<u64, CatalogServiceError> {
        self.memos.count_memos().map_err(Into::into)
    }

    fn ensure_folder_exists(&self, folder_uuid: FolderId) -> Result<(), CatalogServiceError> {
        self.folders
            .get_folder(folder_uuid)?
            .ok_or(CatalogServiceError::ParentNotFound(folder_uuid))?;
        Ok(())
    }

    fn would_create_cycle(
        &self,
        folder_uuid: FolderId,
        candidate_parent_uuid: FolderId,
    ) -> Result<bool, CatalogServiceError> {
        let mut visited = HashSet::new();
        let mut cursor = Some(candidate_parent_uuid);
        while let Some(current) = cursor {
            if current == folder_uuid {
                return Ok(true);
            }
            if !visited.insert(current) {
                return Ok(true);
            }

            let folder = self
                .folders
                .get_folder(current)?
                .ok_or(CatalogServiceError::ParentNotFound(current))?;
            cursor = folder.parent_uuid;
        }
        Ok(false)
    }
}

fn normalize_title(value: String) -> Result<String, CatalogServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CatalogServiceError::InvalidTitle);
    }
    Ok(trimmed.to_string())
}
