//! Folder repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide persistence APIs for the folder hierarchy.
//! - Own cascade-delete semantics for folder subtrees.
//!
//! # Invariants
//! - Child listing is deterministic: `title COLLATE NOCASE ASC, folder_uuid ASC`.
//! - Cascade delete removes every descendant folder and memo in one
//!   transaction; the delete is permanent, there is no tombstone state.

use super::{ensure_catalog_connection_ready, parse_uuid, RepoError, RepoResult};
use crate::model::{Folder, FolderId};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

/// Row counts reported by a cascade delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeDelete {
    /// Folders removed, including the target folder itself.
    pub folders_removed: usize,
    /// Memos removed from the deleted subtree.
    pub memos_removed: usize,
}

/// Repository interface for folder operations.
pub trait FolderRepository {
    /// Creates one folder under an optional parent.
    fn create_folder(&self, parent_uuid: Option<FolderId>, title: &str) -> RepoResult<Folder>;
    /// Loads one folder by id.
    fn get_folder(&self, folder_uuid: FolderId) -> RepoResult<Option<Folder>>;
    /// Renames one folder.
    fn rename_folder(&self, folder_uuid: FolderId, title: &str) -> RepoResult<()>;
    /// Re-parents one folder.
    fn move_folder(&self, folder_uuid: FolderId, new_parent_uuid: Option<FolderId>)
        -> RepoResult<()>;
    /// Deletes one folder and its whole subtree, memos included.
    fn delete_folder_cascade(&self, folder_uuid: FolderId) -> RepoResult<CascadeDelete>;
    /// Lists child folders under an optional parent.
    fn list_child_folders(&self, parent_uuid: Option<FolderId>) -> RepoResult<Vec<Folder>>;
    /// Lists every folder in the catalog.
    fn list_all_folders(&self) -> RepoResult<Vec<Folder>>;
}

/// SQLite-backed folder repository.
#[derive(Debug)]
pub struct SqliteFolderRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFolderRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_catalog_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl FolderRepository for SqliteFolderRepository<'_> {
    fn create_folder(&self, parent_uuid: Option<FolderId>, title: &str) -> RepoResult<Folder> {
        let folder_uuid = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO folders (folder_uuid, parent_uuid, title)
             VALUES (?1, ?2, ?3);",
            params![
                folder_uuid.to_string(),
                parent_uuid.map(|value| value.to_string()),
                title,
            ],
        )?;
        load_required_folder(self.conn, folder_uuid)
    }

    fn get_folder(&self, folder_uuid: FolderId) -> RepoResult<Option<Folder>> {
        let mut stmt = self.conn.prepare(
            "SELECT folder_uuid, parent_uuid, title, created_at, updated_at
             FROM folders
             WHERE folder_uuid = ?1;",
        )?;
        let mut rows = stmt.query([folder_uuid.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_folder_row(row)?));
        }
        Ok(None)
    }

    fn rename_folder(&self, folder_uuid: FolderId, title: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE folders
             SET title = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE folder_uuid = ?1;",
            params![folder_uuid.to_string(), title],
        )?;
        if changed == 0 {
            return Err(RepoError::FolderNotFound(folder_uuid));
        }
        Ok(())
    }

    fn move_folder(
        &self,
        folder_uuid: FolderId,
        new_parent_uuid: Option<FolderId>,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE folders
             SET parent_uuid = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE folder_uuid = ?1;",
            params![
                folder_uuid.to_string(),
                new_parent_uuid.map(|value| value.to_string()),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::FolderNotFound(folder_uuid));
        }
        Ok(())
    }

    fn delete_folder_cascade(&self, folder_uuid: FolderId) -> RepoResult<CascadeDelete> {
        if self.get_folder(folder_uuid)?.is_none() {
            return Err(RepoError::FolderNotFound(folder_uuid));
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let memos_removed = tx.execute(
            "WITH RECURSIVE subtree(folder_uuid) AS (
                SELECT folder_uuid
                FROM folders
                WHERE folder_uuid = ?1
                UNION ALL
                SELECT child.folder_uuid
                FROM folders child
                INNER JOIN subtree parent ON child.parent_uuid = parent.folder_uuid
            )
            DELETE FROM memos
            WHERE folder_uuid IN (SELECT folder_uuid FROM subtree);",
            [folder_uuid.to_string()],
        )?;

        // Children must go before their parents to satisfy the self-referencing
        // foreign key, so collect the subtree and delete leaf-first.
        let mut subtree_ids = collect_subtree_ids(&tx, folder_uuid)?;
        subtree_ids.reverse();
        let mut folders_removed = 0;
        for id in subtree_ids {
            folders_removed += tx.execute(
                "DELETE FROM folders WHERE folder_uuid = ?1;",
                [id.to_string()],
            )?;
        }

        tx.commit()?;
        Ok(CascadeDelete {
            folders_removed,
            memos_removed,
        })
    }

    fn list_child_folders(&self, parent_uuid: Option<FolderId>) -> RepoResult<Vec<Folder>> {
        let sql_with_parent = "SELECT folder_uuid, parent_uuid, title, created_at, updated_at
             FROM folders
             WHERE parent_uuid = ?1
             ORDER BY title COLLATE NOCASE ASC, folder_uuid ASC;";
        let sql_root = "SELECT folder_uuid, parent_uuid, title, created_at, updated_at
             FROM folders
             WHERE parent_uuid IS NULL
             ORDER BY title COLLATE NOCASE ASC, folder_uuid ASC;";

        let mut stmt = self.conn.prepare(if parent_uuid.is_some() {
            sql_with_parent
        } else {
            sql_root
        })?;
        let mut rows = match parent_uuid {
            Some(parent_uuid) => stmt.query([parent_uuid.to_string()])?,
            None => stmt.query([])?,
        };

        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_folder_row(row)?);
        }
        Ok(items)
    }

    fn list_all_folders(&self) -> RepoResult<Vec<Folder>> {
        let mut stmt = self.conn.prepare(
            "SELECT folder_uuid, parent_uuid, title, created_at, updated_at
             FROM folders
             ORDER BY title COLLATE NOCASE ASC, folder_uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_folder_row(row)?);
        }
        Ok(items)
    }
}

/// Returns the subtree folder ids in breadth-first order, target first.
fn collect_subtree_ids(conn: &Connection, folder_uuid: FolderId) -> RepoResult<Vec<FolderId>> {
    let mut stmt = conn.prepare(
        "WITH RECURSIVE subtree(folder_uuid, depth) AS (
            SELECT folder_uuid, 0
            FROM folders
            WHERE folder_uuid = ?1
            UNION ALL
            SELECT child.folder_uuid, parent.depth + 1
            FROM folders child
            INNER JOIN subtree parent ON child.parent_uuid = parent.folder_uuid
        )
        SELECT folder_uuid
        FROM subtree
        ORDER BY depth ASC, folder_uuid ASC;",
    )?;
    let mut rows = stmt.query([folder_uuid.to_string()])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        ids.push(parse_uuid(&value, "folders.folder_uuid")?);
    }
    Ok(ids)
}

fn load_required_folder(conn: &Connection, folder_uuid: FolderId) -> RepoResult<Folder> {
    let mut stmt = conn.prepare(
        "SELECT folder_uuid, parent_uuid, title, created_at, updated_at
         FROM folders
         WHERE folder_uuid = ?1;",
    )?;
    let mut rows = stmt.query([folder_uuid.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_folder_row(row);
    }
    Err(RepoError::FolderNotFound(folder_uuid))
}

fn parse_folder_row(row: &Row<'_>) -> RepoResult<Folder> {
    let uuid_text: String = row.get("folder_uuid")?;
    let uuid = parse_uuid(&uuid_text, "folders.folder_uuid")?;
    let parent_uuid = row
        .get::<_, Option<String>>("parent_uuid")?
        .map(|value| parse_uuid(&value, "folders.parent_uuid"))
        .transpose()?;

    Ok(Folder {
        uuid,
        parent_uuid,
        title: row.get("title")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
