//! Memo repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide memo persistence APIs: header CRUD plus body text access.
//!
//! # Invariants
//! - Listings carry header records only; body text is fetched per memo.
//! - `update_memo` uses full replacement semantics for title/info/kind/body.
//! - Listing order is deterministic: `title COLLATE NOCASE ASC, memo_uuid ASC`.

use super::{ensure_catalog_connection_ready, parse_uuid, RepoError, RepoResult};
use crate::model::{FolderId, Memo, MemoId, MemoKind};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

/// Repository interface for memo operations.
pub trait MemoRepository {
    /// Creates one memo with empty body under an optional folder.
    fn create_memo(
        &self,
        folder_uuid: Option<FolderId>,
        title: &str,
        kind: MemoKind,
    ) -> RepoResult<Memo>;
    /// Loads one memo header by id.
    fn get_memo(&self, memo_uuid: MemoId) -> RepoResult<Option<Memo>>;
    /// Loads one memo body text by id.
    fn memo_text(&self, memo_uuid: MemoId) -> RepoResult<Option<String>>;
    /// Replaces title, info, kind and body of one memo.
    fn update_memo(
        &self,
        memo_uuid: MemoId,
        title: &str,
        info: &str,
        kind: MemoKind,
        content: &str,
    ) -> RepoResult<()>;
    /// Moves one memo into an optional folder.
    fn move_memo(&self, memo_uuid: MemoId, new_folder_uuid: Option<FolderId>) -> RepoResult<()>;
    /// Deletes one memo permanently.
    fn delete_memo(&self, memo_uuid: MemoId) -> RepoResult<()>;
    /// Lists memo headers inside an optional folder.
    fn list_memos(&self, folder_uuid: Option<FolderId>) -> RepoResult<Vec<Memo>>;
    /// Lists every memo header in the catalog.
    fn list_all_memos(&self) -> RepoResult<Vec<Memo>>;
    /// Counts all memos in the catalog.
    fn count_memos(&self) -> RepoResult<u64>;
}

/// SQLite-backed memo repository.
#[derive(Debug)]
pub struct SqliteMemoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemoRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_catalog_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

const MEMO_HEADER_COLUMNS: &str =
    "memo_uuid, folder_uuid, title, info, kind, created_at, updated_at";

impl MemoRepository for SqliteMemoRepository<'_> {
    fn create_memo(
        &self,
        folder_uuid: Option<FolderId>,
        title: &str,
        kind: MemoKind,
    ) -> RepoResult<Memo> {
        let memo_uuid = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO memos (memo_uuid, folder_uuid, title, kind)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                memo_uuid.to_string(),
                folder_uuid.map(|value| value.to_string()),
                title,
                kind.as_str(),
            ],
        )?;
        load_required_memo(self.conn, memo_uuid)
    }

    fn get_memo(&self, memo_uuid: MemoId) -> RepoResult<Option<Memo>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MEMO_HEADER_COLUMNS}
             FROM memos
             WHERE memo_uuid = ?1;"
        ))?;
        let mut rows = stmt.query([memo_uuid.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_memo_row(row)?));
        }
        Ok(None)
    }

    fn memo_text(&self, memo_uuid: MemoId) -> RepoResult<Option<String>> {
        let text = self
            .conn
            .query_row(
                "SELECT content FROM memos WHERE memo_uuid = ?1;",
                [memo_uuid.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(text)
    }

    fn update_memo(
        &self,
        memo_uuid: MemoId,
        title: &str,
        info: &str,
        kind: MemoKind,
        content: &str,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE memos
             SET title = ?2,
                 info = ?3,
                 kind = ?4,
                 content = ?5,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE memo_uuid = ?1;",
            params![memo_uuid.to_string(), title, info, kind.as_str(), content],
        )?;
        if changed == 0 {
            return Err(RepoError::MemoNotFound(memo_uuid));
        }
        Ok(())
    }

    fn move_memo(&self, memo_uuid: MemoId, new_folder_uuid: Option<FolderId>) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE memos
             SET folder_uuid = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE memo_uuid = ?1;",
            params![
                memo_uuid.to_string(),
                new_folder_uuid.map(|value| value.to_string()),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::MemoNotFound(memo_uuid));
        }
        Ok(())
    }

    fn delete_memo(&self, memo_uuid: MemoId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM memos WHERE memo_uuid = ?1;",
            [memo_uuid.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::MemoNotFound(memo_uuid));
        }
        Ok(())
    }

    fn list_memos(&self, folder_uuid: Option<FolderId>) -> RepoResult<Vec<Memo>> {
        let sql_with_folder = format!(
            "SELECT {MEMO_HEADER_COLUMNS}
             FROM memos
             WHERE folder_uuid = ?1
             ORDER BY title COLLATE NOCASE ASC, memo_uuid ASC;"
        );
        let sql_root = format!(
            "SELECT {MEMO_HEADER_COLUMNS}
             FROM memos
             WHERE folder_uuid IS NULL
             ORDER BY title COLLATE NOCASE ASC, memo_uuid ASC;"
        );

        let mut stmt = self.conn.prepare(if folder_uuid.is_some() {
            &sql_with_folder
        } else {
            &sql_root
        })?;
        let mut rows = match folder_uuid {
            Some(folder_uuid) => stmt.query([folder_uuid.to_string()])?,
            None => stmt.query([])?,
        };

        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_memo_row(row)?);
        }
        Ok(items)
    }

    fn list_all_memos(&self) -> RepoResult<Vec<Memo>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MEMO_HEADER_COLUMNS}
             FROM memos
             ORDER BY title COLLATE NOCASE ASC, memo_uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_memo_row(row)?);
        }
        Ok(items)
    }

    fn count_memos(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM memos;", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn load_required_memo(conn: &Connection, memo_uuid: MemoId) -> RepoResult<Memo> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MEMO_HEADER_COLUMNS}
         FROM memos
         WHERE memo_uuid = ?1;"
    ))?;
    let mut rows = stmt.query([memo_uuid.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_memo_row(row);
    }
    Err(RepoError::MemoNotFound(memo_uuid))
}

fn parse_memo_row(row: &Row<'_>) -> RepoResult<Memo> {
    let uuid_text: String = row.get("memo_uuid")?;
    let uuid = parse_uuid(&uuid_text, "memos.memo_uuid")?;
    let folder_uuid = row
        .get::<_, Option<String>>("folder_uuid")?
        .map(|value| parse_uuid(&value, "memos.folder_uuid"))
        .transpose()?;

    let kind_text: String = row.get("kind")?;
    let kind = MemoKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid memo kind `{kind_text}` in memos.kind"))
    })?;

    Ok(Memo {
        uuid,
        folder_uuid,
        title: row.get("title")?,
        info: row.get("info")?,
        kind,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
