//! Memo domain model.
//!
//! # Responsibility
//! - Define the memo header record used by listings and the tree model.
//! - Define `MemoKind`, which selects the syntax highlighter for a memo.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another memo.
//! - Memo body text is loaded separately from the header record; listings
//!   never carry full content.

use super::folder::FolderId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for catalog memos.
pub type MemoId = Uuid;

/// Memo content dialect.
///
/// The kind decides which highlighting rule set applies to the memo body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoKind {
    /// Unformatted text, no highlighting.
    Plain,
    /// Shell-session markup (commands, outputs, headers, comments).
    Shell,
}

impl MemoKind {
    /// Returns the storage string used in the `memos.kind` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Shell => "shell",
        }
    }

    /// Parses a storage string back into a kind.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "plain" => Some(Self::Plain),
            "shell" => Some(Self::Shell),
            _ => None,
        }
    }
}

/// Read model for one memo row, without body text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memo {
    /// Stable memo id.
    pub uuid: MemoId,
    /// Containing folder id. `None` means root-level memo.
    pub folder_uuid: Option<FolderId>,
    /// User-facing title.
    pub title: String,
    /// Free-form description shown in the info panel.
    pub info: String,
    /// Content dialect.
    pub kind: MemoKind,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}
