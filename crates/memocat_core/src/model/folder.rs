//! Folder domain model.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another folder.
//! - `parent_uuid == None` means the folder sits at catalog root.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for catalog folders.
pub type FolderId = Uuid;

/// Read model for one folder row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Stable folder id.
    pub uuid: FolderId,
    /// Parent folder id. `None` means root-level folder.
    pub parent_uuid: Option<FolderId>,
    /// User-facing title.
    pub title: String,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}
