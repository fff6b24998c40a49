//! Core domain logic for the memocat memo catalog.
//! This crate is the single source of truth for catalog invariants.

pub mod catalog;
pub mod db;
pub mod highlight;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod settings;
pub mod tree;

pub use catalog::{Catalog, CatalogError, CatalogResult, SessionState};
pub use highlight::{HighlightStyle, Highlighter, StyleSpec, StyledSpan};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::{Folder, FolderId, Memo, MemoId, MemoKind};
pub use repo::{
    CascadeDelete, FolderRepository, MemoRepository, RepoError, RepoResult,
    SqliteFolderRepository, SqliteMemoRepository,
};
pub use service::{CatalogService, CatalogServiceError, ChildListing};
pub use settings::{AppSettings, MruList, SettingsError, SettingsResult};
pub use tree::{CatalogEvent, NodeId, NodePayload, TreeModel, TreeModelError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
