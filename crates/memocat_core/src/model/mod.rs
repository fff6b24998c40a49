//! Domain models shared by repositories, services and the tree model.

pub mod folder;
pub mod memo;

pub use folder::{Folder, FolderId};
pub use memo::{Memo, MemoId, MemoKind};
