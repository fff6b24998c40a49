//! In-memory tree model mirroring the catalog store.
//!
//! # Responsibility
//! - Hold an arena of folder/memo nodes for a view layer to render.
//! - Keep the on-screen tree consistent with out-of-band store mutations
//!   through incremental [`TreeModel::apply`] of [`CatalogEvent`] values.
//!
//! # Invariants
//! - Child ordering is deterministic: folders before memos, then
//!   ASCII-case-folded title (SQLite `NOCASE` semantics), then uuid.
//! - Every node reachable from `roots` has a live arena slot, and every
//!   folder/memo uuid appears in exactly one index entry.
//! - `apply` leaves the model identical to a full rebuild from the store,
//!   given the event stream produced by the service layer.

use crate::model::{Folder, FolderId, Memo, MemoId, MemoKind};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Handle to one node in the tree arena.
///
/// Ids stay valid until the node is removed; slots of removed nodes are
/// recycled, so holders must not cache ids across removals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Store mutation notification consumed by [`TreeModel::apply`].
///
/// Produced by callers after a committed service operation, including
/// operations triggered outside the view showing the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    FolderCreated(Folder),
    FolderRenamed {
        folder_uuid: FolderId,
        title: String,
    },
    FolderMoved {
        folder_uuid: FolderId,
        new_parent_uuid: Option<FolderId>,
    },
    FolderRemoved {
        folder_uuid: FolderId,
    },
    MemoCreated(Memo),
    /// Title/kind of one memo changed (body changes do not affect the tree).
    MemoSaved(Memo),
    MemoMoved {
        memo_uuid: MemoId,
        new_folder_uuid: Option<FolderId>,
    },
    MemoRemoved {
        memo_uuid: MemoId,
    },
}

/// Payload of one tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodePayload {
    Folder {
        uuid: FolderId,
        title: String,
    },
    Memo {
        uuid: MemoId,
        title: String,
        kind: MemoKind,
    },
}

impl NodePayload {
    /// Returns the user-facing title.
    pub fn title(&self) -> &str {
        match self {
            Self::Folder { title, .. } => title,
            Self::Memo { title, .. } => title,
        }
    }

    /// Returns whether this node can contain children.
    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder { .. })
    }

    fn uuid(&self) -> Uuid {
        match self {
            Self::Folder { uuid, .. } => *uuid,
            Self::Memo { uuid, .. } => *uuid,
        }
    }
}

/// Errors from tree model construction and synchronization.
#[derive(Debug)]
pub enum TreeModelError {
    /// Referenced folder is not in the model.
    UnknownFolder(FolderId),
    /// Referenced memo is not in the model.
    UnknownMemo(MemoId),
    /// Folder uuid already present in the model.
    DuplicateFolder(FolderId),
    /// Memo uuid already present in the model.
    DuplicateMemo(MemoId),
    /// A row references a parent folder missing from the model.
    OrphanParent { child: Uuid, parent: FolderId },
    /// A folder move event would place a folder inside its own subtree.
    InvalidMove {
        folder_uuid: FolderId,
        parent_uuid: FolderId,
    },
}

impl Display for TreeModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownFolder(id) => write!(f, "unknown folder in tree model: {id}"),
            Self::UnknownMemo(id) => write!(f, "unknown memo in tree model: {id}"),
            Self::DuplicateFolder(id) => write!(f, "duplicate folder in tree model: {id}"),
            Self::DuplicateMemo(id) => write!(f, "duplicate memo in tree model: {id}"),
            Self::OrphanParent { child, parent } => {
                write!(f, "node {child} references missing parent folder {parent}")
            }
            Self::InvalidMove {
                folder_uuid,
                parent_uuid,
            } => write!(
                f,
                "move would place folder {folder_uuid} inside its own subtree under {parent_uuid}"
            ),
        }
    }
}

impl Error for TreeModelError {}

#[derive(Debug)]
struct Node {
    parent: Option<NodeId>,
    payload: NodePayload,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct OrderKey {
    is_memo: bool,
    title_lower: String,
    uuid: Uuid,
}

impl OrderKey {
    fn of(payload: &NodePayload) -> Self {
        Self {
            is_memo: !payload.is_folder(),
            // ASCII folding only, to compare titles exactly like the
            // `COLLATE NOCASE` ordering of the repository listings.
            title_lower: payload.title().to_ascii_lowercase(),
            uuid: payload.uuid(),
        }
    }
}

/// Arena-backed tree of folder and memo nodes.
#[derive(Debug, Default)]
pub struct TreeModel {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    roots: Vec<NodeId>,
    folder_index: HashMap<FolderId, NodeId>,
    memo_index: HashMap<MemoId, NodeId>,
}

impl TreeModel {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a model from a full store snapshot.
    ///
    /// # Errors
    /// - Duplicate uuids and rows referencing missing parents are rejected;
    ///   a catalog file producing them is corrupt.
    pub fn from_store(folders: Vec<Folder>, memos: Vec<Memo>) -> Result<Self, TreeModelError> {
        let mut model = Self::new();

        // Folders may arrive in any order relative to their parents, so the
        // nodes are allocated first and wired to parents in a second pass.
        let mut pending: Vec<(NodeId, Option<FolderId>)> = Vec::new();
        for folder in folders {
            if model.folder_index.contains_key(&folder.uuid) {
                return Err(TreeModelError::DuplicateFolder(folder.uuid));
            }
            let id = model.alloc(Node {
                parent: None,
                payload: NodePayload::Folder {
                    uuid: folder.uuid,
                    title: folder.title,
                },
                children: Vec::new(),
            });
            model.folder_index.insert(folder.uuid, id);
            pending.push((id, folder.parent_uuid));
        }

        for (id, parent_uuid) in pending {
            let parent = model.resolve_parent(id, parent_uuid)?;
            model.attach(id, parent);
        }

        for memo in memos {
            if model.memo_index.contains_key(&memo.uuid) {
                return Err(TreeModelError::DuplicateMemo(memo.uuid));
            }
            let id = model.alloc(Node {
                parent: None,
                payload: NodePayload::Memo {
                    uuid: memo.uuid,
                    title: memo.title,
                    kind: memo.kind,
                },
                children: Vec::new(),
            });
            model.memo_index.insert(memo.uuid, id);
            let parent = model.resolve_parent(id, memo.folder_uuid)?;
            model.attach(id, parent);
        }

        Ok(model)
    }

    /// Returns root-level nodes in display order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Returns children of one node in display order. Memos have none.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.node(id) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    /// Returns the payload of one node, or `None` for a stale id.
    pub fn payload(&self, id: NodeId) -> Option<&NodePayload> {
        self.node(id).map(|node| &node.payload)
    }

    /// Returns the parent of one node. `None` for roots and stale ids.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    /// Looks up the node showing one folder.
    pub fn find_folder(&self, uuid: FolderId) -> Option<NodeId> {
        self.folder_index.get(&uuid).copied()
    }

    /// Looks up the node showing one memo.
    pub fn find_memo(&self, uuid: MemoId) -> Option<NodeId> {
        self.memo_index.get(&uuid).copied()
    }

    /// Returns titles from the root down to the given node.
    pub fn path_titles(&self, id: NodeId) -> Vec<String> {
        let mut titles = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            match self.node(current) {
                Some(node) => {
                    titles.push(node.payload.title().to_string());
                    cursor = node.parent;
                }
                None => break,
            }
        }
        titles.reverse();
        titles
    }

    /// Number of folders in the model.
    pub fn folder_count(&self) -> usize {
        self.folder_index.len()
    }

    /// Number of memos in the model.
    pub fn memo_count(&self) -> usize {
        self.memo_index.len()
    }

    /// Returns whether the model holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Applies one committed store mutation to the in-memory tree.
    pub fn apply(&mut self, event: &CatalogEvent) -> Result<(), TreeModelError> {
        match event {
            CatalogEvent::FolderCreated(folder) => {
                if self.folder_index.contains_key(&folder.uuid) {
                    return Err(TreeModelError::DuplicateFolder(folder.uuid));
                }
                let id = self.alloc(Node {
                    parent: None,
                    payload: NodePayload::Folder {
                        uuid: folder.uuid,
                        title: folder.title.clone(),
                    },
                    children: Vec::new(),
                });
                self.folder_index.insert(folder.uuid, id);
                let parent = self.resolve_parent(id, folder.parent_uuid)?;
                self.attach(id, parent);
                Ok(())
            }
            CatalogEvent::FolderRenamed { folder_uuid, title } => {
                let id = self
                    .find_folder(*folder_uuid)
                    .ok_or(TreeModelError::UnknownFolder(*folder_uuid))?;
                self.retitle(id, title.clone(), None);
                Ok(())
            }
            CatalogEvent::FolderMoved {
                folder_uuid,
                new_parent_uuid,
            } => {
                let id = self
                    .find_folder(*folder_uuid)
                    .ok_or(TreeModelError::UnknownFolder(*folder_uuid))?;
                let parent = self.resolve_parent(id, *new_parent_uuid)?;
                if let (Some(parent_id), Some(parent_uuid)) = (parent, *new_parent_uuid) {
                    if parent_id == id || self.is_descendant_of(parent_id, id) {
                        return Err(TreeModelError::InvalidMove {
                            folder_uuid: *folder_uuid,
                            parent_uuid,
                        });
                    }
                }
                self.detach(id);
                self.attach(id, parent);
                Ok(())
            }
            CatalogEvent::FolderRemoved { folder_uuid } => {
                let id = self
                    .find_folder(*folder_uuid)
                    .ok_or(TreeModelError::UnknownFolder(*folder_uuid))?;
                self.detach(id);
                self.free_subtree(id);
                Ok(())
            }
            CatalogEvent::MemoCreated(memo) => {
                if self.memo_index.contains_key(&memo.uuid) {
                    return Err(TreeModelError::DuplicateMemo(memo.uuid));
                }
                let id = self.alloc(Node {
                    parent: None,
                    payload: NodePayload::Memo {
                        uuid: memo.uuid,
                        title: memo.title.clone(),
                        kind: memo.kind,
                    },
                    children: Vec::new(),
                });
                self.memo_index.insert(memo.uuid, id);
                let parent = self.resolve_parent(id, memo.folder_uuid)?;
                self.attach(id, parent);
                Ok(())
            }
            CatalogEvent::MemoSaved(memo) => {
                let id = self
                    .find_memo(memo.uuid)
                    .ok_or(TreeModelError::UnknownMemo(memo.uuid))?;
                self.retitle(id, memo.title.clone(), Some(memo.kind));
                Ok(())
            }
            CatalogEvent::MemoMoved {
                memo_uuid,
                new_folder_uuid,
            } => {
                let id = self
                    .find_memo(*memo_uuid)
                    .ok_or(TreeModelError::UnknownMemo(*memo_uuid))?;
                let parent = self.resolve_parent(id, *new_folder_uuid)?;
                self.detach(id);
                self.attach(id, parent);
                Ok(())
            }
            CatalogEvent::MemoRemoved { memo_uuid } => {
                let id = self
                    .find_memo(*memo_uuid)
                    .ok_or(TreeModelError::UnknownMemo(*memo_uuid))?;
                self.detach(id);
                self.free_subtree(id);
                Ok(())
            }
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(|slot| slot.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    fn resolve_parent(
        &self,
        child: NodeId,
        parent_uuid: Option<FolderId>,
    ) -> Result<Option<NodeId>, TreeModelError> {
        match parent_uuid {
            None => Ok(None),
            Some(parent_uuid) => {
                let parent = self.find_folder(parent_uuid).ok_or_else(|| {
                    let child_uuid = self
                        .node(child)
                        .map(|node| node.payload.uuid())
                        .unwrap_or_default();
                    TreeModelError::OrphanParent {
                        child: child_uuid,
                        parent: parent_uuid,
                    }
                })?;
                Ok(Some(parent))
            }
        }
    }

    /// Inserts `id` into the sibling list of `parent` at its sorted slot.
    fn attach(&mut self, id: NodeId, parent: Option<NodeId>) {
        let key = match self.node(id) {
            Some(node) => OrderKey::of(&node.payload),
            None => return,
        };
        if let Some(node) = self.node_mut(id) {
            node.parent = parent;
        }

        let position = {
            let siblings = match parent {
                Some(parent_id) => self.children(parent_id),
                None => &self.roots,
            };
            self.sorted_position(siblings, &key)
        };

        match parent {
            Some(parent_id) => {
                if let Some(parent_node) = self.node_mut(parent_id) {
                    parent_node.children.insert(position, id);
                }
            }
            None => self.roots.insert(position, id),
        }
    }

    fn detach(&mut self, id: NodeId) {
        let parent = self.node(id).and_then(|node| node.parent);
        match parent {
            Some(parent_id) => {
                if let Some(parent_node) = self.node_mut(parent_id) {
                    parent_node.children.retain(|child| *child != id);
                }
            }
            None => self.roots.retain(|child| *child != id),
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }
    }

    /// Re-sorts a node among its siblings after a title or kind change.
    fn retitle(&mut self, id: NodeId, title: String, kind: Option<MemoKind>) {
        let parent = self.node(id).and_then(|node| node.parent);
        self.detach(id);
        if let Some(node) = self.node_mut(id) {
            match &mut node.payload {
                NodePayload::Folder { title: current, .. } => *current = title,
                NodePayload::Memo {
                    title: current,
                    kind: current_kind,
                    ..
                } => {
                    *current = title;
                    if let Some(kind) = kind {
                        *current_kind = kind;
                    }
                }
            }
        }
        self.attach(id, parent);
    }

    fn free_subtree(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id.0).and_then(|slot| slot.take()) else {
            return;
        };
        match node.payload {
            NodePayload::Folder { uuid, .. } => {
                self.folder_index.remove(&uuid);
            }
            NodePayload::Memo { uuid, .. } => {
                self.memo_index.remove(&uuid);
            }
        }
        for child in node.children {
            self.free_subtree(child);
        }
        self.free.push(id.0);
    }

    fn is_descendant_of(&self, candidate: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = self.parent(candidate);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    fn sorted_position(&self, siblings: &[NodeId], key: &OrderKey) -> usize {
        siblings
            .iter()
            .position(|sibling| match self.node(*sibling) {
                Some(node) => OrderKey::of(&node.payload) > *key,
                None => false,
            })
            .unwrap_or(siblings.len())
    }
}
