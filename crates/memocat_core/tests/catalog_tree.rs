use memocat_core::db::open_db_in_memory;
use memocat_core::{
    CatalogEvent, CatalogService, CatalogServiceError, MemoKind, RepoError,
    SqliteFolderRepository, SqliteMemoRepository, TreeModel, TreeModelError,
};
use uuid::Uuid;

fn setup() -> rusqlite::Connection {
    open_db_in_memory().unwrap()
}

fn service(
    conn: &rusqlite::Connection,
) -> CatalogService<SqliteFolderRepository<'_>, SqliteMemoRepository<'_>> {
    CatalogService::new(
        SqliteFolderRepository::try_new(conn).unwrap(),
        SqliteMemoRepository::try_new(conn).unwrap(),
    )
}

/// Flattens a tree into (depth, title) pairs in display order.
fn flatten(tree: &TreeModel) -> Vec<(usize, String)> {
    fn walk(tree: &TreeModel, id: memocat_core::NodeId, depth: usize, out: &mut Vec<(usize, String)>) {
        let payload = tree.payload(id).unwrap();
        out.push((depth, payload.title().to_string()));
        for child in tree.children(id) {
            walk(tree, *child, depth + 1, out);
        }
    }
    let mut out = Vec::new();
    for root in tree.roots() {
        walk(tree, *root, 0, &mut out);
    }
    out
}

fn rebuild(
    service: &CatalogService<SqliteFolderRepository<'_>, SqliteMemoRepository<'_>>,
) -> TreeModel {
    let (folders, memos) = service.snapshot().unwrap();
    TreeModel::from_store(folders, memos).unwrap()
}

#[test]
fn children_are_folders_first_then_title_sorted() {
    let conn = setup();
    let service = service(&conn);

    let root = service.create_folder(None, "Root").unwrap();
    service
        .create_memo(Some(root.uuid), "aardvark memo", MemoKind::Plain)
        .unwrap();
    service.create_folder(Some(root.uuid), "zeta").unwrap();
    service.create_folder(Some(root.uuid), "Alpha").unwrap();
    service
        .create_memo(Some(root.uuid), "Zulu memo", MemoKind::Plain)
        .unwrap();

    let listing = service.list_children(Some(root.uuid)).unwrap();
    let folder_titles: Vec<_> = listing.folders.iter().map(|f| f.title.as_str()).collect();
    let memo_titles: Vec<_> = listing.memos.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(folder_titles, vec!["Alpha", "zeta"]);
    assert_eq!(memo_titles, vec!["aardvark memo", "Zulu memo"]);

    let tree = rebuild(&service);
    assert_eq!(
        flatten(&tree),
        vec![
            (0, "Root".to_string()),
            (1, "Alpha".to_string()),
            (1, "zeta".to_string()),
            (1, "aardvark memo".to_string()),
            (1, "Zulu memo".to_string()),
        ]
    );
}

#[test]
fn repo_and_tree_agree_on_non_ascii_title_order() {
    let conn = setup();
    let service = service(&conn);

    // NOCASE folds ASCII only, so accented titles sort by their raw bytes;
    // the tree model must fold titles the same way.
    let root = service.create_folder(None, "Root").unwrap();
    service.create_folder(Some(root.uuid), "äa").unwrap();
    service.create_folder(Some(root.uuid), "Äb").unwrap();
    service.create_folder(Some(root.uuid), "zz").unwrap();

    let listing = service.list_children(Some(root.uuid)).unwrap();
    let listed: Vec<_> = listing.folders.iter().map(|f| f.title.clone()).collect();

    let tree = rebuild(&service);
    let node = tree.find_folder(root.uuid).unwrap();
    let shown: Vec<_> = tree
        .children(node)
        .iter()
        .map(|id| tree.payload(*id).unwrap().title().to_string())
        .collect();

    assert_eq!(listed, shown);
}

#[test]
fn repositories_refuse_unmigrated_connections() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();

    let err = SqliteFolderRepository::try_new(&conn).unwrap_err();
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));

    let err = SqliteMemoRepository::try_new(&conn).unwrap_err();
    assert!(matches!(err, RepoError::UninitializedConnection { .. }));
}

#[test]
fn counts_track_model_contents() {
    let empty = TreeModel::new();
    assert!(empty.is_empty());
    assert_eq!(empty.folder_count(), 0);
    assert_eq!(empty.memo_count(), 0);

    let conn = setup();
    let service = service(&conn);
    service.create_folder(None, "A").unwrap();
    service.create_memo(None, "m", MemoKind::Plain).unwrap();

    let tree = rebuild(&service);
    assert!(!tree.is_empty());
    assert_eq!(tree.folder_count(), 1);
    assert_eq!(tree.memo_count(), 1);
}

#[test]
fn blank_titles_are_rejected() {
    let conn = setup();
    let service = service(&conn);

    let err = service.create_folder(None, "   ").unwrap_err();
    assert!(matches!(err, CatalogServiceError::InvalidTitle));

    let folder = service.create_folder(None, "Keep").unwrap();
    let err = service.rename_folder(folder.uuid, "\t").unwrap_err();
    assert!(matches!(err, CatalogServiceError::InvalidTitle));
}

#[test]
fn titles_are_trimmed_on_create() {
    let conn = setup();
    let service = service(&conn);

    let folder = service.create_folder(None, "  Projects  ").unwrap();
    assert_eq!(folder.title, "Projects");
}

#[test]
fn create_folder_rejects_unknown_parent() {
    let conn = setup();
    let service = service(&conn);
    let unknown = Uuid::new_v4();

    let err = service.create_folder(Some(unknown), "x").unwrap_err();
    assert!(matches!(
        err,
        CatalogServiceError::ParentNotFound(parent) if parent == unknown
    ));
}

#[test]
fn move_rejects_cycles() {
    let conn = setup();
    let service = service(&conn);

    let outer = service.create_folder(None, "Outer").unwrap();
    let inner = service.create_folder(Some(outer.uuid), "Inner").unwrap();

    let err = service.move_folder(outer.uuid, Some(outer.uuid)).unwrap_err();
    assert!(matches!(err, CatalogServiceError::CycleDetected { .. }));

    let err = service.move_folder(outer.uuid, Some(inner.uuid)).unwrap_err();
    assert!(matches!(
        err,
        CatalogServiceError::CycleDetected { folder_uuid, parent_uuid }
            if folder_uuid == outer.uuid && parent_uuid == inner.uuid
    ));
}

#[test]
fn move_folder_reparents() {
    let conn = setup();
    let service = service(&conn);

    let a = service.create_folder(None, "A").unwrap();
    let b = service.create_folder(None, "B").unwrap();
    let child = service.create_folder(Some(a.uuid), "Child").unwrap();

    service.move_folder(child.uuid, Some(b.uuid)).unwrap();

    assert!(service.list_children(Some(a.uuid)).unwrap().folders.is_empty());
    let moved = &service.list_children(Some(b.uuid)).unwrap().folders;
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].uuid, child.uuid);

    // Moving to root.
    service.move_folder(child.uuid, None).unwrap();
    let roots = service.list_children(None).unwrap();
    assert!(roots.folders.iter().any(|f| f.uuid == child.uuid));
}

#[test]
fn delete_folder_cascades_and_reports_counts() {
    let conn = setup();
    let service = service(&conn);

    let target = service.create_folder(None, "Target").unwrap();
    let nested = service.create_folder(Some(target.uuid), "Nested").unwrap();
    service
        .create_memo(Some(target.uuid), "direct", MemoKind::Plain)
        .unwrap();
    service
        .create_memo(Some(nested.uuid), "deep", MemoKind::Shell)
        .unwrap();
    let survivor = service.create_memo(None, "survivor", MemoKind::Plain).unwrap();

    let stats = service.delete_folder(target.uuid).unwrap();
    assert_eq!(stats.folders_removed, 2);
    assert_eq!(stats.memos_removed, 2);

    assert_eq!(service.count_memos().unwrap(), 1);
    let roots = service.list_children(None).unwrap();
    assert!(roots.folders.is_empty());
    assert_eq!(roots.memos.len(), 1);
    assert_eq!(roots.memos[0].uuid, survivor.uuid);

    let err = service.delete_folder(target.uuid).unwrap_err();
    assert!(matches!(
        err,
        CatalogServiceError::FolderNotFound(uuid) if uuid == target.uuid
    ));
}

#[test]
fn tree_model_apply_matches_full_rebuild() {
    let conn = setup();
    let service = service(&conn);
    let mut tree = rebuild(&service);

    let docs = service.create_folder(None, "Docs").unwrap();
    tree.apply(&CatalogEvent::FolderCreated(docs.clone())).unwrap();

    let memo = service
        .create_memo(Some(docs.uuid), "setup notes", MemoKind::Shell)
        .unwrap();
    tree.apply(&CatalogEvent::MemoCreated(memo.clone())).unwrap();

    let archive = service.create_folder(None, "Archive").unwrap();
    tree.apply(&CatalogEvent::FolderCreated(archive.clone())).unwrap();

    service.rename_folder(docs.uuid, "Zz Docs").unwrap();
    tree.apply(&CatalogEvent::FolderRenamed {
        folder_uuid: docs.uuid,
        title: "Zz Docs".to_string(),
    })
    .unwrap();

    service.move_memo(memo.uuid, Some(archive.uuid)).unwrap();
    tree.apply(&CatalogEvent::MemoMoved {
        memo_uuid: memo.uuid,
        new_folder_uuid: Some(archive.uuid),
    })
    .unwrap();

    assert_eq!(flatten(&tree), flatten(&rebuild(&service)));

    service.delete_folder(archive.uuid).unwrap();
    tree.apply(&CatalogEvent::FolderRemoved {
        folder_uuid: archive.uuid,
    })
    .unwrap();

    assert_eq!(flatten(&tree), flatten(&rebuild(&service)));
    assert_eq!(tree.memo_count(), 0);
    assert!(tree.find_memo(memo.uuid).is_none());
}

#[test]
fn tree_model_rename_resorts_siblings() {
    let conn = setup();
    let service = service(&conn);

    let root = service.create_folder(None, "Root").unwrap();
    let alpha = service.create_folder(Some(root.uuid), "alpha").unwrap();
    service.create_folder(Some(root.uuid), "beta").unwrap();

    let mut tree = rebuild(&service);
    service.rename_folder(alpha.uuid, "omega").unwrap();
    tree.apply(&CatalogEvent::FolderRenamed {
        folder_uuid: alpha.uuid,
        title: "omega".to_string(),
    })
    .unwrap();

    assert_eq!(
        flatten(&tree),
        vec![
            (0, "Root".to_string()),
            (1, "beta".to_string()),
            (1, "omega".to_string()),
        ]
    );
}

#[test]
fn tree_model_rejects_event_for_unknown_node() {
    let mut tree = TreeModel::new();
    let unknown = Uuid::new_v4();

    let err = tree
        .apply(&CatalogEvent::FolderRemoved {
            folder_uuid: unknown,
        })
        .unwrap_err();
    assert!(matches!(err, TreeModelError::UnknownFolder(uuid) if uuid == unknown));
}

#[test]
fn tree_model_rejects_move_into_own_subtree() {
    let conn = setup();
    let service = service(&conn);

    let outer = service.create_folder(None, "Outer").unwrap();
    let inner = service.create_folder(Some(outer.uuid), "Inner").unwrap();
    let mut tree = rebuild(&service);

    // The service would refuse this mutation; a buggy event stream must not
    // corrupt the model either.
    let err = tree
        .apply(&CatalogEvent::FolderMoved {
            folder_uuid: outer.uuid,
            new_parent_uuid: Some(inner.uuid),
        })
        .unwrap_err();
    assert!(matches!(err, TreeModelError::InvalidMove { .. }));
}

#[test]
fn path_titles_walks_to_root() {
    let conn = setup();
    let service = service(&conn);

    let top = service.create_folder(None, "Top").unwrap();
    let mid = service.create_folder(Some(top.uuid), "Mid").unwrap();
    let memo = service
        .create_memo(Some(mid.uuid), "leaf", MemoKind::Plain)
        .unwrap();

    let tree = rebuild(&service);
    let node = tree.find_memo(memo.uuid).unwrap();
    assert_eq!(tree.path_titles(node), vec!["Top", "Mid", "leaf"]);
}

#[test]
fn from_store_rejects_orphan_rows() {
    let conn = setup();
    let service = service(&conn);
    let folder = service.create_folder(None, "Folder").unwrap();
    let (mut folders, memos) = service.snapshot().unwrap();

    // Simulate a corrupt file: parent uuid pointing nowhere.
    folders[0].parent_uuid = Some(Uuid::new_v4());
    let err = TreeModel::from_store(folders, memos).unwrap_err();
    assert!(matches!(
        err,
        TreeModelError::OrphanParent { child, .. } if child == folder.uuid
    ));
}
