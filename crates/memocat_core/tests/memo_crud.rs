use memocat_core::db::open_db_in_memory;
use memocat_core::{
    CatalogService, CatalogServiceError, MemoKind, SqliteFolderRepository, SqliteMemoRepository,
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

#[test]
fn created_memo_has_empty_body_and_info() {
    let conn = setup();
    let service = service(&conn);

    let memo = service.create_memo(None, "Fresh", MemoKind::Shell).unwrap();
    assert_eq!(memo.title, "Fresh");
    assert_eq!(memo.info, "");
    assert_eq!(memo.kind, MemoKind::Shell);
    assert_eq!(memo.folder_uuid, None);

    assert_eq!(service.memo_text(memo.uuid).unwrap(), "");
}

#[test]
fn save_memo_replaces_header_and_body() {
    let conn = setup();
    let service = service(&conn);

    let memo = service.create_memo(None, "Draft", MemoKind::Plain).unwrap();
    let saved = service
        .save_memo(
            memo.uuid,
            "Server notes",
            "production box",
            MemoKind::Shell,
            "$ uptime\n> 12:00 up 3 days\n",
        )
        .unwrap();

    assert_eq!(saved.uuid, memo.uuid);
    assert_eq!(saved.title, "Server notes");
    assert_eq!(saved.info, "production box");
    assert_eq!(saved.kind, MemoKind::Shell);
    assert_eq!(
        service.memo_text(memo.uuid).unwrap(),
        "$ uptime\n> 12:00 up 3 days\n"
    );
}

#[test]
fn save_memo_rejects_unknown_memo_and_blank_title() {
    let conn = setup();
    let service = service(&conn);
    let unknown = Uuid::new_v4();

    let err = service
        .save_memo(unknown, "t", "", MemoKind::Plain, "")
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogServiceError::MemoNotFound(uuid) if uuid == unknown
    ));

    let memo = service.create_memo(None, "Keep", MemoKind::Plain).unwrap();
    let err = service
        .save_memo(memo.uuid, "  ", "", MemoKind::Plain, "")
        .unwrap_err();
    assert!(matches!(err, CatalogServiceError::InvalidTitle));
}

#[test]
fn create_memo_rejects_unknown_folder() {
    let conn = setup();
    let service = service(&conn);
    let unknown = Uuid::new_v4();

    let err = service
        .create_memo(Some(unknown), "x", MemoKind::Plain)
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogServiceError::ParentNotFound(uuid) if uuid == unknown
    ));
}

#[test]
fn move_memo_between_folders_and_to_root() {
    let conn = setup();
    let service = service(&conn);

    let folder = service.create_folder(None, "Folder").unwrap();
    let memo = service.create_memo(None, "memo", MemoKind::Plain).unwrap();

    service.move_memo(memo.uuid, Some(folder.uuid)).unwrap();
    assert_eq!(
        service.get_memo(memo.uuid).unwrap().unwrap().folder_uuid,
        Some(folder.uuid)
    );

    service.move_memo(memo.uuid, None).unwrap();
    assert_eq!(service.get_memo(memo.uuid).unwrap().unwrap().folder_uuid, None);

    let unknown = Uuid::new_v4();
    let err = service.move_memo(memo.uuid, Some(unknown)).unwrap_err();
    assert!(matches!(
        err,
        CatalogServiceError::ParentNotFound(uuid) if uuid == unknown
    ));
}

#[test]
fn delete_memo_is_permanent() {
    let conn = setup();
    let service = service(&conn);

    let memo = service.create_memo(None, "gone", MemoKind::Plain).unwrap();
    assert_eq!(service.count_memos().unwrap(), 1);

    service.delete_memo(memo.uuid).unwrap();
    assert_eq!(service.count_memos().unwrap(), 0);
    assert!(service.get_memo(memo.uuid).unwrap().is_none());

    let err = service.delete_memo(memo.uuid).unwrap_err();
    assert!(matches!(
        err,
        CatalogServiceError::MemoNotFound(uuid) if uuid == memo.uuid
    ));
}

#[test]
fn memo_text_for_unknown_memo_fails() {
    let conn = setup();
    let service = service(&conn);
    let unknown = Uuid::new_v4();

    let err = service.memo_text(unknown).unwrap_err();
    assert!(matches!(
        err,
        CatalogServiceError::MemoNotFound(uuid) if uuid == unknown
    ));
}

#[test]
fn memo_kind_round_trips_through_storage_string() {
    assert_eq!(MemoKind::parse("plain"), Some(MemoKind::Plain));
    assert_eq!(MemoKind::parse("shell"), Some(MemoKind::Shell));
    assert_eq!(MemoKind::parse("wiki"), None);
    assert_eq!(MemoKind::Plain.as_str(), "plain");
    assert_eq!(MemoKind::Shell.as_str(), "shell");
}

#[test]
fn update_bumps_updated_at_only_on_change() {
    let conn = setup();
    let service = service(&conn);

    let memo = service.create_memo(None, "stamp", MemoKind::Plain).unwrap();
    // SQLite timestamps have millisecond resolution via strftime('%s')*1000,
    // which truncates to whole seconds; only ordering is asserted here.
    let saved = service
        .save_memo(memo.uuid, "stamp", "", MemoKind::Plain, "body")
        .unwrap();
    assert!(saved.updated_at >= memo.updated_at);
    assert_eq!(saved.created_at, memo.created_at);
}
