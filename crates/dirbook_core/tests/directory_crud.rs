use dirbook_core::db::open_db_in_memory;
use dirbook_core::{
    Address, DirectoryDraft, DirectoryRepository, DirectoryService, DirectoryValidationError,
    RepoError, SqliteDirectoryRepository,
};
use rusqlite::Connection;

fn draft(name: &str, phone: &str, city: &str) -> DirectoryDraft {
    DirectoryDraft {
        name: name.to_string(),
        phone_number: phone.to_string(),
        address: Address {
            city: city.to_string(),
            ..Address::default()
        },
    }
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn create_and_get_roundtrip() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDirectoryRepository::try_new(&mut conn).unwrap();

    let created = repo.create_directory(&draft("Ada", "555", "London")).unwrap();
    assert!(created.id > 0);
    assert_eq!(created.created_at, created.updated_at);

    let loaded = repo.get_directory(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.address.city, "London");
    assert_eq!(loaded.address.state, "");
}

#[test]
fn create_without_address_leaves_no_address_row() {
    let mut conn = open_db_in_memory().unwrap();
    let created = {
        let mut repo = SqliteDirectoryRepository::try_new(&mut conn).unwrap();
        repo.create_directory(&DirectoryDraft {
            name: "Grace".to_string(),
            ..DirectoryDraft::default()
        })
        .unwrap()
    };

    assert_eq!(count_rows(&conn, "address"), 0);

    let repo = SqliteDirectoryRepository::try_new(&mut conn).unwrap();
    let loaded = repo.get_directory(created.id).unwrap().unwrap();
    assert!(!loaded.address.has_content());
}

#[test]
fn create_rolls_back_when_address_insert_fails() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TRIGGER address_fault BEFORE INSERT ON address
         BEGIN SELECT RAISE(ABORT, 'injected fault'); END;",
    )
    .unwrap();

    {
        let mut repo = SqliteDirectoryRepository::try_new(&mut conn).unwrap();
        let err = repo
            .create_directory(&draft("Ada", "555", "London"))
            .unwrap_err();
        assert!(matches!(err, RepoError::Db(_)));
    }

    // The directory insert preceded the failing address insert; rollback
    // must leave neither behind.
    assert_eq!(count_rows(&conn, "directory"), 0);
    assert_eq!(count_rows(&conn, "address"), 0);
}

#[test]
fn update_with_empty_address_clears_the_row() {
    let mut conn = open_db_in_memory().unwrap();
    let (created, updated) = {
        let mut repo = SqliteDirectoryRepository::try_new(&mut conn).unwrap();
        let created = repo.create_directory(&draft("Ada", "555", "London")).unwrap();
        let updated = repo
            .update_directory(
                created.id,
                &DirectoryDraft {
                    name: "Ada L.".to_string(),
                    ..DirectoryDraft::default()
                },
            )
            .unwrap();
        (created, updated)
    };

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Ada L.");
    assert_eq!(updated.created_at, created.created_at);
    // Fixed-width RFC 3339 UTC text compares chronologically.
    assert!(updated.updated_at > created.updated_at);
    assert!(!updated.address.has_content());
    assert_eq!(count_rows(&conn, "address"), 0);
}

#[test]
fn update_inserts_address_row_when_previously_absent() {
    let mut conn = open_db_in_memory().unwrap();
    let created = {
        let mut repo = SqliteDirectoryRepository::try_new(&mut conn).unwrap();
        let created = repo
            .create_directory(&DirectoryDraft {
                name: "Grace".to_string(),
                ..DirectoryDraft::default()
            })
            .unwrap();
        repo.update_directory(created.id, &draft("Grace", "777", "New York"))
            .unwrap();
        created
    };

    assert_eq!(count_rows(&conn, "address"), 1);

    let repo = SqliteDirectoryRepository::try_new(&mut conn).unwrap();
    let loaded = repo.get_directory(created.id).unwrap().unwrap();
    assert_eq!(loaded.address.city, "New York");
    assert_eq!(loaded.phone_number, "777");
}

#[test]
fn update_existing_address_row_overwrites_fields() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDirectoryRepository::try_new(&mut conn).unwrap();

    let created = repo.create_directory(&draft("Ada", "555", "London")).unwrap();
    repo.update_directory(created.id, &draft("Ada", "555", "Cambridge"))
        .unwrap();

    let loaded = repo.get_directory(created.id).unwrap().unwrap();
    assert_eq!(loaded.address.city, "Cambridge");
    assert_eq!(loaded.address.country, "");
}

#[test]
fn update_not_found_returns_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDirectoryRepository::try_new(&mut conn).unwrap();

    let err = repo
        .update_directory(9999, &draft("Nobody", "", ""))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(9999)));
}

#[test]
fn delete_cascades_to_address_row() {
    let mut conn = open_db_in_memory().unwrap();
    let created = {
        let mut repo = SqliteDirectoryRepository::try_new(&mut conn).unwrap();
        let created = repo.create_directory(&draft("Ada", "555", "London")).unwrap();
        repo.delete_directory(created.id).unwrap();
        created
    };

    assert_eq!(count_rows(&conn, "directory"), 0);
    assert_eq!(count_rows(&conn, "address"), 0);

    let repo = SqliteDirectoryRepository::try_new(&mut conn).unwrap();
    assert!(repo.get_directory(created.id).unwrap().is_none());
}

#[test]
fn delete_not_found_returns_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDirectoryRepository::try_new(&mut conn).unwrap();

    let err = repo.delete_directory(12345).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(12345)));
}

#[test]
fn list_orders_by_id_ascending_and_defaults_missing_addresses() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDirectoryRepository::try_new(&mut conn).unwrap();

    assert!(repo.list_directories().unwrap().is_empty());

    let first = repo.create_directory(&draft("Ada", "555", "London")).unwrap();
    let second = repo
        .create_directory(&DirectoryDraft {
            name: "Grace".to_string(),
            ..DirectoryDraft::default()
        })
        .unwrap();
    let third = repo.create_directory(&draft("Edsger", "", "Austin")).unwrap();

    let entries = repo.list_directories().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(
        entries.iter().map(|entry| entry.id).collect::<Vec<_>>(),
        vec![first.id, second.id, third.id]
    );
    assert_eq!(entries[0].address.city, "London");
    assert!(!entries[1].address.has_content());
    assert_eq!(entries[2].address.city, "Austin");
}

#[test]
fn empty_name_is_rejected_on_create_and_update() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDirectoryRepository::try_new(&mut conn).unwrap();

    let blank = DirectoryDraft {
        name: "  ".to_string(),
        ..DirectoryDraft::default()
    };
    assert!(matches!(
        repo.create_directory(&blank).unwrap_err(),
        RepoError::Validation(DirectoryValidationError::EmptyName)
    ));

    let created = repo.create_directory(&draft("Ada", "", "")).unwrap();
    assert!(matches!(
        repo.update_directory(created.id, &blank).unwrap_err(),
        RepoError::Validation(DirectoryValidationError::EmptyName)
    ));
}

#[test]
fn repository_rejects_unbootstrapped_connection() {
    let mut conn = Connection::open_in_memory().unwrap();

    let result = SqliteDirectoryRepository::try_new(&mut conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("directory"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_address_column() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE directory (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            phone_number TEXT,
            created_at TEXT,
            updated_at TEXT
        );
        CREATE TABLE address (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            directory_id INTEGER NOT NULL
        );",
    )
    .unwrap();

    let result = SqliteDirectoryRepository::try_new(&mut conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "address",
            column: "address_line_1"
        })
    ));
}

#[test]
fn service_round_trip_with_string_ids() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteDirectoryRepository::try_new(&mut conn).unwrap();
    let mut service = DirectoryService::new(repo);

    let created = service.create(&draft("Ada", "555", "London")).unwrap();
    let id_text = created.id.to_string();
    assert_eq!(created.created_at, created.updated_at);

    let fetched = service.get(&id_text).unwrap();
    assert_eq!(fetched.address.city, "London");
    assert_eq!(fetched.address.state, "");

    let updated = service
        .update(
            &id_text,
            &DirectoryDraft {
                name: "Ada L.".to_string(),
                ..DirectoryDraft::default()
            },
        )
        .unwrap();
    assert_eq!(updated.name, "Ada L.");
    assert!(updated.updated_at > updated.created_at);
    assert!(!updated.address.has_content());

    service.delete(&id_text).unwrap();
    let err = service.get(&id_text).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == created.id));
}

#[test]
fn service_not_found_semantics_are_uniform() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteDirectoryRepository::try_new(&mut conn).unwrap();
    let mut service = DirectoryService::new(repo);

    assert!(matches!(
        service.get("404").unwrap_err(),
        RepoError::NotFound(404)
    ));
    assert!(matches!(
        service.update("404", &draft("Nobody", "", "")).unwrap_err(),
        RepoError::NotFound(404)
    ));
    assert!(matches!(
        service.delete("404").unwrap_err(),
        RepoError::NotFound(404)
    ));
}

#[test]
fn service_rejects_non_numeric_ids() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteDirectoryRepository::try_new(&mut conn).unwrap();
    let service = DirectoryService::new(repo);

    let err = service.get("not-a-number").unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(DirectoryValidationError::InvalidId(raw)) if raw == "not-a-number"
    ));
}

#[test]
fn created_entry_serializes_with_string_id() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDirectoryRepository::try_new(&mut conn).unwrap();

    let created = repo.create_directory(&draft("Ada", "555", "London")).unwrap();
    let json = serde_json::to_value(&created).unwrap();

    assert_eq!(json["id"], created.id.to_string());
    assert_eq!(json["name"], "Ada");
    assert_eq!(json["address"]["city"], "London");
    assert_eq!(json["address"]["country"], "");
}
