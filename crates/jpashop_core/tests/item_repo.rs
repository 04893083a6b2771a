use jpashop_core::db::open_db_in_memory;
use jpashop_core::repo::item_repo::{ItemListQuery, ItemRepository, SqliteItemRepository};
use jpashop_core::{Album, Book, Item, ItemKind, Movie, RepoError};

#[test]
fn subtypes_roundtrip_through_single_table() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    let mut book = Item::new(
        "JPA",
        Book {
            author: "kim".to_string(),
            isbn: Some("978-89".to_string()),
        },
    )
    .with_price(10_000)
    .with_stock(5);
    let mut album = Item::new(
        "Abbey Road",
        Album {
            artist: "The Beatles".to_string(),
            etc: None,
        },
    );
    let mut movie = Item::new(
        "Inception",
        Movie {
            director: "Nolan".to_string(),
            actor: Some("DiCaprio".to_string()),
        },
    );

    for item in [&mut book, &mut album, &mut movie] {
        repo.create_item(item).unwrap();
    }

    assert_eq!(repo.get_item(book.id.unwrap()).unwrap().unwrap(), book);
    assert_eq!(repo.get_item(album.id.unwrap()).unwrap().unwrap(), album);
    assert_eq!(repo.get_item(movie.id.unwrap()).unwrap().unwrap(), movie);
    assert_eq!(repo.count_items().unwrap(), 3);

    let unused_columns: (Option<String>, Option<String>) = conn
        .query_row(
            "SELECT artist, director FROM items WHERE item_id = ?1;",
            [book.id.unwrap()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(unused_columns, (None, None));
}

#[test]
fn list_items_filters_by_dtype_and_paginates() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    for name in ["a", "b", "c"] {
        repo.create_item(&mut Item::book(name, "author")).unwrap();
    }
    repo.create_item(&mut Item::new(
        "album",
        Album {
            artist: "artist".to_string(),
            etc: None,
        },
    ))
    .unwrap();

    let books = repo
        .list_items(&ItemListQuery {
            dtype: Some("Book".to_string()),
            ..ItemListQuery::default()
        })
        .unwrap();
    assert_eq!(books.len(), 3);
    assert!(books
        .iter()
        .all(|item| matches!(item.kind, ItemKind::Book(_))));

    let page = repo
        .list_items(&ItemListQuery {
            dtype: Some("Book".to_string()),
            limit: Some(1),
            offset: 1,
        })
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].name, "b");

    let tail = repo
        .list_items(&ItemListQuery {
            offset: 3,
            ..ItemListQuery::default()
        })
        .unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].name, "album");
}

#[test]
fn update_item_persists_stock_changes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    let mut book = Item::book("JPA", "kim").with_stock(3);
    repo.create_item(&mut book).unwrap();
    book.remove_stock(2).unwrap();
    repo.update_item(&mut book).unwrap();

    let loaded = repo.get_item(book.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded.stock_quantity, 1);
    assert!(loaded.audit.last_modified_at >= loaded.audit.created_at);
}

#[test]
fn update_missing_item_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    let mut ghost = Item::book("ghost", "nobody");
    ghost.id = Some(404);
    let err = repo.update_item(&mut ghost).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "Item", id: 404 }));
}

#[test]
fn get_item_rejects_corrupted_discriminator() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         INSERT INTO items (dtype, name, created_at, last_modified_at)
         VALUES ('Poster', 'wall art', 0, 0);",
    )
    .unwrap();

    let repo = SqliteItemRepository::new(&conn);
    let err = repo.get_item(conn.last_insert_rowid()).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("Poster")));
}
