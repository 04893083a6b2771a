//! Item repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Map the `Item` hierarchy onto the single `items` table.
//! - Keep discriminator handling inside the persistence boundary.
//!
//! # Invariants
//! - Only the subtype columns selected by `dtype` are written; the others
//!   stay `NULL`.
//! - Rows with an unknown `dtype` or missing subtype columns are rejected.

use crate::model::audit::now_epoch_ms;
use crate::model::item::{Album, Book, Item, ItemId, ItemKind, Movie};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::{read_audit, AUDIT_COLUMNS};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const ITEM_SELECT_SQL: &str = "SELECT
    item_id,
    dtype,
    name,
    price,
    stock_quantity,
    author,
    isbn,
    artist,
    etc,
    director,
    actor,
    created_by,
    created_at,
    last_modified_by,
    last_modified_at
FROM items";

/// Query options for listing items.
#[derive(Debug, Clone, Default)]
pub struct ItemListQuery {
    /// Restricts results to one discriminator value (`Book`, `Album`, `Movie`).
    pub dtype: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for item persistence.
pub trait ItemRepository {
    /// Inserts a transient item and assigns its generated id.
    fn create_item(&self, item: &mut Item) -> RepoResult<ItemId>;
    fn update_item(&self, item: &mut Item) -> RepoResult<()>;
    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>>;
    fn list_items(&self, query: &ItemListQuery) -> RepoResult<Vec<Item>>;
    fn count_items(&self) -> RepoResult<u64>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn create_item(&self, item: &mut Item) -> RepoResult<ItemId> {
        item.validate()?;
        item.audit.stamp_created(now_epoch_ms());

        let columns = SubtypeColumns::from_kind(&item.kind);
        self.conn.execute(
            &format!(
                "INSERT INTO items (
                    dtype,
                    name,
                    price,
                    stock_quantity,
                    author,
                    isbn,
                    artist,
                    etc,
                    director,
                    actor,
                    {AUDIT_COLUMNS}
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14);"
            ),
            params![
                item.kind.discriminator(),
                item.name.as_str(),
                item.price,
                item.stock_quantity,
                columns.author,
                columns.isbn,
                columns.artist,
                columns.etc,
                columns.director,
                columns.actor,
                item.audit.created_by.as_deref(),
                item.audit.created_at,
                item.audit.last_modified_by.as_deref(),
                item.audit.last_modified_at,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        item.id = Some(id);
        Ok(id)
    }

    fn update_item(&self, item: &mut Item) -> RepoResult<()> {
        let id = item
            .id
            .ok_or_else(|| RepoError::InvalidData("cannot update a transient item".to_string()))?;
        item.validate()?;
        item.audit.stamp_modified(now_epoch_ms());

        let columns = SubtypeColumns::from_kind(&item.kind);
        let changed = self.conn.execute(
            "UPDATE items
             SET
                dtype = ?1,
                name = ?2,
                price = ?3,
                stock_quantity = ?4,
                author = ?5,
                isbn = ?6,
                artist = ?7,
                etc = ?8,
                director = ?9,
                actor = ?10,
                last_modified_by = ?11,
                last_modified_at = ?12
             WHERE item_id = ?13;",
            params![
                item.kind.discriminator(),
                item.name.as_str(),
                item.price,
                item.stock_quantity,
                columns.author,
                columns.isbn,
                columns.artist,
                columns.etc,
                columns.director,
                columns.actor,
                item.audit.last_modified_by.as_deref(),
                item.audit.last_modified_at,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: "Item", id });
        }
        Ok(())
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE item_id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_item_row(row)?));
        }
        Ok(None)
    }

    fn list_items(&self, query: &ItemListQuery) -> RepoResult<Vec<Item>> {
        let mut sql = format!("{ITEM_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(dtype) = query.dtype.as_ref() {
            sql.push_str(" AND dtype = ?");
            bind_values.push(Value::Text(dtype.clone()));
        }

        sql.push_str(" ORDER BY item_id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }

    fn count_items(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM items;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative item count `{count}`")))
    }
}

/// Nullable subtype columns for one row.
#[derive(Default)]
struct SubtypeColumns<'a> {
    author: Option<&'a str>,
    isbn: Option<&'a str>,
    artist: Option<&'a str>,
    etc: Option<&'a str>,
    director: Option<&'a str>,
    actor: Option<&'a str>,
}

impl<'a> SubtypeColumns<'a> {
    fn from_kind(kind: &'a ItemKind) -> Self {
        match kind {
            ItemKind::Book(book) => Self {
                author: Some(book.author.as_str()),
                isbn: book.isbn.as_deref(),
                ..Self::default()
            },
            ItemKind::Album(album) => Self {
                artist: Some(album.artist.as_str()),
                etc: album.etc.as_deref(),
                ..Self::default()
            },
            ItemKind::Movie(movie) => Self {
                director: Some(movie.director.as_str()),
                actor: movie.actor.as_deref(),
                ..Self::default()
            },
        }
    }
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let id: ItemId = row.get("item_id")?;
    let dtype: String = row.get("dtype")?;
    let kind = match dtype.as_str() {
        "Book" => ItemKind::Book(Book {
            author: required_column(row, "author", id)?,
            isbn: row.get("isbn")?,
        }),
        "Album" => ItemKind::Album(Album {
            artist: required_column(row, "artist", id)?,
            etc: row.get("etc")?,
        }),
        "Movie" => ItemKind::Movie(Movie {
            director: required_column(row, "director", id)?,
            actor: row.get("actor")?,
        }),
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid dtype `{other}` in items.dtype for item {id}"
            )));
        }
    };

    let item = Item {
        id: Some(id),
        name: row.get("name")?,
        price: row.get("price")?,
        stock_quantity: row.get("stock_quantity")?,
        kind,
        audit: read_audit(row)?,
    };
    item.validate()?;
    Ok(item)
}

fn required_column(row: &Row<'_>, column: &'static str, id: ItemId) -> RepoResult<String> {
    row.get::<_, Option<String>>(column)?.ok_or_else(|| {
        RepoError::InvalidData(format!("missing items.{column} for item {id}"))
    })
}
