//! Item (product) domain model.
//!
//! # Responsibility
//! - Define the generic product record and its subtypes.
//! - Provide stock bookkeeping helpers.
//!
//! # Invariants
//! - `name` is non-empty, `price` and `stock_quantity` are never negative.
//! - Subtype data lives in `kind`; the discriminator is derived from it.
//! - A book always has a non-empty author.

use crate::model::audit::AuditInfo;
use crate::model::validation::{require_non_negative, require_text, ValidationError};
use serde::{Deserialize, Serialize};

/// Generated identifier of a persisted item row.
pub type ItemId = i64;

/// Book subtype columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub author: String,
    pub isbn: Option<String>,
}

/// Album subtype columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub artist: String,
    pub etc: Option<String>,
}

/// Movie subtype columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub director: String,
    pub actor: Option<String>,
}

/// Concrete product type, stored through the `dtype` discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "dtype", rename_all = "PascalCase")]
pub enum ItemKind {
    Book(Book),
    Album(Album),
    Movie(Movie),
}

impl ItemKind {
    /// Discriminator value written to `items.dtype`.
    pub fn discriminator(&self) -> &'static str {
        match self {
            Self::Book(_) => "Book",
            Self::Album(_) => "Album",
            Self::Movie(_) => "Movie",
        }
    }
}

impl From<Book> for ItemKind {
    fn from(value: Book) -> Self {
        Self::Book(value)
    }
}

impl From<Album> for ItemKind {
    fn from(value: Album) -> Self {
        Self::Album(value)
    }
}

impl From<Movie> for ItemKind {
    fn from(value: Movie) -> Self {
        Self::Movie(value)
    }
}

/// Generic product sold by the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// `None` until the item is persisted.
    pub id: Option<ItemId>,
    pub name: String,
    pub price: i64,
    pub stock_quantity: i64,
    pub kind: ItemKind,
    pub audit: AuditInfo,
}

impl Item {
    /// Creates a transient item with zero price and stock.
    pub fn new(name: impl Into<String>, kind: impl Into<ItemKind>) -> Self {
        Self {
            id: None,
            name: name.into(),
            price: 0,
            stock_quantity: 0,
            kind: kind.into(),
            audit: AuditInfo::default(),
        }
    }

    /// Creates a transient book from its two defining fields.
    pub fn book(name: impl Into<String>, author: impl Into<String>) -> Self {
        Self::new(
            name,
            Book {
                author: author.into(),
                isbn: None,
            },
        )
    }

    pub fn with_price(mut self, price: i64) -> Self {
        self.price = price;
        self
    }

    pub fn with_stock(mut self, stock_quantity: i64) -> Self {
        self.stock_quantity = stock_quantity;
        self
    }

    /// Returns book columns when this item is a book.
    pub fn as_book(&self) -> Option<&Book> {
        match &self.kind {
            ItemKind::Book(book) => Some(book),
            _ => None,
        }
    }

    /// Increases stock by `quantity`.
    pub fn add_stock(&mut self, quantity: i64) -> Result<(), ValidationError> {
        require_non_negative("Item", "quantity", quantity)?;
        self.stock_quantity += quantity;
        Ok(())
    }

    /// Decreases stock by `quantity`, refusing to go below zero.
    pub fn remove_stock(&mut self, quantity: i64) -> Result<(), ValidationError> {
        require_non_negative("Item", "quantity", quantity)?;
        if quantity > self.stock_quantity {
            return Err(ValidationError::NotEnoughStock {
                requested: quantity,
                available: self.stock_quantity,
            });
        }
        self.stock_quantity -= quantity;
        Ok(())
    }

    /// Checks column-level invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("Item", "name", &self.name)?;
        require_non_negative("Item", "price", self.price)?;
        require_non_negative("Item", "stock_quantity", self.stock_quantity)?;
        match &self.kind {
            ItemKind::Book(book) => require_text("Book", "author", &book.author),
            ItemKind::Album(album) => require_text("Album", "artist", &album.artist),
            ItemKind::Movie(movie) => require_text("Movie", "director", &movie.director),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Item, ItemKind, Movie};
    use crate::model::validation::ValidationError;

    #[test]
    fn book_constructor_sets_subtype_and_defaults() {
        let item = Item::book("JPA", "kim");
        assert_eq!(item.kind.discriminator(), "Book");
        assert_eq!(item.as_book().map(|b| b.author.as_str()), Some("kim"));
        assert_eq!(item.price, 0);
        assert!(item.id.is_none());
        assert!(item.validate().is_ok());
    }

    #[test]
    fn remove_stock_rejects_overdraw() {
        let mut item = Item::book("JPA", "kim").with_stock(2);
        let err = item.remove_stock(3).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotEnoughStock {
                requested: 3,
                available: 2
            }
        );
        item.remove_stock(2).unwrap();
        assert_eq!(item.stock_quantity, 0);
    }

    #[test]
    fn validate_requires_subtype_fields() {
        let item = Item::new(
            "Inception",
            ItemKind::Movie(Movie {
                director: " ".to_string(),
                actor: None,
            }),
        );
        assert!(matches!(
            item.validate(),
            Err(ValidationError::EmptyField {
                entity: "Movie",
                field: "director"
            })
        ));
    }

    #[test]
    fn serializes_kind_with_dtype_tag() {
        let item = Item::book("JPA", "kim");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["kind"]["dtype"], "Book");
        assert_eq!(json["kind"]["author"], "kim");
    }
}
