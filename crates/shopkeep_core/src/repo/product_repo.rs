//! Product repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD and attribute-filter APIs over `products` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Store failures pass through as [`RepoError::Db`], untranslated.
//! - Malformed persisted rows are rejected as [`RepoError::InvalidData`],
//!   never masked as an empty result.
//! - Prices hit the store in one canonical decimal rendering, so SQL
//!   equality on the column is exact decimal equality.

use crate::db::{migrations, DbError};
use crate::model::product::{Category, Product, ProductId, ProductValidationError};
use rusqlite::{params, Connection, Params, Row};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const PRODUCT_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    price,
    available,
    category
FROM products";

const REQUIRED_COLUMNS: [&str; 6] = [
    "id",
    "name",
    "description",
    "price",
    "available",
    "category",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for product persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Caller/data error; never reaches the store.
    Validation(ProductValidationError),
    /// Store driver failure, propagated unchanged.
    Db(DbError),
    /// Update targeted an id the store no longer holds.
    NotFound(ProductId),
    /// A persisted row violates the entity contract.
    InvalidData(String),
    /// The connection has no schema applied yet.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "product not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted product data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection has schema version {actual_version}, expected {expected_version}; open it through the db module first"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProductValidationError> for RepoError {
    fn from(value: ProductValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Gateway contract for product CRUD and attribute-filtered retrieval.
///
/// Filter results are materialized vectors: `len()` is the match count and
/// iteration walks the same single query execution.
pub trait ProductRepository {
    /// Inserts a new row and populates the instance id from the store.
    ///
    /// Any caller-set id is discarded before the insert.
    fn create(&self, product: &mut Product) -> RepoResult<ProductId>;

    /// Persists all current field values keyed by the existing id.
    ///
    /// Fails with a validation error before any SQL when the product has no
    /// id yet.
    fn update(&self, product: &Product) -> RepoResult<()>;

    /// Removes the row matching the instance id.
    ///
    /// Deleting a row that is already absent succeeds silently.
    fn delete(&self, product: &Product) -> RepoResult<()>;

    /// Returns the matching product, or `None` when no row has that id.
    fn find_by_id(&self, id: ProductId) -> RepoResult<Option<Product>>;

    /// Returns every stored product; an empty store yields an empty vector.
    fn list_all(&self) -> RepoResult<Vec<Product>>;

    /// Exact, case-sensitive match on `name`.
    fn find_by_name(&self, name: &str) -> RepoResult<Vec<Product>>;

    fn find_by_category(&self, category: Category) -> RepoResult<Vec<Product>>;

    fn find_by_availability(&self, available: bool) -> RepoResult<Vec<Product>>;

    /// Exact decimal match on `price`.
    fn find_by_price(&self, price: Decimal) -> RepoResult<Vec<Product>>;

    /// Like [`ProductRepository::find_by_price`], for a raw text token.
    ///
    /// The token may be padded with whitespace and wrapped in one layer of
    /// quotes (`' "99.99" '`). A token that does not normalize to a decimal
    /// is a validation error, not an empty result.
    fn find_by_price_token(&self, raw: &str) -> RepoResult<Vec<Product>> {
        self.find_by_price(parse_price_token(raw)?)
    }
}

/// SQLite-backed product repository over an explicit connection handle.
pub struct SqliteProductRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProductRepository<'conn> {
    /// Binds the repository to an initialized connection.
    ///
    /// Verifies that migrations ran and the `products` table carries every
    /// required column. Safe to call any number of times on the same
    /// connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = migrations::latest_version();
        let actual_version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
        if actual_version == 0 {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        ensure_table(conn, "products")?;
        ensure_columns(conn, "products", &REQUIRED_COLUMNS)?;

        Ok(Self { conn })
    }

    fn select_products(&self, sql: &str, params: impl Params) -> RepoResult<Vec<Product>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut products = Vec::new();

        while let Some(row) = rows.next()? {
            products.push(parse_product_row(row)?);
        }

        Ok(products)
    }
}

impl ProductRepository for SqliteProductRepository<'_> {
    fn create(&self, product: &mut Product) -> RepoResult<ProductId> {
        // The store owns the surrogate key; drop whatever the caller set.
        product.id = None;

        self.conn.execute(
            "INSERT INTO products (
                name,
                description,
                price,
                available,
                category
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                product.name.as_str(),
                product.description.as_str(),
                price_to_db(product.price),
                bool_to_int(product.available),
                product.category.as_str(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        product.id = Some(id);
        Ok(id)
    }

    fn update(&self, product: &Product) -> RepoResult<()> {
        let id = product.id.ok_or(ProductValidationError::MissingId)?;

        let changed = self.conn.execute(
            "UPDATE products
             SET
                name = ?1,
                description = ?2,
                price = ?3,
                available = ?4,
                category = ?5
             WHERE id = ?6;",
            params![
                product.name.as_str(),
                product.description.as_str(),
                price_to_db(product.price),
                bool_to_int(product.available),
                product.category.as_str(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete(&self, product: &Product) -> RepoResult<()> {
        let id = product.id.ok_or(ProductValidationError::MissingId)?;

        // A zero-row delete is not an error; the row is gone either way.
        self.conn
            .execute("DELETE FROM products WHERE id = ?1;", [id])?;

        Ok(())
    }

    fn find_by_id(&self, id: ProductId) -> RepoResult<Option<Product>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PRODUCT_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_product_row(row)?));
        }

        Ok(None)
    }

    fn list_all(&self) -> RepoResult<Vec<Product>> {
        self.select_products(&format!("{PRODUCT_SELECT_SQL} ORDER BY id ASC;"), [])
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Vec<Product>> {
        self.select_products(&format!("{PRODUCT_SELECT_SQL} WHERE name = ?1;"), [name])
    }

    fn find_by_category(&self, category: Category) -> RepoResult<Vec<Product>> {
        self.select_products(
            &format!("{PRODUCT_SELECT_SQL} WHERE category = ?1;"),
            [category.as_str()],
        )
    }

    fn find_by_availability(&self, available: bool) -> RepoResult<Vec<Product>> {
        self.select_products(
            &format!("{PRODUCT_SELECT_SQL} WHERE available = ?1;"),
            [bool_to_int(available)],
        )
    }

    fn find_by_price(&self, price: Decimal) -> RepoResult<Vec<Product>> {
        self.select_products(
            &format!("{PRODUCT_SELECT_SQL} WHERE price = ?1;"),
            [price_to_db(price)],
        )
    }
}

/// Normalizes a raw price token and parses it into an exact decimal.
///
/// Strips surrounding whitespace and one layer of matching quote characters
/// before parsing, so `' "99.99" '` resolves to `99.99`.
pub fn parse_price_token(raw: &str) -> Result<Decimal, ProductValidationError> {
    let token = strip_price_token(raw);
    Decimal::from_str(token).map_err(|_| ProductValidationError::InvalidPrice(raw.trim().to_string()))
}

fn strip_price_token(raw: &str) -> &str {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .or_else(|| {
            trimmed
                .strip_prefix('\'')
                .and_then(|rest| rest.strip_suffix('\''))
        })
        .unwrap_or(trimmed);
    unquoted.trim()
}

fn ensure_table(conn: &Connection, table: &'static str) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;

    if exists == 0 {
        return Err(RepoError::MissingRequiredTable(table));
    }

    Ok(())
}

fn ensure_columns(conn: &Connection, table: &'static str, columns: &[&'static str]) -> RepoResult<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let mut rows = stmt.query([table])?;
    let mut present = HashSet::new();

    while let Some(row) = rows.next()? {
        present.insert(row.get::<_, String>(0)?);
    }

    for &column in columns {
        if !present.contains(column) {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}

fn parse_product_row(row: &Row<'_>) -> RepoResult<Product> {
    let price_text: String = row.get("price")?;
    let price = Decimal::from_str(&price_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid price value `{price_text}` in products.price"))
    })?;

    let category_text: String = row.get("category")?;
    let category = Category::from_name(&category_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid category value `{category_text}` in products.category"
        ))
    })?;

    let available = match row.get::<_, i64>("available")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid available value `{other}` in products.available"
            )));
        }
    };

    Ok(Product {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        description: row.get("description")?,
        price,
        available,
        category,
    })
}

/// Renders a price in the canonical form stored in the `price` column.
///
/// Trailing zeros are dropped and the result carries at least two fraction
/// digits, so equal decimals always render identically regardless of the
/// scale the caller supplied.
fn price_to_db(price: Decimal) -> String {
    let mut canonical = price.normalize();
    if canonical.scale() < 2 {
        canonical.rescale(2);
    }
    canonical.to_string()
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_price_token, price_to_db};
    use crate::model::product::ProductValidationError;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn price_token_strips_whitespace_and_one_quote_layer() {
        let parsed = parse_price_token(" \"99.99\" ").unwrap();
        assert_eq!(parsed, Decimal::from_str("99.99").unwrap());

        let single_quoted = parse_price_token(" '10.50' ").unwrap();
        assert_eq!(single_quoted, Decimal::from_str("10.50").unwrap());

        let bare = parse_price_token("0.01").unwrap();
        assert_eq!(bare, Decimal::from_str("0.01").unwrap());
    }

    #[test]
    fn price_token_rejects_non_decimal_text() {
        let err = parse_price_token(" \"not-a-price\" ").unwrap_err();
        assert!(matches!(err, ProductValidationError::InvalidPrice(_)));
    }

    #[test]
    fn canonical_price_text_is_scale_independent() {
        let long = Decimal::from_str("5.50").unwrap();
        let short = Decimal::from_str("5.5").unwrap();
        assert_eq!(price_to_db(long), "5.50");
        assert_eq!(price_to_db(long), price_to_db(short));

        assert_eq!(price_to_db(Decimal::from_str("7").unwrap()), "7.00");
        assert_eq!(
            price_to_db(Decimal::from_str("99999999.99").unwrap()),
            "99999999.99"
        );
    }
}
