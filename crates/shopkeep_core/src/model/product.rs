//! Product domain model.
//!
//! # Responsibility
//! - Define the canonical product record and its closed category set.
//! - Convert products to/from the key-value transport mapping.
//!
//! # Invariants
//! - `id` is assigned by the store; a transient product carries `None`.
//! - `price` is an exact decimal, never binary floating point.
//! - `category` always resolves to a member of the closed set.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Store-assigned surrogate key for persisted products.
pub type ProductId = i64;

/// Longest `name` the store accepts.
pub const MAX_NAME_LEN: usize = 100;

/// Longest `description` the store accepts.
pub const MAX_DESCRIPTION_LEN: usize = 250;

/// Closed set of product categories.
///
/// Transport and storage both use the member name (`CLOTHS`, `FOOD`, ...);
/// lookup is case-sensitive and anything outside the set is rejected rather
/// than defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    #[default]
    Cloths,
    Food,
    Housewares,
    Automotive,
    Tools,
}

impl Category {
    /// Every member, in declaration order.
    pub const ALL: [Category; 5] = [
        Category::Cloths,
        Category::Food,
        Category::Housewares,
        Category::Automotive,
        Category::Tools,
    ];

    /// Returns the wire/storage name of this member.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Cloths => "CLOTHS",
            Category::Food => "FOOD",
            Category::Housewares => "HOUSEWARES",
            Category::Automotive => "AUTOMOTIVE",
            Category::Tools => "TOOLS",
        }
    }

    /// Resolves a member by its exact, case-sensitive name.
    pub fn from_name(name: &str) -> Option<Category> {
        match name {
            "CLOTHS" => Some(Category::Cloths),
            "FOOD" => Some(Category::Food),
            "HOUSEWARES" => Some(Category::Housewares),
            "AUTOMOTIVE" => Some(Category::Automotive),
            "TOOLS" => Some(Category::Tools),
            _ => None,
        }
    }
}

/// Rejection raised by [`Product::deserialize`] and by gateway operations
/// invoked on a product that has no identity yet.
///
/// These are always caller/data errors, never transient store conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductValidationError {
    /// The payload is not a mapping of field names to values.
    NotAnObject,
    /// A required field is absent (or explicitly null).
    MissingField(&'static str),
    /// A field is present but carries the wrong value type.
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
    /// The price value cannot be parsed into an exact decimal.
    InvalidPrice(String),
    /// The category name matches no member of the closed set.
    UnknownCategory(String),
    /// Update/delete was invoked on a product that was never created.
    MissingId,
}

impl Display for ProductValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "product payload must be a mapping of field names to values"),
            Self::MissingField(field) => write!(f, "missing required field `{field}`"),
            Self::InvalidField { field, expected } => {
                write!(f, "field `{field}` must be {expected}")
            }
            Self::InvalidPrice(value) => write!(f, "cannot parse `{value}` as a decimal price"),
            Self::UnknownCategory(name) => write!(f, "unknown category `{name}`"),
            Self::MissingId => write!(f, "product has no id; create it before updating or deleting"),
        }
    }
}

impl Error for ProductValidationError {}

/// Canonical product record.
///
/// The serde derives expose the same wire shape as [`Product::serialize`]:
/// `price` travels as decimal text and `category` as its member name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Product {
    /// Store-assigned key; `None` until the product is created.
    #[serde(default)]
    pub id: Option<ProductId>,
    pub name: String,
    pub description: String,
    /// Exact decimal; rendered as text on the wire to avoid float loss.
    pub price: Decimal,
    pub available: bool,
    pub category: Category,
}

impl Product {
    /// Creates a transient product with no store identity.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
        available: bool,
        category: Category,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
            price,
            available,
            category,
        }
    }

    /// Renders this product as the transport mapping.
    ///
    /// Total over any in-memory instance: `id` becomes a number or null,
    /// `price` becomes decimal text, `category` becomes its member name.
    pub fn serialize(&self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert("id".to_string(), self.id.map_or(Value::Null, Value::from));
        data.insert("name".to_string(), Value::from(self.name.as_str()));
        data.insert(
            "description".to_string(),
            Value::from(self.description.as_str()),
        );
        data.insert("price".to_string(), Value::from(self.price.to_string()));
        data.insert("available".to_string(), Value::from(self.available));
        data.insert("category".to_string(), Value::from(self.category.as_str()));
        data
    }

    /// Populates this product from a transport mapping.
    ///
    /// `id` is optional: an absent key leaves the current id untouched and an
    /// explicit null clears it. All other fields are required. Every field is
    /// parsed before any is assigned, so a rejected payload leaves the
    /// instance unchanged.
    ///
    /// # Errors
    /// - [`ProductValidationError::NotAnObject`] for list/scalar payloads.
    /// - [`ProductValidationError::MissingField`] for absent required fields.
    /// - [`ProductValidationError::InvalidField`] for wrongly typed values.
    /// - [`ProductValidationError::InvalidPrice`] for unparseable prices.
    /// - [`ProductValidationError::UnknownCategory`] for names outside the set.
    pub fn deserialize(&mut self, data: &Value) -> Result<(), ProductValidationError> {
        let fields = data.as_object().ok_or(ProductValidationError::NotAnObject)?;

        let name = required_text(fields, "name")?.to_string();
        let description = required_text(fields, "description")?.to_string();
        let price = parse_price(required(fields, "price")?)?;
        let available = required(fields, "available")?.as_bool().ok_or(
            ProductValidationError::InvalidField {
                field: "available",
                expected: "a boolean",
            },
        )?;
        let category_name = required_text(fields, "category")?;
        let category = Category::from_name(category_name)
            .ok_or_else(|| ProductValidationError::UnknownCategory(category_name.to_string()))?;
        let id = match fields.get("id") {
            None => self.id,
            Some(Value::Null) => None,
            Some(value) => Some(value.as_i64().ok_or(ProductValidationError::InvalidField {
                field: "id",
                expected: "an integer or null",
            })?),
        };

        self.id = id;
        self.name = name;
        self.description = description;
        self.price = price;
        self.available = available;
        self.category = category;
        Ok(())
    }
}

impl Display for Product {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "<Product {} id=[{id}]>", self.name),
            None => write!(f, "<Product {} id=[None]>", self.name),
        }
    }
}

fn required<'a>(
    fields: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Value, ProductValidationError> {
    match fields.get(field) {
        None | Some(Value::Null) => Err(ProductValidationError::MissingField(field)),
        Some(value) => Ok(value),
    }
}

fn required_text<'a>(
    fields: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, ProductValidationError> {
    required(fields, field)?
        .as_str()
        .ok_or(ProductValidationError::InvalidField {
            field,
            expected: "a string",
        })
}

fn parse_price(value: &Value) -> Result<Decimal, ProductValidationError> {
    let text = match value {
        Value::String(text) => text.trim().to_string(),
        // JSON numbers keep their exact source digits, so parse the text form
        // instead of going through f64.
        Value::Number(number) => number.to_string(),
        other => return Err(ProductValidationError::InvalidPrice(other.to_string())),
    };
    Decimal::from_str(&text).map_err(|_| ProductValidationError::InvalidPrice(text))
}
