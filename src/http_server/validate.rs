//! Request field validation
//!
//! Every handler turns its JSON body or query string into [`Fields`] and
//! pulls typed values out of it. Each accessor either returns the parsed
//! value or a [`ValidationError`] naming the field.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::shop::products::is_product_id;
use crate::shop::OrderItem;
use crate::store::MAX_KEY_LEN;

/// Maximum accepted email length; emails are record ids
pub const MAX_EMAIL_LEN: usize = MAX_KEY_LEN;

/// A field was missing or did not satisfy its format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Missing or invalid field '{}': {}", self.field, self.reason)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T> = Result<T, ValidationError>;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_%+-][A-Za-z0-9._%+-]*@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
            .unwrap_or_else(|e| unreachable!("static email pattern: {e}"))
    })
}

/// Named input fields of one request
#[derive(Debug, Clone, Default)]
pub struct Fields {
    map: Map<String, Value>,
}

impl Fields {
    /// Parse a raw request body. An empty body has no fields.
    pub fn from_body(body: &[u8]) -> ValidationResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        match serde_json::from_slice(body) {
            Ok(Value::Object(map)) => Ok(Self { map }),
            Ok(_) => Err(ValidationError::new("body", "must be a JSON object")),
            Err(_) => Err(ValidationError::new("body", "is not valid JSON")),
        }
    }

    /// Query parameters, all as strings
    pub fn from_query(params: HashMap<String, String>) -> Self {
        let map = params
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();
        Self { map }
    }

    /// Non-empty string after trimming
    pub fn required_text(&self, name: &str) -> ValidationResult<String> {
        self.optional_text(name)?
            .ok_or_else(|| ValidationError::new(name, "is required"))
    }

    /// Absent or null is `None`; present must be a non-empty string
    pub fn optional_text(&self, name: &str) -> ValidationResult<Option<String>> {
        match self.map.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Err(ValidationError::new(name, "must not be blank"))
                } else {
                    Ok(Some(trimmed.to_string()))
                }
            }
            Some(_) => Err(ValidationError::new(name, "must be a string")),
        }
    }

    /// Email address usable as a record id
    pub fn required_email(&self, name: &str) -> ValidationResult<String> {
        let email = self.required_text(name)?;
        if email.len() > MAX_EMAIL_LEN || !email_pattern().is_match(&email) {
            return Err(ValidationError::new(name, "must be a valid email address"));
        }
        Ok(email)
    }

    /// Exactly `len` ASCII alphanumerics
    pub fn required_id(&self, name: &str, len: usize) -> ValidationResult<String> {
        let id = self.required_text(name)?;
        if id.len() != len || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ValidationError::new(
                name,
                format!("must be {} alphanumeric characters", len),
            ));
        }
        Ok(id)
    }

    /// Product id, if present
    pub fn optional_slug(&self, name: &str) -> ValidationResult<Option<String>> {
        match self.optional_text(name)? {
            Some(slug) if !is_product_id(&slug) => {
                Err(ValidationError::new(name, "must be a product id"))
            }
            other => Ok(other),
        }
    }

    /// Boolean flag that must be `true`
    pub fn required_true(&self, name: &str) -> ValidationResult<()> {
        match self.map.get(name) {
            Some(Value::Bool(true)) => Ok(()),
            Some(Value::Bool(false)) => Err(ValidationError::new(name, "must be true")),
            _ => Err(ValidationError::new(name, "must be the boolean true")),
        }
    }

    /// Non-empty array of `{productId, quantity}` objects
    pub fn required_items(&self, name: &str) -> ValidationResult<Vec<OrderItem>> {
        let entries = match self.map.get(name) {
            Some(Value::Array(entries)) if !entries.is_empty() => entries,
            Some(Value::Array(_)) => return Err(ValidationError::new(name, "must not be empty")),
            _ => return Err(ValidationError::new(name, "must be an array of items")),
        };

        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| parse_item(name, index, entry))
            .collect()
    }
}

fn parse_item(name: &str, index: usize, entry: &Value) -> ValidationResult<OrderItem> {
    let field = format!("{}[{}]", name, index);
    let object = entry
        .as_object()
        .ok_or_else(|| ValidationError::new(&field, "must be an object"))?;

    let product_id = match object.get("productId").and_then(Value::as_str).map(str::trim) {
        Some(id) if is_product_id(id) => id.to_string(),
        _ => return Err(ValidationError::new(&field, "productId must be a product id")),
    };

    let quantity = object
        .get("quantity")
        .and_then(Value::as_u64)
        .and_then(|q| u32::try_from(q).ok())
        .ok_or_else(|| ValidationError::new(&field, "quantity must be a positive integer"))?;

    Ok(OrderItem {
        product_id,
        quantity,
    })
}
