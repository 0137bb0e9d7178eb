//! # Product Catalog
//!
//! Read-only over HTTP. Records are created by `orderdesk import-products`.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::errors::{ShopError, ShopResult};
use crate::store::{RecordStore, StoreError, PRODUCTS};

/// Whether `candidate` can be a product id: a short slug of ASCII
/// letters, digits, `-` and `_`, starting with a letter or digit
pub fn is_product_id(candidate: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]{0,63}$")
                .unwrap_or_else(|e| unreachable!("static product id pattern: {e}"))
        })
        .is_match(candidate)
}

/// Product record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: u64,
}

/// Outcome of a bulk import
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub created: Vec<String>,
    pub skipped: Vec<String>,
}

/// Product catalog over a record store
pub struct ProductCatalog<S: RecordStore> {
    store: Arc<S>,
}

impl<S: RecordStore> ProductCatalog<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// All products, ordered by id
    pub fn list(&self) -> ShopResult<Vec<Product>> {
        let mut products = Vec::new();
        for id in self.store.list(PRODUCTS)? {
            match self.store.read_as::<Product>(PRODUCTS, &id) {
                Ok(product) => products.push(product),
                // Removed between listing and reading
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(products)
    }

    /// One product by id
    pub fn get(&self, id: &str) -> ShopResult<Product> {
        self.store.read_as(PRODUCTS, id).map_err(|e| {
            if e.is_not_found() {
                ShopError::ProductNotFound(id.to_string())
            } else {
                e.into()
            }
        })
    }

    /// Create product records; ids that already exist are skipped, not
    /// overwritten.
    pub fn import(&self, products: &[Product]) -> ShopResult<ImportReport> {
        let mut report = ImportReport::default();
        // Reject the whole batch before writing anything
        for product in products {
            if !is_product_id(&product.id) {
                return Err(ShopError::InvalidProduct(product.id.clone()));
            }
            if product.name.trim().is_empty() {
                return Err(ShopError::InvalidProduct(format!("{} has no name", product.id)));
            }
        }

        for product in products {
            match self.store.create_as(PRODUCTS, &product.id, product) {
                Ok(()) => report.created.push(product.id.clone()),
                Err(StoreError::AlreadyExists { .. }) => report.skipped.push(product.id.clone()),
                Err(StoreError::InvalidKey(key)) => {
                    return Err(ShopError::InvalidProduct(key))
                }
                Err(e) => return Err(ShopError::PersistFailure(e.to_string())),
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FileRecordStore;
    use tempfile::TempDir;

    fn product(id: &str, price_cents: u64) -> Product {
        Product {
            id: id.to_string(),
            name: id.to_uppercase(),
            description: String::new(),
            price_cents,
        }
    }

    fn catalog() -> (TempDir, ProductCatalog<FileRecordStore>) {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(FileRecordStore::new(temp.path().to_path_buf()));
        (temp, ProductCatalog::new(store))
    }

    #[test]
    fn test_import_and_list() {
        let (_temp, catalog) = catalog();
        let report = catalog
            .import(&[product("pizza", 1200), product("cola", 250)])
            .unwrap();
        assert_eq!(report.created, vec!["pizza", "cola"]);

        let listed: Vec<_> = catalog.list().unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(listed, vec!["cola", "pizza"]);
    }

    #[test]
    fn test_import_skips_existing() {
        let (_temp, catalog) = catalog();
        catalog.import(&[product("pizza", 1200)]).unwrap();

        let report = catalog.import(&[product("pizza", 1), product("salad", 800)]).unwrap();
        assert_eq!(report.skipped, vec!["pizza"]);
        assert_eq!(report.created, vec!["salad"]);
        assert_eq!(catalog.get("pizza").unwrap().price_cents, 1200);
    }

    #[test]
    fn test_get_missing_product() {
        let (_temp, catalog) = catalog();
        assert!(matches!(catalog.get("nothing"), Err(ShopError::ProductNotFound(_))));
        assert!(catalog.list().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_batch_writes_nothing() {
        let (_temp, catalog) = catalog();
        let result = catalog.import(&[product("pizza", 1200), product("../etc", 1)]);

        assert!(matches!(result, Err(ShopError::InvalidProduct(_))));
        assert!(catalog.list().unwrap().is_empty());
    }

    #[test]
    fn test_product_ids() {
        assert!(is_product_id("pizza"));
        assert!(is_product_id("large-pizza_2"));
        assert!(!is_product_id(""));
        assert!(!is_product_id("-pizza"));
        assert!(!is_product_id("a/b"));
        assert!(!is_product_id("pizza.json"));
    }
}
