//! Catalog
//!
//! Product lookups happen before a selection reaches the cart. The cart itself never talks
//! to a catalog; line items carry their own product snapshot.

use std::{fs, io, path::Path};

use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::products::{Product, ProductError, ProductId, ProductRecord};

/// Catalog lookup errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("catalog {path} is unavailable")]
    Unavailable {
        /// Catalog location.
        path: String,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },

    /// The catalog could not be parsed.
    #[error("catalog is not valid YAML: {0}")]
    Malformed(#[from] serde_norway::Error),

    /// No product with this id.
    #[error("product {0} not found")]
    NotFound(ProductId),

    /// A catalog record failed validation.
    #[error("product {id} is invalid")]
    InvalidProduct {
        /// Offending record key.
        id: String,
        /// Validation failure.
        #[source]
        source: ProductError,
    },
}

/// Read access to product records.
pub trait Catalog {
    /// Fetch a product snapshot by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if there is no such product, or another
    /// [`CatalogError`] if the catalog cannot be consulted.
    fn product(&self, id: &ProductId) -> Result<Product, CatalogError>;
}

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
struct CatalogFile {
    /// Map of product id -> product record
    products: FxHashMap<String, ProductRecord>,
}

/// A catalog loaded from a YAML file of the form:
///
/// ```yaml
/// products:
///   tee-01:
///     name: Basic Tee
///     price: 60
///     stock: 10
///     sizes: [S, M, L]
///     colors:
///       - name: Sienna
///         code: "#a0522d"
/// ```
#[derive(Debug, Default)]
pub struct YamlCatalog {
    products: FxHashMap<ProductId, Product>,
}

impl YamlCatalog {
    /// Load a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unavailable`] if the file cannot be read, or any error from
    /// [`YamlCatalog::from_yaml`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path).map_err(|source| CatalogError::Unavailable {
            path: path.display().to_string(),
            source,
        })?;

        let catalog = Self::from_yaml(&contents)?;

        debug!(path = %path.display(), products = catalog.len(), "loaded catalog");

        Ok(catalog)
    }

    /// Parse a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Malformed`] for invalid YAML, or
    /// [`CatalogError::InvalidProduct`] for the first record that fails validation.
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_norway::from_str(yaml)?;

        let products = file
            .products
            .into_iter()
            .map(|(key, mut record)| {
                record.id.clone_from(&key);

                Product::try_from(record)
                    .map(|product| (product.id().clone(), product))
                    .map_err(|source| CatalogError::InvalidProduct { id: key, source })
            })
            .collect::<Result<_, _>>()?;

        Ok(Self { products })
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl Catalog for YamlCatalog {
    fn product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        self.products
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }
}
