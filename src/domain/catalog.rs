//! Site catalog
//!
//! The catalog is a JSON array of items loaded once at startup. It is never
//! mutated afterwards and is shared read-only across all requests.

use std::path::Path;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::info;

/// Catalog loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One entry from the catalog file
///
/// Missing and `null` fields decode to their empty value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keyword_title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub texts: Vec<String>,
    /// Media files shown alongside the item, relative to the static root
    #[serde(default, deserialize_with = "null_as_default")]
    pub video_path: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub video_credit: Vec<String>,
    #[serde(rename = "ItemLink", default, deserialize_with = "null_as_default")]
    pub item_link: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The immutable list of items rendered on the home page
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    pub fn new(items: Vec<Item>) -> Self {
        Catalog { items }
    }

    /// Load and decode the catalog file
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let catalog = Self::from_json(&content).map_err(|source| CatalogError::Json {
            path: path.display().to_string(),
            source,
        })?;

        info!(
            path = %path.display(),
            items = catalog.len(),
            "Loaded catalog"
        );

        Ok(catalog)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let items: Vec<Item> = serde_json::from_str(json)?;
        Ok(Catalog { items })
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
