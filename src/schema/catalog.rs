//! Collection catalog loaded from metadata files
//!
//! - One file per collection at `<dir>/<name>.json`
//! - File shape: `{"collection": "users", "primary_key": ["_id"]}`
//! - `primary_key` may be empty or omitted (no primary key)
//! - Unreadable or malformed files fail the whole load

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::observability::Event;

use super::accessor::SchemaAccessor;
use super::errors::{SchemaError, SchemaResult};

/// Metadata for one collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionMeta {
    pub collection: String,
    #[serde(default)]
    pub primary_key: Vec<String>,
}

impl CollectionMeta {
    pub fn new<S: Into<String>>(collection: impl Into<String>, primary_key: impl IntoIterator<Item = S>) -> Self {
        Self {
            collection: collection.into(),
            primary_key: primary_key.into_iter().map(Into::into).collect(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.collection.is_empty() {
            return Err("collection name is empty".into());
        }
        // the name doubles as the metadata file stem
        if self.collection.contains(['/', '\\', '\0']) || self.collection.contains("..") {
            return Err(format!(
                "collection name {:?} contains a path separator or '..'",
                self.collection
            ));
        }
        if self.primary_key.iter().any(String::is_empty) {
            return Err("primary key field name is empty".into());
        }
        Ok(())
    }
}

/// In-memory catalog of collections and their primary keys
#[derive(Debug, Default)]
pub struct Catalog {
    collections: HashMap<String, CollectionMeta>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `*.json` file in `dir`.
    ///
    /// A missing directory yields an empty catalog.
    pub fn load_dir(dir: &Path) -> SchemaResult<Self> {
        let mut catalog = Self::new();

        if !dir.exists() {
            return Ok(catalog);
        }

        let entries = fs::read_dir(dir).map_err(|e| {
            SchemaError::malformed(
                dir.display().to_string(),
                format!("failed to read catalog directory: {}", e),
            )
        })?;

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed(
                    dir.display().to_string(),
                    format!("failed to read directory entry: {}", e),
                )
            })?;
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            paths.push(path);
        }

        // deterministic duplicate reporting
        paths.sort();
        for path in &paths {
            catalog.load_file(path)?;
        }

        info!(
            event = Event::CatalogLoaded.as_str(),
            dir = %dir.display(),
            collections = catalog.len(),
            "catalog loaded"
        );

        Ok(catalog)
    }

    fn load_file(&mut self, path: &Path) -> SchemaResult<()> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed(path.display().to_string(), format!("failed to read file: {}", e))
        })?;

        let meta: CollectionMeta = serde_json::from_str(&content).map_err(|e| {
            SchemaError::malformed(path.display().to_string(), format!("invalid JSON: {}", e))
        })?;

        meta.validate()
            .map_err(|e| SchemaError::malformed(path.display().to_string(), e))?;

        self.insert(meta)
    }

    /// Registers a collection directly
    pub fn register(&mut self, meta: CollectionMeta) -> SchemaResult<()> {
        meta.validate()
            .map_err(|e| SchemaError::malformed("<in-memory>", e))?;
        self.insert(meta)
    }

    fn insert(&mut self, meta: CollectionMeta) -> SchemaResult<()> {
        if self.collections.contains_key(&meta.collection) {
            return Err(SchemaError::DuplicateCollection(meta.collection));
        }
        self.collections.insert(meta.collection.clone(), meta);
        Ok(())
    }

    /// Writes a collection's metadata file into `dir`
    pub fn save(dir: &Path, meta: &CollectionMeta) -> SchemaResult<PathBuf> {
        meta.validate()
            .map_err(|e| SchemaError::malformed(dir.display().to_string(), e))?;

        let path = dir.join(format!("{}.json", meta.collection));
        if path.exists() {
            return Err(SchemaError::DuplicateCollection(meta.collection.clone()));
        }

        fs::create_dir_all(dir).map_err(|e| {
            SchemaError::malformed(
                dir.display().to_string(),
                format!("failed to create catalog directory: {}", e),
            )
        })?;

        let content = serde_json::to_string_pretty(meta).map_err(|e| {
            SchemaError::malformed(path.display().to_string(), format!("failed to serialize: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            SchemaError::malformed(path.display().to_string(), format!("failed to write file: {}", e))
        })?;

        Ok(path)
    }

    pub fn get(&self, collection: &str) -> Option<&CollectionMeta> {
        self.collections.get(collection)
    }

    pub fn contains(&self, collection: &str) -> bool {
        self.collections.contains_key(collection)
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

impl SchemaAccessor for Catalog {
    fn primary_key_fields(&self, collection: &str) -> SchemaResult<Vec<String>> {
        self.get(collection)
            .map(|meta| meta.primary_key.clone())
            .ok_or_else(|| SchemaError::UnknownCollection(collection.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_register_and_lookup() {
        let mut catalog = Catalog::new();
        catalog.register(CollectionMeta::new("users", ["_id"])).unwrap();
        catalog
            .register(CollectionMeta::new("events", Vec::<String>::new()))
            .unwrap();

        assert_eq!(catalog.primary_key_fields("users").unwrap(), vec!["_id"]);
        assert!(catalog.primary_key_fields("events").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_collection_is_an_error() {
        let catalog = Catalog::new();
        assert_eq!(
            catalog.primary_key_fields("nope"),
            Err(SchemaError::UnknownCollection("nope".into()))
        );
    }

    #[test]
    fn test_duplicate_registration() {
        let mut catalog = Catalog::new();
        catalog.register(CollectionMeta::new("users", ["_id"])).unwrap();
        let err = catalog.register(CollectionMeta::new("users", ["_id"])).unwrap_err();
        assert_eq!(err.code(), "DOCPROXY_SCHEMA_DUPLICATE");
    }

    #[test]
    fn test_invalid_meta_rejected() {
        let mut catalog = Catalog::new();
        assert!(catalog.register(CollectionMeta::new("", ["_id"])).is_err());
        assert!(catalog.register(CollectionMeta::new("c", [""])).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        Catalog::save(temp_dir.path(), &CollectionMeta::new("users", ["_id"])).unwrap();
        Catalog::save(temp_dir.path(), &CollectionMeta::new("orders", ["_id", "shard"])).unwrap();
        fs::write(temp_dir.path().join("README.txt"), "ignored").unwrap();

        let catalog = Catalog::load_dir(temp_dir.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.primary_key_fields("orders").unwrap(), vec!["_id", "shard"]);
    }

    #[test]
    fn test_missing_primary_key_defaults_to_empty() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("logs.json"), r#"{"collection": "logs"}"#).unwrap();

        let catalog = Catalog::load_dir(temp_dir.path()).unwrap();
        assert!(catalog.primary_key_fields("logs").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_file_fails_load() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("bad.json"), "{not json").unwrap();

        let err = Catalog::load_dir(temp_dir.path()).unwrap_err();
        assert!(matches!(err, SchemaError::MalformedMetadata { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_duplicate_across_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.json"), r#"{"collection": "c", "primary_key": ["_id"]}"#).unwrap();
        fs::write(temp_dir.path().join("b.json"), r#"{"collection": "c", "primary_key": ["_id"]}"#).unwrap();

        let err = Catalog::load_dir(temp_dir.path()).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateCollection("c".into()));
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let catalog = Catalog::load_dir(&temp_dir.path().join("absent")).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_save_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let meta = CollectionMeta::new("users", ["_id"]);
        Catalog::save(temp_dir.path(), &meta).unwrap();
        assert!(Catalog::save(temp_dir.path(), &meta).is_err());
    }

    #[test]
    fn test_path_like_collection_names_rejected() {
        let mut catalog = Catalog::new();
        for name in ["../escape", "a/b", "a\\b", "..", "nul\0byte"] {
            let err = catalog.register(CollectionMeta::new(name, ["_id"])).unwrap_err();
            assert!(matches!(err, SchemaError::MalformedMetadata { .. }), "{:?}", name);
        }
        // dots alone are fine
        catalog.register(CollectionMeta::new("system.users", ["_id"])).unwrap();
    }

    #[test]
    fn test_save_stays_inside_directory() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("catalog");

        let err = Catalog::save(&dir, &CollectionMeta::new("../escape", ["_id"])).unwrap_err();
        assert_eq!(err.code(), "DOCPROXY_SCHEMA_MALFORMED");
        assert!(!root.path().join("escape.json").exists());
        assert!(!dir.exists());

        assert!(Catalog::save(&dir, &CollectionMeta::new("a/b", ["_id"])).is_err());
        assert!(!dir.join("a").exists());
    }
}
