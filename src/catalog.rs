use std::collections::HashMap;
use std::sync::Arc;

use crate::shared_symbol_table::SharedSymbolTable;

/// A read-only collection of [SharedSymbolTable]s, keyed by name and version. A reader
/// consults its catalog to resolve the imports a local symbol table declares; imports the
/// catalog cannot satisfy are padded with unknown-text slots up to their declared `max_id`.
///
/// Catalogs are configured once and then only read, so they may be shared freely between
/// readers and writers.
pub trait Catalog {
    /// Returns the table with the given name and exact version, if present.
    fn table(&self, name: &str, version: u32) -> Option<Arc<SharedSymbolTable>>;

    /// Returns the highest version of the named table, if any version is present. Used as
    /// a fallback when an exact version match fails and the import declares a `max_id`.
    fn latest_table(&self, name: &str) -> Option<Arc<SharedSymbolTable>>;
}

/// A [Catalog] backed by an in-memory map.
#[derive(Debug, Default)]
pub struct MapCatalog {
    tables_by_name: HashMap<String, Vec<Arc<SharedSymbolTable>>>,
}

impl MapCatalog {
    pub fn new() -> MapCatalog {
        MapCatalog::default()
    }

    /// Adds the provided table to the catalog, replacing any existing table with the same
    /// name and version.
    pub fn insert_table(&mut self, table: SharedSymbolTable) {
        let versions = self
            .tables_by_name
            .entry(table.name().to_string())
            .or_default();
        let table = Arc::new(table);
        match versions.binary_search_by_key(&table.version(), |existing| existing.version()) {
            Ok(index) => versions[index] = table,
            Err(index) => versions.insert(index, table),
        }
    }
}

impl Catalog for MapCatalog {
    fn table(&self, name: &str, version: u32) -> Option<Arc<SharedSymbolTable>> {
        self.tables_by_name
            .get(name)?
            .iter()
            .find(|table| table.version() == version)
            .map(Arc::clone)
    }

    fn latest_table(&self, name: &str) -> Option<Arc<SharedSymbolTable>> {
        self.tables_by_name.get(name)?.last().map(Arc::clone)
    }
}
