use crate::result::{decoding_error, IonResult};
use crate::symbol::Symbol;

/// An immutable, named, versioned list of symbols. Shared tables are distributed out of
/// band and referenced from local symbol tables by `(name, version)`; the stream itself
/// never carries their text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedSymbolTable {
    name: String,
    version: u32,
    symbols: Vec<Symbol>,
}

impl SharedSymbolTable {
    /// Constructs a new shared table. Symbols with unknown text are legal; they occupy a
    /// SID slot without being resolvable.
    pub fn new<N: Into<String>, I: IntoIterator<Item = Symbol>>(
        name: N,
        version: u32,
        symbols: I,
    ) -> IonResult<SharedSymbolTable> {
        let name = name.into();
        if name.is_empty() {
            return decoding_error("shared symbol table names must not be empty");
        }
        if version < 1 {
            return decoding_error(format!(
                "shared symbol table versions must be >= 1, found {version}"
            ));
        }
        Ok(SharedSymbolTable {
            name,
            version,
            symbols: symbols.into_iter().collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// The number of symbols this table defines. An import may declare a larger `max_id`
    /// than this; the excess slots have unknown text.
    pub fn max_id(&self) -> usize {
        self.symbols.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_validates_identity() {
        assert!(SharedSymbolTable::new("", 1, []).is_err());
        assert!(SharedSymbolTable::new("table", 0, []).is_err());
        assert!(SharedSymbolTable::new("table", 1, []).is_ok());
    }

    #[test]
    fn max_id_tracks_symbol_count() -> IonResult<()> {
        let table = SharedSymbolTable::new(
            "table",
            2,
            [Symbol::owned("a"), Symbol::unknown_text(), Symbol::owned("c")],
        )?;
        assert_eq!(table.max_id(), 3);
        assert_eq!(table.symbols()[1].text(), None);
        Ok(())
    }
}
