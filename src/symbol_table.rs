use std::collections::HashMap;
use std::sync::Arc;

use crate::constants::v1_0;
use crate::shared_symbol_table::SharedSymbolTable;
use crate::symbol::Symbol;
use crate::types::SymbolId;

/// A shared table reference as it appears in a local symbol table's `imports` list: the
/// table (or as much of it as could be resolved) plus the number of SID slots it claims.
///
/// An import whose declared `max_id` exceeds the table's own symbol count pads the excess
/// slots with unknown text; a `max_id` smaller than the symbol count truncates the table.
#[derive(Debug, Clone)]
pub struct Import {
    table: Arc<SharedSymbolTable>,
    max_id: usize,
}

impl Import {
    pub fn new(table: Arc<SharedSymbolTable>, declared_max_id: Option<usize>) -> Import {
        let max_id = declared_max_id.unwrap_or_else(|| table.max_id());
        Import { table, max_id }
    }

    pub fn name(&self) -> &str {
        self.table.name()
    }

    pub fn version(&self) -> u32 {
        self.table.version()
    }

    /// The number of SID slots this import occupies in the local table.
    pub fn max_id(&self) -> usize {
        self.max_id
    }

    /// The text for the slot at `offset` (zero-based within this import), if known.
    fn symbol_at(&self, offset: usize) -> Symbol {
        self.table
            .symbols()
            .get(offset)
            .cloned()
            .unwrap_or_else(Symbol::unknown_text)
    }
}

/// A local symbol table: the system symbols, the slots contributed by each import in
/// order, and any locally defined symbols appended after them.
///
/// The table is append-only. SIDs are assigned contiguously: SID 0 is reserved, SIDs 1-9
/// belong to the system table, each import then claims `max_id` slots in declaration
/// order, and local symbols follow. Interning new text always produces `max_id() + 1`.
pub struct SymbolTable {
    imports: Vec<Import>,
    symbols_by_id: Vec<Symbol>,
    ids_by_text: HashMap<String, SymbolId>,
    // The index at which locally defined symbols begin
    local_start: usize,
}

impl SymbolTable {
    /// Constructs a symbol table containing only the system symbols.
    pub fn new() -> SymbolTable {
        SymbolTable::with_imports(Vec::new())
    }

    /// Constructs a symbol table whose SID space layers the provided imports (in order)
    /// between the system symbols and any local symbols interned later.
    pub fn with_imports(imports: Vec<Import>) -> SymbolTable {
        let mut symbol_table = SymbolTable {
            imports,
            symbols_by_id: Vec::with_capacity(v1_0::SYSTEM_SYMBOLS.len()),
            ids_by_text: HashMap::new(),
            local_start: 0,
        };
        symbol_table.initialize();
        symbol_table
    }

    fn initialize(&mut self) {
        // SID 0 is reserved; its text is unknown by definition
        self.symbols_by_id.push(Symbol::unknown_text());
        for text in &v1_0::SYSTEM_SYMBOLS[1..] {
            self.insert_symbol(Symbol::owned(*text));
        }
        // Each import contributes exactly max_id slots, known text or not
        let imports = std::mem::take(&mut self.imports);
        for import in &imports {
            for offset in 0..import.max_id() {
                self.insert_symbol(import.symbol_at(offset));
            }
        }
        self.imports = imports;
        self.local_start = self.symbols_by_id.len();
    }

    fn insert_symbol(&mut self, symbol: Symbol) -> SymbolId {
        let id = self.symbols_by_id.len();
        if let Some(text) = symbol.text() {
            // The lowest SID for a given text wins; later duplicates resolve to it
            self.ids_by_text.entry(text.to_string()).or_insert(id);
        }
        self.symbols_by_id.push(symbol);
        id
    }

    /// Restores the table to its freshly-constructed state, discarding local symbols but
    /// keeping the configured imports.
    pub fn reset(&mut self) {
        self.symbols_by_id.clear();
        self.ids_by_text.clear();
        self.initialize();
    }

    /// Returns the SID already associated with `text`, interning it as a new local symbol
    /// if no system symbol, import, or earlier local defines it.
    pub fn intern<A: AsRef<str>>(&mut self, text: A) -> SymbolId {
        let text = text.as_ref();
        if let Some(id) = self.ids_by_text.get(text) {
            return *id;
        }
        self.insert_symbol(Symbol::owned(text))
    }

    /// Appends a symbol unconditionally, claiming a fresh SID slot even if the same text
    /// is already defined. This mirrors the `symbols` list of an encoded local symbol
    /// table, where every entry occupies a slot; entries with unknown text (declared with
    /// non-string values) can never be looked up by text.
    pub fn append_symbol(&mut self, symbol: Symbol) -> SymbolId {
        self.insert_symbol(symbol)
    }

    /// If defined, returns the SID associated with the provided text.
    pub fn sid_for<A: AsRef<str>>(&self, text: &A) -> Option<SymbolId> {
        self.ids_by_text.get(text.as_ref()).copied()
    }

    /// If `sid` is in range, returns the text associated with it. A `None` return means
    /// the SID is out of range *or* maps to unknown text; use [SymbolTable::symbol_for]
    /// to tell the two apart.
    pub fn text_for(&self, sid: SymbolId) -> Option<&str> {
        self.symbols_by_id.get(sid)?.text()
    }

    /// If `sid` is in range, returns the corresponding [Symbol].
    pub fn symbol_for(&self, sid: SymbolId) -> Option<&Symbol> {
        self.symbols_by_id.get(sid)
    }

    /// Returns true if `sid` maps to a slot in this table.
    pub fn sid_is_valid(&self, sid: SymbolId) -> bool {
        sid < self.symbols_by_id.len()
    }

    /// The highest SID this table defines.
    pub fn max_id(&self) -> usize {
        self.symbols_by_id.len() - 1
    }

    /// The number of slots in this table, including SID 0.
    pub fn len(&self) -> usize {
        self.symbols_by_id.len()
    }

    pub fn imports(&self) -> &[Import] {
        &self.imports
    }

    pub fn has_imports(&self) -> bool {
        !self.imports.is_empty()
    }

    /// The symbols that were interned into this table, beyond the system and imported ones.
    pub fn local_symbols(&self) -> &[Symbol] {
        &self.symbols_by_id[self.local_start..]
    }

    pub fn has_local_symbols(&self) -> bool {
        self.symbols_by_id.len() > self.local_start
    }

    /// All of the table's symbols in SID order, starting with `$0`.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols_by_id
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::IonResult;

    fn bogus_import(max_id: usize) -> IonResult<Import> {
        let table = SharedSymbolTable::new("bogus", 42, [])?;
        Ok(Import::new(Arc::new(table), Some(max_id)))
    }

    #[test]
    fn system_symbols_are_predefined() {
        let table = SymbolTable::new();
        assert_eq!(table.text_for(1), Some("$ion"));
        assert_eq!(table.text_for(3), Some("$ion_symbol_table"));
        assert_eq!(table.text_for(9), Some("$ion_shared_symbol_table"));
        assert_eq!(table.max_id(), 9);
        assert_eq!(table.text_for(0), None);
    }

    #[test]
    fn interning_system_text_does_not_grow_the_table() {
        let mut table = SymbolTable::new();
        let before = table.len();
        assert_eq!(table.intern("name"), 4);
        assert_eq!(table.len(), before);
    }

    #[test]
    fn interning_fresh_text_appends() {
        let mut table = SymbolTable::new();
        let first = table.intern("foo");
        let second = table.intern("bar");
        assert_eq!(first, 10);
        assert_eq!(second, 11);
        // Interning is idempotent
        assert_eq!(table.intern("foo"), first);
        assert_eq!(table.local_symbols().len(), 2);
    }

    #[test]
    fn every_interned_text_resolves_to_itself() {
        let mut table = SymbolTable::new();
        for text in ["alpha", "beta", "gamma", "name", "$ion"] {
            let sid = table.intern(text);
            assert_eq!(table.text_for(sid), Some(text));
            assert_eq!(table.sid_for(&text), Some(sid));
        }
    }

    #[test]
    fn imports_claim_contiguous_sid_ranges() -> IonResult<()> {
        let first = SharedSymbolTable::new("first", 1, [Symbol::owned("a"), Symbol::owned("b")])?;
        let second = SharedSymbolTable::new("second", 1, [Symbol::owned("c")])?;
        let mut table = SymbolTable::with_imports(vec![
            Import::new(Arc::new(first), None),
            Import::new(Arc::new(second), None),
        ]);
        assert_eq!(table.text_for(10), Some("a"));
        assert_eq!(table.text_for(11), Some("b"));
        assert_eq!(table.text_for(12), Some("c"));
        // Locals begin after the last import
        assert_eq!(table.intern("d"), 13);
        Ok(())
    }

    #[test]
    fn padded_import_slots_have_unknown_text() -> IonResult<()> {
        let mut table = SymbolTable::with_imports(vec![bogus_import(100)?]);
        // Slots 10-109 belong to the import even though it defines no symbols
        assert!(table.sid_is_valid(109));
        assert_eq!(table.text_for(50), None);
        assert!(table.symbol_for(50).is_some());
        assert_eq!(table.intern("foo"), 110);
        assert_eq!(table.intern("bar"), 111);
        assert_eq!(table.max_id(), 111);
        Ok(())
    }

    #[test]
    fn truncated_imports_hide_excess_symbols() -> IonResult<()> {
        let shared =
            SharedSymbolTable::new("shared", 1, [Symbol::owned("a"), Symbol::owned("b")])?;
        let table = SymbolTable::with_imports(vec![Import::new(Arc::new(shared), Some(1))]);
        assert_eq!(table.text_for(10), Some("a"));
        assert!(!table.sid_is_valid(11));
        Ok(())
    }

    #[test]
    fn first_matching_import_wins() -> IonResult<()> {
        let first = SharedSymbolTable::new("first", 1, [Symbol::owned("dup")])?;
        let second = SharedSymbolTable::new("second", 1, [Symbol::owned("dup")])?;
        let mut table = SymbolTable::with_imports(vec![
            Import::new(Arc::new(first), None),
            Import::new(Arc::new(second), None),
        ]);
        assert_eq!(table.sid_for(&"dup"), Some(10));
        // Interning resolves to the first occurrence rather than appending
        assert_eq!(table.intern("dup"), 10);
        Ok(())
    }

    #[test]
    fn reset_discards_locals_but_keeps_imports() -> IonResult<()> {
        let mut table = SymbolTable::with_imports(vec![bogus_import(5)?]);
        table.intern("foo");
        assert!(table.has_local_symbols());
        table.reset();
        assert!(!table.has_local_symbols());
        assert!(table.has_imports());
        assert_eq!(table.max_id(), 14);
        Ok(())
    }

    #[test]
    fn appended_placeholders_claim_slots_without_text() {
        let mut table = SymbolTable::new();
        let sid = table.append_symbol(Symbol::unknown_text());
        assert_eq!(sid, 10);
        assert_eq!(table.text_for(sid), None);
        assert_eq!(table.intern("after"), 11);
    }

    #[test]
    fn appending_duplicate_text_claims_a_fresh_slot() {
        let mut table = SymbolTable::new();
        let first = table.append_symbol(Symbol::owned("dup"));
        let second = table.append_symbol(Symbol::owned("dup"));
        assert_ne!(first, second);
        // Text lookups resolve to the first occurrence
        assert_eq!(table.sid_for(&"dup"), Some(first));
        assert_eq!(table.text_for(second), Some("dup"));
    }
}
