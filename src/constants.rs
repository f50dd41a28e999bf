pub(crate) mod v1_0 {
    pub const SYSTEM_SYMBOLS: &[&str] = &[
        "$0",                       // $0
        "$ion",                     // $1
        "$ion_1_0",                 // $2
        "$ion_symbol_table",        // $3
        "name",                     // $4
        "version",                  // $5
        "imports",                  // $6
        "symbols",                  // $7
        "max_id",                   // $8
        "$ion_shared_symbol_table", // $9
    ];

    /// The symbol IDs that Ion 1.0 permanently assigns to each system symbol. Unlike the texts
    /// above, these are addressed starting at `$1`; SID 0 is reserved and has no text.
    pub(crate) mod system_symbol_ids {
        use crate::types::SymbolId;

        pub const ION: SymbolId = 1;
        pub const ION_1_0: SymbolId = 2;
        pub const ION_SYMBOL_TABLE: SymbolId = 3;
        pub const NAME: SymbolId = 4;
        pub const VERSION: SymbolId = 5;
        pub const IMPORTS: SymbolId = 6;
        pub const SYMBOLS: SymbolId = 7;
        pub const MAX_ID: SymbolId = 8;
        pub const ION_SHARED_SYMBOL_TABLE: SymbolId = 9;
    }
}
