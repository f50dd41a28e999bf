use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Stores or points to the text of a given [Symbol].
#[derive(Debug, Clone, Eq)]
pub(crate) enum SymbolText {
    // This symbol's text is shared with the symbol table that resolved it. Cloning it is an
    // atomic increment rather than a copy of the text.
    Shared(Arc<str>),
    // This symbol's text is owned outright, usually because the application constructed it.
    Owned(String),
    // This symbol has unknown text, like `$0` or a padded shared-table import slot.
    Unknown,
}

impl SymbolText {
    fn text(&self) -> Option<&str> {
        let text = match self {
            SymbolText::Shared(text) => text.as_ref(),
            SymbolText::Owned(text) => text.as_str(),
            SymbolText::Unknown => return None,
        };
        Some(text)
    }
}

impl PartialEq for SymbolText {
    fn eq(&self, other: &Self) -> bool {
        self.text() == other.text()
    }
}

impl Hash for SymbolText {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text().hash(state)
    }
}

/// A fully resolved symbol: either text that some symbol table knows, or explicitly
/// unknown text (the application-visible face of `$0` and padded import slots).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub(crate) text: SymbolText,
}

impl Symbol {
    pub fn owned<T: Into<String>>(text: T) -> Symbol {
        Symbol {
            text: SymbolText::Owned(text.into()),
        }
    }

    pub fn shared(text: Arc<str>) -> Symbol {
        Symbol {
            text: SymbolText::Shared(text),
        }
    }

    pub fn unknown_text() -> Symbol {
        Symbol {
            text: SymbolText::Unknown,
        }
    }

    /// If this symbol has known text, returns `Some(&str)`. Otherwise, returns `None`.
    pub fn text(&self) -> Option<&str> {
        self.text.text()
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.text(), other.text()) {
            // If both symbols have known text, delegate the comparison to their text.
            (Some(this), Some(that)) => this.cmp(that),
            // Otherwise, unknown text is treated as 'less than' known text
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.text() {
            Some(text) => write!(f, "{text}"),
            None => write!(f, "$0"),
        }
    }
}

impl From<&str> for Symbol {
    fn from(text: &str) -> Self {
        Symbol::owned(text)
    }
}

impl From<String> for Symbol {
    fn from(text: String) -> Self {
        Symbol::owned(text)
    }
}

impl From<Arc<str>> for Symbol {
    fn from(text: Arc<str>) -> Self {
        Symbol::shared(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_and_owned_text_compare_equal() {
        let shared = Symbol::shared(Arc::from("hello"));
        let owned = Symbol::owned("hello");
        assert_eq!(shared, owned);
    }

    #[test]
    fn unknown_text_sorts_first() {
        let mut symbols = vec![Symbol::owned("a"), Symbol::unknown_text()];
        symbols.sort();
        assert_eq!(symbols[0].text(), None);
    }

    #[test]
    fn unknown_text_equals_itself() {
        assert_eq!(Symbol::unknown_text(), Symbol::unknown_text());
    }
}
