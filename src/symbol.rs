//! Core symbol types for the inference engine.
//!
//! Symbols are the atomic units of every generation string. Each alphabet
//! entry is identified by a dense, non-negative [`SymbolId`] and described by
//! a [`Symbol`]. Two sentinel ids live outside that range:
//!
//! - [`SymbolId::ANY`] is a wildcard center symbol. As a context it stands
//!   for "no context" (the window ran off the string or the symbol is
//!   context-free).
//! - [`SymbolId::EMPTY`] stands for a zero-length successor or an exhausted
//!   context.
//!
//! The matching rules for both sentinels live in [`crate::sac::Sac::matches`].

use serde::{Deserialize, Serialize};

/// Reserved character for the wildcard symbol.
pub const ANY_SYMBOL: char = '*';
/// Reserved character for the empty symbol.
pub const EMPTY_SYMBOL: char = 'λ';
/// Reserved marker wrapping multi-character symbol names in flat strings.
pub const MULTICHAR_MARKER: char = '_';

/// Identifier of an alphabet symbol, or one of the two sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct SymbolId(i32);

impl SymbolId {
    /// Wildcard: matches any symbol or any context.
    pub const ANY: SymbolId = SymbolId(-1);
    /// Zero-length successor or exhausted context.
    pub const EMPTY: SymbolId = SymbolId(-2);

    /// Create the id of an alphabet entry from its dense index.
    pub fn from_index(index: usize) -> Self {
        SymbolId(index as i32)
    }

    /// Get the underlying value (negative for sentinels).
    pub fn get(self) -> i32 {
        self.0
    }

    /// Dense index into per-symbol tables, `None` for sentinels.
    pub fn index(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }

    /// Whether this is one of the two reserved sentinels.
    pub fn is_sentinel(self) -> bool {
        self.0 < 0
    }
}

impl std::fmt::Display for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            SymbolId::ANY => write!(f, "{ANY_SYMBOL}"),
            SymbolId::EMPTY => write!(f, "{EMPTY_SYMBOL}"),
            SymbolId(raw) => write!(f, "sym:{raw}"),
        }
    }
}

/// An alphabet entry.
///
/// Created once by its [`crate::alphabet::Alphabet`] and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Unique identifier assigned by the alphabet.
    pub id: SymbolId,
    /// Display name (one or more characters).
    pub label: String,
    /// The successor of this symbol is known to be itself.
    pub is_identity: bool,
    /// Context windows may not extend past this symbol.
    pub is_forbidden: bool,
}

impl Symbol {
    pub fn new(id: SymbolId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            is_identity: false,
            is_forbidden: false,
        }
    }

    /// Mark this symbol as an identity (its rule is `S -> S`).
    pub fn identity(mut self) -> Self {
        self.is_identity = true;
        self
    }

    /// Mark this symbol as a context barrier.
    pub fn forbidden(mut self) -> Self {
        self.is_forbidden = true;
        self
    }

    /// Whether the name needs [`MULTICHAR_MARKER`] delimiters in flat strings.
    pub fn is_multichar(&self) -> bool {
        self.label.chars().count() > 1
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_multichar() {
            write!(f, "{MULTICHAR_MARKER}{}{MULTICHAR_MARKER}", self.label)
        } else {
            write!(f, "{}", self.label)
        }
    }
}

/// Whether `c` is one of the reserved characters.
pub fn is_reserved(c: char) -> bool {
    matches!(c, ANY_SYMBOL | EMPTY_SYMBOL | MULTICHAR_MARKER)
}
