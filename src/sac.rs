//! Symbol-and-context (SaC): the predecessor pattern a rule is keyed on.
//!
//! A [`Sac`] is a left-context window, a center symbol and a right-context
//! window. Solving the grammar means finding, for every distinct SaC that
//! occurs before the last generation, the successor it always produces.
//!
//! "No context" is stored canonically as `[ANY]`, so structural equality and
//! hashing treat an empty window, `[ANY]` and `[EMPTY]` alike. Pattern
//! matching with wildcards is a separate, asymmetric operation:
//! [`Sac::matches`].

use serde::{Deserialize, Serialize};

use crate::alphabet::Alphabet;
use crate::error::{LsysResult, SacError};
use crate::symbol::SymbolId;

/// Context-window radius: `left` symbols (k) and `right` symbols (l).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ContextRadius {
    pub left: usize,
    pub right: usize,
}

impl ContextRadius {
    pub fn new(left: usize, right: usize) -> Self {
        Self { left, right }
    }

    /// Context-free (0L) radius.
    pub const ZERO: ContextRadius = ContextRadius { left: 0, right: 0 };
}

impl std::fmt::Display for ContextRadius {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.left, self.right)
    }
}

/// A predecessor pattern: left context, symbol, right context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Sac {
    left: Vec<SymbolId>,
    symbol: SymbolId,
    right: Vec<SymbolId>,
}

impl Sac {
    /// Create a SaC, failing if a context is wider than the radius allows.
    pub fn new(
        left: Vec<SymbolId>,
        symbol: SymbolId,
        right: Vec<SymbolId>,
        radius: ContextRadius,
    ) -> Result<Self, SacError> {
        let sac = Self::from_parts(left, symbol, right);
        if sac.has_left() && sac.left.len() > radius.left {
            return Err(SacError::ContextTooWide {
                side: "left",
                actual: sac.left.len(),
                radius: radius.left,
            });
        }
        if sac.has_right() && sac.right.len() > radius.right {
            return Err(SacError::ContextTooWide {
                side: "right",
                actual: sac.right.len(),
                radius: radius.right,
            });
        }
        Ok(sac)
    }

    /// The context-free pattern `* < symbol > *`.
    ///
    /// Identity symbols always get this pattern: their rule is known, so
    /// their context carries no evidence.
    pub fn context_free(symbol: SymbolId) -> Self {
        Self {
            left: vec![SymbolId::ANY],
            symbol,
            right: vec![SymbolId::ANY],
        }
    }

    /// Build without a radius check. Contexts are canonicalised.
    pub(crate) fn from_parts(left: Vec<SymbolId>, symbol: SymbolId, right: Vec<SymbolId>) -> Self {
        Self {
            left: canonical_context(left),
            symbol,
            right: canonical_context(right),
        }
    }

    pub fn symbol(&self) -> SymbolId {
        self.symbol
    }

    /// Left context, nearest symbol last. `[ANY]` when there is none.
    pub fn left(&self) -> &[SymbolId] {
        &self.left
    }

    /// Right context, nearest symbol first. `[ANY]` when there is none.
    pub fn right(&self) -> &[SymbolId] {
        &self.right
    }

    pub fn has_left(&self) -> bool {
        !is_no_context(&self.left)
    }

    pub fn has_right(&self) -> bool {
        !is_no_context(&self.right)
    }

    /// Whether this pattern is keyed on the symbol alone.
    pub fn is_context_free(&self) -> bool {
        !self.has_left() && !self.has_right()
    }

    /// Pattern match `self` against an occurrence `other`.
    ///
    /// - The center matches when equal or when the pattern's is
    ///   [`SymbolId::ANY`].
    /// - A missing context (empty, `ANY` or `EMPTY`) matches only a missing
    ///   context on the other side.
    /// - A present context must equal the other side's exactly.
    pub fn matches(&self, other: &Sac) -> bool {
        let symbol_ok = self.symbol == other.symbol || self.symbol == SymbolId::ANY;
        let left_ok = match (self.has_left(), other.has_left()) {
            (false, false) => true,
            (true, true) => self.left == other.left,
            _ => false,
        };
        let right_ok = match (self.has_right(), other.has_right()) {
            (false, false) => true,
            (true, true) => self.right == other.right,
            _ => false,
        };
        symbol_ok && left_ok && right_ok
    }

    /// Render in `L<S>R` notation; a missing side is omitted.
    pub fn display(&self, alphabet: &Alphabet) -> String {
        let mut out = String::new();
        if self.has_left() {
            out.push_str(&alphabet.render(&self.left));
            out.push('<');
        }
        out.push_str(&alphabet.render(std::slice::from_ref(&self.symbol)));
        if self.has_right() {
            out.push('>');
            out.push_str(&alphabet.render(&self.right));
        }
        out
    }

    /// Parse `L<S>R` notation (either side optional) against an alphabet.
    pub fn parse(input: &str, alphabet: &Alphabet) -> LsysResult<Self> {
        let malformed = || SacError::Malformed {
            input: input.to_string(),
        };
        let (left, rest) = match input.split_once('<') {
            Some((l, r)) => (l, r),
            None => ("", input),
        };
        let (center, right) = match rest.split_once('>') {
            Some((c, r)) => (c, r),
            None => (rest, ""),
        };
        let symbol = match alphabet.tokenize(center)?.as_slice() {
            [single] => *single,
            _ => return Err(malformed().into()),
        };
        if (input.contains('<') && left.is_empty()) || (input.contains('>') && right.is_empty()) {
            return Err(malformed().into());
        }
        Ok(Self::from_parts(
            alphabet.tokenize(left)?,
            symbol,
            alphabet.tokenize(right)?,
        ))
    }
}

fn is_no_context(context: &[SymbolId]) -> bool {
    matches!(context, [] | [SymbolId::ANY] | [SymbolId::EMPTY])
}

fn canonical_context(context: Vec<SymbolId>) -> Vec<SymbolId> {
    if is_no_context(&context) {
        vec![SymbolId::ANY]
    } else {
        context
    }
}
