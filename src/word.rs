//! Word: one generation string re-expressed as SaC occurrences.
//!
//! [`Word::from_string`] slides a `(k, l)` window across the generation. At
//! every position the window collects up to `k` symbols to the left and `l`
//! to the right, skipping ignored symbols and stopping at (and excluding)
//! the nearest forbidden symbol or the string boundary. Identity symbols get
//! the context-free pattern since their rule needs no context evidence.
//!
//! Occurrence tables are derived once per radius. Changing the radius means
//! building a new word ([`Word::with_radius`]), never patching the tables.

use std::collections::HashMap;

use crate::alphabet::Alphabet;
use crate::error::LsysResult;
use crate::sac::{ContextRadius, Sac};
use crate::symbol::SymbolId;

/// Direction of a context window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// One generation of the evidence.
#[derive(Debug, Clone)]
pub struct Word {
    raw: String,
    symbols: Vec<SymbolId>,
    radius: ContextRadius,
    /// One SaC per position.
    sacs: Vec<Sac>,
    /// Distinct SaCs in first-occurrence order.
    distinct: Vec<Sac>,
    sac_counts: HashMap<Sac, usize>,
    symbol_counts: HashMap<SymbolId, usize>,
}

impl Word {
    /// Build a word from a flat generation string. Unknown symbols are an error.
    pub fn from_string(raw: &str, alphabet: &Alphabet, radius: ContextRadius) -> LsysResult<Self> {
        let symbols: Vec<SymbolId> = alphabet
            .tokenize(raw)?
            .into_iter()
            .filter(|&id| id != SymbolId::EMPTY)
            .collect();
        Ok(Self::from_symbols(raw.to_string(), symbols, alphabet, radius))
    }

    fn from_symbols(
        raw: String,
        symbols: Vec<SymbolId>,
        alphabet: &Alphabet,
        radius: ContextRadius,
    ) -> Self {
        let sacs: Vec<Sac> = (0..symbols.len())
            .map(|i| {
                let center = symbols[i];
                if alphabet.is_identity(center) {
                    Sac::context_free(center)
                } else {
                    Sac::from_parts(
                        context_window(&symbols, i, alphabet, Side::Left, Some(radius.left)),
                        center,
                        context_window(&symbols, i, alphabet, Side::Right, Some(radius.right)),
                    )
                }
            })
            .collect();

        let mut distinct = Vec::new();
        let mut sac_counts: HashMap<Sac, usize> = HashMap::new();
        for sac in &sacs {
            let count = sac_counts.entry(sac.clone()).or_insert(0);
            if *count == 0 {
                distinct.push(sac.clone());
            }
            *count += 1;
        }

        let mut symbol_counts: HashMap<SymbolId, usize> = HashMap::new();
        for &id in &symbols {
            *symbol_counts.entry(id).or_insert(0) += 1;
        }

        Self {
            raw,
            symbols,
            radius,
            sacs,
            distinct,
            sac_counts,
            symbol_counts,
        }
    }

    /// Rebuild this generation at a different radius.
    pub fn with_radius(&self, alphabet: &Alphabet, radius: ContextRadius) -> Self {
        Self::from_symbols(self.raw.clone(), self.symbols.clone(), alphabet, radius)
    }

    /// The raw generation string.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Number of symbols in the generation.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[SymbolId] {
        &self.symbols
    }

    pub fn radius(&self) -> ContextRadius {
        self.radius
    }

    /// The SaC at every position, in order.
    pub fn sacs(&self) -> &[Sac] {
        &self.sacs
    }

    /// Distinct SaCs in first-occurrence order.
    pub fn distinct_sacs(&self) -> &[Sac] {
        &self.distinct
    }

    pub fn contains(&self, sac: &Sac) -> bool {
        self.sac_counts.contains_key(sac)
    }

    /// Occurrences of a SaC in this generation.
    pub fn sac_count(&self, sac: &Sac) -> usize {
        self.sac_counts.get(sac).copied().unwrap_or(0)
    }

    /// Occurrences of a symbol in this generation.
    pub fn symbol_count(&self, id: SymbolId) -> usize {
        self.symbol_counts.get(&id).copied().unwrap_or(0)
    }

    /// Reconstruct the generation string from the SaC centers.
    pub fn to_flat_string(&self, alphabet: &Alphabet) -> String {
        let centers: Vec<SymbolId> = self.sacs.iter().map(Sac::symbol).collect();
        alphabet.render(&centers)
    }
}

/// Collect the context window on one side of position `index`.
///
/// Ignored symbols are skipped, forbidden symbols end the window. `limit`
/// caps the window size; `None` measures the full available depth. The
/// left window is returned in string order (nearest symbol last).
pub(crate) fn context_window(
    symbols: &[SymbolId],
    index: usize,
    alphabet: &Alphabet,
    side: Side,
    limit: Option<usize>,
) -> Vec<SymbolId> {
    let limit = limit.unwrap_or(usize::MAX);
    let mut window = Vec::new();
    if limit == 0 {
        return window;
    }

    let neighbours: Box<dyn Iterator<Item = &SymbolId>> = match side {
        Side::Left => Box::new(symbols[..index].iter().rev()),
        Side::Right => Box::new(symbols[index + 1..].iter()),
    };
    for &id in neighbours {
        if alphabet.is_forbidden(id) {
            break;
        }
        if alphabet.is_ignored(id) {
            continue;
        }
        window.push(id);
        if window.len() == limit {
            break;
        }
    }

    if side == Side::Left {
        window.reverse();
    }
    window
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turtle(strings: &[&str]) -> Alphabet {
        Alphabet::builder()
            .strings(strings.iter().copied())
            .turtle_2d()
            .build()
            .unwrap()
    }

    #[test]
    fn context_free_words_count_symbols() {
        let alphabet = Alphabet::builder().strings(["ABABBBABA"]).build().unwrap();
        let word = Word::from_string("ABABBBABA", &alphabet, ContextRadius::ZERO).unwrap();
        let a = alphabet.id("A").unwrap();
        let b = alphabet.id("B").unwrap();
        assert_eq!(word.len(), 9);
        assert_eq!(word.sac_count(&Sac::context_free(a)), 4);
        assert_eq!(word.sac_count(&Sac::context_free(b)), 5);
        assert_eq!(word.symbol_count(b), 5);
        assert_eq!(word.distinct_sacs().len(), 2);
    }

    #[test]
    fn windows_stop_at_string_edges() {
        let alphabet = Alphabet::builder().strings(["ABC"]).build().unwrap();
        let word = Word::from_string("ABC", &alphabet, ContextRadius::new(1, 1)).unwrap();
        let [a, b, c] = [0, 1, 2].map(SymbolId::from_index);
        assert_eq!(word.sacs()[0], Sac::from_parts(vec![], a, vec![b]));
        assert_eq!(word.sacs()[1], Sac::from_parts(vec![a], b, vec![c]));
        assert_eq!(word.sacs()[2], Sac::from_parts(vec![b], c, vec![]));
        assert!(!word.sacs()[0].has_left());
    }

    #[test]
    fn windows_stop_at_forbidden_symbols() {
        let alphabet = turtle(&["A[B]C"]);
        let word = Word::from_string("A[B]C", &alphabet, ContextRadius::new(2, 2)).unwrap();
        let b = alphabet.id("B").unwrap();
        // B is enclosed by brackets: no context on either side.
        assert_eq!(word.sacs()[2], Sac::context_free(b));
        // Brackets themselves are identities.
        assert!(word.sacs()[1].is_context_free());
    }

    #[test]
    fn ignored_symbols_are_skipped() {
        let alphabet = Alphabet::builder()
            .strings(["A+B+C"])
            .ignore(["+"])
            .build()
            .unwrap();
        let word = Word::from_string("A+B+C", &alphabet, ContextRadius::new(1, 1)).unwrap();
        let [a, b, c] = ["A", "B", "C"].map(|l| alphabet.id(l).unwrap());
        assert_eq!(word.sacs()[2], Sac::from_parts(vec![a], b, vec![c]));
    }

    #[test]
    fn identities_are_context_free() {
        let alphabet = turtle(&["X+YF+"]);
        let word = Word::from_string("X+YF+", &alphabet, ContextRadius::new(1, 1)).unwrap();
        let plus = alphabet.id("+").unwrap();
        assert_eq!(word.sacs()[1], Sac::context_free(plus));
        assert_eq!(word.sac_count(&Sac::context_free(plus)), 2);
    }

    #[test]
    fn unknown_symbols_fail() {
        let alphabet = Alphabet::builder().strings(["AB"]).build().unwrap();
        assert!(Word::from_string("ABZ", &alphabet, ContextRadius::ZERO).is_err());
    }

    #[test]
    fn round_trip_reproduces_the_string() {
        let alphabet = turtle(&["X+YF++-FX-YF+"]);
        let word = Word::from_string("X+YF++-FX-YF+", &alphabet, ContextRadius::new(1, 2)).unwrap();
        assert_eq!(word.to_flat_string(&alphabet), "X+YF++-FX-YF+");
    }

    #[test]
    fn radius_change_rebuilds_tables() {
        let alphabet = Alphabet::builder().strings(["ABA"]).build().unwrap();
        let word = Word::from_string("ABA", &alphabet, ContextRadius::ZERO).unwrap();
        assert_eq!(word.distinct_sacs().len(), 2);
        let wider = word.with_radius(&alphabet, ContextRadius::new(1, 1));
        assert_eq!(wider.distinct_sacs().len(), 3);
        assert_eq!(wider.radius(), ContextRadius::new(1, 1));
        assert_eq!(wider.raw(), "ABA");
    }

    #[test]
    fn full_depth_window() {
        let alphabet = Alphabet::builder().strings(["ABCD"]).build().unwrap();
        let symbols = alphabet.tokenize("ABCD").unwrap();
        assert_eq!(context_window(&symbols, 3, &alphabet, Side::Left, None).len(), 3);
        assert_eq!(context_window(&symbols, 0, &alphabet, Side::Right, Some(2)).len(), 2);
        assert!(context_window(&symbols, 1, &alphabet, Side::Left, Some(0)).is_empty());
    }
}
