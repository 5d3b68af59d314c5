//! Alphabet: bidirectional symbol ↔ id mapping.
//!
//! The [`Alphabet`] owns every [`Symbol`] of one inference problem and
//! partitions them into *variables* (rule unknown) and *identities* (rule
//! known a priori to be `S -> S`, e.g. turtle-graphics commands). It also
//! converts between flat generation strings and id sequences: single
//! characters name single-character symbols, and multi-character names are
//! wrapped in [`MULTICHAR_MARKER`] on both sides (`"A_Fl_B"`).
//!
//! An optional homomorphism collapses symbols onto others. It is only used
//! when projecting a hypothesis onto a reduced alphabet.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::AlphabetError;
use crate::symbol::{ANY_SYMBOL, EMPTY_SYMBOL, MULTICHAR_MARKER, Symbol, SymbolId, is_reserved};

/// Result type for alphabet operations.
pub type AlphabetResult<T> = std::result::Result<T, AlphabetError>;

/// Identity symbols of 2D turtle graphics.
pub const TURTLE_IDENTITIES: [&str; 6] = ["F", "+", "-", "|", "[", "]"];
/// Branch delimiters: context windows never cross them.
pub const BRANCH_DELIMITERS: [&str; 2] = ["[", "]"];

/// Bidirectional symbol table for one inference problem.
#[derive(Debug, Clone, Default)]
pub struct Alphabet {
    /// Forward map, indexed by `SymbolId::index()`.
    symbols: Vec<Symbol>,
    /// Reverse map: label → id.
    label_to_id: HashMap<String, SymbolId>,
    /// Symbols skipped when building context windows.
    ignored: BTreeSet<SymbolId>,
    /// Optional symbol → symbol collapse.
    homomorphism: BTreeMap<SymbolId, SymbolId>,
}

impl Alphabet {
    /// Create an empty alphabet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building an alphabet from raw generation strings.
    pub fn builder() -> AlphabetBuilder {
        AlphabetBuilder::default()
    }

    /// Register a symbol. Errors if the label is taken or uses a reserved character.
    pub fn add(
        &mut self,
        label: &str,
        is_identity: bool,
        is_forbidden: bool,
    ) -> AlphabetResult<SymbolId> {
        if label.is_empty() || label.chars().any(is_reserved) {
            return Err(AlphabetError::Reserved {
                symbol: label.to_string(),
            });
        }
        if let Some(existing) = self.label_to_id.get(label) {
            return Err(AlphabetError::Duplicate {
                symbol: label.to_string(),
                existing_id: existing.get(),
            });
        }

        let id = SymbolId::from_index(self.symbols.len());
        let mut symbol = Symbol::new(id, label);
        symbol.is_identity = is_identity;
        symbol.is_forbidden = is_forbidden;
        self.label_to_id.insert(label.to_string(), id);
        self.symbols.push(symbol);
        Ok(id)
    }

    /// Look up a symbol id by label. The reserved characters resolve to the sentinels.
    pub fn id(&self, label: &str) -> AlphabetResult<SymbolId> {
        let mut chars = label.chars();
        match (chars.next(), chars.next()) {
            (Some(ANY_SYMBOL), None) => Ok(SymbolId::ANY),
            (Some(EMPTY_SYMBOL), None) => Ok(SymbolId::EMPTY),
            _ => self
                .label_to_id
                .get(label)
                .copied()
                .ok_or_else(|| AlphabetError::UnknownSymbol {
                    symbol: label.to_string(),
                }),
        }
    }

    /// Look up a symbol by id. Sentinels are not alphabet entries.
    pub fn symbol(&self, id: SymbolId) -> AlphabetResult<&Symbol> {
        id.index()
            .and_then(|i| self.symbols.get(i))
            .ok_or(AlphabetError::UnknownId { id: id.get() })
    }

    /// Human-readable label, falling back to the id's display form.
    pub fn label(&self, id: SymbolId) -> String {
        match id {
            SymbolId::ANY => ANY_SYMBOL.to_string(),
            SymbolId::EMPTY => EMPTY_SYMBOL.to_string(),
            _ => self
                .symbol(id)
                .map(|s| s.label.clone())
                .unwrap_or_else(|_| id.to_string()),
        }
    }

    /// Number of symbols, sentinels excluded.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// All symbols in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    /// All ids in order.
    pub fn ids(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.symbols.iter().map(|s| s.id)
    }

    pub fn is_identity(&self, id: SymbolId) -> bool {
        self.symbol(id).is_ok_and(|s| s.is_identity)
    }

    pub fn is_forbidden(&self, id: SymbolId) -> bool {
        self.symbol(id).is_ok_and(|s| s.is_forbidden)
    }

    pub fn is_ignored(&self, id: SymbolId) -> bool {
        self.ignored.contains(&id)
    }

    /// A variable is a real symbol whose rule is unknown.
    pub fn is_variable(&self, id: SymbolId) -> bool {
        self.symbol(id).is_ok_and(|s| !s.is_identity)
    }

    /// Mark a symbol as transparent to context windows.
    pub fn ignore(&mut self, label: &str) -> AlphabetResult<()> {
        let id = self.id(label)?;
        self.ignored.insert(id);
        Ok(())
    }

    /// Ids of all symbols with an unknown rule.
    pub fn variables(&self) -> Vec<SymbolId> {
        self.iter().filter(|s| !s.is_identity).map(|s| s.id).collect()
    }

    /// Ids of all symbols whose rule is the identity.
    pub fn identities(&self) -> Vec<SymbolId> {
        self.iter().filter(|s| s.is_identity).map(|s| s.id).collect()
    }

    // -----------------------------------------------------------------------
    // Flat-string conversion
    // -----------------------------------------------------------------------

    /// Convert a flat string into symbol ids. Fails on any unknown symbol.
    pub fn tokenize(&self, input: &str) -> AlphabetResult<Vec<SymbolId>> {
        split_flat(input)?
            .into_iter()
            .map(|token| self.id(&token))
            .collect()
    }

    /// Render ids as a flat string, dropping empty-symbol placeholders.
    pub fn render(&self, ids: &[SymbolId]) -> String {
        ids.iter()
            .filter(|&&id| id != SymbolId::EMPTY)
            .map(|&id| match self.symbol(id) {
                Ok(symbol) => symbol.to_string(),
                Err(_) => self.label(id),
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Homomorphism
    // -----------------------------------------------------------------------

    /// Collapse `source` onto `target` when projecting onto a reduced alphabet.
    pub fn set_homomorphism(&mut self, source: &str, target: &str) -> AlphabetResult<()> {
        let source = self.id(source)?;
        let target = self.id(target)?;
        if !source.is_sentinel() && !target.is_sentinel() {
            self.homomorphism.insert(source, target);
        }
        Ok(())
    }

    /// Image of one id. Sentinels and unmapped symbols map to themselves.
    pub fn apply_homomorphism(&self, id: SymbolId) -> SymbolId {
        if id.is_sentinel() {
            return id;
        }
        self.homomorphism.get(&id).copied().unwrap_or(id)
    }

    /// Image of an id sequence.
    pub fn project(&self, ids: &[SymbolId]) -> Vec<SymbolId> {
        ids.iter().map(|&id| self.apply_homomorphism(id)).collect()
    }
}

/// Split a flat string into symbol names, honouring multi-character markers.
pub fn split_flat(input: &str) -> AlphabetResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices();
    while let Some((offset, c)) = chars.next() {
        if c != MULTICHAR_MARKER {
            tokens.push(c.to_string());
            continue;
        }
        let mut name = String::new();
        let mut closed = false;
        for (_, next) in chars.by_ref() {
            if next == MULTICHAR_MARKER {
                closed = true;
                break;
            }
            name.push(next);
        }
        if !closed || name.is_empty() {
            return Err(AlphabetError::Unterminated {
                input: input.to_string(),
                offset,
            });
        }
        tokens.push(name);
    }
    Ok(tokens)
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builds an [`Alphabet`] from the union of symbols seen in the raw strings
/// plus any declared identities.
///
/// Ids are assigned in first-seen order over the strings, then in declaration
/// order for declared identities that never occur. Forbidden and ignored
/// labels only flag symbols that are already present.
#[derive(Debug, Clone, Default)]
pub struct AlphabetBuilder {
    strings: Vec<String>,
    identities: Vec<String>,
    forbidden: Vec<String>,
    ignored: Vec<String>,
    homomorphism: Vec<(String, String)>,
}

impl AlphabetBuilder {
    pub fn strings<I, S>(mut self, strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strings.extend(strings.into_iter().map(Into::into));
        self
    }

    pub fn identities<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identities.extend(labels.into_iter().map(Into::into));
        self
    }

    pub fn forbidden<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.forbidden.extend(labels.into_iter().map(Into::into));
        self
    }

    pub fn ignore<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored.extend(labels.into_iter().map(Into::into));
        self
    }

    /// Use the 2D turtle-graphics identities, with branch delimiters forbidden.
    pub fn turtle_2d(self) -> Self {
        self.identities(TURTLE_IDENTITIES).forbidden(BRANCH_DELIMITERS)
    }

    pub fn homomorphism(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.homomorphism.push((source.into(), target.into()));
        self
    }

    pub fn build(self) -> AlphabetResult<Alphabet> {
        let identities: BTreeSet<&str> = self.identities.iter().map(String::as_str).collect();
        let forbidden: BTreeSet<&str> = self.forbidden.iter().map(String::as_str).collect();

        let mut seen: Vec<String> = Vec::new();
        for s in &self.strings {
            for token in split_flat(s)? {
                if !seen.contains(&token) {
                    seen.push(token);
                }
            }
        }
        for declared in &self.identities {
            if !seen.contains(declared) {
                seen.push(declared.clone());
            }
        }

        let mut alphabet = Alphabet::new();
        for label in &seen {
            alphabet.add(
                label,
                identities.contains(label.as_str()),
                forbidden.contains(label.as_str()),
            )?;
        }
        for label in &self.ignored {
            // Ignoring a symbol that never occurs has no effect.
            if alphabet.label_to_id.contains_key(label) {
                alphabet.ignore(label)?;
            }
        }
        for (source, target) in &self.homomorphism {
            alphabet.set_homomorphism(source, target)?;
        }
        Ok(alphabet)
    }
}
