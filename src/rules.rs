//! Production rules and parallel rewriting.
//!
//! A [`RuleSet`] rewrites every symbol of a generation simultaneously. Each
//! position is matched against the rule predecessors using its own context
//! window at the rule set's radius; the most specific matching rule wins.
//! A symbol with no matching rule rewrites to itself.

use serde::Serialize;

use crate::alphabet::Alphabet;
use crate::error::{LsysResult, RuleError};
use crate::sac::{ContextRadius, Sac};
use crate::symbol::SymbolId;
use crate::word::{Side, context_window};

/// One rewriting rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ProductionRule {
    /// `predecessor → successor`.
    Deterministic {
        predecessor: Sac,
        successor: Vec<SymbolId>,
    },
    /// `symbol → symbol`, the known rule of an identity symbol.
    Identity { symbol: SymbolId },
}

impl ProductionRule {
    /// A deterministic rule. The successor may not contain the wildcard.
    pub fn deterministic(predecessor: Sac, successor: Vec<SymbolId>) -> Result<Self, RuleError> {
        if successor.contains(&SymbolId::ANY) {
            return Err(RuleError::InvalidSuccessor {
                rule: format!("{predecessor:?}"),
                id: SymbolId::ANY.get(),
            });
        }
        let successor = successor.into_iter().filter(|&id| id != SymbolId::EMPTY).collect();
        Ok(Self::Deterministic {
            predecessor,
            successor,
        })
    }

    pub fn identity(symbol: SymbolId) -> Self {
        Self::Identity { symbol }
    }

    /// The pattern this rule is keyed on.
    pub fn predecessor(&self) -> Sac {
        match self {
            Self::Deterministic { predecessor, .. } => predecessor.clone(),
            Self::Identity { symbol } => Sac::context_free(*symbol),
        }
    }

    /// Whether the rule fires at a position with the given context windows.
    ///
    /// A context the pattern requires must actually be present: a window
    /// cut short by the string edge or a forbidden symbol does not satisfy
    /// it. A pattern context may be shorter than the window it is checked
    /// against.
    pub fn fires(&self, left: &[SymbolId], center: SymbolId, right: &[SymbolId]) -> bool {
        match self {
            Self::Identity { symbol } => *symbol == center,
            Self::Deterministic { predecessor, .. } => {
                let symbol = predecessor.symbol();
                (symbol == center || symbol == SymbolId::ANY)
                    && (!predecessor.has_left()
                        || window_fits(predecessor.left().iter().rev(), left.iter().rev()))
                    && (!predecessor.has_right()
                        || window_fits(predecessor.right().iter(), right.iter()))
            }
        }
    }

    /// Rewrite one occurrence.
    pub fn apply(&self, occurrence: &Sac) -> Result<Vec<SymbolId>, RuleError> {
        match self {
            Self::Deterministic { successor, .. } => Ok(successor.clone()),
            Self::Identity { symbol } if *symbol == occurrence.symbol() => Ok(vec![*symbol]),
            Self::Identity { symbol } => Err(RuleError::IdentityMismatch {
                expected: symbol.get(),
                actual: occurrence.symbol().get(),
            }),
        }
    }

    /// Successor length.
    pub fn length(&self) -> usize {
        match self {
            Self::Deterministic { successor, .. } => successor.len(),
            Self::Identity { .. } => 1,
        }
    }

    /// Copies of `symbol` in the successor.
    pub fn growth(&self, symbol: SymbolId) -> usize {
        match self {
            Self::Deterministic { successor, .. } => {
                successor.iter().filter(|&&id| id == symbol).count()
            }
            Self::Identity { symbol: own } => usize::from(*own == symbol),
        }
    }

    /// Context symbols the pattern constrains. Higher is more specific.
    fn specificity(&self) -> usize {
        let predecessor = self.predecessor();
        let left = if predecessor.has_left() { predecessor.left().len() } else { 0 };
        let right = if predecessor.has_right() { predecessor.right().len() } else { 0 };
        left + right
    }

    /// `A<B>C → XY` notation; an empty successor renders as `λ`.
    pub fn display(&self, alphabet: &Alphabet) -> String {
        let successor = match self {
            Self::Deterministic { successor, .. } => successor.clone(),
            Self::Identity { symbol } => vec![*symbol],
        };
        let rendered = alphabet.render(&successor);
        let rendered = if rendered.is_empty() {
            crate::symbol::EMPTY_SYMBOL.to_string()
        } else {
            rendered
        };
        format!("{} → {rendered}", self.predecessor().display(alphabet))
    }
}

/// Pattern positions (nearest the center first) against window positions.
fn window_fits<'a>(
    pattern: impl ExactSizeIterator<Item = &'a SymbolId>,
    window: impl ExactSizeIterator<Item = &'a SymbolId>,
) -> bool {
    pattern.len() <= window.len()
        && pattern.zip(window).all(|(&p, &w)| p == w || p == SymbolId::ANY)
}

/// Rules rewriting a whole generation in parallel.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RuleSet {
    radius: ContextRadius,
    rules: Vec<ProductionRule>,
}

impl RuleSet {
    pub fn new(radius: ContextRadius) -> Self {
        Self {
            radius,
            rules: Vec::new(),
        }
    }

    /// Parse `(predecessor, successor)` pairs in `A<B>C` / flat-string notation.
    ///
    /// Every identity of the alphabet gets its identity rule.
    pub fn parse(
        alphabet: &Alphabet,
        radius: ContextRadius,
        rules: &[(&str, &str)],
    ) -> LsysResult<Self> {
        let mut set = Self::new(radius);
        for (predecessor, successor) in rules {
            let predecessor = Sac::parse(predecessor, alphabet)?;
            let predecessor = Sac::new(
                predecessor.left().to_vec(),
                predecessor.symbol(),
                predecessor.right().to_vec(),
                radius,
            )?;
            let successor = alphabet.tokenize(successor)?;
            set.push(ProductionRule::deterministic(predecessor, successor)?);
        }
        for id in alphabet.identities() {
            set.push(ProductionRule::identity(id));
        }
        Ok(set)
    }

    pub fn push(&mut self, rule: ProductionRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[ProductionRule] {
        &self.rules
    }

    pub fn radius(&self) -> ContextRadius {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The most specific rule firing at a position; the first one on ties.
    pub fn rule_for(
        &self,
        left: &[SymbolId],
        center: SymbolId,
        right: &[SymbolId],
    ) -> Option<&ProductionRule> {
        self.rules
            .iter()
            .filter(|rule| rule.fires(left, center, right))
            .fold(None, |best: Option<&ProductionRule>, rule| match best {
                Some(b) if b.specificity() >= rule.specificity() => Some(b),
                _ => Some(rule),
            })
    }

    /// Rewrite one generation.
    pub fn derive(&self, word: &[SymbolId], alphabet: &Alphabet) -> LsysResult<Vec<SymbolId>> {
        let mut next = Vec::with_capacity(word.len());
        for (i, &center) in word.iter().enumerate() {
            let left = context_window(word, i, alphabet, Side::Left, Some(self.radius.left));
            let right = context_window(word, i, alphabet, Side::Right, Some(self.radius.right));
            match self.rule_for(&left, center, &right) {
                Some(rule) => next.extend(rule.apply(&Sac::from_parts(left, center, right))?),
                None => next.push(center),
            }
        }
        Ok(next)
    }

    /// The axiom followed by `generations` derived words, projected through
    /// the alphabet's homomorphism and rendered as flat strings.
    pub fn derive_strings(
        &self,
        axiom: &str,
        alphabet: &Alphabet,
        generations: usize,
    ) -> LsysResult<Vec<String>> {
        let mut word = alphabet.tokenize(axiom)?;
        let mut strings = vec![alphabet.render(&alphabet.project(&word))];
        for _ in 0..generations {
            word = self.derive(&word, alphabet)?;
            strings.push(alphabet.render(&alphabet.project(&word)));
        }
        tracing::debug!(axiom, generations, rules = self.rules.len(), "derived generations");
        Ok(strings)
    }
}
