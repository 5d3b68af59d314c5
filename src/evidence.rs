//! Evidence: successive generations under one unknown rule set.
//!
//! [`Evidence::new`] resolves the context radius (inferring any side that is
//! not supplied), builds one [`Word`] per generation string at that radius,
//! and collects the distinct SaCs occurring before the last generation.
//! Those belonging to variable symbols are the unknowns to solve for.
//!
//! Evidence is built once and is read-only afterwards.

use std::collections::HashMap;

use crate::alphabet::Alphabet;
use crate::context;
use crate::error::{EvidenceError, LsysResult};
use crate::sac::{ContextRadius, Sac};
use crate::symbol::SymbolId;
use crate::word::Word;

/// The words `w0..wn-1` plus the SaCs that need a solution.
#[derive(Debug, Clone)]
pub struct Evidence {
    alphabet: Alphabet,
    radius: ContextRadius,
    words: Vec<Word>,
    /// Every distinct SaC in `w0..wn-2`, identities included, first-occurrence order.
    sacs: Vec<Sac>,
    sac_index: HashMap<Sac, usize>,
    /// The subset of `sacs` keyed on variable symbols.
    sacs_to_solve: Vec<Sac>,
}

impl Evidence {
    /// Build evidence, inferring whichever side of the radius is `None`.
    pub fn new<S: AsRef<str>>(
        strings: &[S],
        alphabet: Alphabet,
        left: Option<usize>,
        right: Option<usize>,
    ) -> LsysResult<Self> {
        if strings.len() < 2 {
            return Err(EvidenceError::TooFewGenerations {
                count: strings.len(),
            }
            .into());
        }

        let words = strings
            .iter()
            .map(|s| Word::from_string(s.as_ref(), &alphabet, ContextRadius::ZERO))
            .collect::<LsysResult<Vec<_>>>()?;

        let radius = if let (Some(left), Some(right)) = (left, right) {
            ContextRadius::new(left, right)
        } else {
            let generations: Vec<Vec<SymbolId>> =
                words.iter().map(|w| w.symbols().to_vec()).collect();
            context::resolve_radius(&generations, &alphabet, left, right)
        };

        let words: Vec<Word> = if radius == ContextRadius::ZERO {
            words
        } else {
            words.iter().map(|w| w.with_radius(&alphabet, radius)).collect()
        };

        let mut sacs = Vec::new();
        let mut sac_index = HashMap::new();
        for word in &words[..words.len() - 1] {
            for sac in word.distinct_sacs() {
                if !sac_index.contains_key(sac) {
                    sac_index.insert(sac.clone(), sacs.len());
                    sacs.push(sac.clone());
                }
            }
        }
        let sacs_to_solve: Vec<Sac> = sacs
            .iter()
            .filter(|sac| alphabet.is_variable(sac.symbol()))
            .cloned()
            .collect();

        tracing::info!(
            generations = words.len(),
            k = radius.left,
            l = radius.right,
            sacs = sacs.len(),
            unknowns = sacs_to_solve.len(),
            "evidence built"
        );

        Ok(Self {
            alphabet,
            radius,
            words,
            sacs,
            sac_index,
            sacs_to_solve,
        })
    }

    /// Build evidence at a fixed radius.
    pub fn with_radius<S: AsRef<str>>(
        strings: &[S],
        alphabet: Alphabet,
        radius: ContextRadius,
    ) -> LsysResult<Self> {
        Self::new(strings, alphabet, Some(radius.left), Some(radius.right))
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// The resolved `(k, l)` window radius.
    pub fn radius(&self) -> ContextRadius {
        self.radius
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Number of `w_i -> w_{i+1}` transitions.
    pub fn num_transitions(&self) -> usize {
        self.words.len() - 1
    }

    /// Each generation paired with the one it produced.
    pub fn transitions(&self) -> impl Iterator<Item = (&Word, &Word)> {
        self.words.iter().zip(self.words.iter().skip(1))
    }

    /// Every distinct SaC before the last generation, identities included.
    pub fn sacs(&self) -> &[Sac] {
        &self.sacs
    }

    /// Position of a SaC in [`Evidence::sacs`].
    pub fn sac_index(&self, sac: &Sac) -> Option<usize> {
        self.sac_index.get(sac).copied()
    }

    /// SaCs keyed on variable symbols: the unknown rules.
    pub fn sacs_to_solve(&self) -> &[Sac] {
        &self.sacs_to_solve
    }

    /// Whether a SaC's rule is known a priori.
    pub fn is_identity(&self, sac: &Sac) -> bool {
        self.alphabet.is_identity(sac.symbol())
    }
}
