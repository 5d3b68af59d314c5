//! Registry of named example problems.
//!
//! Each problem is a known L-system whose generations serve as evidence in
//! Experiment mode. Names map to constructors in an explicit table built at
//! start-up.

use std::collections::BTreeMap;

use crate::alphabet::Alphabet;
use crate::error::{LsysResult, ProblemError};
use crate::rules::RuleSet;
use crate::sac::ContextRadius;

/// A known L-system plus how much of its derivation to use as evidence.
#[derive(Debug, Clone)]
pub struct Problem {
    pub name: &'static str,
    pub alphabet: Alphabet,
    pub rules: RuleSet,
    pub axiom: String,
    /// Number of rewriting steps to derive.
    pub iterations: usize,
    /// Leading derived strings dropped from the evidence (the axiom is index 0).
    pub skip: usize,
}

impl Problem {
    /// The evidence strings: the derivation minus the skipped prefix.
    pub fn strings(&self) -> LsysResult<Vec<String>> {
        let strings = self.rules.derive_strings(&self.axiom, &self.alphabet, self.iterations)?;
        Ok(strings.into_iter().skip(self.skip).collect())
    }

    pub fn radius(&self) -> ContextRadius {
        self.rules.radius()
    }
}

type Constructor = fn() -> LsysResult<Problem>;

/// Problem names mapped to constructors.
#[derive(Debug, Clone, Default)]
pub struct ProblemRegistry {
    constructors: BTreeMap<&'static str, Constructor>,
}

impl ProblemRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry of built-in problems.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("CantorDust", cantor_dust);
        registry.register("DragonCurve", dragon_curve);
        registry
    }

    pub fn register(&mut self, name: &'static str, constructor: Constructor) {
        self.constructors.insert(name, constructor);
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.constructors.keys().copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Construct a problem by name.
    pub fn build(&self, name: &str) -> LsysResult<Problem> {
        let constructor = self.constructors.get(name).ok_or_else(|| ProblemError::Unknown {
            name: name.to_string(),
        })?;
        constructor()
    }
}

/// `A → ABA`, `B → BBB` from `ABA`.
fn cantor_dust() -> LsysResult<Problem> {
    let alphabet = Alphabet::builder().strings(["AB"]).build()?;
    let rules = RuleSet::parse(&alphabet, ContextRadius::ZERO, &[("A", "ABA"), ("B", "BBB")])?;
    Ok(Problem {
        name: "CantorDust",
        alphabet,
        rules,
        axiom: "ABA".into(),
        iterations: 2,
        skip: 0,
    })
}

/// `X → X+YF+`, `Y → -FX-Y` from `X`, with turtle identities.
fn dragon_curve() -> LsysResult<Problem> {
    let alphabet = Alphabet::builder()
        .strings(["XY"])
        .identities(["F", "+", "-"])
        .build()?;
    let rules = RuleSet::parse(&alphabet, ContextRadius::ZERO, &[("X", "X+YF+"), ("Y", "-FX-Y")])?;
    Ok(Problem {
        name: "DragonCurve",
        alphabet,
        rules,
        axiom: "X".into(),
        iterations: 3,
        skip: 1,
    })
}
