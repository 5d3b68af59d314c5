//! MasterAnalysisObject: proven bounds on every unknown rule.
//!
//! For every SaC occurring before the last generation the MAO keeps a
//! `[min, max]` bound on its successor's length and on how many copies of
//! each symbol the successor contains (its growth, or Parikh vector). Bounds
//! start from a naive bootstrap and are tightened by a battery of refinement
//! techniques until a full pass changes nothing.
//!
//! Bounds are only ever tightened: every write goes through a
//! compare-and-tighten setter that raises the change flag. Identity SaCs
//! are fixed at construction and never written again.

pub mod bounds;
pub mod cover;
pub mod parikh;
mod production;
mod unaccounted;

use serde::Serialize;

use crate::error::{AnalysisError, LsysResult};
use crate::evidence::Evidence;
use crate::sac::Sac;
use crate::symbol::SymbolId;

pub use bounds::Bound;
pub use cover::{PSpaceCover, SacCover};
pub use parikh::{LinearSolution, ParikhSolution, ParikhTarget, SolveMethod, solve_linear};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the analysis.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Lower bound seeded into every variable SaC's successor length (default: 0).
    pub absolute_min_length: u64,
    /// Safety cap on refinement passes (default: 64).
    pub max_passes: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            absolute_min_length: 0,
            max_passes: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Tightenings made by each technique during one refinement pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub pass: usize,
    pub absolute_length: usize,
    pub absolute_growth: usize,
    pub total_growth: usize,
    pub length_production: usize,
    pub total_length_production: usize,
    pub length_growth: usize,
    pub parikh_length: usize,
    pub parikh_growth: usize,
}

impl PassReport {
    /// Total tightenings in the pass.
    pub fn changes(&self) -> usize {
        self.absolute_length
            + self.absolute_growth
            + self.total_growth
            + self.length_production
            + self.total_length_production
            + self.length_growth
            + self.parikh_length
            + self.parikh_growth
    }
}

/// Outcome of refining to a fixpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RefinementReport {
    pub passes: Vec<PassReport>,
    pub reached_fixpoint: bool,
    pub solved: bool,
    pub fully_solved: bool,
    /// Inexact Parikh solutions from the final pass.
    pub candidates: Vec<ParikhSolution>,
}

// ---------------------------------------------------------------------------
// MasterAnalysisObject
// ---------------------------------------------------------------------------

/// Bound tables over the evidence, plus the refinement techniques.
#[derive(Debug, Clone)]
pub struct MasterAnalysisObject {
    evidence: Evidence,
    config: AnalysisConfig,
    /// `growth[sac][symbol]`, indexed like `evidence.sacs()` and the alphabet.
    growth: Vec<Vec<Bound>>,
    length: Vec<Bound>,
    /// `occurrences[transition][sac]`: count of the SaC in the source word.
    occurrences: Vec<Vec<u64>>,
    /// `produced[transition][symbol]`: count of the symbol in the target word.
    produced: Vec<Vec<u64>>,
    /// Length of each transition's target word.
    produced_len: Vec<u64>,
    unaccounted_growth: Vec<Vec<i64>>,
    unaccounted_length: Vec<i64>,
    changed: bool,
    tightenings: usize,
    candidates: Vec<ParikhSolution>,
}

impl MasterAnalysisObject {
    /// Build the bound tables and run the naive bootstrap.
    pub fn new(evidence: Evidence, config: AnalysisConfig) -> Self {
        let sacs = evidence.sacs();
        let num_symbols = evidence.alphabet().len();

        let occurrences: Vec<Vec<u64>> = evidence
            .transitions()
            .map(|(source, _)| sacs.iter().map(|sac| source.sac_count(sac) as u64).collect())
            .collect();
        let produced: Vec<Vec<u64>> = evidence
            .transitions()
            .map(|(_, target)| {
                (0..num_symbols)
                    .map(|j| target.symbol_count(SymbolId::from_index(j)) as u64)
                    .collect()
            })
            .collect();
        let produced_len: Vec<u64> = evidence
            .transitions()
            .map(|(_, target)| target.len() as u64)
            .collect();

        let transitions = occurrences.len();
        let num_sacs = sacs.len();
        let mut mao = Self {
            growth: vec![vec![Bound::at_least(0); num_symbols]; num_sacs],
            length: vec![Bound::at_least(0); num_sacs],
            occurrences,
            produced,
            produced_len,
            unaccounted_growth: vec![vec![0; num_symbols]; transitions],
            unaccounted_length: vec![0; transitions],
            changed: false,
            tightenings: 0,
            candidates: Vec::new(),
            evidence,
            config,
        };
        mao.naive_min_max();
        mao.compute_unaccounted_growth_matrix();
        mao.compute_unaccounted_length_matrix();
        mao
    }

    /// Seed every table from first principles.
    ///
    /// Identity SaCs produce exactly themselves. A variable SaC produces at
    /// least the configured minimum and at most the whole generation that
    /// follows its last occurrence.
    fn naive_min_max(&mut self) {
        let num_symbols = self.num_symbols();
        for s in 0..self.evidence.sacs().len() {
            let symbol = self.evidence.sacs()[s].symbol();
            if self.is_identity_index(s) {
                self.growth[s] = (0..num_symbols)
                    .map(|j| Bound::exact(u64::from(SymbolId::from_index(j) == symbol)))
                    .collect();
                self.length[s] = Bound::exact(1);
            } else {
                let last = (0..self.occurrences.len())
                    .rev()
                    .find(|&t| self.occurrences[t][s] > 0)
                    .unwrap_or(0);
                let max = self.produced_len[last];
                self.growth[s] = vec![Bound::at_least(0); num_symbols];
                self.length[s] = Bound::between(self.config.absolute_min_length.min(max), max);
            }
        }
        tracing::debug!(sacs = self.length.len(), symbols = num_symbols, "naive bounds seeded");
    }

    // ── accessors ──

    pub fn evidence(&self) -> &Evidence {
        &self.evidence
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Whether any bound was tightened since the flag was last reset.
    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn reset_changed(&mut self) {
        self.changed = false;
    }

    /// Total number of tightenings since construction.
    pub fn tightenings(&self) -> usize {
        self.tightenings
    }

    /// Successor-length bound of a SaC.
    pub fn length(&self, sac: &Sac) -> LsysResult<Bound> {
        Ok(self.length[self.index_of(sac)?])
    }

    /// Bound on copies of `symbol` in a SaC's successor.
    pub fn growth(&self, sac: &Sac, symbol: SymbolId) -> LsysResult<Bound> {
        let s = self.index_of(sac)?;
        let j = self.symbol_index(symbol)?;
        Ok(self.growth[s][j])
    }

    /// The whole growth row of a SaC, one bound per alphabet symbol.
    pub fn growth_row(&self, sac: &Sac) -> LsysResult<&[Bound]> {
        Ok(&self.growth[self.index_of(sac)?])
    }

    /// `unaccounted_growth[transition][symbol]` as of the last recomputation.
    pub fn unaccounted_growth(&self) -> &[Vec<i64>] {
        &self.unaccounted_growth
    }

    /// `unaccounted_length[transition]` as of the last recomputation.
    pub fn unaccounted_length(&self) -> &[i64] {
        &self.unaccounted_length
    }

    /// Inexact Parikh solutions from the most recent refinement pass.
    pub fn candidates(&self) -> &[ParikhSolution] {
        &self.candidates
    }

    /// Every variable SaC's successor length is pinned down.
    pub fn is_solved(&self) -> bool {
        self.variable_indices().all(|s| self.length[s].is_fixed())
    }

    /// Every variable SaC's length and full Parikh vector are pinned down.
    pub fn is_fully_solved(&self) -> bool {
        self.variable_indices()
            .all(|s| self.length[s].is_fixed() && self.growth[s].iter().all(Bound::is_fixed))
    }

    // ── public setters ──

    /// Tighten a SaC's length bound toward `bound`. Returns whether anything changed.
    pub fn tighten_length(&mut self, sac: &Sac, bound: Bound) -> LsysResult<bool> {
        let s = self.index_of(sac)?;
        let raised = self.raise_min_length(s, bound.min);
        let lowered = bound.max.is_some_and(|max| self.lower_max_length(s, max));
        Ok(raised || lowered)
    }

    /// Tighten one growth cell toward `bound`. Returns whether anything changed.
    pub fn tighten_growth(
        &mut self,
        sac: &Sac,
        symbol: SymbolId,
        bound: Bound,
    ) -> LsysResult<bool> {
        let s = self.index_of(sac)?;
        let j = self.symbol_index(symbol)?;
        let raised = self.raise_min_growth(s, j, bound.min);
        let lowered = bound.max.is_some_and(|max| self.lower_max_growth(s, j, max));
        Ok(raised || lowered)
    }

    // ── refinement driver ──

    /// Run every refinement technique once.
    pub fn refine_pass(&mut self, pass: usize) -> LsysResult<PassReport> {
        let mut report = PassReport {
            pass,
            ..PassReport::default()
        };
        self.compute_unaccounted_growth_matrix();
        self.compute_unaccounted_length_matrix();

        report.absolute_length = self.counting(Self::compute_length_absolute_min_max);
        report.absolute_growth = self.counting(Self::compute_growth_absolute_max);
        report.total_growth = self.counting(Self::compute_growth_total_growth);
        report.length_production = self.counting(Self::compute_length_total_symbol_production);
        report.total_length_production =
            self.counting(Self::compute_total_length_total_symbol_production);
        report.length_growth = self.counting(Self::compute_length_growth);

        let mut candidates = Vec::new();
        let before = self.tightenings;
        if let Some(solution) = self.solve_parikh_length()? {
            if !solution.exact {
                candidates.push(solution);
            }
        }
        report.parikh_length = self.tightenings - before;

        let before = self.tightenings;
        candidates.extend(self.solve_parikh_growth()?.into_iter().filter(|s| !s.exact));
        report.parikh_growth = self.tightenings - before;
        self.candidates = candidates;

        tracing::debug!(pass, changes = report.changes(), "refinement pass");
        Ok(report)
    }

    /// Repeat [`refine_pass`](Self::refine_pass) until a pass changes nothing.
    pub fn refine_to_fixpoint(&mut self) -> LsysResult<RefinementReport> {
        let mut passes = Vec::new();
        for pass in 1..=self.config.max_passes {
            self.reset_changed();
            let report = self.refine_pass(pass)?;
            let changed = self.changed;
            passes.push(report);
            if !changed {
                let report = RefinementReport {
                    passes,
                    reached_fixpoint: true,
                    solved: self.is_solved(),
                    fully_solved: self.is_fully_solved(),
                    candidates: self.candidates.clone(),
                };
                tracing::info!(
                    passes = report.passes.len(),
                    solved = report.solved,
                    fully_solved = report.fully_solved,
                    candidates = report.candidates.len(),
                    "fixpoint reached"
                );
                return Ok(report);
            }
        }
        Err(AnalysisError::NoFixpoint {
            passes: self.config.max_passes,
        }
        .into())
    }

    fn counting(&mut self, technique: fn(&mut Self)) -> usize {
        let before = self.tightenings;
        technique(self);
        self.tightenings - before
    }

    // ── compare-and-tighten setters ──

    pub(crate) fn raise_min_length(&mut self, s: usize, value: u64) -> bool {
        if self.is_identity_index(s) {
            return false;
        }
        let bound = self.length[s];
        if value <= bound.min {
            return false;
        }
        if bound.max.is_some_and(|max| value > max) {
            self.report_conflict(s, "length", value, bound);
            return false;
        }
        self.length[s].min = value;
        self.record(s, "min length", value);
        true
    }

    pub(crate) fn lower_max_length(&mut self, s: usize, value: u64) -> bool {
        if self.is_identity_index(s) {
            return false;
        }
        let bound = self.length[s];
        if bound.max.is_some_and(|max| value >= max) {
            return false;
        }
        if value < bound.min {
            self.report_conflict(s, "length", value, bound);
            return false;
        }
        self.length[s].max = Some(value);
        self.record(s, "max length", value);
        true
    }

    pub(crate) fn raise_min_growth(&mut self, s: usize, j: usize, value: u64) -> bool {
        if self.is_identity_index(s) {
            return false;
        }
        let bound = self.growth[s][j];
        if value <= bound.min {
            return false;
        }
        if bound.max.is_some_and(|max| value > max) {
            self.report_conflict(s, "growth", value, bound);
            return false;
        }
        self.growth[s][j].min = value;
        self.record(s, "min growth", value);
        true
    }

    pub(crate) fn lower_max_growth(&mut self, s: usize, j: usize, value: u64) -> bool {
        if self.is_identity_index(s) {
            return false;
        }
        let bound = self.growth[s][j];
        if bound.max.is_some_and(|max| value >= max) {
            return false;
        }
        if value < bound.min {
            self.report_conflict(s, "growth", value, bound);
            return false;
        }
        self.growth[s][j].max = Some(value);
        self.record(s, "max growth", value);
        true
    }

    fn record(&mut self, s: usize, what: &'static str, value: u64) {
        self.changed = true;
        self.tightenings += 1;
        tracing::debug!(sac = %self.label(s), what, value, "bound tightened");
    }

    fn report_conflict(&self, s: usize, what: &'static str, value: u64, bound: Bound) {
        tracing::warn!(
            sac = %self.label(s),
            what,
            value,
            bound = %bound,
            "bound contradicts proven interval, evidence is inconsistent"
        );
    }

    // ── index helpers ──

    pub(crate) fn num_symbols(&self) -> usize {
        self.evidence.alphabet().len()
    }

    pub(crate) fn is_identity_index(&self, s: usize) -> bool {
        self.evidence.is_identity(&self.evidence.sacs()[s])
    }

    /// Indices of SaCs keyed on variable symbols.
    pub(crate) fn variable_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.evidence.sacs().len()).filter(|&s| !self.is_identity_index(s))
    }

    pub(crate) fn label(&self, s: usize) -> String {
        self.evidence.sacs()[s].display(self.evidence.alphabet())
    }

    fn index_of(&self, sac: &Sac) -> LsysResult<usize> {
        self.evidence.sac_index(sac).ok_or_else(|| {
            AnalysisError::UnknownSac {
                sac: sac.display(self.evidence.alphabet()),
            }
            .into()
        })
    }

    fn symbol_index(&self, symbol: SymbolId) -> LsysResult<usize> {
        symbol
            .index()
            .filter(|&j| j < self.num_symbols())
            .ok_or_else(|| {
                crate::error::AlphabetError::UnknownId { id: symbol.get() }.into()
            })
    }
}
