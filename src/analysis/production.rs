//! Bound techniques driven by what each transition produces.
//!
//! Every transition `w_i -> w_{i+1}` states that the outputs of the SaC
//! occurrences in `w_i` add up to `w_{i+1}`: per symbol (growth) and in
//! total (length). With `Σ c_s·x_s = T` and every `x_s` inside its proven
//! interval, each term is bounded by what the others can at most and at
//! least contribute.

use super::MasterAnalysisObject;
use super::bounds::Bound;

/// Implied `(min, max)` for each term of `Σ c·x = total`.
///
/// A `None` end means the term gains nothing on that side (zero count,
/// an unbounded neighbour, or an inconsistent total).
fn production_bounds(total: u64, terms: &[(u64, Bound)]) -> Vec<(Option<u64>, Option<u64>)> {
    let min_sum: u64 = terms.iter().map(|(c, b)| c * b.min).sum();
    let max_sum: Option<u64> = terms.iter().map(|(c, b)| b.max.map(|max| c * max)).sum();

    terms
        .iter()
        .map(|&(c, bound)| {
            if c == 0 {
                return (None, None);
            }
            let others_min = min_sum - c * bound.min;
            let max = total.checked_sub(others_min).map(|rest| rest / c);
            let min = max_sum.zip(bound.max).and_then(|(max_sum, own)| {
                let others_max = max_sum - c * own;
                (total > others_max).then(|| (total - others_max).div_ceil(c))
            });
            (min, max)
        })
        .collect()
}

impl MasterAnalysisObject {
    /// Absolute length bounds.
    ///
    /// Seeds the configured minimum, then caps every occurrence in `w_i` at
    /// `|w_{i+1}|` minus the minimum output of every other occurrence
    /// (identities reserve one symbol each).
    pub fn compute_length_absolute_min_max(&mut self) {
        let floor = self.config.absolute_min_length;
        let mut caps = Vec::new();
        for t in 0..self.occurrences.len() {
            let reserve: u64 = self.occurrences[t]
                .iter()
                .zip(&self.length)
                .map(|(&c, bound)| c * bound.min)
                .sum();
            for s in self.variable_indices() {
                if self.occurrences[t][s] > 0 {
                    let others = reserve - self.length[s].min;
                    caps.push((s, self.produced_len[t].saturating_sub(others)));
                }
            }
        }
        let variables: Vec<usize> = self.variable_indices().collect();
        for s in variables {
            self.raise_min_length(s, floor);
        }
        for (s, cap) in caps {
            self.lower_max_length(s, cap);
        }
    }

    /// A SaC occurring `c` times cannot produce more than `count(σ) / c`
    /// copies of σ, where `count(σ)` is taken in the next generation.
    pub fn compute_growth_absolute_max(&mut self) {
        let mut caps = Vec::new();
        for t in 0..self.occurrences.len() {
            for s in self.variable_indices() {
                let c = self.occurrences[t][s];
                if c == 0 {
                    continue;
                }
                for j in 0..self.num_symbols() {
                    caps.push((s, j, self.produced[t][j] / c));
                }
            }
        }
        for (s, j, cap) in caps {
            self.lower_max_growth(s, j, cap);
        }
    }

    /// Two-sided growth bounds from each transition's per-symbol totals.
    pub fn compute_growth_total_growth(&mut self) {
        let mut updates = Vec::new();
        for t in 0..self.occurrences.len() {
            for j in 0..self.num_symbols() {
                let terms: Vec<(u64, Bound)> = self.occurrences[t]
                    .iter()
                    .zip(&self.growth)
                    .map(|(&c, row)| (c, row[j]))
                    .collect();
                let implied = production_bounds(self.produced[t][j], &terms);
                for (s, implied) in implied.into_iter().enumerate() {
                    updates.push((s, j, implied));
                }
            }
        }
        for (s, j, (min, max)) in updates {
            if let Some(min) = min {
                self.raise_min_growth(s, j, min);
            }
            if let Some(max) = max {
                self.lower_max_growth(s, j, max);
            }
        }
    }

    /// Two-sided length bounds from each transition's total output length.
    pub fn compute_length_total_symbol_production(&mut self) {
        let mut updates = Vec::new();
        for t in 0..self.occurrences.len() {
            let terms: Vec<(u64, Bound)> = self.occurrences[t]
                .iter()
                .zip(&self.length)
                .map(|(&c, &bound)| (c, bound))
                .collect();
            updates.extend(production_bounds(self.produced_len[t], &terms).into_iter().enumerate());
        }
        for (s, (min, max)) in updates {
            if let Some(min) = min {
                self.raise_min_length(s, min);
            }
            if let Some(max) = max {
                self.lower_max_length(s, max);
            }
        }
    }

    /// Bound the unique most frequent variable SaC of a transition from
    /// above and the unique least frequent one from below, using the output
    /// left over once identities are subtracted.
    pub fn compute_total_length_total_symbol_production(&mut self) {
        let mut updates = Vec::new();
        for t in 0..self.occurrences.len() {
            let identity_output: u64 = (0..self.occurrences[t].len())
                .filter(|&s| self.is_identity_index(s))
                .map(|s| self.occurrences[t][s])
                .sum();
            let Some(remaining) = self.produced_len[t].checked_sub(identity_output) else {
                continue;
            };
            let present: Vec<(usize, u64)> = self
                .variable_indices()
                .map(|s| (s, self.occurrences[t][s]))
                .filter(|&(_, c)| c > 0)
                .collect();

            if let Some((s, c)) = unique_extreme(&present, |a, b| a > b) {
                let others: u64 = present
                    .iter()
                    .filter(|&&(o, _)| o != s)
                    .map(|&(o, co)| co * self.length[o].min)
                    .sum();
                if let Some(rest) = remaining.checked_sub(others) {
                    updates.push((s, None, Some(rest / c)));
                }
            }
            if let Some((s, c)) = unique_extreme(&present, |a, b| a < b) {
                let others: Option<u64> = present
                    .iter()
                    .filter(|&&(o, _)| o != s)
                    .map(|&(o, co)| self.length[o].max.map(|max| co * max))
                    .sum();
                if let Some(others) = others.filter(|&others| remaining > others) {
                    updates.push((s, Some((remaining - others).div_ceil(c)), None));
                }
            }
        }
        for (s, min, max) in updates {
            if let Some(min) = min {
                self.raise_min_length(s, min);
            }
            if let Some(max) = max {
                self.lower_max_length(s, max);
            }
        }
    }

    /// Couple length and growth: a successor's length is the sum of its
    /// Parikh vector.
    pub fn compute_length_growth(&mut self) {
        let variables: Vec<usize> = self.variable_indices().collect();
        for s in variables {
            let row = self.growth[s].clone();
            let sum_min: u64 = row.iter().map(|b| b.min).sum();
            let sum_max: Option<u64> = row.iter().map(|b| b.max).sum();
            self.raise_min_length(s, sum_min);
            if let Some(sum_max) = sum_max {
                self.lower_max_length(s, sum_max);
            }

            let length = self.length[s];
            for (j, cell) in row.iter().enumerate() {
                if let Some(max_len) = length.max {
                    let others_min = sum_min - cell.min;
                    if let Some(cap) = max_len.checked_sub(others_min) {
                        self.lower_max_growth(s, j, cap);
                    }
                }
                if let (Some(sum_max), Some(own)) = (sum_max, cell.max) {
                    let others_max = sum_max - own;
                    if length.min > others_max {
                        self.raise_min_growth(s, j, length.min - others_max);
                    }
                }
            }
        }
    }
}

/// The single entry whose count beats every other under `better`.
fn unique_extreme(
    entries: &[(usize, u64)],
    better: impl Fn(u64, u64) -> bool,
) -> Option<(usize, u64)> {
    let &first = entries.first()?;
    let best = entries
        .iter()
        .fold(first, |best, &entry| if better(entry.1, best.1) { entry } else { best });
    let ties = entries.iter().filter(|&&(_, c)| c == best.1).count();
    (ties == 1).then_some(best)
}
