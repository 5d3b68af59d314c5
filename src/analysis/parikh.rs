//! Parikh-vector solving.
//!
//! Between generations `i` and `i+1`, the counts of a symbol (or the total
//! length) produced are a linear function of how often each SaC occurs in
//! generation `i`. With `P` the predecessor-occurrence matrix (rows are
//! transitions, columns are the SaCs still unsolved for the quantity) and
//! `b` the unaccounted vector, the unknown extra output of each SaC above its
//! proven minimum satisfies `P·x = b`.
//!
//! A non-singular square `P` is solved by LU decomposition. Anything else
//! falls back to a minimum-norm least-squares solve. Only a unique,
//! integral, non-negative solution is marked exact and may tighten bounds;
//! every other result is a candidate for an exhaustive solver.

use faer::Mat;
use faer::prelude::*;
use serde::Serialize;

use crate::error::{AnalysisError, LsysResult};
use crate::sac::Sac;
use crate::symbol::SymbolId;

use super::MasterAnalysisObject;

/// Below this, an integer-valued determinant is treated as zero.
const DET_EPSILON: f64 = 0.5;
/// Distance from an integer still considered integral.
const INTEGRAL_TOLERANCE: f64 = 1e-6;
/// Damping for rank-deficient normal equations.
const DAMPING: f64 = 1e-9;

/// Which quantity a Parikh system solves for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "symbol")]
pub enum ParikhTarget {
    Length,
    Growth(SymbolId),
}

/// How the linear system was solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SolveMethod {
    /// Square, non-singular: LU solve.
    Inverse,
    /// Least squares (minimum norm when under-determined).
    LeastSquares,
}

/// Raw result of `P·x = b`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSolution {
    pub raw: Vec<f64>,
    /// `raw` rounded to the nearest integer, negatives clamped to zero.
    pub rounded: Vec<u64>,
    pub method: SolveMethod,
    pub exact: bool,
}

/// A Parikh solve over the MAO's current bounds.
#[derive(Debug, Clone, Serialize)]
pub struct ParikhSolution {
    pub target: ParikhTarget,
    /// The unsolved SaCs, one per column.
    pub columns: Vec<Sac>,
    /// Unrounded solution (extra output above each column's minimum).
    pub raw: Vec<f64>,
    /// Candidate value per column: proven minimum plus rounded extra.
    pub values: Vec<u64>,
    pub method: SolveMethod,
    pub exact: bool,
}

/// Solve `matrix · x = rhs`.
///
/// `matrix` is row-major and must be rectangular with one row per `rhs` entry.
pub fn solve_linear(matrix: &[Vec<u64>], rhs: &[i64]) -> LsysResult<LinearSolution> {
    let rows = matrix.len();
    let cols = matrix.first().map_or(0, Vec::len);
    if rows != rhs.len() || matrix.iter().any(|row| row.len() != cols) {
        return Err(AnalysisError::LinearAlgebra {
            message: format!("ragged system: {rows} rows, {} right-hand sides", rhs.len()),
        }
        .into());
    }
    if rows == 0 || cols == 0 {
        return Err(AnalysisError::LinearAlgebra {
            message: "empty system".into(),
        }
        .into());
    }

    let p = Mat::<f64>::from_fn(rows, cols, |i, j| matrix[i][j] as f64);
    let b = Mat::<f64>::from_fn(rows, 1, |i, _| rhs[i] as f64);

    let (x, method, unique) = if rows == cols && p.as_ref().determinant().abs() > DET_EPSILON {
        (p.as_ref().partial_piv_lu().solve(&b), SolveMethod::Inverse, true)
    } else {
        least_squares(&p, &b)
    };

    let raw: Vec<f64> = (0..cols).map(|j| x[(j, 0)]).collect();
    let rounded: Vec<u64> = raw.iter().map(|&v| v.round().max(0.0) as u64).collect();

    let integral = raw
        .iter()
        .all(|&v| (v - v.round()).abs() < INTEGRAL_TOLERANCE && v > -INTEGRAL_TOLERANCE);
    let exact = unique
        && integral
        && match method {
            SolveMethod::Inverse => true,
            SolveMethod::LeastSquares => satisfies(matrix, rhs, &rounded),
        };
    if method == SolveMethod::Inverse && !integral {
        tracing::warn!(
            ?raw,
            "exact Parikh solve is not a non-negative integer vector, evidence is inconsistent"
        );
    }

    Ok(LinearSolution {
        raw,
        rounded,
        method,
        exact,
    })
}

/// Minimum-norm least squares through the normal equations.
///
/// Returns whether the solution is unique (full column rank).
fn least_squares(p: &Mat<f64>, b: &Mat<f64>) -> (Mat<f64>, SolveMethod, bool) {
    let (rows, cols) = (p.nrows(), p.ncols());
    let pt = p.as_ref().transpose();
    if rows >= cols {
        // x = (PᵀP)⁻¹ Pᵀ b
        let mut gram: Mat<f64> = pt * p.as_ref();
        let full_rank = gram.as_ref().determinant().abs() > DET_EPSILON;
        if !full_rank {
            damp(&mut gram);
        }
        let ptb: Mat<f64> = pt * b.as_ref();
        (gram.as_ref().partial_piv_lu().solve(&ptb), SolveMethod::LeastSquares, full_rank)
    } else {
        // x = Pᵀ (PPᵀ)⁻¹ b
        let mut gram: Mat<f64> = p.as_ref() * pt;
        if gram.as_ref().determinant().abs() <= DET_EPSILON {
            damp(&mut gram);
        }
        let y = gram.as_ref().partial_piv_lu().solve(b);
        (pt * y.as_ref(), SolveMethod::LeastSquares, false)
    }
}

fn damp(gram: &mut Mat<f64>) {
    let n = gram.nrows();
    let trace: f64 = (0..n).map(|i| gram[(i, i)]).sum();
    let lambda = DAMPING * (trace + 1.0);
    for i in 0..n {
        gram[(i, i)] += lambda;
    }
}

fn satisfies(matrix: &[Vec<u64>], rhs: &[i64], x: &[u64]) -> bool {
    matrix.iter().zip(rhs).all(|(row, &target)| {
        let lhs: i128 = row.iter().zip(x).map(|(&a, &v)| a as i128 * v as i128).sum();
        lhs == target as i128
    })
}

// ── MAO integration ──

impl MasterAnalysisObject {
    /// Solve the length system for every SaC whose length is not yet fixed.
    ///
    /// An exact solution fixes those lengths. Returns `None` when there is
    /// nothing left to solve.
    pub fn solve_parikh_length(&mut self) -> LsysResult<Option<ParikhSolution>> {
        self.compute_unaccounted_length_matrix();
        let columns: Vec<usize> = self
            .variable_indices()
            .filter(|&s| !self.length[s].is_fixed())
            .collect();
        let rhs = self.unaccounted_length.clone();
        let mins: Vec<u64> = columns.iter().map(|&s| self.length[s].min).collect();
        let Some(solution) = self.solve_columns(ParikhTarget::Length, &columns, &rhs, &mins)? else {
            return Ok(None);
        };

        if solution.exact {
            for (&s, &value) in columns.iter().zip(&solution.values) {
                self.raise_min_length(s, value);
                self.lower_max_length(s, value);
            }
        }
        Ok(Some(solution))
    }

    /// Solve one growth system per symbol. Exact solutions fix the cells.
    pub fn solve_parikh_growth(&mut self) -> LsysResult<Vec<ParikhSolution>> {
        self.compute_unaccounted_growth_matrix();
        let mut solutions = Vec::new();
        for j in 0..self.num_symbols() {
            let columns: Vec<usize> = self
                .variable_indices()
                .filter(|&s| !self.growth[s][j].is_fixed())
                .collect();
            let rhs: Vec<i64> = self.unaccounted_growth.iter().map(|row| row[j]).collect();
            let mins: Vec<u64> = columns.iter().map(|&s| self.growth[s][j].min).collect();
            let target = ParikhTarget::Growth(SymbolId::from_index(j));
            let Some(solution) = self.solve_columns(target, &columns, &rhs, &mins)? else {
                continue;
            };
            if solution.exact {
                for (&s, &value) in columns.iter().zip(&solution.values) {
                    self.raise_min_growth(s, j, value);
                    self.lower_max_growth(s, j, value);
                }
            }
            solutions.push(solution);
        }
        Ok(solutions)
    }

    /// Build and solve `P·x = b` over the given columns, dropping
    /// transitions in which none of them occurs.
    fn solve_columns(
        &self,
        target: ParikhTarget,
        columns: &[usize],
        rhs: &[i64],
        mins: &[u64],
    ) -> LsysResult<Option<ParikhSolution>> {
        if columns.is_empty() {
            return Ok(None);
        }
        let mut matrix = Vec::new();
        let mut b = Vec::new();
        for (t, occurrences) in self.occurrences.iter().enumerate() {
            let row: Vec<u64> = columns.iter().map(|&s| occurrences[s]).collect();
            if row.iter().any(|&c| c > 0) {
                matrix.push(row);
                b.push(rhs[t]);
            }
        }
        if matrix.is_empty() {
            return Ok(None);
        }

        let linear = solve_linear(&matrix, &b)?;
        let values: Vec<u64> = linear.rounded.iter().zip(mins).map(|(&x, &min)| min + x).collect();
        tracing::debug!(
            quantity = ?target,
            rows = matrix.len(),
            cols = columns.len(),
            method = ?linear.method,
            exact = linear.exact,
            "Parikh solve"
        );

        Ok(Some(ParikhSolution {
            target,
            columns: columns.iter().map(|&s| self.evidence.sacs()[s].clone()).collect(),
            raw: linear.raw,
            values,
            method: linear.method,
            exact: linear.exact,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_system_is_exact() {
        // Cantor Dust length system.
        let solution = solve_linear(&[vec![2, 1], vec![4, 5]], &[9, 27]).unwrap();
        assert_eq!(solution.method, SolveMethod::Inverse);
        assert!(solution.exact);
        assert_eq!(solution.rounded, vec![3, 3]);
    }

    #[test]
    fn growth_systems_solve_per_symbol() {
        let p = [vec![2, 1], vec![4, 5]];
        assert_eq!(solve_linear(&p, &[4, 8]).unwrap().rounded, vec![2, 0]);
        assert_eq!(solve_linear(&p, &[5, 19]).unwrap().rounded, vec![1, 3]);
    }

    #[test]
    fn underdetermined_system_is_a_candidate() {
        let solution = solve_linear(&[vec![2, 1]], &[9]).unwrap();
        assert_eq!(solution.method, SolveMethod::LeastSquares);
        assert!(!solution.exact);
    }

    #[test]
    fn singular_square_system_falls_back() {
        let solution = solve_linear(&[vec![1, 1], vec![2, 2]], &[10, 20]).unwrap();
        assert_eq!(solution.method, SolveMethod::LeastSquares);
        assert!(!solution.exact);
        // Minimum-norm solution splits evenly.
        assert!((solution.raw[0] - 5.0).abs() < 1e-3);
        assert!((solution.raw[1] - 5.0).abs() < 1e-3);
    }

    #[test]
    fn consistent_overdetermined_system_is_exact() {
        let solution = solve_linear(&[vec![1], vec![2], vec![4]], &[3, 6, 12]).unwrap();
        assert_eq!(solution.method, SolveMethod::LeastSquares);
        assert!(solution.exact);
        assert_eq!(solution.rounded, vec![3]);
    }

    #[test]
    fn inconsistent_overdetermined_system_is_not_exact() {
        let solution = solve_linear(&[vec![1], vec![2]], &[3, 7]).unwrap();
        assert!(!solution.exact);
    }

    #[test]
    fn non_integral_solution_is_not_exact() {
        let solution = solve_linear(&[vec![2]], &[3]).unwrap();
        assert_eq!(solution.method, SolveMethod::Inverse);
        assert!(!solution.exact);
        assert_eq!(solution.rounded, vec![2]);
    }

    #[test]
    fn negative_results_clamp_to_zero() {
        let solution = solve_linear(&[vec![1]], &[-2]).unwrap();
        assert!(!solution.exact);
        assert_eq!(solution.rounded, vec![0]);
    }

    #[test]
    fn ragged_systems_are_rejected() {
        assert!(solve_linear(&[vec![1, 2], vec![1]], &[1, 2]).is_err());
        assert!(solve_linear(&[vec![1]], &[1, 2]).is_err());
        assert!(solve_linear(&[], &[]).is_err());
    }
}
