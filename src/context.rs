//! Context-depth inference.
//!
//! When the window radius is not supplied it is inferred from the evidence:
//! for every occurrence of every variable symbol, measure the full context
//! depth available on each side (stopping at forbidden symbols, skipping
//! ignored ones). An occurrence with depth `d` is one observation of every
//! candidate depth `1..=d`, because every shorter suffix (left) or prefix
//! (right) of its context is also a context it exhibits.
//!
//! Each side's radius is the ceiling of the length-penalised weighted mean
//! `Σ n_d / Σ (n_d / d)` of a symbol's histogram, maximised over symbols.
//! Long contexts are down-weighted relative to their frequency so that rare
//! long matches do not blow up the radius.

use std::collections::BTreeMap;

use crate::alphabet::Alphabet;
use crate::sac::ContextRadius;
use crate::symbol::SymbolId;
use crate::word::{Side, context_window};

/// Observed context depths of one symbol: depth → observations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepthHistogram {
    pub left: BTreeMap<usize, usize>,
    pub right: BTreeMap<usize, usize>,
}

impl DepthHistogram {
    fn observe(&mut self, side: Side, depth: usize) {
        let histogram = match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        };
        for d in 1..=depth {
            *histogram.entry(d).or_insert(0) += 1;
        }
    }
}

/// Build the per-symbol depth histograms for every variable symbol.
pub fn depth_histograms(
    generations: &[Vec<SymbolId>],
    alphabet: &Alphabet,
) -> BTreeMap<SymbolId, DepthHistogram> {
    let mut histograms: BTreeMap<SymbolId, DepthHistogram> = alphabet
        .variables()
        .into_iter()
        .map(|id| (id, DepthHistogram::default()))
        .collect();

    for symbols in generations {
        for (i, id) in symbols.iter().enumerate() {
            let Some(histogram) = histograms.get_mut(id) else {
                continue;
            };
            for side in [Side::Left, Side::Right] {
                let depth = context_window(symbols, i, alphabet, side, None).len();
                histogram.observe(side, depth);
            }
        }
    }
    histograms
}

/// Length-penalised weighted mean of a depth histogram; 0 when empty.
pub fn penalised_mean(histogram: &BTreeMap<usize, usize>) -> f64 {
    let (numerator, denominator) = histogram
        .iter()
        .filter(|&(&depth, &count)| depth > 0 && count > 0)
        .fold((0.0, 0.0), |(num, den), (&depth, &count)| {
            (num + count as f64, den + count as f64 / depth as f64)
        });
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Infer the full radius from the evidence.
pub fn infer_radius(generations: &[Vec<SymbolId>], alphabet: &Alphabet) -> ContextRadius {
    resolve_radius(generations, alphabet, None, None)
}

/// Resolve each side independently: keep a supplied depth, infer a missing one.
pub fn resolve_radius(
    generations: &[Vec<SymbolId>],
    alphabet: &Alphabet,
    left: Option<usize>,
    right: Option<usize>,
) -> ContextRadius {
    if let (Some(left), Some(right)) = (left, right) {
        return ContextRadius::new(left, right);
    }

    let (mut inferred_left, mut inferred_right) = (0, 0);
    for histogram in depth_histograms(generations, alphabet).values() {
        inferred_left = inferred_left.max(ceil_depth(penalised_mean(&histogram.left)));
        inferred_right = inferred_right.max(ceil_depth(penalised_mean(&histogram.right)));
    }

    let radius = ContextRadius::new(left.unwrap_or(inferred_left), right.unwrap_or(inferred_right));
    tracing::debug!(k = radius.left, l = radius.right, "inferred context radius");
    radius
}

fn ceil_depth(mean: f64) -> usize {
    // Absorb float noise so an exact integer mean is not rounded up.
    (mean - 1e-9).ceil().max(0.0) as usize
}
