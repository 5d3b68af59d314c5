//! Minimum SaC set and minimum parameter-space search.
//!
//! Both searches are greedy set covers over the words that feed a
//! transition. A word is covered once every unsolved SaC in it is known;
//! knowing all but one SaC of a word pins the last one down too, so after
//! every pick the implied SaCs are propagated to a fixpoint.
//!
//! SaCs whose length is already proven, and identity SaCs, are known from
//! the start and never part of a result.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::{AnalysisError, LsysResult};
use crate::sac::Sac;

use super::MasterAnalysisObject;

/// Result of a cover search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SacCover {
    /// SaCs picked by the greedy step, in pick order.
    pub chosen: Vec<Sac>,
    /// SaCs pinned down by propagation, in discovery order.
    pub implied: Vec<Sac>,
}

impl SacCover {
    /// The pinned-down rule set: chosen then implied.
    pub fn sacs(&self) -> Vec<Sac> {
        self.chosen.iter().chain(&self.implied).cloned().collect()
    }

    pub fn contains(&self, sac: &Sac) -> bool {
        self.chosen.contains(sac) || self.implied.contains(sac)
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty() && self.implied.is_empty()
    }
}

/// A cover plus the size of the space an exhaustive solver would search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PSpaceCover {
    pub cover: SacCover,
    /// Product of the chosen SaCs' length-range sizes (saturating).
    pub size: u128,
}

/// Greedy state shared by both searches.
struct CoverState {
    /// Unknown SaC indices per word.
    words: Vec<BTreeSet<usize>>,
    known: BTreeSet<usize>,
    covered: Vec<bool>,
    chosen: Vec<usize>,
    implied: Vec<usize>,
}

impl CoverState {
    fn new(words: Vec<BTreeSet<usize>>) -> Self {
        let covered = words.iter().map(BTreeSet::is_empty).collect();
        let mut state = Self {
            words,
            known: BTreeSet::new(),
            covered,
            chosen: Vec::new(),
            implied: Vec::new(),
        };
        state.propagate();
        state
    }

    fn uncovered(&self) -> impl Iterator<Item = &BTreeSet<usize>> {
        self.words
            .iter()
            .zip(&self.covered)
            .filter(|&(_, &covered)| !covered)
            .map(|(word, _)| word)
    }

    fn remaining(&self) -> usize {
        self.covered.iter().filter(|&&c| !c).count()
    }

    /// Uncovered words containing each still-unknown SaC, ascending by index.
    fn coverage(&self) -> Vec<(usize, usize)> {
        let mut candidates: BTreeSet<usize> = BTreeSet::new();
        for word in self.uncovered() {
            candidates.extend(word.difference(&self.known).copied());
        }
        candidates
            .into_iter()
            .map(|s| (s, self.uncovered().filter(|word| word.contains(&s)).count()))
            .collect()
    }

    fn pick(&mut self, s: usize) {
        self.chosen.push(s);
        self.known.insert(s);
        self.propagate();
    }

    /// Cover every word with at most one unknown, learning that one.
    fn propagate(&mut self) {
        loop {
            let mut progressed = false;
            for w in 0..self.words.len() {
                if self.covered[w] {
                    continue;
                }
                let unknown: Vec<usize> = self.words[w].difference(&self.known).copied().collect();
                match unknown.as_slice() {
                    [] => {
                        self.covered[w] = true;
                        progressed = true;
                    }
                    [single] => {
                        self.implied.push(*single);
                        self.known.insert(*single);
                        self.covered[w] = true;
                        progressed = true;
                    }
                    _ => {}
                }
            }
            if !progressed {
                break;
            }
        }
    }
}

impl MasterAnalysisObject {
    /// Greedy minimum set of SaCs whose rules pin down every other unsolved SaC.
    pub fn find_minimum_sacs_set(&self) -> LsysResult<SacCover> {
        let mut state = self.cover_state();
        while state.remaining() > 0 {
            let best = state
                .coverage()
                .into_iter()
                .filter(|&(_, count)| count > 0)
                .fold(None, |best: Option<(usize, usize)>, candidate| match best {
                    Some(b) if b.1 >= candidate.1 => Some(b),
                    _ => Some(candidate),
                });
            // Propagation leaves two or more unknowns in every uncovered
            // word, so a candidate exists while words remain.
            let Some((s, _)) = best else {
                return Err(AnalysisError::NoCover {
                    remaining: state.remaining(),
                }
                .into());
            };
            state.pick(s);
        }
        let cover = self.to_cover(&state);
        tracing::info!(
            chosen = cover.chosen.len(),
            implied = cover.implied.len(),
            "minimum SaC set found"
        );
        Ok(cover)
    }

    /// Greedy cover minimising the product of chosen length ranges.
    pub fn find_smallest_pspace(&self) -> LsysResult<PSpaceCover> {
        let mut state = self.cover_state();
        let mut size: u128 = 1;
        while state.remaining() > 0 {
            let best = state
                .coverage()
                .into_iter()
                .filter(|&(_, count)| count > 0)
                .map(|(s, count)| (s, count, size.saturating_mul(self.length_range(s))))
                // First minimum wins, so ties fall to the lower index.
                .min_by_key(|&(_, count, product)| (product, Reverse(count)));
            // Same invariant as in `find_minimum_sacs_set`.
            let Some((s, _, product)) = best else {
                return Err(AnalysisError::NoCover {
                    remaining: state.remaining(),
                }
                .into());
            };
            size = product;
            state.pick(s);
        }
        let cover = self.to_cover(&state);
        tracing::info!(chosen = cover.chosen.len(), size, "smallest p-space found");
        Ok(PSpaceCover { cover, size })
    }

    fn cover_state(&self) -> CoverState {
        let unknown: Vec<usize> = self
            .variable_indices()
            .filter(|&s| !self.length[s].is_fixed())
            .collect();
        let words = self
            .occurrences
            .iter()
            .map(|row| unknown.iter().copied().filter(|&s| row[s] > 0).collect())
            .collect();
        CoverState::new(words)
    }

    /// Candidate successor lengths of a SaC.
    fn length_range(&self, s: usize) -> u128 {
        self.length[s].width().map_or(u128::MAX, u128::from)
    }

    fn to_cover(&self, state: &CoverState) -> SacCover {
        let sacs = self.evidence.sacs();
        SacCover {
            chosen: state.chosen.iter().map(|&s| sacs[s].clone()).collect(),
            implied: state.implied.iter().map(|&s| sacs[s].clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;
    use crate::analysis::{AnalysisConfig, Bound};
    use crate::evidence::Evidence;
    use crate::sac::ContextRadius;

    const DRAGON: [&str; 3] = [
        "X+YF+",
        "X+YF++-FX-YF+",
        "X+YF++-FX-YF++-FX+YF+--FX-YF+",
    ];

    fn dragon() -> MasterAnalysisObject {
        let alphabet = Alphabet::builder().strings(DRAGON).turtle_2d().build().unwrap();
        let evidence = Evidence::with_radius(&DRAGON, alphabet, ContextRadius::ZERO).unwrap();
        MasterAnalysisObject::new(evidence, AnalysisConfig::default())
    }

    fn labels(mao: &MasterAnalysisObject, sacs: &[Sac]) -> Vec<String> {
        sacs.iter().map(|s| s.display(mao.evidence().alphabet())).collect()
    }

    #[test]
    fn dragon_needs_both_rules() {
        let mut mao = dragon();
        mao.refine_to_fixpoint().unwrap();
        let cover = mao.find_minimum_sacs_set().unwrap();
        assert_eq!(labels(&mao, &cover.chosen), vec!["X"]);
        assert_eq!(labels(&mao, &cover.implied), vec!["Y"]);
        let mut all = labels(&mao, &cover.sacs());
        all.sort();
        assert_eq!(all, vec!["X", "Y"]);
    }

    #[test]
    fn identities_never_appear() {
        let mao = dragon();
        let cover = mao.find_minimum_sacs_set().unwrap();
        assert!(cover.sacs().iter().all(|s| !mao.evidence().is_identity(s)));
    }

    #[test]
    fn solved_sacs_are_known() {
        let mut mao = dragon();
        let x = Sac::context_free(mao.evidence().alphabet().id("X").unwrap());
        mao.tighten_length(&x, Bound::exact(5)).unwrap();
        let cover = mao.find_minimum_sacs_set().unwrap();
        assert!(cover.chosen.is_empty());
        assert_eq!(labels(&mao, &cover.implied), vec!["Y"]);
    }

    #[test]
    fn pspace_prefers_narrow_ranges() {
        let mut mao = dragon();
        let y = Sac::context_free(mao.evidence().alphabet().id("Y").unwrap());
        mao.tighten_length(&y, Bound::between(4, 6)).unwrap();
        let pspace = mao.find_smallest_pspace().unwrap();
        assert_eq!(labels(&mao, &pspace.cover.chosen), vec!["Y"]);
        assert_eq!(pspace.size, 3);
    }

    #[test]
    fn nothing_to_cover() {
        let strings = ["ABA", "ABABBBABA", "ABABBBABABBBBBBBBBABABBBABA"];
        let alphabet = Alphabet::builder().strings(strings).build().unwrap();
        let evidence = Evidence::with_radius(&strings, alphabet, ContextRadius::ZERO).unwrap();
        let mut mao = MasterAnalysisObject::new(evidence, AnalysisConfig::default());
        mao.refine_to_fixpoint().unwrap();
        assert!(mao.find_minimum_sacs_set().unwrap().is_empty());
        let pspace = mao.find_smallest_pspace().unwrap();
        assert_eq!(pspace.size, 1);
    }

    #[test]
    fn uncovered_words_always_offer_a_candidate() {
        let words = vec![BTreeSet::from([0, 1]), BTreeSet::from([2]), BTreeSet::new()];
        let state = CoverState::new(words);
        // The single-unknown and empty words are settled up front.
        assert_eq!(state.remaining(), 1);
        assert_eq!(state.implied, vec![2]);
        assert_eq!(state.coverage(), vec![(0, 1), (1, 1)]);
    }

    #[test]
    fn propagation_chains_through_words() {
        // Words {0,1}, {1,2}, {2,3}: picking 0 implies 1, then 2, then 3.
        let words = vec![
            BTreeSet::from([0, 1]),
            BTreeSet::from([1, 2]),
            BTreeSet::from([2, 3]),
        ];
        let mut state = CoverState::new(words);
        state.pick(0);
        assert_eq!(state.remaining(), 0);
        assert_eq!(state.implied, vec![1, 2, 3]);
    }
}
