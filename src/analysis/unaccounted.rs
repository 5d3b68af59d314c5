//! Unaccounted growth and length.
//!
//! For transition `i` and symbol σ, the unaccounted growth is the count of σ
//! in `w_{i+1}` minus what the proven minimum growths of the SaCs in `w_i`
//! already explain. Unaccounted length is the same over successor lengths.
//! Both are the right-hand sides of the Parikh systems and are recomputed
//! from scratch whenever they are needed.

use super::MasterAnalysisObject;

impl MasterAnalysisObject {
    /// Recompute `unaccounted_growth[transition][symbol]`.
    pub fn compute_unaccounted_growth_matrix(&mut self) {
        for t in 0..self.occurrences.len() {
            for j in 0..self.num_symbols() {
                let explained: u64 = self.occurrences[t]
                    .iter()
                    .zip(&self.growth)
                    .map(|(&count, row)| count * row[j].min)
                    .sum();
                let unaccounted = self.produced[t][j] as i64 - explained as i64;
                if unaccounted < 0 {
                    tracing::warn!(
                        transition = t,
                        symbol = j,
                        unaccounted,
                        "negative unaccounted growth, evidence is inconsistent"
                    );
                }
                self.unaccounted_growth[t][j] = unaccounted;
            }
        }
    }

    /// Recompute `unaccounted_length[transition]`.
    pub fn compute_unaccounted_length_matrix(&mut self) {
        for t in 0..self.occurrences.len() {
            let explained: u64 = self.occurrences[t]
                .iter()
                .zip(&self.length)
                .map(|(&count, bound)| count * bound.min)
                .sum();
            let unaccounted = self.produced_len[t] as i64 - explained as i64;
            if unaccounted < 0 {
                tracing::warn!(
                    transition = t,
                    unaccounted,
                    "negative unaccounted length, evidence is inconsistent"
                );
            }
            self.unaccounted_length[t] = unaccounted;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::alphabet::Alphabet;
    use crate::analysis::{AnalysisConfig, Bound, MasterAnalysisObject};
    use crate::evidence::Evidence;
    use crate::sac::{ContextRadius, Sac};

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

    #[test]
    fn identities_are_accounted_for() {
        let mao = dragon();
        // 13 symbols follow "X+YF+", whose three identities explain 3.
        assert_eq!(mao.unaccounted_length()[0], 10);
        // "X+YF++-FX-YF+" holds nine identities; 29 - 9 = 20.
        assert_eq!(mao.unaccounted_length()[1], 20);

        let alphabet = mao.evidence().alphabet();
        let plus = alphabet.id("+").unwrap().index().unwrap();
        // Four '+' in the second generation, two explained by the first's '+'.
        assert_eq!(mao.unaccounted_growth()[0][plus], 2);
    }

    #[test]
    fn raised_minimums_shrink_the_unaccounted_part() {
        let mut mao = dragon();
        let x = Sac::context_free(mao.evidence().alphabet().id("X").unwrap());
        mao.tighten_length(&x, Bound::at_least(4)).unwrap();
        mao.compute_unaccounted_length_matrix();
        assert_eq!(mao.unaccounted_length()[0], 6);
        // X occurs twice in the second generation.
        assert_eq!(mao.unaccounted_length()[1], 12);
    }
}
