//! Engine facade: top-level API for L-system inference.
//!
//! The `Engine` turns settings into evidence, runs the analysis to a
//! fixpoint and the cover searches, and collects everything into a
//! serialisable [`InferenceReport`].

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::alphabet::Alphabet;
use crate::analysis::{
    AnalysisConfig, Bound, MasterAnalysisObject, ParikhSolution, ParikhTarget, SacCover,
    SolveMethod,
};
use crate::error::LsysResult;
use crate::evidence::Evidence;
use crate::problems::ProblemRegistry;
use crate::sac::ContextRadius;
use crate::settings::{Mode, Settings};

/// Configuration for the inference engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Lower bound on every successor's length (default: 0).
    pub absolute_min_length: u64,
    /// Safety cap on refinement passes (default: 64).
    pub max_passes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let analysis = AnalysisConfig::default();
        Self {
            absolute_min_length: analysis.absolute_min_length,
            max_passes: analysis.max_passes,
        }
    }
}

impl EngineConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            absolute_min_length: settings.absolute_min_length,
            max_passes: settings.max_passes,
        }
    }

    fn analysis(&self) -> AnalysisConfig {
        AnalysisConfig {
            absolute_min_length: self.absolute_min_length,
            max_passes: self.max_passes,
        }
    }
}

/// The L-system inference engine.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    registry: ProblemRegistry,
}

impl Engine {
    /// Create an engine with the built-in problem registry.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            registry: ProblemRegistry::builtin(),
        }
    }

    /// Replace the problem registry.
    pub fn with_registry(mut self, registry: ProblemRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &ProblemRegistry {
        &self.registry
    }

    /// Build the evidence a settings file describes.
    pub fn evidence(&self, settings: &Settings) -> LsysResult<Evidence> {
        settings.validate()?;
        let (strings, mut identities) = match settings.mode {
            Mode::Inference => (settings.strings.clone(), Vec::new()),
            Mode::Experiment => {
                let problem = self.registry.build(&settings.name)?;
                let identities: Vec<String> = problem
                    .alphabet
                    .identities()
                    .into_iter()
                    .map(|id| problem.alphabet.label(id))
                    .collect();
                (problem.strings()?, identities)
            }
        };
        identities.extend(settings.identities.iter().cloned());

        let alphabet = Alphabet::builder()
            .strings(strings.iter().cloned())
            .identities(identities)
            .forbidden(settings.forbidden.iter().cloned())
            .ignore(settings.ignore.iter().cloned())
            .build()?;
        Evidence::new(&strings, alphabet, settings.left_radius(), settings.right_radius())
    }

    /// Refine to a fixpoint and run the cover searches.
    pub fn analyse(&self, name: &str, evidence: Evidence) -> LsysResult<InferenceReport> {
        let mut mao = MasterAnalysisObject::new(evidence, self.config.analysis());
        let refinement = mao.refine_to_fixpoint()?;
        let minimum_set = mao.find_minimum_sacs_set()?;
        let pspace = mao.find_smallest_pspace()?;

        let alphabet = mao.evidence().alphabet();
        let render = |cover: &SacCover| CoverReport {
            chosen: cover.chosen.iter().map(|s| s.display(alphabet)).collect(),
            implied: cover.implied.iter().map(|s| s.display(alphabet)).collect(),
        };

        let mut sacs = Vec::new();
        for sac in mao.evidence().sacs_to_solve() {
            let growth = alphabet
                .ids()
                .zip(mao.growth_row(sac)?)
                .map(|(id, bound)| (alphabet.label(id), *bound))
                .collect();
            sacs.push(SacReport {
                sac: sac.display(alphabet),
                length: mao.length(sac)?,
                growth,
            });
        }

        let report = InferenceReport {
            name: name.to_string(),
            radius: mao.evidence().radius(),
            generations: mao.evidence().words().len(),
            sacs,
            solved: refinement.solved,
            fully_solved: refinement.fully_solved,
            passes: refinement.passes.len(),
            pass_changes: refinement.passes.iter().map(|p| p.changes()).collect(),
            minimum_set: render(&minimum_set),
            pspace: PSpaceReport {
                cover: render(&pspace.cover),
                size: pspace.size,
            },
            candidates: refinement
                .candidates
                .iter()
                .map(|c| CandidateReport::new(c, alphabet))
                .collect(),
        };
        tracing::info!(
            name,
            solved = report.solved,
            passes = report.passes,
            pspace = report.pspace.size,
            "inference complete"
        );
        Ok(report)
    }

    /// Run the whole pipeline for a settings file.
    pub fn run(&self, settings: &Settings) -> LsysResult<InferenceReport> {
        let evidence = self.evidence(settings)?;
        self.analyse(&settings.name, evidence)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Bounds proven for one unknown rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SacReport {
    pub sac: String,
    pub length: Bound,
    /// Growth bound per symbol label.
    pub growth: BTreeMap<String, Bound>,
}

/// A cover rendered with the alphabet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverReport {
    pub chosen: Vec<String>,
    pub implied: Vec<String>,
}

impl CoverReport {
    /// Chosen and implied SaCs together.
    pub fn sacs(&self) -> Vec<String> {
        self.chosen.iter().chain(&self.implied).cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PSpaceReport {
    pub cover: CoverReport,
    pub size: u128,
}

/// An inexact Parikh solution, kept for an exhaustive solver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateReport {
    /// `length` or the grown symbol's label.
    pub target: String,
    pub sacs: Vec<String>,
    pub values: Vec<u64>,
    pub raw: Vec<f64>,
    pub method: SolveMethod,
}

impl CandidateReport {
    fn new(solution: &ParikhSolution, alphabet: &Alphabet) -> Self {
        let target = match solution.target {
            ParikhTarget::Length => "length".to_string(),
            ParikhTarget::Growth(id) => format!("growth of {}", alphabet.label(id)),
        };
        Self {
            target,
            sacs: solution.columns.iter().map(|s| s.display(alphabet)).collect(),
            values: solution.values.clone(),
            raw: solution.raw.clone(),
            method: solution.method,
        }
    }
}

/// Everything one run proved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceReport {
    pub name: String,
    pub radius: ContextRadius,
    pub generations: usize,
    pub sacs: Vec<SacReport>,
    pub solved: bool,
    pub fully_solved: bool,
    pub passes: usize,
    pub pass_changes: Vec<usize>,
    pub minimum_set: CoverReport,
    pub pspace: PSpaceReport,
    pub candidates: Vec<CandidateReport>,
}

impl InferenceReport {
    /// The report for one SaC, by its `L<S>R` rendering.
    pub fn sac(&self, notation: &str) -> Option<&SacReport> {
        self.sacs.iter().find(|s| s.sac == notation)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for InferenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} generations, radius (k, l) = {}",
            self.name, self.generations, self.radius
        )?;
        let status = match (self.fully_solved, self.solved) {
            (true, _) => "fully solved",
            (false, true) => "lengths solved",
            (false, false) => "unsolved",
        };
        writeln!(f, "{status} after {} passes", self.passes)?;
        for sac in &self.sacs {
            let growth: Vec<String> = sac
                .growth
                .iter()
                .filter(|(_, bound)| bound.max != Some(0))
                .map(|(label, bound)| format!("{label}: {bound}"))
                .collect();
            writeln!(
                f,
                "  {:<12} length {:<10} growth {{{}}}",
                sac.sac,
                sac.length.to_string(),
                growth.join(", ")
            )?;
        }
        if !self.minimum_set.chosen.is_empty() || !self.minimum_set.implied.is_empty() {
            writeln!(
                f,
                "minimum SaC set: {} (chosen: {})",
                self.minimum_set.sacs().join(", "),
                self.minimum_set.chosen.join(", ")
            )?;
            writeln!(
                f,
                "smallest p-space: {} over {}",
                self.pspace.size,
                self.pspace.cover.chosen.join(", ")
            )?;
        }
        for candidate in &self.candidates {
            writeln!(
                f,
                "candidate {} ({:?}): {} = {:?}",
                candidate.target,
                candidate.method,
                candidate.sacs.join(", "),
                candidate.values
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn experiment_cantor_dust() {
        let engine = Engine::default();
        let settings = Settings {
            k: 0,
            l: 0,
            ..Settings::experiment("CantorDust")
        };
        let report = engine.run(&settings).unwrap();
        assert!(report.solved);
        assert!(report.fully_solved);
        assert_eq!(report.radius, ContextRadius::ZERO);
        let a = report.sac("A").unwrap();
        assert_eq!(a.length, Bound::exact(3));
        assert_eq!(a.growth["A"], Bound::exact(2));
        assert_eq!(a.growth["B"], Bound::exact(1));
        assert!(report.minimum_set.sacs().is_empty());
        assert_eq!(report.pspace.size, 1);
    }

    #[test]
    fn experiment_dragon_curve() {
        let settings = Settings {
            k: 0,
            l: 0,
            ..Settings::experiment("DragonCurve")
        };
        let report = Engine::default().run(&settings).unwrap();
        assert!(!report.solved);
        let mut set = report.minimum_set.sacs();
        set.sort();
        assert_eq!(set, vec!["X", "Y"]);
        assert!(report.sac("F").is_none());
        assert!(!report.candidates.is_empty());
    }

    #[test]
    fn inference_mode_uses_raw_strings() {
        let settings = Settings {
            k: 0,
            l: 0,
            ..Settings::inference("cantor-2", ["ABA", "ABABBBABA"])
        };
        let report = Engine::default().run(&settings).unwrap();
        assert!(!report.solved);
        assert_eq!(report.generations, 2);
        assert!(report.candidates.iter().any(|c| c.target == "length"));
    }

    #[test]
    fn default_forbidden_symbols_stay_out_of_the_alphabet() {
        let engine = Engine::default();
        let settings = Settings {
            k: 0,
            l: 0,
            ..Settings::inference("cantor", ["ABA", "ABABBBABA", "ABABBBABABBBBBBBBBABABBBABA"])
        };
        assert_eq!(settings.forbidden, vec!["[", "]"]);
        let evidence = engine.evidence(&settings).unwrap();
        assert_eq!(evidence.alphabet().len(), 2);

        let report = engine.run(&settings).unwrap();
        let growth = &report.sac("A").unwrap().growth;
        let labels: Vec<&str> = growth.keys().map(String::as_str).collect();
        assert_eq!(labels, vec!["A", "B"]);
    }

    #[test]
    fn unknown_problem_fails() {
        let settings = Settings::experiment("KochCurve");
        assert!(Engine::default().run(&settings).is_err());
    }

    #[test]
    fn report_renders_as_text_and_json() {
        let settings = Settings {
            k: 0,
            l: 0,
            ..Settings::experiment("CantorDust")
        };
        let report = Engine::default().run(&settings).unwrap();
        let text = report.to_string();
        assert!(text.contains("fully solved"));
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["solved"], serde_json::Value::Bool(true));
        assert_eq!(json["sacs"][0]["length"]["min"], 3);
    }
}
