//! End-to-end tests for L-system inference.
//!
//! These exercise the full pipeline from known rule sets through derived
//! evidence, refinement and the cover searches, checking that every proven
//! bound admits the rules that actually produced the strings.

use lsys_infer::alphabet::Alphabet;
use lsys_infer::analysis::{AnalysisConfig, Bound, MasterAnalysisObject};
use lsys_infer::engine::{Engine, EngineConfig};
use lsys_infer::error::{EvidenceError, LsysError};
use lsys_infer::evidence::Evidence;
use lsys_infer::problems::{Problem, ProblemRegistry};
use lsys_infer::rules::ProductionRule;
use lsys_infer::sac::{ContextRadius, Sac};
use lsys_infer::settings::{Mode, Settings};

fn analysed(problem: &Problem) -> MasterAnalysisObject {
    let strings = problem.strings().unwrap();
    let evidence =
        Evidence::with_radius(&strings, problem.alphabet.clone(), problem.radius()).unwrap();
    let mut mao = MasterAnalysisObject::new(evidence, AnalysisConfig::default());
    mao.refine_to_fixpoint().unwrap();
    mao
}

/// Every bound must admit the rule that produced the evidence.
fn assert_bounds_admit_rules(problem: &Problem, mao: &MasterAnalysisObject) {
    for rule in problem.rules.rules() {
        let ProductionRule::Deterministic { predecessor, .. } = rule else {
            continue;
        };
        let Ok(length) = mao.length(predecessor) else {
            continue;
        };
        assert!(
            length.contains(&Bound::exact(rule.length() as u64)),
            "length of {} is {} but the rule gives {}",
            predecessor.display(&problem.alphabet),
            length,
            rule.length()
        );
        for id in problem.alphabet.ids() {
            let growth = mao.growth(predecessor, id).unwrap();
            assert!(growth.contains(&Bound::exact(rule.growth(id) as u64)));
        }
    }
}

#[test]
fn cantor_dust_is_fully_solved() {
    let problem = ProblemRegistry::builtin().build("CantorDust").unwrap();
    let mao = analysed(&problem);
    assert!(mao.is_solved());
    assert!(mao.is_fully_solved());

    let alphabet = mao.evidence().alphabet();
    let (a, b) = (alphabet.id("A").unwrap(), alphabet.id("B").unwrap());
    let (sac_a, sac_b) = (Sac::context_free(a), Sac::context_free(b));
    assert_eq!(mao.length(&sac_a).unwrap(), Bound::exact(3));
    assert_eq!(mao.length(&sac_b).unwrap(), Bound::exact(3));
    assert_eq!(mao.growth(&sac_a, a).unwrap(), Bound::exact(2));
    assert_eq!(mao.growth(&sac_a, b).unwrap(), Bound::exact(1));
    assert_eq!(mao.growth(&sac_b, a).unwrap(), Bound::exact(0));
    assert_eq!(mao.growth(&sac_b, b).unwrap(), Bound::exact(3));
}

#[test]
fn dragon_curve_bounds_admit_the_true_rules() {
    let problem = ProblemRegistry::builtin().build("DragonCurve").unwrap();
    let mao = analysed(&problem);
    assert!(!mao.is_solved());
    assert_bounds_admit_rules(&problem, &mao);
}

#[test]
fn cantor_dust_bounds_admit_the_true_rules() {
    let problem = ProblemRegistry::builtin().build("CantorDust").unwrap();
    let mao = analysed(&problem);
    assert_bounds_admit_rules(&problem, &mao);
}

#[test]
fn identities_stay_fixed() {
    let problem = ProblemRegistry::builtin().build("DragonCurve").unwrap();
    let mao = analysed(&problem);
    let alphabet = mao.evidence().alphabet();
    for label in ["F", "+", "-"] {
        let id = alphabet.id(label).unwrap();
        let sac = Sac::context_free(id);
        assert_eq!(mao.length(&sac).unwrap(), Bound::exact(1));
        assert_eq!(mao.growth(&sac, id).unwrap(), Bound::exact(1));
    }
    assert!(mao.evidence().sacs_to_solve().iter().all(|s| !mao.evidence().is_identity(s)));
}

#[test]
fn one_generation_is_not_evidence() {
    let alphabet = Alphabet::builder().strings(["ABA"]).build().unwrap();
    let err = Evidence::new(&["ABA"], alphabet, Some(0), Some(0)).unwrap_err();
    assert!(matches!(
        err,
        LsysError::Evidence(EvidenceError::TooFewGenerations { count: 1 })
    ));
}

#[test]
fn single_transition_leaves_candidates() {
    let strings = ["ABA", "ABABBBABA"];
    let alphabet = Alphabet::builder().strings(strings).build().unwrap();
    let evidence = Evidence::with_radius(&strings, alphabet, ContextRadius::ZERO).unwrap();
    let mut mao = MasterAnalysisObject::new(evidence, AnalysisConfig::default());
    let report = mao.refine_to_fixpoint().unwrap();
    assert!(report.reached_fixpoint);
    assert!(!report.solved);
    assert!(!report.candidates.is_empty());
    assert!(report.candidates.iter().all(|c| !c.exact));
}

#[test]
fn dragon_minimum_set_pins_both_rules() {
    let settings = Settings {
        k: 0,
        l: 0,
        ..Settings::experiment("DragonCurve")
    };
    let report = Engine::default().run(&settings).unwrap();
    let mut set = report.minimum_set.sacs();
    set.sort();
    assert_eq!(set, vec!["X", "Y"]);
    assert_eq!(report.minimum_set.chosen.len(), 1);
    assert!(report.pspace.size >= 1);
    for identity in ["F", "+", "-"] {
        assert!(!set.iter().any(|s| s == identity));
    }
}

#[test]
fn settings_file_drives_a_run() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("cantor.toml");
    std::fs::write(
        &path,
        r#"
name = "cantor"
mode = "Inference"
k = 0
l = 0
strings = ["ABA", "ABABBBABA", "ABABBBABABBBBBBBBBABABBBABA"]
"#,
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.mode, Mode::Inference);
    let engine = Engine::new(EngineConfig::from_settings(&settings));
    let report = engine.run(&settings).unwrap();
    assert_eq!(report.name, "cantor");
    assert!(report.fully_solved);
    assert_eq!(report.sac("B").unwrap().length, Bound::exact(3));
    assert_eq!(report.pass_changes.last(), Some(&0));
}

#[test]
fn absolute_min_length_is_respected() {
    let settings = Settings {
        k: 0,
        l: 0,
        absolute_min_length: 2,
        ..Settings::experiment("DragonCurve")
    };
    let report = Engine::new(EngineConfig::from_settings(&settings)).run(&settings).unwrap();
    for sac in &report.sacs {
        assert!(sac.length.min >= 2, "{} has length {}", sac.sac, sac.length);
    }
}

#[test]
fn context_sensitive_evidence_is_keyed_by_context() {
    // B rewrites differently after an A.
    let alphabet = Alphabet::builder().strings(["AB"]).build().unwrap();
    let radius = ContextRadius::new(1, 0);
    let rules = lsys_infer::rules::RuleSet::parse(
        &alphabet,
        radius,
        &[("A", "AB"), ("A<B", "BB"), ("B", "B")],
    )
    .unwrap();
    let strings = rules.derive_strings("AB", &alphabet, 3).unwrap();
    let evidence = Evidence::with_radius(&strings, alphabet.clone(), radius).unwrap();
    let after_a = Sac::parse("A<B", &alphabet).unwrap();
    let keyed = after_a.display(&alphabet);
    assert!(evidence.sacs_to_solve().iter().any(|s| s.display(&alphabet) == keyed));
}
