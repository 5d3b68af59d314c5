//! Property tests over randomly generated context-free L-systems.

use lsys_infer::alphabet::Alphabet;
use lsys_infer::analysis::{AnalysisConfig, Bound, MasterAnalysisObject};
use lsys_infer::context;
use lsys_infer::evidence::Evidence;
use lsys_infer::rules::RuleSet;
use lsys_infer::sac::{ContextRadius, Sac};
use lsys_infer::symbol::SymbolId;
use lsys_infer::word::Word;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

/// A two-symbol D0L system: axiom plus successors of A and B.
fn arb_system() -> impl Strategy<Value = (String, String, String)> {
    ("[AB]{1,3}", "[AB]{1,3}", "[AB]{1,3}")
}

fn alphabet() -> Alphabet {
    Alphabet::builder().strings(["AB"]).build().unwrap()
}

fn derive(axiom: &str, a: &str, b: &str) -> (Alphabet, RuleSet, Vec<String>) {
    let alphabet = alphabet();
    let rules = RuleSet::parse(&alphabet, ContextRadius::ZERO, &[("A", a), ("B", b)]).unwrap();
    let strings = rules.derive_strings(axiom, &alphabet, 3).unwrap();
    (alphabet, rules, strings)
}

fn config() -> AnalysisConfig {
    AnalysisConfig {
        max_passes: 1_000,
        ..Default::default()
    }
}

fn snapshot(mao: &MasterAnalysisObject) -> Vec<(Bound, Vec<Bound>)> {
    mao.evidence()
        .sacs()
        .iter()
        .map(|sac| (mao.length(sac).unwrap(), mao.growth_row(sac).unwrap().to_vec()))
        .collect()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn words_render_back_to_their_string(raw in "[AB+F-]{1,20}") {
        let alphabet = Alphabet::builder().strings([raw.as_str()]).build().unwrap();
        let word = Word::from_string(&raw, &alphabet, ContextRadius::ZERO).unwrap();
        prop_assert_eq!(word.len(), raw.chars().count());
        prop_assert_eq!(word.to_flat_string(&alphabet), raw);
    }

    #[test]
    fn refinement_only_tightens((axiom, a, b) in arb_system()) {
        let (alphabet, _, strings) = derive(&axiom, &a, &b);
        let evidence = Evidence::with_radius(&strings, alphabet, ContextRadius::ZERO).unwrap();
        let mut mao = MasterAnalysisObject::new(evidence, config());
        let mut before = snapshot(&mao);
        for pass in 1..=8 {
            mao.refine_pass(pass).unwrap();
            let after = snapshot(&mao);
            for ((old_len, old_growth), (new_len, new_growth)) in before.iter().zip(&after) {
                prop_assert!(old_len.contains(new_len));
                for (old, new) in old_growth.iter().zip(new_growth) {
                    prop_assert!(old.contains(new));
                }
            }
            before = after;
        }
    }

    #[test]
    fn bounds_admit_the_generating_rules((axiom, a, b) in arb_system()) {
        let (alphabet, rules, strings) = derive(&axiom, &a, &b);
        let evidence =
            Evidence::with_radius(&strings, alphabet.clone(), ContextRadius::ZERO).unwrap();
        let mut mao = MasterAnalysisObject::new(evidence, config());
        mao.refine_to_fixpoint().unwrap();

        for rule in rules.rules() {
            let sac = rule.predecessor();
            // A symbol that never occurs before the last generation has no evidence.
            let Ok(length) = mao.length(&sac) else { continue };
            prop_assert!(length.contains(&Bound::exact(rule.length() as u64)));
            for id in alphabet.ids() {
                let growth = mao.growth(&sac, id).unwrap();
                prop_assert!(growth.contains(&Bound::exact(rule.growth(id) as u64)));
            }
        }
    }

    #[test]
    fn radius_inference_is_deterministic((axiom, a, b) in arb_system()) {
        let (alphabet, _, strings) = derive(&axiom, &a, &b);
        let generations: Vec<Vec<SymbolId>> = strings
            .iter()
            .map(|s| alphabet.tokenize(s).unwrap())
            .collect();
        let first = context::infer_radius(&generations, &alphabet);
        let second = context::infer_radius(&generations, &alphabet);
        prop_assert_eq!(first, second);

        let evidence = Evidence::new(&strings, alphabet.clone(), None, None).unwrap();
        prop_assert_eq!(evidence.radius(), first);
    }

    #[test]
    fn identity_sacs_never_need_solving(raw in "[AB]{1,6}") {
        let strings = [format!("F{raw}+"), format!("F{raw}{raw}+")];
        let alphabet = Alphabet::builder()
            .strings(strings.iter().cloned())
            .identities(["F", "+"])
            .build()
            .unwrap();
        let evidence =
            Evidence::with_radius(&strings, alphabet.clone(), ContextRadius::ZERO).unwrap();
        let f = Sac::context_free(alphabet.id("F").unwrap());
        prop_assert!(evidence.is_identity(&f));
        prop_assert!(!evidence.sacs_to_solve().contains(&f));
        let mao = MasterAnalysisObject::new(evidence, config());
        prop_assert_eq!(mao.length(&f).unwrap(), Bound::exact(1));
    }
}
