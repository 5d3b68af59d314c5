//! Rich diagnostic error types for the inference engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so users know exactly what went wrong
//! with their evidence and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the inference engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum LsysError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Alphabet(#[from] AlphabetError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Sac(#[from] SacError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Evidence(#[from] EvidenceError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Problem(#[from] ProblemError),
}

// ---------------------------------------------------------------------------
// Alphabet errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum AlphabetError {
    #[error("unknown symbol \"{symbol}\"")]
    #[diagnostic(
        code(lsys::alphabet::unknown_symbol),
        help(
            "Every symbol in the evidence must belong to the alphabet. \
             Build the alphabet from the same strings, or declare the symbol \
             as an identity."
        )
    )]
    UnknownSymbol { symbol: String },

    #[error("unknown symbol id {id}")]
    #[diagnostic(
        code(lsys::alphabet::unknown_id),
        help("Symbol ids are assigned by the alphabet. Only use ids it handed out.")
    )]
    UnknownId { id: i32 },

    #[error("symbol \"{symbol}\" is already registered with id {existing_id}")]
    #[diagnostic(
        code(lsys::alphabet::duplicate),
        help("Each symbol may be added to an alphabet only once.")
    )]
    Duplicate { symbol: String, existing_id: i32 },

    #[error("\"{symbol}\" uses a reserved character")]
    #[diagnostic(
        code(lsys::alphabet::reserved),
        help(
            "The characters '*' (any symbol), 'λ' (empty symbol) and '_' \
             (multi-character marker) are reserved and cannot name a symbol."
        )
    )]
    Reserved { symbol: String },

    #[error("unterminated multi-character symbol starting at byte {offset} in \"{input}\"")]
    #[diagnostic(
        code(lsys::alphabet::unterminated),
        help("Multi-character symbol names must be wrapped in '_' on both sides, e.g. \"A_Fl_B\".")
    )]
    Unterminated { input: String, offset: usize },
}

// ---------------------------------------------------------------------------
// Symbol-and-context errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SacError {
    #[error("{side} context has {actual} symbols but the window radius is {radius}")]
    #[diagnostic(
        code(lsys::sac::context_too_wide),
        help("A context window can hold at most k symbols on the left and l on the right.")
    )]
    ContextTooWide {
        side: &'static str,
        actual: usize,
        radius: usize,
    },

    #[error("malformed symbol-and-context notation: \"{input}\"")]
    #[diagnostic(
        code(lsys::sac::malformed),
        help("Use \"L<S>R\" notation, e.g. \"A<B>C\", \"<B>C\", \"A<B>\" or \"B\".")
    )]
    Malformed { input: String },
}

// ---------------------------------------------------------------------------
// Evidence errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum EvidenceError {
    #[error("evidence needs at least 2 generations, got {count}")]
    #[diagnostic(
        code(lsys::evidence::too_few_generations),
        help(
            "Inference compares each generation with the next one. \
             Supply at least two successive generation strings."
        )
    )]
    TooFewGenerations { count: usize },
}

// ---------------------------------------------------------------------------
// Production rule errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RuleError {
    #[error("identity rule for symbol {expected} applied to symbol {actual}")]
    #[diagnostic(
        code(lsys::rule::identity_mismatch),
        help(
            "An identity rule only rewrites its own symbol. This indicates a bug \
             in the caller's rule selection, not bad input."
        )
    )]
    IdentityMismatch { expected: i32, actual: i32 },

    #[error("successor of rule {rule} references symbol id {id} outside the alphabet")]
    #[diagnostic(
        code(lsys::rule::invalid_successor),
        help("Successors may only contain alphabet symbols or the empty symbol.")
    )]
    InvalidSuccessor { rule: String, id: i32 },
}

// ---------------------------------------------------------------------------
// Analysis errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum AnalysisError {
    #[error("symbol-and-context {sac} is not part of this analysis")]
    #[diagnostic(
        code(lsys::analysis::unknown_sac),
        help("Only SaCs occurring before the last generation carry bounds.")
    )]
    UnknownSac { sac: String },

    #[error("no SaC can cover the {remaining} remaining word(s)")]
    #[diagnostic(
        code(lsys::analysis::no_cover),
        help(
            "The evidence is insufficient to pin down a rule set. \
             Add further generations or reduce the context radius."
        )
    )]
    NoCover { remaining: usize },

    #[error("linear algebra failure while solving the Parikh system: {message}")]
    #[diagnostic(
        code(lsys::analysis::linalg),
        help("The predecessor-occurrence matrix could not be decomposed.")
    )]
    LinearAlgebra { message: String },

    #[error("refinement did not reach a fixpoint within {passes} passes")]
    #[diagnostic(
        code(lsys::analysis::no_fixpoint),
        help(
            "Increase `max_passes` in the settings. Every pass only tightens bounds, \
             so this cap is a safety net."
        )
    )]
    NoFixpoint { passes: usize },
}

// ---------------------------------------------------------------------------
// Settings errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SettingsError {
    #[error("failed to read settings file: {path}")]
    #[diagnostic(code(lsys::settings::io), help("Ensure the file exists and is readable."))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {path}: {message}")]
    #[diagnostic(
        code(lsys::settings::parse),
        help("Settings files are TOML, or JSON when the extension is `.json`.")
    )]
    Parse { path: String, message: String },

    #[error("invalid settings: {message}")]
    #[diagnostic(code(lsys::settings::invalid), help("{message}"))]
    Invalid { message: String },
}

// ---------------------------------------------------------------------------
// Problem registry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ProblemError {
    #[error("unknown problem: \"{name}\"")]
    #[diagnostic(
        code(lsys::problem::unknown),
        help("List the registered problems with `lsys-infer problems`.")
    )]
    Unknown { name: String },
}

/// Convenience alias for functions returning engine results.
pub type LsysResult<T> = std::result::Result<T, LsysError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphabet_error_converts_to_lsys_error() {
        let err = AlphabetError::UnknownSymbol { symbol: "Q".into() };
        let top: LsysError = err.into();
        assert!(matches!(
            top,
            LsysError::Alphabet(AlphabetError::UnknownSymbol { .. })
        ));
    }

    #[test]
    fn analysis_error_converts_to_lsys_error() {
        let top: LsysError = AnalysisError::NoCover { remaining: 2 }.into();
        assert!(matches!(top, LsysError::Analysis(AnalysisError::NoCover { remaining: 2 })));
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = SacError::ContextTooWide {
            side: "left",
            actual: 3,
            radius: 1,
        };
        let msg = format!("{err}");
        assert!(msg.contains("left"));
        assert!(msg.contains('3'));
        assert!(msg.contains('1'));
    }

    #[test]
    fn diagnostic_codes_are_namespaced() {
        let err = RuleError::IdentityMismatch {
            expected: 0,
            actual: 1,
        };
        let code = err.code().map(|c| c.to_string()).unwrap_or_default();
        assert_eq!(code, "lsys::rule::identity_mismatch");
    }
}
