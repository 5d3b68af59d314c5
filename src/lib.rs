//! # lsys-infer
//!
//! Grammatical inference of deterministic, context-sensitive L-systems from
//! a sequence of observed generation strings.
//!
//! ## Architecture
//!
//! - **Symbols** (`symbol`, `alphabet`): interned ids with reserved sentinels
//! - **Rule keys** (`sac`, `context`): symbol-and-context predecessors and radius inference
//! - **Evidence** (`word`, `evidence`): consecutive generations indexed by SaC
//! - **Analysis** (`analysis`): bound propagation, Parikh solving and cover searches
//! - **Rules** (`rules`, `problems`): derivation of known L-systems for experiments
//! - **Driver** (`settings`, `engine`): settings files in, inference reports out
//!
//! ## Library usage
//!
//! ```no_run
//! use lsys_infer::engine::Engine;
//! use lsys_infer::settings::Settings;
//!
//! let strings = ["ABA", "ABABBBABA", "ABABBBABABBBBBBBBBABABBBABA"];
//! let settings = Settings::inference("cantor", strings);
//! let report = Engine::default().run(&settings).unwrap();
//! println!("{report}");
//! ```

pub mod alphabet;
pub mod analysis;
pub mod context;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod problems;
pub mod rules;
pub mod sac;
pub mod settings;
pub mod symbol;
pub mod word;
