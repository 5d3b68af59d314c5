//! lsys-infer CLI: infer L-system rules from generation strings.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use lsys_infer::engine::{Engine, EngineConfig, InferenceReport};
use lsys_infer::settings::Settings;

#[derive(Parser)]
#[command(
    name = "lsys-infer",
    version,
    about = "Grammatical inference of context-sensitive L-systems"
)]
struct Cli {
    /// Print the report as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the analysis a settings file describes (TOML, or JSON by extension).
    Run {
        #[arg(long)]
        settings: PathBuf,
    },

    /// Infer from raw generation strings, oldest first.
    Infer {
        /// Generation strings (at least two).
        #[arg(required = true, num_args = 2..)]
        strings: Vec<String>,

        /// Left context radius; -1 infers it.
        #[arg(short, long, default_value = "-1", allow_negative_numbers = true)]
        k: i32,

        /// Right context radius; -1 infers it.
        #[arg(short, long, default_value = "-1", allow_negative_numbers = true)]
        l: i32,

        /// Identity symbols (comma-separated, e.g. "F,+,-").
        #[arg(long, value_delimiter = ',')]
        identities: Vec<String>,

        /// Symbols skipped by context windows (comma-separated).
        #[arg(long, value_delimiter = ',')]
        ignore: Vec<String>,

        /// Lower bound on every successor's length.
        #[arg(long, default_value = "0")]
        absolute_min_length: u64,
    },

    /// List the built-in problems usable in Experiment mode.
    Problems,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { settings } => {
            let settings = Settings::load(&settings)?;
            let engine = Engine::new(EngineConfig::from_settings(&settings));
            let report = engine.run(&settings)?;
            print_report(&report, cli.json)?;
        }

        Commands::Infer {
            strings,
            k,
            l,
            identities,
            ignore,
            absolute_min_length,
        } => {
            let settings = Settings {
                k,
                l,
                identities,
                ignore,
                absolute_min_length,
                ..Settings::inference("cli", strings)
            };
            let engine = Engine::new(EngineConfig::from_settings(&settings));
            let report = engine.run(&settings)?;
            print_report(&report, cli.json)?;
        }

        Commands::Problems => {
            let engine = Engine::default();
            for name in engine.registry().names() {
                let problem = engine.registry().build(name)?;
                println!("{name}");
                for rule in problem.rules.rules() {
                    println!("  {}", rule.display(&problem.alphabet));
                }
            }
        }
    }

    Ok(())
}

fn print_report(report: &InferenceReport, json: bool) -> Result<()> {
    if json {
        println!("{}", report.to_json().into_diagnostic()?);
    } else {
        print!("{report}");
    }
    Ok(())
}
