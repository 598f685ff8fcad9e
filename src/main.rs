//! Gramatica CLI - compile and inspect GBNF grammars
//!
//! # Commands
//!
//! - `check` - Compile a grammar and report its size
//! - `print` - Compile a grammar and render it back to GBNF
//! - `dump` - Compile a grammar and list the rule table element by element

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use gramatica::{compile, grammar_to_string, Grammar, RuleId};

/// Gramatica - GBNF grammar compiler
///
/// Compiles a BNF-like grammar into the rule table consumed by a
/// grammar-constrained sampler.
#[derive(Parser)]
#[command(name = "gramatica")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a grammar and report the result
    Check {
        /// Grammar file in GBNF syntax
        file: PathBuf,
    },
    /// Compile a grammar and render it back to GBNF
    Print {
        /// Grammar file in GBNF syntax
        file: PathBuf,
    },
    /// Compile a grammar and dump its rule table
    Dump {
        /// Grammar file in GBNF syntax
        file: PathBuf,
        /// Emit the table as JSON instead of an element listing
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Check { file } => {
            let grammar = load(&file)?;
            println!(
                "{}: {} rules, {} symbols",
                file.display(),
                grammar.n_rules(),
                grammar.symbols().len()
            );
        }
        Commands::Print { file } => {
            let grammar = load(&file)?;
            print!("{}", grammar_to_string(&grammar)?);
        }
        Commands::Dump { file, json } => {
            let grammar = load(&file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&grammar)?);
            } else {
                for (id, body) in grammar.rules().iter().enumerate() {
                    let name = grammar
                        .symbols()
                        .name_of(id as RuleId)
                        .unwrap_or("<unnamed>");
                    let rendered: Vec<String> = body.iter().map(ToString::to_string).collect();
                    println!("{id:4} {name}: {}", rendered.join(" "));
                }
            }
        }
    }
    Ok(())
}

fn load(file: &Path) -> Result<Grammar, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(file)?;
    Ok(compile(&text)?)
}
