//! # Gramatica
//!
//! GBNF grammar compiler for grammar-constrained text generation.
//!
//! Gramatica (Spanish: "grammar") compiles a textual, BNF-like grammar
//! ("GBNF", the dialect popularized by llama.cpp) into a compact rule table
//! consumed by a token-level matcher that constrains language-model output
//! to strings matching the grammar.
//!
//! ## Pipeline
//!
//! Text flows one way: scanner → recursive-descent parser (which invokes the
//! quantifier rewriter and group synthesis) → symbol table + rule store →
//! validator. The printer is an independent inverse path over the same rule
//! store, used for diagnostics and round-trip testing.
//!
//! - **No repetition at the element level**: every `*`, `+`, `?`, `{m,n}`
//!   quantifier is rewritten into synthesized recursive rules, so the
//!   matcher only ever needs alternation and reference-following.
//! - **Forward references**: a rule name may be used before its definition;
//!   only names never defined anywhere fail validation.
//! - **All-or-nothing**: compilation either yields a complete, validated
//!   table or an error, never a partial table.
//!
//! ## Example
//!
//! ```rust
//! use gramatica::{compile, GrammarElement};
//!
//! let grammar = compile("root ::= \"yes\" | \"no\"\n").unwrap();
//! assert_eq!(grammar.root_id(), Some(0));
//! assert_eq!(grammar.rule(0).unwrap().last(), Some(&GrammarElement::End));
//! ```
//!
//! ## Concurrency
//!
//! The compiler is a pure function from grammar text to a rule table. Each
//! call owns a freshly constructed state; there is no shared or global
//! mutable state, so concurrent callers need no synchronization as long as
//! each uses its own [`Grammar`].

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_possible_truncation)] // codepoint/id arithmetic stays in u32 range
#![allow(clippy::uninlined_format_args)]

pub mod error;
pub mod grammar;
pub mod parser;
pub mod printer;
mod scanner;

// Re-exports for convenience
pub use error::{GrammarError, Result};
pub use grammar::{Grammar, GrammarElement, RuleId, SymbolTable};
pub use parser::{compile, parse};
pub use printer::{grammar_to_string, print_grammar, write_grammar};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
