//! Error types for grammar compilation and printing
//!
//! Every parsing function threads [`GrammarError`] through [`Result`]; the
//! compatibility entry points ([`crate::parse`], [`crate::print_grammar`])
//! collapse failures into a one-line diagnostic on the log facade.

use crate::grammar::RuleId;
use thiserror::Error;

/// Error type for grammar operations
///
/// Parser variants carry the byte offset of the failure within the source
/// text. [`GrammarError::MalformedRule`] is produced only by the printer,
/// which checks the structural invariants of a rule body before rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// A required token (name, integer, `::=`, `,`, `}`) was not found
    #[error("expecting {expected} at offset {pos}")]
    ExpectedToken {
        /// Human-readable description of the expected token
        expected: &'static str,
        /// Byte offset in the source text
        pos: usize,
    },

    /// Backslash followed by an unrecognized escape character
    #[error("unknown escape at offset {pos}")]
    UnknownEscape {
        /// Byte offset of the backslash
        pos: usize,
    },

    /// Input ended where a character was required
    #[error("unexpected end of input")]
    UnexpectedEnd,

    /// Fewer hex digits than the escape form requires
    #[error("expecting {want} hex chars at offset {pos}")]
    MalformedEscape {
        /// Number of hex digits the escape form requires
        want: usize,
        /// Byte offset of the first hex digit
        pos: usize,
    },

    /// A parenthesized group was not closed
    #[error("expecting ')' at offset {pos}")]
    UnbalancedGroup {
        /// Byte offset where `)` was expected
        pos: usize,
    },

    /// Quantifier with no preceding term in the current sequence
    #[error("expecting preceding item to */+/?/{{ at offset {pos}")]
    DanglingQuantifier {
        /// Byte offset of the quantifier
        pos: usize,
    },

    /// Statement not terminated by a newline or end of input
    #[error("expecting newline or end at offset {pos}")]
    ExpectedNewline {
        /// Byte offset of the offending character
        pos: usize,
    },

    /// A rule reference whose target is never defined
    #[error("undefined rule identifier '{0}'")]
    UndefinedRule(String),

    /// Rule body violates a structural invariant (printer only)
    #[error("malformed rule {rule_id}: {reason}")]
    MalformedRule {
        /// Id of the offending rule
        rule_id: RuleId,
        /// Which invariant the body violates
        reason: &'static str,
    },

    /// The caller-supplied output sink failed
    #[error("failed to write to output sink")]
    Sink(#[from] std::fmt::Error),
}

/// Result type alias for grammar operations
pub type Result<T> = std::result::Result<T, GrammarError>;
