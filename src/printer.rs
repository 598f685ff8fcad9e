//! Inverse renderer: rule table → GBNF text
//!
//! Renders a compiled [`Grammar`] back to GBNF source on a caller-supplied
//! sink, for diagnostics and round-trip testing. The rendering is
//! approximate, not byte-exact: literals come back as single-member
//! character classes and non-printable codepoints as `<U+XXXX>`, but a
//! successfully compiled grammar re-renders to text that compiles to an
//! isomorphic table.
//!
//! Before rendering a rule the printer checks the structural invariants the
//! parser guarantees (non-empty body, trailing terminator, class
//! continuations preceded by a class element) and reports
//! [`GrammarError::MalformedRule`] when a hand-built table violates them.

use crate::error::{GrammarError, Result};
use crate::grammar::{Grammar, GrammarElement, RuleId};
use std::fmt::{self, Write};

/// Element-level rendering, for debug dumps of a rule table
impl fmt::Display for GrammarElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::End => f.write_str("END"),
            Self::Alt => f.write_str("ALT"),
            Self::RuleRef(id) => write!(f, "RULE_REF({id})"),
            Self::Char(c) => write_payload(f, "CHAR", c),
            Self::CharNot(c) => write_payload(f, "CHAR_NOT", c),
            Self::CharRngUpper(c) => write_payload(f, "CHAR_RNG_UPPER", c),
            Self::CharAlt(c) => write_payload(f, "CHAR_ALT", c),
        }
    }
}

fn write_payload(f: &mut fmt::Formatter<'_>, kind: &str, c: u32) -> fmt::Result {
    f.write_str(kind)?;
    f.write_str("(\"")?;
    write_grammar_char(f, c)?;
    f.write_str("\")")
}

/// Printable ASCII renders literally, everything else as `<U+XXXX>`
fn write_grammar_char<W: Write>(out: &mut W, c: u32) -> fmt::Result {
    if (0x20..=0x7F).contains(&c) {
        out.write_char(c as u8 as char)
    } else {
        write!(out, "<U+{c:04X}>")
    }
}

fn rule_name(grammar: &Grammar, rule_id: RuleId, current: RuleId) -> Result<&str> {
    grammar
        .symbols()
        .name_of(rule_id)
        .ok_or(GrammarError::MalformedRule {
            rule_id: current,
            reason: "reference to unnamed rule",
        })
}

fn write_rule<W: Write>(
    out: &mut W,
    grammar: &Grammar,
    rule_id: RuleId,
    body: &[GrammarElement],
) -> Result<()> {
    if body.is_empty() {
        return Err(GrammarError::MalformedRule {
            rule_id,
            reason: "empty body",
        });
    }
    if *body.last().expect("body is non-empty") != GrammarElement::End {
        return Err(GrammarError::MalformedRule {
            rule_id,
            reason: "missing terminator",
        });
    }

    write!(out, "{} ::= ", rule_name(grammar, rule_id, rule_id)?)?;
    for (i, &elem) in body[..body.len() - 1].iter().enumerate() {
        match elem {
            GrammarElement::End => {
                return Err(GrammarError::MalformedRule {
                    rule_id,
                    reason: "interior terminator",
                })
            }
            GrammarElement::Alt => out.write_str("| ")?,
            GrammarElement::RuleRef(target) => {
                write!(out, "{} ", rule_name(grammar, target, rule_id)?)?;
            }
            GrammarElement::Char(c) => {
                out.write_char('[')?;
                write_grammar_char(out, c)?;
            }
            GrammarElement::CharNot(c) => {
                out.write_str("[^")?;
                write_grammar_char(out, c)?;
            }
            GrammarElement::CharRngUpper(c) => {
                if i == 0 || !body[i - 1].is_char_element() {
                    return Err(GrammarError::MalformedRule {
                        rule_id,
                        reason: "range upper bound without preceding class element",
                    });
                }
                out.write_char('-')?;
                write_grammar_char(out, c)?;
            }
            GrammarElement::CharAlt(c) => {
                if i == 0 || !body[i - 1].is_char_element() {
                    return Err(GrammarError::MalformedRule {
                        rule_id,
                        reason: "class member without preceding class element",
                    });
                }
                write_grammar_char(out, c)?;
            }
        }
        // close the class unless the next element continues it
        if elem.is_char_element()
            && !matches!(
                body[i + 1],
                GrammarElement::CharAlt(_) | GrammarElement::CharRngUpper(_)
            )
        {
            out.write_str("] ")?;
        }
    }
    out.write_char('\n')?;
    Ok(())
}

/// Render the whole rule table as GBNF text onto `out`
///
/// Rules are emitted in id order, one statement per line.
pub fn write_grammar<W: Write>(grammar: &Grammar, out: &mut W) -> Result<()> {
    for (i, body) in grammar.rules().iter().enumerate() {
        write_rule(out, grammar, i as RuleId, body)?;
    }
    Ok(())
}

/// Render the whole rule table as a GBNF string
pub fn grammar_to_string(grammar: &Grammar) -> Result<String> {
    let mut text = String::new();
    write_grammar(grammar, &mut text)?;
    Ok(text)
}

/// Render the rule table, collapsing any failure into an empty string
///
/// Backward-compatible entry point: a malformed table produces a one-line
/// diagnostic on the log facade and aborts only the print operation.
pub fn print_grammar(grammar: &Grammar) -> String {
    grammar_to_string(grammar).unwrap_or_else(|err| {
        log::error!("error printing grammar: {err}");
        String::new()
    })
}
