//! Recursive-descent GBNF parser
//!
//! Parses statements of the form `name ::= alt1 | alt2 | …` into the rule
//! table. Terms are quoted literals, `[...]`/`[^...]` character classes,
//! bare rule-name references, `(...)` groups, and trailing quantifiers
//! `? * + {m} {m,} {m,n}`. Groups and quantifiers synthesize auxiliary
//! rules; quantifier elimination itself lives in [`repetition`].
//!
//! Every parsing function threads `Result`; a failure unwinds to the entry
//! point with the byte offset of the offending input, and no partially
//! built table ever escapes.

use crate::error::{GrammarError, Result};
use crate::grammar::{Grammar, GrammarElement, RuleId};
use crate::scanner::{is_digit_char, is_word_char, Scanner};

mod repetition;

/// Compile GBNF text into a validated grammar
///
/// Parses statements until the input is exhausted, then proves closure of
/// the rule graph. On success the returned table is complete: every
/// referenced rule id has a non-empty body.
pub fn compile(src: &str) -> Result<Grammar> {
    let mut parser = Parser::new(src);
    parser.scan.skip_space(true);
    while !parser.scan.at_end() {
        parser.parse_rule()?;
    }
    parser.grammar.validate()?;
    Ok(parser.grammar)
}

/// Compile GBNF text, collapsing any failure into an empty grammar
///
/// Backward-compatible entry point: on failure a one-line diagnostic goes
/// to the log facade and the returned grammar is empty (zero rules, zero
/// symbols). Use [`compile`] to observe the structured error instead.
pub fn parse(src: &str) -> Grammar {
    match compile(src) {
        Ok(grammar) => grammar,
        Err(err) => {
            log::error!("error parsing grammar: {err}");
            Grammar::new()
        }
    }
}

/// Parser state: a scanner over the source and the grammar being built
struct Parser<'a> {
    scan: Scanner<'a>,
    grammar: Grammar,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            scan: Scanner::new(src),
            grammar: Grammar::new(),
        }
    }

    /// One `name ::= alternates` statement, ended by CR, CRLF, LF, or end
    /// of input
    fn parse_rule(&mut self) -> Result<()> {
        let name = self.scan.parse_name()?;
        self.scan.skip_space(false);
        let rule_id = self.grammar.symbols_mut().intern(name);

        if !(self.scan.peek() == b':'
            && self.scan.peek_at(1) == b':'
            && self.scan.peek_at(2) == b'=')
        {
            return Err(GrammarError::ExpectedToken {
                expected: "::=",
                pos: self.scan.pos(),
            });
        }
        for _ in 0..3 {
            self.scan.bump();
        }
        self.scan.skip_space(true);

        self.parse_alternates(name, rule_id, false)?;

        match self.scan.peek() {
            b'\r' => {
                self.scan.bump();
                if self.scan.peek() == b'\n' {
                    self.scan.bump();
                }
            }
            b'\n' => self.scan.bump(),
            0 => {}
            _ => {
                return Err(GrammarError::ExpectedNewline {
                    pos: self.scan.pos(),
                })
            }
        }
        self.scan.skip_space(true);
        Ok(())
    }

    /// `|`-separated sequences stored as one body under `rule_id`
    fn parse_alternates(&mut self, rule_name: &str, rule_id: RuleId, is_nested: bool) -> Result<()> {
        let mut body = Vec::new();
        self.parse_sequence(rule_name, &mut body, is_nested)?;
        while self.scan.peek() == b'|' {
            body.push(GrammarElement::Alt);
            self.scan.bump();
            // an un-parenthesized alternative ends at a physical line
            // break; only inside a group may it wrap
            self.scan.skip_space(is_nested);
            self.parse_sequence(rule_name, &mut body, is_nested)?;
        }
        body.push(GrammarElement::End);
        self.grammar.add_rule(rule_id, body);
        Ok(())
    }

    /// One concatenation of terms, appended to `out`
    ///
    /// Stops at `|`, `)`, or (outside a group) a physical line break.
    /// `last_sym_start` tracks the span of the most recent term so a
    /// trailing quantifier knows what to rewrite.
    fn parse_sequence(
        &mut self,
        rule_name: &str,
        out: &mut Vec<GrammarElement>,
        is_nested: bool,
    ) -> Result<()> {
        let mut last_sym_start = out.len();
        loop {
            match self.scan.peek() {
                b'"' => {
                    // literal: one Char element per decoded codepoint
                    self.scan.bump();
                    last_sym_start = out.len();
                    while self.scan.peek() != b'"' {
                        let value = self.scan.parse_char()?;
                        out.push(GrammarElement::Char(value));
                    }
                    self.scan.bump();
                    self.scan.skip_space(is_nested);
                }
                b'[' => {
                    // character class, possibly negated
                    self.scan.bump();
                    let negated = self.scan.peek() == b'^';
                    if negated {
                        self.scan.bump();
                    }
                    last_sym_start = out.len();
                    while self.scan.peek() != b']' {
                        let value = self.scan.parse_char()?;
                        let elem = if out.len() > last_sym_start {
                            GrammarElement::CharAlt(value)
                        } else if negated {
                            GrammarElement::CharNot(value)
                        } else {
                            GrammarElement::Char(value)
                        };
                        out.push(elem);
                        // `a-b` range; a `-` right before `]` is a member
                        if self.scan.peek() == b'-' && self.scan.peek_at(1) != b']' {
                            self.scan.bump();
                            let upper = self.scan.parse_char()?;
                            out.push(GrammarElement::CharRngUpper(upper));
                        }
                    }
                    self.scan.bump();
                    self.scan.skip_space(is_nested);
                }
                c if is_word_char(c) => {
                    // rule reference; forward references resolve later
                    let name = self.scan.parse_name()?;
                    let ref_id = self.grammar.symbols_mut().intern(name);
                    self.scan.skip_space(is_nested);
                    last_sym_start = out.len();
                    out.push(GrammarElement::RuleRef(ref_id));
                }
                b'(' => {
                    // group: nested alternates under a synthesized rule
                    self.scan.bump();
                    self.scan.skip_space(true);
                    let sub_rule_id = self.grammar.symbols_mut().generate(rule_name);
                    self.parse_alternates(rule_name, sub_rule_id, true)?;
                    last_sym_start = out.len();
                    out.push(GrammarElement::RuleRef(sub_rule_id));
                    if self.scan.peek() != b')' {
                        return Err(GrammarError::UnbalancedGroup {
                            pos: self.scan.pos(),
                        });
                    }
                    self.scan.bump();
                    self.scan.skip_space(is_nested);
                }
                b'*' => {
                    let quant_pos = self.scan.pos();
                    self.scan.bump();
                    self.scan.skip_space(is_nested);
                    self.rewrite(rule_name, out, last_sym_start, 0, None, quant_pos)?;
                }
                b'+' => {
                    let quant_pos = self.scan.pos();
                    self.scan.bump();
                    self.scan.skip_space(is_nested);
                    self.rewrite(rule_name, out, last_sym_start, 1, None, quant_pos)?;
                }
                b'?' => {
                    let quant_pos = self.scan.pos();
                    self.scan.bump();
                    self.scan.skip_space(is_nested);
                    self.rewrite(rule_name, out, last_sym_start, 0, Some(1), quant_pos)?;
                }
                b'{' => {
                    let quant_pos = self.scan.pos();
                    self.scan.bump();
                    self.scan.skip_space(is_nested);

                    let mut min_times = 0;
                    if is_digit_char(self.scan.peek()) {
                        min_times = self.scan.parse_int()?;
                        self.scan.skip_space(is_nested);
                    } else if self.scan.peek() != b',' {
                        return Err(GrammarError::ExpectedToken {
                            expected: "an int or ','",
                            pos: self.scan.pos(),
                        });
                    }

                    let max_times = match self.scan.peek() {
                        b'}' => {
                            self.scan.bump();
                            self.scan.skip_space(is_nested);
                            Some(min_times)
                        }
                        b',' => {
                            self.scan.bump();
                            self.scan.skip_space(is_nested);
                            let max_times = if is_digit_char(self.scan.peek()) {
                                let value = self.scan.parse_int()?;
                                self.scan.skip_space(is_nested);
                                Some(value)
                            } else {
                                None
                            };
                            if self.scan.peek() != b'}' {
                                return Err(GrammarError::ExpectedToken {
                                    expected: "'}'",
                                    pos: self.scan.pos(),
                                });
                            }
                            self.scan.bump();
                            self.scan.skip_space(is_nested);
                            max_times
                        }
                        _ => {
                            return Err(GrammarError::ExpectedToken {
                                expected: "','",
                                pos: self.scan.pos(),
                            })
                        }
                    };
                    self.rewrite(rule_name, out, last_sym_start, min_times, max_times, quant_pos)?;
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Apply the quantifier rewrite to the most recent term span
    fn rewrite(
        &mut self,
        rule_name: &str,
        out: &mut Vec<GrammarElement>,
        last_sym_start: usize,
        min_times: u32,
        max_times: Option<u32>,
        quant_pos: usize,
    ) -> Result<()> {
        if last_sym_start == out.len() {
            return Err(GrammarError::DanglingQuantifier { pos: quant_pos });
        }
        repetition::rewrite_repetition(
            &mut self.grammar,
            rule_name,
            out,
            last_sym_start,
            min_times,
            max_times,
        );
        Ok(())
    }
}
