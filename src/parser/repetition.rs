//! Quantifier elimination
//!
//! Turns a repeated term into synthesized rules plus one reference, so
//! every compiled rule is loop-free at the element level and the matcher
//! only ever follows alternation and rule references. The rewrite, with
//! `content ::= S` synthesized only when the span `S` is not already a
//! single rule reference:
//!
//! ```text
//! S*     -> S{0,}
//! S+     -> S{1,}
//! S?     -> S{0,1}
//! S{m,}  -> sub   ::= content content ... (m times) star
//!           star  ::= content star |
//! S{m,n} -> sub   ::= content content ... (m times) opt_k     (k = n - m)
//!           opt_k ::= content opt_(k-1) |
//!           opt_1 ::= content |
//! ```

use crate::grammar::{Grammar, GrammarElement, RuleId};

/// Rewrite the span `out[last_sym_start..]` as `min_times..=max_times`
/// repetitions; `max_times` of `None` means unbounded
///
/// The span must be non-empty (the caller reports a dangling quantifier
/// otherwise). `max_times < min_times` clamps to exactly `min_times`
/// repetitions: the optional tail has `max - min` rules and a non-positive
/// count produces none.
pub(super) fn rewrite_repetition(
    grammar: &mut Grammar,
    rule_name: &str,
    out: &mut Vec<GrammarElement>,
    last_sym_start: usize,
    min_times: u32,
    max_times: Option<u32>,
) {
    let content_rule_id = match out[last_sym_start] {
        // The repeated content is already a rule reference; reuse its target
        GrammarElement::RuleRef(id) if out.len() - last_sym_start == 1 => id,
        _ => {
            let id = grammar.symbols_mut().generate(rule_name);
            let mut content = out[last_sym_start..].to_vec();
            content.push(GrammarElement::End);
            grammar.add_rule(id, content);
            id
        }
    };

    let sub_rule_id = grammar.symbols_mut().generate(rule_name);
    let mut sub_rule = Vec::new();
    // mandatory repeats
    for _ in 0..min_times {
        sub_rule.push(GrammarElement::RuleRef(content_rule_id));
    }

    match max_times {
        None => {
            // right-recursive zero-or-more tail
            let star_rule_id = grammar.symbols_mut().generate(&format!("{rule_name}_star"));
            grammar.add_rule(
                star_rule_id,
                vec![
                    GrammarElement::RuleRef(content_rule_id),
                    GrammarElement::RuleRef(star_rule_id),
                    GrammarElement::Alt,
                    GrammarElement::End,
                ],
            );
            sub_rule.push(GrammarElement::RuleRef(star_rule_id));
        }
        Some(max_times) => {
            // right-nested optional tail, one rule per optional repeat
            let n_opt = max_times.saturating_sub(min_times);
            let mut last_rec_rule_id: Option<RuleId> = None;
            for i in 1..=n_opt {
                let rec_rule_id = grammar.symbols_mut().generate(&format!("{rule_name}_{i}"));
                let body = match last_rec_rule_id {
                    None => vec![
                        GrammarElement::RuleRef(content_rule_id),
                        GrammarElement::Alt,
                        GrammarElement::End,
                    ],
                    Some(prev) => vec![
                        GrammarElement::RuleRef(content_rule_id),
                        GrammarElement::RuleRef(prev),
                        GrammarElement::Alt,
                        GrammarElement::End,
                    ],
                };
                grammar.add_rule(rec_rule_id, body);
                last_rec_rule_id = Some(rec_rule_id);
            }
            if let Some(last) = last_rec_rule_id {
                sub_rule.push(GrammarElement::RuleRef(last));
            }
        }
    }

    sub_rule.push(GrammarElement::End);
    grammar.add_rule(sub_rule_id, sub_rule);

    // in the caller's sequence, replace the span with one reference
    out.truncate(last_sym_start);
    out.push(GrammarElement::RuleRef(sub_rule_id));
}
