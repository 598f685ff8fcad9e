//! End-to-end compilation tests
//!
//! Compiles realistic grammars through the public API and checks the
//! produced rule tables: entry-point convention, round-trip rendering, and
//! the language accepted by quantifier rewrites (via a small backtracking
//! acceptance checker over the compiled table).

use std::collections::HashMap;

use gramatica::{compile, grammar_to_string, parse, Grammar, GrammarElement, RuleId};

/// A JSON grammar exercising literals, classes, groups, and quantifiers
const JSON_GRAMMAR: &str = r#"root ::= ws value
value ::= object | array | string | number | boolean | null
object ::= "{" ws (member ("," ws member)*)? "}" ws
member ::= string ":" ws value
array ::= "[" ws (value ("," ws value)*)? "]" ws
string ::= "\"" char* "\"" ws
char ::= [^"\\] | "\\" (["\\/bfnrt] | "u" hex hex hex hex)
hex ::= [0-9a-fA-F]
number ::= "-"? int frac? exp? ws
int ::= "0" | [1-9] [0-9]*
frac ::= "." [0-9]+
exp ::= [eE] [-+]? [0-9]+
boolean ::= "true" | "false"
null ::= "null"
ws ::= [ \t\n]*
"#;

// ============================================================================
// Helper: backtracking acceptance checker over a compiled table
// ============================================================================

/// All input positions reachable by matching `rule_id` starting at `start`
fn match_rule(grammar: &Grammar, rule_id: RuleId, input: &[u32], start: usize) -> Vec<usize> {
    let body = grammar.rule(rule_id).expect("rule id in range");
    let mut ends = Vec::new();
    for alt in body[..body.len() - 1].split(|e| *e == GrammarElement::Alt) {
        ends.extend(match_seq(grammar, alt, input, start));
    }
    ends.sort_unstable();
    ends.dedup();
    ends
}

fn match_seq(grammar: &Grammar, elems: &[GrammarElement], input: &[u32], start: usize) -> Vec<usize> {
    let mut positions = vec![start];
    let mut i = 0;
    while i < elems.len() {
        match elems[i] {
            GrammarElement::RuleRef(target) => {
                let mut next = Vec::new();
                for p in positions {
                    next.extend(match_rule(grammar, target, input, p));
                }
                next.sort_unstable();
                next.dedup();
                positions = next;
                i += 1;
            }
            GrammarElement::Char(_) | GrammarElement::CharNot(_) => {
                let class_start = i;
                i += 1;
                while i < elems.len()
                    && matches!(
                        elems[i],
                        GrammarElement::CharAlt(_) | GrammarElement::CharRngUpper(_)
                    )
                {
                    i += 1;
                }
                let class = &elems[class_start..i];
                positions = positions
                    .into_iter()
                    .filter(|&p| input.get(p).is_some_and(|&c| class_matches(class, c)))
                    .map(|p| p + 1)
                    .collect();
            }
            GrammarElement::End | GrammarElement::Alt => unreachable!("handled by caller"),
            GrammarElement::CharAlt(_) | GrammarElement::CharRngUpper(_) => {
                unreachable!("consumed with the class opener")
            }
        }
        if positions.is_empty() {
            break;
        }
    }
    positions
}

fn class_matches(class: &[GrammarElement], c: u32) -> bool {
    let negated = matches!(class[0], GrammarElement::CharNot(_));
    let mut found = false;
    let mut k = 0;
    while k < class.len() {
        let lo = match class[k] {
            GrammarElement::Char(v) | GrammarElement::CharNot(v) | GrammarElement::CharAlt(v) => v,
            _ => unreachable!("class starts with a member"),
        };
        if let Some(&GrammarElement::CharRngUpper(hi)) = class.get(k + 1) {
            found |= (lo..=hi).contains(&c);
            k += 2;
        } else {
            found |= c == lo;
            k += 1;
        }
    }
    negated != found
}

fn accepts(grammar: &Grammar, text: &str) -> bool {
    let input: Vec<u32> = text.chars().map(|c| c as u32).collect();
    let root = grammar.root_id().expect("grammar defines root");
    match_rule(grammar, root, &input, 0).contains(&input.len())
}

/// Rule bodies keyed by rule name, with references replaced by names, so
/// two tables can be compared up to id renumbering
fn canonical(grammar: &Grammar) -> HashMap<String, Vec<String>> {
    grammar
        .rules()
        .iter()
        .enumerate()
        .map(|(id, body)| {
            let name = grammar
                .symbols()
                .name_of(id as RuleId)
                .expect("every rule id is named")
                .to_string();
            let elems = body
                .iter()
                .map(|e| match e {
                    GrammarElement::RuleRef(t) => {
                        format!("ref:{}", grammar.symbols().name_of(*t).expect("named"))
                    }
                    other => other.to_string(),
                })
                .collect();
            (name, elems)
        })
        .collect()
}

// ============================================================================
// End-to-end compilation
// ============================================================================

#[test]
fn test_json_grammar_compiles() {
    let grammar = compile(JSON_GRAMMAR).expect("JSON grammar compiles");
    // root is the first statement, so it gets id 0: the matcher convention
    assert_eq!(grammar.root_id(), Some(0));
    // quantifier rewrites synthesized rules beyond the 15 written ones
    assert!(grammar.n_rules() > 15);
    // every slot is defined after successful validation
    for id in 0..grammar.n_rules() {
        assert!(grammar.is_defined(id as RuleId));
    }
}

#[test]
fn test_json_grammar_accepts_json() {
    let grammar = compile(JSON_GRAMMAR).expect("compiles");
    assert!(accepts(&grammar, "{}"));
    assert!(accepts(&grammar, "null"));
    assert!(accepts(&grammar, "[1, 2.5, -3]"));
    assert!(accepts(&grammar, "{\"a\": [true, false], \"b\": \"c\"}"));
    assert!(accepts(&grammar, "  {\"n\": 1e-9}"));

    assert!(!accepts(&grammar, "{"));
    assert!(!accepts(&grammar, "{\"a\": }"));
    assert!(!accepts(&grammar, "01"));
    assert!(!accepts(&grammar, "tru"));
}

#[test]
fn test_grammar_without_root_compiles_but_has_no_entry_point() {
    let grammar = compile("start ::= \"a\"\n").expect("compiles");
    assert_eq!(grammar.root_id(), None);
}

// ============================================================================
// Quantifier semantics
// ============================================================================

#[test]
fn test_star_language() {
    let grammar = compile("root ::= \"a\"*\n").expect("compiles");
    for text in ["", "a", "aa", "aaaaaaaa"] {
        assert!(accepts(&grammar, text), "should accept {text:?}");
    }
    assert!(!accepts(&grammar, "b"));
    assert!(!accepts(&grammar, "ab"));
}

#[test]
fn test_star_equals_manual_recursion() {
    // X* accepts exactly the language of the pair X_1 ::= X X_1 | ε
    let star = compile("root ::= \"x\"*\n").expect("compiles");
    let manual = compile("root ::= x-rec\nx-rec ::= \"x\" x-rec | \n").expect("compiles");
    for text in ["", "x", "xx", "xxxx", "y", "xy"] {
        assert_eq!(
            accepts(&star, text),
            accepts(&manual, text),
            "disagree on {text:?}"
        );
    }
}

#[test]
fn test_plus_requires_one() {
    let grammar = compile("root ::= \"a\"+\n").expect("compiles");
    assert!(!accepts(&grammar, ""));
    assert!(accepts(&grammar, "a"));
    assert!(accepts(&grammar, "aaa"));
}

#[test]
fn test_question_at_most_one() {
    let grammar = compile("root ::= \"a\"?\n").expect("compiles");
    assert!(accepts(&grammar, ""));
    assert!(accepts(&grammar, "a"));
    assert!(!accepts(&grammar, "aa"));
}

#[test]
fn test_bounded_repetition_language() {
    // {2,3} accepts exactly 2 or 3 repetitions, never 1 or 4
    let grammar = compile("root ::= \"a\"{2,3}\n").expect("compiles");
    assert!(!accepts(&grammar, "a"));
    assert!(accepts(&grammar, "aa"));
    assert!(accepts(&grammar, "aaa"));
    assert!(!accepts(&grammar, "aaaa"));
}

#[test]
fn test_min_unbounded_language() {
    let grammar = compile("root ::= \"a\"{2,}\n").expect("compiles");
    assert!(!accepts(&grammar, "a"));
    assert!(accepts(&grammar, "aa"));
    assert!(accepts(&grammar, "aaaaaa"));
}

#[test]
fn test_quantified_group_language() {
    let grammar = compile("root ::= (\"ab\" | \"c\"){1,2}\n").expect("compiles");
    assert!(accepts(&grammar, "ab"));
    assert!(accepts(&grammar, "cab"));
    assert!(accepts(&grammar, "abab"));
    assert!(!accepts(&grammar, ""));
    assert!(!accepts(&grammar, "ababab"));
}

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_round_trip_preserves_structure() {
    // printable-only grammar: non-printable payloads render as <U+XXXX>,
    // which is a diagnostic form, not re-parseable input
    let src = "root ::= expr\n\
               expr ::= term ((\"+\" | \"-\") term)*\n\
               term ::= factor ((\"*\" | \"/\") factor)*\n\
               factor ::= num | \"(\" expr \")\"\n\
               num ::= [0-9]+\n";
    let grammar = compile(src).expect("compiles");
    let rendered = grammar_to_string(&grammar).expect("renders");
    let back = compile(&rendered).expect("rendered text compiles");

    assert_eq!(back.n_rules(), grammar.n_rules());
    assert_eq!(canonical(&back), canonical(&grammar));
}

#[test]
fn test_round_trip_with_synthetic_rules_between_statements() {
    // star rules render with a trailing empty alternative; the statement
    // must still end at the line break so the following rule parses on
    // its own, and the synthesized `_` names must re-parse
    let grammar = compile("root ::= \"a\"* \"b\"*\n").expect("compiles");
    let rendered = grammar_to_string(&grammar).expect("renders");
    let back = compile(&rendered).expect("rendered text compiles");
    assert_eq!(back.n_rules(), grammar.n_rules());
    assert_eq!(canonical(&back), canonical(&grammar));
}

#[test]
fn test_user_rule_occupying_synthetic_name() {
    // the group would synthesize "root_2", which the user already defined;
    // the table must stay a bijection and survive a round trip
    let grammar = compile("root_2 ::= \"a\"\nroot ::= (\"x\")\n").expect("compiles");

    let names: Vec<&str> = grammar.symbols().names().collect();
    assert_eq!(names, ["root_2", "root", "root_2x"]);
    assert_eq!(grammar.symbols().id_of("root_2"), Some(0));
    assert_eq!(
        grammar.rule(0),
        Some(&[GrammarElement::Char(97), GrammarElement::End][..])
    );

    let rendered = grammar_to_string(&grammar).expect("renders");
    let back = compile(&rendered).expect("rendered text compiles");
    assert_eq!(back.n_rules(), grammar.n_rules());
    assert_eq!(canonical(&back), canonical(&grammar));
}

#[test]
fn test_round_trip_preserves_language() {
    let src = "root ::= \"a\"{2,3} [x-z]?\n";
    let grammar = compile(src).expect("compiles");
    let rendered = grammar_to_string(&grammar).expect("renders");
    let back = compile(&rendered).expect("rendered text compiles");
    for text in ["aa", "aaz", "aaay", "a", "aaaa", "aazz"] {
        assert_eq!(accepts(&grammar, text), accepts(&back, text));
    }
}

// ============================================================================
// Failure contract
// ============================================================================

#[test]
fn test_parse_failure_yields_empty_table() {
    let grammar = parse("root ::= \"a\" | \"b");
    // observable contract: empty table means the compilation failed
    assert!(grammar.is_empty());
}

#[test]
fn test_compile_failure_reports_missing_name() {
    let err = compile("root ::= missing-rule\n").expect_err("must fail");
    assert_eq!(err.to_string(), "undefined rule identifier 'missing-rule'");
}
