//! Grammar rule table and symbol interning
//!
//! The compiled form of a grammar: a symbol table mapping rule names to
//! dense 32-bit ids, and an id-indexed store of rule bodies. Each body is a
//! flat element sequence (character matches, class continuations, rule
//! references, alternation separators) terminated by
//! [`GrammarElement::End`]. This is the table handed to the downstream
//! token-level matcher.

use crate::error::{GrammarError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;


// =============================================================================
// ELEMENT TYPES
// =============================================================================

/// Dense rule identifier; ids are assigned `0..N-1` in first-seen order
pub type RuleId = u32;

/// One compiled instruction within a rule body
///
/// Character payloads are raw `u32` codepoints rather than `char`: the
/// scanner's permissive UTF-8 decoding can yield values outside the scalar
/// range, and escape forms like `\UHHHHHHHH` accept any 32-bit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrammarElement {
    /// Terminator; last element of every non-empty rule body
    End,
    /// Separator between alternative sequences within one body
    Alt,
    /// Reference to another rule by id
    RuleRef(RuleId),
    /// Codepoint match; opens a positive character class
    Char(u32),
    /// Codepoint non-match; opens a negated character class
    CharNot(u32),
    /// Inclusive upper bound of a range begun by the preceding class element
    CharRngUpper(u32),
    /// Additional member of the enclosing character class
    CharAlt(u32),
}

impl GrammarElement {
    /// True for the four character-class element kinds
    pub fn is_char_element(self) -> bool {
        matches!(
            self,
            Self::Char(_) | Self::CharNot(_) | Self::CharRngUpper(_) | Self::CharAlt(_)
        )
    }

    /// Referenced rule id, if this is a rule reference
    pub fn rule_ref(self) -> Option<RuleId> {
        match self {
            Self::RuleRef(id) => Some(id),
            _ => None,
        }
    }
}

// =============================================================================
// SYMBOL TABLE
// =============================================================================

/// Bijection between rule names and dense rule ids
///
/// A name→id map and an id-indexed name vector populated together, so both
/// directions are O(1). Ids are exactly `0..N-1` in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolTable {
    ids: HashMap<String, RuleId>,
    names: Vec<String>,
}

impl SymbolTable {
    /// Create an empty symbol table
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `name`, returning its id
    ///
    /// Idempotent: re-interning an existing name returns the existing id.
    pub fn intern(&mut self, name: &str) -> RuleId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.names.len() as RuleId;
        self.ids.insert(name.to_string(), id);
        self.names.push(name.to_string());
        id
    }

    /// Mint a fresh synthetic symbol named `<base>_<id>`
    ///
    /// Underscore is a legal name character, so a user rule may already
    /// occupy `<base>_<id>`; the suffix is extended until the name is
    /// unbound, keeping the name/id bijection intact.
    pub fn generate(&mut self, base: &str) -> RuleId {
        let id = self.names.len() as RuleId;
        let mut name = format!("{base}_{id}");
        while self.ids.contains_key(&name) {
            name.push('x');
        }
        self.ids.insert(name.clone(), id);
        self.names.push(name);
        id
    }

    /// Id registered for `name`, if any
    pub fn id_of(&self, name: &str) -> Option<RuleId> {
        self.ids.get(name).copied()
    }

    /// Name registered for `id`, if any
    pub fn name_of(&self, id: RuleId) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }

    /// Number of interned symbols
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if no symbols are interned
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All names in id order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

// =============================================================================
// RULE TABLE
// =============================================================================

/// Compiled grammar: symbol table plus id-indexed rule table
///
/// Index `i` holds the body for rule `i`. A rule id is *defined* iff its
/// body is non-empty; a non-empty body always ends in
/// [`GrammarElement::End`]. The whole value is created empty at the start of
/// one compilation and either returned complete or discarded, never
/// partially built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grammar {
    symbols: SymbolTable,
    rules: Vec<Vec<GrammarElement>>,
}

impl Grammar {
    /// Create an empty grammar
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `body` under `rule_id`, growing the table as needed
    ///
    /// Intervening ids are filled with empty placeholder bodies; an
    /// existing body at `rule_id` is overwritten.
    pub fn add_rule(&mut self, rule_id: RuleId, body: Vec<GrammarElement>) {
        let index = rule_id as usize;
        if self.rules.len() <= index {
            self.rules.resize_with(index + 1, Vec::new);
        }
        self.rules[index] = body;
    }

    /// Body of `rule_id`, if the id is in range
    pub fn rule(&self, rule_id: RuleId) -> Option<&[GrammarElement]> {
        self.rules.get(rule_id as usize).map(Vec::as_slice)
    }

    /// All rule bodies, indexed by id
    pub fn rules(&self) -> &[Vec<GrammarElement>] {
        &self.rules
    }

    /// Number of slots in the rule table (including placeholders)
    pub fn n_rules(&self) -> usize {
        self.rules.len()
    }

    /// True if the grammar holds no rules and no symbols
    ///
    /// The compatibility entry point [`crate::parse`] signals failure by
    /// returning an empty grammar.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.symbols.is_empty()
    }

    /// True if `rule_id` is in range and its body is non-empty
    pub fn is_defined(&self, rule_id: RuleId) -> bool {
        self.rules
            .get(rule_id as usize)
            .is_some_and(|body| !body.is_empty())
    }

    /// The symbol table
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Mutable access to the symbol table, for the parser
    pub(crate) fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    /// Id of the matcher's entry-point rule
    ///
    /// By convention the matcher starts at the rule literally named
    /// `root`; grammars intended for matching must define one.
    pub fn root_id(&self) -> Option<RuleId> {
        self.symbols.id_of("root")
    }

    /// Prove closure of the rule graph
    ///
    /// Every [`GrammarElement::RuleRef`] in every body must target an
    /// in-range rule with a non-empty body. Reports the first offender by
    /// its registered name as [`GrammarError::UndefinedRule`].
    pub fn validate(&self) -> Result<()> {
        for body in &self.rules {
            for elem in body {
                if let GrammarElement::RuleRef(target) = *elem {
                    if !self.is_defined(target) {
                        let name = self
                            .symbols
                            .name_of(target)
                            .map_or_else(|| target.to_string(), str::to_string);
                        return Err(GrammarError::UndefinedRule(name));
                    }
                }
            }
        }
        Ok(())
    }
}
