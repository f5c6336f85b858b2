/*
    This module is for storing and manipulating grammars
*/

mod binarize;
mod normal_form;
mod unit;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use itertools::Itertools;

pub use normal_form::{normalize, CnfGrammar, ConfigurationError};
pub use unit::eliminate_unit_productions;

// The base unit in a grammar rule
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub enum Symbol {
    Terminal(String),
    Nonterminal(String),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Terminal(s) | Symbol::Nonterminal(s) => s,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Terminal(t) => write!(f, "'{}'", t),
            Symbol::Nonterminal(n) => write!(f, "{}", n),
        }
    }
}

/// A single rewrite `lhs -> rhs`.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct Production {
    pub lhs: String,
    pub rhs: Vec<Symbol>,
}

impl Production {
    pub fn new(lhs: impl Into<String>, rhs: Vec<Symbol>) -> Self {
        Production { lhs: lhs.into(), rhs }
    }

    pub fn arity(&self) -> usize {
        self.rhs.len()
    }

    /// `A -> B` where `B` is a nonterminal
    pub fn is_unit(&self) -> bool {
        matches!(self.rhs.as_slice(), [Symbol::Nonterminal(_)])
    }
}

impl Display for Production {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.lhs, self.rhs.iter().join(" "))
    }
}

/// The two rule tables of a grammar.
///
/// Terminal productions are kept per left-hand side, everything else is kept
/// as a multimap from the right-hand side to the symbols producing it, which
/// is the direction a bottom-up parser looks rules up in.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct RuleStore {
    terminal_rules: BTreeMap<String, BTreeSet<String>>,
    nonterminal_rules: BTreeMap<Vec<Symbol>, BTreeSet<String>>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_terminal(&mut self, lhs: impl Into<String>, token: impl Into<String>) {
        self.terminal_rules
            .entry(lhs.into())
            .or_default()
            .insert(token.into());
    }

    /// Adds a production, routing `A -> 'a'` into the terminal table.
    pub fn add_production(&mut self, production: Production) {
        let Production { lhs, mut rhs } = production;
        if let [Symbol::Terminal(_)] = rhs.as_slice() {
            if let Some(Symbol::Terminal(token)) = rhs.pop() {
                self.add_terminal(lhs, token);
            }
            return;
        }
        self.nonterminal_rules.entry(rhs).or_default().insert(lhs);
    }

    pub fn terminal_rules(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.terminal_rules
    }

    pub fn nonterminal_rules(&self) -> &BTreeMap<Vec<Symbol>, BTreeSet<String>> {
        &self.nonterminal_rules
    }

    /// Every production in the store, terminal productions first.
    pub fn productions(&self) -> impl Iterator<Item = Production> + '_ {
        let terminal = self.terminal_rules.iter().flat_map(|(lhs, tokens)| {
            tokens
                .iter()
                .map(move |t| Production::new(lhs.clone(), vec![Symbol::Terminal(t.clone())]))
        });
        let nonterminal = self.nonterminal_rules.iter().flat_map(|(rhs, lhss)| {
            lhss.iter()
                .map(move |lhs| Production::new(lhs.clone(), rhs.clone()))
        });
        terminal.chain(nonterminal)
    }

    /// All nonterminals mentioned anywhere in the store.
    pub fn nonterminals(&self) -> BTreeSet<&str> {
        let mut names: BTreeSet<&str> = self.terminal_rules.keys().map(String::as_str).collect();
        for (rhs, lhss) in &self.nonterminal_rules {
            names.extend(lhss.iter().map(String::as_str));
            names.extend(
                rhs.iter()
                    .filter(|s| !s.is_terminal())
                    .map(Symbol::name),
            );
        }
        names
    }

    pub fn contains(&self, production: &Production) -> bool {
        match production.rhs.as_slice() {
            [Symbol::Terminal(t)] => self
                .terminal_rules
                .get(&production.lhs)
                .is_some_and(|tokens| tokens.contains(t)),
            rhs => self
                .nonterminal_rules
                .get(rhs)
                .is_some_and(|lhss| lhss.contains(&production.lhs)),
        }
    }

    pub fn len(&self) -> usize {
        self.terminal_rules.values().map(BTreeSet::len).sum::<usize>()
            + self.nonterminal_rules.values().map(BTreeSet::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<Production> for RuleStore {
    fn from_iter<I: IntoIterator<Item = Production>>(iter: I) -> Self {
        let mut store = RuleStore::new();
        store.extend(iter);
        store
    }
}

impl Extend<Production> for RuleStore {
    fn extend<I: IntoIterator<Item = Production>>(&mut self, iter: I) {
        for production in iter {
            self.add_production(production);
        }
    }
}

impl Display for RuleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for production in self.productions() {
            writeln!(f, "{}", production)?;
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq)]
pub struct Grammar {
    pub start_symbol: String,
    pub rules: RuleStore,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn nt(text: &str) -> Symbol {
        Symbol::Nonterminal(text.to_string())
    }

    pub fn t(text: &str) -> Symbol {
        Symbol::Terminal(text.to_string())
    }

    /// Builds a store from `"A -> B C"` / `"A -> 'a'"` lines.
    pub fn store(lines: &[&str]) -> RuleStore {
        lines
            .iter()
            .map(|line| {
                let (lhs, rhs) = line.split_once("->").expect("test rule needs an arrow");
                let rhs = rhs
                    .split_whitespace()
                    .map(|s| match s.strip_prefix('\'') {
                        Some(quoted) => t(quoted.trim_end_matches('\'')),
                        None => nt(s),
                    })
                    .collect();
                Production::new(lhs.trim(), rhs)
            })
            .collect()
    }

    pub const ELEPHANT: &[&str] = &[
        "S -> NP VP",
        "PP -> P NP",
        "NP -> Det N",
        "NP -> Det N PP",
        "NP -> 'I'",
        "VP -> V NP",
        "VP -> VP PP",
        "Det -> 'an'",
        "Det -> 'my'",
        "N -> 'elephant'",
        "N -> 'pajamas'",
        "V -> 'shot'",
        "P -> 'in'",
    ];

    #[test]
    fn terminal_productions_are_routed() {
        let rules = store(&["N -> 'elephant'", "N -> 'pajamas'", "NP -> Det N"]);

        assert_eq!(rules.terminal_rules().len(), 1);
        assert_eq!(
            rules.terminal_rules()["N"].iter().collect::<Vec<_>>(),
            vec!["elephant", "pajamas"]
        );
        assert_eq!(rules.nonterminal_rules().len(), 1);
        assert_eq!(rules.len(), 3);
    }

    #[test]
    fn shared_rhs_keeps_every_lhs() {
        let rules = store(&["NP -> Det N", "X1 -> Det N"]);
        let lhss = &rules.nonterminal_rules()[&vec![nt("Det"), nt("N")]];

        assert_eq!(lhss.iter().collect::<Vec<_>>(), vec!["NP", "X1"]);
        assert!(rules.contains(&Production::new("X1", vec![nt("Det"), nt("N")])));
        assert!(!rules.contains(&Production::new("VP", vec![nt("Det"), nt("N")])));
    }

    #[test]
    fn nonterminals_cover_both_sides() {
        let rules = store(&["S -> NP VP", "NP -> 'I'"]);

        assert_eq!(
            rules.nonterminals().into_iter().collect::<Vec<_>>(),
            vec!["NP", "S", "VP"]
        );
    }

    #[test]
    fn display_uses_reader_syntax() {
        let rules = store(&["S -> NP VP", "NP -> 'I'"]);

        assert_eq!(rules.to_string(), "NP -> 'I'\nS -> NP VP\n");
        assert!(Production::new("NP", vec![nt("Det")]).is_unit());
        assert!(!Production::new("NP", vec![t("I")]).is_unit());
    }
}
