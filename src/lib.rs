//! Chomsky normal form conversion and well-formed substring table parsing
//! for context-free grammars.
//!
//! ```
//! use wfst::grammar::{Production, RuleStore, Symbol};
//! use wfst::{parse, ParsingConfig};
//!
//! let nt = |s: &str| Symbol::Nonterminal(s.to_string());
//! let t = |s: &str| Symbol::Terminal(s.to_string());
//! let rules: RuleStore = vec![
//!     Production::new("S", vec![nt("NP"), nt("VP")]),
//!     Production::new("NP", vec![t("I")]),
//!     Production::new("VP", vec![t("ran")]),
//! ]
//! .into_iter()
//! .collect();
//!
//! let grammar = rules.to_cnf().unwrap();
//! let result = parse(&grammar, &["I", "ran"], "S", &ParsingConfig::default());
//! assert!(result.is_accepted());
//! ```

pub mod chart;
pub mod error_handling;
pub mod generator;
pub mod grammar;
pub mod reader;

use chart::{Chart, Forest};
use grammar::CnfGrammar;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsingConfig {
    /// Build the derivation forest of accepted sentences
    pub derivations: bool,
    /// Threads used to fill the chart
    pub workers: usize,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        ParsingConfig {
            derivations: false,
            workers: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseResult {
    /// The start symbol spans the whole sentence. The forest is only present
    /// if derivations were requested.
    Accepted(Option<Forest>),
    Rejected,
}

impl ParseResult {
    /// Reads the outcome off an already filled chart.
    pub fn from_chart(chart: &Chart, start_symbol: &str, derivations: bool) -> Self {
        if !chart.accepts(start_symbol) {
            return ParseResult::Rejected;
        }
        if derivations {
            ParseResult::Accepted(Forest::build(chart, start_symbol))
        } else {
            ParseResult::Accepted(None)
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, ParseResult::Accepted(_))
    }

    pub fn forest(&self) -> Option<&Forest> {
        match self {
            ParseResult::Accepted(forest) => forest.as_ref(),
            ParseResult::Rejected => None,
        }
    }
}

/// Parses `tokens` with a grammar in Chomsky normal form.
///
/// Unknown tokens and sentences the grammar does not derive are both
/// reported as [`ParseResult::Rejected`]; neither is an error.
pub fn parse<T: AsRef<str>>(
    grammar: &CnfGrammar,
    tokens: &[T],
    start_symbol: &str,
    config: &ParsingConfig,
) -> ParseResult {
    let _span = tracing::debug_span!("parse", start_symbol, tokens = tokens.len()).entered();

    let chart = Chart::build(grammar, tokens, config);
    let result = ParseResult::from_chart(&chart, start_symbol, config.derivations);

    tracing::debug!(accepted = result.is_accepted(), "parse finished");
    result
}
