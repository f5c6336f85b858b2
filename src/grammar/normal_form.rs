use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;

use itertools::Itertools;
use thiserror::Error;

use super::binarize::binarize;
use super::unit::eliminate_unit_productions;
use super::{Production, RuleStore, Symbol};
use crate::error_handling::ErrorType;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigurationError {
    #[error("production for `{lhs}` has an empty right-hand side")]
    EmptyRhs { lhs: String },
    #[error("mixed terminal/non-terminal RHS in `{production}`")]
    MixedRhs { production: Production },
    #[error("unit productions form a cycle through {}", .cycle.iter().join(", "))]
    UnitCycle { cycle: Vec<String> },
}

impl ErrorType for ConfigurationError {}

/// A grammar in Chomsky normal form, indexed for bottom-up parsing.
///
/// Every production is either `A -> 'a'` or `A -> B C`. The grammar is
/// immutable once built and can be shared between any number of parses.
#[derive(Debug, Clone, PartialEq)]
pub struct CnfGrammar {
    rules: RuleStore,
    lexicon: HashMap<String, BTreeSet<String>>,
    binary: HashMap<String, HashMap<String, BTreeSet<String>>>,
    synthetic: BTreeSet<String>,
}

impl CnfGrammar {
    fn index(rules: RuleStore, synthetic: BTreeSet<String>) -> Self {
        let mut lexicon: HashMap<String, BTreeSet<String>> = HashMap::new();
        for (lhs, tokens) in rules.terminal_rules() {
            for token in tokens {
                lexicon.entry(token.clone()).or_default().insert(lhs.clone());
            }
        }

        let mut binary: HashMap<String, HashMap<String, BTreeSet<String>>> = HashMap::new();
        for (rhs, lhss) in rules.nonterminal_rules() {
            // Anything else was rejected or rewritten before indexing
            let [Symbol::Nonterminal(left), Symbol::Nonterminal(right)] = rhs.as_slice() else {
                continue;
            };
            binary
                .entry(left.clone())
                .or_default()
                .entry(right.clone())
                .or_default()
                .extend(lhss.iter().cloned());
        }

        CnfGrammar {
            rules,
            lexicon,
            binary,
            synthetic,
        }
    }

    /// The categories `token` can be rewritten from.
    pub fn categories(&self, token: &str) -> Option<&BTreeSet<String>> {
        self.lexicon.get(token)
    }

    /// Every `A` with a production `A -> left right`.
    pub fn parents(&self, left: &str, right: &str) -> Option<&BTreeSet<String>> {
        self.binary.get(left)?.get(right)
    }

    pub fn is_synthetic(&self, name: &str) -> bool {
        self.synthetic.contains(name)
    }

    pub fn synthetic(&self) -> &BTreeSet<String> {
        &self.synthetic
    }

    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }
}

impl Display for CnfGrammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.rules)
    }
}

fn validate(rules: &RuleStore) -> Result<(), ConfigurationError> {
    for production in rules.productions() {
        if production.rhs.is_empty() {
            return Err(ConfigurationError::EmptyRhs { lhs: production.lhs });
        }
        if production.arity() > 1 && production.rhs.iter().any(Symbol::is_terminal) {
            return Err(ConfigurationError::MixedRhs { production });
        }
    }
    Ok(())
}

/// Converts `rules` into Chomsky normal form.
///
/// Unit productions are eliminated first and long right-hand sides are then
/// binarized. Nothing is returned unless every step succeeds.
pub fn normalize(rules: &RuleStore) -> Result<CnfGrammar, ConfigurationError> {
    let _span = tracing::debug_span!("normalize", productions = rules.len()).entered();

    validate(rules)?;
    let without_units = eliminate_unit_productions(rules)?;
    // Unit elimination can drop nonterminals, their names stay taken
    let (binary, synthetic) = binarize(&without_units, &rules.nonterminals());

    tracing::debug!(
        productions = binary.len(),
        synthetic = synthetic.len(),
        "grammar normalized"
    );
    Ok(CnfGrammar::index(binary, synthetic))
}

impl RuleStore {
    pub fn to_cnf(&self) -> Result<CnfGrammar, ConfigurationError> {
        normalize(self)
    }
}
