use std::collections::HashSet;

use super::ReadErrorType::UndefinedNonterminal;
use super::{FileResult, ReadError, ReadErrors, Rule};
use crate::grammar::Symbol;
use crate::grammar::Symbol::Nonterminal;

fn get_alternative_undefined_symbols(
    alternative: &[Symbol],
    rule: &Rule,
    defined: &HashSet<&str>,
) -> ReadErrors {
    // Only nonterminals can be undefined
    alternative
        .iter()
        .filter_map(|symbol| match symbol {
            Nonterminal(symbol) => Some(symbol),
            _ => None,
        })
        .filter(|symbol| !defined.contains(symbol.as_str()))
        .map(|symbol_text| ReadError {
            location: rule.location.to_owned(),
            error: UndefinedNonterminal(symbol_text.to_owned()),
        })
        .collect()
}

fn get_undefined_symbols(rules: &[Rule]) -> ReadErrors {
    // A nonterminal is defined if any line has it on the left-hand side
    let defined: HashSet<&str> = rules.iter().map(|rule| rule.symbol.as_str()).collect();

    rules
        .iter()
        .flat_map(|rule| rule.rewrite.iter().map(move |alternative| (rule, alternative)))
        .flat_map(|(rule, alternative)| {
            get_alternative_undefined_symbols(alternative, rule, &defined)
        })
        .collect()
}

pub(super) fn verify_rules(rules: &[Rule]) -> FileResult<()> {
    let errors = get_undefined_symbols(rules);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
