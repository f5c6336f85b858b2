use std::collections::{BTreeSet, HashMap};

use super::{Production, RuleStore, Symbol};

// Synthetic nonterminals are named X0, X1, ... skipping any name the grammar
// already uses
const SYNTHETIC_PREFIX: &str = "X";

struct Binarizer<'a> {
    reserved: BTreeSet<&'a str>,
    counter: usize,
    pairs: HashMap<(Symbol, Symbol), String>,
    synthetic: BTreeSet<String>,
}

impl<'a> Binarizer<'a> {
    fn new(reserved: BTreeSet<&'a str>) -> Self {
        Binarizer {
            reserved,
            counter: 0,
            pairs: HashMap::new(),
            synthetic: BTreeSet::new(),
        }
    }

    fn fresh_name(&mut self) -> String {
        loop {
            let name = format!("{}{}", SYNTHETIC_PREFIX, self.counter);
            self.counter += 1;
            if !self.reserved.contains(name.as_str()) {
                return name;
            }
        }
    }

    // Returns the synthetic nonterminal rewriting to `left right`, creating it
    // the first time the pair is seen
    fn synthetic_for(&mut self, left: &Symbol, right: &Symbol, out: &mut RuleStore) -> Symbol {
        let key = (left.clone(), right.clone());
        if let Some(name) = self.pairs.get(&key) {
            return Symbol::Nonterminal(name.clone());
        }

        let name = self.fresh_name();
        tracing::trace!(%name, %left, %right, "new synthetic nonterminal");
        out.add_production(Production::new(name.clone(), vec![left.clone(), right.clone()]));
        self.synthetic.insert(name.clone());
        self.pairs.insert(key, name.clone());
        Symbol::Nonterminal(name)
    }

    fn binarize(&mut self, production: Production, out: &mut RuleStore) {
        match production.rhs.as_slice() {
            [first, middle @ .., last] if !middle.is_empty() => {
                let mut prefix = first.clone();
                for symbol in middle {
                    prefix = self.synthetic_for(&prefix, symbol, out);
                }
                out.add_production(Production::new(production.lhs, vec![prefix, last.clone()]));
            }
            _ => out.add_production(production),
        }
    }
}

/// Rewrites every production with more than two right-hand side symbols into
/// a left-branching chain of binary productions.
///
/// Synthetic names never collide with `reserved`, nor with any nonterminal of
/// `rules`. Returns the new store and the names of the synthetic nonterminals
/// that were introduced.
pub(super) fn binarize(
    rules: &RuleStore,
    reserved: &BTreeSet<&str>,
) -> (RuleStore, BTreeSet<String>) {
    let mut taken = rules.nonterminals();
    taken.extend(reserved.iter().copied());
    let mut binarizer = Binarizer::new(taken);
    let mut out = RuleStore::new();

    for production in rules.productions() {
        binarizer.binarize(production, &mut out);
    }

    (out, binarizer.synthetic)
}
