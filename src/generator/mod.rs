/*
    This module generates sentences
*/

use std::collections::HashMap;

use rand::prelude::*;

use crate::error_handling::*;
use crate::grammar::*;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum GenerateErrorType {
    // An undefined nonterminal was used
    #[error("No definition for nonterminal `{0}`")]
    UndefinedNonterminal(String),
    // The derivation kept growing past the configured depth
    #[error("Derivation went deeper than {0} nonterminals")]
    DepthExceeded(usize),
}

impl ErrorType for GenerateErrorType {}

pub type GenerateError = Error<GenerateErrorType>;
pub type GenResult = Result<Vec<String>, GenerateError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub max_depth: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig { max_depth: 32 }
    }
}

/// Samples sentences from a rule store by expanding a uniformly chosen
/// alternative for every nonterminal.
pub struct Generator {
    alternatives: HashMap<String, Vec<Vec<Symbol>>>,
    location: Location,
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(rules: &RuleStore, location: Location, config: GeneratorConfig) -> Self {
        let mut alternatives: HashMap<String, Vec<Vec<Symbol>>> = HashMap::new();
        for Production { lhs, rhs } in rules.productions() {
            alternatives.entry(lhs).or_default().push(rhs);
        }
        Generator {
            alternatives,
            location,
            config,
        }
    }

    fn error(&self, error: GenerateErrorType) -> GenerateError {
        GenerateError {
            location: self.location.clone(),
            error,
        }
    }

    /// Generates a sentence starting from `start`.
    pub fn generate(&self, start: &str, rng: &mut impl Rng) -> GenResult {
        let mut sentence = Vec::new();
        self.generate_nonterminal(start, 0, rng, &mut sentence)?;
        Ok(sentence)
    }

    fn generate_nonterminal(
        &self,
        nonterminal: &str,
        depth: usize,
        rng: &mut impl Rng,
        sentence: &mut Vec<String>,
    ) -> Result<(), GenerateError> {
        if depth > self.config.max_depth {
            return Err(self.error(GenerateErrorType::DepthExceeded(self.config.max_depth)));
        }
        let rewrite = self
            .alternatives
            .get(nonterminal)
            .ok_or_else(|| {
                self.error(GenerateErrorType::UndefinedNonterminal(nonterminal.to_string()))
            })?;

        let Some(alternative) = rewrite.choose(rng) else {
            return Ok(());
        };
        for symbol in alternative {
            match symbol {
                Symbol::Nonterminal(n) => self.generate_nonterminal(n, depth + 1, rng, sentence)?,
                Symbol::Terminal(t) => sentence.push(t.clone()),
            }
        }
        Ok(())
    }
}

/// Generates a sentence from the grammar's own start symbol.
pub fn generate(
    grammar: &Grammar,
    location: Location,
    config: GeneratorConfig,
    rng: &mut impl Rng,
) -> GenResult {
    Generator::new(&grammar.rules, location, config).generate(&grammar.start_symbol, rng)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;

    use super::*;
    use crate::chart::Chart;
    use crate::grammar::tests::{store, ELEPHANT};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5eed)
    }

    #[test]
    fn sentences_use_the_vocabulary() {
        let generator =
            Generator::new(&store(ELEPHANT), Location::default(), GeneratorConfig::default());
        let vocabulary = ["I", "shot", "an", "my", "elephant", "pajamas", "in"];
        let mut rng = rng();

        let mut sampled = 0;
        for _ in 0..50 {
            let Ok(sentence) = generator.generate("NP", &mut rng) else {
                continue;
            };
            assert!(!sentence.is_empty());
            assert!(sentence.iter().all(|word| vocabulary.contains(&word.as_str())));
            sampled += 1;
        }
        // Only a chain of 16 nested PPs can go past the default depth
        assert!(sampled >= 45, "only {} of 50 sentences were generated", sampled);
    }

    #[test]
    fn sampled_sentences_are_accepted_after_normalization() {
        let rules = store(&[
            "S -> NP VP",
            "S -> VP",
            "NP -> Det Adj N PP",
            "NP -> Det N",
            "NP -> Name",
            "Name -> 'Groucho'",
            "VP -> V NP",
            "VP -> V",
            "PP -> P NP",
            "Det -> 'the'",
            "Adj -> 'big'",
            "N -> 'elephant'",
            "V -> 'shot'",
            "P -> 'in'",
        ]);
        let grammar = rules.to_cnf().unwrap();
        let config = GeneratorConfig { max_depth: 12 };
        let generator = Generator::new(&rules, Location::default(), config);
        let mut rng = rng();

        let mut accepted = 0;
        for _ in 0..200 {
            let Ok(sentence) = generator.generate("S", &mut rng) else {
                continue;
            };
            assert!(Chart::fill(&grammar, &sentence).accepts("S"), "{:?}", sentence);
            accepted += 1;
        }
        assert!(accepted > 100, "only {} of 200 sentences were generated", accepted);
    }

    #[test]
    fn undefined_start_symbol() {
        let location = Location::new("elephant.txt", 0);
        let generator = Generator::new(&store(ELEPHANT), location, GeneratorConfig::default());

        assert_eq!(
            generator.generate("Missing", &mut rng()),
            Err(GenerateError {
                location: Location::new("elephant.txt", 0),
                error: GenerateErrorType::UndefinedNonterminal("Missing".to_string()),
            })
        );
    }

    #[test]
    fn endless_recursion_is_cut_off() {
        let config = GeneratorConfig { max_depth: 5 };
        let generator = Generator::new(&store(&["S -> S S"]), Location::default(), config);

        assert_eq!(
            generator.generate("S", &mut rng()).unwrap_err().error,
            GenerateErrorType::DepthExceeded(5)
        );
    }

    #[test]
    fn generate_from_grammar_start() {
        let grammar = Grammar {
            start_symbol: "NP".to_string(),
            rules: store(&["NP -> 'I'"]),
        };

        assert_eq!(
            generate(&grammar, Location::default(), GeneratorConfig::default(), &mut rng()),
            Ok(vec!["I".to_string()])
        );
    }
}
