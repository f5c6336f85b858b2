use std::path::Path;

use wfst::chart::Chart;
use wfst::grammar::ConfigurationError;
use wfst::reader::{read_file, read_str};
use wfst::{parse, ParseResult, ParsingConfig};

fn tokens(sentence: &str) -> Vec<&str> {
    sentence.split_whitespace().collect()
}

#[test]
fn read_normalize_and_parse() {
    let grammar = read_file(Path::new("example_data/elephant.txt")).unwrap();
    let cnf = grammar.rules.to_cnf().unwrap();
    let config = ParsingConfig {
        derivations: true,
        workers: 1,
    };

    let sentence = tokens("I shot an elephant in my pajamas");
    let result = parse(&cnf, &sentence, &grammar.start_symbol, &config);
    let forest = result.forest().unwrap();
    assert_eq!(forest.tree_count(), 2);

    let mut trees: Vec<String> = forest
        .trees()
        .iter()
        .map(|tree| tree.unbinarize(&cnf).to_string())
        .collect();
    trees.sort();
    assert_eq!(
        trees[0],
        "(S (NP I) (VP (V shot) (NP (Det an) (N elephant) (PP (P in) (NP (Det my) (N pajamas))))))"
    );

    assert_eq!(
        parse(&cnf, &tokens("I elephant shot"), "S", &config),
        ParseResult::Rejected
    );
}

#[test]
fn unit_productions_from_a_file() {
    let grammar = read_str(
        "S -> NP VP | VP\n\
         VP -> V NP | V\n\
         NP -> Name | Det N\n\
         Name -> 'Groucho'\n\
         Det -> 'the'\n\
         N -> 'elephant'\n\
         V -> 'shot' | 'runs'",
        Path::new("units.txt"),
    )
    .unwrap();
    let cnf = grammar.rules.to_cnf().unwrap();

    for (sentence, accepted) in [
        ("runs", true),
        ("Groucho runs", true),
        ("Groucho shot the elephant", true),
        ("shot Groucho", true),
        ("the elephant", false),
        ("Groucho the", false),
    ] {
        let chart = Chart::fill(&cnf, &tokens(sentence));
        assert_eq!(chart.accepts("S"), accepted, "{}", sentence);
    }
}

#[test]
fn cyclic_units_from_a_file() {
    let grammar = read_str("S -> A | 'x'\nA -> B\nB -> S", Path::new("cycle.txt")).unwrap();

    assert_eq!(
        grammar.rules.to_cnf(),
        Err(ConfigurationError::UnitCycle {
            cycle: vec!["A".to_string(), "B".to_string(), "S".to_string()]
        })
    );
}

#[test]
fn mixed_rhs_from_a_file() {
    let grammar = read_str("S -> NP 'and' NP\nNP -> 'I'", Path::new("mixed.txt")).unwrap();

    assert!(matches!(
        grammar.rules.to_cnf(),
        Err(ConfigurationError::MixedRhs { .. })
    ));
}
