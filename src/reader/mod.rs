/*
    This module reads grammar files

    One rule per line, `LHS -> RHS | RHS ...`, terminals in single or double
    quotes. Blank lines and lines starting with `#` are skipped. The first
    rule's left-hand side is the start symbol.
*/

mod lexer;
mod verifier;

use std::fs::File;
use std::io::BufRead;
use std::path::Path;

use itertools::Itertools;

use crate::error_handling::*;
use crate::grammar::*;
use lexer::*;
use verifier::verify_rules;

#[derive(Debug, thiserror::Error)]
pub enum ReadErrorType {
    #[error("Rule must contain an arrow (`->`)")]
    MissingArrow,
    #[error("Rule must not contain more than one arrow")]
    MultipleArrows,
    #[error("Rule must start with a nonterminal")]
    MissingNonterminal,
    #[error(
        "The left-hand side must be exactly one nonterminal, \
         {terminals} terminal and {nonterminals} nonterminal symbols were given"
    )]
    MultipleLhsSymbols { terminals: usize, nonterminals: usize },
    #[error("The left-hand side must be a nonterminal, not a terminal")]
    TerminalLhs,
    #[error("Right-hand side is empty")]
    EmptyRhs,
    #[error("Unmatched quotes")]
    UnmatchedQuote,
    #[error("Could not find a rule for `{0}`")]
    UndefinedNonterminal(String),
    #[error("The grammar has no rules")]
    EmptyGrammar,
    #[error("File error: {0}")]
    FileError(std::io::Error),
}

impl ErrorType for ReadErrorType {}

impl PartialEq for ReadErrorType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ReadErrorType::FileError(a), ReadErrorType::FileError(b)) => a.kind() == b.kind(),
            (
                ReadErrorType::MultipleLhsSymbols { terminals: t1, nonterminals: n1 },
                ReadErrorType::MultipleLhsSymbols { terminals: t2, nonterminals: n2 },
            ) => t1 == t2 && n1 == n2,
            (ReadErrorType::UndefinedNonterminal(a), ReadErrorType::UndefinedNonterminal(b)) => {
                a == b
            }
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

pub type ReadError = Error<ReadErrorType>;
pub type ReadErrors = Errors<ReadErrorType>;

fn io_error(error: std::io::Error, file: &Path) -> ReadError {
    ReadError {
        location: Location::new(file, 0),
        error: ReadErrorType::FileError(error),
    }
}

pub type Result<T> = std::result::Result<T, ReadErrorType>;
pub type LineResult<T> = std::result::Result<T, ReadError>;
pub type FileResult<T> = std::result::Result<T, ReadErrors>;

// The alternatives of one line
pub type Rewrite = Vec<Vec<Symbol>>;

#[derive(PartialEq, Debug)]
struct Rule {
    symbol: String,
    rewrite: Rewrite,
    location: Location,
}

fn parse_lhs(tokens: &[Token]) -> Result<String> {
    match tokens {
        [Token::Nonterminal(s)] => Ok(s.clone()),
        [Token::Terminal(_)] => Err(ReadErrorType::TerminalLhs),
        [] | [Token::Or] => Err(ReadErrorType::MissingNonterminal),
        _ => {
            let terminals = tokens.iter().filter(|t| matches!(t, Token::Terminal(_))).count();
            Err(ReadErrorType::MultipleLhsSymbols {
                terminals,
                nonterminals: tokens.len() - terminals,
            })
        }
    }
}

fn parse_alternative(tokens: &[Token]) -> Result<Vec<Symbol>> {
    if tokens.is_empty() {
        return Err(ReadErrorType::EmptyRhs);
    }
    tokens
        .iter()
        .map(|t| match t {
            Token::Arrow => Err(ReadErrorType::MultipleArrows),
            Token::Or => Err(ReadErrorType::EmptyRhs),
            Token::Nonterminal(s) => Ok(Symbol::Nonterminal(s.clone())),
            Token::Terminal(s) => Ok(Symbol::Terminal(s.clone())),
        })
        .collect()
}

fn parse_rewrite(tokens: &[Token]) -> Result<Rewrite> {
    tokens.split(|t| *t == Token::Or).map(parse_alternative).collect()
}

fn parse_line(tokens: &[Token], location: Location) -> Result<Rule> {
    let arrows = tokens.iter().filter(|t| **t == Token::Arrow).count();
    if arrows == 0 {
        return Err(ReadErrorType::MissingArrow);
    }
    if arrows > 1 {
        return Err(ReadErrorType::MultipleArrows);
    }

    let Some((lhs, rhs)) = tokens.split(|t| *t == Token::Arrow).collect_tuple() else {
        return Err(ReadErrorType::MultipleArrows);
    };
    let symbol = parse_lhs(lhs)?;
    let rewrite = parse_rewrite(rhs)?;

    Ok(Rule {
        symbol,
        rewrite,
        location,
    })
}

fn parse_lex_line(line: &str, location: Location) -> LineResult<Rule> {
    lexer::lex_line(line)
        .and_then(|lexed_line| parse_line(&lexed_line, location.clone()))
        .map_err(|error| ReadError { location, error })
}

fn is_rule_line(line: &String) -> bool {
    let line = line.trim();
    !line.is_empty() && !line.starts_with('#')
}

fn grammar_from_rules(rules: Vec<Rule>, path: &Path) -> FileResult<Grammar> {
    let Some(start_symbol) = rules.first().map(|rule| rule.symbol.clone()) else {
        return Err(vec![ReadError {
            location: Location::new(path, 0),
            error: ReadErrorType::EmptyGrammar,
        }]);
    };

    verify_rules(&rules)?;

    let rules = rules
        .into_iter()
        .flat_map(|Rule { symbol, rewrite, .. }| {
            rewrite
                .into_iter()
                .map(move |alternative| Production::new(symbol.clone(), alternative))
        })
        .collect();

    Ok(Grammar { start_symbol, rules })
}

// Numbers the lines, drops the ones without rules and parses the rest,
// collecting every error instead of stopping at the first
fn read_lines(lines: impl Iterator<Item = LineResult<String>>, path: &Path) -> FileResult<Grammar> {
    let parsed_lines = lines
        .enumerate()
        .filter(|(_, line)| line.as_ref().is_ok_and(is_rule_line) || line.is_err())
        .map(|(num, line_res)| {
            line_res.and_then(|line| parse_lex_line(&line, Location::new(path, num + 1)))
        });

    let (rules, errors): (Vec<_>, Vec<_>) = parsed_lines.partition_result();
    if !errors.is_empty() {
        return Err(errors);
    }

    grammar_from_rules(rules, path)
}

/// Reads a grammar from `text`, reporting errors against `path`.
pub fn read_str(text: &str, path: &Path) -> FileResult<Grammar> {
    read_lines(text.lines().map(|line| Ok(line.to_string())), path)
}

pub fn read_file(path: &Path) -> FileResult<Grammar> {
    let _span = tracing::debug_span!("read_file", path = %path.display()).entered();

    let file = File::open(path).map_err(|e| vec![io_error(e, path)])?;
    let lines = std::io::BufReader::new(file)
        .lines()
        .map(|line| line.map_err(|e| io_error(e, path)));

    let grammar = read_lines(lines, path)?;
    tracing::debug!(
        start_symbol = grammar.start_symbol.as_str(),
        productions = grammar.rules.len(),
        "grammar read"
    );
    Ok(grammar)
}

#[cfg(test)]
mod tests {
    use std::iter::zip;
    use std::path::PathBuf;

    use super::*;
    use crate::grammar::tests::{nt, store, t, ELEPHANT};

    fn lexed(line: &str) -> Vec<Token> {
        lexer::lex_line(line).unwrap()
    }

    #[test]
    fn parse_normal_alternative() {
        let lines = vec![lexed("Det N PP"), lexed("'I'"), lexed("V 'up'")];
        let answers = vec![
            vec![nt("Det"), nt("N"), nt("PP")],
            vec![t("I")],
            vec![nt("V"), t("up")],
        ];

        for (line, answer) in zip(lines, answers) {
            assert_eq!(parse_alternative(&line[..]).unwrap(), answer);
        }
    }

    #[test]
    fn parse_malformed_alternative() {
        assert_eq!(parse_alternative(&[]), Err(ReadErrorType::EmptyRhs));
        assert_eq!(parse_alternative(&[Token::Arrow]), Err(ReadErrorType::MultipleArrows));
    }

    #[test]
    fn parse_normal_line() {
        let location = Location::new("grammar.txt", 4);
        let answer = Rule {
            symbol: "NP".to_string(),
            rewrite: vec![vec![nt("Det"), nt("N"), nt("PP")], vec![t("I")]],
            location: location.clone(),
        };

        assert_eq!(parse_line(&lexed("NP -> Det N PP | 'I'"), location), Ok(answer));
    }

    #[test]
    fn parse_malformed_line() {
        let malformed = [
            ("NP Det N", ReadErrorType::MissingArrow),
            ("NP -> Det -> N", ReadErrorType::MultipleArrows),
            (
                "NP VP -> S",
                ReadErrorType::MultipleLhsSymbols {
                    terminals: 0,
                    nonterminals: 2,
                },
            ),
            (
                "'a' B 'c' -> S",
                ReadErrorType::MultipleLhsSymbols {
                    terminals: 2,
                    nonterminals: 1,
                },
            ),
            ("'I' -> NP", ReadErrorType::TerminalLhs),
            ("-> NP", ReadErrorType::MissingNonterminal),
            ("NP ->", ReadErrorType::EmptyRhs),
            ("NP ->   ", ReadErrorType::EmptyRhs),
            ("NP -> Det N |", ReadErrorType::EmptyRhs),
            ("NP -> | Det N", ReadErrorType::EmptyRhs),
        ];

        for (line, error) in malformed {
            assert_eq!(parse_line(&lexed(line), Location::default()), Err(error), "{}", line);
        }
    }

    #[test]
    fn read_normal_file() {
        let example_path = PathBuf::from("example_data/elephant.txt");
        let grammar = read_file(&example_path).unwrap();

        assert_eq!(
            grammar,
            Grammar {
                start_symbol: "S".to_string(),
                rules: store(ELEPHANT),
            }
        );
    }

    #[test]
    fn read_malformed_file() {
        let example_path = PathBuf::from("example_data/malformed.txt");
        let errors = read_file(&example_path).unwrap_err();

        let found: Vec<_> = errors.iter().map(|e| (e.location.line, &e.error)).collect();
        assert_eq!(
            found,
            vec![
                (3, &ReadErrorType::MissingArrow),
                (4, &ReadErrorType::MultipleArrows),
                (
                    5,
                    &ReadErrorType::MultipleLhsSymbols {
                        terminals: 0,
                        nonterminals: 2
                    }
                ),
                (6, &ReadErrorType::TerminalLhs),
                (8, &ReadErrorType::EmptyRhs),
                (9, &ReadErrorType::UnmatchedQuote),
            ]
        );
        assert!(errors.iter().all(|e| e.location.file == example_path));
    }

    #[test]
    fn undefined_nonterminals_are_reported() {
        let text = "S -> NP VP\nNP -> 'I'\n\nVP -> V NP";
        let errors = read_str(text, Path::new("inline")).unwrap_err();

        assert_eq!(
            errors,
            vec![ReadError {
                location: Location::new("inline", 4),
                error: ReadErrorType::UndefinedNonterminal("V".to_string()),
            }]
        );
    }

    #[test]
    fn nonterminal_defined_on_several_lines() {
        let grammar = read_str(
            "# comment\n\
             NP -> Det N\n  \
             # indented comment\n\
             NP -> 'I' | Det N PP\n\
             Det -> 'an'\n\
             N -> 'elephant'\n\
             PP -> 'in'",
            Path::new("inline"),
        )
        .unwrap();

        assert_eq!(grammar.start_symbol, "NP");
        assert_eq!(grammar.rules.len(), 6);
        assert!(grammar.rules.contains(&Production::new("NP", vec![t("I")])));
    }

    #[test]
    fn empty_grammar() {
        let errors = read_str("\n# nothing here\n", Path::new("empty.txt")).unwrap_err();

        assert_eq!(
            errors,
            vec![ReadError {
                location: Location::new("empty.txt", 0),
                error: ReadErrorType::EmptyGrammar,
            }]
        );
    }

    #[test]
    fn missing_file() {
        let errors = read_file(Path::new("example_data/does_not_exist.txt")).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].error,
            ReadErrorType::FileError(std::io::Error::from(std::io::ErrorKind::NotFound))
        );
    }
}
