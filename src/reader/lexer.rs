use itertools::{Itertools, PeekingNext};

use super::{ReadErrorType, Result};

const ARROW: &str = "->";

#[derive(PartialEq, Debug)]
pub enum Token {
    Arrow,
    Or,
    Nonterminal(String),
    Terminal(String),
}

fn is_quote(c: char) -> bool {
    c == '\'' || c == '"'
}

// Expects the iterator to be on the opening quote; the closing quote must be
// the same character
pub fn lex_terminal(line: &mut impl PeekingNext<Item = (usize, char)>) -> Result<Token> {
    let Some((_, quote)) = line.next() else {
        return Err(ReadErrorType::UnmatchedQuote);
    };
    let token_text = line
        .peeking_take_while(|&(_, c)| c != quote)
        .map(|(_, c)| c)
        .collect();

    // Check if there is a close quote and consume it if there is
    if line.next().map(|(_, c)| c) != Some(quote) {
        return Err(ReadErrorType::UnmatchedQuote);
    }

    Ok(Token::Terminal(token_text))
}

// A nonterminal runs until whitespace, `|`, a quote or an arrow
pub fn lex_nonterminal(text: &str, line: &mut impl PeekingNext<Item = (usize, char)>) -> Token {
    Token::Nonterminal(
        line.peeking_take_while(|&(i, c)| {
            !c.is_whitespace() && c != '|' && !is_quote(c) && !text[i..].starts_with(ARROW)
        })
        .map(|(_, c)| c)
        .collect(),
    )
}

pub fn lex_line(line: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();

    let mut line_chars = line.char_indices().peekable();

    while let Some(&(i, c)) = line_chars.peek() {
        if line[i..].starts_with(ARROW) {
            line_chars.nth(ARROW.len() - 1);
            tokens.push(Token::Arrow);
        } else if c == '|' {
            line_chars.next();
            tokens.push(Token::Or);
        } else if is_quote(c) {
            tokens.push(lex_terminal(&mut line_chars)?);
        } else if !c.is_whitespace() {
            tokens.push(lex_nonterminal(line, &mut line_chars));
        } else {
            line_chars.next();
        }
    }

    Ok(tokens)
}
