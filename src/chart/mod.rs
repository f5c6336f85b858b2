/*
    This module builds the well-formed substring table
*/

mod forest;

use std::collections::BTreeMap;
use std::fmt::Display;

use itertools::Itertools;

use crate::grammar::CnfGrammar;
use crate::ParsingConfig;

pub use forest::{Forest, ForestNode, NodeId, Packed, Tree};

/// One justification for a category in a cell.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Derivation {
    // The category rewrites to the token itself
    Lexical(String),
    // The category is `A -> left right` with `left` spanning [start, mid)
    // and `right` spanning [mid, end)
    Binary {
        mid: usize,
        left: String,
        right: String,
    },
}

/// The categories spanning a substring, each with every way it was derived.
pub type Cell = BTreeMap<String, Vec<Derivation>>;

/// A filled well-formed substring table.
///
/// Cell `[start][end]` holds every category deriving `tokens[start..end]`.
/// Only the upper triangle `start < end` exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    tokens: Vec<String>,
    // cells[start][end - start - 1]
    cells: Vec<Vec<Cell>>,
}

impl Chart {
    fn initialise<T: AsRef<str>>(grammar: &CnfGrammar, tokens: &[T]) -> Self {
        let tokens: Vec<String> = tokens.iter().map(|t| t.as_ref().to_string()).collect();

        let cells = tokens
            .iter()
            .enumerate()
            .map(|(i, token)| {
                let mut cell = Cell::new();
                match grammar.categories(token) {
                    Some(categories) => {
                        for category in categories {
                            cell.insert(category.clone(), vec![Derivation::Lexical(token.clone())]);
                        }
                    }
                    None => {
                        tracing::debug!(position = i, token = token.as_str(), "unknown token")
                    }
                }
                vec![cell]
            })
            .collect();

        Chart { tokens, cells }
    }

    // Builds cell [start][end] from the strictly shorter cells inside it
    fn combine(&self, grammar: &CnfGrammar, start: usize, end: usize) -> Cell {
        let mut cell = Cell::new();

        for mid in start + 1..end {
            let (Some(left), Some(right)) = (self.cell(start, mid), self.cell(mid, end)) else {
                continue;
            };
            for (b, c) in left.keys().cartesian_product(right.keys()) {
                let Some(parents) = grammar.parents(b, c) else {
                    continue;
                };
                for a in parents {
                    tracing::trace!("[{start}] {b} [{mid}] {c} [{end}] ==> [{start}] {a} [{end}]");
                    cell.entry(a.clone()).or_default().push(Derivation::Binary {
                        mid,
                        left: b.clone(),
                        right: c.clone(),
                    });
                }
            }
        }

        cell
    }

    /// Fills the chart for `tokens`, shortest spans first.
    pub fn fill<T: AsRef<str>>(grammar: &CnfGrammar, tokens: &[T]) -> Self {
        let mut chart = Chart::initialise(grammar, tokens);
        let n = chart.len();
        let _span = tracing::debug_span!("fill", tokens = n).entered();

        for span in 2..=n {
            for start in 0..=n - span {
                let cell = chart.combine(grammar, start, start + span);
                chart.cells[start].push(cell);
            }
        }

        chart
    }

    /// Same as [`Chart::fill`], with the cells of each span length split
    /// between `workers` threads. All cells of one length are finished
    /// before the next length starts.
    pub fn fill_parallel<T: AsRef<str>>(
        grammar: &CnfGrammar,
        tokens: &[T],
        workers: usize,
    ) -> Self {
        let mut chart = Chart::initialise(grammar, tokens);
        let n = chart.len();
        let _span = tracing::debug_span!("fill_parallel", tokens = n, workers).entered();

        for span in 2..=n {
            let starts: Vec<usize> = (0..=n - span).collect();
            let chunk_size = starts.len().div_ceil(workers.max(1));

            let cells: Vec<Cell> = std::thread::scope(|scope| {
                let chart = &chart;
                let handles: Vec<_> = starts
                    .chunks(chunk_size)
                    .map(|chunk| {
                        scope.spawn(move || {
                            chunk
                                .iter()
                                .map(|&start| chart.combine(grammar, start, start + span))
                                .collect::<Vec<_>>()
                        })
                    })
                    .collect();
                handles
                    .into_iter()
                    .flat_map(|handle| {
                        handle.join().unwrap_or_else(|e| std::panic::resume_unwind(e))
                    })
                    .collect()
            });

            for (start, cell) in cells.into_iter().enumerate() {
                chart.cells[start].push(cell);
            }
        }

        chart
    }

    /// Fills the chart with as many threads as `config` asks for.
    pub fn build<T: AsRef<str>>(
        grammar: &CnfGrammar,
        tokens: &[T],
        config: &ParsingConfig,
    ) -> Self {
        if config.workers > 1 {
            Chart::fill_parallel(grammar, tokens, config.workers)
        } else {
            Chart::fill(grammar, tokens)
        }
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn cell(&self, start: usize, end: usize) -> Option<&Cell> {
        if start >= end {
            return None;
        }
        self.cells.get(start)?.get(end - start - 1)
    }

    pub fn categories(&self, start: usize, end: usize) -> impl Iterator<Item = &str> {
        self.cell(start, end)
            .into_iter()
            .flat_map(|cell| cell.keys().map(String::as_str))
    }

    pub fn contains(&self, start: usize, end: usize, category: &str) -> bool {
        self.cell(start, end).is_some_and(|cell| cell.contains_key(category))
    }

    /// Whether `start_symbol` spans the whole sentence.
    pub fn accepts(&self, start_symbol: &str) -> bool {
        !self.is_empty() && self.contains(0, self.len(), start_symbol)
    }
}

impl Display for Chart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let n = self.len();
        let labels: Vec<Vec<String>> = (0..n)
            .map(|start| {
                (1..=n)
                    .map(|end| match self.cell(start, end) {
                        Some(cell) if !cell.is_empty() => cell.keys().join(","),
                        _ => ".".to_string(),
                    })
                    .collect()
            })
            .collect();
        let width = labels.iter().flatten().map(String::len).fold(4, usize::max);

        let header = (1..=n).map(|end| format!("{end:<width$}")).join(" ");
        writeln!(f, "{}", format!("WFST {header}").trim_end())?;
        for (start, row) in labels.iter().enumerate() {
            let row = row.iter().map(|label| format!("{label:<width$}")).join(" ");
            writeln!(f, "{}", format!("{start:<4} {row}").trim_end())?;
        }
        Ok(())
    }
}
