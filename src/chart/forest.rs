use std::collections::HashMap;
use std::fmt::Display;

use itertools::Itertools;

use super::{Chart, Derivation};
use crate::grammar::CnfGrammar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

/// One way of building a forest node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packed {
    Leaf(String),
    Branch(NodeId, NodeId),
}

/// A category over a span, shared by every tree that uses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForestNode {
    pub category: String,
    pub start: usize,
    pub end: usize,
    pub alternatives: Vec<Packed>,
}

/// Every derivation of a sentence, packed so that each `(span, category)`
/// pair is represented by exactly one node.
///
/// Children always come before their parents, and the root is the last node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forest {
    nodes: Vec<ForestNode>,
    root: NodeId,
}

struct ForestBuilder<'a> {
    chart: &'a Chart,
    nodes: Vec<ForestNode>,
    memo: HashMap<(usize, usize, &'a str), NodeId>,
}

impl<'a> ForestBuilder<'a> {
    fn node(&mut self, category: &'a str, start: usize, end: usize) -> Option<NodeId> {
        if let Some(&id) = self.memo.get(&(start, end, category)) {
            return Some(id);
        }

        let chart = self.chart;
        let derivations = chart.cell(start, end)?.get(category)?;
        let mut alternatives = Vec::with_capacity(derivations.len());
        for derivation in derivations {
            match derivation {
                Derivation::Lexical(token) => alternatives.push(Packed::Leaf(token.clone())),
                Derivation::Binary { mid, left, right } => {
                    let left = self.node(left, start, *mid)?;
                    let right = self.node(right, *mid, end)?;
                    alternatives.push(Packed::Branch(left, right));
                }
            }
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(ForestNode {
            category: category.to_string(),
            start,
            end,
            alternatives,
        });
        self.memo.insert((start, end, category), id);
        Some(id)
    }
}

impl Forest {
    /// Collects the derivations of `start_symbol` over the whole chart, or
    /// `None` if the chart does not accept it.
    pub fn build(chart: &Chart, start_symbol: &str) -> Option<Forest> {
        if !chart.accepts(start_symbol) {
            return None;
        }
        let _span = tracing::debug_span!("build_forest", start_symbol).entered();

        let mut builder = ForestBuilder {
            chart,
            nodes: Vec::new(),
            memo: HashMap::new(),
        };
        // Re-borrow the category from the chart so the memo can key on it
        let (category, _) = chart.cell(0, chart.len())?.get_key_value(start_symbol)?;
        let root = builder.node(category, 0, chart.len())?;

        tracing::debug!(nodes = builder.nodes.len(), "forest built");
        Some(Forest {
            nodes: builder.nodes,
            root,
        })
    }

    pub fn root(&self) -> &ForestNode {
        &self.nodes[self.root.0]
    }

    pub fn node(&self, id: NodeId) -> Option<&ForestNode> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> &[ForestNode] {
        &self.nodes
    }

    /// Number of distinct trees in the forest, saturating at `u128::MAX`.
    pub fn tree_count(&self) -> u128 {
        let mut counts: Vec<u128> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let count = node
                .alternatives
                .iter()
                .map(|alternative| match alternative {
                    Packed::Leaf(_) => 1,
                    Packed::Branch(l, r) => counts[l.0].saturating_mul(counts[r.0]),
                })
                .fold(0u128, u128::saturating_add);
            counts.push(count);
        }
        counts.get(self.root.0).copied().unwrap_or(0)
    }

    /// Every tree in the forest. There can be exponentially many, see
    /// [`Forest::tree_count`].
    pub fn trees(&self) -> Vec<Tree> {
        let mut expanded: Vec<Vec<Tree>> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let mut trees = Vec::new();
            for alternative in &node.alternatives {
                match alternative {
                    Packed::Leaf(token) => trees.push(Tree::Leaf {
                        category: node.category.clone(),
                        token: token.clone(),
                    }),
                    Packed::Branch(l, r) => {
                        let pairs = expanded[l.0].iter().cartesian_product(&expanded[r.0]);
                        for (left, right) in pairs {
                            trees.push(Tree::Node {
                                category: node.category.clone(),
                                children: vec![left.clone(), right.clone()],
                            });
                        }
                    }
                }
            }
            expanded.push(trees);
        }
        expanded.into_iter().nth(self.root.0).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tree {
    Leaf { category: String, token: String },
    Node { category: String, children: Vec<Tree> },
}

impl Tree {
    pub fn category(&self) -> &str {
        match self {
            Tree::Leaf { category, .. } | Tree::Node { category, .. } => category,
        }
    }

    pub fn children(&self) -> &[Tree] {
        match self {
            Tree::Leaf { .. } => &[],
            Tree::Node { children, .. } => children,
        }
    }

    /// The tokens at the leaves, left to right.
    pub fn leaves(&self) -> Vec<&str> {
        match self {
            Tree::Leaf { token, .. } => vec![token.as_str()],
            Tree::Node { children, .. } => children.iter().flat_map(Tree::leaves).collect(),
        }
    }

    /// Replaces every synthetic node introduced by binarization with its
    /// children, giving back the shape of the original productions.
    pub fn unbinarize(&self, grammar: &CnfGrammar) -> Tree {
        match self {
            Tree::Leaf { .. } => self.clone(),
            Tree::Node { category, children } => {
                let mut spliced = Vec::with_capacity(children.len());
                for child in children {
                    child.splice_into(grammar, &mut spliced);
                }
                Tree::Node {
                    category: category.clone(),
                    children: spliced,
                }
            }
        }
    }

    fn splice_into(&self, grammar: &CnfGrammar, out: &mut Vec<Tree>) {
        match self {
            Tree::Node { category, children } if grammar.is_synthetic(category) => {
                for child in children {
                    child.splice_into(grammar, out);
                }
            }
            _ => out.push(self.unbinarize(grammar)),
        }
    }
}

impl Display for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tree::Leaf { category, token } => write!(f, "({} {})", category, token),
            Tree::Node { category, children } => {
                write!(f, "({} {})", category, children.iter().join(" "))
            }
        }
    }
}
