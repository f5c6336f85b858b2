use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;

use super::{ConfigurationError, Production, RuleStore, Symbol};

type UnitGraph<'a> = DiGraph<&'a str, ()>;

fn node<'a>(
    graph: &mut UnitGraph<'a>,
    nodes: &mut HashMap<&'a str, NodeIndex>,
    name: &'a str,
) -> NodeIndex {
    *nodes.entry(name).or_insert_with(|| graph.add_node(name))
}

// Every edge A -> B of the graph is a unit production A -> B
fn unit_graph(rules: &RuleStore) -> (UnitGraph<'_>, HashMap<&str, NodeIndex>) {
    let mut graph = UnitGraph::new();
    let mut nodes = HashMap::new();

    for (rhs, lhss) in rules.nonterminal_rules() {
        let [Symbol::Nonterminal(target)] = rhs.as_slice() else {
            continue;
        };
        let target = node(&mut graph, &mut nodes, target);
        for lhs in lhss {
            let source = node(&mut graph, &mut nodes, lhs);
            graph.update_edge(source, target, ());
        }
    }

    (graph, nodes)
}

fn check_acyclic(graph: &UnitGraph<'_>) -> Result<(), ConfigurationError> {
    for component in tarjan_scc(graph) {
        let cyclic = match component.as_slice() {
            [single] => graph.contains_edge(*single, *single),
            _ => true,
        };
        if cyclic {
            let mut cycle: Vec<String> = component.iter().map(|&i| graph[i].to_string()).collect();
            cycle.sort();
            return Err(ConfigurationError::UnitCycle { cycle });
        }
    }
    Ok(())
}

/// Removes every unit production `A -> B`, giving `A` copies of the terminal
/// and non-unit productions of every nonterminal reachable from it through
/// unit productions.
///
/// Fails with [`ConfigurationError::UnitCycle`] if the unit productions form
/// a cycle. The input store is left untouched.
pub fn eliminate_unit_productions(rules: &RuleStore) -> Result<RuleStore, ConfigurationError> {
    let _span = tracing::debug_span!("eliminate_unit_productions").entered();

    let (graph, nodes) = unit_graph(rules);
    check_acyclic(&graph)?;

    let mut by_lhs: HashMap<String, Vec<Production>> = HashMap::new();
    for production in rules.productions().filter(|p| !p.is_unit()) {
        by_lhs.entry(production.lhs.clone()).or_default().push(production);
    }

    let mut result: RuleStore = by_lhs.values().flatten().cloned().collect();

    for (&lhs, &start) in &nodes {
        let mut dfs = Dfs::new(&graph, start);
        while let Some(reached) = dfs.next(&graph) {
            if reached == start {
                continue;
            }
            let Some(inherited) = by_lhs.get(graph[reached]) else {
                continue;
            };
            tracing::trace!(
                lhs,
                via = graph[reached],
                count = inherited.len(),
                "inheriting productions"
            );
            result.extend(inherited.iter().map(|p| Production::new(lhs, p.rhs.clone())));
        }
    }

    tracing::debug!(
        units = graph.edge_count(),
        before = rules.len(),
        after = result.len(),
        "eliminated unit productions"
    );
    Ok(result)
}
