//! CFG builder (C6).
//!
//! Converts a statement stream into a graph of entry/exit/branch/merge/
//! statement nodes, using the statement parser's block-depth convention to
//! bracket `if`/`else` and `match` blocks without a full parser.

use std::collections::{BTreeMap, BTreeSet};

use crate::ir::{CfgNode, CfgNodeKind, ControlFlowGraph, Statement, StatementKind};

/// Builds a CFG for one function's statement stream.
pub fn build(function_name: &str, statements: &[Statement]) -> ControlFlowGraph {
    let mut cfg = ControlFlowGraph {
        function_name: function_name.to_string(),
        nodes: Vec::new(),
        entry_node_id: 0,
        exit_node_ids: Vec::new(),
    };
    let mut counter: u32 = 0;

    let entry_id = create_node(&mut cfg, &mut counter, CfgNodeKind::Entry, None);
    cfg.entry_node_id = entry_id;
    let exit_id = create_node(&mut cfg, &mut counter, CfgNodeKind::Exit, None);
    cfg.exit_node_ids.push(exit_id);

    if statements.is_empty() {
        cfg.add_edge(entry_id, exit_id);
        return cfg;
    }

    let last = build_sequential(&mut cfg, &mut counter, statements, entry_id, exit_id, 0);
    if let Some(id) = last {
        cfg.add_edge(id, exit_id);
    }

    cfg
}

fn create_node(
    cfg: &mut ControlFlowGraph,
    counter: &mut u32,
    kind: CfgNodeKind,
    statement: Option<Statement>,
) -> u32 {
    let id = *counter;
    cfg.nodes.push(CfgNode {
        id,
        kind,
        statement,
        successors: Vec::new(),
        predecessors: Vec::new(),
    });
    *counter += 1;
    id
}

fn build_sequential(
    cfg: &mut ControlFlowGraph,
    counter: &mut u32,
    statements: &[Statement],
    mut current_id: u32,
    exit_id: u32,
    start_idx: usize,
) -> Option<u32> {
    let mut i = start_idx;
    while i < statements.len() {
        match &statements[i].kind {
            StatementKind::If { .. } => {
                let (merge_id, next_i) = build_if(cfg, counter, statements, i, current_id, exit_id);
                current_id = merge_id;
                i = next_i;
            }
            StatementKind::Match { .. } => {
                let (merge_id, next_i) = build_match(cfg, counter, statements, i, current_id, exit_id);
                current_id = merge_id;
                i = next_i;
            }
            StatementKind::Return { .. } => {
                let node_id = create_node(cfg, counter, CfgNodeKind::Statement, Some(statements[i].clone()));
                cfg.add_edge(current_id, node_id);
                cfg.add_edge(node_id, exit_id);
                return None;
            }
            _ => {
                let node_id = create_node(cfg, counter, CfgNodeKind::Statement, Some(statements[i].clone()));
                cfg.add_edge(current_id, node_id);
                current_id = node_id;
            }
        }
        i += 1;
    }
    Some(current_id)
}

fn build_if(
    cfg: &mut ControlFlowGraph,
    counter: &mut u32,
    statements: &[Statement],
    if_idx: usize,
    current_id: u32,
    exit_id: u32,
) -> (u32, usize) {
    let if_stmt = statements[if_idx].clone();
    let if_depth = if_stmt.block_depth;

    let branch_id = create_node(cfg, counter, CfgNodeKind::Branch, Some(if_stmt));
    cfg.add_edge(current_id, branch_id);

    let (then_block, else_block, next_idx) = extract_if_blocks(statements, if_idx, if_depth);

    let merge_id = create_node(cfg, counter, CfgNodeKind::Merge, None);

    if !then_block.is_empty() {
        if let Some(last) = build_sequential(cfg, counter, &then_block, branch_id, exit_id, 0) {
            cfg.add_edge(last, merge_id);
        }
    } else {
        cfg.add_edge(branch_id, merge_id);
    }

    match &else_block {
        Some(eb) if !eb.is_empty() => {
            if let Some(last) = build_sequential(cfg, counter, eb, branch_id, exit_id, 0) {
                cfg.add_edge(last, merge_id);
            }
        }
        _ => {
            cfg.add_edge(branch_id, merge_id);
        }
    }

    (merge_id, next_idx - 1)
}

fn build_match(
    cfg: &mut ControlFlowGraph,
    counter: &mut u32,
    statements: &[Statement],
    match_idx: usize,
    current_id: u32,
    exit_id: u32,
) -> (u32, usize) {
    let match_stmt = statements[match_idx].clone();
    let match_depth = match_stmt.block_depth;

    let branch_id = create_node(cfg, counter, CfgNodeKind::Branch, Some(match_stmt));
    cfg.add_edge(current_id, branch_id);
    let merge_id = create_node(cfg, counter, CfgNodeKind::Merge, None);

    let mut next_idx = statements.len();
    for (i, s) in statements.iter().enumerate().skip(match_idx + 1) {
        if s.block_depth <= match_depth {
            next_idx = i;
            break;
        }
    }

    // A match body is treated as a single sequential run; arms are not
    // separated in this release (spec §4.6, a deliberate simplification).
    let match_body = statements[(match_idx + 1)..next_idx].to_vec();
    if !match_body.is_empty() {
        if let Some(last) = build_sequential(cfg, counter, &match_body, branch_id, exit_id, 0) {
            cfg.add_edge(last, merge_id);
        }
    } else {
        cfg.add_edge(branch_id, merge_id);
    }

    (merge_id, next_idx - 1)
}

fn extract_if_blocks(
    statements: &[Statement],
    if_idx: usize,
    if_depth: usize,
) -> (Vec<Statement>, Option<Vec<Statement>>, usize) {
    let mut then_block = Vec::new();
    let mut else_idx: Option<usize> = None;

    let mut i = if_idx + 1;
    while i < statements.len() {
        let s = &statements[i];
        if matches!(s.kind, StatementKind::Else { .. }) && s.block_depth == if_depth {
            else_idx = Some(i);
            break;
        }
        if s.block_depth <= if_depth {
            break;
        }
        then_block.push(s.clone());
        i += 1;
    }

    let mut else_block = None;
    if let Some(eidx) = else_idx {
        let mut eb = Vec::new();
        let mut j = eidx + 1;
        while j < statements.len() {
            let s = &statements[j];
            if s.block_depth <= if_depth {
                break;
            }
            eb.push(s.clone());
            j += 1;
        }
        else_block = Some(eb);
        i = j;
    }

    (then_block, else_block, i)
}

/// Classic iterative dominator algorithm: `dom(entry) = {entry}`,
/// `dom(n) = {n} ∪ ⋂ dom(pred)` for all other nodes, to fixed point.
pub fn compute_dominators(cfg: &ControlFlowGraph) -> BTreeMap<u32, BTreeSet<u32>> {
    let all_nodes: BTreeSet<u32> = cfg.nodes.iter().map(|n| n.id).collect();
    let mut dominators: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
    dominators.insert(cfg.entry_node_id, BTreeSet::from([cfg.entry_node_id]));

    for node in &cfg.nodes {
        if node.id != cfg.entry_node_id {
            dominators.insert(node.id, all_nodes.clone());
        }
    }

    let mut changed = true;
    while changed {
        changed = false;
        for node in &cfg.nodes {
            if node.id == cfg.entry_node_id {
                continue;
            }

            let mut new_dom: BTreeSet<u32> = BTreeSet::from([node.id]);
            if !node.predecessors.is_empty() {
                let mut preds = node.predecessors.iter();
                let first = *preds.next().unwrap();
                let mut intersection = dominators[&first].clone();
                for pred in preds {
                    intersection = intersection.intersection(&dominators[pred]).copied().collect();
                }
                new_dom.extend(intersection);
            }

            if dominators.get(&node.id) != Some(&new_dom) {
                dominators.insert(node.id, new_dom);
                changed = true;
            }
        }
    }

    dominators
}

/// Depth-first enumeration of entry-to-exit paths, capped at `max_paths`.
pub fn find_all_paths(cfg: &ControlFlowGraph, max_paths: usize) -> Vec<Vec<u32>> {
    let mut paths = Vec::new();
    dfs_paths(cfg, cfg.entry_node_id, &[], &mut paths, max_paths);
    paths
}

fn dfs_paths(cfg: &ControlFlowGraph, current_id: u32, current_path: &[u32], paths: &mut Vec<Vec<u32>>, max_paths: usize) {
    if paths.len() >= max_paths {
        return;
    }

    let mut path = current_path.to_vec();
    path.push(current_id);

    if cfg.exit_node_ids.contains(&current_id) {
        paths.push(path);
        return;
    }

    if let Some(node) = cfg.get_node(current_id) {
        for &succ_id in &node.successors {
            if paths.len() >= max_paths {
                break;
            }
            if !path.contains(&succ_id) {
                dfs_paths(cfg, succ_id, &path, paths, max_paths);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement;

    #[test]
    fn empty_body_yields_entry_exit_only() {
        let cfg = build("empty", &[]);
        assert_eq!(cfg.nodes.len(), 2);
        let entry = cfg.get_node(cfg.entry_node_id).unwrap();
        assert_eq!(entry.successors, vec![cfg.exit_node_ids[0]]);
    }

    #[test]
    fn linear_body_chains_statements_to_exit() {
        let stmts = statement::parse("let x = 1;\nlet y = x + 1;\nreturn y;", 1);
        let cfg = build("linear", &stmts);
        // entry, exit, let-x, let-y, return-y = 5 nodes
        assert_eq!(cfg.nodes.len(), 5);
        assert_eq!(cfg.exit_node_ids.len(), 1);
    }

    #[test]
    fn if_else_produces_two_paths() {
        let stmts = statement::parse(
            "if cond {\n    let a = 1;\n} else {\n    let a = 2;\n}\nreturn a;",
            1,
        );
        let cfg = build("branching", &stmts);
        let paths = find_all_paths(&cfg, 100);
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn edges_are_symmetric() {
        let stmts = statement::parse(
            "if cond {\n    let a = 1;\n} else {\n    let a = 2;\n}\nreturn a;",
            1,
        );
        let cfg = build("branching", &stmts);
        for node in &cfg.nodes {
            for &succ in &node.successors {
                let succ_node = cfg.get_node(succ).unwrap();
                assert!(succ_node.predecessors.contains(&node.id));
            }
        }
    }
}
