//! Dataflow analyzer (C7).
//!
//! Operates exclusively over a finished CFG plus the statement parser's
//! def/use helpers. Every map iterates in sorted key order so serialized
//! output is reproducible (spec §9 "Determinism").

use std::collections::{BTreeMap, BTreeSet};

use crate::ir::{ControlFlowGraph, StatementKind, Warning, WarningKind};
use crate::statement;

#[derive(Debug, Clone)]
pub struct DefUseChain {
    pub variable: String,
    pub definitions: Vec<u32>,
    pub uses: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
}

impl AccessKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessKind::Read => "read",
            AccessKind::Write => "write",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageAccess {
    pub storage_var: String,
    pub access_kind: AccessKind,
    pub node_id: u32,
    pub line: usize,
    pub value: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ExternalCall {
    pub function_name: String,
    pub arguments: Vec<String>,
    pub node_id: u32,
    pub line: usize,
    pub is_external: bool,
}

/// All three inventories plus the two lint passes, bundled the way the
/// façade (C8) wants to package a function's analysis.
#[derive(Debug, Clone)]
pub struct DataflowReport {
    pub def_use_chains: Vec<DefUseChain>,
    pub storage_accesses: Vec<StorageAccess>,
    pub external_calls: Vec<ExternalCall>,
}

pub fn analyze_def_use_chains(cfg: &ControlFlowGraph) -> Vec<DefUseChain> {
    let mut var_defs: BTreeMap<String, Vec<u32>> = BTreeMap::new();
    let mut var_uses: BTreeMap<String, Vec<u32>> = BTreeMap::new();

    for node in &cfg.nodes {
        let Some(stmt) = &node.statement else { continue };

        for var in statement::extract_variables_defined(stmt) {
            var_defs.entry(var).or_default().push(node.id);
        }
        for var in statement::extract_variables_used(stmt) {
            var_uses.entry(var).or_default().push(node.id);
        }
    }

    let all_vars: BTreeSet<&String> = var_defs.keys().chain(var_uses.keys()).collect();
    all_vars
        .into_iter()
        .map(|var| DefUseChain {
            variable: var.clone(),
            definitions: var_defs.get(var).cloned().unwrap_or_default(),
            uses: var_uses.get(var).cloned().unwrap_or_default(),
        })
        .collect()
}

pub fn analyze_storage_access(cfg: &ControlFlowGraph) -> Vec<StorageAccess> {
    let mut accesses = Vec::new();
    for node in &cfg.nodes {
        let Some(stmt) = &node.statement else { continue };
        match &stmt.kind {
            StatementKind::StorageRead { storage_var } => accesses.push(StorageAccess {
                storage_var: storage_var.clone(),
                access_kind: AccessKind::Read,
                node_id: node.id,
                line: stmt.line,
                value: None,
            }),
            StatementKind::StorageWrite { storage_var, value } => accesses.push(StorageAccess {
                storage_var: storage_var.clone(),
                access_kind: AccessKind::Write,
                node_id: node.id,
                line: stmt.line,
                value: Some(value.clone()),
            }),
            _ => {}
        }
    }
    accesses
}

pub fn analyze_external_calls(cfg: &ControlFlowGraph) -> Vec<ExternalCall> {
    let mut calls = Vec::new();
    for node in &cfg.nodes {
        let Some(stmt) = &node.statement else { continue };
        if let StatementKind::Call { function_name, arguments, is_external } = &stmt.kind {
            calls.push(ExternalCall {
                function_name: function_name.clone(),
                arguments: arguments.clone(),
                node_id: node.id,
                line: stmt.line,
                is_external: *is_external,
            });
        }
    }
    calls
}

pub fn analyze_all(cfg: &ControlFlowGraph) -> DataflowReport {
    DataflowReport {
        def_use_chains: analyze_def_use_chains(cfg),
        storage_accesses: analyze_storage_access(cfg),
        external_calls: analyze_external_calls(cfg),
    }
}

const MAX_ITERATIONS: usize = 100;

/// Forward iterative reaching-definitions, returning `in[n]` per node.
/// Bounded at 100 iterations as a non-termination safeguard (spec §4.7).
pub fn compute_reaching_definitions(cfg: &ControlFlowGraph) -> BTreeMap<u32, BTreeSet<(String, u32)>> {
    let mut reaching_in: BTreeMap<u32, BTreeSet<(String, u32)>> = BTreeMap::new();
    let mut reaching_out: BTreeMap<u32, BTreeSet<(String, u32)>> = BTreeMap::new();

    for node in &cfg.nodes {
        reaching_in.insert(node.id, BTreeSet::new());
        reaching_out.insert(node.id, BTreeSet::new());
    }

    let mut changed = true;
    let mut iterations = 0;
    while changed && iterations < MAX_ITERATIONS {
        changed = false;
        iterations += 1;

        for node in &cfg.nodes {
            let mut new_in = BTreeSet::new();
            for pred_id in &node.predecessors {
                if let Some(out_set) = reaching_out.get(pred_id) {
                    new_in.extend(out_set.iter().cloned());
                }
            }
            if new_in != reaching_in[&node.id] {
                reaching_in.insert(node.id, new_in.clone());
                changed = true;
            }

            let gen_set = gen_definitions(node);
            let kill_set = kill_definitions(node, &reaching_in[&node.id]);

            let mut new_out: BTreeSet<(String, u32)> =
                reaching_in[&node.id].difference(&kill_set).cloned().collect();
            new_out.extend(gen_set);

            if new_out != reaching_out[&node.id] {
                reaching_out.insert(node.id, new_out);
                changed = true;
            }
        }
    }

    reaching_in
}

fn gen_definitions(node: &crate::ir::CfgNode) -> BTreeSet<(String, u32)> {
    let Some(stmt) = &node.statement else { return BTreeSet::new() };
    statement::extract_variables_defined(stmt)
        .into_iter()
        .map(|v| (v, node.id))
        .collect()
}

fn kill_definitions(node: &crate::ir::CfgNode, reaching: &BTreeSet<(String, u32)>) -> BTreeSet<(String, u32)> {
    let Some(stmt) = &node.statement else { return BTreeSet::new() };
    let defined: BTreeSet<String> = statement::extract_variables_defined(stmt).into_iter().collect();
    reaching
        .iter()
        .filter(|(var, def_node)| defined.contains(var) && *def_node != node.id)
        .cloned()
        .collect()
}

/// Warns on every use with no reaching definition. Function parameters are
/// *not* pre-seeded into `in[entry]` in this release (spec §4.7, §9 — a
/// known false-positive source for parameter reads).
pub fn find_uninitialized_variables(cfg: &ControlFlowGraph) -> Vec<Warning> {
    let mut warnings = Vec::new();
    let reaching = compute_reaching_definitions(cfg);

    for node in &cfg.nodes {
        let Some(stmt) = &node.statement else { continue };
        let used_vars = statement::extract_variables_used(stmt);
        let in_set = reaching.get(&node.id);

        for var in used_vars {
            let has_definition = in_set.is_some_and(|set| set.iter().any(|(v, _)| *v == var));
            if !has_definition {
                warnings.push(Warning {
                    kind: WarningKind::Uninitialized,
                    message: format!("variable '{var}' may be used before initialization"),
                    line: Some(stmt.line),
                });
            }
        }
    }

    warnings
}

/// Warns on every variable whose def-use chain has definitions but no uses.
pub fn find_unused_definitions(cfg: &ControlFlowGraph) -> Vec<Warning> {
    analyze_def_use_chains(cfg)
        .into_iter()
        .filter(|chain| !chain.definitions.is_empty() && chain.uses.is_empty())
        .map(|chain| Warning {
            kind: WarningKind::UnusedDef,
            message: format!("variable '{}' is defined but never used", chain.variable),
            line: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cfg, statement};

    #[test]
    fn def_use_chain_links_let_to_return() {
        let stmts = statement::parse("let x = 1;\nlet y = x + 1;\nreturn y;", 1);
        let graph = cfg::build("f", &stmts);
        let chains = analyze_def_use_chains(&graph);

        let x_chain = chains.iter().find(|c| c.variable == "x").unwrap();
        let y_chain = chains.iter().find(|c| c.variable == "y").unwrap();
        assert_eq!(x_chain.definitions.len(), 1);
        assert_eq!(x_chain.uses.len(), 1);
        assert_eq!(y_chain.definitions.len(), 1);
        assert_eq!(y_chain.uses.len(), 1);
    }

    #[test]
    fn storage_access_records_read_and_write() {
        // The `self.` guard takes priority over let-binding, so the first
        // line is classified as a storage_read, not a let-binding — matching
        // the original parser's priority order (spec §4.5).
        let stmts = statement::parse("let v = self.counter.read();\nself.counter.write(v + 1);", 1);
        let graph = cfg::build("f", &stmts);
        let accesses = analyze_storage_access(&graph);
        assert_eq!(accesses.len(), 2);
        assert_eq!(accesses[0].access_kind, AccessKind::Read);
        assert_eq!(accesses[1].access_kind, AccessKind::Write);
    }

    #[test]
    fn external_call_flagged_via_dispatcher() {
        let stmts = statement::parse("IErc20Dispatcher { address: a }.transfer(to, amt);", 1);
        let graph = cfg::build("f", &stmts);
        let calls = analyze_external_calls(&graph);
        assert_eq!(calls.len(), 1);
        assert!(calls[0].is_external);
    }

    #[test]
    fn unused_definition_is_flagged() {
        let stmts = statement::parse("let x = 1;\nreturn 0;", 1);
        let graph = cfg::build("f", &stmts);
        let warnings = find_unused_definitions(&graph);
        assert!(warnings.iter().any(|w| w.message.contains('x')));
    }

    #[test]
    fn reaching_definitions_terminate_within_iteration_cap() {
        let stmts = statement::parse(
            "if cond {\n    let a = 1;\n} else {\n    let a = 2;\n}\nreturn a;",
            1,
        );
        let graph = cfg::build("f", &stmts);
        // Should not panic or loop forever; a well-formed small CFG converges immediately.
        let reaching = compute_reaching_definitions(&graph);
        assert!(!reaching.is_empty());
    }
}
