//! JSON-serializable output records (ambient per SPEC_FULL.md §F).
//!
//! Thin `serde`-derived views over the core IR and façade results, one
//! `From` conversion per record, matching the original's `to_dict()` shapes
//! in `cairo_parser/analysis/serialization.py`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::dataflow;
use crate::facade;
use crate::ir;
use crate::linker::Linker;

#[derive(Debug, Serialize)]
pub struct CfgNodeReport {
    pub id: u32,
    pub kind: String,
    pub statement_kind: Option<String>,
    pub raw_text: Option<String>,
    pub successors: Vec<u32>,
    pub predecessors: Vec<u32>,
}

impl From<&ir::CfgNode> for CfgNodeReport {
    fn from(node: &ir::CfgNode) -> Self {
        CfgNodeReport {
            id: node.id,
            kind: node.kind.as_str().to_string(),
            statement_kind: node.statement.as_ref().map(|s| s.kind.as_str().to_string()),
            raw_text: node.statement.as_ref().map(|s| s.raw_text.clone()),
            successors: node.successors.clone(),
            predecessors: node.predecessors.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CfgReport {
    pub function_name: String,
    pub nodes: Vec<CfgNodeReport>,
    pub entry_node_id: u32,
    pub exit_node_ids: Vec<u32>,
}

impl From<&ir::ControlFlowGraph> for CfgReport {
    fn from(graph: &ir::ControlFlowGraph) -> Self {
        CfgReport {
            function_name: graph.function_name.clone(),
            nodes: graph.nodes.iter().map(CfgNodeReport::from).collect(),
            entry_node_id: graph.entry_node_id,
            exit_node_ids: graph.exit_node_ids.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DefUseChainReport {
    pub variable: String,
    pub definitions: Vec<u32>,
    pub uses: Vec<u32>,
}

impl From<&dataflow::DefUseChain> for DefUseChainReport {
    fn from(chain: &dataflow::DefUseChain) -> Self {
        DefUseChainReport {
            variable: chain.variable.clone(),
            definitions: chain.definitions.clone(),
            uses: chain.uses.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StorageAccessReport {
    pub storage_var: String,
    pub access_kind: String,
    pub node_id: u32,
    pub line: usize,
    pub value: Option<String>,
}

impl From<&dataflow::StorageAccess> for StorageAccessReport {
    fn from(access: &dataflow::StorageAccess) -> Self {
        StorageAccessReport {
            storage_var: access.storage_var.clone(),
            access_kind: access.access_kind.as_str().to_string(),
            node_id: access.node_id,
            line: access.line,
            value: access.value.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExternalCallReport {
    pub function_name: String,
    pub arguments: Vec<String>,
    pub node_id: u32,
    pub line: usize,
    pub is_external: bool,
}

impl From<&dataflow::ExternalCall> for ExternalCallReport {
    fn from(call: &dataflow::ExternalCall) -> Self {
        ExternalCallReport {
            function_name: call.function_name.clone(),
            arguments: call.arguments.clone(),
            node_id: call.node_id,
            line: call.line,
            is_external: call.is_external,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DataflowReport {
    pub def_use_chains: Vec<DefUseChainReport>,
    pub storage_accesses: Vec<StorageAccessReport>,
    pub external_calls: Vec<ExternalCallReport>,
}

impl From<&dataflow::DataflowReport> for DataflowReport {
    fn from(report: &dataflow::DataflowReport) -> Self {
        DataflowReport {
            def_use_chains: report.def_use_chains.iter().map(DefUseChainReport::from).collect(),
            storage_accesses: report.storage_accesses.iter().map(StorageAccessReport::from).collect(),
            external_calls: report.external_calls.iter().map(ExternalCallReport::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WarningReport {
    pub kind: String,
    pub message: String,
    pub line: Option<u32>,
}

impl From<&ir::Warning> for WarningReport {
    fn from(warning: &ir::Warning) -> Self {
        WarningReport {
            kind: warning.kind.as_str().to_string(),
            message: warning.message.clone(),
            line: warning.line.map(|l| l as u32),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FunctionAnalysisReport {
    pub function_name: String,
    pub has_body: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cfg: Option<CfgReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataflow: Option<DataflowReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<Vec<u32>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<WarningReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl From<&facade::FunctionAnalysis> for FunctionAnalysisReport {
    fn from(analysis: &facade::FunctionAnalysis) -> Self {
        FunctionAnalysisReport {
            function_name: analysis.function_name.clone(),
            has_body: analysis.has_body,
            cfg: analysis.cfg.as_ref().map(CfgReport::from),
            dataflow: analysis.dataflow.as_ref().map(DataflowReport::from),
            paths: analysis.paths.clone(),
            warnings: analysis.warnings.iter().map(WarningReport::from).collect(),
            errors: analysis.errors.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContractReport {
    pub contract: String,
    pub file_path: String,
    pub functions: Vec<FunctionAnalysisReport>,
}

impl From<&facade::ContractAnalysis> for ContractReport {
    fn from(analysis: &facade::ContractAnalysis) -> Self {
        ContractReport {
            contract: analysis.contract_name.clone(),
            file_path: analysis.file_path.clone(),
            functions: analysis.functions.iter().map(FunctionAnalysisReport::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Default)]
pub struct SummaryReport {
    pub total_contracts: usize,
    pub total_functions: usize,
    pub functions_with_body: usize,
    pub functions_without_body: usize,
    pub total_warnings: usize,
    pub total_errors: usize,
    pub total_storage_reads: usize,
    pub total_storage_writes: usize,
    pub total_external_calls: usize,
}

impl From<facade::SummaryStats> for SummaryReport {
    fn from(stats: facade::SummaryStats) -> Self {
        SummaryReport {
            total_contracts: stats.total_contracts,
            total_functions: stats.total_functions,
            functions_with_body: stats.functions_with_body,
            functions_without_body: stats.functions_without_body,
            total_warnings: stats.total_warnings,
            total_errors: stats.total_errors,
            total_storage_reads: stats.total_storage_reads,
            total_storage_writes: stats.total_storage_writes,
            total_external_calls: stats.total_external_calls,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub contracts: Vec<ContractReport>,
    pub summary: SummaryReport,
}

#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub module_path: String,
    pub symbols: Vec<String>,
    pub line: usize,
    pub resolved: bool,
    pub stub_created: bool,
}

impl From<&ir::Import> for ImportReport {
    fn from(import: &ir::Import) -> Self {
        ImportReport {
            module_path: import.module_path.clone(),
            symbols: import.symbols.clone(),
            line: import.line,
            resolved: import.resolved,
            stub_created: import.stub_created,
        }
    }
}

/// Contract IR output (spec.md §6): one record per contract, carrying
/// everything the linker's three passes produced for it.
#[derive(Debug, Serialize)]
pub struct ContractIrReport {
    pub name: String,
    pub file_path: String,
    pub kind: String,
    pub functions: Vec<String>,
    pub storage_vars: Vec<String>,
    pub events: Vec<String>,
    pub imports: Vec<ImportReport>,
    pub unresolved_calls: Vec<String>,
    pub unresolved_types: Vec<String>,
    pub stub_modules: Vec<String>,
    pub parse_warnings: Vec<String>,
    pub parse_errors: Vec<String>,
}

impl From<&ir::Contract> for ContractIrReport {
    fn from(contract: &ir::Contract) -> Self {
        ContractIrReport {
            name: contract.name.clone(),
            file_path: contract.file_path.clone(),
            kind: contract.kind.as_str().to_string(),
            functions: contract.functions.iter().map(|f| f.name.clone()).collect(),
            storage_vars: contract.storage_vars.iter().map(|v| v.name.clone()).collect(),
            events: contract.events.iter().map(|e| e.name.clone()).collect(),
            imports: contract.imports.iter().map(ImportReport::from).collect(),
            // `BTreeSet` already iterates sorted; spec.md §6 only requires
            // these be treated as unordered, not that order be preserved.
            unresolved_calls: contract.unresolved_calls.iter().cloned().collect(),
            unresolved_types: contract.unresolved_types.iter().cloned().collect(),
            stub_modules: contract.stub_modules.keys().cloned().collect(),
            parse_warnings: contract.parse_warnings.clone(),
            parse_errors: contract.parse_errors.clone(),
        }
    }
}

/// Stub report (spec.md §6): stub registry statistics plus the full
/// resolved-imports map, matching the original's `get_stub_report()` shape
/// field for field.
#[derive(Debug, Serialize)]
pub struct StubEntry {
    pub file_path: String,
    pub functions: usize,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StubReport {
    pub total_stubs: usize,
    pub total_resolved: usize,
    pub total_symbols: usize,
    pub stubbed_modules: Vec<String>,
    pub resolved_modules: Vec<String>,
    pub stubs: BTreeMap<String, StubEntry>,
    pub resolved: BTreeMap<String, String>,
}

pub fn build_stub_report(linker: &Linker) -> StubReport {
    let stubs: BTreeMap<String, StubEntry> = linker
        .stub_registry
        .iter()
        .map(|(module_path, id)| {
            let contract = linker.contract(*id);
            let entry = StubEntry {
                file_path: contract.file_path.clone(),
                functions: contract.functions.len(),
                warnings: contract.parse_warnings.clone(),
            };
            (module_path.clone(), entry)
        })
        .collect();

    StubReport {
        total_stubs: linker.stub_registry.len(),
        total_resolved: linker.resolved_imports.len(),
        total_symbols: linker.symbol_table.len(),
        stubbed_modules: linker.stub_registry.keys().cloned().collect(),
        resolved_modules: linker.resolved_imports.keys().cloned().collect(),
        stubs,
        resolved: linker.resolved_imports.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Function, Visibility};

    #[test]
    fn function_without_body_serializes_without_cfg() {
        let function = Function {
            name: "f".to_string(),
            visibility: Visibility::External,
            parameters: Vec::new(),
            returns: Vec::new(),
            decorators: Vec::new(),
            line: 1,
            is_stub: true,
            body: None,
        };
        let analysis = facade::analyze_function(&function, 100);
        let report = FunctionAnalysisReport::from(&analysis);
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("\"cfg\""));
        assert!(json.contains("no_body"));
    }

    #[test]
    fn stub_report_lists_stub_registry_entries() {
        let mut linker = Linker::new();
        linker.link_files(&[(
            "project/src/a.cairo".into(),
            "#[starknet::contract]\nmod A {\n use crate::b::do_thing;\n}\n".to_string(),
        )]);

        let report = build_stub_report(&linker);
        assert_eq!(report.total_stubs, 1);
        assert_eq!(report.stubbed_modules, vec!["crate::b".to_string()]);
        let entry = report.stubs.get("crate::b").unwrap();
        assert!(entry.file_path.starts_with("<stub:"));
        assert_eq!(entry.functions, 1);
        assert_eq!(report.total_symbols, linker.symbol_table.len());
    }

    #[test]
    fn stub_report_tracks_resolved_imports_map() {
        let a_source = "#[starknet::contract]\nmod A {\n use crate::b::Helper;\n}\n";
        let b_source = "#[starknet::contract]\nmod B {\n    fn helper_fn() {\n    }\n}\n";
        let mut linker = Linker::new();
        linker.link_files(&[
            ("project/src/a.cairo".into(), a_source.to_string()),
            ("project/src/b.cairo".into(), b_source.to_string()),
        ]);

        let report = build_stub_report(&linker);
        assert_eq!(report.total_stubs, 0);
        assert_eq!(report.total_resolved, 1);
        assert_eq!(report.resolved_modules, vec!["crate::b".to_string()]);
        assert_eq!(report.resolved.get("crate::b").unwrap(), "project/src/b.cairo");
    }

    #[test]
    fn contract_ir_report_carries_every_field() {
        let mut linker = Linker::new();
        linker.link_files(&[(
            "project/src/token.cairo".into(),
            "#[starknet::contract]\nmod Token {\n    use crate::b::Helper;\n\n    #[storage]\n    struct Storage {\n        balance: felt252,\n    }\n\n    #[external(v0)]\n    fn mint(ref self: ContractState) {\n        self.balance.write(1);\n    }\n}\n"
                .to_string(),
        )]);

        let contract = linker.contracts().iter().find(|c| c.name == "Token").unwrap();
        let ir_report = ContractIrReport::from(contract);

        assert_eq!(ir_report.name, "Token");
        assert_eq!(ir_report.kind, "contract");
        assert_eq!(ir_report.functions, vec!["mint".to_string()]);
        assert_eq!(ir_report.storage_vars, vec!["balance".to_string()]);
        assert_eq!(ir_report.imports.len(), 1);
        assert_eq!(ir_report.imports[0].module_path, "crate::b");
        assert!(ir_report.imports[0].stub_created);
        assert!(!ir_report.imports[0].resolved);
        assert_eq!(ir_report.stub_modules, vec!["crate::b".to_string()]);
    }
}
