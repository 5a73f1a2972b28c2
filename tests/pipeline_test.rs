//! Black-box test driving the full pipeline (linker → façade) over a small
//! multi-file fixture, exercising the linker's three passes end to end.

use cairo_lint::ir::ContractKind;
use cairo_lint::{facade, Linker};

const TOKEN_SOURCE: &str = r#"
#[starknet::contract]
mod Token {
    use crate::utils::helpers::DoubleIt;

    #[storage]
    struct Storage {
        balance: felt252,
    }

    #[external(v0)]
    fn mint(ref self: ContractState, amount: felt252) {
        let current = self.balance.read();
        self.balance.write(current + amount);
    }

    #[view]
    fn get_balance(self: @ContractState) -> felt252 {
        let b = self.balance.read();
        return b;
    }
}
"#;

#[test]
fn linker_resolves_imports_across_files_and_stubs_the_rest() {
    let utils_source = "#[starknet::contract]\nmod helpers {\n    fn real_helper() {\n    }\n}\n";

    let mut linker = Linker::new();
    linker.link_files(&[
        ("project/src/token.cairo".into(), TOKEN_SOURCE.to_string()),
        ("project/src/utils/helpers.cairo".into(), utils_source.to_string()),
    ]);

    let token = linker.contracts().iter().find(|c| c.name == "Token").unwrap();
    assert_eq!(token.imports.len(), 1);
    let import = &token.imports[0];
    // The module path `crate::utils::helpers` has no `crate::` prefix in the
    // symbol table (module paths are computed relative to `src/`), so
    // resolution only succeeds via the crate::-stripping fallback.
    assert!(import.resolved);
    assert!(!import.stub_created);
    assert!(linker.stub_registry.is_empty());
}

#[test]
fn single_file_import_stubbing_scenario() {
    // Two files, one importing a symbol from a module that is never
    // provided: `resolved=false`, `stub_created=true`, and a one-entry stub
    // registry with a single stubbed function.
    let a_source = "#[starknet::contract]\nmod A {\n    use crate::b::Helper;\n}\n";

    let mut linker = Linker::new();
    linker.link_files(&[("project/src/a.cairo".into(), a_source.to_string())]);

    assert_eq!(linker.stub_registry.len(), 1);
    let stub_id = linker.stub_registry["crate::b"];
    let stub = linker.contract(stub_id);
    assert_eq!(stub.kind, ContractKind::Stub);
    assert_eq!(stub.functions.len(), 1);
    assert_eq!(stub.functions[0].name, "Helper");

    let a_contract = linker.contracts().iter().find(|c| c.name == "A").unwrap();
    assert!(!a_contract.imports[0].resolved);
    assert!(a_contract.imports[0].stub_created);
}

#[test]
fn facade_analyzes_every_function_and_flags_storage_access() {
    let mut linker = Linker::new();
    linker.link_files(&[("project/src/token.cairo".into(), TOKEN_SOURCE.to_string())]);

    let results = facade::analyze_contracts(linker.contracts(), 100);
    assert_eq!(results.len(), 1);
    let token_analysis = &results[0];
    assert_eq!(token_analysis.contract_name, "Token");
    assert_eq!(token_analysis.functions.len(), 2);

    let mint = token_analysis.functions.iter().find(|f| f.function_name == "mint").unwrap();
    assert!(mint.has_body);
    let dataflow = mint.dataflow.as_ref().unwrap();
    assert_eq!(dataflow.storage_accesses.len(), 2);

    let stats = facade::summary_stats(&results);
    assert_eq!(stats.total_contracts, 1);
    assert_eq!(stats.total_functions, 2);
    assert_eq!(stats.functions_with_body, 2);
    assert!(stats.total_storage_reads >= 2);
    assert!(stats.total_storage_writes >= 1);
}
