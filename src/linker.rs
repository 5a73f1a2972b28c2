//! Symbol linker (C4).
//!
//! Three passes over a set of already-read files, mirroring an object-file
//! linker: Pass 1 is symbol collection (GOT-like), Pass 2 is resolution via
//! table lookup, Pass 3 synthesizes jump-pad stubs (PLT-like) for anything
//! still missing so downstream analysis is never blocked on a missing
//! reference.
//!
//! Determinism (spec §5, §8): Pass 1's per-file extraction may run in
//! parallel (it is pure and order-independent), but the merge into the
//! symbol table happens strictly sequentially in input order, and Passes 2
//! and 3 never touch more than one thread. All exposed maps are `BTreeMap`
//! so iteration order — and therefore anything serialized from it — never
//! depends on hash scheduling.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::extract;
use crate::imports;
use crate::ir::{Contract, ContractId, ContractKind, Function, Import, Visibility};
use crate::version;

struct FileExtraction {
    file_path: String,
    file_stem: String,
    module_path: Option<String>,
    imports: Vec<Import>,
    contracts: Vec<Contract>,
}

#[derive(Default)]
pub struct Linker {
    arena: Vec<Contract>,
    pub symbol_table: BTreeMap<String, ContractId>,
    pub stub_registry: BTreeMap<String, ContractId>,
    /// Resolved import module_path -> file_path of the contract/module that
    /// resolved it (spec.md §6 "Stub report" `resolved` map).
    pub resolved_imports: BTreeMap<String, String>,
}

impl Linker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contract(&self, id: ContractId) -> &Contract {
        &self.arena[id.to_index()]
    }

    /// All contracts in arena (= registration) order, stub and non-stub alike.
    pub fn contracts(&self) -> &[Contract] {
        &self.arena
    }

    fn push_contract(&mut self, contract: Contract) -> ContractId {
        let id = ContractId::from_index(self.arena.len());
        self.arena.push(contract);
        id
    }

    /// Runs all three passes over `files` (path, source text), in the given
    /// order. Order matters only for last-write-wins symbol collisions and
    /// for iteration in `contracts()`.
    pub fn link_files(&mut self, files: &[(PathBuf, String)]) {
        let extractions: Vec<FileExtraction> = files
            .par_iter()
            .map(|(path, source)| extract_file(path, source))
            .collect();

        for extraction in extractions {
            self.register_file(extraction);
        }
        tracing::debug!("[Pass 1/3] symbol table built: {} symbols", self.symbol_table.len());

        self.resolve_imports();
        tracing::debug!("[Pass 2/3] resolved {} imports", self.resolved_imports.len());

        self.create_stubs();
        tracing::debug!("[Pass 3/3] created {} stubs", self.stub_registry.len());
    }

    fn register_file(&mut self, extraction: FileExtraction) {
        let FileExtraction { file_path, file_stem, module_path, imports, contracts } = extraction;

        if let Some(ref module_path) = module_path {
            let mut module_info = Contract::new(file_stem.clone(), file_path.clone(), ContractKind::Module);
            module_info.imports = imports.clone();
            let module_id = self.push_contract(module_info);
            self.symbol_table.insert(module_path.clone(), module_id);
            self.symbol_table.insert(file_stem.clone(), module_id);
        }

        for mut contract in contracts {
            contract.imports = imports.clone();
            let contract_name = contract.name.clone();
            let func_names: Vec<String> = contract.functions.iter().map(|f| f.name.clone()).collect();
            let id = self.push_contract(contract);

            self.symbol_table.insert(format!("{file_stem}::{contract_name}"), id);
            self.symbol_table.insert(contract_name.clone(), id);

            if let Some(ref module_path) = module_path {
                self.symbol_table.insert(format!("{module_path}::{contract_name}"), id);
                self.symbol_table.insert(module_path.clone(), id);
            }

            for func_name in &func_names {
                self.symbol_table.insert(format!("{file_stem}::{func_name}"), id);
                if let Some(ref module_path) = module_path {
                    self.symbol_table.insert(format!("{module_path}::{func_name}"), id);
                }
            }
            for func_name in &func_names {
                self.symbol_table.insert(func_name.clone(), id);
            }
        }
    }

    fn resolve_imports(&mut self) {
        for contract_idx in 0..self.arena.len() {
            let import_count = self.arena[contract_idx].imports.len();
            for import_idx in 0..import_count {
                self.resolve_one(contract_idx, import_idx);
            }
        }
    }

    fn resolve_one(&mut self, contract_idx: usize, import_idx: usize) {
        if self.arena[contract_idx].imports[import_idx].resolved {
            return;
        }
        let module_path = self.arena[contract_idx].imports[import_idx].module_path.clone();
        let symbols = self.arena[contract_idx].imports[import_idx].symbols.clone();

        if let Some(id) = self.symbol_table.get(&module_path).copied() {
            self.mark_resolved(contract_idx, import_idx, &module_path, id);
            return;
        }

        for symbol in &symbols {
            if let Some(id) = self.symbol_table.get(symbol).copied() {
                self.mark_resolved(contract_idx, import_idx, &module_path, id);
                return;
            }
        }

        if let Some(stripped) = module_path.strip_prefix("crate::") {
            if let Some(id) = self.symbol_table.get(stripped).copied() {
                self.mark_resolved(contract_idx, import_idx, &module_path, id);
                return;
            }
            let parts: Vec<&str> = stripped.split("::").collect();
            for i in 0..parts.len() {
                let partial = parts[..=i].join("::");
                if let Some(id) = self.symbol_table.get(&partial).copied() {
                    self.mark_resolved(contract_idx, import_idx, &module_path, id);
                    return;
                }
            }
        }
    }

    fn mark_resolved(&mut self, contract_idx: usize, import_idx: usize, module_path: &str, resolved_to: ContractId) {
        let imp = &mut self.arena[contract_idx].imports[import_idx];
        imp.resolved = true;
        imp.stub_created = false;
        let source_file = self.arena[resolved_to.to_index()].file_path.clone();
        self.resolved_imports.insert(module_path.to_string(), source_file);
    }

    fn create_stubs(&mut self) {
        let mut pending: Vec<(String, Vec<String>)> = Vec::new();
        for contract in &self.arena {
            for imp in &contract.imports {
                if !imp.resolved
                    && !self.stub_registry.contains_key(&imp.module_path)
                    && !pending.iter().any(|(path, _)| path == &imp.module_path)
                {
                    pending.push((imp.module_path.clone(), imp.symbols.clone()));
                }
            }
        }

        for (module_path, symbols) in pending {
            let stub_name = module_path.rsplit("::").next().unwrap_or(&module_path).to_string();
            let mut stub = Contract::new(stub_name, format!("<stub:{module_path}>"), ContractKind::Stub);
            for symbol in &symbols {
                stub.functions.push(Function {
                    name: symbol.clone(),
                    visibility: Visibility::External,
                    parameters: Vec::new(),
                    returns: Vec::new(),
                    decorators: vec!["stub".to_string()],
                    line: 0,
                    is_stub: true,
                    body: None,
                });
            }
            stub.parse_warnings.push(format!("stub created for missing module: {module_path}"));
            let stub_id = self.push_contract(stub);
            self.stub_registry.insert(module_path, stub_id);
        }

        // Every import still unresolved after the registry sweep gets
        // stub_created = true, even if its module_path was already stubbed
        // by an earlier import in this same pass — spec §8's "resolved ∨
        // stub_created" invariant is unconditional, unlike the narrower
        // per-creation flag in the original implementation.
        for contract_idx in 0..self.arena.len() {
            let import_count = self.arena[contract_idx].imports.len();
            for import_idx in 0..import_count {
                if !self.arena[contract_idx].imports[import_idx].resolved {
                    self.arena[contract_idx].imports[import_idx].stub_created = true;
                }
            }
        }

        let snapshot = self.stub_registry.clone();
        for contract in &mut self.arena {
            contract.stub_modules = snapshot.clone();
        }
    }
}

fn extract_file(path: &Path, source: &str) -> FileExtraction {
    let cairo_version = version::detect_version(source);
    let imports = imports::extract_imports(source, cairo_version);
    let file_path = path.to_string_lossy().to_string();
    let contracts = extract::extract_contracts(source, &file_path);
    let module_path = compute_module_path(path);
    let file_stem = path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();

    FileExtraction { file_path, file_stem, module_path, imports, contracts }
}

/// `starknet-contracts/src/components/upgradeable.cairo` ->
/// `components::upgradeable`.
fn compute_module_path(path: &Path) -> Option<String> {
    let components: Vec<_> = path.components().collect();
    let src_index = components.iter().position(|c| c.as_os_str() == "src")?;
    let mut module_parts: Vec<String> = components[src_index + 1..]
        .iter()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if module_parts.is_empty() {
        return None;
    }

    if let Some(last) = module_parts.last_mut() {
        if let Some(stripped) = last.strip_suffix(".cairo") {
            *last = stripped.to_string();
        }
    }

    Some(module_parts.join("::"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(pairs: &[(&str, &str)]) -> Vec<(PathBuf, String)> {
        pairs.iter().map(|(p, s)| (PathBuf::from(p), s.to_string())).collect()
    }

    #[test]
    fn module_path_computed_relative_to_src() {
        let path = Path::new("starknet-contracts/src/components/upgradeable.cairo");
        assert_eq!(compute_module_path(path).as_deref(), Some("components::upgradeable"));
    }

    #[test]
    fn module_path_none_without_src_ancestor() {
        assert_eq!(compute_module_path(Path::new("lib/foo.cairo")), None);
    }

    #[test]
    fn unresolved_import_becomes_stub() {
        let a_source = "#[starknet::contract]\nmod A {\n use crate::b::Helper;\n}\n";
        let mut linker = Linker::new();
        linker.link_files(&files(&[("project/src/a.cairo", a_source)]));

        assert_eq!(linker.stub_registry.len(), 1);
        assert!(linker.stub_registry.contains_key("crate::b"));

        let a_contract = linker.contracts().iter().find(|c| c.name == "A").unwrap();
        let imp = &a_contract.imports[0];
        assert!(!imp.resolved);
        assert!(imp.stub_created);

        let stub_id = linker.stub_registry["crate::b"];
        let stub = linker.contract(stub_id);
        assert_eq!(stub.functions.len(), 1);
        assert_eq!(stub.functions[0].name, "Helper");
    }

    #[test]
    fn import_resolves_against_symbol_table() {
        let a_source = "#[starknet::contract]\nmod A {\n use crate::b::Helper;\n}\n";
        let b_source = "#[starknet::contract]\nmod B {\n    fn helper_fn() {\n    }\n}\n";
        let mut linker = Linker::new();
        // `crate::b` resolves once the module itself is registered under that path.
        linker.link_files(&files(&[
            ("project/src/a.cairo", a_source),
            ("project/src/b.cairo", b_source),
        ]));

        let a_contract = linker.contracts().iter().find(|c| c.name == "A").unwrap();
        assert!(a_contract.imports[0].resolved);
        assert!(!a_contract.imports[0].stub_created);
    }

    #[test]
    fn every_import_ends_resolved_or_stubbed() {
        let source = "#[starknet::contract]\nmod A {\n use crate::missing::Thing;\n use other::missing::Thing;\n}\n";
        let mut linker = Linker::new();
        linker.link_files(&files(&[("project/src/a.cairo", source)]));

        for contract in linker.contracts() {
            for imp in &contract.imports {
                assert!(imp.resolved || imp.stub_created);
                assert!(!(imp.resolved && imp.stub_created));
            }
        }
    }
}
