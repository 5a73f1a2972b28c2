//! Core data model for the analysis pipeline.
//!
//! Every downstream component (the linker, the statement parser, the CFG
//! builder, the dataflow analyzer) reads and writes these types. Nothing in
//! this module performs extraction or analysis — it only shapes the data.

use std::collections::BTreeMap;
use std::num::NonZeroU32;

/// Index into a `Linker`'s contract arena. Never constructed directly outside
/// this crate; `Linker::push_contract` is the only producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContractId(NonZeroU32);

impl ContractId {
    pub(crate) fn from_index(index: usize) -> Self {
        let raw = u32::try_from(index + 1).expect("contract arena index overflow");
        ContractId(NonZeroU32::new(raw).expect("index + 1 is never zero"))
    }

    pub(crate) fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractKind {
    Contract,
    Interface,
    Module,
    Stub,
}

impl ContractKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractKind::Contract => "contract",
            ContractKind::Interface => "interface",
            ContractKind::Module => "module",
            ContractKind::Stub => "stub",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    External,
    View,
    Internal,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::External => "external",
            Visibility::View => "view",
            Visibility::Internal => "internal",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub ty: String,
}

/// A function's body text plus its 1-based line span. See `Function`'s
/// presence invariant: a body exists iff `end_line >= start_line`.
#[derive(Debug, Clone)]
pub struct FunctionBody {
    pub text: String,
    pub start_line: usize,
    pub end_line: usize,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub visibility: Visibility,
    pub parameters: Vec<Parameter>,
    pub returns: Vec<String>,
    pub decorators: Vec<String>,
    pub line: usize,
    pub is_stub: bool,
    pub body: Option<FunctionBody>,
}

impl Function {
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct StorageVariable {
    pub name: String,
    pub ty: String,
    pub line: usize,
    pub is_stub: bool,
}

#[derive(Debug, Clone)]
pub struct Event {
    pub name: String,
    pub fields: Vec<String>,
    pub line: usize,
    pub is_stub: bool,
}

#[derive(Debug, Clone)]
pub struct Import {
    pub module_path: String,
    /// Empty means module-level or wildcard import.
    pub symbols: Vec<String>,
    pub line: usize,
    pub resolved: bool,
    pub stub_created: bool,
}

impl Import {
    pub fn new(module_path: String, symbols: Vec<String>, line: usize) -> Self {
        Import {
            module_path,
            symbols,
            line,
            resolved: false,
            stub_created: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Contract {
    pub name: String,
    pub file_path: String,
    pub kind: ContractKind,
    pub functions: Vec<Function>,
    pub storage_vars: Vec<StorageVariable>,
    pub events: Vec<Event>,
    pub imports: Vec<Import>,
    pub unresolved_calls: std::collections::BTreeSet<String>,
    pub unresolved_types: std::collections::BTreeSet<String>,
    /// Populated after Pass 3 with the whole stub registry, mirroring every
    /// contract getting a copy of the linker's stub map.
    pub stub_modules: BTreeMap<String, ContractId>,
    pub parse_warnings: Vec<String>,
    pub parse_errors: Vec<String>,
}

impl Contract {
    pub fn new(name: String, file_path: String, kind: ContractKind) -> Self {
        Contract {
            name,
            file_path,
            kind,
            functions: Vec::new(),
            storage_vars: Vec::new(),
            events: Vec::new(),
            imports: Vec::new(),
            unresolved_calls: std::collections::BTreeSet::new(),
            unresolved_types: std::collections::BTreeSet::new(),
            stub_modules: BTreeMap::new(),
            parse_warnings: Vec::new(),
            parse_errors: Vec::new(),
        }
    }
}

/// A single parsed statement. `block_depth` is set by the statement parser
/// (`crate::statement`) following the convention pinned in spec §4.5: control
/// headers (if/else/match) are recorded at the depth they are nested *into*;
/// their bodies live one level deeper.
#[derive(Debug, Clone)]
pub struct Statement {
    pub kind: StatementKind,
    pub line: usize,
    pub raw_text: String,
    pub block_depth: usize,
}

#[derive(Debug, Clone)]
pub enum StatementKind {
    LetBinding {
        variable: String,
        expression: String,
        is_mutable: bool,
    },
    Assignment {
        variable: String,
        expression: String,
    },
    If {
        condition: String,
        has_else: bool,
    },
    Else {
        is_else_if: bool,
        condition: Option<String>,
    },
    Match {
        expression: String,
        arms: Vec<(String, String)>,
    },
    Return {
        expression: Option<String>,
    },
    Call {
        function_name: String,
        arguments: Vec<String>,
        is_external: bool,
    },
    StorageRead {
        storage_var: String,
    },
    StorageWrite {
        storage_var: String,
        value: String,
    },
    Assert {
        condition: String,
        message: Option<String>,
    },
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::LetBinding { .. } => "let_binding",
            StatementKind::Assignment { .. } => "assignment",
            StatementKind::If { .. } => "if",
            StatementKind::Else { .. } => "else",
            StatementKind::Match { .. } => "match",
            StatementKind::Return { .. } => "return",
            StatementKind::Call { .. } => "call",
            StatementKind::StorageRead { .. } => "storage_read",
            StatementKind::StorageWrite { .. } => "storage_write",
            StatementKind::Assert { .. } => "assert",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CfgNodeKind {
    Entry,
    Exit,
    Statement,
    Branch,
    Merge,
    LoopHeader,
}

impl CfgNodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CfgNodeKind::Entry => "entry",
            CfgNodeKind::Exit => "exit",
            CfgNodeKind::Statement => "statement",
            CfgNodeKind::Branch => "branch",
            CfgNodeKind::Merge => "merge",
            CfgNodeKind::LoopHeader => "loop_header",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CfgNode {
    pub id: u32,
    pub kind: CfgNodeKind,
    pub statement: Option<Statement>,
    pub successors: Vec<u32>,
    pub predecessors: Vec<u32>,
}

/// A lint-style warning attached to a function analysis record (spec §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningKind {
    NoBody,
    NoStatements,
    Uninitialized,
    UnusedDef,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::NoBody => "no_body",
            WarningKind::NoStatements => "no_statements",
            WarningKind::Uninitialized => "uninitialized",
            WarningKind::UnusedDef => "unused_def",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
    pub line: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ControlFlowGraph {
    pub function_name: String,
    pub nodes: Vec<CfgNode>,
    pub entry_node_id: u32,
    pub exit_node_ids: Vec<u32>,
}

impl ControlFlowGraph {
    pub fn get_node(&self, id: u32) -> Option<&CfgNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn get_node_mut(&mut self, id: u32) -> Option<&mut CfgNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Adds an edge, keeping predecessor/successor lists consistent
    /// (spec §3 CFGNode invariant: `b ∈ succ(a) ⇔ a ∈ pred(b)`).
    pub fn add_edge(&mut self, from_id: u32, to_id: u32) {
        let has_from = self.get_node(from_id).is_some();
        let has_to = self.get_node(to_id).is_some();
        if !(has_from && has_to) {
            return;
        }
        if let Some(from) = self.get_node_mut(from_id) {
            if !from.successors.contains(&to_id) {
                from.successors.push(to_id);
            }
        }
        if let Some(to) = self.get_node_mut(to_id) {
            if !to.predecessors.contains(&from_id) {
                to.predecessors.push(from_id);
            }
        }
    }
}
