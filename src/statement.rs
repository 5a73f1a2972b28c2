//! Statement parser (C5).
//!
//! Turns a function body's raw text into a stream of typed `Statement`s with
//! lexical block depth annotated. See `ir::Statement` for the pinned
//! block-depth convention (control headers at the outer depth, bodies at
//! outer+1) — this is load-bearing for the CFG builder's block extraction.

use std::sync::LazyLock;

use regex::Regex;

use crate::ir::{Statement, StatementKind};

static STORAGE_WRITE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"self\.(\w+)\.write\(([^)]+)\)").unwrap());
static STORAGE_READ: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"self\.(\w+)\.read\(\)").unwrap());
static IF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"if\s+([^{]+)\s*\{").unwrap());
static ELSE_IF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\}\s*else\s+if\s+([^{]+)\s*\{").unwrap());
static ELSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\}\s*else\s*\{").unwrap());
static MATCH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"match\s+([^{]+)\s*\{").unwrap());
static RETURN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"return\s+([^;]+);|return;").unwrap());
static ASSERT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"assert!?\s*\(([^)]+)\)").unwrap());
static LET_BINDING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"let\s+(mut\s+)?(\w+)\s*=\s*([^;]+);").unwrap());
static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\w+)\s*=\s*([^;]+);").unwrap());
static FUNCTION_CALL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\w+)\s*\(([^)]*)\)").unwrap());
static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\b").unwrap());

const STOPWORDS: [&str; 7] = ["let", "mut", "if", "else", "match", "return", "true"];
const STOPWORDS_EXTRA: [&str; 2] = ["false", "self"];

fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word) || STOPWORDS_EXTRA.contains(&word)
}

/// Parses a function body into statements, tracking lexical block depth as
/// it goes. `start_line` is the 1-based line the body text begins at.
pub fn parse(function_body: &str, start_line: usize) -> Vec<Statement> {
    let mut statements = Vec::new();
    let mut current_depth: i64 = 0;

    for (i, line) in function_body.split('\n').enumerate() {
        let line_num = start_line + i;
        let open_count = line.matches('{').count() as i64;
        let close_count = line.matches('}').count() as i64;

        if let Some(mut stmt) = parse_line(line, line_num) {
            stmt.block_depth = match &stmt.kind {
                StatementKind::If { .. } | StatementKind::Else { .. } | StatementKind::Match { .. } => {
                    current_depth.max(0) as usize
                }
                _ => (current_depth + if line.contains('{') { 1 } else { 0 }).max(0) as usize,
            };
            statements.push(stmt);
        }

        current_depth += open_count - close_count;
    }

    statements
}

fn parse_line(line: &str, line_num: usize) -> Option<Statement> {
    let stripped = line.trim();
    if stripped.is_empty() || stripped.starts_with("//") {
        return None;
    }

    if stripped.contains("self.") {
        if let Some(caps) = STORAGE_WRITE.captures(stripped) {
            return Some(stmt(
                StatementKind::StorageWrite {
                    storage_var: caps[1].to_string(),
                    value: caps[2].to_string(),
                },
                line_num,
                stripped,
            ));
        }
        if let Some(caps) = STORAGE_READ.captures(stripped) {
            return Some(stmt(
                StatementKind::StorageRead { storage_var: caps[1].to_string() },
                line_num,
                stripped,
            ));
        }
    }

    if let Some(caps) = IF.captures(stripped) {
        return Some(stmt(
            StatementKind::If { condition: caps[1].trim().to_string(), has_else: false },
            line_num,
            stripped,
        ));
    }

    if let Some(caps) = ELSE_IF.captures(stripped) {
        return Some(stmt(
            StatementKind::Else { is_else_if: true, condition: Some(caps[1].trim().to_string()) },
            line_num,
            stripped,
        ));
    }

    if ELSE.is_match(stripped) {
        return Some(stmt(
            StatementKind::Else { is_else_if: false, condition: None },
            line_num,
            stripped,
        ));
    }

    if let Some(caps) = MATCH.captures(stripped) {
        return Some(stmt(
            StatementKind::Match { expression: caps[1].trim().to_string(), arms: Vec::new() },
            line_num,
            stripped,
        ));
    }

    if let Some(caps) = RETURN.captures(stripped) {
        let expression = caps.get(1).map(|m| m.as_str().to_string());
        return Some(stmt(StatementKind::Return { expression }, line_num, stripped));
    }

    if let Some(caps) = ASSERT.captures(stripped) {
        return Some(stmt(
            StatementKind::Assert { condition: caps[1].to_string(), message: None },
            line_num,
            stripped,
        ));
    }

    if let Some(caps) = LET_BINDING.captures(stripped) {
        return Some(stmt(
            StatementKind::LetBinding {
                variable: caps[2].to_string(),
                expression: caps[3].trim().to_string(),
                is_mutable: caps.get(1).is_some(),
            },
            line_num,
            stripped,
        ));
    }

    if let Some(caps) = ASSIGNMENT.captures(stripped) {
        return Some(stmt(
            StatementKind::Assignment {
                variable: caps[1].to_string(),
                expression: caps[2].trim().to_string(),
            },
            line_num,
            stripped,
        ));
    }

    if let Some(caps) = FUNCTION_CALL.captures(stripped) {
        let function_name = caps[1].to_string();
        let arguments: Vec<String> = caps[2]
            .split(',')
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        let lower = stripped.to_lowercase();
        let is_external = lower.contains("dispatcher") || stripped.contains("::");
        return Some(stmt(
            StatementKind::Call { function_name, arguments, is_external },
            line_num,
            stripped,
        ));
    }

    None
}

fn stmt(kind: StatementKind, line: usize, raw_text: &str) -> Statement {
    Statement { kind, line, raw_text: raw_text.to_string(), block_depth: 0 }
}

/// Identifiers used on the right-hand side of a statement (§4.5).
pub fn extract_variables_used(statement: &Statement) -> Vec<String> {
    match &statement.kind {
        StatementKind::LetBinding { expression, .. } | StatementKind::Assignment { expression, .. } => {
            extract_vars_from_expr(expression)
        }
        StatementKind::If { condition, .. } => extract_vars_from_expr(condition),
        StatementKind::Return { expression: Some(expr) } => extract_vars_from_expr(expr),
        StatementKind::Call { arguments, .. } => {
            arguments.iter().flat_map(|a| extract_vars_from_expr(a)).collect()
        }
        StatementKind::StorageWrite { value, .. } => extract_vars_from_expr(value),
        _ => Vec::new(),
    }
}

/// Identifiers defined (bound) by a statement (§4.5).
pub fn extract_variables_defined(statement: &Statement) -> Vec<String> {
    match &statement.kind {
        StatementKind::LetBinding { variable, .. } => vec![variable.clone()],
        StatementKind::Assignment { variable, .. } => vec![variable.clone()],
        _ => Vec::new(),
    }
}

fn extract_vars_from_expr(expression: &str) -> Vec<String> {
    IDENTIFIER
        .find_iter(expression)
        .map(|m| m.as_str().to_string())
        .filter(|m| !is_stopword(m))
        .collect()
}
