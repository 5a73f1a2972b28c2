//! Import extractor (C2).
//!
//! Cairo 0 and Cairo 1 use unrelated import syntax, so this component
//! branches on the version C1 reports and never mixes the two regex
//! families.

use std::sync::LazyLock;

use regex::Regex;

use crate::ir::Import;

static CAIRO0_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"from\s+([\w.]+)\s+import\s+([^\n]+)").unwrap());

static CAIRO1_BRACED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^use\s+([\w:]+)::\{([^}]+)\};").unwrap());

static CAIRO1_SIMPLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^use\s+([\w:]+);").unwrap());

pub fn extract_imports(source: &str, cairo_version: u8) -> Vec<Import> {
    if cairo_version == 0 {
        extract_cairo0_imports(source)
    } else {
        extract_cairo1_imports(source)
    }
}

fn extract_cairo0_imports(source: &str) -> Vec<Import> {
    let mut imports = Vec::new();
    for caps in CAIRO0_IMPORT.captures_iter(source) {
        let whole_match = caps.get(0).unwrap();
        let module_path = caps[1].to_string();
        let symbols_str = caps[2].trim();
        let symbols = if symbols_str == "*" {
            Vec::new()
        } else {
            symbols_str.split(',').map(|s| s.trim().to_string()).collect()
        };
        let line = source[..whole_match.start()].matches('\n').count() + 1;
        imports.push(Import::new(module_path, symbols, line));
    }
    imports
}

fn extract_cairo1_imports(source: &str) -> Vec<Import> {
    let mut imports = Vec::new();
    for (i, raw_line) in source.split('\n').enumerate() {
        let line_num = i + 1;
        let line = raw_line.trim();
        if !line.starts_with("use ") {
            continue;
        }

        if let Some(caps) = CAIRO1_BRACED.captures(line) {
            let module_path = caps[1].to_string();
            let symbols = caps[2].split(',').map(|s| s.trim().to_string()).collect();
            imports.push(Import::new(module_path, symbols, line_num));
            continue;
        }

        if let Some(caps) = CAIRO1_SIMPLE.captures(line) {
            let full_path = caps[1].to_string();
            let parts: Vec<&str> = full_path.split("::").collect();
            let (module_path, symbols) = if parts.len() > 1
                && parts.last().and_then(|p| p.chars().next()).is_some_and(|c| c.is_uppercase())
            {
                let last = parts[parts.len() - 1].to_string();
                let rest = parts[..parts.len() - 1].join("::");
                (rest, vec![last])
            } else {
                (full_path, Vec::new())
            };
            imports.push(Import::new(module_path, symbols, line_num));
        }
    }
    imports
}
