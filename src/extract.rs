//! Contract extractor (C3).
//!
//! A single, deliberately lossy pass over a file's lines. Multi-line
//! parameter lists are truncated to whatever is on the function's header
//! line; complex types are kept verbatim as strings. Consumers must tolerate
//! missing returns and partial parameter lists.

use std::sync::LazyLock;

use regex::Regex;

use crate::ir::{Contract, ContractKind, Event, Function, FunctionBody, Parameter, StorageVariable, Visibility};

static MOD_DECL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"mod\s+(\w+)").unwrap());
static STORAGE_FIELD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\w+)\s*:\s*([^,]+)").unwrap());
static FN_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"fn\s+(\w+)").unwrap());
static FN_PARAMS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(([^)]*)\)").unwrap());
static FN_RETURNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"->\s*([^{;]+)").unwrap());
static EVENT_DECL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:struct|enum)\s+(\w+)").unwrap());

/// Extracts every contract/interface declared in `source`, attributing each
/// to `file_path` (used only for the `file_path` field on the IR, not for
/// filesystem access).
pub fn extract_contracts(source: &str, file_path: &str) -> Vec<Contract> {
    let lines: Vec<&str> = source.split('\n').collect();
    let mut contracts: Vec<Contract> = Vec::new();
    let mut current: Option<usize> = None;

    let mut i = 0usize;
    while i < lines.len() {
        let line_num = i + 1;
        let stripped = lines[i].trim();

        if stripped.contains("#[starknet::contract]") || stripped.contains("#[starknet::interface]") {
            let kind = if stripped.contains("interface") {
                ContractKind::Interface
            } else {
                ContractKind::Contract
            };
            let lookahead_end = (i + 1 + 5).min(lines.len());
            for j in (i + 1)..lookahead_end {
                let next = lines[j].trim();
                if next.contains("mod ") {
                    if let Some(caps) = MOD_DECL.captures(next) {
                        let name = caps[1].to_string();
                        contracts.push(Contract::new(name, file_path.to_string(), kind));
                        current = Some(contracts.len() - 1);
                        break;
                    }
                }
            }
        } else if current.is_some() && stripped.contains("#[storage]") {
            parse_storage_block(&lines, i, contracts.get_mut(current.unwrap()).unwrap());
        } else if current.is_some() && stripped.contains("fn ") {
            if let Some(mut func) = parse_function_header(stripped, line_num) {
                if let Some((text, start, end)) = extract_function_body(&lines, line_num) {
                    func.body = Some(FunctionBody { text, start_line: start, end_line: end });
                }
                contracts[current.unwrap()].functions.push(func);
            }
        } else if current.is_some() && stripped.contains("#[event]") {
            let lookahead_end = (i + 1 + 10).min(lines.len());
            for j in (i + 1)..lookahead_end {
                let next = lines[j].trim();
                if next.starts_with("enum ") || next.starts_with("struct ") {
                    if let Some(event) = parse_event(next, j + 1) {
                        contracts[current.unwrap()].events.push(event);
                    }
                    break;
                }
            }
        }

        i += 1;
    }

    contracts
}

fn parse_storage_block(lines: &[&str], storage_attr_idx: usize, contract: &mut Contract) {
    let lookahead_end = (storage_attr_idx + 1 + 50).min(lines.len());
    for j in (storage_attr_idx + 1)..lookahead_end {
        let next = lines[j].trim();
        if next.contains("struct Storage") {
            let mut brace_count: i64 = 0;
            let scan_end = (j + 100).min(lines.len());
            for k in j..scan_end {
                let storage_line = lines[k].trim();
                if storage_line.contains('{') {
                    brace_count += storage_line.matches('{').count() as i64;
                }
                if storage_line.contains('}') {
                    brace_count -= storage_line.matches('}').count() as i64;
                }

                if storage_line.contains(':') && brace_count > 0 {
                    if let Some(caps) = STORAGE_FIELD.captures(storage_line) {
                        let name = caps[1].to_string();
                        let ty = caps[2].trim().trim_end_matches(',').to_string();
                        contract.storage_vars.push(StorageVariable {
                            name,
                            ty,
                            line: k + 1,
                            is_stub: false,
                        });
                    }
                }

                if brace_count == 0 && storage_line.contains('}') {
                    break;
                }
            }
            break;
        }
    }
}

fn parse_function_header(stripped: &str, line_num: usize) -> Option<Function> {
    let name = FN_NAME.captures(stripped)?[1].to_string();

    let params_str = FN_PARAMS.captures(stripped).map(|c| c[1].to_string()).unwrap_or_default();
    let returns_str = FN_RETURNS.captures(stripped).map(|c| c[1].trim().to_string());

    let (visibility, mut decorators) = if stripped.contains("#[external") || stripped.contains("external(v") {
        (Visibility::External, vec!["external".to_string()])
    } else if stripped.contains("#[view") {
        (Visibility::View, vec!["view".to_string()])
    } else {
        (Visibility::Internal, Vec::new())
    };
    if matches!(visibility, Visibility::Internal) && (stripped.contains("pub fn") || stripped.contains("pub(crate) fn")) {
        decorators.push("pub".to_string());
    }

    let mut parameters = Vec::new();
    if !params_str.trim().is_empty() {
        for param in params_str.split(',') {
            let param = param.trim();
            if param.contains(':') {
                let param = param.replace("ref ", "").replace("mut ", "");
                if let Some((name, ty)) = param.split_once(':') {
                    parameters.push(Parameter {
                        name: name.trim().to_string(),
                        ty: ty.trim().to_string(),
                    });
                }
            }
        }
    }

    let returns = returns_str.into_iter().collect();

    Some(Function {
        name,
        visibility,
        parameters,
        returns,
        decorators,
        line: line_num,
        is_stub: false,
        body: None,
    })
}

/// Brace-balanced body extraction starting at the function's declaration
/// line (1-based). Returns `None` if no balanced body is ever found.
fn extract_function_body(lines: &[&str], start_line: usize) -> Option<(String, usize, usize)> {
    if start_line < 1 || start_line > lines.len() {
        return None;
    }

    let mut brace_count: i64 = 0;
    let mut body_lines: Vec<&str> = Vec::new();
    let mut body_start: Option<usize> = None;
    let mut body_end: Option<usize> = None;
    let mut found_opening_brace = false;

    for (i, line) in lines.iter().enumerate().skip(start_line - 1) {
        for ch in line.chars() {
            if ch == '{' {
                if !found_opening_brace {
                    found_opening_brace = true;
                    body_start = Some(i + 1);
                }
                brace_count += 1;
            } else if ch == '}' {
                brace_count -= 1;
            }
        }

        if found_opening_brace {
            body_lines.push(line);
        }

        if found_opening_brace && brace_count == 0 {
            body_end = Some(i + 1);
            break;
        }
    }

    let body_end = body_end?;
    if !found_opening_brace {
        return None;
    }

    Some((body_lines.join("\n"), body_start.unwrap(), body_end))
}

fn parse_event(line: &str, line_num: usize) -> Option<Event> {
    let name = EVENT_DECL.captures(line)?[1].to_string();
    Some(Event {
        name,
        fields: Vec::new(),
        line: line_num,
        is_stub: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_contract_name_from_mod_declaration() {
        let source = "#[starknet::contract]\nmod MyToken {\n}\n";
        let contracts = extract_contracts(source, "token.cairo");
        assert_eq!(contracts.len(), 1);
        assert_eq!(contracts[0].name, "MyToken");
        assert!(matches!(contracts[0].kind, ContractKind::Contract));
    }

    #[test]
    fn extracts_storage_variables() {
        let source = concat!(
            "#[starknet::contract]\n",
            "mod MyToken {\n",
            "    #[storage]\n",
            "    struct Storage {\n",
            "        balance: felt252,\n",
            "        owner: ContractAddress,\n",
            "    }\n",
            "}\n",
        );
        let contracts = extract_contracts(source, "token.cairo");
        let vars = &contracts[0].storage_vars;
        assert_eq!(vars.len(), 2);
        assert_eq!(vars[0].name, "balance");
        assert_eq!(vars[0].ty, "felt252");
        assert_eq!(vars[1].name, "owner");
    }

    #[test]
    fn extracts_function_with_body_and_visibility() {
        let source = concat!(
            "#[starknet::contract]\n",
            "mod MyToken {\n",
            "    #[external(v0)]\n",
            "    fn transfer(ref self: ContractState, to: ContractAddress, amount: felt252) -> bool {\n",
            "        true\n",
            "    }\n",
            "}\n",
        );
        let contracts = extract_contracts(source, "token.cairo");
        let func = &contracts[0].functions[0];
        assert_eq!(func.name, "transfer");
        assert!(matches!(func.visibility, Visibility::External));
        assert_eq!(func.parameters.len(), 3);
        assert_eq!(func.parameters[0].name, "self");
        assert!(func.body.is_some());
    }

    #[test]
    fn function_without_balanced_body_has_no_body() {
        let source = "#[starknet::contract]\nmod M {\n    fn broken(\n";
        let contracts = extract_contracts(source, "m.cairo");
        assert!(contracts[0].functions[0].body.is_none());
    }

    #[test]
    fn extracts_event_declaration() {
        let source = concat!(
            "#[starknet::contract]\n",
            "mod M {\n",
            "    #[event]\n",
            "    enum Event {\n",
            "        Transfer: Transfer,\n",
            "    }\n",
            "}\n",
        );
        let contracts = extract_contracts(source, "m.cairo");
        assert_eq!(contracts[0].events[0].name, "Event");
    }
}
