//! Cairo dialect detector (C1).
//!
//! A hint only — C3's extraction regex family tolerates both dialects, so
//! getting this wrong does not break extraction, only import syntax choice
//! in C2.

const CAIRO1_MARKERS: [&str; 5] = [
    "#[starknet::contract]",
    "#[starknet::interface]",
    "#[storage]",
    "felt252",
    "fn ",
];

const CAIRO0_MARKERS: [&str; 4] = ["@storage_var", "@external", "@view", "func "];

/// Returns 1 for Cairo 1, 0 for Cairo 0. Defaults to 1 when no marker hits.
pub fn detect_version(source: &str) -> u8 {
    if CAIRO1_MARKERS.iter().any(|m| source.contains(m)) {
        return 1;
    }
    if CAIRO0_MARKERS.iter().any(|m| source.contains(m)) {
        return 0;
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_cairo1_from_contract_attribute() {
        assert_eq!(detect_version("#[starknet::contract]\nmod Foo {}"), 1);
    }

    #[test]
    fn detects_cairo0_from_decorator() {
        assert_eq!(detect_version("@storage_var\nfunc balance() -> (res: felt) {\n}"), 0);
    }

    #[test]
    fn defaults_to_cairo1_when_ambiguous() {
        assert_eq!(detect_version("// just a comment\n"), 1);
    }

    #[test]
    fn cairo1_markers_take_priority_over_cairo0() {
        // fn appears, so this hits the Cairo 1 branch even though @external is present.
        assert_eq!(detect_version("@external\nfn foo() {}"), 1);
    }
}
