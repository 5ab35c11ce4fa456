use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    pub static ref SMILES_RE: Regex = Regex::new(r"\[([1-9][0-9]*)?((br?|cl?|n|o|p|s|f|i)|([A-Z][a-z]?))(@{0,2})(H([1-9][0-9]*)?)?(((\+|\-)([1-9][0-9]*))|(\+*)|(\-*))\]|(((br?|cl?|n|o|p|s|f|i)|(Br?|Cl?|N|O|P|S|F|I))(@{0,2}))|\(|\)|\.|((\-|=|#|:)?([1-9]|(%[1-9][0-9]+)))|\-|=|#|:|/|\\").unwrap();
    pub static ref BOND_RE: Regex = Regex::new(r"^(\-|=|#|:|/|\\)$").unwrap();
    pub static ref DOT_RE: Regex = Regex::new(r"^(\.)$").unwrap();
    pub static ref RING_BOND_RE: Regex = Regex::new(r"^((?P<bond_type>\-|=|#|:)?(?P<ring_id>([1-9])|(%[1-9][0-9]+)))$").unwrap();
    pub static ref ORGANIC_SUBSET_RE: Regex = Regex::new("^((?P<element>(br?|cl?|n|o|p|s|f|i)|(Br?|Cl?|N|O|P|S|F|I))(?P<chirality>@{0,2}))$").unwrap();
    pub static ref AROMATIC_ORGANIC_RE: Regex = Regex::new("^(br?|cl?|n|o|p|s|f|i)$").unwrap();
    pub static ref STANDARD_NODE_RE: Regex = Regex::new(r"^(\[(?P<isotope>[1-9][0-9]*)?(?P<element>(br?|cl?|n|o|p|s|f|i)|([A-Z][a-z]?))(?P<chirality>@{0,2})(?P<explicit_hydrogen>H(?P<explicit_hydrogen_num>[1-9][0-9]*)?)?(?P<charge>((?P<charge_num>(\+|\-)([1-9][0-9]*))|(\+*)|(\-*)))\])$").unwrap();
    pub static ref BRANCH_RE: Regex = Regex::new(r"^(\(|\))$").unwrap();
    pub static ref NEGATIVE_RE: Regex = Regex::new(r"^(\-+)$").unwrap();
    pub static ref POSITIVE_RE: Regex = Regex::new(r"^(\++)$").unwrap();
    pub static ref XYZ_LINE_RE: Regex = Regex::new(r"^\s*(?P<element>[A-Za-z][A-Za-z]?)\s+(?P<x>[\-+]?[0-9]+(\.[0-9]*)?([eE][\-+]?[0-9]+)?)\s+(?P<y>[\-+]?[0-9]+(\.[0-9]*)?([eE][\-+]?[0-9]+)?)\s+(?P<z>[\-+]?[0-9]+(\.[0-9]*)?([eE][\-+]?[0-9]+)?)\s*$").unwrap();
}

pub fn smiles_tokenize(smiles: &str) -> Vec<&str> {
    SMILES_RE
        .find_iter(smiles)
        .map(|r| r.as_str())
        .collect::<Vec<&str>>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_organic_subset() {
        assert_eq!(smiles_tokenize("CCO"), vec!["C", "C", "O"]);
        assert_eq!(smiles_tokenize("ClCBr"), vec!["Cl", "C", "Br"]);
    }

    #[test]
    fn tokenize_brackets_bonds_and_rings() {
        assert_eq!(
            smiles_tokenize("[13CH3][O-].c1ccccc1C#N"),
            vec![
                "[13CH3]", "[O-]", ".", "c", "1", "c", "c", "c", "c", "c", "1", "C", "#", "N"
            ]
        );
    }

    #[test]
    fn tokenize_ring_with_bond_symbol() {
        assert_eq!(smiles_tokenize("C=1CCC=1"), vec!["C", "=1", "C", "C", "C", "=1"]);
    }

    #[test]
    fn xyz_line_matches() {
        let captured = XYZ_LINE_RE.captures("O    0.000000   -0.007156    0.965491").unwrap();
        assert_eq!(&captured["element"], "O");
        assert_eq!(&captured["y"], "-0.007156");
        assert!(XYZ_LINE_RE.captures("3").is_none());
        assert!(XYZ_LINE_RE.captures("O 0.0 0.0").is_none());
    }
}
