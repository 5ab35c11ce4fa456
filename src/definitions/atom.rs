use std::{fmt::Display, str::FromStr};

use super::{chirality::ChiralityType, element::Element};
use crate::tokenizer::{AROMATIC_ORGANIC_RE, NEGATIVE_RE, ORGANIC_SUBSET_RE, STANDARD_NODE_RE};

#[derive(Debug, Clone)]
pub struct Atom {
    pub element: Element,
    pub isotope: Option<u16>,
    pub charge: isize,
    pub chirality_type: Option<ChiralityType>,
    /// Hydrogens declared on the atom token but not yet present as graph
    /// nodes. Consumed when hydrogens are materialized.
    pub explicit_hydrogen: usize,
    /// Whether the hydrogen count is implied by valence (organic-subset
    /// token) rather than declared or materialized.
    pub implicit: bool,
    pub aromatic: bool,
}

impl Atom {
    /// A plain, uncharged atom of the given element, as read from a
    /// coordinate file.
    pub fn from_element(element: Element) -> Self {
        Atom {
            element,
            isotope: None,
            charge: 0,
            chirality_type: None,
            explicit_hydrogen: 0,
            implicit: false,
            aromatic: false,
        }
    }

    /// Parse a SMILES atom token, either the organic-subset shortcut or the
    /// bracket form. Returns `None` for anything else.
    pub fn new(token: &str) -> Option<Self> {
        if let Some(captured) = ORGANIC_SUBSET_RE.captures(token) {
            let (element, aromatic, chirality_type) = Self::minimal_node_info(&captured)?;
            Some(Atom {
                element,
                isotope: None,
                charge: 0,
                chirality_type,
                explicit_hydrogen: 0,
                implicit: true,
                aromatic,
            })
        } else if let Some(captured) = STANDARD_NODE_RE.captures(token) {
            let (element, aromatic, chirality_type) = Self::minimal_node_info(&captured)?;
            let isotope: Option<u16> =
                captured
                    .name("isotope")
                    .and_then(|m| match m.as_str().parse() {
                        Ok(isotope) => Some(isotope),
                        Err(_) => None,
                    });
            let explicit_hydrogen = captured
                .name("explicit_hydrogen")
                .map(|_| match captured.name("explicit_hydrogen_num") {
                    Some(num) => num.as_str().parse::<usize>().unwrap_or(1),
                    None => 1,
                })
                .unwrap_or(0);
            let charge = {
                if let Some(charge) = captured
                    .name("charge_num")
                    .and_then(|m| m.as_str().parse::<isize>().ok())
                {
                    charge
                } else if let Some(charge_str) = captured.name("charge").map(|m| m.as_str()) {
                    charge_str.len() as isize
                        * if NEGATIVE_RE.is_match(charge_str) {
                            -1
                        } else {
                            1
                        }
                } else {
                    0
                }
            };
            Some(Atom {
                element,
                isotope,
                charge,
                chirality_type,
                explicit_hydrogen,
                implicit: false,
                aromatic,
            })
        } else {
            None
        }
    }

    /// Emit the SMILES token for this atom. `hydrogen` is the count to show
    /// inside brackets; `bare_ok` allows the organic-subset shortcut when the
    /// caller has checked that a reader would infer the same hydrogen count.
    pub fn to_token(&self, hydrogen: usize, bare_ok: bool) -> String {
        if bare_ok && self.element.is_organic_subset() {
            return self.core_token();
        }
        let mut token = String::from("[");
        if let Some(isotope) = self.isotope {
            token.push_str(&isotope.to_string());
        }
        token.push_str(&self.core_token());
        if hydrogen != 0 {
            token.push_str("H");
            if hydrogen > 1 {
                token.push_str(&hydrogen.to_string());
            }
        }
        token.push_str(&self.charge_token());
        token.push_str("]");
        token
    }

    fn core_token(&self) -> String {
        let mut core_token = String::new();
        let element_token = self.element.as_ref();
        if self.aromatic && AROMATIC_ORGANIC_RE.is_match(&element_token.to_lowercase()) {
            core_token.push_str(&element_token.to_lowercase());
        } else {
            core_token.push_str(element_token);
        }
        if let Some(chirality) = &self.chirality_type {
            core_token.push_str(chirality.as_str());
        }
        core_token
    }

    fn charge_token(&self) -> String {
        let mut charge_token = String::new();
        if self.charge < 0 {
            charge_token.push_str("-");
        } else if self.charge > 0 {
            charge_token.push_str("+");
        }
        if self.charge.abs() > 1 {
            charge_token.push_str(&self.charge.abs().to_string())
        }
        charge_token
    }

    fn minimal_node_info(
        captured: &regex::Captures,
    ) -> Option<(Element, bool, Option<ChiralityType>)> {
        let element = captured.name("element").map(|m| m.as_str())?;
        let aromatic = AROMATIC_ORGANIC_RE.is_match(element);
        let chirality_type = captured
            .name("chirality")
            .map(|m| m.as_str())
            .and_then(ChiralityType::new);
        let mut capitalized = element[0..1].to_uppercase();
        capitalized.push_str(&element[1..]);
        let element = Element::from_str(&capitalized).ok()?;
        Some((element, aromatic, chirality_type))
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.element.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_organic_subset_token() {
        let atom = Atom::new("C").unwrap();
        assert_eq!(atom.element, Element::C);
        assert_eq!(atom.charge, 0);
        assert!(atom.implicit);
        assert!(!atom.aromatic);

        let atom = Atom::new("n").unwrap();
        assert_eq!(atom.element, Element::N);
        assert!(atom.aromatic);
    }

    #[test]
    fn parse_bracket_token() {
        let atom = Atom::new("[13CH3]").unwrap();
        assert_eq!(atom.element, Element::C);
        assert_eq!(atom.isotope, Some(13));
        assert_eq!(atom.explicit_hydrogen, 3);
        assert!(!atom.implicit);

        let atom = Atom::new("[O-]").unwrap();
        assert_eq!(atom.charge, -1);

        let atom = Atom::new("[NH4+]").unwrap();
        assert_eq!(atom.element, Element::N);
        assert_eq!(atom.explicit_hydrogen, 4);
        assert_eq!(atom.charge, 1);

        let atom = Atom::new("[Fe+2]").unwrap();
        assert_eq!(atom.element, Element::Fe);
        assert_eq!(atom.charge, 2);
    }

    #[test]
    fn parse_chirality() {
        let atom = Atom::new("[C@@H]").unwrap();
        assert_eq!(atom.chirality_type, Some(ChiralityType::Clockwise));
        assert_eq!(atom.explicit_hydrogen, 1);
    }

    #[test]
    fn reject_garbage() {
        assert!(Atom::new("(").is_none());
        assert!(Atom::new("[Zz]").is_none());
        assert!(Atom::new("1").is_none());
    }

    #[test]
    fn emit_tokens() {
        let atom = Atom::new("C").unwrap();
        assert_eq!(atom.to_token(4, true), "C");
        assert_eq!(atom.to_token(2, false), "[CH2]");

        let atom = Atom::new("[NH4+]").unwrap();
        assert_eq!(atom.to_token(4, false), "[NH4+]");

        let atom = Atom::new("c").unwrap();
        assert_eq!(atom.to_token(1, true), "c");

        let atom = Atom::from_element(Element::H);
        assert_eq!(atom.to_token(0, false), "[H]");

        let atom = Atom::new("[O-2]").unwrap();
        assert_eq!(atom.to_token(0, false), "[O-2]");
    }
}
