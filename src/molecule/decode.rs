use petgraph::graph::NodeIndex;

use crate::definitions::{atom::Atom, bond::BondType};
use crate::error::{ConversionError, Result};
use crate::tokenizer::{smiles_tokenize, BRANCH_RE, DOT_RE, RING_BOND_RE};

use super::Molecule;

impl Molecule {
    /// Build a molecule from a SMILES string. Dot-separated parts become
    /// disconnected fragments of the same graph.
    pub fn from_smiles(smiles: &str) -> Result<Self> {
        let mut molecule = Molecule::new();
        let mut construct_status = Status::new();
        let mut ring_status = RingStatus::new();
        let mut bond_to_connect: Option<BondType> = None;
        let mut detached = false;
        let tokens = smiles_tokenize(smiles);
        if tokens.is_empty() {
            return Err(ConversionError::Smiles(format!(
                "no atom tokens in {:?}",
                smiles
            )));
        }
        for token in tokens.into_iter() {
            if construct_status.is_none() {
                if let Some(node) = Atom::new(token) {
                    construct_status.next(molecule.add_atom(node));
                } else {
                    return Err(ConversionError::Smiles(format!(
                        "first token must be a SMILES atom token, but got {}",
                        token
                    )));
                }
            } else {
                let current_index = construct_status
                    .get_index()
                    .map_err(|message| ConversionError::Smiles(message.to_string()))?;
                if let Some(node) = Atom::new(token) {
                    let node_index = molecule.add_atom(node);
                    if detached {
                        detached = false;
                        bond_to_connect = None;
                    } else {
                        let bond = match bond_to_connect.take() {
                            Some(bond) => bond,
                            None => implied_bond(&molecule, current_index, node_index),
                        };
                        molecule.connect(current_index, node_index, bond);
                    }
                    construct_status.next(node_index);
                } else if DOT_RE.is_match(token) {
                    detached = true;
                } else if let Some(bond) = BondType::from_str(token) {
                    bond_to_connect = Some(bond);
                } else if let Some((bond_type, id)) = RingStatus::identify_ring(token) {
                    match ring_status.ring(current_index, bond_type, id) {
                        RingAction::Opened => {}
                        RingAction::Closed(another_index, bond) => {
                            let bond = bond
                                .unwrap_or_else(|| implied_bond(&molecule, current_index, another_index));
                            molecule.connect(current_index, another_index, bond);
                        }
                        RingAction::Mismatched => {
                            return Err(ConversionError::Smiles(format!(
                                "ring closure {} carries two different bond symbols",
                                id
                            )));
                        }
                    }
                } else if BRANCH_RE.is_match(token) {
                    match token {
                        "(" => construct_status.enter_branch(),
                        _ => construct_status.quit_branch(),
                    }
                    .map_err(|message| ConversionError::Smiles(message.to_string()))?;
                }
            }
        }
        if !construct_status.branch.is_empty() {
            Err(ConversionError::Smiles(format!(
                "unclosed branches: {} opening parentheses without a match",
                construct_status.branch.len()
            )))
        } else if !ring_status.waiting_to_connect.is_empty() {
            Err(ConversionError::Smiles(format!(
                "unclosed rings: {:?}",
                ring_status
                    .waiting_to_connect
                    .iter()
                    .map(|(_, _, id)| *id)
                    .collect::<Vec<u8>>()
            )))
        } else {
            Ok(molecule)
        }
    }
}

/// Bond used when two adjacent atom tokens carry no bond symbol.
fn implied_bond(molecule: &Molecule, atom_a: NodeIndex, atom_b: NodeIndex) -> BondType {
    let aromatic_pair = molecule
        .get_atom(atom_a)
        .zip(molecule.get_atom(atom_b))
        .map(|(a, b)| a.aromatic && b.aromatic)
        .unwrap_or(false);
    if aromatic_pair {
        BondType::Aromatic
    } else {
        BondType::simple()
    }
}

struct Status {
    branch: Vec<NodeIndex>,
    current: Option<NodeIndex>,
}

impl Status {
    fn new() -> Self {
        Self {
            branch: vec![],
            current: None,
        }
    }

    fn next(&mut self, index: NodeIndex) {
        self.current = Some(index);
    }

    fn enter_branch(&mut self) -> std::result::Result<(), &'static str> {
        match self.current {
            Some(index) => {
                self.branch.push(index);
                Ok(())
            }
            None => Err("a branch must open after an atom"),
        }
    }

    fn quit_branch(&mut self) -> std::result::Result<(), &'static str> {
        match self.branch.pop() {
            Some(index) => {
                self.current = Some(index);
                Ok(())
            }
            None => Err("closing parenthesis without an open branch"),
        }
    }

    fn get_index(&self) -> std::result::Result<NodeIndex, &'static str> {
        self.current.ok_or("no current atom to continue from")
    }

    fn is_none(&self) -> bool {
        self.current.is_none()
    }
}

enum RingAction {
    Opened,
    Closed(NodeIndex, Option<BondType>),
    Mismatched,
}

struct RingStatus {
    waiting_to_connect: Vec<(NodeIndex, Option<BondType>, u8)>,
}

impl RingStatus {
    fn identify_ring(token: &str) -> Option<(Option<BondType>, u8)> {
        let captured = RING_BOND_RE.captures(token)?;
        let id = captured
            .name("ring_id")
            .map(|m| m.as_str())
            .map(|s| s.strip_prefix('%').unwrap_or(s))
            .and_then(|s| s.parse::<u8>().ok())?;
        let bond_type = captured
            .name("bond_type")
            .map(|m| m.as_str())
            .and_then(BondType::from_str);
        Some((bond_type, id))
    }

    fn new() -> Self {
        Self {
            waiting_to_connect: vec![],
        }
    }

    fn ring(&mut self, node_index: NodeIndex, bond_type: Option<BondType>, id: u8) -> RingAction {
        if let Some(target) = self.waiting_to_connect.iter().position(|item| item.2 == id) {
            let (another_index, opened_bond, _) = self.waiting_to_connect[target];
            match (bond_type, opened_bond) {
                (Some(closing), Some(opening)) if closing != opening => RingAction::Mismatched,
                (closing, opening) => {
                    self.waiting_to_connect.remove(target);
                    RingAction::Closed(another_index, closing.or(opening))
                }
            }
        } else {
            self.waiting_to_connect.push((node_index, bond_type, id));
            RingAction::Opened
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::element::Element;

    #[test]
    fn parse_linear_chain() {
        let molecule = Molecule::from_smiles("CCO").unwrap();
        assert_eq!(molecule.atom_count(), 3);
        assert_eq!(molecule.bond_count(), 2);
        let atoms: Vec<Element> = molecule
            .graph
            .node_weights()
            .map(|atom| atom.element)
            .collect();
        assert_eq!(atoms, vec![Element::C, Element::C, Element::O]);
    }

    #[test]
    fn parse_branches() {
        // isobutane: central carbon bonded to three methyls
        let molecule = Molecule::from_smiles("CC(C)C").unwrap();
        assert_eq!(molecule.atom_count(), 4);
        assert_eq!(molecule.bond_count(), 3);
        let central = NodeIndex::new(1);
        assert_eq!(molecule.neighbors(central).len(), 3);
    }

    #[test]
    fn parse_explicit_bonds() {
        let molecule = Molecule::from_smiles("C=C").unwrap();
        let (bond, _) = molecule
            .get_edge(NodeIndex::new(0), NodeIndex::new(1))
            .unwrap();
        assert_eq!(*bond, BondType::Double);

        let molecule = Molecule::from_smiles("C#N").unwrap();
        let (bond, _) = molecule
            .get_edge(NodeIndex::new(0), NodeIndex::new(1))
            .unwrap();
        assert_eq!(*bond, BondType::Triple);
    }

    #[test]
    fn parse_ring_closure() {
        let molecule = Molecule::from_smiles("C1CCCCC1").unwrap();
        assert_eq!(molecule.atom_count(), 6);
        assert_eq!(molecule.bond_count(), 6);
        // the closure bond connects first and last atoms
        assert!(molecule
            .get_edge(NodeIndex::new(0), NodeIndex::new(5))
            .is_some());
    }

    #[test]
    fn parse_aromatic_ring() {
        let molecule = Molecule::from_smiles("c1ccccc1").unwrap();
        assert_eq!(molecule.atom_count(), 6);
        assert_eq!(molecule.bond_count(), 6);
        let (bond, _) = molecule
            .get_edge(NodeIndex::new(0), NodeIndex::new(1))
            .unwrap();
        assert!(bond.is_aromatic());
        let (closure, _) = molecule
            .get_edge(NodeIndex::new(0), NodeIndex::new(5))
            .unwrap();
        assert!(closure.is_aromatic());
    }

    #[test]
    fn parse_ring_with_bond_symbol() {
        let molecule = Molecule::from_smiles("C=1CCC=1").unwrap();
        let (bond, _) = molecule
            .get_edge(NodeIndex::new(0), NodeIndex::new(3))
            .unwrap();
        assert_eq!(*bond, BondType::Double);
    }

    #[test]
    fn parse_fragments_are_disconnected() {
        let molecule = Molecule::from_smiles("[Na+].[Cl-]").unwrap();
        assert_eq!(molecule.atom_count(), 2);
        assert_eq!(molecule.bond_count(), 0);
    }

    #[test]
    fn parse_percent_ring_id() {
        let molecule = Molecule::from_smiles("C%12CCC%12").unwrap();
        assert_eq!(molecule.bond_count(), 4);
    }

    #[test]
    fn reject_malformed_smiles() {
        assert!(Molecule::from_smiles("").is_err());
        assert!(Molecule::from_smiles("(CC)").is_err());
        assert!(Molecule::from_smiles("C1CC").is_err());
        assert!(Molecule::from_smiles("C(C").is_err());
        assert!(Molecule::from_smiles("CC)").is_err());
        assert!(Molecule::from_smiles("C=1CCC#1").is_err());
    }
}
