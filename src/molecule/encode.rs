use std::collections::{HashMap, HashSet};

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::definitions::{bond::BondType, element::Element};

use super::Molecule;

impl Molecule {
    /// Serialize to a deterministic SMILES string.
    ///
    /// Atoms are ranked by Morgan-style invariant refinement; emission starts
    /// at the lowest rank and orders neighbors by rank, so isomorphic graphs
    /// built from different input orderings serialize identically. Terminal
    /// hydrogens are folded into their heavy neighbor, and disconnected
    /// fragments are joined with `.`.
    pub fn to_smiles(&self) -> String {
        if self.atom_count() == 0 {
            return String::new();
        }
        let ranks = canonical_ranks(self);
        SmilesEncoder::new(self, &ranks).encode()
    }
}

fn canonical_ranks(molecule: &Molecule) -> Vec<usize> {
    let n = molecule.atom_count();
    let initial: Vec<(u8, isize, usize, bool, u16, usize)> = (0..n)
        .map(|i| {
            let index = NodeIndex::new(i);
            let atom = molecule.get_atom(index).expect("node indices are dense");
            (
                atom.element.atomic_number(),
                atom.charge,
                molecule.neighbors(index).len(),
                atom.aromatic,
                atom.isotope.unwrap_or(0),
                atom.explicit_hydrogen,
            )
        })
        .collect();
    let mut ranks = rank_by(&initial);
    loop {
        let keys: Vec<(usize, Vec<usize>)> = (0..n)
            .map(|i| {
                let mut neighbor_ranks: Vec<usize> = molecule
                    .neighbors(NodeIndex::new(i))
                    .into_iter()
                    .map(|neighbor| ranks[neighbor.index()])
                    .collect();
                neighbor_ranks.sort_unstable();
                (ranks[i], neighbor_ranks)
            })
            .collect();
        let refined = rank_by(&keys);
        if distinct(&refined) == distinct(&ranks) {
            break;
        }
        ranks = refined;
    }
    ranks
}

fn rank_by<K: Ord>(keys: &[K]) -> Vec<usize> {
    let mut sorted: Vec<&K> = keys.iter().collect();
    sorted.sort();
    sorted.dedup();
    keys.iter()
        .map(|key| {
            sorted
                .binary_search(&key)
                .expect("every key is in the sorted list")
        })
        .collect()
}

fn distinct(ranks: &[usize]) -> usize {
    ranks.iter().collect::<HashSet<_>>().len()
}

struct SmilesEncoder<'a> {
    molecule: &'a Molecule,
    ranks: &'a [usize],
    folded: Vec<bool>,
    folded_hydrogens: Vec<usize>,
    discovered: Vec<bool>,
    closure_edges: HashSet<EdgeIndex>,
    ring_ids: HashMap<EdgeIndex, usize>,
    output: String,
}

impl<'a> SmilesEncoder<'a> {
    fn new(molecule: &'a Molecule, ranks: &'a [usize]) -> Self {
        let n = molecule.atom_count();
        let mut folded = vec![false; n];
        let mut folded_hydrogens = vec![0usize; n];
        for i in 0..n {
            let index = NodeIndex::new(i);
            let atom = molecule.get_atom(index).expect("node indices are dense");
            if atom.element != Element::H || atom.charge != 0 || atom.isotope.is_some() {
                continue;
            }
            let neighbors = molecule.neighbors(index);
            if neighbors.len() != 1 {
                continue;
            }
            let heavy = neighbors[0];
            let heavy_atom = molecule.get_atom(heavy).expect("node indices are dense");
            if heavy_atom.element == Element::H {
                continue;
            }
            let (bond, _) = molecule
                .get_edge(index, heavy)
                .expect("a neighbor implies an edge");
            if !bond.is_single() {
                continue;
            }
            folded[i] = true;
            folded_hydrogens[heavy.index()] += 1;
        }
        Self {
            molecule,
            ranks,
            folded,
            folded_hydrogens,
            discovered: vec![false; n],
            closure_edges: HashSet::new(),
            ring_ids: HashMap::new(),
            output: String::new(),
        }
    }

    fn encode(mut self) -> String {
        let n = self.molecule.atom_count();
        loop {
            let start = (0..n)
                .filter(|&i| !self.discovered[i] && !self.folded[i])
                .min_by_key(|&i| self.ranks[i]);
            let start = match start {
                Some(index) => NodeIndex::new(index),
                None => break,
            };
            self.find_closures(start, None);
            if !self.output.is_empty() {
                self.output.push('.');
            }
            self.walk(start, None);
        }
        self.output
    }

    /// First pass over a fragment: mark the edges that close rings under the
    /// same traversal order the emission pass uses.
    fn find_closures(&mut self, index: NodeIndex, parent_edge: Option<EdgeIndex>) {
        self.discovered[index.index()] = true;
        for (neighbor, edge) in self.ordered_neighbors(index) {
            if Some(edge) == parent_edge
                || self.folded[neighbor.index()]
                || self.closure_edges.contains(&edge)
            {
                continue;
            }
            if self.discovered[neighbor.index()] {
                self.closure_edges.insert(edge);
            } else {
                self.find_closures(neighbor, Some(edge));
            }
        }
    }

    fn walk(&mut self, index: NodeIndex, parent: Option<(NodeIndex, EdgeIndex)>) {
        if let Some((parent_index, edge)) = parent {
            let bond = *self
                .molecule
                .graph
                .edge_weight(edge)
                .expect("walked edges exist");
            let token = self.bond_token(parent_index, index, bond);
            self.output.push_str(token);
        }
        let token = self.atom_token(index);
        self.output.push_str(&token);

        let closures: Vec<(NodeIndex, EdgeIndex)> = self
            .ordered_neighbors(index)
            .into_iter()
            .filter(|(_, edge)| self.closure_edges.contains(edge))
            .collect();
        for (neighbor, edge) in closures {
            let next_id = self.ring_ids.len() + 1;
            let id = *self.ring_ids.entry(edge).or_insert(next_id);
            let bond = *self
                .molecule
                .graph
                .edge_weight(edge)
                .expect("walked edges exist");
            let token = self.bond_token(index, neighbor, bond);
            self.output.push_str(token);
            if id >= 10 {
                self.output.push_str(&format!("%{}", id));
            } else {
                self.output.push_str(&id.to_string());
            }
        }

        let children: Vec<(NodeIndex, EdgeIndex)> = self
            .ordered_neighbors(index)
            .into_iter()
            .filter(|(neighbor, edge)| {
                Some(*edge) != parent.map(|(_, parent_edge)| parent_edge)
                    && !self.folded[neighbor.index()]
                    && !self.closure_edges.contains(edge)
            })
            .collect();
        for (position, (neighbor, edge)) in children.iter().enumerate() {
            if position + 1 < children.len() {
                self.output.push('(');
                self.walk(*neighbor, Some((index, *edge)));
                self.output.push(')');
            } else {
                self.walk(*neighbor, Some((index, *edge)));
            }
        }
    }

    fn ordered_neighbors(&self, index: NodeIndex) -> Vec<(NodeIndex, EdgeIndex)> {
        let mut neighbors: Vec<(NodeIndex, EdgeIndex)> = self
            .molecule
            .graph
            .edges(index)
            .map(|edge| {
                let other = if edge.source() == index {
                    edge.target()
                } else {
                    edge.source()
                };
                (other, edge.id())
            })
            .collect();
        neighbors.sort_by_key(|(neighbor, _)| (self.ranks[neighbor.index()], neighbor.index()));
        neighbors
    }

    /// Empty for bonds a reader infers on its own: plain singles outside
    /// aromatic pairs, and aromatic bonds inside them.
    fn bond_token(&self, atom_a: NodeIndex, atom_b: NodeIndex, bond: BondType) -> &'static str {
        let aromatic_pair = self
            .molecule
            .get_atom(atom_a)
            .zip(self.molecule.get_atom(atom_b))
            .map(|(a, b)| a.aromatic && b.aromatic)
            .unwrap_or(false);
        if bond.is_normal_single() && !aromatic_pair {
            ""
        } else if bond.is_aromatic() && aromatic_pair {
            ""
        } else {
            bond.as_str()
        }
    }

    fn atom_token(&self, index: NodeIndex) -> String {
        let atom = self.molecule.get_atom(index).expect("node indices are dense");
        let folded = self.folded_hydrogens[index.index()];
        let visible_order = self.molecule.bond_order_sum(index) - folded;
        let aromatic = if atom.aromatic { 1 } else { 0 };
        let expected = (atom.element.default_hydrogen() as isize + atom.charge
            - visible_order as isize
            - aromatic)
            .max(0) as usize;
        let hydrogen = if atom.implicit {
            expected
        } else {
            folded + atom.explicit_hydrogen
        };
        let organic_clean = atom.element.is_organic_subset()
            && atom.charge == 0
            && atom.isotope.is_none()
            && atom.chirality_type.is_none();
        let bare_ok = organic_clean && (atom.implicit || hydrogen == expected);
        atom.to_token(hydrogen, bare_ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_chain_is_canonical() {
        let a = Molecule::from_smiles("CCO").unwrap().to_smiles();
        let b = Molecule::from_smiles("OCC").unwrap().to_smiles();
        assert_eq!(a, b);
        assert_eq!(a, "CCO");
    }

    #[test]
    fn branch_emission() {
        let molecule = Molecule::from_smiles("CC(C)C").unwrap();
        assert_eq!(molecule.to_smiles(), "CC(C)C");
    }

    #[test]
    fn aromatic_ring_round_trip() {
        let molecule = Molecule::from_smiles("c1ccccc1").unwrap();
        assert_eq!(molecule.to_smiles(), "c1ccccc1");
    }

    #[test]
    fn aliphatic_ring_round_trip() {
        let molecule = Molecule::from_smiles("C1CCCCC1").unwrap();
        assert_eq!(molecule.to_smiles(), "C1CCCCC1");
    }

    #[test]
    fn explicit_bond_emission() {
        assert_eq!(Molecule::from_smiles("C#N").unwrap().to_smiles(), "C#N");
        assert_eq!(Molecule::from_smiles("C=C").unwrap().to_smiles(), "C=C");
    }

    #[test]
    fn materialized_hydrogens_fold_back() {
        let mut molecule = Molecule::from_smiles("O").unwrap();
        molecule.add_hydrogens();
        assert_eq!(molecule.atom_count(), 3);
        assert_eq!(molecule.to_smiles(), "O");

        let mut molecule = Molecule::from_smiles("C").unwrap();
        molecule.add_hydrogens();
        assert_eq!(molecule.atom_count(), 5);
        assert_eq!(molecule.to_smiles(), "C");
    }

    #[test]
    fn charged_atoms_keep_brackets() {
        let molecule = Molecule::from_smiles("[NH4+]").unwrap();
        assert_eq!(molecule.to_smiles(), "[NH4+]");
    }

    #[test]
    fn fragments_join_with_dots() {
        let molecule = Molecule::from_smiles("[Na+].[Cl-]").unwrap();
        assert_eq!(molecule.to_smiles(), "[Na+].[Cl-]");
    }

    #[test]
    fn hydrogen_molecule_stays_explicit() {
        let molecule = Molecule::from_smiles("[H][H]").unwrap();
        assert_eq!(molecule.to_smiles(), "[H][H]");
    }
}
