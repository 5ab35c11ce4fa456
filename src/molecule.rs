pub mod decode;
pub mod encode;

use nalgebra::Point3;
use petgraph::{
    graph::{EdgeIndex, NodeIndex, UnGraph},
    visit::EdgeRef,
};

use crate::definitions::{atom::Atom, bond::BondType, element::Element};

/// A molecular graph with optional Cartesian coordinates.
///
/// Coordinates are angstroms and run parallel to the graph's node indices.
/// Atoms created after geometry was read (late-added hydrogens) carry `None`.
#[derive(Debug, Clone)]
pub struct Molecule {
    pub graph: UnGraph<Atom, BondType>,
    positions: Vec<Option<Point3<f64>>>,
}

impl Molecule {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::new_undirected(),
            positions: vec![],
        }
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn add_atom(&mut self, atom: Atom) -> NodeIndex {
        self.positions.push(None);
        self.graph.add_node(atom)
    }

    pub fn add_atom_at(&mut self, atom: Atom, position: Point3<f64>) -> NodeIndex {
        self.positions.push(Some(position));
        self.graph.add_node(atom)
    }

    pub fn connect(&mut self, atom_a: NodeIndex, atom_b: NodeIndex, bond: BondType) -> EdgeIndex {
        self.graph.add_edge(atom_a, atom_b, bond)
    }

    fn connect_new_atom(&mut self, atom: Atom, connect_to: NodeIndex, bond: BondType) -> NodeIndex {
        let new_node = self.add_atom(atom);
        self.graph.add_edge(connect_to, new_node, bond);
        new_node
    }

    pub fn get_atom(&self, index: NodeIndex) -> Option<&Atom> {
        self.graph.node_weight(index)
    }

    pub fn get_atom_mut(&mut self, index: NodeIndex) -> Option<&mut Atom> {
        self.graph.node_weight_mut(index)
    }

    pub fn get_edge(&self, atom_a: NodeIndex, atom_b: NodeIndex) -> Option<(&BondType, EdgeIndex)> {
        self.graph
            .find_edge(atom_a, atom_b)
            .and_then(|edge| self.graph.edge_weight(edge).map(|bond| (bond, edge)))
    }

    pub fn neighbors(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.graph.neighbors(index).collect()
    }

    pub fn position(&self, index: NodeIndex) -> Option<Point3<f64>> {
        self.positions.get(index.index()).copied().flatten()
    }

    pub fn set_position(&mut self, index: NodeIndex, position: Point3<f64>) {
        if let Some(slot) = self.positions.get_mut(index.index()) {
            *slot = Some(position);
        }
    }

    /// Whether every atom carries coordinates.
    pub fn has_full_coordinates(&self) -> bool {
        self.positions.iter().all(|position| position.is_some())
    }

    /// Distance between two atoms, in pm.
    pub fn distance_pm(&self, atom_a: NodeIndex, atom_b: NodeIndex) -> Option<f64> {
        let a = self.position(atom_a)?;
        let b = self.position(atom_b)?;
        Some((a - b).norm() * 100.0)
    }

    /// Sum of bond orders over the edges incident to an atom.
    pub fn bond_order_sum(&self, index: NodeIndex) -> usize {
        self.graph
            .edges(index)
            .map(|edge| edge.weight().order())
            .sum()
    }

    /// Hydrogens a reader of the graph would infer for the atom: default
    /// valence adjusted for charge, bond orders and the aromatic valence.
    pub fn implied_hydrogens(&self, index: NodeIndex) -> usize {
        let atom = match self.get_atom(index) {
            Some(atom) => atom,
            None => return 0,
        };
        let default_hydrogens = atom.element.default_hydrogen();
        if default_hydrogens == 0 {
            return 0;
        }
        let aromatic = if atom.aromatic { 1 } else { 0 };
        let need_to_add =
            default_hydrogens as isize + atom.charge - self.bond_order_sum(index) as isize - aromatic;
        if need_to_add >= 0 {
            need_to_add as usize
        } else {
            0
        }
    }

    /// Record on each heavy atom the hydrogen count it is missing, from the
    /// bond orders currently in the graph.
    pub fn cache_implicit_hydrogens(&mut self) {
        let indices: Vec<NodeIndex> = self.graph.node_indices().collect();
        for index in indices {
            let missing = self.implied_hydrogens(index);
            if let Some(atom) = self.get_atom_mut(index) {
                if atom.element != Element::H {
                    atom.explicit_hydrogen = missing;
                }
            }
        }
    }

    /// Materialize hydrogens as graph atoms: the declared explicit count
    /// where the atom carries one, otherwise a fill to the default valence.
    /// Added atoms carry no coordinates.
    pub fn add_hydrogens(&mut self) {
        let indices: Vec<NodeIndex> = self.graph.node_indices().collect();
        for index in indices {
            let (element, implicit, explicit_hydrogen) = match self.get_atom(index) {
                Some(atom) => (atom.element, atom.implicit, atom.explicit_hydrogen),
                None => continue,
            };
            if element == Element::H {
                continue;
            }
            let hydrogens_to_add = if implicit {
                self.implied_hydrogens(index)
            } else {
                explicit_hydrogen
            };
            if let Some(atom) = self.get_atom_mut(index) {
                atom.explicit_hydrogen = 0;
                atom.implicit = false;
            }
            for _ in 0..hydrogens_to_add {
                self.connect_new_atom(Atom::from_element(Element::H), index, BondType::simple());
            }
        }
    }
}
