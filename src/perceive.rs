//! Bond perception from 3D coordinates: connectivity from covalent radii,
//! valence-aware order assignment, and the distance-threshold classifier.

use log::debug;
use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::constants::{
    double_bond_length, single_bond_length, triple_bond_length, BOND_MARGINS, CONNECTIVITY_MARGIN,
    PROMOTION_RATIO,
};
use crate::definitions::{bond::BondType, element::Element};
use crate::error::{ConversionError, Result};
use crate::molecule::Molecule;

/// Bond every atom pair whose separation is within the sum of covalent radii
/// plus the connectivity margin. All bonds start single.
pub fn determine_connectivity(molecule: &mut Molecule) -> Result<()> {
    let indices: Vec<NodeIndex> = molecule.graph.node_indices().collect();
    if let Some(missing) = indices.iter().find(|i| molecule.position(**i).is_none()) {
        return Err(ConversionError::MissingCoordinates(missing.index()));
    }
    for (position, &atom_a) in indices.iter().enumerate() {
        for &atom_b in &indices[position + 1..] {
            let distance = molecule
                .distance_pm(atom_a, atom_b)
                .expect("coordinates checked above");
            let cutoff = element_of(molecule, atom_a).covalent_radius_pm()
                + element_of(molecule, atom_b).covalent_radius_pm()
                + CONNECTIVITY_MARGIN;
            if distance < cutoff {
                molecule.connect(atom_a, atom_b, BondType::simple());
            }
        }
    }
    Ok(())
}

/// Classify a bond as single, double or triple from the distance between its
/// atoms in pm: triple if below the margin-adjusted triple threshold, else
/// double if below the margin-adjusted double threshold, else single. Pairs
/// without a table entry stay single.
pub fn classify_bond_order(atom_a: Element, atom_b: Element, distance_pm: f64) -> BondType {
    if let Some(reference) = triple_bond_length(atom_a, atom_b) {
        if distance_pm < reference + BOND_MARGINS[2] {
            return BondType::Triple;
        }
    }
    if let Some(reference) = double_bond_length(atom_a, atom_b) {
        if distance_pm < reference + BOND_MARGINS[1] {
            return BondType::Double;
        }
    }
    BondType::simple()
}

/// Re-derive every bond's multiplicity from the interatomic distance alone,
/// ignoring valence.
pub fn assign_orders_by_distance(molecule: &mut Molecule) -> Result<()> {
    let edges: Vec<EdgeIndex> = molecule.graph.edge_indices().collect();
    for edge in edges {
        let (atom_a, atom_b) = molecule
            .graph
            .edge_endpoints(edge)
            .expect("iterating the molecule's own edges");
        let distance = molecule
            .distance_pm(atom_a, atom_b)
            .ok_or(ConversionError::MissingCoordinates(atom_a.index()))?;
        let element_a = element_of(molecule, atom_a);
        let element_b = element_of(molecule, atom_b);
        let order = classify_bond_order(element_a, element_b, distance);
        debug!(
            "{:?}-{:?} at {:.1} pm classified {:?}",
            element_a, element_b, distance, order
        );
        *molecule
            .graph
            .edge_weight_mut(edge)
            .expect("iterating the molecule's own edges") = order;
    }
    Ok(())
}

/// Distance-guided bond order assignment that respects element valences.
///
/// Each atom starts with its default valence (charge adjusted) minus the
/// orders already in the graph. The bond with the smallest distance relative
/// to its reference single-bond length is promoted one order at a time while
/// both endpoints retain residual valence and the ratio stays under the
/// promotion threshold.
pub fn determine_bond_orders(molecule: &mut Molecule) -> Result<()> {
    let n = molecule.atom_count();
    let mut residual: Vec<isize> = (0..n)
        .map(|i| {
            let index = NodeIndex::new(i);
            let atom = molecule.get_atom(index).expect("node indices are dense");
            atom.element.default_hydrogen() as isize + atom.charge
                - molecule.bond_order_sum(index) as isize
        })
        .collect();

    loop {
        let mut best: Option<(EdgeIndex, f64)> = None;
        for edge in molecule.graph.edge_indices() {
            let (atom_a, atom_b) = molecule
                .graph
                .edge_endpoints(edge)
                .expect("iterating the molecule's own edges");
            if residual[atom_a.index()] <= 0 || residual[atom_b.index()] <= 0 {
                continue;
            }
            let current = *molecule
                .graph
                .edge_weight(edge)
                .expect("iterating the molecule's own edges");
            if current == BondType::Triple {
                continue;
            }
            let element_a = element_of(molecule, atom_a);
            let element_b = element_of(molecule, atom_b);
            let reference = single_bond_length(element_a, element_b)
                .unwrap_or_else(|| element_a.covalent_radius_pm() + element_b.covalent_radius_pm());
            let distance = molecule
                .distance_pm(atom_a, atom_b)
                .ok_or(ConversionError::MissingCoordinates(atom_a.index()))?;
            let ratio = distance / reference;
            if ratio >= PROMOTION_RATIO {
                continue;
            }
            if best.map_or(true, |(_, best_ratio)| ratio < best_ratio) {
                best = Some((edge, ratio));
            }
        }
        let (edge, ratio) = match best {
            Some(found) => found,
            None => break,
        };
        let (atom_a, atom_b) = molecule
            .graph
            .edge_endpoints(edge)
            .expect("iterating the molecule's own edges");
        let current = *molecule
            .graph
            .edge_weight(edge)
            .expect("iterating the molecule's own edges");
        let promoted = match current {
            BondType::Single(_) => BondType::Double,
            BondType::Double => BondType::Triple,
            other => other,
        };
        *molecule
            .graph
            .edge_weight_mut(edge)
            .expect("iterating the molecule's own edges") = promoted;
        debug!(
            "promoted bond {}-{} (ratio {:.3}) to {:?}",
            atom_a.index(),
            atom_b.index(),
            ratio,
            promoted
        );
        residual[atom_a.index()] -= 1;
        residual[atom_b.index()] -= 1;
    }
    Ok(())
}

fn element_of(molecule: &Molecule, index: NodeIndex) -> Element {
    molecule
        .get_atom(index)
        .expect("iterating the molecule's own indices")
        .element
}
