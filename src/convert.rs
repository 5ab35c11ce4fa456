//! Conversions between XYZ geometry blocks and SMILES strings.

use std::sync::Mutex;

use lazy_static::lazy_static;

use crate::embed::{embed_molecule, EmbedConfig};
use crate::error::Result;
use crate::molecule::Molecule;
use crate::perceive;
use crate::xyz;

lazy_static! {
    /// 3D generation runs one at a time process-wide.
    static ref GENERATE_LOCK: Mutex<()> = Mutex::new(());
}

/// Parse an XYZ block and perceive connectivity and bond orders.
pub fn xyz_to_mol(xyz_block: &str) -> Result<Molecule> {
    let mut molecule = xyz::parse_xyz(xyz_block)?;
    perceive::determine_connectivity(&mut molecule)?;
    perceive::determine_bond_orders(&mut molecule)?;
    Ok(molecule)
}

/// Parse an XYZ block and serialize the perceived molecule as SMILES.
pub fn xyz_to_smiles(xyz_block: &str) -> Result<String> {
    let molecule = xyz_to_mol(xyz_block)?;
    Ok(molecule.to_smiles())
}

/// Generate an XYZ-format structure from a SMILES string.
///
/// Parses the SMILES, adds explicit hydrogens, embeds 3D coordinates with a
/// fixed seed, relaxes the geometry, and writes the XYZ block.
pub fn smiles_to_xyz(smiles: &str) -> Result<String> {
    let _guard = GENERATE_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let mut molecule = Molecule::from_smiles(smiles)?;
    molecule.add_hydrogens();
    embed_molecule(&mut molecule, &EmbedConfig::default())?;
    xyz::write_xyz(&molecule)
}

/// Parse an XYZ block of an unsaturated structure: perceive connectivity,
/// re-derive every bond's multiplicity from the interatomic distances, and
/// add the missing hydrogens as explicit atoms.
///
/// The added hydrogens carry no coordinates.
// TODO: generate positions for the added hydrogens by re-embedding the conformer
pub fn unsaturated_xyz_to_mol(xyz_block: &str) -> Result<Molecule> {
    let mut molecule = xyz::parse_xyz(xyz_block)?;
    perceive::determine_connectivity(&mut molecule)?;
    perceive::assign_orders_by_distance(&mut molecule)?;
    molecule.cache_implicit_hydrogens();
    molecule.add_hydrogens();
    Ok(molecule)
}
