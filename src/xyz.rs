//! XYZ-format geometry text: atom count line, comment line, then one
//! `symbol x y z` line per atom, coordinates in angstroms.

use std::str::FromStr;

use nalgebra::Point3;

use crate::definitions::{atom::Atom, element::Element};
use crate::error::{ConversionError, Result};
use crate::molecule::Molecule;
use crate::tokenizer::XYZ_LINE_RE;

/// Parse an XYZ block into a molecule with coordinates and no bonds.
pub fn parse_xyz(xyz: &str) -> Result<Molecule> {
    let mut lines = xyz.lines();
    let count_line = lines
        .next()
        .ok_or_else(|| ConversionError::Xyz("empty XYZ block".to_string()))?;
    let declared: usize = count_line.trim().parse().map_err(|_| {
        ConversionError::Xyz(format!("atom count expected on first line, got {:?}", count_line))
    })?;
    // second line is a free-form comment
    let _comment = lines.next();

    let mut molecule = Molecule::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let captured = XYZ_LINE_RE
            .captures(line)
            .ok_or_else(|| ConversionError::Xyz(format!("malformed atom line {:?}", line)))?;
        let symbol = &captured["element"];
        let element = Element::from_str(&capitalize(symbol))
            .map_err(|_| ConversionError::UnknownElement(symbol.to_string()))?;
        let x = parse_coordinate(&captured["x"])?;
        let y = parse_coordinate(&captured["y"])?;
        let z = parse_coordinate(&captured["z"])?;
        molecule.add_atom_at(Atom::from_element(element), Point3::new(x, y, z));
    }

    if molecule.atom_count() != declared {
        return Err(ConversionError::Xyz(format!(
            "declared {} atoms but found {}",
            declared,
            molecule.atom_count()
        )));
    }
    Ok(molecule)
}

/// Write a molecule with full coordinates as an XYZ block.
pub fn write_xyz(molecule: &Molecule) -> Result<String> {
    let mut out = format!("{}\n\n", molecule.atom_count());
    for index in molecule.graph.node_indices() {
        let atom = molecule
            .get_atom(index)
            .expect("iterating the molecule's own indices");
        let position = molecule
            .position(index)
            .ok_or(ConversionError::MissingCoordinates(index.index()))?;
        out.push_str(&format!(
            "{:<3}{:>14.6}{:>14.6}{:>14.6}\n",
            atom.element.as_ref(),
            position.x,
            position.y,
            position.z
        ));
    }
    Ok(out)
}

fn parse_coordinate(text: &str) -> Result<f64> {
    text.parse::<f64>()
        .map_err(|_| ConversionError::Xyz(format!("bad coordinate {:?}", text)))
}

fn capitalize(symbol: &str) -> String {
    let mut normalized = symbol[0..1].to_uppercase();
    normalized.push_str(&symbol[1..].to_lowercase());
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    pub const WATER_XYZ: &str = "3\nwater\nO   0.000000   0.000000   0.117300\nH   0.000000   0.757200  -0.469200\nH   0.000000  -0.757200  -0.469200\n";

    #[test]
    fn parse_water() {
        let molecule = parse_xyz(WATER_XYZ).unwrap();
        assert_eq!(molecule.atom_count(), 3);
        assert_eq!(molecule.bond_count(), 0);
        assert!(molecule.has_full_coordinates());
        assert_eq!(
            molecule.get_atom(petgraph::graph::NodeIndex::new(0)).unwrap().element,
            Element::O
        );
        let d = molecule
            .distance_pm(
                petgraph::graph::NodeIndex::new(0),
                petgraph::graph::NodeIndex::new(1),
            )
            .unwrap();
        assert!((d - 95.8).abs() < 1.0, "O-H distance {} pm", d);
    }

    #[test]
    fn parse_normalizes_symbol_case() {
        let molecule = parse_xyz("1\n\ncl 0.0 0.0 0.0\n").unwrap();
        assert_eq!(
            molecule.get_atom(petgraph::graph::NodeIndex::new(0)).unwrap().element,
            Element::Cl
        );
    }

    #[test]
    fn reject_malformed_blocks() {
        assert!(parse_xyz("").is_err());
        assert!(parse_xyz("abc\n\n").is_err());
        assert!(parse_xyz("2\ncomment\nO 0.0 0.0 0.0\n").is_err());
        assert!(parse_xyz("1\ncomment\nXx 0.0 0.0 0.0\n").is_err());
        assert!(parse_xyz("1\ncomment\nO 0.0 0.0\n").is_err());
    }

    #[test]
    fn write_round_trip() {
        let molecule = parse_xyz(WATER_XYZ).unwrap();
        let written = write_xyz(&molecule).unwrap();
        let reparsed = parse_xyz(&written).unwrap();
        assert_eq!(reparsed.atom_count(), 3);
        assert!(written.starts_with("3\n\nO "));
    }

    #[test]
    fn write_requires_coordinates() {
        let mut molecule = parse_xyz(WATER_XYZ).unwrap();
        molecule.add_atom(Atom::from_element(Element::H));
        assert!(matches!(
            write_xyz(&molecule),
            Err(ConversionError::MissingCoordinates(_))
        ));
    }
}
