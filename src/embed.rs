//! Distance-geometry embedding of molecular graphs into 3D coordinates.
//!
//! Bounds come from covalent radii with per-order shortening, 1-3 distances
//! from idealized bond angles, and non-bonded floors from van der Waals
//! radii. After triangle smoothing, distances are sampled inside the bounds,
//! turned into coordinates through the metric matrix, and relaxed back
//! toward the bounds.

use log::warn;
use nalgebra::{Point3, Vector3};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::definitions::bond::BondType;
use crate::error::{ConversionError, Result};
use crate::molecule::Molecule;

/// Settings for 3D coordinate generation.
#[derive(Debug, Clone)]
pub struct EmbedConfig {
    /// RNG seed; a fixed seed makes the output reproducible.
    pub random_seed: u64,
    /// Iterations of the bounds-relaxation pass after the initial embedding.
    pub refine_steps: usize,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        EmbedConfig {
            random_seed: 1,
            refine_steps: 500,
        }
    }
}

/// Generate coordinates for every atom of the molecule, in angstroms.
pub fn embed_molecule(molecule: &mut Molecule, config: &EmbedConfig) -> Result<()> {
    let n = molecule.atom_count();
    if n == 0 {
        return Ok(());
    }
    let indices: Vec<NodeIndex> = molecule.graph.node_indices().collect();
    if n == 1 {
        molecule.set_position(indices[0], Point3::origin());
        return Ok(());
    }

    let (lower, upper) = build_bounds(molecule);
    let (lower, upper) = smooth_bounds(lower, upper);

    let mut rng = StdRng::seed_from_u64(config.random_seed);
    let mut coordinates = sample_positions(&lower, &upper, n, &mut rng)?;
    let residual = refine_positions(&mut coordinates, &lower, &upper, config.refine_steps);
    if residual > 0.5 {
        warn!(
            "bounds violations of {:.2} A remain after {} relaxation steps",
            residual, config.refine_steps
        );
    }

    for (i, index) in indices.iter().enumerate() {
        molecule.set_position(*index, Point3::from(coordinates[i]));
    }
    Ok(())
}

fn build_bounds(molecule: &Molecule) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let n = molecule.atom_count();
    let mut lower = vec![vec![0.0_f64; n]; n];
    let mut upper = vec![vec![1000.0_f64; n]; n];

    // 1-2 distances from covalent radii, shortened per bond order
    for edge in molecule.graph.edge_references() {
        let a = edge.source();
        let b = edge.target();
        let element_a = molecule.get_atom(a).expect("node indices are dense").element;
        let element_b = molecule.get_atom(b).expect("node indices are dense").element;
        let reference = (element_a.covalent_radius_pm()
            + element_b.covalent_radius_pm()
            + edge.weight().length_adjustment_pm())
            / 100.0;
        let margin = 0.05;
        let (i, j) = (a.index(), b.index());
        lower[i][j] = reference - margin;
        lower[j][i] = reference - margin;
        upper[i][j] = reference + margin;
        upper[j][i] = reference + margin;
    }

    // 1-3 distances by the law of cosines around each center
    for j in 0..n {
        let center = NodeIndex::new(j);
        let neighbors = molecule.neighbors(center);
        if neighbors.len() < 2 {
            continue;
        }
        let angle = angle_estimate(molecule, center, neighbors.len());
        for a_position in 0..neighbors.len() {
            for b_position in (a_position + 1)..neighbors.len() {
                let i = neighbors[a_position].index();
                let k = neighbors[b_position].index();
                let d_ij = (lower[i][j] + upper[i][j]) / 2.0;
                let d_jk = (lower[j][k] + upper[j][k]) / 2.0;
                if d_ij < 0.01 || d_jk < 0.01 {
                    continue;
                }
                let d_ik = (d_ij * d_ij + d_jk * d_jk - 2.0 * d_ij * d_jk * angle.cos()).sqrt();
                let margin = 0.15;
                let new_lower = (d_ik - margin).max(lower[i][k]);
                let new_upper = (d_ik + margin).min(upper[i][k]);
                lower[i][k] = new_lower;
                lower[k][i] = new_lower;
                upper[i][k] = new_upper;
                upper[k][i] = new_upper;
            }
        }
    }

    // non-bonded floors from van der Waals radii
    for i in 0..n {
        for j in (i + 1)..n {
            if lower[i][j] < 0.01 {
                let element_i = molecule
                    .get_atom(NodeIndex::new(i))
                    .expect("node indices are dense")
                    .element;
                let element_j = molecule
                    .get_atom(NodeIndex::new(j))
                    .expect("node indices are dense")
                    .element;
                let floor = (element_i.vdw_radius_pm() + element_j.vdw_radius_pm()) / 100.0 * 0.7;
                lower[i][j] = floor;
                lower[j][i] = floor;
            }
        }
    }

    (lower, upper)
}

fn angle_estimate(molecule: &Molecule, index: NodeIndex, degree: usize) -> f64 {
    match degree {
        2 => {
            if has_multiple_bond(molecule, index) {
                std::f64::consts::PI
            } else {
                120.0_f64.to_radians()
            }
        }
        3 => {
            if is_sp2(molecule, index) {
                120.0_f64.to_radians()
            } else {
                109.5_f64.to_radians()
            }
        }
        _ => 109.5_f64.to_radians(),
    }
}

fn has_multiple_bond(molecule: &Molecule, index: NodeIndex) -> bool {
    molecule.graph.edges(index).any(|edge| {
        matches!(edge.weight(), BondType::Double | BondType::Triple)
    })
}

fn is_sp2(molecule: &Molecule, index: NodeIndex) -> bool {
    if molecule
        .get_atom(index)
        .map(|atom| atom.aromatic)
        .unwrap_or(false)
    {
        return true;
    }
    molecule.graph.edges(index).any(|edge| {
        matches!(edge.weight(), BondType::Double | BondType::Aromatic)
    })
}

/// Floyd-Warshall triangle smoothing of the bounds matrices.
fn smooth_bounds(
    mut lower: Vec<Vec<f64>>,
    mut upper: Vec<Vec<f64>>,
) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let n = lower.len();

    for k in 0..n {
        for i in 0..n {
            for j in 0..n {
                if i == j || i == k || j == k {
                    continue;
                }
                let sum = upper[i][k] + upper[k][j];
                if sum < upper[i][j] {
                    upper[i][j] = sum;
                }
            }
        }
    }

    for k in 0..n {
        for i in 0..n {
            for j in 0..n {
                if i == j || i == k || j == k {
                    continue;
                }
                let difference = lower[i][k] - upper[k][j];
                if difference > lower[i][j] {
                    lower[i][j] = difference;
                }
            }
        }
    }

    for i in 0..n {
        for j in 0..n {
            if lower[i][j] > upper[i][j] {
                let average = (lower[i][j] + upper[i][j]) / 2.0;
                lower[i][j] = average;
                upper[i][j] = average;
            }
            if lower[i][j] < 0.0 {
                lower[i][j] = 0.0;
            }
        }
    }

    (lower, upper)
}

/// Sample distances inside the bounds and turn the metric matrix into 3D
/// coordinates through power iteration on its top three eigenpairs.
fn sample_positions(
    lower: &[Vec<f64>],
    upper: &[Vec<f64>],
    n: usize,
    rng: &mut StdRng,
) -> Result<Vec<Vector3<f64>>> {
    let mut dist = vec![vec![0.0_f64; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let lo = lower[i][j].max(0.001);
            let hi = upper[i][j].max(lo + 0.001);
            let d = lo + rng.gen::<f64>() * (hi - lo);
            dist[i][j] = d;
            dist[j][i] = d;
        }
    }

    let mut metric = vec![vec![0.0_f64; n]; n];
    for i in 0..n {
        for j in 0..n {
            metric[i][j] =
                0.5 * (dist[0][i] * dist[0][i] + dist[0][j] * dist[0][j] - dist[i][j] * dist[i][j]);
        }
    }

    let mut coordinates = vec![Vector3::zeros(); n];
    let mut deflated = metric;
    for dimension in 0..3 {
        let mut v = vec![1.0 / (n as f64).sqrt(); n];
        let mut eigenvalue = 0.0_f64;
        for _ in 0..100 {
            let mut mv = vec![0.0_f64; n];
            for i in 0..n {
                for j in 0..n {
                    mv[i] += deflated[i][j] * v[j];
                }
            }
            eigenvalue = mv.iter().zip(v.iter()).map(|(a, b)| a * b).sum();
            let norm = mv.iter().map(|x| x * x).sum::<f64>().sqrt();
            if norm < 1e-12 {
                break;
            }
            for i in 0..n {
                v[i] = mv[i] / norm;
            }
        }
        let scale = if eigenvalue > 0.0 { eigenvalue.sqrt() } else { 0.0 };
        for i in 0..n {
            coordinates[i][dimension] = v[i] * scale;
        }
        for i in 0..n {
            for j in 0..n {
                deflated[i][j] -= eigenvalue * v[i] * v[j];
            }
        }
    }

    if coordinates
        .iter()
        .any(|c| !(c.x.is_finite() && c.y.is_finite() && c.z.is_finite()))
    {
        return Err(ConversionError::Embed(
            "metric matrix produced non-finite coordinates".to_string(),
        ));
    }
    Ok(coordinates)
}

/// Nudge positions toward the distance bounds: the geometry relaxation run
/// after the raw embedding. Returns the largest remaining violation.
fn refine_positions(
    coordinates: &mut [Vector3<f64>],
    lower: &[Vec<f64>],
    upper: &[Vec<f64>],
    steps: usize,
) -> f64 {
    let n = coordinates.len();
    let step_size = 0.3;
    let mut worst = 0.0_f64;
    for _ in 0..steps {
        let mut shifts = vec![Vector3::zeros(); n];
        worst = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                let delta = coordinates[j] - coordinates[i];
                let distance = delta.norm().max(1e-9);
                let direction = delta / distance;
                let target = if distance < lower[i][j] {
                    lower[i][j]
                } else if distance > upper[i][j] {
                    upper[i][j]
                } else {
                    continue;
                };
                let violation = target - distance;
                worst = worst.max(violation.abs());
                let shift = direction * (violation * 0.5 * step_size);
                shifts[j] += shift;
                shifts[i] -= shift;
            }
        }
        if worst < 1e-4 {
            break;
        }
        for i in 0..n {
            coordinates[i] += shifts[i];
        }
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use petgraph::graph::NodeIndex;

    fn embedded(smiles: &str) -> Molecule {
        let mut molecule = Molecule::from_smiles(smiles).unwrap();
        molecule.add_hydrogens();
        embed_molecule(&mut molecule, &EmbedConfig::default()).unwrap();
        molecule
    }

    #[test]
    fn water_geometry_is_reasonable() {
        let molecule = embedded("O");
        assert_eq!(molecule.atom_count(), 3);
        assert!(molecule.has_full_coordinates());
        for h in [1, 2] {
            let d = molecule
                .distance_pm(NodeIndex::new(0), NodeIndex::new(h))
                .unwrap();
            assert!((80.0..120.0).contains(&d), "O-H distance {} pm", d);
        }
        let h_h = molecule
            .distance_pm(NodeIndex::new(1), NodeIndex::new(2))
            .unwrap();
        assert!(h_h > 120.0, "H-H distance {} pm", h_h);
    }

    #[test]
    fn ethane_carbon_bond_length() {
        let molecule = embedded("CC");
        assert_eq!(molecule.atom_count(), 8);
        let d = molecule
            .distance_pm(NodeIndex::new(0), NodeIndex::new(1))
            .unwrap();
        assert!((130.0..180.0).contains(&d), "C-C distance {} pm", d);
    }

    #[test]
    fn triple_bond_is_shorter_than_single() {
        let n2 = embedded("N#N");
        let d_triple = n2
            .distance_pm(NodeIndex::new(0), NodeIndex::new(1))
            .unwrap();
        let ethane = embedded("CC");
        let d_single = ethane
            .distance_pm(NodeIndex::new(0), NodeIndex::new(1))
            .unwrap();
        assert!(d_triple < d_single, "{} >= {}", d_triple, d_single);
    }

    #[test]
    fn single_atom_sits_at_origin() {
        let mut molecule = Molecule::from_smiles("[Ar]").unwrap();
        molecule.add_hydrogens();
        embed_molecule(&mut molecule, &EmbedConfig::default()).unwrap();
        let position = molecule.position(NodeIndex::new(0)).unwrap();
        assert_relative_eq!(position.x, 0.0);
        assert_relative_eq!(position.y, 0.0);
        assert_relative_eq!(position.z, 0.0);
    }

    #[test]
    fn fixed_seed_is_deterministic() {
        let first = embedded("CCO");
        let second = embedded("CCO");
        for i in 0..first.atom_count() {
            let a = first.position(NodeIndex::new(i)).unwrap();
            let b = second.position(NodeIndex::new(i)).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn different_seeds_differ() {
        let mut first = Molecule::from_smiles("CCO").unwrap();
        first.add_hydrogens();
        embed_molecule(
            &mut first,
            &EmbedConfig {
                random_seed: 1,
                ..EmbedConfig::default()
            },
        )
        .unwrap();
        let mut second = Molecule::from_smiles("CCO").unwrap();
        second.add_hydrogens();
        embed_molecule(
            &mut second,
            &EmbedConfig {
                random_seed: 2,
                ..EmbedConfig::default()
            },
        )
        .unwrap();
        let moved = (0..first.atom_count()).any(|i| {
            first.position(NodeIndex::new(i)).unwrap() != second.position(NodeIndex::new(i)).unwrap()
        });
        assert!(moved);
    }

    #[test]
    fn empty_molecule_is_a_no_op() {
        let mut molecule = Molecule::new();
        embed_molecule(&mut molecule, &EmbedConfig::default()).unwrap();
        assert_eq!(molecule.atom_count(), 0);
    }
}
