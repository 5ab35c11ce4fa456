//! Conversions between XYZ coordinate blocks and SMILES strings, with bond
//! connectivity and order inferred from raw 3D coordinates.
//!
//! # Example
//!
//! ```
//! use smiles_with_coordinates::{smiles_to_xyz, xyz_to_smiles};
//!
//! let xyz = smiles_to_xyz("O").unwrap();
//! assert_eq!(xyz.lines().next(), Some("3"));
//! assert_eq!(xyz_to_smiles(&xyz).unwrap(), "O");
//! ```

pub mod constants;
pub mod convert;
pub mod definitions;
pub mod embed;
pub mod error;
pub mod molecule;
pub mod perceive;
mod tokenizer;
pub mod xyz;

pub use convert::{smiles_to_xyz, unsaturated_xyz_to_mol, xyz_to_mol, xyz_to_smiles};
pub use error::{ConversionError, Result};
pub use molecule::Molecule;
