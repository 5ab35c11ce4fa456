use thiserror::Error;

/// Failures raised while converting between representations.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Malformed SMILES input.
    #[error("SMILES parse error: {0}")]
    Smiles(String),

    /// Malformed XYZ input.
    #[error("XYZ parse error: {0}")]
    Xyz(String),

    /// An element symbol outside the supported periodic table range.
    #[error("unknown element symbol: {0}")]
    UnknownElement(String),

    /// The distance-geometry embedding could not produce finite coordinates.
    #[error("3D embedding failed: {0}")]
    Embed(String),

    /// An operation needed coordinates an atom does not carry.
    #[error("atom {0} has no coordinates")]
    MissingCoordinates(usize),
}

pub type Result<T> = std::result::Result<T, ConversionError>;
