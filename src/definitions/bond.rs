use crate::tokenizer::BOND_RE;

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum BondType {
    Single(SingleBondType),
    Double,
    Triple,
    Aromatic,
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum SingleBondType {
    Normal,
    LeftUp,
    RightUp,
}

impl BondType {
    pub fn simple() -> Self {
        Self::Single(SingleBondType::Normal)
    }

    pub fn from_str(s: &str) -> Option<Self> {
        if BOND_RE.is_match(s) {
            match s {
                "-" => Some(Self::Single(SingleBondType::Normal)),
                "/" => Some(Self::Single(SingleBondType::RightUp)),
                "\\" => Some(Self::Single(SingleBondType::LeftUp)),
                "=" => Some(Self::Double),
                "#" => Some(Self::Triple),
                ":" => Some(Self::Aromatic),
                _ => None,
            }
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single(SingleBondType::Normal) => "-",
            Self::Single(SingleBondType::RightUp) => "/",
            Self::Single(SingleBondType::LeftUp) => "\\",
            Self::Double => "=",
            Self::Triple => "#",
            Self::Aromatic => ":",
        }
    }

    /// Valence consumed at each endpoint. Aromatic bonds count one here;
    /// the extra aromatic valence is handled per atom.
    pub fn order(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Aromatic => 1,
            Self::Double => 2,
            Self::Triple => 3,
        }
    }

    /// Shrink applied to the covalent-radius reference length in the
    /// embedding bounds matrix, in pm.
    pub fn length_adjustment_pm(&self) -> f64 {
        match self {
            Self::Single(_) => 0.0,
            Self::Aromatic => -4.0,
            Self::Double => -10.0,
            Self::Triple => -16.0,
        }
    }

    pub fn is_aromatic(&self) -> bool {
        *self == Self::Aromatic
    }

    /// Any single bond, directional or not.
    pub fn is_single(&self) -> bool {
        matches!(self, Self::Single(_))
    }

    /// A plain single bond without a `/` or `\` direction mark.
    pub fn is_normal_single(&self) -> bool {
        matches!(self, Self::Single(SingleBondType::Normal))
    }
}
