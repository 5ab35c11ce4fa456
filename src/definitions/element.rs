use strum_macros::{AsRefStr, EnumString};

#[derive(EnumString, AsRefStr, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Element {
    H = 1,
    He,
    Li,
    Be,
    B,
    C,
    N,
    O,
    F,
    Ne,
    Na,
    Mg,
    Al,
    Si,
    P,
    S,
    Cl,
    Ar,
    K,
    Ca,
    Sc,
    Ti,
    V,
    Cr,
    Mn,
    Fe,
    Co,
    Ni,
    Cu,
    Zn,
    Ga,
    Ge,
    As,
    Se,
    Br,
    Kr,
    Rb,
    Sr,
    Y,
    Zr,
    Nb,
    Mo,
    Tc,
    Ru,
    Rh,
    Pd,
    Ag,
    Cd,
    In,
    Sn,
    Sb,
    Te,
    I,
    Xe,
    Cs,
    Ba,
    La,
    Ce,
    Pr,
    Nd,
    Pm,
    Sm,
    Eu,
    Gd,
    Tb,
    Dy,
    Ho,
    Er,
    Tm,
    Yb,
    Lu,
    Hf,
    Ta,
    W,
    Re,
    Os,
    Ir,
    Pt,
    Au,
    Hg,
    Tl,
    Pb,
    Bi,
    Po,
    At,
    Rn,
}

impl Element {
    pub fn atomic_number(&self) -> u8 {
        *self as u8
    }

    /// Hydrogen count a bare, uncharged atom of this element carries.
    pub fn default_hydrogen(&self) -> usize {
        match self {
            Self::H | Self::F | Self::Cl | Self::Br | Self::I => 1,
            Self::O | Self::S => 2,
            Self::B | Self::N | Self::P => 3,
            Self::C | Self::Si => 4,
            _ => 0,
        }
    }

    pub fn is_organic_subset(&self) -> bool {
        match self {
            Self::B
            | Self::C
            | Self::N
            | Self::O
            | Self::F
            | Self::P
            | Self::S
            | Self::Cl
            | Self::Br
            | Self::I => true,
            _ => false,
        }
    }

    /// Single-bond covalent radius, in pm.
    pub fn covalent_radius_pm(&self) -> f64 {
        match self {
            Self::H => 31.0,
            Self::B => 84.0,
            Self::C => 76.0,
            Self::N => 71.0,
            Self::O => 66.0,
            Self::F => 57.0,
            Self::Si => 111.0,
            Self::P => 107.0,
            Self::S => 105.0,
            Self::Cl => 102.0,
            Self::Se => 120.0,
            Self::Br => 120.0,
            Self::I => 139.0,
            _ => 77.0,
        }
    }

    /// Van der Waals radius, in pm.
    pub fn vdw_radius_pm(&self) -> f64 {
        match self {
            Self::H => 120.0,
            Self::C => 170.0,
            Self::N => 155.0,
            Self::O => 152.0,
            Self::F => 147.0,
            Self::P => 180.0,
            Self::S => 180.0,
            Self::Cl => 175.0,
            Self::Br => 185.0,
            Self::I => 198.0,
            _ => 170.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parse_symbols() {
        assert_eq!(Element::from_str("C").unwrap(), Element::C);
        assert_eq!(Element::from_str("Cl").unwrap(), Element::Cl);
        assert_eq!(Element::from_str("Fe").unwrap(), Element::Fe);
        assert!(Element::from_str("Zz").is_err());
    }

    #[test]
    fn atomic_numbers() {
        assert_eq!(Element::H.atomic_number(), 1);
        assert_eq!(Element::C.atomic_number(), 6);
        assert_eq!(Element::Pd.atomic_number(), 46);
        assert_eq!(Element::I.atomic_number(), 53);
    }

    #[test]
    fn default_hydrogens() {
        assert_eq!(Element::C.default_hydrogen(), 4);
        assert_eq!(Element::N.default_hydrogen(), 3);
        assert_eq!(Element::O.default_hydrogen(), 2);
        assert_eq!(Element::Cl.default_hydrogen(), 1);
        assert_eq!(Element::Fe.default_hydrogen(), 0);
    }

    #[test]
    fn organic_subset_membership() {
        assert!(Element::C.is_organic_subset());
        assert!(Element::Br.is_organic_subset());
        assert!(!Element::H.is_organic_subset());
        assert!(!Element::Fe.is_organic_subset());
    }

    #[test]
    fn radii_lookup() {
        assert_eq!(Element::C.covalent_radius_pm(), 76.0);
        assert_eq!(Element::H.covalent_radius_pm(), 31.0);
        assert_eq!(Element::Fe.covalent_radius_pm(), 77.0);
        assert_eq!(Element::O.vdw_radius_pm(), 152.0);
    }
}
