use phf::{Map, Set, phf_map, phf_set};

#[rustfmt::skip]
static SYMBOLS: [&str; 119] = [
    "",
    "H",  "He", "Li", "Be", "B",  "C",  "N",  "O",  "F",  "Ne",
    "Na", "Mg", "Al", "Si", "P",  "S",  "Cl", "Ar", "K",  "Ca",
    "Sc", "Ti", "V",  "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
    "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y",  "Zr",
    "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn",
    "Sb", "Te", "I",  "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd",
    "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb",
    "Lu", "Hf", "Ta", "W",  "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th",
    "Pa", "U",  "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm",
    "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds",
    "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

#[rustfmt::skip]
static SYMBOL_TO_NUMBER: Map<&'static str, u8> = phf_map! {
    "H"  => 1,   "He" => 2,   "Li" => 3,   "Be" => 4,   "B"  => 5,
    "C"  => 6,   "N"  => 7,   "O"  => 8,   "F"  => 9,   "Ne" => 10,
    "Na" => 11,  "Mg" => 12,  "Al" => 13,  "Si" => 14,  "P"  => 15,
    "S"  => 16,  "Cl" => 17,  "Ar" => 18,  "K"  => 19,  "Ca" => 20,
    "Sc" => 21,  "Ti" => 22,  "V"  => 23,  "Cr" => 24,  "Mn" => 25,
    "Fe" => 26,  "Co" => 27,  "Ni" => 28,  "Cu" => 29,  "Zn" => 30,
    "Ga" => 31,  "Ge" => 32,  "As" => 33,  "Se" => 34,  "Br" => 35,
    "Kr" => 36,  "Rb" => 37,  "Sr" => 38,  "Y"  => 39,  "Zr" => 40,
    "Nb" => 41,  "Mo" => 42,  "Tc" => 43,  "Ru" => 44,  "Rh" => 45,
    "Pd" => 46,  "Ag" => 47,  "Cd" => 48,  "In" => 49,  "Sn" => 50,
    "Sb" => 51,  "Te" => 52,  "I"  => 53,  "Xe" => 54,  "Cs" => 55,
    "Ba" => 56,  "La" => 57,  "Ce" => 58,  "Pr" => 59,  "Nd" => 60,
    "Pm" => 61,  "Sm" => 62,  "Eu" => 63,  "Gd" => 64,  "Tb" => 65,
    "Dy" => 66,  "Ho" => 67,  "Er" => 68,  "Tm" => 69,  "Yb" => 70,
    "Lu" => 71,  "Hf" => 72,  "Ta" => 73,  "W"  => 74,  "Re" => 75,
    "Os" => 76,  "Ir" => 77,  "Pt" => 78,  "Au" => 79,  "Hg" => 80,
    "Tl" => 81,  "Pb" => 82,  "Bi" => 83,  "Po" => 84,  "At" => 85,
    "Rn" => 86,  "Fr" => 87,  "Ra" => 88,  "Ac" => 89,  "Th" => 90,
    "Pa" => 91,  "U"  => 92,  "Np" => 93,  "Pu" => 94,  "Am" => 95,
    "Cm" => 96,  "Bk" => 97,  "Cf" => 98,  "Es" => 99,  "Fm" => 100,
    "Md" => 101, "No" => 102, "Lr" => 103, "Rf" => 104, "Db" => 105,
    "Sg" => 106, "Bh" => 107, "Hs" => 108, "Mt" => 109, "Ds" => 110,
    "Rg" => 111, "Cn" => 112, "Nh" => 113, "Fl" => 114, "Mc" => 115,
    "Lv" => 116, "Ts" => 117, "Og" => 118,
};

// Normal valences of the SMILES "organic subset", used to assign implicit
// hydrogens to atoms written without brackets. Multi-valent entries are
// ordered smallest first.
static DEFAULT_VALENCES: Map<u8, &'static [u8]> = phf_map! {
    5u8 => &[3],
    6u8 => &[4],
    7u8 => &[3, 5],
    8u8 => &[2],
    9u8 => &[1],
    15u8 => &[3, 5],
    16u8 => &[2, 4, 6],
    17u8 => &[1],
    35u8 => &[1],
    53u8 => &[1],
};

// Elements that may carry the aromatic flag (lowercase notation).
static AROMATIC_CANDIDATES: Set<u8> = phf_set! {
    5u8, 6u8, 7u8, 8u8, 15u8, 16u8, 33u8, 34u8,
};

/// Looks up the atomic number for a case-sensitive element symbol.
pub fn atomic_number(symbol: &str) -> Option<u8> {
    SYMBOL_TO_NUMBER.get(symbol).copied()
}

/// Returns the element symbol for an atomic number, if one exists.
pub fn symbol(atomic_number: u8) -> Option<&'static str> {
    SYMBOLS
        .get(atomic_number as usize)
        .copied()
        .filter(|s| !s.is_empty())
}

/// Returns the normal valences for an organic-subset element,
/// or an empty slice for elements outside the subset.
pub fn default_valences(atomic_number: u8) -> &'static [u8] {
    DEFAULT_VALENCES
        .get(&atomic_number)
        .copied()
        .unwrap_or(&[])
}

/// Whether an element is allowed to be flagged aromatic.
pub fn is_aromatic_candidate(atomic_number: u8) -> bool {
    AROMATIC_CANDIDATES.contains(&atomic_number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_number_resolves_common_symbols() {
        assert_eq!(atomic_number("H"), Some(1));
        assert_eq!(atomic_number("C"), Some(6));
        assert_eq!(atomic_number("Cl"), Some(17));
        assert_eq!(atomic_number("Br"), Some(35));
        assert_eq!(atomic_number("I"), Some(53));
    }

    #[test]
    fn atomic_number_is_case_sensitive() {
        assert_eq!(atomic_number("c"), None);
        assert_eq!(atomic_number("CL"), None);
        assert_eq!(atomic_number("h"), None);
    }

    #[test]
    fn atomic_number_rejects_unknown_symbols() {
        assert_eq!(atomic_number(""), None);
        assert_eq!(atomic_number("Xx"), None);
    }

    #[test]
    fn symbol_round_trips_with_atomic_number() {
        for z in 1u8..=118 {
            let sym = symbol(z).unwrap();
            assert_eq!(atomic_number(sym), Some(z));
        }
        assert_eq!(symbol(0), None);
    }

    #[test]
    fn default_valences_cover_the_organic_subset() {
        assert_eq!(default_valences(6), &[4]);
        assert_eq!(default_valences(7), &[3, 5]);
        assert_eq!(default_valences(16), &[2, 4, 6]);
        assert_eq!(default_valences(9), &[1]);
    }

    #[test]
    fn default_valences_are_empty_outside_the_subset() {
        assert!(default_valences(1).is_empty());
        assert!(default_valences(26).is_empty());
    }

    #[test]
    fn aromatic_candidates_match_lowercase_notation() {
        assert!(is_aromatic_candidate(6));
        assert!(is_aromatic_candidate(7));
        assert!(is_aromatic_candidate(16));
        assert!(!is_aromatic_candidate(1));
        assert!(!is_aromatic_candidate(9));
        assert!(!is_aromatic_candidate(26));
    }
}
