/// Represents the order of a chemical bond between two atoms.
///
/// Aromatic bonds are a distinct order rather than a flag on single or
/// double bonds, mirroring how ring perception rewrites Kekulé input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// Number of valence units this bond consumes on each endpoint.
    ///
    /// Aromatic bonds count as one unit; the extra half-bond of a
    /// delocalized system is accounted for separately when implicit
    /// hydrogens are assigned.
    pub fn valence_units(&self) -> u8 {
        match self {
            BondOrder::Single | BondOrder::Aromatic => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        }
    }
}

/// Represents a single atom in a parsed molecule.
///
/// Hydrogens that were folded into a heavy atom during parsing are carried
/// in `hydrogen_count` and do not occupy their own atom index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Atom {
    /// Atomic number (1 = hydrogen, 6 = carbon, ...).
    pub atomic_number: u8,
    /// Formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Total hydrogen count attached to this atom but not present as
    /// graph atoms (implicit plus folded explicit hydrogens).
    pub hydrogen_count: u8,
    /// Isotope mass number; 0 means natural abundance.
    pub isotope: u16,
    /// Whether the atom is part of an aromatic system.
    pub is_aromatic: bool,
}

/// Represents a bond between two atoms, addressed by their dense indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bond {
    pub a: usize,
    pub b: usize,
    pub order: BondOrder,
}

impl Bond {
    /// Returns the endpoint opposite to `index`, or `None` if the bond
    /// does not touch `index`.
    pub fn other(&self, index: usize) -> Option<usize> {
        if self.a == index {
            Some(self.b)
        } else if self.b == index {
            Some(self.a)
        } else {
            None
        }
    }
}

/// A parsed molecular structure with a fixed, 0-indexed set of atoms.
///
/// The atom vector index is the stable atom index that per-atom results
/// are aligned with. A molecule is immutable once constructed; the
/// adjacency list is built once and cached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Molecule {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    /// Per-atom list of (neighbor atom index, bond index) pairs.
    adjacency: Vec<Vec<(usize, usize)>>,
}

impl Molecule {
    /// Assembles a molecule from atom and bond lists, building the
    /// adjacency cache. Callers must pass bonds whose endpoints are
    /// valid atom indices.
    pub(crate) fn from_parts(atoms: Vec<Atom>, bonds: Vec<Bond>) -> Self {
        let mut adjacency = vec![Vec::new(); atoms.len()];
        for (bond_index, bond) in bonds.iter().enumerate() {
            adjacency[bond.a].push((bond.b, bond_index));
            adjacency[bond.b].push((bond.a, bond_index));
        }
        Self {
            atoms,
            bonds,
            adjacency,
        }
    }

    /// Number of atoms in the molecule.
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Retrieves an atom by its index.
    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    /// Returns all atoms in index order.
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Returns all bonds.
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// Returns the (neighbor atom index, bond index) pairs of an atom.
    pub fn neighbors(&self, index: usize) -> &[(usize, usize)] {
        self.adjacency
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of explicit graph neighbors of an atom.
    pub fn degree(&self, index: usize) -> usize {
        self.neighbors(index).len()
    }

    /// Total connection count of an atom: graph neighbors plus attached
    /// hydrogens that are not graph atoms. This is what the `X` pattern
    /// primitive counts.
    pub fn connections(&self, index: usize) -> usize {
        self.degree(index)
            + self
                .atom(index)
                .map(|a| a.hydrogen_count as usize)
                .unwrap_or(0)
    }

    /// Finds the bond between two atoms, if one exists.
    pub fn bond_between(&self, a: usize, b: usize) -> Option<&Bond> {
        self.neighbors(a)
            .iter()
            .find(|(neighbor, _)| *neighbor == b)
            .map(|&(_, bond_index)| &self.bonds[bond_index])
    }
}
