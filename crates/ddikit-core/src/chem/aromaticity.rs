use super::molecule::{Atom, Bond, BondOrder};
use std::collections::{HashSet, VecDeque};

/// Upper bound on ring sizes considered for aromaticity. Five- and
/// six-membered rings cover the pharmacopoeia; seven admits tropylium.
const MAX_AROMATIC_RING: usize = 7;
const MIN_AROMATIC_RING: usize = 5;

/// Flags aromatic rings in a Kekulé-form atom/bond list.
///
/// Rings of five to seven members are collected from a cycle basis and
/// tested against the 4n+2 electron count. Atoms of rings that pass are
/// marked aromatic and the ring bonds are rewritten to
/// [`BondOrder::Aromatic`], so Kekulé input and aromatic input produce
/// the same graph. Runs to a fixpoint so fused systems aromatize
/// regardless of which ring is seen first.
///
/// Atoms already flagged aromatic by the caller are trusted and feed one
/// electron into rings that contain them.
pub fn perceive(atoms: &mut [Atom], bonds: &mut [Bond]) {
    let rings = find_rings(atoms.len(), bonds);
    if rings.is_empty() {
        return;
    }

    let mut in_any_ring = HashSet::new();
    for ring in &rings {
        in_any_ring.extend(ring.iter().copied());
    }

    let mut adjacency = vec![Vec::new(); atoms.len()];
    for (bond_index, bond) in bonds.iter().enumerate() {
        adjacency[bond.a].push((bond.b, bond_index));
        adjacency[bond.b].push((bond.a, bond_index));
    }

    let mut done = vec![false; rings.len()];
    for _ in 0..=rings.len() {
        let mut changed = false;
        for (ring_index, ring) in rings.iter().enumerate() {
            if done[ring_index] {
                continue;
            }
            if !satisfies_huckel(ring, atoms, bonds, &adjacency, &in_any_ring) {
                continue;
            }
            for &atom_index in ring {
                atoms[atom_index].is_aromatic = true;
            }
            for (&a, &b) in ring.iter().zip(ring.iter().cycle().skip(1)) {
                if let Some(&(_, bond_index)) =
                    adjacency[a].iter().find(|&&(neighbor, _)| neighbor == b)
                {
                    bonds[bond_index].order = BondOrder::Aromatic;
                }
            }
            done[ring_index] = true;
            changed = true;
        }
        if !changed {
            break;
        }
    }
}

/// Counts pi electrons around one candidate ring, or bails when an atom
/// cannot take part in a conjugated system.
fn satisfies_huckel(
    ring: &[usize],
    atoms: &[Atom],
    bonds: &[Bond],
    adjacency: &[Vec<(usize, usize)>],
    in_any_ring: &HashSet<usize>,
) -> bool {
    let ring_set: HashSet<usize> = ring.iter().copied().collect();
    let mut electrons = 0usize;

    for &atom_index in ring {
        let atom = &atoms[atom_index];
        if atom.is_aromatic {
            electrons += 1;
            continue;
        }

        let connections = adjacency[atom_index].len() + atom.hydrogen_count as usize;
        if connections > 3 {
            return false;
        }

        let mut double_in_ring = false;
        let mut double_to_ring_atom = false;
        let mut double_exocyclic = false;
        for &(neighbor, bond_index) in &adjacency[atom_index] {
            match bonds[bond_index].order {
                BondOrder::Triple => return false,
                BondOrder::Double => {
                    if ring_set.contains(&neighbor) {
                        double_in_ring = true;
                    } else if in_any_ring.contains(&neighbor) {
                        double_to_ring_atom = true;
                    } else {
                        double_exocyclic = true;
                    }
                }
                _ => {}
            }
        }

        if double_in_ring || double_to_ring_atom {
            electrons += 1;
        } else if double_exocyclic {
            // An exocyclic double bond pulls the pi electron out of the
            // ring but leaves the atom conjugated, as in pyridinones.
        } else {
            // No double bond: a lone pair or an empty orbital must fill
            // the position.
            match (atom.atomic_number, atom.formal_charge) {
                (7 | 15 | 33, 0) | (8 | 16 | 34, 0) => electrons += 2,
                (6, -1) => electrons += 2,
                (6, 1) | (5, 0) => {}
                _ => return false,
            }
        }
    }

    electrons >= 2 && electrons % 4 == 2
}

/// Collects a cycle basis: the shortest ring through every non-tree edge
/// of a spanning forest, deduplicated and filtered to aromatic-relevant
/// sizes. Atom lists come back in cyclic order.
fn find_rings(atom_count: usize, bonds: &[Bond]) -> Vec<Vec<usize>> {
    let mut adjacency = vec![Vec::new(); atom_count];
    for (bond_index, bond) in bonds.iter().enumerate() {
        adjacency[bond.a].push((bond.b, bond_index));
        adjacency[bond.b].push((bond.a, bond_index));
    }

    let mut tree_edges = vec![false; bonds.len()];
    let mut visited = vec![false; atom_count];
    let mut queue = VecDeque::new();
    for root in 0..atom_count {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        queue.push_back(root);
        while let Some(current) = queue.pop_front() {
            for &(neighbor, bond_index) in &adjacency[current] {
                if !visited[neighbor] {
                    visited[neighbor] = true;
                    tree_edges[bond_index] = true;
                    queue.push_back(neighbor);
                }
            }
        }
    }

    let mut rings = Vec::new();
    let mut seen = HashSet::new();
    for (bond_index, bond) in bonds.iter().enumerate() {
        if tree_edges[bond_index] {
            continue;
        }
        let Some(path) = shortest_path(&adjacency, bond.a, bond.b, bond_index) else {
            continue;
        };
        if path.len() < MIN_AROMATIC_RING || path.len() > MAX_AROMATIC_RING {
            continue;
        }
        let mut key: Vec<usize> = path.clone();
        key.sort_unstable();
        if seen.insert(key) {
            rings.push(path);
        }
    }
    rings
}

/// Breadth-first shortest path from `from` to `to` that avoids one bond.
fn shortest_path(
    adjacency: &[Vec<(usize, usize)>],
    from: usize,
    to: usize,
    excluded_bond: usize,
) -> Option<Vec<usize>> {
    let mut previous = vec![usize::MAX; adjacency.len()];
    let mut visited = vec![false; adjacency.len()];
    let mut queue = VecDeque::new();
    visited[from] = true;
    queue.push_back(from);

    while let Some(current) = queue.pop_front() {
        if current == to {
            let mut path = vec![to];
            let mut cursor = to;
            while cursor != from {
                cursor = previous[cursor];
                path.push(cursor);
            }
            path.reverse();
            return Some(path);
        }
        for &(neighbor, bond_index) in &adjacency[current] {
            if bond_index == excluded_bond || visited[neighbor] {
                continue;
            }
            visited[neighbor] = true;
            previous[neighbor] = current;
            queue.push_back(neighbor);
        }
    }
    None
}
