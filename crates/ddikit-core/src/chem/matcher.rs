use super::molecule::Molecule;
use super::smarts::SmartsPattern;
use std::collections::HashSet;

/// Finds every embedding of `pattern` in `molecule`.
///
/// Each match maps query atoms to molecule atom indices positionally:
/// `result[i]` is the molecule atom bound to query atom `i`. The mapping
/// is injective, so a two-atom query never binds both ends to the same
/// molecule atom. Matches that cover the same set of molecule atoms are
/// reported once, whichever orientation was found first; symmetric
/// queries therefore do not inflate counts.
///
/// Candidate atoms are tried in index order, which makes the result
/// deterministic for a given molecule and query.
pub fn find_matches(pattern: &SmartsPattern, molecule: &Molecule) -> Vec<Vec<usize>> {
    if pattern.atom_count() == 0 || molecule.atom_count() == 0 {
        return Vec::new();
    }

    let order = traversal_order(pattern);
    let mut state = SearchState {
        pattern,
        molecule,
        order: &order,
        mapping: vec![usize::MAX; pattern.atom_count()],
        used: vec![false; molecule.atom_count()],
        seen_sets: HashSet::new(),
        matches: Vec::new(),
    };
    state.extend(0);
    state.matches
}

/// True when the pattern occurs in the molecule at least once.
pub fn has_match(pattern: &SmartsPattern, molecule: &Molecule) -> bool {
    !find_matches(pattern, molecule).is_empty()
}

/// Query atoms in a depth-first order so every atom after the first is
/// adjacent to an already-placed one. Query graphs are connected by
/// construction, so the order covers all atoms.
fn traversal_order(pattern: &SmartsPattern) -> Vec<usize> {
    let mut order = Vec::with_capacity(pattern.atom_count());
    let mut visited = vec![false; pattern.atom_count()];
    let mut stack = vec![0usize];
    while let Some(current) = stack.pop() {
        if visited[current] {
            continue;
        }
        visited[current] = true;
        order.push(current);
        for &(neighbor, _) in pattern.neighbors(current).iter().rev() {
            if !visited[neighbor] {
                stack.push(neighbor);
            }
        }
    }
    order
}

struct SearchState<'a> {
    pattern: &'a SmartsPattern,
    molecule: &'a Molecule,
    order: &'a [usize],
    mapping: Vec<usize>,
    used: Vec<bool>,
    seen_sets: HashSet<Vec<usize>>,
    matches: Vec<Vec<usize>>,
}

impl SearchState<'_> {
    fn extend(&mut self, depth: usize) {
        if depth == self.order.len() {
            self.record();
            return;
        }
        let query_atom = self.order[depth];

        if depth == 0 {
            for candidate in 0..self.molecule.atom_count() {
                self.try_bind(query_atom, candidate, depth);
            }
            return;
        }

        // Anchor on a placed neighbor and only walk its adjacency.
        let anchor = self
            .pattern
            .neighbors(query_atom)
            .iter()
            .find_map(|&(neighbor, _)| {
                let mapped = self.mapping[neighbor];
                (mapped != usize::MAX).then_some(mapped)
            });
        let Some(anchor) = anchor else {
            return;
        };
        let candidates: Vec<usize> = self
            .molecule
            .neighbors(anchor)
            .iter()
            .map(|&(neighbor, _)| neighbor)
            .collect();
        for candidate in candidates {
            self.try_bind(query_atom, candidate, depth);
        }
    }

    fn try_bind(&mut self, query_atom: usize, candidate: usize, depth: usize) {
        if self.used[candidate] {
            return;
        }
        if !self
            .pattern
            .atom_expr(query_atom)
            .matches(self.molecule, candidate)
        {
            return;
        }
        // Every query bond into the placed region must exist in the
        // molecule and satisfy its bond expression.
        for &(neighbor, bond_index) in self.pattern.neighbors(query_atom) {
            let mapped = self.mapping[neighbor];
            if mapped == usize::MAX {
                continue;
            }
            let (_, _, expr) = self.pattern.bond(bond_index);
            match self.molecule.bond_between(candidate, mapped) {
                Some(bond) if expr.matches(bond.order) => {}
                _ => return,
            }
        }

        self.mapping[query_atom] = candidate;
        self.used[candidate] = true;
        self.extend(depth + 1);
        self.used[candidate] = false;
        self.mapping[query_atom] = usize::MAX;
    }

    fn record(&mut self) {
        let mut key = self.mapping.clone();
        key.sort_unstable();
        if self.seen_sets.insert(key) {
            self.matches.push(self.mapping.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::smiles;
    use super::*;

    fn matches_of(pattern: &str, input: &str) -> Vec<Vec<usize>> {
        let pattern = SmartsPattern::parse(pattern).unwrap();
        let molecule = smiles::parse(input).unwrap();
        find_matches(&pattern, &molecule)
    }

    #[test]
    fn single_atom_query_hits_every_matching_atom() {
        let matches = matches_of("[cH]", "c1ccccc1");
        assert_eq!(matches.len(), 6);
        for (index, m) in matches.iter().enumerate() {
            assert_eq!(m, &vec![index]);
        }
    }

    #[test]
    fn methane_matches_the_saturated_carbon_query() {
        assert_eq!(matches_of("[CH4]", "C"), vec![vec![0]]);
        assert!(matches_of("[CH4]", "CC").is_empty());
    }

    #[test]
    fn symmetric_queries_collapse_to_one_match_per_atom_set() {
        // Ethane maps onto [CH3][CH3] in both orientations; one survives.
        let matches = matches_of("[CH3][CH3]", "CC");
        assert_eq!(matches.len(), 1);

        let path = matches_of("CCC", "CCC");
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn ring_query_matches_cyclohexane_once() {
        let matches = matches_of("C1CCCCC1", "C1CCCCC1");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].len(), 6);
    }

    #[test]
    fn distinct_overlapping_sets_are_all_reported() {
        // Propane contains two C-C pairs sharing the middle atom.
        let matches = matches_of("CC", "CCC");
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn bond_expressions_gate_the_embedding() {
        assert_eq!(matches_of("C=O", "CC(C)=O").len(), 1);
        assert!(matches_of("C=O", "CCO").is_empty());
        assert!(matches_of("C-C", "c1ccccc1").is_empty());
        assert_eq!(matches_of("c:c", "c1ccccc1").len(), 6);
    }

    #[test]
    fn fused_ring_junction_query_skips_plain_benzene() {
        let query = "[c](:a)(:a):a";
        assert!(matches_of(query, "c1ccccc1").is_empty());
        // Naphthalene has exactly two junction carbons.
        let junctions = matches_of(query, "c1ccc2ccccc2c1");
        assert_eq!(junctions.len(), 2);
    }

    #[test]
    fn injective_mapping_never_reuses_a_molecule_atom() {
        // A two-carbon query cannot fold onto methane's single carbon.
        assert!(matches_of("[#6]~[#6]", "C").is_empty());
    }

    #[test]
    fn branch_queries_follow_the_attachment_point() {
        let matches = matches_of("C(=O)O", "CC(=O)O");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].len(), 3);
    }

    #[test]
    fn has_match_short_circuits_semantics() {
        let pattern = SmartsPattern::parse("[OH]").unwrap();
        let ethanol = smiles::parse("CCO").unwrap();
        let ether = smiles::parse("COC").unwrap();
        assert!(has_match(&pattern, &ethanol));
        assert!(!has_match(&pattern, &ether));
    }
}
