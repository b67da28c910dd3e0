use super::aromaticity;
use super::element;
use super::molecule::{Atom, Bond, BondOrder, Molecule};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SmilesError {
    #[error("Parse error at byte {position}: {kind}")]
    Parse {
        position: usize,
        kind: SmilesParseErrorKind,
    },
}

#[derive(Debug, Error)]
pub enum SmilesParseErrorKind {
    #[error("Input is empty")]
    EmptyInput,
    #[error("Unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("Unknown element symbol '{0}'")]
    UnknownElement(String),
    #[error("Element '{0}' cannot be written as aromatic")]
    NotAromatic(String),
    #[error("Bracket atom is not closed with ']'")]
    UnclosedBracket,
    #[error("Bracket atom is missing an element symbol")]
    MissingElement,
    #[error("Bond symbol is not followed by an atom")]
    DanglingBond,
    #[error("Unmatched ')'")]
    UnmatchedBranchClose,
    #[error("Branch opened with '(' is never closed")]
    UnclosedBranch,
    #[error("Ring bond {0} is never closed")]
    UnclosedRingBond(u16),
    #[error("Ring bond {0} closes on its opening atom")]
    RingBondToSelf(u16),
    #[error("Conflicting bond orders given for ring bond {0}")]
    RingBondOrderConflict(u16),
}

/// Parses a SMILES string into a [`Molecule`].
///
/// The parser covers the vocabulary needed for drug-like structures:
/// organic-subset atoms, bracket atoms with isotope, charge and hydrogen
/// counts, branches, ring closures (including `%nn`), dot-separated
/// fragments, and explicit bond symbols. Stereo markers (`@`, `/`, `\`)
/// are accepted and ignored.
///
/// Two normalization passes run after graph assembly, matching the parse
/// most cheminformatics toolkits produce by default: uncharged,
/// non-isotopic explicit `[H]` atoms bonded to a single heavy atom are
/// folded into that atom's hydrogen count, and Kekulé-form rings that
/// satisfy the aromaticity rules are flagged aromatic.
///
/// # Arguments
///
/// * `input` - The SMILES string; surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns [`SmilesError::Parse`] with the byte position and a specific
/// [`SmilesParseErrorKind`] when the notation is malformed.
pub fn parse(input: &str) -> Result<Molecule, SmilesError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SmilesError::Parse {
            position: 0,
            kind: SmilesParseErrorKind::EmptyInput,
        });
    }

    let mut parser = Parser::new(trimmed);
    parser.run()?;
    let (mut atoms, mut bonds, organic) = parser.finish()?;

    assign_implicit_hydrogens(&mut atoms, &bonds, &organic);
    fold_explicit_hydrogens(&mut atoms, &mut bonds);
    aromaticity::perceive(&mut atoms, &mut bonds);

    Ok(Molecule::from_parts(atoms, bonds))
}

fn bond_symbol(c: char) -> Option<BondOrder> {
    match c {
        '-' | '/' | '\\' => Some(BondOrder::Single),
        '=' => Some(BondOrder::Double),
        '#' => Some(BondOrder::Triple),
        ':' => Some(BondOrder::Aromatic),
        _ => None,
    }
}

struct Parser {
    chars: Vec<(usize, char)>,
    cursor: usize,
    end: usize,
    atoms: Vec<Atom>,
    /// Flags atoms written without brackets, which receive implicit
    /// hydrogens from the normal-valence rules.
    organic: Vec<bool>,
    bonds: Vec<Bond>,
    prev: Option<usize>,
    pending_bond: Option<(BondOrder, usize)>,
    branch_stack: Vec<(usize, usize)>,
    ring_bonds: HashMap<u16, (usize, Option<BondOrder>, usize)>,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.char_indices().collect(),
            cursor: 0,
            end: input.len(),
            atoms: Vec::new(),
            organic: Vec::new(),
            bonds: Vec::new(),
            prev: None,
            pending_bond: None,
            branch_stack: Vec::new(),
            ring_bonds: HashMap::new(),
        }
    }

    fn peek(&self) -> Option<(usize, char)> {
        self.chars.get(self.cursor).copied()
    }

    fn bump(&mut self) {
        self.cursor += 1;
    }

    fn error(position: usize, kind: SmilesParseErrorKind) -> SmilesError {
        SmilesError::Parse { position, kind }
    }

    fn run(&mut self) -> Result<(), SmilesError> {
        while let Some((pos, c)) = self.peek() {
            match c {
                '[' => self.parse_bracket_atom()?,
                '(' => {
                    self.bump();
                    if self.prev.is_none() || self.pending_bond.is_some() {
                        return Err(Self::error(
                            pos,
                            SmilesParseErrorKind::UnexpectedCharacter('('),
                        ));
                    }
                    self.branch_stack
                        .push((self.prev.expect("branch requires an atom"), pos));
                }
                ')' => {
                    self.bump();
                    if let Some((_, bond_pos)) = self.pending_bond {
                        return Err(Self::error(bond_pos, SmilesParseErrorKind::DanglingBond));
                    }
                    match self.branch_stack.pop() {
                        Some((attach, _)) => self.prev = Some(attach),
                        None => {
                            return Err(Self::error(
                                pos,
                                SmilesParseErrorKind::UnmatchedBranchClose,
                            ));
                        }
                    }
                }
                '%' => {
                    self.bump();
                    let digit = self.parse_two_digit_ring(pos)?;
                    self.close_ring(digit, pos)?;
                }
                '0'..='9' => {
                    self.bump();
                    let digit = c.to_digit(10).expect("checked digit") as u16;
                    self.close_ring(digit, pos)?;
                }
                '.' => {
                    self.bump();
                    if let Some((_, bond_pos)) = self.pending_bond {
                        return Err(Self::error(bond_pos, SmilesParseErrorKind::DanglingBond));
                    }
                    self.prev = None;
                }
                '*' => {
                    self.bump();
                    self.attach_atom(
                        Atom {
                            atomic_number: 0,
                            formal_charge: 0,
                            hydrogen_count: 0,
                            isotope: 0,
                            is_aromatic: false,
                        },
                        false,
                    );
                }
                _ if bond_symbol(c).is_some() => {
                    self.bump();
                    if self.prev.is_none() || self.pending_bond.is_some() {
                        return Err(Self::error(
                            pos,
                            SmilesParseErrorKind::UnexpectedCharacter(c),
                        ));
                    }
                    self.pending_bond = Some((bond_symbol(c).expect("checked symbol"), pos));
                }
                _ if c.is_ascii_alphabetic() => self.parse_bare_atom()?,
                _ => {
                    return Err(Self::error(
                        pos,
                        SmilesParseErrorKind::UnexpectedCharacter(c),
                    ));
                }
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<(Vec<Atom>, Vec<Bond>, Vec<bool>), SmilesError> {
        if let Some((_, pos)) = self.pending_bond {
            return Err(Self::error(pos, SmilesParseErrorKind::DanglingBond));
        }
        if let Some(&(_, pos)) = self.branch_stack.last() {
            return Err(Self::error(pos, SmilesParseErrorKind::UnclosedBranch));
        }
        if let Some(&digit) = self.ring_bonds.keys().min() {
            let (_, _, pos) = self.ring_bonds[&digit];
            return Err(Self::error(
                pos,
                SmilesParseErrorKind::UnclosedRingBond(digit),
            ));
        }
        Ok((self.atoms, self.bonds, self.organic))
    }

    fn parse_two_digit_ring(&mut self, pos: usize) -> Result<u16, SmilesError> {
        let mut value = 0u16;
        for _ in 0..2 {
            match self.peek() {
                Some((_, d)) if d.is_ascii_digit() => {
                    self.bump();
                    value = value * 10 + d.to_digit(10).expect("checked digit") as u16;
                }
                Some((p, d)) => {
                    return Err(Self::error(p, SmilesParseErrorKind::UnexpectedCharacter(d)));
                }
                None => {
                    return Err(Self::error(
                        pos,
                        SmilesParseErrorKind::UnexpectedCharacter('%'),
                    ));
                }
            }
        }
        Ok(value)
    }

    fn parse_digits(&mut self) -> Option<u32> {
        let mut value: Option<u32> = None;
        while let Some((_, c)) = self.peek() {
            let Some(digit) = c.to_digit(10) else {
                break;
            };
            self.bump();
            value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(digit));
        }
        value
    }

    fn parse_bare_atom(&mut self) -> Result<(), SmilesError> {
        let (pos, c) = self.peek().expect("caller checked a character is present");
        let next = self.chars.get(self.cursor + 1).map(|&(_, n)| n);

        match (c, next) {
            ('C', Some('l')) => self.finish_bare_atom(pos, "Cl".to_string(), false, 2),
            ('B', Some('r')) => self.finish_bare_atom(pos, "Br".to_string(), false, 2),
            ('B' | 'C' | 'N' | 'O' | 'P' | 'S' | 'F' | 'I', _) => {
                self.finish_bare_atom(pos, c.to_string(), false, 1)
            }
            ('b' | 'c' | 'n' | 'o' | 'p' | 's', _) => {
                self.finish_bare_atom(pos, c.to_ascii_uppercase().to_string(), true, 1)
            }
            _ => Err(Self::error(
                pos,
                SmilesParseErrorKind::UnexpectedCharacter(c),
            )),
        }
    }

    fn finish_bare_atom(
        &mut self,
        pos: usize,
        symbol: String,
        aromatic: bool,
        width: usize,
    ) -> Result<(), SmilesError> {
        let atomic_number = element::atomic_number(&symbol)
            .ok_or_else(|| Self::error(pos, SmilesParseErrorKind::UnknownElement(symbol)))?;
        for _ in 0..width {
            self.bump();
        }
        self.attach_atom(
            Atom {
                atomic_number,
                formal_charge: 0,
                hydrogen_count: 0,
                isotope: 0,
                is_aromatic: aromatic,
            },
            true,
        );
        Ok(())
    }

    fn parse_bracket_atom(&mut self) -> Result<(), SmilesError> {
        let (open_pos, _) = self.peek().expect("caller checked '['");
        self.bump();

        let isotope = self.parse_digits().unwrap_or(0).min(u16::MAX as u32) as u16;
        let (atomic_number, aromatic) = self.parse_bracket_symbol(open_pos)?;

        // Chirality markers are accepted but not modeled.
        while matches!(self.peek(), Some((_, '@'))) {
            self.bump();
        }

        let mut hydrogen_count = 0u8;
        if matches!(self.peek(), Some((_, 'H'))) {
            self.bump();
            hydrogen_count = self.parse_digits().unwrap_or(1).min(u8::MAX as u32) as u8;
        }

        let formal_charge = self.parse_bracket_charge();

        // Atom-map class, accepted and discarded.
        if matches!(self.peek(), Some((_, ':'))) {
            self.bump();
            if self.parse_digits().is_none() {
                let pos = self.peek().map(|(p, _)| p).unwrap_or(self.end);
                return Err(Self::error(
                    pos,
                    SmilesParseErrorKind::UnexpectedCharacter(':'),
                ));
            }
        }

        match self.peek() {
            Some((_, ']')) => self.bump(),
            _ => {
                return Err(Self::error(
                    open_pos,
                    SmilesParseErrorKind::UnclosedBracket,
                ));
            }
        }

        self.attach_atom(
            Atom {
                atomic_number,
                formal_charge,
                hydrogen_count,
                isotope,
                is_aromatic: aromatic,
            },
            false,
        );
        Ok(())
    }

    fn parse_bracket_symbol(&mut self, open_pos: usize) -> Result<(u8, bool), SmilesError> {
        let Some((pos, c)) = self.peek() else {
            return Err(Self::error(open_pos, SmilesParseErrorKind::UnclosedBracket));
        };
        let next = self.chars.get(self.cursor + 1).map(|&(_, n)| n);

        if c == '*' {
            self.bump();
            return Ok((0, false));
        }

        if c.is_ascii_uppercase() {
            if let Some(n) = next.filter(|n| n.is_ascii_lowercase()) {
                let two: String = [c, n].iter().collect();
                if let Some(number) = element::atomic_number(&two) {
                    self.bump();
                    self.bump();
                    return Ok((number, false));
                }
            }
            let one = c.to_string();
            let number = element::atomic_number(&one)
                .ok_or_else(|| Self::error(pos, SmilesParseErrorKind::UnknownElement(one)))?;
            self.bump();
            return Ok((number, false));
        }

        if c.is_ascii_lowercase() {
            // Two-letter aromatics first, then the single-letter subset.
            if let Some(n) = next {
                let two: String = [c, n].iter().collect();
                if two == "se" || two == "as" {
                    let capitalized: String =
                        [c.to_ascii_uppercase(), n].iter().collect();
                    let number = element::atomic_number(&capitalized)
                        .expect("se and as are known elements");
                    self.bump();
                    self.bump();
                    return Ok((number, true));
                }
            }
            let symbol = c.to_ascii_uppercase().to_string();
            let number = element::atomic_number(&symbol).ok_or_else(|| {
                Self::error(pos, SmilesParseErrorKind::UnknownElement(c.to_string()))
            })?;
            if !element::is_aromatic_candidate(number) {
                return Err(Self::error(
                    pos,
                    SmilesParseErrorKind::NotAromatic(c.to_string()),
                ));
            }
            self.bump();
            return Ok((number, true));
        }

        Err(Self::error(pos, SmilesParseErrorKind::MissingElement))
    }

    fn parse_bracket_charge(&mut self) -> i8 {
        let Some((_, sign_char)) = self.peek().filter(|&(_, c)| c == '+' || c == '-') else {
            return 0;
        };
        self.bump();
        let sign: i32 = if sign_char == '+' { 1 } else { -1 };

        let magnitude = match self.parse_digits() {
            Some(digits) => digits as i32,
            None => {
                let mut count = 1;
                while matches!(self.peek(), Some((_, c)) if c == sign_char) {
                    self.bump();
                    count += 1;
                }
                count
            }
        };

        (sign * magnitude).clamp(i8::MIN as i32, i8::MAX as i32) as i8
    }

    fn attach_atom(&mut self, atom: Atom, organic: bool) {
        let index = self.atoms.len();
        if let Some(prev) = self.prev {
            let order = match self.pending_bond.take() {
                Some((order, _)) => order,
                None => {
                    if self.atoms[prev].is_aromatic && atom.is_aromatic {
                        BondOrder::Aromatic
                    } else {
                        BondOrder::Single
                    }
                }
            };
            self.bonds.push(Bond {
                a: prev,
                b: index,
                order,
            });
        }
        self.atoms.push(atom);
        self.organic.push(organic);
        self.prev = Some(index);
    }

    fn close_ring(&mut self, digit: u16, pos: usize) -> Result<(), SmilesError> {
        let Some(current) = self.prev else {
            return Err(Self::error(
                pos,
                SmilesParseErrorKind::UnexpectedCharacter(
                    char::from_digit((digit % 10) as u32, 10).unwrap_or('%'),
                ),
            ));
        };
        let pending = self.pending_bond.take().map(|(order, _)| order);

        match self.ring_bonds.remove(&digit) {
            Some((open_atom, open_order, _)) => {
                if open_atom == current {
                    return Err(Self::error(
                        pos,
                        SmilesParseErrorKind::RingBondToSelf(digit),
                    ));
                }
                let order = match (open_order, pending) {
                    (Some(a), Some(b)) if a != b => {
                        return Err(Self::error(
                            pos,
                            SmilesParseErrorKind::RingBondOrderConflict(digit),
                        ));
                    }
                    (Some(order), _) | (None, Some(order)) => order,
                    (None, None) => {
                        if self.atoms[open_atom].is_aromatic && self.atoms[current].is_aromatic {
                            BondOrder::Aromatic
                        } else {
                            BondOrder::Single
                        }
                    }
                };
                self.bonds.push(Bond {
                    a: open_atom,
                    b: current,
                    order,
                });
            }
            None => {
                self.ring_bonds.insert(digit, (current, pending, pos));
            }
        }
        Ok(())
    }
}

/// Assigns implicit hydrogens to organic-subset atoms from their normal
/// valences. Aromatic atoms count one extra valence unit for the
/// delocalized system. Atoms whose bond sum exceeds every normal valence
/// receive none; chemistry is not otherwise validated.
fn assign_implicit_hydrogens(atoms: &mut [Atom], bonds: &[Bond], organic: &[bool]) {
    let mut bond_sums = vec![0u8; atoms.len()];
    for bond in bonds {
        bond_sums[bond.a] = bond_sums[bond.a].saturating_add(bond.order.valence_units());
        bond_sums[bond.b] = bond_sums[bond.b].saturating_add(bond.order.valence_units());
    }

    for (index, atom) in atoms.iter_mut().enumerate() {
        if !organic[index] {
            continue;
        }
        let mut sum = bond_sums[index];
        if atom.is_aromatic {
            sum += 1;
        }
        atom.hydrogen_count = element::default_valences(atom.atomic_number)
            .iter()
            .find(|&&valence| valence >= sum)
            .map(|&valence| valence - sum)
            .unwrap_or(0);
    }
}

/// Folds explicit `[H]` atoms into their heavy neighbor's hydrogen count.
///
/// Only plain hydrogens are folded: uncharged, non-isotopic, with no
/// hydrogen count of their own, singly bonded to a heavier atom. Bridging
/// and isolated hydrogens survive as graph atoms, as do deuterium and
/// tritium.
fn fold_explicit_hydrogens(atoms: &mut Vec<Atom>, bonds: &mut Vec<Bond>) {
    let mut degree = vec![0usize; atoms.len()];
    let mut sole_bond = vec![usize::MAX; atoms.len()];
    for (bond_index, bond) in bonds.iter().enumerate() {
        degree[bond.a] += 1;
        degree[bond.b] += 1;
        sole_bond[bond.a] = bond_index;
        sole_bond[bond.b] = bond_index;
    }

    let mut removed = vec![false; atoms.len()];
    for index in 0..atoms.len() {
        let atom = atoms[index];
        let foldable = atom.atomic_number == 1
            && atom.isotope == 0
            && atom.formal_charge == 0
            && atom.hydrogen_count == 0
            && degree[index] == 1;
        if !foldable {
            continue;
        }
        let bond = bonds[sole_bond[index]];
        let neighbor = bond.other(index).expect("bond touches the hydrogen");
        if atoms[neighbor].atomic_number > 1 && bond.order == BondOrder::Single {
            removed[index] = true;
            atoms[neighbor].hydrogen_count = atoms[neighbor].hydrogen_count.saturating_add(1);
        }
    }

    if !removed.iter().any(|&r| r) {
        return;
    }

    let mut remap = vec![usize::MAX; atoms.len()];
    let mut next = 0usize;
    for (index, &gone) in removed.iter().enumerate() {
        if !gone {
            remap[index] = next;
            next += 1;
        }
    }

    let mut kept_atoms = Vec::with_capacity(next);
    for (index, atom) in atoms.iter().enumerate() {
        if !removed[index] {
            kept_atoms.push(*atom);
        }
    }
    *atoms = kept_atoms;

    bonds.retain(|bond| !removed[bond.a] && !removed[bond.b]);
    for bond in bonds.iter_mut() {
        bond.a = remap[bond.a];
        bond.b = remap[bond.b];
    }
}
