use super::element;
use super::molecule::{BondOrder, Molecule};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SmartsError {
    #[error("Parse error at byte {position}: {kind}")]
    Parse {
        position: usize,
        kind: SmartsParseErrorKind,
    },
}

#[derive(Debug, Error)]
pub enum SmartsParseErrorKind {
    #[error("Pattern is empty")]
    EmptyPattern,
    #[error("Unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("Unknown element symbol '{0}'")]
    UnknownElement(String),
    #[error("'#' must be followed by an atomic number")]
    MissingAtomicNumber,
    #[error("Expected an atom primitive")]
    MissingPrimitive,
    #[error("Bracket expression is not closed with ']'")]
    UnclosedBracket,
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
    #[error("Conflicting bond expressions given for ring bond {0}")]
    RingBondConflict(u16),
}

/// One testable property of a molecule atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AtomPrimitive {
    /// `*`, any atom.
    Wildcard,
    /// `a`, any aromatic atom.
    Aromatic,
    /// `A`, any aliphatic atom.
    Aliphatic,
    /// `#n`, element by atomic number with no aromaticity constraint.
    AtomicNumber(u8),
    /// An element symbol; case fixes the required aromaticity.
    Element { number: u8, aromatic: bool },
    /// `Hn`, total attached hydrogens (implicit plus graph neighbors).
    HydrogenCount(u8),
    /// `Xn`, total connections counting implicit hydrogens.
    Connections(u8),
    /// `+n` / `-n`, exact formal charge; `+0` pins a neutral atom.
    Charge(i8),
}

impl AtomPrimitive {
    fn matches(&self, molecule: &Molecule, index: usize) -> bool {
        let Some(atom) = molecule.atom(index) else {
            return false;
        };
        match *self {
            AtomPrimitive::Wildcard => true,
            AtomPrimitive::Aromatic => atom.is_aromatic,
            AtomPrimitive::Aliphatic => !atom.is_aromatic,
            AtomPrimitive::AtomicNumber(number) => atom.atomic_number == number,
            AtomPrimitive::Element { number, aromatic } => {
                atom.atomic_number == number && atom.is_aromatic == aromatic
            }
            AtomPrimitive::HydrogenCount(count) => {
                total_hydrogens(molecule, index) == count as usize
            }
            AtomPrimitive::Connections(count) => molecule.connections(index) == count as usize,
            AtomPrimitive::Charge(charge) => atom.formal_charge == charge,
        }
    }
}

/// Hydrogens on an atom as substructure queries see them: the folded
/// count plus any hydrogens that survive as graph neighbors.
fn total_hydrogens(molecule: &Molecule, index: usize) -> usize {
    let implicit = molecule
        .atom(index)
        .map(|atom| atom.hydrogen_count as usize)
        .unwrap_or(0);
    let attached = molecule
        .neighbors(index)
        .iter()
        .filter(|&&(neighbor, _)| {
            molecule
                .atom(neighbor)
                .map(|a| a.atomic_number == 1)
                .unwrap_or(false)
        })
        .count();
    implicit + attached
}

/// A logical expression over [`AtomPrimitive`]s.
///
/// `;` and the implicit conjunction both build [`AtomExpr::And`]; `,`
/// builds [`AtomExpr::Or`]. The comma binds tighter than the semicolon
/// and looser than adjacency, matching the usual query grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AtomExpr {
    Primitive {
        negated: bool,
        primitive: AtomPrimitive,
    },
    And(Vec<AtomExpr>),
    Or(Vec<AtomExpr>),
}

impl AtomExpr {
    pub(crate) fn matches(&self, molecule: &Molecule, index: usize) -> bool {
        match self {
            AtomExpr::Primitive { negated, primitive } => {
                primitive.matches(molecule, index) != *negated
            }
            AtomExpr::And(terms) => terms.iter().all(|term| term.matches(molecule, index)),
            AtomExpr::Or(branches) => {
                branches.iter().any(|branch| branch.matches(molecule, index))
            }
        }
    }
}

/// Constraint on the bond joining two pattern atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BondExpr {
    /// No symbol given: single or aromatic.
    Default,
    /// An explicit order symbol.
    Order(BondOrder),
    /// `~`, any bond.
    Any,
}

impl BondExpr {
    pub(crate) fn matches(&self, order: BondOrder) -> bool {
        match self {
            BondExpr::Default => {
                matches!(order, BondOrder::Single | BondOrder::Aromatic)
            }
            BondExpr::Order(required) => order == *required,
            BondExpr::Any => true,
        }
    }
}

/// A compiled substructure query.
///
/// Holds one expression per query atom plus the bond constraints between
/// them, with an adjacency list for the matcher. Compile once, match
/// many times.
#[derive(Debug, Clone)]
pub struct SmartsPattern {
    text: String,
    atoms: Vec<AtomExpr>,
    bonds: Vec<(usize, usize, BondExpr)>,
    adjacency: Vec<Vec<(usize, usize)>>,
}

impl SmartsPattern {
    /// Compiles a SMARTS string.
    ///
    /// The supported vocabulary is the one substructure-contribution
    /// tables draw on: bracket expressions with `!`, `&`, `,` and `;`
    /// logic over element symbols, `#n`, `a`/`A`/`*`, `Hn`, `Xn` and
    /// charges; bare organic-subset atoms; branches; ring closures; and
    /// the bond symbols `-`, `=`, `#`, `:` and `~`.
    ///
    /// # Errors
    ///
    /// Returns [`SmartsError::Parse`] with the byte position of the
    /// offending token when the pattern is malformed.
    pub fn parse(text: &str) -> Result<Self, SmartsError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(SmartsError::Parse {
                position: 0,
                kind: SmartsParseErrorKind::EmptyPattern,
            });
        }
        let mut parser = PatternParser::new(trimmed);
        parser.run()?;
        let (atoms, bonds) = parser.finish()?;

        let mut adjacency = vec![Vec::new(); atoms.len()];
        for (bond_index, &(a, b, _)) in bonds.iter().enumerate() {
            adjacency[a].push((b, bond_index));
            adjacency[b].push((a, bond_index));
        }

        Ok(Self {
            text: trimmed.to_string(),
            atoms,
            bonds,
            adjacency,
        })
    }

    /// The pattern source text, trimmed.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of query atoms.
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub(crate) fn atom_expr(&self, index: usize) -> &AtomExpr {
        &self.atoms[index]
    }

    pub(crate) fn bond(&self, index: usize) -> (usize, usize, BondExpr) {
        self.bonds[index]
    }

    pub(crate) fn neighbors(&self, index: usize) -> &[(usize, usize)] {
        &self.adjacency[index]
    }
}

struct PatternParser {
    chars: Vec<(usize, char)>,
    cursor: usize,
    atoms: Vec<AtomExpr>,
    bonds: Vec<(usize, usize, BondExpr)>,
    prev: Option<usize>,
    pending_bond: Option<(BondExpr, usize)>,
    branch_stack: Vec<(usize, usize)>,
    ring_bonds: HashMap<u16, (usize, Option<BondExpr>, usize)>,
    /// Primitives consumed inside the bracket currently being parsed.
    /// A bare `H` names the element only as the very first one.
    bracket_primitives: usize,
}

impl PatternParser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.char_indices().collect(),
            cursor: 0,
            atoms: Vec::new(),
            bonds: Vec::new(),
            prev: None,
            pending_bond: None,
            branch_stack: Vec::new(),
            ring_bonds: HashMap::new(),
            bracket_primitives: 0,
        }
    }

    fn peek(&self) -> Option<(usize, char)> {
        self.chars.get(self.cursor).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.peek().map(|(_, c)| c)
    }

    fn next_char(&self) -> Option<char> {
        self.chars.get(self.cursor + 1).map(|&(_, c)| c)
    }

    fn bump(&mut self) {
        self.cursor += 1;
    }

    fn error(position: usize, kind: SmartsParseErrorKind) -> SmartsError {
        SmartsError::Parse { position, kind }
    }

    fn bond_expr(c: char) -> Option<BondExpr> {
        match c {
            '-' => Some(BondExpr::Order(BondOrder::Single)),
            '=' => Some(BondExpr::Order(BondOrder::Double)),
            '#' => Some(BondExpr::Order(BondOrder::Triple)),
            ':' => Some(BondExpr::Order(BondOrder::Aromatic)),
            '~' => Some(BondExpr::Any),
            _ => None,
        }
    }

    fn run(&mut self) -> Result<(), SmartsError> {
        while let Some((pos, c)) = self.peek() {
            match c {
                '[' => {
                    self.bump();
                    self.bracket_primitives = 0;
                    let expr = self.parse_bracket_expr(pos)?;
                    self.attach_atom(expr);
                }
                '(' => {
                    self.bump();
                    let Some(prev) = self.prev else {
                        return Err(Self::error(
                            pos,
                            SmartsParseErrorKind::UnexpectedCharacter('('),
                        ));
                    };
                    if self.pending_bond.is_some() {
                        return Err(Self::error(
                            pos,
                            SmartsParseErrorKind::UnexpectedCharacter('('),
                        ));
                    }
                    self.branch_stack.push((prev, pos));
                }
                ')' => {
                    self.bump();
                    if let Some((_, bond_pos)) = self.pending_bond {
                        return Err(Self::error(bond_pos, SmartsParseErrorKind::DanglingBond));
                    }
                    match self.branch_stack.pop() {
                        Some((attach, _)) => self.prev = Some(attach),
                        None => {
                            return Err(Self::error(
                                pos,
                                SmartsParseErrorKind::UnmatchedBranchClose,
                            ));
                        }
                    }
                }
                '%' => {
                    self.bump();
                    let mut value = 0u16;
                    for _ in 0..2 {
                        match self.peek() {
                            Some((_, d)) if d.is_ascii_digit() => {
                                self.bump();
                                value = value * 10 + d.to_digit(10).expect("checked digit") as u16;
                            }
                            _ => {
                                return Err(Self::error(
                                    pos,
                                    SmartsParseErrorKind::UnexpectedCharacter('%'),
                                ));
                            }
                        }
                    }
                    self.close_ring(value, pos)?;
                }
                '0'..='9' => {
                    self.bump();
                    self.close_ring(c.to_digit(10).expect("checked digit") as u16, pos)?;
                }
                _ if Self::bond_expr(c).is_some() => {
                    self.bump();
                    if self.prev.is_none() || self.pending_bond.is_some() {
                        return Err(Self::error(
                            pos,
                            SmartsParseErrorKind::UnexpectedCharacter(c),
                        ));
                    }
                    self.pending_bond =
                        Some((Self::bond_expr(c).expect("checked symbol"), pos));
                }
                _ if c.is_ascii_alphabetic() || c == '*' => self.parse_bare_atom()?,
                _ => {
                    return Err(Self::error(
                        pos,
                        SmartsParseErrorKind::UnexpectedCharacter(c),
                    ));
                }
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<(Vec<AtomExpr>, Vec<(usize, usize, BondExpr)>), SmartsError> {
        if let Some((_, pos)) = self.pending_bond {
            return Err(Self::error(pos, SmartsParseErrorKind::DanglingBond));
        }
        if let Some(&(_, pos)) = self.branch_stack.last() {
            return Err(Self::error(pos, SmartsParseErrorKind::UnclosedBranch));
        }
        if let Some(&digit) = self.ring_bonds.keys().min() {
            let (_, _, pos) = self.ring_bonds[&digit];
            return Err(Self::error(
                pos,
                SmartsParseErrorKind::UnclosedRingBond(digit),
            ));
        }
        Ok((self.atoms, self.bonds))
    }

    fn attach_atom(&mut self, expr: AtomExpr) {
        let index = self.atoms.len();
        if let Some(prev) = self.prev {
            let bond = match self.pending_bond.take() {
                Some((bond, _)) => bond,
                None => BondExpr::Default,
            };
            self.bonds.push((prev, index, bond));
        }
        self.atoms.push(expr);
        self.prev = Some(index);
    }

    fn close_ring(&mut self, digit: u16, pos: usize) -> Result<(), SmartsError> {
        let Some(current) = self.prev else {
            return Err(Self::error(
                pos,
                SmartsParseErrorKind::UnexpectedCharacter(
                    char::from_digit((digit % 10) as u32, 10).unwrap_or('%'),
                ),
            ));
        };
        let pending = self.pending_bond.take().map(|(bond, _)| bond);

        match self.ring_bonds.remove(&digit) {
            Some((open_atom, open_bond, _)) => {
                if open_atom == current {
                    return Err(Self::error(
                        pos,
                        SmartsParseErrorKind::RingBondToSelf(digit),
                    ));
                }
                let bond = match (open_bond, pending) {
                    (Some(a), Some(b)) if a != b => {
                        return Err(Self::error(
                            pos,
                            SmartsParseErrorKind::RingBondConflict(digit),
                        ));
                    }
                    (Some(bond), _) | (None, Some(bond)) => bond,
                    (None, None) => BondExpr::Default,
                };
                self.bonds.push((open_atom, current, bond));
            }
            None => {
                self.ring_bonds.insert(digit, (current, pending, pos));
            }
        }
        Ok(())
    }

    fn parse_bare_atom(&mut self) -> Result<(), SmartsError> {
        let (pos, c) = self.peek().expect("caller checked a character is present");
        let expr = match (c, self.next_char()) {
            ('*', _) => {
                self.bump();
                Self::primitive(AtomPrimitive::Wildcard)
            }
            ('a', _) => {
                self.bump();
                Self::primitive(AtomPrimitive::Aromatic)
            }
            ('A', _) => {
                self.bump();
                Self::primitive(AtomPrimitive::Aliphatic)
            }
            ('C', Some('l')) => {
                self.bump();
                self.bump();
                Self::element_primitive(17, false)
            }
            ('B', Some('r')) => {
                self.bump();
                self.bump();
                Self::element_primitive(35, false)
            }
            ('B' | 'C' | 'N' | 'O' | 'P' | 'S' | 'F' | 'I', _) => {
                self.bump();
                let number = element::atomic_number(&c.to_string())
                    .expect("organic subset symbols are known elements");
                Self::element_primitive(number, false)
            }
            ('b' | 'c' | 'n' | 'o' | 'p' | 's', _) => {
                self.bump();
                let number = element::atomic_number(&c.to_ascii_uppercase().to_string())
                    .expect("organic subset symbols are known elements");
                Self::element_primitive(number, true)
            }
            _ => {
                return Err(Self::error(
                    pos,
                    SmartsParseErrorKind::UnexpectedCharacter(c),
                ));
            }
        };
        self.attach_atom(expr);
        Ok(())
    }

    fn primitive(primitive: AtomPrimitive) -> AtomExpr {
        AtomExpr::Primitive {
            negated: false,
            primitive,
        }
    }

    fn element_primitive(number: u8, aromatic: bool) -> AtomExpr {
        Self::primitive(AtomPrimitive::Element { number, aromatic })
    }

    /// Parses the expression between `[` and `]`. `open_pos` is the byte
    /// position of the opening bracket, used for unclosed-bracket errors.
    fn parse_bracket_expr(&mut self, open_pos: usize) -> Result<AtomExpr, SmartsError> {
        let mut groups = Vec::new();
        loop {
            groups.push(self.parse_or_expr(open_pos)?);
            match self.peek_char() {
                Some(';') => self.bump(),
                Some(']') => {
                    self.bump();
                    break;
                }
                Some(_) => {
                    let (pos, c) = self.peek().expect("peeked above");
                    return Err(Self::error(
                        pos,
                        SmartsParseErrorKind::UnexpectedCharacter(c),
                    ));
                }
                None => {
                    return Err(Self::error(
                        open_pos,
                        SmartsParseErrorKind::UnclosedBracket,
                    ));
                }
            }
        }
        Ok(if groups.len() == 1 {
            groups.pop().expect("one group")
        } else {
            AtomExpr::And(groups)
        })
    }

    fn parse_or_expr(&mut self, open_pos: usize) -> Result<AtomExpr, SmartsError> {
        let mut branches = vec![self.parse_and_expr(open_pos)?];
        while self.peek_char() == Some(',') {
            self.bump();
            branches.push(self.parse_and_expr(open_pos)?);
        }
        Ok(if branches.len() == 1 {
            branches.pop().expect("one branch")
        } else {
            AtomExpr::Or(branches)
        })
    }

    fn parse_and_expr(&mut self, open_pos: usize) -> Result<AtomExpr, SmartsError> {
        let mut terms = Vec::new();
        loop {
            match self.peek_char() {
                Some(']') | Some(';') | Some(',') | None => break,
                Some('&') => {
                    self.bump();
                }
                Some(_) => terms.push(self.parse_primitive(open_pos)?),
            }
        }
        if terms.is_empty() {
            let pos = self.peek().map(|(p, _)| p).unwrap_or(open_pos);
            return Err(Self::error(pos, SmartsParseErrorKind::MissingPrimitive));
        }
        Ok(if terms.len() == 1 {
            terms.pop().expect("one term")
        } else {
            AtomExpr::And(terms)
        })
    }

    fn parse_primitive(&mut self, open_pos: usize) -> Result<AtomExpr, SmartsError> {
        let first = self.bracket_primitives == 0;
        self.bracket_primitives += 1;

        let mut negated = false;
        while self.peek_char() == Some('!') {
            self.bump();
            negated = !negated;
        }

        let Some((pos, c)) = self.peek() else {
            return Err(Self::error(open_pos, SmartsParseErrorKind::UnclosedBracket));
        };

        let primitive = match c {
            '*' => {
                self.bump();
                AtomPrimitive::Wildcard
            }
            '#' => {
                self.bump();
                let Some(number) = self.parse_digits() else {
                    return Err(Self::error(pos, SmartsParseErrorKind::MissingAtomicNumber));
                };
                AtomPrimitive::AtomicNumber(number.min(u8::MAX as u32) as u8)
            }
            'a' => {
                // Two-letter aromatic symbols take precedence over the
                // any-aromatic primitive.
                if self.next_char() == Some('s') {
                    self.bump();
                    self.bump();
                    AtomPrimitive::Element {
                        number: 33,
                        aromatic: true,
                    }
                } else {
                    self.bump();
                    AtomPrimitive::Aromatic
                }
            }
            'A' => {
                self.bump();
                AtomPrimitive::Aliphatic
            }
            'H' if !negated && first => {
                self.bump();
                AtomPrimitive::Element {
                    number: 1,
                    aromatic: false,
                }
            }
            'H' => {
                self.bump();
                let count = self.parse_digits().unwrap_or(1).min(u8::MAX as u32) as u8;
                AtomPrimitive::HydrogenCount(count)
            }
            'X' => {
                self.bump();
                let count = self.parse_digits().unwrap_or(1).min(u8::MAX as u32) as u8;
                AtomPrimitive::Connections(count)
            }
            '+' | '-' => {
                self.bump();
                let sign: i32 = if c == '+' { 1 } else { -1 };
                let magnitude = match self.parse_digits() {
                    Some(digits) => digits as i32,
                    None => {
                        let mut count = 1;
                        while self.peek_char() == Some(c) {
                            self.bump();
                            count += 1;
                        }
                        count
                    }
                };
                AtomPrimitive::Charge(
                    (sign * magnitude).clamp(i8::MIN as i32, i8::MAX as i32) as i8,
                )
            }
            's' if self.next_char() == Some('e') => {
                self.bump();
                self.bump();
                AtomPrimitive::Element {
                    number: 34,
                    aromatic: true,
                }
            }
            'b' | 'c' | 'n' | 'o' | 'p' | 's' => {
                self.bump();
                let number = element::atomic_number(&c.to_ascii_uppercase().to_string())
                    .expect("organic subset symbols are known elements");
                AtomPrimitive::Element {
                    number,
                    aromatic: true,
                }
            }
            _ if c.is_ascii_uppercase() => {
                let next = self.next_char();
                if let Some(n) = next.filter(|n| n.is_ascii_lowercase()) {
                    let two: String = [c, n].iter().collect();
                    if let Some(number) = element::atomic_number(&two) {
                        self.bump();
                        self.bump();
                        return Ok(AtomExpr::Primitive {
                            negated,
                            primitive: AtomPrimitive::Element {
                                number,
                                aromatic: false,
                            },
                        });
                    }
                }
                let symbol = c.to_string();
                let number = element::atomic_number(&symbol).ok_or_else(|| {
                    Self::error(pos, SmartsParseErrorKind::UnknownElement(symbol))
                })?;
                self.bump();
                AtomPrimitive::Element {
                    number,
                    aromatic: false,
                }
            }
            _ if c.is_ascii_lowercase() => {
                let symbol = c.to_ascii_uppercase().to_string();
                match element::atomic_number(&symbol) {
                    Some(number) if element::is_aromatic_candidate(number) => {
                        self.bump();
                        AtomPrimitive::Element {
                            number,
                            aromatic: true,
                        }
                    }
                    _ => {
                        return Err(Self::error(
                            pos,
                            SmartsParseErrorKind::UnknownElement(c.to_string()),
                        ));
                    }
                }
            }
            _ => {
                return Err(Self::error(pos, SmartsParseErrorKind::MissingPrimitive));
            }
        };

        Ok(AtomExpr::Primitive { negated, primitive })
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
}

#[cfg(test)]
mod tests {
    use super::super::smiles;
    use super::*;

    fn first_atom_matches(pattern: &str, input: &str) -> bool {
        let pattern = SmartsPattern::parse(pattern).unwrap();
        let molecule = smiles::parse(input).unwrap();
        pattern.atom_expr(0).matches(&molecule, 0)
    }

    #[test]
    fn parse_counts_atoms_and_bonds() {
        let pattern = SmartsPattern::parse("[CX4][OH]").unwrap();
        assert_eq!(pattern.atom_count(), 2);
        assert_eq!(pattern.bond(0), (0, 1, BondExpr::Default));
    }

    #[test]
    fn element_primitive_distinguishes_aromaticity() {
        assert!(first_atom_matches("[C]", "CC"));
        assert!(!first_atom_matches("[C]", "c1ccccc1"));
        assert!(first_atom_matches("[c]", "c1ccccc1"));
        assert!(first_atom_matches("[#6]", "CC"));
        assert!(first_atom_matches("[#6]", "c1ccccc1"));
    }

    #[test]
    fn hydrogen_count_primitive_uses_total_hydrogens() {
        assert!(first_atom_matches("[CH4]", "C"));
        assert!(first_atom_matches("[CH3]", "CC"));
        assert!(!first_atom_matches("[CH2]", "CC"));
        assert!(first_atom_matches("[OH2]", "O"));
    }

    #[test]
    fn hydrogen_count_sees_explicit_hydrogen_neighbors() {
        // Deuterated water keeps its hydrogens as graph atoms; the count
        // primitive still sees two of them on the oxygen.
        let pattern = SmartsPattern::parse("[OH2]").unwrap();
        let molecule = smiles::parse("[2H]O[2H]").unwrap();
        let oxygen = molecule
            .atoms()
            .iter()
            .position(|a| a.atomic_number == 8)
            .unwrap();
        assert!(pattern.atom_expr(0).matches(&molecule, oxygen));
    }

    #[test]
    fn leading_h_is_the_element_not_a_count() {
        let pattern = SmartsPattern::parse("[H]").unwrap();
        let dihydrogen = smiles::parse("[H][H]").unwrap();
        assert!(pattern.atom_expr(0).matches(&dihydrogen, 0));

        let methane = smiles::parse("C").unwrap();
        assert!(!pattern.atom_expr(0).matches(&methane, 0));
    }

    #[test]
    fn connections_primitive_counts_implicit_hydrogens() {
        assert!(first_atom_matches("[CX4]", "C"));
        assert!(first_atom_matches("[CX4]", "CC"));
        assert!(!first_atom_matches("[CX3]", "CC"));
        assert!(first_atom_matches("[OX2]", "O"));
    }

    #[test]
    fn charge_primitive_is_exact() {
        assert!(first_atom_matches("[N+]", "[NH4+]"));
        assert!(!first_atom_matches("[N+]", "N"));
        assert!(first_atom_matches("[N+0]", "N"));
        assert!(!first_atom_matches("[N+0]", "[NH4+]"));
        assert!(first_atom_matches("[O-]", "[O-]C"));
    }

    #[test]
    fn negation_inverts_a_single_primitive() {
        assert!(first_atom_matches("[!C]", "O"));
        assert!(!first_atom_matches("[!C]", "CC"));
        // Aromatic carbon is not aliphatic carbon.
        assert!(first_atom_matches("[!C;!#1]", "c1ccccc1"));
        assert!(!first_atom_matches("[!#6]", "c1ccccc1"));
    }

    #[test]
    fn comma_or_binds_tighter_than_semicolon() {
        // Aromatic carbon or nitrogen, and exactly one hydrogen.
        let pattern = SmartsPattern::parse("[c,n;H1]").unwrap();
        let pyridine = smiles::parse("c1ccncc1").unwrap();
        for index in 0..pyridine.atom_count() {
            let expected = pyridine.atom(index).unwrap().hydrogen_count == 1;
            assert_eq!(pattern.atom_expr(0).matches(&pyridine, index), expected);
        }
    }

    #[test]
    fn aromatic_and_aliphatic_primitives() {
        assert!(first_atom_matches("[a]", "c1ccccc1"));
        assert!(!first_atom_matches("[a]", "CC"));
        assert!(first_atom_matches("[A]", "CC"));
        assert!(first_atom_matches("*", "[Na+]"));
    }

    #[test]
    fn bond_expressions_parse_and_match_orders() {
        let double = SmartsPattern::parse("C=O").unwrap();
        assert_eq!(double.bond(0).2, BondExpr::Order(BondOrder::Double));
        assert!(double.bond(0).2.matches(BondOrder::Double));
        assert!(!double.bond(0).2.matches(BondOrder::Single));

        let any = SmartsPattern::parse("C~C").unwrap();
        assert!(any.bond(0).2.matches(BondOrder::Triple));

        let aromatic = SmartsPattern::parse("c:c").unwrap();
        assert!(aromatic.bond(0).2.matches(BondOrder::Aromatic));
        assert!(!aromatic.bond(0).2.matches(BondOrder::Single));

        let default = SmartsPattern::parse("CC").unwrap();
        assert!(default.bond(0).2.matches(BondOrder::Single));
        assert!(default.bond(0).2.matches(BondOrder::Aromatic));
        assert!(!default.bond(0).2.matches(BondOrder::Double));
    }

    #[test]
    fn branches_and_ring_closures_shape_the_query_graph() {
        let pattern = SmartsPattern::parse("[c](:a)(:a):a").unwrap();
        assert_eq!(pattern.atom_count(), 4);
        assert_eq!(pattern.neighbors(0).len(), 3);

        let ring = SmartsPattern::parse("C1CCCCC1").unwrap();
        assert_eq!(ring.atom_count(), 6);
        assert!(ring.neighbors(0).iter().any(|&(n, _)| n == 5));
    }

    #[test]
    fn parse_rejects_malformed_patterns() {
        assert!(matches!(
            SmartsPattern::parse(""),
            Err(SmartsError::Parse {
                kind: SmartsParseErrorKind::EmptyPattern,
                ..
            })
        ));
        assert!(matches!(
            SmartsPattern::parse("[C"),
            Err(SmartsError::Parse {
                kind: SmartsParseErrorKind::UnclosedBracket,
                ..
            })
        ));
        assert!(matches!(
            SmartsPattern::parse("[]"),
            Err(SmartsError::Parse {
                kind: SmartsParseErrorKind::MissingPrimitive,
                ..
            })
        ));
        assert!(matches!(
            SmartsPattern::parse("[#]"),
            Err(SmartsError::Parse {
                kind: SmartsParseErrorKind::MissingAtomicNumber,
                ..
            })
        ));
        assert!(matches!(
            SmartsPattern::parse("C("),
            Err(SmartsError::Parse {
                kind: SmartsParseErrorKind::UnclosedBranch,
                ..
            })
        ));
        assert!(matches!(
            SmartsPattern::parse("C1CC"),
            Err(SmartsError::Parse {
                kind: SmartsParseErrorKind::UnclosedRingBond(1),
                ..
            })
        ));
        assert!(matches!(
            SmartsPattern::parse("C="),
            Err(SmartsError::Parse {
                kind: SmartsParseErrorKind::DanglingBond,
                ..
            })
        ));
        assert!(matches!(
            SmartsPattern::parse("[Qx]"),
            Err(SmartsError::Parse {
                kind: SmartsParseErrorKind::UnknownElement(_),
                ..
            })
        ));
    }

    #[test]
    fn parse_reports_byte_positions() {
        match SmartsPattern::parse("[CX4]$") {
            Err(SmartsError::Parse { position, .. }) => assert_eq!(position, 5),
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
