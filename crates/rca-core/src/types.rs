//! Core type definitions for the automaton.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Value held by a single cell, always in `[0, states)`
pub type Cell = u8;

/// Largest alphabet with a single-character digit per value (`0-9a-z`)
pub const MAX_STATES: u32 = 36;

/// Unique identifier for a server-side session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Base-36 character for a cell value.
pub fn digit_char(value: Cell) -> char {
    std::char::from_digit(value as u32, MAX_STATES).unwrap_or('?')
}

/// Parse a single base-36 digit, rejecting values outside `[0, states)`.
pub fn parse_digit(c: char, states: u32) -> Option<Cell> {
    c.to_digit(MAX_STATES)
        .filter(|&d| d < states)
        .map(|d| d as Cell)
}

/// One snapshot of the lattice
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lattice(pub Vec<Cell>);

impl Lattice {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self(cells)
    }

    pub fn zeros(size: usize) -> Self {
        Self(vec![0; size])
    }

    /// All zeros except `value` in the middle cell (index `size / 2`).
    pub fn single_seed(size: usize, value: Cell) -> Self {
        let mut cells = vec![0; size];
        if let Some(center) = cells.get_mut(size / 2) {
            *center = value;
        }
        Self(cells)
    }

    /// Parse a digit string such as `"00100"`.
    pub fn parse(digits: &str, states: u32) -> Result<Self> {
        digits
            .chars()
            .map(|c| {
                parse_digit(c, states).ok_or_else(|| {
                    Error::InvalidParameter(format!(
                        "'{}' is not a digit of a {}-state alphabet",
                        c, states
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.0
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.0
    }

    pub fn get(&self, index: usize) -> Option<Cell> {
        self.0.get(index).copied()
    }

    /// Number of cells holding each value `0..states`. Out-of-range values are not counted.
    pub fn counts(&self, states: u32) -> Vec<usize> {
        let mut counts = vec![0; states as usize];
        for &cell in &self.0 {
            if let Some(count) = counts.get_mut(cell as usize) {
                *count += 1;
            }
        }
        counts
    }

    /// Check every cell lies inside the alphabet
    pub fn check_alphabet(&self, states: u32) -> Result<()> {
        match self.0.iter().position(|&c| c as u32 >= states) {
            Some(index) => Err(Error::InvalidParameter(format!(
                "cell {} holds {} which is outside a {}-state alphabet",
                index, self.0[index], states
            ))),
            None => Ok(()),
        }
    }
}

impl From<Vec<Cell>> for Lattice {
    fn from(cells: Vec<Cell>) -> Self {
        Self(cells)
    }
}

impl FromIterator<Cell> for Lattice {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl AsRef<[Cell]> for Lattice {
    fn as_ref(&self) -> &[Cell] {
        &self.0
    }
}

impl fmt::Display for Lattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &cell in &self.0 {
            write!(f, "{}", digit_char(cell))?;
        }
        Ok(())
    }
}

/// Alphabet size and neighborhood radius of an automaton
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AutomatonParams {
    /// Alphabet size `k`
    pub states: u32,
    /// Neighborhood radius `r`
    pub radius: usize,
}

impl AutomatonParams {
    /// Upper bound on `k^(2r+1)` accepted when building rule tables
    pub const MAX_TABLE_ENTRIES: usize = 1 << 22;

    pub fn new(states: u32, radius: usize) -> Self {
        Self { states, radius }
    }

    /// The classic binary, radius-1 geometry
    pub fn elementary() -> Self {
        Self::new(2, 1)
    }

    /// Neighborhood width `2r + 1`
    pub fn window(&self) -> usize {
        2 * self.radius + 1
    }

    /// Number of distinct neighborhoods, `k^(2r+1)`
    pub fn table_len(&self) -> Result<usize> {
        let window = u32::try_from(self.window())
            .map_err(|_| Error::InvalidParameter(format!("radius {} is too large", self.radius)))?;
        (self.states as usize)
            .checked_pow(window)
            .filter(|&len| len <= Self::MAX_TABLE_ENTRIES)
            .ok_or_else(|| {
                Error::InvalidParameter(format!(
                    "a rule table for {} states and radius {} exceeds {} entries",
                    self.states,
                    self.radius,
                    Self::MAX_TABLE_ENTRIES
                ))
            })
    }

    /// Check alphabet size, radius and table size
    pub fn validate(&self) -> Result<()> {
        if self.states < 2 {
            return Err(Error::InvalidParameter(format!(
                "alphabet size must be at least 2, got {}",
                self.states
            )));
        }
        if self.states > MAX_STATES {
            return Err(Error::InvalidParameter(format!(
                "alphabet size must be at most {}, got {}",
                MAX_STATES, self.states
            )));
        }
        if self.radius < 1 {
            return Err(Error::InvalidParameter("radius must be at least 1".to_string()));
        }
        self.table_len().map(|_| ())
    }

    /// Check the parameters against a lattice size: `size >= 1` and `radius <= size / 2`
    pub fn validate_for_size(&self, size: usize) -> Result<()> {
        self.validate()?;
        if size == 0 {
            return Err(Error::InvalidParameter("lattice size must be positive".to_string()));
        }
        if self.radius > size / 2 {
            return Err(Error::InvalidParameter(format!(
                "radius {} exceeds half the lattice size {}",
                self.radius, size
            )));
        }
        Ok(())
    }
}

impl Default for AutomatonParams {
    fn default() -> Self {
        Self::elementary()
    }
}

impl fmt::Display for AutomatonParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "k={} r={}", self.states, self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_round_trip() {
        assert_eq!(digit_char(0), '0');
        assert_eq!(digit_char(9), '9');
        assert_eq!(digit_char(10), 'a');
        assert_eq!(digit_char(35), 'z');
        assert_eq!(parse_digit('a', 11), Some(10));
        assert_eq!(parse_digit('a', 10), None);
        assert_eq!(parse_digit('Z', 36), Some(35));
        assert_eq!(parse_digit('-', 36), None);
    }

    #[test]
    fn test_single_seed() {
        assert_eq!(Lattice::single_seed(5, 1).cells(), &[0, 0, 1, 0, 0]);
        assert_eq!(Lattice::single_seed(4, 2).cells(), &[0, 0, 2, 0]);
        assert!(Lattice::single_seed(0, 1).is_empty());
    }

    #[test]
    fn test_lattice_parse_and_display() {
        let lattice = Lattice::parse("0120", 3).unwrap();
        assert_eq!(lattice.cells(), &[0, 1, 2, 0]);
        assert_eq!(lattice.to_string(), "0120");
        assert!(Lattice::parse("0130", 3).is_err());
    }

    #[test]
    fn test_lattice_counts() {
        let lattice = Lattice::new(vec![0, 1, 1, 2, 0, 0]);
        assert_eq!(lattice.counts(3), vec![3, 2, 1]);
        assert_eq!(lattice.counts(2), vec![3, 2]);
    }

    #[test]
    fn test_check_alphabet() {
        assert!(Lattice::new(vec![0, 1, 1]).check_alphabet(2).is_ok());
        assert!(Lattice::new(vec![0, 2, 1]).check_alphabet(2).is_err());
    }

    #[test]
    fn test_lattice_serializes_as_array() {
        let json = serde_json::to_string(&Lattice::new(vec![1, 0, 1])).unwrap();
        assert_eq!(json, "[1,0,1]");
        let back: Lattice = serde_json::from_str("[0,0,1]").unwrap();
        assert_eq!(back.cells(), &[0, 0, 1]);
    }

    #[test]
    fn test_params_table_len() {
        assert_eq!(AutomatonParams::new(2, 1).table_len().unwrap(), 8);
        assert_eq!(AutomatonParams::new(3, 1).table_len().unwrap(), 27);
        assert_eq!(AutomatonParams::new(2, 2).table_len().unwrap(), 32);
        assert!(AutomatonParams::new(36, 5).table_len().is_err());
        assert!(AutomatonParams::new(2, 1000).table_len().is_err());
    }

    #[test]
    fn test_params_validation() {
        assert!(AutomatonParams::new(2, 1).validate().is_ok());
        assert!(AutomatonParams::new(1, 1).validate().is_err());
        assert!(AutomatonParams::new(37, 1).validate().is_err());
        assert!(AutomatonParams::new(2, 0).validate().is_err());

        let params = AutomatonParams::new(2, 2);
        assert!(params.validate_for_size(5).is_ok());
        assert!(params.validate_for_size(4).is_ok());
        assert!(params.validate_for_size(3).is_err());
        assert!(params.validate_for_size(0).is_err());
    }
}
