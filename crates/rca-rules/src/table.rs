//! Dense rule table indexed by neighborhood code.

use crate::key::{decode, encode, key_string, parse_key};
use rca_core::{AutomatonParams, Cell, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from every neighborhood of an automaton to the next center value.
///
/// Slot `n` holds the output for the neighborhood whose base-k code is `n`.
/// A slot is `None` only for user-authored tables that left a key out; looking
/// such a key up fails with [`Error::RuleIncomplete`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "RuleTableRepr", try_from = "RuleTableRepr")]
pub struct RuleTable {
    params: AutomatonParams,
    outputs: Vec<Option<Cell>>,
}

impl RuleTable {
    /// Total table with every neighborhood mapped to 0
    pub fn new(params: AutomatonParams) -> Result<Self> {
        Self::filled(params, Some(0))
    }

    /// Table with no entries at all
    pub fn empty(params: AutomatonParams) -> Result<Self> {
        Self::filled(params, None)
    }

    fn filled(params: AutomatonParams, value: Option<Cell>) -> Result<Self> {
        params.validate()?;
        let len = params.table_len()?;
        Ok(Self {
            params,
            outputs: vec![value; len],
        })
    }

    /// Total table deriving each output from the neighborhood digits.
    pub fn from_fn<F>(params: AutomatonParams, mut f: F) -> Result<Self>
    where
        F: FnMut(&[Cell]) -> Cell,
    {
        let mut table = Self::empty(params)?;
        for code in 0..table.outputs.len() {
            let digits = decode(code, params);
            let output = f(&digits);
            table.check_value(output)?;
            table.outputs[code] = Some(output);
        }
        Ok(table)
    }

    /// Table authored key by key. Keys not supplied stay empty.
    pub fn from_entries<I, K>(params: AutomatonParams, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Cell)>,
        K: AsRef<str>,
    {
        let mut table = Self::empty(params)?;
        for (key, value) in entries {
            table.set(key.as_ref(), value)?;
        }
        Ok(table)
    }

    /// Total table authored key by key: every key not supplied maps to 0.
    pub fn with_defaults<I, K>(params: AutomatonParams, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Cell)>,
        K: AsRef<str>,
    {
        let mut table = Self::new(params)?;
        for (key, value) in entries {
            table.set(key.as_ref(), value)?;
        }
        Ok(table)
    }

    pub fn params(&self) -> AutomatonParams {
        self.params
    }

    pub fn states(&self) -> u32 {
        self.params.states
    }

    pub fn radius(&self) -> usize {
        self.params.radius
    }

    /// Number of neighborhoods, `k^(2r+1)`
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Output stored for a neighborhood code
    pub fn get(&self, code: usize) -> Option<Cell> {
        self.outputs.get(code).copied().flatten()
    }

    /// Output for a concrete neighborhood.
    ///
    /// Fails with `RuleIncomplete` when the neighborhood has the wrong width,
    /// holds a value outside the alphabet, or maps to an empty slot.
    pub fn lookup(&self, neighborhood: &[Cell]) -> Result<Cell> {
        if neighborhood.len() != self.params.window() {
            return Err(Error::rule_incomplete(key_string(neighborhood)));
        }
        encode(neighborhood, self.params.states)
            .and_then(|code| self.get(code))
            .ok_or_else(|| Error::rule_incomplete(key_string(neighborhood)))
    }

    /// Output for a digit-string key, `None` if that key was never set
    pub fn output_for(&self, key: &str) -> Result<Option<Cell>> {
        let code = parse_key(key, self.params)?;
        Ok(self.get(code))
    }

    pub fn set(&mut self, key: &str, value: Cell) -> Result<()> {
        let code = parse_key(key, self.params)?;
        self.set_code(code, value)
    }

    pub fn set_code(&mut self, code: usize, value: Cell) -> Result<()> {
        self.check_value(value)?;
        let len = self.outputs.len();
        let slot = self.outputs.get_mut(code).ok_or_else(|| {
            Error::InvalidParameter(format!("code {} is outside a table of {} entries", code, len))
        })?;
        *slot = Some(value);
        Ok(())
    }

    /// Clear one entry, making the table incomplete for that key
    pub fn unset(&mut self, key: &str) -> Result<()> {
        let code = parse_key(key, self.params)?;
        self.outputs[code] = None;
        Ok(())
    }

    fn check_value(&self, value: Cell) -> Result<()> {
        if value as u32 >= self.params.states {
            return Err(Error::InvalidParameter(format!(
                "output {} is outside a {}-state alphabet",
                value, self.params.states
            )));
        }
        Ok(())
    }

    /// All keys in ascending base-k order
    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.outputs.len()).map(move |code| key_string(&decode(code, self.params)))
    }

    /// Every key with its output, if set
    pub fn entries(&self) -> impl Iterator<Item = (String, Option<Cell>)> + '_ {
        self.keys().zip(self.outputs.iter().copied())
    }

    pub fn missing_keys(&self) -> Vec<String> {
        self.entries()
            .filter(|(_, output)| output.is_none())
            .map(|(key, _)| key)
            .collect()
    }

    pub fn is_total(&self) -> bool {
        self.outputs.iter().all(Option::is_some)
    }

    /// Set entries keyed by digit string
    pub fn to_map(&self) -> BTreeMap<String, Cell> {
        self.entries()
            .filter_map(|(key, output)| output.map(|value| (key, value)))
            .collect()
    }

    /// Fraction of set entries with a non-zero output (Langton's lambda)
    pub fn lambda(&self) -> f64 {
        let set: Vec<Cell> = self.outputs.iter().flatten().copied().collect();
        if set.is_empty() {
            return 0.0;
        }
        set.iter().filter(|&&v| v != 0).count() as f64 / set.len() as f64
    }

    pub(crate) fn outputs_mut(&mut self) -> &mut [Option<Cell>] {
        &mut self.outputs
    }
}

/// Wire form: the geometry plus a digit-string keyed map of set entries
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RuleTableRepr {
    states: u32,
    radius: usize,
    outputs: BTreeMap<String, Cell>,
}

impl From<RuleTable> for RuleTableRepr {
    fn from(table: RuleTable) -> Self {
        Self {
            states: table.params.states,
            radius: table.params.radius,
            outputs: table.to_map(),
        }
    }
}

impl TryFrom<RuleTableRepr> for RuleTable {
    type Error = Error;

    fn try_from(repr: RuleTableRepr) -> Result<Self> {
        RuleTable::from_entries(AutomatonParams::new(repr.states, repr.radius), repr.outputs)
    }
}
