//! Catalogue of named common rules.

use crate::table::RuleTable;
use rca_core::{AutomatonParams, Cell, Error, Result};
use serde::{Deserialize, Serialize};

/// A named rule, either fixed to the elementary geometry or derivable for any `(k, r)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Wolfram code for binary radius-1 automata
    Elementary(u8),
    /// Output is the base-k digit of the code at position `sum(window)`
    Totalistic(u64),
    /// Output is the center cell
    Identity,
    /// Output is the right neighbor, so patterns travel left
    ShiftLeft,
    /// Output is the left neighbor, so patterns travel right
    ShiftRight,
    /// Most frequent value in the window
    Majority,
    /// Window sum modulo k
    Parity,
    /// Center advances to the next value when a neighbor already holds it
    Cyclic,
}

/// Catalogue entry as exposed to clients
#[derive(Debug, Clone, Serialize)]
pub struct PresetInfo {
    pub name: String,
    pub description: &'static str,
    /// `Some` when the preset only exists for one geometry
    pub fixed_geometry: Option<AutomatonParams>,
}

const CATALOGUE: &[(Preset, &str)] = &[
    (Preset::Elementary(30), "Wolfram rule 30, chaotic"),
    (Preset::Elementary(90), "Wolfram rule 90, Sierpinski triangle"),
    (Preset::Elementary(110), "Wolfram rule 110, universal"),
    (Preset::Elementary(150), "Wolfram rule 150, XOR of the window"),
    (Preset::Elementary(184), "Wolfram rule 184, traffic flow"),
    (Preset::Identity, "every cell keeps its value"),
    (Preset::ShiftLeft, "every cell copies its right neighbor"),
    (Preset::ShiftRight, "every cell copies its left neighbor"),
    (Preset::Majority, "most frequent value in the window, ties keep the center"),
    (Preset::Parity, "sum of the window modulo k"),
    (Preset::Cyclic, "cyclic automaton: advance when a neighbor is one step ahead"),
];

impl Preset {
    /// The named presets offered to users
    pub fn catalogue() -> Vec<PresetInfo> {
        CATALOGUE
            .iter()
            .map(|(preset, description)| PresetInfo {
                name: preset.name(),
                description: *description,
                fixed_geometry: preset.fixed_geometry(),
            })
            .collect()
    }

    /// Parse a preset name. Case, spaces, `-` and `_` are ignored, so
    /// `"Rule 90"`, `"rule90"` and `"RULE_90"` are the same preset.
    pub fn from_name(name: &str) -> Result<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        let preset = match normalized.as_str() {
            "identity" => Some(Preset::Identity),
            "shiftleft" => Some(Preset::ShiftLeft),
            "shiftright" => Some(Preset::ShiftRight),
            "majority" => Some(Preset::Majority),
            "parity" => Some(Preset::Parity),
            "cyclic" => Some(Preset::Cyclic),
            other => {
                if let Some(code) = other.strip_prefix("rule") {
                    code.parse().ok().map(Preset::Elementary)
                } else if let Some(code) = other.strip_prefix("totalistic") {
                    code.parse().ok().map(Preset::Totalistic)
                } else {
                    None
                }
            }
        };

        preset.ok_or_else(|| Error::NotFound(format!("no preset named '{}'", name)))
    }

    pub fn name(&self) -> String {
        match self {
            Preset::Elementary(code) => format!("rule{}", code),
            Preset::Totalistic(code) => format!("totalistic{}", code),
            Preset::Identity => "identity".to_string(),
            Preset::ShiftLeft => "shift-left".to_string(),
            Preset::ShiftRight => "shift-right".to_string(),
            Preset::Majority => "majority".to_string(),
            Preset::Parity => "parity".to_string(),
            Preset::Cyclic => "cyclic".to_string(),
        }
    }

    pub fn fixed_geometry(&self) -> Option<AutomatonParams> {
        match self {
            Preset::Elementary(_) => Some(AutomatonParams::elementary()),
            _ => None,
        }
    }

    pub fn supports(&self, params: AutomatonParams) -> bool {
        self.fixed_geometry().map_or(true, |fixed| fixed == params)
    }

    /// Derive the total table of this preset for `params`
    pub fn build(&self, params: AutomatonParams) -> Result<RuleTable> {
        if !self.supports(params) {
            return Err(Error::InvalidParameter(format!(
                "preset '{}' is only defined for {}, not {}",
                self.name(),
                AutomatonParams::elementary(),
                params
            )));
        }

        let k = params.states as usize;
        let r = params.radius;
        match *self {
            Preset::Elementary(code) => {
                RuleTable::from_fn(params, |n| ((code >> (4 * n[0] + 2 * n[1] + n[2])) & 1) as Cell)
            }
            Preset::Totalistic(code) => RuleTable::from_fn(params, |n| {
                let sum: usize = n.iter().map(|&d| d as usize).sum();
                totalistic_digit(code, k as u64, sum)
            }),
            Preset::Identity => RuleTable::from_fn(params, |n| n[r]),
            Preset::ShiftLeft => RuleTable::from_fn(params, |n| n[r + 1]),
            Preset::ShiftRight => RuleTable::from_fn(params, |n| n[r - 1]),
            Preset::Majority => RuleTable::from_fn(params, |n| majority(n, r, k)),
            Preset::Parity => RuleTable::from_fn(params, |n| {
                (n.iter().map(|&d| d as usize).sum::<usize>() % k) as Cell
            }),
            Preset::Cyclic => RuleTable::from_fn(params, |n| {
                let center = n[r];
                let next = ((center as usize + 1) % k) as Cell;
                let advanced = n
                    .iter()
                    .enumerate()
                    .any(|(i, &d)| i != r && d == next);
                if advanced {
                    next
                } else {
                    center
                }
            }),
        }
    }
}

fn totalistic_digit(code: u64, base: u64, position: usize) -> Cell {
    let mut rest = code;
    for _ in 0..position {
        if rest == 0 {
            break;
        }
        rest /= base;
    }
    (rest % base) as Cell
}

fn majority(window: &[Cell], center: usize, states: usize) -> Cell {
    let mut counts = vec![0usize; states];
    for &d in window {
        counts[d as usize] += 1;
    }
    let best = counts.iter().copied().max().unwrap_or(0);
    let center_value = window[center];
    if counts[center_value as usize] == best {
        return center_value;
    }
    counts
        .iter()
        .position(|&c| c == best)
        .map(|v| v as Cell)
        .unwrap_or(center_value)
}
