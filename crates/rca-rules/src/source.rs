//! Building rule tables from a [`RuleSpec`].

use crate::preset::Preset;
use crate::random::random_table;
use crate::table::RuleTable;
use crate::validation::validate_rule;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rca_core::{AutomatonParams, Result, RuleSpec};
use tracing::debug;

/// Build the table described by `source` and check it is total for `params`
pub fn build_rule(params: AutomatonParams, source: &RuleSpec) -> Result<RuleTable> {
    let table = match source {
        RuleSpec::Preset(name) => {
            let preset = Preset::from_name(name)?;
            debug!(preset = %preset.name(), %params, "building preset rule");
            preset.build(params)?
        }
        RuleSpec::Custom(entries) => {
            debug!(entries = entries.len(), %params, "building custom rule");
            RuleTable::with_defaults(params, entries.iter().map(|(k, v)| (k.as_str(), *v)))?
        }
        RuleSpec::Random { lambda, seed } => {
            let mut rng = ChaCha8Rng::seed_from_u64(*seed);
            random_table(params, *lambda, &mut rng)?
        }
    };

    validate_rule(&table, params)?;
    Ok(table)
}
