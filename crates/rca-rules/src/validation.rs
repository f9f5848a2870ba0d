//! Checks a rule source must pass before its table drives the engine.

use crate::table::RuleTable;
use rca_core::{AutomatonParams, Error, Result};

/// Validate that a table was built for `params` and covers every neighborhood
pub fn validate_rule(table: &RuleTable, params: AutomatonParams) -> Result<()> {
    params.validate()?;

    if table.params() != params {
        return Err(Error::InvalidParameter(format!(
            "rule table was built for {}, automaton uses {}",
            table.params(),
            params
        )));
    }

    if let Some((key, _)) = table.entries().find(|(_, output)| output.is_none()) {
        return Err(Error::rule_incomplete(key));
    }

    Ok(())
}
